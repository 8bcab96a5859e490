use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common_observability::GatewayMetrics;
use pi_client::{Credentials, GatewayConfig, PaymentGatewayClient, PaymentInitiationRequest};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Signed calls against the Payment Initiation API using SWEDBANK_* settings.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print Prometheus metrics for the call to stderr once it finishes
    #[arg(long, global = true)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List banks available under the merchant agreement
    Providers {
        /// Country code recorded with failures (defaults to SWEDBANK_DEFAULT_COUNTRY)
        #[arg(long)]
        country: Option<String>,
    },
    /// Fetch a payment status from a status URL returned by the bank
    Status { url: String },
    /// Create a payment initiation from a JSON file and print the SCA redirect URL
    Initiate { payment: PathBuf },
    /// Request the initiation form for a provider
    Form {
        #[arg(long)]
        bic: String,
        payment: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GatewayConfig::from_env().context("invalid SWEDBANK_* configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_string().to_ascii_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let credentials = config
        .credentials()
        .context("no usable credentials for the active environment")?;
    let mut builder = PaymentGatewayClient::builder(&config);
    if cli.metrics {
        builder = builder.with_metrics(GatewayMetrics::new());
    }
    let client = builder.build()?;
    info!(environment = %client.environment(), base_url = client.base_url(), "payment gateway client ready");

    let outcome = run(cli.command, &client, &credentials, &config).await;
    if let Some(metrics) = client.metrics() {
        eprint!("{}", metrics.render().context("failed to render metrics")?);
    }

    println!("{}", serde_json::to_string_pretty(&outcome?)?);
    Ok(())
}

async fn run(
    command: Command,
    client: &PaymentGatewayClient,
    credentials: &Credentials,
    config: &GatewayConfig,
) -> Result<Value> {
    let output = match command {
        Command::Providers { country } => {
            let country = country.unwrap_or_else(|| config.payment.default_country.clone());
            let providers = client.get_payment_providers(&country, credentials).await?;
            serde_json::to_value(providers)?
        }
        Command::Status { url } => client.get_payment_status(&url, credentials).await?,
        Command::Initiate { payment } => {
            let request = PaymentInitiationRequest::new(load_json(&payment)?)?;
            let redirect = client.create_payment_initiation(&request, credentials).await?;
            Value::String(redirect)
        }
        Command::Form { bic, payment } => {
            let payment_data = load_json(&payment)?;
            client
                .get_payment_initiation_form(&bic, &payment_data, credentials)
                .await?
        }
    };
    Ok(output)
}

fn load_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}
