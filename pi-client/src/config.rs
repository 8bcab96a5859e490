use std::env;
use std::time::Duration;

use common_jws::Credentials;
use reqwest::Url;
use thiserror::Error;
use tracing::Level;

use crate::environment::Environment;

pub const DEFAULT_SANDBOX_BASE_URL: &str = "https://api-sandbox.swedbank.com/pi";
pub const DEFAULT_PRODUCTION_BASE_URL: &str = "https://pi.swedbank.com/public/api";

const SUPPORTED_CURRENCIES: &[&str] = &["EUR", "SEK", "DKK", "NOK"];
const SUPPORTED_COUNTRIES: &[&str] = &["LT", "LV", "EE", "SE", "DK", "NO"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} environment is disabled in configuration")]
    EnvironmentDisabled(Environment),
}

/// Credentials configured for one environment. `enabled` gates whether
/// [`GatewayConfig::credentials`] hands them out.
#[derive(Clone)]
pub struct EnvironmentCredentials {
    pub enabled: bool,
    pub client_id: Option<String>,
    pub private_key_pem: Option<String>,
}

impl std::fmt::Debug for EnvironmentCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentCredentials")
            .field("enabled", &self.enabled)
            .field("client_id", &self.client_id)
            .field(
                "private_key_pem",
                &self.private_key_pem.as_ref().map(|_| "***redacted***"),
            )
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Minimum level forwarded to the log sink.
    pub level: Level,
    pub channel: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::INFO,
            channel: "swedbank".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentDefaults {
    pub default_currency: String,
    pub default_country: String,
    pub supported_currencies: Vec<String>,
    pub supported_countries: Vec<String>,
}

impl PaymentDefaults {
    pub fn supports_currency(&self, currency: &str) -> bool {
        self.supported_currencies
            .iter()
            .any(|value| value.eq_ignore_ascii_case(currency.trim()))
    }

    pub fn supports_country(&self, country: &str) -> bool {
        self.supported_countries
            .iter()
            .any(|value| value.eq_ignore_ascii_case(country.trim()))
    }
}

impl Default for PaymentDefaults {
    fn default() -> Self {
        Self {
            default_currency: "EUR".to_string(),
            default_country: "LT".to_string(),
            supported_currencies: SUPPORTED_CURRENCIES.iter().map(|c| c.to_string()).collect(),
            supported_countries: SUPPORTED_COUNTRIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Validated client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub sandbox_base_url: String,
    pub production_base_url: String,
    pub sandbox: EnvironmentCredentials,
    pub production: EnvironmentCredentials,
    pub logging: LoggingConfig,
    pub payment: PaymentDefaults,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Configuration with the bank's published endpoints and no credentials.
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            sandbox_base_url: DEFAULT_SANDBOX_BASE_URL.to_string(),
            production_base_url: DEFAULT_PRODUCTION_BASE_URL.to_string(),
            sandbox: EnvironmentCredentials {
                enabled: false,
                client_id: None,
                private_key_pem: None,
            },
            production: EnvironmentCredentials {
                enabled: true,
                client_id: None,
                private_key_pem: None,
            },
            logging: LoggingConfig::default(),
            payment: PaymentDefaults::default(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Override the endpoint of the given environment, validating it eagerly.
    pub fn with_base_url(mut self, environment: Environment, url: &str) -> Result<Self, ConfigError> {
        let key = base_url_key(environment);
        let url = validate_base_url(key, url)?;
        match environment {
            Environment::Sandbox => self.sandbox_base_url = url,
            Environment::Production => self.production_base_url = url,
        }
        Ok(self)
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key-value source (environment, secrets manager, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("SWEDBANK_ENVIRONMENT").and_then(|v| normalize_optional(&v)) {
            Some(value) => value.parse::<Environment>()?,
            None => Environment::Production,
        };

        let sandbox_base_url = match lookup(base_url_key(Environment::Sandbox)) {
            Some(value) => validate_base_url(base_url_key(Environment::Sandbox), &value)?,
            None => DEFAULT_SANDBOX_BASE_URL.to_string(),
        };
        let production_base_url = match lookup(base_url_key(Environment::Production)) {
            Some(value) => validate_base_url(base_url_key(Environment::Production), &value)?,
            None => DEFAULT_PRODUCTION_BASE_URL.to_string(),
        };

        let sandbox = EnvironmentCredentials {
            enabled: bool_from(&lookup, "SWEDBANK_SANDBOX_ENABLED").unwrap_or(false),
            client_id: lookup("SWEDBANK_SANDBOX_CLIENT_ID").and_then(|v| normalize_optional(&v)),
            private_key_pem: lookup("SWEDBANK_SANDBOX_PRIVATE_KEY").and_then(|v| normalize_pem(&v)),
        };
        let production = EnvironmentCredentials {
            enabled: bool_from(&lookup, "SWEDBANK_PRODUCTION_ENABLED").unwrap_or(true),
            client_id: lookup("SWEDBANK_PRODUCTION_CLIENT_ID").and_then(|v| normalize_optional(&v)),
            private_key_pem: lookup("SWEDBANK_PRODUCTION_PRIVATE_KEY").and_then(|v| normalize_pem(&v)),
        };

        let level = match lookup("SWEDBANK_LOG_LEVEL").and_then(|v| normalize_optional(&v)) {
            Some(value) => parse_level(&value)?,
            None => Level::INFO,
        };
        let logging = LoggingConfig {
            enabled: bool_from(&lookup, "SWEDBANK_LOGGING_ENABLED").unwrap_or(true),
            level,
            channel: lookup("SWEDBANK_LOG_CHANNEL")
                .and_then(|v| normalize_optional(&v))
                .unwrap_or_else(|| "swedbank".to_string()),
        };

        let request_timeout_secs = match lookup("SWEDBANK_HTTP_TIMEOUT_SECONDS").and_then(|v| normalize_optional(&v)) {
            Some(value) => value.parse::<u64>().map_err(|err| ConfigError::Invalid {
                key: "SWEDBANK_HTTP_TIMEOUT_SECONDS",
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => 30,
        };

        let defaults = PaymentDefaults::default();
        let payment = PaymentDefaults {
            default_currency: lookup("SWEDBANK_DEFAULT_CURRENCY")
                .and_then(|v| normalize_optional(&v))
                .map(|v| v.to_ascii_uppercase())
                .unwrap_or(defaults.default_currency),
            default_country: lookup("SWEDBANK_DEFAULT_COUNTRY")
                .and_then(|v| normalize_optional(&v))
                .map(|v| v.to_ascii_uppercase())
                .unwrap_or(defaults.default_country),
            ..defaults
        };

        Ok(Self {
            environment,
            sandbox_base_url,
            production_base_url,
            sandbox,
            production,
            logging,
            payment,
            request_timeout: Duration::from_secs(request_timeout_secs.max(1)),
        })
    }

    /// Endpoint of the active environment, without trailing slash.
    pub fn base_url(&self) -> &str {
        match self.environment {
            Environment::Sandbox => &self.sandbox_base_url,
            Environment::Production => &self.production_base_url,
        }
    }

    /// Credentials configured for the active environment.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let (configured, client_id_key, private_key_key) = match self.environment {
            Environment::Sandbox => (
                &self.sandbox,
                "SWEDBANK_SANDBOX_CLIENT_ID",
                "SWEDBANK_SANDBOX_PRIVATE_KEY",
            ),
            Environment::Production => (
                &self.production,
                "SWEDBANK_PRODUCTION_CLIENT_ID",
                "SWEDBANK_PRODUCTION_PRIVATE_KEY",
            ),
        };
        if !configured.enabled {
            return Err(ConfigError::EnvironmentDisabled(self.environment));
        }
        let client_id = configured
            .client_id
            .clone()
            .ok_or(ConfigError::Missing(client_id_key))?;
        let private_key = configured
            .private_key_pem
            .clone()
            .ok_or(ConfigError::Missing(private_key_key))?;
        Ok(Credentials::new(client_id, private_key))
    }
}

fn base_url_key(environment: Environment) -> &'static str {
    match environment {
        Environment::Sandbox => "SWEDBANK_SANDBOX_BASE_URL",
        Environment::Production => "SWEDBANK_PRODUCTION_BASE_URL",
    }
}

fn validate_base_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Missing(key));
    }
    let parsed = Url::parse(trimmed).map_err(|err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn bool_from<F>(lookup: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

/// Maps tracing and syslog-style level names onto tracing levels.
fn parse_level(value: &str) -> Result<Level, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" | "notice" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" | "critical" | "alert" | "emergency" => Ok(Level::ERROR),
        other => Err(ConfigError::Invalid {
            key: "SWEDBANK_LOG_LEVEL",
            value: other.to_string(),
            reason: "unknown log level".to_string(),
        }),
    }
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Keys passed through env files often carry literal "\n" instead of newlines.
fn normalize_pem(value: &str) -> Option<String> {
    normalize_optional(value).map(|pem| pem.replace("\\n", "\n"))
}
