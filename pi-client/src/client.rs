use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use common_jws::{Credentials, DetachedJwsSigner, JwsPayload};
use common_observability::{
    GatewayMetrics, OUTCOME_GATEWAY_ERROR, OUTCOME_MALFORMED_RESPONSE, OUTCOME_SIGNING_ERROR,
    OUTCOME_SUCCESS, OUTCOME_TRANSPORT_ERROR,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::config::{GatewayConfig, LoggingConfig};
use crate::environment::Environment;
use crate::error::{PiError, PiResult};
use crate::logging::{GatedLog, GatewayLog};
use crate::providers::{providers_from_response, Provider};
use crate::request::PaymentInitiationRequest;
use crate::transport::{HttpMethod, HttpTransport, OutboundRequest, ReqwestTransport, TransportResponse};

pub const JWS_SIGNATURE_HEADER: &str = "x-jws-signature";
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

const OP_CREATE_INITIATION: &str = "create_payment_initiation";
const OP_STATUS: &str = "get_payment_status";
const OP_PROVIDERS: &str = "get_payment_providers";
const OP_INITIATION_FORM: &str = "get_payment_initiation_form";

/// Signed client for the bank's Payment Initiation API (V3).
///
/// Credentials are passed to every call and never retained, so one client can
/// serve many merchants and many concurrent tasks.
#[derive(Clone)]
pub struct PaymentGatewayClient {
    environment: Environment,
    base_url: String,
    signer: DetachedJwsSigner,
    transport: Arc<dyn HttpTransport>,
    log: GatedLog,
    metrics: Option<GatewayMetrics>,
}

/// One signed exchange and the context logged if it fails.
struct SignedCall<'a> {
    operation: &'static str,
    failure_message: &'static str,
    method: HttpMethod,
    url: &'a str,
    payload: JwsPayload,
    request_id: bool,
    context: Value,
}

impl PaymentGatewayClient {
    pub fn new(config: &GatewayConfig) -> PiResult<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: &GatewayConfig) -> PaymentGatewayClientBuilder {
        PaymentGatewayClientBuilder::new(config)
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics(&self) -> Option<&GatewayMetrics> {
        self.metrics.as_ref()
    }

    pub fn transaction_url(&self, bic: &str) -> String {
        format!("{}/v3/transactions/providers/{bic}", self.base_url)
    }

    pub fn providers_url(&self) -> String {
        format!("{}/v3/agreement/providers", self.base_url)
    }

    /// Start a payment and return the SCA redirect URL for the payer.
    ///
    /// Returns an empty string when the bank accepts the payment but sends no
    /// `_links.scaRedirect.href`.
    pub async fn create_payment_initiation(
        &self,
        request: &PaymentInitiationRequest,
        credentials: &Credentials,
    ) -> PiResult<String> {
        let url = self.transaction_url(request.creditor_bic());
        self.instrumented(OP_CREATE_INITIATION, async {
            let response = self
                .execute_signed(
                    SignedCall {
                        operation: OP_CREATE_INITIATION,
                        failure_message: "Swedbank payment initiation failed",
                        method: HttpMethod::Post,
                        url: &url,
                        payload: JwsPayload::Json(request.body().clone()),
                        request_id: true,
                        context: json!({ "payment_data": request.body(), "url": url }),
                    },
                    credentials,
                )
                .await?;

            let body: Value = response.json()?;
            let redirect = match body.pointer("/_links/scaRedirect/href").and_then(Value::as_str) {
                Some(href) => href.to_string(),
                None => {
                    self.log.warn(
                        "Swedbank payment initiation response carried no scaRedirect link",
                        json!({ "url": url }),
                    );
                    String::new()
                }
            };
            self.log.info(
                "Swedbank payment initiation created",
                json!({ "url": url, "has_redirect": !redirect.is_empty() }),
            );
            Ok::<_, PiError>(redirect)
        })
        .await
    }

    /// Fetch the state of a payment from the status URL the bank returned earlier.
    pub async fn get_payment_status(&self, status_url: &str, credentials: &Credentials) -> PiResult<Value> {
        self.instrumented(OP_STATUS, async {
            let response = self
                .execute_signed(
                    SignedCall {
                        operation: OP_STATUS,
                        failure_message: "Swedbank payment status request failed",
                        method: HttpMethod::Get,
                        url: status_url,
                        payload: JwsPayload::Empty,
                        request_id: true,
                        context: json!({ "url": status_url }),
                    },
                    credentials,
                )
                .await?;
            let status: Value = response.json()?;
            self.log.info("Swedbank payment status retrieved", json!({ "url": status_url }));
            Ok::<_, PiError>(status)
        })
        .await
    }

    /// List the banks available under the merchant agreement.
    ///
    /// `country` is not sent to the bank; it only enriches failure logs.
    pub async fn get_payment_providers(&self, country: &str, credentials: &Credentials) -> PiResult<Vec<Provider>> {
        let url = self.providers_url();
        self.instrumented(OP_PROVIDERS, async {
            let response = self
                .execute_signed(
                    SignedCall {
                        operation: OP_PROVIDERS,
                        failure_message: "Swedbank providers request failed",
                        method: HttpMethod::Get,
                        url: &url,
                        payload: JwsPayload::Empty,
                        request_id: false,
                        context: json!({ "country": country, "url": url }),
                    },
                    credentials,
                )
                .await?;
            let providers = providers_from_response(&response.json()?)?;
            self.log.info(
                "Swedbank providers retrieved",
                json!({ "country": country, "count": providers.len() }),
            );
            Ok::<_, PiError>(providers)
        })
        .await
    }

    /// Post payment data to a specific provider and return the bank's form description.
    ///
    /// The provider comes from `bic`; `payment_data` is sent unchanged and need
    /// not name a creditor BIC.
    pub async fn get_payment_initiation_form(
        &self,
        bic: &str,
        payment_data: &Value,
        credentials: &Credentials,
    ) -> PiResult<Value> {
        let url = self.transaction_url(bic);
        self.instrumented(OP_INITIATION_FORM, async {
            let response = self
                .execute_signed(
                    SignedCall {
                        operation: OP_INITIATION_FORM,
                        failure_message: "Swedbank payment initiation form failed",
                        method: HttpMethod::Post,
                        url: &url,
                        payload: JwsPayload::Json(payment_data.clone()),
                        request_id: true,
                        context: json!({ "bic": bic }),
                    },
                    credentials,
                )
                .await?;
            let form: Value = response.json()?;
            self.log.info("Swedbank payment initiation form retrieved", json!({ "bic": bic }));
            Ok::<_, PiError>(form)
        })
        .await
    }

    async fn execute_signed(&self, call: SignedCall<'_>, credentials: &Credentials) -> PiResult<TransportResponse> {
        let body = call.payload.to_signing_string()?;
        let jws = self.signer.sign_serialized(&body, call.url, credentials)?;

        let mut headers = vec![(JWS_SIGNATURE_HEADER, jws)];
        if call.method == HttpMethod::Post {
            headers.push(("Content-Type", "application/json".to_string()));
        }
        headers.push(("Accept", "application/json".to_string()));
        let request_id = call.request_id.then(generate_request_id);
        if let Some(id) = &request_id {
            headers.push((REQUEST_ID_HEADER, id.clone()));
        }

        let request = OutboundRequest {
            method: call.method,
            url: call.url.to_string(),
            headers,
            body: match call.payload {
                JwsPayload::Empty => None,
                JwsPayload::Json(_) => Some(body),
            },
        };
        debug!(
            operation = call.operation,
            method = call.method.as_str(),
            url = call.url,
            request_id = request_id.as_deref().unwrap_or(""),
            "sending signed request"
        );

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                let mut context = call.context;
                merge(&mut context, json!({ "error": err.to_string(), "request_id": request_id }));
                self.log.error(call.failure_message, context);
                return Err(err);
            }
        };

        if !response.is_success() {
            let mut context = call.context;
            merge(
                &mut context,
                json!({ "response": response.body, "status": response.status, "request_id": request_id }),
            );
            self.log.error(call.failure_message, context);
            return Err(PiError::Gateway {
                status: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }

    async fn instrumented<T, F>(&self, operation: &'static str, call: F) -> PiResult<T>
    where
        F: Future<Output = PiResult<T>>,
    {
        let started = Instant::now();
        let result = call.await;
        if let Some(metrics) = &self.metrics {
            metrics.observe(operation, outcome_label(&result), started.elapsed().as_secs_f64());
        }
        result
    }
}

impl std::fmt::Debug for PaymentGatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGatewayClient")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("log", &self.log)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

pub struct PaymentGatewayClientBuilder {
    environment: Environment,
    base_url: String,
    request_timeout: std::time::Duration,
    logging: LoggingConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    log_sink: Option<Arc<dyn GatewayLog>>,
    metrics: Option<GatewayMetrics>,
}

impl PaymentGatewayClientBuilder {
    fn new(config: &GatewayConfig) -> Self {
        Self {
            environment: config.environment,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
            logging: config.logging.clone(),
            transport: None,
            log_sink: None,
            metrics: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the default `tracing` sink. Enabled flag and level from the
    /// configuration still apply.
    pub fn with_log_sink(mut self, sink: Arc<dyn GatewayLog>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn with_metrics(mut self, metrics: GatewayMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> PiResult<PaymentGatewayClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.request_timeout)?),
        };
        let log = match self.log_sink {
            Some(sink) => GatedLog::new(sink, &self.logging),
            None => GatedLog::from_config(&self.logging),
        };

        Ok(PaymentGatewayClient {
            environment: self.environment,
            base_url: self.base_url,
            signer: DetachedJwsSigner::new(),
            transport,
            log,
            metrics: self.metrics,
        })
    }
}

/// `req_` plus a time-ordered UUID; unique enough for log correlation.
pub fn generate_request_id() -> String {
    format!("req_{}", Uuid::now_v7().simple())
}

fn merge(target: &mut Value, extra: Value) {
    if let (Value::Object(target), Value::Object(extra)) = (target, extra) {
        for (key, value) in extra {
            if !value.is_null() {
                target.insert(key, value);
            }
        }
    }
}

fn outcome_label<T>(result: &PiResult<T>) -> &'static str {
    match result {
        Ok(_) => OUTCOME_SUCCESS,
        Err(PiError::Gateway { .. }) => OUTCOME_GATEWAY_ERROR,
        Err(PiError::Transport(_)) => OUTCOME_TRANSPORT_ERROR,
        Err(PiError::MalformedResponse(_)) => OUTCOME_MALFORMED_RESPONSE,
        Err(PiError::InvalidKey(_) | PiError::SigningFailure(_) | PiError::InvalidRequest(_)) => {
            OUTCOME_SIGNING_ERROR
        }
    }
}
