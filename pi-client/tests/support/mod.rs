#![allow(dead_code)]

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use pi_client::{
    Credentials, Environment, GatewayConfig, GatewayLog, LoggingConfig, PaymentGatewayClient,
    PiError, PiResult, HttpTransport, OutboundRequest, TransportResponse,
};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::RsaPrivateKey;
use serde_json::Value;
use tracing::Level;

pub const CLIENT_ID: &str = "merchant-test";

pub struct KeyPair {
    pub private_pem: String,
    pub public_pem: String,
}

pub fn key_pair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
        KeyPair {
            private_pem: private_key
                .to_pkcs8_pem(LineEnding::LF)
                .expect("private pem")
                .to_string(),
            public_pem: private_key
                .to_public_key()
                .to_public_key_pem(LineEnding::LF)
                .expect("public pem"),
        }
    })
}

pub fn credentials() -> Credentials {
    Credentials::new(CLIENT_ID, key_pair().private_pem.clone())
}

pub fn sandbox_config(base_url: &str) -> GatewayConfig {
    GatewayConfig::new(Environment::Sandbox)
        .with_base_url(Environment::Sandbox, base_url)
        .expect("base url")
        .with_logging(LoggingConfig {
            enabled: true,
            level: Level::WARN,
            channel: "swedbank-test".to_string(),
        })
        .with_request_timeout(Duration::from_secs(5))
}

#[derive(Default)]
pub struct RecordingLog {
    events: Mutex<Vec<(Level, String, Value)>>,
}

impl RecordingLog {
    pub fn events(&self) -> Vec<(Level, String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl GatewayLog for RecordingLog {
    fn log(&self, level: Level, message: &str, context: &Value) {
        self.events
            .lock()
            .unwrap()
            .push((level, message.to_string(), context.clone()));
    }
}

pub fn client_with_log(config: &GatewayConfig) -> (PaymentGatewayClient, Arc<RecordingLog>) {
    let log = Arc::new(RecordingLog::default());
    let client = PaymentGatewayClient::builder(config)
        .with_log_sink(log.clone())
        .build()
        .expect("client");
    (client, log)
}

/// Captures requests and answers with a canned response.
pub struct RecordingTransport {
    requests: Mutex<Vec<OutboundRequest>>,
    response: Result<TransportResponse, String>,
}

impl RecordingTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Err(reason.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn execute(&self, request: OutboundRequest) -> PiResult<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(reason) => Err(PiError::Transport(reason.clone())),
        }
    }
}
