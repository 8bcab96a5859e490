pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
pub mod providers;
pub mod request;
pub mod transport;

pub use client::{PaymentGatewayClient, PaymentGatewayClientBuilder};
pub use common_jws::{Credentials, JwsPayload};
pub use config::{ConfigError, EnvironmentCredentials, GatewayConfig, LoggingConfig, PaymentDefaults};
pub use environment::Environment;
pub use error::{PiError, PiResult};
pub use logging::{GatewayLog, GatedLog, TracingLog};
pub use providers::Provider;
pub use request::PaymentInitiationRequest;
pub use transport::{HttpMethod, HttpTransport, OutboundRequest, ReqwestTransport, TransportResponse};
