use thiserror::Error;

pub type JwsResult<T> = Result<T, JwsError>;

#[derive(Debug, Error)]
pub enum JwsError {
    #[error("invalid RSA key: {0}")]
    InvalidKey(String),
    #[error("failed to sign JWS: {0}")]
    SigningFailure(String),
    #[error("failed to serialize JWS component: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("malformed detached JWS: {0}")]
    MalformedToken(String),
    #[error("unsupported JWS header: {0}")]
    UnsupportedHeader(String),
    #[error("JWS signature verification failed")]
    VerificationFailed,
}
