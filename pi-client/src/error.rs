use common_jws::JwsError;
use thiserror::Error;

pub type PiResult<T> = Result<T, PiError>;

#[derive(Debug, Error)]
pub enum PiError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("failed to sign request: {0}")]
    SigningFailure(String),
    #[error("no response from payment gateway: {0}")]
    Transport(String),
    #[error("payment gateway returned HTTP {status}: {body}")]
    Gateway { status: u16, body: String },
    #[error("malformed payment gateway response: {0}")]
    MalformedResponse(String),
    #[error("invalid payment request: {0}")]
    InvalidRequest(String),
}

impl PiError {
    /// HTTP status of a gateway rejection, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            PiError::Gateway { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<JwsError> for PiError {
    fn from(value: JwsError) -> Self {
        match value {
            JwsError::InvalidKey(message) => Self::InvalidKey(message),
            other => Self::SigningFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jws_errors_map_onto_signing_kinds() {
        let err: PiError = JwsError::InvalidKey("bad pem".into()).into();
        assert!(matches!(err, PiError::InvalidKey(ref m) if m == "bad pem"));

        let err: PiError = JwsError::SigningFailure("boom".into()).into();
        assert!(matches!(err, PiError::SigningFailure(_)));
    }

    #[test]
    fn gateway_error_exposes_status() {
        let err = PiError::Gateway {
            status: 400,
            body: "{\"error\":\"invalid_bic\"}".into(),
        };
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("invalid_bic"));
        assert_eq!(PiError::Transport("timeout".into()).status(), None);
    }
}
