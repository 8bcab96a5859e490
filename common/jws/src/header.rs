use serde::{Deserialize, Serialize};

pub const JWS_ALGORITHM: &str = "RS512";
pub const KID_PREFIX: &str = "LT:";

/// Protected header of a detached JWS.
///
/// Field order matters: the serialized form is what gets base64url-encoded and
/// signed, so it must stay `b64, crit, iat, alg, url, kid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    pub b64: bool,
    pub crit: Vec<String>,
    pub iat: i64,
    pub alg: String,
    pub url: String,
    pub kid: String,
}

impl JwsHeader {
    pub fn new(url: impl Into<String>, client_id: &str, issued_at: i64) -> Self {
        Self {
            b64: false,
            crit: vec!["b64".to_string()],
            iat: issued_at,
            alg: JWS_ALGORITHM.to_string(),
            url: url.into(),
            kid: format!("{KID_PREFIX}{client_id}"),
        }
    }
}
