use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha512};

use crate::error::{JwsError, JwsResult};
use crate::header::{JwsHeader, JWS_ALGORITHM};
use crate::signer::signing_input;

/// Checks detached RS512 tokens against the payload they travelled with.
#[derive(Debug, Clone)]
pub struct DetachedJwsVerifier {
    key: RsaPublicKey,
}

impl DetachedJwsVerifier {
    pub fn new(key: RsaPublicKey) -> Self {
        Self { key }
    }

    /// Accepts SPKI (`BEGIN PUBLIC KEY`) or PKCS#1 (`BEGIN RSA PUBLIC KEY`) PEM.
    pub fn from_public_key_pem(pem: &str) -> JwsResult<Self> {
        let pem = pem.trim();
        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|err| JwsError::InvalidKey(err.to_string()))?;
        Ok(Self::new(key))
    }

    pub fn verify(&self, token: &str, payload: &str) -> JwsResult<JwsHeader> {
        let (header_encoded, signature_encoded) = token
            .split_once("..")
            .ok_or_else(|| JwsError::MalformedToken("missing detached payload separator".into()))?;
        if header_encoded.is_empty() || signature_encoded.is_empty() || signature_encoded.contains('.') {
            return Err(JwsError::MalformedToken("expected <header>..<signature>".into()));
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_encoded)
            .map_err(|err| JwsError::MalformedToken(format!("header: {err}")))?;
        let header: JwsHeader = serde_json::from_slice(&header_bytes)
            .map_err(|err| JwsError::MalformedToken(format!("header: {err}")))?;

        if header.alg != JWS_ALGORITHM {
            return Err(JwsError::UnsupportedHeader(format!("alg '{}'", header.alg)));
        }
        if header.b64 || !header.crit.iter().any(|name| name == "b64") {
            return Err(JwsError::UnsupportedHeader("expected unencoded payload (b64=false, crit=[b64])".into()));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_encoded)
            .map_err(|err| JwsError::MalformedToken(format!("signature: {err}")))?;
        let digest = Sha512::digest(signing_input(header_encoded, payload).as_bytes());
        self.key
            .verify(Pkcs1v15Sign::new::<Sha512>(), &digest, &signature)
            .map_err(|_| JwsError::VerificationFailed)?;

        Ok(header)
    }
}
