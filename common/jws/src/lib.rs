//! Detached JSON Web Signatures (RS512, `b64: false`) for the payment initiation API.
//!
//! The token carries only the header and signature segments
//! (`<header>..<signature>`); the payload travels as the HTTP body but is part of
//! the signed bytes.

pub mod credentials;
pub mod error;
pub mod header;
pub mod signer;
pub mod verifier;

pub use credentials::Credentials;
pub use error::{JwsError, JwsResult};
pub use header::{JwsHeader, JWS_ALGORITHM, KID_PREFIX};
pub use signer::{DetachedJwsSigner, JwsPayload};
pub use verifier::DetachedJwsVerifier;
