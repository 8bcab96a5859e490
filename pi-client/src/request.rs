use serde::Serialize;
use serde_json::Value;

use crate::error::{PiError, PiResult};

/// Caller-built payment data in the bank's V3 format.
///
/// Only `creditor.bic` is interpreted locally (it routes the request); the rest
/// is sent as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaymentInitiationRequest {
    body: Value,
}

impl PaymentInitiationRequest {
    pub fn new(body: Value) -> PiResult<Self> {
        match body.pointer("/creditor/bic") {
            Some(Value::String(bic)) if !bic.trim().is_empty() => Ok(Self { body }),
            Some(_) => Err(PiError::InvalidRequest(
                "creditor.bic must be a non-empty string".to_string(),
            )),
            None => Err(PiError::InvalidRequest("creditor.bic is required".to_string())),
        }
    }

    pub fn creditor_bic(&self) -> &str {
        self.body
            .pointer("/creditor/bic")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

impl TryFrom<Value> for PaymentInitiationRequest {
    type Error = PiError;

    fn try_from(value: Value) -> PiResult<Self> {
        Self::new(value)
    }
}
