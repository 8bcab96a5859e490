use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PiError, PiResult};

const PREFERRED_NAME_LANGUAGE: &str = "lt";
const FALLBACK_NAME_LANGUAGE: &str = "en";

/// A bank the payer can be sent to, flattened from the agreement providers map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub country: String,
    pub bic: String,
    pub logo: String,
    pub url: String,
}

impl Provider {
    pub fn from_entry(id: &str, detail: &Value) -> Self {
        let text = |pointer: &str| {
            detail
                .pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let name = detail
            .pointer(&format!("/names/shortNames/{PREFERRED_NAME_LANGUAGE}"))
            .and_then(Value::as_str)
            .or_else(|| {
                detail
                    .pointer(&format!("/names/shortNames/{FALLBACK_NAME_LANGUAGE}"))
                    .and_then(Value::as_str)
            })
            .unwrap_or_default()
            .to_string();

        Self {
            id: id.to_string(),
            name,
            country: text("/country"),
            bic: text("/bic"),
            logo: text("/urls/logo"),
            url: text("/urls/payment"),
        }
    }
}

/// Flatten `{ "<key>": { ...detail } }` into providers, keeping response order.
pub fn providers_from_response(body: &Value) -> PiResult<Vec<Provider>> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Object(entries) => Ok(flatten(entries)),
        other => Err(PiError::MalformedResponse(format!(
            "expected provider map, got {}",
            json_kind(other)
        ))),
    }
}

fn flatten(entries: &Map<String, Value>) -> Vec<Provider> {
    entries
        .iter()
        .map(|(id, detail)| Provider::from_entry(id, detail))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
