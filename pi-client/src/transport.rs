use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{PiError, PiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully prepared request: URL, headers and the exact body bytes that were signed.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> PiResult<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            PiError::MalformedResponse(format!("expected JSON body (HTTP {}): {err}", self.status))
        })
    }
}

/// Executes one HTTP exchange. Implementations must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: OutboundRequest) -> PiResult<TransportResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> PiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PiError::Transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: OutboundRequest) -> PiResult<TransportResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                PiError::Transport(format!("timed out calling {}: {err}", request.url))
            } else {
                PiError::Transport(format!("request to {} failed: {err}", request.url))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| PiError::Transport(format!("failed to read response body: {err}")))?;
        Ok(TransportResponse { status, body })
    }
}
