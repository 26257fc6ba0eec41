use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::domains::message::{Message, Response};
use crate::error::{ConnectorError, Result};
use crate::interfaces::transport::MessageTransport;
use crate::providers::multipart;

pub const HEADER_PART: &str = "header";
pub const PAYLOAD_PART: &str = "payload";

/// Multipart-over-HTTP transport: POSTs a `header` part holding the message
/// and a `payload` part, and expects the same shape back.
pub struct HttpMessageTransport {
    client: reqwest::Client,
}

impl HttpMessageTransport {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MessageTransport for HttpMessageTransport {
    async fn send(&self, recipient: &Url, message: &Message, payload: Bytes) -> Result<Response> {
        let header = serde_json::to_string(message)
            .map_err(|e| ConnectorError::Serialization(e.to_string()))?;
        let header_part = Part::text(header)
            .mime_str("application/ld+json")
            .map_err(|e| ConnectorError::Serialization(e.to_string()))?;
        let form = Form::new()
            .part(HEADER_PART, header_part)
            .part(PAYLOAD_PART, Part::bytes(payload.to_vec()));

        let response = self
            .client
            .post(recipient.clone())
            .header(ACCEPT, "multipart/form-data")
            .multipart(form)
            .send()
            .await
            .map_err(|e: reqwest::Error| ConnectorError::MessageTransport(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e: reqwest::Error| ConnectorError::MessageTransport(e.to_string()))?;
        debug!(%status, bytes = body.len(), recipient = %recipient, "received reply");

        let Some(boundary) = multipart::boundary(&content_type) else {
            return Err(ConnectorError::MessageTransport(format!(
                "peer answered {status} without a multipart body"
            )));
        };
        decode_response(&body, &boundary)
    }
}

pub fn decode_response(body: &[u8], boundary: &str) -> Result<Response> {
    let parts = multipart::decode(body, boundary)?;
    let mut header = None;
    let mut payload = Bytes::new();
    for part in parts {
        match part.name.as_deref() {
            Some(HEADER_PART) => header = Some(part.body),
            Some(PAYLOAD_PART) => payload = part.body,
            _ => {}
        }
    }
    let header = header.ok_or_else(|| {
        ConnectorError::MessageTransport("multipart reply has no header part".to_string())
    })?;
    Ok(Response::new(header_fields(&header)?, payload))
}

fn header_fields(raw: &[u8]) -> Result<BTreeMap<String, String>> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| ConnectorError::MessageTransport(format!("unreadable header part: {e}")))?;
    let Value::Object(map) = value else {
        return Err(ConnectorError::MessageTransport(
            "header part is not a JSON object".to_string(),
        ));
    };
    Ok(map
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => (key, text),
            other => (key, other.to_string()),
        })
        .collect())
}
