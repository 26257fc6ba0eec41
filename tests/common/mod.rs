#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use tokio::sync::Mutex;
use url::Url;

use dataspace_connector::domains::contract::{Contract, ContractRequest, Rule};
use dataspace_connector::domains::message::{Message, MessageKind, Response, SecurityToken};
use dataspace_connector::error::{ConnectorError, Result};
use dataspace_connector::interfaces::persistence::EntityPersistenceService;
use dataspace_connector::interfaces::transport::MessageTransport;
use dataspace_connector::providers::identity::ConfiguredIdentity;
use dataspace_connector::services::message::MessageService;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Collects formatted `warn!` and above for the current thread until the guard drops.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn install() -> (tracing::subscriber::DefaultGuard, Self) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (tracing::subscriber::set_default(subscriber), logs)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Builds a multipart/form-data body from `(name, content type, body)` parts.
pub fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, content_type, body) in parts {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        out.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
        );
        if let Some(content_type) = content_type {
            out.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(body);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

pub fn url(value: &str) -> Url {
    Url::parse(value).unwrap()
}

pub fn response(kind: MessageKind, body: &str) -> Response {
    let mut fields = BTreeMap::new();
    fields.insert("@type".to_string(), kind.as_str().to_string());
    fields.insert("ids:modelVersion".to_string(), "4.2.7".to_string());
    Response::new(fields, body.to_string())
}

pub fn contract_request() -> ContractRequest {
    Contract {
        id: url("https://consumer.example/api/contracts/c1"),
        consumer: url("https://consumer.example"),
        provider: url("https://provider.example"),
        start: None,
        end: None,
        rules: vec![
            Rule::new(json!({"@type": "ids:Permission", "ids:action": "USE"})),
            Rule::new(json!({"@type": "ids:Permission", "ids:action": "LOG"})),
        ],
    }
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub recipient: Url,
    pub message: Message,
    pub payload: Bytes,
}

type Responder = Box<dyn Fn(&Message, &Bytes) -> Result<Response> + Send + Sync>;

/// Answers every message through a closure and keeps what was sent.
pub struct ScriptedTransport {
    responder: Responder,
    pub sent: Mutex<Vec<SentMessage>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Message, &Bytes) -> Result<Response> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: Response) -> Self {
        Self::new(move |_, _| Ok(reply.clone()))
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn subjects(&self) -> Vec<Url> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|s| {
                s.message
                    .requested_element
                    .clone()
                    .or_else(|| s.message.requested_artifact.clone())
            })
            .collect()
    }
}

#[async_trait]
impl MessageTransport for ScriptedTransport {
    async fn send(&self, recipient: &Url, message: &Message, payload: Bytes) -> Result<Response> {
        self.sent.lock().await.push(SentMessage {
            recipient: recipient.clone(),
            message: message.clone(),
            payload: payload.clone(),
        });
        (self.responder)(message, &payload)
    }
}

/// Records every call as `operation:subject` and fails on a chosen subject.
#[derive(Default)]
pub struct RecordingPersistence {
    pub calls: Mutex<Vec<String>>,
    pub fail_on: Option<Url>,
}

impl RecordingPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(subject: Url) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(subject),
        }
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, operation: &str, subject: &Url) -> Result<()> {
        self.calls.lock().await.push(format!("{operation}:{subject}"));
        if self.fail_on.as_ref() == Some(subject) {
            return Err(ConnectorError::Persistence(format!("disk full while storing {subject}")));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityPersistenceService for RecordingPersistence {
    async fn save_metadata(
        &self,
        response: &Response,
        _artifacts: &[Url],
        _auto_download: bool,
        _recipient: &Url,
    ) -> Result<()> {
        let subject = response
            .header_fields
            .get("subject")
            .map(|s| url(s))
            .unwrap_or_else(|| url("urn:unknown"));
        self.record("metadata", &subject).await
    }

    async fn save_data(&self, _response: &Response, artifact_id: &Url) -> Result<()> {
        self.record("data", artifact_id).await
    }

    async fn save_app_data(&self, _response: &Response, app_id: &Url) -> Result<()> {
        self.record("app-data", app_id).await
    }

    async fn save_app_resource(&self, _response: &Response, recipient: &Url) -> Result<()> {
        self.record("app-resource", recipient).await
    }
}

pub fn identity() -> Arc<ConfiguredIdentity> {
    Arc::new(ConfiguredIdentity::new(
        url("https://consumer.example"),
        Some("4.2.7".to_string()),
        Some(SecurityToken::jwt("token-1")),
    ))
}

pub fn message_service(transport: Arc<ScriptedTransport>) -> Arc<MessageService> {
    Arc::new(MessageService::new(identity(), transport))
}

/// Echoes the requested subject into the reply header so persistence can see it.
pub fn echo_subject(kind: MessageKind, message: &Message) -> Response {
    let mut reply = response(kind, "{\"@type\":\"ids:Resource\"}");
    let subject = message
        .requested_element
        .clone()
        .or_else(|| message.requested_artifact.clone());
    if let Some(subject) = subject {
        reply
            .header_fields
            .insert("subject".to_string(), subject.to_string());
    }
    reply
}
