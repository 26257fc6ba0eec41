use thiserror::Error;

use crate::domains::message::MessageKind;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("invalid message descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("message transport error: {0}")]
    MessageTransport(String),
    #[error("unexpected response: expected {expected}, got {}", .actual.as_deref().unwrap_or("no message type"))]
    UnexpectedResponseKind {
        expected: MessageKind,
        actual: Option<String>,
        body: String,
    },
    #[error("malformed contract agreement: {0}")]
    MalformedAgreement(String),
    #[error("contract agreement does not match request: {0}")]
    AgreementMismatch(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("connector identity error: {0}")]
    Identity(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ConnectorError {
    /// True for failures of the local store after a successful exchange.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
