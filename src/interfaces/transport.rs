use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::domains::message::{Message, Response};
use crate::error::Result;

/// Delivers one built message and waits for the peer's multipart reply.
///
/// Timeouts and connection handling belong to the implementation; failures
/// are reported as `ConnectorError::MessageTransport`.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, recipient: &Url, message: &Message, payload: Bytes) -> Result<Response>;
}
