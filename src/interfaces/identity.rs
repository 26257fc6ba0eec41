use async_trait::async_trait;
use url::Url;

use crate::domains::message::SecurityToken;
use crate::error::Result;

#[async_trait]
pub trait ConnectorIdentity: Send + Sync {
    fn connector_id(&self) -> Url;
    fn outbound_model_version(&self) -> String;
    /// Read on every message build. Refreshing the token is up to the implementor.
    async fn current_security_token(&self) -> Result<SecurityToken>;
}
