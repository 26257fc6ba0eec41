use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use crate::domains::message::SecurityToken;
use crate::error::{ConnectorError, Result};
use crate::interfaces::identity::ConnectorIdentity;

pub const DEFAULT_MODEL_VERSION: &str = "4.2.7";

/// Identity backed by configuration. The token can be swapped at runtime by
/// whatever refreshes it; every message build reads the current value.
pub struct ConfiguredIdentity {
    connector_id: Url,
    model_version: String,
    token: RwLock<Option<SecurityToken>>,
}

impl ConfiguredIdentity {
    pub fn new(connector_id: Url, model_version: Option<String>, token: Option<SecurityToken>) -> Self {
        Self {
            connector_id,
            model_version: model_version.unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
            token: RwLock::new(token),
        }
    }

    pub async fn set_security_token(&self, token: SecurityToken) {
        *self.token.write().await = Some(token);
    }
}

#[async_trait]
impl ConnectorIdentity for ConfiguredIdentity {
    fn connector_id(&self) -> Url {
        self.connector_id.clone()
    }

    fn outbound_model_version(&self) -> String {
        self.model_version.clone()
    }

    async fn current_security_token(&self) -> Result<SecurityToken> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| ConnectorError::Identity("no security token available".to_string()))
    }
}
