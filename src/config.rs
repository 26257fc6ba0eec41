use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ConnectorError, Result};

pub const TOKEN_ENV: &str = "DATASPACE_CONNECTOR_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectorConfig {
    pub connector_id: String,
    pub outbound_model_version: Option<String>,
    pub security_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransportConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(5))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(30))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NegotiationConfig {
    pub confirm_agreement: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub connector: ConnectorConfig,
    pub transport: Option<TransportConfig>,
    pub negotiation: Option<NegotiationConfig>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConnectorError::Config(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConnectorError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Fills a missing security token from the environment.
    pub fn resolve_env(mut self) -> Self {
        if self.connector.security_token.is_none() {
            if let Ok(token) = std::env::var(TOKEN_ENV) {
                if !token.trim().is_empty() {
                    self.connector.security_token = Some(token);
                }
            }
        }
        self
    }

    pub fn transport(&self) -> TransportConfig {
        self.transport.clone().unwrap_or_default()
    }

    pub fn confirm_agreement(&self) -> bool {
        self.negotiation
            .as_ref()
            .and_then(|n| n.confirm_agreement)
            .unwrap_or(false)
    }
}
