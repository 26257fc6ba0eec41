use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::domains::contract::Agreement;
use crate::domains::message::Response;
use crate::error::{ConnectorError, Result};
use crate::interfaces::persistence::{AgreementRepository, EntityPersistenceService};
use crate::services::negotiation::NegotiationOutcome;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredMetadata {
    pub recipient: Url,
    pub response: Response,
    pub artifacts: Vec<Url>,
    pub auto_download: bool,
}

/// Process-local store for metadata, artifact data and agreements.
#[derive(Default)]
pub struct InMemoryStore {
    metadata: RwLock<Vec<StoredMetadata>>,
    app_resources: RwLock<Vec<(Url, Response)>>,
    data: RwLock<HashMap<Url, Bytes>>,
    app_data: RwLock<HashMap<Url, Bytes>>,
    agreements: RwLock<HashMap<Uuid, Agreement>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_agreement(&self, agreement: Agreement) {
        self.agreements.write().await.insert(agreement.id, agreement);
    }

    /// Records the agreement of a finished negotiation under a fresh local id.
    pub async fn store_outcome(&self, outcome: &NegotiationOutcome) -> Agreement {
        let agreement = Agreement {
            id: Uuid::new_v4(),
            remote_id: outcome.agreement.id.clone(),
            value: outcome.raw_agreement.clone(),
        };
        self.insert_agreement(agreement.clone()).await;
        agreement
    }

    pub async fn metadata(&self) -> Vec<StoredMetadata> {
        self.metadata.read().await.clone()
    }

    pub async fn app_resources(&self) -> Vec<(Url, Response)> {
        self.app_resources.read().await.clone()
    }

    pub async fn data(&self, artifact: &Url) -> Option<Bytes> {
        self.data.read().await.get(artifact).cloned()
    }

    pub async fn app_data(&self, app: &Url) -> Option<Bytes> {
        self.app_data.read().await.get(app).cloned()
    }
}

#[async_trait]
impl EntityPersistenceService for InMemoryStore {
    async fn save_metadata(
        &self,
        response: &Response,
        artifacts: &[Url],
        auto_download: bool,
        recipient: &Url,
    ) -> Result<()> {
        if response.body.is_empty() {
            return Err(ConnectorError::Persistence(
                "description response has no payload".to_string(),
            ));
        }
        self.metadata.write().await.push(StoredMetadata {
            recipient: recipient.clone(),
            response: response.clone(),
            artifacts: artifacts.to_vec(),
            auto_download,
        });
        Ok(())
    }

    async fn save_data(&self, response: &Response, artifact_id: &Url) -> Result<()> {
        self.data
            .write()
            .await
            .insert(artifact_id.clone(), response.body.clone());
        Ok(())
    }

    async fn save_app_data(&self, response: &Response, app_id: &Url) -> Result<()> {
        self.app_data
            .write()
            .await
            .insert(app_id.clone(), response.body.clone());
        Ok(())
    }

    async fn save_app_resource(&self, response: &Response, recipient: &Url) -> Result<()> {
        self.app_resources
            .write()
            .await
            .push((recipient.clone(), response.clone()));
        Ok(())
    }
}

#[async_trait]
impl AgreementRepository for InMemoryStore {
    async fn get(&self, agreement_id: Uuid) -> Result<Agreement> {
        self.agreements
            .read()
            .await
            .get(&agreement_id)
            .cloned()
            .ok_or_else(|| ConnectorError::NotFound(format!("agreement {agreement_id}")))
    }
}
