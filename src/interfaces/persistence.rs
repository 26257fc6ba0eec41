use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use crate::domains::contract::Agreement;
use crate::domains::message::Response;
use crate::error::Result;

/// Receives the full reply so the description payload travels with its header.
#[async_trait]
pub trait EntityPersistenceService: Send + Sync {
    async fn save_metadata(
        &self,
        response: &Response,
        artifacts: &[Url],
        auto_download: bool,
        recipient: &Url,
    ) -> Result<()>;

    async fn save_data(&self, response: &Response, artifact_id: &Url) -> Result<()>;

    async fn save_app_data(&self, response: &Response, app_id: &Url) -> Result<()>;

    async fn save_app_resource(
        &self,
        response: &Response,
        recipient: &Url,
    ) -> Result<()>;
}

#[async_trait]
pub trait AgreementRepository: Send + Sync {
    async fn get(&self, agreement_id: Uuid) -> Result<Agreement>;
}
