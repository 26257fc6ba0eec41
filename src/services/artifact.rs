use std::sync::Arc;

use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::Result;
use crate::interfaces::persistence::{AgreementRepository, EntityPersistenceService};
use crate::services::message::MessageService;
use crate::services::storage_failure;

/// Fetches artifact data under an agreement.
///
/// Artifacts are requested one after another in list order. A failure to
/// store one artifact is logged as retryable and then ends the call, so the
/// remaining artifacts are not requested.
pub struct ArtifactDataDownloader {
    messages: Arc<MessageService>,
    agreements: Arc<dyn AgreementRepository>,
    persistence: Arc<dyn EntityPersistenceService>,
}

impl ArtifactDataDownloader {
    pub fn new(
        messages: Arc<MessageService>,
        agreements: Arc<dyn AgreementRepository>,
        persistence: Arc<dyn EntityPersistenceService>,
    ) -> Self {
        Self {
            messages,
            agreements,
            persistence,
        }
    }

    pub async fn download(
        &self,
        recipient: &Url,
        artifacts: &[Url],
        agreement_id: Uuid,
    ) -> Result<()> {
        let transfer_contract = self.agreements.get(agreement_id).await?.remote_id;
        for artifact in artifacts {
            let response = self
                .messages
                .request_artifact(recipient, artifact, Some(&transfer_contract))
                .await?;
            self.persistence
                .save_data(&response, artifact)
                .await
                .map_err(|e| storage_failure("artifact data", artifact, e))?;
            debug!(artifact = %artifact, "stored artifact data");
        }
        Ok(())
    }

    pub async fn download_app_artifact(&self, recipient: &Url, app_artifact: &Url) -> Result<()> {
        let response = self
            .messages
            .request_artifact(recipient, app_artifact, None)
            .await?;
        self.persistence
            .save_app_data(&response, app_artifact)
            .await
            .map_err(|e| storage_failure("app artifact data", app_artifact, e))
    }
}
