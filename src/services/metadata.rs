use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::interfaces::persistence::EntityPersistenceService;
use crate::services::message::MessageService;
use crate::services::storage_failure;

/// Fetches resource descriptions from a peer and stores them in list order.
/// The first failing resource ends the call.
pub struct MetadataDownloader {
    messages: Arc<MessageService>,
    persistence: Arc<dyn EntityPersistenceService>,
}

impl MetadataDownloader {
    pub fn new(
        messages: Arc<MessageService>,
        persistence: Arc<dyn EntityPersistenceService>,
    ) -> Self {
        Self {
            messages,
            persistence,
        }
    }

    pub async fn download(
        &self,
        recipient: &Url,
        resources: &[Url],
        artifacts: &[Url],
        auto_download: bool,
    ) -> Result<()> {
        for resource in resources {
            let response = self.messages.request_description(recipient, resource).await?;
            self.persistence
                .save_metadata(&response, artifacts, auto_download, recipient)
                .await
                .map_err(|e| storage_failure("resource metadata", resource, e))?;
            debug!(resource = %resource, recipient = %recipient, "stored resource metadata");
        }
        Ok(())
    }

    pub async fn download_app_resource(&self, recipient: &Url, app_resource: &Url) -> Result<()> {
        let response = self
            .messages
            .request_description(recipient, app_resource)
            .await?;
        self.persistence
            .save_app_resource(&response, recipient)
            .await
            .map_err(|e| storage_failure("app resource", app_resource, e))
    }
}
