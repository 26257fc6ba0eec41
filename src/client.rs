use std::path::Path;
use std::sync::Arc;

use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::domains::contract::ContractRequest;
use crate::domains::message::SecurityToken;
use crate::error::Result;
use crate::factories::connector_factory::ConnectorFactory;
use crate::interfaces::persistence::{AgreementRepository, EntityPersistenceService};
use crate::providers::identity::ConfiguredIdentity;
use crate::services::artifact::ArtifactDataDownloader;
use crate::services::metadata::MetadataDownloader;
use crate::services::negotiation::{NegotiationOutcome, NegotiationPipeline};

pub struct Connector {
    identity: Arc<ConfiguredIdentity>,
    negotiation: NegotiationPipeline,
    metadata: MetadataDownloader,
    artifacts: ArtifactDataDownloader,
}

impl Connector {
    pub fn new(
        identity: Arc<ConfiguredIdentity>,
        negotiation: NegotiationPipeline,
        metadata: MetadataDownloader,
        artifacts: ArtifactDataDownloader,
    ) -> Self {
        Self {
            identity,
            negotiation,
            metadata,
            artifacts,
        }
    }

    pub fn from_config(
        config: Config,
        persistence: Arc<dyn EntityPersistenceService>,
        agreements: Arc<dyn AgreementRepository>,
    ) -> Result<Self> {
        ConnectorFactory::create_from_config(config, persistence, agreements)
    }

    pub fn from_config_path<P: AsRef<Path>>(
        path: P,
        persistence: Arc<dyn EntityPersistenceService>,
        agreements: Arc<dyn AgreementRepository>,
    ) -> Result<Self> {
        let config = Config::from_file(path)?;
        Self::from_config(config, persistence, agreements)
    }

    pub async fn rotate_security_token(&self, token: SecurityToken) {
        self.identity.set_security_token(token).await;
    }

    pub async fn negotiate(
        &self,
        recipient: Url,
        request: ContractRequest,
    ) -> Result<NegotiationOutcome> {
        self.negotiation.run(recipient, request).await
    }

    pub async fn download_metadata(
        &self,
        recipient: &Url,
        resources: &[Url],
        artifacts: &[Url],
        auto_download: bool,
    ) -> Result<()> {
        self.metadata
            .download(recipient, resources, artifacts, auto_download)
            .await
    }

    pub async fn download_app_resource(&self, recipient: &Url, app_resource: &Url) -> Result<()> {
        self.metadata.download_app_resource(recipient, app_resource).await
    }

    pub async fn download_artifacts(
        &self,
        recipient: &Url,
        artifacts: &[Url],
        agreement_id: Uuid,
    ) -> Result<()> {
        self.artifacts.download(recipient, artifacts, agreement_id).await
    }

    pub async fn download_app_artifact(&self, recipient: &Url, app_artifact: &Url) -> Result<()> {
        self.artifacts
            .download_app_artifact(recipient, app_artifact)
            .await
    }
}
