use std::sync::Arc;

use url::Url;

use crate::client::Connector;
use crate::config::Config;
use crate::domains::message::SecurityToken;
use crate::error::{ConnectorError, Result};
use crate::interfaces::persistence::{AgreementRepository, EntityPersistenceService};
use crate::interfaces::transport::MessageTransport;
use crate::providers::http::HttpMessageTransport;
use crate::providers::identity::ConfiguredIdentity;
use crate::services::artifact::ArtifactDataDownloader;
use crate::services::contract::ContractManager;
use crate::services::message::MessageService;
use crate::services::metadata::MetadataDownloader;
use crate::services::negotiation::NegotiationPipeline;

pub struct ConnectorFactory;

impl ConnectorFactory {
    pub fn create_from_config(
        config: Config,
        persistence: Arc<dyn EntityPersistenceService>,
        agreements: Arc<dyn AgreementRepository>,
    ) -> Result<Connector> {
        let transport_config = config.transport();
        let transport = Arc::new(HttpMessageTransport::new(
            transport_config.connect_timeout(),
            transport_config.timeout(),
        )?);
        Self::create_with_transport(config, transport, persistence, agreements)
    }

    pub fn create_with_transport(
        config: Config,
        transport: Arc<dyn MessageTransport>,
        persistence: Arc<dyn EntityPersistenceService>,
        agreements: Arc<dyn AgreementRepository>,
    ) -> Result<Connector> {
        let config = config.resolve_env();
        let connector_id = Url::parse(config.connector.connector_id.trim()).map_err(|e| {
            ConnectorError::Config(format!(
                "invalid connector id {}: {e}",
                config.connector.connector_id
            ))
        })?;
        let token = config
            .connector
            .security_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .map(SecurityToken::jwt);

        let identity = Arc::new(ConfiguredIdentity::new(
            connector_id,
            config.connector.outbound_model_version.clone(),
            token,
        ));
        let messages = Arc::new(MessageService::new(identity.clone(), transport));
        let negotiation = NegotiationPipeline::new(messages.clone(), ContractManager::new())
            .with_confirmation(config.confirm_agreement());
        let metadata = MetadataDownloader::new(messages.clone(), persistence.clone());
        let artifacts = ArtifactDataDownloader::new(messages, agreements, persistence);

        Ok(Connector::new(identity, negotiation, metadata, artifacts))
    }
}
