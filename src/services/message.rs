use std::sync::Arc;

use bytes::Bytes;
use time::OffsetDateTime;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::domains::contract::{ContractAgreement, ContractRequest};
use crate::domains::message::{Message, MessageDescriptor, MessageKind, Response};
use crate::error::{ConnectorError, Result};
use crate::interfaces::identity::ConnectorIdentity;
use crate::interfaces::transport::MessageTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Subject,
    TransferContract,
}

impl RequiredField {
    fn name(&self) -> &'static str {
        match self {
            RequiredField::Subject => "subject",
            RequiredField::TransferContract => "transfer contract",
        }
    }

    fn is_present(&self, descriptor: &MessageDescriptor) -> bool {
        match self {
            RequiredField::Subject => descriptor.subject.is_some(),
            RequiredField::TransferContract => descriptor.transfer_contract.is_some(),
        }
    }
}

/// Everything that differs between message kinds: what is sent, what must
/// come back, and which descriptor fields have to be filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    pub request: MessageKind,
    pub expected_response: MessageKind,
    pub required: &'static [RequiredField],
    pub properties: &'static [(&'static str, &'static str)],
}

pub const DESCRIPTION_REQUEST: KindSpec = KindSpec {
    request: MessageKind::DescriptionRequest,
    expected_response: MessageKind::DescriptionResponse,
    required: &[RequiredField::Subject],
    properties: &[("ids:depth", "10")],
};

pub const ARTIFACT_REQUEST: KindSpec = KindSpec {
    request: MessageKind::ArtifactRequest,
    expected_response: MessageKind::ArtifactResponse,
    required: &[RequiredField::Subject],
    properties: &[],
};

pub const CONTRACT_REQUEST: KindSpec = KindSpec {
    request: MessageKind::ContractRequest,
    expected_response: MessageKind::ContractAgreement,
    required: &[],
    properties: &[],
};

pub const CONTRACT_AGREEMENT: KindSpec = KindSpec {
    request: MessageKind::ContractAgreement,
    expected_response: MessageKind::MessageProcessedNotification,
    required: &[RequiredField::TransferContract],
    properties: &[],
};

pub struct MessageService {
    identity: Arc<dyn ConnectorIdentity>,
    transport: Arc<dyn MessageTransport>,
}

impl MessageService {
    pub fn new(identity: Arc<dyn ConnectorIdentity>, transport: Arc<dyn MessageTransport>) -> Self {
        Self {
            identity,
            transport,
        }
    }

    pub async fn build_message(
        &self,
        spec: &KindSpec,
        descriptor: &MessageDescriptor,
    ) -> Result<Message> {
        if descriptor.kind != spec.request {
            return Err(ConnectorError::InvalidDescriptor(format!(
                "descriptor of kind {} cannot build {}",
                descriptor.kind, spec.request
            )));
        }
        if let Some(missing) = spec.required.iter().find(|f| !f.is_present(descriptor)) {
            return Err(ConnectorError::InvalidDescriptor(format!(
                "{} requires a {}",
                spec.request,
                missing.name()
            )));
        }

        let connector_id = self.identity.connector_id();
        let model_version = self.identity.outbound_model_version();
        let security_token = self.identity.current_security_token().await?;
        if security_token.token_value.trim().is_empty() {
            return Err(ConnectorError::Identity("security token is empty".to_string()));
        }

        let id = Url::parse(&format!("urn:uuid:{}", Uuid::new_v4()))
            .map_err(|e| ConnectorError::Serialization(e.to_string()))?;

        let (requested_element, requested_artifact) = match spec.request {
            MessageKind::ArtifactRequest => (None, descriptor.subject.clone()),
            _ => (descriptor.subject.clone(), None),
        };

        let mut properties = descriptor.properties.clone();
        for (key, value) in spec.properties {
            properties
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }

        Ok(Message {
            id,
            kind: spec.request,
            issued: OffsetDateTime::now_utc(),
            model_version,
            issuer_connector: connector_id.clone(),
            sender_agent: connector_id,
            security_token,
            recipient_connector: vec![descriptor.recipient.clone()],
            requested_element,
            requested_artifact,
            transfer_contract: descriptor.transfer_contract.clone(),
            properties,
        })
    }

    pub async fn send(
        &self,
        spec: &KindSpec,
        descriptor: &MessageDescriptor,
        payload: impl Into<Bytes>,
    ) -> Result<Response> {
        let message = self.build_message(spec, descriptor).await?;
        debug!(
            kind = %message.kind,
            recipient = %descriptor.recipient,
            "sending message"
        );
        self.transport
            .send(&descriptor.recipient, &message, payload.into())
            .await
    }

    pub async fn send_and_validate(
        &self,
        spec: &KindSpec,
        descriptor: &MessageDescriptor,
        payload: impl Into<Bytes>,
    ) -> Result<Response> {
        let response = self.send(spec, descriptor, payload).await?;
        Self::validate_response(spec, &response)?;
        Ok(response)
    }

    pub fn validate_response(spec: &KindSpec, response: &Response) -> Result<()> {
        let kind = response.kind();
        if kind == Some(spec.expected_response) {
            return Ok(());
        }
        if kind == Some(MessageKind::Rejection) {
            debug!(
                expected = %spec.expected_response,
                reason = response.rejection_reason().unwrap_or("unknown"),
                "peer rejected message"
            );
        }
        Err(ConnectorError::UnexpectedResponseKind {
            expected: spec.expected_response,
            actual: response.message_type().map(str::to_string),
            body: response.body_text(),
        })
    }

    pub async fn request_description(&self, recipient: &Url, element: &Url) -> Result<Response> {
        let descriptor = MessageDescriptor::new(MessageKind::DescriptionRequest, recipient.clone())
            .with_subject(element.clone());
        self.send_and_validate(&DESCRIPTION_REQUEST, &descriptor, Bytes::new())
            .await
    }

    pub async fn request_artifact(
        &self,
        recipient: &Url,
        artifact: &Url,
        transfer_contract: Option<&Url>,
    ) -> Result<Response> {
        let descriptor = MessageDescriptor::new(MessageKind::ArtifactRequest, recipient.clone())
            .with_subject(artifact.clone())
            .with_transfer_contract(transfer_contract.cloned());
        self.send_and_validate(&ARTIFACT_REQUEST, &descriptor, Bytes::new())
            .await
    }

    pub async fn request_contract(
        &self,
        recipient: &Url,
        request: &ContractRequest,
    ) -> Result<Response> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| ConnectorError::Serialization(e.to_string()))?;
        let descriptor = MessageDescriptor::new(MessageKind::ContractRequest, recipient.clone())
            .with_subject(request.id.clone());
        self.send_and_validate(&CONTRACT_REQUEST, &descriptor, payload)
            .await
    }

    pub async fn send_agreement(
        &self,
        recipient: &Url,
        agreement: &ContractAgreement,
    ) -> Result<Response> {
        let payload = serde_json::to_vec(agreement)
            .map_err(|e| ConnectorError::Serialization(e.to_string()))?;
        let descriptor = MessageDescriptor::new(MessageKind::ContractAgreement, recipient.clone())
            .with_transfer_contract(Some(agreement.id.clone()));
        self.send_and_validate(&CONTRACT_AGREEMENT, &descriptor, payload)
            .await
    }
}
