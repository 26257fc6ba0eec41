use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::error::ConnectorError;

pub const TYPE_FIELD: &str = "@type";
pub const REJECTION_REASON_FIELD: &str = "ids:rejectionReason";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "ids:DescriptionRequestMessage")]
    DescriptionRequest,
    #[serde(rename = "ids:DescriptionResponseMessage")]
    DescriptionResponse,
    #[serde(rename = "ids:ArtifactRequestMessage")]
    ArtifactRequest,
    #[serde(rename = "ids:ArtifactResponseMessage")]
    ArtifactResponse,
    #[serde(rename = "ids:ContractRequestMessage")]
    ContractRequest,
    #[serde(rename = "ids:ContractAgreementMessage")]
    ContractAgreement,
    #[serde(rename = "ids:MessageProcessedNotificationMessage")]
    MessageProcessedNotification,
    #[serde(rename = "ids:RejectionMessage")]
    Rejection,
}

impl MessageKind {
    pub const ALL: [MessageKind; 8] = [
        MessageKind::DescriptionRequest,
        MessageKind::DescriptionResponse,
        MessageKind::ArtifactRequest,
        MessageKind::ArtifactResponse,
        MessageKind::ContractRequest,
        MessageKind::ContractAgreement,
        MessageKind::MessageProcessedNotification,
        MessageKind::Rejection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::DescriptionRequest => "ids:DescriptionRequestMessage",
            MessageKind::DescriptionResponse => "ids:DescriptionResponseMessage",
            MessageKind::ArtifactRequest => "ids:ArtifactRequestMessage",
            MessageKind::ArtifactResponse => "ids:ArtifactResponseMessage",
            MessageKind::ContractRequest => "ids:ContractRequestMessage",
            MessageKind::ContractAgreement => "ids:ContractAgreementMessage",
            MessageKind::MessageProcessedNotification => {
                "ids:MessageProcessedNotificationMessage"
            }
            MessageKind::Rejection => "ids:RejectionMessage",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = ConnectorError;

    /// Accepts the prefixed form and the bare class name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_prefix("ids:").unwrap_or(trimmed);
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().trim_start_matches("ids:") == name)
            .ok_or_else(|| ConnectorError::Serialization(format!("unknown message type {trimmed}")))
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityToken {
    #[serde(rename = "ids:tokenFormat")]
    pub token_format: String,
    #[serde(rename = "ids:tokenValue")]
    pub token_value: String,
}

impl SecurityToken {
    pub fn jwt(value: impl Into<String>) -> Self {
        Self {
            token_format: "idsc:JWT".to_string(),
            token_value: value.into(),
        }
    }
}

impl fmt::Debug for SecurityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityToken")
            .field("token_format", &self.token_format)
            .field("token_value", &"<redacted>")
            .finish()
    }
}

/// Input from which one outbound message is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub kind: MessageKind,
    pub recipient: Url,
    pub subject: Option<Url>,
    pub transfer_contract: Option<Url>,
    pub properties: BTreeMap<String, String>,
}

impl MessageDescriptor {
    pub fn new(kind: MessageKind, recipient: Url) -> Self {
        Self {
            kind,
            recipient,
            subject: None,
            transfer_contract: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_subject(mut self, subject: Url) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_transfer_contract(mut self, contract: Option<Url>) -> Self {
        self.transfer_contract = contract;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "@id")]
    pub id: Url,
    #[serde(rename = "@type")]
    pub kind: MessageKind,
    #[serde(rename = "ids:issued", with = "time::serde::rfc3339")]
    pub issued: OffsetDateTime,
    #[serde(rename = "ids:modelVersion")]
    pub model_version: String,
    #[serde(rename = "ids:issuerConnector")]
    pub issuer_connector: Url,
    #[serde(rename = "ids:senderAgent")]
    pub sender_agent: Url,
    #[serde(rename = "ids:securityToken")]
    pub security_token: SecurityToken,
    #[serde(rename = "ids:recipientConnector")]
    pub recipient_connector: Vec<Url>,
    #[serde(rename = "ids:requestedElement", skip_serializing_if = "Option::is_none", default)]
    pub requested_element: Option<Url>,
    #[serde(rename = "ids:requestedArtifact", skip_serializing_if = "Option::is_none", default)]
    pub requested_artifact: Option<Url>,
    #[serde(rename = "ids:transferContract", skip_serializing_if = "Option::is_none", default)]
    pub transfer_contract: Option<Url>,
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

/// One multipart reply: flattened header fields plus the raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header_fields: BTreeMap<String, String>,
    pub body: Bytes,
}

impl Response {
    pub fn new(header_fields: BTreeMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            header_fields,
            body: body.into(),
        }
    }

    pub fn message_type(&self) -> Option<&str> {
        self.header_fields.get(TYPE_FIELD).map(String::as_str)
    }

    pub fn kind(&self) -> Option<MessageKind> {
        self.message_type().and_then(|value| value.parse().ok())
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.header_fields
            .get(REJECTION_REASON_FIELD)
            .map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
