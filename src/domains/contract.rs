use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use url::Url;
use uuid::Uuid;

/// A usage rule. Only `value` is content; `id` and `title` identify the rule
/// on one side of the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Url>,
    #[serde(rename = "ids:title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "ids:value")]
    pub value: Value,
}

impl Rule {
    pub fn new(value: Value) -> Self {
        Self {
            id: None,
            title: None,
            value,
        }
    }

    /// Canonical form of the rule content; object keys come out sorted.
    pub fn content_key(&self) -> String {
        self.value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(rename = "@id")]
    pub id: Url,
    #[serde(rename = "ids:consumer")]
    pub consumer: Url,
    #[serde(rename = "ids:provider")]
    pub provider: Url,
    #[serde(
        rename = "ids:contractStart",
        with = "time::serde::rfc3339::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<OffsetDateTime>,
    #[serde(
        rename = "ids:contractEnd",
        with = "time::serde::rfc3339::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<OffsetDateTime>,
    #[serde(rename = "ids:rules", default)]
    pub rules: Vec<Rule>,
}

pub type ContractRequest = Contract;
pub type ContractAgreement = Contract;

/// Locally stored agreement as handed out by the agreement repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: Uuid,
    pub remote_id: Url,
    pub value: String,
}
