use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::domains::contract::{ContractAgreement, ContractRequest};
use crate::domains::message::Response;
use crate::error::{ConnectorError, Result};
use crate::services::contract::ContractManager;
use crate::services::message::MessageService;

// Stages of one negotiation run. Each step consumes the previous stage and
// returns the next one, so a failed step leaves nothing half-updated behind.

#[derive(Debug, Clone)]
pub struct NegotiationRequest {
    pub recipient: Url,
    pub request: ContractRequest,
}

#[derive(Debug, Clone)]
pub struct RequestSent {
    pub recipient: Url,
    pub request: ContractRequest,
    pub response: Response,
}

#[derive(Debug, Clone)]
pub struct AgreementReceived {
    pub recipient: Url,
    pub request: ContractRequest,
    pub raw_agreement: String,
}

#[derive(Debug, Clone)]
pub struct AgreementValidated {
    pub recipient: Url,
    pub request: ContractRequest,
    pub raw_agreement: String,
    pub agreement: ContractAgreement,
    pub confirmed: bool,
}

/// What a successful run hands to the persistence stage.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationOutcome {
    pub recipient: Url,
    pub request: ContractRequest,
    pub agreement: ContractAgreement,
    pub raw_agreement: String,
    pub confirmed: bool,
}

pub struct NegotiationPipeline {
    messages: Arc<MessageService>,
    contracts: ContractManager,
    confirm_agreement: bool,
}

impl NegotiationPipeline {
    pub fn new(messages: Arc<MessageService>, contracts: ContractManager) -> Self {
        Self {
            messages,
            contracts,
            confirm_agreement: false,
        }
    }

    pub fn with_confirmation(mut self, confirm_agreement: bool) -> Self {
        self.confirm_agreement = confirm_agreement;
        self
    }

    pub async fn run(&self, recipient: Url, request: ContractRequest) -> Result<NegotiationOutcome> {
        let stage = NegotiationRequest { recipient, request };
        let sent = self.send_request(stage).await?;
        let received = extract_agreement(sent)?;
        let mut validated = validate(&self.contracts, received)?;
        if self.confirm_agreement {
            validated = self.confirm(validated).await?;
        }
        let outcome = publish(validated);
        info!(
            agreement = %outcome.agreement.id,
            recipient = %outcome.recipient,
            confirmed = outcome.confirmed,
            "contract agreement accepted"
        );
        Ok(outcome)
    }

    pub async fn send_request(&self, stage: NegotiationRequest) -> Result<RequestSent> {
        if stage.request.rules.is_empty() {
            return Err(ConnectorError::InvalidDescriptor(
                "contract request carries no rules".to_string(),
            ));
        }
        let response = self
            .messages
            .request_contract(&stage.recipient, &stage.request)
            .await?;
        Ok(RequestSent {
            recipient: stage.recipient,
            request: stage.request,
            response,
        })
    }

    pub async fn confirm(&self, stage: AgreementValidated) -> Result<AgreementValidated> {
        self.messages
            .send_agreement(&stage.recipient, &stage.agreement)
            .await?;
        debug!(agreement = %stage.agreement.id, "agreement confirmed by provider");
        Ok(AgreementValidated {
            confirmed: true,
            ..stage
        })
    }
}

pub fn extract_agreement(stage: RequestSent) -> Result<AgreementReceived> {
    let raw_agreement = String::from_utf8(stage.response.body.to_vec())
        .map_err(|e| ConnectorError::MalformedAgreement(e.to_string()))?;
    if raw_agreement.trim().is_empty() {
        return Err(ConnectorError::MalformedAgreement(
            "contract agreement response has no payload".to_string(),
        ));
    }
    Ok(AgreementReceived {
        recipient: stage.recipient,
        request: stage.request,
        raw_agreement,
    })
}

pub fn validate(contracts: &ContractManager, stage: AgreementReceived) -> Result<AgreementValidated> {
    let agreement = contracts.validate_contract_agreement(&stage.raw_agreement, &stage.request)?;
    Ok(AgreementValidated {
        recipient: stage.recipient,
        request: stage.request,
        raw_agreement: stage.raw_agreement,
        agreement,
        confirmed: false,
    })
}

pub fn publish(stage: AgreementValidated) -> NegotiationOutcome {
    NegotiationOutcome {
        recipient: stage.recipient,
        request: stage.request,
        agreement: stage.agreement,
        raw_agreement: stage.raw_agreement,
        confirmed: stage.confirmed,
    }
}
