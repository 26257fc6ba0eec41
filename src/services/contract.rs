use std::collections::BTreeSet;

use crate::domains::contract::{Contract, ContractAgreement, ContractRequest};
use crate::error::{ConnectorError, Result};

/// Checks a received agreement against the request it answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContractManager;

impl ContractManager {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_contract_agreement(
        &self,
        raw_agreement: &str,
        request: &ContractRequest,
    ) -> Result<ContractAgreement> {
        let agreement = parse_agreement(raw_agreement)?;
        compare_parties(&agreement, request)?;
        compare_rules(&agreement, request)?;
        compare_window(&agreement, request)?;
        Ok(agreement)
    }
}

pub fn parse_agreement(raw: &str) -> Result<ContractAgreement> {
    if raw.trim().is_empty() {
        return Err(ConnectorError::MalformedAgreement("empty body".to_string()));
    }
    let agreement: Contract = serde_json::from_str(raw)
        .map_err(|e| ConnectorError::MalformedAgreement(e.to_string()))?;
    if let (Some(start), Some(end)) = (agreement.start, agreement.end) {
        if start > end {
            return Err(ConnectorError::MalformedAgreement(
                "contract start is after contract end".to_string(),
            ));
        }
    }
    Ok(agreement)
}

fn compare_parties(agreement: &Contract, request: &Contract) -> Result<()> {
    if agreement.consumer != request.consumer {
        return Err(ConnectorError::AgreementMismatch(format!(
            "consumer {} differs from requested {}",
            agreement.consumer, request.consumer
        )));
    }
    if agreement.provider != request.provider {
        return Err(ConnectorError::AgreementMismatch(format!(
            "provider {} differs from requested {}",
            agreement.provider, request.provider
        )));
    }
    Ok(())
}

fn rule_keys(contract: &Contract) -> BTreeSet<String> {
    contract.rules.iter().map(|rule| rule.content_key()).collect()
}

fn compare_rules(agreement: &Contract, request: &Contract) -> Result<()> {
    let agreed = rule_keys(agreement);
    let requested = rule_keys(request);
    if agreed != requested {
        return Err(ConnectorError::AgreementMismatch(format!(
            "agreement carries {} distinct rule(s) that do not match the {} requested",
            agreed.len(),
            requested.len()
        )));
    }
    Ok(())
}

// An open bound on the agreement side is wider than any requested bound.
fn compare_window(agreement: &Contract, request: &Contract) -> Result<()> {
    if let Some(requested_start) = request.start {
        match agreement.start {
            Some(start) if start >= requested_start => {}
            _ => {
                return Err(ConnectorError::AgreementMismatch(
                    "agreement starts before the requested start".to_string(),
                ))
            }
        }
    }
    if let Some(requested_end) = request.end {
        match agreement.end {
            Some(end) if end <= requested_end => {}
            _ => {
                return Err(ConnectorError::AgreementMismatch(
                    "agreement ends after the requested end".to_string(),
                ))
            }
        }
    }
    Ok(())
}
