// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Creating contract instances from stored code.

use rand::Rng as _;
use serde::Serialize;
use tracing::info;

use crate::chain::{ChainClient, ChainError, GasConfig, Msg, TxOptions};
use crate::code_store::CodeArtifact;
use crate::contracts::ContractInfo;
use crate::error::{Error, Result};

const ENTROPY_PREFIX: &str = "sometimes you gotta close a door to open a window: ";

/// A freshly instantiated contract together with the code it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInstance {
    pub address: String,
    pub code: CodeArtifact,
}

impl ContractInstance {
    pub fn info(&self) -> ContractInfo {
        ContractInfo::new(self.address.clone(), self.code.code_hash.clone())
    }
}

/// Parameters of one instantiate transaction besides the code and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiateOptions {
    pub sender: String,
    pub label: String,
    pub admin: Option<String>,
    /// Skips simulation when set.
    pub gas_limit: Option<u64>,
}

impl InstantiateOptions {
    pub fn new(sender: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            label: label.into(),
            admin: None,
            gas_limit: None,
        }
    }
}

/// Instantiates `code` with `init_msg`, passed through untouched.
///
/// Rejections keep the chain's own message in [`Error::InstantiateFailed`] so
/// callers can tell an authorization denial from any other failure.
pub async fn instantiate<C, T>(
    client: &C,
    gas: &GasConfig,
    code: &CodeArtifact,
    init_msg: &T,
    options: InstantiateOptions,
) -> Result<ContractInstance>
where
    C: ChainClient + ?Sized,
    T: Serialize + ?Sized,
{
    let InstantiateOptions {
        sender,
        label,
        admin,
        gas_limit,
    } = options;
    let msgs = vec![Msg::InstantiateContract {
        sender,
        code_id: code.code_id,
        code_hash: code.code_hash.clone(),
        init_msg: serde_json::to_value(init_msg)?,
        label: label.clone(),
        admin,
        init_funds: vec![],
    }];
    let gas_limit = match gas_limit {
        Some(limit) => limit,
        None => gas.limit_for(client, &msgs, gas.fallback_limit).await,
    };
    let response = client
        .broadcast(msgs, TxOptions::with_gas_limit(gas_limit))
        .await
        .map_err(|e| match e {
            ChainError::Rejected { message, .. } => Error::InstantiateFailed(message),
            other => Error::InstantiateFailed(other.to_string()),
        })?;
    let address = response
        .event_attribute("wasm", "contract_address")
        .or_else(|| response.attribute("contract_address"))
        .ok_or_else(|| Error::MissingAttribute {
            tx_hash: response.tx_hash.clone(),
            key: "contract_address",
        })?
        .to_owned();
    info!(
        %label,
        code_id = code.code_id,
        contract_address = %address,
        "instantiated contract"
    );
    Ok(ContractInstance {
        address,
        code: code.clone(),
    })
}

/// `base` followed by a random number, since labels must be unique on chain.
pub fn random_label(base: &str) -> String {
    let n: f64 = rand::thread_rng().r#gen::<f64>() * 1_000_000.0;
    format!("{base}{}", n.ceil() as u64)
}

/// Single-use entropy for instantiate payloads.
pub fn fresh_entropy() -> String {
    let n: f64 = rand::thread_rng().r#gen();
    format!("{ENTROPY_PREFIX}{n}")
}
