// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The slice of a Secret Network signing client that deployment and migration
//! depend on. Transaction construction, encryption, signing and broadcast all
//! live behind [`ChainClient`]; this crate only sequences calls against it.

mod execute;
mod gas;

pub use execute::{ExecuteResult, execute_contract};
pub use gas::{GasConfig, estimate_gas};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, base64::Base64, serde_as};
use thiserror::Error;

/// Denomination every fee and purchase in this repository is paid in.
pub const USCRT: &str = "uscrt";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
    pub denom: String,
}

impl Coin {
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            amount,
            denom: denom.into(),
        }
    }

    pub fn uscrt(amount: u128) -> Self {
        Self::new(amount, USCRT)
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Messages a deployment may put in a transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    StoreCode {
        sender: String,
        #[serde_as(as = "Base64")]
        wasm_byte_code: Vec<u8>,
    },
    InstantiateContract {
        sender: String,
        code_id: u64,
        code_hash: String,
        init_msg: serde_json::Value,
        label: String,
        admin: Option<String>,
        #[serde(default)]
        init_funds: Vec<Coin>,
    },
    ExecuteContract {
        sender: String,
        contract: String,
        code_hash: String,
        msg: serde_json::Value,
        #[serde(default)]
        sent_funds: Vec<Coin>,
    },
    Send {
        from_address: String,
        to_address: String,
        amount: Vec<Coin>,
    },
}

impl Msg {
    pub fn sender(&self) -> &str {
        match self {
            Msg::StoreCode { sender, .. }
            | Msg::InstantiateContract { sender, .. }
            | Msg::ExecuteContract { sender, .. } => sender,
            Msg::Send { from_address, .. } => from_address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOptions {
    pub gas_limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl TxOptions {
    pub fn with_gas_limit(gas_limit: u64) -> Self {
        Self {
            gas_limit,
            memo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLog {
    pub msg_index: u32,
    pub events: Vec<Event>,
}

/// A transaction that was included in a block and executed successfully.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub tx_hash: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
    pub logs: Vec<TxLog>,
    /// Decrypted message responses, one entry per message in the transaction.
    #[serde_as(as = "Vec<Base64>")]
    #[serde(default)]
    pub data: Vec<Vec<u8>>,
}

impl TxResponse {
    /// First value of `key` across every event of every message.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.logs
            .iter()
            .flat_map(|log| &log.events)
            .flat_map(|event| &event.attributes)
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    /// Value of `key` on the first event of type `kind`.
    pub fn event_attribute(&self, kind: &str, key: &str) -> Option<&str> {
        self.logs
            .iter()
            .flat_map(|log| &log.events)
            .filter(|event| event.kind == kind)
            .flat_map(|event| &event.attributes)
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    pub fn data_for(&self, msg_index: usize) -> Option<&[u8]> {
        self.data.get(msg_index).map(Vec::as_slice)
    }
}

/// An error reported by the signing client. The message is the chain's own text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Rejected at check-tx or failed during execution.
    #[error("{message}")]
    Rejected {
        message: String,
        tx_hash: Option<String>,
        gas_used: Option<u64>,
    },
    /// No answer in time. The transaction may still land.
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("{0}")]
    Query(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl ChainError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ChainError::Rejected {
            message: message.into(),
            tx_hash: None,
            gas_used: None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ChainError::Rejected { message, .. } => message,
            ChainError::Timeout(it) | ChainError::Query(it) | ChainError::Transport(it) => it,
        }
    }
}

/// Consumed interface of the external signing and RPC service.
///
/// Every message names its own sender; the service signs with that account's key.
/// Implementations must serialize transactions per sender, since sequence numbers
/// are assigned by the service and not by callers.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<String, ChainError>;

    /// Dry-runs `msgs` and returns the gas they consumed.
    async fn simulate(&self, msgs: &[Msg]) -> Result<u64, ChainError>;

    async fn broadcast(&self, msgs: Vec<Msg>, options: TxOptions)
    -> Result<TxResponse, ChainError>;

    async fn code_hash_by_code_id(&self, code_id: u64) -> Result<String, ChainError>;

    async fn query_contract_smart(
        &self,
        contract_address: &str,
        code_hash: &str,
        query: &serde_json::Value,
    ) -> Result<serde_json::Value, ChainError>;
}
