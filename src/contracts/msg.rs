// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! JSON messages understood by the dealer and migratable SNIP-721 contracts.
//!
//! Variants with no fields are written as `Foo {}` so they serialize to
//! `{"foo":{}}`, the shape the contracts expect.

use serde::{Deserialize, Serialize};

use super::ContractInfo;
use crate::chain::Coin;
use crate::key_management::Permit;

/// Instantiate payload shared by both contracts: either a fresh instance or one
/// importing its state from an existing contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstantiateMsg<T> {
    Migrate(InstantiateByMigration),
    New(T),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantiateByMigration {
    pub migrate_from: MigrateFrom,
    /// Single-use randomness mixed into the migration secret.
    pub entropy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrateFrom {
    pub address: String,
    pub code_hash: String,
    /// Owner permit for `address`, signed by its admin.
    pub admin_permit: Permit,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<serde_json::Value>,
}

impl Metadata {
    pub fn uri(token_uri: impl Into<String>) -> Self {
        Self {
            token_uri: Some(token_uri.into()),
            extension: None,
        }
    }
}

/// Fresh dealer: it instantiates its own child SNIP-721 from the given code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerInstantiate {
    pub snip721_code_hash: String,
    pub snip721_code_id: u64,
    pub snip721_label: String,
    pub prices: Vec<Coin>,
    pub public_metadata: Option<Metadata>,
    pub private_metadata: Option<Metadata>,
    pub admin: Option<String>,
    pub entropy: String,
    #[serde(default)]
    pub royalty_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealerExecuteMsg {
    PurchaseMint {},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealerQueryMsg {
    GetPrices {},
    GetChildSnip721 {},
}

/// Queries every migratable contract answers, in any mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationQuery {
    MigratedFrom {},
    MigratedTo {},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationInfoAnswer {
    pub migration_info: Option<ContractInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricesAnswer {
    pub get_prices: Prices,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prices {
    pub prices: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfoAnswer {
    pub contract_info: ContractInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Snip721ExecuteMsg {
    TransferNft {
        recipient: String,
        token_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        memo: Option<String>,
    },
    /// Pulls the next pages of tokens from the contract being migrated from.
    MigrateTokensIn {
        /// Number of pages to pull in this call; the contract default is all.
        pages: Option<u32>,
        /// Tokens requested per page. The source may return fewer.
        page_size: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Snip721ExecuteAnswer {
    MigrateTokensIn(MigrateTokensInAnswer),
}

/// Progress reported after each `migrate_tokens_in` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MigrateTokensInAnswer {
    pub complete: bool,
    pub next_mint_index: Option<u32>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Snip721QueryMsg {
    ContractInfo {},
    ContractConfig {},
    NumTokens {},
    Minters {},
    WithPermit {
        permit: Permit,
        query: QueryWithPermit,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryWithPermit {
    NumTokensOfOwner {
        owner: String,
    },
    BatchNftDossier {
        token_ids: Vec<String>,
    },
    TransactionHistory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page_size: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumTokensAnswer {
    pub num_tokens: Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintersAnswer {
    pub minters: Minters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minters {
    pub minters: Vec<String>,
}
