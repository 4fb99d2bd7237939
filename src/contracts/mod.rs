// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The two contracts this tooling deploys, their wire messages and typed calls.

mod dealer;
pub mod msg;
mod snip721;

pub use dealer::{purchase_mint, query_child_snip721, query_prices};
pub use snip721::{
    migrate_tokens_in, query_batch_nft_dossier, query_contract_config, query_contract_info,
    query_minters, query_num_tokens, query_num_tokens_of_owner, query_transaction_history,
    transfer_nft,
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{Display, EnumIter, EnumString};

use crate::chain::ChainClient;
use crate::error::Result;

/// Address and code hash of a live contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractInfo {
    pub address: String,
    #[serde(default)]
    pub code_hash: String,
}

impl ContractInfo {
    pub fn new(address: impl Into<String>, code_hash: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            code_hash: code_hash.into(),
        }
    }
}

impl std::fmt::Display for ContractInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.address, self.code_hash)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContractKind {
    /// Sells mints of its child SNIP-721 for a fixed price.
    Snip721Dealer,
    Snip721Migratable,
}

impl ContractKind {
    /// Crate directory under the contracts root, also the cache directory name.
    pub fn crate_name(self) -> String {
        self.to_string()
    }

    /// File name of the optimized, gzipped build output.
    pub fn artifact_file_name(self) -> String {
        format!("{}.wasm.gz", self.crate_name().replace('-', "_"))
    }

    pub fn label_base(self) -> &'static str {
        match self {
            ContractKind::Snip721Dealer => "Snip721Dealer",
            ContractKind::Snip721Migratable => "Snip721Migratable",
        }
    }

    /// Whether a destination instance still has to pull tokens in pages after the
    /// migrate instantiate. The dealer holds no tokens and is live right away.
    pub fn imports_tokens(self) -> bool {
        match self {
            ContractKind::Snip721Dealer => false,
            ContractKind::Snip721Migratable => true,
        }
    }
}

/// Runs a smart query and decodes its answer.
pub async fn query<C, Q, A>(client: &C, contract: &ContractInfo, query: &Q) -> Result<A>
where
    C: ChainClient + ?Sized,
    Q: Serialize + ?Sized,
    A: DeserializeOwned,
{
    let query = serde_json::to_value(query)?;
    let answer = client
        .query_contract_smart(&contract.address, &contract.code_hash, &query)
        .await?;
    Ok(serde_json::from_value(answer)?)
}

/// Where `contract` was migrated from, if it was created by migration.
pub async fn query_migrated_from<C: ChainClient + ?Sized>(
    client: &C,
    contract: &ContractInfo,
) -> Result<Option<ContractInfo>> {
    let answer: msg::MigrationInfoAnswer =
        query(client, contract, &msg::MigrationQuery::MigratedFrom {}).await?;
    Ok(answer.migration_info)
}

/// Where `contract` was migrated to, once a migration has started.
pub async fn query_migrated_to<C: ChainClient + ?Sized>(
    client: &C,
    contract: &ContractInfo,
) -> Result<Option<ContractInfo>> {
    let answer: msg::MigrationInfoAnswer =
        query(client, contract, &msg::MigrationQuery::MigratedTo {}).await?;
    Ok(answer.migration_info)
}
