// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::BTreeMap;

use serde_json::Value;
use strum::{Display, EnumString};

use crate::chain::ChainClient;
use crate::contracts::{self, ContractInfo};
use crate::error::{Error, Result};
use crate::key_management::PermitSigner;

/// Dossier fields that legitimately change when tokens are re-minted into a
/// new instance: the creators become the new contract's and the timestamp is
/// the import block's.
pub const DEFAULT_IGNORED_FIELDS: [&str; 3] = [
    "mint_run_info.collection_creator",
    "mint_run_info.token_creator",
    "mint_run_info.time_of_minting",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum VerifyQuery {
    ContractInfo,
    ContractConfig,
    NumTokens,
    Minters,
    BatchNftDossier,
    TransactionHistory,
}

/// Which queries to compare and which fields to disregard.
///
/// Transaction history is not compared by default: imported tokens are
/// recorded as fresh mints by the destination.
#[derive(Debug, Clone)]
pub struct StateVerifier {
    pub queries: Vec<VerifyQuery>,
    pub ignored_fields: Vec<String>,
    /// Tokens whose dossiers are compared.
    pub token_ids: Vec<String>,
    pub permit_name: String,
}

impl StateVerifier {
    pub fn new(permit_name: impl Into<String>, token_ids: Vec<String>) -> Self {
        Self {
            queries: vec![
                VerifyQuery::ContractInfo,
                VerifyQuery::ContractConfig,
                VerifyQuery::NumTokens,
                VerifyQuery::Minters,
                VerifyQuery::BatchNftDossier,
            ],
            ignored_fields: DEFAULT_IGNORED_FIELDS.map(String::from).to_vec(),
            token_ids,
            permit_name: permit_name.into(),
        }
    }

    /// Runs every configured query against `contract`. Permit queries are
    /// signed by `viewer`.
    pub async fn capture<C, S>(
        &self,
        client: &C,
        viewer: &S,
        contract: &ContractInfo,
    ) -> Result<StateSnapshot>
    where
        C: ChainClient + ?Sized,
        S: PermitSigner + ?Sized,
    {
        let mut answers = BTreeMap::new();
        for query in &self.queries {
            let answer = match query {
                VerifyQuery::ContractInfo => contracts::query_contract_info(client, contract).await?,
                VerifyQuery::ContractConfig => {
                    contracts::query_contract_config(client, contract).await?
                }
                VerifyQuery::NumTokens => contracts::query_num_tokens(client, contract).await?.into(),
                VerifyQuery::Minters => {
                    serde_json::to_value(contracts::query_minters(client, contract).await?)?
                }
                VerifyQuery::BatchNftDossier => {
                    contracts::query_batch_nft_dossier(
                        client,
                        viewer,
                        &self.permit_name,
                        contract,
                        self.token_ids.clone(),
                    )
                    .await?
                }
                VerifyQuery::TransactionHistory => {
                    contracts::query_transaction_history(
                        client,
                        viewer,
                        &self.permit_name,
                        contract,
                    )
                    .await?
                }
            };
            answers.insert(*query, answer);
        }
        Ok(StateSnapshot {
            contract: contract.clone(),
            answers,
        })
    }

    /// Compares two snapshots query by query, modulo the ignored fields.
    pub fn assert_equivalent(&self, expected: &StateSnapshot, actual: &StateSnapshot) -> Result<()> {
        for (query, expected_answer) in &expected.answers {
            let actual_answer = actual.answers.get(query).unwrap_or(&Value::Null);
            let mut expected_answer = expected_answer.clone();
            let mut actual_answer = actual_answer.clone();
            for path in &self.ignored_fields {
                strip_ignored(&mut expected_answer, path);
                strip_ignored(&mut actual_answer, path);
            }
            if expected_answer != actual_answer {
                return Err(Error::VerificationMismatch {
                    query: query.to_string(),
                    expected: serde_json::to_string_pretty(&expected_answer)?,
                    actual: serde_json::to_string_pretty(&actual_answer)?,
                });
            }
        }
        Ok(())
    }
}

/// Query answers of one contract at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub contract: ContractInfo,
    pub answers: BTreeMap<VerifyQuery, Value>,
}

/// Removes every field matching the dotted `path`, wherever it appears.
///
/// The path matches by suffix and arrays are transparent, so
/// `mint_run_info.token_creator` hits
/// `batch_nft_dossier.nft_dossiers[*].mint_run_info.token_creator`.
pub fn strip_ignored(value: &mut Value, path: &str) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((field, parents)) = segments.split_last() else {
        return;
    };
    strip_at(value, field, parents, &mut Vec::new());
}

fn strip_at(value: &mut Value, field: &str, parents: &[&str], trail: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if ends_with(trail, parents) {
                map.remove(field);
            }
            for (key, child) in map.iter_mut() {
                trail.push(key.clone());
                strip_at(child, field, parents, trail);
                trail.pop();
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_at(item, field, parents, trail);
            }
        }
        _ => {}
    }
}

fn ends_with(trail: &[String], suffix: &[&str]) -> bool {
    trail.len() >= suffix.len()
        && trail[trail.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}
