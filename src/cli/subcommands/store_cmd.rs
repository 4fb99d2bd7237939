// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::BTreeMap;

use serde::Serialize;
use strum::IntoEnumIterator as _;

use super::{DEFAULT_ACCOUNT, Session, stored_code};
use crate::cli_shared::cli::Config;
use crate::contracts::ContractKind;
use crate::key_management::PermitSigner as _;

#[derive(Debug, clap::Args)]
pub struct StoreCommand {
    /// Keystore account that pays for the uploads
    #[arg(long, default_value = DEFAULT_ACCOUNT)]
    pub account: String,
    /// Store only this contract
    #[arg(long)]
    pub kind: Option<ContractKind>,
}

#[derive(Debug, Serialize)]
struct StoredCode {
    version: String,
    code_id: u64,
    code_hash: String,
}

impl StoreCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let session = Session::open(config, &self.account).await?;
        let kinds: Vec<ContractKind> = match self.kind {
            Some(kind) => vec![kind],
            None => ContractKind::iter().collect(),
        };
        let mut stored = BTreeMap::new();
        for kind in kinds {
            let (version, code) = stored_code(
                config,
                &session.client,
                session.node,
                session.account.address(),
                kind,
            )
            .await?;
            stored.insert(
                kind.to_string(),
                StoredCode {
                    version: version.to_string(),
                    code_id: code.code_id,
                    code_hash: code.code_hash,
                },
            );
        }
        println!("{}", serde_json::to_string_pretty(&stored)?);
        Ok(())
    }
}
