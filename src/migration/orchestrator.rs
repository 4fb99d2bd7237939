// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use tracing::{debug, info};

use super::MigrationConfig;
use crate::chain::{ChainClient, GasConfig};
use crate::code_store::CodeArtifact;
use crate::contracts::msg::{
    InstantiateByMigration, InstantiateMsg, MigrateFrom, MigrateTokensInAnswer,
    Snip721ExecuteAnswer,
};
use crate::contracts::{self, ContractInfo, ContractKind};
use crate::deployer::{self, ContractInstance, InstantiateOptions};
use crate::error::{Error, Result};
use crate::key_management::{Permission, Permit, PermitSigner};

/// Everything the destination needs to pull state from the source.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationRequest {
    pub source: ContractInfo,
    pub admin_permit: Permit,
    pub entropy: String,
}

impl MigrationRequest {
    pub fn into_init_msg(self) -> InstantiateMsg<serde_json::Value> {
        InstantiateMsg::Migrate(InstantiateByMigration {
            migrate_from: MigrateFrom {
                address: self.source.address,
                code_hash: self.source.code_hash,
                admin_permit: self.admin_permit,
            },
            entropy: self.entropy,
        })
    }
}

/// Token import progress as reported by the destination contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginatedMigrationState {
    pub complete: bool,
    pub next_index: Option<u32>,
    /// Fixed by the first page that reports it.
    pub total: Option<u32>,
    pub calls: u32,
}

impl PaginatedMigrationState {
    /// Folds one page answer in, rejecting a changed `total` or a cursor that
    /// did not move forward.
    pub fn observe(&mut self, answer: MigrateTokensInAnswer) -> Result<()> {
        self.calls += 1;
        if let Some(total) = answer.total {
            match self.total {
                Some(seen) if seen != total => {
                    return Err(Error::PaginationInvariant(format!(
                        "total changed from {seen} to {total} on call {}",
                        self.calls
                    )));
                }
                _ => self.total = Some(total),
            }
        }
        if let Some(next) = answer.next_mint_index {
            if let Some(prev) = self.next_index
                && next <= prev
            {
                return Err(Error::PaginationInvariant(format!(
                    "cursor did not advance past {prev} on call {}",
                    self.calls
                )));
            }
            if let Some(total) = self.total
                && next > total
            {
                return Err(Error::PaginationInvariant(format!(
                    "cursor {next} is past total {total}"
                )));
            }
            self.next_index = Some(next);
        }
        self.complete = answer.complete;
        Ok(())
    }
}

/// Drives one contract from a running source instance to a running destination.
pub struct MigrationOrchestrator<'a, C: ?Sized> {
    client: &'a C,
    gas: &'a GasConfig,
    config: &'a MigrationConfig,
}

impl<'a, C: ChainClient + ?Sized> MigrationOrchestrator<'a, C> {
    pub fn new(client: &'a C, gas: &'a GasConfig, config: &'a MigrationConfig) -> Self {
        Self {
            client,
            gas,
            config,
        }
    }

    /// Full migration: instantiate the destination from `code`, then import
    /// tokens until the destination reports completion if `kind` holds any.
    pub async fn migrate<S: PermitSigner + ?Sized>(
        &self,
        source: &ContractInfo,
        code: &CodeArtifact,
        kind: ContractKind,
        admin: &S,
    ) -> Result<ContractInstance> {
        let destination = self.start(source, code, kind, admin).await?;
        if kind.imports_tokens() {
            self.import_tokens(&destination.info(), admin.address())
                .await?;
        }
        Ok(destination)
    }

    /// Signs an owner permit for `source` with the admin key. Contracts accept
    /// it as proof that the admin initiated the migration.
    pub async fn request<S: PermitSigner + ?Sized>(
        &self,
        source: &ContractInfo,
        admin: &S,
    ) -> Result<MigrationRequest> {
        let chain_id = self.client.chain_id().await?;
        let admin_permit = admin
            .sign_permit(
                &chain_id,
                &self.config.permit_name,
                vec![source.address.clone()],
                vec![Permission::Owner],
            )
            .await?;
        Ok(MigrationRequest {
            source: source.clone(),
            admin_permit,
            entropy: deployer::fresh_entropy(),
        })
    }

    /// Instantiates the destination with a `migrate` payload. On success the
    /// source is in `MigrateOutStarted` (or already `MigratedOut` for contracts
    /// without tokens to import).
    pub async fn start<S: PermitSigner + ?Sized>(
        &self,
        source: &ContractInfo,
        code: &CodeArtifact,
        kind: ContractKind,
        admin: &S,
    ) -> Result<ContractInstance> {
        let request = self.request(source, admin).await?;
        info!(
            source = %source.address,
            code_id = code.code_id,
            %kind,
            "starting migration"
        );
        let destination = deployer::instantiate(
            self.client,
            self.gas,
            code,
            &request.into_init_msg(),
            InstantiateOptions::new(admin.address(), deployer::random_label(kind.label_base())),
        )
        .await?;
        info!(
            source = %source.address,
            destination = %destination.address,
            "migration instantiated"
        );
        Ok(destination)
    }

    /// Calls `migrate_tokens_in` until the destination reports completion.
    ///
    /// The cursor lives in the contract, so this also resumes an import that
    /// an earlier run left unfinished. A failed call aborts with the chain's
    /// message; nothing is retried.
    pub async fn import_tokens(
        &self,
        destination: &ContractInfo,
        admin: &str,
    ) -> Result<PaginatedMigrationState> {
        let mut state = PaginatedMigrationState::default();
        while state.calls < self.config.max_page_calls {
            let result = contracts::migrate_tokens_in(
                self.client,
                self.gas,
                admin,
                destination,
                self.config.pages_per_call,
                self.config.page_size,
            )
            .await?
            .ok()?;
            let gas_fee = result.gas_fee.clone();
            let Some(Snip721ExecuteAnswer::MigrateTokensIn(answer)) = result.answer else {
                return Err(Error::PaginationInvariant(
                    "migrate_tokens_in returned no progress".into(),
                ));
            };
            state.observe(answer)?;
            debug!(
                contract = %destination.address,
                call = state.calls,
                next_index = ?state.next_index,
                total = ?state.total,
                %gas_fee,
                "imported token page"
            );
            if state.complete {
                info!(
                    contract = %destination.address,
                    calls = state.calls,
                    total = ?state.total,
                    "token import complete"
                );
                return Ok(state);
            }
        }
        Err(Error::PaginationInvariant(format!(
            "token import for {} incomplete after {} calls",
            destination.address, state.calls
        )))
    }
}
