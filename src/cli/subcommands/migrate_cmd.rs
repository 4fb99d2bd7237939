// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::Context as _;
use tracing::info;

use super::{DEFAULT_ACCOUNT, Session, stored_code};
use crate::bootstrap::initialize_account_before_execute;
use crate::chain::{ChainClient, GasConfig};
use crate::cli_shared::cli::Config;
use crate::code_store::CodeArtifact;
use crate::contracts::{ContractInfo, ContractKind};
use crate::deployer::ContractInstance;
use crate::key_management::PermitSigner;
use crate::migration::{
    MigrationConfig, MigrationOrchestrator, PaginatedMigrationState, StateVerifier,
};

#[derive(Debug, clap::Args)]
pub struct MigrateCommand {
    /// Contract running at `--address`
    #[arg(long)]
    pub kind: ContractKind,
    /// Address of the running source instance
    #[arg(long)]
    pub address: String,
    /// Code hash of the running source instance
    #[arg(long)]
    pub code_hash: String,
    /// Keystore account of the contract admin
    #[arg(long, default_value = DEFAULT_ACCOUNT)]
    pub account: String,
    /// Treat `--address` as a destination whose token import was interrupted
    /// and continue it
    #[arg(long)]
    pub resume: bool,
    /// Compare this token's dossier before and after migration; repeatable
    #[arg(long = "verify-token")]
    pub verify_tokens: Vec<String>,
}

impl MigrateCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let session = Session::open(config, &self.account).await?;
        let client = &session.client;
        let admin = &session.account;
        initialize_account_before_execute(client, admin.address()).await;

        if self.resume {
            let state = self
                .resume_import(client, &config.gas, &config.migration, admin)
                .await?;
            println!(
                "token import into {} complete after {} calls",
                self.address, state.calls
            );
            return Ok(());
        }

        let (_, code) = stored_code(config, client, session.node, admin.address(), self.kind).await?;
        let destination = self
            .migrate_contract(client, &config.gas, &config.migration, &code, admin)
            .await?;
        println!("{}", destination.info());
        Ok(())
    }

    fn contract(&self) -> ContractInfo {
        ContractInfo::new(self.address.clone(), self.code_hash.clone())
    }

    /// Moves `--address` to a new instance of `code`. With `--verify-token`
    /// the source is captured first and the destination must match it.
    async fn migrate_contract<C, S>(
        &self,
        client: &C,
        gas: &GasConfig,
        migration: &MigrationConfig,
        code: &CodeArtifact,
        admin: &S,
    ) -> anyhow::Result<ContractInstance>
    where
        C: ChainClient + ?Sized,
        S: PermitSigner + ?Sized,
    {
        let source = self.contract();
        let verifier = (self.kind.imports_tokens() && !self.verify_tokens.is_empty())
            .then(|| StateVerifier::new(&migration.permit_name, self.verify_tokens.clone()));
        let before = match &verifier {
            Some(verifier) => Some(
                verifier
                    .capture(client, admin, &source)
                    .await
                    .with_context(|| format!("cannot capture {}", source.address))?,
            ),
            None => None,
        };

        let destination = MigrationOrchestrator::new(client, gas, migration)
            .migrate(&source, code, self.kind, admin)
            .await
            .with_context(|| format!("cannot migrate {}", source.address))?;

        if let (Some(verifier), Some(before)) = (&verifier, &before) {
            let after = verifier
                .capture(client, admin, &destination.info())
                .await?;
            verifier.assert_equivalent(before, &after)?;
            info!(destination = %destination.address, "state verified");
        }
        Ok(destination)
    }

    /// Continues the token import into the destination at `--address`.
    async fn resume_import<C, S>(
        &self,
        client: &C,
        gas: &GasConfig,
        migration: &MigrationConfig,
        admin: &S,
    ) -> anyhow::Result<PaginatedMigrationState>
    where
        C: ChainClient + ?Sized,
        S: PermitSigner + ?Sized,
    {
        anyhow::ensure!(
            self.kind.imports_tokens(),
            "{} has no token import to resume",
            self.kind
        );
        MigrationOrchestrator::new(client, gas, migration)
            .import_tokens(&self.contract(), admin.address())
            .await
            .with_context(|| format!("cannot resume token import into {}", self.address))
    }
}
