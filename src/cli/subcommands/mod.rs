// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod config_cmd;
mod migrate_cmd;
mod store_cmd;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;

pub(super) use self::{
    config_cmd::ConfigCommands, migrate_cmd::MigrateCommand, store_cmd::StoreCommand,
};
use crate::chain::ChainClient;
use crate::cli_shared::cli::{CliOpts, Config};
use crate::code_store::{self, CodeArtifact, CodeKey, CodeStore};
use crate::contracts::ContractKind;
use crate::key_management::{KeyStore, LocalKey};
use crate::networks::NodeInfo;
use crate::rpc_client::RpcClient;

/// Keystore account used when `--account` is not given.
pub(super) const DEFAULT_ACCOUNT: &str = "admin";

/// Deploys the snip721 dealer and migratable snip721 contracts and moves
/// running instances to new code.
#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), bin_name = "dapp-deploy", author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[command(flatten)]
    pub opts: CliOpts,
    #[command(subcommand)]
    pub cmd: Subcommand,
}

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Upload contract code the selected node does not have yet
    Store(StoreCommand),

    /// Migrate a running contract to a new instance
    Migrate(MigrateCommand),

    /// Inspect the configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// An open connection to the signing service, checked to serve the selected
/// node's chain.
pub(super) struct Session<'a> {
    pub client: RpcClient,
    pub node: &'a NodeInfo,
    pub account: LocalKey,
}

impl<'a> Session<'a> {
    pub async fn open(config: &'a Config, account: &str) -> anyhow::Result<Self> {
        let node = config.node()?;
        let keystore = KeyStore::load(&config.client.keystore).with_context(|| {
            format!(
                "cannot load keystore {}",
                config.client.keystore.display()
            )
        })?;
        let account = keystore.signer(account)?;
        let api_info = config.client.api_info()?;
        let client = RpcClient::connect(&api_info, config.client.rpc_timeout)
            .await
            .with_context(|| format!("cannot reach signing service at {}", api_info.url))?;
        node.check_chain_id(&client).await?;
        Ok(Self {
            client,
            node,
            account,
        })
    }
}

/// Stores `kind` at the version its manifest declares, reusing an earlier
/// upload to the same node.
pub(super) async fn stored_code<C: ChainClient + ?Sized>(
    config: &Config,
    client: &C,
    node: &NodeInfo,
    uploader: &str,
    kind: ContractKind,
) -> anyhow::Result<(semver::Version, CodeArtifact)> {
    let manifest = config.client.manifest_path(kind);
    let version = code_store::read_manifest_version(&manifest)
        .with_context(|| format!("cannot read version of {kind}"))?;
    let contract_name = kind.crate_name();
    let node_type = node.node_type().to_string();
    let artifact = CodeStore::new(&config.client.deployed_dir)
        .get_or_store_code(
            client,
            &config.gas,
            uploader,
            &config.client.artifact_path(kind),
            &CodeKey {
                contract_name: &contract_name,
                version: &version,
                node_type: &node_type,
            },
        )
        .await?;
    info!(%kind, %version, code_id = artifact.code_id, code_hash = %artifact.code_hash, "code ready");
    Ok((version, artifact))
}
