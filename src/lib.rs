// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Deployment and migration tooling for the snip721 dealer and migratable
//! snip721 contracts on Secret Network.
//!
//! Code is uploaded once per contract version and node ([`code_store`]),
//! instances are created with [`deployer`], and running instances move to new
//! code through [`migration`], which also checks that the destination answers
//! queries the way the source did. The chain itself is reached through the
//! [`chain::ChainClient`] trait; [`rpc_client`] implements it against a signing
//! service.

pub mod bootstrap;
pub mod chain;
mod cli;
mod cli_shared;
pub mod code_store;
pub mod contracts;
pub mod deployer;
mod error;
pub mod key_management;
pub mod migration;
pub mod networks;
pub mod rpc_client;
#[cfg(test)]
mod test_utils;
mod utils;

/// These items are semver-exempt, and exist for doctests only
#[doc(hidden)]
pub mod doctest_private {
    pub use crate::utils::io::read_toml;
}

pub use cli::main::main as dapp_deploy_main;
pub use cli_shared::cli::{Client, Config};
pub use error::{Error, Result};
