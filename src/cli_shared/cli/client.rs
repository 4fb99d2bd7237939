// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{path::PathBuf, time::Duration};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::contracts::ContractKind;
use crate::rpc_client::{API_INFO_KEY, ApiInfo, DEFAULT_TIMEOUT};

/// Environment variable overriding [`Client::artifact_dir`].
pub const CONTRACT_PATH_ENV: &str = "CONTRACT_PATH";

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Client {
    /// Root of the uploaded code cache.
    pub deployed_dir: PathBuf,
    /// Contract crates, one directory per contract holding its `Cargo.toml`.
    pub contracts_dir: PathBuf,
    /// Directory of optimized `.wasm.gz` builds. Defaults to `contracts_dir`.
    pub artifact_dir: Option<PathBuf>,
    /// JSON file of named accounts.
    pub keystore: PathBuf,
    /// Signing service, `[token:]url`.
    pub api_info: Option<String>,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub rpc_timeout: Duration,
}

impl Default for Client {
    fn default() -> Self {
        let keystore = ProjectDirs::from("io", "ChainSafe", "secret-dapp-deploy")
            .map(|dirs| dirs.data_dir().join("keystore.json"))
            .unwrap_or_else(|| PathBuf::from("keystore.json"));
        Self {
            deployed_dir: "deployed".into(),
            contracts_dir: "contracts".into(),
            artifact_dir: None,
            keystore,
            api_info: None,
            rpc_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Client {
    pub fn artifact_dir(&self) -> PathBuf {
        std::env::var_os(CONTRACT_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| self.artifact_dir.clone())
            .unwrap_or_else(|| self.contracts_dir.clone())
    }

    pub fn artifact_path(&self, kind: ContractKind) -> PathBuf {
        self.artifact_dir().join(kind.artifact_file_name())
    }

    pub fn manifest_path(&self, kind: ContractKind) -> PathBuf {
        self.contracts_dir
            .join(kind.crate_name())
            .join("Cargo.toml")
    }

    /// [`API_INFO_KEY`] takes precedence over the configured value.
    pub fn api_info(&self) -> anyhow::Result<ApiInfo> {
        match (&self.api_info, std::env::var_os(API_INFO_KEY)) {
            (Some(configured), None) => configured.parse(),
            _ => ApiInfo::from_env(),
        }
    }
}
