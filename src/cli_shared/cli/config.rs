// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use itertools::Itertools as _;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use tracing_subscriber::filter::LevelFilter;

use super::client::Client;
use crate::chain::GasConfig;
use crate::migration::MigrationConfig;
use crate::networks::{NodeInfo, NodeType};

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct LogConfig {
    pub filters: Vec<LogValue>,
}

impl LogConfig {
    pub(in crate::cli_shared) fn to_filter_string(&self) -> String {
        self.filters
            .iter()
            .map(|f| format!("{}={}", f.module, f.level))
            .join(",")
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filters: vec![
                LogValue::new("hyper", LevelFilter::WARN),
                LogValue::new("jsonrpsee", LevelFilter::WARN),
                LogValue::new("soketto", LevelFilter::ERROR),
            ],
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct LogValue {
    pub module: String,
    #[serde_as(as = "DisplayFromStr")]
    pub level: LevelFilter,
}

impl LogValue {
    pub fn new(module: &str, level: LevelFilter) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, smart_default::SmartDefault)]
#[serde(default)]
pub struct Config {
    /// Node used when the environment does not name one.
    pub node_type: Option<NodeType>,
    pub client: Client,
    pub gas: GasConfig,
    pub migration: MigrationConfig,
    #[default(vec![NodeInfo::default()])]
    pub nodes: Vec<NodeInfo>,
    pub log: LogConfig,
}

impl Config {
    /// The node to deploy to. `DAPP_NODE_TYPE` and `TEST_ENV` override
    /// `node_type`, which in turn defaults to a local node.
    pub fn node(&self) -> anyhow::Result<&NodeInfo> {
        let node_type = NodeType::from_env_or(self.node_type.unwrap_or(NodeType::LocalSecret))?;
        NodeInfo::select(&self.nodes, node_type)
    }
}
