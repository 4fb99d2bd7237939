// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Nodes a deployment can target.

use std::str::FromStr;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

use crate::chain::ChainClient;
use crate::error::{Error, Result};

/// Environment variable naming the [`NodeType`] to use.
pub const NODE_TYPE_ENV: &str = "DAPP_NODE_TYPE";
/// When set to [`CI_ENV_ID`], [`NodeType::LocalSecret`] is used regardless of
/// [`NODE_TYPE_ENV`].
pub const TEST_ENV: &str = "TEST_ENV";
pub const CI_ENV_ID: &str = "CI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum NodeType {
    LocalSecret,
    Pulsar2,
    Gitpod,
    Custom,
    Secret4,
}

impl NodeType {
    /// Node type selected by the environment, `fallback` when it names none.
    pub fn from_env_or(fallback: NodeType) -> anyhow::Result<Self> {
        Self::select(
            std::env::var(TEST_ENV).ok().as_deref(),
            std::env::var(NODE_TYPE_ENV).ok().as_deref(),
            fallback,
        )
    }

    fn select(
        test_env: Option<&str>,
        node_type: Option<&str>,
        fallback: NodeType,
    ) -> anyhow::Result<Self> {
        if test_env == Some(CI_ENV_ID) {
            return Ok(NodeType::LocalSecret);
        }
        match node_type {
            Some(it) => NodeType::from_str(it)
                .with_context(|| format!("unknown node type {it} in {NODE_TYPE_ENV}")),
            None => Ok(fallback),
        }
    }
}

/// Connection details of one node. The variant is the `type` tag in config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeInfo {
    LocalSecret {
        chain_id: String,
        grpc_gateway_endpoint: String,
        faucet_address_endpoint: String,
    },
    Pulsar2 {
        chain_id: String,
        grpc_gateway_endpoint: String,
        faucet_address_endpoint: String,
    },
    /// A LocalSecret running in a Gitpod workspace; endpoints follow from the id.
    Gitpod { chain_id: String, gitpod_id: String },
    Custom {
        chain_id: String,
        grpc_gateway_endpoint: String,
        faucet_address_endpoint: String,
    },
    /// Mainnet. There is no faucet.
    Secret4 {
        chain_id: String,
        grpc_gateway_endpoint: String,
    },
}

impl Default for NodeInfo {
    fn default() -> Self {
        NodeInfo::LocalSecret {
            chain_id: "secretdev-1".into(),
            grpc_gateway_endpoint: "http://localhost:1317".into(),
            faucet_address_endpoint: "http://localhost:5000/faucet?address=".into(),
        }
    }
}

impl NodeInfo {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeInfo::LocalSecret { .. } => NodeType::LocalSecret,
            NodeInfo::Pulsar2 { .. } => NodeType::Pulsar2,
            NodeInfo::Gitpod { .. } => NodeType::Gitpod,
            NodeInfo::Custom { .. } => NodeType::Custom,
            NodeInfo::Secret4 { .. } => NodeType::Secret4,
        }
    }

    pub fn chain_id(&self) -> &str {
        match self {
            NodeInfo::LocalSecret { chain_id, .. }
            | NodeInfo::Pulsar2 { chain_id, .. }
            | NodeInfo::Gitpod { chain_id, .. }
            | NodeInfo::Custom { chain_id, .. }
            | NodeInfo::Secret4 { chain_id, .. } => chain_id,
        }
    }

    pub fn grpc_gateway_endpoint(&self) -> String {
        match self {
            NodeInfo::LocalSecret {
                grpc_gateway_endpoint,
                ..
            }
            | NodeInfo::Pulsar2 {
                grpc_gateway_endpoint,
                ..
            }
            | NodeInfo::Custom {
                grpc_gateway_endpoint,
                ..
            }
            | NodeInfo::Secret4 {
                grpc_gateway_endpoint,
                ..
            } => grpc_gateway_endpoint.clone(),
            NodeInfo::Gitpod { gitpod_id, .. } => format!("https://1317-{gitpod_id}.gitpod.io"),
        }
    }

    /// Faucet URL prefix; the account address is appended to it.
    pub fn faucet_address_endpoint(&self) -> Option<String> {
        match self {
            NodeInfo::LocalSecret {
                faucet_address_endpoint,
                ..
            }
            | NodeInfo::Pulsar2 {
                faucet_address_endpoint,
                ..
            }
            | NodeInfo::Custom {
                faucet_address_endpoint,
                ..
            } => Some(faucet_address_endpoint.clone()),
            NodeInfo::Gitpod { gitpod_id, .. } => {
                Some(format!("https://5000-{gitpod_id}.gitpod.io/faucet?address="))
            }
            NodeInfo::Secret4 { .. } => None,
        }
    }

    /// First node of type `node_type` in `nodes`.
    pub fn select(nodes: &[NodeInfo], node_type: NodeType) -> anyhow::Result<&NodeInfo> {
        nodes
            .iter()
            .find(|it| it.node_type() == node_type)
            .with_context(|| format!("no {node_type} node configured"))
    }

    /// Fails unless the signing service is connected to this node's chain.
    pub async fn check_chain_id<C: ChainClient + ?Sized>(&self, client: &C) -> Result<()> {
        let actual = client.chain_id().await?;
        if actual != self.chain_id() {
            return Err(Error::ChainIdMismatch {
                expected: self.chain_id().to_owned(),
                actual,
            });
        }
        info!(chain_id = %actual, node_type = %self.node_type(), "connected");
        Ok(())
    }
}
