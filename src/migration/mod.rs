// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Moving a running contract to a new instance and checking nothing was lost.
//!
//! Contracts here migrate by instantiating a new address that pulls state from
//! the old one. The source goes `Running -> MigrateOutStarted -> MigratedOut`
//! and the destination `MigrateDataIn -> Running`. Those transitions happen on
//! chain; this module only issues the calls that trigger them.

mod orchestrator;
mod verifier;

pub use orchestrator::{MigrationOrchestrator, MigrationRequest, PaginatedMigrationState};
pub use verifier::{
    DEFAULT_IGNORED_FIELDS, StateSnapshot, StateVerifier, VerifyQuery, strip_ignored,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, smart_default::SmartDefault)]
#[serde(default)]
pub struct MigrationConfig {
    /// Application tag carried in every permit this tool signs.
    #[default("test".to_string())]
    pub permit_name: String,
    /// Tokens per page; the contract picks when unset.
    pub page_size: Option<u32>,
    /// Pages per `migrate_tokens_in` call; the contract imports everything left
    /// when unset.
    pub pages_per_call: Option<u32>,
    /// Upper bound on `migrate_tokens_in` calls for one migration.
    #[default(1_000)]
    pub max_page_calls: u32,
}
