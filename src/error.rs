// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::chain::ChainError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by the deployment and migration procedures.
///
/// Chain-originated messages are embedded verbatim: callers classify failures by
/// substring, so the contract's text must survive the call stack untouched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("contract artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),
    #[error("invalid contract artifact {}: {reason}", path.display())]
    InvalidArtifact { path: PathBuf, reason: String },
    #[error("code upload failed: {0}")]
    UploadFailed(String),
    #[error("instantiate failed: {0}")]
    InstantiateFailed(String),
    #[error("execute failed: {0}")]
    ExecuteFailed(String),
    /// The transaction landed but did not emit the attribute we need.
    #[error("transaction {tx_hash} did not emit a `{key}` attribute")]
    MissingAttribute { tx_hash: String, key: &'static str },
    #[error("token migration broke a paging invariant: {0}")]
    PaginationInvariant(String),
    #[error("`{query}` differs after migration\nexpected:\n{expected}\nactual:\n{actual}")]
    VerificationMismatch {
        query: String,
        expected: String,
        actual: String,
    },
    #[error("signing service is on chain {actual}, expected {expected}")]
    ChainIdMismatch { expected: String, actual: String },
    #[error("permit signing failed: {0}")]
    Signing(String),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// The raw chain message carried by a rejected transaction, if any.
    pub fn chain_message(&self) -> Option<&str> {
        match self {
            Error::UploadFailed(it) | Error::InstantiateFailed(it) | Error::ExecuteFailed(it) => {
                Some(it)
            }
            Error::Chain(it) => Some(it.message()),
            _ => None,
        }
    }
}
