// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Upload-once bookkeeping for contract bytecode.
//!
//! Every `(contract, version, node type)` triple maps to one uploaded code
//! artifact, recorded at `<deployed>/<contract>/v<version>/<node type>.json`.
//! A hit skips the chain entirely.

use std::{
    io::Read as _,
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::{ChainClient, ChainError, GasConfig, Msg, TxOptions};
use crate::error::{Error, Result};
use crate::utils::io::write_json_atomic;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const WASM_MAGIC: [u8; 4] = *b"\0asm";

/// Uploaded, immutable contract bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeArtifact {
    pub code_id: u64,
    pub code_hash: String,
}

/// Identifies one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeKey<'a> {
    pub contract_name: &'a str,
    pub version: &'a semver::Version,
    pub node_type: &'a str,
}

/// Local record of uploaded code, rooted at a `deployed` directory.
#[derive(Debug, Clone)]
pub struct CodeStore {
    root: PathBuf,
}

impl CodeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn cache_path(&self, key: &CodeKey<'_>) -> PathBuf {
        self.root
            .join(key.contract_name)
            .join(format!("v{}", key.version))
            .join(format!("{}.json", key.node_type))
    }

    /// A cache file that cannot be read or parsed counts as a miss: the worst
    /// outcome is a redundant upload.
    pub fn cached(&self, key: &CodeKey<'_>) -> Option<CodeArtifact> {
        let path = self.cache_path(key);
        let bytes = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                debug!("ignoring unreadable cache entry {}: {e}", path.display());
                None
            }
        }
    }

    pub fn record(&self, key: &CodeKey<'_>, artifact: &CodeArtifact) -> Result<()> {
        Ok(write_json_atomic(artifact, &self.cache_path(key))?)
    }

    /// Returns the recorded artifact for `key`, or uploads `artifact_path` as
    /// `uploader` and records the result.
    pub async fn get_or_store_code<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        gas: &GasConfig,
        uploader: &str,
        artifact_path: &Path,
        key: &CodeKey<'_>,
    ) -> Result<CodeArtifact> {
        if let Some(artifact) = self.cached(key) {
            debug!(
                contract = key.contract_name,
                version = %key.version,
                code_id = artifact.code_id,
                "reusing stored code"
            );
            return Ok(artifact);
        }
        let wasm_byte_code = read_artifact(artifact_path)?;
        let artifact = store_code(client, gas, uploader, wasm_byte_code).await?;
        info!(
            contract = key.contract_name,
            version = %key.version,
            node_type = key.node_type,
            code_id = artifact.code_id,
            code_hash = %artifact.code_hash,
            "stored code"
        );
        self.record(key, &artifact)?;
        Ok(artifact)
    }
}

/// Uploads `wasm_byte_code` in one transaction and resolves its code hash.
pub async fn store_code<C: ChainClient + ?Sized>(
    client: &C,
    gas: &GasConfig,
    uploader: &str,
    wasm_byte_code: Vec<u8>,
) -> Result<CodeArtifact> {
    let msgs = vec![Msg::StoreCode {
        sender: uploader.into(),
        wasm_byte_code,
    }];
    let gas_limit = gas
        .limit_for(client, &msgs, gas.upload_fallback_limit)
        .await;
    let response = client
        .broadcast(msgs, TxOptions::with_gas_limit(gas_limit))
        .await
        .map_err(|e| match e {
            ChainError::Rejected { message, .. } => Error::UploadFailed(message),
            ChainError::Timeout(it) => Error::UploadFailed(format!("request timed out: {it}")),
            other => Error::UploadFailed(other.to_string()),
        })?;
    let code_id = response
        .event_attribute("message", "code_id")
        .or_else(|| response.attribute("code_id"))
        .ok_or_else(|| Error::MissingAttribute {
            tx_hash: response.tx_hash.clone(),
            key: "code_id",
        })?;
    let code_id: u64 = code_id.parse().map_err(|_| {
        Error::UploadFailed(format!("code_id attribute is not a number: {code_id}"))
    })?;
    let code_hash = client.code_hash_by_code_id(code_id).await?;
    Ok(CodeArtifact { code_id, code_hash })
}

/// Reads a gzipped WASM build output, checking it is what it claims to be.
/// The compressed bytes are returned as-is; the chain accepts gzipped code.
pub fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::ArtifactNotFound(path.to_owned()));
    }
    let bytes = std::fs::read(path)?;
    validate_artifact(path, &bytes)?;
    Ok(bytes)
}

pub fn validate_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidArtifact {
        path: path.to_owned(),
        reason: reason.into(),
    };
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Err(invalid("not gzip compressed"));
    }
    let mut header = [0u8; 4];
    GzDecoder::new(bytes)
        .read_exact(&mut header)
        .map_err(|e| invalid(&format!("cannot decompress: {e}")))?;
    if header != WASM_MAGIC {
        return Err(invalid("not a WASM module"));
    }
    Ok(())
}

#[derive(Deserialize)]
struct Manifest {
    package: ManifestPackage,
}

#[derive(Deserialize)]
struct ManifestPackage {
    version: String,
}

/// Semantic version declared in a contract crate's `Cargo.toml`.
pub fn read_manifest_version(manifest_path: &Path) -> Result<semver::Version> {
    let contents = std::fs::read_to_string(manifest_path)?;
    let manifest: Manifest = toml::from_str(&contents)?;
    semver::Version::parse(&manifest.package.version).map_err(|e| Error::InvalidArtifact {
        path: manifest_path.to_owned(),
        reason: format!("bad package version {}: {e}", manifest.package.version),
    })
}
