// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use k256::ecdsa::{Signature, SigningKey, signature::Signer as _};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::permit::{
    Permission, Permit, PermitParams, PermitSignature, PubKey, SECP256K1_PUB_KEY_TYPE,
};
use crate::error::{Error, Result};

/// Produces query permits on behalf of one account.
#[async_trait]
pub trait PermitSigner: Send + Sync {
    fn address(&self) -> &str;

    async fn sign_permit(
        &self,
        chain_id: &str,
        permit_name: &str,
        allowed_tokens: Vec<String>,
        permissions: Vec<Permission>,
    ) -> Result<Permit>;
}

/// An account whose secp256k1 key is held in process.
#[derive(Clone)]
pub struct LocalKey {
    address: String,
    signing_key: SigningKey,
}

impl std::fmt::Debug for LocalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalKey {
    pub fn new(address: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            address: address.into(),
            signing_key,
        }
    }

    /// Fresh key for `address`. The address is not derived from the key; the
    /// caller is responsible for pairing them the way the chain expects.
    pub fn random(address: impl Into<String>) -> Self {
        Self::new(address, SigningKey::random(&mut OsRng))
    }

    pub fn from_key_info(info: &KeyInfo) -> Result<Self> {
        let bytes = hex::decode(&info.private_key)
            .map_err(|e| Error::Signing(format!("key {}: {e}", info.name)))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| Error::Signing(format!("key {}: {e}", info.name)))?;
        Ok(Self::new(info.address.clone(), signing_key))
    }

    /// Compressed SEC1 public key, as carried in permits.
    pub fn public_key(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_sec1_bytes().to_vec()
    }

    pub fn sign_params(&self, params: PermitParams) -> Result<Permit> {
        let signature: Signature = self.signing_key.sign(&params.sign_doc_bytes()?);
        Ok(Permit {
            params,
            signature: PermitSignature {
                pub_key: PubKey {
                    kind: SECP256K1_PUB_KEY_TYPE.into(),
                    value: self.public_key(),
                },
                signature: signature.to_bytes().to_vec(),
            },
        })
    }
}

#[async_trait]
impl PermitSigner for LocalKey {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_permit(
        &self,
        chain_id: &str,
        permit_name: &str,
        allowed_tokens: Vec<String>,
        permissions: Vec<Permission>,
    ) -> Result<Permit> {
        debug!(
            signer = %self.address,
            permit_name,
            ?allowed_tokens,
            "signing query permit"
        );
        self.sign_params(PermitParams {
            allowed_tokens,
            permit_name: permit_name.into(),
            chain_id: chain_id.into(),
            permissions,
        })
    }
}

/// One account as written in the keystore file. The private key is hex encoded.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct KeyInfo {
    pub name: String,
    pub address: String,
    pub private_key: String,
}

#[derive(Default, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
struct KeyStoreFile {
    accounts: Vec<KeyInfo>,
}

/// Named accounts loaded from a JSON keystore file.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct KeyStore {
    key_info: HashMap<String, KeyInfo>,
}

impl KeyStore {
    pub fn load(path: &Path) -> Result<Self> {
        let file: KeyStoreFile = serde_json::from_slice(&std::fs::read(path)?)?;
        let mut store = Self::default();
        for info in file.accounts {
            store.put(info)?;
        }
        Ok(store)
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.key_info.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Result<&KeyInfo> {
        self.key_info
            .get(name)
            .ok_or_else(|| Error::Signing(format!("no key named {name} in keystore")))
    }

    pub fn put(&mut self, info: KeyInfo) -> Result<()> {
        if self.key_info.contains_key(&info.name) {
            return Err(Error::Signing(format!("key {} already exists", info.name)));
        }
        self.key_info.insert(info.name.clone(), info);
        Ok(())
    }

    pub fn signer(&self, name: &str) -> Result<LocalKey> {
        LocalKey::from_key_info(self.get(name)?)
    }
}
