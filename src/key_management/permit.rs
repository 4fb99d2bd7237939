// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use k256::ecdsa::{Signature, VerifyingKey, signature::Verifier as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{base64::Base64, serde_as};

use crate::chain::USCRT;
use crate::error::{Error, Result};

pub const SECP256K1_PUB_KEY_TYPE: &str = "tendermint/PubKeySecp256k1";

/// Capabilities a query permit may grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
    Allowance,
    Balance,
    History,
    Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitParams {
    pub allowed_tokens: Vec<String>,
    pub permit_name: String,
    pub chain_id: String,
    pub permissions: Vec<Permission>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKey {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde_as(as = "Base64")]
    pub value: Vec<u8>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitSignature {
    pub pub_key: PubKey,
    #[serde_as(as = "Base64")]
    pub signature: Vec<u8>,
}

/// An off-chain signed, contract- and capability-scoped authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    pub params: PermitParams,
    pub signature: PermitSignature,
}

impl PermitParams {
    /// Amino JSON sign document contracts rebuild to check the signature.
    ///
    /// `serde_json` maps are ordered, which gives the canonical key order for free.
    pub fn sign_doc_bytes(&self) -> Result<Vec<u8>> {
        let doc = json!({
            "account_number": "0",
            "chain_id": self.chain_id,
            "fee": {
                "amount": [{"amount": "0", "denom": USCRT}],
                "gas": "1",
            },
            "memo": "",
            "msgs": [{
                "type": "query_permit",
                "value": {
                    "allowed_tokens": self.allowed_tokens,
                    "permissions": self.permissions,
                    "permit_name": self.permit_name,
                },
            }],
            "sequence": "0",
        });
        Ok(serde_json::to_vec(&doc)?)
    }
}

impl Permit {
    pub fn is_scoped_to(&self, contract_address: &str, permission: Permission) -> bool {
        self.params
            .allowed_tokens
            .iter()
            .any(|it| it == contract_address)
            && self.params.permissions.contains(&permission)
    }

    /// Checks the signature against the embedded public key. Which account that
    /// key belongs to is for the receiving contract to decide.
    pub fn verify(&self) -> Result<()> {
        if self.signature.pub_key.kind != SECP256K1_PUB_KEY_TYPE {
            return Err(Error::Signing(format!(
                "unsupported public key type {}",
                self.signature.pub_key.kind
            )));
        }
        let key = VerifyingKey::from_sec1_bytes(&self.signature.pub_key.value)
            .map_err(|e| Error::Signing(e.to_string()))?;
        let signature = Signature::from_slice(&self.signature.signature)
            .map_err(|e| Error::Signing(e.to_string()))?;
        key.verify(&self.params.sign_doc_bytes()?, &signature)
            .map_err(|_| Error::Signing("permit signature does not match its params".into()))
    }
}
