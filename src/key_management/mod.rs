// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Accounts and the query permits they sign.

mod keystore;
mod permit;

pub use keystore::{KeyInfo, KeyStore, LocalKey, PermitSigner};
pub use permit::{
    Permission, Permit, PermitParams, PermitSignature, PubKey, SECP256K1_PUB_KEY_TYPE,
};
