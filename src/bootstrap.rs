// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use tracing::debug;

use crate::chain::{ChainClient, Coin, Msg, TxOptions};

const BOOTSTRAP_GAS_LIMIT: u64 = 100_000;

/// Sends 1uscrt from `address` to itself.
///
/// An account with no transactions yet cannot have an execute simulated, so a
/// freshly funded account runs this once first. The outcome is irrelevant and
/// any failure is only logged.
pub async fn initialize_account_before_execute<C: ChainClient + ?Sized>(client: &C, address: &str) {
    let msg = Msg::Send {
        from_address: address.into(),
        to_address: address.into(),
        amount: vec![Coin::uscrt(1)],
    };
    match client
        .broadcast(vec![msg], TxOptions::with_gas_limit(BOOTSTRAP_GAS_LIMIT))
        .await
    {
        Ok(response) => debug!(%address, tx_hash = %response.tx_hash, "account initialized"),
        Err(e) => debug!(%address, "account initialization failed, continuing: {e}"),
    }
}
