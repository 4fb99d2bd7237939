// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChainClient, Coin, Msg, USCRT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, smart_default::SmartDefault)]
#[serde(default)]
pub struct GasConfig {
    /// Multiplier applied to simulated gas.
    #[default(1.1)]
    pub adjustment: f64,
    /// Limit used for instantiate and execute when simulation fails.
    #[default(500_000)]
    pub fallback_limit: u64,
    /// Limit used for code uploads when simulation fails.
    #[default(5_000_000)]
    pub upload_fallback_limit: u64,
    /// Price of one gas unit in `fee_denom`.
    #[default(0.1)]
    pub price: f64,
    #[default(USCRT.to_string())]
    pub fee_denom: String,
}

impl GasConfig {
    /// Gas limit for `msgs`: simulated usage padded by `adjustment`, or `fallback`
    /// when the simulation itself fails.
    pub async fn limit_for<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        msgs: &[Msg],
        fallback: u64,
    ) -> u64 {
        estimate_gas(client, msgs, self.adjustment, fallback).await
    }

    /// Fee debited for a transaction sent with `gas_limit`, whatever its outcome.
    pub fn fee(&self, gas_limit: u64) -> Coin {
        Coin::new(
            (gas_limit as f64 * self.price).ceil() as u128,
            self.fee_denom.clone(),
        )
    }
}

/// A failed simulation does not mean the real call will fail, so it only costs us
/// precision: the conservative `fallback` is used instead.
pub async fn estimate_gas<C: ChainClient + ?Sized>(
    client: &C,
    msgs: &[Msg],
    adjustment: f64,
    fallback: u64,
) -> u64 {
    match client.simulate(msgs).await {
        Ok(gas_used) => {
            let limit = (gas_used as f64 * adjustment) as u64;
            debug!(gas_used, limit, "simulated gas");
            limit
        }
        Err(e) => {
            warn!("gas simulation failed, using fallback limit {fallback}: {e}");
            fallback
        }
    }
}
