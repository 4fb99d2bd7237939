// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::de::DeserializeOwned;
use tracing::info;

use super::{ChainClient, Coin, GasConfig, Msg, TxOptions, TxResponse};
use crate::error::{Error, Result};

/// Outcome of one execute transaction.
///
/// A transaction that fails after broadcast still costs its fee, so failures are
/// reported here next to the fee instead of being raised.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteResult<T = serde_json::Value> {
    pub response: Option<TxResponse>,
    pub gas_fee: Coin,
    /// Decoded data of the first message, when the contract set any.
    pub answer: Option<T>,
    /// Chain error text when the transaction failed.
    pub failure: Option<String>,
}

impl<T> ExecuteResult<T> {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Turns a failed execution into [`Error::ExecuteFailed`].
    pub fn ok(self) -> Result<Self> {
        match self.failure {
            Some(failure) => Err(Error::ExecuteFailed(failure)),
            None => Ok(self),
        }
    }

    pub fn into_answer(self) -> Result<Option<T>> {
        Ok(self.ok()?.answer)
    }
}

/// Simulates, pads, broadcasts. Broadcast failures land in
/// [`ExecuteResult::failure`]; undecodable response data is an error.
pub async fn execute_contract<C, T>(
    client: &C,
    gas: &GasConfig,
    msgs: Vec<Msg>,
) -> Result<ExecuteResult<T>>
where
    C: ChainClient + ?Sized,
    T: DeserializeOwned,
{
    let gas_limit = gas.limit_for(client, &msgs, gas.fallback_limit).await;
    let gas_fee = gas.fee(gas_limit);
    match client
        .broadcast(msgs, TxOptions::with_gas_limit(gas_limit))
        .await
    {
        Ok(response) => {
            let answer = match response.data_for(0) {
                Some(data) if !data.is_empty() => Some(serde_json::from_slice(data)?),
                _ => None,
            };
            Ok(ExecuteResult {
                response: Some(response),
                gas_fee,
                answer,
                failure: None,
            })
        }
        Err(e) => {
            info!("execute failed: {e}");
            Ok(ExecuteResult {
                response: None,
                gas_fee,
                answer: None,
                failure: Some(e.message().to_owned()),
            })
        }
    }
}
