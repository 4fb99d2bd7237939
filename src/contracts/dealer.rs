// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::msg::{ContractInfoAnswer, DealerExecuteMsg, DealerQueryMsg, PricesAnswer};
use super::{ContractInfo, query};
use crate::chain::{ChainClient, Coin, ExecuteResult, GasConfig, Msg, execute_contract};
use crate::error::Result;

/// Buys one mint from `dealer`. `funds` must match one of the dealer's prices.
pub async fn purchase_mint<C: ChainClient + ?Sized>(
    client: &C,
    gas: &GasConfig,
    buyer: &str,
    dealer: &ContractInfo,
    funds: Vec<Coin>,
) -> Result<ExecuteResult> {
    let msg = Msg::ExecuteContract {
        sender: buyer.into(),
        contract: dealer.address.clone(),
        code_hash: dealer.code_hash.clone(),
        msg: serde_json::to_value(DealerExecuteMsg::PurchaseMint {})?,
        sent_funds: funds,
    };
    execute_contract(client, gas, vec![msg]).await
}

pub async fn query_prices<C: ChainClient + ?Sized>(
    client: &C,
    dealer: &ContractInfo,
) -> Result<Vec<Coin>> {
    let answer: PricesAnswer = query(client, dealer, &DealerQueryMsg::GetPrices {}).await?;
    Ok(answer.get_prices.prices)
}

/// The SNIP-721 the dealer currently mints into.
pub async fn query_child_snip721<C: ChainClient + ?Sized>(
    client: &C,
    dealer: &ContractInfo,
) -> Result<ContractInfo> {
    let answer: ContractInfoAnswer =
        query(client, dealer, &DealerQueryMsg::GetChildSnip721 {}).await?;
    Ok(answer.contract_info)
}
