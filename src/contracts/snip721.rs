// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde_json::Value;

use super::msg::{
    MintersAnswer, NumTokensAnswer, QueryWithPermit, Snip721ExecuteAnswer, Snip721ExecuteMsg,
    Snip721QueryMsg,
};
use super::{ContractInfo, query};
use crate::chain::{ChainClient, ExecuteResult, GasConfig, Msg, execute_contract};
use crate::error::Result;
use crate::key_management::{Permission, Permit, PermitSigner};

pub async fn transfer_nft<C: ChainClient + ?Sized>(
    client: &C,
    gas: &GasConfig,
    from: &str,
    contract: &ContractInfo,
    recipient: &str,
    token_id: &str,
) -> Result<ExecuteResult> {
    let msg = Msg::ExecuteContract {
        sender: from.into(),
        contract: contract.address.clone(),
        code_hash: contract.code_hash.clone(),
        msg: serde_json::to_value(Snip721ExecuteMsg::TransferNft {
            recipient: recipient.into(),
            token_id: token_id.into(),
            memo: None,
        })?,
        sent_funds: vec![],
    };
    execute_contract(client, gas, vec![msg]).await
}

/// One page-advance call on a contract in `MigrateDataIn` mode. The contract
/// keeps the cursor, so calling again after an interruption resumes the import.
pub async fn migrate_tokens_in<C: ChainClient + ?Sized>(
    client: &C,
    gas: &GasConfig,
    admin: &str,
    contract: &ContractInfo,
    pages: Option<u32>,
    page_size: Option<u32>,
) -> Result<ExecuteResult<Snip721ExecuteAnswer>> {
    let msg = Msg::ExecuteContract {
        sender: admin.into(),
        contract: contract.address.clone(),
        code_hash: contract.code_hash.clone(),
        msg: serde_json::to_value(Snip721ExecuteMsg::MigrateTokensIn { pages, page_size })?,
        sent_funds: vec![],
    };
    execute_contract(client, gas, vec![msg]).await
}

pub async fn query_contract_info<C: ChainClient + ?Sized>(
    client: &C,
    contract: &ContractInfo,
) -> Result<Value> {
    query(client, contract, &Snip721QueryMsg::ContractInfo {}).await
}

pub async fn query_contract_config<C: ChainClient + ?Sized>(
    client: &C,
    contract: &ContractInfo,
) -> Result<Value> {
    query(client, contract, &Snip721QueryMsg::ContractConfig {}).await
}

pub async fn query_num_tokens<C: ChainClient + ?Sized>(
    client: &C,
    contract: &ContractInfo,
) -> Result<u32> {
    let answer: NumTokensAnswer = query(client, contract, &Snip721QueryMsg::NumTokens {}).await?;
    Ok(answer.num_tokens.count)
}

pub async fn query_minters<C: ChainClient + ?Sized>(
    client: &C,
    contract: &ContractInfo,
) -> Result<Vec<String>> {
    let answer: MintersAnswer = query(client, contract, &Snip721QueryMsg::Minters {}).await?;
    Ok(answer.minters.minters)
}

async fn owner_permit<C, S>(
    client: &C,
    viewer: &S,
    permit_name: &str,
    contract: &ContractInfo,
) -> Result<Permit>
where
    C: ChainClient + ?Sized,
    S: PermitSigner + ?Sized,
{
    let chain_id = client.chain_id().await?;
    viewer
        .sign_permit(
            &chain_id,
            permit_name,
            vec![contract.address.clone()],
            vec![Permission::Owner],
        )
        .await
}

async fn query_with_permit<C, S>(
    client: &C,
    viewer: &S,
    permit_name: &str,
    contract: &ContractInfo,
    query_msg: QueryWithPermit,
) -> Result<Value>
where
    C: ChainClient + ?Sized,
    S: PermitSigner + ?Sized,
{
    let permit = owner_permit(client, viewer, permit_name, contract).await?;
    query(
        client,
        contract,
        &Snip721QueryMsg::WithPermit {
            permit,
            query: query_msg,
        },
    )
    .await
}

/// Number of tokens `owner` holds, as seen by `viewer`.
pub async fn query_num_tokens_of_owner<C, S>(
    client: &C,
    viewer: &S,
    permit_name: &str,
    contract: &ContractInfo,
    owner: &str,
) -> Result<u32>
where
    C: ChainClient + ?Sized,
    S: PermitSigner + ?Sized,
{
    let answer = query_with_permit(
        client,
        viewer,
        permit_name,
        contract,
        QueryWithPermit::NumTokensOfOwner {
            owner: owner.into(),
        },
    )
    .await?;
    let answer: NumTokensAnswer = serde_json::from_value(answer)?;
    Ok(answer.num_tokens.count)
}

pub async fn query_batch_nft_dossier<C, S>(
    client: &C,
    viewer: &S,
    permit_name: &str,
    contract: &ContractInfo,
    token_ids: Vec<String>,
) -> Result<Value>
where
    C: ChainClient + ?Sized,
    S: PermitSigner + ?Sized,
{
    query_with_permit(
        client,
        viewer,
        permit_name,
        contract,
        QueryWithPermit::BatchNftDossier { token_ids },
    )
    .await
}

pub async fn query_transaction_history<C, S>(
    client: &C,
    viewer: &S,
    permit_name: &str,
    contract: &ContractInfo,
) -> Result<Value>
where
    C: ChainClient + ?Sized,
    S: PermitSigner + ?Sized,
{
    query_with_permit(
        client,
        viewer,
        permit_name,
        contract,
        QueryWithPermit::TransactionHistory {
            page: None,
            page_size: None,
        },
    )
    .await
}
