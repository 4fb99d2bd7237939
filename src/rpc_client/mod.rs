// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! JSON-RPC client for the external signing service.
//!
//! The service holds the account keys, encrypts contract messages, signs and
//! broadcasts. Each [`ChainClient`] call maps to one `Wasm.*` method.

use std::{env, fmt, str::FromStr, time::Duration};

use anyhow::Context as _;
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, header};
use jsonrpsee::core::{ClientError, client::ClientT as _, params::ArrayParams};
use jsonrpsee::types::ErrorObjectOwned;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::chain::{ChainClient, ChainError, Msg, TxOptions, TxResponse};

pub const API_INFO_KEY: &str = "SECRET_SIGNER_API_INFO";
pub const DEFAULT_API_INFO: &str = "http://127.0.0.1:8090";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

/// Token and URL of a signing service, written `[token:]url`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiInfo {
    pub url: Url,
    pub token: Option<String>,
}

impl fmt::Display for ApiInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(token) = &self.token {
            write!(f, "{token}:")?;
        }
        write!(f, "{}", self.url)
    }
}

impl FromStr for ApiInfo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (token, url) = match s.split_once(':') {
            Some((scheme, _)) if SCHEMES.contains(&scheme) => (None, s),
            Some((token, url)) => (Some(token), url),
            None => (None, s),
        };
        let url: Url = url.parse().with_context(|| format!("invalid API url {url}"))?;
        anyhow::ensure!(
            SCHEMES.contains(&url.scheme()),
            "unsupported API url scheme: {}",
            url.scheme()
        );
        Ok(ApiInfo {
            url,
            token: token.map(String::from),
        })
    }
}

impl ApiInfo {
    /// Value of [`API_INFO_KEY`] if set, otherwise [`DEFAULT_API_INFO`].
    /// Fails if the variable is malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        match env::var(API_INFO_KEY) {
            Ok(it) => it.parse(),
            Err(env::VarError::NotPresent) => DEFAULT_API_INFO.parse(),
            Err(it @ env::VarError::NotUnicode(_)) => Err(it.into()),
        }
    }
}

enum ClientInner {
    Ws(jsonrpsee::ws_client::WsClient),
    Https(jsonrpsee::http_client::HttpClient),
}

/// [`ChainClient`] over a jsonrpsee connection.
///
/// Every request is bounded by the configured timeout. A timed out broadcast
/// is reported as [`ChainError::Timeout`] and never resent.
pub struct RpcClient {
    inner: ClientInner,
    url: Url,
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    pub async fn connect(info: &ApiInfo, timeout: Duration) -> Result<Self, ChainError> {
        let headers = match &info.token {
            Some(token) => HeaderMap::from_iter([(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    ChainError::Transport(format!("invalid authorization token: {e}"))
                })?,
            )]),
            None => HeaderMap::new(),
        };
        let inner = match info.url.scheme() {
            "ws" | "wss" => ClientInner::Ws(
                jsonrpsee::ws_client::WsClientBuilder::new()
                    .set_headers(headers)
                    .request_timeout(timeout)
                    .build(info.url.as_str())
                    .await
                    .map_err(transport_error)?,
            ),
            "http" | "https" => ClientInner::Https(
                jsonrpsee::http_client::HttpClientBuilder::new()
                    .set_headers(headers)
                    .request_timeout(timeout)
                    .build(info.url.as_str())
                    .map_err(transport_error)?,
            ),
            it => {
                return Err(ChainError::Transport(format!(
                    "unsupported URL scheme: {it}"
                )));
            }
        };
        Ok(Self {
            inner,
            url: info.url.clone(),
        })
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: ArrayParams,
    ) -> Result<R, ClientError> {
        debug!(method, url = %self.url, "rpc request");
        match &self.inner {
            ClientInner::Ws(it) => it.request(method, params).await,
            ClientInner::Https(it) => it.request(method, params).await,
        }
    }
}

fn params<T: Serialize>(values: T) -> Result<ArrayParams, ChainError> {
    let mut params = ArrayParams::new();
    params
        .insert(values)
        .map_err(|e| ChainError::Transport(format!("cannot encode params: {e}")))?;
    Ok(params)
}

fn transport_error(e: ClientError) -> ChainError {
    ChainError::Transport(e.to_string())
}

/// Structured details the service attaches to a rejected transaction.
#[derive(Debug, Default, Deserialize)]
struct RejectionData {
    tx_hash: Option<String>,
    gas_used: Option<u64>,
}

fn rejection(e: &ErrorObjectOwned) -> ChainError {
    let data: RejectionData = e
        .data()
        .and_then(|raw| serde_json::from_str(raw.get()).ok())
        .unwrap_or_default();
    ChainError::Rejected {
        message: e.message().to_owned(),
        tx_hash: data.tx_hash,
        gas_used: data.gas_used,
    }
}

/// Errors of calls that submit transactions. The service's call errors carry
/// the chain's rejection text.
fn tx_error(method: &str, e: ClientError) -> ChainError {
    match e {
        ClientError::Call(it) => rejection(&it),
        ClientError::RequestTimeout => ChainError::Timeout(method.into()),
        other => transport_error(other),
    }
}

fn query_error(method: &str, e: ClientError) -> ChainError {
    match e {
        ClientError::Call(it) => ChainError::Query(it.message().to_owned()),
        ClientError::RequestTimeout => ChainError::Timeout(method.into()),
        other => transport_error(other),
    }
}

#[derive(Serialize)]
struct BroadcastParams {
    msgs: Vec<Msg>,
    #[serde(flatten)]
    options: TxOptions,
}

#[derive(Serialize)]
struct SmartQueryParams<'a> {
    contract_address: &'a str,
    code_hash: &'a str,
    query: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct SimulateAnswer {
    gas_used: u64,
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn chain_id(&self) -> Result<String, ChainError> {
        const METHOD: &str = "Wasm.ChainId";
        self.request(METHOD, ArrayParams::new())
            .await
            .map_err(|e| query_error(METHOD, e))
    }

    async fn simulate(&self, msgs: &[Msg]) -> Result<u64, ChainError> {
        const METHOD: &str = "Wasm.Simulate";
        let answer: SimulateAnswer = self
            .request(METHOD, params(msgs)?)
            .await
            .map_err(|e| tx_error(METHOD, e))?;
        Ok(answer.gas_used)
    }

    async fn broadcast(
        &self,
        msgs: Vec<Msg>,
        options: TxOptions,
    ) -> Result<TxResponse, ChainError> {
        const METHOD: &str = "Wasm.Broadcast";
        self.request(METHOD, params(BroadcastParams { msgs, options })?)
            .await
            .map_err(|e| tx_error(METHOD, e))
    }

    async fn code_hash_by_code_id(&self, code_id: u64) -> Result<String, ChainError> {
        const METHOD: &str = "Wasm.CodeHashByCodeId";
        self.request(METHOD, params(code_id)?)
            .await
            .map_err(|e| query_error(METHOD, e))
    }

    async fn query_contract_smart(
        &self,
        contract_address: &str,
        code_hash: &str,
        query: &serde_json::Value,
    ) -> Result<serde_json::Value, ChainError> {
        const METHOD: &str = "Wasm.QueryContractSmart";
        self.request(
            METHOD,
            params(SmartQueryParams {
                contract_address,
                code_hash,
                query,
            })?,
        )
        .await
        .map_err(|e| query_error(METHOD, e))
    }
}
