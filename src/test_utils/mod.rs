// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! In-memory chain for unit tests.
//!
//! [`MockChain`] implements [`ChainClient`] and runs a model of the dealer and
//! migratable SNIP-721 contracts: their modes, the migration hand-off between
//! instances and the error strings they answer with. Every transaction applies
//! atomically, so a failed message leaves no trace.

use std::collections::HashMap;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest as _, Sha256};
use strum::{Display, IntoEnumIterator as _};

use crate::chain::{
    Attribute, ChainClient, ChainError, Coin, Event, ExecuteResult, GasConfig, Msg, TxLog,
    TxOptions, TxResponse,
};
use crate::code_store::{CodeArtifact, CodeKey, CodeStore};
use crate::contracts::msg::{
    DealerExecuteMsg, DealerInstantiate, DealerQueryMsg, InstantiateByMigration, InstantiateMsg,
    Metadata, MigrationQuery, QueryWithPermit, Snip721ExecuteMsg, Snip721QueryMsg,
};
use crate::contracts::{self, ContractInfo, ContractKind};
use crate::deployer::{self, ContractInstance, InstantiateOptions};
use crate::key_management::{LocalKey, Permission, Permit, PermitSigner as _};

pub const CHAIN_ID: &str = "secretdev-1";
/// Price of one mint on dealers deployed by [`Harness::deploy_dealer`].
pub const PURCHASE_PRICE: u128 = 2_000_000;

const STORE_GAS: u64 = 1_500_000;
const INSTANTIATE_GAS: u64 = 200_000;
const EXECUTE_GAS: u64 = 150_000;
const IMPORT_GAS_PER_TOKEN: u64 = 10_000;
const SEND_GAS: u64 = 60_000;
const FIRST_BLOCK_TIME: u64 = 1_700_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
enum Mode {
    Running,
    MigrateDataIn,
    MigrateOutStarted,
    MigratedOut,
}

fn ensure_running(mode: Mode) -> Result<(), String> {
    match mode {
        Mode::Running => Ok(()),
        other => Err(mode_error(other)),
    }
}

fn mode_error(mode: Mode) -> String {
    format!("Not available in contact mode: {mode}")
}

#[derive(Debug, Clone)]
struct Token {
    id: String,
    owner: String,
    public_metadata: Option<Metadata>,
    private_metadata: Option<Metadata>,
    collection_creator: String,
    token_creator: String,
    time_of_minting: u64,
}

impl Token {
    fn dossier(&self) -> Value {
        json!({
            "token_id": self.id,
            "owner": self.owner,
            "public_metadata": self.public_metadata,
            "private_metadata": self.private_metadata,
            "mint_run_info": {
                "collection_creator": self.collection_creator,
                "token_creator": self.token_creator,
                "time_of_minting": self.time_of_minting,
                "mint_run": 1,
                "serial_number": null,
                "quantity_minted_this_run": null,
            },
        })
    }
}

#[derive(Debug, Clone)]
struct Snip721 {
    name: String,
    symbol: String,
    admin: String,
    /// Instantiator, reported as every token's `collection_creator`.
    creator: String,
    minters: Vec<String>,
    /// Contracts told about this one's successor once its migration completes.
    notify: Vec<String>,
    tokens: Vec<Token>,
    import_cursor: u32,
    history: Vec<Value>,
}

impl Snip721 {
    fn new(name: &str, symbol: &str, admin: &str, creator: &str) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            admin: admin.into(),
            creator: creator.into(),
            minters: vec![],
            notify: vec![],
            tokens: vec![],
            import_cursor: 0,
            history: vec![],
        }
    }

    fn record(&mut self, height: u64, token_id: &str, action: Value) {
        self.history.push(json!({
            "tx_id": self.history.len(),
            "block_height": height,
            "token_id": token_id,
            "action": action,
        }));
    }
}

#[derive(Debug, Clone)]
struct Dealer {
    admin: String,
    prices: Vec<Coin>,
    public_metadata: Option<Metadata>,
    private_metadata: Option<Metadata>,
    child: ContractInfo,
}

#[derive(Debug, Clone)]
enum Model {
    Dealer(Dealer),
    Snip721(Snip721),
}

#[derive(Debug, Clone)]
struct Contract {
    address: String,
    code_hash: String,
    mode: Mode,
    migrated_from: Option<ContractInfo>,
    migrated_to: Option<ContractInfo>,
    model: Model,
}

impl Contract {
    fn running(address: &str, code_hash: &str, model: Model) -> Self {
        Self {
            address: address.into(),
            code_hash: code_hash.into(),
            mode: Mode::Running,
            migrated_from: None,
            migrated_to: None,
            model,
        }
    }

    fn info(&self) -> ContractInfo {
        ContractInfo::new(self.address.clone(), self.code_hash.clone())
    }

    fn dealer(&self) -> Result<&Dealer, String> {
        match &self.model {
            Model::Dealer(it) => Ok(it),
            Model::Snip721(_) => Err(format!("{} is not a snip721 dealer", self.address)),
        }
    }

    fn snip721(&self) -> Result<&Snip721, String> {
        match &self.model {
            Model::Snip721(it) => Ok(it),
            Model::Dealer(_) => Err(format!("{} is not a snip721 contract", self.address)),
        }
    }

    fn snip721_mut(&mut self) -> Result<&mut Snip721, String> {
        match &mut self.model {
            Model::Snip721(it) => Ok(it),
            Model::Dealer(_) => Err(format!("{} is not a snip721 contract", self.address)),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCode {
    hash: String,
    kind: ContractKind,
}

/// Chain state proper. Cloned for simulation and for atomic application.
#[derive(Debug, Clone, Default)]
struct Ledger {
    codes: Vec<StoredCode>,
    contracts: HashMap<String, Contract>,
    height: u64,
    instantiated: u64,
}

impl Ledger {
    fn code(&self, code_id: u64) -> Result<&StoredCode, String> {
        code_id
            .checked_sub(1)
            .and_then(|idx| self.codes.get(idx as usize))
            .ok_or_else(|| format!("code id {code_id}: not found"))
    }

    fn contract(&self, address: &str) -> Result<&Contract, String> {
        self.contracts
            .get(address)
            .ok_or_else(|| format!("contract {address}: not found"))
    }

    fn contract_mut(&mut self, address: &str) -> Result<&mut Contract, String> {
        self.contracts
            .get_mut(address)
            .ok_or_else(|| format!("contract {address}: not found"))
    }

    fn next_address(&mut self) -> String {
        self.instantiated += 1;
        format!("secret1contract{:04}", self.instantiated)
    }

    fn block_time(&self) -> u64 {
        FIRST_BLOCK_TIME + self.height * 6
    }
}

#[derive(Default)]
struct Outcome {
    events: Vec<Event>,
    data: Vec<u8>,
    gas_used: u64,
}

impl Outcome {
    fn gas(gas_used: u64) -> Self {
        Self {
            gas_used,
            ..Default::default()
        }
    }

    fn event(mut self, kind: &str, attributes: &[(&str, String)]) -> Self {
        self.events.push(Event {
            kind: kind.into(),
            attributes: attributes
                .iter()
                .map(|(key, value)| Attribute {
                    key: (*key).into(),
                    value: value.clone(),
                })
                .collect(),
        });
        self
    }
}

#[derive(Deserialize)]
struct Snip721Instantiate {
    name: String,
    symbol: String,
    #[serde(default)]
    admin: Option<String>,
}

struct Inner {
    ledger: Ledger,
    /// Permit public keys to the accounts that own them.
    keys: HashMap<Vec<u8>, String>,
    broadcasts: Vec<(Vec<Msg>, TxOptions)>,
    uploads: usize,
    page_size: u32,
    reject_uploads: bool,
    reject_sends: bool,
    fail_simulations: bool,
}

/// A single node chain with the dealer and SNIP-721 contracts built in.
pub struct MockChain {
    chain_id: String,
    inner: Mutex<Inner>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            chain_id: CHAIN_ID.into(),
            inner: Mutex::new(Inner {
                ledger: Ledger::default(),
                keys: HashMap::new(),
                broadcasts: vec![],
                uploads: 0,
                page_size: 2,
                reject_uploads: false,
                reject_sends: false,
                fail_simulations: false,
            }),
        }
    }
}

impl MockChain {
    /// Lets contracts recognize permits signed by `key`.
    pub fn register_key(&self, key: &LocalKey) {
        self.inner
            .lock()
            .keys
            .insert(key.public_key(), key.address().to_owned());
    }

    /// Committed store-code transactions.
    pub fn uploads(&self) -> usize {
        self.inner.lock().uploads
    }

    /// Every broadcast, including rejected ones.
    pub fn broadcasts(&self) -> Vec<(Vec<Msg>, TxOptions)> {
        self.inner.lock().broadcasts.clone()
    }

    pub fn reject_uploads(&self, reject: bool) {
        self.inner.lock().reject_uploads = reject;
    }

    pub fn reject_sends(&self, reject: bool) {
        self.inner.lock().reject_sends = reject;
    }

    pub fn fail_simulations(&self, fail: bool) {
        self.inner.lock().fail_simulations = fail;
    }

    /// Tokens copied per page when `migrate_tokens_in` names no page size.
    pub fn set_default_page_size(&self, page_size: u32) {
        self.inner.lock().page_size = page_size;
    }

    pub fn contract_mode(&self, address: &str) -> Option<String> {
        self.inner
            .lock()
            .ledger
            .contracts
            .get(address)
            .map(|it| it.mode.to_string())
    }

    pub fn contract_count(&self) -> usize {
        self.inner.lock().ledger.contracts.len()
    }
}

impl Inner {
    fn run(&self, chain_id: &str, ledger: &mut Ledger, msgs: &[Msg]) -> Result<Vec<Outcome>, String> {
        ledger.height += 1;
        msgs.iter()
            .enumerate()
            .map(|(idx, msg)| {
                self.apply(chain_id, ledger, msg).map_err(|e| {
                    format!("failed to execute message; message index: {idx}: {e}")
                })
            })
            .collect()
    }

    fn apply(&self, chain_id: &str, ledger: &mut Ledger, msg: &Msg) -> Result<Outcome, String> {
        match msg {
            Msg::StoreCode { wasm_byte_code, .. } => {
                if self.reject_uploads {
                    return Err("insufficient fees; got: 0uscrt required: 150000uscrt".into());
                }
                let kind = detect_kind(wasm_byte_code)
                    .ok_or_else(|| "Wasm validation failed: not a known contract".to_string())?;
                ledger.codes.push(StoredCode {
                    hash: hex::encode(Sha256::digest(wasm_byte_code)),
                    kind,
                });
                let code_id = ledger.codes.len();
                Ok(
                    Outcome::gas(STORE_GAS + wasm_byte_code.len() as u64).event(
                        "message",
                        &[
                            ("action", "/secret.compute.v1beta1.MsgStoreCode".into()),
                            ("code_id", code_id.to_string()),
                        ],
                    ),
                )
            }
            Msg::InstantiateContract {
                sender,
                code_id,
                code_hash,
                init_msg,
                ..
            } => self.instantiate(chain_id, ledger, sender, *code_id, code_hash, init_msg),
            Msg::ExecuteContract {
                sender,
                contract,
                code_hash,
                msg,
                sent_funds,
            } => {
                let target = ledger.contract(contract)?;
                if target.code_hash != *code_hash {
                    return Err(format!("code hash mismatch for {contract}"));
                }
                if matches!(target.model, Model::Dealer(_)) {
                    match parse(msg, "ExecuteMsg")? {
                        DealerExecuteMsg::PurchaseMint {} => {
                            purchase_mint(ledger, sender, contract, sent_funds)
                        }
                    }
                } else {
                    match parse(msg, "ExecuteMsg")? {
                        Snip721ExecuteMsg::TransferNft {
                            recipient,
                            token_id,
                            ..
                        } => transfer_nft(ledger, sender, contract, &recipient, &token_id),
                        Snip721ExecuteMsg::MigrateTokensIn { pages, page_size } => {
                            migrate_tokens_in(
                                ledger,
                                sender,
                                contract,
                                pages,
                                page_size.unwrap_or(self.page_size),
                            )
                        }
                    }
                }
            }
            Msg::Send {
                from_address,
                to_address,
                amount,
            } => {
                if self.reject_sends {
                    return Err(format!(
                        "{from_address} cannot send {amount:?}: insufficient funds"
                    ));
                }
                Ok(Outcome::gas(SEND_GAS).event(
                    "transfer",
                    &[
                        ("recipient", to_address.clone()),
                        ("sender", from_address.clone()),
                    ],
                ))
            }
        }
    }

    fn instantiate(
        &self,
        chain_id: &str,
        ledger: &mut Ledger,
        sender: &str,
        code_id: u64,
        code_hash: &str,
        init_msg: &Value,
    ) -> Result<Outcome, String> {
        let code = ledger.code(code_id)?.clone();
        if code.hash != code_hash {
            return Err(format!("code hash mismatch for code id {code_id}"));
        }
        let payload: InstantiateMsg<Value> = parse(init_msg, "InstantiateMsg")?;
        let address = ledger.next_address();
        let mut outcome = Outcome::gas(INSTANTIATE_GAS)
            .event("wasm", &[("contract_address", address.clone())]);
        match (code.kind, payload) {
            (ContractKind::Snip721Dealer, InstantiateMsg::New(init)) => {
                let init = parse(&init, "InstantiateMsg")?;
                let child = new_dealer(ledger, sender, &address, &code.hash, init)?;
                outcome = outcome.event("wasm", &[("contract_address", child)]);
                outcome.gas_used += INSTANTIATE_GAS;
            }
            (ContractKind::Snip721Migratable, InstantiateMsg::New(init)) => {
                let init: Snip721Instantiate = parse(&init, "InstantiateMsg")?;
                let admin = init.admin.as_deref().unwrap_or(sender);
                let mut nft = Snip721::new(&init.name, &init.symbol, admin, sender);
                nft.minters.push(admin.into());
                ledger.contracts.insert(
                    address.clone(),
                    Contract::running(&address, &code.hash, Model::Snip721(nft)),
                );
            }
            (ContractKind::Snip721Dealer, InstantiateMsg::Migrate(migrate)) => {
                self.migrate_dealer(chain_id, ledger, &address, &code.hash, migrate)?;
            }
            (ContractKind::Snip721Migratable, InstantiateMsg::Migrate(migrate)) => {
                self.migrate_snip721(chain_id, ledger, sender, &address, &code.hash, migrate)?;
            }
        }
        Ok(outcome)
    }

    /// Account that signed `permit`, provided it grants owner access to `contract`.
    fn permit_creator(&self, chain_id: &str, permit: &Permit, contract: &str) -> Result<String, String> {
        permit
            .verify()
            .map_err(|e| format!("Failed to verify signatures for the given permit: {e}"))?;
        if permit.params.chain_id != chain_id {
            return Err(format!(
                "Permit is for chain {}, not {chain_id}",
                permit.params.chain_id
            ));
        }
        if !permit.is_scoped_to(contract, Permission::Owner) {
            return Err(format!(
                "Permit doesn't apply to token {contract:?}, allowed tokens: {:?}",
                permit.params.allowed_tokens
            ));
        }
        self.keys
            .get(&permit.signature.pub_key.value)
            .cloned()
            .ok_or_else(|| "Permit signer has no account on chain".to_string())
    }

    fn check_admin_permit(
        &self,
        chain_id: &str,
        permit: &Permit,
        contract: &str,
        admin: &str,
    ) -> Result<(), String> {
        if self.permit_creator(chain_id, permit, contract)? != admin {
            return Err("Only the admins permit is allowed to initiate migration!".into());
        }
        Ok(())
    }

    fn migrate_dealer(
        &self,
        chain_id: &str,
        ledger: &mut Ledger,
        address: &str,
        code_hash: &str,
        migrate: InstantiateByMigration,
    ) -> Result<(), String> {
        let from = migrate.migrate_from;
        let source = ledger.contract(&from.address)?;
        let dealer = source.dealer()?.clone();
        ensure_running(source.mode)?;
        self.check_admin_permit(chain_id, &from.admin_permit, &from.address, &dealer.admin)?;
        let source_info = source.info();
        let destination = ContractInfo::new(address, code_hash);

        // The child swaps its minter and its migration subscriber in one go.
        let child = ledger.contract_mut(&dealer.child.address)?.snip721_mut()?;
        for minter in child.minters.iter_mut().chain(child.notify.iter_mut()) {
            if *minter == source_info.address {
                *minter = address.into();
            }
        }

        let source = ledger.contract_mut(&from.address)?;
        source.mode = Mode::MigratedOut;
        source.migrated_to = Some(destination);
        let mut contract = Contract::running(address, code_hash, Model::Dealer(dealer));
        contract.migrated_from = Some(source_info);
        ledger.contracts.insert(address.into(), contract);
        Ok(())
    }

    fn migrate_snip721(
        &self,
        chain_id: &str,
        ledger: &mut Ledger,
        sender: &str,
        address: &str,
        code_hash: &str,
        migrate: InstantiateByMigration,
    ) -> Result<(), String> {
        let from = migrate.migrate_from;
        let source = ledger.contract(&from.address)?;
        let nft = source.snip721()?;
        if source.migrated_to.is_some() {
            return Err("The contract has already been migrated!".into());
        }
        ensure_running(source.mode)?;
        self.check_admin_permit(chain_id, &from.admin_permit, &from.address, &nft.admin)?;

        let mut imported = Snip721::new(&nft.name, &nft.symbol, &nft.admin, sender);
        imported.minters = nft.minters.clone();
        imported.notify = nft.notify.clone();
        let source_info = source.info();

        let source = ledger.contract_mut(&from.address)?;
        source.mode = Mode::MigrateOutStarted;
        source.migrated_to = Some(ContractInfo::new(address, code_hash));
        let mut contract = Contract::running(address, code_hash, Model::Snip721(imported));
        contract.mode = Mode::MigrateDataIn;
        contract.migrated_from = Some(source_info);
        ledger.contracts.insert(address.into(), contract);
        Ok(())
    }

    fn query(&self, chain_id: &str, address: &str, code_hash: &str, query: &Value) -> Result<Value, String> {
        let ledger = &self.ledger;
        let contract = ledger.contract(address)?;
        if !code_hash.is_empty() && contract.code_hash != code_hash {
            return Err(format!("code hash mismatch for {address}"));
        }
        if let Ok(query) = serde_json::from_value::<MigrationQuery>(query.clone()) {
            let info = match query {
                MigrationQuery::MigratedFrom {} => &contract.migrated_from,
                MigrationQuery::MigratedTo {} => &contract.migrated_to,
            };
            return Ok(json!({ "migration_info": info }));
        }
        match &contract.model {
            Model::Dealer(dealer) => {
                let query: DealerQueryMsg = parse(query, "QueryMsg")?;
                ensure_running(contract.mode)?;
                Ok(match query {
                    DealerQueryMsg::GetPrices {} => json!({"get_prices": {"prices": dealer.prices}}),
                    DealerQueryMsg::GetChildSnip721 {} => {
                        json!({"contract_info": dealer.child})
                    }
                })
            }
            Model::Snip721(nft) => {
                let query: Snip721QueryMsg = parse(query, "QueryMsg")?;
                let tx_history = matches!(
                    &query,
                    Snip721QueryMsg::WithPermit {
                        query: QueryWithPermit::TransactionHistory { .. },
                        ..
                    }
                );
                match contract.mode {
                    Mode::Running | Mode::MigrateOutStarted => {}
                    // a retired contract still shows its holders what happened
                    Mode::MigratedOut if tx_history => {}
                    other => return Err(mode_error(other)),
                }
                Ok(match query {
                    Snip721QueryMsg::ContractInfo {} => {
                        json!({"contract_info": {"name": nft.name, "symbol": nft.symbol}})
                    }
                    Snip721QueryMsg::ContractConfig {} => json!({"contract_config": {
                        "token_supply_is_public": true,
                        "owner_is_public": false,
                        "sealed_metadata_is_enabled": false,
                        "unwrapped_metadata_is_private": false,
                        "minter_may_update_metadata": true,
                        "owner_may_update_metadata": false,
                        "burn_is_enabled": false,
                    }}),
                    Snip721QueryMsg::NumTokens {} => {
                        json!({"num_tokens": {"count": nft.tokens.len()}})
                    }
                    Snip721QueryMsg::Minters {} => json!({"minters": {"minters": nft.minters}}),
                    Snip721QueryMsg::WithPermit { permit, query } => {
                        let viewer = self.permit_creator(chain_id, &permit, address)?;
                        query_with_permit(nft, &viewer, query)?
                    }
                })
            }
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: &Value, ty: &str) -> Result<T, String> {
    serde_json::from_value(value.clone()).map_err(|e| format!("Error parsing into type {ty}: {e}"))
}

fn new_dealer(
    ledger: &mut Ledger,
    sender: &str,
    address: &str,
    code_hash: &str,
    init: DealerInstantiate,
) -> Result<String, String> {
    let child_code = ledger.code(init.snip721_code_id)?.clone();
    if child_code.kind != ContractKind::Snip721Migratable || child_code.hash != init.snip721_code_hash {
        return Err(format!(
            "code id {} is not the snip721 with hash {}",
            init.snip721_code_id, init.snip721_code_hash
        ));
    }
    let admin = init.admin.as_deref().unwrap_or(sender);
    let child_address = ledger.next_address();
    let mut child = Snip721::new("PurchasableSnip721", "PUR721", admin, address);
    child.minters.push(address.into());
    child.notify.push(address.into());
    ledger.contracts.insert(
        child_address.clone(),
        Contract::running(&child_address, &child_code.hash, Model::Snip721(child)),
    );
    let dealer = Dealer {
        admin: admin.into(),
        prices: init.prices,
        public_metadata: init.public_metadata,
        private_metadata: init.private_metadata,
        child: ContractInfo::new(child_address.clone(), child_code.hash),
    };
    ledger.contracts.insert(
        address.into(),
        Contract::running(address, code_hash, Model::Dealer(dealer)),
    );
    Ok(child_address)
}

fn purchase_mint(
    ledger: &mut Ledger,
    buyer: &str,
    address: &str,
    funds: &[Coin],
) -> Result<Outcome, String> {
    let contract = ledger.contract(address)?;
    ensure_running(contract.mode)?;
    let dealer = contract.dealer()?.clone();
    let [sent] = funds else {
        return Err(format!(
            "Purchase requires one coin denom to be sent with transaction, {} were sent.",
            funds.len()
        ));
    };
    let price = dealer
        .prices
        .iter()
        .find(|it| it.denom == sent.denom)
        .ok_or_else(|| format!("Purchasing in denom:{} is not allowed", sent.denom))?;
    if price.amount != sent.amount {
        return Err(format!(
            "Purchase price in {} is {}, but {} was sent",
            price.denom, price.amount, sent.amount
        ));
    }

    let (height, minted_at) = (ledger.height, ledger.block_time());
    let child = ledger.contract_mut(&dealer.child.address)?;
    ensure_running(child.mode)?;
    let nft = child.snip721_mut()?;
    if !nft.minters.iter().any(|it| it == address) {
        return Err("Only designated minters are allowed to mint".into());
    }
    let token_id = nft.tokens.len().to_string();
    nft.tokens.push(Token {
        id: token_id.clone(),
        owner: buyer.into(),
        public_metadata: dealer.public_metadata,
        private_metadata: dealer.private_metadata,
        collection_creator: nft.creator.clone(),
        token_creator: address.into(),
        time_of_minting: minted_at,
    });
    nft.record(
        height,
        &token_id,
        json!({"mint": {"minter": address, "recipient": buyer}}),
    );
    Ok(Outcome::gas(EXECUTE_GAS * 2)
        .event("wasm", &[("contract_address", address.into())])
        .event(
            "wasm",
            &[
                ("contract_address", dealer.child.address),
                ("token_id", token_id),
            ],
        ))
}

fn transfer_nft(
    ledger: &mut Ledger,
    sender: &str,
    address: &str,
    recipient: &str,
    token_id: &str,
) -> Result<Outcome, String> {
    let height = ledger.height;
    let contract = ledger.contract_mut(address)?;
    ensure_running(contract.mode)?;
    let nft = contract.snip721_mut()?;
    let token = nft
        .tokens
        .iter_mut()
        .find(|it| it.id == token_id)
        .ok_or_else(|| format!("Token ID: {token_id} not found"))?;
    if token.owner != sender {
        return Err(format!("Not authorized to transfer token {token_id}"));
    }
    token.owner = recipient.into();
    nft.record(
        height,
        token_id,
        json!({"transfer": {"from": sender, "recipient": recipient}}),
    );
    Ok(Outcome::gas(EXECUTE_GAS).event("wasm", &[("contract_address", address.into())]))
}

fn migrate_tokens_in(
    ledger: &mut Ledger,
    sender: &str,
    address: &str,
    pages: Option<u32>,
    page_size: u32,
) -> Result<Outcome, String> {
    let contract = ledger.contract(address)?;
    let nft = contract.snip721()?;
    if contract.mode != Mode::MigrateDataIn {
        return Err(mode_error(contract.mode));
    }
    let source = contract
        .migrated_from
        .clone()
        .ok_or_else(|| format!("{address} has nothing to migrate from"))?;
    if sender != nft.admin {
        return Err(format!(
            "This contract's admin must complete migrating contract data from Addr({:?})",
            source.address
        ));
    }
    let source_tokens = ledger.contract(&source.address)?.snip721()?.tokens.clone();
    let total = source_tokens.len() as u32;
    let start = nft.import_cursor;
    let end = match pages {
        Some(pages) => start
            .saturating_add(pages.saturating_mul(page_size.max(1)))
            .min(total),
        None => total,
    };

    let minted_at = ledger.block_time();
    let height = ledger.height;
    let contract = ledger.contract_mut(address)?;
    let destination = contract.info();
    let nft = contract.snip721_mut()?;
    for token in &source_tokens[start as usize..end as usize] {
        nft.record(
            height,
            &token.id,
            json!({"mint": {"minter": destination.address, "recipient": token.owner}}),
        );
        nft.tokens.push(Token {
            collection_creator: nft.creator.clone(),
            token_creator: destination.address.clone(),
            time_of_minting: minted_at,
            ..token.clone()
        });
    }
    nft.import_cursor = end;
    let imported = u64::from(end - start);
    let complete = end == total;
    let answer = if complete {
        let notify = nft.notify.clone();
        contract.mode = Mode::Running;
        ledger.contract_mut(&source.address)?.mode = Mode::MigratedOut;
        for receiver in notify {
            if let Some(Contract {
                model: Model::Dealer(dealer),
                ..
            }) = ledger.contracts.get_mut(&receiver)
                && dealer.child.address == source.address
            {
                dealer.child = destination.clone();
            }
        }
        json!({"migrate_tokens_in": {"complete": true, "next_mint_index": null, "total": null}})
    } else {
        json!({"migrate_tokens_in": {"complete": false, "next_mint_index": end, "total": total}})
    };
    let mut outcome = Outcome::gas(EXECUTE_GAS + imported * IMPORT_GAS_PER_TOKEN)
        .event("wasm", &[("contract_address", address.into())]);
    outcome.data = serde_json::to_vec(&answer).map_err(|e| e.to_string())?;
    Ok(outcome)
}

fn query_with_permit(nft: &Snip721, viewer: &str, query: QueryWithPermit) -> Result<Value, String> {
    Ok(match query {
        QueryWithPermit::NumTokensOfOwner { owner } => {
            if owner != viewer && viewer != nft.admin {
                return Err(format!("{viewer} is not authorized to view tokens of {owner}"));
            }
            let count = nft.tokens.iter().filter(|it| it.owner == owner).count();
            json!({"num_tokens": {"count": count}})
        }
        QueryWithPermit::BatchNftDossier { token_ids } => {
            let dossiers = token_ids
                .iter()
                .map(|id| {
                    nft.tokens
                        .iter()
                        .find(|it| it.id == *id)
                        .map(Token::dossier)
                        .ok_or_else(|| format!("Token ID: {id} not found"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            json!({"batch_nft_dossier": {"nft_dossiers": dossiers}})
        }
        QueryWithPermit::TransactionHistory { .. } => {
            let txs: Vec<&Value> = nft
                .history
                .iter()
                .filter(|tx| tx.to_string().contains(&format!("\"{viewer}\"")))
                .collect();
            json!({"transaction_history": {"total": txs.len(), "txs": txs}})
        }
    })
}

/// Contract kind embedded in an artifact written by [`wasm_artifact`].
fn detect_kind(gzipped: &[u8]) -> Option<ContractKind> {
    let mut wasm = vec![];
    GzDecoder::new(gzipped).read_to_end(&mut wasm).ok()?;
    let body = wasm.strip_prefix(b"\0asm\x01\0\0\0")?;
    ContractKind::iter().find(|kind| body == kind.crate_name().as_bytes())
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<String, ChainError> {
        Ok(self.chain_id.clone())
    }

    async fn simulate(&self, msgs: &[Msg]) -> Result<u64, ChainError> {
        let inner = self.inner.lock();
        if inner.fail_simulations {
            return Err(ChainError::rejected("simulation unavailable"));
        }
        let mut scratch = inner.ledger.clone();
        let outcomes = inner
            .run(&self.chain_id, &mut scratch, msgs)
            .map_err(ChainError::rejected)?;
        Ok(outcomes.iter().map(|it| it.gas_used).sum())
    }

    async fn broadcast(&self, msgs: Vec<Msg>, options: TxOptions) -> Result<TxResponse, ChainError> {
        let mut inner = self.inner.lock();
        inner.broadcasts.push((msgs.clone(), options.clone()));
        let tx_hash = format!("{:064X}", inner.broadcasts.len());
        let mut ledger = inner.ledger.clone();
        let outcomes = inner
            .run(&self.chain_id, &mut ledger, &msgs)
            .map_err(|message| ChainError::Rejected {
                message,
                tx_hash: Some(tx_hash.clone()),
                gas_used: None,
            })?;
        let gas_used = outcomes.iter().map(|it| it.gas_used).sum();
        if gas_used > options.gas_limit {
            return Err(ChainError::Rejected {
                message: format!(
                    "out of gas; gasWanted: {}, gasUsed: {gas_used}: out of gas",
                    options.gas_limit
                ),
                tx_hash: Some(tx_hash),
                gas_used: Some(options.gas_limit),
            });
        }
        inner.ledger = ledger;
        inner.uploads += msgs
            .iter()
            .filter(|it| matches!(it, Msg::StoreCode { .. }))
            .count();
        let (logs, data): (Vec<TxLog>, Vec<Vec<u8>>) = outcomes
            .into_iter()
            .enumerate()
            .map(|(idx, outcome)| {
                (
                    TxLog {
                        msg_index: idx as u32,
                        events: outcome.events,
                    },
                    outcome.data,
                )
            })
            .unzip();
        Ok(TxResponse {
            tx_hash,
            gas_wanted: options.gas_limit,
            gas_used,
            logs,
            data,
        })
    }

    async fn code_hash_by_code_id(&self, code_id: u64) -> Result<String, ChainError> {
        let inner = self.inner.lock();
        inner
            .ledger
            .code(code_id)
            .map(|it| it.hash.clone())
            .map_err(ChainError::Query)
    }

    async fn query_contract_smart(
        &self,
        contract_address: &str,
        code_hash: &str,
        query: &Value,
    ) -> Result<Value, ChainError> {
        self.inner
            .lock()
            .query(&self.chain_id, contract_address, code_hash, query)
            .map_err(ChainError::Query)
    }
}

/// Writes a gzipped stand-in for the optimized build of `kind` into `dir`.
pub fn wasm_artifact(dir: &Path, kind: ContractKind) -> PathBuf {
    let path = dir.join(kind.artifact_file_name());
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"\0asm\x01\0\0\0").unwrap();
    encoder.write_all(kind.crate_name().as_bytes()).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

/// Everything a scenario needs, built explicitly per test.
pub struct Harness {
    pub chain: MockChain,
    pub gas: GasConfig,
    /// `accounts[0]` administers everything the harness deploys.
    pub accounts: Vec<LocalKey>,
    pub store: CodeStore,
    dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let chain = MockChain::default();
        let accounts: Vec<_> = ["secret1admin", "secret1buyer", "secret1other"]
            .into_iter()
            .map(LocalKey::random)
            .collect();
        for account in &accounts {
            chain.register_key(account);
        }
        let dir = tempfile::tempdir().unwrap();
        let store = CodeStore::new(dir.path().join("deployed"));
        Self {
            chain,
            gas: GasConfig::default(),
            accounts,
            store,
            dir,
        }
    }

    pub fn admin(&self) -> &LocalKey {
        &self.accounts[0]
    }

    /// Uploads `kind` at `version`, or reuses an earlier upload of it.
    pub async fn code(&self, kind: ContractKind, version: &str) -> CodeArtifact {
        let artifact = wasm_artifact(self.dir.path(), kind);
        let version = semver::Version::parse(version).unwrap();
        let name = kind.crate_name();
        self.store
            .get_or_store_code(
                &self.chain,
                &self.gas,
                self.admin().address(),
                &artifact,
                &CodeKey {
                    contract_name: &name,
                    version: &version,
                    node_type: "LocalSecret",
                },
            )
            .await
            .unwrap()
    }

    /// A fresh dealer selling mints for [`PURCHASE_PRICE`] uscrt, and its child.
    pub async fn deploy_dealer(&self) -> (ContractInstance, ContractInfo) {
        let dealer_code = self.code(ContractKind::Snip721Dealer, "0.1.0").await;
        let nft_code = self.code(ContractKind::Snip721Migratable, "0.1.0").await;
        let init = InstantiateMsg::New(DealerInstantiate {
            snip721_code_hash: nft_code.code_hash,
            snip721_code_id: nft_code.code_id,
            snip721_label: deployer::random_label("MigratableSnip721"),
            prices: vec![Coin::uscrt(PURCHASE_PRICE)],
            public_metadata: Some(Metadata::uri("https://example.com/public")),
            private_metadata: Some(Metadata::uri("https://example.com/private")),
            admin: Some(self.admin().address().into()),
            entropy: deployer::fresh_entropy(),
            royalty_info: None,
        });
        let dealer = deployer::instantiate(
            &self.chain,
            &self.gas,
            &dealer_code,
            &init,
            InstantiateOptions::new(
                self.admin().address(),
                deployer::random_label(ContractKind::Snip721Dealer.label_base()),
            ),
        )
        .await
        .unwrap();
        let child = contracts::query_child_snip721(&self.chain, &dealer.info())
            .await
            .unwrap();
        (dealer, child)
    }

    pub async fn purchase(&self, buyer: &LocalKey, dealer: &ContractInfo) -> ExecuteResult {
        contracts::purchase_mint(
            &self.chain,
            &self.gas,
            buyer.address(),
            dealer,
            vec![Coin::uscrt(PURCHASE_PRICE)],
        )
        .await
        .unwrap()
    }
}
