//! JSON-RPC method handlers.
//!
//! | Method          | Does                                                   |
//! |-----------------|--------------------------------------------------------|
//! | `setup`         | Builds a client for the session and sets its operator  |
//! | `reset`         | Forgets the session's client                           |
//! | `transferCrypto`| Runs a transfer through freeze, execute and receipt    |

use std::str::FromStr;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use hiero_sdk::{AccountId, Client, Network, NftId, PrivateKey, TokenId, TransferTransaction};

use crate::errors::JsonRpcError;
use crate::protocol::params_object;
use crate::server::AppState;
use crate::sessions::{SessionRegistry, DEFAULT_SESSION};

/// The methods this server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Setup,
    Reset,
    TransferCrypto,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Reset => "reset",
            Self::TransferCrypto => "transferCrypto",
        }
    }
}

impl FromStr for Method {
    type Err = JsonRpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(Self::Setup),
            "reset" => Ok(Self::Reset),
            "transferCrypto" => Ok(Self::TransferCrypto),
            _ => Err(JsonRpcError::method_not_found()),
        }
    }
}

pub async fn dispatch(
    state: &AppState,
    method: Method,
    params: Value,
    session_id: Option<&str>,
) -> Result<Value, JsonRpcError> {
    let session_id = session_id.unwrap_or(DEFAULT_SESSION);
    match method {
        Method::Setup => setup(state, params_object(params)?, session_id),
        Method::Reset => Ok(reset(state, session_id)),
        Method::TransferCrypto => transfer_crypto(state, params, session_id).await,
    }
}

// ---------------------------------------------------------------------------
// setup / reset
// ---------------------------------------------------------------------------

fn setup(state: &AppState, params: Map<String, Value>, session_id: &str) -> Result<Value, JsonRpcError> {
    let account_id: AccountId = required_str(&params, "operatorAccountId")?.parse()?;
    let private_key = PrivateKey::from_string(required_str(&params, "operatorPrivateKey")?)
        .map_err(hiero_sdk::Error::from)?;
    let network = network_from(params.get("network"))?;

    let client = match &state.transport {
        Some(transport) => Client::with_transport(network, transport.clone()),
        None => Client::for_network(network),
    }
    .with_operator(account_id, private_key);

    let replaced = state.sessions.create(session_id, client).is_some();
    state.metrics.active_sessions.set(state.sessions.len() as i64);
    info!(session_id, operator = %account_id, replaced, "session configured");

    Ok(json!({ "status": "success", "sessionId": session_id }))
}

fn reset(state: &AppState, session_id: &str) -> Value {
    let removed = SessionRegistry::drop(&state.sessions, session_id);
    state.metrics.active_sessions.set(state.sessions.len() as i64);
    info!(session_id, removed, "session reset");
    json!({ "status": "reset completed" })
}

fn required_str<'a>(params: &'a Map<String, Value>, key: &str) -> Result<&'a str, JsonRpcError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("missing or incorrect type for {key}")))
}

/// Absent means testnet. A string names a well-known network; an object
/// lists custom node addresses, numbered from 0.0.3.
fn network_from(network: Option<&Value>) -> Result<Network, JsonRpcError> {
    match network {
        None | Some(Value::Null) => Ok(Network::testnet()),
        Some(Value::String(name)) => Network::for_name(name)
            .map_err(|_| JsonRpcError::invalid_params("unknown network specification")),
        Some(Value::Object(custom)) => {
            let nodes = custom
                .get("nodes")
                .and_then(Value::as_array)
                .and_then(|nodes| nodes.iter().map(Value::as_str).collect::<Option<Vec<_>>>())
                .ok_or_else(|| JsonRpcError::invalid_params("nodes must be a list of strings"))?;
            Ok(Network::from_addresses(&nodes)?)
        }
        Some(_) => Err(JsonRpcError::invalid_params("unknown network specification")),
    }
}

// ---------------------------------------------------------------------------
// transferCrypto
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferCryptoParams {
    transfers: Vec<TransferParam>,
    memo: Option<String>,
    max_transaction_fee: Option<Number>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferParam {
    hbar: Option<HbarParam>,
    token: Option<TokenParam>,
    nft: Option<NftParam>,
    #[serde(default)]
    approved: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HbarParam {
    account_id: String,
    amount: Number,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenParam {
    account_id: String,
    token_id: String,
    amount: Number,
    decimals: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NftParam {
    sender_account_id: String,
    receiver_account_id: String,
    token_id: String,
    serial_number: Number,
}

/// Harnesses send 64-bit amounts as strings so they survive JavaScript.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Number {
    Int(i64),
    Text(String),
}

impl Number {
    fn get(&self, field: &str) -> Result<i64, JsonRpcError> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Text(s) => s
                .parse()
                .map_err(|_| JsonRpcError::invalid_params(format!("{field} is not an integer: {s:?}"))),
        }
    }
}

async fn transfer_crypto(state: &AppState, params: Value, session_id: &str) -> Result<Value, JsonRpcError> {
    let client = state
        .sessions
        .get(session_id)
        .ok_or_else(|| JsonRpcError::internal(format!("session {session_id:?} has not been set up")))?;
    let params: TransferCryptoParams =
        serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;

    let mut tx = TransferTransaction::new();
    for transfer in &params.transfers {
        tx = apply_transfer(tx, transfer)?;
    }
    if let Some(memo) = params.memo {
        tx = tx.memo(memo)?;
    }
    if let Some(fee) = &params.max_transaction_fee {
        let fee = u64::try_from(fee.get("maxTransactionFee")?)
            .map_err(|_| JsonRpcError::invalid_params("maxTransactionFee must not be negative"))?;
        tx = tx.max_transaction_fee(fee);
    }

    let mut frozen = tx.freeze_with(&client)?;
    debug!(session_id, transaction_id = %frozen.transaction_id(), "submitting transfer");
    let response = frozen.execute(&client).await?;
    let receipt = response.get_receipt(&client).await?;

    Ok(json!({
        "status": receipt.status.name(),
        "transactionId": receipt.transaction_id.to_string(),
    }))
}

fn apply_transfer(tx: TransferTransaction, transfer: &TransferParam) -> Result<TransferTransaction, JsonRpcError> {
    let approved = transfer.approved;
    let tx = match (&transfer.hbar, &transfer.token, &transfer.nft) {
        (Some(hbar), None, None) => {
            let account: AccountId = hbar.account_id.parse()?;
            let amount = hbar.amount.get("amount")?;
            if approved {
                tx.add_approved_hbar_transfer(account, amount)?
            } else {
                tx.add_hbar_transfer(account, amount)?
            }
        }
        (None, Some(token), None) => {
            let token_id: TokenId = token.token_id.parse()?;
            let account: AccountId = token.account_id.parse()?;
            let amount = token.amount.get("amount")?;
            match (approved, token.decimals) {
                (false, None) => tx.add_token_transfer(token_id, account, amount)?,
                (false, Some(d)) => tx.add_token_transfer_with_decimals(token_id, account, amount, d)?,
                (true, None) => tx.add_approved_token_transfer(token_id, account, amount)?,
                (true, Some(d)) => tx.add_approved_token_transfer_with_decimals(token_id, account, amount, d)?,
            }
        }
        (None, None, Some(nft)) => {
            let serial = nft.serial_number.get("serialNumber")?;
            if serial <= 0 {
                return Err(JsonRpcError::invalid_params(format!("serialNumber must be positive, got {serial}")));
            }
            let nft_id = NftId::new(nft.token_id.parse()?, serial);
            let sender: AccountId = nft.sender_account_id.parse()?;
            let receiver: AccountId = nft.receiver_account_id.parse()?;
            if approved {
                tx.add_approved_nft_transfer(nft_id, sender, receiver)?
            } else {
                tx.add_nft_transfer(nft_id, sender, receiver)?
            }
        }
        _ => {
            return Err(JsonRpcError::invalid_params(
                "each transfer needs exactly one of hbar, token or nft",
            ))
        }
    };
    Ok(tx)
}
