//! # Wire Envelope
//!
//! The binary messages exchanged with nodes. Encoding is `bincode` with its
//! default fixed-width little-endian configuration, which is deterministic:
//! the same value always encodes to the same bytes. That property is what
//! lets a frozen transaction be re-serialized on every attempt and still
//! carry valid signatures.
//!
//! Signatures never live inside [`TransactionBody`]. A
//! [`SignedTransaction`] carries the exact body bytes that were signed plus
//! a signature map beside them, so adding a signer never changes what the
//! other signers signed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::id::{AccountId, TokenId};
use crate::status::Status;

/// Encodes any envelope type.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

/// Decodes any envelope type.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Seconds plus nanos, as sent on the wire. Unvalidated; see
/// [`crate::Timestamp::from_wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransactionId {
    pub account_id: AccountId,
    pub valid_start: WireTimestamp,
}

// ---------------------------------------------------------------------------
// Crypto transfer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAmount {
    pub account_id: AccountId,
    pub amount: i64,
    pub is_approval: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransfer {
    pub sender_account_id: AccountId,
    pub receiver_account_id: AccountId,
    pub serial_number: i64,
    pub is_approval: bool,
}

/// All movements of one token. A list carries either fungible `transfers`
/// or `nft_transfers`, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransferList {
    pub token: TokenId,
    pub transfers: Vec<AccountAmount>,
    pub nft_transfers: Vec<NftTransfer>,
    pub expected_decimals: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoTransferBody {
    pub transfers: Vec<AccountAmount>,
    pub token_transfers: Vec<TokenTransferList>,
}

/// The operation-specific part of a transaction body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationBody {
    CryptoTransfer(CryptoTransferBody),
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Everything a signature covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub transaction_id: WireTransactionId,
    pub node_account_id: AccountId,
    pub transaction_fee: u64,
    pub transaction_valid_duration_secs: i64,
    pub memo: String,
    pub operation: OperationBody,
}

/// The body of a transaction wrapped in a schedule: no id, no node, since
/// the scheduling transaction supplies both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulableTransactionBody {
    pub transaction_fee: u64,
    pub memo: String,
    pub operation: OperationBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePair {
    pub public_key: [u8; 32],
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub body_bytes: Vec<u8>,
    pub sig_map: Vec<SignaturePair>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Query {
    TransactionReceipt { transaction_id: WireTransactionId },
    AccountBalance { account_id: AccountId },
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// What a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    SubmitTransaction(SignedTransaction),
    Query(Query),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireReceipt {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsePayload {
    None,
    Receipt(WireReceipt),
    AccountBalance { hbars: u64 },
}

/// What a node answers. `precheck` is the node's verdict on the request
/// itself; the payload is only meaningful when it is `OK`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub precheck: Status,
    pub payload: ResponsePayload,
}

impl Response {
    pub fn precheck(status: Status) -> Self {
        Self {
            precheck: status,
            payload: ResponsePayload::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(node: u64) -> TransactionBody {
        TransactionBody {
            transaction_id: WireTransactionId {
                account_id: AccountId::new(0, 0, 2),
                valid_start: WireTimestamp {
                    seconds: 1_700_000_000,
                    nanos: 7,
                },
            },
            node_account_id: AccountId::new(0, 0, node),
            transaction_fee: 100_000_000,
            transaction_valid_duration_secs: 120,
            memo: "hello".into(),
            operation: OperationBody::CryptoTransfer(CryptoTransferBody {
                transfers: vec![AccountAmount {
                    account_id: AccountId::new(0, 0, 2),
                    amount: -5,
                    is_approval: false,
                }],
                token_transfers: vec![],
            }),
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode(&body(3)).unwrap(), encode(&body(3)).unwrap());
        assert_ne!(encode(&body(3)).unwrap(), encode(&body(4)).unwrap());
    }

    #[test]
    fn response_decodes() {
        let response = Response {
            precheck: Status::Ok,
            payload: ResponsePayload::Receipt(WireReceipt {
                status: Status::Success,
            }),
        };
        let decoded: Response = decode(&encode(&response).unwrap()).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn garbage_is_a_codec_error() {
        let err = decode::<Response>(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, crate::Error::Codec(_)));
    }
}
