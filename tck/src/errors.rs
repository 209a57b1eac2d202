//! JSON-RPC error objects and the mapping from SDK failures onto them.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
/// The ledger said no: precheck, receipt, expiry, or retries exhausted.
pub const HIERO_ERROR: i32 = -32001;

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message} ({code})")]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request() -> Self {
        Self::new(INVALID_REQUEST, "Invalid Request")
    }

    pub fn method_not_found() -> Self {
        Self::new(METHOD_NOT_FOUND, "Method not found")
    }

    /// `detail` goes into the message, e.g. "Invalid params: nodes must be
    /// a list of strings".
    pub fn invalid_params(detail: impl AsRef<str>) -> Self {
        Self::new(INVALID_PARAMS, format!("Invalid params: {}", detail.as_ref()))
    }

    pub fn internal(detail: impl ToString) -> Self {
        Self::new(INTERNAL_ERROR, "Internal error").with_data(Value::String(detail.to_string()))
    }
}

impl From<hiero_sdk::Error> for JsonRpcError {
    fn from(e: hiero_sdk::Error) -> Self {
        use hiero_sdk::Error;

        match &e {
            Error::InvalidArgument(_) | Error::Key(_) => JsonRpcError::invalid_params(e.to_string()),
            _ if e.is_ledger_error() => JsonRpcError::new(HIERO_ERROR, "Hiero error").with_data(json!({
                "status": e.status().map(|s| s.name()),
                "message": e.to_string(),
            })),
            _ => JsonRpcError::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiero_sdk::{AccountId, Status};

    #[test]
    fn data_is_omitted_when_absent() {
        let value = serde_json::to_value(JsonRpcError::method_not_found()).unwrap();
        assert_eq!(value, json!({"code": -32601, "message": "Method not found"}));
    }

    #[test]
    fn sdk_errors_map_by_kind() {
        let bad_input = JsonRpcError::from(hiero_sdk::Error::InvalidArgument("zero amount".into()));
        assert_eq!(bad_input.code, INVALID_PARAMS);

        let ledger = JsonRpcError::from(hiero_sdk::Error::Precheck {
            status: Status::InsufficientPayerBalance,
            transaction_id: None,
            node: AccountId::new(0, 0, 3),
            attempts: 1,
        });
        assert_eq!(ledger.code, HIERO_ERROR);
        assert_eq!(ledger.data.unwrap()["status"], "INSUFFICIENT_PAYER_BALANCE");

        let lifecycle = JsonRpcError::from(hiero_sdk::Error::IllegalState("no operator".into()));
        assert_eq!(lifecycle.code, INTERNAL_ERROR);
    }
}
