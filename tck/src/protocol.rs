//! JSON-RPC 2.0 envelope handling.
//!
//! Parsing is deliberately strict about the envelope and lenient about
//! nothing else: a request must be an object with `jsonrpc: "2.0"`, a string
//! `method`, an `id`, and params that are an object, an array, or absent.
//! A `sessionId` inside object params is lifted out before dispatch, so the
//! handlers never see it.

use serde_json::{json, Map, Value};

use crate::errors::JsonRpcError;

/// A request that passed envelope validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    /// Object, array, or `Null`. Never contains `sessionId`.
    pub params: Value,
    pub id: Value,
    pub session_id: Option<String>,
}

/// A rejected request, with whatever id could be recovered (else `null`).
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRequest {
    pub error: JsonRpcError,
    pub id: Value,
}

impl RejectedRequest {
    fn new(error: JsonRpcError, id: Value) -> Self {
        Self { error, id }
    }
}

pub fn parse_request(body: &str) -> Result<ParsedRequest, RejectedRequest> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| RejectedRequest::new(JsonRpcError::parse_error(), Value::Null))?;

    let Value::Object(mut envelope) = value else {
        return Err(RejectedRequest::new(JsonRpcError::invalid_request(), Value::Null));
    };
    let id = envelope.get("id").cloned().unwrap_or(Value::Null);
    let invalid = |id: &Value| RejectedRequest::new(JsonRpcError::invalid_request(), id.clone());

    if envelope.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(invalid(&id));
    }
    let Some(method) = envelope.get("method").and_then(Value::as_str).map(str::to_owned) else {
        return Err(invalid(&id));
    };
    if !envelope.contains_key("id") {
        return Err(invalid(&id));
    }

    let mut params = envelope.remove("params").unwrap_or(Value::Null);
    let session_id = match &mut params {
        Value::Object(map) => match map.remove("sessionId") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(invalid(&id)),
        },
        Value::Array(_) | Value::Null => None,
        _ => return Err(invalid(&id)),
    };

    Ok(ParsedRequest {
        method,
        params,
        id,
        session_id,
    })
}

pub fn success_response(result: Value, id: Value) -> Value {
    json!({ "jsonrpc": "2.0", "result": result, "id": id })
}

pub fn error_response(error: &JsonRpcError, id: Value) -> Value {
    json!({ "jsonrpc": "2.0", "error": error, "id": id })
}

/// Params as an object, or `Invalid Request` when they are anything else.
/// Absent params count as an empty object.
pub fn params_object(params: Value) -> Result<Map<String, Value>, JsonRpcError> {
    match params {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(JsonRpcError::invalid_request()),
    }
}
