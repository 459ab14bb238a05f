//! Wire envelope
//!
//! One JSON object per text frame:
//! - call: `{"id": 7, "method": "registerApp", "payload": {...}}`
//! - success reply: `{"id": 7, "result": {...}}`
//! - error reply: `{"id": 7, "error": {"message": "..."}}`

use crate::util::errors::{IntentLinkError, IntentLinkResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const REGISTER_APP_METHOD: &str = "registerApp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpcMessage {
    Call {
        id: u64,
        method: String,
        payload: Value,
    },
    Reply {
        id: u64,
        result: Result<Value, RpcErrorBody>,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Envelope {
    id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<RpcErrorBody>,
}

impl RpcMessage {
    pub fn call(id: u64, method: impl Into<String>, payload: Value) -> Self {
        Self::Call {
            id,
            method: method.into(),
            payload,
        }
    }

    pub fn success(id: u64, result: Value) -> Self {
        Self::Reply {
            id,
            result: Ok(result),
        }
    }

    pub fn failure(id: u64, message: impl Into<String>) -> Self {
        Self::Reply {
            id,
            result: Err(RpcErrorBody {
                message: message.into(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Self::Call { id, .. } | Self::Reply { id, .. } => *id,
        }
    }

    pub fn encode(&self) -> IntentLinkResult<String> {
        let envelope = match self {
            Self::Call {
                id,
                method,
                payload,
            } => Envelope {
                id: *id,
                method: Some(method.clone()),
                payload: Some(payload.clone()),
                ..Default::default()
            },
            Self::Reply { id, result: Ok(value) } => Envelope {
                id: *id,
                result: Some(value.clone()),
                ..Default::default()
            },
            Self::Reply {
                id,
                result: Err(error),
            } => Envelope {
                id: *id,
                error: Some(error.clone()),
                ..Default::default()
            },
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// A frame with `method` is a call; anything else is a reply, failed if it
    /// carries `error`. A null or missing `result` decodes as `null`.
    pub fn decode(frame: &str) -> IntentLinkResult<Self> {
        let envelope: Envelope = serde_json::from_str(frame)
            .map_err(|e| IntentLinkError::protocol(format!("Invalid frame: {}", e)))?;

        if let Some(method) = envelope.method {
            if method.is_empty() {
                return Err(IntentLinkError::protocol("Call with empty method name"));
            }
            return Ok(Self::Call {
                id: envelope.id,
                method,
                payload: envelope.payload.unwrap_or(Value::Null),
            });
        }

        let result = match envelope.error {
            Some(error) => Err(error),
            None => Ok(envelope.result.unwrap_or(Value::Null)),
        };
        Ok(Self::Reply {
            id: envelope.id,
            result,
        })
    }
}
