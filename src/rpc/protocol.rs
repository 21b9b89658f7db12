//! Request and response envelopes of the Go `net/rpc/jsonrpc` codec.
//!
//! This is JSON-RPC 1.0 as Go speaks it: no `jsonrpc` version member,
//! `params` is always a one-element array, and `error` is either `null`
//! or (usually) a plain string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rpc::error::{Result, RpcError};

/// Outgoing call.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope<P> {
    /// Call id, echoed back by the server.
    pub id: u64,
    /// Fully qualified `Object.Method` name.
    pub method: String,
    /// The single call argument wrapped in a one-element array.
    pub params: [P; 1],
}

impl<P: Serialize> RequestEnvelope<P> {
    pub fn new(id: u64, method: impl Into<String>, params: P) -> Self {
        Self {
            id,
            method: method.into(),
            params: [params],
        }
    }

    /// Serialize to the exact bytes sent on the wire.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(RpcError::Encode)
    }
}

/// Incoming reply.
///
/// `id` stays a raw JSON value: a desynchronized or malformed stream may
/// carry `null` or a non-integer id, and that must surface as an id
/// mismatch rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Value,
}

impl ResponseEnvelope {
    /// Decode one framed response.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(RpcError::Decode)
    }

    /// Check the envelope against the request it answers and extract the result.
    ///
    /// A non-null `error` wins over an id mismatch.
    pub fn into_result(self, expected_id: u64) -> Result<Value> {
        if !self.error.is_null() {
            return Err(RpcError::Remote(self.error));
        }

        if self.id.as_u64() != Some(expected_id) {
            return Err(RpcError::Protocol {
                expected: expected_id,
                actual: self.id.to_string(),
            });
        }

        Ok(self.result)
    }
}
