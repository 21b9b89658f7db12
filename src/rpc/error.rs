//! Error types for the JSON-RPC client.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by [`RpcClient`](crate::rpc::RpcClient) operations.
///
/// Only the I/O-class variants (`Io`, `Timeout`, `Decode`,
/// `ResponseTooLarge`) take the reconnect-and-resend path inside
/// `call`. Everything else is terminal for the call that produced it.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The client configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Connection establishment gave up after its retry budget.
    #[error("Connection to {address} failed after {attempts} attempt(s): {source}")]
    Connection {
        /// `host:port` that was dialled
        address: String,
        /// Number of attempts made, including the failing one
        attempts: u64,
        /// Error from the final attempt
        #[source]
        source: std::io::Error,
    },

    /// Send or receive on the live connection failed.
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// No complete response arrived within the configured read timeout.
    #[error("Response timed out after {0:.3}s")]
    Timeout(f64),

    /// The request could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The framed response (or its result) was not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The peer kept sending without a terminating newline.
    #[error("Response size {size} exceeds maximum {max} bytes")]
    ResponseTooLarge {
        /// Bytes accumulated so far
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// The response id did not match the request id.
    #[error("Mismatched message ids: sent {expected}, received {actual}")]
    Protocol {
        /// Id of the request that was sent
        expected: u64,
        /// Id carried by the response, rendered as JSON
        actual: String,
    },

    /// The server answered with a non-null `error` member.
    #[error("Remote error: {}", display_payload(.0))]
    Remote(Value),
}

impl RpcError {
    /// Whether the dispatcher recovers from this error by reconnecting
    /// and resending once.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RpcError::Io(_)
                | RpcError::Timeout(_)
                | RpcError::Decode(_)
                | RpcError::ResponseTooLarge { .. }
        )
    }

    /// The server's error payload, if this is a remote error.
    pub fn remote_payload(&self) -> Option<&Value> {
        match self {
            RpcError::Remote(payload) => Some(payload),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RpcError {
    fn from(err: std::io::Error) -> Self {
        RpcError::Io(err)
    }
}

/// Go servers send plain strings; show those without JSON quoting.
fn display_payload(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Result alias used across the client.
pub type Result<T> = std::result::Result<T, RpcError>;
