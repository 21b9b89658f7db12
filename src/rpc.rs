//! JSON-RPC client for Go `net/rpc/jsonrpc` servers.
//!
//! This module provides the client side of the Go JSON-RPC 1.0 codec over
//! a persistent TCP connection, with backoff on connect and a single
//! transparent reconnect-and-resend when a call hits a dead connection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐             TCP              ┌─────────────────────┐
//! │   RpcClient     │  ◄──────────────────────────►│  Go net/rpc server  │
//! │  (one object)   │   JSON request / JSON + \n   │   (jsonrpc codec)   │
//! └─────────────────┘                              └─────────────────────┘
//! ```
//!
//! # Protocol
//!
//! Requests are bare JSON documents; responses end with a newline:
//!
//! ```text
//! {"id":0,"method":"Arith.Multiply","params":[{"A":7,"B":8}]}
//! {"id":0,"result":56,"error":null}\n
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gojsonrpc_client::rpc::{ClientConfig, RpcClient};
//! use serde_json::json;
//!
//! let mut client = RpcClient::connect(ClientConfig::new("127.0.0.1", 1234, "Arith")).await?;
//! let result = client.call("Multiply", json!({"A": 7, "B": 8})).await?;
//! ```

mod backoff;
mod client;
mod config;
mod connection;
mod error;
mod framing;
mod protocol;

pub use backoff::{Backoff, INITIAL_DELAY};
pub use client::RpcClient;
pub use config::{
    default_config_path, ClientConfig, RetryLimit, ServerAddress, CONFIG_ENV_VAR,
    DEFAULT_MAX_SLEEP_SECS, DEFAULT_RETRIES,
};
pub use connection::{connect_with_backoff, Connector, TcpConnector};
pub use error::{Result, RpcError};
pub use framing::{
    read_framed_response, read_framed_response_limited, write_request, MAX_RESPONSE_SIZE,
    READ_CHUNK_SIZE,
};
pub use protocol::{RequestEnvelope, ResponseEnvelope};
