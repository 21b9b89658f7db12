//! gojsonrpc-client Library
//!
//! A reconnecting client for servers built on Go's `net/rpc/jsonrpc`
//! package:
//!
//! - `rpc` - connection management, framing and call dispatch
//!
//! # RPC Module
//!
//! ```ignore
//! use gojsonrpc_client::rpc::{ClientConfig, RpcClient};
//!
//! let config = ClientConfig::new("127.0.0.1", 1234, "Arith").with_retries(5);
//! let mut client = RpcClient::connect(config).await?;
//! let product = client.call("Multiply", serde_json::json!({"A": 7, "B": 8})).await?;
//! ```

pub mod rpc;
