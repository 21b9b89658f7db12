//! Reconnecting JSON-RPC client for Go `net/rpc/jsonrpc` servers.
//!
//! This module provides `RpcClient`, which keeps one TCP connection open,
//! sends `Object.Method` calls one at a time and transparently reconnects
//! once when a call hits a broken connection.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::rpc::config::ClientConfig;
use crate::rpc::connection::{connect_with_backoff, Connector, TcpConnector};
use crate::rpc::error::{Result, RpcError};
use crate::rpc::framing::{read_framed_response, write_request};
use crate::rpc::protocol::{RequestEnvelope, ResponseEnvelope};

/// JSON-RPC client bound to a single remote object.
///
/// The client owns exactly one connection and a call id counter that
/// starts at zero. Calls take `&mut self`, so only one can be in flight;
/// share a client between tasks behind a `tokio::sync::Mutex`.
///
/// # Connection Lifecycle
///
/// - `connect()` - Establish the initial connection (with backoff)
/// - `call()` - Send a request and wait for the matching response
/// - On a send/receive failure, `call()` reconnects (with backoff) and
///   resends the same bytes exactly once
///
/// No read timeout applies unless `read_timeout` is configured; a hung
/// server otherwise blocks the call.
///
/// # Example
///
/// ```ignore
/// use gojsonrpc_client::rpc::{ClientConfig, RpcClient};
/// use serde_json::json;
///
/// let config = ClientConfig::new("127.0.0.1", 1234, "Arith").with_retries(5);
/// let mut client = RpcClient::connect(config).await?;
///
/// let product = client.call("Multiply", json!({"A": 7, "B": 8})).await?;
/// assert_eq!(product, json!(56));
/// ```
pub struct RpcClient<C: Connector = TcpConnector> {
    config: ClientConfig,
    connector: C,
    /// The live connection. Replaced wholesale on reconnect.
    stream: C::Stream,
    /// Id for the next logical call.
    next_id: u64,
}

impl RpcClient<TcpConnector> {
    /// Connect to the server over TCP.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Config` for an invalid configuration and
    /// `RpcError::Connection` when a bounded retry budget runs out.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::with_connector(config, TcpConnector).await
    }
}

impl<C: Connector> RpcClient<C> {
    /// Connect through a custom [`Connector`].
    pub async fn with_connector(config: ClientConfig, connector: C) -> Result<Self> {
        config.validate()?;
        let stream = connect_with_backoff(&connector, &config).await?;
        info!(address = %config.address, object = %config.object_name, "connected to RPC server");

        Ok(Self {
            config,
            connector,
            stream,
            next_id: 0,
        })
    }

    /// Call `method` on the configured object with a single argument.
    ///
    /// The method name is prefixed with the object name, so
    /// `call("Multiply", args)` invokes `Arith.Multiply` for object `Arith`.
    /// Multi-argument methods take one aggregate value (a struct or map).
    ///
    /// # Errors
    ///
    /// - `RpcError::Remote` if the server returned a non-null `error`
    /// - `RpcError::Protocol` if the response id does not match
    /// - `RpcError::Io` / `Timeout` / `Decode` if the resend also failed
    /// - `RpcError::Connection` if reconnecting ran out of retries
    /// - `RpcError::Encode` if `params` cannot be serialized
    pub async fn call<P>(&mut self, method: &str, params: P) -> Result<Value>
    where
        P: Serialize,
    {
        let id = self.allocate_id();
        let request = RequestEnvelope::new(id, self.config.method_path(method), params);
        let payload = request.to_bytes()?;
        debug!(id, method = %request.method, "sending call");

        let response = match self.exchange(&payload).await {
            Ok(response) => response,
            Err(err) if err.is_recoverable() => {
                warn!(id, method = %request.method, error = %err, "call failed, reconnecting");
                self.reconnect().await?;
                self.exchange(&payload).await?
            }
            Err(err) => return Err(err),
        };

        response.into_result(id)
    }

    /// Like [`call`](Self::call), deserializing the result into `T`.
    pub async fn call_as<T, P>(&mut self, method: &str, params: P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(RpcError::Decode)
    }

    /// Replace the current connection with a fresh one.
    ///
    /// The old connection is dropped only once the new one is up; if the
    /// retry budget runs out the old (probably dead) stream is kept.
    pub async fn reconnect(&mut self) -> Result<()> {
        let stream = connect_with_backoff(&self.connector, &self.config).await?;
        self.stream = stream;
        info!(address = %self.config.address, "reconnected to RPC server");
        Ok(())
    }

    /// The id the next call will use.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// One send + receive on the current connection.
    async fn exchange(&mut self, payload: &[u8]) -> Result<ResponseEnvelope> {
        write_request(&mut self.stream, payload).await?;

        let frame = match self.config.read_timeout() {
            Some(limit) => timeout(limit, read_framed_response(&mut self.stream))
                .await
                .map_err(|_| RpcError::Timeout(limit.as_secs_f64()))??,
            None => read_framed_response(&mut self.stream).await?,
        };
        debug!(bytes = frame.len(), "received response");

        ResponseEnvelope::decode(&frame)
    }
}
