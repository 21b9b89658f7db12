//! Connection establishment with exponential backoff.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::rpc::backoff::Backoff;
use crate::rpc::config::{ClientConfig, ServerAddress};
use crate::rpc::error::{Result, RpcError};

/// Opens byte streams to a server.
///
/// [`TcpConnector`] is the production implementation; tests substitute
/// connectors that refuse, hang up or script the server side.
pub trait Connector {
    /// The stream type produced by a successful connect.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Make a single connection attempt.
    fn connect(
        &self,
        address: &ServerAddress,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP, no TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, address: &ServerAddress) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((address.host.as_str(), address.port)).await?;
        // Requests are small and strictly request/response.
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// Connect, retrying with exponential backoff.
///
/// Attempts are counted from 1. With a bounded retry limit of `n`, the
/// failure of attempt `n` is returned immediately, without a further
/// sleep. With an unbounded limit this only returns on success.
///
/// # Errors
///
/// Returns `RpcError::Connection` carrying the last attempt's error once
/// the retry budget is spent.
pub async fn connect_with_backoff<C>(connector: &C, config: &ClientConfig) -> Result<C::Stream>
where
    C: Connector,
{
    let limit = config.retry_limit();
    let mut backoff = Backoff::new(config.max_sleep());
    let mut attempt: u64 = 0;

    loop {
        attempt = attempt.saturating_add(1);

        match connector.connect(&config.address).await {
            Ok(stream) => {
                debug!(address = %config.address, attempt, "connected");
                return Ok(stream);
            }
            Err(source) => {
                if limit.is_exhausted(attempt) {
                    warn!(
                        address = %config.address,
                        attempt,
                        error = %source,
                        "giving up on connection"
                    );
                    return Err(RpcError::Connection {
                        address: config.address.to_string(),
                        attempts: attempt,
                        source,
                    });
                }

                let delay = backoff.next_delay();
                warn!(
                    address = %config.address,
                    attempt,
                    error = %source,
                    "connection failed, retrying in {:?}",
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}
