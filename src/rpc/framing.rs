//! Newline-terminated message framing for JSON-RPC over TCP.
//!
//! Go's `net/rpc/jsonrpc` server writes every response through a
//! `json.Encoder`, which terminates each document with `\n`. Requests are
//! read by a streaming `json.Decoder` and need no delimiter at all.
//!
//! # Wire Format
//!
//! ```text
//! client -> server   {"id":0,"method":"Arith.Multiply","params":[{"A":7,"B":8}]}
//! server -> client   {"id":0,"result":56,"error":null}\n
//! ```

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::rpc::error::{Result, RpcError};

/// Size of each socket read.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Maximum response size (100MB) to prevent OOM from a server that never
/// sends the terminator.
pub const MAX_RESPONSE_SIZE: usize = 100 * 1024 * 1024;

/// Read one newline-terminated response from the stream.
///
/// # Protocol
///
/// 1. Read up to [`READ_CHUNK_SIZE`] bytes at a time
/// 2. Append each chunk to the message as-is
/// 3. Stop once the most recent chunk ends with `\n`
///
/// # Errors
///
/// Returns an error if:
/// - The stream is closed (zero-length read)
/// - The socket read fails
/// - The message grows past [`MAX_RESPONSE_SIZE`]
pub async fn read_framed_response<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    read_framed_response_limited(reader, MAX_RESPONSE_SIZE).await
}

/// [`read_framed_response`] with an explicit size limit.
pub async fn read_framed_response_limited<R>(reader: &mut R, max_size: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut message = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut chunk).await?;

        // EOF - connection closed
        if bytes_read == 0 {
            return Err(RpcError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Connection closed by server",
            )));
        }

        message.extend_from_slice(&chunk[..bytes_read]);
        trace!(bytes_read, total = message.len(), "read response chunk");

        if message.len() > max_size {
            return Err(RpcError::ResponseTooLarge {
                size: message.len(),
                max: max_size,
            });
        }

        if chunk[bytes_read - 1] == b'\n' {
            return Ok(message);
        }
    }
}

/// Write a serialized request to the stream.
///
/// The bytes go out unchanged; no delimiter is appended.
pub async fn write_request<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}
