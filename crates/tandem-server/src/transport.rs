//! TCP transport.
//!
//! Each connection is a raw terminal stream, such as
//! `socat -,raw,echo=0 tcp:host:8022`. There is no handshake: the server
//! asks the terminal for its size with `ESC[18t` and picks the
//! `ESC[8;rows;colst` reply out of the input stream.

use std::net::SocketAddr;

use bytes::{Bytes, BytesMut};
use tandem_core::Viewport;
use tokio::net::{TcpListener, TcpStream};

use crate::error::ServerError;

/// Asks the client terminal to report its text area size.
pub const SIZE_REQUEST: &[u8] = b"\x1b[18t";

const SIZE_REPORT_PREFIX: &[u8] = b"\x1b[8;";

/// Listening TCP socket.
#[derive(Debug)]
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Bind to `address` (e.g. `0.0.0.0:8022`).
    pub async fn bind(address: &str) -> Result<Self, ServerError> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address '{address}': {e}")))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Transport(format!("failed to bind {addr}: {e}")))?;

        tracing::info!("TCP transport bound to {}", addr);
        Ok(Self { listener })
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ServerError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(|e| ServerError::Transport(format!("accept failed: {e}")))?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed for {}: {}", peer, e);
        }
        Ok((stream, peer))
    }

    /// Local address the transport is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| ServerError::Transport(format!("failed to get local address: {e}")))
    }
}

/// One read from a client, split into size reports and keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientInput {
    /// Size reports, oldest first
    pub resizes: Vec<Viewport>,
    /// Everything else, in order
    pub keys: Bytes,
}

/// Pull `ESC[8;rows;colst` reports out of `chunk`.
///
/// Malformed or zero-sized reports are left in the key stream untouched.
pub fn split_input(chunk: &[u8]) -> ClientInput {
    let mut resizes = Vec::new();
    let mut keys = BytesMut::with_capacity(chunk.len());
    let mut rest = chunk;

    while !rest.is_empty() {
        if rest.starts_with(SIZE_REPORT_PREFIX) {
            if let Some((viewport, used)) = parse_size_report(&rest[SIZE_REPORT_PREFIX.len()..]) {
                resizes.push(viewport);
                rest = &rest[SIZE_REPORT_PREFIX.len() + used..];
                continue;
            }
        }
        keys.extend_from_slice(&rest[..1]);
        rest = &rest[1..];
    }

    ClientInput { resizes, keys: keys.freeze() }
}

/// Parse `rows;colst` and return the viewport plus bytes consumed.
fn parse_size_report(bytes: &[u8]) -> Option<(Viewport, usize)> {
    let (rows, after_rows) = parse_number(bytes)?;
    if bytes.get(after_rows) != Some(&b';') {
        return None;
    }
    let (cols, after_cols) = parse_number(&bytes[after_rows + 1..])?;
    let end = after_rows + 1 + after_cols;
    if bytes.get(end) != Some(&b't') || rows == 0 || cols == 0 {
        return None;
    }
    Some((Viewport::new(cols, rows), end + 1))
}

fn parse_number(bytes: &[u8]) -> Option<(usize, usize)> {
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || digits > 5 {
        return None;
    }
    let value = bytes[..digits].iter().fold(0usize, |acc, &b| acc * 10 + usize::from(b - b'0'));
    Some((value, digits))
}
