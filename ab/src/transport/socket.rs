//! Unix domain socket transport
//!
//! Holds one persistent connection to the router. Outbound requests are written
//! under a lock; a reader task decodes inbound frames and hands them to the
//! registered handler.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::frame::Frame;
use super::{InboundHandler, Transport, TransportError};
use crate::domain::OutboundRequest;

/// Default timeout for connect and write operations
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum frame size in either direction
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Transport over a newline-delimited JSON Unix socket
pub struct SocketTransport {
    socket_path: PathBuf,
    writer: Mutex<OwnedWriteHalf>,
    reader: JoinHandle<()>,
    timeout: Duration,
}

impl SocketTransport {
    /// Connect to the router and start delivering inbound frames to `handler`
    pub async fn connect(
        socket_path: impl Into<PathBuf>,
        handler: Arc<dyn InboundHandler>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let socket_path = socket_path.into();
        debug!(?socket_path, ?timeout, "SocketTransport::connect: called");

        let stream = tokio::time::timeout(timeout, UnixStream::connect(&socket_path))
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;
        let (read_half, write_half) = stream.into_split();
        let reader = tokio::spawn(read_loop(read_half, handler));

        info!(?socket_path, "Connected to message router");
        Ok(Self {
            socket_path,
            writer: Mutex::new(write_half),
            reader,
            timeout,
        })
    }

    /// Path of the router socket
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// False once the router has closed the connection
    pub fn is_connected(&self) -> bool {
        !self.reader.is_finished()
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<(), TransportError> {
        debug!(kind = %request.kind, dest = %request.destination, "SocketTransport::send: called");
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let mut line = serde_json::to_string(&Frame::from(request))?;
        if line.len() > MAX_FRAME_SIZE {
            return Err(TransportError::FrameTooLarge { size: line.len() });
        }
        line.push('\n');

        let mut writer = self.writer.lock().await;
        tokio::time::timeout(self.timeout, async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        })
        .await
        .map_err(|_| TransportError::Timeout(self.timeout))??;

        debug!(bytes = line.len(), "SocketTransport::send: frame written");
        Ok(())
    }
}

async fn read_loop(read_half: OwnedReadHalf, handler: Arc<dyn InboundHandler>) {
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        // One byte past the limit tells an oversized frame from one that just fits
        let read = (&mut reader)
            .take(MAX_FRAME_SIZE as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await;
        match read {
            Ok(0) => {
                info!("Message router closed the connection");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read from message router");
                break;
            }
        }

        if buf.len() > MAX_FRAME_SIZE && buf.last() != Some(&b'\n') {
            warn!(bytes = buf.len(), "Dropping oversized frame");
            match discard_line(&mut reader).await {
                Ok(true) => continue,
                Ok(false) => {
                    info!("Message router closed the connection");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read from message router");
                    break;
                }
            }
        }

        handle_frame(&buf, handler.as_ref());
    }
}

/// Skip input up to and including the next newline; false on EOF
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<bool> {
    loop {
        let (newline, available) = {
            let chunk = reader.fill_buf().await?;
            (chunk.iter().position(|&b| b == b'\n'), chunk.len())
        };
        match newline {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(true);
            }
            None if available == 0 => return Ok(false),
            None => reader.consume(available),
        }
    }
}

fn handle_frame(bytes: &[u8], handler: &dyn InboundHandler) {
    let bytes = bytes.trim_ascii();
    if bytes.len() > MAX_FRAME_SIZE {
        warn!(bytes = bytes.len(), "Dropping oversized frame");
        return;
    }
    if bytes.is_empty() {
        return;
    }

    match serde_json::from_slice::<Frame>(bytes) {
        Ok(frame) => match frame.into_inbound() {
            Some(message) => handler.on_inbound_message(message),
            None => debug!("handle_frame: ignoring request frame"),
        },
        Err(e) => warn!(error = %e, "Dropping malformed frame"),
    }
}
