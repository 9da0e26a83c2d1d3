use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::kernel::services::ports::backend::{BackendError, ConnectFuture, Transport};

/// Backend event stream over TCP, one JSON frame per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpLineTransport;

impl Transport for TcpLineTransport {
    fn connect(&self, url: &str) -> ConnectFuture {
        let addr = socket_addr(url).to_string();
        Box::pin(async move {
            let stream = match TcpStream::connect(addr.as_str()).await {
                Ok(stream) => stream,
                Err(e) => return Err(BackendError::Connect(format!("{addr}: {e}"))),
            };
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(read_frames(stream, tx));
            Ok(rx)
        })
    }
}

/// `host:port` part of a backend url. Scheme and path are dropped.
pub fn socket_addr(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest)
}

/// Forwards non-empty lines from `reader` until EOF, a read error, or the
/// receiving side goes away.
pub async fn read_frames<R: AsyncRead + Unpin>(reader: R, tx: UnboundedSender<String>) {
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => return,
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(%error, "backend stream read failed");
                return;
            }
        }
        let frame = line.trim_end_matches(['\r', '\n']);
        if frame.is_empty() {
            continue;
        }
        if tx.send(frame.to_string()).is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/transport.rs"]
mod tests;
