//! Client-side request/reply channel: one TCP connection, strictly
//! request-then-reply, no pipelining guarantees beyond per-connection FIFO.
//!
//! Grounded on `CommandInputChannel` (connect/send/receive with a connect
//! timeout and a per-call reply timeout) and on `rktri-mcp`'s
//! `DebugConnection`, which reconnects once on a transport error.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::error::TransportError;
use crate::framing::{read_frame, write_frame};

/// Bounded time to wait for a TCP connect to complete — never blocks
/// indefinitely on an unreachable peer.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One connected request/reply channel.
pub struct Channel {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Channel {
    /// Connect to `addr`, bounded by `timeout`.
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self, TransportError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| TransportError::ConnectFailed(format!("timed out connecting to {addr}")))?
            .map_err(|e| TransportError::ConnectFailed(format!("{addr}: {e}")))?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    /// Send one request. At-most-once: a write failure is not retried here.
    pub async fn send<T: Serialize>(&mut self, value: &T) -> Result<(), TransportError> {
        write_frame(&mut self.writer, value).await
    }

    /// Wait up to `timeout` for one reply frame.
    pub async fn receive<U: DeserializeOwned>(&mut self, timeout: Duration) -> Result<U, TransportError> {
        match tokio::time::timeout(timeout, read_frame(&mut self.reader)).await {
            Ok(Ok(Some(value))) => Ok(value),
            Ok(Ok(None)) => Err(TransportError::Closed),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Err(TransportError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptor::bind_with_retry;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Echo {
        n: u32,
    }

    #[tokio::test]
    async fn send_then_receive_round_trips() {
        let (listener, port) = bind_with_retry("127.0.0.1", 0).await.unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);
            let msg: Echo = read_frame(&mut reader).await.unwrap().unwrap();
            write_frame(&mut write_half, &msg).await.unwrap();
        });

        let mut channel = Channel::connect(&format!("127.0.0.1:{port}"), Duration::from_secs(1))
            .await
            .unwrap();
        channel.send(&Echo { n: 42 }).await.unwrap();
        let reply: Echo = channel.receive(Duration::from_secs(1)).await.unwrap();
        assert_eq!(reply, Echo { n: 42 });

        server.await.unwrap();
    }

    #[tokio::test]
    async fn receive_times_out_when_nothing_arrives() {
        let (listener, port) = bind_with_retry("127.0.0.1", 0).await.unwrap();
        let _server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            // Hold the connection open without sending anything.
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let mut channel = Channel::connect(&format!("127.0.0.1:{port}"), Duration::from_secs(1))
            .await
            .unwrap();
        let result: Result<Echo, _> = channel.receive(Duration::from_millis(50)).await;
        assert!(matches!(result, Err(TransportError::Timeout)));
    }

    #[tokio::test]
    async fn connect_fails_fast_on_unreachable_peer() {
        let result = Channel::connect("127.0.0.1:1", Duration::from_millis(300)).await;
        assert!(result.is_err());
    }
}
