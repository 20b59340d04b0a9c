//! Bind-retry TCP acceptor with a pollable interrupt flag.
//!
//! Mirrors `AbstractSession`'s constructor, which walks the port space
//! upward from a base port until `bind` succeeds, and `DebugServer::start`'s
//! accept loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};

use crate::error::TransportError;

/// How long a single `accept` call waits before re-checking the interrupt
/// flag. Keeps shutdown latency bounded without a busy loop.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

/// Bind to `host:base_port`, incrementing the port on failure until one
/// succeeds. Returns the listener and the port it actually bound to.
pub async fn bind_with_retry(host: &str, base_port: u16) -> Result<(TcpListener, u16), TransportError> {
    let mut port = base_port;
    loop {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => {
                // `port` may be 0 ("any"), so report the port the OS
                // actually assigned rather than the requested one.
                let bound_port = listener.local_addr().map(|a| a.port()).unwrap_or(port);
                log::info!("(transport) bound on {host}:{bound_port}");
                return Ok((listener, bound_port));
            }
            Err(err) => {
                log::info!("(transport) cannot bind on {host}:{port} ({err}), rebinding...");
                port = port
                    .checked_add(1)
                    .ok_or_else(|| TransportError::ConnectFailed("port space exhausted".into()))?;
            }
        }
    }
}

/// Accepts a single connection, polling `interrupt` between attempts.
/// Returns `None` if interrupted before a peer connects.
pub async fn accept_one(
    listener: &TcpListener,
    interrupt: &Arc<AtomicBool>,
) -> Result<Option<TcpStream>, TransportError> {
    loop {
        if interrupt.load(Ordering::Relaxed) {
            return Ok(None);
        }
        match tokio::time::timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                log::info!("(transport) accepted connection from {peer}");
                return Ok(Some(stream));
            }
            Ok(Err(err)) => return Err(TransportError::Io(err)),
            Err(_elapsed) => continue,
        }
    }
}

/// Runs `handler` for every accepted connection until `interrupt` is set.
/// Each connection is handled on its own spawned task.
pub async fn accept_loop<F, Fut>(listener: TcpListener, interrupt: Arc<AtomicBool>, handler: F)
where
    F: Fn(TcpStream) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let handler = Arc::new(handler);
    loop {
        match accept_one(&listener, &interrupt).await {
            Ok(Some(stream)) => {
                let handler = handler.clone();
                tokio::spawn(async move { handler(stream).await });
            }
            Ok(None) => {
                log::info!("(transport) accept loop interrupted");
                break;
            }
            Err(err) => {
                log::error!("(transport) accept error: {err}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn retries_to_the_next_free_port() {
        let (held, base_port) = bind_with_retry("127.0.0.1", 0).await.unwrap();
        // `held` is bound to an ephemeral port picked by the OS (base_port 0
        // means "any"); bind again at that exact port and confirm retry
        // walks forward to a free one.
        let (_second, second_port) = bind_with_retry("127.0.0.1", base_port).await.unwrap();
        assert!(second_port >= base_port);
        drop(held);
    }

    #[tokio::test]
    async fn accept_one_respects_interrupt() {
        let (listener, _port) = bind_with_retry("127.0.0.1", 0).await.unwrap();
        let interrupt = Arc::new(AtomicBool::new(true));
        let result = accept_one(&listener, &interrupt).await.unwrap();
        assert!(result.is_none());
    }
}
