//! `Endpoint` — how one node tells another where to reconnect.
//!
//! Grounded on the `{protocol, host, port}` triple `ISession.h` returns
//! from a session's control handshake, and on `AbstractSession.cpp`'s
//! port-retry loop via [`trinity_transport::acceptor::bind_with_retry`].

use std::fmt;

use tokio::net::TcpListener;

use crate::core::error::Error;

/// Where a peer should dial to reach a bound listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { protocol: "tcp".to_string(), host: host.into(), port }
    }

    /// Binds a listener starting at `base_port`, walking upward on
    /// contention, and returns both the listener and the [`Endpoint`] a
    /// peer would use to reach it.
    pub async fn bind(host: &str, base_port: u16) -> Result<(TcpListener, Endpoint), Error> {
        let (listener, port) = trinity_transport::acceptor::bind_with_retry(host, base_port).await?;
        Ok((listener, Endpoint::new(host, port)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_a_url_like_string() {
        let ep = Endpoint::new("127.0.0.1", 6200);
        assert_eq!(ep.to_string(), "tcp://127.0.0.1:6200");
    }

    #[tokio::test]
    async fn bind_returns_a_matching_endpoint() {
        let (_listener, ep) = Endpoint::bind("127.0.0.1", 0).await.unwrap();
        assert_eq!(ep.host, "127.0.0.1");
        assert!(ep.port > 0);
    }
}
