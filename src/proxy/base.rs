//! `Proxy` — the shared request/reply plumbing every typed proxy method
//! builds on: allocate a `rid`, send, await with a timeout, and turn an
//! `ErrorReply` into `RemoteError` (spec.md §4.7).

use std::time::Duration;

use tokio::sync::Mutex;
use trinity_transport::Channel;

use crate::core::error::Error;
use crate::core::ids::RidAllocator;
use crate::wire::reply::{AnyReply, ReplyParams};
use crate::wire::request::{Request, RequestParams};

pub struct Proxy {
    channel: Mutex<Channel>,
    rids: RidAllocator,
    sid: u32,
    timeout: Duration,
}

impl Proxy {
    pub fn new(channel: Channel, sid: u32, timeout: Duration) -> Self {
        Self { channel: Mutex::new(channel), rids: RidAllocator::new(), sid, timeout }
    }

    /// Sends `params` and returns the matching reply body, or
    /// `RemoteError`/`ProtocolError` per spec.md §4.7's validation rules.
    ///
    /// One call holds the channel for the round trip, so replies are never
    /// attributed to the wrong in-flight request even though `rid`s are
    /// allocated ahead of the lock.
    pub async fn call(&self, params: RequestParams) -> Result<ReplyParams, Error> {
        let expected_type = params.vcl_type();
        let rid = self.rids.next();
        let request = Request::new(rid, self.sid, params);

        let mut channel = self.channel.lock().await;
        channel.send(&request).await?;
        let reply: AnyReply = channel.receive(self.timeout).await?;
        drop(channel);

        match reply {
            AnyReply::Err(err) => Err(Error::RemoteError(err.code)),
            AnyReply::Ok(ok) if ok.rid != rid => {
                Err(Error::Protocol(format!("reply rid {} does not match request rid {rid}", ok.rid)))
            }
            AnyReply::Ok(ok) if ok.vcl_type != expected_type => Err(Error::Protocol(format!(
                "expected a {expected_type} reply, got {}",
                ok.vcl_type
            ))),
            AnyReply::Ok(ok) => Ok(ok.params),
        }
    }

    pub fn sid(&self) -> u32 {
        self.sid
    }
}

/// Extracts the one expected [`ReplyParams`] variant or raises
/// `ProtocolError`, per spec.md §4.7's reply-type validation.
macro_rules! expect_reply {
    ($reply:expr, $variant:ident) => {
        match $reply {
            crate::wire::reply::ReplyParams::$variant(inner) => Ok(inner),
            other => Err(crate::core::error::Error::Protocol(format!(
                "unexpected reply shape: {other:?}"
            ))),
        }
    };
}

pub(crate) use expect_reply;
