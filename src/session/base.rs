//! The per-session control loop: accept once, then read-dispatch-reply
//! until the peer disconnects or the session is interrupted.
//!
//! Grounded directly on `AbstractSession::run` in
//! `original_source/src/common/AbstractSession.cpp`: bind already happened
//! by the time this runs (see [`crate::net::Endpoint::bind`]), so this is
//! just the accept-then-serve half.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::TcpStream;

use trinity_transport::framing::{read_frame, write_frame};

use crate::core::error::Error;
use crate::net::Endpoint;
use crate::wire::reply::{AnyReply, ErrorReply, Reply};
use crate::wire::request::Request;

/// Executes one request for a session and produces the reply body.
/// Implemented once per node kind (I/O, processing) to dispatch into that
/// node's command set.
pub trait SessionHandler: Send + Sync {
    fn handle(&self, sid: u32, request: &Request) -> Result<crate::wire::reply::ReplyParams, Error>;
}

/// Accepts the one control connection this session expects, then serves
/// requests until the connection closes or `interrupt` is set.
pub async fn run_session(
    endpoint: &Endpoint,
    listener: tokio::net::TcpListener,
    sid: u32,
    handler: Arc<dyn SessionHandler>,
    interrupt: Arc<AtomicBool>,
) -> Result<(), Error> {
    log::info!("(session {sid}) control at \"{endpoint}\"");

    let stream = match trinity_transport::acceptor::accept_one(&listener, &interrupt).await? {
        Some(stream) => stream,
        None => {
            log::info!("(session {sid}) interrupted before a peer connected");
            return Ok(());
        }
    };

    serve(stream, sid, handler, interrupt).await
}

async fn serve(
    stream: TcpStream,
    sid: u32,
    handler: Arc<dyn SessionHandler>,
    interrupt: Arc<AtomicBool>,
) -> Result<(), Error> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    while !interrupt.load(Ordering::Relaxed) {
        let request: Request = match read_frame(&mut reader).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                log::info!("(session {sid}) peer closed the control connection");
                break;
            }
            Err(err) => {
                log::warn!("(session {sid}) interrupting because the remote session has gone: {err}");
                interrupt.store(true, Ordering::Relaxed);
                break;
            }
        };

        let rid = request.rid;
        let vcl_type = request.params.vcl_type();
        let reply = match handler.handle(sid, &request) {
            Ok(params) => AnyReply::Ok(Reply::new(rid, vcl_type, params)),
            Err(err) => {
                log::warn!("(session {sid}) request {rid} failed: {err}");
                AnyReply::Err(ErrorReply::from_error(rid, &err))
            }
        };

        write_frame(&mut write_half, &reply).await?;
    }

    Ok(())
}
