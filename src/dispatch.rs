//! Node-level command dispatch for `sid=0` requests — the commands that
//! create or enumerate sessions rather than running inside one (spec.md
//! §4.4, §4.6).
//!
//! Re-expresses the source's double-dispatch-on-command-type hierarchy as
//! one tagged-union match per node kind: [`RequestParams`] is the tagged
//! union, and `dispatch_io_node`/`dispatch_processing_node` are the single
//! `dispatch(node, cmd)` functions spec.md's redesign notes ask for.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::TcpListener;

use trinity_transport::framing::{read_frame, write_frame};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::io::dataset::IoDataset;
use crate::io::dummy::DummyDataset;
use crate::io::node::IoNode;
use crate::io::session::IoSession;
use crate::net::Endpoint;
use crate::processing::grid_leaper_renderer::GridLeaperRenderer;
use crate::processing::node::ProcessingNode;
use crate::processing::renderer::{DummyRenderer, Renderer, SimpleRenderer};
use crate::processing::session::ProcessingSession;
use crate::processing::vis_stream;
use crate::proxy::{IoProxy, Proxy};
use crate::session::run_session;
use crate::wire::commands::*;
use crate::wire::reply::{AnyReply, ErrorReply, Reply, ReplyParams};
use crate::wire::request::{Request, RequestParams};

/// Reply timeout for the control connection a processing session opens
/// against the I/O session it renders from, to build a [`GridLeaperRenderer`].
const IO_PROXY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles one `sid=0` request against an I/O node: list a directory, or
/// spin up a new [`IoSession`] on its own port.
pub async fn dispatch_io_node(node: &IoNode, request: &Request) -> Result<ReplyParams> {
    match &request.params {
        RequestParams::ListFiles(r) => {
            let entries = node
                .listing
                .list_data(&r.dir_id)?
                .into_iter()
                .map(|e| ListFilesEntry { name: e.name, file_id: e.file_id, datatype: e.kind })
                .collect();
            Ok(ReplyParams::ListFiles(ListFilesRep { entries }))
        }
        RequestParams::InitIoSession(_) => {
            let sid = node.sids.next();
            let (listener, endpoint) = Endpoint::bind(&node.control.host, node.ports.peek()).await?;
            node.ports.advance_past(endpoint.port);

            let dataset: Arc<dyn IoDataset> = Arc::new(DummyDataset::new());
            let session = Arc::new(IoSession::new(dataset, node.listing.clone(), endpoint.clone()));
            node.sessions.insert(sid, session.clone());

            let interrupt = Arc::new(AtomicBool::new(false));
            let session_endpoint = endpoint.clone();
            tokio::spawn(async move {
                if let Err(err) = run_session(&session_endpoint, listener, sid, session, interrupt).await {
                    log::warn!("(io node) session {sid} ended: {err}");
                }
            });

            Ok(ReplyParams::InitIoSession(InitIoSessionRep { sid }))
        }
        other => Err(Error::Protocol(format!("{:?} is not a node-level I/O command", other.vcl_type()))),
    }
}

/// Handles one `sid=0` request against a processing node: spin up a new
/// [`ProcessingSession`] plus its paired control and vis-stream listeners
/// (spec.md §4.6).
///
/// Takes the owning [`IoNode`] directly rather than dialing a remote I/O
/// endpoint through an `IoProxy` — this implementation colocates both
/// nodes in one process, so `InitProcessingSessionReq::io_sid` names an
/// already-open [`IoSession`] on `io_node` instead of carrying a separate
/// wire-level I/O endpoint (see DESIGN.md's open-question notes).
pub async fn dispatch_processing_node(
    node: &ProcessingNode,
    io_node: &IoNode,
    request: &Request,
) -> Result<ReplyParams> {
    match &request.params {
        RequestParams::InitProcessingSession(r) => {
            let io_session = io_node
                .sessions
                .get(r.io_sid)
                .ok_or_else(|| Error::InvalidArgument(format!("no such I/O session: {}", r.io_sid)))?;

            let sid = node.sids.next();
            let (control_listener, control_endpoint) = Endpoint::bind(&node.control.host, node.ports.peek()).await?;
            node.ports.advance_past(control_endpoint.port);
            let (vis_listener, vis_endpoint) = Endpoint::bind(&node.control.host, node.ports.peek()).await?;
            node.ports.advance_past(vis_endpoint.port);

            let renderer: Box<dyn Renderer> = match r.renderer {
                RendererKind::Simple => Box::new(SimpleRenderer::new(r.width, r.height)),
                RendererKind::Dummy => Box::new(DummyRenderer::new(r.width, r.height)),
                RendererKind::GridLeaper => {
                    let addr = format!("{}:{}", io_session.endpoint.host, io_session.endpoint.port);
                    let channel = trinity_transport::Channel::connect(&addr, trinity_transport::DEFAULT_CONNECT_TIMEOUT)
                        .await
                        .map_err(Error::Transport)?;
                    let proxy = Proxy::new(channel, r.io_sid, IO_PROXY_TIMEOUT);
                    let dataset: Arc<dyn IoDataset> = Arc::new(IoProxy::new(proxy, tokio::runtime::Handle::current()));
                    let (width, height) = (r.width, r.height);
                    // `IoProxy` blocks the calling thread's runtime on every
                    // call, so the renderer's setup (which makes several of
                    // them) runs on the blocking pool rather than inline here.
                    Box::new(
                        tokio::task::spawn_blocking(move || GridLeaperRenderer::new(dataset, width, height))
                            .await
                            .map_err(|err| Error::Protocol(format!("grid-leaper setup panicked: {err}")))??,
                    )
                }
            };
            let (vis_handle, vis_sender) = vis_stream::channel(8);
            let session = Arc::new(ProcessingSession::new(renderer, vis_handle));
            node.sessions.insert(sid, session.clone());

            let interrupt = Arc::new(AtomicBool::new(false));
            let control_interrupt = interrupt.clone();
            let session_endpoint = control_endpoint.clone();
            tokio::spawn(async move {
                if let Err(err) = run_session(&session_endpoint, control_listener, sid, session, control_interrupt).await {
                    log::warn!("(processing node) session {sid} ended: {err}");
                }
            });

            let vis_interrupt = interrupt;
            tokio::spawn(async move {
                let stream = match trinity_transport::acceptor::accept_one(&vis_listener, &vis_interrupt).await {
                    Ok(Some(stream)) => stream,
                    Ok(None) => return,
                    Err(err) => {
                        log::warn!("(processing node) vis stream {sid} failed to accept: {err}");
                        return;
                    }
                };
                if let Err(err) = vis_sender.run(stream, vis_interrupt).await {
                    log::warn!("(processing node) vis stream {sid} ended: {err}");
                }
            });

            Ok(ReplyParams::InitProcessingSession(InitProcessingSessionRep {
                sid,
                control_port: control_endpoint.port,
                vis_port: vis_endpoint.port,
            }))
        }
        other => Err(Error::Protocol(format!("{:?} is not a node-level processing command", other.vcl_type()))),
    }
}

/// Runs an I/O node's main control listener: accepts `sid=0` connections
/// and answers each request with [`dispatch_io_node`] until `interrupt` is
/// set (spec.md §4.4's "ConnectionAggregator").
pub async fn serve_io_node(node: Arc<IoNode>, listener: TcpListener, interrupt: Arc<AtomicBool>) {
    loop {
        let stream = match trinity_transport::acceptor::accept_one(&listener, &interrupt).await {
            Ok(Some(stream)) => stream,
            Ok(None) => break,
            Err(err) => {
                log::error!("(io node) accept failed: {err}");
                break;
            }
        };
        let node = node.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_node_connection(stream, move |request| {
                let node = node.clone();
                async move { dispatch_io_node(&node, &request).await }
            })
            .await
            {
                log::warn!("(io node) control connection ended: {err}");
            }
        });
    }
}

/// Runs a processing node's main control listener, the `InitProcessingSession`
/// counterpart to [`serve_io_node`].
pub async fn serve_processing_node(
    node: Arc<ProcessingNode>,
    io_node: Arc<IoNode>,
    listener: TcpListener,
    interrupt: Arc<AtomicBool>,
) {
    loop {
        let stream = match trinity_transport::acceptor::accept_one(&listener, &interrupt).await {
            Ok(Some(stream)) => stream,
            Ok(None) => break,
            Err(err) => {
                log::error!("(processing node) accept failed: {err}");
                break;
            }
        };
        let node = node.clone();
        let io_node = io_node.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_node_connection(stream, move |request| {
                let node = node.clone();
                let io_node = io_node.clone();
                async move { dispatch_processing_node(&node, &io_node, &request).await }
            })
            .await
            {
                log::warn!("(processing node) control connection ended: {err}");
            }
        });
    }
}

/// Shared request/reply loop for a node-level control connection, mirroring
/// [`crate::session::base::serve`] but dispatching at the node instead of a
/// session.
async fn serve_node_connection<F, Fut>(stream: tokio::net::TcpStream, dispatch: F) -> Result<()>
where
    F: Fn(Request) -> Fut,
    Fut: std::future::Future<Output = Result<ReplyParams>>,
{
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let request: Request = match read_frame(&mut reader).await {
            Ok(Some(request)) => request,
            Ok(None) => break,
            Err(err) => return Err(err.into()),
        };
        let rid = request.rid;
        let vcl_type = request.params.vcl_type();
        let reply = match dispatch(request).await {
            Ok(params) => AnyReply::Ok(Reply::new(rid, vcl_type, params)),
            Err(err) => AnyReply::Err(ErrorReply::from_error(rid, &err)),
        };
        write_frame(&mut write_half, &reply).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::list_data::DirListData;
    use crate::wire::request::RequestParams;

    fn test_io_node() -> IoNode {
        let dir = tempfile::tempdir().unwrap().keep();
        std::fs::write(dir.join("a.uvf"), b"").unwrap();
        IoNode {
            listing: Arc::new(DirListData::new(&dir)),
            sessions: Default::default(),
            sids: Default::default(),
            ports: crate::core::ids::PortCursor::new(0),
            control: Endpoint::new("127.0.0.1", 0),
        }
    }

    #[tokio::test]
    async fn init_io_session_spawns_a_routable_session() {
        let node = test_io_node();
        let request = Request::new(1, 0, RequestParams::InitIoSession(InitIoSessionReq {
            file_id: "a.uvf".into(),
            dir_id: ".".into(),
        }));
        let reply = dispatch_io_node(&node, &request).await.unwrap();
        let ReplyParams::InitIoSession(rep) = reply else { panic!("wrong reply shape") };
        assert!(node.sessions.get(rep.sid).is_some());
    }

    #[tokio::test]
    async fn list_files_is_handled_without_a_session() {
        let node = test_io_node();
        let request = Request::new(1, 0, RequestParams::ListFiles(ListFilesReq { dir_id: ".".into() }));
        let reply = dispatch_io_node(&node, &request).await.unwrap();
        let ReplyParams::ListFiles(rep) = reply else { panic!("wrong reply shape") };
        assert_eq!(rep.entries, vec![ListFilesEntry {
            name: "a.uvf".to_string(),
            file_id: "a.uvf".to_string(),
            datatype: DatasetKind::Dataset,
        }]);
    }

    #[tokio::test]
    async fn init_processing_session_with_grid_leaper_dials_the_io_session() {
        let node = test_io_node();
        let init_io = dispatch_io_node(&node, &Request::new(1, 0, RequestParams::InitIoSession(InitIoSessionReq {
            file_id: "a.uvf".into(),
            dir_id: ".".into(),
        })))
        .await
        .unwrap();
        let ReplyParams::InitIoSession(io_session) = init_io else { panic!("wrong reply shape") };

        let proc_node = ProcessingNode::new(Endpoint::new("127.0.0.1", 0), 0);
        let request = Request::new(2, 0, RequestParams::InitProcessingSession(InitProcessingSessionReq {
            io_sid: io_session.sid,
            renderer: RendererKind::GridLeaper,
            width: 4,
            height: 4,
        }));
        let reply = dispatch_processing_node(&proc_node, &node, &request).await.unwrap();
        let ReplyParams::InitProcessingSession(rep) = reply else { panic!("wrong reply shape") };
        assert!(proc_node.sessions.get(rep.sid).is_some());
    }
}
