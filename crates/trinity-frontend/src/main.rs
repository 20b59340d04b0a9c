//! trinity-frontend — a headless demonstration client.
//!
//! Boots one I/O node and one processing node in this process, then plays
//! the client side of the protocol against them: list the dataset
//! directory, open an I/O session, open a processing session, nudge the
//! renderer, and read one frame off the vis stream. Stands in for a real
//! interactive frontend the same way `rktri-mcp`'s `DebugConnection` stood
//! in for a game client against the teacher's debug server.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use trinity::core::error::Error;
use trinity::dispatch::{serve_io_node, serve_processing_node};
use trinity::io::IoNode;
use trinity::net::Endpoint;
use trinity::processing::ProcessingNode;
use trinity::proxy::{Proxy, ProcessingProxy};
use trinity::wire::commands::*;
use trinity::wire::reply::ReplyParams;
use trinity::wire::request::RequestParams;

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends one `sid=0` request directly with a throwaway [`trinity_transport::Channel`]
/// and unwraps the matching [`ReplyParams`] — the bootstrap calls
/// (`ListFiles`, `InitIoSession`, `InitProcessingSession`) happen before a
/// session (and its dedicated [`Proxy`]) exists.
async fn call_node(endpoint: &Endpoint, params: RequestParams) -> Result<ReplyParams, Error> {
    let addr = format!("{}:{}", endpoint.host, endpoint.port);
    let channel = trinity_transport::Channel::connect(&addr, trinity_transport::DEFAULT_CONNECT_TIMEOUT)
        .await
        .map_err(Error::Transport)?;
    let proxy = Proxy::new(channel, 0, CALL_TIMEOUT);
    proxy.call(params).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    trinity::core::logging::init();

    let dataset_root = std::env::temp_dir().join("trinity-frontend-demo");
    std::fs::create_dir_all(&dataset_root)?;
    std::fs::write(dataset_root.join("demo.uvf"), b"")?;

    let (io_listener, io_control) = Endpoint::bind("127.0.0.1", 0).await?;
    let io_node = Arc::new(IoNode::new(dataset_root, io_control.clone(), io_control.port + 1));
    let io_interrupt = Arc::new(AtomicBool::new(false));
    tokio::spawn(serve_io_node(io_node.clone(), io_listener, io_interrupt.clone()));

    let (proc_listener, proc_control) = Endpoint::bind("127.0.0.1", 0).await?;
    let proc_node = Arc::new(ProcessingNode::new(proc_control.clone(), proc_control.port + 1));
    let proc_interrupt = Arc::new(AtomicBool::new(false));
    tokio::spawn(serve_processing_node(
        proc_node.clone(),
        io_node.clone(),
        proc_listener,
        proc_interrupt.clone(),
    ));

    log::info!("io node control at {io_control}, processing node control at {proc_control}");

    let list_reply = call_node(&io_control, RequestParams::ListFiles(ListFilesReq { dir_id: ".".into() })).await?;
    let ReplyParams::ListFiles(files) = list_reply else { unreachable!() };
    println!("dataset directory entries: {:?}", files.entries);

    let init_io = call_node(
        &io_control,
        RequestParams::InitIoSession(InitIoSessionReq { file_id: "demo.uvf".into(), dir_id: ".".into() }),
    )
    .await?;
    let ReplyParams::InitIoSession(io_session) = init_io else { unreachable!() };
    println!("opened I/O session {}", io_session.sid);

    let init_proc = call_node(
        &proc_control,
        RequestParams::InitProcessingSession(InitProcessingSessionReq {
            io_sid: io_session.sid,
            renderer: RendererKind::Simple,
            width: 32,
            height: 32,
        }),
    )
    .await?;
    let ReplyParams::InitProcessingSession(rendering) = init_proc else { unreachable!() };
    println!(
        "opened processing session {} (control {}, vis {})",
        rendering.sid, rendering.control_port, rendering.vis_port
    );

    let render_addr = format!("127.0.0.1:{}", rendering.control_port);
    let channel = trinity_transport::Channel::connect(&render_addr, trinity_transport::DEFAULT_CONNECT_TIMEOUT)
        .await
        .map_err(Error::Transport)?;
    let render_proxy = ProcessingProxy::new(Proxy::new(channel, rendering.sid, CALL_TIMEOUT));
    render_proxy.set_iso_value(0.5).await?;
    let done = render_proxy.proceed_rendering().await?;
    println!("proceed_rendering reported done={done}");

    let vis_addr = format!("127.0.0.1:{}", rendering.vis_port);
    let mut vis_stream = TcpStream::connect(&vis_addr).await?;
    let frame_len = vis_stream.read_u32_le().await?;
    let mut frame_bytes = vec![0u8; frame_len as usize];
    vis_stream.read_exact(&mut frame_bytes).await?;
    println!("received frame: {frame_len} bytes");

    io_interrupt.store(true, std::sync::atomic::Ordering::Relaxed);
    proc_interrupt.store(true, std::sync::atomic::Ordering::Relaxed);

    Ok(())
}
