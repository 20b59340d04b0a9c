//! End-to-end scenarios against a live I/O node and processing node pair,
//! driven the same way `trinity-frontend` drives them: connect, call,
//! read the vis stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use trinity::core::error::Error;
use trinity::dispatch::{serve_io_node, serve_processing_node};
use trinity::io::IoNode;
use trinity::net::Endpoint;
use trinity::processing::ProcessingNode;
use trinity::proxy::{ProcessingProxy, Proxy};
use trinity::wire::commands::*;
use trinity::wire::reply::ReplyParams;
use trinity::wire::request::RequestParams;

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

async fn call_node(endpoint: &Endpoint, params: RequestParams) -> Result<ReplyParams, Error> {
    let addr = format!("{}:{}", endpoint.host, endpoint.port);
    let channel = trinity_transport::Channel::connect(&addr, trinity_transport::DEFAULT_CONNECT_TIMEOUT)
        .await
        .map_err(Error::Transport)?;
    Proxy::new(channel, 0, CALL_TIMEOUT).call(params).await
}

struct Harness {
    io_control: Endpoint,
    proc_control: Endpoint,
    io_interrupt: Arc<AtomicBool>,
    proc_interrupt: Arc<AtomicBool>,
    io_task: tokio::task::JoinHandle<()>,
    proc_task: tokio::task::JoinHandle<()>,
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.io_interrupt.store(true, Ordering::Relaxed);
        self.proc_interrupt.store(true, Ordering::Relaxed);
        self.io_task.abort();
        self.proc_task.abort();
    }
}

async fn spawn_harness(dataset_root: std::path::PathBuf) -> Harness {
    let (io_listener, io_control) = Endpoint::bind("127.0.0.1", 0).await.unwrap();
    let io_node = Arc::new(IoNode::new(dataset_root, io_control.clone(), io_control.port + 1));
    let io_interrupt = Arc::new(AtomicBool::new(false));
    let io_task = tokio::spawn(serve_io_node(io_node.clone(), io_listener, io_interrupt.clone()));

    let (proc_listener, proc_control) = Endpoint::bind("127.0.0.1", 0).await.unwrap();
    let proc_node = Arc::new(ProcessingNode::new(proc_control.clone(), proc_control.port + 1));
    let proc_interrupt = Arc::new(AtomicBool::new(false));
    let proc_task = tokio::spawn(serve_processing_node(proc_node, io_node, proc_listener, proc_interrupt.clone()));

    Harness { io_control, proc_control, io_interrupt, proc_interrupt, io_task, proc_task }
}

/// (S1) Listing a fixture directory returns its one dataset entry.
#[tokio::test]
async fn listing_a_fixture_directory_returns_its_entries() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("demo.uvf"), b"").unwrap();
    let harness = spawn_harness(dir.path().to_path_buf()).await;

    let reply = call_node(&harness.io_control, RequestParams::ListFiles(ListFilesReq { dir_id: ".".into() }))
        .await
        .unwrap();
    let ReplyParams::ListFiles(files) = reply else { panic!("wrong reply shape") };
    assert_eq!(files.entries.len(), 1);
    assert_eq!(files.entries[0].name, "demo.uvf");
    assert_eq!(files.entries[0].file_id, "demo.uvf");
    assert_eq!(files.entries[0].datatype, DatasetKind::Dataset);
}

/// (S2) Opening a processing session hands back distinct control/vis ports.
#[tokio::test]
async fn opening_a_processing_session_yields_distinct_ports() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("demo.uvf"), b"").unwrap();
    let harness = spawn_harness(dir.path().to_path_buf()).await;

    let init_io = call_node(
        &harness.io_control,
        RequestParams::InitIoSession(InitIoSessionReq { file_id: "demo.uvf".into(), dir_id: ".".into() }),
    )
    .await
    .unwrap();
    let ReplyParams::InitIoSession(io_session) = init_io else { panic!("wrong reply shape") };

    let init_proc = call_node(
        &harness.proc_control,
        RequestParams::InitProcessingSession(InitProcessingSessionReq {
            io_sid: io_session.sid,
            renderer: RendererKind::Simple,
            width: 32,
            height: 32,
        }),
    )
    .await
    .unwrap();
    let ReplyParams::InitProcessingSession(rendering) = init_proc else { panic!("wrong reply shape") };

    assert_ne!(rendering.control_port, rendering.vis_port);
}

/// (S3) `SetIsoValue` + `ProceedRendering` yields a `32*32*4`-byte frame on
/// the vis stream.
#[tokio::test]
async fn proceed_rendering_produces_a_full_size_frame() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("demo.uvf"), b"").unwrap();
    let harness = spawn_harness(dir.path().to_path_buf()).await;

    let init_io = call_node(
        &harness.io_control,
        RequestParams::InitIoSession(InitIoSessionReq { file_id: "demo.uvf".into(), dir_id: ".".into() }),
    )
    .await
    .unwrap();
    let ReplyParams::InitIoSession(io_session) = init_io else { panic!("wrong reply shape") };

    let init_proc = call_node(
        &harness.proc_control,
        RequestParams::InitProcessingSession(InitProcessingSessionReq {
            io_sid: io_session.sid,
            renderer: RendererKind::Simple,
            width: 32,
            height: 32,
        }),
    )
    .await
    .unwrap();
    let ReplyParams::InitProcessingSession(rendering) = init_proc else { panic!("wrong reply shape") };

    let render_addr = format!("127.0.0.1:{}", rendering.control_port);
    let channel = trinity_transport::Channel::connect(&render_addr, trinity_transport::DEFAULT_CONNECT_TIMEOUT)
        .await
        .unwrap();
    let render_proxy = ProcessingProxy::new(Proxy::new(channel, rendering.sid, CALL_TIMEOUT));
    render_proxy.set_iso_value(0.5).await.unwrap();
    let done = render_proxy.proceed_rendering().await.unwrap();
    assert!(done);

    let mut vis_stream = TcpStream::connect(format!("127.0.0.1:{}", rendering.vis_port)).await.unwrap();
    let frame_len = vis_stream.read_u32_le().await.unwrap();
    assert_eq!(frame_len, 32 * 32 * 4);
    let mut frame_bytes = vec![0u8; frame_len as usize];
    vis_stream.read_exact(&mut frame_bytes).await.unwrap();
}

/// A `grid-leaper` session pages bricks in over a real `IoProxy` connection
/// to its I/O session and still yields a correctly-sized frame.
#[tokio::test]
async fn grid_leaper_session_renders_over_a_live_io_proxy() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("demo.uvf"), b"").unwrap();
    let harness = spawn_harness(dir.path().to_path_buf()).await;

    let init_io = call_node(
        &harness.io_control,
        RequestParams::InitIoSession(InitIoSessionReq { file_id: "demo.uvf".into(), dir_id: ".".into() }),
    )
    .await
    .unwrap();
    let ReplyParams::InitIoSession(io_session) = init_io else { panic!("wrong reply shape") };

    let init_proc = call_node(
        &harness.proc_control,
        RequestParams::InitProcessingSession(InitProcessingSessionReq {
            io_sid: io_session.sid,
            renderer: RendererKind::GridLeaper,
            width: 4,
            height: 4,
        }),
    )
    .await
    .unwrap();
    let ReplyParams::InitProcessingSession(rendering) = init_proc else { panic!("wrong reply shape") };

    let render_addr = format!("127.0.0.1:{}", rendering.control_port);
    let channel = trinity_transport::Channel::connect(&render_addr, trinity_transport::DEFAULT_CONNECT_TIMEOUT)
        .await
        .unwrap();
    let render_proxy = ProcessingProxy::new(Proxy::new(channel, rendering.sid, CALL_TIMEOUT));
    render_proxy.set_iso_value(0.5).await.unwrap();

    let mut vis_stream = TcpStream::connect(format!("127.0.0.1:{}", rendering.vis_port)).await.unwrap();

    // The first call may report unfinished paging; keep proceeding until
    // every visible brick is resident, the same progressive-refinement loop
    // a real client runs (spec.md §8).
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        let done = render_proxy.proceed_rendering().await.unwrap();

        let frame_len = vis_stream.read_u32_le().await.unwrap();
        assert_eq!(frame_len, 4 * 4 * 4);
        let mut frame_bytes = vec![0u8; frame_len as usize];
        vis_stream.read_exact(&mut frame_bytes).await.unwrap();

        if done {
            break;
        }
        assert!(std::time::Instant::now() < deadline, "grid-leaper session never converged");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// (S4) `GetBrick` at the coarsest LOD returns a successful payload whose
/// size matches the dataset's own voxel-count report for that brick.
#[tokio::test]
async fn get_brick_at_coarsest_lod_returns_full_payload() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("demo.uvf"), b"").unwrap();
    let harness = spawn_harness(dir.path().to_path_buf()).await;

    let init_io = call_node(
        &harness.io_control,
        RequestParams::InitIoSession(InitIoSessionReq { file_id: "demo.uvf".into(), dir_id: ".".into() }),
    )
    .await
    .unwrap();
    let ReplyParams::InitIoSession(io_session) = init_io else { panic!("wrong reply shape") };

    // `InitIoSessionRep` only carries `sid`; the session's own control port
    // is the next one the node binds after its base control port (the node
    // was constructed with `base_port = io_control.port + 1` and this is
    // the only session opened in this test), so reconnect there.
    let io_addr = format!("{}:{}", harness.io_control.host, harness.io_control.port + 1);
    let channel = trinity_transport::Channel::connect(&io_addr, trinity_transport::DEFAULT_CONNECT_TIMEOUT)
        .await
        .unwrap();
    let proxy = Proxy::new(channel, io_session.sid, CALL_TIMEOUT);

    let lod_count_reply = proxy.call(RequestParams::GetLodLevelCount(ModalityReq { modality: 0 })).await.unwrap();
    let ReplyParams::Count(lod_count) = lod_count_reply else { panic!("wrong reply shape") };
    let last_lod = lod_count.count - 1;

    let key = BrickKeyWire { modality: 0, timestep: 0, lod: last_lod, brick: 0 };
    let voxel_counts_reply = proxy.call(RequestParams::GetBrickVoxelCounts(BrickKeyReq { key })).await.unwrap();
    let ReplyParams::GetBrickVoxelCounts(voxel_counts) = voxel_counts_reply else { panic!("wrong reply shape") };
    let expected_len = (voxel_counts.counts[0] * voxel_counts.counts[1] * voxel_counts.counts[2]) as usize;

    let brick_reply = proxy.call(RequestParams::GetBrick(BrickKeyReq { key })).await.unwrap();
    let ReplyParams::GetBrick(brick) = brick_reply else { panic!("wrong reply shape") };
    assert_eq!(brick.byte_len, expected_len);
}

/// (S6) Abruptly killing the I/O session's serving task causes a proxy
/// call in flight against it to surface an error within about two
/// call-timeout windows, rather than hanging forever.
#[tokio::test]
async fn killed_io_session_surfaces_an_error_promptly() {
    use trinity::io::{DirListData, DummyDataset, IoSession};

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("demo.uvf"), b"").unwrap();

    let (listener, endpoint) = Endpoint::bind("127.0.0.1", 0).await.unwrap();
    let dataset: Arc<dyn trinity::io::IoDataset> = Arc::new(DummyDataset::new());
    let listing = Arc::new(DirListData::new(dir.path()));
    let session = Arc::new(IoSession::new(dataset, listing, endpoint.clone()));
    let interrupt = Arc::new(AtomicBool::new(false));

    let client_addr = format!("{}:{}", endpoint.host, endpoint.port);
    let session_task = tokio::spawn(async move {
        let _ = trinity::session::run_session(&endpoint, listener, 1, session, interrupt).await;
    });

    let short_timeout = Duration::from_millis(200);
    let channel = trinity_transport::Channel::connect(&client_addr, trinity_transport::DEFAULT_CONNECT_TIMEOUT)
        .await
        .unwrap();
    let proxy = Proxy::new(channel, 1, short_timeout);

    // One good call first, to prove the session is actually up.
    proxy.call(RequestParams::GetModalityCount(NoArgsReq)).await.unwrap();

    // Abruptly kill the session's serving task — this drops its TCP
    // connection out from under the client mid-flight.
    session_task.abort();

    let deadline = short_timeout * 2;
    let result = tokio::time::timeout(deadline, proxy.call(RequestParams::GetModalityCount(NoArgsReq))).await;
    match result {
        Ok(call_result) => assert!(call_result.is_err(), "expected the call to fail once the session is gone"),
        Err(_elapsed) => panic!("call neither completed nor errored within {deadline:?}"),
    }
}
