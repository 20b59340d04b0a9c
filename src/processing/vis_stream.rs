//! `VisStreamSender` — forwards each rendered frame from the renderer's
//! worker thread out through the vis-stream endpoint.
//!
//! Grounded on spec.md §4.9 and the "one vis-sender task per render
//! session" line in §5. Frames are raw RGBA bytes, not JSON documents, so
//! this uses its own length-prefixed binary framing rather than
//! `trinity_transport::framing` (which is for the JSON control protocol).
//! Empty frames are legal and forwarded as-is, keeping the frontend's
//! update loop driven without a separate idle signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::core::error::Error;
use crate::processing::renderer::Frame;

/// How long [`VisStreamSender::run`] waits for a frame before re-checking
/// `interrupt`.
const RECV_POLL: Duration = Duration::from_millis(200);

/// The renderer-side handle: push a frame, non-blocking up to the bounded
/// channel's capacity.
#[derive(Clone)]
pub struct VisStreamHandle {
    sender: mpsc::Sender<Frame>,
}

impl VisStreamHandle {
    pub async fn push(&self, frame: Frame) -> Result<(), Error> {
        self.sender
            .send(frame)
            .await
            .map_err(|_| Error::Protocol("vis stream receiver has shut down".into()))
    }
}

/// Creates a bounded renderer-output -> network-sender channel pair.
pub fn channel(capacity: usize) -> (VisStreamHandle, VisStreamSender) {
    let (tx, rx) = mpsc::channel(capacity);
    (VisStreamHandle { sender: tx }, VisStreamSender { receiver: rx })
}

pub struct VisStreamSender {
    receiver: mpsc::Receiver<Frame>,
}

impl VisStreamSender {
    /// Drains frames onto `writer` (one `u32` little-endian byte length
    /// followed by the RGBA payload) until the channel closes or
    /// `interrupt` is set.
    pub async fn run<W: AsyncWriteExt + Unpin>(mut self, mut writer: W, interrupt: Arc<AtomicBool>) -> Result<(), Error> {
        while !interrupt.load(Ordering::Relaxed) {
            let frame = match tokio::time::timeout(RECV_POLL, self.receiver.recv()).await {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(_elapsed) => continue,
            };
            writer.write_u32_le(frame.rgba.len() as u32).await.map_err(Error::Io)?;
            writer.write_all(&frame.rgba).await.map_err(Error::Io)?;
            writer.flush().await.map_err(Error::Io)?;
        }
        Ok(())
    }
}
