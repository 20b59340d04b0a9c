//! `ProcessingSession` — dispatches rendering requests to a
//! [`Renderer`](crate::processing::renderer::Renderer) and pushes its
//! frames onto the vis stream.
//!
//! Grounded on the rendering-command subset of `AbstractSession::run`'s
//! dispatch, specialized the way [`crate::io::session::IoSession`]
//! specializes it for dataset metadata.

use std::sync::Mutex;

use crate::core::error::Error;
use crate::processing::renderer::Renderer;
use crate::processing::vis_stream::VisStreamHandle;
use crate::session::SessionHandler;
use crate::wire::commands::*;
use crate::wire::reply::ReplyParams;
use crate::wire::request::RequestParams;

pub struct ProcessingSession {
    renderer: Mutex<Box<dyn Renderer>>,
    vis_stream: VisStreamHandle,
}

impl ProcessingSession {
    pub fn new(renderer: Box<dyn Renderer>, vis_stream: VisStreamHandle) -> Self {
        Self { renderer: Mutex::new(renderer), vis_stream }
    }
}

impl SessionHandler for ProcessingSession {
    fn handle(&self, _sid: u32, request: &crate::wire::request::Request) -> Result<ReplyParams, Error> {
        let mut renderer = self.renderer.lock().expect("renderer poisoned");
        match &request.params {
            RequestParams::SetIsoValue(r) => {
                renderer.set_iso_value(r.value);
                Ok(ReplyParams::Empty(EmptyRep))
            }
            RequestParams::SetRenderMode(r) => {
                renderer.set_render_mode(r.mode);
                Ok(ReplyParams::Empty(EmptyRep))
            }
            RequestParams::SupportsRenderMode(r) => {
                Ok(ReplyParams::SupportsRenderMode(SupportsRenderModeRep { supported: renderer.supports_render_mode(r.mode) }))
            }
            RequestParams::ZoomCamera(_)
            | RequestParams::MoveCamera(_)
            | RequestParams::RotateCamera(_)
            | RequestParams::SetActiveModality(_)
            | RequestParams::SetActiveTimestep(_)
            | RequestParams::InitRenderContext(_)
            | RequestParams::StartRendering(_)
            | RequestParams::StopRendering(_)
            | RequestParams::SetTransferFunction1d(_)
            | RequestParams::SetTransferFunction2d(_) => Ok(ReplyParams::Empty(EmptyRep)),
            RequestParams::ProceedRendering(_) => {
                let (frame, done) = renderer.proceed();
                drop(renderer);
                let handle = self.vis_stream.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle.push(frame).await {
                        log::warn!("(processing) failed to push frame onto vis stream: {err}");
                    }
                });
                Ok(ReplyParams::ProceedRendering(ProceedRenderingRep { done }))
            }
            other => Err(Error::Protocol(format!("{:?} is not a processing session command", other.vcl_type()))),
        }
    }
}
