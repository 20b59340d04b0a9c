//! `ProcessingProxy` — a client-side stub for the processing node's
//! rendering commands (spec.md §4.7). Unlike [`crate::proxy::io_proxy::IoProxy`],
//! every call here is already made from async code (the frontend's command
//! loop), so methods stay `async fn` instead of bridging through
//! `block_on`.

use crate::core::error::Error;
use crate::proxy::base::{expect_reply, Proxy};
use crate::wire::commands::*;
use crate::wire::request::RequestParams;

pub struct ProcessingProxy {
    proxy: Proxy,
}

impl ProcessingProxy {
    pub fn new(proxy: Proxy) -> Self {
        Self { proxy }
    }

    pub fn sid(&self) -> u32 {
        self.proxy.sid()
    }

    pub async fn set_iso_value(&self, value: f32) -> Result<(), Error> {
        self.proxy.call(RequestParams::SetIsoValue(SetIsoValueReq { value })).await?;
        Ok(())
    }

    pub async fn set_render_mode(&self, mode: RenderMode) -> Result<(), Error> {
        self.proxy.call(RequestParams::SetRenderMode(RenderModeReq { mode })).await?;
        Ok(())
    }

    pub async fn supports_render_mode(&self, mode: RenderMode) -> Result<bool, Error> {
        let reply = self.proxy.call(RequestParams::SupportsRenderMode(RenderModeReq { mode })).await?;
        Ok(expect_reply!(reply, SupportsRenderMode)?.supported)
    }

    pub async fn zoom_camera(&self, delta: f32) -> Result<(), Error> {
        self.proxy.call(RequestParams::ZoomCamera(ZoomCameraReq { delta })).await?;
        Ok(())
    }

    pub async fn move_camera(&self, delta: [f32; 3]) -> Result<(), Error> {
        self.proxy.call(RequestParams::MoveCamera(MoveCameraReq { delta })).await?;
        Ok(())
    }

    pub async fn rotate_camera(&self, axis: [f32; 3], radians: f32) -> Result<(), Error> {
        self.proxy.call(RequestParams::RotateCamera(RotateCameraReq { axis, radians })).await?;
        Ok(())
    }

    pub async fn set_active_modality(&self, modality: u32) -> Result<(), Error> {
        self.proxy.call(RequestParams::SetActiveModality(SetActiveModalityReq { modality })).await?;
        Ok(())
    }

    pub async fn set_active_timestep(&self, timestep: u32) -> Result<(), Error> {
        self.proxy.call(RequestParams::SetActiveTimestep(SetActiveTimestepReq { timestep })).await?;
        Ok(())
    }

    pub async fn init_render_context(&self, width: u32, height: u32) -> Result<(), Error> {
        self.proxy.call(RequestParams::InitRenderContext(InitRenderContextReq { width, height })).await?;
        Ok(())
    }

    pub async fn start_rendering(&self) -> Result<(), Error> {
        self.proxy.call(RequestParams::StartRendering(NoArgsReq)).await?;
        Ok(())
    }

    pub async fn stop_rendering(&self) -> Result<(), Error> {
        self.proxy.call(RequestParams::StopRendering(NoArgsReq)).await?;
        Ok(())
    }

    /// Advances the renderer by one frame; the frame itself arrives on the
    /// vis stream, not in this reply (spec.md §4.9). Returns whether
    /// rendering has converged.
    pub async fn proceed_rendering(&self) -> Result<bool, Error> {
        let reply = self.proxy.call(RequestParams::ProceedRendering(NoArgsReq)).await?;
        Ok(expect_reply!(reply, ProceedRendering)?.done)
    }

    pub async fn set_transfer_function_1d(&self, rgba: Vec<[f32; 4]>) -> Result<(), Error> {
        self.proxy.call(RequestParams::SetTransferFunction1d(SetTransferFunction1dReq { rgba })).await?;
        Ok(())
    }

    pub async fn set_transfer_function_2d(&self, rgba: Vec<[f32; 4]>, width: u32, height: u32) -> Result<(), Error> {
        self.proxy
            .call(RequestParams::SetTransferFunction2d(SetTransferFunction2dReq { rgba, width, height }))
            .await?;
        Ok(())
    }

    pub async fn close_processing_session(&self) -> Result<(), Error> {
        self.proxy.call(RequestParams::CloseProcessingSession(CloseProcessingSessionReq)).await?;
        Ok(())
    }
}
