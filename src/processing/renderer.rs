//! `Renderer` — produces one frame's pixel bytes per `ProceedRendering`
//! call, tolerating missing bricks indefinitely (spec.md §7: "the
//! renderer tolerates missing bricks indefinitely by showing the coarsest
//! available LOD").
//!
//! [`SimpleRenderer`] and [`DummyRenderer`] are the two `renderType`s the
//! wire protocol names; neither touches a real GPU context, standing in
//! for it the same way [`crate::render::gpu_sink::MemoryPoolTarget`]
//! stands in for a real pool texture.

use crate::wire::commands::RenderMode;

/// A rendered frame: tightly-packed RGBA8 bytes, `width * height * 4`.
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    pub fn empty(width: u32, height: u32) -> Self {
        Self { width, height, rgba: Vec::new() }
    }
}

/// The renderer contract a processing session drives each
/// `ProceedRendering` call.
pub trait Renderer: Send {
    fn set_iso_value(&mut self, value: f32);
    fn set_render_mode(&mut self, mode: RenderMode);
    fn supports_render_mode(&self, mode: RenderMode) -> bool;
    /// Advances one frame. Returns `true` once the frame is final (no more
    /// progressive refinement pending); `false` means call again.
    fn proceed(&mut self) -> (Frame, bool);
}

/// A flat-color renderer: every pixel is the current iso value mapped to
/// grayscale. Enough to exercise the vis-stream and session plumbing
/// without any real volume sampling.
pub struct SimpleRenderer {
    width: u32,
    height: u32,
    iso_value: f32,
    mode: RenderMode,
}

impl SimpleRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, iso_value: 0.0, mode: RenderMode::Isosurface }
    }
}

impl Renderer for SimpleRenderer {
    fn set_iso_value(&mut self, value: f32) {
        self.iso_value = value;
    }

    fn set_render_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    fn supports_render_mode(&self, _mode: RenderMode) -> bool {
        true
    }

    fn proceed(&mut self) -> (Frame, bool) {
        let shade = (self.iso_value.clamp(0.0, 1.0) * 255.0) as u8;
        let pixel_count = (self.width * self.height) as usize;
        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            rgba.extend_from_slice(&[shade, shade, shade, 255]);
        }
        (Frame { width: self.width, height: self.height, rgba }, true)
    }
}

/// A renderer that always produces an empty frame, exercising the "empty
/// frames are legal" rule in spec.md §4.9.
pub struct DummyRenderer {
    width: u32,
    height: u32,
}

impl DummyRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Renderer for DummyRenderer {
    fn set_iso_value(&mut self, _value: f32) {}
    fn set_render_mode(&mut self, _mode: RenderMode) {}
    fn supports_render_mode(&self, mode: RenderMode) -> bool {
        matches!(mode, RenderMode::Isosurface)
    }

    fn proceed(&mut self) -> (Frame, bool) {
        (Frame::empty(self.width, self.height), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_renderer_produces_a_full_rgba_frame() {
        let mut renderer = SimpleRenderer::new(32, 32);
        renderer.set_iso_value(0.5);
        let (frame, done) = renderer.proceed();
        assert!(done);
        assert_eq!(frame.rgba.len(), 32 * 32 * 4);
    }

    #[test]
    fn dummy_renderer_always_yields_empty_frames() {
        let mut renderer = DummyRenderer::new(16, 16);
        let (frame, _done) = renderer.proceed();
        assert!(frame.rgba.is_empty());
    }
}
