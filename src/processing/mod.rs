//! The processing (rendering) node: renderer dispatch, the vis stream,
//! and session bookkeeping.

pub mod grid_leaper_renderer;
pub mod node;
pub mod renderer;
pub mod session;
pub mod vis_stream;

pub use grid_leaper_renderer::GridLeaperRenderer;
pub use node::ProcessingNode;
pub use renderer::{DummyRenderer, Frame, Renderer, SimpleRenderer};
pub use session::ProcessingSession;
pub use vis_stream::{channel, VisStreamHandle, VisStreamSender};
