//! Session lifecycle: the control-connection run loop shared by I/O and
//! processing sessions, and the registry that tracks them by sid.

pub mod base;
pub mod registry;

pub use base::{run_session, SessionHandler};
pub use registry::SessionRegistry;
