//! Core types shared across the wire, session, I/O, processing, and render
//! layers: the error enum, logging init, and the monotonic counters that
//! back session ids, request ids, and pool recency stamps.

pub mod clock;
pub mod error;
pub mod ids;
pub mod logging;
pub mod types;

pub use error::Error;
pub use types::Result;
