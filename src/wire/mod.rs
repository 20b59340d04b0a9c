//! The command/reply wire protocol: types, framing helpers, and the
//! `VclType` registry shared by every node.

pub mod commands;
pub mod reply;
pub mod request;
pub mod serial;
pub mod vcl;

pub use reply::{AnyReply, ErrorReply, Reply, ReplyParams};
pub use request::{Request, RequestParams};
pub use vcl::{Vcl, VclType};
