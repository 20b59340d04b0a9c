//! The I/O node: dataset metadata and brick reads, served over a control
//! connection per [`session`](crate::session).

pub mod dataset;
pub mod dummy;
pub mod list_data;
pub mod node;
pub mod session;

pub use dataset::{BrickKey, BrickPayload, IoDataset, MinMaxBlock};
pub use dummy::DummyDataset;
pub use list_data::{DirListData, IListData, IoData};
pub use node::IoNode;
pub use session::IoSession;
