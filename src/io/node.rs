//! `IoNode` — the top-level object a process boots to serve as an I/O
//! node: a dataset directory, a control listener, and a registry of open
//! [`IoSession`]s.
//!
//! Grounded on `AbstractSession`'s relationship to its owning node in
//! `original_source/src/common/AbstractSession.cpp`.

use std::sync::Arc;

use crate::core::ids::{PortCursor, SidAllocator};
use crate::io::list_data::{DirListData, IListData};
use crate::io::session::IoSession;
use crate::net::Endpoint;
use crate::session::registry::SessionRegistry;

pub struct IoNode {
    pub listing: Arc<dyn IListData>,
    pub sessions: SessionRegistry<IoSession>,
    pub sids: SidAllocator,
    pub ports: PortCursor,
    pub control: Endpoint,
}

impl IoNode {
    pub fn new(dataset_root: impl Into<std::path::PathBuf>, control: Endpoint, base_port: u16) -> Self {
        Self {
            listing: Arc::new(DirListData::new(dataset_root)),
            sessions: SessionRegistry::new(),
            sids: SidAllocator::new(),
            ports: PortCursor::new(base_port),
            control,
        }
    }
}
