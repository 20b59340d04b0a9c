//! `ProcessingNode` — the top-level object a process boots to serve as a
//! processing (rendering) node.

use crate::core::ids::{PortCursor, SidAllocator};
use crate::net::Endpoint;
use crate::processing::session::ProcessingSession;
use crate::session::registry::SessionRegistry;

pub struct ProcessingNode {
    pub sessions: SessionRegistry<ProcessingSession>,
    pub sids: SidAllocator,
    pub ports: PortCursor,
    pub control: Endpoint,
}

impl ProcessingNode {
    pub fn new(control: Endpoint, base_port: u16) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            sids: SidAllocator::new(),
            ports: PortCursor::new(base_port),
            control,
        }
    }
}
