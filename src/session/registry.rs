//! `SessionRegistry` — a mutex-protected sid -> session map.
//!
//! Grounded on `SessionManager`'s bookkeeping in
//! `original_source/src/common/AbstractSession.cpp`: sessions are looked
//! up by sid on every incoming request and removed once their owning
//! client closes them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct SessionRegistry<T> {
    sessions: Mutex<HashMap<u32, Arc<T>>>,
}

impl<T> SessionRegistry<T> {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()) }
    }

    pub fn insert(&self, sid: u32, session: Arc<T>) {
        self.sessions.lock().expect("session registry poisoned").insert(sid, session);
    }

    pub fn get(&self, sid: u32) -> Option<Arc<T>> {
        self.sessions.lock().expect("session registry poisoned").get(&sid).cloned()
    }

    pub fn remove(&self, sid: u32) -> Option<Arc<T>> {
        self.sessions.lock().expect("session registry poisoned").remove(&sid)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
