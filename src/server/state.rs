use crate::auth::AuthCenter;
use fintrack_store::prelude::MemoryStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub struct ServeHealth {
    ready: AtomicBool,
    started_at: Instant,
}

impl ServeHealth {
    fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            started_at: Instant::now(),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[derive(Clone)]
pub struct ServeState {
    pub store: Arc<MemoryStore>,
    pub auth: Arc<AuthCenter>,
    pub health: Arc<ServeHealth>,
    pub debug_errors: bool,
}

impl ServeState {
    pub fn new(store: Arc<MemoryStore>, auth: Arc<AuthCenter>, debug_errors: bool) -> Self {
        Self {
            store,
            auth,
            health: Arc::new(ServeHealth::new()),
            debug_errors,
        }
    }
}
