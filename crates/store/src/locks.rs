//! Per-project mutation locks.
//!
//! Every mutation is a load → mutate → save cycle against whole JSON
//! documents, so two concurrent mutations on one project would race and the
//! last save would win. Holding the project's lock across the whole cycle
//! serializes them; different projects proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-project async mutexes.
///
/// Thread-safe via an interior lock on the registry map; designed to be
/// wrapped in `Arc` and shared across the application.
#[derive(Default)]
pub struct ProjectLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one project, waiting if a mutation is in flight.
    ///
    /// The guard must be held for the entire load → mutate → save cycle.
    pub async fn acquire(&self, project_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("lock registry poisoned");
            Arc::clone(
                locks
                    .entry(project_id.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
