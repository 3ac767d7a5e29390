//! Per-agent mutual exclusion
//!
//! Each resolution pass reads, computes, and commits an agent's managed
//! items non-atomically, so concurrent passes for the same agent must not
//! interleave. Different agents never share mutable state and run freely in
//! parallel.

use crate::types::AgentId;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Lock manager keyed by agent id.
pub struct AgentLockManager {
    locks: RwLock<HashMap<AgentId, Arc<Mutex<()>>>>,
}

impl AgentLockManager {
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the lock for an agent. Callers hold the returned mutex
    /// for the duration of the read-compute-commit cycle.
    pub fn lock_for(&self, agent: AgentId) -> Arc<Mutex<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(&agent) {
                return lock.clone();
            }
        }

        let mut map = self.locks.write();
        // Another thread may have inserted between the read and the write.
        map.entry(agent)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl Default for AgentLockManager {
    fn default() -> Self {
        Self::new()
    }
}
