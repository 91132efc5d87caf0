//! Per-source health state, for counting flips.
//!
//! # State Transitions
//! ```text
//! (absent) → seeded:   first observation, not a flip
//! ok       → !ok:      flip
//! !ok      → ok:       flip
//! same     → same:     nothing
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

/// Remembers the last observed health of every source.
#[derive(Debug, Default)]
pub struct FlipTracker {
    last: Mutex<HashMap<String, bool>>,
}

impl FlipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation. Returns true when it differs from the previous
    /// one for the same source.
    pub fn observe(&self, source: &str, ok: bool) -> bool {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match last.get_mut(source) {
            Some(previous) if *previous == ok => false,
            Some(previous) => {
                *previous = ok;
                true
            }
            None => {
                last.insert(source.to_string(), ok);
                false
            }
        }
    }

    /// Last observed health of a source, if any.
    pub fn last(&self, source: &str) -> Option<bool> {
        let last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        last.get(source).copied()
    }
}
