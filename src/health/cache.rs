//! Cool-off memoization of the aggregate outcome.
//!
//! # Design Decisions
//! - One lock guards the whole check-and-evaluate sequence, so at most one
//!   evaluation is in flight; concurrent requests queue behind it and then
//!   read the fresh entry
//! - A zero cool-off disables caching entirely (and the lock with it)
//! - Expiry is measured from the end of the evaluation

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::health::status::Outcome;

#[derive(Debug)]
struct CacheEntry {
    expiry: Instant,
    outcome: Outcome,
}

/// Short-lived cache for the last evaluated outcome.
#[derive(Debug)]
pub struct CoolOffCache {
    cool_off: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl CoolOffCache {
    pub fn new(cool_off: Duration) -> Self {
        Self {
            cool_off,
            entry: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.cool_off.is_zero()
    }

    /// Return the cached outcome while it is fresh, otherwise run `evaluate`
    /// and store its outcome. The flag is true when served from cache.
    pub async fn get_or_evaluate<F, Fut>(&self, evaluate: F) -> (Outcome, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        if !self.is_enabled() {
            return (evaluate().await, false);
        }

        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.expiry > Instant::now() {
                return (cached.outcome.clone(), true);
            }
        }

        let outcome = evaluate().await;
        *entry = Some(CacheEntry {
            expiry: Instant::now() + self.cool_off,
            outcome: outcome.clone(),
        });
        (outcome, false)
    }
}
