//! One evaluation cycle, end to end.
//!
//! ```text
//! cache check ─ fresh? ─▶ reuse outcome
//!      │
//!      └─ stale ─▶ aggregator.evaluate()
//!                   → flip tracker + metrics, per result
//!                   → Outcome::classify
//!                   → stored in cache
//! → status mapper
//! ```

use std::sync::Arc;

use crate::health::aggregator::Aggregator;
use crate::health::cache::CoolOffCache;
use crate::health::check::CheckResult;
use crate::health::state::FlipTracker;
use crate::health::status::{Outcome, StatusMapper, Verdict};
use crate::observability::HealthMetrics;

/// Result of one evaluation cycle, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub outcome: Outcome,
    pub status: u16,
    pub served_from_cache: bool,
}

impl Report {
    pub fn verdict(&self) -> Verdict {
        self.outcome.verdict()
    }
}

/// Ties the aggregator, cache, flip tracker and status mapper together.
pub struct HealthService {
    aggregator: Aggregator,
    cache: CoolOffCache,
    flips: FlipTracker,
    mapper: StatusMapper,
    metrics: Arc<dyn HealthMetrics>,
}

impl HealthService {
    pub fn new(
        aggregator: Aggregator,
        cache: CoolOffCache,
        mapper: StatusMapper,
        metrics: Arc<dyn HealthMetrics>,
    ) -> Self {
        Self {
            aggregator,
            cache,
            flips: FlipTracker::new(),
            mapper,
            metrics,
        }
    }

    /// Run (or reuse) one evaluation cycle.
    pub async fn report(&self) -> Report {
        let (outcome, served_from_cache) = self
            .cache
            .get_or_evaluate(|| async {
                let results = self.aggregator.evaluate().await;
                self.observe(&results);
                Outcome::classify(&results)
            })
            .await;

        Report {
            status: self.mapper.map(&outcome),
            outcome,
            served_from_cache,
        }
    }

    fn observe(&self, results: &[CheckResult]) {
        for result in results {
            self.metrics.record_check(&result.source, result.ok);
            if self.flips.observe(&result.source, result.ok) {
                tracing::info!(source = %result.source, ok = result.ok, "Healthcheck flipped");
                self.metrics.record_flip(&result.source);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::aggregator::tests::{failure, healthy, warning, FakeMonitor};
    use crate::health::check::{CheckError, Monitor};
    use futures_util::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingMetrics {
        checks: Mutex<Vec<(String, bool)>>,
        flips: Mutex<HashMap<String, usize>>,
    }

    impl HealthMetrics for RecordingMetrics {
        fn record_check(&self, source: &str, ok: bool) {
            self.checks.lock().unwrap().push((source.to_string(), ok));
        }

        fn record_flip(&self, source: &str) {
            *self.flips.lock().unwrap().entry(source.to_string()).or_default() += 1;
        }
    }

    /// Replays a fixed sequence of health values, one per call.
    struct SequenceMonitor {
        sequence: Vec<bool>,
        next: AtomicUsize,
    }

    impl Monitor for SequenceMonitor {
        fn source(&self) -> &str {
            "geth"
        }

        fn check(&self) -> BoxFuture<'_, CheckResult> {
            let idx = self.next.fetch_add(1, Ordering::SeqCst);
            let ok = self.sequence[idx.min(self.sequence.len() - 1)];
            Box::pin(async move {
                if ok {
                    CheckResult::healthy("geth")
                } else {
                    CheckResult::failure("geth", CheckError::Syncing("still syncing".into()))
                }
            })
        }
    }

    /// Counts checks that started and checks that ran to completion.
    struct SlowMonitor {
        delay: Duration,
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicUsize>,
    }

    impl Monitor for SlowMonitor {
        fn source(&self) -> &str {
            "op-node"
        }

        fn check(&self) -> BoxFuture<'_, CheckResult> {
            Box::pin(async move {
                self.started.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.delay).await;
                self.finished.fetch_add(1, Ordering::SeqCst);
                CheckResult::healthy("op-node")
            })
        }
    }

    fn service(
        monitors: Vec<Arc<dyn Monitor>>,
        cool_off: Duration,
        metrics: Arc<RecordingMetrics>,
    ) -> HealthService {
        HealthService::new(
            Aggregator::new(monitors, Duration::from_millis(200)).unwrap(),
            CoolOffCache::new(cool_off),
            StatusMapper::new(200, 202, 500),
            metrics,
        )
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let metrics = Arc::new(RecordingMetrics::default());
        let svc = service(
            vec![
                Arc::new(FakeMonitor::new("geth", healthy)),
                Arc::new(FakeMonitor::new("lighthouse", healthy)),
            ],
            Duration::ZERO,
            metrics.clone(),
        );

        let report = svc.report().await;
        assert_eq!(report.status, 200);
        assert_eq!(report.outcome, Outcome::default());
        assert_eq!(metrics.checks.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_dominates() {
        let svc = service(
            vec![
                Arc::new(FakeMonitor::new("geth", healthy)),
                Arc::new(FakeMonitor::new("lighthouse", warning)),
                Arc::new(FakeMonitor::new("reth", failure)),
            ],
            Duration::ZERO,
            Arc::new(RecordingMetrics::default()),
        );

        let report = svc.report().await;
        assert_eq!(report.status, 500);
        assert_eq!(report.outcome.errors.len(), 1);
        assert_eq!(report.outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_warnings_only() {
        let svc = service(
            vec![
                Arc::new(FakeMonitor::new("geth", healthy)),
                Arc::new(FakeMonitor::new("lighthouse", warning)),
            ],
            Duration::ZERO,
            Arc::new(RecordingMetrics::default()),
        );

        assert_eq!(svc.report().await.status, 202);
    }

    #[tokio::test]
    async fn test_slow_monitor_reported_once() {
        let svc = service(
            vec![
                Arc::new(FakeMonitor::new("geth", healthy)),
                Arc::new(FakeMonitor::new("op-node", healthy).with_delay(Duration::from_secs(10))),
            ],
            Duration::ZERO,
            Arc::new(RecordingMetrics::default()),
        );

        let report = svc.report().await;
        assert_eq!(report.status, 500);
        assert_eq!(report.outcome.errors.len(), 1);
        assert!(report.outcome.errors[0].starts_with("op-node: healthcheck timed out"));
    }

    #[tokio::test]
    async fn test_cached_cycles_skip_monitors_and_metrics() {
        let metrics = Arc::new(RecordingMetrics::default());
        let monitor = FakeMonitor::new("geth", healthy);
        let calls = monitor.calls.clone();
        let svc = service(vec![Arc::new(monitor)], Duration::from_millis(300), metrics.clone());

        let first = svc.report().await;
        let second = svc.report().await;
        assert!(!first.served_from_cache);
        assert!(second.served_from_cache);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.checks.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;

        let third = svc.report().await;
        assert!(!third.served_from_cache);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_flip_counting_across_cycles() {
        let metrics = Arc::new(RecordingMetrics::default());
        let monitor = SequenceMonitor {
            sequence: vec![true, false, false],
            next: AtomicUsize::new(0),
        };
        let svc = service(vec![Arc::new(monitor)], Duration::ZERO, metrics.clone());

        let statuses = [svc.report().await.status, svc.report().await.status, svc.report().await.status];
        assert_eq!(statuses, [200, 500, 500]);

        assert_eq!(metrics.flips.lock().unwrap().get("geth"), Some(&1));
        assert_eq!(
            *metrics.checks.lock().unwrap(),
            vec![
                ("geth".to_string(), true),
                ("geth".to_string(), false),
                ("geth".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_report_aborts_checks_and_stores_nothing() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let monitor = SlowMonitor {
            delay: Duration::from_millis(300),
            started: started.clone(),
            finished: finished.clone(),
        };
        let svc = HealthService::new(
            Aggregator::new(vec![Arc::new(monitor)], Duration::from_secs(5)).unwrap(),
            CoolOffCache::new(Duration::from_secs(60)),
            StatusMapper::new(200, 202, 500),
            Arc::new(RecordingMetrics::default()),
        );

        // The caller gives up while the check is still sleeping.
        let abandoned = tokio::time::timeout(Duration::from_millis(50), svc.report()).await;
        assert!(abandoned.is_err());
        assert_eq!(started.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        // Lock released and nothing cached: the next cycle evaluates afresh.
        let report = tokio::time::timeout(Duration::from_secs(2), svc.report())
            .await
            .expect("cache lock was not released");
        assert!(!report.served_from_cache);
        assert_eq!(report.status, 200);
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
