use crate::domain::model::{Bound, ScanReport};
use crate::domain::ports::{CancelFlag, Scanner};
use crate::utils::error::{Result, ScanError};
use crate::utils::monitor::{ScanPhase, SystemMonitor};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Cancels every scan currently running on an engine.
///
/// Each `run` registers its own flag and drops it on exit. Flags are
/// never reset, so a scan that was told to stop keeps seeing it even if
/// another run starts afterwards.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    active: Arc<Mutex<Vec<CancelFlag>>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        for flag in self.lock().iter() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Number of scans that have not returned yet.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn register(&self) -> CancelFlag {
        let flag = Arc::new(AtomicBool::new(false));
        self.lock().push(Arc::clone(&flag));
        flag
    }

    fn release(&self, flag: &CancelFlag) {
        self.lock().retain(|active| !Arc::ptr_eq(active, flag));
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CancelFlag>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// 離開 run 時（包含逾時與錯誤）移除本次的旗標
struct Registration<'a> {
    handle: &'a CancelHandle,
    flag: CancelFlag,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.handle.release(&self.flag);
    }
}

pub struct ScanEngine<S: Scanner> {
    scanner: S,
    monitor: SystemMonitor,
    timeout: Option<Duration>,
    cancel: CancelHandle,
}

impl<S: Scanner> ScanEngine<S> {
    pub fn new(scanner: S) -> Self {
        Self::new_with_monitoring(scanner, false)
    }

    pub fn new_with_monitoring(scanner: S, monitor_enabled: bool) -> Self {
        Self {
            scanner,
            monitor: SystemMonitor::new(monitor_enabled),
            timeout: None,
            cancel: CancelHandle::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Handle for stopping in-flight scans, e.g. from a Ctrl-C handler.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn run(&self, bound: Bound) -> Result<ScanReport> {
        let registration = Registration {
            handle: &self.cancel,
            flag: self.cancel.register(),
        };

        tracing::info!("🔎 Scanning for the largest prime below {}", bound);
        tracing::debug!(
            "Scanner: {}, timeout: {:?}",
            self.scanner.name(),
            self.timeout
        );
        self.monitor.log_phase(ScanPhase::BeforeScan);

        let started_at = Utc::now();
        let start = Instant::now();
        let scan = self.scanner.scan(bound, Arc::clone(&registration.flag));

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, scan).await {
                Ok(result) => result?,
                Err(_) => {
                    // 逾時：通知背景掃描停止，旗標不會再被清除
                    registration.flag.store(true, Ordering::Relaxed);
                    tracing::warn!("⏱️ Scan timed out after {:?}", limit);
                    return Err(ScanError::Timeout { limit });
                }
            },
            None => scan.await?,
        };

        let elapsed = start.elapsed();
        self.monitor.log_phase(ScanPhase::AfterScan);
        self.monitor.log_summary();

        match outcome.largest_prime {
            Some(prime) => tracing::info!(
                "✅ Found {} after {} candidates in {:?}",
                prime,
                outcome.candidates_checked,
                elapsed
            ),
            None => tracing::info!("No prime below {}", bound),
        }

        Ok(ScanReport::new(
            self.scanner.name(),
            bound,
            outcome,
            elapsed.as_millis(),
            started_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ScanOutcome, NO_PRIME};
    use async_trait::async_trait;

    struct FixedScanner(ScanOutcome);

    #[async_trait]
    impl Scanner for FixedScanner {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn scan(&self, _bound: Bound, _cancel: CancelFlag) -> Result<ScanOutcome> {
            Ok(self.0)
        }
    }

    /// Stalls on bounds above 100 until its flag is raised, in a detached
    /// task so it outlives a timed-out `run`. Smaller bounds finish at once.
    #[derive(Default)]
    struct StallingScanner {
        stopped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Scanner for StallingScanner {
        fn name(&self) -> &'static str {
            "stalling"
        }

        async fn scan(&self, bound: Bound, cancel: CancelFlag) -> Result<ScanOutcome> {
            if bound.get() <= 100 {
                return Ok(ScanOutcome {
                    largest_prime: None,
                    candidates_checked: 0,
                });
            }

            let stopped = Arc::clone(&self.stopped);
            tokio::spawn(async move {
                while !cancel.load(Ordering::Relaxed) {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                stopped.store(true, Ordering::Relaxed);
            })
            .await?;
            Err(ScanError::Cancelled)
        }
    }

    #[tokio::test]
    async fn test_report_carries_outcome() {
        let engine = ScanEngine::new(FixedScanner(ScanOutcome {
            largest_prime: Some(97),
            candidates_checked: 98,
        }));

        let report = engine.run(Bound::from(100u32)).await.unwrap();
        assert_eq!(report.scanner, "fixed");
        assert_eq!(report.largest_prime, Some(97));
        assert_eq!(report.result, 97);
        assert_eq!(report.candidates_checked, 98);
    }

    #[tokio::test]
    async fn test_empty_outcome_reports_sentinel() {
        let engine = ScanEngine::new(FixedScanner(ScanOutcome {
            largest_prime: None,
            candidates_checked: 0,
        }));

        let report = engine.run(Bound::from(2u32)).await.unwrap();
        assert_eq!(report.result, NO_PRIME);
        assert_eq!(engine.cancel_handle().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_timeout_reports_duration() {
        let engine = ScanEngine::new(StallingScanner::default())
            .with_timeout(Some(Duration::from_millis(20)));

        let err = engine.run(Bound::default()).await.unwrap_err();
        assert!(matches!(
            &err,
            ScanError::Timeout { limit } if *limit == Duration::from_millis(20)
        ));
        assert_eq!(err.to_string(), "Scan exceeded the 20ms timeout");
        assert_eq!(engine.cancel_handle().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_timed_out_scan_stops_even_if_engine_runs_again() {
        let scanner = StallingScanner::default();
        let stopped = Arc::clone(&scanner.stopped);
        let engine = ScanEngine::new(scanner).with_timeout(Some(Duration::from_millis(50)));

        let first = engine.run(Bound::from(1_000u32)).await;
        assert!(matches!(first, Err(ScanError::Timeout { .. })));

        let second = engine.run(Bound::from(3u32)).await;
        assert!(second.is_ok());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(stopped.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_cancel_handle_stops_all_in_flight_runs() {
        let engine = ScanEngine::new(StallingScanner::default());
        let cancel = engine.cancel_handle();

        let (a, b, _) = tokio::join!(
            engine.run(Bound::default()),
            engine.run(Bound::default()),
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                assert_eq!(cancel.in_flight(), 2);
                cancel.cancel();
            }
        );
        assert!(matches!(a, Err(ScanError::Cancelled)));
        assert!(matches!(b, Err(ScanError::Cancelled)));
        assert_eq!(engine.cancel_handle().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancel_without_runs_does_not_poison_next_run() {
        let engine = ScanEngine::new(FixedScanner(ScanOutcome {
            largest_prime: Some(2),
            candidates_checked: 1,
        }));
        engine.cancel_handle().cancel();

        let report = engine.run(Bound::from(3u32)).await.unwrap();
        assert_eq!(report.result, 2);
    }
}
