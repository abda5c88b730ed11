//! 掃描前後的行程資源取樣

use std::fmt;

/// When a sample was taken relative to the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    BeforeScan,
    AfterScan,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::BeforeScan => write!(f, "Before scan"),
            ScanPhase::AfterScan => write!(f, "After scan"),
        }
    }
}

#[cfg(feature = "cli")]
pub use sampling::{ProcessSample, SystemMonitor};

#[cfg(feature = "cli")]
mod sampling {
    use super::ScanPhase;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use sysinfo::{Pid, ProcessesToUpdate, System};

    #[derive(Debug, Clone, Copy)]
    pub struct ProcessSample {
        pub phase: ScanPhase,
        pub cpu_percent: f32,
        pub resident_mb: u64,
        pub since_start: Duration,
    }

    struct Samples {
        system: System,
        peak_resident_mb: u64,
        taken: usize,
    }

    /// CPU and resident memory of this process, sampled around each scan.
    pub struct SystemMonitor {
        // 停用時不取得 pid，所有取樣都直接回傳 None
        pid: Option<Pid>,
        samples: Mutex<Samples>,
        started: Instant,
    }

    impl SystemMonitor {
        pub fn new(enabled: bool) -> Self {
            let pid = enabled
                .then(sysinfo::get_current_pid)
                .and_then(|pid| pid.ok());

            Self {
                pid,
                samples: Mutex::new(Samples {
                    system: System::new(),
                    peak_resident_mb: 0,
                    taken: 0,
                }),
                started: Instant::now(),
            }
        }

        pub fn sample(&self, phase: ScanPhase) -> Option<ProcessSample> {
            let pid = self.pid?;
            let mut samples = self.samples.lock().ok()?;

            samples
                .system
                .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            let process = samples.system.process(pid)?;
            let cpu_percent = process.cpu_usage();
            let resident_mb = process.memory() / 1024 / 1024;

            samples.peak_resident_mb = samples.peak_resident_mb.max(resident_mb);
            samples.taken += 1;

            Some(ProcessSample {
                phase,
                cpu_percent,
                resident_mb,
                since_start: self.started.elapsed(),
            })
        }

        pub fn log_phase(&self, phase: ScanPhase) {
            if let Some(sample) = self.sample(phase) {
                tracing::info!(
                    "📊 {} - CPU: {:.1}%, Memory: {}MB, Time: {:?}",
                    sample.phase,
                    sample.cpu_percent,
                    sample.resident_mb,
                    sample.since_start
                );
            }
        }

        /// Peak memory across every sample so far, with total wall time.
        pub fn log_summary(&self) {
            if !self.is_enabled() {
                return;
            }
            if let Ok(samples) = self.samples.lock() {
                tracing::info!(
                    "📊 {} samples, peak memory {}MB, total time {:?}",
                    samples.taken,
                    samples.peak_resident_mb,
                    self.started.elapsed()
                );
            }
        }

        pub fn is_enabled(&self) -> bool {
            self.pid.is_some()
        }
    }

    impl Default for SystemMonitor {
        fn default() -> Self {
            Self::new(false)
        }
    }
}

// 未啟用 cli feature 時沒有 sysinfo，保留相同介面
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_phase(&self, _phase: ScanPhase) {}

    pub fn log_summary(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
