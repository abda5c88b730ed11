use crate::core::scanner::scan_cancellable;
use crate::domain::model::{Bound, ScanOutcome};
use crate::domain::ports::{CancelFlag, Scanner};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Runs the trial-division scan on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialDivisionScanner;

impl TrialDivisionScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scanner for TrialDivisionScanner {
    fn name(&self) -> &'static str {
        "trial-division"
    }

    async fn scan(&self, bound: Bound, cancel: CancelFlag) -> Result<ScanOutcome> {
        tracing::debug!("Dispatching trial-division scan below {}", bound);
        tokio::task::spawn_blocking(move || scan_cancellable(bound, &cancel)).await?
    }
}
