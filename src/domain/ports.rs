use crate::domain::model::{Bound, OutputFormat, ScanOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Shared cooperative cancellation flag, checked between candidates.
pub type CancelFlag = Arc<AtomicBool>;

pub trait ConfigProvider: Send + Sync {
    fn bound(&self) -> Bound;
    fn timeout(&self) -> Option<Duration>;
    fn output_format(&self) -> OutputFormat;
    fn monitoring_enabled(&self) -> bool;
}

#[async_trait]
pub trait Scanner: Send + Sync {
    fn name(&self) -> &'static str;
    async fn scan(&self, bound: Bound, cancel: CancelFlag) -> Result<ScanOutcome>;
}
