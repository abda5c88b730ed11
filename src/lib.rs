pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::scanners::TrialDivisionScanner;
pub use config::toml_config::TomlConfig;
pub use crate::core::engine::{CancelHandle, ScanEngine};
pub use crate::core::scanner::{
    find_largest_prime_below, is_prime, largest_prime_below, scan_cancellable,
};
pub use domain::model::{
    Bound, OutputFormat, ScanOutcome, ScanReport, DEFAULT_BOUND, MAX_BOUND, NO_PRIME,
};
pub use utils::error::{Result, ScanError};
