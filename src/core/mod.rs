pub mod engine;
pub mod scanner;

pub use crate::domain::model::{Bound, OutputFormat, ScanOutcome, ScanReport};
pub use crate::domain::ports::{CancelFlag, ConfigProvider, Scanner};
pub use crate::utils::error::Result;
