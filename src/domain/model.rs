use crate::utils::error::{Result, ScanError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned by the raw scan when no prime lies below the bound.
pub const NO_PRIME: i64 = -1;

/// Largest accepted bound. Every candidate below it fits in a `u32`.
pub const MAX_BOUND: i64 = u32::MAX as i64 + 1;

/// Bound scanned when none is given.
pub const DEFAULT_BOUND: i64 = 80_000;

/// Exclusive upper limit of a scan.
///
/// Anything up to [`MAX_BOUND`] is accepted, including zero and negative
/// values; those simply have no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Bound(i64);

impl Bound {
    pub fn new(value: i64) -> Result<Self> {
        if value > MAX_BOUND {
            return Err(ScanError::invalid_bound(
                value,
                format!("exceeds the maximum bound of {}", MAX_BOUND),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Exclusive candidate limit in the `u32` domain, or `None` when the
    /// range `2..bound` is empty.
    pub(crate) fn candidate_limit(self) -> Option<u64> {
        if self.0 <= 2 {
            None
        } else {
            Some(self.0 as u64)
        }
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self(DEFAULT_BOUND)
    }
}

impl TryFrom<i64> for Bound {
    type Error = ScanError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Bound> for i64 {
    fn from(bound: Bound) -> Self {
        bound.0
    }
}

impl From<u32> for Bound {
    fn from(value: u32) -> Self {
        Self(i64::from(value))
    }
}

impl FromStr for Bound {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|e| ScanError::invalid_bound(s, format!("not an integer ({})", e)))?;
        Self::new(value)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a single scan produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    pub largest_prime: Option<u32>,
    pub candidates_checked: u64,
}

impl ScanOutcome {
    /// The outcome with the `-1` sentinel in place of `None`.
    pub fn as_sentinel(&self) -> i64 {
        self.largest_prime.map(i64::from).unwrap_or(NO_PRIME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub const VARIANTS: [&'static str; 2] = ["text", "json"];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ScanError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    Self::VARIANTS.join(", ")
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scanner: String,
    pub bound: Bound,
    pub largest_prime: Option<u32>,
    /// Sentinel-preserving result: the prime, or `-1`.
    pub result: i64,
    pub candidates_checked: u64,
    pub elapsed_ms: u128,
    pub started_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn new(
        scanner: impl Into<String>,
        bound: Bound,
        outcome: ScanOutcome,
        elapsed_ms: u128,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scanner: scanner.into(),
            bound,
            largest_prime: outcome.largest_prime,
            result: outcome.as_sentinel(),
            candidates_checked: outcome.candidates_checked,
            elapsed_ms,
            started_at,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => Ok(match self.largest_prime {
                Some(p) => format!(
                    "Largest prime below {} is {} ({} candidates, {} ms)",
                    self.bound, p, self.candidates_checked, self.elapsed_ms
                ),
                None => format!("No prime below {} (result {})", self.bound, self.result),
            }),
        }
    }
}
