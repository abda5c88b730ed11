//! Largest-prime-below search by naive trial division.
//!
//! Candidates run upward from 2; each one is tested against every
//! divisor from its predecessor down to 2. The cost is quadratic in the
//! bound and nothing is cached between candidates.

use crate::domain::model::{Bound, ScanOutcome, NO_PRIME};
use crate::utils::error::{Result, ScanError};
use std::sync::atomic::{AtomicBool, Ordering};

/// Trial division with divisors taken in descending order.
pub fn is_prime(n: u32) -> bool {
    n >= 2 && (2..n).rev().all(|j| n % j != 0)
}

/// Walks `2..limit`, keeping the last prime seen. Returns `None` as soon
/// as `stop` answers true before a candidate.
fn scan_candidates(limit: Option<u64>, mut stop: impl FnMut() -> bool) -> Option<ScanOutcome> {
    let mut outcome = ScanOutcome {
        largest_prime: None,
        candidates_checked: 0,
    };
    let Some(limit) = limit else {
        return Some(outcome);
    };

    // limit <= MAX_BOUND, so the last candidate is at most u32::MAX.
    let last = (limit - 1) as u32;
    // 由小到大掃描，只保留最後一個質數
    for candidate in 2..=last {
        if stop() {
            return None;
        }
        outcome.candidates_checked += 1;
        if is_prime(candidate) {
            outcome.largest_prime = Some(candidate);
        }
    }
    Some(outcome)
}

/// Largest prime strictly below `bound`, or `-1` when there is none.
///
/// Bounds of 2 or less, negatives included, give `Ok(-1)`. Bounds above
/// [`MAX_BOUND`](crate::domain::model::MAX_BOUND) are rejected rather than scanned.
pub fn largest_prime_below(bound: i64) -> Result<i64> {
    let bound = Bound::new(bound)?;
    Ok(find_largest_prime_below(bound).map_or(NO_PRIME, i64::from))
}

pub fn find_largest_prime_below(bound: Bound) -> Option<u32> {
    scan_candidates(bound.candidate_limit(), || false).and_then(|outcome| outcome.largest_prime)
}

/// Same scan as [`find_largest_prime_below`], checking `cancel` before
/// every candidate. A cancelled scan yields no partial result.
pub fn scan_cancellable(bound: Bound, cancel: &AtomicBool) -> Result<ScanOutcome> {
    scan_candidates(bound.candidate_limit(), || cancel.load(Ordering::Relaxed))
        .ok_or(ScanError::Cancelled)
}
