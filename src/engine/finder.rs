//! Randomized-then-sequential availability search.
//!
//! Randomization gives fast average-case allocation in a sparse registry
//! and avoids deterministic collisions between independent allocators
//! starting at the same instant; the sequential fallback guarantees
//! completeness once the window is dense.

use std::collections::HashSet;

use rand::Rng;

use crate::error::{Error, Result};
use crate::probe;

const MAX_RANDOM_ATTEMPTS: u32 = 100;

/// Finds a free port in `[lo, hi]`, skipping anything in `excluded`.
///
/// Up to `min(100, hi - lo + 1)` random draws are tried first; if none
/// land on a free, unexcluded port, the window is scanned sequentially
/// from `lo` to `hi`.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] if `lo > hi`. Returns
/// [`Error::NoAvailablePorts`] if every port in the window is either
/// excluded or fails the availability probe.
///
/// # Examples
///
/// ```
/// use portreg::engine::finder::find_available_port;
/// use std::collections::HashSet;
///
/// let excluded = HashSet::new();
/// let port = find_available_port(40000, 40100, &excluded).unwrap();
/// assert!((40000..=40100).contains(&port));
/// ```
pub fn find_available_port(lo: u16, hi: u16, excluded: &HashSet<u16>) -> Result<u16> {
    if lo > hi {
        return Err(Error::InvalidRange {
            min: u32::from(lo),
            max: u32::from(hi),
            reason: "min must be less than or equal to max".into(),
        });
    }

    let window_size = u32::from(hi - lo) + 1;
    let random_attempts = MAX_RANDOM_ATTEMPTS.min(window_size);

    let mut rng = rand::thread_rng();
    for _ in 0..random_attempts {
        let candidate = rng.gen_range(lo..=hi);
        if excluded.contains(&candidate) {
            continue;
        }
        if probe::try_bind(candidate) {
            return Ok(candidate);
        }
    }

    for candidate in lo..=hi {
        if excluded.contains(&candidate) {
            continue;
        }
        if probe::try_bind(candidate) {
            return Ok(candidate);
        }
    }

    Err(Error::NoAvailablePorts { min: lo, max: hi })
}
