//! Error types for the port registry.
//!
//! This module provides the error hierarchy for every anticipated failure
//! mode in the allocation engine, using `thiserror` for ergonomic error
//! handling. No anticipated condition ever panics or unwinds; every public
//! entry point returns a [`Result`].

use thiserror::Error;

/// Result type alias for operations that may fail with a [`Error`].
///
/// # Examples
///
/// ```
/// use portreg::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(8080)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the port registry.
///
/// Every variant corresponds to one of the anticipated failure kinds named
/// in the allocation engine's design: validation failures at the boundary,
/// exhaustion of the search space, registry-capacity and ownership
/// conflicts, and the two forms of I/O failure (lock acquisition, durable
/// write).
#[derive(Debug, Error)]
pub enum Error {
    /// A registry directory path was rejected by the path sanitizer.
    #[error("invalid path: {reason}")]
    InvalidPath {
        /// The reason the path was rejected.
        reason: String,
    },

    /// A port number fell outside `1..=65535`.
    #[error("invalid port {port}: {reason}")]
    InvalidPort {
        /// The invalid port value.
        port: u32,
        /// The reason the port is invalid.
        reason: String,
    },

    /// A port range was malformed (`min > max`, or the range exceeds `65535`).
    #[error("invalid range {min}-{max}: {reason}")]
    InvalidRange {
        /// The requested minimum.
        min: u32,
        /// The requested maximum.
        max: u32,
        /// The reason the range is invalid.
        reason: String,
    },

    /// `count` fell outside `1..=maxPortsPerRequest`.
    #[error("invalid count {count}: {reason}")]
    InvalidCount {
        /// The requested count.
        count: usize,
        /// The reason the count is invalid.
        reason: String,
    },

    /// A privileged port (< 1024) was requested without `allow_privileged`.
    #[error("port {port} is privileged and allow_privileged is not set")]
    PrivilegedNotAllowed {
        /// The privileged port that was requested.
        port: u16,
    },

    /// The availability finder exhausted its search window without finding a free port.
    #[error("no available ports in range {min}-{max}")]
    NoAvailablePorts {
        /// The lower bound of the exhausted window.
        min: u16,
        /// The upper bound of the exhausted window.
        max: u16,
    },

    /// A contiguous-range reservation found `port` already promised to another caller.
    #[error("port {port} is already reserved in the registry")]
    RangeOccupied {
        /// The port already promised to another caller.
        port: u16,
    },

    /// A contiguous-range reservation found `port` bound by some other process on the host.
    #[error("port {port} is in use on the system")]
    RangeInUse {
        /// The port currently bound on the host.
        port: u16,
    },

    /// Satisfying the request would exceed `maxRegistrySize`.
    #[error("registry is full (capacity {capacity})")]
    RegistryFull {
        /// The configured capacity that would have been exceeded.
        capacity: usize,
    },

    /// `release` was called for a port with no matching registry entry.
    #[error("port {port} is not registered")]
    NotRegistered {
        /// The port that has no registry entry.
        port: u16,
    },

    /// `release` was called for a port owned by a different process.
    #[error("port {port} is owned by process {owner}, not the caller")]
    NotOwnedByCaller {
        /// The port in question.
        port: u16,
        /// The pid that actually owns the entry.
        owner: u32,
    },

    /// The cross-process mutex could not be acquired within its timeout.
    #[error("lock timeout after {seconds}s acquiring {path}")]
    LockTimeout {
        /// The path of the lock file.
        path: String,
        /// The number of seconds waited before timing out.
        seconds: u64,
    },

    /// A durable write of the registry document failed.
    #[error("failed to write registry: {reason}")]
    WriteFailed {
        /// The reason the write failed.
        reason: String,
    },

    /// The assembled configuration was internally inconsistent.
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// A description of the inconsistency.
        message: String,
    },

    /// [`crate::tracker::Tracker::allocate`] was called with a tag already
    /// tracked locally by the same tracker instance.
    #[error("tag '{tag}' is already tracked")]
    DuplicateTag {
        /// The tag that collided.
        tag: String,
    },

    /// An I/O error occurred outside of the durable-write path (e.g. directory creation).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// [`crate::tracker::Tracker::release_all`] attempted to release every
    /// tracked allocation and at least one release failed.
    ///
    /// Every failure is kept, not just the first, since the caller has no
    /// other way to learn which of its own tags or ports could not be
    /// released; the local tracker map is still cleared unconditionally.
    #[error(
        "{} of {} tracked releases failed: {}",
        failures.len(),
        failures.len() + successful,
        failures.iter().map(|(key, e)| format!("{key}: {e}")).collect::<Vec<_>>().join("; ")
    )]
    ReleaseAllFailed {
        /// Number of releases that succeeded.
        successful: usize,
        /// The tracked key (tag or synthetic `port-<N>`) and the error
        /// produced releasing it, for every release that failed.
        failures: Vec<(String, Error)>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_port_message() {
        let err = Error::InvalidPort {
            port: 0,
            reason: "port 0 is invalid".into(),
        };
        let display = format!("{err}");
        assert!(display.contains("invalid port"));
        assert!(display.contains('0'));
    }

    #[test]
    fn invalid_range_message() {
        let err = Error::InvalidRange {
            min: 5000,
            max: 4000,
            reason: "max must be >= min".into(),
        };
        let display = format!("{err}");
        assert!(display.contains("5000-4000"));
    }

    #[test]
    fn range_occupied_vs_range_in_use_are_distinct() {
        let occupied = Error::RangeOccupied { port: 50001 };
        let in_use = Error::RangeInUse { port: 50001 };
        assert_ne!(format!("{occupied}"), format!("{in_use}"));
    }

    #[test]
    fn not_owned_by_caller_names_the_owner() {
        let err = Error::NotOwnedByCaller {
            port: 9000,
            owner: 4242,
        };
        let display = format!("{err}");
        assert!(display.contains("4242"));
    }

    #[test]
    fn lock_timeout_message() {
        let err = Error::LockTimeout {
            path: "/tmp/.portreg/registry.lock".into(),
            seconds: 5,
        };
        let display = format!("{err}");
        assert!(display.contains('5'));
    }

    #[test]
    fn duplicate_tag_message() {
        let err = Error::DuplicateTag { tag: "api".into() };
        assert!(format!("{err}").contains("api"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(format!("{err}").contains("I/O error"));
    }

    #[test]
    fn release_all_failed_message_lists_every_failure() {
        let err = Error::ReleaseAllFailed {
            successful: 1,
            failures: vec![
                (
                    "a".into(),
                    Error::NotRegistered { port: 9001 },
                ),
                (
                    "b".into(),
                    Error::NotOwnedByCaller {
                        port: 9002,
                        owner: 4242,
                    },
                ),
            ],
        };
        let display = format!("{err}");
        assert!(display.contains("2 of 3"));
        assert!(display.contains("a: "));
        assert!(display.contains("b: "));
        assert!(display.contains("9001"));
        assert!(display.contains("9002"));
    }

    #[test]
    fn result_type_alias() {
        fn returns_result() -> Result<u16> {
            Err(Error::InvalidPort {
                port: 0,
                reason: "test".into(),
            })
        }
        assert!(returns_result().is_err());
    }
}
