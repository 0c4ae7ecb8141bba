//! The allocation engine: the critical section that owns every read,
//! mutation, and write of the registry document.
//!
//! Every public method here takes the cross-process lock for its own
//! duration and releases it on return, including on the error path (the
//! lock guard's `Drop` handles that). Nothing outside this module touches
//! [`crate::registry::codec`] or [`crate::lock`] directly.

pub mod allocate;
pub mod finder;
pub mod introspect;
pub mod range;
pub mod release;

pub use introspect::RegistryStatus;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Config;
use crate::lock::LockGuard;
use crate::logging::{init_logger, Logger};
use crate::registry::{codec, AllocationEntry, RegistryDocument};
use crate::error::Result;

/// The concurrency-safe allocation engine.
///
/// Stateless beyond its configuration: every method re-reads the registry
/// under the lock, so there is no cached view that could drift from disk.
///
/// # Examples
///
/// ```no_run
/// use portreg::config::ConfigBuilder;
/// use portreg::engine::Engine;
///
/// let config = ConfigBuilder::new().build().unwrap();
/// let engine = Engine::new(config);
/// let allocation = engine.get(None).unwrap();
/// println!("allocated port {}", allocation.port);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Creates a new engine bound to `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration this engine was constructed with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn registry_path(&self) -> PathBuf {
        self.config.registry_dir.join("registry.json")
    }

    fn lock_path(&self) -> PathBuf {
        self.config.registry_dir.join("registry.lock")
    }

    fn acquire_lock(&self) -> Result<LockGuard> {
        LockGuard::acquire(self.lock_path(), crate::lock::LOCK_TIMEOUT)
    }

    fn read_registry(&self) -> Result<RegistryDocument> {
        codec::read(self.registry_path())
    }

    fn write_registry(&self, document: &RegistryDocument) -> Result<()> {
        codec::write(self.registry_path(), document)
    }

    /// A logger bound to this engine's `Config.verbose` flag.
    ///
    /// Every critical-section method builds one of these fresh rather
    /// than caching it on `self`, since [`Logger`] only holds a
    /// [`crate::LogLevel`] and `Config` can in principle be swapped out
    /// between calls.
    pub(crate) fn logger(&self) -> Logger {
        init_logger(&self.config)
    }
}

/// Current process id, used as the owner of every entry this process creates.
#[must_use]
pub fn self_pid() -> u32 {
    std::process::id()
}

/// Milliseconds since the Unix epoch, used as the entry timestamp.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `true` iff `entry` is stale: its owning pid is no longer live, or its
/// age exceeds `stale_timeout_ms`.
#[must_use]
pub fn is_stale(entry: &AllocationEntry, stale_timeout_ms: u64, now_ms: u64) -> bool {
    if !crate::probe::alive(entry.pid) {
        return true;
    }
    now_ms.saturating_sub(entry.timestamp) > stale_timeout_ms
}

/// Splits `entries` into `(active, stale_count)`, dropping stale entries.
///
/// Stale entries are never written back; eviction is purely a side effect
/// of whichever operation happened to observe them.
#[must_use]
pub fn partition_active(
    entries: Vec<AllocationEntry>,
    stale_timeout_ms: u64,
    now_ms: u64,
) -> (Vec<AllocationEntry>, usize) {
    let mut active = Vec::with_capacity(entries.len());
    let mut stale_count = 0;
    for entry in entries {
        if is_stale(&entry, stale_timeout_ms, now_ms) {
            stale_count += 1;
        } else {
            active.push(entry);
        }
    }
    (active, stale_count)
}
