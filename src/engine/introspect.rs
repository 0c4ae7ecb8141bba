//! Read-only and administrative introspection over the registry (spec.md §4.5.5).

use crate::error::Result;
use crate::registry::{AllocationEntry, RegistryDocument};

use super::{is_stale, now_millis, self_pid, Engine};

/// Counts returned by [`Engine::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStatus {
    /// Number of entries that are not stale.
    pub active: usize,
    /// Number of entries that are stale (owner dead, or past `staleTimeout`).
    pub stale: usize,
    /// Number of active entries owned by the calling process.
    pub owned_by_caller: usize,
    /// The configured minimum port (after privileged-port clamping).
    pub min_port: u16,
    /// The configured maximum port.
    pub max_port: u16,
}

impl Engine {
    /// Returns a snapshot of every entry currently in the registry.
    ///
    /// Unlike every other engine operation, this does **not** evict stale
    /// entries; it is a pure read.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lock cannot be acquired or the
    /// registry cannot be read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use portreg::config::ConfigBuilder;
    /// use portreg::engine::Engine;
    ///
    /// let engine = Engine::new(ConfigBuilder::new().build().unwrap());
    /// let snapshot = engine.list().unwrap();
    /// println!("{} entries", snapshot.len());
    /// ```
    pub fn list(&self) -> Result<Vec<AllocationEntry>> {
        let logger = self.logger();
        logger.debug("list: entering critical section");
        let _guard = self.acquire_lock()?;
        let document = self.read_registry()?;
        logger.debug(&format!("list: exiting critical section ({} entries)", document.entries.len()));
        Ok(document.entries)
    }

    /// Returns counts derived from a stale/active partition of the
    /// current registry contents, plus the configured allocation window.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lock cannot be acquired or the
    /// registry cannot be read.
    pub fn status(&self) -> Result<RegistryStatus> {
        let logger = self.logger();
        logger.debug("status: entering critical section");
        let _guard = self.acquire_lock()?;
        let document = self.read_registry()?;

        let now = now_millis();
        let pid = self_pid();
        let mut active = 0;
        let mut stale = 0;
        let mut owned_by_caller = 0;

        for entry in &document.entries {
            if is_stale(entry, self.config().stale_timeout, now) {
                stale += 1;
            } else {
                active += 1;
                if entry.pid == pid {
                    owned_by_caller += 1;
                }
            }
        }

        logger.debug("status: exiting critical section");
        Ok(RegistryStatus {
            active,
            stale,
            owned_by_caller,
            min_port: self.config().effective_min_port(),
            max_port: self.config().effective_max_port(),
        })
    }

    /// Writes back only the active entries, returning the number evicted.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lock cannot be acquired or the
    /// registry cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use portreg::config::ConfigBuilder;
    /// use portreg::engine::Engine;
    ///
    /// let engine = Engine::new(ConfigBuilder::new().build().unwrap());
    /// let evicted = engine.clean().unwrap();
    /// println!("evicted {evicted} stale entries");
    /// ```
    pub fn clean(&self) -> Result<usize> {
        let logger = self.logger();
        logger.debug("clean: entering critical section");

        let _guard = self.acquire_lock()?;
        let mut document = self.read_registry()?;

        let now = now_millis();
        let (active, evicted) = super::partition_active(
            std::mem::take(&mut document.entries),
            self.config().stale_timeout,
            now,
        );
        if evicted > 0 {
            logger.debug(&format!("clean: evicted {evicted} stale entries"));
        }

        document.entries = active;
        self.write_registry(&document)?;
        logger.debug("clean: exiting critical section");
        Ok(evicted)
    }

    /// Replaces the registry with an empty document at the current schema
    /// version, discarding every entry regardless of owner or staleness.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lock cannot be acquired or the
    /// registry cannot be written.
    pub fn clear(&self) -> Result<()> {
        let logger = self.logger();
        logger.debug("clear: entering critical section");
        let _guard = self.acquire_lock()?;
        let result = self.write_registry(&RegistryDocument::empty());
        logger.debug("clear: exiting critical section");
        result
    }
}
