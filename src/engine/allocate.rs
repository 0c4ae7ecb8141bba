//! Single and multi-port allocation (spec.md §4.5.1).

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::registry::{AllocationEntry, AllocationRecord};
use crate::sanitize::sanitize_tag;

use super::{finder, now_millis, self_pid, Engine};

impl Engine {
    /// Allocates a single port, optionally tagged.
    ///
    /// A specialization of [`Engine::get_multiple`] with `count = 1`.
    ///
    /// # Errors
    ///
    /// See [`Engine::get_multiple`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use portreg::config::ConfigBuilder;
    /// use portreg::engine::Engine;
    ///
    /// let engine = Engine::new(ConfigBuilder::new().build().unwrap());
    /// let allocation = engine.get(Some("api")).unwrap();
    /// assert!(allocation.port > 0);
    /// ```
    pub fn get(&self, tag: Option<&str>) -> Result<AllocationRecord> {
        let mut records = self.get_multiple(1, tag)?;
        Ok(records.remove(0))
    }

    /// Allocates `count` ports, all sharing `tag`, atomically: on failure
    /// partway through, every port this call had already appended is
    /// rolled back within the same critical section before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCount`] if `count` is zero or exceeds
    /// `max_ports_per_request`. Returns [`Error::RegistryFull`] if
    /// satisfying the request would exceed `max_registry_size`. Returns
    /// whatever [`crate::engine::finder::find_available_port`] returns on
    /// exhaustion of the configured window.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use portreg::config::ConfigBuilder;
    /// use portreg::engine::Engine;
    ///
    /// let engine = Engine::new(ConfigBuilder::new().build().unwrap());
    /// let allocations = engine.get_multiple(3, Some("worker")).unwrap();
    /// assert_eq!(allocations.len(), 3);
    /// ```
    pub fn get_multiple(&self, count: usize, tag: Option<&str>) -> Result<Vec<AllocationRecord>> {
        if count == 0 || count > self.config().max_ports_per_request {
            return Err(Error::InvalidCount {
                count,
                reason: format!(
                    "count must be between 1 and {}",
                    self.config().max_ports_per_request
                ),
            });
        }

        let logger = self.logger();
        logger.debug(&format!("get_multiple: entering critical section (count={count})"));

        let _guard = self.acquire_lock()?;
        let mut document = self.read_registry()?;

        let now = now_millis();
        let (mut active, evicted) = super::partition_active(
            std::mem::take(&mut document.entries),
            self.config().stale_timeout,
            now,
        );
        if evicted > 0 {
            logger.debug(&format!("get_multiple: evicted {evicted} stale entries"));
        }

        if active.len() + count > self.config().max_registry_size {
            return Err(Error::RegistryFull {
                capacity: self.config().max_registry_size,
            });
        }

        let sanitized_tag = sanitize_tag(tag);
        let mut exclusions: HashSet<u16> = active.iter().map(|e| e.port).collect();
        let pid = self_pid();
        let mut results = Vec::with_capacity(count);
        let added_from = active.len();

        let lo = self.config().effective_min_port();
        let hi = self.config().effective_max_port();

        for _ in 0..count {
            match finder::find_available_port(lo, hi, &exclusions) {
                Ok(port) => {
                    exclusions.insert(port);
                    active.push(AllocationEntry {
                        port,
                        pid,
                        timestamp: now,
                        tag: sanitized_tag.clone(),
                    });
                    results.push(AllocationRecord {
                        port,
                        tag: sanitized_tag.clone(),
                    });
                }
                Err(e) => {
                    active.truncate(added_from);
                    logger.debug(&format!(
                        "get_multiple: rolling back {} of {count} ports after exhaustion",
                        results.len()
                    ));
                    return Err(e);
                }
            }
        }

        document.entries = active;
        self.write_registry(&document)?;
        logger.debug(&format!("get_multiple: exiting critical section ({} allocated)", results.len()));

        Ok(results)
    }
}
