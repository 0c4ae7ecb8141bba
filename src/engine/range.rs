//! Contiguous-range reservation and bounded-range single allocation
//! (spec.md §4.5.2, §4.5.3).

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::registry::{AllocationEntry, AllocationRecord};
use crate::sanitize::sanitize_tag;

use super::{finder, now_millis, self_pid, Engine};

impl Engine {
    /// Reserves exactly the contiguous range `[start, start + count - 1]`.
    ///
    /// Unlike [`Engine::get_multiple`], failure is always detected before
    /// any mutation: every port in the range is checked before any entry
    /// is appended, so there is nothing to roll back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCount`] if `count` is zero or exceeds
    /// `max_ports_per_request`. Returns [`Error::InvalidPort`] if `start`
    /// is `0`. Returns [`Error::InvalidRange`] if the range extends past
    /// `65535`. Returns
    /// [`Error::PrivilegedNotAllowed`] if `start` is privileged and the
    /// configuration disallows it. Returns [`Error::RegistryFull`] if
    /// satisfying the request would exceed `max_registry_size`. Returns
    /// [`Error::RangeOccupied`] if some port in the range is already
    /// promised in the registry, or [`Error::RangeInUse`] if some port in
    /// the range is bound by another process on the host.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use portreg::config::ConfigBuilder;
    /// use portreg::engine::Engine;
    ///
    /// let engine = Engine::new(ConfigBuilder::new().build().unwrap());
    /// let allocations = engine.reserve_range(52000, 3, Some("contiguous")).unwrap();
    /// assert_eq!(allocations.len(), 3);
    /// assert_eq!(allocations[0].port, 52000);
    /// assert_eq!(allocations[2].port, 52002);
    /// ```
    pub fn reserve_range(
        &self,
        start: u16,
        count: usize,
        tag: Option<&str>,
    ) -> Result<Vec<AllocationRecord>> {
        if count == 0 || count > self.config().max_ports_per_request {
            return Err(Error::InvalidCount {
                count,
                reason: format!(
                    "count must be between 1 and {}",
                    self.config().max_ports_per_request
                ),
            });
        }

        if start == 0 {
            return Err(Error::InvalidPort {
                port: 0,
                reason: "port 0 is invalid".into(),
            });
        }

        let end = u32::from(start) + (count as u32) - 1;
        if end > u32::from(u16::MAX) {
            return Err(Error::InvalidRange {
                min: u32::from(start),
                max: end,
                reason: "range exceeds 65535".into(),
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let end = end as u16;

        if !self.config().allow_privileged && start < 1024 {
            return Err(Error::PrivilegedNotAllowed { port: start });
        }

        let logger = self.logger();
        logger.debug(&format!(
            "reserve_range: entering critical section (start={start}, count={count})"
        ));

        let _guard = self.acquire_lock()?;
        let mut document = self.read_registry()?;

        let now = now_millis();
        let (mut active, evicted) = super::partition_active(
            std::mem::take(&mut document.entries),
            self.config().stale_timeout,
            now,
        );
        if evicted > 0 {
            logger.debug(&format!("reserve_range: evicted {evicted} stale entries"));
        }

        if active.len() + count > self.config().max_registry_size {
            return Err(Error::RegistryFull {
                capacity: self.config().max_registry_size,
            });
        }

        let exclusions: HashSet<u16> = active.iter().map(|e| e.port).collect();

        for port in start..=end {
            if exclusions.contains(&port) {
                return Err(Error::RangeOccupied { port });
            }
            if !crate::probe::try_bind(port) {
                return Err(Error::RangeInUse { port });
            }
        }

        let sanitized_tag = sanitize_tag(tag);
        let pid = self_pid();
        let mut results = Vec::with_capacity(count);
        for port in start..=end {
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

        document.entries = active;
        self.write_registry(&document)?;
        logger.debug("reserve_range: exiting critical section");

        Ok(results)
    }

    /// Allocates a single free port from within `[min, max]`, overriding
    /// the engine's configured window for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPort`] if `min` is `0`. Returns
    /// [`Error::InvalidRange`] if `min > max`. Returns
    /// [`Error::PrivilegedNotAllowed`] if `min` is privileged and the
    /// configuration disallows it. Returns [`Error::RegistryFull`] if
    /// satisfying the request would exceed `max_registry_size`. Returns
    /// [`Error::NoAvailablePorts`] if the window is exhausted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use portreg::config::ConfigBuilder;
    /// use portreg::engine::Engine;
    ///
    /// let engine = Engine::new(ConfigBuilder::new().build().unwrap());
    /// let allocation = engine.get_in_range(53000, 53100, None).unwrap();
    /// assert!((53000..=53100).contains(&allocation.port));
    /// ```
    pub fn get_in_range(&self, min: u16, max: u16, tag: Option<&str>) -> Result<AllocationRecord> {
        if min == 0 {
            return Err(Error::InvalidPort {
                port: 0,
                reason: "port 0 is invalid".into(),
            });
        }
        if min > max {
            return Err(Error::InvalidRange {
                min: u32::from(min),
                max: u32::from(max),
                reason: "min must be less than or equal to max".into(),
            });
        }
        if !self.config().allow_privileged && min < 1024 {
            return Err(Error::PrivilegedNotAllowed { port: min });
        }

        let logger = self.logger();
        logger.debug(&format!(
            "get_in_range: entering critical section (min={min}, max={max})"
        ));

        let _guard = self.acquire_lock()?;
        let mut document = self.read_registry()?;

        let now = now_millis();
        let (mut active, evicted) = super::partition_active(
            std::mem::take(&mut document.entries),
            self.config().stale_timeout,
            now,
        );
        if evicted > 0 {
            logger.debug(&format!("get_in_range: evicted {evicted} stale entries"));
        }

        if active.len() + 1 > self.config().max_registry_size {
            return Err(Error::RegistryFull {
                capacity: self.config().max_registry_size,
            });
        }

        let exclusions: HashSet<u16> = active.iter().map(|e| e.port).collect();
        let port = finder::find_available_port(min, max, &exclusions)?;

        let sanitized_tag = sanitize_tag(tag);
        active.push(AllocationEntry {
            port,
            pid: self_pid(),
            timestamp: now,
            tag: sanitized_tag.clone(),
        });

        document.entries = active;
        self.write_registry(&document)?;
        logger.debug(&format!("get_in_range: exiting critical section (port={port})"));

        Ok(AllocationRecord {
            port,
            tag: sanitized_tag,
        })
    }
}
