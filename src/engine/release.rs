//! Release of individual or all of a caller's allocations (spec.md §4.5.4).

use crate::error::{Error, Result};

use super::{self_pid, Engine};

impl Engine {
    /// Releases `port`, if it is owned by the calling process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPort`] if `port` is `0`. Returns
    /// [`Error::NotRegistered`] if no entry exists for `port`. Returns
    /// [`Error::NotOwnedByCaller`] if `port` is registered under a
    /// different pid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use portreg::config::ConfigBuilder;
    /// use portreg::engine::Engine;
    ///
    /// let engine = Engine::new(ConfigBuilder::new().build().unwrap());
    /// let allocation = engine.get(None).unwrap();
    /// engine.release(allocation.port).unwrap();
    /// ```
    pub fn release(&self, port: u16) -> Result<()> {
        if port == 0 {
            return Err(Error::InvalidPort {
                port: 0,
                reason: "port 0 is invalid".into(),
            });
        }

        let logger = self.logger();
        logger.debug(&format!("release: entering critical section (port={port})"));

        let _guard = self.acquire_lock()?;
        let mut document = self.read_registry()?;

        let pid = self_pid();
        let position = document.entries.iter().position(|e| e.port == port);

        let result = match position {
            None => Err(Error::NotRegistered { port }),
            Some(idx) if document.entries[idx].pid != pid => Err(Error::NotOwnedByCaller {
                port,
                owner: document.entries[idx].pid,
            }),
            Some(idx) => {
                document.entries.remove(idx);
                self.write_registry(&document)?;
                Ok(())
            }
        };

        logger.debug(&format!("release: exiting critical section (port={port})"));
        result
    }

    /// Releases the calling process's own entry tagged `tag`, if one
    /// exists.
    ///
    /// This backs the façade's tag-based [`crate::facade::release_port`]:
    /// unlike [`Engine::release`], which targets a specific port, this
    /// scans for whichever port the caller itself tagged with `tag`. It
    /// is idempotent by construction — a `tag` with no matching
    /// self-owned entry is treated as already released, not an error.
    /// When more than one self-owned entry shares `tag`, only the first
    /// one found is released, matching the tracker's one-allocation-per-key
    /// bookkeeping.
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
    /// engine.get(Some("api")).unwrap();
    /// engine.release_by_tag("api").unwrap();
    /// ```
    pub fn release_by_tag(&self, tag: &str) -> Result<()> {
        let logger = self.logger();
        logger.debug(&format!("release_by_tag: entering critical section (tag={tag})"));

        let _guard = self.acquire_lock()?;
        let mut document = self.read_registry()?;

        let pid = self_pid();
        let position = document
            .entries
            .iter()
            .position(|e| e.pid == pid && e.tag.as_deref() == Some(tag));

        if let Some(idx) = position {
            document.entries.remove(idx);
            self.write_registry(&document)?;
        } else {
            logger.debug(&format!("release_by_tag: no self-owned entry for tag={tag}"));
        }

        logger.debug("release_by_tag: exiting critical section");
        Ok(())
    }

    /// Releases every port owned by the calling process, returning the
    /// count removed.
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
    /// engine.get_multiple(3, None).unwrap();
    /// let removed = engine.release_all().unwrap();
    /// assert_eq!(removed, 3);
    /// ```
    pub fn release_all(&self) -> Result<usize> {
        let logger = self.logger();
        logger.debug("release_all: entering critical section");

        let _guard = self.acquire_lock()?;
        let mut document = self.read_registry()?;

        let pid = self_pid();
        let before = document.entries.len();
        document.entries.retain(|e| e.pid != pid);
        let removed = before - document.entries.len();

        self.write_registry(&document)?;
        logger.debug(&format!("release_all: exiting critical section ({removed} removed)"));
        Ok(removed)
    }
}
