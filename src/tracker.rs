//! Per-caller lifecycle tracker: an in-memory overlay that remembers a
//! caller's own allocations by tag so they can be released without
//! keeping track of raw port numbers (spec.md §4.6).
//!
//! The tracker never takes the registry lock itself; every method
//! delegates to an [`Engine`], which takes it for its own duration. The
//! tracker is not a cache of registry state — it only remembers the
//! caller's own assertions, so there is no coherence problem: the engine
//! always re-reads the registry under the lock.

use std::collections::HashMap;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::registry::AllocationRecord;

/// What to look up in a [`Tracker`]'s local map: either a numeric port, or
/// a string tag (which also matches a synthetic `port-<N>` key).
///
/// spec.md §4.6 describes `release` as dispatching on whether the caller
/// passed a number or a string; this enum is the Rust expression of that
/// dynamic dispatch, with `From` impls so callers can still just write
/// `tracker.release("api")` or `tracker.release(8080)`.
#[derive(Debug, Clone)]
pub enum TrackerKey {
    /// Release whichever tracked allocation holds this port.
    Port(u16),
    /// Release the allocation tracked under this tag (or synthetic key).
    Tag(String),
}

impl From<u16> for TrackerKey {
    fn from(port: u16) -> Self {
        Self::Port(port)
    }
}

impl From<&str> for TrackerKey {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }
}

impl From<String> for TrackerKey {
    fn from(tag: String) -> Self {
        Self::Tag(tag)
    }
}

/// A per-caller map from tag (or synthetic `port-<N>` key) to allocation.
///
/// A `Tracker`'s lifetime is the caller's: its map dies with the process
/// unless explicitly released. The same tag may be used independently in
/// two different `Tracker` instances without conflict, since only the
/// shared registry enforces port uniqueness.
///
/// # Examples
///
/// ```no_run
/// use portreg::config::ConfigBuilder;
/// use portreg::tracker::Tracker;
///
/// let config = ConfigBuilder::new().build().unwrap();
/// let mut tracker = Tracker::new(config);
///
/// let allocation = tracker.allocate(Some("api")).unwrap();
/// assert_eq!(tracker.get("api").unwrap().port, allocation.port);
///
/// tracker.release("api").unwrap();
/// assert!(tracker.get("api").is_none());
/// ```
#[derive(Debug)]
pub struct Tracker {
    engine: Engine,
    allocations: HashMap<String, AllocationRecord>,
    next_synthetic_index: usize,
}

impl Tracker {
    /// Creates a new, empty tracker bound to `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            engine: Engine::new(config),
            allocations: HashMap::new(),
            next_synthetic_index: 0,
        }
    }

    /// Allocates a single port and tracks it under `tag`, or under a
    /// synthetic `port-<N>` key when no tag is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTag`] if `tag` is already tracked locally
    /// by this tracker. Otherwise propagates whatever [`Engine::get`]
    /// returns.
    pub fn allocate(&mut self, tag: Option<&str>) -> Result<AllocationRecord> {
        if let Some(tag) = tag {
            if self.allocations.contains_key(tag) {
                return Err(Error::DuplicateTag { tag: tag.to_string() });
            }
        }

        let record = self.engine.get(tag)?;
        let key = tag.map_or_else(|| self.next_synthetic_key(), str::to_string);
        self.allocations.insert(key, record.clone());
        Ok(record)
    }

    /// Allocates `count` ports sharing `tag` in the registry, tracking
    /// each under its own synthetic `port-<N>` key so local lookups stay
    /// unique even when every allocation shares one registry-level tag.
    ///
    /// # Errors
    ///
    /// Propagates whatever [`Engine::get_multiple`] returns.
    pub fn allocate_multiple(
        &mut self,
        count: usize,
        tag: Option<&str>,
    ) -> Result<Vec<AllocationRecord>> {
        let records = self.engine.get_multiple(count, tag)?;
        for record in &records {
            let key = self.next_synthetic_key();
            self.allocations.insert(key, record.clone());
        }
        Ok(records)
    }

    /// Releases a tracked allocation, identified either by its tag (or
    /// synthetic `port-<N>` key) or by its numeric port.
    ///
    /// A tag lookup is idempotent: a tag with no local entry succeeds
    /// without contacting the engine at all. A port lookup always
    /// delegates to [`Engine::release`] so that a port the caller knows
    /// about, but this tracker never recorded, still gets released;
    /// the local map entry is removed first if one happens to match.
    ///
    /// # Errors
    ///
    /// Propagates whatever [`Engine::release`] returns.
    pub fn release(&mut self, key: impl Into<TrackerKey>) -> Result<()> {
        match key.into() {
            TrackerKey::Tag(tag) => match self.allocations.remove(&tag) {
                Some(record) => self.engine.release(record.port),
                None => Ok(()),
            },
            TrackerKey::Port(port) => {
                if let Some(map_key) = self
                    .allocations
                    .iter()
                    .find(|(_, record)| record.port == port)
                    .map(|(key, _)| key.clone())
                {
                    self.allocations.remove(&map_key);
                }
                self.engine.release(port)
            }
        }
    }

    /// Releases every tracked allocation, clearing the local map
    /// unconditionally regardless of individual failures.
    ///
    /// Every release is attempted even after an earlier one fails, so one
    /// stuck port can never hide a second.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReleaseAllFailed`] listing every key whose release
    /// failed (and the error each one produced) if at least one did; the
    /// count of successful releases is recorded on that error, and the
    /// local map is still cleared regardless.
    pub fn release_all(&mut self) -> Result<usize> {
        let entries: Vec<_> = self.allocations.drain().collect();
        let mut released = 0;
        let mut failures = Vec::new();

        for (key, record) in entries {
            match self.engine.release(record.port) {
                Ok(()) => released += 1,
                Err(e) => failures.push((key, e)),
            }
        }

        if failures.is_empty() {
            Ok(released)
        } else {
            Err(Error::ReleaseAllFailed {
                successful: released,
                failures,
            })
        }
    }

    /// Looks up the allocation tracked under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AllocationRecord> {
        self.allocations.get(key)
    }

    /// Returns every allocation this tracker currently knows about.
    #[must_use]
    pub fn get_allocations(&self) -> Vec<&AllocationRecord> {
        self.allocations.values().collect()
    }

    fn next_synthetic_key(&mut self) -> String {
        let key = format!("port-{}", self.next_synthetic_index);
        self.next_synthetic_index += 1;
        key
    }
}
