//! Stateless, module-level entry points that instantiate the [`Engine`]
//! once per call (spec.md §4.5.6).
//!
//! These are the functions a caller reaches for when it does not want to
//! manage an `Engine` value itself. Each wrapper takes a [`Config`] by
//! reference and constructs a fresh, short-lived engine around it.

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::registry::AllocationRecord;

/// Selects either a single shared tag applied to every allocated port, or
/// one tag per requested port.
///
/// # Examples
///
/// ```
/// use portreg::facade::{get_ports, GetPortsOptions};
/// use portreg::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new().build().unwrap();
/// let allocations = get_ports(2, GetPortsOptions::shared_tag(Some("batch")), &config).unwrap();
/// assert_eq!(allocations.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub enum GetPortsOptions {
    /// No tag at all; ports are allocated untagged.
    #[default]
    None,
    /// Every allocated port carries this single tag.
    SharedTag(Option<String>),
    /// One tag per requested port, in order. Length must match `count`.
    PerPortTags(Vec<Option<String>>),
}

impl GetPortsOptions {
    /// Builds the shared-tag variant.
    #[must_use]
    pub fn shared_tag(tag: Option<&str>) -> Self {
        Self::SharedTag(tag.map(str::to_string))
    }

    /// Builds the per-port-tag variant.
    #[must_use]
    pub fn per_port_tags(tags: Vec<Option<String>>) -> Self {
        Self::PerPortTags(tags)
    }
}

/// Allocates a single port, optionally tagged.
///
/// # Errors
///
/// See [`Engine::get`].
///
/// # Examples
///
/// ```no_run
/// use portreg::facade::get_port;
/// use portreg::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new().build().unwrap();
/// let allocation = get_port(Some("api"), &config).unwrap();
/// println!("allocated port {}", allocation.port);
/// ```
pub fn get_port(tag: Option<&str>, config: &Config) -> Result<AllocationRecord> {
    Engine::new(config.clone()).get(tag)
}

/// Allocates `count` ports according to `opts`.
///
/// **Shared-tag mode** (and the untagged default) delegates to
/// [`Engine::get_multiple`], which is fully transactional: the whole
/// request rolls back within a single critical section on failure.
///
/// **Per-port-tag mode** calls [`Engine::get`] once per tag. If any call
/// fails partway through, every port already allocated by this request is
/// released (manual rollback across separate critical sections) before
/// the failure is returned. This gives the caller all-or-nothing
/// semantics, but an external observer may briefly see the partial state
/// between the individual `get` calls — see spec.md §9's documented
/// caveat.
///
/// # Errors
///
/// Returns [`Error::InvalidCount`] if `opts` is [`GetPortsOptions::PerPortTags`]
/// with a tag count that does not equal `count`. Otherwise propagates
/// whatever the underlying engine call returns.
///
/// # Examples
///
/// ```no_run
/// use portreg::facade::{get_ports, GetPortsOptions};
/// use portreg::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new().build().unwrap();
/// let allocations = get_ports(
///     2,
///     GetPortsOptions::per_port_tags(vec![Some("a".to_string()), Some("b".to_string())]),
///     &config,
/// ).unwrap();
/// assert_eq!(allocations.len(), 2);
/// ```
pub fn get_ports(
    count: usize,
    opts: GetPortsOptions,
    config: &Config,
) -> Result<Vec<AllocationRecord>> {
    let engine = Engine::new(config.clone());

    match opts {
        GetPortsOptions::None => engine.get_multiple(count, None),
        GetPortsOptions::SharedTag(tag) => engine.get_multiple(count, tag.as_deref()),
        GetPortsOptions::PerPortTags(tags) => {
            if tags.len() != count {
                return Err(Error::InvalidCount {
                    count,
                    reason: format!(
                        "{} tags were supplied for a request of {count} ports",
                        tags.len()
                    ),
                });
            }

            let mut allocated = Vec::with_capacity(count);
            for tag in tags {
                match engine.get(tag.as_deref()) {
                    Ok(record) => allocated.push(record),
                    Err(e) => {
                        for record in &allocated {
                            let _ = engine.release(record.port);
                        }
                        return Err(e);
                    }
                }
            }
            Ok(allocated)
        }
    }
}

/// Identifies what to release through [`release_port`]: either an
/// explicit port number or a tag.
#[derive(Debug, Clone)]
pub enum ReleaseTarget {
    /// Release by numeric port.
    Port(u16),
    /// Release by tag: scans the registry for the calling process's own
    /// entry carrying this tag. The façade holds no local tag→port
    /// mapping of its own, so this reads the authoritative source — the
    /// registry itself already records each entry's tag and owning pid.
    Tag(String),
}

/// Releases a port, identified either directly or by tag.
///
/// This is idempotent: releasing a port that is not registered, or a tag
/// that resolves to no self-owned entry, succeeds silently. Releasing a
/// port owned by a different process still fails with
/// [`Error::NotOwnedByCaller`].
///
/// # Errors
///
/// Returns [`Error::NotOwnedByCaller`] if the port is registered under a
/// different pid. Returns [`Error::InvalidPort`] only if... it never
/// does: a syntactically invalid port number succeeds silently, per
/// spec.md §4.5.6.
///
/// # Examples
///
/// ```no_run
/// use portreg::facade::{get_port, release_port, ReleaseTarget};
/// use portreg::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new().build().unwrap();
/// let allocation = get_port(Some("api"), &config).unwrap();
/// release_port(ReleaseTarget::Tag("api".to_string()), &config).unwrap();
/// // Idempotent: releasing again still succeeds.
/// release_port(ReleaseTarget::Port(allocation.port), &config).unwrap();
/// ```
pub fn release_port(target: ReleaseTarget, config: &Config) -> Result<()> {
    let engine = Engine::new(config.clone());

    match target {
        ReleaseTarget::Port(port) => match engine.release(port) {
            Ok(()) | Err(Error::NotRegistered { .. }) | Err(Error::InvalidPort { .. }) => Ok(()),
            Err(e) => Err(e),
        },
        ReleaseTarget::Tag(tag) => engine.release_by_tag(&tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    fn test_config(dir: &std::path::Path) -> Config {
        ConfigBuilder::new().registry_dir(dir).build().unwrap()
    }

    #[test]
    fn get_port_allocates() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let allocation = get_port(Some("api"), &config).unwrap();
        assert!(allocation.port > 0);
    }

    #[test]
    fn get_ports_shared_tag_applies_to_all() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let allocations =
            get_ports(3, GetPortsOptions::shared_tag(Some("batch")), &config).unwrap();
        assert_eq!(allocations.len(), 3);
        assert!(allocations.iter().all(|a| a.tag.as_deref() == Some("batch")));
    }

    #[test]
    fn get_ports_per_port_tags_mismatched_count_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let result = get_ports(
            3,
            GetPortsOptions::per_port_tags(vec![Some("a".to_string())]),
            &config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn get_ports_per_port_tags_assigns_each_tag() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let allocations = get_ports(
            2,
            GetPortsOptions::per_port_tags(vec![Some("a".to_string()), Some("b".to_string())]),
            &config,
        )
        .unwrap();

        assert_eq!(allocations[0].tag.as_deref(), Some("a"));
        assert_eq!(allocations[1].tag.as_deref(), Some("b"));
    }

    #[test]
    fn release_port_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let allocation = get_port(None, &config).unwrap();
        release_port(ReleaseTarget::Port(allocation.port), &config).unwrap();
        release_port(ReleaseTarget::Port(allocation.port), &config).unwrap();
    }

    #[test]
    fn release_port_by_tag_releases_self_owned_entry() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        get_port(Some("api"), &config).unwrap();
        release_port(ReleaseTarget::Tag("api".to_string()), &config).unwrap();

        let remaining = Engine::new(config).list().unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn release_port_by_unknown_tag_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        release_port(ReleaseTarget::Tag("never-allocated".to_string()), &config).unwrap();
        release_port(ReleaseTarget::Tag("never-allocated".to_string()), &config).unwrap();
    }

    #[test]
    fn release_port_not_owned_still_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let path = config.registry_dir.join("registry.json");

        let mut document = crate::registry::codec::read(&path).unwrap();
        document.entries.push(crate::registry::AllocationEntry {
            port: 63000,
            pid: std::process::id() + 1,
            timestamp: 0,
            tag: None,
        });
        crate::registry::codec::write(&path, &document).unwrap();

        let result = release_port(ReleaseTarget::Port(63000), &config);
        assert!(matches!(result, Err(Error::NotOwnedByCaller { .. })));
    }
}
