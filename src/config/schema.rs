//! Configuration schema definition.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// The IANA dynamic/ephemeral port window, used for the default range.
const DEFAULT_MIN_PORT: u16 = 49152;
const DEFAULT_MAX_PORT: u16 = 65535;

/// The floor below which a port is considered privileged.
pub(crate) const PRIVILEGED_CEILING: u16 = 1024;

const DEFAULT_MAX_PORTS_PER_REQUEST: usize = 100;
const DEFAULT_MAX_REGISTRY_SIZE: usize = 1000;
const DEFAULT_STALE_TIMEOUT_MS: u64 = 3_600_000;

/// Recognized configuration options for the port registry.
///
/// Every field here has the default spelled out in the struct's
/// documentation; [`ConfigBuilder`](crate::config::ConfigBuilder) is the
/// ergonomic way to override individual fields without repeating the rest.
///
/// # Examples
///
/// ```
/// use portreg::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.min_port, 49152);
/// assert!(!config.allow_privileged);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Minimum port in the allocation window (inclusive).
    pub min_port: u16,
    /// Maximum port in the allocation window (inclusive).
    pub max_port: u16,
    /// Directory holding `registry.json` and `registry.lock`.
    pub registry_dir: PathBuf,
    /// Whether ports below 1024 may be requested.
    pub allow_privileged: bool,
    /// Maximum ports a single multi-port request may allocate.
    pub max_ports_per_request: usize,
    /// Maximum number of entries the registry may hold at once.
    pub max_registry_size: usize,
    /// Age (milliseconds) after which a live-pid entry is still considered stale.
    pub stale_timeout: u64,
    /// Enables diagnostic logging through [`crate::logging::Logger`].
    pub verbose: bool,
}

impl Config {
    /// The minimum port number, clamped for privileged-port policy.
    ///
    /// Mirrors spec.md §9's documented asymmetry: the *window* minimum is
    /// silently promoted to 1024 here when privileged ports are disallowed,
    /// while the range-oriented operations (`reserve_range`, `get_in_range`)
    /// reject an out-of-policy bound outright rather than silently widening it.
    #[must_use]
    pub fn effective_min_port(&self) -> u16 {
        if self.allow_privileged {
            self.min_port.max(1)
        } else {
            self.min_port.max(PRIVILEGED_CEILING)
        }
    }

    /// The maximum port number, clamped to the legal `u16` ceiling.
    #[must_use]
    pub fn effective_max_port(&self) -> u16 {
        self.max_port
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_port: DEFAULT_MIN_PORT,
            max_port: DEFAULT_MAX_PORT,
            registry_dir: default_registry_dir().unwrap_or_else(|_| PathBuf::from(".portres")),
            allow_privileged: false,
            max_ports_per_request: DEFAULT_MAX_PORTS_PER_REQUEST,
            max_registry_size: DEFAULT_MAX_REGISTRY_SIZE,
            stale_timeout: DEFAULT_STALE_TIMEOUT_MS,
            verbose: false,
        }
    }
}

/// Returns the default registry directory, `$HOME/.portres`.
///
/// `HOME` is the only environment variable this crate consults (`USERPROFILE`
/// is accepted as a Windows fallback via the `home` crate); no other
/// environment variable influences configuration.
///
/// # Errors
///
/// Returns [`Error::ConfigInvalid`] if neither `HOME` nor `USERPROFILE` can
/// be resolved.
///
/// # Examples
///
/// ```
/// use portreg::config::default_registry_dir;
///
/// if std::env::var("HOME").is_ok() {
///     let dir = default_registry_dir().unwrap();
///     assert!(dir.ends_with(".portres"));
/// }
/// ```
pub fn default_registry_dir() -> Result<PathBuf> {
    home::home_dir()
        .ok_or_else(|| Error::ConfigInvalid {
            message: "cannot determine home directory".into(),
        })
        .map(|home| home.join(".portres"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = Config::default();
        assert_eq!(config.min_port, 49152);
        assert_eq!(config.max_port, 65535);
        assert!(!config.allow_privileged);
        assert_eq!(config.max_ports_per_request, 100);
        assert_eq!(config.max_registry_size, 1000);
        assert_eq!(config.stale_timeout, 3_600_000);
        assert!(!config.verbose);
    }

    #[test]
    fn effective_min_port_promotes_unprivileged_window() {
        let mut config = Config {
            min_port: 80,
            ..Config::default()
        };
        assert_eq!(config.effective_min_port(), 1024);

        config.allow_privileged = true;
        assert_eq!(config.effective_min_port(), 80);
    }

    #[test]
    fn effective_max_port_is_passthrough() {
        let config = Config {
            max_port: 65535,
            ..Config::default()
        };
        assert_eq!(config.effective_max_port(), 65535);
    }

    // `HOME` is process-global, so these two tests are marked `#[serial]`
    // to avoid racing each other or `default_config_matches_spec_defaults`'s
    // own call into `Config::default()` across test threads.

    #[test]
    #[serial_test::serial]
    fn default_registry_dir_joins_home_with_dotdir() {
        let original = std::env::var_os("HOME");
        std::env::set_var("HOME", "/tmp/portreg-home-fixture");

        let dir = default_registry_dir().unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/portreg-home-fixture/.portres"));

        match original {
            Some(value) => std::env::set_var("HOME", value),
            None => std::env::remove_var("HOME"),
        }
    }

    #[test]
    #[serial_test::serial]
    fn default_registry_dir_fails_without_home() {
        let original = std::env::var_os("HOME");
        std::env::remove_var("HOME");

        let result = default_registry_dir();
        assert!(matches!(result, Err(Error::ConfigInvalid { .. })));

        if let Some(value) = original {
            std::env::set_var("HOME", value);
        }
    }
}
