//! Builder for [`Config`].

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::schema::Config;
use super::validator::ConfigValidator;

/// Builds a [`Config`], starting from built-in defaults and applying
/// explicit overrides, then validating the result.
///
/// # Examples
///
/// ```
/// use portreg::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .min_port(6000)
///     .max_port(6100)
///     .allow_privileged(false)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.min_port, 6000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the minimum port of the allocation window.
    #[must_use]
    pub const fn min_port(mut self, value: u16) -> Self {
        self.config.min_port = value;
        self
    }

    /// Overrides the maximum port of the allocation window.
    #[must_use]
    pub const fn max_port(mut self, value: u16) -> Self {
        self.config.max_port = value;
        self
    }

    /// Overrides the registry directory.
    #[must_use]
    pub fn registry_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.registry_dir = path.as_ref().to_path_buf();
        self
    }

    /// Overrides whether privileged ports (< 1024) may be requested.
    #[must_use]
    pub const fn allow_privileged(mut self, value: bool) -> Self {
        self.config.allow_privileged = value;
        self
    }

    /// Overrides the maximum number of ports a single request may allocate.
    #[must_use]
    pub const fn max_ports_per_request(mut self, value: usize) -> Self {
        self.config.max_ports_per_request = value;
        self
    }

    /// Overrides the maximum number of entries the registry may hold.
    #[must_use]
    pub const fn max_registry_size(mut self, value: usize) -> Self {
        self.config.max_registry_size = value;
        self
    }

    /// Overrides the staleness timeout, in milliseconds.
    #[must_use]
    pub const fn stale_timeout(mut self, millis: u64) -> Self {
        self.config.stale_timeout = millis;
        self
    }

    /// Overrides the verbose diagnostic logging flag.
    #[must_use]
    pub const fn verbose(mut self, value: bool) -> Self {
        self.config.verbose = value;
        self
    }

    /// Replaces the entire configuration wholesale, then continues to allow
    /// further field-level overrides before [`build`](Self::build).
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Validates and returns the built configuration.
    ///
    /// The registry directory is run through
    /// [`crate::sanitize::sanitize_registry_dir`] before anything else, so a
    /// traversal attempt (`..`) or an embedded NUL byte is rejected here,
    /// before it ever reaches the filesystem or the registry codec.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPath`] if `registry_dir` contains a
    /// `..` component or a NUL byte. Returns [`crate::Error::ConfigInvalid`]
    /// if the assembled configuration is otherwise internally inconsistent
    /// (see [`ConfigValidator::validate`]).
    pub fn build(mut self) -> Result<Config> {
        self.config.registry_dir = crate::sanitize::sanitize_registry_dir(&self.config.registry_dir)?;
        ConfigValidator::validate(&self.config)?;
        Ok(self.config)
    }
}
