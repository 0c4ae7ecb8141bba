//! Configuration validation.

use crate::error::{Error, Result};

use super::schema::Config;

/// Validates a [`Config`] for internal consistency.
///
/// # Examples
///
/// ```
/// use portreg::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] if:
    /// - `min_port` is greater than `max_port` (after clamping for privileged policy)
    /// - `max_ports_per_request` is zero
    /// - `max_registry_size` is zero
    /// - `stale_timeout` is zero
    pub fn validate(config: &Config) -> Result<()> {
        let min = config.effective_min_port();
        let max = config.effective_max_port();
        if min > max {
            return Err(Error::ConfigInvalid {
                message: format!(
                    "min_port ({min}) is greater than max_port ({max}) after privileged-port clamping"
                ),
            });
        }

        if config.max_ports_per_request == 0 {
            return Err(Error::ConfigInvalid {
                message: "max_ports_per_request must be at least 1".into(),
            });
        }

        if config.max_registry_size == 0 {
            return Err(Error::ConfigInvalid {
                message: "max_registry_size must be at least 1".into(),
            });
        }

        if config.stale_timeout == 0 {
            return Err(Error::ConfigInvalid {
                message: "stale_timeout must be greater than zero".into(),
            });
        }

        Ok(())
    }
}
