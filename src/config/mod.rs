//! Configuration for the port registry.
//!
//! The configuration surface is deliberately small: a flat struct of
//! recognized options (see [`Config`]) built either through defaults or
//! through [`ConfigBuilder`]. There is no configuration-file hierarchy and
//! no environment-variable overlay beyond the single `HOME` lookup used to
//! derive the default registry directory — see [`crate::config::schema::default_registry_dir`].
//!
//! # Examples
//!
//! ```
//! use portreg::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new().build().unwrap();
//! assert_eq!(config.min_port, 49152);
//! assert_eq!(config.max_port, 65535);
//! ```
//!
//! Programmatic overrides:
//!
//! ```
//! use portreg::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .min_port(6000)
//!     .max_port(7000)
//!     .max_ports_per_request(10)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.min_port, 6000);
//! assert_eq!(config.max_port, 7000);
//! ```

mod builder;
mod schema;
mod validator;

pub use builder::ConfigBuilder;
pub use schema::{default_registry_dir, Config};
pub use validator::ConfigValidator;
