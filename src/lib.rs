#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # portreg
//!
//! A cross-process port allocation registry.
//!
//! `portreg` hands out TCP ports that are (a) not currently bound by any
//! process reachable on loopback and (b) not already promised to some
//! other caller sharing the same on-disk registry. The promise survives
//! process restarts for as long as the requesting process stays alive;
//! it is reclaimed lazily once the owning process exits or its entry
//! grows older than the configured staleness timeout.
//!
//! ## Core types
//!
//! - [`config::Config`] and [`config::ConfigBuilder`]: configuration surface
//! - [`engine::Engine`]: the concurrency-safe allocation engine
//! - [`tracker::Tracker`]: a per-caller overlay that remembers allocations by tag
//! - [`facade`]: stateless wrappers for one-off calls
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use portreg::config::ConfigBuilder;
//! use portreg::engine::Engine;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = ConfigBuilder::new().registry_dir(dir.path()).build().unwrap();
//! let engine = Engine::new(config);
//!
//! let allocation = engine.get(Some("api")).unwrap();
//! assert!(allocation.port > 0);
//!
//! engine.release(allocation.port).unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod facade;
pub mod lock;
pub mod logging;
pub mod probe;
pub mod registry;
pub mod sanitize;
pub mod tracker;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
