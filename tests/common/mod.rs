//! Common test utilities for integration tests.
//!
//! This module provides helper functions and configuration fixtures for
//! testing the port registry across a shared, on-disk registry directory.

use std::path::Path;

use portreg::config::{Config, ConfigBuilder};

/// Creates a temporary directory for testing.
///
/// The directory is cleaned up automatically when the returned `TempDir`
/// is dropped.
#[allow(dead_code)]
pub fn create_temp_dir() -> std::io::Result<tempfile::TempDir> {
    tempfile::tempdir()
}

/// Builds a [`Config`] pointed at `dir`, with a narrow default port window
/// so tests can reliably exhaust it.
#[allow(dead_code)]
pub fn narrow_config(dir: &Path) -> Config {
    ConfigBuilder::new()
        .registry_dir(dir)
        .min_port(50000)
        .max_port(50010)
        .build()
        .unwrap()
}

/// Builds a [`Config`] pointed at `dir` using the library's normal
/// ephemeral-range defaults.
#[allow(dead_code)]
pub fn default_config(dir: &Path) -> Config {
    ConfigBuilder::new().registry_dir(dir).build().unwrap()
}
