//! Chronicle Core - Shared foundations for the changelog tooling
//!
//! This crate provides the error types and configuration handling used by
//! the changelog store, the renderers and the command line interface.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{ChangelogError, ChronicleError, ConfigError, Result};
