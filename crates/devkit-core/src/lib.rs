//! Core types, configuration, and error handling for devkit.
//!
//! This crate provides the shared foundation used by all other devkit crates:
//! - [`DevkitError`]: unified error type using `thiserror`
//! - [`DevkitConfig`]: configuration loaded from `.devkit.toml`
//! - [`OutputFormat`]: rendering mode shared by every subcommand

mod config;
mod error;
mod types;

pub use config::{AssistConfig, DevkitConfig, GitConfig, ReleaseConfig, ReviewConfig};
pub use error::DevkitError;
pub use types::OutputFormat;

/// A convenience `Result` type for devkit operations.
pub type Result<T> = std::result::Result<T, DevkitError>;
