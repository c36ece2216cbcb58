//! Sherdor Core Library
//!
//! This crate provides shared types, errors, configuration, logging setup and
//! the platform capability traits used by the other Sherdor crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod types;

pub use config::SherdorConfig;
pub use error::{SherdorError, SherdorResult};
pub use logging::{init_logging, LogConfig, LogFormat};
