//! Small helpers shared across the price tracker workspace.

pub mod config;
pub mod env;

pub use config::ConfigError;
