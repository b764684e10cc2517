//! Infrastructure adapters for datashape.
//!
//! This crate implements the ports defined in `datashape_core::application::ports`
//! and loads [`DataConfig`](datashape_core::config::DataConfig) from files and
//! the environment.

pub mod config_loader;
pub mod resolver;
pub mod validator;

// Re-export commonly used adapters
pub use config_loader::{ConfigLoadError, ConfigLoader};
pub use resolver::ContainerResolver;
pub use validator::RuleValidator;
