//! Configuration loading and management
//!
//! This module loads [`CacheSettings`] from environment variables and
//! files.

pub mod error;
pub mod loader;
pub mod settings;

// Re-export commonly used items
pub use error::{ConfigError, ConfigResult};
pub use loader::{load, load_from_env, load_from_file, probe_config_paths, settings_from_vars};
pub use settings::{CacheSettings, ProbeSettings};
