//! Configuration loader
//!
//! Loads cache settings from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If any `MATCACHE_*` variable is set, settings come from the environment
//!    (unset variables keep their defaults)
//! 2. Otherwise, probes a few paths for a config file
//! 3. Otherwise, uses the defaults
//!
//! JSON and TOML files are supported.
//!
//! ## Environment Variables
//! - `MATCACHE_THRESHOLD_BYTES`: free-memory threshold, bytes or a size such
//!   as `512MiB`
//! - `MATCACHE_MONITOR_INTERVAL_MS`: monitor tick interval in milliseconds
//! - `MATCACHE_MEMINFO_PATH`: meminfo file path
//! - `MATCACHE_MEMINFO_FIELD`: `free` or `available`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./matcache.toml` or `./matcache.json` (current working directory)
//! 2. `../matcache.toml` or `../matcache.json` (parent directory)
//! 3. Next to the executable

use std::path::{Path, PathBuf};
use std::time::Duration;

use matcache_common::byte_size;

use super::error::{ConfigError, ConfigResult};
use super::settings::CacheSettings;

/// Threshold variable
pub const ENV_THRESHOLD_BYTES: &str = "MATCACHE_THRESHOLD_BYTES";
/// Monitor interval variable
pub const ENV_MONITOR_INTERVAL_MS: &str = "MATCACHE_MONITOR_INTERVAL_MS";
/// Meminfo path variable
pub const ENV_MEMINFO_PATH: &str = "MATCACHE_MEMINFO_PATH";
/// Meminfo field variable
pub const ENV_MEMINFO_FIELD: &str = "MATCACHE_MEMINFO_FIELD";

const ENV_KEYS: [&str; 4] =
    [ENV_THRESHOLD_BYTES, ENV_MONITOR_INTERVAL_MS, ENV_MEMINFO_PATH, ENV_MEMINFO_FIELD];

const FILE_NAMES: [&str; 2] = ["matcache.toml", "matcache.json"];

/// Load settings with automatic fallback strategy
///
/// # Errors
/// Returns [`ConfigError`] if a chosen source is present but invalid.
/// Missing sources are not an error.
pub fn load() -> ConfigResult<CacheSettings> {
    if ENV_KEYS.iter().any(|key| std::env::var_os(key).is_some()) {
        let settings = load_from_env()?;
        tracing::info!("Cache settings loaded from environment variables");
        return Ok(settings);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::debug!("No cache config found, using defaults");
            Ok(CacheSettings::default())
        }
    }
}

/// Load settings from `MATCACHE_*` environment variables
///
/// Unset variables keep their default values.
///
/// # Errors
/// Returns [`ConfigError::InvalidValue`] for unparsable values and
/// [`ConfigError::Cache`] if the result fails validation.
pub fn load_from_env() -> ConfigResult<CacheSettings> {
    settings_from_vars(|key| std::env::var(key).ok())
}

/// Build settings from a variable lookup
///
/// # Errors
/// See [`load_from_env`].
pub fn settings_from_vars<F>(lookup: F) -> ConfigResult<CacheSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = CacheSettings::default();

    if let Some(raw) = lookup(ENV_THRESHOLD_BYTES) {
        settings.cache.threshold_bytes = byte_size::parse(&raw)
            .map_err(|message| ConfigError::InvalidValue { key: ENV_THRESHOLD_BYTES, message })?;
    }

    if let Some(raw) = lookup(ENV_MONITOR_INTERVAL_MS) {
        let millis = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
            key: ENV_MONITOR_INTERVAL_MS,
            message: e.to_string(),
        })?;
        settings.cache.monitor_interval = Duration::from_millis(millis);
    }

    if let Some(raw) = lookup(ENV_MEMINFO_PATH) {
        settings.probe.meminfo_path = PathBuf::from(raw);
    }

    if let Some(raw) = lookup(ENV_MEMINFO_FIELD) {
        settings.probe.field = raw
            .parse()
            .map_err(|message| ConfigError::InvalidValue { key: ENV_MEMINFO_FIELD, message })?;
    }

    settings.cache.validate()?;
    Ok(settings)
}

/// Load settings from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns [`ConfigError`] if:
/// - The given file does not exist, or none was found when probing
/// - The file cannot be read or parsed
/// - The parsed settings fail validation
pub fn load_from_file(path: Option<PathBuf>) -> ConfigResult<CacheSettings> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::FileNotFound { path: p });
            }
            p
        }
        None => probe_config_paths()
            .ok_or_else(|| ConfigError::FileNotFound { path: PathBuf::from(FILE_NAMES[0]) })?,
    };

    tracing::info!(path = %config_path.display(), "Loading cache settings from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|source| ConfigError::Read { path: config_path.clone(), source })?;

    let settings = parse_settings(&contents, &config_path)?;
    settings.cache.validate()?;
    Ok(settings)
}

/// Parse settings by file extension
fn parse_settings(contents: &str, path: &Path) -> ConfigResult<CacheSettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::InvalidFormat { format: "TOML", message: e.to_string() }),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::InvalidFormat { format: "JSON", message: e.to_string() }),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first file found, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join("."));
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use matcache_core::cache::{CacheError, DEFAULT_THRESHOLD_BYTES};

    use super::*;
    use crate::platform::MeminfoField;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_settings_from_all_vars() {
        let settings = settings_from_vars(vars(&[
            (ENV_THRESHOLD_BYTES, "256MiB"),
            (ENV_MONITOR_INTERVAL_MS, "250"),
            (ENV_MEMINFO_PATH, "/tmp/meminfo"),
            (ENV_MEMINFO_FIELD, "available"),
        ]))
        .expect("valid vars");

        assert_eq!(settings.cache.threshold_bytes, 256 * 1024 * 1024);
        assert_eq!(settings.cache.monitor_interval, Duration::from_millis(250));
        assert_eq!(settings.probe.meminfo_path, PathBuf::from("/tmp/meminfo"));
        assert_eq!(settings.probe.field, MeminfoField::Available);
    }

    #[test]
    fn test_settings_from_partial_vars() {
        let settings = settings_from_vars(vars(&[(ENV_THRESHOLD_BYTES, "4096")])).expect("valid");
        assert_eq!(settings.cache.threshold_bytes, 4096);
        assert_eq!(settings.probe, Default::default());

        let settings = settings_from_vars(vars(&[])).expect("valid");
        assert_eq!(settings.cache.threshold_bytes, DEFAULT_THRESHOLD_BYTES);
    }

    #[test]
    fn test_settings_invalid_values() {
        let err = settings_from_vars(vars(&[(ENV_MONITOR_INTERVAL_MS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_MONITOR_INTERVAL_MS, .. }));

        let err = settings_from_vars(vars(&[(ENV_THRESHOLD_BYTES, "12 parsecs")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_THRESHOLD_BYTES, .. }));

        let err = settings_from_vars(vars(&[(ENV_MEMINFO_FIELD, "cached")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_MEMINFO_FIELD, .. }));
    }

    #[test]
    fn test_settings_zero_interval_rejected() {
        let err = settings_from_vars(vars(&[(ENV_MONITOR_INTERVAL_MS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Cache(CacheError::InvalidConfig { .. })));
    }

    #[test]
    fn test_parse_unsupported_extension() {
        let err = parse_settings("", Path::new("matcache.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_settings("[cache\n", Path::new("matcache.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { format: "TOML", .. }));
    }
}
