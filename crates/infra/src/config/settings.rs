//! Settings consumed by [`CacheService`](crate::service::CacheService)

use std::path::PathBuf;

use matcache_core::cache::CacheConfig;
use serde::{Deserialize, Serialize};

use crate::platform::{MeminfoField, DEFAULT_MEMINFO_PATH};

/// Everything needed to build a running cache.
///
/// Deserializes from:
///
/// ```toml
/// [cache]
/// threshold_bytes = "512MiB"
/// monitor_interval_ms = 1000
///
/// [probe]
/// meminfo_path = "/proc/meminfo"
/// field = "available"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Admission threshold and monitor interval
    pub cache: CacheConfig,

    /// Where free memory is read from
    pub probe: ProbeSettings,
}

/// Free-memory probe settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Path of the meminfo report
    pub meminfo_path: PathBuf,

    /// Line treated as free memory
    pub field: MeminfoField,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self { meminfo_path: PathBuf::from(DEFAULT_MEMINFO_PATH), field: MeminfoField::default() }
    }
}
