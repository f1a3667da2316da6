//! Host platform adapters
//!
//! Implementations of the `matcache-core` memory port for real hosts.

pub mod meminfo;

pub use meminfo::{parse_meminfo, MeminfoField, MeminfoProbe, DEFAULT_MEMINFO_PATH};
