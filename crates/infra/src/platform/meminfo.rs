//! `/proc/meminfo` memory probe
//!
//! Reads one field of the Linux memory report on every sample. The report
//! lists values in kibibytes:
//!
//! ```text
//! MemTotal:       16316412 kB
//! MemFree:         1203344 kB
//! MemAvailable:    9123456 kB
//! ```
//!
//! The file is re-read each time; there is no caching between samples.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use matcache_core::memory::{MemoryProbe, ProbeError};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Default location of the Linux memory report
pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

/// Which `/proc/meminfo` line counts as free memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeminfoField {
    /// `MemFree`: memory not used for anything, page cache excluded
    #[default]
    Free,
    /// `MemAvailable`: the kernel's estimate of memory usable without swapping
    Available,
}

impl MeminfoField {
    /// Line label in `/proc/meminfo`
    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "MemFree",
            Self::Available => "MemAvailable",
        }
    }
}

impl fmt::Display for MeminfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => f.write_str("free"),
            Self::Available => f.write_str("available"),
        }
    }
}

impl FromStr for MeminfoField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" | "memfree" => Ok(Self::Free),
            "available" | "memavailable" => Ok(Self::Available),
            other => Err(format!("unknown meminfo field '{other}' (expected free or available)")),
        }
    }
}

/// Extract `field` from meminfo-formatted text, in bytes.
///
/// # Errors
/// [`ProbeError::Parse`] if the line is missing or malformed.
pub fn parse_meminfo(contents: &str, field: MeminfoField) -> Result<u64, ProbeError> {
    let label = field.label();
    let line = contents
        .lines()
        .find_map(|line| line.strip_prefix(label).and_then(|rest| rest.strip_prefix(':')))
        .ok_or_else(|| ProbeError::Parse(format!("{label} not found")))?;

    let mut parts = line.split_whitespace();
    let value: u64 = parts
        .next()
        .ok_or_else(|| ProbeError::Parse(format!("{label} has no value")))?
        .parse()
        .map_err(|e| ProbeError::Parse(format!("{label}: {e}")))?;

    let multiplier = match parts.next() {
        None => 1,
        Some(unit) if unit.eq_ignore_ascii_case("kb") => 1024,
        Some(unit) => return Err(ProbeError::Parse(format!("{label}: unexpected unit '{unit}'"))),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| ProbeError::Parse(format!("{label}: value overflows u64")))
}

/// [`MemoryProbe`] backed by a meminfo file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeminfoProbe {
    path: PathBuf,
    field: MeminfoField,
}

impl Default for MeminfoProbe {
    fn default() -> Self {
        Self::new(DEFAULT_MEMINFO_PATH, MeminfoField::default())
    }
}

impl MeminfoProbe {
    /// Probe reading `field` from the file at `path`.
    pub fn new(path: impl Into<PathBuf>, field: MeminfoField) -> Self {
        Self { path: path.into(), field }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn field(&self) -> MeminfoField {
        self.field
    }
}

impl MemoryProbe for MeminfoProbe {
    fn free_memory(&self) -> Result<u64, ProbeError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                ProbeError::Unavailable(format!("{} does not exist", self.path.display()))
            }
            _ => ProbeError::Io(format!("{}: {e}", self.path.display())),
        })?;

        let free = parse_meminfo(&contents, self.field)?;
        trace!(field = %self.field, free, "sampled meminfo");
        Ok(free)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const SAMPLE: &str = "MemTotal:       16316412 kB\n\
                          MemFree:         1203344 kB\n\
                          MemAvailable:    9123456 kB\n\
                          Buffers:          456789 kB\n";

    #[test]
    fn test_parse_fields() {
        assert_eq!(parse_meminfo(SAMPLE, MeminfoField::Free), Ok(1_203_344 * 1024));
        assert_eq!(parse_meminfo(SAMPLE, MeminfoField::Available), Ok(9_123_456 * 1024));
    }

    #[test]
    fn test_parse_missing_field() {
        let err = parse_meminfo("MemTotal: 10 kB\n", MeminfoField::Available).unwrap_err();
        assert_eq!(err, ProbeError::Parse("MemAvailable not found".to_string()));
    }

    #[test]
    fn test_parse_malformed_values() {
        assert!(matches!(
            parse_meminfo("MemFree: lots kB\n", MeminfoField::Free),
            Err(ProbeError::Parse(_))
        ));
        assert!(matches!(
            parse_meminfo("MemFree: 10 pages\n", MeminfoField::Free),
            Err(ProbeError::Parse(_))
        ));
        assert!(matches!(parse_meminfo("MemFree:\n", MeminfoField::Free), Err(ProbeError::Parse(_))));
        // Unitless values are taken as bytes
        assert_eq!(parse_meminfo("MemFree: 512\n", MeminfoField::Free), Ok(512));
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("Available".parse::<MeminfoField>(), Ok(MeminfoField::Available));
        assert_eq!(" free ".parse::<MeminfoField>(), Ok(MeminfoField::Free));
        assert!("cached".parse::<MeminfoField>().is_err());
    }

    #[test]
    fn test_probe_reads_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write sample");

        let probe = MeminfoProbe::new(file.path(), MeminfoField::Free);
        assert_eq!(probe.free_memory(), Ok(1_203_344 * 1024));
    }

    #[test]
    fn test_probe_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let probe = MeminfoProbe::new(dir.path().join("meminfo"), MeminfoField::Free);
        assert!(matches!(probe.free_memory(), Err(ProbeError::Unavailable(_))));
    }
}
