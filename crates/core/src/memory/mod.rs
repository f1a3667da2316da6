//! Host memory sampling
//!
//! The cache never reads operating-system statistics itself. It asks a
//! [`MemoryProbe`] port, implemented in `matcache-infra` for real hosts and
//! by [`ManualProbe`] for tests and embedders that do their own accounting.

pub mod manual;
pub mod ports;

pub use manual::ManualProbe;
pub use ports::{MemoryProbe, ProbeError};
