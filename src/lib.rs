//! # sys_memory
//!
//! Cross-platform host memory statistics: total, free, used, swap and load.
//!
//! ## Overview
//!
//! Every operating system exposes memory counters through its own interface,
//! in its own units and with its own idea of what "free" means. This crate
//! reads them natively and normalizes them into one set of byte figures.
//!
//! | Platform | Interface |
//! |----------|-----------|
//! | Linux | `/proc/meminfo` |
//! | FreeBSD, DragonFly | `sysctlbyname` MIBs |
//! | macOS | `sysctlbyname` + `host_statistics64` |
//! | Windows | `GlobalMemoryStatusEx` + `GetPerformanceInfo` |
//!
//! ## Usage
//!
//! ```no_run
//! use sys_memory::MemoryReport;
//!
//! # fn main() -> sys_memory::Result<()> {
//! let report = MemoryReport::for_host()?;
//!
//! let snapshot = report.memory()?;
//! println!(
//!     "{} of {} bytes in use ({}%)",
//!     snapshot.used_bytes, snapshot.total_bytes, snapshot.memory_load_percent
//! );
//!
//! // Fold swap into the figures
//! println!("load including swap: {}%", report.load(true)?);
//! # Ok(())
//! # }
//! ```
//!
//! Each query re-reads the OS. For several figures from the same instant,
//! fetch once and normalize locally:
//!
//! ```no_run
//! use sys_memory::{normalize, MemoryReport};
//!
//! # fn main() -> sys_memory::Result<()> {
//! let raw = MemoryReport::for_host()?.raw()?;
//! let used = normalize::used(&raw, true)?;
//! let free = normalize::free(&raw, true)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`platforms`]: native sources, one per operating system family
//! - [`normalize`]: unit conversion and derived figures
//! - [`report`]: the [`MemoryReport`] query facade
//! - [`models`]: raw counter records and [`MemorySnapshot`]
//! - [`error`]: [`MemoryError`]
//! - [`constants`]: native names and unit factors
//!
//! ## Safety
//!
//! This crate uses `unsafe` code only to call the native memory interfaces.
//! Every record passed to a native call has a declared `#[repr(C)]` layout
//! and lives on the caller's stack for the duration of the call.

/// Error types and the crate `Result` alias
pub mod error;

/// Raw counter records and the normalized snapshot
pub mod models;

/// Platform-specific raw counter sources
pub mod platforms;

/// Conversion of raw counters into byte figures
pub mod normalize;

/// Memory query facade
pub mod report;

/// Native names, identifiers and unit factors
pub mod constants;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;

pub use error::{MemoryError, Result};
pub use models::{MemorySnapshot, RawCounters};
pub use platforms::{Platform, PlatformSource};
pub use report::MemoryReport;

/// Snapshot of this host's memory
pub fn memory() -> Result<MemorySnapshot> {
    MemoryReport::for_host()?.memory()
}

/// This host's total memory in bytes, including swap when `extended`
pub fn total(extended: bool) -> Result<u64> {
    MemoryReport::for_host()?.total(extended)
}

/// This host's free memory in bytes, including free swap when `extended`
pub fn free(extended: bool) -> Result<u64> {
    MemoryReport::for_host()?.free(extended)
}

/// This host's memory in use, in bytes
pub fn used(extended: bool) -> Result<u64> {
    MemoryReport::for_host()?.used(extended)
}

/// Percentage of this host's memory in use
pub fn load(extended: bool) -> Result<f64> {
    MemoryReport::for_host()?.load(extended)
}

/// This host's memory available to new workloads without swapping
pub fn available() -> Result<u64> {
    MemoryReport::for_host()?.available()
}
