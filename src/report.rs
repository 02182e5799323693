//! Memory query facade

use log::debug;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::models::{MemorySnapshot, RawCounters};
use crate::normalize;
use crate::platforms::{self, Platform, PlatformSource};

/// Answers memory queries from one platform source.
///
/// Every query fetches fresh counters; nothing is cached between calls. To
/// read several figures from the same moment, call [`MemoryReport::raw`]
/// once and pass the result to the [`crate::normalize`] functions.
pub struct MemoryReport {
    source: Box<dyn PlatformSource>,
}

impl MemoryReport {
    /// Report backed by an explicit source
    pub fn new(source: Box<dyn PlatformSource>) -> Self {
        Self { source }
    }

    /// Report backed by the native source for `platform`
    pub fn for_platform(platform: Platform) -> Result<Self> {
        platforms::source_for(platform).map(Self::new)
    }

    /// Report backed by this host's native source
    pub fn for_host() -> Result<Self> {
        platforms::host_source().map(Self::new)
    }

    pub fn platform(&self) -> Platform {
        self.source.platform()
    }

    /// Fetch the untouched native counters
    pub fn raw(&self) -> Result<RawCounters> {
        let raw = self.source.fetch_raw()?;
        debug!("Fetched {} raw memory counters", raw.platform());
        Ok(raw)
    }

    /// Native field names and values, in the units the OS reports them
    pub fn fields(&self) -> Result<BTreeMap<String, u64>> {
        self.raw().map(|raw| raw.fields())
    }

    /// Normalized snapshot of physical and swap memory
    pub fn memory(&self) -> Result<MemorySnapshot> {
        normalize::snapshot(&self.raw()?)
    }

    /// Total memory in bytes; swap is included when `extended`
    pub fn total(&self, extended: bool) -> Result<u64> {
        normalize::total(&self.raw()?, extended)
    }

    /// Free memory in bytes; free swap is included when `extended`
    pub fn free(&self, extended: bool) -> Result<u64> {
        normalize::free(&self.raw()?, extended)
    }

    /// Memory in use, in bytes
    pub fn used(&self, extended: bool) -> Result<u64> {
        normalize::used(&self.raw()?, extended)
    }

    /// Percentage of memory in use, 0-100. Ignores `extended` on Windows.
    pub fn load(&self, extended: bool) -> Result<f64> {
        normalize::load(&self.raw()?, extended)
    }

    /// Memory available to new workloads without swapping
    pub fn available(&self) -> Result<u64> {
        normalize::available(&self.raw()?)
    }
}

impl fmt::Debug for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryReport")
            .field("platform", &self.platform())
            .finish()
    }
}
