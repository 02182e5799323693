//! FreeBSD / DragonFly memory source
//!
//! Every figure comes from one `sysctlbyname` MIB. `hw.physmem` and the swap
//! MIBs are bytes; the `vm.stats.vm.*` counters are pages of `hw.pagesize`.

use log::debug;

use crate::constants::*;
use crate::error::Result;
use crate::models::{BsdCounters, RawCounters};
use crate::platforms::{Platform, PlatformSource};

/// Reads the memory MIBs through `sysctlbyname`
#[derive(Debug, Default, Clone, Copy)]
pub struct BsdSource;

impl BsdSource {
    pub fn new() -> Self {
        Self
    }
}

/// Assemble counters from any MIB reader, failing on the first MIB that
/// cannot be read
pub fn read_counters<F>(mut read_mib: F) -> Result<BsdCounters>
where
    F: FnMut(&str) -> Result<u64>,
{
    let counters = BsdCounters {
        physmem: read_mib(MIB_PHYSMEM)?,
        pagesize: read_mib(MIB_PAGESIZE)?,
        active_count: read_mib(MIB_ACTIVE_COUNT)?,
        free_count: read_mib(MIB_FREE_COUNT)?,
        inactive_count: read_mib(MIB_INACTIVE_COUNT)?,
        wire_count: read_mib(MIB_WIRE_COUNT)?,
        cache_count: read_mib(MIB_CACHE_COUNT)?,
        page_count: read_mib(MIB_PAGE_COUNT)?,
        swap_size: read_mib(MIB_SWAP_SIZE)?,
        swap_free: read_mib(MIB_SWAP_FREE)?,
    };

    debug!(
        "BSD memory: physmem={} pagesize={} free_pages={} swap_size={}",
        counters.physmem, counters.pagesize, counters.free_count, counters.swap_size
    );

    Ok(counters)
}

impl PlatformSource for BsdSource {
    fn platform(&self) -> Platform {
        Platform::Bsd
    }

    fn fetch_raw(&self) -> Result<RawCounters> {
        #[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
        {
            read_counters(super::sysctl::sysctl_u64).map(RawCounters::Bsd)
        }

        #[cfg(not(any(target_os = "freebsd", target_os = "dragonfly")))]
        {
            Err(crate::error::MemoryError::UnsupportedPlatform {
                platform: Platform::Bsd,
            })
        }
    }
}
