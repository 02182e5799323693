//! macOS memory source
//!
//! Two sub-queries make up one reading: `sysctlbyname` for `hw.memsize` and
//! the `vm.swapusage` record, then `host_statistics64(HOST_VM_INFO64)` for
//! the page counters. Either failing aborts the whole fetch.

#[cfg(target_os = "macos")]
use log::{debug, warn};

use crate::constants::MIB_MEMSIZE;
use crate::error::Result;
use crate::models::{DarwinCounters, RawCounters, VmStatistics64, XswUsage};
use crate::platforms::{Platform, PlatformSource};

/// Reads Darwin memory counters through sysctl and the Mach host port
#[derive(Debug, Default, Clone, Copy)]
pub struct DarwinSource;

impl DarwinSource {
    pub fn new() -> Self {
        Self
    }
}

/// Assemble one reading from its sub-queries, run in order: `hw.memsize`,
/// the swap record, then the VM statistics. The first failure aborts the
/// reading.
pub fn read_counters<M, S, V>(read_mib: M, read_swap: S, read_vm: V) -> Result<DarwinCounters>
where
    M: FnOnce(&str) -> Result<u64>,
    S: FnOnce() -> Result<XswUsage>,
    V: FnOnce() -> Result<VmStatistics64>,
{
    let memsize = read_mib(MIB_MEMSIZE)?;
    let swap = read_swap()?;
    let vm = read_vm()?;

    Ok(DarwinCounters { memsize, swap, vm })
}

impl PlatformSource for DarwinSource {
    fn platform(&self) -> Platform {
        Platform::Darwin
    }

    fn fetch_raw(&self) -> Result<RawCounters> {
        #[cfg(target_os = "macos")]
        {
            let counters = read_counters(
                super::sysctl::sysctl_u64,
                native::swap_usage,
                native::host_vm_statistics,
            )?;

            if counters.swap.xsu_pagesize == 0 {
                warn!("vm.swapusage reported a zero page size, keeping the default");
            }
            debug!(
                "Darwin memory: memsize={} pagesize={} free_pages={} compressor_pages={}",
                counters.memsize,
                counters.page_size(),
                counters.vm.free_count,
                counters.vm.compressor_page_count
            );

            Ok(RawCounters::Darwin(counters))
        }

        #[cfg(not(target_os = "macos"))]
        {
            Err(crate::error::MemoryError::UnsupportedPlatform {
                platform: Platform::Darwin,
            })
        }
    }
}

#[cfg(target_os = "macos")]
mod native {
    use mach::kern_return::{kern_return_t, KERN_SUCCESS};
    use mach::mach_port::mach_port_deallocate;
    use mach::message::mach_msg_type_number_t;
    use mach::port::mach_port_t;
    use mach::traps::mach_task_self;
    use mach::vm_types::integer_t;

    use crate::constants::*;
    use crate::error::{MemoryError, Result};
    use crate::models::{VmStatistics64, XswUsage};
    use crate::platforms::sysctl::sysctl_record;

    extern "C" {
        fn mach_host_self() -> mach_port_t;
        fn host_statistics64(
            host_priv: mach_port_t,
            flavor: integer_t,
            host_info_out: *mut integer_t,
            host_info_out_cnt: *mut mach_msg_type_number_t,
        ) -> kern_return_t;
    }

    /// Send right to the host port, released when dropped
    struct HostPort(mach_port_t);

    impl HostPort {
        fn acquire() -> Self {
            // SAFETY: mach_host_self has no preconditions
            HostPort(unsafe { mach_host_self() })
        }
    }

    impl Drop for HostPort {
        fn drop(&mut self) {
            // SAFETY: the right was obtained from mach_host_self and is
            // released exactly once
            unsafe {
                mach_port_deallocate(mach_task_self(), self.0);
            }
        }
    }

    pub(super) fn swap_usage() -> Result<XswUsage> {
        // SAFETY: XswUsage is repr(C), matches struct xsw_usage and is
        // plain integers
        unsafe { sysctl_record(MIB_SWAPUSAGE) }
    }

    pub(super) fn host_vm_statistics() -> Result<VmStatistics64> {
        let host = HostPort::acquire();
        let mut stats = VmStatistics64::default();
        let mut count: mach_msg_type_number_t = HOST_VM_INFO64_COUNT;

        // SAFETY: stats is a repr(C) vm_statistics64 of exactly
        // HOST_VM_INFO64_COUNT integer_t words, owned by this frame
        let kr = unsafe {
            host_statistics64(
                host.0,
                HOST_VM_INFO64,
                (&mut stats as *mut VmStatistics64).cast::<integer_t>(),
                &mut count,
            )
        };

        if kr != KERN_SUCCESS {
            return Err(MemoryError::native(CALL_HOST_STATISTICS64, kr));
        }

        Ok(stats)
    }
}
