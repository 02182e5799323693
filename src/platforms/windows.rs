//! Windows memory source
//!
//! This module fills the two Win32 memory records: `MEMORYSTATUSEX` through
//! `GlobalMemoryStatusEx` and `PERFORMANCE_INFORMATION` through
//! `GetPerformanceInfo`. Both records carry their own size in the first
//! field, which must be set before the call.

#[cfg(target_os = "windows")]
use log::debug;

use crate::error::Result;
use crate::models::RawCounters;
use crate::platforms::{Platform, PlatformSource};

/// Reads Windows memory status and performance counters
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsSource;

impl WindowsSource {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformSource for WindowsSource {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn fetch_raw(&self) -> Result<RawCounters> {
        #[cfg(target_os = "windows")]
        {
            let counters = native::read_counters()?;
            debug!(
                "Windows memory: total_phys={} avail_phys={} load={}%",
                counters.total_phys, counters.avail_phys, counters.memory_load
            );
            Ok(RawCounters::Windows(counters))
        }

        #[cfg(not(target_os = "windows"))]
        {
            Err(crate::error::MemoryError::UnsupportedPlatform {
                platform: Platform::Windows,
            })
        }
    }
}

#[cfg(target_os = "windows")]
mod native {
    use std::mem;

    use winapi::shared::minwindef::DWORD;
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::psapi::{GetPerformanceInfo, PERFORMANCE_INFORMATION};
    use winapi::um::sysinfoapi::{GlobalMemoryStatusEx, MEMORYSTATUSEX};

    use crate::constants::{CALL_GET_PERFORMANCE_INFO, CALL_GLOBAL_MEMORY_STATUS_EX};
    use crate::error::{MemoryError, Result};
    use crate::models::WindowsCounters;

    fn last_error(call: &str) -> MemoryError {
        // SAFETY: GetLastError only reads thread-local state
        let code = unsafe { GetLastError() };
        MemoryError::native(call, code as i32)
    }

    pub(super) fn read_counters() -> Result<WindowsCounters> {
        let status = memory_status()?;
        let perf = performance_info()?;

        Ok(WindowsCounters {
            memory_load: status.dwMemoryLoad,
            total_phys: status.ullTotalPhys,
            avail_phys: status.ullAvailPhys,
            total_page_file: status.ullTotalPageFile,
            avail_page_file: status.ullAvailPageFile,
            total_virtual: status.ullTotalVirtual,
            avail_virtual: status.ullAvailVirtual,
            avail_extended_virtual: status.ullAvailExtendedVirtual,
            commit_total: perf.CommitTotal as u64,
            commit_limit: perf.CommitLimit as u64,
            commit_peak: perf.CommitPeak as u64,
            physical_total: perf.PhysicalTotal as u64,
            physical_available: perf.PhysicalAvailable as u64,
            system_cache: perf.SystemCache as u64,
            kernel_total: perf.KernelTotal as u64,
            kernel_paged: perf.KernelPaged as u64,
            kernel_nonpaged: perf.KernelNonpaged as u64,
            page_size: perf.PageSize as u64,
            handle_count: perf.HandleCount,
            process_count: perf.ProcessCount,
            thread_count: perf.ThreadCount,
        })
    }

    fn memory_status() -> Result<MEMORYSTATUSEX> {
        // SAFETY: MEMORYSTATUSEX is plain data; all-zero is a valid value
        let mut status: MEMORYSTATUSEX = unsafe { mem::zeroed() };
        status.dwLength = mem::size_of::<MEMORYSTATUSEX>() as DWORD;

        // SAFETY: status is a properly sized record owned by this frame
        // with dwLength set
        if unsafe { GlobalMemoryStatusEx(&mut status) } == 0 {
            return Err(last_error(CALL_GLOBAL_MEMORY_STATUS_EX));
        }

        Ok(status)
    }

    fn performance_info() -> Result<PERFORMANCE_INFORMATION> {
        let size = mem::size_of::<PERFORMANCE_INFORMATION>() as DWORD;

        // SAFETY: PERFORMANCE_INFORMATION is plain data; all-zero is valid
        let mut perf: PERFORMANCE_INFORMATION = unsafe { mem::zeroed() };
        perf.cb = size;

        // SAFETY: perf is a properly sized record owned by this frame and
        // size matches it
        if unsafe { GetPerformanceInfo(&mut perf, size) } == 0 {
            return Err(last_error(CALL_GET_PERFORMANCE_INFO));
        }

        Ok(perf)
    }
}
