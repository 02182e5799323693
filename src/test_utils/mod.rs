//! Test utilities for sys_memory
//!
//! This module provides temp-file helpers, logging setup and canned raw
//! counters for every platform, so normalization can be tested on any host.

#![cfg(test)]

use anyhow::Result;
use std::sync::Once;
use tempfile::{NamedTempFile, TempDir};

static LOGGER: Once = Once::new();

/// Route `log` output through the test harness, once per test binary
pub fn init_test_logging() {
    LOGGER.call_once(|| {
        let _ = simplelog::TestLogger::init(log::LevelFilter::Trace, simplelog::Config::default());
    });
}

/// Creates a temporary directory that is automatically cleaned up
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a temporary file with the given content
pub fn create_temp_file(content: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    use std::io::Write;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

/// Canned raw counters for each platform
pub mod fixtures {
    use crate::models::*;
    use crate::platforms::linux::parse_meminfo;

    const GIB: u64 = 1024 * 1024 * 1024;

    /// A 8000 MiB host with 2 GiB swap. Physical load works out to exactly 45%.
    pub const MEMINFO: &str = "\
MemTotal:        8192000 kB
MemFree:         1024000 kB
MemAvailable:    5462988 kB
Buffers:          204800 kB
Cached:          2867200 kB
SwapCached:            0 kB
Active:          3100000 kB
Inactive:        1900000 kB
Dirty:              1204 kB
Slab:             409600 kB
SwapTotal:       2097152 kB
SwapFree:        1048576 kB
HugePages_Total:       0
Hugepagesize:       2048 kB
";

    pub fn meminfo() -> Meminfo {
        parse_meminfo(MEMINFO).expect("fixture parses")
    }

    /// 8 GiB host, 2 GiB free, 2 GiB swap with 1 GiB free
    pub fn bsd_counters() -> BsdCounters {
        BsdCounters {
            physmem: 8 * GIB,
            pagesize: 4096,
            active_count: 100_000,
            free_count: 524_288,
            inactive_count: 50_000,
            wire_count: 40_000,
            cache_count: 1_000,
            page_count: 2_097_152,
            swap_size: 2 * GIB,
            swap_free: GIB,
        }
    }

    /// 16 GiB host whose swap record reports `page_size`
    pub fn darwin_counters(page_size: u32) -> DarwinCounters {
        DarwinCounters {
            memsize: 16 * GIB,
            swap: XswUsage {
                xsu_total: 2 * GIB,
                xsu_avail: GIB + GIB / 2,
                xsu_used: GIB / 2,
                xsu_pagesize: page_size,
                xsu_encrypted: 1,
            },
            vm: VmStatistics64 {
                free_count: 65_536,
                active_count: 200_000,
                inactive_count: 190_000,
                wire_count: 150_000,
                speculative_count: 10_000,
                compressor_page_count: 50_000,
                pageins: 1_234_567,
                pageouts: 4_321,
                faults: 99_999_999,
                ..VmStatistics64::default()
            },
        }
    }

    /// 16 GiB host the OS reports as 37% loaded
    pub fn windows_counters() -> WindowsCounters {
        WindowsCounters {
            memory_load: 37,
            total_phys: 16 * GIB,
            avail_phys: 10 * GIB,
            total_page_file: 4 * GIB,
            avail_page_file: 3 * GIB,
            total_virtual: 128 * 1024 * GIB,
            avail_virtual: 127 * 1024 * GIB,
            avail_extended_virtual: 0,
            commit_total: 1_500_000,
            commit_limit: 5_242_880,
            commit_peak: 1_800_000,
            physical_total: 4_194_304,
            physical_available: 2_621_440,
            system_cache: 700_000,
            kernel_total: 120_000,
            kernel_paged: 80_000,
            kernel_nonpaged: 40_000,
            page_size: 4096,
            handle_count: 60_000,
            process_count: 210,
            thread_count: 2_500,
        }
    }
}
