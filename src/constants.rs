//! Global constants for sys_memory.
//!
//! This module centralizes the native names, identifiers and unit factors
//! used by the platform sources so the readers themselves carry no magic
//! values.

// Unit constants
/// Bytes per kibibyte, the unit `/proc/meminfo` reports in
pub const KIB: u64 = 1024;

/// Page size assumed on Darwin until `vm.swapusage` reports the real one
pub const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Decimal places `load` rounds the used/total ratio to before scaling
pub const LOAD_RATIO_PRECISION: i32 = 2;

// Linux constants
/// Pseudo-file holding the kernel memory counters
pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Labels that must be present in every meminfo reading, in check order
pub const MEMINFO_REQUIRED_LABELS: [&str; 8] = [
    "MemTotal",
    "MemFree",
    "MemAvailable",
    "SwapTotal",
    "SwapFree",
    "Buffers",
    "Cached",
    "Slab",
];

// BSD sysctl names
/// Physical memory in bytes
pub const MIB_PHYSMEM: &str = "hw.physmem";
/// Page size in bytes
pub const MIB_PAGESIZE: &str = "hw.pagesize";
/// Active pages
pub const MIB_ACTIVE_COUNT: &str = "vm.stats.vm.v_active_count";
/// Free pages
pub const MIB_FREE_COUNT: &str = "vm.stats.vm.v_free_count";
/// Inactive pages
pub const MIB_INACTIVE_COUNT: &str = "vm.stats.vm.v_inactive_count";
/// Wired pages
pub const MIB_WIRE_COUNT: &str = "vm.stats.vm.v_wire_count";
/// Cached pages
pub const MIB_CACHE_COUNT: &str = "vm.stats.vm.v_cache_count";
/// Total managed pages
pub const MIB_PAGE_COUNT: &str = "vm.stats.vm.v_page_count";
/// Swap size in bytes
pub const MIB_SWAP_SIZE: &str = "vm.swap_size";
/// Free swap in bytes
pub const MIB_SWAP_FREE: &str = "vm.swap_free";

// Darwin constants
/// Physical memory in bytes
pub const MIB_MEMSIZE: &str = "hw.memsize";
/// `struct xsw_usage` swap record
pub const MIB_SWAPUSAGE: &str = "vm.swapusage";
/// `host_statistics64` flavor selecting `vm_statistics64`
pub const HOST_VM_INFO64: i32 = 4;
/// Size of `vm_statistics64` in `integer_t` words
pub const HOST_VM_INFO64_COUNT: u32 = 38;

// Native call names reported in errors
pub const CALL_SYSCTLBYNAME: &str = "sysctlbyname";
pub const CALL_HOST_STATISTICS64: &str = "host_statistics64";
pub const CALL_GLOBAL_MEMORY_STATUS_EX: &str = "GlobalMemoryStatusEx";
pub const CALL_GET_PERFORMANCE_INFO: &str = "GetPerformanceInfo";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_labels_unique() {
        let mut labels = MEMINFO_REQUIRED_LABELS.to_vec();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), MEMINFO_REQUIRED_LABELS.len());
    }

    #[test]
    fn test_vm_info_count_matches_record() {
        let words =
            std::mem::size_of::<crate::models::VmStatistics64>() / std::mem::size_of::<i32>();
        assert_eq!(words as u32, HOST_VM_INFO64_COUNT);
    }
}
