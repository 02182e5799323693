//! Data models for memory queries
//!
//! This module defines the raw counter records each platform source returns
//! and the normalized [`MemorySnapshot`] built from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DEFAULT_PAGE_SIZE, MEMINFO_REQUIRED_LABELS};
use crate::error::{MemoryError, Result};
use crate::platforms::Platform;

/// Parsed `/proc/meminfo`: label to value in kibibytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meminfo {
    fields: BTreeMap<String, u64>,
}

impl Meminfo {
    pub fn new(fields: BTreeMap<String, u64>) -> Self {
        Self { fields }
    }

    /// Value of a label in kibibytes
    pub fn get(&self, label: &str) -> Option<u64> {
        self.fields.get(label).copied()
    }

    /// Value of a label in kibibytes, failing with `MissingField` if absent
    pub fn require(&self, label: &str) -> Result<u64> {
        self.get(label).ok_or_else(|| MemoryError::missing(label))
    }

    /// Check that every required label is present, reporting the first gap
    pub fn validate(&self) -> Result<()> {
        for label in MEMINFO_REQUIRED_LABELS {
            self.require(label)?;
        }
        Ok(())
    }

    pub fn fields(&self) -> &BTreeMap<String, u64> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One value per FreeBSD/DragonFly MIB. Counts are in pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BsdCounters {
    /// `hw.physmem`, bytes
    pub physmem: u64,
    /// `hw.pagesize`, bytes
    pub pagesize: u64,
    pub active_count: u64,
    pub free_count: u64,
    pub inactive_count: u64,
    pub wire_count: u64,
    pub cache_count: u64,
    pub page_count: u64,
    /// `vm.swap_size`, bytes
    pub swap_size: u64,
    /// `vm.swap_free`, bytes
    pub swap_free: u64,
}

/// Darwin `struct xsw_usage`, as filled by `sysctlbyname("vm.swapusage")`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XswUsage {
    pub xsu_total: u64,
    pub xsu_avail: u64,
    pub xsu_used: u64,
    pub xsu_pagesize: u32,
    /// `boolean_t`
    pub xsu_encrypted: u32,
}

impl XswUsage {
    pub fn is_encrypted(&self) -> bool {
        self.xsu_encrypted != 0
    }
}

/// Darwin `struct vm_statistics64` (`HOST_VM_INFO64`). Counts are in pages.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmStatistics64 {
    pub free_count: u32,
    pub active_count: u32,
    pub inactive_count: u32,
    pub wire_count: u32,
    pub zero_fill_count: u64,
    pub reactivations: u64,
    pub pageins: u64,
    pub pageouts: u64,
    pub faults: u64,
    pub cow_faults: u64,
    pub lookups: u64,
    pub hits: u64,
    pub purges: u64,
    pub purgeable_count: u32,
    pub speculative_count: u32,
    pub decompressions: u64,
    pub compressions: u64,
    pub swapins: u64,
    pub swapouts: u64,
    pub compressor_page_count: u32,
    pub throttled_count: u32,
    pub external_page_count: u32,
    pub internal_page_count: u32,
    pub total_uncompressed_pages_in_compressor: u64,
}

/// Everything one Darwin query returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarwinCounters {
    /// `hw.memsize`, bytes
    pub memsize: u64,
    pub swap: XswUsage,
    pub vm: VmStatistics64,
}

impl DarwinCounters {
    /// Page size for this reading: the swap record's, or 4096 if it reported none
    pub fn page_size(&self) -> u64 {
        match self.swap.xsu_pagesize {
            0 => DEFAULT_PAGE_SIZE,
            size => u64::from(size),
        }
    }
}

/// `MEMORYSTATUSEX` and `PERFORMANCE_INFORMATION` without their size prefixes.
///
/// The memory status figures are bytes; the performance figures other than
/// the three counts are pages of `page_size` bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsCounters {
    /// `dwMemoryLoad`, 0-100 as computed by the OS
    pub memory_load: u32,
    pub total_phys: u64,
    pub avail_phys: u64,
    pub total_page_file: u64,
    pub avail_page_file: u64,
    pub total_virtual: u64,
    pub avail_virtual: u64,
    pub avail_extended_virtual: u64,
    pub commit_total: u64,
    pub commit_limit: u64,
    pub commit_peak: u64,
    pub physical_total: u64,
    pub physical_available: u64,
    pub system_cache: u64,
    pub kernel_total: u64,
    pub kernel_paged: u64,
    pub kernel_nonpaged: u64,
    pub page_size: u64,
    pub handle_count: u32,
    pub process_count: u32,
    pub thread_count: u32,
}

/// Untouched native readings from one platform source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", content = "counters", rename_all = "lowercase")]
pub enum RawCounters {
    Linux(Meminfo),
    Bsd(BsdCounters),
    Darwin(DarwinCounters),
    Windows(WindowsCounters),
}

impl RawCounters {
    pub fn platform(&self) -> Platform {
        match self {
            RawCounters::Linux(_) => Platform::Linux,
            RawCounters::Bsd(_) => Platform::Bsd,
            RawCounters::Darwin(_) => Platform::Darwin,
            RawCounters::Windows(_) => Platform::Windows,
        }
    }

    /// Flatten into native field names and values, in the units the OS
    /// reported them
    pub fn fields(&self) -> BTreeMap<String, u64> {
        let pairs: Vec<(&str, u64)> = match self {
            RawCounters::Linux(meminfo) => return meminfo.fields().clone(),
            RawCounters::Bsd(c) => vec![
                ("hw.physmem", c.physmem),
                ("hw.pagesize", c.pagesize),
                ("vm.stats.vm.v_active_count", c.active_count),
                ("vm.stats.vm.v_free_count", c.free_count),
                ("vm.stats.vm.v_inactive_count", c.inactive_count),
                ("vm.stats.vm.v_wire_count", c.wire_count),
                ("vm.stats.vm.v_cache_count", c.cache_count),
                ("vm.stats.vm.v_page_count", c.page_count),
                ("vm.swap_size", c.swap_size),
                ("vm.swap_free", c.swap_free),
            ],
            RawCounters::Darwin(c) => vec![
                ("hw.memsize", c.memsize),
                ("xsu_total", c.swap.xsu_total),
                ("xsu_avail", c.swap.xsu_avail),
                ("xsu_used", c.swap.xsu_used),
                ("xsu_pagesize", u64::from(c.swap.xsu_pagesize)),
                ("xsu_encrypted", u64::from(c.swap.xsu_encrypted)),
                ("free_count", u64::from(c.vm.free_count)),
                ("active_count", u64::from(c.vm.active_count)),
                ("inactive_count", u64::from(c.vm.inactive_count)),
                ("wire_count", u64::from(c.vm.wire_count)),
                ("zero_fill_count", c.vm.zero_fill_count),
                ("reactivations", c.vm.reactivations),
                ("pageins", c.vm.pageins),
                ("pageouts", c.vm.pageouts),
                ("faults", c.vm.faults),
                ("cow_faults", c.vm.cow_faults),
                ("lookups", c.vm.lookups),
                ("hits", c.vm.hits),
                ("purges", c.vm.purges),
                ("purgeable_count", u64::from(c.vm.purgeable_count)),
                ("speculative_count", u64::from(c.vm.speculative_count)),
                ("decompressions", c.vm.decompressions),
                ("compressions", c.vm.compressions),
                ("swapins", c.vm.swapins),
                ("swapouts", c.vm.swapouts),
                ("compressor_page_count", u64::from(c.vm.compressor_page_count)),
                ("throttled_count", u64::from(c.vm.throttled_count)),
                ("external_page_count", u64::from(c.vm.external_page_count)),
                ("internal_page_count", u64::from(c.vm.internal_page_count)),
                (
                    "total_uncompressed_pages_in_compressor",
                    c.vm.total_uncompressed_pages_in_compressor,
                ),
            ],
            RawCounters::Windows(c) => vec![
                ("MemoryLoad", u64::from(c.memory_load)),
                ("TotalPhys", c.total_phys),
                ("AvailPhys", c.avail_phys),
                ("TotalPageFile", c.total_page_file),
                ("AvailPageFile", c.avail_page_file),
                ("TotalVirtual", c.total_virtual),
                ("AvailVirtual", c.avail_virtual),
                ("AvailExtendedVirtual", c.avail_extended_virtual),
                ("CommitTotal", c.commit_total),
                ("CommitLimit", c.commit_limit),
                ("CommitPeak", c.commit_peak),
                ("PhysicalTotal", c.physical_total),
                ("PhysicalAvailable", c.physical_available),
                ("SystemCache", c.system_cache),
                ("KernelTotal", c.kernel_total),
                ("KernelPaged", c.kernel_paged),
                ("KernelNonpaged", c.kernel_nonpaged),
                ("PageSize", c.page_size),
                ("HandleCount", u64::from(c.handle_count)),
                ("ProcessCount", u64::from(c.process_count)),
                ("ThreadCount", u64::from(c.thread_count)),
            ],
        };

        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

/// Normalized host memory figures, all in bytes.
///
/// Produced fresh by every query and never cached. Derived figures use
/// physical memory only; see [`crate::normalize`] for the extended forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub platform: Platform,
    /// Physical memory installed
    pub total_bytes: u64,
    /// Immediately reusable physical memory, as the OS defines it
    pub free_bytes: u64,
    pub used_bytes: u64,
    /// Linux `MemAvailable`
    pub available_bytes: Option<u64>,
    pub active_bytes: Option<u64>,
    pub inactive_bytes: Option<u64>,
    pub wired_bytes: Option<u64>,
    pub speculative_bytes: Option<u64>,
    pub compressed_bytes: Option<u64>,
    /// BSD cache pages, or Linux `Buffers + Cached + Slab`
    pub cache_bytes: Option<u64>,
    pub swap_total_bytes: Option<u64>,
    pub swap_free_bytes: Option<u64>,
    pub swap_used_bytes: Option<u64>,
    /// 0-100
    pub memory_load_percent: f64,
}
