//! Normalization of raw platform counters
//!
//! Every platform reports memory in its own units and with its own notion of
//! "free". The functions here turn one [`RawCounters`] reading into byte
//! figures with a shared meaning:
//!
//! - `total` is physical memory, plus swap when `extended` is set.
//! - `free` is what the OS counts as immediately reusable, plus free swap
//!   when `extended` is set. It never exceeds `total`.
//! - `used` is `total - free` over the same base. On Linux buffers, page
//!   cache and slab are subtracted as well, so there `used <= total - free`.
//! - `load` is `round(used / total, 2) * 100` over the same base, except on
//!   Windows, where the OS-computed load is passed through and `extended`
//!   has no effect. Ties round away from zero even when the ratio's binary
//!   value sits just below the tie, so 0.285 gives 29, not 28.
//!
//! Page counts are converted with the page size reported in the same reading.

use log::warn;

use crate::constants::{KIB, LOAD_RATIO_PRECISION};
use crate::error::{MemoryError, Result};
use crate::models::{Meminfo, MemorySnapshot, RawCounters};

/// Total and free bytes over one base (physical, or physical plus swap)
#[derive(Debug, Clone, Copy)]
struct Basis {
    total: u64,
    free: u64,
}

fn kib(meminfo: &Meminfo, label: &'static str) -> Result<u64> {
    meminfo
        .require(label)?
        .checked_mul(KIB)
        .ok_or(MemoryError::Overflow { field: label })
}

fn pages(count: u64, page_size: u64, field: &'static str) -> Result<u64> {
    count
        .checked_mul(page_size)
        .ok_or(MemoryError::Overflow { field })
}

fn add(a: u64, b: u64, field: &'static str) -> Result<u64> {
    a.checked_add(b).ok_or(MemoryError::Overflow { field })
}

fn basis(raw: &RawCounters, extended: bool) -> Result<Basis> {
    let (total, free) = match raw {
        RawCounters::Linux(m) => {
            let (mut total, mut free) = (kib(m, "MemTotal")?, kib(m, "MemFree")?);
            if extended {
                total = add(total, kib(m, "SwapTotal")?, "SwapTotal")?;
                free = add(free, kib(m, "SwapFree")?, "SwapFree")?;
            }
            (total, free)
        }
        RawCounters::Bsd(c) => {
            let free = pages(c.free_count, c.pagesize, "vm.stats.vm.v_free_count")?;
            if extended {
                (
                    add(c.physmem, c.swap_size, "vm.swap_size")?,
                    add(free, c.swap_free, "vm.swap_free")?,
                )
            } else {
                (c.physmem, free)
            }
        }
        RawCounters::Darwin(c) => {
            let free = pages(u64::from(c.vm.free_count), c.page_size(), "free_count")?;
            if extended {
                (
                    add(c.memsize, c.swap.xsu_total, "xsu_total")?,
                    add(free, c.swap.xsu_avail, "xsu_avail")?,
                )
            } else {
                (c.memsize, free)
            }
        }
        RawCounters::Windows(c) => {
            if extended {
                (
                    add(c.total_phys, c.total_page_file, "TotalPageFile")?,
                    add(c.avail_phys, c.avail_page_file, "AvailPageFile")?,
                )
            } else {
                (c.total_phys, c.avail_phys)
            }
        }
    };

    if free > total {
        warn!(
            "{} reported {} free of {} total bytes, clamping",
            raw.platform(),
            free,
            total
        );
    }

    Ok(Basis {
        total,
        free: free.min(total),
    })
}

/// Linux `(Buffers + Cached + Slab)` in bytes
fn linux_reclaimable(meminfo: &Meminfo) -> Result<u64> {
    let buffers = kib(meminfo, "Buffers")?;
    let cached = kib(meminfo, "Cached")?;
    let slab = kib(meminfo, "Slab")?;
    add(add(buffers, cached, "Cached")?, slab, "Slab")
}

fn used_from(raw: &RawCounters, basis: Basis) -> Result<u64> {
    if basis.total == 0 {
        return Err(MemoryError::DivisionUndefined);
    }

    let used = basis.total - basis.free;
    match raw {
        RawCounters::Linux(m) => Ok(used.saturating_sub(linux_reclaimable(m)?)),
        _ => Ok(used),
    }
}

fn load_from(raw: &RawCounters, basis: Basis) -> Result<f64> {
    let used = used_from(raw, basis)?;

    if let RawCounters::Windows(c) = raw {
        return Ok(f64::from(c.memory_load));
    }

    let scale = 10f64.powi(LOAD_RATIO_PRECISION);
    let ratio = used as f64 / basis.total as f64;
    Ok(round_half_up(ratio, scale) * (100.0 / scale))
}

/// `round(x * scale)` for non-negative `x`, bumped up when `x` is at or past
/// the decimal half-way point that `x * scale` lost to representation error.
/// Returns the rounded value still multiplied by `scale`.
fn round_half_up(x: f64, scale: f64) -> f64 {
    let rounded = (x * scale).round();
    if (rounded + 0.5) / scale <= x {
        rounded + 1.0
    } else {
        rounded
    }
}

/// Total memory in bytes, including swap when `extended`
pub fn total(raw: &RawCounters, extended: bool) -> Result<u64> {
    basis(raw, extended).map(|b| b.total)
}

/// Immediately reusable memory in bytes, including free swap when `extended`
pub fn free(raw: &RawCounters, extended: bool) -> Result<u64> {
    basis(raw, extended).map(|b| b.free)
}

/// Memory in use, in bytes, over the same base as `total(raw, extended)`
pub fn used(raw: &RawCounters, extended: bool) -> Result<u64> {
    used_from(raw, basis(raw, extended)?)
}

/// Percentage (0-100) of memory in use
pub fn load(raw: &RawCounters, extended: bool) -> Result<f64> {
    load_from(raw, basis(raw, extended)?)
}

/// Memory available for new work without swapping. Linux reports this
/// separately as `MemAvailable`; elsewhere it is physical `free`.
pub fn available(raw: &RawCounters) -> Result<u64> {
    match raw {
        RawCounters::Linux(m) => kib(m, "MemAvailable"),
        _ => free(raw, false),
    }
}

/// Build the physical-memory snapshot for one reading
pub fn snapshot(raw: &RawCounters) -> Result<MemorySnapshot> {
    let physical = basis(raw, false)?;

    let mut snapshot = MemorySnapshot {
        platform: raw.platform(),
        total_bytes: physical.total,
        free_bytes: physical.free,
        used_bytes: used_from(raw, physical)?,
        available_bytes: None,
        active_bytes: None,
        inactive_bytes: None,
        wired_bytes: None,
        speculative_bytes: None,
        compressed_bytes: None,
        cache_bytes: None,
        swap_total_bytes: None,
        swap_free_bytes: None,
        swap_used_bytes: None,
        memory_load_percent: load_from(raw, physical)?,
    };

    match raw {
        RawCounters::Linux(m) => {
            let swap_total = kib(m, "SwapTotal")?;
            let swap_free = kib(m, "SwapFree")?;
            snapshot.available_bytes = Some(kib(m, "MemAvailable")?);
            snapshot.cache_bytes = Some(linux_reclaimable(m)?);
            snapshot.swap_total_bytes = Some(swap_total);
            snapshot.swap_free_bytes = Some(swap_free);
            snapshot.swap_used_bytes = Some(swap_total.saturating_sub(swap_free));
        }
        RawCounters::Bsd(c) => {
            let bsd_pages = |count, field| pages(count, c.pagesize, field).map(Some);
            snapshot.active_bytes = bsd_pages(c.active_count, "vm.stats.vm.v_active_count")?;
            snapshot.inactive_bytes = bsd_pages(c.inactive_count, "vm.stats.vm.v_inactive_count")?;
            snapshot.wired_bytes = bsd_pages(c.wire_count, "vm.stats.vm.v_wire_count")?;
            snapshot.cache_bytes = bsd_pages(c.cache_count, "vm.stats.vm.v_cache_count")?;
            snapshot.swap_total_bytes = Some(c.swap_size);
            snapshot.swap_free_bytes = Some(c.swap_free);
            snapshot.swap_used_bytes = Some(c.swap_size.saturating_sub(c.swap_free));
        }
        RawCounters::Darwin(c) => {
            let page_size = c.page_size();
            let vm_pages = |count: u32, field| pages(u64::from(count), page_size, field).map(Some);
            snapshot.active_bytes = vm_pages(c.vm.active_count, "active_count")?;
            snapshot.inactive_bytes = vm_pages(c.vm.inactive_count, "inactive_count")?;
            snapshot.wired_bytes = vm_pages(c.vm.wire_count, "wire_count")?;
            snapshot.speculative_bytes = vm_pages(c.vm.speculative_count, "speculative_count")?;
            snapshot.compressed_bytes =
                vm_pages(c.vm.compressor_page_count, "compressor_page_count")?;
            snapshot.swap_total_bytes = Some(c.swap.xsu_total);
            snapshot.swap_free_bytes = Some(c.swap.xsu_avail);
            snapshot.swap_used_bytes = Some(c.swap.xsu_used);
        }
        RawCounters::Windows(c) => {
            snapshot.swap_total_bytes = Some(c.total_page_file);
            snapshot.swap_free_bytes = Some(c.avail_page_file);
            snapshot.swap_used_bytes = Some(c.total_page_file.saturating_sub(c.avail_page_file));
        }
    }

    Ok(snapshot)
}
