//! Integration tests for the query facade over meminfo fixture files.
//!
//! These run on every platform: the Linux source only reads a file, so a
//! temp file stands in for /proc/meminfo.

use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

use sys_memory::platforms::linux::{parse_fields, parse_meminfo};
use sys_memory::platforms::LinuxSource;
use sys_memory::{MemoryError, MemoryReport, Platform, PlatformSource, RawCounters};

const MEMINFO: &str = "\
MemTotal:       16318412 kB
MemFree:         2054948 kB
MemAvailable:    9841228 kB
Buffers:          612344 kB
Cached:          6918100 kB
SwapCached:        10240 kB
Active:          6213424 kB
Inactive:        5809772 kB
Shmem:            412332 kB
Slab:             812992 kB
SReclaimable:     544120 kB
SwapTotal:       8388604 kB
SwapFree:        8120316 kB
VmallocTotal:   34359738367 kB
HugePages_Total:       0
";

fn meminfo_file(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn report_for(file: &NamedTempFile) -> MemoryReport {
    MemoryReport::new(Box::new(LinuxSource::with_path(file.path())))
}

#[test]
fn test_documented_sample_lines() -> Result<()> {
    let meminfo = parse_fields("MemTotal:     8192000 kB\nMemFree:      1024000 kB\n");
    assert_eq!(meminfo.get("MemTotal").map(|kb| kb * 1024), Some(8_192_000 * 1024));
    assert_eq!(meminfo.get("MemFree").map(|kb| kb * 1024), Some(1_024_000 * 1024));
    Ok(())
}

#[test]
fn test_report_from_meminfo_file() -> Result<()> {
    let file = meminfo_file(MEMINFO)?;
    let report = report_for(&file);
    assert_eq!(report.platform(), Platform::Linux);

    let snapshot = report.memory()?;
    assert_eq!(snapshot.total_bytes, 16_318_412 * 1024);
    assert_eq!(snapshot.free_bytes, 2_054_948 * 1024);
    assert_eq!(snapshot.available_bytes, Some(9_841_228 * 1024));
    assert_eq!(
        snapshot.used_bytes,
        (16_318_412 - 2_054_948 - 612_344 - 6_918_100 - 812_992) * 1024
    );
    assert!(snapshot.used_bytes <= snapshot.total_bytes - snapshot.free_bytes);
    assert_eq!(snapshot.swap_total_bytes, Some(8_388_604 * 1024));

    assert_eq!(report.total(true)?, (16_318_412 + 8_388_604) * 1024);
    assert_eq!(report.free(true)?, (2_054_948 + 8_120_316) * 1024);
    // (16318412 - 2054948 - 8343436) / 16318412
    assert_eq!(report.load(false)?, 36.0);
    Ok(())
}

#[test]
fn test_missing_swap_total_fails_extended_total() -> Result<()> {
    let content: String = MEMINFO
        .lines()
        .filter(|line| !line.starts_with("SwapTotal:"))
        .map(|line| format!("{line}\n"))
        .collect();
    let file = meminfo_file(&content)?;

    let err = report_for(&file).total(true).unwrap_err();
    assert_eq!(
        err,
        MemoryError::MissingField {
            label: "SwapTotal".to_string()
        }
    );
    assert_eq!(parse_meminfo(&content).unwrap_err(), err);
    Ok(())
}

#[test]
fn test_zero_total_load_fails() -> Result<()> {
    let content = MEMINFO.replace("MemTotal:       16318412 kB", "MemTotal:       0 kB");
    let file = meminfo_file(&content)?;

    assert_eq!(
        report_for(&file).load(false).unwrap_err(),
        MemoryError::DivisionUndefined
    );
    Ok(())
}

#[test]
fn test_raw_mapping_keeps_every_label() -> Result<()> {
    let file = meminfo_file(MEMINFO)?;
    let source = LinuxSource::with_path(file.path());

    let raw = source.fetch_raw()?;
    assert!(matches!(raw, RawCounters::Linux(_)));

    let fields = raw.fields();
    assert_eq!(fields.len(), 15);
    assert_eq!(fields["VmallocTotal"], 34_359_738_367);
    assert_eq!(fields["SReclaimable"], 544_120);
    Ok(())
}

#[test]
fn test_file_rewrites_are_picked_up() -> Result<()> {
    let file = meminfo_file(MEMINFO)?;
    let report = report_for(&file);
    let before = report.free(false)?;

    let updated = MEMINFO.replace("MemFree:         2054948 kB", "MemFree:         1000000 kB");
    std::fs::write(file.path(), updated)?;

    assert_eq!(before, 2_054_948 * 1024);
    assert_eq!(report.free(false)?, 1_000_000 * 1024);
    Ok(())
}
