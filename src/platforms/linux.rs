//! Linux memory source
//!
//! This module reads the kernel's memory counters from the /proc/meminfo
//! pseudo-file. Every line has the shape
//!
//! ```text
//! MemTotal:       16318412 kB
//! ```
//!
//! and values are kibibytes.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::constants::MEMINFO_PATH;
use crate::error::{MemoryError, Result};
use crate::models::{Meminfo, RawCounters};
use crate::platforms::{Platform, PlatformSource};

lazy_static! {
    // Label, colon, whitespace, decimal value, optional unit suffix
    static ref MEMINFO_LINE: Regex =
        Regex::new(r"^\s*([^:\s]+):\s+(\d+)(?:\s+\S+)?\s*$").expect("valid meminfo regex");
}

/// Reads counters from a meminfo-format file
#[derive(Debug, Clone)]
pub struct LinuxSource {
    path: PathBuf,
}

impl LinuxSource {
    /// Source reading the kernel's /proc/meminfo
    pub fn new() -> Self {
        Self::with_path(MEMINFO_PATH)
    }

    /// Source reading a meminfo-format file at another location, such as a
    /// container's bind-mounted proc or a test fixture
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<String> {
        let mut file = File::open(&self.path)
            .map_err(|e| MemoryError::from_io(format!("open {}", self.path.display()), &e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| MemoryError::from_io(format!("read {}", self.path.display()), &e))?;

        Ok(content)
    }
}

impl Default for LinuxSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformSource for LinuxSource {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn fetch_raw(&self) -> Result<RawCounters> {
        let content = self.read_file()?;
        let meminfo = parse_meminfo(&content)?;

        debug!(
            "Read {} meminfo fields from {}",
            meminfo.len(),
            self.path.display()
        );

        Ok(RawCounters::Linux(meminfo))
    }
}

/// Parse every well-formed line, skipping anything else
pub fn parse_fields(content: &str) -> Meminfo {
    let mut fields = BTreeMap::new();

    for line in content.lines() {
        let parsed = MEMINFO_LINE.captures(line).and_then(|caps| {
            let value = caps[2].parse::<u64>().ok()?;
            Some((caps[1].to_string(), value))
        });

        match parsed {
            Some((label, value)) => {
                fields.insert(label, value);
            }
            None => trace!("Skipping meminfo line: {:?}", line),
        }
    }

    Meminfo::new(fields)
}

/// Parse meminfo content and require every label the normalizer needs
pub fn parse_meminfo(content: &str) -> Result<Meminfo> {
    let meminfo = parse_fields(content);
    meminfo.validate()?;
    Ok(meminfo)
}
