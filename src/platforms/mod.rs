//! Platform-specific memory sources
//!
//! Each submodule reads raw counters through one operating system's native
//! interface. Which one a [`crate::MemoryReport`] uses is decided once, from
//! a [`Platform`] value, when the report is built.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MemoryError, Result};
use crate::models::RawCounters;

pub mod bsd;
pub mod linux;
pub mod macos;
pub mod windows;

mod sysctl;

pub use bsd::BsdSource;
pub use linux::LinuxSource;
pub use macos::DarwinSource;
pub use windows::WindowsSource;

/// Operating system family whose memory interface a source speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// `/proc/meminfo`
    Linux,
    /// FreeBSD and DragonFly `sysctl` MIBs
    Bsd,
    /// macOS `sysctl` plus Mach host statistics
    Darwin,
    /// Win32 memory status and performance info
    Windows,
}

impl Platform {
    /// The platform this crate was built for, if it is one we support
    pub fn current() -> Option<Platform> {
        if cfg!(target_os = "linux") || cfg!(target_os = "android") {
            Some(Platform::Linux)
        } else if cfg!(target_os = "macos") {
            Some(Platform::Darwin)
        } else if cfg!(any(target_os = "freebsd", target_os = "dragonfly")) {
            Some(Platform::Bsd)
        } else if cfg!(target_os = "windows") {
            Some(Platform::Windows)
        } else {
            None
        }
    }

    /// Whether this platform's native interface is compiled into this build
    pub fn is_native(&self) -> bool {
        match self {
            Platform::Linux => true,
            Platform::Bsd => cfg!(any(target_os = "freebsd", target_os = "dragonfly")),
            Platform::Darwin => cfg!(target_os = "macos"),
            Platform::Windows => cfg!(target_os = "windows"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Bsd => "bsd",
            Platform::Darwin => "darwin",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that can fetch one platform's raw memory counters.
///
/// Implementations hold no state between calls: every `fetch_raw` performs
/// the full set of native queries again.
#[cfg_attr(test, mockall::automock)]
pub trait PlatformSource: Send + Sync {
    /// Platform whose counters this source returns
    fn platform(&self) -> Platform;

    /// Query the OS and return its raw counters
    fn fetch_raw(&self) -> Result<RawCounters>;
}

/// Build the source for `platform`.
///
/// Fails with `UnsupportedPlatform` when the platform's native interface
/// is not part of this build.
pub fn source_for(platform: Platform) -> Result<Box<dyn PlatformSource>> {
    if !platform.is_native() {
        return Err(MemoryError::UnsupportedPlatform { platform });
    }

    debug!("Selecting {} memory source", platform);

    let source: Box<dyn PlatformSource> = match platform {
        Platform::Linux => Box::new(LinuxSource::new()),
        Platform::Bsd => Box::new(BsdSource::new()),
        Platform::Darwin => Box::new(DarwinSource::new()),
        Platform::Windows => Box::new(WindowsSource::new()),
    };

    Ok(source)
}

/// Build the source for the platform this crate was compiled for
pub fn host_source() -> Result<Box<dyn PlatformSource>> {
    match Platform::current() {
        Some(platform) => source_for(platform),
        None => Err(MemoryError::UnsupportedOs {
            os: std::env::consts::OS,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_is_always_native() {
        assert!(Platform::Linux.is_native());
        assert!(source_for(Platform::Linux).is_ok());
    }

    #[test]
    fn test_current_platform_is_native() {
        if let Some(platform) = Platform::current() {
            assert!(platform.is_native());
            assert_eq!(source_for(platform).unwrap().platform(), platform);
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_foreign_backends_rejected() {
        for platform in [Platform::Bsd, Platform::Darwin, Platform::Windows] {
            match source_for(platform) {
                Err(MemoryError::UnsupportedPlatform { platform: p }) => assert_eq!(p, platform),
                Err(e) => panic!("unexpected error for {platform}: {e}"),
                Ok(_) => panic!("{platform} should not be constructible on linux"),
            }
        }
    }

    #[test]
    fn test_platform_display_and_serde() {
        assert_eq!(Platform::Darwin.to_string(), "darwin");
        assert_eq!(serde_json::to_string(&Platform::Bsd).unwrap(), "\"bsd\"");
    }
}
