//! Error types for memory queries

use std::io;

use thiserror::Error;

use crate::platforms::Platform;

/// Crate result alias
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Everything that can stop a memory query.
///
/// All variants are terminal for the call that produced them; no partial
/// snapshot is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MemoryError {
    /// An OS query reported failure. `code` is the raw errno,
    /// `kern_return_t` or `GetLastError()` value, uninterpreted.
    #[error("{call} failed with OS error code {code}")]
    NativeCallFailed { call: String, code: i32 },

    /// A required `/proc/meminfo` label never appeared
    #[error("required meminfo field {label:?} is missing")]
    MissingField { label: String },

    /// Total memory was zero where `used` or `load` needed it
    #[error("total memory is zero, used/load are undefined")]
    DivisionUndefined,

    /// A native call succeeded but wrote a different number of bytes than
    /// the record it was given
    #[error("{call} returned {actual} bytes, expected {expected}")]
    UnexpectedSize {
        call: String,
        expected: usize,
        actual: usize,
    },

    /// A page or unit conversion did not fit in 64 bits
    #[error("byte conversion of {field} overflowed")]
    Overflow { field: &'static str },

    /// The backend has no native interface on this build target
    #[error("memory backend {platform} is not available on this target")]
    UnsupportedPlatform { platform: Platform },

    /// The host OS belongs to none of the supported families
    #[error("no memory backend for operating system {os:?}")]
    UnsupportedOs { os: &'static str },
}

impl MemoryError {
    pub fn native(call: impl Into<String>, code: i32) -> Self {
        MemoryError::NativeCallFailed {
            call: call.into(),
            code,
        }
    }

    /// Wrap an I/O failure, keeping its OS code (`-1` when it has none)
    pub fn from_io(call: impl Into<String>, err: &io::Error) -> Self {
        Self::native(call, err.raw_os_error().unwrap_or(-1))
    }

    /// Capture errno right after a failed libc call
    pub fn last_os_error(call: impl Into<String>) -> Self {
        Self::from_io(call, &io::Error::last_os_error())
    }

    pub fn missing(label: impl Into<String>) -> Self {
        MemoryError::MissingField {
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_keeps_os_code() {
        let err = io::Error::from_raw_os_error(libc::EACCES);
        match MemoryError::from_io("open /proc/meminfo", &err) {
            MemoryError::NativeCallFailed { call, code } => {
                assert_eq!(call, "open /proc/meminfo");
                assert_eq!(code, libc::EACCES);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_io_without_os_code() {
        let err = io::Error::new(io::ErrorKind::InvalidData, "not utf-8");
        assert_eq!(
            MemoryError::from_io("read /proc/meminfo", &err),
            MemoryError::native("read /proc/meminfo", -1)
        );
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MemoryError::missing("SwapTotal").to_string(),
            "required meminfo field \"SwapTotal\" is missing"
        );
        assert_eq!(
            MemoryError::native("sysctlbyname(hw.physmem)", 2).to_string(),
            "sysctlbyname(hw.physmem) failed with OS error code 2"
        );
        assert_eq!(
            MemoryError::UnsupportedPlatform {
                platform: Platform::Windows
            }
            .to_string(),
            "memory backend windows is not available on this target"
        );
        assert_eq!(
            MemoryError::UnexpectedSize {
                call: "sysctlbyname(vm.swapusage)".to_string(),
                expected: 32,
                actual: 24
            }
            .to_string(),
            "sysctlbyname(vm.swapusage) returned 24 bytes, expected 32"
        );
    }
}
