//! `sysctlbyname` binding shared by the BSD-family sources
//!
//! The FFI half only exists on macOS, FreeBSD and DragonFly. The length
//! checks applied to what the kernel wrote are plain functions.

#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

#[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "dragonfly"))]
use log::debug;
#[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "dragonfly"))]
use std::{ffi::CString, ptr};

use crate::constants::CALL_SYSCTLBYNAME;
use crate::error::{MemoryError, Result};

fn call_name(name: &str) -> String {
    format!("{}({})", CALL_SYSCTLBYNAME, name)
}

/// Decode an integer MIB value of 2, 4 or 8 bytes, zero-extending
fn decode_integer(name: &str, bytes: &[u8]) -> Result<u64> {
    let value = match *bytes {
        [a, b, c, d, e, f, g, h] => u64::from_ne_bytes([a, b, c, d, e, f, g, h]),
        [a, b, c, d] => u64::from(u32::from_ne_bytes([a, b, c, d])),
        [a, b] => u64::from(u16::from_ne_bytes([a, b])),
        _ => {
            return Err(MemoryError::UnexpectedSize {
                call: call_name(name),
                expected: 8,
                actual: bytes.len(),
            })
        }
    };
    Ok(value)
}

/// A record MIB must fill its record exactly
fn check_record_len(name: &str, expected: usize, actual: usize) -> Result<()> {
    if actual != expected {
        return Err(MemoryError::UnexpectedSize {
            call: call_name(name),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Read an integer-valued MIB, zero-extending 16/32-bit values
#[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "dragonfly"))]
pub(crate) fn sysctl_u64(name: &str) -> Result<u64> {
    let mut buf = [0u8; 8];

    // SAFETY: a byte array accepts any bit pattern the kernel writes
    let len = unsafe { sysctl_into(name, buf.as_mut_ptr().cast(), buf.len())? };

    let value = decode_integer(name, &buf[..len.min(buf.len())])?;
    debug!("{} = {}", name, value);
    Ok(value)
}

/// Read a fixed-layout record MIB.
///
/// # Safety
///
/// `T` must be `#[repr(C)]`, match the kernel's layout for `name`, and be
/// valid for every bit pattern.
#[cfg(target_os = "macos")]
pub(crate) unsafe fn sysctl_record<T: Copy + Default>(name: &str) -> Result<T> {
    let mut record = T::default();
    let expected = std::mem::size_of::<T>();

    let len = sysctl_into(name, (&mut record as *mut T).cast(), expected)?;
    check_record_len(name, expected, len)?;

    Ok(record)
}

/// Call `sysctlbyname`, returning the number of bytes the kernel wrote.
///
/// # Safety
///
/// `out` must be valid for writes of `capacity` bytes.
#[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "dragonfly"))]
unsafe fn sysctl_into(name: &str, out: *mut libc::c_void, capacity: usize) -> Result<usize> {
    // MIB names are compile-time constants; a NUL in one is reported as EINVAL
    let cname =
        CString::new(name).map_err(|_| MemoryError::native(call_name(name), libc::EINVAL))?;
    let mut len: libc::size_t = capacity;

    let rc = libc::sysctlbyname(cname.as_ptr(), out, &mut len, ptr::null_mut(), 0);
    if rc < 0 {
        return Err(MemoryError::last_os_error(call_name(name)));
    }

    Ok(len)
}
