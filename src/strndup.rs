//! Bounded string duplication

use std::ffi::{CStr, CString};

use crate::error::Result;

/// Length of `source` up to the first NUL, looking at no more than `n` bytes
pub fn strnlen(source: &[u8], n: usize) -> usize {
    let bounded = &source[..n.min(source.len())];
    bounded.iter().position(|&b| b == 0).unwrap_or(bounded.len())
}

/// Copy at most `n` bytes of `source` into a new NUL-terminated string.
///
/// Copying stops early at a NUL inside the bound. The result owns its own
/// allocation of exactly the copied length plus one.
pub fn strndup(source: &[u8], n: usize) -> Result<CString> {
    let len = strnlen(source, n);

    let mut copy = Vec::new();
    copy.try_reserve_exact(len + 1)?;
    copy.extend_from_slice(&source[..len]);
    copy.push(0);

    // SAFETY: strnlen stopped before any NUL, so the terminator is the only one
    Ok(unsafe { CString::from_vec_with_nul_unchecked(copy) })
}

/// [`strndup`] over a C string
pub fn strndup_cstr(source: &CStr, n: usize) -> Result<CString> {
    strndup(source.to_bytes(), n)
}
