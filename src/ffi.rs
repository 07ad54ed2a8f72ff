//! C ABI entry points
//!
//! Drop-in `getline`, `getdelim` and `strndup` for C code linked into the
//! terminal on platforms whose libc lacks them. They follow the classic
//! contract: in-out buffer pointers, memory from the C allocator, `-1` on
//! failure with `errno` set. Release results with `free` or [`mochi_free`].
//!
//! Reference: https://pubs.opengroup.org/onlinepubs/9699919799/functions/getdelim.html

use std::ptr;

use libc::{c_char, c_int, c_void, size_t, ssize_t, FILE};

use crate::getline::{MIN_CAPACITY, NEWLINE};

/// Read a newline-terminated line from `stream`.
///
/// # Safety
/// Same requirements as [`mochi_getdelim`].
#[no_mangle]
pub unsafe extern "C" fn mochi_getline(
    lineptr: *mut *mut c_char,
    n: *mut size_t,
    stream: *mut FILE,
) -> ssize_t {
    mochi_getdelim(lineptr, n, NEWLINE as c_int, stream)
}

/// Read bytes from `stream` up to and including `delim`.
///
/// A buffer smaller than 128 bytes (or a null one) is replaced with a fresh
/// 128-byte allocation before reading. The old pointer is overwritten, not
/// freed, so callers passing an undersized buffer keep responsibility for
/// it. Growth doubles `*n` via `realloc`.
///
/// Returns the byte count (delimiter included, NUL excluded), or -1 on end
/// of input, a stream error (`errno` from `fgetc`), allocation failure
/// (`ENOMEM`) or invalid arguments (`EINVAL`).
/// On allocation failure a buffer allocated by this call is freed and
/// `*lineptr`/`*n` are reset to null/0.
///
/// # Safety
/// `lineptr` and `n` must be valid for reads and writes. `*lineptr` must be
/// null or a `malloc`ed block of at least `*n` bytes. `stream` must be an
/// open stream readable with `fgetc`.
#[no_mangle]
pub unsafe extern "C" fn mochi_getdelim(
    lineptr: *mut *mut c_char,
    n: *mut size_t,
    delim: c_int,
    stream: *mut FILE,
) -> ssize_t {
    getdelim_with(lineptr, n, delim, stream, libc::realloc)
}

/// Signature of the C allocator's `realloc`
type ReallocFn = unsafe extern "C" fn(*mut c_void, size_t) -> *mut c_void;

unsafe fn getdelim_with(
    lineptr: *mut *mut c_char,
    n: *mut size_t,
    delim: c_int,
    stream: *mut FILE,
    realloc: ReallocFn,
) -> ssize_t {
    if lineptr.is_null() || n.is_null() || stream.is_null() {
        set_errno(libc::EINVAL);
        return -1;
    }

    let mut buf = *lineptr;
    let mut cap = *n;
    let mut fresh = false;

    if buf.is_null() || cap < MIN_CAPACITY {
        buf = libc::malloc(MIN_CAPACITY) as *mut c_char;
        if buf.is_null() {
            set_errno(libc::ENOMEM);
            return -1;
        }
        cap = MIN_CAPACITY;
        fresh = true;
        *lineptr = buf;
        *n = cap;
    }

    let delim = delim as u8;
    let mut pos: usize = 0;

    loop {
        let c = libc::fgetc(stream);
        if c == libc::EOF {
            // A read error fails the call even mid-line; fgetc set errno
            if libc::ferror(stream) != 0 {
                return -1;
            }
            break;
        }

        if pos + 1 >= cap {
            let grown = match cap.checked_mul(2) {
                Some(new_cap) => realloc(buf as *mut c_void, new_cap) as *mut c_char,
                None => ptr::null_mut(),
            };
            if grown.is_null() {
                if fresh {
                    tracing::debug!("releasing line buffer allocated by failed read");
                    libc::free(buf as *mut c_void);
                    *lineptr = ptr::null_mut();
                    *n = 0;
                }
                set_errno(libc::ENOMEM);
                return -1;
            }
            tracing::trace!(from = cap, to = cap * 2, "growing line buffer");
            buf = grown;
            cap *= 2;
            *lineptr = buf;
            *n = cap;
        }

        let byte = c as u8;
        *buf.add(pos) = byte as c_char;
        pos += 1;
        if byte == delim {
            break;
        }
    }

    if pos == 0 {
        return -1;
    }

    *buf.add(pos) = 0;
    pos as ssize_t
}

/// Copy at most `n` bytes of `s` into a new NUL-terminated `malloc`ed string.
///
/// Returns null for a null `s` or when allocation fails (`ENOMEM`).
///
/// # Safety
/// `s` must be null, NUL-terminated, or readable for `n` bytes.
#[no_mangle]
pub unsafe extern "C" fn mochi_strndup(s: *const c_char, n: size_t) -> *mut c_char {
    if s.is_null() {
        return ptr::null_mut();
    }

    let end = libc::memchr(s as *const c_void, 0, n) as *const c_char;
    let len = if end.is_null() {
        n
    } else {
        end.offset_from(s) as usize
    };

    let dup = libc::malloc(len + 1) as *mut c_char;
    if dup.is_null() {
        set_errno(libc::ENOMEM);
        return ptr::null_mut();
    }
    ptr::copy_nonoverlapping(s, dup, len);
    *dup.add(len) = 0;
    dup
}

/// Free memory returned by [`mochi_getdelim`] or [`mochi_strndup`]
///
/// # Safety
/// `ptr` must be null or a pointer obtained from these functions that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn mochi_free(ptr: *mut c_void) {
    libc::free(ptr);
}

#[cfg(target_os = "linux")]
unsafe fn set_errno(code: c_int) {
    *libc::__errno_location() = code;
}

#[cfg(any(target_os = "android", target_os = "netbsd", target_os = "openbsd"))]
unsafe fn set_errno(code: c_int) {
    *libc::__errno() = code;
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
unsafe fn set_errno(code: c_int) {
    *libc::__error() = code;
}

// Other unix targets (DragonFly, Solaris, ...) do not report EINVAL/ENOMEM;
// the -1 return is still the failure signal there.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
unsafe fn set_errno(_code: c_int) {}
