//! Mochi Compat - portable libc line and string helpers
//!
//! Some platforms the terminal runs on ship a C library without `getline`,
//! `getdelim` or `strndup`. This crate provides them in two forms:
//!
//! - `getline`: safe line reading into a reusable, doubling [`LineBuffer`]
//! - `strndup`: bounded duplication into an owned `CString`
//! - `ffi`: `extern "C"` versions with the classic in-out pointer contract
//!   (Unix only)
//!
//! Reference: https://www.man7.org/linux/man-pages/man3/getline.3.html

pub mod config;
mod error;
pub mod getline;
pub mod strndup;

#[cfg(unix)]
pub mod ffi;

pub use config::ReaderConfig;
pub use error::{sentinel, Error, Result, SENTINEL};
pub use getline::{getdelim, getline, read_line, LineBuffer, LineReader, MIN_CAPACITY, NEWLINE};
pub use strndup::{strndup, strndup_cstr, strnlen};
