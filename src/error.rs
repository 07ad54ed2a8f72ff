//! Error types for line reading and string duplication

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Value returned by the C entry points on failure
pub const SENTINEL: isize = -1;

/// Compat error type
#[derive(Error, Debug)]
pub enum Error {
    /// Allocation or growth of a buffer failed
    #[error("Failed to allocate buffer: {0}")]
    Alloc(#[from] TryReserveError),

    /// Growth would take the buffer past the configured maximum
    #[error("Line buffer would exceed maximum capacity of {limit} bytes")]
    CapacityExceeded { limit: usize },

    /// The stream had no data at all
    #[error("End of input")]
    EndOfInput,

    /// I/O error from the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True when the stream was exhausted before any byte was read.
    ///
    /// This is the normal way a read loop terminates, as opposed to a real
    /// failure.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Error::EndOfInput)
    }

    /// True for the failures that come from buffer growth
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Error::Alloc(_) | Error::CapacityExceeded { .. })
    }

    /// The C-style return value for this error
    pub fn sentinel(&self) -> isize {
        SENTINEL
    }
}

/// Collapse a read result into the C convention: the byte count on success,
/// [`SENTINEL`] on any failure.
pub fn sentinel(result: &Result<usize>) -> isize {
    match result {
        // Counts never exceed isize::MAX: Vec caps allocations there.
        Ok(n) => *n as isize,
        Err(e) => e.sentinel(),
    }
}

/// Result type for compat operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_mapping() {
        assert_eq!(sentinel(&Ok(6)), 6);
        assert_eq!(sentinel(&Ok(0)), 0);
        assert_eq!(sentinel(&Err(Error::EndOfInput)), -1);
        assert_eq!(sentinel(&Err(Error::CapacityExceeded { limit: 128 })), -1);
    }

    #[test]
    fn test_classification() {
        assert!(Error::EndOfInput.is_end_of_input());
        assert!(!Error::EndOfInput.is_allocation_failure());
        assert!(Error::CapacityExceeded { limit: 256 }.is_allocation_failure());

        let io_err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(!io_err.is_end_of_input());
        assert!(!io_err.is_allocation_failure());
    }

    #[test]
    fn test_display() {
        let err = Error::CapacityExceeded { limit: 512 };
        assert_eq!(
            err.to_string(),
            "Line buffer would exceed maximum capacity of 512 bytes"
        );
        assert_eq!(Error::EndOfInput.to_string(), "End of input");
    }
}
