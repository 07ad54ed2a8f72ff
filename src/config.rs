//! Configuration for line readers

use serde::{Deserialize, Serialize};

use crate::getline::{MIN_CAPACITY, NEWLINE};

/// Line reader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Byte that ends a line
    pub delimiter: u8,
    /// Largest capacity the line buffer may grow to (None = unbounded)
    pub max_capacity: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: NEWLINE,
            max_capacity: None,
        }
    }
}

impl ReaderConfig {
    /// Create the default newline-delimited, unbounded configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different line delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Cap how large the line buffer may grow
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// The growth cap actually enforced.
    ///
    /// The reader always allocates `MIN_CAPACITY` up front, so a smaller cap
    /// is rounded up to it.
    pub fn effective_max_capacity(&self) -> Option<usize> {
        self.max_capacity.map(|cap| cap.max(MIN_CAPACITY))
    }
}
