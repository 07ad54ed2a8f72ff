//! Line reading into a growable buffer
//!
//! `getline`/`getdelim` read one line, delimiter included, from a byte stream
//! into a caller-owned [`LineBuffer`]. The buffer is reused across calls and
//! grows by doubling, so a loop over a whole file allocates only a handful of
//! times no matter how many lines it reads.
//!
//! Buffer policy:
//! - A buffer smaller than [`MIN_CAPACITY`] (including an empty one) is thrown
//!   away and replaced by a fresh `MIN_CAPACITY` allocation before reading.
//! - Capacity doubles whenever the next byte would leave no room for the
//!   trailing NUL.
//! - A successful read leaves the line followed by a NUL byte.
//! - A buffer allocated by a call that then fails to grow is released again.

use std::io::{self, BufRead};

use crate::config::ReaderConfig;
use crate::error::{Error, Result};

/// Smallest capacity a line buffer is ever used with
pub const MIN_CAPACITY: usize = 128;

/// Default line delimiter
pub const NEWLINE: u8 = b'\n';

/// Caller-owned storage for the line most recently read.
///
/// Capacity is tracked separately from the underlying `Vec` so that growth is
/// exactly the documented doubling sequence rather than whatever the
/// allocator rounds up to. A capacity of zero means no buffer exists yet.
#[derive(Debug, Default)]
pub struct LineBuffer {
    /// Line bytes plus trailing NUL, or empty when no line is held
    data: Vec<u8>,
    /// Logical allocation size in bytes
    capacity: usize,
}

impl LineBuffer {
    /// Create an empty buffer with no allocation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with a caller-chosen capacity.
    ///
    /// Capacities below [`MIN_CAPACITY`] are accepted but will be discarded
    /// by the first read.
    ///
    /// # Panics
    ///
    /// Panics if the allocation fails, like `Vec::with_capacity`. Use
    /// [`LineBuffer::try_with_capacity`] to get an error instead.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Fallible version of [`LineBuffer::with_capacity`]
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)?;
        Ok(Self { data, capacity })
    }

    /// Allocated size in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of the held line, not counting the NUL
    pub fn len(&self) -> usize {
        self.data.len().saturating_sub(1)
    }

    /// Whether no line is held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The held line, delimiter included when one was read
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// The held line followed by its NUL byte (empty when no line is held)
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.data
    }

    /// Whether the held line ends with `delimiter`.
    ///
    /// False for the last line of a stream that does not end in a delimiter.
    pub fn has_terminator(&self, delimiter: u8) -> bool {
        self.as_bytes().last() == Some(&delimiter)
    }

    /// The held line without a trailing `delimiter`
    pub fn trim_terminator(&self, delimiter: u8) -> &[u8] {
        let line = self.as_bytes();
        match line.split_last() {
            Some((&last, rest)) if last == delimiter => rest,
            _ => line,
        }
    }

    /// Forget the held line, keeping the allocation
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Take the held line as an owned vector (no NUL)
    pub fn into_vec(mut self) -> Vec<u8> {
        let len = self.len();
        self.data.truncate(len);
        self.data
    }

    /// Drop the allocation and return to the no-buffer state
    fn release(&mut self) {
        self.data = Vec::new();
        self.capacity = 0;
    }

    /// Replace the storage with a fresh `MIN_CAPACITY` allocation
    fn reallocate_minimum(&mut self) -> Result<()> {
        tracing::trace!(capacity = self.capacity, "discarding undersized line buffer");
        self.release();
        self.data.try_reserve_exact(MIN_CAPACITY)?;
        self.capacity = MIN_CAPACITY;
        Ok(())
    }

    /// Make room for `additional` more line bytes plus the NUL.
    ///
    /// Doubles one step at a time, so a failure leaves the buffer at the
    /// largest capacity reached, the same as growing byte by byte would.
    fn grow_for(&mut self, additional: usize, limit: Option<usize>) -> Result<()> {
        let needed = self.data.len() + additional + 1;

        while self.capacity < needed {
            let target = self.capacity.saturating_mul(2);
            if let Some(limit) = limit {
                if target > limit {
                    return Err(Error::CapacityExceeded { limit });
                }
            }

            tracing::trace!(from = self.capacity, to = target, "growing line buffer");
            self.data.try_reserve_exact(target - self.data.len())?;
            self.capacity = target;
        }
        Ok(())
    }
}

/// Read one newline-terminated line into `buf`.
///
/// Returns the number of bytes read, newline included. The last line of a
/// stream may lack the newline. Fails with [`Error::EndOfInput`] when the
/// stream is already exhausted.
pub fn getline<R: BufRead + ?Sized>(buf: &mut LineBuffer, reader: &mut R) -> Result<usize> {
    getdelim(buf, NEWLINE, reader)
}

/// Read bytes up to and including `delimiter` into `buf`.
///
/// See [`getline`] for the return value and failure modes.
pub fn getdelim<R: BufRead + ?Sized>(
    buf: &mut LineBuffer,
    delimiter: u8,
    reader: &mut R,
) -> Result<usize> {
    read_delimited(buf, delimiter, reader, None)
}

/// Read one line and return it by value.
///
/// Same terminator semantics as [`getline`]; each call allocates, so prefer
/// [`LineReader`] or a reused [`LineBuffer`] in loops.
pub fn read_line<R: BufRead + ?Sized>(reader: &mut R) -> Result<Vec<u8>> {
    let mut buf = LineBuffer::new();
    getline(&mut buf, reader)?;
    Ok(buf.into_vec())
}

fn read_delimited<R: BufRead + ?Sized>(
    buf: &mut LineBuffer,
    delimiter: u8,
    reader: &mut R,
    limit: Option<usize>,
) -> Result<usize> {
    // The replacement is visible to the caller even if the read then fails.
    let fresh = buf.capacity < MIN_CAPACITY;
    if fresh {
        buf.reallocate_minimum()?;
    }
    buf.data.clear();

    match fill_line(buf, delimiter, reader, limit) {
        Ok(0) => Err(Error::EndOfInput),
        Ok(n) => {
            // grow_for always left room for this byte
            buf.data.push(0);
            Ok(n)
        },
        Err(e) => {
            buf.data.clear();
            if fresh && e.is_allocation_failure() {
                tracing::debug!("releasing line buffer allocated by failed read");
                buf.release();
            }
            Err(e)
        },
    }
}

/// Append stream bytes to `buf` until `delimiter` or end of input.
///
/// Consumes exactly the bytes of the line from `reader`; anything after the
/// delimiter stays buffered for the next call. When the buffer cannot grow,
/// the bytes that fit plus the one that did not are consumed, which is what
/// a byte-at-a-time reader loses, whatever the chunk size.
fn fill_line<R: BufRead + ?Sized>(
    buf: &mut LineBuffer,
    delimiter: u8,
    reader: &mut R,
    limit: Option<usize>,
) -> Result<usize> {
    loop {
        let (used, outcome) = {
            let available = match reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                return Ok(buf.data.len());
            }

            let (done, chunk) = match available.iter().position(|&b| b == delimiter) {
                Some(i) => (true, &available[..=i]),
                None => (false, available),
            };
            match buf.grow_for(chunk.len(), limit) {
                Ok(()) => {
                    buf.data.extend_from_slice(chunk);
                    (chunk.len(), done.then_some(Ok(())))
                },
                Err(e) => {
                    // chunk.len() > room, so this never runs past the chunk
                    let room = buf.capacity.saturating_sub(buf.data.len() + 1);
                    (room + 1, Some(Err(e)))
                },
            }
        };
        reader.consume(used);

        match outcome {
            Some(Ok(())) => return Ok(buf.data.len()),
            Some(Err(e)) => return Err(e),
            None => {},
        }
    }
}

/// Reads delimited lines from a stream, reusing one buffer
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    buffer: LineBuffer,
    config: ReaderConfig,
    /// Set once the buffer failed to grow; iteration stops there
    exhausted: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Create a newline-delimited reader with no growth cap
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ReaderConfig::default())
    }

    /// Create a reader with the given configuration
    pub fn with_config(reader: R, config: ReaderConfig) -> Self {
        Self::with_buffer(reader, LineBuffer::new(), config)
    }

    /// Create a reader that starts from an existing buffer
    pub fn with_buffer(reader: R, buffer: LineBuffer, config: ReaderConfig) -> Self {
        Self {
            reader,
            buffer,
            config,
            exhausted: false,
        }
    }

    /// Read the next line, delimiter included.
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        let limit = self.config.effective_max_capacity();
        match read_delimited(
            &mut self.buffer,
            self.config.delimiter,
            &mut self.reader,
            limit,
        ) {
            Ok(_) => Ok(Some(self.buffer.as_bytes())),
            Err(Error::EndOfInput) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The buffer holding the most recent line
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Recover the underlying stream; unread bytes stay in it
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<Vec<u8>>;

    /// Yields a growth failure once, then ends.
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.next_line() {
            Ok(Some(line)) => Some(Ok(line.to_vec())),
            Ok(None) => None,
            Err(e) => {
                self.exhausted = e.is_allocation_failure();
                Some(Err(e))
            },
        }
    }
}
