//! Common data types used across the data_capture subsystem.

use std::fmt;

/// Count reported for a read that produced no data before its deadline.
pub const NO_DATA: isize = -1;

/// Result of one bounded read on a live byte source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were written to the front of the buffer. Zero is only
    /// produced by datagram sources (an empty datagram).
    Filled(usize),
    /// The read deadline passed without any byte arriving.
    TimedOut,
}

/// The reusable read buffer together with the count of valid bytes produced
/// by the last read.
#[derive(Debug, Clone, Copy)]
pub struct RawChunk<'a> {
    pub buffer: &'a [u8],
    /// Negative when the read produced no data.
    pub count: isize,
}

impl<'a> RawChunk<'a> {
    pub fn new(buffer: &'a [u8], count: isize) -> Self {
        Self { buffer, count }
    }

    pub fn from_outcome(buffer: &'a [u8], outcome: ReadOutcome) -> Self {
        let count = match outcome {
            ReadOutcome::Filled(n) => isize::try_from(n).unwrap_or(isize::MAX),
            ReadOutcome::TimedOut => NO_DATA,
        };
        Self { buffer, count }
    }
}

/// Owned, exact-length bytes of one captured unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One formatted output record: `<delimiter><timestamp_millis> <encoded>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub delimiter: String,
    pub timestamp_millis: i64,
    pub encoded: String,
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.delimiter, self.timestamp_millis, self.encoded)
    }
}
