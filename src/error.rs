//! Error types shared by every stage of the compressor.
//!
//! All of these are terminal for the job that produced them. Decoding the same bytes again
//! cannot succeed, so nothing here is retried.

use thiserror::Error;

/// Result type for bwzip operations
pub type Result<T> = std::result::Result<T, Error>;

/// bwzip error types
#[derive(Error, Debug)]
pub enum Error {
    /// Input is larger than the absolute cap for a single job
    #[error("Input too large: {size} bytes exceeds the {max} byte limit")]
    InputTooLarge { size: usize, max: usize },

    /// Bad magic, implausible length, or an illegal flag combination
    #[error("Corrupt header: {0}")]
    CorruptHeader(String),

    /// Container was written by a format revision we do not understand
    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u8),

    /// Payload checksum does not match the trailer
    #[error("Checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Malformed block record, RLE packet, or Huffman bit sequence
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),

    /// BWT origin index outside the block
    #[error("Invalid BWT index {index} for a block of {len} bytes")]
    InvalidIndex { index: u32, len: usize },

    /// BWT link walk did not end on the row named by the index
    #[error("BWT link cycle broken at output position {position}")]
    IndexCycleError { position: usize },

    /// Decoded length disagrees with the declared length
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// IO error (binary only)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
