//! The tools module provides the helper stages and settings for bwzip.
//!
//! The tools are:
//! - cli: Command line interface for the bwzip binary.
//! - crc: CRC32 checksum of the container payload.
//! - freq_count: Byte frequency count and order-0 entropy.
//! - mtf: Move-To-Front transform.
//! - options: Job options and pipeline constants.
//! - rle: Run-Length-Encoding of the MTF output.
//!
pub mod cli;
pub mod crc;
pub mod freq_count;
pub mod mtf;
pub mod options;
pub mod rle;
