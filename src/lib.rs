//! Block-sorting compressor for in-memory buffers.
//!
//! Version 0.1.0
//!
//! Each block goes through the Burrows-Wheeler Transform, Move-To-Front, Run-Length-Encoding
//! and canonical Huffman coding. The result is framed in a small container with a CRC32 of the
//! payload. Inputs that are a single repeated byte, very short, or incompressible are stored in
//! cheaper forms, so the output is never much larger than the input.
//!
//! Blocks can be compressed across the rayon pool, and a job can run on its own thread while
//! reporting progress over a channel.
//!
//! Basic usage:
//!
//! ```
//! let data = b"how much wood would a woodchuck chuck if a woodchuck could chuck wood".repeat(10);
//! let packed = bwzip::compress(&data).unwrap();
//! assert_eq!(bwzip::decompress(&packed).unwrap(), data);
//! ```
//!
//! The `bwzip` binary wraps this for files:
//!
//! `$> bwzip -z test.txt`
//!
//! This will compress the file and create the file test.txt.bwz.
//!
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::{compress, compress_with, compress_with_stats, CompressionStats};
pub use compression::container::{ContainerRecord, Encoding};
pub use compression::decompress::{decompress, decompress_with};
pub use compression::progress::{
    spawn_compress, spawn_decompress, Job, NoProgress, ProgressEvent, ProgressObserver, Stage,
};
pub use error::{Error, Result};
pub use tools::options::{Options, SortAlgorithm};
