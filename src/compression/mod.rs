//! The compression module drives a bwzip job from input bytes to container and back.
//!
//! Compression happens in the following steps, per block:
//! - Burrows Wheeler Transform: Sort the rotations of the block to group similar contexts.
//! - Move To Front transform: Turn recently seen bytes into small ranks, mostly zeros.
//! - Run Length Encoding: Collapse runs of 3 or more equal ranks into RUN packets.
//! - Huffman coding: Encode the packet stream with one canonical table per block.
//!
//! Before any of that, a job may pick a cheaper encoding for the whole input: a single repeated
//! byte, or the raw bytes when the input is tiny, looks random, or would not shrink.
//!
//! The block records are framed by the container, which adds a header and a CRC32 of the
//! payload.
//!
//! Decompression follows the inverse of the compression process, after the header and checksum
//! have been verified.
//! - Huffman decoding.
//! - RLE expansion.
//! - MTF reversal.
//! - BWT reversal.
//!

pub mod compress;
pub mod compress_block;
pub mod container;
pub mod decompress;
pub mod progress;
