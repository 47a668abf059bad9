//! The huffman module entropy codes the RLE stream of each block.
//!
//! Each block gets one canonical Huffman table built from its own symbol histogram. Only the
//! code lengths travel with the block, as (length, count) pairs; the decoder rebuilds the same
//! codes from them with the canonical assignment rule.
//!
//! Code lengths are capped at 24 bits so every code fits the bit packer in one write.
//!
//! Encoding and decoding a block is sequential. Parallelism, when asked for, happens one level
//! up, across blocks.

pub mod huffman;
pub mod huffman_code_from_weights;
