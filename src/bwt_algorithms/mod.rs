//! The bwt_algorithms module holds the Burrows-Wheeler Transform for bwzip.
//!
//! The transform sorts every cyclic rotation of a block, which groups bytes that share a
//! following context. That makes runs of equal bytes far more likely, which the MTF and RLE
//! stages turn into small numbers.
//!
//! Ranking rotations is the expensive step. Two algorithms are provided: a comparison sort for
//! small blocks, and prefix doubling for everything else.
pub mod bwt_sort;
