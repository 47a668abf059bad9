//! The bitstream module packs and unpacks the Huffman bit sequences.
//!
//! Bits are written most significant first into an in-memory buffer. The last byte is padded
//! with zeros, and the reader is told how many symbols to take so the padding is never read as
//! data.
//!
//! These are not general purpose bit I/O routines; they only do what the Huffman coder needs.
pub mod bitpacker;
pub mod bitreader;
