use log::{debug, trace};

use crate::bwt_algorithms::bwt_sort::{bwt_decode, bwt_encode};
use crate::compression::progress::Stage;
use crate::error::{Error, Result};
use crate::huffman_coding::huffman::{huf_decode, huf_encode, HuffmanArtifact};
use crate::tools::mtf::{mtf_decode, mtf_encode};
use crate::tools::options::{Options, BLOCK_MAX};
use crate::tools::rle::{rle_decode, rle_encode};

/// Four u32 fields ahead of every artifact: block length, BWT index, symbol count, artifact
/// length.
pub const RECORD_HEADER_LEN: usize = 16;

/// Largest RLE stream a block of `block_len` bytes can produce. Literal packets cost two
/// header bytes per 16383 data bytes, so anything past this is corrupt.
fn max_symbols(block_len: usize) -> usize {
    block_len + block_len / 2 + 16
}

/// One block record as it sits in the payload. The artifact is borrowed from the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRecord<'a> {
    pub block_len: usize,
    pub index: u32,
    pub symbol_count: usize,
    pub artifact: &'a [u8],
}

impl<'a> BlockRecord<'a> {
    /// Append this record to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.block_len as u32).to_le_bytes());
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&(self.symbol_count as u32).to_le_bytes());
        out.extend_from_slice(&(self.artifact.len() as u32).to_le_bytes());
        out.extend_from_slice(self.artifact);
    }

    /// Split a payload into its block records. Only the record framing is checked here;
    /// the contents are validated when each block is decoded.
    pub fn parse_all(payload: &'a [u8]) -> Result<Vec<BlockRecord<'a>>> {
        let mut records = Vec::new();
        let mut rest = payload;
        while !rest.is_empty() {
            if rest.len() < RECORD_HEADER_LEN {
                return Err(Error::CorruptStream(format!(
                    "block record {} truncated in its header ({} bytes left)",
                    records.len(),
                    rest.len()
                )));
            }
            let field = |i: usize| {
                u32::from_le_bytes([rest[i * 4], rest[i * 4 + 1], rest[i * 4 + 2], rest[i * 4 + 3]])
            };
            let block_len = field(0) as usize;
            let index = field(1);
            let symbol_count = field(2) as usize;
            let artifact_len = field(3) as usize;

            if block_len == 0 || block_len > BLOCK_MAX {
                return Err(Error::CorruptStream(format!(
                    "block record {} declares {} bytes",
                    records.len(),
                    block_len
                )));
            }
            if symbol_count > max_symbols(block_len) {
                return Err(Error::CorruptStream(format!(
                    "block record {} declares {} RLE symbols for {} bytes",
                    records.len(),
                    symbol_count,
                    block_len
                )));
            }
            let body = &rest[RECORD_HEADER_LEN..];
            if artifact_len > body.len() {
                return Err(Error::CorruptStream(format!(
                    "block record {} artifact needs {} bytes, {} left",
                    records.len(),
                    artifact_len,
                    body.len()
                )));
            }
            records.push(BlockRecord {
                block_len,
                index,
                symbol_count,
                artifact: &body[..artifact_len],
            });
            rest = &body[artifact_len..];
        }
        trace!("Payload holds {} block records", records.len());
        Ok(records)
    }
}

/// Run one block through BWT, MTF, RLE and Huffman and append its record to `out`.
/// `on_stage` hears each stage as it starts, with the fraction of the block done so far.
pub fn compress_block(
    data: &[u8],
    options: &Options,
    out: &mut Vec<u8>,
    on_stage: &mut dyn FnMut(f64, Stage),
) {
    on_stage(0.0, Stage::Sort);
    let bwt = bwt_encode(data, options.algorithm);

    on_stage(0.5, Stage::Mtf);
    let ranks = mtf_encode(&bwt.permuted);

    on_stage(0.6, Stage::Rle);
    let rle = rle_encode(&ranks);

    on_stage(0.7, Stage::Huffman);
    let artifact = huf_encode(&rle, options.sample_histogram).to_bytes();

    BlockRecord {
        block_len: data.len(),
        index: bwt.index,
        symbol_count: rle.len(),
        artifact: &artifact,
    }
    .write(out);
    on_stage(1.0, Stage::Huffman);

    debug!(
        "Block of {} bytes: index {}, {} RLE symbols, {} byte artifact",
        data.len(),
        bwt.index,
        rle.len(),
        artifact.len()
    );
}

/// Undo `compress_block` for one record. `on_stage` hears the decode stages in the order they
/// run: huffman, rle, mtf, then sort for the inverse block sort.
pub fn decompress_block(
    record: &BlockRecord<'_>,
    on_stage: &mut dyn FnMut(f64, Stage),
) -> Result<Vec<u8>> {
    on_stage(0.0, Stage::Huffman);
    let artifact = HuffmanArtifact::from_bytes(record.artifact)?;
    let rle = huf_decode(&artifact, record.symbol_count)?;

    on_stage(0.4, Stage::Rle);
    let ranks = rle_decode(&rle, record.block_len)?;
    if ranks.len() != record.block_len {
        return Err(Error::SizeMismatch {
            expected: record.block_len,
            actual: ranks.len(),
        });
    }

    on_stage(0.5, Stage::Mtf);
    let permuted = mtf_decode(&ranks);

    on_stage(0.6, Stage::Sort);
    let block = bwt_decode(&permuted, record.index)?;
    on_stage(1.0, Stage::Sort);
    trace!("Decoded block of {} bytes", block.len());
    Ok(block)
}

#[cfg(test)]
mod test {
    use super::*;

    fn encode(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        compress_block(data, &Options::default(), &mut out, &mut |_, _| {});
        out
    }

    fn decode(record: &BlockRecord<'_>) -> Result<Vec<u8>> {
        decompress_block(record, &mut |_, _| {})
    }

    #[test]
    fn block_round_trip_test() {
        let data = "The quick brown fox jumps over the lazy dog. ".repeat(50);
        let out = encode(data.as_bytes());
        let records = BlockRecord::parse_all(&out).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].block_len, data.len());
        assert_eq!(decode(&records[0]).unwrap(), data.as_bytes());
    }

    #[test]
    fn stages_in_order_test() {
        let mut stages = Vec::new();
        let mut out = Vec::new();
        compress_block(b"abracadabra", &Options::default(), &mut out, &mut |f, s| {
            stages.push((f, s))
        });
        let labels: Vec<&str> = stages.iter().map(|(_, s)| s.label()).collect();
        assert_eq!(labels, vec!["sort", "mtf", "rle", "huffman", "huffman"]);
        assert!(stages.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn several_records_test() {
        let mut out = encode(b"first block of text");
        out.extend(encode(b"second block, rather different"));
        let records = BlockRecord::parse_all(&out).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(decode(&records[1]).unwrap(), b"second block, rather different");
    }

    #[test]
    fn truncated_record_test() {
        let out = encode(b"mississippi river banks");
        for cut in [3, RECORD_HEADER_LEN - 1, out.len() - 1] {
            assert!(matches!(
                BlockRecord::parse_all(&out[..cut]),
                Err(Error::CorruptStream(_))
            ));
        }
    }

    #[test]
    fn implausible_fields_test() {
        let mut out = encode(b"mississippi river banks");
        out[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            BlockRecord::parse_all(&out),
            Err(Error::CorruptStream(_))
        ));

        let mut out = encode(b"mississippi river banks");
        out[0..4].copy_from_slice(&((BLOCK_MAX + 1) as u32).to_le_bytes());
        assert!(matches!(
            BlockRecord::parse_all(&out),
            Err(Error::CorruptStream(_))
        ));
    }

    #[test]
    fn decode_stage_order_test() {
        let out = encode(b"she sells sea shells by the sea shore");
        let records = BlockRecord::parse_all(&out).unwrap();
        let mut stages = Vec::new();
        decompress_block(&records[0], &mut |fraction, stage| {
            stages.push((fraction, stage.label()))
        })
        .unwrap();
        assert_eq!(
            stages,
            [
                (0.0, "huffman"),
                (0.4, "rle"),
                (0.5, "mtf"),
                (0.6, "sort"),
                (1.0, "sort")
            ]
        );
    }

    #[test]
    fn bad_index_test() {
        let data = b"mississippi river banks";
        let mut out = encode(data);
        out[4..8].copy_from_slice(&(data.len() as u32).to_le_bytes());
        let records = BlockRecord::parse_all(&out).unwrap();
        assert!(matches!(
            decode(&records[0]),
            Err(Error::InvalidIndex { .. })
        ));
    }

    #[test]
    fn wrong_block_len_test() {
        let data = b"mississippi river banks";
        let mut out = encode(data);
        // Claim one byte more than the RLE stream holds
        out[0..4].copy_from_slice(&(data.len() as u32 + 1).to_le_bytes());
        let records = BlockRecord::parse_all(&out).unwrap();
        assert!(matches!(
            decode(&records[0]),
            Err(Error::SizeMismatch { .. })
        ));
    }
}
