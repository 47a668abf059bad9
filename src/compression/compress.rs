use log::{debug, info, warn};
use rayon::prelude::*;

use super::compress_block::compress_block;
use super::container::{write_container, Encoding};
use super::progress::{NoProgress, ProgressObserver, Stage, Tracker};
use crate::error::{Error, Result};
use crate::tools::freq_count::{entropy, freqs};
use crate::tools::options::{Options, ENTROPY_SKIP_BITS, MIN_BLOCK_SIZE, RAW_THRESHOLD_PERCENT};

/*
    A job is one in-memory buffer. The encoding is picked once for the whole buffer:
    - a single repeated byte is stored as that byte,
    - very short input is stored raw, as is high entropy input when entropy_skip is set,
    - everything else is cut into blocks that each go through BWT, MTF, RLE and Huffman.
    If the block records end up within RAW_THRESHOLD_PERCENT of the input they are thrown
    away and the input is stored raw after all.
*/

/// Share of the progress range spent inside the block loop.
const BLOCK_RANGE: (f64, f64) = (0.05, 0.9);

/// Summary of a finished compression job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionStats {
    pub original_len: usize,
    pub compressed_len: usize,
    /// None for empty input, which produces no container at all
    pub encoding: Option<Encoding>,
}

impl CompressionStats {
    /// Compressed size over original size. 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 {
            0.0
        } else {
            self.compressed_len as f64 / self.original_len as f64
        }
    }
}

/// Compress `data` with default options.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with(data, &Options::default(), &mut NoProgress)
}

/// Compress `data`, reporting progress to `observer`.
pub fn compress_with(
    data: &[u8],
    options: &Options,
    observer: &mut dyn ProgressObserver,
) -> Result<Vec<u8>> {
    compress_with_stats(data, options, observer).map(|(out, _)| out)
}

/// Compress `data` and also return what the job did.
pub fn compress_with_stats(
    data: &[u8],
    options: &Options,
    observer: &mut dyn ProgressObserver,
) -> Result<(Vec<u8>, CompressionStats)> {
    let max = options.effective_max_input();
    if data.len() > max {
        return Err(Error::InputTooLarge {
            size: data.len(),
            max,
        });
    }

    let mut tracker = Tracker::new(observer);
    tracker.report(0.0, Stage::Setup);

    if data.is_empty() {
        tracker.done();
        return Ok((
            Vec::new(),
            CompressionStats {
                original_len: 0,
                compressed_len: 0,
                encoding: None,
            },
        ));
    }

    let (encoding, payload) = choose_payload(data, options, &mut tracker);

    tracker.report(0.92, Stage::Container);
    let out = write_container(data.len(), encoding, &payload);
    tracker.report(0.97, Stage::Checksum);
    tracker.done();

    let stats = CompressionStats {
        original_len: data.len(),
        compressed_len: out.len(),
        encoding: Some(encoding),
    };
    info!(
        "Compressed {} bytes to {} ({:?}, ratio {:.3})",
        stats.original_len,
        stats.compressed_len,
        encoding,
        stats.ratio()
    );
    Ok((out, stats))
}

/// Pick the encoding for a non-empty buffer and build its payload.
fn choose_payload(data: &[u8], options: &Options, tracker: &mut Tracker<'_>) -> (Encoding, Vec<u8>) {
    let first = data[0];
    if data.iter().all(|&b| b == first) {
        debug!("Input is {} copies of {:#04x}", data.len(), first);
        return (Encoding::UniformByte, vec![first]);
    }

    if data.len() < MIN_BLOCK_SIZE {
        debug!("Input of {} bytes is too short to transform", data.len());
        return (Encoding::StoredRaw, data.to_vec());
    }

    if options.entropy_skip {
        let bits = entropy(&freqs(data));
        if bits > ENTROPY_SKIP_BITS {
            debug!("Input entropy is {:.3} bits per byte, storing raw", bits);
            return (Encoding::StoredRaw, data.to_vec());
        }
    }

    let payload = compress_blocks(data, options, tracker);
    if payload.len() * 100 >= data.len() * RAW_THRESHOLD_PERCENT {
        warn!(
            "Block records came to {} bytes for {} input bytes, storing raw instead",
            payload.len(),
            data.len()
        );
        return (Encoding::StoredRaw, data.to_vec());
    }
    (Encoding::Bwt, payload)
}

/// Cut `data` into blocks and concatenate their records. The parallel path produces the same
/// bytes as the sequential one.
fn compress_blocks(data: &[u8], options: &Options, tracker: &mut Tracker<'_>) -> Vec<u8> {
    let block_size = options.effective_block_size();
    let blocks: Vec<&[u8]> = data.chunks(block_size).collect();
    let count = blocks.len();
    info!(
        "Compressing {} bytes as {} block(s) of up to {} bytes",
        data.len(),
        count,
        block_size
    );

    let mut payload = Vec::with_capacity(data.len() / 2);
    if options.parallel && count > 1 {
        let records: Vec<Vec<u8>> = blocks
            .par_iter()
            .map(|block| {
                let mut out = Vec::new();
                compress_block(block, options, &mut out, &mut |_, _| {});
                out
            })
            .collect();
        for (seq, record) in records.iter().enumerate() {
            tracker.report_block(seq, count, 1.0, Stage::Huffman, BLOCK_RANGE);
            payload.extend_from_slice(record);
        }
    } else {
        for (seq, block) in blocks.iter().enumerate() {
            compress_block(block, options, &mut payload, &mut |step, stage| {
                tracker.report_block(seq, count, step, stage, BLOCK_RANGE)
            });
        }
    }
    payload
}
