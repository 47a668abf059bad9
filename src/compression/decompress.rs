use log::{debug, info};
use rayon::prelude::*;

use super::compress_block::{decompress_block, BlockRecord};
use super::container::{ContainerRecord, Encoding};
use super::progress::{NoProgress, ProgressObserver, Stage, Tracker};
use crate::error::{Error, Result};
use crate::tools::options::Options;

const BLOCK_RANGE: (f64, f64) = (0.1, 0.95);

/// Decompress a container produced by `compress`.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with(data, &Options::default(), &mut NoProgress)
}

/// Decompress a container, reporting progress to `observer`. Every format parameter comes
/// from the container; only `options.parallel` is consulted.
pub fn decompress_with(
    data: &[u8],
    options: &Options,
    observer: &mut dyn ProgressObserver,
) -> Result<Vec<u8>> {
    let mut tracker = Tracker::new(observer);
    tracker.report(0.0, Stage::Setup);

    if data.is_empty() {
        tracker.done();
        return Ok(Vec::new());
    }

    let record = ContainerRecord::parse(data)?;
    tracker.report(0.05, Stage::Checksum);
    record.verify()?;

    let out = match record.encoding {
        Encoding::StoredRaw => {
            if record.payload.len() != record.original_len {
                return Err(Error::SizeMismatch {
                    expected: record.original_len,
                    actual: record.payload.len(),
                });
            }
            record.payload.to_vec()
        }
        Encoding::UniformByte => match record.payload {
            [byte] => vec![*byte; record.original_len],
            other => {
                return Err(Error::CorruptStream(format!(
                    "uniform payload holds {} bytes, expected 1",
                    other.len()
                )))
            }
        },
        Encoding::Bwt => decompress_blocks(&record, options, &mut tracker)?,
    };

    if out.len() != record.original_len {
        return Err(Error::SizeMismatch {
            expected: record.original_len,
            actual: out.len(),
        });
    }
    tracker.done();
    info!(
        "Decompressed {} bytes to {} ({:?})",
        data.len(),
        out.len(),
        record.encoding
    );
    Ok(out)
}

fn decompress_blocks(
    record: &ContainerRecord<'_>,
    options: &Options,
    tracker: &mut Tracker<'_>,
) -> Result<Vec<u8>> {
    let blocks = BlockRecord::parse_all(record.payload)?;
    // Check the declared sizes before anything is allocated for them
    let declared: usize = blocks.iter().map(|b| b.block_len).sum();
    if declared != record.original_len {
        return Err(Error::SizeMismatch {
            expected: record.original_len,
            actual: declared,
        });
    }
    let count = blocks.len();
    debug!("Decoding {} block(s)", count);

    let mut out = Vec::with_capacity(record.original_len);
    if options.parallel && count > 1 {
        // Blocks finish out of order, so only completions are reported
        let decoded: Vec<Result<Vec<u8>>> = blocks
            .par_iter()
            .map(|block| decompress_block(block, &mut |_, _| {}))
            .collect();
        for (seq, block) in decoded.into_iter().enumerate() {
            out.extend_from_slice(&block?);
            tracker.report_block(seq, count, 1.0, Stage::Sort, BLOCK_RANGE);
        }
    } else {
        for (seq, block) in blocks.iter().enumerate() {
            let decoded = decompress_block(block, &mut |step, stage| {
                tracker.report_block(seq, count, step, stage, BLOCK_RANGE)
            })?;
            out.extend_from_slice(&decoded);
        }
    }
    Ok(out)
}
