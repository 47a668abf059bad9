//! Run-length coding of the MTF ranks, ahead of the Huffman stage.
//!
//! Every packet starts with a two byte header holding a 15 bit length. If the high bit of the
//! first byte is set the packet is a RUN and one value byte follows, otherwise it is a LITERAL
//! and `length` verbatim bytes follow.
//!
//! RUN:     1LLLLLLL LLLLLLLL value
//! LITERAL: 0LLLLLLL LLLLLLLL byte * length
//!
use crate::error::{Error, Result};

/// Longest run or literal a single packet may carry.
pub const MAX_PACKET: usize = 16383;
/// Shortest repeat worth a RUN packet. Anything shorter is cheaper as literals.
pub const MIN_RUN: usize = 3;

const RUN_FLAG: u8 = 0x80;

/// Encode MTF ranks into RUN and LITERAL packets.
pub fn rle_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 16);
    let mut lit_start = 0_usize;
    let mut i = 0_usize;

    while i < data.len() {
        let value = data[i];
        let run = data[i..]
            .iter()
            .take(MAX_PACKET)
            .take_while(|&&b| b == value)
            .count();

        if run >= MIN_RUN {
            push_literals(&mut out, &data[lit_start..i]);
            out.push(RUN_FLAG | (run >> 8) as u8);
            out.push(run as u8);
            out.push(value);
            i += run;
            lit_start = i;
        } else {
            // Short repeats stay in the pending literal
            i += run;
        }
    }
    push_literals(&mut out, &data[lit_start..]);
    out
}

/// Write a pending literal stretch, splitting it into packets of at most MAX_PACKET bytes.
fn push_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_PACKET) {
        out.push((chunk.len() >> 8) as u8);
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
}

/// Decode RUN and LITERAL packets. `limit` is the number of bytes the caller expects; a stream
/// that tries to expand beyond it is rejected before any memory is spent on it.
pub fn rle_decode(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(limit);
    let mut i = 0_usize;

    while i < data.len() {
        if data.len() - i < 2 {
            return Err(Error::CorruptStream(format!(
                "truncated RLE packet header at offset {}",
                i
            )));
        }
        let marker = data[i];
        let len = ((marker & !RUN_FLAG) as usize) << 8 | data[i + 1] as usize;
        i += 2;

        if len == 0 {
            return Err(Error::CorruptStream(format!(
                "zero length RLE packet at offset {}",
                i - 2
            )));
        }
        if out.len() + len > limit {
            return Err(Error::CorruptStream(format!(
                "RLE stream expands past the declared {} bytes",
                limit
            )));
        }

        if marker & RUN_FLAG != 0 {
            let value = *data.get(i).ok_or_else(|| {
                Error::CorruptStream(format!("RLE run missing its value byte at offset {}", i))
            })?;
            i += 1;
            out.resize(out.len() + len, value);
        } else {
            if data.len() - i < len {
                return Err(Error::CorruptStream(format!(
                    "RLE literal wants {} bytes, only {} remain",
                    len,
                    data.len() - i
                )));
            }
            out.extend_from_slice(&data[i..i + len]);
            i += len;
        }
    }
    Ok(out)
}
