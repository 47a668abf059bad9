use log::{debug, trace};

use super::huffman_code_from_weights::{code_len_from_weights, MAX_CODE_LEN};
use crate::bitstream::bitpacker::BitPacker;
use crate::bitstream::bitreader::BitReader;
use crate::error::{Error, Result};
use crate::tools::freq_count::{freqs, sampled_freqs};

/// Case tags at the front of a serialized artifact (4 bytes, little endian).
const TAG_EMPTY: u32 = 0;
const TAG_UNIFORM: u32 = 1;
const TAG_CODED: u32 = 2;

/// Entropy coded form of one block's RLE stream.
///
/// Only the code lengths are stored. The canonical assignment rule rebuilds the exact table
/// the encoder used, so no codes are transmitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HuffmanArtifact {
    /// No symbols at all
    Empty,
    /// Exactly one distinct symbol, replicated `count` times on decode
    Uniform { symbol: u8 },
    /// Two or more distinct symbols
    Coded {
        lengths: [u8; 256],
        bitstream: Vec<u8>,
    },
}

impl HuffmanArtifact {
    /// Serialize the artifact: a 4 byte case tag, then the case's fields.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            HuffmanArtifact::Empty => TAG_EMPTY.to_le_bytes().to_vec(),
            HuffmanArtifact::Uniform { symbol } => {
                let mut out = TAG_UNIFORM.to_le_bytes().to_vec();
                out.push(*symbol);
                out
            }
            HuffmanArtifact::Coded { lengths, bitstream } => {
                let mut out = TAG_CODED.to_le_bytes().to_vec();
                out.extend(encode_lengths(lengths));
                out.extend_from_slice(bitstream);
                out
            }
        }
    }

    /// Parse an artifact written by `to_bytes`. The slice must hold exactly one artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::CorruptStream(
                "Huffman artifact shorter than its case tag".to_string(),
            ));
        }
        let tag = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let body = &bytes[4..];
        match tag {
            TAG_EMPTY if body.is_empty() => Ok(HuffmanArtifact::Empty),
            TAG_UNIFORM if body.len() == 1 => Ok(HuffmanArtifact::Uniform { symbol: body[0] }),
            TAG_CODED => {
                let (lengths, used) = decode_lengths(body)?;
                Ok(HuffmanArtifact::Coded {
                    lengths,
                    bitstream: body[used..].to_vec(),
                })
            }
            _ => Err(Error::CorruptStream(format!(
                "bad Huffman artifact (tag {}, {} body bytes)",
                tag,
                body.len()
            ))),
        }
    }
}

/// Huffman encode a block. With `sample` set, large blocks take their histogram from a fixed
/// stride sample, which can only cost compression ratio.
pub fn huf_encode(data: &[u8], sample: bool) -> HuffmanArtifact {
    let weights = if sample { sampled_freqs(data) } else { freqs(data) };
    let mut present = weights
        .iter()
        .enumerate()
        .filter(|(_, &f)| f > 0)
        .map(|(s, _)| s as u8);

    match (present.next(), present.next()) {
        (None, _) => return HuffmanArtifact::Empty,
        (Some(symbol), None) => return HuffmanArtifact::Uniform { symbol },
        _ => {}
    }

    let lengths = code_len_from_weights(&weights);
    let codes = canonical_codes(&lengths);
    trace!(
        "Code lengths: {:?}",
        lengths
            .iter()
            .enumerate()
            .filter(|(_, &l)| l > 0)
            .collect::<Vec<_>>()
    );

    let mut bw = BitPacker::new(data.len() / 2 + 1);
    for &symbol in data {
        bw.out24(codes[symbol as usize]);
    }
    bw.flush();
    debug!(
        "Huffman coded {} symbols into {} bytes ({} bits in last byte, ended at {})",
        data.len(),
        bw.output.len(),
        bw.last_bits,
        bw.loc()
    );

    HuffmanArtifact::Coded {
        lengths,
        bitstream: bw.output,
    }
}

/// Decode exactly `count` symbols from an artifact.
pub fn huf_decode(artifact: &HuffmanArtifact, count: usize) -> Result<Vec<u8>> {
    match artifact {
        HuffmanArtifact::Empty if count == 0 => Ok(Vec::new()),
        HuffmanArtifact::Empty => Err(Error::CorruptStream(format!(
            "empty Huffman artifact cannot produce {} symbols",
            count
        ))),
        HuffmanArtifact::Uniform { symbol } => Ok(vec![*symbol; count]),
        HuffmanArtifact::Coded { lengths, bitstream } => {
            // Every symbol costs at least one bit
            if count > bitstream.len() * 8 {
                return Err(Error::CorruptStream(format!(
                    "{} symbols cannot fit in {} bitstream bytes",
                    count,
                    bitstream.len()
                )));
            }
            let table = DecodeTable::new(lengths)?;
            table.decode(bitstream, count)
        }
    }
}

/// Assign canonical codes from code lengths. Symbols are ordered by (length, value); each code
/// is the previous one plus one, shifted left whenever the length grows.
///
/// Each entry holds the code length in the top byte and the code in the low 24 bits, which is
/// the form `BitPacker::out24` takes. Absent symbols are 0.
pub fn canonical_codes(lengths: &[u8; 256]) -> [u32; 256] {
    let mut order: Vec<(u8, u8)> = lengths
        .iter()
        .enumerate()
        .filter(|(_, &l)| l > 0)
        .map(|(s, &l)| (l, s as u8))
        .collect();
    order.sort_unstable();

    let mut codes = [0_u32; 256];
    let mut code = 0_u32;
    let mut cur_len = order.first().map(|&(l, _)| l).unwrap_or(0);
    for (len, symbol) in order {
        if len > cur_len {
            code <<= len - cur_len;
            cur_len = len;
        }
        codes[symbol as usize] = (len as u32) << 24 | code;
        code += 1;
    }
    codes
}

/// Encode the 256 code lengths as (length, count) byte pairs. Counts never exceed 255, so a
/// longer stretch starts a new pair.
fn encode_lengths(lengths: &[u8; 256]) -> Vec<u8> {
    let mut out = Vec::with_capacity(32);
    let mut current = lengths[0];
    let mut count = 1_u8;
    for &len in lengths.iter().skip(1) {
        if len == current && count < u8::MAX {
            count += 1;
        } else {
            out.push(current);
            out.push(count);
            current = len;
            count = 1;
        }
    }
    out.push(current);
    out.push(count);
    out
}

/// Decode (length, count) pairs until exactly 256 slots are filled. Returns the lengths and the
/// number of bytes consumed.
fn decode_lengths(bytes: &[u8]) -> Result<([u8; 256], usize)> {
    let mut lengths = [0_u8; 256];
    let mut slot = 0_usize;
    let mut used = 0_usize;
    while slot < 256 {
        let pair = bytes.get(used..used + 2).ok_or_else(|| {
            Error::CorruptStream(format!("code length table truncated at slot {}", slot))
        })?;
        let (len, count) = (pair[0], pair[1] as usize);
        used += 2;
        if count == 0 || slot + count > 256 {
            return Err(Error::CorruptStream(format!(
                "code length run of {} at slot {} does not fit 256 slots",
                count, slot
            )));
        }
        if len > MAX_CODE_LEN {
            return Err(Error::CorruptStream(format!(
                "code length {} exceeds the {} bit limit",
                len, MAX_CODE_LEN
            )));
        }
        lengths[slot..slot + count].fill(len);
        slot += count;
    }
    Ok((lengths, used))
}

/// Canonical decoding tables: per length, the first code, how many codes, and where that
/// length's symbols start in `symbols`.
struct DecodeTable {
    first: [u32; MAX_CODE_LEN as usize + 1],
    count: [u32; MAX_CODE_LEN as usize + 1],
    offset: [u32; MAX_CODE_LEN as usize + 1],
    symbols: Vec<u8>,
}

impl DecodeTable {
    fn new(lengths: &[u8; 256]) -> Result<Self> {
        let mut count = [0_u32; MAX_CODE_LEN as usize + 1];
        lengths
            .iter()
            .filter(|&&l| l > 0)
            .for_each(|&l| count[l as usize] += 1);

        // An over-subscribed table cannot come from a real tree
        let kraft: u64 = (1..=MAX_CODE_LEN as usize)
            .map(|l| (count[l] as u64) << (MAX_CODE_LEN as usize - l))
            .sum();
        if kraft > 1 << MAX_CODE_LEN {
            return Err(Error::CorruptStream(
                "code lengths are over-subscribed".to_string(),
            ));
        }

        let mut symbols: Vec<(u8, u8)> = lengths
            .iter()
            .enumerate()
            .filter(|(_, &l)| l > 0)
            .map(|(s, &l)| (l, s as u8))
            .collect();
        symbols.sort_unstable();

        let mut first = [0_u32; MAX_CODE_LEN as usize + 1];
        let mut offset = [0_u32; MAX_CODE_LEN as usize + 1];
        let mut code = 0_u32;
        let mut index = 0_u32;
        for len in 1..=MAX_CODE_LEN as usize {
            first[len] = code;
            offset[len] = index;
            code = (code + count[len]) << 1;
            index += count[len];
        }

        Ok(Self {
            first,
            count,
            offset,
            symbols: symbols.into_iter().map(|(_, s)| s).collect(),
        })
    }

    /// Walk the bitstream a bit at a time, emitting a symbol each time the accumulated bits
    /// form a complete code.
    fn decode(&self, bitstream: &[u8], count: usize) -> Result<Vec<u8>> {
        let mut br = BitReader::new(bitstream);
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let mut code = 0_u32;
            let mut len = 0_usize;
            loop {
                let bit = br.bit().ok_or_else(|| {
                    Error::CorruptStream(format!(
                        "bitstream ended after {} of {} symbols",
                        out.len(),
                        count
                    ))
                })?;
                code = code << 1 | bit;
                len += 1;
                if len > MAX_CODE_LEN as usize {
                    return Err(Error::CorruptStream(format!(
                        "no code matches the bits at {}",
                        br.loc()
                    )));
                }
                if code >= self.first[len] && code - self.first[len] < self.count[len] {
                    let idx = self.offset[len] + code - self.first[len];
                    out.push(self.symbols[idx as usize]);
                    break;
                }
            }
        }
        // Only the zero padding of the final byte may be left over
        if br.remaining() > 7 {
            return Err(Error::CorruptStream(format!(
                "{} unused bits after the last symbol",
                br.remaining()
            )));
        }
        Ok(out)
    }
}
