//! The container frames one compression job: a fixed 16 byte header, the payload, and a CRC32
//! of the payload.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "BWZ1"
//!      4     4  original length, little endian
//!      8     1  flags: bit0 BWT applied, bit1 uniform byte, bit2 stored raw
//!      9     1  format version
//!     10     6  reserved, zero
//!     16     n  payload
//!   16+n     4  crc32(payload), little endian
//! ```
//!
//! Exactly one flag bit is set. The checksum never covers the header.

use bitflags::bitflags;
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::tools::crc::{do_crc, Crc32};
use crate::tools::options::MAX_INPUT_SIZE;

pub const MAGIC: [u8; 4] = *b"BWZ1";
pub const FORMAT_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 16;
pub const CHECKSUM_LEN: usize = 4;

bitflags! {
    /// Container flag byte as it appears on the wire
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ContainerFlags: u8 {
        const BWT_APPLIED = 0b0000_0001;
        const UNIFORM_BYTE = 0b0000_0010;
        const STORED_RAW = 0b0000_0100;
    }
}

/// How the payload was produced. One value per job, so the flag bits stay exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// Block records (BWT, MTF, RLE, Huffman)
    Bwt,
    /// One byte, repeated original length times
    UniformByte,
    /// The input bytes, unchanged
    StoredRaw,
}

impl Encoding {
    pub fn flags(self) -> ContainerFlags {
        match self {
            Encoding::Bwt => ContainerFlags::BWT_APPLIED,
            Encoding::UniformByte => ContainerFlags::UNIFORM_BYTE,
            Encoding::StoredRaw => ContainerFlags::STORED_RAW,
        }
    }

    fn from_bits(bits: u8) -> Result<Self> {
        let flags = ContainerFlags::from_bits(bits)
            .ok_or_else(|| Error::CorruptHeader(format!("unknown flag bits {:#04x}", bits)))?;
        if flags == ContainerFlags::BWT_APPLIED {
            Ok(Encoding::Bwt)
        } else if flags == ContainerFlags::UNIFORM_BYTE {
            Ok(Encoding::UniformByte)
        } else if flags == ContainerFlags::STORED_RAW {
            Ok(Encoding::StoredRaw)
        } else {
            Err(Error::CorruptHeader(format!(
                "flags {:#04x} must name exactly one encoding",
                bits
            )))
        }
    }
}

/// Frame a payload. Called once per job, after the payload is complete.
pub fn write_container(original_len: usize, encoding: Encoding, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&(original_len as u32).to_le_bytes());
    out.push(encoding.flags().bits());
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&[0_u8; 6]);
    out.extend_from_slice(payload);

    let mut crc = Crc32::new();
    crc.update(payload);
    let checksum = crc.finalize();
    out.extend_from_slice(&checksum.to_le_bytes());
    debug!(
        "Container: {:?}, {} original bytes, {} payload bytes, crc {:#010x}",
        encoding,
        original_len,
        payload.len(),
        checksum
    );
    out
}

/// A parsed container. Borrows the payload from the input buffer.
#[derive(Debug, Clone, Copy)]
pub struct ContainerRecord<'a> {
    pub original_len: usize,
    pub encoding: Encoding,
    pub version: u8,
    pub payload: &'a [u8],
    pub checksum: u32,
}

impl<'a> ContainerRecord<'a> {
    /// Parse and validate the header fields, without touching the checksum. Magic is checked
    /// before any other field is trusted.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 4 || bytes[..4] != MAGIC {
            return Err(Error::CorruptHeader(format!(
                "bad magic {:02x?}",
                &bytes[..bytes.len().min(4)]
            )));
        }
        if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(Error::CorruptHeader(format!(
                "container of {} bytes is shorter than header and checksum",
                bytes.len()
            )));
        }

        let version = bytes[9];
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let original_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        if original_len == 0 || original_len > MAX_INPUT_SIZE {
            return Err(Error::CorruptHeader(format!(
                "implausible original length {}",
                original_len
            )));
        }

        let encoding = Encoding::from_bits(bytes[8])?;

        let trailer = bytes.len() - CHECKSUM_LEN;
        let checksum = u32::from_le_bytes([
            bytes[trailer],
            bytes[trailer + 1],
            bytes[trailer + 2],
            bytes[trailer + 3],
        ]);
        trace!(
            "Header: {:?}, version {}, {} original bytes",
            encoding,
            version,
            original_len
        );

        Ok(Self {
            original_len,
            encoding,
            version,
            payload: &bytes[HEADER_LEN..trailer],
            checksum,
        })
    }

    /// Parse the header, then check the payload against the trailer.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let record = Self::parse(bytes)?;
        record.verify()?;
        Ok(record)
    }

    /// Recompute the payload checksum and compare it with the trailer.
    pub fn verify(&self) -> Result<()> {
        let actual = do_crc(0, self.payload);
        if actual != self.checksum {
            return Err(Error::ChecksumMismatch {
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}
