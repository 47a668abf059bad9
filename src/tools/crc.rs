//! CRC32 (IEEE) checksum for the container payload.
//!
//! The checksum can be computed in one call with `do_crc`, or fed piece by piece through
//! `Crc32` when the payload is assembled block by block.

use crc32fast::Hasher;

/// Streaming CRC32 over a byte buffer.
#[derive(Clone, Default)]
pub struct Crc32 {
    hasher: Hasher,
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    /// Add more data to the running checksum.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Consume the checksum and return the final value.
    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

/// Continue a CRC from a previously returned value. Use 0 to start a new checksum.
pub fn do_crc(crc: u32, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(crc);
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod test {
    use super::{do_crc, Crc32};

    #[test]
    fn known_value_test() {
        // Standard CRC32 check value
        assert_eq!(do_crc(0, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn empty_test() {
        assert_eq!(do_crc(0, &[]), 0);
        assert_eq!(Crc32::new().finalize(), 0);
    }

    #[test]
    fn streaming_matches_one_shot_test() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let one_shot = do_crc(0, data);

        let mut crc = Crc32::new();
        for chunk in data.chunks(7) {
            crc.update(chunk);
        }
        assert_eq!(crc.finalize(), one_shot);

        let (a, b) = data.split_at(10);
        assert_eq!(do_crc(do_crc(0, a), b), one_shot);
    }

    #[test]
    fn single_byte_change_test() {
        let mut data = vec![0x55_u8; 1000];
        let before = do_crc(0, &data);
        data[500] ^= 0x01;
        assert_ne!(do_crc(0, &data), before);
    }
}
