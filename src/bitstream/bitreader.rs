//! BitReader: reads a packed, most significant bit first, bitstream back out of a byte slice.
//!
//! NOTE: The whole block is resident, so this reads straight from the slice rather than
//! refilling a buffer from an io source.
//!

const BIT_MASK: u8 = 0xff;

/// Reads bits from a Huffman bitstream.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    bit_index: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            bit_index: 0,
        }
    }

    /// Return bit as Option<u32> (1 or 0), or None if there is no more data to read
    #[inline(always)]
    pub fn bit(&mut self) -> Option<u32> {
        let byte = *self.buffer.get(self.cursor)?;
        let bit = (byte & BIT_MASK >> self.bit_index) >> (7 - self.bit_index);
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        Some(bit as u32)
    }

    /// Number of unread bits.
    pub fn remaining(&self) -> usize {
        (self.buffer.len() - self.cursor.min(self.buffer.len())) * 8 - self.bit_index
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}

#[cfg(test)]
mod test {
    use super::BitReader;

    #[test]
    fn basic_test() {
        let x = [0b10000001_u8];
        let mut br = BitReader::new(&x);
        assert_eq!(br.bit(), Some(1));
        assert_eq!(br.bit(), Some(0));
        assert_eq!(br.bit(), Some(0));
        assert_eq!(br.bit(), Some(0));
        assert_eq!(br.bit(), Some(0));
        assert_eq!(br.bit(), Some(0));
        assert_eq!(br.bit(), Some(0));
        assert_eq!(br.bit(), Some(1));
        assert_eq!(br.bit(), None);
    }

    fn take(br: &mut BitReader<'_>, n: usize) -> Option<usize> {
        (0..n).try_fold(0_usize, |acc, _| Some(acc << 1 | br.bit()? as usize))
    }

    #[test]
    fn multi_bit_test() {
        let x = [0b00011011];
        let mut br = BitReader::new(&x);
        assert_eq!(take(&mut br, 5), Some(3));
        assert_eq!(take(&mut br, 1), Some(0));
        assert_eq!(take(&mut br, 2), Some(3));
        assert_eq!(br.bit(), None);
        assert_eq!(br.remaining(), 0);
    }

    #[test]
    fn across_bytes_test() {
        let x = "Hello".as_bytes();
        let mut br = BitReader::new(x);
        assert_eq!(take(&mut br, 8), Some('H' as usize));
        assert_eq!(take(&mut br, 16), Some(('e' as usize) << 8 | 'l' as usize));
        assert_eq!(br.remaining(), 16);
    }

    #[test]
    fn loc_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        take(&mut br, 40);
        br.bit();
        assert_eq!(br.loc(), "[5.1]");
        assert_eq!(br.remaining(), 13 * 8 - 41);
    }
}
