//! Move-To-Front transform over the full 256 symbol alphabet.
//!
//! The recency list always starts in identity order (0..=255), so no symbol map needs to be
//! transmitted. Local repetition left behind by the BWT turns into runs of small ranks.

/// Recency list plus a position index so a symbol's rank is a lookup rather than a search.
struct Recency {
    list: [u8; 256],
    pos: [u8; 256],
}

impl Recency {
    fn new() -> Self {
        let mut list = [0_u8; 256];
        list.iter_mut().enumerate().for_each(|(i, s)| *s = i as u8);
        Self { list, pos: list }
    }

    /// Move the symbol at rank `idx` to the front, shifting everything ahead of it back one.
    #[inline(always)]
    fn promote(&mut self, idx: usize) {
        let sym = self.list[idx];
        self.list.copy_within(0..idx, 1);
        self.list[0] = sym;
        for (p, &s) in self.list.iter().enumerate().take(idx + 1) {
            self.pos[s as usize] = p as u8;
        }
    }
}

/// Encode data using the Move To Front transform. Returns one rank per input byte.
pub fn mtf_encode(data: &[u8]) -> Vec<u8> {
    let mut recency = Recency::new();
    let mut ranks = Vec::with_capacity(data.len());
    for &byte in data {
        let idx = recency.pos[byte as usize] as usize;
        ranks.push(idx as u8);
        if idx > 0 {
            recency.promote(idx);
        }
    }
    ranks
}

/// Decode Move To Front ranks back into bytes. Ranks are `u8`, so every rank is in range.
pub fn mtf_decode(ranks: &[u8]) -> Vec<u8> {
    let mut recency = Recency::new();
    let mut out = Vec::with_capacity(ranks.len());
    for &rank in ranks {
        let idx = rank as usize;
        out.push(recency.list[idx]);
        if idx > 0 {
            recency.promote(idx);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn simple_encode() {
        let input = "Baa baa".as_bytes();
        assert_eq!(mtf_encode(input), vec![66, 97, 0, 34, 98, 1, 0]);
    }

    #[test]
    fn repeats_become_zeros() {
        let input = [7_u8; 10];
        let out = mtf_encode(&input);
        assert_eq!(out[0], 7);
        assert!(out[1..].iter().all(|&r| r == 0));
    }

    #[test]
    fn encode_decode_book_example() {
        let input = "bbyaeeeeeeafeeeybzzzzzzzzzyz".as_bytes();
        let ranks = mtf_encode(input);
        assert_eq!(mtf_decode(&ranks), input);
    }

    #[test]
    fn all_symbols_round_trip() {
        let input: Vec<u8> = (0..=255_u8).chain(0..=255_u8).collect();
        let ranks = mtf_encode(&input);
        // The first pass leaves 0 at the back, so the second pass hits each one there
        assert!(ranks[256..].iter().all(|&r| r == 255));
        assert_eq!(mtf_decode(&ranks), input);
    }

    #[test]
    fn empty_test() {
        assert!(mtf_encode(&[]).is_empty());
        assert!(mtf_decode(&[]).is_empty());
    }
}
