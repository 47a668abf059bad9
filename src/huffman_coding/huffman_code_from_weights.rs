//! This helper function is part of the huffman encoding system.
//!
//! It turns a symbol frequency table into code lengths (tree depths). The merge tree lives in an
//! arena of nodes addressed by index; a binary heap keyed on (weight, node index) picks the two
//! lightest nodes on each step, so ties go to whichever node was created first.
//!
//! Codes are capped at `MAX_CODE_LEN` bits. If the weights supplied create longer codes, the
//! weights are flattened and another attempt is made, as bzip2 does.
//!

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;

/// Longest code length we will hand to the bit packer.
pub const MAX_CODE_LEN: u8 = 24;

/// One node of the merge tree. Leaves carry `-1` in both child slots.
#[derive(Debug, Clone, Copy)]
struct Node {
    weight: u64,
    left: i32,
    right: i32,
    symbol: u8,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.left < 0
    }
}

/// Return per-symbol code lengths for every symbol with a non-zero weight. Symbols with a zero
/// weight get length 0. A lone symbol gets length 1.
pub fn code_len_from_weights(sym_weight: &[u32; 256]) -> [u8; 256] {
    let mut weight: Vec<(u64, u8)> = sym_weight
        .iter()
        .enumerate()
        .filter(|(_, &f)| f > 0)
        .map(|(i, &f)| (f as u64, i as u8))
        .collect();

    let mut lengths = [0_u8; 256];
    match weight.len() {
        0 => return lengths,
        1 => {
            lengths[weight[0].1 as usize] = 1;
            return lengths;
        }
        _ => {}
    }

    // We need to make codes of MAX_CODE_LEN bits or less. If we can't, we will adjust the
    // weights and try again.
    loop {
        let depth = build_tree(&weight, &mut lengths);
        if depth <= MAX_CODE_LEN {
            return lengths;
        }
        trace!(
            "Huffman tree depth {} exceeds {}, flattening weights",
            depth,
            MAX_CODE_LEN
        );
        // Adjust weights by dividing each weight by 2 and adding 1
        // This "flattens" the node tree. Then go try this again.
        for item in weight.iter_mut() {
            item.0 = 1 + item.0 / 2;
        }
        lengths = [0_u8; 256];
    }
}

/// Build the merge tree for `weight` and write each leaf depth into `lengths`.
/// Returns the depth of the deepest leaf.
fn build_tree(weight: &[(u64, u8)], lengths: &mut [u8; 256]) -> u8 {
    let mut arena: Vec<Node> = Vec::with_capacity(weight.len() * 2);
    let mut heap = BinaryHeap::with_capacity(weight.len());

    for &(w, symbol) in weight {
        heap.push(Reverse((w, arena.len())));
        arena.push(Node {
            weight: w,
            left: -1,
            right: -1,
            symbol,
        });
    }

    // Pull off the two lightest nodes and make a parent, until one node is left
    while let (Some(Reverse((_, left))), Some(Reverse((_, right)))) = (heap.pop(), heap.pop()) {
        let parent = Node {
            weight: arena[left].weight + arena[right].weight,
            left: left as i32,
            right: right as i32,
            symbol: 0,
        };
        heap.push(Reverse((parent.weight, arena.len())));
        arena.push(parent);
    }

    // The root is the last node created. Walk it without recursion.
    let mut deepest = 0_usize;
    let mut stack = vec![(arena.len() - 1, 0_usize)];
    while let Some((idx, depth)) = stack.pop() {
        let node = arena[idx];
        if node.is_leaf() {
            lengths[node.symbol as usize] = depth.min(u8::MAX as usize) as u8;
            deepest = deepest.max(depth);
        } else {
            stack.push((node.left as usize, depth + 1));
            stack.push((node.right as usize, depth + 1));
        }
    }
    deepest.min(u8::MAX as usize) as u8
}

#[cfg(test)]
mod test {
    use super::*;

    fn kraft_sum(lengths: &[u8; 256]) -> u64 {
        lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 1_u64 << (MAX_CODE_LEN - l))
            .sum()
    }

    #[test]
    fn two_symbols_test() {
        let mut w = [0_u32; 256];
        w[10] = 5;
        w[20] = 1;
        let lengths = code_len_from_weights(&w);
        assert_eq!(lengths[10], 1);
        assert_eq!(lengths[20], 1);
        assert_eq!(lengths.iter().filter(|&&l| l > 0).count(), 2);
    }

    #[test]
    fn classic_example_test() {
        // a:45 b:13 c:12 d:16 e:9 f:5
        let mut w = [0_u32; 256];
        for (s, f) in [(b'a', 45), (b'b', 13), (b'c', 12), (b'd', 16), (b'e', 9), (b'f', 5)] {
            w[s as usize] = f;
        }
        let lengths = code_len_from_weights(&w);
        assert_eq!(lengths[b'a' as usize], 1);
        assert_eq!(lengths[b'b' as usize], 3);
        assert_eq!(lengths[b'c' as usize], 3);
        assert_eq!(lengths[b'd' as usize], 3);
        assert_eq!(lengths[b'e' as usize], 4);
        assert_eq!(lengths[b'f' as usize], 4);
        assert_eq!(kraft_sum(&lengths), 1 << MAX_CODE_LEN);
    }

    #[test]
    fn empty_and_single_test() {
        assert_eq!(code_len_from_weights(&[0; 256]), [0; 256]);
        let mut w = [0_u32; 256];
        w[99] = 1000;
        let lengths = code_len_from_weights(&w);
        assert_eq!(lengths[99], 1);
    }

    #[test]
    fn depth_limit_test() {
        // Fibonacci weights build the deepest possible tree
        let mut w = [0_u32; 256];
        let (mut a, mut b) = (1_u32, 1_u32);
        for slot in w.iter_mut().take(40) {
            *slot = a;
            let next = a.saturating_add(b);
            a = b;
            b = next;
        }
        let lengths = code_len_from_weights(&w);
        assert!(lengths.iter().all(|&l| l <= MAX_CODE_LEN));
        assert_eq!(kraft_sum(&lengths), 1 << MAX_CODE_LEN);
    }

    #[test]
    fn full_alphabet_test() {
        let lengths = code_len_from_weights(&[1; 256]);
        assert!(lengths.iter().all(|&l| l == 8));
    }
}
