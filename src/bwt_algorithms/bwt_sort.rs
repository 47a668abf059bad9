use crate::error::{Error, Result};
use log::{debug, trace};
use rayon::prelude::*;
/*
Both rotation sorts rank full cyclic rotations. A sampled or truncated comparison breaks
the total order on periodic data, so every comparison is allowed to run the whole block.
*/

/// Blocks at or below this size are always ranked with the simple comparison sort.
const SIMPLE_LIMIT: usize = 1024;
/// Above this size the simple sort is spread across the rayon pool.
const PARALLEL_SORT_LIMIT: usize = 40_000;

/// Rotation ranking algorithms used by the Burrows-Wheeler Transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortAlgorithm {
    /// Comparison sort of rotation offsets, comparing up to the full block length
    Simple,
    /// Prefix doubling over cyclic ranks with counting sorts, O(n log n)
    #[default]
    Doubling,
}

/// Output of the forward transform for one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BwtResult {
    /// Last column of the sorted rotation matrix
    pub permuted: Vec<u8>,
    /// Row of the sorted rotation matrix holding the original block
    pub index: u32,
}

/// Returns the offsets of all cyclic rotations of `data`, in ascending lexicographic order.
pub fn rotation_order(data: &[u8], algorithm: SortAlgorithm) -> Vec<u32> {
    match algorithm {
        SortAlgorithm::Simple => simple_order(data),
        SortAlgorithm::Doubling if data.len() <= SIMPLE_LIMIT => simple_order(data),
        SortAlgorithm::Doubling => doubling_order(data),
    }
}

/// Burrows-Wheeler-Transform of one block.
pub fn bwt_encode(data: &[u8], algorithm: SortAlgorithm) -> BwtResult {
    let n = data.len();
    let order = rotation_order(data, algorithm);

    // Get key and BWT output
    let mut index = 0_u32;
    let mut permuted = vec![0_u8; n];
    for (k, &offset) in order.iter().enumerate() {
        if offset == 0 {
            index = k as u32;
            permuted[k] = data[n - 1];
        } else {
            permuted[k] = data[offset as usize - 1];
        }
    }
    debug!("BWT of {} bytes, index is {}", n, index);
    BwtResult { permuted, index }
}

/// Decode a Burrows-Wheeler-Transform using the LF mapping.
pub fn bwt_decode(permuted: &[u8], index: u32) -> Result<Vec<u8>> {
    // Calculate end once.
    let end = permuted.len();
    if end == 0 && index == 0 {
        return Ok(Vec::new());
    }
    if index as usize >= end {
        return Err(Error::InvalidIndex { index, len: end });
    }

    // Convert frequency count to the start of each byte value in the sorted first column
    let mut counts = [0_usize; 256];
    permuted.iter().for_each(|&s| counts[s as usize] += 1);
    let mut next = [0_usize; 256];
    let mut sum = 0;
    for (n, c) in next.iter_mut().zip(counts.iter()) {
        *n = sum;
        sum += c;
    }

    // links[row in first column] = row in last column holding the same byte occurrence
    let mut links = vec![0_u32; end];
    for (i, &s) in permuted.iter().enumerate() {
        links[next[s as usize]] = i as u32;
        next[s as usize] += 1;
    }

    // The original block starts one step past its own row
    let mut current = links[index as usize] as usize;
    let mut row = current;
    let mut out = vec![0_u8; end];
    for byte in out.iter_mut() {
        row = current;
        *byte = permuted[row];
        current = links[row] as usize;
    }
    // The last byte of the block sits in the last column of its own row
    if row != index as usize {
        return Err(Error::IndexCycleError { position: end - 1 });
    }
    trace!("BWT decode of {} bytes from index {}", end, index);
    Ok(out)
}

/// Rank rotations with a comparison sort of offsets.
fn simple_order(data: &[u8]) -> Vec<u32> {
    // Create index into block. Index is u32, which should be more than enough
    let mut index = (0_u32..data.len() as u32).collect::<Vec<u32>>();

    // Identical rotations only exist for periodic blocks. Break ties on offset so the result
    // is deterministic.
    let compare = |a: &u32, b: &u32| block_compare(*a as usize, *b as usize, data).then(a.cmp(b));
    if data.len() > PARALLEL_SORT_LIMIT {
        index[..].par_sort_unstable_by(compare);
    } else {
        index[..].sort_unstable_by(compare);
    }
    index
}

/// compare the next two chunks of the original data to decide which sorts first
fn block_compare(a: usize, b: usize, block: &[u8]) -> std::cmp::Ordering {
    let min = std::cmp::min(block[a..].len(), block[b..].len());

    // Lexicographical comparison
    let mut result = block[a..a + min].cmp(&block[b..b + min]);

    // Implement wraparound if needed
    if result == std::cmp::Ordering::Equal {
        if a < b {
            let to_end = block.len() - a - min;
            result = block[(a + min)..].cmp(&block[..to_end]);
            if result == std::cmp::Ordering::Equal {
                let rest_of_block = block.len() - to_end - min;
                return block[..rest_of_block].cmp(&block[to_end..(to_end + rest_of_block)]);
            }
        } else {
            let to_end = block.len() - b - min;
            result = block[..to_end].cmp(&block[(b + min)..]);
            if result == std::cmp::Ordering::Equal {
                let rest_of_block = block.len() - to_end - min;
                return block[to_end..(to_end + rest_of_block)].cmp(&block[..rest_of_block]);
            }
        }
    }
    result
}

/// Rank rotations by prefix doubling. After the pass for width k the offsets are sorted by
/// their first 2k bytes (wrapping), so the loop ends once every class is distinct or the
/// width covers the whole block.
fn doubling_order(data: &[u8]) -> Vec<u32> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sa = vec![0_u32; n];
    let mut rank = vec![0_u32; n];
    let mut start = vec![0_u32; n.max(256)];

    // Bucket by first byte
    data.iter().for_each(|&b| start[b as usize] += 1);
    exclusive_prefix_sum(&mut start[..256]);
    for (i, &b) in data.iter().enumerate() {
        sa[start[b as usize] as usize] = i as u32;
        start[b as usize] += 1;
    }
    let mut classes = 1_usize;
    rank[sa[0] as usize] = 0;
    for j in 1..n {
        if data[sa[j] as usize] != data[sa[j - 1] as usize] {
            classes += 1;
        }
        rank[sa[j] as usize] = (classes - 1) as u32;
    }

    let mut by_second = vec![0_u32; n];
    let mut new_rank = vec![0_u32; n];
    let mut k = 1_usize;
    while classes < n && k < n {
        // Ordering by the second half is the current order shifted back by k
        for (dst, &p) in by_second.iter_mut().zip(sa.iter()) {
            *dst = ((p as usize + n - k) % n) as u32;
        }

        // Stable counting sort on the first half
        start[..classes].fill(0);
        by_second.iter().for_each(|&p| start[rank[p as usize] as usize] += 1);
        exclusive_prefix_sum(&mut start[..classes]);
        for &p in by_second.iter() {
            let r = rank[p as usize] as usize;
            sa[start[r] as usize] = p;
            start[r] += 1;
        }

        // Renumber classes on (first half, second half)
        let key = |p: u32| (rank[p as usize], rank[(p as usize + k) % n]);
        classes = 1;
        new_rank[sa[0] as usize] = 0;
        for j in 1..n {
            if key(sa[j]) != key(sa[j - 1]) {
                classes += 1;
            }
            new_rank[sa[j] as usize] = (classes - 1) as u32;
        }
        std::mem::swap(&mut rank, &mut new_rank);
        trace!("Doubling pass k={} found {} classes", k, classes);
        k <<= 1;
    }
    sa
}

fn exclusive_prefix_sum(counts: &mut [u32]) {
    let mut sum = 0_u32;
    for c in counts.iter_mut() {
        let t = *c;
        *c = sum;
        sum += t;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(data: &[u8], algorithm: SortAlgorithm) {
        let result = bwt_encode(data, algorithm);
        let back = bwt_decode(&result.permuted, result.index).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn banana_test() {
        let result = bwt_encode(b"banana", SortAlgorithm::Simple);
        // Rotations sorted: abanan, anaban, ananab, banana, nabana, nanaba
        assert_eq!(result.permuted, b"nnbaaa".to_vec());
        assert_eq!(result.index, 3);
        assert_eq!(bwt_decode(b"nnbaaa", 3).unwrap(), b"banana".to_vec());
    }

    #[test]
    fn order_matches_between_algorithms_test() {
        let data: Vec<u8> = (0..5000_u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        assert_eq!(doubling_order(&data), simple_order(&data));
    }

    #[test]
    fn periodic_input_test() {
        // Identical rotations: any tie order gives the same permuted output
        let data = b"abababababababab".repeat(100);
        let simple = bwt_encode(&data, SortAlgorithm::Simple);
        let doubling = bwt_encode(&data, SortAlgorithm::Doubling);
        assert_eq!(simple.permuted, doubling.permuted);
        round_trip(&data, SortAlgorithm::Simple);
        round_trip(&data, SortAlgorithm::Doubling);
    }

    #[test]
    fn uniform_input_test() {
        round_trip(&[7_u8; 3000], SortAlgorithm::Doubling);
        round_trip(&[7_u8; 300], SortAlgorithm::Simple);
    }

    #[test]
    fn tiny_inputs_test() {
        round_trip(&[], SortAlgorithm::Simple);
        round_trip(&[42], SortAlgorithm::Simple);
        round_trip(&[1, 0], SortAlgorithm::Doubling);
        let result = bwt_encode(&[], SortAlgorithm::Doubling);
        assert_eq!(result.index, 0);
        assert!(result.permuted.is_empty());
    }

    #[test]
    fn text_round_trip_test() {
        let data = "It was the best of times, it was the worst of times. ".repeat(200);
        round_trip(data.as_bytes(), SortAlgorithm::Doubling);
        round_trip(data.as_bytes(), SortAlgorithm::Simple);
    }

    #[test]
    fn invalid_index_test() {
        assert!(matches!(
            bwt_decode(b"nnbaaa", 6),
            Err(Error::InvalidIndex { index: 6, len: 6 })
        ));
        assert!(matches!(
            bwt_decode(&[], 1),
            Err(Error::InvalidIndex { index: 1, len: 0 })
        ));
    }

    #[test]
    fn broken_cycle_test() {
        // Links for "aba" split into the cycles {0} and {1, 2}
        assert!(matches!(
            bwt_decode(b"aba", 1),
            Err(Error::IndexCycleError { position: 2 })
        ));
        assert!(matches!(
            bwt_decode(b"aba", 2),
            Err(Error::IndexCycleError { position: 2 })
        ));
        // Every row of a single cycle decodes to some rotation
        assert_eq!(bwt_decode(b"nnbaaa", 0).unwrap(), b"abanan");
    }

    #[test]
    fn block_compare_wraps_test() {
        let block = b"abcab";
        // "abcab" vs "ababc": equal for two bytes, then 'c' > 'a'
        assert_eq!(block_compare(0, 3, block), std::cmp::Ordering::Greater);
        assert_eq!(block_compare(2, 2, block), std::cmp::Ordering::Equal);
    }
}
