use rayon::prelude::*;

/// Blocks longer than this may be sampled instead of fully counted.
pub const SAMPLE_THRESHOLD: usize = 1_000_000;

/// Returns a frequency count of the input data. Uses parallelism when data set is over 64k.
pub fn freqs(data: &[u8]) -> [u32; 256] {
    if data.len() > 64_000 {
        // 16k is pretty much the sweet spot for chunk size.
        data.par_chunks(16_000)
            .fold(
                || [0_u32; 256],
                |mut freqs, chunk| {
                    chunk.iter().for_each(|&el| freqs[el as usize] += 1);
                    freqs
                },
            )
            .reduce(
                || [0_u32; 256],
                |mut s, f| {
                    s.iter_mut().zip(f.iter()).for_each(|(a, b)| *a += b);
                    s
                },
            )
    } else {
        let mut freqs = [0_u32; 256];
        data.iter().for_each(|&el| freqs[el as usize] += 1);
        freqs
    }
}

/// Returns a frequency count taken at a fixed stride so that at most `SAMPLE_THRESHOLD`
/// bytes are counted. Every byte value present in the data gets a count of at least one,
/// even if the stride skipped over it, so the result can always drive a complete code.
pub fn sampled_freqs(data: &[u8]) -> [u32; 256] {
    if data.len() <= SAMPLE_THRESHOLD {
        return freqs(data);
    }
    let step = (data.len() + SAMPLE_THRESHOLD - 1) / SAMPLE_THRESHOLD;
    let mut freqs = [0_u32; 256];
    data.iter()
        .step_by(step)
        .for_each(|&el| freqs[el as usize] += 1);

    // Presence pass for anything the stride missed
    let mut present = [false; 256];
    data.iter().for_each(|&el| present[el as usize] = true);
    for (f, &p) in freqs.iter_mut().zip(present.iter()) {
        if p && *f == 0 {
            *f = 1;
        }
    }
    freqs
}

/// Order-0 Shannon entropy of a frequency table, in bits per byte.
pub fn entropy(freqs: &[u32; 256]) -> f64 {
    let total: u64 = freqs.iter().map(|&f| f as u64).sum();
    if total == 0 {
        return 0.0;
    }
    freqs
        .iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn small_count_test() {
        let f = freqs(b"abracadabra");
        assert_eq!(f[b'a' as usize], 5);
        assert_eq!(f[b'b' as usize], 2);
        assert_eq!(f[b'r' as usize], 2);
        assert_eq!(f[b'c' as usize], 1);
        assert_eq!(f[b'd' as usize], 1);
        assert_eq!(f.iter().sum::<u32>(), 11);
    }

    #[test]
    fn parallel_count_matches_test() {
        let data: Vec<u8> = (0..200_000_u32).map(|i| (i * 7 % 251) as u8).collect();
        let par = freqs(&data);
        let mut seq = [0_u32; 256];
        data.iter().for_each(|&b| seq[b as usize] += 1);
        assert_eq!(par, seq);
    }

    #[test]
    fn sampled_keeps_rare_symbols_test() {
        let mut data = vec![b'x'; 3_000_001];
        // A lone byte at an odd offset the stride will not land on
        data[1] = b'y';
        let f = sampled_freqs(&data);
        assert!(f[b'x' as usize] > 0);
        assert_eq!(f[b'y' as usize], 1);
        assert_eq!(f.iter().filter(|&&c| c > 0).count(), 2);
    }

    #[test]
    fn entropy_test() {
        let mut f = [0_u32; 256];
        assert_eq!(entropy(&f), 0.0);
        f[0] = 10;
        assert_eq!(entropy(&f), 0.0);
        f[1] = 10;
        assert!((entropy(&f) - 1.0).abs() < 1e-9);
        let uniform = [4_u32; 256];
        assert!((entropy(&uniform) - 8.0).abs() < 1e-9);
    }
}
