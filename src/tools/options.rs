//! bwzip options - the settings that control one compression job.

pub use crate::bwt_algorithms::bwt_sort::SortAlgorithm;

/// Largest block the BWT stage will take in one piece (10 MiB).
pub const BLOCK_MAX: usize = 10_485_760;
/// Default block size. Smaller than BLOCK_MAX to bound rotation sort time and memory.
pub const DEFAULT_BLOCK_SIZE: usize = 5 * 1024 * 1024;
/// Absolute cap on the input of a single job (2 GiB).
pub const MAX_INPUT_SIZE: usize = 1 << 31;
/// Inputs shorter than this are stored as-is; the transform overhead cannot pay for itself.
pub const MIN_BLOCK_SIZE: usize = 64;
/// Compressed output at or above this percentage of the input is discarded for a raw copy.
pub const RAW_THRESHOLD_PERCENT: usize = 98;
/// Order-0 entropy (bits per byte) above which the transforms are not attempted.
pub const ENTROPY_SKIP_BITS: f64 = 7.5;

/// Defines all user settable options for a compression job
#[derive(Clone, Debug)]
pub struct Options {
    /// Maximum input block size handed to the BWT stage
    pub block_size: usize,
    /// Rotation ranking used by the BWT stage
    pub algorithm: SortAlgorithm,
    /// Take the Huffman histogram from a fixed stride sample on large blocks
    pub sample_histogram: bool,
    /// Skip the transforms for high entropy input and store it raw straight away. Off by default,
    /// since order-0 entropy cannot see repeats the block sort would find.
    pub entropy_skip: bool,
    /// Compress and decompress blocks across the rayon pool
    pub parallel: bool,
    /// Reject inputs larger than this (never more than MAX_INPUT_SIZE)
    pub max_input_size: usize,
}

impl Options {
    /// Instanciated on job start - sets default parameters
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            algorithm: SortAlgorithm::Doubling,
            sample_histogram: true,
            entropy_skip: false,
            parallel: false,
            max_input_size: MAX_INPUT_SIZE,
        }
    }

    /// Set the block size. Clamped to 1..=BLOCK_MAX.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.clamp(1, BLOCK_MAX);
        self
    }

    pub fn with_algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_sample_histogram(mut self, sample: bool) -> Self {
        self.sample_histogram = sample;
        self
    }

    pub fn with_entropy_skip(mut self, skip: bool) -> Self {
        self.entropy_skip = skip;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the input cap. Clamped to MAX_INPUT_SIZE.
    pub fn with_max_input_size(mut self, max: usize) -> Self {
        self.max_input_size = max.min(MAX_INPUT_SIZE);
        self
    }

    /// Block size actually used, whatever was written into the public field.
    pub(crate) fn effective_block_size(&self) -> usize {
        self.block_size.clamp(1, BLOCK_MAX)
    }

    /// Input cap actually used, whatever was written into the public field.
    pub(crate) fn effective_max_input(&self) -> usize {
        self.max_input_size.min(MAX_INPUT_SIZE)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_test() {
        let opts = Options::default();
        assert_eq!(opts.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(opts.algorithm, SortAlgorithm::Doubling);
        assert!(opts.sample_histogram);
        assert!(!opts.entropy_skip);
        assert!(!opts.parallel);
        assert_eq!(opts.max_input_size, MAX_INPUT_SIZE);
    }

    #[test]
    fn clamping_test() {
        assert_eq!(Options::new().with_block_size(0).block_size, 1);
        assert_eq!(
            Options::new().with_block_size(usize::MAX).block_size,
            BLOCK_MAX
        );
        assert_eq!(
            Options::new().with_max_input_size(usize::MAX).max_input_size,
            MAX_INPUT_SIZE
        );

        let mut opts = Options::new();
        opts.block_size = 0;
        assert_eq!(opts.effective_block_size(), 1);
    }
}
