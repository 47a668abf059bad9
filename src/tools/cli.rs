use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use clap::{ArgEnum, Parser};
use log::LevelFilter;

use super::options::{Options, SortAlgorithm, DEFAULT_BLOCK_SIZE};

/// File extension added on compression and stripped on decompression.
pub const EXTENSION: &str = "bwz";

/// Zip, Unzip, Test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}

/// Rotation sort choice on the command line
#[derive(ArgEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Comparison sort of rotations
    Simple,
    /// Prefix doubling rotation ranking
    Doubling,
}

impl From<Algorithm> for SortAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Simple => SortAlgorithm::Simple,
            Algorithm::Doubling => SortAlgorithm::Doubling,
        }
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A block-sorting compressor: BWT, MTF, RLE and canonical Huffman coding",
    long_about = "
    Compresses a file with the Burrows-Wheeler Transform, Move-To-Front, Run-Length-Encoding
    and one canonical Huffman table per block. The output is framed with a CRC32 of the
    payload, so damaged files are detected before any data is written."
)]
pub struct Args {
    /// Filename of file to process
    #[clap()]
    pub filename: String,

    /// Perform compression on the input file
    #[clap(short = 'z', long = "zip")]
    pub compress: bool,

    /// Perform decompression on the input file
    #[clap(short = 'd', long = "decompress")]
    pub decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    pub test: bool,

    /// Force overwriting output file
    #[clap(short = 'f', long = "force")]
    pub force: bool,

    /// Keep input file
    #[clap(short = 'k', long = "keep")]
    pub keep: bool,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    pub stdout: bool,

    /// Sets verbosity. -v shows warnings, -vv shows progress (debug builds), -vvvvv is chatty
    #[clap(short = 'v', parse(from_occurrences))]
    pub verbose: u8,

    /// Block size in bytes
    #[clap(long = "block-size", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Sort algorithm choice
    #[clap(long, arg_enum, default_value = "doubling")]
    pub algorithm: Algorithm,

    /// Compress and decompress blocks in parallel
    #[clap(long)]
    pub parallel: bool,
}

/// Settings for one run of the binary, resolved from the command line.
#[derive(Debug)]
pub struct BwzOpts {
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// File to read for input
    pub file: PathBuf,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Location where output is sent
    pub output: Output,
    /// Log level for the terminal logger
    pub log_level: LevelFilter,
    /// Options handed to the library
    pub options: Options,
}

impl From<Args> for BwzOpts {
    fn from(args: Args) -> Self {
        let op_mode = if args.test {
            Mode::Test
        } else if args.decompress {
            Mode::Unzip
        } else if args.compress {
            Mode::Zip
        } else if has_extension(Path::new(&args.filename)) {
            Mode::Unzip
        } else {
            Mode::Zip
        };

        Self {
            op_mode,
            file: PathBuf::from(args.filename),
            force_overwrite: args.force,
            keep_input_files: args.keep || args.stdout,
            output: if args.stdout {
                Output::Stdout
            } else {
                Output::File
            },
            log_level: level_filter(args.verbose),
            options: Options::new()
                .with_block_size(args.block_size)
                .with_algorithm(args.algorithm.into())
                .with_parallel(args.parallel),
        }
    }
}

/// Parse the command line into our internal structure.
pub fn bwzopts_init() -> BwzOpts {
    Args::parse().into()
}

/// Map the -v count onto a log level. Errors are shown unless asked otherwise.
pub fn level_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn has_extension(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == EXTENSION)
}

/// Name of the output file for `input` in the given mode. None when decompressing a file
/// without our extension.
pub fn output_path(input: &Path, mode: Mode) -> Option<PathBuf> {
    match mode {
        Mode::Zip => {
            let mut name = input.as_os_str().to_owned();
            name.push(".");
            name.push(EXTENSION);
            Some(PathBuf::from(name))
        }
        Mode::Unzip if has_extension(input) => Some(input.with_extension("")),
        Mode::Unzip | Mode::Test => None,
    }
}
