//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use bwzip::tools::cli::{bwzopts_init, output_path, BwzOpts, Mode, Output};
use bwzip::{spawn_compress, spawn_decompress, ContainerRecord, Error, Job, Result};

use log::{error, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let opts = bwzopts_init();

    // Available log levels are Error, Warn, Info, Debug, Trace
    TermLogger::init(
        opts.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("Could not start the terminal logger");

    if let Err(e) = run(&opts) {
        error!("{}: {}", opts.file.display(), e);
        std::process::exit(1);
    }
    info!("Done.");
}

/// Figure out what we need to do and go do it
fn run(opts: &BwzOpts) -> Result<()> {
    let input = fs::read(&opts.file)?;
    info!("{} {} ({} bytes)", opts.op_mode, opts.file.display(), input.len());

    let output = match opts.op_mode {
        Mode::Zip => wait_logging(spawn_compress(input, opts.options.clone()))?,
        Mode::Unzip => wait_logging(spawn_decompress(input, opts.options.clone()))?,
        Mode::Test => {
            inspect(&input)?;
            wait_logging(spawn_decompress(input, opts.options.clone()))?;
            info!("{} is OK", opts.file.display());
            return Ok(());
        }
    };

    match opts.output {
        Output::Stdout => io::stdout().lock().write_all(&output)?,
        Output::File => {
            let path = output_path(&opts.file, opts.op_mode).ok_or_else(|| {
                Error::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "can't guess the output name, expected a .bwz file",
                ))
            })?;
            let mut f_out = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .create_new(!opts.force_overwrite)
                .open(&path)?;
            f_out.write_all(&output)?;
            info!("Wrote {} ({} bytes)", path.display(), output.len());
        }
    }

    if !opts.keep_input_files {
        fs::remove_file(&opts.file)?;
    }
    Ok(())
}

/// Check the container header and checksum before a test decode. An empty file is the archive
/// of an empty input and has no header.
fn inspect(input: &[u8]) -> Result<()> {
    if input.is_empty() {
        info!("Empty archive");
        return Ok(());
    }
    let record = ContainerRecord::open(input)?;
    info!(
        "{:?} container, version {}, {} original bytes",
        record.encoding, record.version, record.original_len
    );
    Ok(())
}

/// Log progress events as they arrive, then collect the job's output.
fn wait_logging(job: Job) -> Result<Vec<u8>> {
    for event in job.progress().iter() {
        info!("{:>5.1}% {}", event.fraction * 100.0, event.stage);
    }
    job.wait()
}
