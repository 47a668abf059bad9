//! Progress reporting and background jobs.
//!
//! A job reports `(fraction, stage)` pairs to a `ProgressObserver`. Fractions never go
//! backwards, and every successful job ends with `(1.0, "done")`. Observers are plain
//! callbacks or crossbeam channel senders; a job spawned with `spawn_compress` or
//! `spawn_decompress` runs on its own thread and streams `ProgressEvent`s through a channel
//! until its result is collected with `Job::wait`.
//!
//! Dropping the receiver does not stop the job. It runs to completion and its events are
//! discarded.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::trace;

use crate::compression::{compress::compress_with, decompress::decompress_with};
use crate::error::Result;
use crate::tools::options::Options;

/// Pipeline stages, in the order a compression job visits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Sort,
    Mtf,
    Rle,
    Huffman,
    Container,
    Checksum,
    Done,
}

impl Stage {
    /// Stable label handed to observers.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Setup => "setup",
            Stage::Sort => "sort",
            Stage::Mtf => "mtf",
            Stage::Rle => "rle",
            Stage::Huffman => "huffman",
            Stage::Container => "container",
            Stage::Checksum => "checksum",
            Stage::Done => "done",
        }
    }
}

/// One progress report, as sent over a channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEvent {
    pub fraction: f64,
    pub stage: String,
}

/// Receives progress reports from a running job.
pub trait ProgressObserver {
    fn report(&mut self, fraction: f64, stage: &str);
}

impl<F> ProgressObserver for F
where
    F: FnMut(f64, &str),
{
    fn report(&mut self, fraction: f64, stage: &str) {
        self(fraction, stage)
    }
}

impl ProgressObserver for Sender<ProgressEvent> {
    fn report(&mut self, fraction: f64, stage: &str) {
        // A closed channel just means nobody is listening any more
        let _ = self.send(ProgressEvent {
            fraction,
            stage: stage.to_string(),
        });
    }
}

/// Observer that drops every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn report(&mut self, _fraction: f64, _stage: &str) {}
}

/// Wraps an observer so the reported fraction stays in [0, 1] and never decreases.
pub(crate) struct Tracker<'a> {
    observer: &'a mut dyn ProgressObserver,
    last: f64,
}

impl<'a> Tracker<'a> {
    pub(crate) fn new(observer: &'a mut dyn ProgressObserver) -> Self {
        Self {
            observer,
            last: 0.0,
        }
    }

    pub(crate) fn report(&mut self, fraction: f64, stage: Stage) {
        let fraction = if fraction.is_nan() {
            self.last
        } else {
            fraction.clamp(0.0, 1.0).max(self.last)
        };
        self.last = fraction;
        trace!("Progress {:.3} ({})", fraction, stage.label());
        self.observer.report(fraction, stage.label());
    }

    /// Report a stage inside block `block` of `blocks`, mapped onto [start, end).
    pub(crate) fn report_block(
        &mut self,
        block: usize,
        blocks: usize,
        step: f64,
        stage: Stage,
        (start, end): (f64, f64),
    ) {
        let blocks = blocks.max(1) as f64;
        let within = (block as f64 + step.clamp(0.0, 1.0)) / blocks;
        self.report(start + (end - start) * within, stage);
    }

    pub(crate) fn done(&mut self) {
        self.report(1.0, Stage::Done);
    }
}

/// A compression or decompression running on its own thread.
pub struct Job {
    handle: JoinHandle<Result<Vec<u8>>>,
    progress: Receiver<ProgressEvent>,
}

impl Job {
    /// Progress events, in the order the job reported them.
    pub fn progress(&self) -> &Receiver<ProgressEvent> {
        &self.progress
    }

    /// Block until the job finishes and return its output.
    pub fn wait(self) -> Result<Vec<u8>> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Compress `data` on a new thread.
pub fn spawn_compress(data: Vec<u8>, options: Options) -> Job {
    let (tx, rx) = unbounded();
    let handle = thread::spawn(move || {
        let mut tx = tx;
        compress_with(&data, &options, &mut tx)
    });
    Job {
        handle,
        progress: rx,
    }
}

/// Decompress `data` on a new thread.
pub fn spawn_decompress(data: Vec<u8>, options: Options) -> Job {
    let (tx, rx) = unbounded();
    let handle = thread::spawn(move || {
        let mut tx = tx;
        decompress_with(&data, &options, &mut tx)
    });
    Job {
        handle,
        progress: rx,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tracker_is_monotonic_test() {
        let mut seen = Vec::new();
        {
            let mut observer = |f: f64, s: &str| seen.push((f, s.to_string()));
            let mut tracker = Tracker::new(&mut observer);
            tracker.report(0.5, Stage::Sort);
            tracker.report(0.2, Stage::Mtf);
            tracker.report(7.0, Stage::Rle);
            tracker.report(f64::NAN, Stage::Huffman);
            tracker.done();
        }
        let fractions: Vec<f64> = seen.iter().map(|(f, _)| *f).collect();
        assert_eq!(fractions, vec![0.5, 0.5, 1.0, 1.0, 1.0]);
        assert_eq!(seen[1].1, "mtf");
        assert_eq!(seen.last().unwrap().1, "done");
    }

    #[test]
    fn block_mapping_test() {
        let mut seen = Vec::new();
        {
            let mut observer = |f: f64, _: &str| seen.push(f);
            let mut tracker = Tracker::new(&mut observer);
            tracker.report_block(0, 2, 0.0, Stage::Sort, (0.1, 0.9));
            tracker.report_block(1, 2, 0.0, Stage::Sort, (0.1, 0.9));
            tracker.report_block(1, 2, 1.0, Stage::Huffman, (0.1, 0.9));
        }
        assert!((seen[0] - 0.1).abs() < 1e-9);
        assert!((seen[1] - 0.5).abs() < 1e-9);
        assert!((seen[2] - 0.9).abs() < 1e-9);
    }

    #[test]
    fn channel_observer_test() {
        let (mut tx, rx) = unbounded();
        tx.report(0.25, "sort");
        drop(tx);
        let events: Vec<ProgressEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![ProgressEvent {
                fraction: 0.25,
                stage: "sort".to_string()
            }]
        );
    }

    #[test]
    fn closed_channel_test() {
        let (mut tx, rx) = unbounded::<ProgressEvent>();
        drop(rx);
        tx.report(0.5, "sort");
    }

    #[test]
    fn stage_labels_test() {
        let stages = [
            Stage::Setup,
            Stage::Sort,
            Stage::Mtf,
            Stage::Rle,
            Stage::Huffman,
            Stage::Container,
            Stage::Checksum,
            Stage::Done,
        ];
        let labels: Vec<&str> = stages.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec!["setup", "sort", "mtf", "rle", "huffman", "container", "checksum", "done"]
        );
    }
}
