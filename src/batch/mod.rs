//! Batch orchestration: resolve, acquire on a worker pool, package.
//!
//! ```text
//!   Batch ──resolve──▶ [Track; n] ──queue──▶ worker 1 ─┐
//!                                       ├──▶ worker 2 ─┼──▶ outcomes ──▶ tally ──▶ zip
//!                                       └──▶ worker k ─┘
//! ```
//!
//! The queue is filled once up front and never grows. Each worker takes one
//! track at a time and checks the cancellation token before every dequeue,
//! so a cancelled batch finishes the tracks in flight and stops there.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crossbeam_channel::{Receiver, unbounded};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::acquisition::AcquisitionEngine;
use crate::catalog::CatalogApi;
use crate::model::{Outcome, Progress, Track};
use crate::organizer::destination_for;
use crate::package::{self, PackageError};
use crate::reference::Batch;
use crate::resolver::{ResolveFailure, TrackResolver};

/// What the pool does with each track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Search, download, then tag
    Download,
    /// Tag files that are already on disk
    Retag,
}

/// Per-outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub tagged: usize,
    /// Includes tracks that were already on disk
    pub downloaded_untagged: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl Tally {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Tagged => tally.tagged += 1,
                Outcome::DownloadedUntagged(_) | Outcome::AlreadyPresent => {
                    tally.downloaded_untagged += 1
                }
                Outcome::NotFound => tally.not_found += 1,
                Outcome::Failed(_) => tally.failed += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.tagged + self.downloaded_untagged + self.not_found + self.failed
    }

    /// Whether any track ended up with an audio file
    pub fn has_audio(&self) -> bool {
        self.tagged + self.downloaded_untagged > 0
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tagged, {} downloaded without tags, {} not found, {} failed",
            self.tagged, self.downloaded_untagged, self.not_found, self.failed
        )
    }
}

/// Everything that happened to a batch.
#[derive(Debug)]
pub struct BatchReport {
    pub archive_key: String,
    pub tally: Tally,
    /// Outcomes of processed tracks, in resolution order
    pub outcomes: Vec<(Track, Outcome)>,
    pub resolution_failures: Vec<ResolveFailure>,
    /// Where the batch was packaged, if it was
    pub archive: Option<PathBuf>,
    /// Whether the batch stopped early
    pub cancelled: bool,
}

/// Runs batches end to end.
pub struct BatchRunner<C> {
    resolver: TrackResolver<C>,
    engine: AcquisitionEngine,
    workers: usize,
    archive_dir: Option<PathBuf>,
    cancel: CancellationToken,
}

impl<C: CatalogApi> BatchRunner<C> {
    pub fn new(resolver: TrackResolver<C>, engine: AcquisitionEngine, workers: usize) -> Self {
        Self {
            resolver,
            engine,
            workers: workers.max(1),
            archive_dir: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Package finished batches into this directory
    pub fn with_archive_dir(mut self, archive_dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(archive_dir.into());
        self
    }

    /// Stop dequeuing tracks once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve, download, tag and package a batch.
    ///
    /// Only packaging failures are returned as errors; everything else is
    /// part of the report.
    pub async fn run(&self, batch: &Batch) -> Result<BatchReport, PackageError> {
        let mut report = self.process(batch, Mode::Download).await;

        let Some(archive_dir) = &self.archive_dir else {
            return Ok(report);
        };

        if report.cancelled {
            tracing::warn!("Batch cancelled, leaving output unpackaged");
        } else if !report.tally.has_audio() {
            tracing::info!("No audio was downloaded, skipping packaging");
        } else {
            let root = self.engine.output_root().to_path_buf();
            let archive_dir = archive_dir.clone();
            let key = report.archive_key.clone();
            let archive = tokio::task::spawn_blocking(move || {
                package::archive_output(&root, &archive_dir, &key)
            })
            .await
            .map_err(|e| PackageError::Io {
                path: self.engine.output_root().to_path_buf(),
                source: std::io::Error::other(e),
            })??;
            report.archive = Some(archive);
        }

        Ok(report)
    }

    /// Resolve a batch and tag files already on disk, without downloading.
    pub async fn retag(&self, batch: &Batch) -> BatchReport {
        self.process(batch, Mode::Retag).await
    }

    async fn process(&self, batch: &Batch, mode: Mode) -> BatchReport {
        let resolution = self.resolver.resolve_batch(&batch.references).await;
        tracing::info!(
            "Resolved {} track(s) from {} reference(s)",
            resolution.tracks.len(),
            batch.references.len()
        );

        let outcomes = run_pool(
            &self.engine,
            resolution.tracks,
            self.workers,
            &self.cancel,
            mode,
        )
        .await;

        let tally = Tally::from_outcomes(outcomes.iter().map(|(_, outcome)| outcome));
        tracing::info!("Batch {}: {}", batch.archive_key, tally);

        BatchReport {
            archive_key: batch.archive_key.clone(),
            tally,
            outcomes,
            resolution_failures: resolution.failures,
            archive: None,
            cancelled: self.cancel.is_cancelled(),
        }
    }
}

struct Job {
    index: usize,
    track: Track,
}

/// Process `tracks` on `workers` concurrent tasks.
///
/// Tracks that map to a destination already queued are dropped, so no two
/// workers ever write the same file. Returns the outcome of every track that
/// was dequeued, in input order. A panic while processing a track is
/// recorded as [`Outcome::Failed`].
pub async fn run_pool(
    engine: &AcquisitionEngine,
    tracks: Vec<Track>,
    workers: usize,
    cancel: &CancellationToken,
    mode: Mode,
) -> Vec<(Track, Outcome)> {
    let tracks = unique_destinations(engine, tracks);
    let total = tracks.len();
    let (sender, receiver) = unbounded();
    for (index, track) in tracks.into_iter().enumerate() {
        // The receiver is alive, so sending cannot fail
        let _ = sender.send(Job { index, track });
    }
    drop(sender);

    let handles: Vec<_> = (0..workers.max(1).min(total.max(1)))
        .map(|worker| {
            tokio::spawn(worker_loop(
                worker,
                engine.clone(),
                receiver.clone(),
                cancel.clone(),
                total,
                mode,
            ))
        })
        .collect();

    let mut results: Vec<(usize, Track, Outcome)> = Vec::with_capacity(total);
    for joined in join_all(handles).await {
        match joined {
            Ok(done) => results.extend(done),
            Err(e) => tracing::error!("Worker task failed: {}", e),
        }
    }

    results.sort_by_key(|(index, _, _)| *index);
    results
        .into_iter()
        .map(|(_, track, outcome)| (track, outcome))
        .collect()
}

/// Keep the first track for each destination.
fn unique_destinations(engine: &AcquisitionEngine, tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|track| {
            let fresh = seen.insert(destination_for(engine.output_root(), track));
            if !fresh {
                tracing::debug!(
                    "Skipping duplicate {} - {}",
                    track.artists.join(", "),
                    track.title
                );
            }
            fresh
        })
        .collect()
}

async fn worker_loop(
    worker: usize,
    engine: AcquisitionEngine,
    queue: Receiver<Job>,
    cancel: CancellationToken,
    total: usize,
    mode: Mode,
) -> Vec<(usize, Track, Outcome)> {
    let mut done = Vec::new();

    loop {
        if cancel.is_cancelled() {
            tracing::debug!("Worker {} stopping: cancelled", worker);
            break;
        }
        let Ok(job) = queue.try_recv() else {
            break;
        };

        let progress = Progress {
            position: job.index + 1,
            total,
        };
        let outcome = process_track(&engine, job.track.clone(), progress, mode).await;
        done.push((job.index, job.track, outcome));
    }

    done
}

/// Run one track on its own task so a panic stays contained.
async fn process_track(
    engine: &AcquisitionEngine,
    track: Track,
    progress: Progress,
    mode: Mode,
) -> Outcome {
    let engine = engine.clone();
    let task = tokio::spawn(async move {
        match mode {
            Mode::Download => engine.acquire(&track, progress).await,
            Mode::Retag => engine.retag(&track, progress).await,
        }
    });

    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("{} Track task failed: {}", progress, e);
            Outcome::Failed(format!("track task failed: {}", e))
        }
    }
}

/// Default pool size: one worker per available core
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
