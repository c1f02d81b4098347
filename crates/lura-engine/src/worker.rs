//! Background recompute worker.
//!
//! Runs the blend -> compose -> sharpen pipeline off the control thread.
//! Superseded work is skipped in two places: queued jobs are coalesced down
//! to the newest one before starting, and a running job checks the shared
//! latest generation between stages.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use lura_core::{Error, PixelBuffer, Result};
use lura_ops::blend::blend_with;
use lura_ops::compose::{apply_sharpen_with, apply_with, compose};
use lura_ops::ExecOptions;
use tracing::{debug, trace, warn};

use crate::messages::{Generation, RecomputeJob, WorkerEvent, WorkerMsg};
use crate::state::{AdjustmentParameters, FilterSelection};

/// Worker thread handler.
pub struct RecomputeWorker {
    rx: Receiver<WorkerMsg>,
    tx: Sender<WorkerEvent>,
    latest: Arc<AtomicU64>,
    opts: ExecOptions,
}

impl RecomputeWorker {
    /// Creates a worker reading jobs from `rx`.
    ///
    /// `latest` is the editor's current generation; jobs older than it are
    /// abandoned.
    pub fn new(
        rx: Receiver<WorkerMsg>,
        tx: Sender<WorkerEvent>,
        latest: Arc<AtomicU64>,
        opts: ExecOptions,
    ) -> Self {
        Self { rx, tx, latest, opts }
    }

    /// Main loop. Returns on [`WorkerMsg::Close`] or when the editor hangs up.
    pub fn run(self) {
        while let Ok(msg) = self.rx.recv() {
            let job = match msg {
                WorkerMsg::Close => break,
                WorkerMsg::Recompute(job) => job,
            };
            let Some(job) = self.coalesce(job) else { break };

            let generation = job.generation;
            let latest = &self.latest;
            let is_stale = || latest.load(Ordering::Acquire) != generation;
            let result = recompute_tagged(
                generation,
                &job.original,
                &job.params,
                &job.selection,
                self.opts,
                is_stale,
            )
            .inspect_err(|e| {
                if !e.is_benign() {
                    warn!(generation, error = %e, "recompute failed");
                }
            });

            if self.tx.send(WorkerEvent::Finished { generation, result }).is_err() {
                break;
            }
        }
        debug!("recompute worker shutdown");
    }

    /// Drains queued jobs, keeping only the newest.
    ///
    /// Returns `None` if a close request was queued behind `job`.
    fn coalesce(&self, mut job: RecomputeJob) -> Option<RecomputeJob> {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                WorkerMsg::Recompute(newer) => {
                    trace!(dropped = job.generation, kept = newer.generation, "coalesced job");
                    job = newer;
                }
                WorkerMsg::Close => return None,
            }
        }
        Some(job)
    }
}

/// Runs the adjustment pipeline on `original`.
///
/// 1. blend the selected preset at its intensity
/// 2. apply the fused brightness/contrast/saturation/warmth matrix
/// 3. sharpen, if requested
///
/// `is_stale` is polled between stages; when it returns `true` the job is
/// abandoned with [`Error::Cancelled`].
pub fn recompute<F>(
    original: &PixelBuffer,
    params: &AdjustmentParameters,
    selection: &FilterSelection,
    opts: ExecOptions,
    is_stale: F,
) -> Result<PixelBuffer>
where
    F: Fn() -> bool,
{
    recompute_tagged(0, original, params, selection, opts, is_stale)
}

fn recompute_tagged<F>(
    generation: Generation,
    original: &PixelBuffer,
    params: &AdjustmentParameters,
    selection: &FilterSelection,
    opts: ExecOptions,
    is_stale: F,
) -> Result<PixelBuffer>
where
    F: Fn() -> bool,
{
    let checkpoint = || {
        if is_stale() {
            trace!(generation, "abandoning superseded job");
            Err(Error::Cancelled { generation })
        } else {
            Ok(())
        }
    };

    checkpoint()?;
    let filtered = blend_with(original, selection.preset, selection.intensity, opts)?;

    checkpoint()?;
    let matrix = compose(params.brightness, params.contrast, params.saturation, params.warmth);
    let adjusted = match (matrix.is_identity(), filtered) {
        (true, filtered) => filtered.into_owned(),
        (false, Cow::Borrowed(src)) => apply_with(&matrix, src, opts)?,
        (false, Cow::Owned(src)) => apply_with(&matrix, &src, opts)?,
    };

    if params.sharpen > 0.0 {
        checkpoint()?;
        return apply_sharpen_with(&adjusted, params.sharpen, opts);
    }
    Ok(adjusted)
}
