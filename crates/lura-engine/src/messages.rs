//! Message types for editor <-> worker communication.
//!
//! The editor sends jobs, the worker sends results back. Every job is
//! tagged with the [`Generation`] it was scheduled under.

use std::sync::Arc;

use lura_core::{PixelBuffer, Result};

use crate::state::{AdjustmentParameters, FilterSelection};

/// Generation counter for invalidating stale results.
pub type Generation = u64;

/// Everything a recompute needs, captured at scheduling time.
#[derive(Debug, Clone)]
pub struct RecomputeJob {
    /// Generation this job was scheduled under.
    pub generation: Generation,
    /// Shared source pixels.
    pub original: Arc<PixelBuffer>,
    /// Adjustment snapshot.
    pub params: AdjustmentParameters,
    /// Preset snapshot.
    pub selection: FilterSelection,
}

/// Messages from editor to worker.
#[derive(Debug)]
pub enum WorkerMsg {
    /// Recompute the derived buffer.
    Recompute(RecomputeJob),

    /// Stop the worker.
    Close,
}

/// Events from worker to editor.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A job ran to completion, failed, or was abandoned.
    Finished {
        /// Generation of the job.
        generation: Generation,
        /// New derived buffer or the reason there is none.
        result: Result<PixelBuffer>,
    },
}
