//! Recompute orchestrator.
//!
//! [`Editor`] owns the session: the [`EditState`], the undo history and a
//! background worker thread. Mutations are synchronous on the caller's
//! thread; each one bumps a generation counter and queues one recompute
//! job. Results travel back over a channel and are applied by
//! [`Editor::poll`] or [`Editor::wait_idle`]. Only a result whose
//! generation matches the current one is published; everything else is
//! dropped.
//!
//! # Example
//!
//! ```rust
//! use lura_core::{ChannelLayout, PixelBuffer};
//! use lura_engine::Editor;
//!
//! let mut editor = Editor::default();
//! let gray = PixelBuffer::filled(2, 2, ChannelLayout::Rgba, &[128, 128, 128, 255]).unwrap();
//! editor.load_image(gray).unwrap();
//!
//! editor.set_contrast(2.0).unwrap();
//! editor.wait_idle(None).unwrap();
//! assert_eq!(editor.export_derived().unwrap().pixel(0, 0), &[129, 129, 129, 255]);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use lura_core::{Error, PixelBuffer, Result};
use lura_ops::{blend, catalog, resize, transform, ExecOptions, Rotation};
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::history::{HistoryEntry, HistoryStack};
use crate::messages::{Generation, RecomputeJob, WorkerEvent, WorkerMsg};
use crate::observe::Broadcaster;
use crate::state::{Adjustment, AdjustmentParameters, EditSnapshot, EditState, FilterSelection};
use crate::worker::RecomputeWorker;

/// Non-destructive editing session.
pub struct Editor {
    /// Commands to the worker thread.
    tx: Sender<WorkerMsg>,
    /// Results from the worker thread.
    rx: Receiver<WorkerEvent>,
    /// Worker thread handle (Option for Drop).
    worker: Option<JoinHandle<()>>,

    state: EditState,
    history: HistoryStack,
    recent: VecDeque<Arc<PixelBuffer>>,

    /// Generation counter for stale result rejection.
    generation: Generation,
    /// Shared with the worker for cancellation between stages.
    latest: Arc<AtomicU64>,
    /// Bumped on every observable change.
    version: u64,
    observers: Broadcaster<EditSnapshot>,
    last_error: Option<Error>,

    config: EngineConfig,
    opts: ExecOptions,
}

impl Editor {
    /// Creates an editor with a validated `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::spawn(config))
    }

    fn spawn(config: EngineConfig) -> Self {
        let (tx_to_worker, rx_in_worker) = channel();
        let (tx_to_editor, rx_from_worker) = channel();
        let latest = Arc::new(AtomicU64::new(0));
        let opts = config.exec_options();

        let worker_latest = Arc::clone(&latest);
        let worker = thread::Builder::new()
            .name("lura-recompute".into())
            .spawn(move || {
                RecomputeWorker::new(rx_in_worker, tx_to_editor, worker_latest, opts).run();
            })
            .inspect_err(|e| warn!(error = %e, "failed to spawn recompute worker"))
            .ok();

        Self {
            tx: tx_to_worker,
            rx: rx_from_worker,
            worker,
            state: EditState::default(),
            history: HistoryStack::new(config.history_capacity),
            recent: VecDeque::with_capacity(config.recent_exports),
            generation: 0,
            latest,
            version: 0,
            observers: Broadcaster::new(),
            last_error: None,
            config,
            opts,
        }
    }

    // ---------------------------------------------------------------
    // Observation
    // ---------------------------------------------------------------

    /// Receives a snapshot after every observable change.
    pub fn subscribe(&mut self) -> Receiver<EditSnapshot> {
        self.observers.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> EditSnapshot {
        self.state.snapshot(self.version)
    }

    /// Change counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Current adjustments.
    pub fn params(&self) -> &AdjustmentParameters {
        &self.state.params
    }

    /// Current preset selection.
    pub fn selection(&self) -> &FilterSelection {
        &self.state.selection
    }

    /// Returns `true` while a recompute for the current parameters is
    /// outstanding.
    pub fn is_processing(&self) -> bool {
        self.state.is_processing
    }

    /// Undo history, oldest first.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Returns `true` if [`undo`](Self::undo) would do something.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Failure of the most recent job for the current generation, cleared
    /// by the next successful publish.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn publish(&mut self) {
        self.version += 1;
        let snapshot = self.state.snapshot(self.version);
        self.observers.publish(&snapshot);
    }

    // ---------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------

    /// Starts a new session on `buffer`.
    ///
    /// Parameters return to identity, history restarts with the identity
    /// baseline and any in-flight job is invalidated.
    pub fn load_image(&mut self, buffer: PixelBuffer) -> Result<()> {
        debug!(width = buffer.width(), height = buffer.height(), "load image");
        self.invalidate();
        self.state.load(buffer);
        self.history.clear();
        self.history.push(HistoryEntry::baseline());
        self.last_error = None;
        self.publish();
        Ok(())
    }

    /// Identity parameters, `derived = original`, empty history.
    pub fn reset(&mut self) -> Result<()> {
        self.state.require_original()?;
        debug!("reset");
        self.invalidate();
        self.state.reset();
        self.history.clear();
        self.last_error = None;
        self.publish();
        Ok(())
    }

    /// Rotates the source image and re-derives.
    ///
    /// The rotated image becomes the new original and the published
    /// derived buffer is rotated with it. History is cleared since earlier
    /// snapshots describe the old source; current parameters are kept.
    pub fn rotate(&mut self, rotation: Rotation) -> Result<()> {
        let original = Arc::new(transform::rotate(self.state.require_original()?, rotation)?);
        // Every stage commutes with quarter turns, so the rotated result
        // already matches the kept parameters.
        let derived = match self.state.derived.as_deref() {
            Some(derived) => Arc::new(transform::rotate(derived, rotation)?),
            None => Arc::clone(&original),
        };
        debug!(degrees = rotation.degrees(), "rotate source");
        self.state.original = Some(original);
        self.state.derived = Some(derived);
        self.history.clear();
        self.schedule()
    }

    // ---------------------------------------------------------------
    // Adjustments
    // ---------------------------------------------------------------

    /// Sets one adjustment, clamped to its range.
    pub fn set_adjustment(&mut self, adjustment: Adjustment, value: f32) -> Result<()> {
        self.state.require_original()?;
        self.state.params.set(adjustment, value)?;
        trace!(%adjustment, value = self.state.params.get(adjustment), "set adjustment");
        self.schedule()
    }

    /// Brightness, 0.0 - 2.0.
    pub fn set_brightness(&mut self, value: f32) -> Result<()> {
        self.set_adjustment(Adjustment::Brightness, value)
    }

    /// Contrast, 0.0 - 2.0.
    pub fn set_contrast(&mut self, value: f32) -> Result<()> {
        self.set_adjustment(Adjustment::Contrast, value)
    }

    /// Saturation, 0.0 - 2.0.
    pub fn set_saturation(&mut self, value: f32) -> Result<()> {
        self.set_adjustment(Adjustment::Saturation, value)
    }

    /// Warmth, -50 - 50.
    pub fn set_warmth(&mut self, value: f32) -> Result<()> {
        self.set_adjustment(Adjustment::Warmth, value)
    }

    /// Sharpen, 0.0 - 1.0.
    pub fn set_sharpen(&mut self, value: f32) -> Result<()> {
        self.set_adjustment(Adjustment::Sharpen, value)
    }

    /// Selects catalog preset `id`, keeping the current intensity.
    ///
    /// The selection before the change is pushed to history. Selecting the
    /// preset that is already selected does nothing.
    pub fn select_filter(&mut self, id: &str) -> Result<()> {
        self.state.require_original()?;
        let preset = catalog::lookup(id)?;
        if preset.id == self.state.selection.preset.id {
            return Ok(());
        }
        debug!(from = self.state.selection.preset.id, to = preset.id, "select filter");
        self.history.push(HistoryEntry {
            params: self.state.params,
            selection: self.state.selection,
        });
        self.state.selection.preset = preset;
        self.schedule()
    }

    /// Preset intensity, clamped to 0.0 - 1.0.
    pub fn set_filter_intensity(&mut self, intensity: f32) -> Result<()> {
        self.state.require_original()?;
        if intensity.is_nan() {
            return Err(Error::invalid_parameter("filter_intensity", "value is NaN"));
        }
        self.state.selection.intensity = intensity.clamp(0.0, 1.0);
        self.schedule()
    }

    /// Restores the newest history entry and re-derives.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyHistory`] without changing anything if there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<()> {
        self.state.require_original()?;
        let entry = self.history.pop()?;
        debug!(remaining = self.history.len(), "undo");
        self.state.params = entry.params;
        self.state.selection = entry.selection;
        self.schedule()
    }

    // ---------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------

    /// Last published derived buffer, remembered in the recent-export ring.
    ///
    /// Call [`wait_idle`](Self::wait_idle) first to export the result of
    /// the latest parameters.
    pub fn export_derived(&mut self) -> Result<Arc<PixelBuffer>> {
        let derived = self.state.derived.clone().ok_or(Error::NoSourceImage)?;
        if self.config.recent_exports > 0 {
            self.recent.push_front(Arc::clone(&derived));
            self.recent.truncate(self.config.recent_exports);
        }
        Ok(derived)
    }

    /// Recently exported buffers, newest first.
    pub fn recent_exports(&self) -> impl Iterator<Item = &Arc<PixelBuffer>> + '_ {
        self.recent.iter()
    }

    /// Downscaled copy of the derived buffer.
    pub fn thumbnail(&self, max_side: u32) -> Result<PixelBuffer> {
        let derived = self.state.derived.as_ref().ok_or(Error::NoSourceImage)?;
        resize::thumbnail(derived, max_side)
    }

    /// [`thumbnail`](Self::thumbnail) at the configured size.
    pub fn default_thumbnail(&self) -> Result<PixelBuffer> {
        self.thumbnail(self.config.thumbnail_size)
    }

    /// Thumbnail of the original with preset `id` at full intensity.
    pub fn preview_preset(&self, id: &str, max_side: u32) -> Result<PixelBuffer> {
        let original = self.state.require_original()?;
        let preset = catalog::lookup(id)?;
        let thumb = resize::thumbnail(original, max_side)?;
        Ok(blend::blend_with(&thumb, preset, 1.0, self.opts)?.into_owned())
    }

    // ---------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------

    /// Makes every outstanding job stale.
    fn invalidate(&mut self) {
        self.generation += 1;
        self.latest.store(self.generation, Ordering::Release);
        self.state.is_processing = false;
    }

    fn schedule(&mut self) -> Result<()> {
        let original = Arc::clone(self.state.require_original()?);
        self.invalidate();
        let job = RecomputeJob {
            generation: self.generation,
            original,
            params: self.state.params,
            selection: self.state.selection,
        };
        trace!(generation = job.generation, "schedule recompute");

        let sent = self.tx.send(WorkerMsg::Recompute(job));
        self.state.is_processing = sent.is_ok();
        self.publish();
        sent.map_err(|_| Error::WorkerUnavailable)
    }

    /// Applies finished results without blocking.
    ///
    /// Returns `true` if the published state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(event) => changed |= self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    changed |= self.worker_lost();
                    break;
                }
            }
        }
        changed
    }

    /// Blocks until the current generation has settled.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if `timeout` elapses first,
    /// [`Error::WorkerUnavailable`] if the worker has exited. A failed job
    /// is not an error here; see [`last_error`](Self::last_error).
    pub fn wait_idle(&mut self, timeout: Option<Duration>) -> Result<()> {
        let deadline = timeout.map(|t| Instant::now() + t);
        self.poll();
        while self.state.is_processing {
            let event = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(remaining) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => {
                            return Err(Error::Timeout {
                                generation: self.generation,
                            });
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            self.worker_lost();
                            return Err(Error::WorkerUnavailable);
                        }
                    }
                }
                None => match self.rx.recv() {
                    Ok(event) => event,
                    Err(_) => {
                        self.worker_lost();
                        return Err(Error::WorkerUnavailable);
                    }
                },
            };
            self.handle_event(event);
        }
        Ok(())
    }

    fn handle_event(&mut self, event: WorkerEvent) -> bool {
        let WorkerEvent::Finished { generation, result } = event;
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale result");
            return false;
        }

        match result {
            Ok(buffer) => {
                debug!(generation, "publishing derived buffer");
                self.state.derived = Some(Arc::new(buffer));
                self.last_error = None;
            }
            Err(e) => {
                warn!(generation, error = %e, "keeping previous derived buffer");
                self.last_error = Some(e);
            }
        }
        self.state.is_processing = false;
        self.publish();
        true
    }

    fn worker_lost(&mut self) -> bool {
        if !self.state.is_processing {
            return false;
        }
        warn!("recompute worker disconnected");
        self.state.is_processing = false;
        self.last_error = Some(Error::WorkerUnavailable);
        self.publish();
        true
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::spawn(EngineConfig::default())
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        // Running job bails out at its next stage boundary
        self.invalidate();
        let _ = self.tx.send(WorkerMsg::Close);

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lura_core::ChannelLayout;

    const WAIT: Option<Duration> = Some(Duration::from_secs(10));

    fn gray_editor() -> Editor {
        let mut editor = Editor::default();
        let gray = PixelBuffer::filled(4, 4, ChannelLayout::Rgba, &[128, 128, 128, 255]).unwrap();
        editor.load_image(gray).unwrap();
        editor
    }

    #[test]
    fn test_requires_image() {
        let mut editor = Editor::default();
        assert_eq!(editor.set_brightness(1.2), Err(Error::NoSourceImage));
        assert_eq!(editor.select_filter("warm"), Err(Error::NoSourceImage));
        assert_eq!(editor.undo(), Err(Error::NoSourceImage));
        assert_eq!(editor.reset(), Err(Error::NoSourceImage));
        assert!(editor.export_derived().is_err());
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_load_pushes_baseline() {
        let editor = gray_editor();
        assert!(editor.can_undo());
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.is_processing());
        assert!(editor.params().is_identity());
    }

    #[test]
    fn test_set_schedules_and_publishes() {
        let mut editor = gray_editor();
        editor.set_contrast(2.0).unwrap();
        assert!(editor.is_processing());
        editor.wait_idle(WAIT).unwrap();
        assert!(!editor.is_processing());
        let derived = editor.export_derived().unwrap();
        assert_eq!(derived.pixel(3, 3), &[129, 129, 129, 255]);
    }

    #[test]
    fn test_nan_leaves_state() {
        let mut editor = gray_editor();
        let version = editor.version();
        assert!(matches!(editor.set_warmth(f32::NAN), Err(Error::InvalidParameter { .. })));
        assert!(matches!(editor.set_filter_intensity(f32::NAN), Err(Error::InvalidParameter { .. })));
        assert_eq!(editor.version(), version);
        assert!(!editor.is_processing());
    }

    #[test]
    fn test_unknown_preset() {
        let mut editor = gray_editor();
        assert!(matches!(editor.select_filter("sepia"), Err(Error::InvalidParameter { .. })));
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_reselect_is_noop() {
        let mut editor = gray_editor();
        editor.select_filter("film").unwrap();
        let version = editor.version();
        editor.select_filter("film").unwrap();
        assert_eq!(editor.version(), version);
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_reset_invalidates_in_flight() {
        let mut editor = gray_editor();
        editor.set_brightness(0.2).unwrap();
        editor.reset().unwrap();
        assert!(!editor.is_processing());
        assert!(!editor.can_undo());
        editor.wait_idle(WAIT).unwrap();

        // Give a late result the chance to arrive; it must be dropped.
        thread::sleep(Duration::from_millis(50));
        editor.poll();
        let snap = editor.snapshot();
        assert!(Arc::ptr_eq(snap.original.as_ref().unwrap(), snap.derived.as_ref().unwrap()));
    }

    #[test]
    fn test_failed_job_keeps_previous_derived() {
        let mut editor = gray_editor();
        editor.set_brightness(1.5).unwrap();
        editor.wait_idle(WAIT).unwrap();
        let good = editor.export_derived().unwrap();

        // Simulate the worker reporting a failure for the current generation
        editor.set_brightness(0.5).unwrap();
        editor.wait_idle(WAIT).unwrap();
        editor.state.derived = Some(Arc::clone(&good));
        editor.generation += 1;
        editor.state.is_processing = true;
        let changed = editor.handle_event(WorkerEvent::Finished {
            generation: editor.generation,
            result: Err(Error::allocation_failed(usize::MAX, "simulated")),
        });
        assert!(changed);
        assert!(!editor.is_processing());
        assert!(editor.last_error().unwrap().is_allocation_error());
        assert!(Arc::ptr_eq(editor.snapshot().derived.as_ref().unwrap(), &good));

        // The next job still runs and clears the error
        editor.set_brightness(1.0).unwrap();
        editor.wait_idle(WAIT).unwrap();
        assert!(editor.last_error().is_none());
        assert_eq!(editor.export_derived().unwrap().pixel(0, 0), &[128, 128, 128, 255]);
    }

    #[test]
    fn test_stale_result_dropped() {
        let mut editor = gray_editor();
        let version = editor.version();
        let changed = editor.handle_event(WorkerEvent::Finished {
            generation: editor.generation() + 5,
            result: Ok(PixelBuffer::new(1, 1, ChannelLayout::Rgb).unwrap()),
        });
        assert!(!changed);
        assert_eq!(editor.version(), version);
        assert_eq!(editor.snapshot().derived.unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_recent_exports_ring() {
        let config = EngineConfig {
            recent_exports: 2,
            ..EngineConfig::default()
        };
        let mut editor = Editor::new(config).unwrap();
        editor
            .load_image(PixelBuffer::new(2, 2, ChannelLayout::Rgb).unwrap())
            .unwrap();
        let first = editor.export_derived().unwrap();
        editor.set_brightness(1.5).unwrap();
        editor.wait_idle(WAIT).unwrap();
        let second = editor.export_derived().unwrap();
        let third = editor.export_derived().unwrap();

        let recent: Vec<_> = editor.recent_exports().cloned().collect();
        assert_eq!(recent.len(), 2);
        assert!(Arc::ptr_eq(&recent[0], &third));
        assert!(Arc::ptr_eq(&recent[1], &second));
        assert!(!recent.iter().any(|b| Arc::ptr_eq(b, &first)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            history_capacity: 50,
            ..EngineConfig::default()
        };
        assert!(Editor::new(config).is_err());
    }
}
