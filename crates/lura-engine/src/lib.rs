//! # lura-engine
//!
//! Session layer of the Lura adjustment engine.
//!
//! - [`Editor`] - Owns edit state, undo history and the recompute worker
//! - [`EditState`], [`EditSnapshot`] - Parameters and buffers of a session
//! - [`HistoryStack`] - Bounded FIFO-evicting undo stack
//! - [`EngineConfig`] - RON-loadable tunables
//!
//! # Threading
//!
//! ```text
//! caller thread                      worker thread
//! -------------                      -------------
//! set_brightness() --WorkerMsg----->  coalesce queue
//!   generation += 1                   blend -> compose -> sharpen
//!                                     (checks latest generation
//!                                      between stages)
//! poll()/wait_idle() <--WorkerEvent-- Finished { generation, result }
//!   publish iff generation is current
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod editor;
pub mod history;
pub mod messages;
pub mod observe;
pub mod state;
pub mod worker;

pub use config::EngineConfig;
pub use editor::Editor;
pub use history::{HistoryEntry, HistoryStack, MAX_HISTORY};
pub use messages::Generation;
pub use state::{Adjustment, AdjustmentParameters, EditSnapshot, EditState, FilterSelection};

pub use lura_ops::Rotation;
