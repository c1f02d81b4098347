//! Engine configuration.
//!
//! Stored as RON. Missing fields take their defaults:
//!
//! ```ron
//! (
//!     history_capacity: 20,
//!     recent_exports: 6,
//!     thumbnail_size: 100,
//!     simd: true,
//!     parallel: true,
//! )
//! ```

use std::path::Path;

use lura_core::{Error, Result};
use lura_ops::ExecOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::MAX_HISTORY;

/// Default length of the recent-export ring.
pub const DEFAULT_RECENT_EXPORTS: usize = 6;

/// Default thumbnail long side, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 100;

/// Tunables for an [`Editor`](crate::Editor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Undo depth, 1..=20.
    pub history_capacity: usize,
    /// Number of exported buffers remembered.
    pub recent_exports: usize,
    /// Default thumbnail long side.
    pub thumbnail_size: u32,
    /// Evaluate color matrices with the SIMD kernel.
    pub simd: bool,
    /// Split rows across the Rayon pool. Ignored without the `parallel` feature.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: MAX_HISTORY,
            recent_exports: DEFAULT_RECENT_EXPORTS,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            simd: true,
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// Parses and validates RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a `.ron` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading engine config");
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        Self::from_ron_str(&text)
    }

    /// Serializes to pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Writes pretty RON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_ron_string()?;
        std::fs::write(path, text).map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_HISTORY).contains(&self.history_capacity) {
            return Err(Error::invalid_parameter(
                "history_capacity",
                format!("{} not in 1..={MAX_HISTORY}", self.history_capacity),
            ));
        }
        if self.thumbnail_size == 0 {
            return Err(Error::invalid_parameter("thumbnail_size", "must be positive"));
        }
        Ok(())
    }

    /// Pixel-kernel switches derived from this config.
    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            simd: self.simd,
            parallel: self.parallel && cfg!(feature = "parallel"),
        }
    }
}
