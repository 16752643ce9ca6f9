//! Engine configuration.
//!
//! [`EngineConfig`] is plain serde data. Every field has a default, so a
//! config file only needs the values it changes:
//!
//! ```
//! use trial_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "move_ticks": 8, "headless": true }"#).unwrap();
//! assert_eq!(config.move_ticks, 8);
//! assert_eq!(config.tile_size, 50.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use trial_world::grid::{Bounds, Layout};
use trial_world::level::LevelOptions;

use crate::EngineError;

/// Tunables for the frame loop, layout and level rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pixel size of one grid tile.
    pub tile_size: f64,
    pub window_width: f64,
    pub window_height: f64,
    /// Length of a one-cell walk, in frames.
    pub move_ticks: u32,
    /// Length of the title fade, in frames.
    pub intro_ticks: u32,
    /// Pixel size of a drawn item.
    pub item_size: f64,
    /// Maximum nesting of signal sends before a level is aborted.
    pub max_cascade_depth: usize,
    /// Seed for item placement jitter.
    pub rng_seed: u64,
    /// No window: frames are built but not shown.
    pub headless: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: 50.0,
            window_width: 1280.0,
            window_height: 720.0,
            move_ticks: 5,
            intro_ticks: 60,
            item_size: 20.0,
            max_cascade_depth: 64,
            rng_seed: 0,
            headless: false,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// [`EngineError::Json`] on malformed JSON, [`EngineError::InvalidConfig`]
    /// if a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.move_ticks == 0 {
            return Err(EngineError::InvalidConfig(
                "move_ticks must be at least 1".to_owned(),
            ));
        }
        if !(self.item_size.is_finite() && self.item_size >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "item_size must be non-negative, got {}",
                self.item_size
            )));
        }
        if self.max_cascade_depth == 0 {
            return Err(EngineError::InvalidConfig(
                "max_cascade_depth must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// The level rules derived from this config.
    pub fn level_options(&self) -> LevelOptions {
        LevelOptions {
            seed: self.rng_seed,
            item_size: self.item_size,
            max_cascade_depth: self.max_cascade_depth,
        }
    }

    /// A layout centring a grid of `bounds` in the window.
    pub fn layout_for(&self, bounds: Bounds) -> Layout {
        Layout::centered(
            self.window_width,
            self.window_height,
            self.tile_size,
            bounds,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
