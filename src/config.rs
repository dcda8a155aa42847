//! Session configuration parameters
//!
//! All tunable parameters for a pet session. Values can be overridden
//! from a JSON file; anything the file omits keeps its default.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::stats::{CatchUpTable, TickOdds};

/// Core session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    // --- Timing ---
    /// Animation frame interval (milliseconds)
    pub frame_interval_ms: u32,
    /// Stat tick interval (milliseconds)
    pub logic_interval_ms: u32,
    /// Autosave interval (seconds)
    pub autosave_interval_secs: u32,
    /// Resolution of the session clock driving the scheduler (milliseconds)
    pub clock_resolution_ms: u32,
    /// How long a guess result stays on screen (milliseconds)
    pub result_display_ms: u32,
    /// How long a selected menu item stays highlighted (milliseconds)
    pub highlight_ms: u32,

    // --- Limits ---
    /// Lowest weight any rule may leave the pet at. A newborn lighter
    /// than this is raised to it on creation.
    pub weight_floor: u16,

    // --- Rules ---
    pub tick: TickOdds,
    pub offline: CatchUpTable,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // Timing
            frame_interval_ms: 500,
            logic_interval_ms: 1000,
            autosave_interval_secs: 60,
            clock_resolution_ms: 250,
            result_display_ms: 1000,
            highlight_ms: 1000,

            // Limits. The newborn weight, so a fresh pet loads unchanged.
            // Set 10 to keep play and the guessing game from thinning a
            // pet below 10.
            weight_floor: crate::pet::NEWBORN_WEIGHT,

            // Rules
            tick: TickOdds::default(),
            offline: CatchUpTable::default(),
        }
    }
}

impl SessionConfig {
    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10..=1000).contains(&self.clock_resolution_ms) {
            return Err(ConfigError::ValidationFailed(
                "clock_resolution_ms must be 10-1000",
            ));
        }
        if self.frame_interval_ms < self.clock_resolution_ms {
            return Err(ConfigError::ValidationFailed(
                "frame_interval_ms must be >= clock_resolution_ms",
            ));
        }
        if self.logic_interval_ms < self.clock_resolution_ms {
            return Err(ConfigError::ValidationFailed(
                "logic_interval_ms must be >= clock_resolution_ms",
            ));
        }
        if !(1..=3600).contains(&self.autosave_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "autosave_interval_secs must be 1-3600",
            ));
        }
        if !(1..=50).contains(&self.weight_floor) {
            return Err(ConfigError::ValidationFailed("weight_floor must be 1-50"));
        }
        let tiers = &self.offline.tiers;
        if tiers[0].after_hours != 0 {
            return Err(ConfigError::ValidationFailed(
                "offline.tiers must start at 0 hours",
            ));
        }
        if tiers
            .windows(2)
            .any(|w| w[1].after_hours <= w[0].after_hours || w[1].multiplier_pct < w[0].multiplier_pct)
        {
            return Err(ConfigError::ValidationFailed(
                "offline.tiers must be ascending in hours and multiplier",
            ));
        }
        if self.offline.fatal_after_hours == 0 {
            return Err(ConfigError::ValidationFailed(
                "offline.fatal_after_hours must be > 0",
            ));
        }
        Ok(())
    }

    /// Load from a JSON file, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("config: {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e.kind())),
        };
        let cfg: Self = serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("config: loaded {}", path.display());
        Ok(cfg)
    }

    /// Validate and write as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self).map_err(|_| ConfigError::Corrupted)?;
        std::fs::write(path, json).map_err(|e| ConfigError::Io(e.kind()))
    }
}
