// Tracker configuration: the tonal center a tracker starts from.
//
// Loaded from JSON alongside the key finder settings (see the CLI's
// `AnalysisConfig`). Missing fields fall back to C major.

use std::path::Path;

use chromatone_theory::bits::PITCH_CLASS_MASK;
use chromatone_theory::intervals::SCALE_DIATONIC_MAJOR;
use chromatone_theory::{PitchClass, PitchClassSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid tracker config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Pitch class of the tonal root, 0 = C.
    pub tonal_root: PitchClass,
    /// Scale mask relative to the root (bit 0 = root).
    pub scale: PitchClassSet,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            tonal_root: 0,
            scale: SCALE_DIATONIC_MAJOR,
        }
    }
}

impl TrackerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: TrackerConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tonal_root >= 12 {
            return Err(ConfigError::Invalid(format!(
                "tonal_root {} is not a pitch class",
                self.tonal_root
            )));
        }
        if self.scale & !PITCH_CLASS_MASK != 0 {
            return Err(ConfigError::Invalid(format!(
                "scale {:#x} has bits above the octave",
                self.scale
            )));
        }
        if self.scale & 1 == 0 {
            return Err(ConfigError::Invalid(format!(
                "scale {:#05x} does not contain its root",
                self.scale
            )));
        }
        Ok(())
    }
}
