// Key finder configuration.
//
// Defaults reproduce the stock model: stay-in-key probability 0.8, logistic
// offset 4, and the major / harmonic-minor weight profiles. Every field has
// a default, so a JSON file only needs to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::profile::{DEFAULT_PROFILE_OFFSET, MAJOR_PROFILE, MINOR_PROFILE};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid key finder config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyFinderConfig {
    /// Probability of staying in the same key from one bar to the next.
    pub prob_same_state: f64,
    /// Subtracted from each weight before the logistic transform.
    pub profile_offset: f64,
    pub major_profile: [f64; 12],
    pub minor_profile: [f64; 12],
}

impl Default for KeyFinderConfig {
    fn default() -> Self {
        KeyFinderConfig {
            prob_same_state: 0.8,
            profile_offset: DEFAULT_PROFILE_OFFSET,
            major_profile: MAJOR_PROFILE,
            minor_profile: MINOR_PROFILE,
        }
    }
}

impl KeyFinderConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: KeyFinderConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.prob_same_state;
        if !(p > 0.0 && p < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "prob_same_state must be in (0, 1), got {p}"
            )));
        }
        if !self.profile_offset.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "profile_offset must be finite, got {}",
                self.profile_offset
            )));
        }
        for (name, profile) in [
            ("major_profile", &self.major_profile),
            ("minor_profile", &self.minor_profile),
        ] {
            if let Some(w) = profile.iter().find(|w| !w.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{name} has a non-finite weight {w}"
                )));
            }
        }
        Ok(())
    }
}
