// KeyFinder: per-bar key estimates for a whole piece.
//
// Wraps the transition and emission models built from a `KeyFinderConfig`
// and runs the Viterbi decode with a uniform initial distribution. A finder
// holds no state between calls, so one instance can analyze many pieces and
// can be shared across threads.

use chromatone_theory::PitchClassSet;

use crate::config::KeyFinderConfig;
use crate::key::{KeyEstimate, NUM_STATES};
use crate::model::{EmissionModel, TransitionModel};
use crate::profile::KeyProfile;
use crate::viterbi::{uniform_log_initial, viterbi};

#[derive(Debug, Clone)]
pub struct KeyFinder {
    transition: TransitionModel,
    emission: EmissionModel,
    log_initial: [f64; NUM_STATES],
}

impl KeyFinder {
    pub fn new(config: &KeyFinderConfig) -> Self {
        KeyFinder {
            transition: TransitionModel::new(config.prob_same_state),
            emission: EmissionModel::new(
                KeyProfile::new(config.major_profile, config.profile_offset),
                KeyProfile::new(config.minor_profile, config.profile_offset),
            ),
            log_initial: uniform_log_initial(),
        }
    }

    pub fn transition(&self) -> &TransitionModel {
        &self.transition
    }

    pub fn emission(&self) -> &EmissionModel {
        &self.emission
    }

    /// Decoded state index per bar.
    pub fn decode(&self, bars: &[PitchClassSet]) -> Vec<usize> {
        viterbi(bars, &self.log_initial, &self.transition, &self.emission)
    }

    /// One key estimate per bar mask. Empty input gives an empty result.
    pub fn analyze(&self, bars: &[PitchClassSet]) -> Vec<KeyEstimate> {
        let keys: Vec<KeyEstimate> = self
            .decode(bars)
            .into_iter()
            .map(KeyEstimate::from_state)
            .collect();
        if log::log_enabled!(log::Level::Debug) {
            let changes = keys.windows(2).filter(|w| w[0] != w[1]).count();
            log::debug!("key finder: {} bars, {} key changes", keys.len(), changes);
        }
        keys
    }

    /// Key for a single bar considered on its own: the state with the highest
    /// emission probability.
    pub fn best_single(&self, bar: PitchClassSet) -> KeyEstimate {
        let column = self.emission.log_emission_column(bar);
        let mut best = 0;
        for (state, &v) in column.iter().enumerate() {
            if v > column[best] {
                best = state;
            }
        }
        KeyEstimate::from_state(best)
    }
}

impl Default for KeyFinder {
    fn default() -> Self {
        KeyFinder::new(&KeyFinderConfig::default())
    }
}
