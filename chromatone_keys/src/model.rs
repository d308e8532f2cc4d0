// Transition and emission models of the key HMM.
//
// Both models expose two typed accessors each: a scalar lookup for one
// (state, state) or (state, observation) pair, and a column lookup that
// returns all 24 values at once for the Viterbi inner loop. Log-domain
// variants exist alongside the probability-domain ones; the decoder only
// uses the log forms.
//
// Transition: a flat "keys rarely change" prior. Staying in the same key has
// probability `prob_same_state`; the remainder is spread evenly over the
// other 23 keys with no preference for related keys.
//
// Emission: a state (tonic, mode) emits an observed pitch-class mask with
// probability `Π_{r present} p(r - tonic) · Π_{r absent} (1 - p(r - tonic))`,
// with `p` from the mode's profile. The log form is computed with the
// shortcut `K_mode + Σ_{r present} (w(r - tonic) - offset)`; the full product
// is kept for tests and diagnostics.

use chromatone_theory::PitchClassSet;
use chromatone_theory::bits::pitch_classes;

use crate::key::{KeyEstimate, Mode, NUM_STATES};
use crate::profile::KeyProfile;

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionModel {
    prob_same_state: f64,
    prob_other_state: f64,
    log_same: f64,
    log_other: f64,
}

impl TransitionModel {
    pub fn new(prob_same_state: f64) -> Self {
        let prob_other_state = (1.0 - prob_same_state) / (NUM_STATES - 1) as f64;
        TransitionModel {
            prob_same_state,
            prob_other_state,
            log_same: prob_same_state.ln(),
            log_other: prob_other_state.ln(),
        }
    }

    pub fn prob_same_state(&self) -> f64 {
        self.prob_same_state
    }

    pub fn prob_other_state(&self) -> f64 {
        self.prob_other_state
    }

    /// P(next = `to` | current = `from`).
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        if from == to {
            self.prob_same_state
        } else {
            self.prob_other_state
        }
    }

    pub fn log_transition(&self, from: usize, to: usize) -> f64 {
        if from == to { self.log_same } else { self.log_other }
    }

    /// P(next = `to` | current = i) for every i.
    pub fn transition_column(&self, to: usize) -> [f64; NUM_STATES] {
        std::array::from_fn(|from| self.transition(from, to))
    }

    pub fn log_transition_column(&self, to: usize) -> [f64; NUM_STATES] {
        std::array::from_fn(|from| self.log_transition(from, to))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmissionModel {
    major: KeyProfile,
    minor: KeyProfile,
}

impl EmissionModel {
    pub fn new(major: KeyProfile, minor: KeyProfile) -> Self {
        EmissionModel { major, minor }
    }

    pub fn profile(&self, mode: Mode) -> &KeyProfile {
        match mode {
            Mode::Major => &self.major,
            Mode::Minor => &self.minor,
        }
    }

    /// Probability that `state` emits exactly the classes in `mask`, as the
    /// full product over all 12 classes.
    pub fn emission(&self, state: usize, mask: PitchClassSet) -> f64 {
        let key = KeyEstimate::from_state(state);
        let profile = self.profile(key.mode);
        (0..12)
            .map(|r| {
                let p = profile.presence(degree(r, key.tonic));
                if mask & (1 << r) != 0 { p } else { 1.0 - p }
            })
            .product()
    }

    /// Log emission via `K_mode + Σ_present (w - offset)`.
    pub fn log_emission(&self, state: usize, mask: PitchClassSet) -> f64 {
        let key = KeyEstimate::from_state(state);
        let profile = self.profile(key.mode);
        let weights = profile.weights();
        profile.log_all_absent()
            + pitch_classes(mask)
                .map(|r| weights[degree(r, key.tonic)] - profile.offset())
                .sum::<f64>()
    }

    /// Log emission as the sum of per-class log-probabilities.
    pub fn log_emission_product(&self, state: usize, mask: PitchClassSet) -> f64 {
        let key = KeyEstimate::from_state(state);
        let profile = self.profile(key.mode);
        (0..12)
            .map(|r| {
                let d = degree(r, key.tonic);
                if mask & (1 << r) != 0 {
                    profile.log_presence(d)
                } else {
                    profile.log_absence(d)
                }
            })
            .sum()
    }

    /// Emission probability of `mask` under every state.
    pub fn emission_column(&self, mask: PitchClassSet) -> [f64; NUM_STATES] {
        std::array::from_fn(|state| self.emission(state, mask))
    }

    pub fn log_emission_column(&self, mask: PitchClassSet) -> [f64; NUM_STATES] {
        std::array::from_fn(|state| self.log_emission(state, mask))
    }
}

impl Default for EmissionModel {
    fn default() -> Self {
        EmissionModel::new(KeyProfile::major(), KeyProfile::minor())
    }
}

/// Semitones from `tonic` up to pitch class `r`.
fn degree(r: u8, tonic: u8) -> usize {
    usize::from((r + 12 - tonic) % 12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transition_rows_sum_to_one() {
        let t = TransitionModel::new(0.8);
        for from in 0..NUM_STATES {
            let sum: f64 = (0..NUM_STATES).map(|to| t.transition(from, to)).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(t.prob_other_state(), 0.2 / 23.0);
    }

    #[test]
    fn test_transition_column_matches_scalar() {
        let t = TransitionModel::new(0.8);
        let col = t.transition_column(5);
        let log_col = t.log_transition_column(5);
        for (from, (&p, &lp)) in col.iter().zip(log_col.iter()).enumerate() {
            assert_eq!(p, t.transition(from, 5));
            assert_eq!(lp, t.log_transition(from, 5));
        }
        assert_eq!(col[5], 0.8);
    }

    #[test]
    fn test_emissions_sum_to_one_over_all_masks() {
        let e = EmissionModel::default();
        for state in [0, 7, 12, 21] {
            let total: f64 = (0..4096u16).map(|m| e.emission(state, m)).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_shortcut_matches_product_form() {
        let e = EmissionModel::default();
        for mask in (0..4096u16).step_by(37) {
            for state in 0..NUM_STATES {
                let shortcut = e.log_emission(state, mask);
                let product = e.log_emission_product(state, mask);
                assert_relative_eq!(shortcut, product, epsilon = 1e-9);
                assert_relative_eq!(shortcut.exp(), e.emission(state, mask), max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_c_major_triad_prefers_c_major_among_majors() {
        let e = EmissionModel::default();
        let col = e.log_emission_column(0b0000_1001_0001);
        let best_major = (0..12)
            .max_by(|&a, &b| col[a].total_cmp(&col[b]))
            .unwrap_or(usize::MAX);
        assert_eq!(best_major, 0);
    }

    #[test]
    fn test_emission_column_matches_scalar() {
        let e = EmissionModel::default();
        let mask = 0b1010_1011_0101;
        let col = e.emission_column(mask);
        for (state, &p) in col.iter().enumerate() {
            assert_eq!(p, e.emission(state, mask));
        }
    }

    #[test]
    fn test_transposition_invariance() {
        // D major triad under D major equals C major triad under C major.
        let e = EmissionModel::default();
        let c = e.log_emission(0, 0b0000_1001_0001);
        let d = e.log_emission(2, 1 << 2 | 1 << 6 | 1 << 9);
        assert_relative_eq!(c, d, epsilon = 1e-12);
    }
}
