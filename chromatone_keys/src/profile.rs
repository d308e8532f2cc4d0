// Key profiles: per-degree weights turned into presence probabilities.
//
// A profile assigns each scale degree (semitones above the tonic) a weight.
// The logistic transform `p = e^(w - offset) / (1 + e^(w - offset))` maps a
// weight to the probability that the degree sounds at least once in a bar.
// The default offset of 4 puts the tonic (weight 5) at ~0.73 and the tritone
// (weight 2) at ~0.12.
//
// The log-probabilities needed by the emission model are precomputed here:
// `ln p`, `ln (1 - p)`, and their sum over all degrees `K = Σ ln(1 - p)`.
// Because `ln p - ln(1 - p) = w - offset`, the log emission of a mask can be
// written `K + Σ_{present} (w - offset)`, a Krumhansl-style correlation sum.

pub const MAJOR_PROFILE: [f64; 12] = [5.0, 2.0, 3.5, 2.0, 4.5, 4.0, 2.0, 4.5, 2.0, 3.5, 1.5, 4.0];
/// Harmonic-minor shaped profile.
pub const MINOR_PROFILE: [f64; 12] = [5.0, 2.0, 3.5, 4.5, 2.0, 4.0, 2.0, 4.5, 3.5, 2.0, 1.5, 4.0];
pub const DEFAULT_PROFILE_OFFSET: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyProfile {
    weights: [f64; 12],
    offset: f64,
    presence: [f64; 12],
    log_presence: [f64; 12],
    log_absence: [f64; 12],
    log_all_absent: f64,
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl KeyProfile {
    pub fn new(weights: [f64; 12], offset: f64) -> Self {
        let presence = weights.map(|w| logistic(w - offset));
        let log_presence = presence.map(f64::ln);
        let log_absence = presence.map(|p| (1.0 - p).ln());
        KeyProfile {
            weights,
            offset,
            presence,
            log_presence,
            log_absence,
            log_all_absent: log_absence.iter().sum(),
        }
    }

    pub fn major() -> Self {
        Self::new(MAJOR_PROFILE, DEFAULT_PROFILE_OFFSET)
    }

    pub fn minor() -> Self {
        Self::new(MINOR_PROFILE, DEFAULT_PROFILE_OFFSET)
    }

    pub fn weights(&self) -> &[f64; 12] {
        &self.weights
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Probability that `degree` (semitones above the tonic) is present.
    pub fn presence(&self, degree: usize) -> f64 {
        self.presence[degree % 12]
    }

    pub fn log_presence(&self, degree: usize) -> f64 {
        self.log_presence[degree % 12]
    }

    pub fn log_absence(&self, degree: usize) -> f64 {
        self.log_absence[degree % 12]
    }

    /// `K = Σ ln(1 - p)`: log-probability of a bar with nothing present.
    pub fn log_all_absent(&self) -> f64 {
        self.log_all_absent
    }
}
