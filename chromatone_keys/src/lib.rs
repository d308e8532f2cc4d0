// Chromatone key finder.
//
// Infers the most likely musical key of every bar of a piece with a
// 24-state hidden Markov model (12 tonics x major/minor). Observations are
// 12-bit masks of the pitch classes sounding in each bar; the decode is a
// log-domain Viterbi pass.
//
// Architecture:
// - profile.rs: key profiles and their logistic presence probabilities
// - model.rs: transition and emission models, scalar and column accessors
// - viterbi.rs: the decoder and a path scoring helper
// - key.rs: `Mode`, `KeyEstimate` (state index, label, scale)
// - finder.rs: `KeyFinder`, the configured entry point
// - histogram.rs: bar and beat masks from timed note events
// - config.rs: `KeyFinderConfig`, JSON loading and validation
//
// Nothing here keeps state between calls; a `KeyFinder` can be shared
// freely with a live chord tracker running on another thread.

pub mod config;
pub mod finder;
pub mod histogram;
pub mod key;
pub mod model;
pub mod profile;
pub mod viterbi;

pub use config::{ConfigError, KeyFinderConfig};
pub use finder::KeyFinder;
pub use histogram::{BarHistogramBuilder, BarHistograms, TimedMask};
pub use key::{KeyEstimate, Mode, NUM_STATES};
