// Keys as HMM states.
//
// The 24 hidden states are indexed `mode * 12 + tonic`, so states 0..12 are
// the major keys C..B and 12..24 the minor keys. `KeyEstimate` is the decoded
// value handed to callers, with helpers for display ("A:min") and for
// retuning a chord tracker (`root()`, `scale()`).

use std::fmt;

use chromatone_theory::intervals::{SCALE_DIATONIC_MAJOR, SCALE_NATURAL_MINOR};
use chromatone_theory::pitch::NOTE_NAMES;
use chromatone_theory::{PitchClass, PitchClassSet, Scale};
use serde::{Deserialize, Serialize};

pub const NUM_MODES: usize = 2;
pub const NUM_STATES: usize = NUM_MODES * 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub const ALL: [Mode; NUM_MODES] = [Mode::Major, Mode::Minor];

    pub fn index(self) -> usize {
        match self {
            Mode::Major => 0,
            Mode::Minor => 1,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Mode::Major => "Maj",
            Mode::Minor => "min",
        }
    }

    /// Scale mask relative to the tonic. Minor keys use the natural minor
    /// (aeolian) collection.
    pub fn scale_mask(self) -> PitchClassSet {
        match self {
            Mode::Major => SCALE_DIATONIC_MAJOR,
            Mode::Minor => SCALE_NATURAL_MINOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEstimate {
    pub tonic: PitchClass,
    pub mode: Mode,
}

impl KeyEstimate {
    pub fn new(tonic: PitchClass, mode: Mode) -> Self {
        KeyEstimate {
            tonic: tonic % 12,
            mode,
        }
    }

    /// Decode a state index. Indices wrap modulo 24.
    pub fn from_state(state: usize) -> Self {
        let state = state % NUM_STATES;
        KeyEstimate {
            tonic: (state % 12) as PitchClass,
            mode: Mode::ALL[state / 12],
        }
    }

    pub fn state(&self) -> usize {
        self.mode.index() * 12 + usize::from(self.tonic)
    }

    pub fn root(&self) -> PitchClass {
        self.tonic
    }

    pub fn scale_mask(&self) -> PitchClassSet {
        self.mode.scale_mask()
    }

    pub fn scale(&self) -> Scale {
        Scale::new(i32::from(self.tonic), self.scale_mask())
    }

    /// `"<Note>:<Maj|min>"`, e.g. `"Eb:Maj"`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            NOTE_NAMES[usize::from(self.tonic)],
            self.mode.short_name()
        )
    }
}
