// Chromatone music theory layer.
//
// The leaf crate shared by the chord tracker (`chromatone_chords`) and the
// key finder (`chromatone_keys`). Everything here is a pure function or a
// constant; nothing owns mutable state except `Scale`, which is a plain value.
//
// Pitch classes are `u8` in 0..12 and pitch-class sets are 12-bit masks in a
// `u16` (bit i set = pitch class i present). Absolute notes are MIDI note
// numbers as `i32` so that callers can pass out-of-range or negative values;
// every public boundary normalizes with `pitch_class()` (modulo 12).
//
// Architecture:
// - bits.rs: popcount, lowest set bit, 12-bit rotation, 24-bit replication
// - intervals.rs: interval, triad, chord and scale bitmask constants
// - pitch.rs: modulo-12 normalization, note/interval names, circle of fifths
// - scale.rs: a tonal center (root + scale mask) and its in-scale table

pub mod bits;
pub mod intervals;
pub mod pitch;
pub mod scale;

pub use bits::{lowest_set_bit, popcount};
pub use pitch::{NUM_PITCH_CLASSES, PitchClass, PitchClassSet, pitch_class};
pub use scale::Scale;
