// Pitch classes, note names and circle-of-fifths arithmetic.

/// Pitch class in 0..12 (0 = C).
pub type PitchClass = u8;

/// 12-bit set of pitch classes.
pub type PitchClassSet = u16;

pub const NUM_PITCH_CLASSES: u32 = 12;

/// Note names used in key and chord labels.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

pub const ENHARMONIC_NOTE_NAMES: [&str; 12] = [
    "C", "Db/C#", "D", "Eb/D#", "E", "F", "Gb/F#", "G", "Ab/G#", "A", "Bb/A#", "B",
];

/// Roman-numeral names of the 12 intervals above a tonic. Lowercase marks
/// the minor/diminished variant.
pub const INTERVAL_NAMES: [&str; 12] = [
    "I", "ii", "II", "iii", "III", "IV", "v", "V", "vi", "VI", "vii", "VII",
];

/// Normalize any MIDI note (or pitch class) into 0..12.
pub fn pitch_class(note: i32) -> PitchClass {
    note.rem_euclid(NUM_PITCH_CLASSES as i32) as PitchClass
}

/// Octave number of a MIDI note (note 60 is octave 5 with this convention,
/// matching `note / 12`).
pub fn octave(note: i32) -> i32 {
    note.div_euclid(NUM_PITCH_CLASSES as i32)
}

pub fn note_name(pc: i32) -> &'static str {
    NOTE_NAMES[pitch_class(pc) as usize]
}

/// Signed semitone offset `(to - from) mod 12`, in 0..12.
pub fn interval_between(from: i32, to: i32) -> u8 {
    pitch_class(to - from)
}

/// Position of a pitch class on the circle of fifths (C=0, G=1, D=2, ...).
pub fn fifths_position(pc: i32) -> u8 {
    pitch_class(pc * 7)
}

/// The `k`-th pitch class reached by walking up `k` fifths from `root`.
pub fn nth_fifth_from(root: i32, k: u32) -> PitchClass {
    pitch_class(root + 7 * k as i32)
}
