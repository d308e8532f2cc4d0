// Interval, chord and scale bitmask constants.
//
// Every constant is a 12-bit mask relative to an implicit root at bit 0:
// bit n set means "the note n semitones above the root is present". Compound
// intervals (ninths, elevenths, thirteenths) fold into the octave.
//
// Scales are grouped the way they are usually taught: the seven diatonic
// modes, the melodic-minor modes, the major/minor heptatonic family,
// pentatonics, and a catch-all of other named scales.

use crate::pitch::PitchClassSet;

pub const UNISON: PitchClassSet = 1 << 0;
pub const MINOR_SECOND: PitchClassSet = 1 << 1;
pub const MAJOR_SECOND: PitchClassSet = 1 << 2;
pub const MINOR_THIRD: PitchClassSet = 1 << 3;
pub const MAJOR_THIRD: PitchClassSet = 1 << 4;
pub const PERFECT_FOURTH: PitchClassSet = 1 << 5;
pub const TRITONE: PitchClassSet = 1 << 6;
pub const PERFECT_FIFTH: PitchClassSet = 1 << 7;
pub const MINOR_SIXTH: PitchClassSet = 1 << 8;
pub const MAJOR_SIXTH: PitchClassSet = 1 << 9;
pub const MINOR_SEVENTH: PitchClassSet = 1 << 10;
pub const MAJOR_SEVENTH: PitchClassSet = 1 << 11;

pub const ROOT: PitchClassSet = UNISON;
pub const DIMINISHED_FIFTH: PitchClassSet = TRITONE;
pub const AUGMENTED_FIFTH: PitchClassSet = MINOR_SIXTH;
pub const DIMINISHED_SEVENTH: PitchClassSet = MAJOR_SIXTH;
pub const MAJOR_NINTH: PitchClassSet = MAJOR_SECOND;
pub const ELEVENTH: PitchClassSet = PERFECT_FOURTH;
pub const THIRTEENTH: PitchClassSet = MAJOR_SIXTH;

// Triads

pub const TRIAD_MAJOR: PitchClassSet = ROOT | MAJOR_THIRD | PERFECT_FIFTH;
pub const TRIAD_MINOR: PitchClassSet = ROOT | MINOR_THIRD | PERFECT_FIFTH;
pub const TRIAD_DIMINISHED: PitchClassSet = ROOT | MINOR_THIRD | DIMINISHED_FIFTH;
pub const TRIAD_AUGMENTED: PitchClassSet = ROOT | MAJOR_THIRD | AUGMENTED_FIFTH;

// Sevenths

pub const CHORD_MAJOR_SEVENTH: PitchClassSet = TRIAD_MAJOR | MAJOR_SEVENTH;
pub const CHORD_DOMINANT_SEVENTH: PitchClassSet = TRIAD_MAJOR | MINOR_SEVENTH;
pub const CHORD_MINOR_SEVENTH: PitchClassSet = TRIAD_MINOR | MINOR_SEVENTH;
pub const CHORD_HALF_DIMINISHED_SEVENTH: PitchClassSet = TRIAD_DIMINISHED | MINOR_SEVENTH;
/// Stacked minor thirds: one of the two fully symmetric four-note chords.
pub const CHORD_DIMINISHED_SEVENTH: PitchClassSet = TRIAD_DIMINISHED | DIMINISHED_SEVENTH;
pub const CHORD_MINOR_MAJOR_SEVENTH: PitchClassSet = TRIAD_MINOR | MAJOR_SEVENTH;
pub const CHORD_AUGMENTED_MAJOR_SEVENTH: PitchClassSet = TRIAD_AUGMENTED | MAJOR_SEVENTH;

// Suspended

pub const CHORD_SUSPENDED_SECOND: PitchClassSet = ROOT | MAJOR_SECOND | PERFECT_FIFTH;
pub const CHORD_SUSPENDED_FOURTH: PitchClassSet = ROOT | PERFECT_FOURTH | PERFECT_FIFTH;

// Extended

pub const CHORD_DOMINANT_NINTH: PitchClassSet = CHORD_DOMINANT_SEVENTH | MAJOR_NINTH;
pub const CHORD_MAJOR_NINTH: PitchClassSet = CHORD_MAJOR_SEVENTH | MAJOR_NINTH;
pub const CHORD_MINOR_NINTH: PitchClassSet = CHORD_MINOR_SEVENTH | MAJOR_NINTH;
pub const CHORD_MAJOR_ELEVENTH: PitchClassSet = CHORD_MAJOR_NINTH | ELEVENTH;
pub const CHORD_DOMINANT_THIRTEENTH: PitchClassSet = CHORD_DOMINANT_SEVENTH | THIRTEENTH;

// Diatonic modes

pub const SCALE_LYDIAN: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | TRITONE | PERFECT_FIFTH | MAJOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_IONIAN: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MAJOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_MIXOLYDIAN: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MAJOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_DORIAN: PitchClassSet =
    ROOT | MAJOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MAJOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_AEOLIAN: PitchClassSet =
    ROOT | MAJOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_PHRYGIAN: PitchClassSet =
    ROOT | MINOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_LOCRIAN: PitchClassSet =
    ROOT | MINOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | TRITONE | MINOR_SIXTH | MINOR_SEVENTH;

// Melodic modes (half steps separated by a single whole step allowed)

pub const SCALE_LYDIAN_SHARP_FIFTH: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | TRITONE | MINOR_SIXTH | MAJOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_LYDIAN_DOMINANT: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | TRITONE | PERFECT_FIFTH | MAJOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_MELODIC_MINOR: PitchClassSet =
    ROOT | MAJOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MAJOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_MIXOLYDIAN_FLAT_SIXTH: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_DORIAN_FLAT_SECOND: PitchClassSet =
    ROOT | MINOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MAJOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_LOCRIAN_NATURAL_SECOND: PitchClassSet =
    ROOT | MAJOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | TRITONE | MINOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_ALTERED: PitchClassSet =
    ROOT | MINOR_SECOND | MINOR_THIRD | MAJOR_THIRD | TRITONE | MINOR_SIXTH | MINOR_SEVENTH;

// Major and minor heptatonic scales

pub const SCALE_DIATONIC_MAJOR: PitchClassSet = SCALE_IONIAN;
pub const SCALE_HARMONIC_MAJOR: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_NATURAL_MINOR: PitchClassSet = SCALE_AEOLIAN;
pub const SCALE_HARMONIC_MINOR: PitchClassSet =
    ROOT | MAJOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SIXTH | MAJOR_SEVENTH;

// Pentatonic scales

pub const SCALE_PENTA_MAJOR: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | PERFECT_FIFTH | MAJOR_SIXTH;
pub const SCALE_PENTA_BLUES_MAJOR: PitchClassSet =
    ROOT | MAJOR_SECOND | PERFECT_FOURTH | PERFECT_FIFTH | MAJOR_SIXTH;
pub const SCALE_PENTA_SUSPENDED: PitchClassSet =
    ROOT | MAJOR_SECOND | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SEVENTH;
pub const SCALE_PENTA_MINOR: PitchClassSet =
    ROOT | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SEVENTH;
pub const SCALE_PENTA_BLUES_MINOR: PitchClassSet =
    ROOT | MINOR_THIRD | PERFECT_FOURTH | MINOR_SIXTH | MINOR_SEVENTH;

// Other scales

pub const SCALE_NEAPOLITAN_MAJOR: PitchClassSet =
    ROOT | MINOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MAJOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_NEAPOLITAN_MINOR: PitchClassSet =
    ROOT | MINOR_SECOND | MINOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_BEBOP_DOMINANT: PitchClassSet = SCALE_MIXOLYDIAN | MAJOR_SEVENTH;
pub const SCALE_BEBOP_MAJOR: PitchClassSet = SCALE_IONIAN | MINOR_SIXTH;
pub const SCALE_BEBOP_DORIAN: PitchClassSet = SCALE_DORIAN | MAJOR_THIRD;
pub const SCALE_BEBOP_MELODIC_MINOR: PitchClassSet = SCALE_MELODIC_MINOR | MINOR_SIXTH;
pub const SCALE_BEBOP_HARMONIC_MINOR: PitchClassSet = SCALE_HARMONIC_MINOR | MINOR_SEVENTH;
pub const SCALE_DOUBLE_HARMONIC: PitchClassSet =
    ROOT | MINOR_SECOND | MAJOR_THIRD | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_HUNGARIAN_MINOR: PitchClassSet =
    ROOT | MAJOR_SECOND | MINOR_THIRD | TRITONE | PERFECT_FIFTH | MINOR_SIXTH | MAJOR_SEVENTH;
pub const SCALE_ENIGMATIC: PitchClassSet =
    ROOT | MINOR_SECOND | MAJOR_THIRD | TRITONE | MINOR_SIXTH | MINOR_SEVENTH | MAJOR_SEVENTH;
pub const SCALE_JAPANESE: PitchClassSet =
    ROOT | MINOR_SECOND | PERFECT_FOURTH | PERFECT_FIFTH | MINOR_SEVENTH;
pub const SCALE_BLUES: PitchClassSet =
    ROOT | MINOR_THIRD | PERFECT_FOURTH | TRITONE | PERFECT_FIFTH | MINOR_SEVENTH;
pub const SCALE_WHOLE_TONE: PitchClassSet =
    ROOT | MAJOR_SECOND | MAJOR_THIRD | TRITONE | MINOR_SIXTH | MINOR_SEVENTH;
pub const SCALE_DIMINISHED: PitchClassSet = ROOT
    | MAJOR_SECOND
    | MINOR_THIRD
    | PERFECT_FOURTH
    | TRITONE
    | MINOR_SIXTH
    | MAJOR_SIXTH
    | MAJOR_SEVENTH;
pub const SCALE_CHROMATIC: PitchClassSet = 0x0FFF;

/// Named scales, for lookups by name (CLI and configuration files).
pub const NAMED_SCALES: &[(&str, PitchClassSet)] = &[
    ("lydian", SCALE_LYDIAN),
    ("ionian", SCALE_IONIAN),
    ("major", SCALE_DIATONIC_MAJOR),
    ("mixolydian", SCALE_MIXOLYDIAN),
    ("dorian", SCALE_DORIAN),
    ("aeolian", SCALE_AEOLIAN),
    ("minor", SCALE_NATURAL_MINOR),
    ("phrygian", SCALE_PHRYGIAN),
    ("locrian", SCALE_LOCRIAN),
    ("melodic-minor", SCALE_MELODIC_MINOR),
    ("harmonic-minor", SCALE_HARMONIC_MINOR),
    ("harmonic-major", SCALE_HARMONIC_MAJOR),
    ("pentatonic-major", SCALE_PENTA_MAJOR),
    ("pentatonic-minor", SCALE_PENTA_MINOR),
    ("blues", SCALE_BLUES),
    ("whole-tone", SCALE_WHOLE_TONE),
    ("diminished", SCALE_DIMINISHED),
    ("chromatic", SCALE_CHROMATIC),
];

/// Look up a scale mask by name (case-insensitive).
pub fn scale_by_name(name: &str) -> Option<PitchClassSet> {
    let name = name.to_ascii_lowercase();
    NAMED_SCALES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, mask)| mask)
}
