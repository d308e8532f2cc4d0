// Chord signature table.
//
// A signature is a named list of semitone offsets above an implicit root.
// At construction the table expands every signature into its 12 transposed
// pitch-class masks, so matching a live pitch-class set is a single AND and
// compare per (root, signature) pair.
//
// Order matters: matching is first-match-wins, so richer chords (elevenths,
// thirteenths, ninths) come before sevenths, sevenths before triads, and
// suspended chords last. A plain major triad inside a dominant ninth must not
// shadow the ninth.

use chromatone_theory::PitchClassSet;
use chromatone_theory::bits::mask_from_intervals;

/// Named chords in priority order: (name, offsets above the root).
pub const CHORD_CATALOG: &[(&str, &[i32])] = &[
    ("Major Eleventh", &[0, 4, 7, 11, 14, 17]),
    ("Dominant Thirteenth", &[0, 4, 7, 10, 21]),
    ("Dominant Ninth", &[0, 4, 7, 10, 14]),
    ("Major Ninth", &[0, 4, 7, 11, 14]),
    ("Minor Ninth", &[0, 3, 7, 10, 14]),
    ("Major Seventh", &[0, 4, 7, 11]),
    ("Dominant Seventh", &[0, 4, 7, 10]),
    ("Minor Seventh", &[0, 3, 7, 10]),
    ("Minor-Major Seventh", &[0, 3, 7, 11]),
    ("Augmented-Major Seventh", &[0, 4, 8, 11]),
    ("Half-Diminished Seventh", &[0, 3, 6, 10]),
    ("Diminished Seventh", &[0, 3, 6, 9]),
    ("Major Triad", &[0, 4, 7]),
    ("Minor Triad", &[0, 3, 7]),
    ("Diminished Triad", &[0, 3, 6]),
    ("Augmented Triad", &[0, 4, 8]),
    ("Suspended Second", &[0, 2, 7]),
    ("Suspended Fourth", &[0, 5, 7]),
];

/// One chord with its mask precomputed for every root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordSignature {
    pub name: &'static str,
    pub intervals: &'static [i32],
    /// `masks[root]` = OR of `1 << ((root + interval) mod 12)`.
    pub masks: [PitchClassSet; 12],
}

impl ChordSignature {
    pub fn new(name: &'static str, intervals: &'static [i32]) -> Self {
        let mut masks = [0; 12];
        for (root, mask) in masks.iter_mut().enumerate() {
            *mask = mask_from_intervals(root as u8, intervals);
        }
        ChordSignature {
            name,
            intervals,
            masks,
        }
    }

    /// True when every note of this chord on `root` is present in `set`.
    pub fn matches(&self, set: PitchClassSet, root: u8) -> bool {
        let sig = self.masks[root as usize % 12];
        set & sig == sig
    }

    /// Number of distinct pitch classes in the chord.
    pub fn size(&self) -> u32 {
        self.masks[0].count_ones()
    }
}

/// Ordered signature table. Built once and shared by trackers.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    signatures: Vec<ChordSignature>,
}

impl SignatureTable {
    /// The full catalog in priority order.
    pub fn standard() -> Self {
        Self::from_catalog(CHORD_CATALOG)
    }

    pub fn from_catalog(catalog: &[(&'static str, &'static [i32])]) -> Self {
        SignatureTable {
            signatures: catalog
                .iter()
                .map(|&(name, intervals)| ChordSignature::new(name, intervals))
                .collect(),
        }
    }

    pub fn signatures(&self) -> &[ChordSignature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// First signature (in table order) contained in `set` when rooted on
    /// `root`.
    pub fn first_match(&self, set: PitchClassSet, root: u8) -> Option<&ChordSignature> {
        self.signatures.iter().find(|sig| sig.matches(set, root))
    }

    pub fn by_name(&self, name: &str) -> Option<&ChordSignature> {
        self.signatures.iter().find(|sig| sig.name == name)
    }
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::standard()
    }
}
