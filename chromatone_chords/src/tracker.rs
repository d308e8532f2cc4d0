// Chord tracker: turns a stream of note-on/note-off events into a chord
// state snapshot.
//
// The tracker keeps a press count per pitch class (several keys, octaves or
// channels may hold the same class). The pitch-class set is the mask of
// classes with a positive count, and the chord state is recomputed only when
// that set actually changes. A repeated press of an already-held class or a
// release that leaves the class held does nothing.
//
// Recognition walks candidate roots in circle-of-fifths order from the tonal
// root (`root + 7k mod 12`, k = 0..11) and, for each root, the signature
// table in priority order. The first signature contained in the set wins.
// Sets that map onto themselves under rotation by 2, 3, 4 or 6 semitones
// (augmented, diminished seventh, whole-tone, tritone dyads) have no
// well-defined root, so their reference note is dropped while the matched
// name is kept.
//
// The chord color depends only on the set and the reference note. It is
// computed lazily on first read and cached until the next set transition.

use std::cell::OnceCell;

use chromatone_theory::bits::{PITCH_CLASS_MASK, interval_pairs, rotate_down};
use chromatone_theory::pitch::{note_name, nth_fifth_from, pitch_class};
use chromatone_theory::{NUM_PITCH_CLASSES, PitchClass, PitchClassSet, Scale};
use serde::Serialize;

use crate::color::{Rgb, chord_color_from};
use crate::config::TrackerConfig;
use crate::signature::SignatureTable;

/// Rotations checked for symmetric chords.
const SYMMETRY_STEPS: [u32; 4] = [2, 3, 4, 6];

/// Read-only chord snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordState {
    pub pitch_class_set: PitchClassSet,
    pub bit_count: u32,
    /// Name of the matched signature, if any.
    pub chord_name: Option<&'static str>,
    /// Root of the matched chord. `None` when nothing matched or the set is
    /// rotationally symmetric.
    pub reference_note: Option<PitchClass>,
    /// Classes `i` with `i` and `i + 4` both present.
    pub major_thirds: PitchClassSet,
    /// Classes `i` with `i` and `i + 3` both present.
    pub minor_thirds: PitchClassSet,
    pub thirds: PitchClassSet,
    /// Classes `i` with `i` and `i + 7` both present.
    pub fifths: PitchClassSet,
    pub is_symmetric: bool,
    pub color: Rgb,
}

impl ChordState {
    /// Name with the root spelled out, e.g. "A Minor Triad". Symmetric chords
    /// get the bare name; unmatched sets get an empty string.
    pub fn label(&self) -> String {
        match (self.chord_name, self.reference_note) {
            (Some(name), Some(root)) => format!("{} {}", note_name(i32::from(root)), name),
            (Some(name), None) => name.to_string(),
            (None, _) => String::new(),
        }
    }

    /// Reference note as a signed value, `-1` when absent.
    pub fn reference_or_negative(&self) -> i32 {
        self.reference_note.map_or(-1, i32::from)
    }
}

/// Everything in a [`ChordState`] except the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChordAnalysis {
    set: PitchClassSet,
    chord_name: Option<&'static str>,
    reference_note: Option<PitchClass>,
    major_thirds: PitchClassSet,
    minor_thirds: PitchClassSet,
    fifths: PitchClassSet,
    is_symmetric: bool,
}

/// Whether rotating `set` by 2, 3, 4 or 6 semitones reproduces it.
pub fn is_symmetric(set: PitchClassSet) -> bool {
    SYMMETRY_STEPS
        .iter()
        .any(|&steps| rotate_down(set, steps) == set)
}

fn analyze(set: PitchClassSet, tonal_root: PitchClass, table: &SignatureTable) -> ChordAnalysis {
    let found = (0..NUM_PITCH_CLASSES).find_map(|k| {
        let root = nth_fifth_from(i32::from(tonal_root), k);
        table.first_match(set, root).map(|sig| (sig.name, root))
    });
    let symmetric = is_symmetric(set);
    ChordAnalysis {
        set,
        chord_name: found.map(|(name, _)| name),
        reference_note: if symmetric { None } else { found.map(|(_, r)| r) },
        major_thirds: interval_pairs(set, 4),
        minor_thirds: interval_pairs(set, 3),
        fifths: interval_pairs(set, 7),
        is_symmetric: symmetric,
    }
}

impl ChordAnalysis {
    /// Chord color, relative to the reference note or else the tonal root.
    fn color(&self, tonal_root: PitchClass) -> Rgb {
        chord_color_from(self.set, self.reference_note.unwrap_or(tonal_root))
    }

    fn to_state(self, color: Rgb) -> ChordState {
        ChordState {
            pitch_class_set: self.set,
            bit_count: self.set.count_ones(),
            chord_name: self.chord_name,
            reference_note: self.reference_note,
            major_thirds: self.major_thirds,
            minor_thirds: self.minor_thirds,
            thirds: self.major_thirds | self.minor_thirds,
            fifths: self.fifths,
            is_symmetric: self.is_symmetric,
            color,
        }
    }
}

/// Chord state of a fixed pitch-class set, as a tracker rooted on
/// `tonal_root` and holding exactly `set` would report it.
pub fn chord_state_for(
    set: PitchClassSet,
    tonal_root: PitchClass,
    table: &SignatureTable,
) -> ChordState {
    let analysis = analyze(set & PITCH_CLASS_MASK, tonal_root % 12, table);
    analysis.to_state(analysis.color(tonal_root % 12))
}

/// Counts note presses and maintains the current chord.
#[derive(Debug)]
pub struct ChordTracker {
    press_counts: [u32; 12],
    scale: Scale,
    table: SignatureTable,
    analysis: ChordAnalysis,
    color: OnceCell<Rgb>,
    /// Number of chord recomputations so far.
    generation: u64,
}

impl ChordTracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self::with_table(config, SignatureTable::standard())
    }

    pub fn with_table(config: &TrackerConfig, table: SignatureTable) -> Self {
        let scale = Scale::new(i32::from(config.tonal_root), config.scale);
        let analysis = analyze(0, scale.root(), &table);
        ChordTracker {
            press_counts: [0; 12],
            scale,
            table,
            analysis,
            color: OnceCell::new(),
            generation: 0,
        }
    }

    /// Set the tonal center. Press state is untouched; the chord is
    /// re-evaluated against the new root order.
    pub fn set_root(&mut self, note: i32, scale_mask: PitchClassSet) {
        self.scale.set_root(note, scale_mask);
        self.recompute(self.analysis.set);
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn tonal_root(&self) -> PitchClass {
        self.scale.root()
    }

    /// Apply one key event. Returns true when the pitch-class set changed.
    pub fn note_event(&mut self, note: i32, pressed: bool) -> bool {
        let pc = pitch_class(note);
        let count = &mut self.press_counts[pc as usize];
        if pressed {
            *count += 1;
        } else if *count == 0 {
            log::warn!("note-off for {note} with no matching note-on, ignoring");
            return false;
        } else {
            *count -= 1;
        }

        let set = self.current_set();
        if set == self.analysis.set {
            return false;
        }
        self.recompute(set);
        true
    }

    /// MIDI-style note-on: velocity 0 is a release.
    pub fn note_on(&mut self, note: i32, velocity: u8) -> bool {
        self.note_event(note, velocity > 0)
    }

    pub fn note_off(&mut self, note: i32) -> bool {
        self.note_event(note, false)
    }

    /// Drop all held notes.
    pub fn clear(&mut self) -> bool {
        self.press_counts = [0; 12];
        if self.analysis.set == 0 {
            return false;
        }
        self.recompute(0);
        true
    }

    pub fn pitch_class_set(&self) -> PitchClassSet {
        self.analysis.set
    }

    pub fn press_count(&self, pc: PitchClass) -> u32 {
        self.press_counts[pc as usize % 12]
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Color of the current chord, computed on first use.
    pub fn color(&self) -> Rgb {
        *self
            .color
            .get_or_init(|| self.analysis.color(self.scale.root()))
    }

    pub fn chord_state(&self) -> ChordState {
        self.analysis.to_state(self.color())
    }

    pub fn signatures(&self) -> &SignatureTable {
        &self.table
    }

    fn current_set(&self) -> PitchClassSet {
        self.press_counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .fold(0, |acc, (pc, _)| acc | (1 << pc))
    }

    fn recompute(&mut self, set: PitchClassSet) {
        self.analysis = analyze(set, self.scale.root(), &self.table);
        self.color = OnceCell::new();
        self.generation += 1;
        log::trace!(
            "chord set {:#05x} -> {:?} on {:?}",
            set,
            self.analysis.chord_name,
            self.analysis.reference_note
        );
    }
}

impl Default for ChordTracker {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::NEUTRAL_GRAY;
    use chromatone_theory::intervals::SCALE_DIATONIC_MAJOR;

    fn tracker() -> ChordTracker {
        ChordTracker::default()
    }

    fn press_all(t: &mut ChordTracker, notes: &[i32]) {
        for &n in notes {
            t.note_event(n, true);
        }
    }

    #[test]
    fn test_c_major_then_release_third() {
        let mut t = tracker();
        press_all(&mut t, &[60, 64, 67]);
        let s = t.chord_state();
        assert_eq!(s.pitch_class_set, 0b0000_1001_0001);
        assert_eq!(s.bit_count, 3);
        assert_eq!(s.chord_name, Some("Major Triad"));
        assert_eq!(s.reference_note, Some(0));
        assert_eq!(s.major_thirds, 1);
        assert_eq!(s.minor_thirds, 1 << 4);
        assert_eq!(s.thirds, 1 | 1 << 4);
        assert_eq!(s.fifths, 1);
        assert!(!s.is_symmetric);
        assert_eq!(s.label(), "C Major Triad");

        t.note_event(64, false);
        let s = t.chord_state();
        assert_eq!(s.pitch_class_set, 1 | 1 << 7);
        assert_eq!(s.chord_name, None);
        assert_eq!(s.reference_note, None);
        assert_eq!(s.reference_or_negative(), -1);
        assert_eq!(s.thirds, 0);
        assert_eq!(s.fifths, 1);
        assert_eq!(s.color, NEUTRAL_GRAY);
    }

    #[test]
    fn test_augmented_triad_is_symmetric() {
        let mut t = tracker();
        press_all(&mut t, &[60, 64, 68]);
        let s = t.chord_state();
        assert!(s.is_symmetric);
        assert_eq!(s.chord_name, Some("Augmented Triad"));
        assert_eq!(s.reference_note, None);
        assert_eq!(s.label(), "Augmented Triad");
    }

    #[test]
    fn test_diminished_seventh_is_symmetric() {
        let mut t = tracker();
        press_all(&mut t, &[59, 62, 65, 68]);
        let s = t.chord_state();
        assert!(s.is_symmetric);
        assert_eq!(s.chord_name, Some("Diminished Seventh"));
        assert_eq!(s.reference_note, None);
    }

    #[test]
    fn test_symmetric_detection_exhaustive() {
        for set in 0..4096u16 {
            let expected = [2, 3, 4, 6].iter().any(|&k| {
                (0..12).all(|i| {
                    let has = set & (1 << i) != 0;
                    let shifted = set & (1 << ((i + k) % 12)) != 0;
                    has == shifted
                })
            });
            assert_eq!(is_symmetric(set), expected, "set {set:#05x}");
        }
    }

    #[test]
    fn test_duplicate_press_is_idempotent() {
        let mut t = tracker();
        press_all(&mut t, &[60, 64, 67]);
        let before = t.chord_state();
        let generation = t.generation();
        // Same class, other octave.
        assert!(!t.note_event(72, true));
        assert_eq!(t.chord_state(), before);
        assert_eq!(t.generation(), generation);
        assert_eq!(t.press_count(0), 2);

        // Releasing one of the two C's keeps C in the set.
        assert!(!t.note_event(72, false));
        assert_eq!(t.pitch_class_set(), before.pitch_class_set);
        assert_eq!(t.generation(), generation);
    }

    #[test]
    fn test_unbalanced_release_is_ignored() {
        let mut t = tracker();
        assert!(!t.note_event(61, false));
        assert_eq!(t.press_count(1), 0);
        assert_eq!(t.generation(), 0);
        // A later press still registers normally.
        assert!(t.note_event(61, true));
        assert_eq!(t.pitch_class_set(), 1 << 1);
    }

    #[test]
    fn test_press_order_does_not_matter() {
        let notes = [62, 65, 69, 72];
        let mut a = tracker();
        press_all(&mut a, &notes);
        let mut b = tracker();
        let mut rev = notes;
        rev.reverse();
        press_all(&mut b, &rev);
        assert_eq!(a.chord_state(), b.chord_state());
        assert_eq!(a.chord_state().chord_name, Some("Minor Seventh"));
        assert_eq!(a.chord_state().reference_note, Some(2));

        // Releasing everything returns to the empty state.
        for &n in &notes {
            a.note_event(n, false);
        }
        let s = a.chord_state();
        assert_eq!(s.pitch_class_set, 0);
        assert_eq!(s.chord_name, None);
        assert_eq!(s.color, NEUTRAL_GRAY);
    }

    #[test]
    fn test_state_is_function_of_set_and_root() {
        // Same set reached by two different event histories.
        let mut a = tracker();
        press_all(&mut a, &[48, 55, 64, 71]);
        let mut b = tracker();
        press_all(&mut b, &[71, 60, 61, 67]);
        b.note_event(61, false);
        b.note_event(52, true);
        assert_eq!(a.pitch_class_set(), b.pitch_class_set());
        assert_eq!(a.chord_state(), b.chord_state());
        assert_eq!(a.chord_state().chord_name, Some("Major Seventh"));
    }

    #[test]
    fn test_fifths_order_breaks_ambiguity() {
        // C E G A: C6 contains C major and A minor seventh. The search
        // starts at the tonal root and walks by fifths.
        let mut t = tracker();
        press_all(&mut t, &[60, 64, 67, 69]);
        let s = t.chord_state();
        assert_eq!(s.chord_name, Some("Major Triad"));
        assert_eq!(s.reference_note, Some(0));

        // Rooted on A, A sits first in the walk.
        t.set_root(57, SCALE_DIATONIC_MAJOR);
        let s = t.chord_state();
        assert_eq!(s.chord_name, Some("Minor Seventh"));
        assert_eq!(s.reference_note, Some(9));
        // Press counts survive a root change.
        assert_eq!(t.press_count(9), 1);
    }

    #[test]
    fn test_color_is_cached_until_transition() {
        let mut t = tracker();
        press_all(&mut t, &[60, 64, 67]);
        let first = t.color();
        assert_eq!(t.color(), first);
        assert_ne!(first, NEUTRAL_GRAY);
        t.note_event(67, false);
        t.note_event(67, true);
        assert_eq!(t.color(), first);
    }

    #[test]
    fn test_velocity_zero_releases() {
        let mut t = tracker();
        t.note_on(60, 100);
        t.note_on(60, 0);
        assert_eq!(t.pitch_class_set(), 0);
    }

    #[test]
    fn test_chord_state_for_matches_tracker() {
        let mut t = tracker();
        press_all(&mut t, &[62, 66, 69, 72]);
        let table = SignatureTable::standard();
        assert_eq!(chord_state_for(t.pitch_class_set(), 0, &table), t.chord_state());
        assert_eq!(t.chord_state().chord_name, Some("Dominant Seventh"));
    }

    #[test]
    fn test_clear() {
        let mut t = tracker();
        press_all(&mut t, &[60, 60, 64]);
        assert!(t.clear());
        assert_eq!(t.press_count(0), 0);
        assert_eq!(t.pitch_class_set(), 0);
        assert!(!t.clear());
    }
}
