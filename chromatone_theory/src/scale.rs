// Tonal center: a root pitch class plus a scale mask.
//
// The scale mask is expressed relative to the root (bit 0 = the root
// itself), so the same `SCALE_*` constant can be placed on any tonic. The
// derived `notes_in_scale` table answers, for every absolute pitch class,
// whether it is diatonic to the current center. It is recomputed only when
// the center changes via `set_root`.
//
// Used by the chord tracker (root search order and color reference) and by
// the key finder (`KeyEstimate::scale()`).

use crate::bits::{PITCH_CLASS_MASK, rotate_up};
use crate::intervals::SCALE_DIATONIC_MAJOR;
use crate::pitch::{PitchClass, PitchClassSet, pitch_class};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    root: PitchClass,
    mask: PitchClassSet,
    notes_in_scale: [bool; 12],
}

impl Scale {
    /// Place `mask` on the pitch class of `note` (any MIDI note number).
    pub fn new(note: i32, mask: PitchClassSet) -> Self {
        let mut scale = Scale {
            root: 0,
            mask: 0,
            notes_in_scale: [false; 12],
        };
        scale.set_root(note, mask);
        scale
    }

    /// C major.
    pub fn c_major() -> Self {
        Scale::new(0, SCALE_DIATONIC_MAJOR)
    }

    /// Replace the tonal center. Only the root and the derived table change.
    pub fn set_root(&mut self, note: i32, mask: PitchClassSet) {
        self.root = pitch_class(note);
        self.mask = mask & PITCH_CLASS_MASK;
        let root = i32::from(self.root);
        for (r, slot) in self.notes_in_scale.iter_mut().enumerate() {
            let degree = pitch_class(r as i32 - root);
            *slot = self.mask & (1 << degree) != 0;
        }
    }

    pub fn root(&self) -> PitchClass {
        self.root
    }

    /// Scale mask relative to the root.
    pub fn mask(&self) -> PitchClassSet {
        self.mask
    }

    /// Scale mask in absolute pitch classes (rotated onto the root).
    pub fn absolute_mask(&self) -> PitchClassSet {
        rotate_up(self.mask, u32::from(self.root))
    }

    /// `notes_in_scale[r]` is true when absolute pitch class `r` is diatonic.
    pub fn notes_in_scale(&self) -> [bool; 12] {
        self.notes_in_scale
    }

    /// Whether a note (any octave) belongs to the scale.
    pub fn contains(&self, note: i32) -> bool {
        self.notes_in_scale[pitch_class(note) as usize]
    }

    /// Scale degree (0-based position among the scale's notes) of a note, or
    /// `None` when it is not diatonic.
    pub fn degree(&self, note: i32) -> Option<usize> {
        let offset = pitch_class(note - i32::from(self.root));
        if self.mask & (1 << offset) == 0 {
            return None;
        }
        Some((self.mask & ((1 << offset) - 1)).count_ones() as usize)
    }

    /// Offset of a note above the root, in 0..12.
    pub fn offset_of(&self, note: i32) -> u8 {
        pitch_class(note - i32::from(self.root))
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::c_major()
    }
}
