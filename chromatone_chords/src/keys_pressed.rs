// Which keys are down, and on which channels.
//
// A display-side map from MIDI note number to a channel mask. Kept separate
// from the chord tracker: the tracker only cares about pitch classes, while
// keyboard visualizers need the exact keys and the channels that hold them.
//
// Channels 0..15 are MIDI channels (e.g. from file playback). Live keyboard
// input is tagged with `KEYBOARD_CHANNEL` (16) so a file's note-off never
// clears a key still held on the keyboard. Channels above `MAX_CHANNEL` are
// ignored rather than wrapped onto a real channel.

use std::collections::BTreeMap;

use chromatone_theory::PitchClassSet;
use chromatone_theory::pitch::pitch_class;

/// Channel tag for notes played on the live keyboard.
pub const KEYBOARD_CHANNEL: u8 = 16;
pub const MAX_CHANNEL: u8 = 31;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeysPressed {
    keys: BTreeMap<i32, u32>,
}

impl KeysPressed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `note` held on `channel`. Returns false (and records nothing)
    /// for a channel above `MAX_CHANNEL`.
    pub fn press(&mut self, note: i32, channel: u8) -> bool {
        if channel > MAX_CHANNEL {
            log::warn!("ignoring press of {note} on out-of-range channel {channel}");
            return false;
        }
        *self.keys.entry(note).or_insert(0) |= 1 << channel;
        true
    }

    /// Clear one channel's hold on a key. The key disappears once no channel
    /// holds it.
    pub fn release(&mut self, note: i32, channel: u8) -> bool {
        if channel > MAX_CHANNEL {
            log::warn!("ignoring release of {note} on out-of-range channel {channel}");
            return false;
        }
        if let Some(mask) = self.keys.get_mut(&note) {
            *mask &= !(1 << channel);
            if *mask == 0 {
                self.keys.remove(&note);
            }
        }
        true
    }

    /// Channel mask holding `note` (0 when up).
    pub fn channels(&self, note: i32) -> u32 {
        self.keys.get(&note).copied().unwrap_or(0)
    }

    pub fn is_pressed(&self, note: i32) -> bool {
        self.keys.contains_key(&note)
    }

    /// Held notes, ascending.
    pub fn notes(&self) -> impl Iterator<Item = i32> + '_ {
        self.keys.keys().copied()
    }

    pub fn pitch_class_set(&self) -> PitchClassSet {
        self.keys
            .keys()
            .fold(0, |acc, &note| acc | (1 << pitch_class(note)))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
