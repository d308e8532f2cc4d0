// Test-only song builder for end-to-end analysis tests.
//
// Builds `MidiSong` values bar by bar, encodes them to real SMF bytes with
// the CLI crate's writer, and drops them in a temp directory so the tests
// can drive the same `read_midi` -> `analyze_song` path as the binary.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::path::PathBuf;

use chromatone_cli::midi::{EventKind, MidiSong, TimedEvent, encode_song};

/// Builds a single-channel song. Time advances with each `chord`/`rest`.
pub struct SongBuilder {
    ticks_per_beat: u16,
    cursor: u64,
    events: Vec<TimedEvent>,
}

impl SongBuilder {
    pub fn new(ticks_per_beat: u16) -> Self {
        Self {
            ticks_per_beat,
            cursor: 0,
            events: Vec::new(),
        }
    }

    pub fn time_signature(mut self, numerator: u8, denominator: u8) -> Self {
        self.events.push(TimedEvent {
            tick: self.cursor,
            kind: EventKind::TimeSignature {
                numerator,
                denominator,
            },
        });
        self
    }

    /// Strike `notes` together and hold them for `beats` beats.
    pub fn chord(self, notes: &[u8], beats: u64) -> Self {
        self.chord_on(0, notes, beats)
    }

    pub fn chord_on(mut self, channel: u8, notes: &[u8], beats: u64) -> Self {
        let start = self.cursor;
        let end = start + beats * u64::from(self.ticks_per_beat);
        for &note in notes {
            self.events.push(TimedEvent {
                tick: start,
                kind: EventKind::NoteOn {
                    channel,
                    note,
                    velocity: 96,
                },
            });
        }
        // Release one tick early so the next chord starts clean.
        for &note in notes {
            self.events.push(TimedEvent {
                tick: end - 1,
                kind: EventKind::NoteOff { channel, note },
            });
        }
        self.cursor = end;
        self
    }

    /// Play `notes` one after another, one beat each.
    pub fn melody(mut self, notes: &[u8]) -> Self {
        for &note in notes {
            self = self.chord(&[note], 1);
        }
        self
    }

    pub fn rest(mut self, beats: u64) -> Self {
        self.cursor += beats * u64::from(self.ticks_per_beat);
        self
    }

    pub fn build(self) -> MidiSong {
        let mut events = self.events;
        events.sort_by_key(|e| e.tick);
        MidiSong {
            ticks_per_beat: self.ticks_per_beat,
            events,
            end_tick: self.cursor,
        }
    }

    pub fn to_smf(self) -> Vec<u8> {
        encode_song(&self.build()).expect("encode_song failed")
    }
}

/// Write `bytes` to a fresh file under the system temp dir.
pub fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join("chromatone_pipeline_tests");
    std::fs::create_dir_all(&dir).expect("create temp dir failed");
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write temp file failed");
    path
}

/// The seven notes of the major scale on `tonic` (a MIDI note).
pub fn major_scale(tonic: u8) -> [u8; 7] {
    [0, 2, 4, 5, 7, 9, 11].map(|step| tonic + step)
}
