// Standard MIDI File input for offline analysis.
//
// Reads an SMF with the `midly` crate and flattens it into a single list of
// timed events: every track's delta times are converted to absolute ticks,
// then the tracks are merged with a stable sort so events at the same tick
// keep their file order. Only what the analysis needs is kept: note on/off
// (with channel) and time signature changes. Tempo is irrelevant because
// bars are measured in ticks.
//
// Only metrical timing (ticks per quarter note) is supported; SMPTE timecode
// files are rejected.
//
// `encode_song` writes a `MidiSong` back out as a single-track SMF, which the
// tests use to build fixture files.

use std::path::Path;

use midly::num::{u4, u7, u15, u28};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

use chromatone_keys::{BarHistogramBuilder, BarHistograms};

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    Parse(#[from] midly::Error),

    #[error("unsupported timing: {0}")]
    UnsupportedTiming(String),

    #[error("MIDI write error: {0}")]
    Write(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    TimeSignature { numerator: u8, denominator: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub tick: u64,
    pub kind: EventKind,
}

/// A MIDI file flattened to one time-ordered event list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiSong {
    pub ticks_per_beat: u16,
    pub events: Vec<TimedEvent>,
    /// Tick of the last event in any track (including end-of-track).
    pub end_tick: u64,
}

impl MidiSong {
    /// Bar and beat masks of the whole song.
    pub fn histograms(&self) -> BarHistograms {
        let mut builder = BarHistogramBuilder::new(u32::from(self.ticks_per_beat));
        for event in &self.events {
            match event.kind {
                EventKind::NoteOn {
                    channel,
                    note,
                    velocity,
                } => builder.note_on(event.tick, channel, note, velocity),
                EventKind::NoteOff { channel, note } => builder.note_off(event.tick, channel, note),
                EventKind::TimeSignature {
                    numerator,
                    denominator,
                } => builder.time_signature(event.tick, numerator, denominator),
            }
        }
        builder.finish(self.end_tick)
    }
}

pub fn read_midi(path: &Path) -> Result<MidiSong, MidiError> {
    let bytes = std::fs::read(path)?;
    parse_midi(&bytes)
}

pub fn parse_midi(bytes: &[u8]) -> Result<MidiSong, MidiError> {
    let smf = Smf::parse(bytes)?;
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) => tpb.as_int(),
        Timing::Timecode(fps, sub) => {
            return Err(MidiError::UnsupportedTiming(format!(
                "SMPTE timecode {fps:?} x {sub}"
            )));
        }
    };

    let mut events = Vec::new();
    let mut end_tick = 0u64;
    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += u64::from(event.delta.as_int());
            if let Some(kind) = convert_event(&event.kind) {
                events.push(TimedEvent { tick, kind });
            }
        }
        end_tick = end_tick.max(tick);
    }
    // Stable: equal ticks keep track order, then file order.
    events.sort_by_key(|e| e.tick);

    log::debug!(
        "read {} tracks, {} events, {} ticks at {} ticks/beat",
        smf.tracks.len(),
        events.len(),
        end_tick,
        ticks_per_beat
    );
    Ok(MidiSong {
        ticks_per_beat,
        events,
        end_tick,
    })
}

fn convert_event(kind: &TrackEventKind<'_>) -> Option<EventKind> {
    match *kind {
        TrackEventKind::Midi { channel, message } => match message {
            MidiMessage::NoteOn { key, vel } => Some(EventKind::NoteOn {
                channel: channel.as_int(),
                note: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::NoteOff { key, .. } => Some(EventKind::NoteOff {
                channel: channel.as_int(),
                note: key.as_int(),
            }),
            _ => None,
        },
        TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, denominator_pow, _, _)) => {
            Some(EventKind::TimeSignature {
                numerator,
                denominator: 1u8.checked_shl(u32::from(denominator_pow)).unwrap_or(4),
            })
        }
        _ => None,
    }
}

/// Write a song as a single-track (format 0) SMF.
pub fn encode_song(song: &MidiSong) -> Result<Vec<u8>, MidiError> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(song.ticks_per_beat)),
    ));

    let mut track: Track<'static> = Vec::new();
    let mut last_tick = 0u64;
    for event in &song.events {
        let delta = u32::try_from(event.tick.saturating_sub(last_tick))
            .map_err(|_| MidiError::Write(format!("delta too large at tick {}", event.tick)))?;
        last_tick = last_tick.max(event.tick);
        let kind = match event.kind {
            EventKind::NoteOn {
                channel,
                note,
                velocity,
            } => TrackEventKind::Midi {
                channel: u4::new(channel),
                message: MidiMessage::NoteOn {
                    key: u7::new(note),
                    vel: u7::new(velocity),
                },
            },
            EventKind::NoteOff { channel, note } => TrackEventKind::Midi {
                channel: u4::new(channel),
                message: MidiMessage::NoteOff {
                    key: u7::new(note),
                    vel: u7::new(0),
                },
            },
            EventKind::TimeSignature {
                numerator,
                denominator,
            } => TrackEventKind::Meta(MetaMessage::TimeSignature(
                numerator,
                denominator.max(1).trailing_zeros() as u8,
                24,
                8,
            )),
        };
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind,
        });
    }
    let tail = u32::try_from(song.end_tick.saturating_sub(last_tick)).unwrap_or(0);
    track.push(TrackEvent {
        delta: u28::new(tail),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| MidiError::Write(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(tick: u64, note: u8, on: bool) -> TimedEvent {
        let kind = if on {
            EventKind::NoteOn {
                channel: 0,
                note,
                velocity: 90,
            }
        } else {
            EventKind::NoteOff { channel: 0, note }
        };
        TimedEvent { tick, kind }
    }

    #[test]
    fn test_encoded_song_parses_back() {
        let song = MidiSong {
            ticks_per_beat: 96,
            events: vec![
                TimedEvent {
                    tick: 0,
                    kind: EventKind::TimeSignature {
                        numerator: 3,
                        denominator: 4,
                    },
                },
                note(0, 60, true),
                note(90, 60, false),
                note(96, 64, true),
                note(200, 64, false),
            ],
            end_tick: 288,
        };
        let bytes = encode_song(&song).unwrap();
        let parsed = parse_midi(&bytes).unwrap();
        assert_eq!(parsed, song);
    }

    #[test]
    fn test_histograms_use_time_signature() {
        let song = MidiSong {
            ticks_per_beat: 100,
            events: vec![
                TimedEvent {
                    tick: 0,
                    kind: EventKind::TimeSignature {
                        numerator: 3,
                        denominator: 4,
                    },
                },
                note(0, 60, true),
                note(250, 60, false),
                note(300, 62, true),
                note(550, 62, false),
            ],
            end_tick: 600,
        };
        let h = song.histograms();
        assert_eq!(h.bar_masks(), vec![1, 1 << 2]);
        assert_eq!(h.bars[1].start_tick, 300);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(parse_midi(b"not a midi file"), Err(MidiError::Parse(_))));
    }
}
