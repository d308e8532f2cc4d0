// Whole-song analysis: keys per bar, chords as they change.
//
// Pipeline:
// 1. Build bar and beat masks from the flattened MIDI events.
// 2. Decode one key per bar with the HMM key finder.
// 3. Replay the note events through a chord tracker. At each bar line the
//    tracker is retuned to that bar's key, so chord roots are searched
//    around the current tonal center. Every pitch-class set change is
//    recorded with its position (bar.beat) and chord color.
// 4. Name the chord of every beat mask as well, for a coarser summary.
//
// The percussion channel is skipped in the replay just as it is in the
// histograms.

use std::fmt::Write as _;
use std::path::Path;

use chromatone_chords::{ChordTracker, SignatureTable, TrackerConfig, chord_state_for};
use chromatone_keys::histogram::PERCUSSION_CHANNEL;
use chromatone_keys::{KeyEstimate, KeyFinder, KeyFinderConfig};
use chromatone_theory::PitchClassSet;
use chromatone_theory::bits::pitch_classes;
use chromatone_theory::pitch::note_name;
use serde::{Deserialize, Serialize};

use crate::midi::{EventKind, MidiError, MidiSong};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Midi(#[from] MidiError),

    #[error(transparent)]
    KeysConfig(#[from] chromatone_keys::ConfigError),

    #[error(transparent)]
    ChordsConfig(#[from] chromatone_chords::ConfigError),

    #[error("{0}")]
    Usage(String),
}

/// Contents of the `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub keys: KeyFinderConfig,
    pub chords: TrackerConfig,
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&json)?;
        config.keys.validate()?;
        config.chords.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarReport {
    /// 1-based bar number.
    pub bar: usize,
    pub start_tick: u64,
    pub mask: PitchClassSet,
    pub key: KeyEstimate,
    pub key_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordChange {
    pub tick: u64,
    /// 1-based bar and beat-within-bar.
    pub bar: usize,
    pub beat: usize,
    pub pitch_class_set: PitchClassSet,
    pub label: String,
    pub is_symmetric: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeatChord {
    pub start_tick: u64,
    pub mask: PitchClassSet,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongAnalysis {
    pub ticks_per_beat: u16,
    pub bars: Vec<BarReport>,
    pub beats: Vec<BeatChord>,
    pub chord_changes: Vec<ChordChange>,
}

pub fn analyze_song(song: &MidiSong, config: &AnalysisConfig) -> SongAnalysis {
    let histograms = song.histograms();
    let keys = KeyFinder::new(&config.keys).analyze(&histograms.bar_masks());

    let bars: Vec<BarReport> = histograms
        .bars
        .iter()
        .zip(&keys)
        .enumerate()
        .map(|(i, (bar, key))| BarReport {
            bar: i + 1,
            start_tick: bar.start_tick,
            mask: bar.mask,
            key: *key,
            key_label: key.label(),
        })
        .collect();

    let mut tracker = ChordTracker::new(&config.chords);
    let mut current_bar: Option<usize> = None;
    let mut chord_changes = Vec::new();
    for event in &song.events {
        let bar_index = histograms.bar_at(event.tick);
        if bar_index != current_bar {
            current_bar = bar_index;
            if let Some(key) = bar_index.and_then(|i| keys.get(i)) {
                tracker.set_root(i32::from(key.root()), key.scale_mask());
            }
        }

        let changed = match event.kind {
            EventKind::NoteOn {
                channel,
                note,
                velocity,
            } if channel != PERCUSSION_CHANNEL => tracker.note_on(i32::from(note), velocity),
            EventKind::NoteOff { channel, note } if channel != PERCUSSION_CHANNEL => {
                tracker.note_off(i32::from(note))
            }
            _ => false,
        };
        if !changed {
            continue;
        }

        let state = tracker.chord_state();
        let bar_start = bar_index
            .and_then(|i| histograms.bars.get(i))
            .map_or(0, |b| b.start_tick);
        let beat = match (histograms.beat_at(event.tick), histograms.beat_at(bar_start)) {
            (Some(b), Some(first)) => b.saturating_sub(first),
            _ => 0,
        };
        chord_changes.push(ChordChange {
            tick: event.tick,
            bar: bar_index.map_or(1, |i| i + 1),
            beat: beat + 1,
            pitch_class_set: state.pitch_class_set,
            label: state.label(),
            is_symmetric: state.is_symmetric,
            color: state.color.to_hex(),
        });
    }

    let table = SignatureTable::standard();
    let beats = histograms
        .beats
        .iter()
        .map(|beat| {
            let root = histograms
                .bar_at(beat.start_tick)
                .and_then(|i| keys.get(i))
                .map_or(config.chords.tonal_root, KeyEstimate::root);
            BeatChord {
                start_tick: beat.start_tick,
                mask: beat.mask,
                label: chord_state_for(beat.mask, root, &table).label(),
            }
        })
        .collect();

    log::debug!(
        "analyzed {} bars, {} chord changes",
        bars.len(),
        chord_changes.len()
    );
    SongAnalysis {
        ticks_per_beat: song.ticks_per_beat,
        bars,
        beats,
        chord_changes,
    }
}

/// Note names of a mask, e.g. "C E G".
pub fn mask_notes(mask: PitchClassSet) -> String {
    pitch_classes(mask)
        .map(|pc| note_name(i32::from(pc)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain-text report: one line per bar with its key, then the chord changes
/// inside that bar.
pub fn render_text(analysis: &SongAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} bars at {} ticks/beat",
        analysis.bars.len(),
        analysis.ticks_per_beat
    );
    let mut changes = analysis.chord_changes.iter().peekable();
    for bar in &analysis.bars {
        let _ = writeln!(
            out,
            "bar {:>3}  {:<7} [{}]",
            bar.bar,
            bar.key_label,
            mask_notes(bar.mask)
        );
        while let Some(change) = changes.next_if(|c| c.bar == bar.bar) {
            let label = if change.label.is_empty() {
                format!("({})", mask_notes(change.pitch_class_set))
            } else {
                change.label.clone()
            };
            let _ = writeln!(
                out,
                "  {}.{:<3} {:<28} {}",
                change.bar, change.beat, label, change.color
            );
        }
    }
    out
}
