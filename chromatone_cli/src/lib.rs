// Chromatone offline analyzer.
//
// Runs the key finder and the chord tracker over a Standard MIDI File and
// reports one key per bar plus every chord change with its color.
//
// - midi.rs: SMF reading and writing, track merging (`midly`)
// - analysis.rs: `analyze_song`, the JSON config file, text rendering
//
// The `analyze` binary in main.rs is a thin argument parser over these.

pub mod analysis;
pub mod midi;

pub use analysis::{AnalysisConfig, CliError, SongAnalysis, analyze_song, render_text};
pub use midi::{MidiError, MidiSong, encode_song, parse_midi, read_midi};
