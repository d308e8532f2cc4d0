// Chromatone chord tracker.
//
// Maintains the set of sounding pitch classes from a live stream of key
// events and, whenever that set changes, names the chord it contains,
// detects rotational symmetry, derives thirds/fifths interval masks, and
// assigns the chord a perceptual color.
//
// Architecture:
// - signature.rs: named chord catalog, precomputed per-root masks
// - tracker.rs: press counting, set transitions, matching, `ChordState`
// - color.rs: Lab placement of interval sets, Lab to sRGB, note hues
// - keys_pressed.rs: note to channel-mask map for keyboard displays
// - live.rs: tracker on its own thread, fed by an mpsc queue
// - config.rs: `TrackerConfig` (tonal root + scale), JSON loading
//
// The tracker is single-threaded and event-driven. Concurrency lives only in
// `live.rs`, which serializes all producers through one channel.

pub mod color;
pub mod config;
pub mod keys_pressed;
pub mod live;
pub mod signature;
pub mod tracker;

pub use color::{Rgb, chord_color};
pub use config::{ConfigError, TrackerConfig};
pub use keys_pressed::{KEYBOARD_CHANNEL, KeysPressed};
pub use live::{LiveTracker, LiveTrackerError, TrackerSender};
pub use signature::{ChordSignature, SignatureTable};
pub use tracker::{ChordState, ChordTracker, chord_state_for};
