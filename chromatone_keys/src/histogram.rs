// Bar and beat pitch-class masks from a timed note stream.
//
// The key finder observes one 12-bit mask per bar. `BarHistogramBuilder`
// produces those masks from note-on/note-off events in tick order (as read
// from a Standard MIDI File after merging tracks). Bit i of a bar's mask is
// set when pitch class i was already sounding at the start of the bar or was
// struck during it. The same rule is applied per beat.
//
// Bar length in ticks is `ticks_per_beat * numerator * 4 / denominator`
// (default 4/4) and a beat is `ticks_per_beat * 4 / denominator`. A time
// signature change takes effect for the bar in progress. The percussion
// channel (index 9) is ignored, and a note-on with velocity 0 is a note-off.
//
// Completed bars are emitted as their end is crossed. `finish` closes the
// stream and keeps a trailing partial bar only if something sounded in it.
//
// A single jump in time emits at most `MAX_WINDOWS_PER_GAP` bars (and as many
// beats); the rest of a longer gap is skipped without output, so a corrupt
// delta time cannot blow up memory.

use chromatone_theory::PitchClassSet;
use serde::{Deserialize, Serialize};

/// MIDI channel 10, zero-based.
pub const PERCUSSION_CHANNEL: u8 = 9;

pub const MAX_WINDOWS_PER_GAP: u64 = 1 << 16;

/// A mask together with the tick where its bar or beat starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedMask {
    pub start_tick: u64,
    pub mask: PitchClassSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarHistograms {
    pub bars: Vec<TimedMask>,
    pub beats: Vec<TimedMask>,
}

impl BarHistograms {
    /// Bar masks alone, as the key finder consumes them.
    pub fn bar_masks(&self) -> Vec<PitchClassSet> {
        self.bars.iter().map(|b| b.mask).collect()
    }

    pub fn beat_masks(&self) -> Vec<PitchClassSet> {
        self.beats.iter().map(|b| b.mask).collect()
    }

    /// Index of the bar containing `tick`.
    pub fn bar_at(&self, tick: u64) -> Option<usize> {
        let after = self.bars.partition_point(|b| b.start_tick <= tick);
        after.checked_sub(1)
    }

    /// Index of the beat containing `tick`.
    pub fn beat_at(&self, tick: u64) -> Option<usize> {
        let after = self.beats.partition_point(|b| b.start_tick <= tick);
        after.checked_sub(1)
    }
}

/// Running window (bar or beat) of the builder.
#[derive(Debug, Clone)]
struct Window {
    start: u64,
    mask: PitchClassSet,
}

#[derive(Debug, Clone)]
pub struct BarHistogramBuilder {
    ticks_per_beat: u64,
    numerator: u64,
    denominator: u64,
    held: [u32; 12],
    now: u64,
    bar: Window,
    beat: Window,
    out: BarHistograms,
}

impl BarHistogramBuilder {
    pub fn new(ticks_per_beat: u32) -> Self {
        BarHistogramBuilder {
            ticks_per_beat: u64::from(ticks_per_beat.max(1)),
            numerator: 4,
            denominator: 4,
            held: [0; 12],
            now: 0,
            bar: Window { start: 0, mask: 0 },
            beat: Window { start: 0, mask: 0 },
            out: BarHistograms::default(),
        }
    }

    pub fn bar_ticks(&self) -> u64 {
        (self.ticks_per_beat * self.numerator * 4 / self.denominator).max(1)
    }

    pub fn beat_ticks(&self) -> u64 {
        (self.ticks_per_beat * 4 / self.denominator).max(1)
    }

    /// Completed bars so far.
    pub fn bars(&self) -> &[TimedMask] {
        &self.out.bars
    }

    pub fn time_signature(&mut self, tick: u64, numerator: u8, denominator: u8) {
        self.advance_to(tick);
        self.numerator = u64::from(numerator.max(1));
        self.denominator = u64::from(denominator.max(1));
        log::trace!("time signature {numerator}/{denominator} at tick {tick}");
    }

    pub fn note_on(&mut self, tick: u64, channel: u8, note: u8, velocity: u8) {
        if velocity == 0 {
            self.note_off(tick, channel, note);
            return;
        }
        if channel == PERCUSSION_CHANNEL {
            return;
        }
        self.advance_to(tick);
        let pc = note % 12;
        self.held[usize::from(pc)] += 1;
        self.bar.mask |= 1 << pc;
        self.beat.mask |= 1 << pc;
    }

    pub fn note_off(&mut self, tick: u64, channel: u8, note: u8) {
        if channel == PERCUSSION_CHANNEL {
            return;
        }
        self.advance_to(tick);
        let count = &mut self.held[usize::from(note % 12)];
        if *count == 0 {
            log::trace!("note-off for {note} on channel {channel} without note-on");
            return;
        }
        *count -= 1;
    }

    /// Close the stream at `end_tick` and return all masks.
    pub fn finish(mut self, end_tick: u64) -> BarHistograms {
        self.advance_to(end_tick);
        let end = end_tick.max(self.now);
        if end > self.beat.start && self.beat.mask != 0 {
            self.out.beats.push(TimedMask {
                start_tick: self.beat.start,
                mask: self.beat.mask,
            });
        }
        if end > self.bar.start && self.bar.mask != 0 {
            self.out.bars.push(TimedMask {
                start_tick: self.bar.start,
                mask: self.bar.mask,
            });
        }
        log::debug!(
            "histograms: {} bars, {} beats",
            self.out.bars.len(),
            self.out.beats.len()
        );
        self.out
    }

    fn held_mask(&self) -> PitchClassSet {
        self.held
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .fold(0, |acc, (pc, _)| acc | (1 << pc))
    }

    fn advance_to(&mut self, tick: u64) {
        let tick = tick.max(self.now);
        self.now = tick;
        let held = self.held_mask();
        let beat_ticks = self.beat_ticks();
        let bar_ticks = self.bar_ticks();
        close_windows(&mut self.beat, beat_ticks, tick, held, &mut self.out.beats);
        close_windows(&mut self.bar, bar_ticks, tick, held, &mut self.out.bars);
    }
}

/// Emit every window of length `len` that ends at or before `tick`, up to
/// `MAX_WINDOWS_PER_GAP`. Windows opened after the first take the `held` mask.
fn close_windows(
    window: &mut Window,
    len: u64,
    tick: u64,
    held: PitchClassSet,
    out: &mut Vec<TimedMask>,
) {
    let mut emitted = 0;
    while tick >= window.start + len {
        if emitted == MAX_WINDOWS_PER_GAP {
            let skipped = (tick - window.start) / len;
            log::warn!(
                "skipping {skipped} windows of {len} ticks before tick {tick}"
            );
            window.start += skipped * len;
            break;
        }
        out.push(TimedMask {
            start_tick: window.start,
            mask: window.mask,
        });
        *window = Window {
            start: window.start + len,
            mask: held,
        };
        emitted += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TPB: u32 = 480;
    const BAR: u64 = 4 * 480;

    #[test]
    fn test_bar_length_follows_time_signature() {
        let mut b = BarHistogramBuilder::new(TPB);
        assert_eq!(b.bar_ticks(), BAR);
        assert_eq!(b.beat_ticks(), 480);
        b.time_signature(0, 6, 8);
        assert_eq!(b.bar_ticks(), 1440);
        assert_eq!(b.beat_ticks(), 240);
        b.time_signature(0, 2, 2);
        assert_eq!(b.bar_ticks(), 1920);
    }

    #[test]
    fn test_struck_and_sustained_notes() {
        let mut b = BarHistogramBuilder::new(TPB);
        // Bar 1: C held across the bar line, E struck and released.
        b.note_on(0, 0, 60, 100);
        b.note_on(100, 0, 64, 100);
        b.note_off(200, 0, 64);
        // Bar 2: C still sounding at the start, G struck, C released.
        b.note_on(BAR + 10, 0, 67, 100);
        b.note_off(BAR + 20, 0, 60);
        b.note_off(BAR + 30, 0, 67);
        // Bar 3: silence.
        let h = b.finish(3 * BAR);
        assert_eq!(h.bar_masks(), vec![1 | 1 << 4, 1 | 1 << 7, 0]);
        assert_eq!(h.bars[1].start_tick, BAR);
    }

    #[test]
    fn test_percussion_ignored() {
        let mut b = BarHistogramBuilder::new(TPB);
        b.note_on(0, PERCUSSION_CHANNEL, 36, 100);
        b.note_on(0, 1, 62, 100);
        b.note_off(10, PERCUSSION_CHANNEL, 36);
        b.note_off(10, 1, 62);
        let h = b.finish(BAR);
        assert_eq!(h.bar_masks(), vec![1 << 2]);
    }

    #[test]
    fn test_velocity_zero_is_release() {
        let mut b = BarHistogramBuilder::new(TPB);
        b.note_on(0, 0, 60, 90);
        b.note_on(10, 0, 60, 0);
        let h = b.finish(2 * BAR);
        // C was released in bar 1, so bar 2 is empty.
        assert_eq!(h.bar_masks(), vec![1, 0]);
    }

    #[test]
    fn test_trailing_partial_bar() {
        let mut b = BarHistogramBuilder::new(TPB);
        b.note_on(BAR + 5, 0, 69, 100);
        b.note_off(BAR + 50, 0, 69);
        let h = b.finish(BAR + 100);
        assert_eq!(h.bar_masks(), vec![0, 1 << 9]);

        // A silent tail adds nothing.
        let b = BarHistogramBuilder::new(TPB);
        assert!(b.finish(100).bars.is_empty());
    }

    #[test]
    fn test_beat_masks() {
        let mut b = BarHistogramBuilder::new(TPB);
        b.note_on(0, 0, 60, 100);
        b.note_off(400, 0, 60);
        b.note_on(480, 0, 64, 100);
        b.note_on(960, 0, 67, 100);
        let h = b.finish(BAR);
        assert_eq!(h.beat_masks(), vec![1, 1 << 4, 1 << 4 | 1 << 7, 1 << 4 | 1 << 7]);
        assert_eq!(h.bar_masks(), vec![1 | 1 << 4 | 1 << 7]);
    }

    #[test]
    fn test_huge_gap_is_bounded() {
        let late = 1u64 << 28;
        let mut b = BarHistogramBuilder::new(1);
        b.note_on(0, 0, 60, 100);
        b.note_off(1, 0, 60);
        b.note_on(late, 0, 62, 100);
        b.note_off(late + 1, 0, 62);
        let h = b.finish(late + 4);

        let cap = MAX_WINDOWS_PER_GAP as usize;
        assert!(h.beats.len() <= 2 * cap + 8);
        assert!(h.bars.len() <= 2 * cap + 2);
        // The first bar and the late note both survive, on the bar grid.
        assert_eq!(h.bars[0].mask, 1);
        let last = h.bars.last().unwrap();
        assert_eq!(last.mask, 1 << 2);
        assert_eq!(last.start_tick % 4, 0);
        assert!(last.start_tick <= late && late < last.start_tick + 4);
    }

    #[test]
    fn test_bar_at() {
        let mut b = BarHistogramBuilder::new(TPB);
        b.note_on(0, 0, 60, 100);
        let h = b.finish(3 * BAR);
        assert_eq!(h.bar_at(0), Some(0));
        assert_eq!(h.bar_at(BAR - 1), Some(0));
        assert_eq!(h.bar_at(BAR), Some(1));
        assert_eq!(h.bar_at(10 * BAR), Some(2));
        assert_eq!(h.beat_at(480), Some(1));
        assert_eq!(h.beat_at(BAR + 5), Some(4));
    }
}
