// Bit utilities for pitch-class masks.
//
// A pitch-class set is a 12-bit mask. Interval relationships (thirds, fifths,
// rotational symmetry) are computed by replicating the mask into 24 bits so
// that a plain right shift behaves like a rotation modulo the octave.

use crate::pitch::{NUM_PITCH_CLASSES, PitchClassSet};

/// Mask covering the 12 pitch-class bits.
pub const PITCH_CLASS_MASK: u16 = (1 << NUM_PITCH_CLASSES) - 1;

/// Number of set bits. Works for any `u64`, so it also covers replicated
/// masks and wider channel bitmaps.
pub fn popcount(mask: u64) -> u32 {
    mask.count_ones()
}

/// Index of the lowest set bit, or `None` for an empty mask.
pub fn lowest_set_bit(mask: u64) -> Option<u32> {
    if mask == 0 {
        None
    } else {
        Some(mask.trailing_zeros())
    }
}

/// Replicate a 12-bit mask into 24 bits (`mask | mask << 12`).
pub fn replicate24(mask: PitchClassSet) -> u32 {
    let m = u32::from(mask & PITCH_CLASS_MASK);
    m | (m << NUM_PITCH_CLASSES)
}

/// Rotate a 12-bit mask down by `steps` semitones: bit `(i + steps) % 12`
/// of the input lands on bit `i` of the output.
pub fn rotate_down(mask: PitchClassSet, steps: u32) -> PitchClassSet {
    let steps = steps % NUM_PITCH_CLASSES;
    ((replicate24(mask) >> steps) as u16) & PITCH_CLASS_MASK
}

/// Rotate a 12-bit mask up by `steps` semitones: bit `i` of the input lands
/// on bit `(i + steps) % 12` of the output.
pub fn rotate_up(mask: PitchClassSet, steps: u32) -> PitchClassSet {
    let steps = steps % NUM_PITCH_CLASSES;
    rotate_down(mask, NUM_PITCH_CLASSES - steps)
}

/// Mask of pitch classes `i` such that both `i` and `i + interval` are in
/// `mask`. This is the shifted-AND against the replicated mask.
pub fn interval_pairs(mask: PitchClassSet, interval: u32) -> PitchClassSet {
    let wide = replicate24(mask);
    ((wide & (wide >> (interval % NUM_PITCH_CLASSES))) as u16) & PITCH_CLASS_MASK
}

/// Build a mask from a root and semitone offsets:
/// OR of `1 << ((root + interval) mod 12)`.
pub fn mask_from_intervals(root: u8, intervals: &[i32]) -> PitchClassSet {
    intervals.iter().fold(0, |acc, &iv| {
        let pc = (i32::from(root) + iv).rem_euclid(NUM_PITCH_CLASSES as i32);
        acc | (1 << pc)
    })
}

/// Iterate over the pitch classes present in a mask, ascending.
pub fn pitch_classes(mask: PitchClassSet) -> impl Iterator<Item = u8> {
    (0..NUM_PITCH_CLASSES as u8).filter(move |&pc| mask & (1 << pc) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popcount_wide_values() {
        assert_eq!(popcount(0), 0);
        assert_eq!(popcount(0b1001_0001), 3);
        assert_eq!(popcount(u64::MAX), 64);
        assert_eq!(popcount(1 << 63 | 1), 2);
    }

    #[test]
    fn test_lowest_set_bit() {
        assert_eq!(lowest_set_bit(0), None);
        assert_eq!(lowest_set_bit(0b1000), Some(3));
        assert_eq!(lowest_set_bit(1 << 40 | 1 << 50), Some(40));
    }

    #[test]
    fn test_rotation() {
        // C-E-G rotated down by 4 puts E on 0: E(0) G(3) C(8).
        let c_major = 0b0000_1001_0001;
        assert_eq!(rotate_down(c_major, 4), 1 | 1 << 3 | 1 << 8);
        assert_eq!(rotate_up(rotate_down(c_major, 5), 5), c_major);
        assert_eq!(rotate_down(c_major, 12), c_major);
    }

    #[test]
    fn test_interval_pairs() {
        let c_major = 0b0000_1001_0001; // C E G
        assert_eq!(interval_pairs(c_major, 4), 1); // C-E
        assert_eq!(interval_pairs(c_major, 3), 1 << 4); // E-G
        assert_eq!(interval_pairs(c_major, 7), 1); // C-G
        // Wrap-around: G-C is a perfect fourth.
        assert_eq!(interval_pairs(c_major, 5), 1 << 7);
    }

    #[test]
    fn test_mask_from_intervals_wraps() {
        assert_eq!(mask_from_intervals(9, &[0, 3, 7]), 1 << 9 | 1 | 1 << 4);
        assert_eq!(mask_from_intervals(0, &[-1, 14]), 1 << 11 | 1 << 2);
    }

    #[test]
    fn test_pitch_classes_iter() {
        let v: Vec<u8> = pitch_classes(0b1000_0000_0101).collect();
        assert_eq!(v, vec![0, 2, 11]);
    }
}
