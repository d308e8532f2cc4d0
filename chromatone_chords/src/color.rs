// Chord and note coloring.
//
// A chord color is placed in CIE Lab space from three features of its
// interval set, then converted to sRGB:
//
// - b* (yellow/blue) follows the mean interval above the chord's anchor note,
//   so stacked chords with high extensions lean warm and compact minor shapes
//   lean cool.
// - a* (green/red) mixes the balance of major against minor thirds with the
//   mean position of the intervals around the circle of fifths.
// - L* is fixed so every chord color reads against the same background.
//
// The anchor ("chord note") is the rotation of the thirds mask with the
// smallest integer value, i.e. the note from which the thirds stack starts.
// Sets with no intervals or no thirds get a neutral light gray.
//
// The Lab to sRGB conversion uses the D65 white point and the standard sRGB
// transfer curve. Out-of-gamut channels are clamped.
//
// Note colors (single pitch classes) use an HSV hue wheel laid out along the
// circle of fifths, so neighboring keys get neighboring hues.

use chromatone_theory::bits::{interval_pairs, pitch_classes, rotate_down};
use chromatone_theory::pitch::fifths_position;
use chromatone_theory::{NUM_PITCH_CLASSES, PitchClassSet};
use serde::{Deserialize, Serialize};

/// sRGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Rgb { r, g, b }
    }

    /// 8-bit channels, rounded.
    pub fn to_u8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// `#rrggbb`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Color used for sets that have nothing to color by.
pub const NEUTRAL_GRAY: Rgb = Rgb::new(0.9, 0.9, 0.9);

/// CIE Lab color (D65).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

const LIGHTNESS: f64 = 75.0;
const A_SCALE: f64 = 20.0;
const B_SCALE: f64 = 80.0;
/// Weight of the major/minor balance relative to the fifths axis in a*.
const MAJOR_MINOR_WEIGHT: f64 = 3.0;
/// Mean interval of a root-position major triad (0, 4, 7).
const MEAN_INTERVAL_CENTER: f64 = 11.0 / 3.0;
const MEAN_INTERVAL_SCALE: f64 = 1.0 / 3.0;
const FIFTHS_CENTER: f64 = 2.0;
const FIFTHS_SCALE: f64 = 1.0 / 6.0;

// D65 reference white.
const WHITE_X: f64 = 0.950_47;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_83;

/// Note from which the thirds stack of `thirds` starts: the rotation whose
/// rotated mask is the smallest integer. Ties go to the lowest rotation.
pub fn chord_note(thirds: PitchClassSet) -> u8 {
    let mut best = 0u8;
    let mut best_value = rotate_down(thirds, 0);
    for c in 1..NUM_PITCH_CLASSES {
        let value = rotate_down(thirds, c);
        if value < best_value {
            best_value = value;
            best = c as u8;
        }
    }
    best
}

/// Lab placement of an interval set (bit `d` = interval `d` above the
/// reference). `None` when the set has no intervals or no thirds.
pub fn chord_lab(intervals: PitchClassSet) -> Option<Lab> {
    if intervals == 0 {
        return None;
    }
    let thirds = interval_pairs(intervals, 4) | interval_pairs(intervals, 3);
    if thirds == 0 {
        return None;
    }

    let anchor = chord_note(thirds);
    let relative = rotate_down(intervals, u32::from(anchor));

    let n = f64::from(relative.count_ones());
    let mean_interval = pitch_classes(relative).map(f64::from).sum::<f64>() / n;
    let axis_b = (mean_interval - MEAN_INTERVAL_CENTER) * MEAN_INTERVAL_SCALE;

    let fifths_mean = pitch_classes(relative)
        .map(|d| f64::from((u32::from(d) * 7) % 12) - f64::from(d) / 7.0)
        .sum::<f64>()
        / n;
    let axis_fifths = (fifths_mean - FIFTHS_CENTER) * FIFTHS_SCALE;

    // Closer thirds weigh more.
    let weight = |mask: PitchClassSet| -> f64 {
        pitch_classes(mask)
            .map(|j| 1.0 / (1.0 + f64::from(j)))
            .sum()
    };
    let major = weight(interval_pairs(relative, 4));
    let minor = weight(interval_pairs(relative, 3));
    let axis_major_minor = (major - minor) / (major + minor);

    Some(Lab {
        l: LIGHTNESS,
        a: -A_SCALE * (MAJOR_MINOR_WEIGHT * axis_major_minor + axis_fifths),
        b: B_SCALE * axis_b,
    })
}

/// sRGB color of an interval set, or [`NEUTRAL_GRAY`].
pub fn chord_color(intervals: PitchClassSet) -> Rgb {
    chord_lab(intervals).map_or(NEUTRAL_GRAY, lab_to_rgb)
}

/// Color of a pitch-class set voiced relative to `reference`.
pub fn chord_color_from(set: PitchClassSet, reference: u8) -> Rgb {
    chord_color(rotate_down(set, u32::from(reference)))
}

pub fn lab_to_rgb(lab: Lab) -> Rgb {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let x = WHITE_X * lab_f_inv(fx);
    let y = WHITE_Y * lab_f_inv(fy);
    let z = WHITE_Z * lab_f_inv(fz);

    let r = 3.240_6 * x - 1.537_2 * y - 0.498_6 * z;
    let g = -0.968_9 * x + 1.875_8 * y + 0.041_5 * z;
    let b = 0.055_7 * x - 0.204_0 * y + 1.057_0 * z;

    Rgb::new(srgb_gamma(r), srgb_gamma(g), srgb_gamma(b))
}

fn lab_f_inv(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn srgb_gamma(c: f64) -> f64 {
    let v = if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    v.clamp(0.0, 1.0)
}

/// HSV to RGB, all components in `[0, 1]`. Hue wraps.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u8 {
        0 => Rgb::new(v, t, p),
        1 => Rgb::new(q, v, p),
        2 => Rgb::new(p, v, t),
        3 => Rgb::new(p, q, v),
        4 => Rgb::new(t, p, v),
        _ => Rgb::new(v, p, q),
    }
}

/// Color for a single note: hue follows the circle of fifths starting at C.
pub fn note_color(note: i32) -> Rgb {
    let step = f64::from(fifths_position(note));
    hsv_to_rgb(step / 12.0, 0.6, 0.95)
}

/// [`note_color`], or [`NEUTRAL_GRAY`] when there is no note.
pub fn note_color_or_gray(note: Option<i32>) -> Rgb {
    note.map_or(NEUTRAL_GRAY, note_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chromatone_theory::bits::mask_from_intervals;

    fn triad(intervals: &[i32]) -> PitchClassSet {
        mask_from_intervals(0, intervals)
    }

    #[test]
    fn test_empty_and_thirdless_are_neutral() {
        assert_eq!(chord_color(0), NEUTRAL_GRAY);
        // Perfect fifth only.
        assert_eq!(chord_color(triad(&[0, 7])), NEUTRAL_GRAY);
        // Whole-tone cluster with no thirds.
        assert_eq!(chord_color(triad(&[0, 2])), NEUTRAL_GRAY);
        assert!(chord_lab(triad(&[0, 7])).is_none());
    }

    #[test]
    fn test_chord_note_picks_stack_start() {
        // C E G: thirds at C (C-E) and E (E-G). Stack starts on C.
        let c_major = triad(&[0, 4, 7]);
        let thirds = interval_pairs(c_major, 4) | interval_pairs(c_major, 3);
        assert_eq!(chord_note(thirds), 0);
        // First inversion voiced relative to E: E G C = 0, 3, 8.
        let inv = triad(&[0, 3, 8]);
        let thirds = interval_pairs(inv, 4) | interval_pairs(inv, 3);
        assert_eq!(chord_note(thirds), 8);
    }

    #[test]
    fn test_major_triad_sits_on_b_axis_center() {
        let lab = chord_lab(triad(&[0, 4, 7])).map(|l| l.b);
        assert_relative_eq!(lab.unwrap_or(f64::NAN), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inversions_share_a_color() {
        // Rotating the interval set moves the anchor with it.
        let root = chord_color(triad(&[0, 4, 7]));
        let first = chord_color(triad(&[0, 3, 8]));
        let second = chord_color(triad(&[0, 5, 9]));
        assert_eq!(root, first);
        assert_eq!(root, second);
    }

    #[test]
    fn test_major_and_minor_differ_on_a_axis() {
        let major = chord_lab(triad(&[0, 4, 7])).map(|l| l.a).unwrap_or(0.0);
        let minor = chord_lab(triad(&[0, 3, 7])).map(|l| l.a).unwrap_or(0.0);
        // Major leans green (negative a*), minor leans red.
        assert!(major < minor, "major a*={major} minor a*={minor}");
    }

    #[test]
    fn test_channels_in_unit_range() {
        for mask in 0..4096u16 {
            let c = chord_color(mask);
            for ch in [c.r, c.g, c.b] {
                assert!((0.0..=1.0).contains(&ch), "mask {mask:#x} -> {c:?}");
            }
        }
    }

    #[test]
    fn test_lab_white_is_white() {
        let white = lab_to_rgb(Lab {
            l: 100.0,
            a: 0.0,
            b: 0.0,
        });
        assert_relative_eq!(white.r, 1.0, epsilon = 1e-3);
        assert_relative_eq!(white.g, 1.0, epsilon = 1e-3);
        assert_relative_eq!(white.b, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(Rgb::new(1.0, 0.0, 0.5).to_hex(), "#ff0080");
        assert_eq!(Rgb::new(0.0, 1.0, 0.0).to_u8(), [0, 255, 0]);
    }

    #[test]
    fn test_note_color_fifths_neighbors() {
        // C and G are one fifth apart; C and F# are opposite.
        let c = note_color(60);
        let red = hsv_to_rgb(0.0, 0.6, 0.95);
        assert_eq!(c, red);
        assert_ne!(note_color(67), note_color(66));
        assert_eq!(note_color_or_gray(None), NEUTRAL_GRAY);
        assert_eq!(note_color_or_gray(Some(72)), c);
    }
}
