//! 8-bit RGB <-> HSV conversions
//!
//! Hue is in degrees `[0, 360)`, saturation and value in `[0, 1]`. Conversions
//! run in `f32` and quantize only on the way back to 8-bit, so a round trip on
//! untouched pixels is exact.

/// HSV color representation
/// - H (hue): 0.0-360.0 degrees
/// - S (saturation): 0.0-1.0
/// - V (value): 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Convert an 8-bit RGB pixel to HSV
#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let rf = f32::from(r) / 255.0;
    let gf = f32::from(g) / 255.0;
    let bf = f32::from(b) / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;

    // Achromatic case
    if delta < 1e-6 {
        return Hsv { h: 0.0, s: 0.0, v };
    }

    // delta > 0 implies max > 0
    let s = delta / max;

    let h = if (max - rf).abs() < 1e-6 {
        60.0 * ((gf - bf) / delta).rem_euclid(6.0)
    } else if (max - gf).abs() < 1e-6 {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };

    Hsv { h: h % 360.0, s, v }
}

/// Convert an HSV triple back to an 8-bit RGB pixel
#[inline]
pub fn hsv_to_rgb(hsv: Hsv) -> [u8; 3] {
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);

    // Achromatic case
    if s < 1e-6 {
        let level = (v * 255.0).round() as u8;
        return [level, level, level];
    }

    let h6 = hsv.h.rem_euclid(360.0) / 60.0;
    let c = v * s;
    let x = c * (1.0 - (h6 % 2.0 - 1.0).abs());
    let m = v - c;

    let (r1, g1, b1) = match h6 as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    ]
}
