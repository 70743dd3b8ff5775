//! YUV to RGB color transform
//!
//! BT.601 limited-range coefficients in 8.8 fixed point. The `+ 128`
//! before the shift rounds to nearest.

/// Convert one limited-range YUV sample to RGB in `[0, 1]`
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [f32; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    let r = (298 * c + 409 * e + 128) >> 8;
    let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
    let b = (298 * c + 516 * d + 128) >> 8;

    [normalize(r), normalize(g), normalize(b)]
}

#[inline]
fn normalize(value: i32) -> f32 {
    (value as f32 / 255.0).max(0.0).min(1.0)
}

/// Quantize a `[0, 1]` channel to 8 bits, rounding to nearest
#[inline]
pub fn to_u8(value: f32) -> u8 {
    // Saturating cast: NaN -> 0, overshoot -> 255
    (value * 255.0).round() as u8
}
