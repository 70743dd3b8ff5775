//! Trilinear interpolation through a color cube

use super::cube::{ColorCube, CUBE_MAX_INDEX};

/// Apply an optional cube to a normalized RGB value.
///
/// With no cube the input is returned untouched, bit for bit.
#[inline]
pub fn apply(rgb: [f32; 3], cube: Option<&ColorCube>) -> [f32; 3] {
    match cube {
        Some(cube) => trilinear(cube, rgb),
        None => rgb,
    }
}

/// Lower lattice index, upper lattice index and blend weight for one channel
#[inline]
fn lattice(value: f32) -> (usize, usize, f32) {
    // max/min (not clamp) so NaN lands on 0
    let coord = value.max(0.0).min(1.0) * CUBE_MAX_INDEX as f32;
    let lo = (coord as usize).min(CUBE_MAX_INDEX);
    let hi = (lo + 1).min(CUBE_MAX_INDEX);
    (lo, hi, coord - lo as f32)
}

#[inline]
fn lerp(low: f32, high: f32, t: f32) -> f32 {
    low * (1.0 - t) + high * t
}

/// Trilinear lookup.
///
/// Collapses red first (four edges), then green (two faces), then blue.
/// The order is fixed so results are reproducible across builds.
pub fn trilinear(cube: &ColorCube, rgb: [f32; 3]) -> [f32; 3] {
    let (r0, r1, rf) = lattice(rgb[0]);
    let (g0, g1, gf) = lattice(rgb[1]);
    let (b0, b1, bf) = lattice(rgb[2]);

    let c000 = cube.get(b0, g0, r0);
    let c001 = cube.get(b0, g0, r1);
    let c010 = cube.get(b0, g1, r0);
    let c011 = cube.get(b0, g1, r1);
    let c100 = cube.get(b1, g0, r0);
    let c101 = cube.get(b1, g0, r1);
    let c110 = cube.get(b1, g1, r0);
    let c111 = cube.get(b1, g1, r1);

    let mut out = [0.0f32; 3];
    for i in 0..3 {
        let c00 = lerp(c000[i], c001[i], rf);
        let c10 = lerp(c010[i], c011[i], rf);
        let c01 = lerp(c100[i], c101[i], rf);
        let c11 = lerp(c110[i], c111[i], rf);

        let c0 = lerp(c00, c10, gf);
        let c1 = lerp(c01, c11, gf);

        out[i] = lerp(c0, c1, bf).max(0.0).min(1.0);
    }

    out
}
