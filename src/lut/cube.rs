//! Fixed-size 3D color cube storage

use crate::error::{Error, Result};

/// Side length of every filter cube
pub const CUBE_SIZE: usize = 33;

/// Largest valid lattice index along any axis
pub const CUBE_MAX_INDEX: usize = CUBE_SIZE - 1;

/// Number of `f32` values in a cube (`33³ × 3`)
pub const CUBE_VALUES: usize = CUBE_SIZE * CUBE_SIZE * CUBE_SIZE * 3;

/// An immutable 33×33×33 RGB lookup table.
///
/// Values are stored in one flat buffer with the axis order
/// `[blue][green][red][channel]`: red varies fastest, then green, then blue.
/// Every value lies in `[0, 1]`.
///
/// # Example
///
/// ```rust
/// use camfilter::lut::{self, ColorCube};
///
/// let cube = ColorCube::identity();
/// let out = lut::apply([0.5, 0.25, 1.0], Some(&cube));
/// assert!((out[0] - 0.5).abs() < 1e-5);
/// ```
#[derive(Clone, PartialEq)]
pub struct ColorCube {
    data: Box<[f32]>,
}

impl ColorCube {
    /// Flat position of one channel of lattice cell `(b, g, r)`
    #[inline]
    pub const fn index(b: usize, g: usize, r: usize, channel: usize) -> usize {
        ((b * CUBE_SIZE + g) * CUBE_SIZE + r) * 3 + channel
    }

    /// Identity cube: every lattice cell maps to its own coordinate
    pub fn identity() -> Self {
        Self::from_fn(|rgb| rgb)
    }

    /// Build a cube by evaluating `f` at every lattice point.
    ///
    /// `f` receives normalized `[r, g, b]`; results are clamped to `[0, 1]`.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut([f32; 3]) -> [f32; 3],
    {
        let scale = CUBE_MAX_INDEX as f32;
        let mut data = Vec::with_capacity(CUBE_VALUES);

        for b in 0..CUBE_SIZE {
            for g in 0..CUBE_SIZE {
                for r in 0..CUBE_SIZE {
                    let out = f([r as f32 / scale, g as f32 / scale, b as f32 / scale]);
                    data.extend(out.iter().map(|v| v.max(0.0).min(1.0)));
                }
            }
        }

        Self {
            data: data.into_boxed_slice(),
        }
    }

    /// Build a cube from flat values in `[blue][green][red][channel]` order
    pub fn from_values(values: Vec<f32>) -> Result<Self> {
        if values.len() != CUBE_VALUES {
            return Err(Error::LutSize {
                expected: CUBE_VALUES,
                actual: values.len(),
            });
        }

        if let Some((pos, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || !(0.0..=1.0).contains(*v))
        {
            return Err(Error::LutParse(format!(
                "value {} at position {} is outside [0, 1]",
                v, pos
            )));
        }

        Ok(Self {
            data: values.into_boxed_slice(),
        })
    }

    /// RGB stored at lattice cell `(b, g, r)`
    #[inline]
    pub fn get(&self, b: usize, g: usize, r: usize) -> [f32; 3] {
        let idx = Self::index(b, g, r, 0);
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Raw flat values
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Serialize to the binary table format (little-endian `f32`)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

impl std::fmt::Debug for ColorCube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorCube")
            .field("size", &CUBE_SIZE)
            .finish_non_exhaustive()
    }
}
