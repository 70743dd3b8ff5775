//! Filter table loading
//!
//! Two on-disk formats are accepted:
//! - **binary**: `33³ × 3` little-endian `f32`, axis order
//!   `[blue][green][red][channel]`, no header
//! - **cube**: Adobe/Resolve `.cube` text with `LUT_3D_SIZE 33`
//!
//! ```text
//! # Comment
//! TITLE "Warm"
//! LUT_3D_SIZE 33
//! 0.000000 0.000000 0.000000
//! ...
//! 1.000000 1.000000 1.000000
//! ```
//!
//! `.cube` data lines list red fastest, then green, then blue, which is the
//! same order as the in-memory layout, so no reordering is needed.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cube::{ColorCube, CUBE_SIZE, CUBE_VALUES};
use crate::error::{Error, Result};

/// On-disk table format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Adobe/Resolve `.cube` text
    Cube,
    /// Raw little-endian `f32` values
    Binary,
}

impl TableFormat {
    /// Guess the format from a file extension (`.cube`, otherwise binary)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("cube") => TableFormat::Cube,
            _ => TableFormat::Binary,
        }
    }
}

/// Parse a binary table.
///
/// `declared_size` is the cube side length and must match the fixed cube
/// size. The byte count must be exact.
pub fn load_table(bytes: &[u8], declared_size: usize) -> Result<ColorCube> {
    if declared_size != CUBE_SIZE {
        return Err(Error::LutSize {
            expected: CUBE_SIZE,
            actual: declared_size,
        });
    }

    let expected = CUBE_VALUES * 4;
    if bytes.len() != expected {
        return Err(Error::LutParse(format!(
            "expected {} bytes for a {}³ table, got {}",
            expected,
            CUBE_SIZE,
            bytes.len()
        )));
    }

    let values = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    ColorCube::from_values(values)
}

/// Read a table file in the given format
pub fn read_table<P: AsRef<Path>>(path: P, format: TableFormat) -> Result<ColorCube> {
    let path = path.as_ref();
    let cube = match format {
        TableFormat::Cube => {
            let reader = BufReader::new(File::open(path)?);
            parse_cube(reader)?
        }
        TableFormat::Binary => {
            let bytes = std::fs::read(path)?;
            load_table(&bytes, CUBE_SIZE)?
        }
    };
    tracing::debug!("Loaded {:?} table from {}", format, path.display());
    Ok(cube)
}

/// Parse a `.cube` file from a reader
pub fn parse_cube<R: BufRead>(reader: R) -> Result<ColorCube> {
    let mut size: Option<usize> = None;
    let mut values: Vec<f32> = Vec::with_capacity(CUBE_VALUES);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with("TITLE") || line.starts_with("LUT_3D_INPUT_RANGE") {
            continue;
        } else if line.starts_with("LUT_3D_SIZE") {
            let parsed = parse_size(line)?;
            if parsed != CUBE_SIZE {
                return Err(Error::LutSize {
                    expected: CUBE_SIZE,
                    actual: parsed,
                });
            }
            size = Some(parsed);
        } else if line.starts_with("LUT_1D_SIZE") {
            return Err(Error::LutParse("expected 3D LUT, found 1D".into()));
        } else if line.starts_with("DOMAIN_MIN") {
            check_domain(line, 0.0)?;
        } else if line.starts_with("DOMAIN_MAX") {
            check_domain(line, 1.0)?;
        } else {
            let rgb = parse_rgb(line)
                .map_err(|e| Error::LutParse(format!("line {}: {}", line_no + 1, e)))?;
            values.extend_from_slice(&rgb);
        }
    }

    if size.is_none() {
        return Err(Error::LutParse("missing LUT_3D_SIZE".into()));
    }

    if values.len() != CUBE_VALUES {
        return Err(Error::LutParse(format!(
            "expected {} entries, found {}",
            CUBE_VALUES / 3,
            values.len() / 3
        )));
    }

    ColorCube::from_values(values)
}

fn parse_size(line: &str) -> Result<usize> {
    line.split_whitespace()
        .nth(1)
        .ok_or_else(|| Error::LutParse("invalid size line".into()))?
        .parse()
        .map_err(|_| Error::LutParse("invalid size value".into()))
}

fn check_domain(line: &str, expected: f32) -> Result<()> {
    let parts: Vec<&str> = line.split_whitespace().skip(1).collect();
    if parts.len() != 3 {
        return Err(Error::LutParse(format!("invalid domain line: {}", line)));
    }
    for part in parts {
        let v: f32 = part
            .parse()
            .map_err(|_| Error::LutParse(format!("invalid domain value: {}", part)))?;
        if v != expected {
            return Err(Error::LutParse(format!(
                "unsupported domain {} (only 0..1 tables are accepted)",
                line
            )));
        }
    }
    Ok(())
}

fn parse_rgb(line: &str) -> Result<[f32; 3]> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::LutParse(format!("invalid RGB line: {}", line)));
    }
    let mut rgb = [0.0f32; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| Error::LutParse(format!("invalid value: {}", part)))?;
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::{apply, CUBE_MAX_INDEX};
    use std::fmt::Write as _;
    use std::io::Cursor;

    fn identity_cube_text() -> String {
        let mut text = String::from("# generated\nTITLE \"Identity\"\nLUT_3D_SIZE 33\n");
        text.push_str("DOMAIN_MIN 0.0 0.0 0.0\nDOMAIN_MAX 1.0 1.0 1.0\n\n");
        let n = CUBE_MAX_INDEX as f32;
        for b in 0..CUBE_SIZE {
            for g in 0..CUBE_SIZE {
                for r in 0..CUBE_SIZE {
                    writeln!(text, "{:.6} {:.6} {:.6}", r as f32 / n, g as f32 / n, b as f32 / n)
                        .unwrap();
                }
            }
        }
        text
    }

    #[test]
    fn test_load_table_roundtrip_bytes() {
        let cube = ColorCube::from_fn(|[r, g, b]| [g, b, r]);
        let loaded = load_table(&cube.to_bytes(), CUBE_SIZE).unwrap();
        assert_eq!(loaded, cube);
    }

    #[test]
    fn test_load_table_rejects_wrong_size() {
        let bytes = ColorCube::identity().to_bytes();
        assert!(matches!(load_table(&bytes, 17), Err(Error::LutSize { .. })));
        assert!(matches!(
            load_table(&bytes[..bytes.len() - 4], CUBE_SIZE),
            Err(Error::LutParse(_))
        ));
    }

    #[test]
    fn test_load_table_rejects_out_of_range() {
        let mut bytes = ColorCube::identity().to_bytes();
        bytes[..4].copy_from_slice(&(-0.5f32).to_le_bytes());
        assert!(load_table(&bytes, CUBE_SIZE).is_err());
    }

    #[test]
    fn test_parse_cube_identity() {
        let cube = parse_cube(Cursor::new(identity_cube_text())).unwrap();
        let out = apply([0.2, 0.4, 0.6], Some(&cube));
        assert!((out[0] - 0.2).abs() < 1e-4);
        assert!((out[1] - 0.4).abs() < 1e-4);
        assert!((out[2] - 0.6).abs() < 1e-4);
        // Red varies fastest in the file
        assert_eq!(cube.get(0, 0, 1), [0.03125, 0.0, 0.0]);
    }

    #[test]
    fn test_parse_cube_rejects_other_sizes() {
        let text = "LUT_3D_SIZE 2\n0 0 0\n1 0 0\n0 1 0\n1 1 0\n0 0 1\n1 0 1\n0 1 1\n1 1 1\n";
        assert!(matches!(
            parse_cube(Cursor::new(text)),
            Err(Error::LutSize {
                expected: 33,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_parse_cube_rejects_1d_and_domain() {
        assert!(parse_cube(Cursor::new("LUT_1D_SIZE 3\n0 0 0\n")).is_err());
        let text = identity_cube_text().replace("DOMAIN_MAX 1.0 1.0 1.0", "DOMAIN_MAX 2.0 2.0 2.0");
        assert!(parse_cube(Cursor::new(text)).is_err());
    }

    #[test]
    fn test_parse_cube_truncated() {
        let text: String = identity_cube_text().lines().take(100).collect::<Vec<_>>().join("\n");
        assert!(matches!(parse_cube(Cursor::new(text)), Err(Error::LutParse(_))));
    }

    #[test]
    fn test_read_table_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let cube_path = dir.path().join("identity.cube");
        std::fs::write(&cube_path, identity_cube_text()).unwrap();
        let bin_path = dir.path().join("swap.bin");
        let swap = ColorCube::from_fn(|[r, g, b]| [b, g, r]);
        std::fs::write(&bin_path, swap.to_bytes()).unwrap();

        assert_eq!(TableFormat::from_path(&cube_path), TableFormat::Cube);
        assert_eq!(TableFormat::from_path(&bin_path), TableFormat::Binary);
        assert!(read_table(&cube_path, TableFormat::Cube).is_ok());
        assert_eq!(read_table(&bin_path, TableFormat::Binary).unwrap(), swap);
        assert!(matches!(
            read_table(dir.path().join("missing.cube"), TableFormat::Cube),
            Err(Error::Io(_))
        ));
    }
}
