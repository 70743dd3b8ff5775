//! 3D lookup tables
//!
//! Provides:
//! - Fixed-size color cube storage
//! - Trilinear interpolation
//! - Binary and `.cube` table loading

pub mod cube;
pub mod interp;
pub mod loader;

pub use cube::{ColorCube, CUBE_MAX_INDEX, CUBE_SIZE, CUBE_VALUES};
pub use interp::{apply, trilinear};
pub use loader::{load_table, parse_cube, read_table, TableFormat};
