//! camfilter: camera frame color filtering
//!
//! Converts 4:2:0 YUV camera frames to packed RGBA and grades them through
//! a 33×33×33 color lookup table.
//!
//! # Features
//!
//! - **Convert**: BT.601 limited-range YUV → RGB (I420, NV12, NV21, arbitrary strides)
//! - **Grade**: trilinear interpolation through a 3D LUT
//! - **Filters**: named table registry with a thread-safe active selection
//! - **Load**: `.cube` text and raw binary tables, TOML catalog configuration
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use camfilter::{ColorCube, FilterContext, FilterRegistry, FrameProcessor, YuvFrame};
//!
//! # fn main() -> camfilter::Result<()> {
//! let registry = FilterRegistry::builder()
//!     .register("Invert", ColorCube::from_fn(|[r, g, b]| [1.0 - r, 1.0 - g, 1.0 - b]))?
//!     .build();
//! let context = Arc::new(FilterContext::new(registry));
//! context.activate("Invert")?;
//!
//! let processor = FrameProcessor::new(context);
//! let y = vec![235u8; 4 * 4];
//! let c = vec![128u8; 2 * 2];
//! let image = processor.process(&YuvFrame::i420(&y, &c, &c, 4, 4))?;
//! assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 255]));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod lut;
pub mod processing;
pub mod registry;
pub mod types;

// Re-exports for convenience
pub use config::{Config, FilterConfig, FilterEntry, ProcessorConfig};
pub use error::{Error, Result};
pub use lut::{ColorCube, TableFormat, CUBE_SIZE};
pub use processing::{process_frame, FrameProcessor, Orientation, Rotation};
pub use registry::{FilterContext, FilterRegistry, NO_FILTER};
pub use types::{PlaneKind, Resolution, RgbaImage, Stats, YuvFrame, YuvLayout};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
