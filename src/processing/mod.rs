//! Frame processing module
//!
//! Provides:
//! - YUV to RGB color transform
//! - Per-frame conversion through the active filter
//! - Output rotation and mirroring

mod convert;
mod frame;
mod orient;

pub use convert::{to_u8, yuv_to_rgb};
pub use frame::{process_frame, FrameProcessor};
pub use orient::{orient, Orientation, Rotation};
