//! Error types for camfilter

use thiserror::Error;

use crate::types::PlaneKind;

/// Result type alias for camfilter operations
pub type Result<T> = std::result::Result<T, Error>;

/// camfilter error type
#[derive(Error, Debug)]
pub enum Error {
    // Frame errors
    #[error("{0} plane is not mapped")]
    UnmappedPlane(PlaneKind),

    #[error("{plane} plane too small: need {required} bytes, got {actual}")]
    PlaneTooSmall {
        plane: PlaneKind,
        required: usize,
        actual: usize,
    },

    #[error("Invalid frame geometry: {0}")]
    InvalidGeometry(String),

    #[error("Failed to allocate {0} byte output buffer")]
    Allocation(usize),

    // Filter errors
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Filter name is reserved: {0}")]
    ReservedFilterName(String),

    // LUT errors
    #[error("LUT parse error: {0}")]
    LutParse(String),

    #[error("LUT size mismatch: expected {expected}, got {actual}")]
    LutSize { expected: usize, actual: usize },

    // General errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error only affects the frame being processed
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Error::UnmappedPlane(_)
                | Error::PlaneTooSmall { .. }
                | Error::InvalidGeometry(_)
                | Error::Allocation(_)
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
