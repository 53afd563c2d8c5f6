//! Error types for the redraw engine

use core::fmt::Debug;

use it8951::PackError;

/// Errors that can occur while flushing the framebuffer
///
/// Generic over the update target's error so callers can match on the
/// underlying driver or canvas failure.
#[derive(Debug)]
pub enum Error<E: Debug> {
    /// The update target rejected the commit
    Target(E),
    /// The changed region could not be packed
    Pack(PackError),
}

impl<E: Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Target(e) => write!(f, "Update target error: {e:?}"),
            Error::Pack(e) => write!(f, "Packing error: {e}"),
        }
    }
}

impl<E: Debug> core::error::Error for Error<E> {}

impl<E: Debug> From<PackError> for Error<E> {
    fn from(err: PackError) -> Self {
        Error::Pack(err)
    }
}

/// Errors that can occur when building the engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// No dimensions given, and none could be read from the device
    MissingDimensions,
    /// Width or height is zero or too large for the controller
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
    /// Rounding granularity of zero
    InvalidRounding,
    /// Width does not hold a whole number of packed words per row
    UnalignedWidth {
        /// Frame width
        width: u16,
        /// Pixels per packed word of the target
        multiple: u16,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BuilderError::MissingDimensions => write!(f, "Frame dimensions must be specified"),
            BuilderError::InvalidDimensions { width, height } => {
                write!(f, "Invalid frame dimensions: {width}x{height}")
            }
            BuilderError::InvalidRounding => write!(f, "Rounding granularity must be non-zero"),
            BuilderError::UnalignedWidth { width, multiple } => {
                write!(f, "Frame width {width} is not a multiple of {multiple}")
            }
        }
    }
}

impl core::error::Error for BuilderError {}
