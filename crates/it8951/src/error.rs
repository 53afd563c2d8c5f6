//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and controller operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during controller operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//! - [`PackError`](crate::pack::PackError) - Malformed pixel buffers
//!
//! ## Example
//!
//! ```
//! use it8951::{Builder, BuilderError};
//!
//! // VCOM must be negative
//! let result = Builder::new().vcom(1.0).build();
//! assert!(matches!(result, Err(BuilderError::InvalidVcom(_))));
//! ```

use crate::interface::DisplayInterface;
use crate::pack::PackError;

/// Errors that can occur when talking to the controller
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
/// `Debug` does not require the interface type to be `Debug`.
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying transport error unmodified.
    Interface(I::Error),
    /// VCOM outside the device-safe range (-5.0, 0.0) volts
    InvalidVcom(f32),
    /// Pixel buffer length is not a multiple of the packing ratio
    InvalidBufferLength {
        /// Number of samples provided
        len: usize,
        /// Required multiple
        multiple: usize,
    },
    /// Operation requires a successful `initialize` first
    NotInitialized,
    /// Device-info query returned an implausible panel size
    ImplausibleDeviceInfo {
        /// Reported width
        width: u16,
        /// Reported height
        height: u16,
    },
    /// Area does not fit on the panel
    AreaOutOfBounds {
        /// Area x
        x: u16,
        /// Area y
        y: u16,
        /// Area width
        w: u16,
        /// Area height
        h: u16,
    },
    /// Display did not become ready within the configured timeout
    Timeout,
    /// Ready wait was cancelled by the caller
    Cancelled,
}

impl<I: DisplayInterface> core::fmt::Debug for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => f.debug_tuple("Interface").field(e).finish(),
            Error::InvalidVcom(v) => f.debug_tuple("InvalidVcom").field(v).finish(),
            Error::InvalidBufferLength { len, multiple } => f
                .debug_struct("InvalidBufferLength")
                .field("len", len)
                .field("multiple", multiple)
                .finish(),
            Error::NotInitialized => f.write_str("NotInitialized"),
            Error::ImplausibleDeviceInfo { width, height } => f
                .debug_struct("ImplausibleDeviceInfo")
                .field("width", width)
                .field("height", height)
                .finish(),
            Error::AreaOutOfBounds { x, y, w, h } => f
                .debug_struct("AreaOutOfBounds")
                .field("x", x)
                .field("y", y)
                .field("w", w)
                .field("h", h)
                .finish(),
            Error::Timeout => f.write_str("Timeout"),
            Error::Cancelled => f.write_str("Cancelled"),
        }
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "Interface error: {e:?}"),
            Error::InvalidVcom(v) => write!(f, "VCOM {v} V outside (-5.0, 0.0)"),
            Error::InvalidBufferLength { len, multiple } => {
                write!(f, "Buffer length {len} is not a multiple of {multiple}")
            }
            Error::NotInitialized => write!(f, "Controller not initialized"),
            Error::ImplausibleDeviceInfo { width, height } => {
                write!(f, "Implausible panel size reported: {width}x{height}")
            }
            Error::AreaOutOfBounds { x, y, w, h } => {
                write!(f, "Area {w}x{h} at ({x}, {y}) exceeds panel")
            }
            Error::Timeout => write!(f, "Timeout waiting for display ready"),
            Error::Cancelled => write!(f, "Ready wait cancelled"),
        }
    }
}

impl<I: DisplayInterface> core::error::Error for Error<I> {}

impl<I: DisplayInterface> From<PackError> for Error<I> {
    fn from(err: PackError) -> Self {
        match err {
            PackError::InvalidBufferLength { len, multiple } => {
                Error::InvalidBufferLength { len, multiple }
            }
        }
    }
}

/// Errors that can occur when building configuration
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// VCOM outside the device-safe range
    InvalidVcom(f32),
    /// Poll interval of zero would spin on the bus
    InvalidPollInterval,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BuilderError::InvalidVcom(v) => {
                write!(f, "VCOM {v} V outside (-5.0, 0.0)")
            }
            BuilderError::InvalidPollInterval => write!(f, "Poll interval must be non-zero"),
        }
    }
}

impl core::error::Error for BuilderError {}
