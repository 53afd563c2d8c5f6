//! Incremental redraw engine for IT8951 e-paper panels.
//! Tracks what changed in a grayscale framebuffer and sends only that.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

extern crate alloc;

pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod framebuffer;
pub mod target;
pub mod virtual_target;

pub use config::{Builder, DEFAULT_DU_THRESHOLD, DEFAULT_ROUND_TO, RedrawConfig};
pub use diff::{BoundingBox, compute_diff_box, merge_bounding_box, round_bounding_box};
pub use engine::AutoDisplay;
pub use error::{BuilderError, Error};
pub use framebuffer::Framebuffer;
pub use target::{DeviceTarget, PackedUpdate, UpdateTarget};
pub use virtual_target::{CommitRecord, VirtualTarget, VirtualTargetError};

use embedded_hal::delay::DelayNs;
use it8951::{DisplayInterface, PixelFormat};

/// Redraw engine driving a physical panel
///
/// This is a type alias for the engine over [`DeviceTarget`].
pub type AutoEpdDisplay<I, D> = AutoDisplay<DeviceTarget<I, D>>;

/// Redraw engine over an in-memory canvas, for testing without a panel
pub type VirtualEpdDisplay = AutoDisplay<VirtualTarget>;

impl<I, D> AutoDisplay<DeviceTarget<I, D>>
where
    I: DisplayInterface,
    D: DelayNs,
{
    /// Build an engine sized from the initialized driver's device info
    ///
    /// Dimensions set on `builder` are replaced by the panel's.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if the driver has not been
    /// initialized.
    pub fn from_device(target: DeviceTarget<I, D>, builder: Builder) -> Result<Self, BuilderError> {
        let (width, height) = target
            .driver()
            .dimensions()
            .map_err(|_| BuilderError::MissingDimensions)?;
        let config = builder.dimensions(width, height).build()?;
        Self::new(target, config)
    }
}

impl AutoDisplay<VirtualTarget> {
    /// Build an engine over a fresh canvas of the configured size
    pub fn new_virtual(config: RedrawConfig, format: PixelFormat) -> Result<Self, BuilderError> {
        let target = VirtualTarget::new(config.width, config.height, format);
        Self::new(target, config)
    }
}
