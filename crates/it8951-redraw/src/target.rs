//! Update targets the engine flushes into
//!
//! The engine only needs two things from a backend: the pixel depth it wants
//! and a way to commit one packed rectangle with a waveform. [`DeviceTarget`]
//! sends commits to a real controller; [`VirtualTarget`](crate::VirtualTarget)
//! keeps them in memory.
//!
//! ## Example
//!
//! ```rust,ignore
//! use it8951::{Builder as DriverBuilder, It8951};
//! use it8951_redraw::{AutoEpdDisplay, Builder, DeviceTarget};
//!
//! let mut driver = It8951::new(interface, DriverBuilder::new().vcom(-2.06).build()?);
//! driver.initialize(&mut delay)?;
//! let mut display = AutoEpdDisplay::from_device(DeviceTarget::new(driver, delay), Builder::new())?;
//! ```

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use it8951::{Area, DisplayInterface, DisplayMode, It8951, PixelFormat, Rotation};

/// One packed rectangle ready to be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedUpdate<'a> {
    /// Where the rectangle goes
    pub area: Area,
    /// Depth the words were packed at
    pub format: PixelFormat,
    /// Waveform to refresh with
    pub mode: DisplayMode,
    /// Packed samples, row-major
    pub words: &'a [u16],
}

/// Backend able to show packed rectangles
pub trait UpdateTarget {
    /// Error type for commits
    type Error: Debug;

    /// Depth the target wants rectangles packed at
    fn pixel_format(&self) -> PixelFormat;

    /// Show one rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot accept or display the update.
    fn commit(&mut self, update: PackedUpdate<'_>) -> Result<(), Self::Error>;
}

/// [`UpdateTarget`] backed by an initialized IT8951 driver
///
/// Each commit waits for the previous refresh to finish, loads the rectangle
/// and starts the refresh without waiting for it.
pub struct DeviceTarget<I, D>
where
    I: DisplayInterface,
{
    driver: It8951<I>,
    delay: D,
    format: PixelFormat,
}

impl<I, D> DeviceTarget<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    /// Wrap a driver, packing at 4bpp
    pub fn new(driver: It8951<I>, delay: D) -> Self {
        Self::with_format(driver, delay, PixelFormat::Bpp4)
    }

    /// Wrap a driver with an explicit pixel depth
    pub fn with_format(driver: It8951<I>, delay: D, format: PixelFormat) -> Self {
        Self {
            driver,
            delay,
            format,
        }
    }

    /// Access the driver
    pub fn driver(&self) -> &It8951<I> {
        &self.driver
    }

    /// Access the driver mutably, e.g. for power commands
    pub fn driver_mut(&mut self) -> &mut It8951<I> {
        &mut self.driver
    }

    /// Block until the last refresh has finished
    pub fn wait_display_ready(&mut self) -> Result<(), it8951::Error<I>> {
        self.driver.wait_display_ready(&mut self.delay)
    }

    /// Hand back the driver and delay
    pub fn release(self) -> (It8951<I>, D) {
        (self.driver, self.delay)
    }
}

impl<I, D> UpdateTarget for DeviceTarget<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    type Error = it8951::Error<I>;

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn commit(&mut self, update: PackedUpdate<'_>) -> Result<(), Self::Error> {
        self.driver.wait_display_ready(&mut self.delay)?;
        self.driver.load_image(
            Some(update.area),
            update.format,
            Rotation::Rotate0,
            update.words,
        )?;
        self.driver.display_area(update.area, update.mode)
    }
}
