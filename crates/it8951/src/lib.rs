//! IT8951 E-Paper Display Controller Driver
//!
//! A driver for the ITE IT8951 timing controller found on large parallel
//! e-paper panels, talking to the host over SPI.
//!
//! ## Features
//!
//! - `no_std` compatible (needs `alloc`)
//! - `embedded-hal` v1.0 support
//! - Device-info discovery and VCOM programming
//! - Packed 2/3/4/8 bpp image loads, full or area-scoped
//! - All refresh waveforms, 1bpp display and display-from-address
//! - Burst memory access and register access
//! - Bounded, cancellable display-ready waits
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use it8951::{Area, Builder, DisplayMode, Interface, It8951, PixelFormat, Rotation};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let rst = MockPin;
//! # let hrdy = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, rst, hrdy, MockDelay);
//! let config = match Builder::new().vcom(-2.06).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = It8951::new(interface, config);
//! if display.initialize(&mut delay).is_err() {
//!     return;
//! }
//! let area = Area::new(0, 0, 64, 64);
//! let white = [0xFFu8; 64 * 64];
//! let _ = display.load_image_pixels(Some(area), PixelFormat::Bpp4, Rotation::Rotate0, &white);
//! let _ = display.display_area(area, DisplayMode::Gc16);
//! ```

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

/// IT8951 command, register and preamble definitions
pub mod command;
/// Driver configuration types and builder
pub mod config;
/// Core controller operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Packed pixel codecs
pub mod pack;

pub use config::{
    Builder, Config, DEFAULT_MIN_PANEL_DIMENSION, EndianType, VCOM_MAX, VCOM_MIN,
    VersionByteOrder,
};
pub use display::{Area, DeviceInfo, DisplayMode, It8951, Rotation};
pub use error::{BuilderError, Error};
pub use interface::InterfaceError;
pub use interface::{DEFAULT_READY_TIMEOUT_MS, DisplayInterface, Interface};
pub use pack::{PackError, PixelFormat, pack, pack_into, unpack};
