//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for talking to the IT8951 controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The IT8951 host interface requires:
//! - SPI bus (MOSI + MISO + SCK, CS handled by the [`SpiDevice`])
//! - 2 GPIO pins:
//!   - **RST**: Reset (output, active low)
//!   - **HRDY**: Host ready (input, high when the controller accepts a transfer)
//!
//! Every transaction starts with a 16-bit preamble selecting the command,
//! data-write or data-read channel. Words are sent most significant byte first.
//!
//! ## Example
//!
//! ```rust,ignore
//! use it8951::{DisplayInterface, Interface};
//! use it8951::command::{PREAMBLE_COMMAND, SYS_RUN};
//!
//! let mut interface = Interface::new(spi_device, rst_pin, hrdy_pin, delay);
//! interface.write(PREAMBLE_COMMAND, &[SYS_RUN])?;
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::{Operation, SpiDevice};

/// Default time to wait for the HRDY line before giving up
pub const DEFAULT_READY_TIMEOUT_MS: u32 = 30_000;

/// Interval between HRDY polls
const READY_POLL_US: u32 = 100;

/// Words converted per SPI frame on writes
const WRITE_CHUNK_WORDS: usize = 256;

/// Word-oriented transport to the IT8951 controller
///
/// This trait abstracts over the physical link so the
/// [`It8951`](crate::display::It8951) driver can run on any bus, including
/// recording mocks in tests.
///
/// ## Implementing
///
/// Implementations must wait for the controller to signal readiness before
/// each transaction. The driver never retries a failed call.
pub trait DisplayInterface {
    /// Error type for interface operations
    type Error: Debug;

    /// Send `preamble` followed by `words` in a single transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or a GPIO fails.
    fn write(&mut self, preamble: u16, words: &[u16]) -> Result<(), Self::Error>;

    /// Send `preamble` and fill `words` with the controller's reply
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or a GPIO fails.
    fn read(&mut self, preamble: u16, words: &mut [u16]) -> Result<(), Self::Error>;

    /// Pulse the reset line low for `pulse_ms` milliseconds
    ///
    /// # Errors
    ///
    /// Returns an error if the reset pin cannot be driven.
    fn reset<D: DelayNs>(&mut self, delay: &mut D, pulse_ms: u32) -> Result<(), Self::Error>;
}

/// Errors that can occur at the interface level
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
    /// Timeout waiting for the HRDY line
    Timeout,
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InterfaceError::Spi(e) => write!(f, "SPI error: {e:?}"),
            InterfaceError::Pin(e) => write!(f, "Pin error: {e:?}"),
            InterfaceError::Timeout => write!(f, "Timeout waiting for host ready"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// SPI implementation of [`DisplayInterface`]
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `HRDY` - Host ready pin implementing [`InputPin`]
/// * `D` - Delay used while polling HRDY
pub struct Interface<SPI, RST, HRDY, D> {
    spi: SPI,
    rst: RST,
    hrdy: HRDY,
    delay: D,
    /// Upper bound on a single HRDY wait
    ready_timeout_ms: u32,
}

impl<SPI, RST, HRDY, D> Interface<SPI, RST, HRDY, D>
where
    SPI: SpiDevice,
    RST: OutputPin,
    HRDY: InputPin,
    D: DelayNs,
{
    /// Create a new Interface with the default HRDY timeout
    pub fn new(spi: SPI, rst: RST, hrdy: HRDY, delay: D) -> Self {
        Self::with_timeout(spi, rst, hrdy, delay, DEFAULT_READY_TIMEOUT_MS)
    }

    /// Create a new Interface with a custom HRDY timeout
    pub fn with_timeout(spi: SPI, rst: RST, hrdy: HRDY, delay: D, ready_timeout_ms: u32) -> Self {
        Self {
            spi,
            rst,
            hrdy,
            delay,
            ready_timeout_ms,
        }
    }

    /// Give back the owned peripherals
    pub fn release(self) -> (SPI, RST, HRDY, D) {
        (self.spi, self.rst, self.hrdy, self.delay)
    }
}

impl<SPI, RST, HRDY, D, PinErr> Interface<SPI, RST, HRDY, D>
where
    SPI: SpiDevice,
    RST: OutputPin<Error = PinErr>,
    HRDY: InputPin<Error = PinErr>,
    D: DelayNs,
{
    fn wait_host_ready(&mut self) -> Result<(), InterfaceError<SPI::Error, PinErr>> {
        let max_polls = self.ready_timeout_ms.saturating_mul(1000 / READY_POLL_US);
        let mut polls = 0u32;

        loop {
            match self.hrdy.is_high() {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    if polls >= max_polls {
                        log::warn!("HRDY stayed low for {} ms", self.ready_timeout_ms);
                        return Err(InterfaceError::Timeout);
                    }
                    self.delay.delay_us(READY_POLL_US);
                    polls += 1;
                }
                Err(e) => return Err(InterfaceError::Pin(e)),
            }
        }
    }
}

impl<SPI, RST, HRDY, D, PinErr> DisplayInterface for Interface<SPI, RST, HRDY, D>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    RST: OutputPin<Error = PinErr>,
    HRDY: InputPin<Error = PinErr>,
    PinErr: Debug,
    D: DelayNs,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    /// Long payloads go out as several frames of at most
    /// `WRITE_CHUNK_WORDS` words, each with its own preamble, converted
    /// through a fixed stack buffer.
    fn write(&mut self, preamble: u16, words: &[u16]) -> Result<(), Self::Error> {
        let preamble = preamble.to_be_bytes();
        if words.is_empty() {
            self.wait_host_ready()?;
            return self
                .spi
                .transaction(&mut [Operation::Write(&preamble)])
                .map_err(InterfaceError::Spi);
        }

        let mut bytes = [0u8; WRITE_CHUNK_WORDS * 2];
        for chunk in words.chunks(WRITE_CHUNK_WORDS) {
            let payload = &mut bytes[..chunk.len() * 2];
            for (pair, word) in payload.chunks_exact_mut(2).zip(chunk) {
                pair.copy_from_slice(&word.to_be_bytes());
            }

            self.wait_host_ready()?;
            self.spi
                .transaction(&mut [Operation::Write(&preamble), Operation::Write(payload)])
                .map_err(InterfaceError::Spi)?;
        }
        Ok(())
    }

    fn read(&mut self, preamble: u16, words: &mut [u16]) -> Result<(), Self::Error> {
        self.wait_host_ready()?;

        let preamble = preamble.to_be_bytes();
        // The controller clocks out two dummy bytes before the payload
        let mut dummy = [0u8; 2];
        let mut payload = alloc::vec![0u8; words.len() * 2];

        self.spi
            .transaction(&mut [
                Operation::Write(&preamble),
                Operation::Read(&mut dummy),
                Operation::Read(&mut payload),
            ])
            .map_err(InterfaceError::Spi)?;

        for (word, bytes) in words.iter_mut().zip(payload.chunks_exact(2)) {
            *word = u16::from_be_bytes([bytes[0], bytes[1]]);
        }
        Ok(())
    }

    fn reset<DL: DelayNs>(&mut self, delay: &mut DL, pulse_ms: u32) -> Result<(), Self::Error> {
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        delay.delay_ms(pulse_ms);
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::ErrorType as SpiErrorType;

    #[derive(Default)]
    struct MockSpi {
        written: Vec<u8>,
        reply: Vec<u8>,
        transactions: usize,
    }

    impl SpiErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            self.transactions += 1;
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.written.extend_from_slice(*bytes),
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = if self.reply.is_empty() {
                                0
                            } else {
                                self.reply.remove(0)
                            };
                        }
                    }
                    _ => {}
                }
            }
            Ok(())
        }
    }

    struct MockPin {
        level: bool,
    }

    impl PinErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.level = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.level = true;
            Ok(())
        }
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.level)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.level)
        }
    }

    struct MockDelay;
    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn interface(hrdy: bool) -> Interface<MockSpi, MockPin, MockPin, MockDelay> {
        Interface::with_timeout(
            MockSpi::default(),
            MockPin { level: true },
            MockPin { level: hrdy },
            MockDelay,
            1,
        )
    }

    #[test]
    fn test_write_sends_preamble_then_big_endian_words() {
        let mut interface = interface(true);
        interface.write(0x6000, &[0x0302, 0xABCD]).unwrap();
        let (spi, ..) = interface.release();
        assert_eq!(spi.written, [0x60, 0x00, 0x03, 0x02, 0xAB, 0xCD]);
    }

    #[test]
    fn test_long_write_is_split_into_preambled_frames() {
        let mut interface = interface(true);
        let words: Vec<u16> = (0..(2 * WRITE_CHUNK_WORDS + 1) as u16).collect();
        interface.write(0x0000, &words).unwrap();
        let (spi, ..) = interface.release();

        assert_eq!(spi.transactions, 3);
        assert_eq!(spi.written.len(), 3 * 2 + words.len() * 2);
        // second frame starts after the first preamble and chunk
        let second = 2 + WRITE_CHUNK_WORDS * 2;
        assert_eq!(spi.written[second..second + 4], [0x00, 0x00, 0x01, 0x00]);
        // last frame carries the single trailing word
        let last = spi.written.len() - 4;
        assert_eq!(spi.written[last..], [0x00, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn test_empty_write_sends_preamble_only() {
        let mut interface = interface(true);
        interface.write(0x6000, &[]).unwrap();
        let (spi, ..) = interface.release();
        assert_eq!(spi.transactions, 1);
        assert_eq!(spi.written, [0x60, 0x00]);
    }

    #[test]
    fn test_read_skips_dummy_bytes() {
        let mut interface = interface(true);
        interface.spi.reply = alloc::vec![0xFF, 0xFF, 0x07, 0x50, 0x05, 0x78];
        let mut words = [0u16; 2];
        interface.read(0x1000, &mut words).unwrap();
        assert_eq!(words, [0x0750, 0x0578]);
        assert_eq!(interface.spi.written, [0x10, 0x00]);
    }

    #[test]
    fn test_write_times_out_when_host_never_ready() {
        let mut interface = interface(false);
        let result = interface.write(0x0000, &[0x0001]);
        assert!(matches!(result, Err(InterfaceError::Timeout)));
        assert!(interface.spi.written.is_empty());
    }

    #[test]
    fn test_reset_leaves_line_high() {
        let mut interface = interface(true);
        interface.reset(&mut MockDelay, 100).unwrap();
        assert!(interface.rst.level);
    }
}
