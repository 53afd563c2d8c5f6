//! Core controller operations

use alloc::string::String;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use crate::command::{
    BGVR, DEV_INFO_WORDS, DPY_AREA, DPY_BUF_AREA, GET_DEV_INFO, I80CPCR, I80CPCR_PACKED, LD_IMG,
    LD_IMG_AREA, LD_IMG_END, LISAR, LUTAFSR, MEM_BST_END, MEM_BST_RD_S, MEM_BST_RD_T, MEM_BST_WR,
    PREAMBLE_COMMAND, PREAMBLE_READ_DATA, PREAMBLE_WRITE_DATA, REG_RD, REG_WR, SLEEP, STANDBY,
    SYS_RUN, UP1SR, UP1SR_1BPP, VCOM, VCOM_GET, VCOM_SET,
};
use crate::config::{Config, VersionByteOrder, vcom_in_range};
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::pack::{PixelFormat, pack};

type DisplayResult<I, T = ()> = core::result::Result<T, Error<I>>;

/// Rectangle on the panel, in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Area {
    /// X coordinate of the left edge
    pub x: u16,
    /// Y coordinate of the top edge
    pub y: u16,
    /// Width
    pub w: u16,
    /// Height
    pub h: u16,
}

impl Area {
    /// Create a new area
    pub fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the area covers no pixels
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of pixels covered
    pub fn pixel_count(&self) -> usize {
        self.w as usize * self.h as usize
    }

    /// Whether the area lies within a `width` x `height` panel
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.x as u32 + self.w as u32 <= width && self.y as u32 + self.h as u32 <= height
    }
}

/// Waveform used to refresh an area
///
/// Modes trade refresh speed against gray levels and ghosting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u16)]
pub enum DisplayMode {
    /// Full clear to white, slow flashing
    Init = 0,
    /// Direct update: two levels, fast, lossy
    Du = 1,
    /// 16 levels with flashing, best quality
    #[default]
    Gc16 = 2,
    /// 16 levels, non-flashing, for white backgrounds
    Gl16 = 3,
    /// GL16 with ghost reduction
    Glr16 = 4,
    /// GL16 with ghost reduction and dithering
    Gld16 = 5,
    /// Two levels, fastest, for animation
    A2 = 6,
    /// Four levels, fast
    Du4 = 7,
}

impl DisplayMode {
    /// Controller code for this waveform
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Whether the waveform collapses every pixel to black or white
    pub const fn is_monochrome(self) -> bool {
        matches!(self, DisplayMode::Du)
    }
}

/// Rotation applied by the controller while loading an image
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u16)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0 = 0,
    /// Rotate 90 degrees clockwise
    Rotate90 = 1,
    /// Rotate 180 degrees
    Rotate180 = 2,
    /// Rotate 270 degrees clockwise
    Rotate270 = 3,
}

/// Identity reported by the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Panel width in pixels
    pub width: u32,
    /// Panel height in pixels
    pub height: u32,
    /// Base address of the image buffer in controller memory
    pub image_buffer_address: u32,
    /// Controller firmware version
    pub firmware_version: String,
    /// Waveform LUT version
    pub lut_version: String,
}

fn decode_version(words: &[u16], order: VersionByteOrder) -> String {
    words
        .iter()
        .flat_map(|w| {
            let [hi, lo] = w.to_be_bytes();
            match order {
                VersionByteOrder::HighFirst => [hi, lo],
                VersionByteOrder::LowFirst => [lo, hi],
            }
        })
        .take_while(|&b| b != 0)
        .map(char::from)
        .collect()
}

fn millivolts(vcom: f32) -> u16 {
    // vcom is negative and validated, so the product is in (0, 5000)
    (-1000.0 * vcom + 0.5) as u16
}

fn split(value: u32) -> [u16; 2] {
    [(value & 0xFFFF) as u16, (value >> 16) as u16]
}

/// IT8951 controller driver
///
/// Owns the transport for its whole lifetime; use [`It8951::release`] to get
/// it back.
pub struct It8951<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Driver configuration
    config: Config,
    /// Set by a successful `initialize`
    info: Option<DeviceInfo>,
}

impl<I> It8951<I>
where
    I: DisplayInterface,
{
    /// Create a new driver instance
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            info: None,
        }
    }

    /// Reset and wake the controller, read its identity, enable packed writes
    /// and program VCOM
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidVcom`] before any bus traffic if the configured VCOM
    ///   is out of range
    /// - [`Error::ImplausibleDeviceInfo`] if the panel reports a size below
    ///   the configured minimum
    /// - [`Error::Interface`] on transport failure
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I, &DeviceInfo> {
        let vcom = self.config.vcom;
        if !vcom_in_range(vcom) {
            return Err(Error::InvalidVcom(vcom));
        }
        self.info = None;

        self.interface
            .reset(delay, self.config.reset_pulse_ms)
            .map_err(Error::Interface)?;
        self.run()?;

        let info = self.query_device_info()?;
        log::info!(
            "IT8951 {}x{} buffer at {:#010X}, firmware {:?}, LUT {:?}",
            info.width,
            info.height,
            info.image_buffer_address,
            info.firmware_version,
            info.lut_version
        );

        self.write_register(I80CPCR, I80CPCR_PACKED)?;
        self.set_vcom(vcom)?;

        Ok(self.info.insert(info))
    }

    fn query_device_info(&mut self) -> DisplayResult<I, DeviceInfo> {
        self.send_command(GET_DEV_INFO)?;
        let mut words = [0u16; DEV_INFO_WORDS];
        self.read_data(&mut words)?;

        let (width, height) = (words[0], words[1]);
        let min = self.config.min_panel_dimension.max(1);
        if width < min || height < min {
            return Err(Error::ImplausibleDeviceInfo { width, height });
        }

        let order = self.config.version_byte_order;
        Ok(DeviceInfo {
            width: width as u32,
            height: height as u32,
            image_buffer_address: (words[3] as u32) << 16 | words[2] as u32,
            firmware_version: decode_version(&words[4..12], order),
            lut_version: decode_version(&words[12..20], order),
        })
    }

    /// Identity read during `initialize`
    pub fn device_info(&self) -> DisplayResult<I, &DeviceInfo> {
        self.info.as_ref().ok_or(Error::NotInitialized)
    }

    /// Whether `initialize` has completed
    pub fn is_initialized(&self) -> bool {
        self.info.is_some()
    }

    /// Panel size as (width, height)
    pub fn dimensions(&self) -> DisplayResult<I, (u32, u32)> {
        self.device_info().map(|info| (info.width, info.height))
    }

    /// Read VCOM in volts
    pub fn get_vcom(&mut self) -> DisplayResult<I, f32> {
        self.send_command_args(VCOM, &[VCOM_GET])?;
        let raw = self.read_word()?;
        Ok(-(raw as f32) / 1000.0)
    }

    /// Program VCOM in volts
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVcom`] unless -5.0 < `vcom` < 0.0.
    pub fn set_vcom(&mut self, vcom: f32) -> DisplayResult<I> {
        if !vcom_in_range(vcom) {
            return Err(Error::InvalidVcom(vcom));
        }
        let mv = millivolts(vcom);
        log::info!("setting VCOM to {} mV", mv);
        self.send_command_args(VCOM, &[VCOM_SET, mv])
    }

    /// Block until the LUT engines are idle
    ///
    /// Polls `LUTAFSR` every `poll_interval_ms` up to `ready_timeout_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the configured timeout elapses.
    pub fn wait_display_ready<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.poll_ready(delay, None)
    }

    /// Like [`wait_display_ready`](Self::wait_display_ready), but stops with
    /// [`Error::Cancelled`] as soon as `cancel` is set
    pub fn wait_display_ready_cancellable<D: DelayNs>(
        &mut self,
        delay: &mut D,
        cancel: &AtomicBool,
    ) -> DisplayResult<I> {
        self.poll_ready(delay, Some(cancel))
    }

    fn poll_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        cancel: Option<&AtomicBool>,
    ) -> DisplayResult<I> {
        let interval = self.config.poll_interval_ms;
        let mut waited_ms = 0u32;

        loop {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                log::warn!("display ready wait cancelled after {} ms", waited_ms);
                return Err(Error::Cancelled);
            }
            if self.read_register(LUTAFSR)? == 0 {
                return Ok(());
            }
            if let Some(timeout) = self.config.ready_timeout_ms {
                if waited_ms >= timeout {
                    log::warn!("display still busy after {} ms", waited_ms);
                    return Err(Error::Timeout);
                }
            }
            delay.delay_ms(interval);
            waited_ms = waited_ms.saturating_add(interval);
        }
    }

    /// Load packed words into the image buffer
    ///
    /// With `area == None` the whole buffer is loaded. The caller must have
    /// waited for display-ready since the last refresh.
    pub fn load_image(
        &mut self,
        area: Option<Area>,
        format: PixelFormat,
        rotation: Rotation,
        words: &[u16],
    ) -> DisplayResult<I> {
        let address = self.device_info()?.image_buffer_address;
        if let Some(area) = area {
            self.check_area(area)?;
        }

        self.set_image_buffer_base(address)?;

        let arg = (self.config.endian as u16) << 8 | format.code() << 4 | rotation as u16;
        match area {
            Some(a) => self.send_command_args(LD_IMG_AREA, &[arg, a.x, a.y, a.w, a.h])?,
            None => self.send_command_args(LD_IMG, &[arg])?,
        }

        log::debug!("loading {} words ({:?}) into {:?}", words.len(), format, area);
        self.interface
            .write(PREAMBLE_WRITE_DATA, words)
            .map_err(Error::Interface)?;

        self.send_command(LD_IMG_END)
    }

    /// Pack one-byte samples and load them
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBufferLength`] if the sample count does not
    /// fill whole words.
    pub fn load_image_pixels(
        &mut self,
        area: Option<Area>,
        format: PixelFormat,
        rotation: Rotation,
        samples: &[u8],
    ) -> DisplayResult<I> {
        let words = pack(samples, format)?;
        self.load_image(area, format, rotation, &words)
    }

    fn set_image_buffer_base(&mut self, address: u32) -> DisplayResult<I> {
        let [lo, hi] = split(address);
        self.write_register(LISAR + 2, hi)?;
        self.write_register(LISAR, lo)
    }

    /// Refresh `area` from the image buffer with `mode`
    ///
    /// The panel starts refreshing asynchronously; wait for display-ready
    /// before the next load.
    pub fn display_area(&mut self, area: Area, mode: DisplayMode) -> DisplayResult<I> {
        self.device_info()?;
        self.check_area(area)?;
        log::debug!("refreshing {:?} with {:?}", area, mode);
        self.send_command_args(DPY_AREA, &[area.x, area.y, area.w, area.h, mode.code()])
    }

    /// Refresh `area` treating the image buffer as 1bpp with the given gray levels
    pub fn display_area_1bpp<D: DelayNs>(
        &mut self,
        delay: &mut D,
        area: Area,
        mode: DisplayMode,
        background: u8,
        foreground: u8,
    ) -> DisplayResult<I> {
        self.device_info()?;
        self.check_area(area)?;

        let up1sr = self.read_register(UP1SR + 2)?;
        self.write_register(UP1SR + 2, up1sr | UP1SR_1BPP)?;
        self.write_register(BGVR, (background as u16) << 8 | foreground as u16)?;

        self.display_area(area, mode)?;
        self.wait_display_ready(delay)?;

        let up1sr = self.read_register(UP1SR + 2)?;
        self.write_register(UP1SR + 2, up1sr & !UP1SR_1BPP)
    }

    /// Refresh `area` from an image stored at `address` instead of the default buffer
    pub fn display_area_buf(
        &mut self,
        area: Area,
        mode: DisplayMode,
        address: u32,
    ) -> DisplayResult<I> {
        self.device_info()?;
        self.check_area(area)?;
        let [lo, hi] = split(address);
        self.send_command_args(
            DPY_BUF_AREA,
            &[area.x, area.y, area.w, area.h, mode.code(), lo, hi],
        )
    }

    fn check_area(&self, area: Area) -> DisplayResult<I> {
        let (width, height) = self.dimensions()?;
        if area.fits(width, height) {
            Ok(())
        } else {
            Err(Error::AreaOutOfBounds {
                x: area.x,
                y: area.y,
                w: area.w,
                h: area.h,
            })
        }
    }

    /// Arm a burst read of `count` words at `address`
    pub fn burst_read_trigger(&mut self, address: u32, count: u32) -> DisplayResult<I> {
        let [a0, a1] = split(address);
        let [c0, c1] = split(count);
        self.send_command_args(MEM_BST_RD_T, &[a0, a1, c0, c1])
    }

    /// Start the armed burst read
    pub fn burst_read_start(&mut self) -> DisplayResult<I> {
        self.send_command(MEM_BST_RD_S)
    }

    /// Arm a burst write of `count` words at `address`
    pub fn burst_write(&mut self, address: u32, count: u32) -> DisplayResult<I> {
        let [a0, a1] = split(address);
        let [c0, c1] = split(count);
        self.send_command_args(MEM_BST_WR, &[a0, a1, c0, c1])
    }

    /// Finish a burst transfer
    pub fn burst_end(&mut self) -> DisplayResult<I> {
        self.send_command(MEM_BST_END)
    }

    /// Read `buf.len()` words of controller memory starting at `address`
    pub fn burst_read(&mut self, address: u32, buf: &mut [u16]) -> DisplayResult<I> {
        self.burst_read_trigger(address, buf.len() as u32)?;
        self.burst_read_start()?;
        self.read_data(buf)?;
        self.burst_end()
    }

    /// Write `words` to controller memory starting at `address`
    pub fn burst_write_words(&mut self, address: u32, words: &[u16]) -> DisplayResult<I> {
        self.burst_write(address, words.len() as u32)?;
        self.write_data(words)?;
        self.burst_end()
    }

    /// Read a controller register
    pub fn read_register(&mut self, address: u16) -> DisplayResult<I, u16> {
        self.send_command_args(REG_RD, &[address])?;
        self.read_word()
    }

    /// Write a controller register
    pub fn write_register(&mut self, address: u16, value: u16) -> DisplayResult<I> {
        self.send_command_args(REG_WR, &[address, value])
    }

    /// Leave standby or sleep
    pub fn run(&mut self) -> DisplayResult<I> {
        self.send_command(SYS_RUN)
    }

    /// Enter standby
    pub fn standby(&mut self) -> DisplayResult<I> {
        self.send_command(STANDBY)
    }

    /// Enter sleep
    pub fn sleep(&mut self) -> DisplayResult<I> {
        self.send_command(SLEEP)
    }

    /// Send a command word
    fn send_command(&mut self, command: u16) -> DisplayResult<I> {
        self.interface
            .write(PREAMBLE_COMMAND, &[command])
            .map_err(Error::Interface)
    }

    /// Send a command followed by one data transaction per argument
    fn send_command_args(&mut self, command: u16, args: &[u16]) -> DisplayResult<I> {
        self.send_command(command)?;
        for &arg in args {
            self.write_data(&[arg])?;
        }
        Ok(())
    }

    fn write_data(&mut self, words: &[u16]) -> DisplayResult<I> {
        self.interface
            .write(PREAMBLE_WRITE_DATA, words)
            .map_err(Error::Interface)
    }

    fn read_data(&mut self, words: &mut [u16]) -> DisplayResult<I> {
        self.interface
            .read(PREAMBLE_READ_DATA, words)
            .map_err(Error::Interface)
    }

    fn read_word(&mut self) -> DisplayResult<I, u16> {
        let mut word = [0u16; 1];
        self.read_data(&mut word)?;
        Ok(word[0])
    }

    /// Access the driver configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tear down the driver and hand back the transport
    pub fn release(self) -> I {
        self.interface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{PREAMBLE_COMMAND as CMD, PREAMBLE_WRITE_DATA as DATA};
    use crate::config::Builder;
    use alloc::collections::VecDeque;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::convert::Infallible;

    /// Records every transaction and answers reads from a script
    struct MockInterface {
        pub writes: Vec<(u16, Vec<u16>)>,
        pub reads: VecDeque<u16>,
        /// Answer once the script is exhausted
        pub idle: u16,
        pub resets: usize,
    }

    impl MockInterface {
        pub fn new() -> Self {
            Self {
                writes: Vec::new(),
                reads: VecDeque::new(),
                idle: 0,
                resets: 0,
            }
        }

        pub fn script(&mut self, words: &[u16]) {
            self.reads.extend(words.iter().copied());
        }
    }

    impl DisplayInterface for MockInterface {
        type Error = Infallible;

        fn write(&mut self, preamble: u16, words: &[u16]) -> Result<(), Self::Error> {
            self.writes.push((preamble, words.to_vec()));
            Ok(())
        }

        fn read(&mut self, _preamble: u16, words: &mut [u16]) -> Result<(), Self::Error> {
            for word in words.iter_mut() {
                *word = self.reads.pop_front().unwrap_or(self.idle);
            }
            Ok(())
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D, _pulse_ms: u32) -> Result<(), Self::Error> {
            self.resets += 1;
            Ok(())
        }
    }

    struct MockDelay;
    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn pack_chars(text: &str) -> [u16; 8] {
        let mut words = [0u16; 8];
        for (i, pair) in text.as_bytes().chunks(2).take(8).enumerate() {
            let hi = pair[0] as u16;
            let lo = pair.get(1).copied().unwrap_or(0) as u16;
            words[i] = hi << 8 | lo;
        }
        words
    }

    fn dev_info_words(width: u16, height: u16, address: u32) -> Vec<u16> {
        let mut words = vec![width, height, address as u16, (address >> 16) as u16];
        words.extend_from_slice(&pack_chars("SWv_0.1.1"));
        words.extend_from_slice(&pack_chars("M841_TFA2812"));
        words
    }

    fn test_driver() -> It8951<MockInterface> {
        let config = Builder::new().vcom(-2.06).build().unwrap();
        It8951::new(MockInterface::new(), config)
    }

    fn initialized_driver() -> It8951<MockInterface> {
        let mut driver = test_driver();
        driver
            .interface
            .script(&dev_info_words(1872, 1404, 0x0012_36E0));
        driver.initialize(&mut MockDelay).unwrap();
        driver.interface.writes.clear();
        driver
    }

    #[test]
    fn test_initialize_reads_device_info() {
        let mut driver = test_driver();
        driver
            .interface
            .script(&dev_info_words(1872, 1404, 0x0012_36E0));

        let info = driver.initialize(&mut MockDelay).unwrap().clone();

        assert_eq!(info.width, 1872);
        assert_eq!(info.height, 1404);
        assert_eq!(info.image_buffer_address, 0x0012_36E0);
        assert_eq!(info.firmware_version, "SWv_0.1.1");
        assert_eq!(info.lut_version, "M841_TFA2812");
        assert_eq!(driver.interface.resets, 1);
        assert!(driver.is_initialized());
    }

    #[test]
    fn test_initialize_command_sequence() {
        let mut driver = test_driver();
        driver.interface.script(&dev_info_words(800, 600, 0));
        driver.initialize(&mut MockDelay).unwrap();

        let expected: Vec<(u16, Vec<u16>)> = vec![
            (CMD, vec![SYS_RUN]),
            (CMD, vec![GET_DEV_INFO]),
            (CMD, vec![REG_WR]),
            (DATA, vec![I80CPCR]),
            (DATA, vec![I80CPCR_PACKED]),
            (CMD, vec![VCOM]),
            (DATA, vec![VCOM_SET]),
            (DATA, vec![2060]),
        ];
        assert_eq!(driver.interface.writes, expected);
    }

    #[test]
    fn test_initialize_rejects_bad_vcom_before_bus_traffic() {
        let mut config = Builder::new().build().unwrap();
        config.vcom = 0.5;
        let mut driver = It8951::new(MockInterface::new(), config);

        let result = driver.initialize(&mut MockDelay);

        assert!(matches!(result, Err(Error::InvalidVcom(_))));
        assert_eq!(driver.interface.resets, 0);
        assert!(driver.interface.writes.is_empty());
    }

    #[test]
    fn test_initialize_zero_size_is_protocol_error() {
        let mut driver = test_driver();
        driver.interface.script(&dev_info_words(0, 0, 0));
        let result = driver.initialize(&mut MockDelay);
        assert!(matches!(
            result,
            Err(Error::ImplausibleDeviceInfo {
                width: 0,
                height: 0
            })
        ));
        assert!(!driver.is_initialized());
    }

    #[test]
    fn test_initialize_width_one_is_protocol_error() {
        let mut driver = test_driver();
        driver.interface.script(&dev_info_words(1, 600, 0));
        let result = driver.initialize(&mut MockDelay);
        assert!(matches!(
            result,
            Err(Error::ImplausibleDeviceInfo { width: 1, .. })
        ));
    }

    #[test]
    fn test_version_low_byte_first() {
        let config = Builder::new()
            .version_byte_order(VersionByteOrder::LowFirst)
            .build()
            .unwrap();
        let mut driver = It8951::new(MockInterface::new(), config);
        let mut words = vec![800, 600, 0, 0];
        words.extend_from_slice(&[u16::from_le_bytes(*b"v1"), 0, 0, 0, 0, 0, 0, 0]);
        words.extend_from_slice(&[0; 8]);
        driver.interface.script(&words);

        let info = driver.initialize(&mut MockDelay).unwrap();
        assert_eq!(info.firmware_version, "v1");
        assert_eq!(info.lut_version, "");
    }

    #[test]
    fn test_vcom_round_trip() {
        let mut driver = test_driver();
        driver.set_vcom(-2.06).unwrap();
        assert_eq!(
            driver.interface.writes.last(),
            Some(&(DATA, vec![2060u16]))
        );

        driver.interface.script(&[2060]);
        assert_eq!(driver.get_vcom().unwrap(), -2.06);
        let n = driver.interface.writes.len();
        assert_eq!(driver.interface.writes[n - 1], (DATA, vec![VCOM_GET]));
        assert_eq!(driver.interface.writes[n - 2], (CMD, vec![VCOM]));
    }

    #[test]
    fn test_set_vcom_validates_range() {
        let mut driver = test_driver();
        assert!(matches!(driver.set_vcom(0.0), Err(Error::InvalidVcom(_))));
        assert!(matches!(driver.set_vcom(-5.0), Err(Error::InvalidVcom(_))));
        assert!(matches!(driver.set_vcom(-7.5), Err(Error::InvalidVcom(_))));
        assert!(driver.interface.writes.is_empty());
    }

    #[test]
    fn test_operations_require_initialize() {
        let mut driver = test_driver();
        let area = Area::new(0, 0, 8, 8);
        assert!(matches!(
            driver.display_area(area, DisplayMode::Gc16),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            driver.load_image(None, PixelFormat::Bpp4, Rotation::Rotate0, &[]),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(driver.device_info(), Err(Error::NotInitialized)));
        assert!(driver.interface.writes.is_empty());
    }

    #[test]
    fn test_read_register() {
        let mut driver = test_driver();
        driver.interface.script(&[0xBEEF]);
        assert_eq!(driver.read_register(0x1234).unwrap(), 0xBEEF);
        assert_eq!(
            driver.interface.writes,
            vec![(CMD, vec![REG_RD]), (DATA, vec![0x1234])]
        );
    }

    #[test]
    fn test_wait_display_ready_polls_until_idle() {
        let mut driver = test_driver();
        driver.interface.script(&[1, 1, 0]);
        driver.wait_display_ready(&mut MockDelay).unwrap();
        let polls = driver
            .interface
            .writes
            .iter()
            .filter(|(p, w)| *p == DATA && w == &vec![LUTAFSR])
            .count();
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_wait_display_ready_times_out() {
        let config = Builder::new()
            .poll_interval_ms(10)
            .ready_timeout_ms(Some(50))
            .build()
            .unwrap();
        let mut driver = It8951::new(MockInterface::new(), config);
        driver.interface.idle = 1;
        let result = driver.wait_display_ready(&mut MockDelay);
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[test]
    fn test_wait_display_ready_cancelled() {
        let mut driver = test_driver();
        driver.interface.idle = 1;
        let cancel = AtomicBool::new(true);
        let result = driver.wait_display_ready_cancellable(&mut MockDelay, &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_load_image_area_sequence() {
        let mut driver = initialized_driver();
        let area = Area::new(4, 8, 4, 2);
        driver
            .load_image(Some(area), PixelFormat::Bpp4, Rotation::Rotate0, &[0x1111, 0x2222])
            .unwrap();

        let arg = PixelFormat::Bpp4.code() << 4;
        let expected: Vec<(u16, Vec<u16>)> = vec![
            (CMD, vec![REG_WR]),
            (DATA, vec![LISAR + 2]),
            (DATA, vec![0x0012]),
            (CMD, vec![REG_WR]),
            (DATA, vec![LISAR]),
            (DATA, vec![0x36E0]),
            (CMD, vec![LD_IMG_AREA]),
            (DATA, vec![arg]),
            (DATA, vec![4]),
            (DATA, vec![8]),
            (DATA, vec![4]),
            (DATA, vec![2]),
            (DATA, vec![0x1111, 0x2222]),
            (CMD, vec![LD_IMG_END]),
        ];
        assert_eq!(driver.interface.writes, expected);
    }

    #[test]
    fn test_load_image_full_buffer_argument() {
        let mut driver = initialized_driver();
        driver
            .load_image(None, PixelFormat::Bpp8, Rotation::Rotate180, &[0])
            .unwrap();
        let ld = driver
            .interface
            .writes
            .iter()
            .position(|w| *w == (CMD, vec![LD_IMG]))
            .unwrap();
        assert_eq!(driver.interface.writes[ld + 1], (DATA, vec![0x0032]));
    }

    #[test]
    fn test_load_image_pixels_packs_and_loads() {
        let mut driver = initialized_driver();
        let samples = [0x00, 0xFF, 0x80, 0x10, 0xF0, 0x0F, 0x70, 0x20];
        driver
            .load_image_pixels(
                Some(Area::new(0, 0, 4, 2)),
                PixelFormat::Bpp4,
                Rotation::Rotate0,
                &samples,
            )
            .unwrap();

        let arg = PixelFormat::Bpp4.code() << 4;
        let expected: Vec<(u16, Vec<u16>)> = vec![
            (CMD, vec![REG_WR]),
            (DATA, vec![LISAR + 2]),
            (DATA, vec![0x0012]),
            (CMD, vec![REG_WR]),
            (DATA, vec![LISAR]),
            (DATA, vec![0x36E0]),
            (CMD, vec![LD_IMG_AREA]),
            (DATA, vec![arg]),
            (DATA, vec![0]),
            (DATA, vec![0]),
            (DATA, vec![4]),
            (DATA, vec![2]),
            (DATA, vec![0x18F0, 0x270F]),
            (CMD, vec![LD_IMG_END]),
        ];
        assert_eq!(driver.interface.writes, expected);
    }

    #[test]
    fn test_load_image_pixels_rejects_partial_words() {
        let mut driver = initialized_driver();
        let result = driver.load_image_pixels(None, PixelFormat::Bpp4, Rotation::Rotate0, &[0; 5]);
        assert!(matches!(
            result,
            Err(Error::InvalidBufferLength {
                len: 5,
                multiple: 4
            })
        ));
        assert!(driver.interface.writes.is_empty());
    }

    #[test]
    fn test_display_area_arguments() {
        let mut driver = initialized_driver();
        driver
            .display_area(Area::new(0, 4, 16, 8), DisplayMode::Du)
            .unwrap();
        let expected: Vec<(u16, Vec<u16>)> = vec![
            (CMD, vec![DPY_AREA]),
            (DATA, vec![0]),
            (DATA, vec![4]),
            (DATA, vec![16]),
            (DATA, vec![8]),
            (DATA, vec![1]),
        ];
        assert_eq!(driver.interface.writes, expected);
    }

    #[test]
    fn test_display_area_out_of_bounds() {
        let mut driver = initialized_driver();
        let result = driver.display_area(Area::new(1870, 0, 8, 8), DisplayMode::Gc16);
        assert!(matches!(result, Err(Error::AreaOutOfBounds { .. })));
    }

    #[test]
    fn test_display_area_buf_splits_address() {
        let mut driver = initialized_driver();
        driver
            .display_area_buf(Area::new(0, 0, 8, 8), DisplayMode::Gl16, 0x0013_0000)
            .unwrap();
        let tail: Vec<u16> = driver.interface.writes[6..]
            .iter()
            .map(|(_, w)| w[0])
            .collect();
        assert_eq!(tail, vec![0x0000, 0x0013]);
    }

    #[test]
    fn test_display_area_1bpp_restores_mode_bit() {
        let mut driver = initialized_driver();
        // UP1SR high half, LUTAFSR idle, UP1SR high half again
        driver.interface.script(&[0x0001, 0x0000, 0x0005]);
        driver
            .display_area_1bpp(&mut MockDelay, Area::new(0, 0, 8, 8), DisplayMode::A2, 0xF0, 0x00)
            .unwrap();

        let register_writes: Vec<(u16, u16)> = driver
            .interface
            .writes
            .windows(3)
            .filter(|w| w[0] == (CMD, vec![REG_WR]))
            .map(|w| (w[1].1[0], w[2].1[0]))
            .collect();
        assert_eq!(
            register_writes,
            vec![(UP1SR + 2, 0x0005), (BGVR, 0xF000), (UP1SR + 2, 0x0001)]
        );
    }

    #[test]
    fn test_burst_write_splits_address_and_count() {
        let mut driver = test_driver();
        driver.burst_write(0x0012_36E0, 0x0001_0002).unwrap();
        let expected: Vec<(u16, Vec<u16>)> = vec![
            (CMD, vec![MEM_BST_WR]),
            (DATA, vec![0x36E0]),
            (DATA, vec![0x0012]),
            (DATA, vec![0x0002]),
            (DATA, vec![0x0001]),
        ];
        assert_eq!(driver.interface.writes, expected);
    }

    #[test]
    fn test_burst_write_words_sequence() {
        let mut driver = test_driver();
        driver
            .burst_write_words(0x0012_36E0, &[0xAAAA, 0x5555, 0x0F0F])
            .unwrap();
        let expected: Vec<(u16, Vec<u16>)> = vec![
            (CMD, vec![MEM_BST_WR]),
            (DATA, vec![0x36E0]),
            (DATA, vec![0x0012]),
            (DATA, vec![3]),
            (DATA, vec![0]),
            (DATA, vec![0xAAAA, 0x5555, 0x0F0F]),
            (CMD, vec![MEM_BST_END]),
        ];
        assert_eq!(driver.interface.writes, expected);
    }

    #[test]
    fn test_burst_read_sequence() {
        let mut driver = test_driver();
        driver.interface.script(&[7, 8, 9]);
        let mut buf = [0u16; 3];
        driver.burst_read(0x0001_0000, &mut buf).unwrap();
        assert_eq!(buf, [7, 8, 9]);

        let commands: Vec<u16> = driver
            .interface
            .writes
            .iter()
            .filter(|(p, _)| *p == CMD)
            .map(|(_, w)| w[0])
            .collect();
        assert_eq!(commands, vec![MEM_BST_RD_T, MEM_BST_RD_S, MEM_BST_END]);
        assert_eq!(driver.interface.writes[1], (DATA, vec![0x0000]));
        assert_eq!(driver.interface.writes[2], (DATA, vec![0x0001]));
        assert_eq!(driver.interface.writes[3], (DATA, vec![3]));
    }

    #[test]
    fn test_power_commands() {
        let mut driver = test_driver();
        driver.run().unwrap();
        driver.standby().unwrap();
        driver.sleep().unwrap();
        assert_eq!(
            driver.interface.writes,
            vec![
                (CMD, vec![SYS_RUN]),
                (CMD, vec![STANDBY]),
                (CMD, vec![SLEEP])
            ]
        );
    }

    #[derive(Debug)]
    struct BusDown;

    struct FailingInterface;

    impl DisplayInterface for FailingInterface {
        type Error = BusDown;

        fn write(&mut self, _preamble: u16, _words: &[u16]) -> Result<(), BusDown> {
            Err(BusDown)
        }

        fn read(&mut self, _preamble: u16, _words: &mut [u16]) -> Result<(), BusDown> {
            Err(BusDown)
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D, _pulse_ms: u32) -> Result<(), BusDown> {
            Ok(())
        }
    }

    #[test]
    fn test_transport_errors_propagate() {
        let mut driver = It8951::new(FailingInterface, Builder::new().build().unwrap());
        assert!(matches!(
            driver.initialize(&mut MockDelay),
            Err(Error::Interface(BusDown))
        ));
        assert!(matches!(
            driver.read_register(LUTAFSR),
            Err(Error::Interface(BusDown))
        ));
    }
}
