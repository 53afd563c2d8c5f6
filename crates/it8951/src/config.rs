//! Driver configuration types and builder

pub use crate::error::BuilderError;

/// Exclusive lower bound for VCOM in volts
pub const VCOM_MIN: f32 = -5.0;
/// Exclusive upper bound for VCOM in volts
pub const VCOM_MAX: f32 = 0.0;

/// Smallest panel edge the driver accepts from the device-info query
///
/// Anything smaller cannot hold a single 2bpp packed word per row.
pub const DEFAULT_MIN_PANEL_DIMENSION: u16 = 8;

/// Check that `vcom` lies strictly between [`VCOM_MIN`] and [`VCOM_MAX`]
pub fn vcom_in_range(vcom: f32) -> bool {
    vcom > VCOM_MIN && vcom < VCOM_MAX
}

/// Byte order of the two characters packed into each version-string word
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VersionByteOrder {
    /// First character in the high byte
    #[default]
    HighFirst,
    /// First character in the low byte
    LowFirst,
}

/// Host endianness announced in the image load argument
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u16)]
pub enum EndianType {
    /// Little endian packed words
    #[default]
    Little = 0,
    /// Big endian packed words
    Big = 1,
}

/// Driver configuration
///
/// Use `Builder` to create a Config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Panel bias voltage in volts (negative)
    pub vcom: f32,
    /// Sleep between display-ready polls
    pub poll_interval_ms: u32,
    /// Give up waiting for display-ready after this long (`None` waits forever)
    pub ready_timeout_ms: Option<u32>,
    /// Reported panel edges below this are treated as a protocol error
    pub min_panel_dimension: u16,
    /// Character order inside the version-string words
    pub version_byte_order: VersionByteOrder,
    /// Endianness announced when loading images
    pub endian: EndianType,
    /// Length of the hardware reset pulse
    pub reset_pulse_ms: u32,
}

/// Builder for constructing driver configuration
///
/// # Example
///
/// ```
/// use it8951::Builder;
///
/// let config = Builder::new()
///     .vcom(-2.06)
///     .ready_timeout_ms(Some(5_000))
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.poll_interval_ms, 10);
/// ```
pub struct Builder {
    vcom: f32,
    poll_interval_ms: u32,
    ready_timeout_ms: Option<u32>,
    min_panel_dimension: u16,
    version_byte_order: VersionByteOrder,
    endian: EndianType,
    reset_pulse_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            vcom: -1.5,
            poll_interval_ms: 10,
            ready_timeout_ms: Some(30_000),
            min_panel_dimension: DEFAULT_MIN_PANEL_DIMENSION,
            version_byte_order: VersionByteOrder::HighFirst,
            endian: EndianType::Little,
            reset_pulse_ms: 100,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set VCOM in volts
    pub fn vcom(mut self, volts: f32) -> Self {
        self.vcom = volts;
        self
    }

    /// Set the display-ready poll interval
    pub fn poll_interval_ms(mut self, value: u32) -> Self {
        self.poll_interval_ms = value;
        self
    }

    /// Set the display-ready timeout (`None` polls forever)
    pub fn ready_timeout_ms(mut self, value: Option<u32>) -> Self {
        self.ready_timeout_ms = value;
        self
    }

    /// Set the smallest plausible panel edge
    pub fn min_panel_dimension(mut self, value: u16) -> Self {
        self.min_panel_dimension = value.max(1);
        self
    }

    /// Set the version-string character order
    pub fn version_byte_order(mut self, value: VersionByteOrder) -> Self {
        self.version_byte_order = value;
        self
    }

    /// Set the announced endianness
    pub fn endian(mut self, value: EndianType) -> Self {
        self.endian = value;
        self
    }

    /// Set the reset pulse length
    pub fn reset_pulse_ms(mut self, value: u32) -> Self {
        self.reset_pulse_ms = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidVcom` if VCOM is outside (-5.0, 0.0) and
    /// `BuilderError::InvalidPollInterval` if the poll interval is zero.
    pub fn build(self) -> Result<Config, BuilderError> {
        if !vcom_in_range(self.vcom) {
            return Err(BuilderError::InvalidVcom(self.vcom));
        }
        if self.poll_interval_ms == 0 {
            return Err(BuilderError::InvalidPollInterval);
        }
        Ok(Config {
            vcom: self.vcom,
            poll_interval_ms: self.poll_interval_ms,
            ready_timeout_ms: self.ready_timeout_ms,
            min_panel_dimension: self.min_panel_dimension,
            version_byte_order: self.version_byte_order,
            endian: self.endian,
            reset_pulse_ms: self.reset_pulse_ms,
        })
    }
}
