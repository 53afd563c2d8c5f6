//! Engine configuration types and builder

pub use crate::error::BuilderError;

/// Default alignment of dirty regions, in pixels
pub const DEFAULT_ROUND_TO: u16 = 4;

/// Samples below this become black under DU, the rest white
pub const DEFAULT_DU_THRESHOLD: u8 = 0xB0;

/// Redraw engine configuration
///
/// Use `Builder` to create a RedrawConfig.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedrawConfig {
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels
    pub height: u16,
    /// Dirty-region edges are rounded outward to multiples of this
    pub round_to: u16,
    /// DU threshold
    pub du_threshold: u8,
    /// Rotate the frame 180 degrees before sending it
    pub flip: bool,
    /// Remember DU-only regions until the next grayscale refresh
    pub track_gray: bool,
}

impl RedrawConfig {
    /// Number of pixels in the frame
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Builder for constructing engine configuration
///
/// # Example
///
/// ```
/// use it8951_redraw::Builder;
///
/// let config = Builder::new()
///     .dimensions(800, 600)
///     .flip(true)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.round_to, 4);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Builder {
    dimensions: Option<(u32, u32)>,
    round_to: u16,
    du_threshold: u8,
    flip: bool,
    track_gray: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            dimensions: None,
            round_to: DEFAULT_ROUND_TO,
            du_threshold: DEFAULT_DU_THRESHOLD,
            flip: false,
            track_gray: true,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set frame dimensions (required)
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Set the dirty-region alignment
    pub fn round_to(mut self, value: u16) -> Self {
        self.round_to = value;
        self
    }

    /// Set the DU black/white threshold
    pub fn du_threshold(mut self, value: u8) -> Self {
        self.du_threshold = value;
        self
    }

    /// Mount the panel upside down
    pub fn flip(mut self, value: bool) -> Self {
        self.flip = value;
        self
    }

    /// Enable or disable DU ghosting bookkeeping
    pub fn track_gray(mut self, value: bool) -> Self {
        self.track_gray = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set,
    /// `BuilderError::InvalidDimensions` if either is zero or exceeds
    /// `u16::MAX`, and `BuilderError::InvalidRounding` if `round_to` is zero.
    pub fn build(self) -> Result<RedrawConfig, BuilderError> {
        let (width, height) = self.dimensions.ok_or(BuilderError::MissingDimensions)?;
        let invalid = BuilderError::InvalidDimensions { width, height };
        let w = u16::try_from(width).map_err(|_| invalid)?;
        let h = u16::try_from(height).map_err(|_| invalid)?;
        if w == 0 || h == 0 {
            return Err(invalid);
        }
        if self.round_to == 0 {
            return Err(BuilderError::InvalidRounding);
        }
        Ok(RedrawConfig {
            width: w,
            height: h,
            round_to: self.round_to,
            du_threshold: self.du_threshold,
            flip: self.flip,
            track_gray: self.track_gray,
        })
    }
}
