//! Incremental redraw engine
//!
//! [`AutoDisplay`] owns a [`Framebuffer`] and a snapshot of the last frame it
//! sent. Each draw diffs the two, rounds the changed rectangle to the
//! alignment grid and commits only that rectangle to its [`UpdateTarget`].
//!
//! DU refreshes are fast but leave ghosts of gray content. With gray tracking
//! on, every region touched only by DU is remembered as pending debt and
//! folded into the next grayscale partial update.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics::{pixelcolor::Gray8, prelude::*, primitives::{PrimitiveStyle, Rectangle}};
//! use it8951::{DisplayMode, PixelFormat};
//! use it8951_redraw::{AutoDisplay, Builder, VirtualTarget};
//!
//! let config = Builder::new().dimensions(64, 32).build().expect("config");
//! let target = VirtualTarget::new(64, 32, PixelFormat::Bpp4);
//! let mut display = AutoDisplay::new(target, config).expect("aligned width");
//!
//! display.clear().expect("clear");
//! Rectangle::new(Point::new(10, 10), Size::new(5, 5))
//!     .into_styled(PrimitiveStyle::with_fill(Gray8::BLACK))
//!     .draw(display.frame_mut())
//!     .expect("draw");
//! display.draw_partial(DisplayMode::Du).expect("flush");
//!
//! assert_eq!(display.target().commits().len(), 2);
//! ```

use alloc::vec::Vec;

use it8951::{DisplayMode, pack_into};

use crate::config::{BuilderError, RedrawConfig};
use crate::diff::{
    BoundingBox, compute_diff_box, extract_region, merge_bounding_box, round_bounding_box,
};
use crate::error::Error;
use crate::framebuffer::{BLACK, Framebuffer, WHITE};
use crate::target::{PackedUpdate, UpdateTarget};

type RedrawResult<T> = Result<(), Error<<T as UpdateTarget>::Error>>;

/// Framebuffer with automatic partial updates
pub struct AutoDisplay<T: UpdateTarget> {
    target: T,
    config: RedrawConfig,
    /// Alignment actually used: `round_to` rounded up to whole packed words
    alignment: u32,
    frame: Framebuffer,
    /// Oriented copy of the last committed frame
    previous: Option<Vec<u8>>,
    /// Regions shown only with DU since the last grayscale refresh
    debt: Option<BoundingBox>,
    region: Vec<u8>,
    words: Vec<u16>,
}

impl<T: UpdateTarget> AutoDisplay<T> {
    /// Create an engine with a white framebuffer
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnalignedWidth` if a frame row does not hold a
    /// whole number of packed words at the target's depth.
    pub fn new(target: T, config: RedrawConfig) -> Result<Self, BuilderError> {
        let per_word = target.pixel_format().pixels_per_word() as u16;
        if config.width % per_word != 0 {
            return Err(BuilderError::UnalignedWidth {
                width: config.width,
                multiple: per_word,
            });
        }
        let alignment = config.round_to.div_ceil(per_word) as u32 * per_word as u32;

        Ok(Self {
            target,
            alignment,
            frame: Framebuffer::new(config.width, config.height),
            config,
            previous: None,
            debt: None,
            region: Vec::new(),
            words: Vec::new(),
        })
    }

    pub fn width(&self) -> u16 {
        self.config.width
    }

    pub fn height(&self) -> u16 {
        self.config.height
    }

    pub fn config(&self) -> &RedrawConfig {
        &self.config
    }

    /// Effective dirty-region granularity
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// The frame being drawn
    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    /// Draw into the frame; nothing reaches the panel until the next draw call
    pub fn frame_mut(&mut self) -> &mut Framebuffer {
        &mut self.frame
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Region still showing DU ghosts, if any
    pub fn pending_debt(&self) -> Option<BoundingBox> {
        self.debt
    }

    /// Whether a frame has been committed since construction
    pub fn has_previous_frame(&self) -> bool {
        self.previous.is_some()
    }

    /// Tear down the engine and hand back the target
    pub fn release(self) -> T {
        self.target
    }

    fn frame_box(&self) -> (u32, u32) {
        (self.config.width as u32, self.config.height as u32)
    }

    /// Send the whole frame and refresh it with `mode`
    pub fn draw_full(&mut self, mode: DisplayMode) -> RedrawResult<T> {
        let (width, height) = self.frame_box();
        let current = self.frame.oriented(self.config.flip);
        let full = BoundingBox::full(width, height);

        self.transmit(&current, full, mode)?;

        if self.config.track_gray {
            self.debt = if mode.is_monochrome() {
                let changed = match &self.previous {
                    Some(previous) => {
                        compute_diff_box(previous, &current, width, height, self.alignment)
                    }
                    None => Some(full),
                };
                merge_bounding_box(self.debt, changed)
            } else {
                None
            };
        }

        self.previous = Some(current);
        Ok(())
    }

    /// Send only what changed since the last draw and refresh it with `mode`
    ///
    /// The first call after construction sends the whole frame. A grayscale
    /// mode also repaints any pending DU debt.
    pub fn draw_partial(&mut self, mode: DisplayMode) -> RedrawResult<T> {
        if self.previous.is_none() {
            return self.draw_full(mode);
        }

        let (width, height) = self.frame_box();
        let current = self.frame.oriented(self.config.flip);
        let changed = self
            .previous
            .as_deref()
            .and_then(|previous| compute_diff_box(previous, &current, width, height, self.alignment));

        let (send, debt) = if !self.config.track_gray {
            (changed, None)
        } else if mode.is_monochrome() {
            (changed, merge_bounding_box(self.debt, changed))
        } else {
            let merged = merge_bounding_box(self.debt, changed)
                .and_then(|bbox| round_bounding_box(bbox, self.alignment))
                .map(|bbox| bbox.clip(width, height));
            (merged, None)
        };

        match send {
            Some(bbox) if !bbox.is_empty() => self.transmit(&current, bbox, mode)?,
            _ => log::trace!("nothing changed, skipping {:?} update", mode),
        }

        self.debt = debt;
        self.previous = Some(current);
        Ok(())
    }

    /// Fill the frame with white and flash the whole panel with INIT
    pub fn clear(&mut self) -> RedrawResult<T> {
        self.frame.fill(WHITE);
        self.draw_full(DisplayMode::Init)
    }

    fn transmit(&mut self, frame: &[u8], bbox: BoundingBox, mode: DisplayMode) -> RedrawResult<T> {
        let (width, _) = self.frame_box();
        extract_region(frame, width, bbox, &mut self.region);

        if mode.is_monochrome() {
            let threshold = self.config.du_threshold;
            for sample in self.region.iter_mut() {
                *sample = if *sample < threshold { BLACK } else { WHITE };
            }
        }

        let format = self.target.pixel_format();
        pack_into(&self.region, format, &mut self.words)?;

        let area = bbox.to_area();
        log::debug!(
            "committing {}x{} at ({}, {}) with {:?}, {} words",
            area.w,
            area.h,
            area.x,
            area.y,
            mode,
            self.words.len()
        );

        self.target
            .commit(PackedUpdate {
                area,
                format,
                mode,
                words: &self.words,
            })
            .map_err(Error::Target)
    }
}
