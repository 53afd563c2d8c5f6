//! Grayscale framebuffer the caller draws into
//!
//! One byte per pixel, row-major, 0x00 black to 0xFF white. Implements
//! [`DrawTarget`] so `embedded-graphics` primitives, text and images can be
//! rendered directly.

use alloc::vec;
use alloc::vec::Vec;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::{Gray8, GrayColor},
    primitives::Rectangle,
};

/// White sample value
pub const WHITE: u8 = 0xFF;
/// Black sample value
pub const BLACK: u8 = 0x00;

/// 8-bit grayscale frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Create a white framebuffer
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![WHITE; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Raw samples
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw samples (length is fixed)
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width as u32 && y < self.height as u32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Sample at (x, y), or `None` outside the frame
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a sample; writes outside the frame are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = value;
        }
    }

    /// Fill the whole frame with one value
    pub fn fill(&mut self, value: u8) {
        self.pixels.fill(value);
    }

    /// Copy of the frame, rotated 180 degrees when `flip` is set
    pub(crate) fn oriented(&self, flip: bool) -> Vec<u8> {
        if flip {
            // a half turn of a row-major grid reverses it
            self.pixels.iter().rev().copied().collect()
        } else {
            self.pixels.clone()
        }
    }
}

impl DrawTarget for Framebuffer {
    type Color = Gray8;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color.luma());
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let width = self.width as usize;
        let (x0, x1) = (area.top_left.x as usize, bottom_right.x as usize + 1);
        for y in area.top_left.y as usize..=bottom_right.y as usize {
            self.pixels[y * width + x0..y * width + x1].fill(color.luma());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.luma());
        Ok(())
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}
