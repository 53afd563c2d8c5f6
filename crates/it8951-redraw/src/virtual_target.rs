//! In-memory stand-in for a panel.
//!
//! Commits are unpacked and pasted into a canvas, so tests and desktop
//! previews see exactly what the panel would show at the chosen depth.

use alloc::vec;
use alloc::vec::Vec;

use it8951::{Area, DisplayMode, PixelFormat, unpack};

use crate::framebuffer::WHITE;
use crate::target::{PackedUpdate, UpdateTarget};

/// What one commit touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitRecord {
    pub area: Area,
    pub mode: DisplayMode,
}

/// Errors raised by [`VirtualTarget`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualTargetError {
    /// Area does not fit on the canvas
    AreaOutOfBounds(Area),
    /// Word count does not match the area
    LengthMismatch {
        /// Samples carried by the words
        samples: usize,
        /// Pixels in the area
        expected: usize,
    },
}

impl core::fmt::Display for VirtualTargetError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VirtualTargetError::AreaOutOfBounds(area) => {
                write!(f, "Area {area:?} exceeds canvas")
            }
            VirtualTargetError::LengthMismatch { samples, expected } => {
                write!(f, "Update carries {samples} samples, area needs {expected}")
            }
        }
    }
}

impl core::error::Error for VirtualTargetError {}

/// Canvas that records every commit
pub struct VirtualTarget {
    width: u16,
    height: u16,
    format: PixelFormat,
    canvas: Vec<u8>,
    commits: Vec<CommitRecord>,
    words_sent: usize,
}

impl VirtualTarget {
    /// Create a white canvas
    pub fn new(width: u16, height: u16, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            canvas: vec![WHITE; width as usize * height as usize],
            commits: Vec::new(),
            words_sent: 0,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// What the panel would currently show
    pub fn canvas(&self) -> &[u8] {
        &self.canvas
    }

    /// Commits in arrival order
    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    /// Total packed words received
    pub fn words_sent(&self) -> usize {
        self.words_sent
    }

    /// Forget recorded commits, keeping the canvas
    pub fn clear_commits(&mut self) {
        self.commits.clear();
        self.words_sent = 0;
    }
}

impl UpdateTarget for VirtualTarget {
    type Error = VirtualTargetError;

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn commit(&mut self, update: PackedUpdate<'_>) -> Result<(), Self::Error> {
        let area = update.area;
        if !area.fits(self.width as u32, self.height as u32) {
            return Err(VirtualTargetError::AreaOutOfBounds(area));
        }

        let samples = unpack(update.words, update.format);
        if samples.len() != area.pixel_count() {
            return Err(VirtualTargetError::LengthMismatch {
                samples: samples.len(),
                expected: area.pixel_count(),
            });
        }

        let width = self.width as usize;
        let row_len = area.w as usize;
        if row_len > 0 {
            for (row, chunk) in samples.chunks_exact(row_len).enumerate() {
                let start = (area.y as usize + row) * width + area.x as usize;
                self.canvas[start..start + row_len].copy_from_slice(chunk);
            }
        }

        self.commits.push(CommitRecord {
            area,
            mode: update.mode,
        });
        self.words_sent += update.words.len();
        Ok(())
    }
}
