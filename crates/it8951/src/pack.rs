//! Packed pixel codecs
//!
//! The controller loads images as 16-bit words holding several samples each.
//! Callers work with one byte per pixel (0x00 black, 0xFF white); [`pack`]
//! truncates every sample to the format depth by keeping its most significant
//! bits and places the lowest source index in the lowest bits of the word.
//!
//! | format | samples/word | slot | sample `i` bits |
//! |--------|--------------|------|-----------------|
//! | 2bpp   | 8            | 2    | `2i..2i+2`      |
//! | 3bpp   | 4            | 4    | `4i+1..4i+4`    |
//! | 4bpp   | 4            | 4    | `4i..4i+4`      |
//! | 8bpp   | 2            | 8    | `8i..8i+8`      |

use alloc::vec::Vec;

/// Pixel depth of a packed image load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u16)]
pub enum PixelFormat {
    /// 2 bits per pixel
    Bpp2 = 0,
    /// 3 bits per pixel (stored in 4-bit slots)
    Bpp3 = 1,
    /// 4 bits per pixel
    #[default]
    Bpp4 = 2,
    /// 8 bits per pixel
    Bpp8 = 3,
}

impl PixelFormat {
    /// Source samples combined into one output word
    pub const fn pixels_per_word(self) -> usize {
        match self {
            PixelFormat::Bpp2 => 8,
            PixelFormat::Bpp3 | PixelFormat::Bpp4 => 4,
            PixelFormat::Bpp8 => 2,
        }
    }

    /// Significant bits kept from each sample
    pub const fn bits(self) -> u32 {
        match self {
            PixelFormat::Bpp2 => 2,
            PixelFormat::Bpp3 => 3,
            PixelFormat::Bpp4 => 4,
            PixelFormat::Bpp8 => 8,
        }
    }

    /// Width of one sample slot inside a word
    const fn slot_bits(self) -> u32 {
        match self {
            PixelFormat::Bpp2 => 2,
            PixelFormat::Bpp3 | PixelFormat::Bpp4 => 4,
            PixelFormat::Bpp8 => 8,
        }
    }

    /// Controller code used in the load argument
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Number of words needed for `samples` pixels
    pub const fn words_for(self, samples: usize) -> usize {
        samples / self.pixels_per_word()
    }

    /// Reduce a sample to the value the panel will actually show
    pub const fn truncate(self, sample: u8) -> u8 {
        let shift = 8 - self.bits();
        (sample >> shift) << shift
    }

    fn encode(self, sample: u8) -> u16 {
        match self {
            PixelFormat::Bpp2 => (sample >> 6) as u16,
            PixelFormat::Bpp3 => ((sample & 0xE0) >> 4) as u16,
            PixelFormat::Bpp4 => (sample >> 4) as u16,
            PixelFormat::Bpp8 => sample as u16,
        }
    }

    fn decode(self, slot: u16) -> u8 {
        match self {
            PixelFormat::Bpp2 => (slot as u8) * 0x55,
            PixelFormat::Bpp3 => {
                let v = (slot as u8) >> 1;
                (v << 5) | (v << 2) | (v >> 1)
            }
            PixelFormat::Bpp4 => (slot as u8) * 0x11,
            PixelFormat::Bpp8 => slot as u8,
        }
    }
}

/// Errors raised by the codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
    /// Sample count is not a multiple of the packing ratio
    InvalidBufferLength {
        /// Number of samples provided
        len: usize,
        /// Required multiple
        multiple: usize,
    },
}

impl core::fmt::Display for PackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PackError::InvalidBufferLength { len, multiple } => {
                write!(f, "Buffer length {len} is not a multiple of {multiple}")
            }
        }
    }
}

impl core::error::Error for PackError {}

/// Pack one-byte samples into controller words
///
/// # Errors
///
/// Returns [`PackError::InvalidBufferLength`] if `samples.len()` is not a
/// multiple of [`PixelFormat::pixels_per_word`].
pub fn pack(samples: &[u8], format: PixelFormat) -> Result<Vec<u16>, PackError> {
    let mut out = Vec::new();
    pack_into(samples, format, &mut out)?;
    Ok(out)
}

/// Pack into a reusable output vector (cleared first)
///
/// # Errors
///
/// See [`pack`].
pub fn pack_into(samples: &[u8], format: PixelFormat, out: &mut Vec<u16>) -> Result<(), PackError> {
    let ratio = format.pixels_per_word();
    if samples.len() % ratio != 0 {
        return Err(PackError::InvalidBufferLength {
            len: samples.len(),
            multiple: ratio,
        });
    }

    let slot = format.slot_bits();
    out.clear();
    out.reserve(samples.len() / ratio);
    out.extend(samples.chunks_exact(ratio).map(|chunk| {
        chunk
            .iter()
            .enumerate()
            .fold(0u16, |word, (i, &s)| word | (format.encode(s) << (slot * i as u32)))
    }));
    Ok(())
}

/// Expand packed words back to one byte per pixel
///
/// Values are restored to full scale by bit replication, so white stays 0xFF.
pub fn unpack(words: &[u16], format: PixelFormat) -> Vec<u8> {
    let ratio = format.pixels_per_word();
    let slot = format.slot_bits();
    let mask = (1u16 << slot) - 1;
    let mut out = Vec::with_capacity(words.len() * ratio);
    for &word in words {
        for i in 0..ratio {
            out.push(format.decode((word >> (slot * i as u32)) & mask));
        }
    }
    out
}
