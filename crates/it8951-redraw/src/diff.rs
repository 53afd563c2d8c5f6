//! Frame diff helpers for partial e-paper updates.
//!
//! Pure logic (no hardware) so it can be unit-tested without a panel.
//! Frames are row-major, one grayscale byte per pixel.

use alloc::vec::Vec;

use it8951::Area;

/// Rectangle in pixel coordinates, half-open on the max edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Box covering a whole `width` x `height` frame
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixel_count(self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn contains(self, x: u32, y: u32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Whether `other` lies entirely inside this box
    pub fn encloses(self, other: BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Clamp to a `width` x `height` frame
    pub fn clip(self, width: u32, height: u32) -> Self {
        Self::new(
            self.min_x.min(width),
            self.min_y.min(height),
            self.max_x.min(width),
            self.max_y.min(height),
        )
    }

    /// Controller area for this box
    ///
    /// The box must already be clipped to a frame no larger than `u16::MAX`.
    pub(crate) fn to_area(self) -> Area {
        Area::new(
            self.min_x as u16,
            self.min_y as u16,
            self.width() as u16,
            self.height() as u16,
        )
    }
}

/// Round a bounding box outward so every edge is a multiple of `round_to`.
///
/// An empty box stays empty and gives `None`. Max edges past the last
/// multiple representable in `u32` saturate at `u32::MAX`.
pub fn round_bounding_box(bbox: BoundingBox, round_to: u32) -> Option<BoundingBox> {
    if bbox.is_empty() {
        return None;
    }
    let g = round_to.max(1);
    Some(BoundingBox::new(
        bbox.min_x - bbox.min_x % g,
        bbox.min_y - bbox.min_y % g,
        bbox.max_x.div_ceil(g).saturating_mul(g),
        bbox.max_y.div_ceil(g).saturating_mul(g),
    ))
}

/// Smallest box containing both `a` and `b`; `None` acts as the empty box.
pub fn merge_bounding_box(a: Option<BoundingBox>, b: Option<BoundingBox>) -> Option<BoundingBox> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(a), Some(b)) => Some(BoundingBox::new(
            a.min_x.min(b.min_x),
            a.min_y.min(b.min_y),
            a.max_x.max(b.max_x),
            a.max_y.max(b.max_y),
        )),
    }
}

/// Compute the aligned bounding box of pixels that differ between two frames.
///
/// The box is rounded to `round_to` and clipped to the frame.
/// Returns None if frames are identical or sizes are inconsistent.
pub fn compute_diff_box(
    previous: &[u8],
    current: &[u8],
    width: u32,
    height: u32,
    round_to: u32,
) -> Option<BoundingBox> {
    let expected_len = width as usize * height as usize;
    if previous.len() != expected_len || current.len() != expected_len || width == 0 {
        return None;
    }

    let mut found: Option<BoundingBox> = None;
    let rows = previous
        .chunks_exact(width as usize)
        .zip(current.chunks_exact(width as usize));

    for (y, (old_row, new_row)) in rows.enumerate() {
        let Some(first) = old_row.iter().zip(new_row).position(|(a, b)| a != b) else {
            continue;
        };
        // a row with a first difference always has a last one
        let last = old_row
            .iter()
            .zip(new_row)
            .rposition(|(a, b)| a != b)
            .unwrap_or(first);

        let y = y as u32;
        let row_box = BoundingBox::new(first as u32, y, last as u32 + 1, y + 1);
        found = merge_bounding_box(found, Some(row_box));
    }

    found
        .and_then(|bbox| round_bounding_box(bbox, round_to))
        .map(|bbox| bbox.clip(width, height))
}

/// Copy the pixels of `region` out of a full frame into `out`.
///
/// The region is clipped to the frame first, so `out` may hold fewer pixels
/// than `region.pixel_count()`.
pub(crate) fn extract_region(source: &[u8], width: u32, region: BoundingBox, out: &mut Vec<u8>) {
    out.clear();
    if width == 0 {
        return;
    }
    let height = (source.len() / width as usize) as u32;
    let region = region.clip(width, height);
    let region_width = region.width() as usize;
    let width = width as usize;

    out.reserve(region.pixel_count());

    for row in region.min_y..region.max_y {
        let src = row as usize * width + region.min_x as usize;
        out.extend_from_slice(&source[src..src + region_width]);
    }
}
