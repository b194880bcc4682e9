use serde::{Deserialize, Serialize};

use super::blend::BlendMode;
use super::compositor::{self, Sampling};
use super::filter::{self, Filter};
use crate::color::ALPHA_MASK;
use crate::error::{Error, Result};
use crate::geometry::Rect;

// ============================================================================
// Image Format
// ============================================================================

/// How the high byte of each stored pixel is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    /// Opaque color; the alpha byte is always 0xFF
    Rgb,
    /// Color with alpha
    #[default]
    Argb,
    /// Single channel stored in the low byte
    Alpha,
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// Row-major packed `0xAARRGGBB` image with modified-region bookkeeping.
///
/// Index of pixel (x, y) is `y * width + x`. Every mutating call either
/// records the rectangle it touched or marks the whole buffer, so
/// [`PixelBuffer::take_modified`] always describes what a display surface
/// needs to re-upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: ImageFormat,
    pixels: Vec<u32>,
    modified: Option<Rect>,
}

impl PixelBuffer {
    /// Zero-filled buffer
    pub fn new(width: u32, height: u32, format: ImageFormat) -> Result<Self> {
        let len = checked_len(width, height)?;
        let fill = if format == ImageFormat::Rgb { ALPHA_MASK } else { 0 };
        Ok(Self {
            width,
            height,
            format,
            pixels: vec![fill; len],
            modified: None,
        })
    }

    /// Wrap externally supplied pixel data
    pub fn from_pixels(width: u32, height: u32, format: ImageFormat, pixels: Vec<u32>) -> Result<Self> {
        let len = checked_len(width, height)?;
        if pixels.len() != len {
            return Err(Error::PixelCountMismatch {
                expected: len,
                actual: pixels.len(),
            });
        }
        let mut img = Self {
            width,
            height,
            format,
            pixels,
            modified: None,
        };
        if format == ImageFormat::Rgb {
            img.pixels.iter_mut().for_each(|p| *p |= ALPHA_MASK);
        }
        Ok(img)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Change the format tag. Switching to RGB forces every alpha byte to 0xFF.
    pub fn set_format(&mut self, format: ImageFormat) {
        if format == ImageFormat::Rgb && self.format != ImageFormat::Rgb {
            self.pixels.iter_mut().for_each(|p| *p |= ALPHA_MASK);
            self.mark_all_modified();
        }
        self.format = format;
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Raw stored values
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Raw stored values for bulk edits. The whole buffer is marked modified.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        self.mark_all_modified();
        &mut self.pixels
    }

    /// Raw access for callers that record their own modified region
    #[inline]
    pub(crate) fn pixels_raw_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw value at an index, with RGB pixels reported opaque
    #[inline]
    pub(crate) fn raw_opaque(&self, i: usize) -> u32 {
        match self.format {
            ImageFormat::Rgb => self.pixels[i] | ALPHA_MASK,
            _ => self.pixels[i],
        }
    }

    // ========================================================================
    // Pixel access
    // ========================================================================

    /// Color at (x, y); `0` outside the buffer.
    ///
    /// RGB pixels come back opaque, ALPHA pixels as white with the stored
    /// value in the alpha byte.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u32 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        let p = self.pixels[self.index(x as u32, y as u32)];
        match self.format {
            ImageFormat::Rgb => p | ALPHA_MASK,
            ImageFormat::Argb => p,
            ImageFormat::Alpha => ((p & 0xff) << 24) | 0x00ffffff,
        }
    }

    /// Store a color at (x, y). Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, c: u32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let i = self.index(x as u32, y as u32);
        self.pixels[i] = match self.format {
            ImageFormat::Rgb => c | ALPHA_MASK,
            _ => c,
        };
        self.update_pixels(x, y, 1, 1);
    }

    /// Copy out a region. Parts outside the buffer come back transparent,
    /// in which case the copy is ARGB regardless of this buffer's format.
    pub fn get_region(&self, x: i32, y: i32, w: u32, h: u32) -> Result<PixelBuffer> {
        let wanted = Rect::new(x, y, w as i32, h as i32);
        let inside = wanted.clamp_to(self.width, self.height);
        let format = if inside == wanted { self.format } else { ImageFormat::Argb };
        let mut out = PixelBuffer::new(w, h, format)?;

        for sy in inside.y..inside.bottom() {
            let src_start = self.index(inside.x as u32, sy as u32);
            let dst_start = out.index((inside.x - x) as u32, (sy - y) as u32);
            let n = inside.w as usize;
            out.pixels[dst_start..dst_start + n].copy_from_slice(&self.pixels[src_start..src_start + n]);
        }
        Ok(out)
    }

    /// Copy `img` in with its top-left at (x, y), clipped to this buffer
    pub fn set_image(&mut self, x: i32, y: i32, img: &PixelBuffer) {
        let target = Rect::new(x, y, img.width as i32, img.height as i32).clamp_to(self.width, self.height);
        if target.is_empty() {
            return;
        }
        for ty in target.y..target.bottom() {
            let src_start = img.index((target.x - x) as u32, (ty - y) as u32);
            let dst_start = self.index(target.x as u32, ty as u32);
            let n = target.w as usize;
            self.pixels[dst_start..dst_start + n].copy_from_slice(&img.pixels[src_start..src_start + n]);
        }
        if self.format == ImageFormat::Rgb {
            for ty in target.y..target.bottom() {
                let start = self.index(target.x as u32, ty as u32);
                self.pixels[start..start + target.w as usize]
                    .iter_mut()
                    .for_each(|p| *p |= ALPHA_MASK);
            }
        }
        self.mark_modified(target);
    }

    /// Overwrite every pixel with one color
    pub fn fill(&mut self, c: u32) {
        let c = if self.format == ImageFormat::Rgb { c | ALPHA_MASK } else { c };
        self.pixels.fill(c);
        self.mark_all_modified();
    }

    // ========================================================================
    // Masking
    // ========================================================================

    /// Replace alpha with the low byte of the matching mask value
    pub fn mask_pixels(&mut self, mask: &[u32]) -> Result<()> {
        if mask.len() != self.pixels.len() {
            return Err(Error::MaskSizeMismatch {
                expected: self.pixels.len(),
                actual: mask.len(),
            });
        }
        for (p, m) in self.pixels.iter_mut().zip(mask) {
            *p = ((m & 0xff) << 24) | (*p & 0x00ffffff);
        }
        self.format = ImageFormat::Argb;
        self.mark_all_modified();
        Ok(())
    }

    /// Use another image's blue (or single ALPHA) channel as this image's alpha
    pub fn mask(&mut self, mask: &PixelBuffer) -> Result<()> {
        self.mask_pixels(&mask.pixels)
    }

    // ========================================================================
    // Resampling and compositing
    // ========================================================================

    /// Resample to new dimensions with bilinear filtering.
    /// A zero dimension is derived from the other one, keeping the aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let (width, height) = match (width, height) {
            (0, 0) => return Err(Error::InvalidDimensions { width, height }),
            (0, h) => (((self.width as f32 * h as f32) / self.height as f32).round().max(1.0) as u32, h),
            (w, 0) => (w, ((self.height as f32 * w as f32) / self.width as f32).round().max(1.0) as u32),
            dims => dims,
        };
        let mut out = PixelBuffer::new(width, height, self.format)?;
        let target = out.bounds();
        compositor::blit(
            self,
            self.bounds(),
            &mut out,
            target,
            BlendMode::Replace,
            Sampling::Bilinear,
        );
        log::trace!("resized {}x{} -> {}x{}", self.width, self.height, width, height);
        out.mark_all_modified();
        *self = out;
        Ok(())
    }

    /// Scaled copy of `src_rect` in `src` into `dst_rect` here
    pub fn copy(&mut self, src: &PixelBuffer, src_rect: Rect, dst_rect: Rect) {
        compositor::blit(src, src_rect, self, dst_rect, BlendMode::Replace, Sampling::Bilinear);
    }

    /// Scaled copy between two regions of this buffer
    pub fn copy_within(&mut self, src_rect: Rect, dst_rect: Rect) {
        compositor::blit_within(self, src_rect, dst_rect, BlendMode::Replace, Sampling::Bilinear);
    }

    /// Scaled, blended copy of `src_rect` in `src` into `dst_rect` here
    pub fn blend(&mut self, src: &PixelBuffer, src_rect: Rect, dst_rect: Rect, mode: BlendMode) {
        compositor::blit(src, src_rect, self, dst_rect, mode, Sampling::Bilinear);
    }

    /// Scaled, blended copy between two regions of this buffer
    pub fn blend_within(&mut self, src_rect: Rect, dst_rect: Rect, mode: BlendMode) {
        compositor::blit_within(self, src_rect, dst_rect, mode, Sampling::Bilinear);
    }

    /// Run a filter over the whole buffer
    pub fn filter(&mut self, kind: Filter) -> Result<()> {
        filter::apply(self, kind)
    }

    // ========================================================================
    // Modified region
    // ========================================================================

    /// Record that `w` x `h` pixels at (x, y) changed
    pub fn update_pixels(&mut self, x: i32, y: i32, w: u32, h: u32) {
        self.mark_modified(Rect::new(x, y, w as i32, h as i32));
    }

    pub fn mark_modified(&mut self, rect: Rect) {
        let rect = rect.clamp_to(self.width, self.height);
        if rect.is_empty() {
            return;
        }
        self.modified = Some(match self.modified {
            Some(m) => m.union(&rect),
            None => rect,
        });
    }

    pub fn mark_all_modified(&mut self) {
        self.modified = Some(self.bounds());
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified.is_some()
    }

    #[inline]
    pub fn modified(&self) -> Option<Rect> {
        self.modified
    }

    /// Return and clear the modified region
    pub fn take_modified(&mut self) -> Option<Rect> {
        self.modified.take()
    }
}

fn checked_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 4, ImageFormat::Argb),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_from_pixels_checks_length() {
        let err = PixelBuffer::from_pixels(2, 2, ImageFormat::Argb, vec![0; 3]).unwrap_err();
        assert!(matches!(err, Error::PixelCountMismatch { expected: 4, actual: 3 }));
        let rgb = PixelBuffer::from_pixels(1, 1, ImageFormat::Rgb, vec![0x00123456]).unwrap();
        assert_eq!(rgb.pixels()[0], 0xff123456);
    }

    #[test]
    fn test_get_set_bounds() {
        let mut img = PixelBuffer::new(4, 3, ImageFormat::Argb).unwrap();
        img.set(2, 1, 0x80112233);
        assert_eq!(img.get(2, 1), 0x80112233);
        assert_eq!(img.pixels()[6], 0x80112233);
        // Out of range is silent
        img.set(-1, 0, 0xffffffff);
        img.set(4, 0, 0xffffffff);
        assert_eq!(img.get(-1, 0), 0);
        assert_eq!(img.get(0, 3), 0);
        assert_eq!(img.take_modified(), Some(Rect::new(2, 1, 1, 1)));
        assert_eq!(img.take_modified(), None);
    }

    #[test]
    fn test_get_by_format() {
        let rgb = PixelBuffer::from_pixels(1, 1, ImageFormat::Rgb, vec![0x00abcdef]).unwrap();
        assert_eq!(rgb.get(0, 0), 0xffabcdef);
        let alpha = PixelBuffer::from_pixels(1, 1, ImageFormat::Alpha, vec![0x80]).unwrap();
        assert_eq!(alpha.get(0, 0), 0x80ffffff);
    }

    #[test]
    fn test_modified_region_grows() {
        let mut img = PixelBuffer::new(10, 10, ImageFormat::Rgb).unwrap();
        img.set(1, 1, 0);
        img.set(5, 7, 0);
        assert_eq!(img.modified(), Some(Rect::new(1, 1, 5, 7)));
        img.update_pixels(-3, -3, 5, 5);
        assert_eq!(img.modified(), Some(Rect::new(0, 0, 6, 8)));
    }

    #[test]
    fn test_get_region_outside_is_transparent() {
        let mut img = PixelBuffer::new(2, 2, ImageFormat::Rgb).unwrap();
        img.fill(0xff00ff00);
        let region = img.get_region(1, 1, 2, 2).unwrap();
        assert_eq!(region.format(), ImageFormat::Argb);
        assert_eq!(region.pixels(), &[0xff00ff00, 0, 0, 0]);
        let inner = img.get_region(0, 0, 1, 2).unwrap();
        assert_eq!(inner.format(), ImageFormat::Rgb);
        assert_eq!(inner.pixels(), &[0xff00ff00, 0xff00ff00]);
    }

    #[test]
    fn test_set_image_clips() {
        let mut canvas = PixelBuffer::new(3, 3, ImageFormat::Argb).unwrap();
        let patch = PixelBuffer::from_pixels(2, 2, ImageFormat::Argb, vec![1, 2, 3, 4]).unwrap();
        canvas.set_image(2, -1, &patch);
        assert_eq!(canvas.get(2, 0), 3);
        assert_eq!(canvas.pixels().iter().filter(|&&p| p != 0).count(), 1);
        assert_eq!(canvas.modified(), Some(Rect::new(2, 0, 1, 1)));
    }

    #[test]
    fn test_mask_replaces_alpha() {
        let mut img = PixelBuffer::from_pixels(2, 1, ImageFormat::Rgb, vec![0xff102030, 0xff405060]).unwrap();
        img.mask_pixels(&[0x00000080, 0xffffff00]).unwrap();
        assert_eq!(img.format(), ImageFormat::Argb);
        assert_eq!(img.pixels(), &[0x80102030, 0x00405060]);
        assert!(matches!(
            img.mask_pixels(&[0; 3]),
            Err(Error::MaskSizeMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let mut img = PixelBuffer::new(8, 4, ImageFormat::Argb).unwrap();
        img.fill(0xff336699);
        img.resize(4, 0).unwrap();
        assert_eq!((img.width(), img.height()), (4, 2));
        assert!(img.pixels().iter().all(|&p| p == 0xff336699));
        assert!(img.resize(0, 0).is_err());
    }

    #[test]
    fn test_index_is_row_major() {
        let img = PixelBuffer::new(5, 3, ImageFormat::Argb).unwrap();
        assert_eq!(img.index(0, 0), 0);
        assert_eq!(img.index(4, 0), 4);
        assert_eq!(img.index(0, 1), 5);
        assert_eq!(img.index(4, 2), img.len() - 1);
    }
}
