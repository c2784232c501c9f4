//! Color + depth frame buffer

use super::fixed::DEPTH_FAR;
use super::types::Color;
use crate::error::RenderError;

/// Framebuffer for software rendering
pub struct Framebuffer {
    pixels: Vec<u8>,   // RGBA, 4 bytes per pixel
    zbuffer: Vec<i32>, // 16.16 view depth, DEPTH_FAR when empty
    width: usize,
    height: usize,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: Vec::new(),
            zbuffer: Vec::new(),
            width: 0,
            height: 0,
        }
    }
}

impl Framebuffer {
    /// Allocate and clear a buffer to black
    pub fn new(width: i32, height: i32) -> Result<Self, RenderError> {
        let mut fb = Self::default();
        fb.reset(width, height, Color::BLACK)?;
        Ok(fb)
    }

    /// Prepare the buffer for a new frame.
    ///
    /// Storage is only reallocated when the size changes. Negative sizes
    /// (minimized window) produce an empty buffer on which every draw call
    /// is a no-op.
    pub fn reset(&mut self, width: i32, height: i32, background: Color) -> Result<(), RenderError> {
        let w = width.max(0) as usize;
        let h = height.max(0) as usize;

        if w != self.width || h != self.height {
            let count = w.checked_mul(h).ok_or(RenderError::Allocation { width, height })?;
            let mut pixels = Vec::new();
            let mut zbuffer = Vec::new();
            let bytes = count.checked_mul(4).ok_or(RenderError::Allocation { width, height })?;
            pixels
                .try_reserve_exact(bytes)
                .map_err(|_| RenderError::Allocation { width, height })?;
            zbuffer
                .try_reserve_exact(count)
                .map_err(|_| RenderError::Allocation { width, height })?;
            pixels.resize(bytes, 0);
            zbuffer.resize(count, DEPTH_FAR);

            log::debug!("framebuffer: reallocated {}x{} -> {}x{}", self.width, self.height, w, h);
            self.pixels = pixels;
            self.zbuffer = zbuffer;
            self.width = w;
            self.height = h;
        }

        self.clear(background);
        Ok(())
    }

    /// Fill color with `background` and depth with the far sentinel
    pub fn clear(&mut self, background: Color) {
        let bytes = background.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.zbuffer.fill(DEPTH_FAR);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA8 bytes, row-major, ready for texture upload
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Unconditional write. Callers keep `x < width` and `y < height`.
    #[inline]
    pub fn write_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let idx = (y * self.width + x) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    #[inline]
    pub fn read_pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Bounds-checked write for 2D drawing helpers
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.write_pixel(x as usize, y as usize, rgba);
        }
    }

    /// Depth test with "less or equal": on success writes color and depth
    /// and returns true. Later writes win exact ties.
    #[inline]
    pub fn test_and_write_depth(&mut self, x: usize, y: usize, depth: i32, rgba: [u8; 4]) -> bool {
        let idx = y * self.width + x;
        if depth <= self.zbuffer[idx] {
            self.zbuffer[idx] = depth;
            self.pixels[idx * 4..idx * 4 + 4].copy_from_slice(&rgba);
            true
        } else {
            false
        }
    }

    /// RGBA at a pixel, `None` outside the buffer
    pub fn color_at(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.read_pixel(x, y))
        } else {
            None
        }
    }

    /// Stored 16.16 depth at a pixel, `None` outside the buffer
    pub fn depth_at(&self, x: usize, y: usize) -> Option<i32> {
        if x < self.width && y < self.height {
            Some(self.zbuffer[y * self.width + x])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_fills_color_and_depth() {
        let mut fb = Framebuffer::default();
        fb.reset(4, 3, Color::RED).unwrap();
        assert_eq!(fb.width(), 4);
        assert_eq!(fb.height(), 3);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(fb.color_at(x, y), Some([255, 0, 0, 255]));
                assert_eq!(fb.depth_at(x, y), Some(DEPTH_FAR));
            }
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut once = Framebuffer::default();
        once.reset(8, 8, Color::BLUE).unwrap();

        let mut twice = Framebuffer::default();
        twice.reset(8, 8, Color::BLUE).unwrap();
        twice.test_and_write_depth(2, 2, 100, [1, 2, 3, 255]);
        twice.reset(8, 8, Color::BLUE).unwrap();
        twice.reset(8, 8, Color::BLUE).unwrap();

        assert_eq!(once.pixels(), twice.pixels());
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(once.depth_at(x, y), twice.depth_at(x, y));
            }
        }
    }

    #[test]
    fn test_reset_reuses_storage_for_same_size() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        let before = fb.pixels().as_ptr();
        fb.reset(16, 16, Color::WHITE).unwrap();
        assert_eq!(before, fb.pixels().as_ptr());
    }

    #[test]
    fn test_negative_size_degrades_to_empty() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.reset(-5, 20, Color::BLACK).unwrap();
        assert!(fb.is_empty());
        assert_eq!(fb.pixels().len(), 0);
        assert_eq!(fb.color_at(0, 0), None);
        fb.set_pixel(0, 0, [255; 4]);
    }

    #[test]
    fn test_depth_test_nearer_wins_and_ties_go_to_later() {
        let mut fb = Framebuffer::new(2, 2).unwrap();
        assert!(fb.test_and_write_depth(0, 0, 500, [1, 0, 0, 255]));
        assert!(!fb.test_and_write_depth(0, 0, 600, [2, 0, 0, 255]));
        assert_eq!(fb.color_at(0, 0), Some([1, 0, 0, 255]));
        assert!(fb.test_and_write_depth(0, 0, 500, [3, 0, 0, 255]));
        assert_eq!(fb.color_at(0, 0), Some([3, 0, 0, 255]));
        assert!(fb.test_and_write_depth(0, 0, 100, [4, 0, 0, 255]));
        assert_eq!(fb.depth_at(0, 0), Some(100));
    }

    #[test]
    fn test_huge_size_reports_allocation_error() {
        let mut fb = Framebuffer::default();
        let err = fb.reset(i32::MAX, i32::MAX, Color::BLACK);
        assert!(matches!(err, Err(RenderError::Allocation { .. })));
        assert!(fb.is_empty());
    }
}
