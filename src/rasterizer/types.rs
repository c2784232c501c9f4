//! Core types for the rasterizer

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::next_object_id;

/// RGB color, one float per channel, nominally in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0 };
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0 };
    pub const BLUE: Color = Color { r: 0.0, g: 0.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Saturate every channel into `[0, 1]`
    pub fn clip(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Multiply by intensity (unclamped; call `clip` afterwards if needed)
    pub fn shade(self, intensity: f32) -> Self {
        Self {
            r: self.r * intensity,
            g: self.g * intensity,
            b: self.b * intensity,
        }
    }

    /// Raw-channel linear interpolation
    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// 8-bit channels after clipping, rounded to nearest
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clip();
        [
            (c.r * 255.0 + 0.5) as u8,
            (c.g * 255.0 + 0.5) as u8,
            (c.b * 255.0 + 0.5) as u8,
        ]
    }

    /// Convert to [u8; 4] for the framebuffer (opaque)
    pub fn to_bytes(self) -> [u8; 4] {
        let [r, g, b] = self.to_rgb8();
        [r, g, b, 255]
    }
}

/// How a flat-filled span combines with what is already in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Depth-tested opaque write
    #[default]
    Copy,
    /// Saturating add, no depth test or write
    Add,
    /// Saturating subtract, no depth test or write
    Subtract,
}

impl BlendMode {
    #[inline]
    pub fn blend(self, dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
        match self {
            BlendMode::Copy => src,
            BlendMode::Add => [
                dst[0].saturating_add(src[0]),
                dst[1].saturating_add(src[1]),
                dst[2].saturating_add(src[2]),
                255,
            ],
            BlendMode::Subtract => [
                dst[0].saturating_sub(src[0]),
                dst[1].saturating_sub(src[1]),
                dst[2].saturating_sub(src[2]),
                255,
            ],
        }
    }
}

#[derive(Debug, Error)]
pub enum BitmapError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Pixel data length {len} does not match {width}x{height}")]
    Size { width: usize, height: usize, len: usize },
}

/// RGBA8 image with an identity used by derived-data caches
#[derive(Debug)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 4]>,
    id: u64,
    generation: u64,
}

/// A clone is a new object: it gets its own id so caches never confuse it
/// with the original once either one changes.
impl Clone for Bitmap {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
            id: next_object_id(),
            generation: 0,
        }
    }
}

impl Bitmap {
    /// Fully transparent bitmap
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; width * height],
            id: next_object_id(),
            generation: 0,
        }
    }

    pub fn from_rgba(width: usize, height: usize, pixels: Vec<[u8; 4]>) -> Result<Self, BitmapError> {
        if pixels.len() != width * height {
            return Err(BitmapError::Size { width, height, len: pixels.len() });
        }
        Ok(Self {
            width,
            height,
            pixels,
            id: next_object_id(),
            generation: 0,
        })
    }

    /// Load a bitmap from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, BitmapError> {
        let img = image::open(path.as_ref())?;
        Self::from_image(img)
    }

    fn from_image(img: image::DynamicImage) -> Result<Self, BitmapError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels: Vec<[u8; 4]> = rgba.pixels().map(|p| p.0).collect();
        Self::from_rgba(width as usize, height as usize, pixels)
    }

    /// Checkerboard test pattern with 4x4 cells
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let (a, b) = (color1.to_bytes(), color2.to_bytes());
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { a } else { b });
            }
        }
        Self {
            width,
            height,
            pixels,
            id: next_object_id(),
            generation: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Bumped on every mutation; caches key on `(id, generation)`
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Get pixel at x,y coordinates; transparent black outside
    pub fn get_pixel(&self, x: usize, y: usize) -> [u8; 4] {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            [0, 0, 0, 0]
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = rgba;
            self.generation += 1;
        }
    }

    /// Pixel as a float color (alpha dropped)
    pub fn color_at(&self, x: usize, y: usize) -> Color {
        let [r, g, b, _] = self.get_pixel(x, y);
        Color::from_rgb8(r, g, b)
    }
}
