//! Image compositing
//!
//! 2D blits copy bitmap pixels straight into the color buffer with a hard
//! alpha test and no depth interaction. A bitmap placed in 3D becomes a
//! grid mesh with one quad (two triangles) per pixel, rendered through the
//! mesh renderer with an image colorizer.

use super::framebuffer::Framebuffer;
use super::math::Vec3;
use super::types::Bitmap;
use crate::scene::TriMesh;

/// Copy `image` to (x, y) at its natural size
pub fn draw_image(fb: &mut Framebuffer, image: &Bitmap, x: i32, y: i32) {
    draw_image_scaled(fb, image, x, y, image.width() as i32, image.height() as i32);
}

/// Nearest-neighbour blit of `image` into the rectangle (x, y, width, height).
/// Pixels with zero alpha are skipped.
pub fn draw_image_scaled(fb: &mut Framebuffer, image: &Bitmap, x: i32, y: i32, width: i32, height: i32) {
    if width <= 0 || height <= 0 || image.width() == 0 || image.height() == 0 || fb.is_empty() {
        return;
    }

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_stop = x.saturating_add(width).min(fb.width() as i32);
    let y_stop = y.saturating_add(height).min(fb.height() as i32);

    for py in y_start..y_stop {
        let sy = ((py - y) as i64 * image.height() as i64 / height as i64) as usize;
        for px in x_start..x_stop {
            let sx = ((px - x) as i64 * image.width() as i64 / width as i64) as usize;
            let rgba = image.get_pixel(sx, sy);
            if rgba[3] == 0 {
                continue;
            }
            fb.write_pixel(px as usize, py as usize, [rgba[0], rgba[1], rgba[2], 255]);
        }
    }
}

/// Where an image sits in object space: `origin` is the top-left corner,
/// `right` and `down` span the full width and height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub origin: Vec3,
    pub right: Vec3,
    pub down: Vec3,
}

impl ImagePlacement {
    pub fn new(origin: Vec3, right: Vec3, down: Vec3) -> Self {
        Self { origin, right, down }
    }

    fn corner(&self, col: usize, row: usize, width: usize, height: usize) -> Vec3 {
        let u = col as f32 / width as f32;
        let v = row as f32 / height as f32;
        self.origin + self.right * u + self.down * v
    }
}

/// Image converted for 3D rendering
#[derive(Debug, Clone)]
pub struct ImageMesh {
    pub mesh: TriMesh,
    /// Per-triangle mask hiding fully transparent pixels
    pub hidden: Vec<bool>,
    placement: ImagePlacement,
    size: (usize, usize),
}

impl ImageMesh {
    /// Build the pixel grid for `image`. Face `i` is pixel `i` (row-major).
    pub fn new(image: &Bitmap, placement: ImagePlacement) -> Self {
        let (w, h) = (image.width(), image.height());
        let mut mesh = TriMesh::new();
        let normal = mesh.add_normal(placement.right.cross(placement.down));

        for row in 0..=h {
            for col in 0..=w {
                mesh.add_vertex(placement.corner(col, row, w, h));
            }
        }

        let stride = w + 1;
        for row in 0..h {
            for col in 0..w {
                let i = row * stride + col;
                mesh.add_quad([i, i + 1, i + stride + 1, i + stride], normal, row * w + col);
            }
        }

        let mut out = Self {
            mesh,
            hidden: Vec::new(),
            placement,
            size: (w, h),
        };
        out.refresh_mask(image);
        out
    }

    /// Rebuild for a changed image, reusing the grid when the size matches
    pub fn update(&mut self, image: &Bitmap, placement: ImagePlacement) {
        if self.size != (image.width(), image.height()) {
            *self = Self::new(image, placement);
            return;
        }
        self.reposition(placement);
        self.refresh_mask(image);
    }

    /// Move the grid without rebuilding it
    pub fn reposition(&mut self, placement: ImagePlacement) {
        if self.placement == placement {
            return;
        }
        let (w, h) = self.size;
        let stride = w + 1;
        for row in 0..=h {
            for col in 0..=w {
                self.mesh.set_vertex(row * stride + col, placement.corner(col, row, w, h));
            }
        }
        self.placement = placement;
    }

    fn refresh_mask(&mut self, image: &Bitmap) {
        self.hidden.clear();
        self.hidden.extend(
            image
                .pixels()
                .iter()
                .flat_map(|p| {
                    let hide = p[3] == 0;
                    [hide, hide]
                }),
        );
    }
}
