//! Lines, rules and boxes
//!
//! 2D helpers write straight into the color buffer. `draw_line_depth`
//! walks the major axis Bresenham-style with a 16.16 depth accumulator and
//! depth-tests each pixel exactly like the triangle fill.

use super::fixed::{clamp_depth, depth_to_fixed, is_safe_coord};
use super::framebuffer::Framebuffer;
use super::math::Vec3;
use super::triangle::ScreenVertex;
use super::types::Color;
use crate::scene::Camera;

/// Clip a segment to the pixel rectangle `[0, w) x [0, h)` (Liang-Barsky).
/// Endpoints are rounded back to integers; `None` when nothing is inside.
fn clip_segment(x0: i64, y0: i64, x1: i64, y1: i64, w: i64, h: i64) -> Option<[i64; 4]> {
    let (dx, dy) = ((x1 - x0) as f64, (y1 - y0) as f64);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-dx, x0 as f64),
        (dx, (w - 1 - x0) as f64),
        (-dy, y0 as f64),
        (dy, (h - 1 - y0) as f64),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        (
            (x0 + (t * dx).round() as i64).clamp(0, w - 1),
            (y0 + (t * dy).round() as i64).clamp(0, h - 1),
        )
    };
    let (cx0, cy0) = at(t0);
    let (cx1, cy1) = at(t1);
    Some([cx0, cy0, cx1, cy1])
}

/// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm.
/// The segment is clipped to the buffer first, so only visible pixels are
/// stepped. Zero-length lines draw nothing.
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    if (x0 == x1 && y0 == y1) || fb.is_empty() {
        return;
    }
    let (w, h) = (fb.width() as i64, fb.height() as i64);
    let Some([x0, y0, x1, y1]) = clip_segment(x0 as i64, y0 as i64, x1 as i64, y1 as i64, w, h) else {
        return;
    };

    let rgba = color.to_bytes();
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = x0;
    let mut y = y0;

    loop {
        fb.write_pixel(x as usize, y as usize, rgba);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Depth-tested line between two screen-space vertices.
///
/// Steps one pixel per unit of the major axis, carrying depth in 16.16.
/// Lines entirely off one side of the viewport, lines with coordinates
/// outside the fixed-point range and zero-length lines are skipped.
/// Returns the number of pixels that passed the depth test.
pub fn draw_line_depth(fb: &mut Framebuffer, p0: ScreenVertex, p1: ScreenVertex, color: Color) -> usize {
    if fb.is_empty() {
        return 0;
    }
    if !(is_safe_coord(p0.x) && is_safe_coord(p0.y) && is_safe_coord(p1.x) && is_safe_coord(p1.y)) {
        log::trace!("draw_line_depth: dropped unsafe coordinates {:?} {:?}", p0, p1);
        return 0;
    }

    let (x0, y0) = (p0.x.floor() as i64, p0.y.floor() as i64);
    let (x1, y1) = (p1.x.floor() as i64, p1.y.floor() as i64);
    let (w, h) = (fb.width() as i64, fb.height() as i64);

    // Cheap per-axis rejection
    if (x0 < 0 && x1 < 0) || (y0 < 0 && y1 < 0) || (x0 >= w && x1 >= w) || (y0 >= h && y1 >= h) {
        return 0;
    }

    let dx = x1 - x0;
    let dy = y1 - y0;
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        return 0;
    }

    let rgba = color.to_bytes();
    let z0 = depth_to_fixed(p0.depth);
    let z1 = depth_to_fixed(p1.depth);
    let dz = (z1 - z0) / steps;

    let (sx, sy) = (dx.signum(), dy.signum());
    let (adx, ady) = (dx.abs(), dy.abs());
    let x_major = adx >= ady;
    let mut err = 0i64;
    let (mut x, mut y, mut z) = (x0, y0, z0);
    let mut written = 0;

    for i in 0..=steps {
        if x >= 0 && y >= 0 && x < w && y < h {
            // Last pixel takes the exact endpoint depth
            let depth = if i == steps { z1 } else { z };
            if fb.test_and_write_depth(x as usize, y as usize, clamp_depth(depth), rgba) {
                written += 1;
            }
        }

        if x_major {
            x += sx;
            err += ady;
            if 2 * err >= adx {
                y += sy;
                err -= adx;
            }
        } else {
            y += sy;
            err += adx;
            if 2 * err >= ady {
                x += sx;
                err -= ady;
            }
        }
        z += dz;
    }

    written
}

/// Project and draw a 3D line (object space) with depth testing.
///
/// No partial near-plane clipping is done: a line with both endpoints in
/// front of the clip plane is drawn; both behind is skipped. With one
/// endpoint behind, orthographic views draw it unclipped and perspective
/// views draw it only while both endpoints still have positive depth.
pub fn render_line(
    fb: &mut Framebuffer,
    p0: Vec3,
    p1: Vec3,
    camera: &dyn Camera,
    color: Color,
    depth_bias: f32,
) -> usize {
    let to_view = camera.object_to_view();
    let v0 = to_view.transform_point(p0);
    let v1 = to_view.transform_point(p1);
    if !line_survives_clip(v0.z, v1.z, camera.clip_distance(), camera.is_perspective()) {
        return 0;
    }

    let to_screen = camera.view_to_screen();
    let (Some(s0), Some(s1)) = (to_screen.project(v0), to_screen.project(v1)) else {
        return 0;
    };
    draw_line_depth(
        fb,
        ScreenVertex::new(s0.x, s0.y, v0.z - depth_bias),
        ScreenVertex::new(s1.x, s1.y, v1.z - depth_bias),
        color,
    )
}

/// Coarse near-plane test for a line with view depths `z0` and `z1`
pub fn line_survives_clip(z0: f32, z1: f32, clip_distance: f32, perspective: bool) -> bool {
    let behind0 = z0 < clip_distance;
    let behind1 = z1 < clip_distance;
    if behind0 && behind1 {
        return false;
    }
    // Unclipped perspective lines need both ends in front of the eye
    !((behind0 || behind1) && perspective && (z0 <= 0.0 || z1 <= 0.0))
}

/// Full-width horizontal line
pub fn draw_hrule(fb: &mut Framebuffer, y: i32, color: Color) {
    if y < 0 || y as usize >= fb.height() {
        return;
    }
    let rgba = color.to_bytes();
    for x in 0..fb.width() {
        fb.write_pixel(x, y as usize, rgba);
    }
}

/// Full-height vertical line
pub fn draw_vrule(fb: &mut Framebuffer, x: i32, color: Color) {
    if x < 0 || x as usize >= fb.width() {
        return;
    }
    let rgba = color.to_bytes();
    for y in 0..fb.height() {
        fb.write_pixel(x as usize, y, rgba);
    }
}

/// Axis-aligned rectangle, outlined or filled, clipped to the buffer
pub fn draw_box(fb: &mut Framebuffer, x: i32, y: i32, width: i32, height: i32, color: Color, filled: bool) {
    if width <= 0 || height <= 0 || fb.is_empty() {
        return;
    }
    let rgba = color.to_bytes();
    let (x_end, y_end) = (x.saturating_add(width), y.saturating_add(height));

    if filled {
        let x_start = x.max(0) as usize;
        let y_start = y.max(0) as usize;
        let x_stop = (x_end.max(0) as usize).min(fb.width());
        let y_stop = (y_end.max(0) as usize).min(fb.height());
        for py in y_start..y_stop {
            for px in x_start..x_stop {
                fb.write_pixel(px, py, rgba);
            }
        }
        return;
    }

    let (w, h) = (fb.width() as i32, fb.height() as i32);
    let (x_start, x_stop) = (x.max(0), x_end.min(w));
    let (y_start, y_stop) = (y.max(0), y_end.min(h));
    for row in [y, y_end - 1] {
        if (0..h).contains(&row) {
            for px in x_start..x_stop {
                fb.write_pixel(px as usize, row as usize, rgba);
            }
        }
    }
    for col in [x, x_end - 1] {
        if (0..w).contains(&col) {
            for py in y_start..y_stop {
                fb.write_pixel(col as usize, py as usize, rgba);
            }
        }
    }
}

/// One-pixel frame around the whole buffer
pub fn draw_border(fb: &mut Framebuffer, color: Color) {
    let (w, h) = (fb.width() as i32, fb.height() as i32);
    draw_box(fb, 0, 0, w, h, color, false);
}
