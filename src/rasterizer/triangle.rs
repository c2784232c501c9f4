//! Scanline triangle rasterization
//!
//! Vertices are sorted by y and two edge pairs are walked (top to middle,
//! middle to bottom, against top to bottom). Edge x and the interpolated
//! attributes advance by a constant 16.16 step per row. Pixel centers are
//! sampled at `+0.5`, rows cover `top <= y < bottom` and spans cover
//! `left <= x < right`, so triangles sharing an edge never overlap or leave
//! a gap.

use super::fixed::{
    channel_to_fixed, clamp_depth, coord_to_fixed, depth_to_fixed, fixed_to_u8, fx_ceil, fx_div, fx_from_int,
    fx_mul, is_safe_coord, FX_HALF,
};
use super::framebuffer::Framebuffer;
use super::types::{BlendMode, Color};

/// Screen-space vertex: sub-pixel position, view depth and optional color
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
    pub color: Color,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth, color: Color::BLACK }
    }

    pub fn with_color(x: f32, y: f32, depth: f32, color: Color) -> Self {
        Self { x, y, depth, color }
    }
}

/// True when every coordinate fits the fixed-point range
pub fn is_rasterizable(v: &[ScreenVertex; 3]) -> bool {
    v.iter().all(|p| is_safe_coord(p.x) && is_safe_coord(p.y))
}

/// Vertex in 16.16 with `N` linearly interpolated attributes
#[derive(Clone, Copy)]
struct FxVertex<const N: usize> {
    x: i64,
    y: i64,
    attrs: [i64; N],
}

/// One triangle edge being walked downward
struct Edge<const N: usize> {
    x: i64,
    dxdy: i64,
    attrs: [i64; N],
    dady: [i64; N],
}

impl<const N: usize> Edge<N> {
    /// Edge from `a` to `b` (with `b.y > a.y`), positioned at row center `yc`
    fn new(a: &FxVertex<N>, b: &FxVertex<N>, yc: i64) -> Self {
        let dy = b.y - a.y;
        let dxdy = fx_div(b.x - a.x, dy);
        let off = yc - a.y;

        let mut attrs = [0; N];
        let mut dady = [0; N];
        for i in 0..N {
            dady[i] = fx_div(b.attrs[i] - a.attrs[i], dy);
            attrs[i] = a.attrs[i] + fx_mul(off, dady[i]);
        }

        Self {
            x: a.x + fx_mul(off, dxdy),
            dxdy,
            attrs,
            dady,
        }
    }

    #[inline]
    fn step(&mut self) {
        self.x += self.dxdy;
        for i in 0..N {
            self.attrs[i] += self.dady[i];
        }
    }
}

/// Walk the rows of a triangle, clipped to `width` x `height`, and call
/// `span(y, x0, x1, attrs_at_x0, attrs_per_pixel)` for each non-empty span.
fn walk_triangle<const N: usize, S>(width: usize, height: usize, mut v: [FxVertex<N>; 3], mut span: S)
where
    S: FnMut(usize, usize, usize, [i64; N], [i64; N]),
{
    v.sort_by_key(|p| p.y);
    let [top, mid, bot] = v;

    // Zero vertical extent
    if bot.y == top.y {
        return;
    }

    let w = width as i64;
    let h = height as i64;

    for (a, b) in [(&top, &mid), (&mid, &bot)] {
        if b.y == a.y {
            continue;
        }

        let y_start = fx_ceil(a.y - FX_HALF).max(0);
        let y_end = fx_ceil(b.y - FX_HALF).min(h);
        if y_start >= y_end {
            continue;
        }

        let yc = fx_from_int(y_start) + FX_HALF;
        let mut long = Edge::new(&top, &bot, yc);
        let mut short = Edge::new(a, b, yc);

        for py in y_start..y_end {
            // Orientation is decided per row, not assumed from winding
            let (l, r) = if long.x <= short.x { (&long, &short) } else { (&short, &long) };

            let x_start = fx_ceil(l.x - FX_HALF).max(0);
            let x_end = fx_ceil(r.x - FX_HALF).min(w);

            if x_start < x_end {
                let width_fx = r.x - l.x;
                let xc = fx_from_int(x_start) + FX_HALF;
                let mut start = [0; N];
                let mut dadx = [0; N];
                for i in 0..N {
                    dadx[i] = if width_fx > 0 { fx_div(r.attrs[i] - l.attrs[i], width_fx) } else { 0 };
                    // Measured from the true left edge so a clamped start keeps its value
                    start[i] = l.attrs[i] + fx_mul(xc - l.x, dadx[i]);
                }
                span(py as usize, x_start as usize, x_end as usize, start, dadx);
            }

            long.step();
            short.step();
        }
    }
}

fn to_fixed<const N: usize>(v: &ScreenVertex, attrs: [i64; N]) -> Option<FxVertex<N>> {
    Some(FxVertex {
        x: coord_to_fixed(v.x)?,
        y: coord_to_fixed(v.y)?,
        attrs,
    })
}

/// Fill a triangle with one color.
///
/// `BlendMode::Copy` depth-tests and writes depth; `Add` and `Subtract`
/// blend unconditionally and leave depth untouched. Returns the number of
/// pixels written. Triangles with coordinates outside the fixed-point range
/// are dropped.
pub fn fill_triangle(fb: &mut Framebuffer, v: &[ScreenVertex; 3], color: Color, mode: BlendMode) -> usize {
    if fb.is_empty() {
        return 0;
    }
    let fx = [
        to_fixed(&v[0], [depth_to_fixed(v[0].depth)]),
        to_fixed(&v[1], [depth_to_fixed(v[1].depth)]),
        to_fixed(&v[2], [depth_to_fixed(v[2].depth)]),
    ];
    let [Some(a), Some(b), Some(c)] = fx else {
        log::trace!("fill_triangle: dropped unsafe coordinates {:?}", v);
        return 0;
    };

    let rgba = color.to_bytes();
    let (width, height) = (fb.width(), fb.height());
    let mut written = 0;

    walk_triangle(width, height, [a, b, c], |y, x0, x1, start, step| {
        let mut z = start[0];
        for x in x0..x1 {
            match mode {
                BlendMode::Copy => {
                    if fb.test_and_write_depth(x, y, clamp_depth(z), rgba) {
                        written += 1;
                    }
                }
                BlendMode::Add | BlendMode::Subtract => {
                    let dst = fb.read_pixel(x, y);
                    fb.write_pixel(x, y, mode.blend(dst, rgba));
                    written += 1;
                }
            }
            z += step[0];
        }
    });

    written
}

/// Fill a triangle interpolating each vertex's color (Gouraud) with a
/// depth-tested opaque write. Returns the number of pixels written.
pub fn fill_triangle_smooth(fb: &mut Framebuffer, v: &[ScreenVertex; 3]) -> usize {
    if fb.is_empty() {
        return 0;
    }
    let attrs = |p: &ScreenVertex| {
        [
            depth_to_fixed(p.depth),
            channel_to_fixed(p.color.r),
            channel_to_fixed(p.color.g),
            channel_to_fixed(p.color.b),
        ]
    };
    let fx = [
        to_fixed(&v[0], attrs(&v[0])),
        to_fixed(&v[1], attrs(&v[1])),
        to_fixed(&v[2], attrs(&v[2])),
    ];
    let [Some(a), Some(b), Some(c)] = fx else {
        log::trace!("fill_triangle_smooth: dropped unsafe coordinates {:?}", v);
        return 0;
    };

    let (width, height) = (fb.width(), fb.height());
    let mut written = 0;

    walk_triangle(width, height, [a, b, c], |y, x0, x1, start, step| {
        let [mut z, mut r, mut g, mut b] = start;
        for x in x0..x1 {
            let rgba = [fixed_to_u8(r), fixed_to_u8(g), fixed_to_u8(b), 255];
            if fb.test_and_write_depth(x, y, clamp_depth(z), rgba) {
                written += 1;
            }
            z += step[0];
            r += step[1];
            g += step[2];
            b += step[3];
        }
    });

    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::fixed::{DEPTH_FAR, FX_ONE};

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    /// Signed distance-like edge test at a pixel center, positive inside
    /// for clockwise (y-down) triangles
    fn inside_margin(v: &[ScreenVertex; 3], px: f32, py: f32) -> f32 {
        let mut m = f32::MAX;
        for i in 0..3 {
            let a = v[i];
            let b = v[(i + 1) % 3];
            let (ex, ey) = (b.x - a.x, b.y - a.y);
            let len = (ex * ex + ey * ey).sqrt();
            let d = (ex * (py - a.y) - ey * (px - a.x)) / len;
            m = m.min(d);
        }
        m
    }

    fn square(x: f32, y: f32, size: f32, depth: f32) -> [[ScreenVertex; 3]; 2] {
        let p0 = ScreenVertex::new(x, y, depth);
        let p1 = ScreenVertex::new(x + size, y, depth);
        let p2 = ScreenVertex::new(x + size, y + size, depth);
        let p3 = ScreenVertex::new(x, y + size, depth);
        [[p0, p1, p2], [p0, p2, p3]]
    }

    #[test]
    fn test_white_triangle_scenario() {
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let tri = [
            ScreenVertex::new(10.0, 10.0, 1.0),
            ScreenVertex::new(50.0, 10.0, 1.0),
            ScreenVertex::new(30.0, 50.0, 1.0),
        ];
        let written = fill_triangle(&mut fb, &tri, Color::WHITE, BlendMode::Copy);
        assert!(written > 0);

        for y in 0..64 {
            for x in 0..64 {
                let m = inside_margin(&tri, x as f32 + 0.5, y as f32 + 0.5);
                let c = fb.color_at(x, y).unwrap();
                let d = fb.depth_at(x, y).unwrap();
                if m > 0.01 {
                    assert_eq!(c, WHITE, "pixel ({}, {}) should be inside", x, y);
                    assert_eq!(d, FX_ONE as i32);
                } else if m < -0.01 {
                    assert_eq!(c, BLACK, "pixel ({}, {}) should be outside", x, y);
                    assert_eq!(d, DEPTH_FAR);
                }
            }
        }

        // Area of the triangle is 800 px; sampled coverage matches closely
        assert!((written as i32 - 800).abs() <= 40, "covered {}", written);
    }

    #[test]
    fn test_winding_does_not_matter() {
        let cw = [
            ScreenVertex::new(10.0, 10.0, 1.0),
            ScreenVertex::new(50.0, 10.0, 1.0),
            ScreenVertex::new(30.0, 50.0, 1.0),
        ];
        let ccw = [cw[0], cw[2], cw[1]];

        let mut a = Framebuffer::new(64, 64).unwrap();
        let mut b = Framebuffer::new(64, 64).unwrap();
        fill_triangle(&mut a, &cw, Color::WHITE, BlendMode::Copy);
        fill_triangle(&mut b, &ccw, Color::WHITE, BlendMode::Copy);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_nearer_wins_regardless_of_order() {
        for red_first in [true, false] {
            let mut fb = Framebuffer::new(64, 64).unwrap();
            let red = square(20.0, 20.0, 20.0, 0.5);
            let blue = square(20.0, 20.0, 20.0, 0.3);
            let order = if red_first {
                [(red, Color::RED), (blue, Color::BLUE)]
            } else {
                [(blue, Color::BLUE), (red, Color::RED)]
            };
            for (tris, color) in order {
                for t in &tris {
                    fill_triangle(&mut fb, t, color, BlendMode::Copy);
                }
            }
            for y in 20..40 {
                for x in 20..40 {
                    assert_eq!(fb.color_at(x, y), Some([0, 0, 255, 255]));
                }
            }
        }
    }

    #[test]
    fn test_exact_depth_tie_goes_to_later_draw() {
        let mut fb = Framebuffer::new(32, 32).unwrap();
        for t in &square(4.0, 4.0, 10.0, 2.0) {
            fill_triangle(&mut fb, t, Color::RED, BlendMode::Copy);
        }
        for t in &square(4.0, 4.0, 10.0, 2.0) {
            fill_triangle(&mut fb, t, Color::GREEN, BlendMode::Copy);
        }
        assert_eq!(fb.color_at(8, 8), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_shared_edge_has_no_gap_or_overlap() {
        let mut fb = Framebuffer::new(32, 32).unwrap();
        let written: usize = square(3.3, 2.7, 17.0, 1.0)
            .iter()
            .map(|t| fill_triangle(&mut fb, t, Color::WHITE, BlendMode::Add))
            .sum();
        // Add mode counts every covered pixel; overlap would exceed 17x17
        assert_eq!(written, 17 * 17);
        for y in 0..32 {
            for x in 0..32 {
                let c = fb.color_at(x, y).unwrap();
                let inside = (3..20).contains(&x) && (3..20).contains(&y);
                assert_eq!(c == WHITE, inside, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_zero_height_triangle_is_skipped() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        let tri = [
            ScreenVertex::new(1.0, 5.0, 1.0),
            ScreenVertex::new(8.0, 5.0, 1.0),
            ScreenVertex::new(14.0, 5.0, 1.0),
        ];
        assert_eq!(fill_triangle(&mut fb, &tri, Color::WHITE, BlendMode::Copy), 0);
        assert_eq!(fill_triangle_smooth(&mut fb, &tri), 0);
    }

    #[test]
    fn test_centroid_color_is_vertex_average() {
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let tri = [
            ScreenVertex::with_color(0.5, 0.5, 1.0, Color::RED),
            ScreenVertex::with_color(60.5, 0.5, 1.0, Color::GREEN),
            ScreenVertex::with_color(0.5, 60.5, 1.0, Color::BLUE),
        ];
        fill_triangle_smooth(&mut fb, &tri);
        // Centroid (20.5, 20.5) is the center of pixel (20, 20)
        let c = fb.color_at(20, 20).unwrap();
        for ch in &c[..3] {
            assert!((*ch as i32 - 85).abs() <= 1, "channel {} at centroid", ch);
        }
    }

    #[test]
    fn test_smooth_fill_interpolates_linearly_along_a_row() {
        let mut fb = Framebuffer::new(128, 8).unwrap();
        let tri = [
            ScreenVertex::with_color(0.0, 0.0, 1.0, Color::BLACK),
            ScreenVertex::with_color(128.0, 0.0, 1.0, Color::WHITE),
            ScreenVertex::with_color(0.0, 8.0, 1.0, Color::BLACK),
        ];
        fill_triangle_smooth(&mut fb, &tri);
        // Row 0 center y = 0.5: color at pixel x is (x + 0.5) / 128
        for x in [0usize, 31, 63, 100] {
            let expected = ((x as f32 + 0.5) / 128.0 * 255.0).round() as i32;
            let got = fb.color_at(x, 0).unwrap()[0] as i32;
            assert!((got - expected).abs() <= 1, "x={} got {} expected {}", x, got, expected);
        }
    }

    #[test]
    fn test_add_and_subtract_skip_depth() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        fb.reset(16, 16, Color::new(0.5, 0.5, 0.5)).unwrap();
        let [t0, t1] = square(0.0, 0.0, 16.0, 1.0);
        fill_triangle(&mut fb, &t0, Color::from_rgb8(10, 10, 10), BlendMode::Add);
        fill_triangle(&mut fb, &t1, Color::from_rgb8(10, 10, 10), BlendMode::Add);
        assert_eq!(fb.color_at(10, 3), Some([138, 138, 138, 255]));
        assert_eq!(fb.color_at(3, 10), Some([138, 138, 138, 255]));
        assert_eq!(fb.depth_at(10, 3), Some(DEPTH_FAR));

        fill_triangle(&mut fb, &t0, Color::from_rgb8(40, 40, 40), BlendMode::Subtract);
        fill_triangle(&mut fb, &t1, Color::from_rgb8(40, 40, 40), BlendMode::Subtract);
        assert_eq!(fb.color_at(10, 3), Some([98, 98, 98, 255]));
    }

    #[test]
    fn test_unsafe_coordinates_are_dropped() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        let before = fb.pixels().to_vec();
        let tri = [
            ScreenVertex::new(1.0, 1.0, 1.0),
            ScreenVertex::new(1.0e7, 2.0, 1.0),
            ScreenVertex::new(3.0, 12.0, 1.0),
        ];
        assert!(!is_rasterizable(&tri));
        assert_eq!(fill_triangle(&mut fb, &tri, Color::WHITE, BlendMode::Copy), 0);
        assert_eq!(fb.pixels(), &before[..]);
    }

    #[test]
    fn test_huge_safe_triangle_clamps_to_viewport() {
        let mut fb = Framebuffer::new(40, 30).unwrap();
        let tri = [
            ScreenVertex::new(-30_000.0, -30_000.0, 2.0),
            ScreenVertex::new(30_000.0, -30_000.0, 2.0),
            ScreenVertex::new(0.0, 30_000.0, 2.0),
        ];
        assert_eq!(fill_triangle(&mut fb, &tri, Color::WHITE, BlendMode::Copy), 40 * 30);
        assert_eq!(fb.depth_at(0, 0), Some(2 * FX_ONE as i32));
        assert_eq!(fb.depth_at(39, 29), Some(2 * FX_ONE as i32));
    }

    #[test]
    fn test_clamped_left_edge_keeps_interpolated_depth() {
        let mut fb = Framebuffer::new(20, 20).unwrap();
        // Depth grows linearly with x: depth = 1 + (x + 1000) / 100
        let tri = [
            ScreenVertex::new(-1000.0, -100.0, 1.0),
            ScreenVertex::new(1000.0, -100.0, 21.0),
            ScreenVertex::new(-1000.0, 1000.0, 1.0),
        ];
        fill_triangle(&mut fb, &tri, Color::WHITE, BlendMode::Copy);
        for x in [0usize, 10, 19] {
            let expected = 1.0 + (x as f32 + 0.5 + 1000.0) / 100.0;
            let got = fb.depth_at(x, 0).unwrap() as f32 / FX_ONE as f32;
            assert!((got - expected).abs() < 0.01, "x={} got {} expected {}", x, got, expected);
        }
    }

    #[test]
    fn test_empty_buffer_is_noop() {
        let mut fb = Framebuffer::new(-1, -1).unwrap();
        let tri = [
            ScreenVertex::new(0.0, 0.0, 1.0),
            ScreenVertex::new(10.0, 0.0, 1.0),
            ScreenVertex::new(0.0, 10.0, 1.0),
        ];
        assert_eq!(fill_triangle(&mut fb, &tri, Color::WHITE, BlendMode::Copy), 0);
        assert_eq!(fill_triangle_smooth(&mut fb, &tri), 0);
    }
}
