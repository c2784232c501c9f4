//! 16.16 fixed-point helpers
//!
//! Screen coordinates, depths and colour channels are converted to 16.16
//! fixed point before entering the scanline loops. All arithmetic runs on
//! `i64` so products of two 16.16 values cannot wrap; inputs are range
//! checked on the way in instead of relying on overflow behaviour.

pub const FX_SHIFT: u32 = 16;
pub const FX_ONE: i64 = 1 << FX_SHIFT;
pub const FX_HALF: i64 = FX_ONE >> 1;

/// Largest screen coordinate magnitude the rasterizer accepts.
/// Anything further out is treated as a degenerate projection.
pub const MAX_SCREEN_COORD: f32 = 32_767.0;

/// Largest representable view-space depth
pub const MAX_DEPTH: f32 = 32_767.0;

/// Depth-buffer sentinel: farther than any representable depth
pub const DEPTH_FAR: i32 = i32::MAX;

/// Convert a screen coordinate to 16.16, truncating the sub-fraction.
/// Returns `None` for NaN, infinities and values outside `MAX_SCREEN_COORD`.
#[inline]
pub fn coord_to_fixed(v: f32) -> Option<i64> {
    if !v.is_finite() || v.abs() > MAX_SCREEN_COORD {
        return None;
    }
    Some((v as f64 * FX_ONE as f64) as i64)
}

/// True when a screen coordinate can be converted without loss of range
#[inline]
pub fn is_safe_coord(v: f32) -> bool {
    v.is_finite() && v.abs() <= MAX_SCREEN_COORD
}

/// Convert a view-space depth to its depth-buffer encoding, clamped to
/// `[0, MAX_DEPTH]`. NaN maps to the far sentinel.
#[inline]
pub fn depth_to_fixed(depth: f32) -> i64 {
    if depth.is_nan() {
        return DEPTH_FAR as i64;
    }
    let d = depth.clamp(0.0, MAX_DEPTH);
    (d as f64 * FX_ONE as f64) as i64
}

/// Clamp an interpolated depth into the storable range
#[inline]
pub fn clamp_depth(z: i64) -> i32 {
    z.clamp(0, DEPTH_FAR as i64 - 1) as i32
}

/// Colour channel in `[0, 1]` to 16.16
#[inline]
pub fn channel_to_fixed(c: f32) -> i64 {
    (c.clamp(0.0, 1.0) as f64 * FX_ONE as f64) as i64
}

/// 16.16 colour channel to an 8-bit value, rounding to nearest
#[inline]
pub fn fixed_to_u8(c: i64) -> u8 {
    ((c.clamp(0, FX_ONE) * 255 + FX_HALF) >> FX_SHIFT) as u8
}

/// Smallest integer `n` with `n >= v` (v in 16.16)
#[inline]
pub fn fx_ceil(v: i64) -> i64 {
    (v + FX_ONE - 1) >> FX_SHIFT
}

#[inline]
pub fn fx_from_int(i: i64) -> i64 {
    i << FX_SHIFT
}

#[inline]
pub fn fx_mul(a: i64, b: i64) -> i64 {
    (a * b) >> FX_SHIFT
}

/// Fixed-point quotient. Callers guarantee `b != 0`.
#[inline]
pub fn fx_div(a: i64, b: i64) -> i64 {
    (a << FX_SHIFT) / b
}
