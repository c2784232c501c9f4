//! Near-plane clipping in view space
//!
//! A vertex is clipped when its view depth is below the clip distance.
//! Surviving geometry is either the untouched triangle, a smaller triangle
//! (two vertices clipped) or a quadrilateral (one vertex clipped). New
//! vertices are placed on the clip plane by linear interpolation of every
//! attribute at `t = (z_kept - clip) / (z_kept - z_clipped)`.

use super::math::Vec3;
use super::types::Color;

/// Something that can be split along a triangle edge
pub trait ClipVertex: Copy {
    /// View-space depth (positive in front of the camera)
    fn depth(&self) -> f32;

    /// Attribute-wise `self + (other - self) * t`
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl ClipVertex for Vec3 {
    #[inline]
    fn depth(&self) -> f32 {
        self.z
    }

    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

/// View-space position carrying a vertex color for smooth shading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedVertex {
    pub pos: Vec3,
    pub color: Color,
}

impl ShadedVertex {
    pub fn new(pos: Vec3, color: Color) -> Self {
        Self { pos, color }
    }
}

impl ClipVertex for ShadedVertex {
    #[inline]
    fn depth(&self) -> f32 {
        self.pos.z
    }

    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            pos: self.pos.lerp(other.pos, t),
            color: self.color.lerp(other.color, t),
        }
    }
}

/// Outcome of clipping one triangle against the near plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clipped<V> {
    /// No vertex behind the plane; use the input as is
    Visible,
    /// Every vertex behind the plane; skip the triangle
    Culled,
    /// Two vertices clipped: (kept, on edge to next, on edge to previous)
    Triangle([V; 3]),
    /// One vertex clipped: (kept1, kept2, on edge kept2-clipped, on edge clipped-kept1)
    Quad([V; 4]),
}

impl<V: ClipVertex> Clipped<V> {
    pub fn needs_clipping(&self) -> bool {
        matches!(self, Clipped::Triangle(_) | Clipped::Quad(_))
    }

    /// Emit the surviving triangles in the input's winding order.
    /// A quad is split along its kept1 / on-edge-from-kept2 diagonal.
    pub fn for_each_triangle<F: FnMut([V; 3])>(&self, input: &[V; 3], mut f: F) {
        match self {
            Clipped::Visible => f(*input),
            Clipped::Culled => {}
            Clipped::Triangle(t) => f(*t),
            Clipped::Quad([a, b, ib, ia]) => {
                f([*a, *b, *ib]);
                f([*a, *ib, *ia]);
            }
        }
    }
}

/// Interpolation parameter from a kept vertex toward a clipped one
#[inline]
fn clip_t(kept: f32, clipped: f32, clip_distance: f32) -> f32 {
    (kept - clip_distance) / (kept - clipped)
}

#[inline]
fn split<V: ClipVertex>(kept: &V, clipped: &V, clip_distance: f32) -> V {
    let t = clip_t(kept.depth(), clipped.depth(), clip_distance);
    kept.lerp(clipped, t)
}

/// Clip a triangle against the plane `depth = clip_distance`
pub fn clip_near<V: ClipVertex>(v: &[V; 3], clip_distance: f32) -> Clipped<V> {
    let behind = [
        v[0].depth() < clip_distance,
        v[1].depth() < clip_distance,
        v[2].depth() < clip_distance,
    ];
    let count = behind.iter().filter(|&&b| b).count();

    match count {
        0 => Clipped::Visible,
        3 => Clipped::Culled,
        2 => {
            // Rotate so the kept vertex comes first; winding is unchanged
            let k = behind.iter().position(|&b| !b).unwrap_or(0);
            let kept = v[k];
            let next = v[(k + 1) % 3];
            let prev = v[(k + 2) % 3];
            Clipped::Triangle([
                kept,
                split(&kept, &next, clip_distance),
                split(&kept, &prev, clip_distance),
            ])
        }
        _ => {
            let c = behind.iter().position(|&b| b).unwrap_or(0);
            let clipped = v[c];
            let a = v[(c + 1) % 3];
            let b = v[(c + 2) % 3];
            Clipped::Quad([
                a,
                b,
                split(&b, &clipped, clip_distance),
                split(&a, &clipped, clip_distance),
            ])
        }
    }
}

/// Position-only clipping for flat-colored triangles
pub fn clip_triangle(pos: &[Vec3; 3], clip_distance: f32) -> Clipped<Vec3> {
    clip_near(pos, clip_distance)
}

/// Clipping that also interpolates vertex colors
pub fn clip_triangle_smooth(pos: &[Vec3; 3], colors: &[Color; 3], clip_distance: f32) -> Clipped<ShadedVertex> {
    let v = [
        ShadedVertex::new(pos[0], colors[0]),
        ShadedVertex::new(pos[1], colors[1]),
        ShadedVertex::new(pos[2], colors[2]),
    ];
    clip_near(&v, clip_distance)
}
