//! Color strategies queried per triangle corner

use serde::{Deserialize, Serialize};

use super::mesh::TriMesh;
use crate::rasterizer::{Bitmap, Color};

/// Two-stop color ramp over a scalar range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub low: Color,
    pub high: Color,
    pub min: f32,
    pub max: f32,
}

impl Ramp {
    pub fn new(low: Color, high: Color, min: f32, max: f32) -> Self {
        Self { low, high, min, max }
    }

    pub fn color(&self, value: f32) -> Color {
        let span = self.max - self.min;
        let t = if span.abs() <= f32::EPSILON {
            0.0
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        };
        self.low.lerp(self.high, t)
    }
}

/// Where a triangle's corner colors come from.
///
/// Queries take a triangle index into the mesh being rendered and a corner
/// slot (0..3). Face-based variants look the face up through the mesh.
#[derive(Debug, Clone, Copy)]
pub enum Colorizer<'a> {
    /// One color for everything
    Flat(Color),
    /// One color per logical face
    PerFace { mesh: &'a TriMesh, colors: &'a [Color] },
    /// One color per vertex, interpolated across triangles
    PerVertex { mesh: &'a TriMesh, colors: &'a [Color] },
    /// Per-vertex scalar mapped through a ramp
    Parameter { mesh: &'a TriMesh, values: &'a [f32], ramp: Ramp },
    /// Face `i` takes pixel `i` of the image (row-major)
    Image { mesh: &'a TriMesh, image: &'a Bitmap },
    /// Highlight selected faces over another colorizer
    Selection {
        base: &'a Colorizer<'a>,
        mesh: &'a TriMesh,
        selected: &'a [bool],
        highlight: Color,
    },
}

impl<'a> Colorizer<'a> {
    /// Color of corner `slot` of triangle `tri`
    pub fn color(&self, tri: usize, slot: usize) -> Color {
        match *self {
            Colorizer::Flat(c) => c,
            Colorizer::PerFace { mesh, colors } => colors[mesh.triangles()[tri].face],
            Colorizer::PerVertex { mesh, colors } => colors[mesh.triangles()[tri].vertex[slot]],
            Colorizer::Parameter { mesh, values, ramp } => ramp.color(values[mesh.triangles()[tri].vertex[slot]]),
            Colorizer::Image { mesh, image } => {
                let face = mesh.triangles()[tri].face;
                if image.width() == 0 {
                    return Color::BLACK;
                }
                image.color_at(face % image.width(), face / image.width())
            }
            Colorizer::Selection { base, mesh, selected, highlight } => {
                if selected.get(mesh.triangles()[tri].face).copied().unwrap_or(false) {
                    highlight
                } else {
                    base.color(tri, slot)
                }
            }
        }
    }

    /// True when all three corners of `tri` share one color
    pub fn is_uniform_face(&self, tri: usize) -> bool {
        match *self {
            Colorizer::Flat(_) | Colorizer::PerFace { .. } | Colorizer::Image { .. } => true,
            Colorizer::PerVertex { mesh, colors } => {
                let [a, b, c] = mesh.triangles()[tri].vertex;
                colors[a] == colors[b] && colors[b] == colors[c]
            }
            Colorizer::Parameter { mesh, values, .. } => {
                let [a, b, c] = mesh.triangles()[tri].vertex;
                values[a] == values[b] && values[b] == values[c]
            }
            Colorizer::Selection { base, mesh, selected, .. } => {
                selected.get(mesh.triangles()[tri].face).copied().unwrap_or(false) || base.is_uniform_face(tri)
            }
        }
    }

    /// True when every triangle gets the same single color
    pub fn is_uniform_surface(&self) -> bool {
        match *self {
            Colorizer::Flat(_) => true,
            Colorizer::PerFace { colors, .. } | Colorizer::PerVertex { colors, .. } => {
                colors.windows(2).all(|w| w[0] == w[1])
            }
            Colorizer::Parameter { values, .. } => values.windows(2).all(|w| w[0] == w[1]),
            Colorizer::Image { .. } => false,
            Colorizer::Selection { base, selected, .. } => !selected.contains(&true) && base.is_uniform_surface(),
        }
    }

    /// The single surface color; only meaningful when `is_uniform_surface`
    pub fn surface_color(&self) -> Color {
        match *self {
            Colorizer::Flat(c) => c,
            Colorizer::PerFace { colors, .. } | Colorizer::PerVertex { colors, .. } => {
                colors.first().copied().unwrap_or(Color::BLACK)
            }
            Colorizer::Parameter { values, ramp, .. } => values.first().map(|&v| ramp.color(v)).unwrap_or(Color::BLACK),
            Colorizer::Image { image, .. } => {
                if image.width() == 0 || image.height() == 0 {
                    Color::BLACK
                } else {
                    image.color_at(0, 0)
                }
            }
            Colorizer::Selection { base, .. } => base.surface_color(),
        }
    }
}
