//! Fixed-point software rasterizer
//!
//! Features:
//! - 16.16 fixed-point scanline fill with an integer depth buffer
//! - Flat, Gouraud and additive/subtractive transparent fills
//! - Near-plane clipping in view space
//! - Depth-tested Bresenham lines, 2D rules and boxes
//! - Nearest-neighbour image blits

pub mod blit;
mod clip;
pub mod fixed;
mod framebuffer;
pub mod line;
mod math;
mod mesh;
mod triangle;
mod types;

pub use blit::{ImageMesh, ImagePlacement};
pub use clip::*;
pub use framebuffer::*;
pub use math::*;
pub use mesh::*;
pub use triangle::*;
pub use types::*;
