//! softcanvas: fixed-point software 3D rasterizer
//!
//! Renders triangle meshes, lines, text and images into an RGBA8 color
//! buffer with an integer depth buffer:
//! - 16.16 fixed-point scanline fill (flat, Gouraud, additive/subtractive)
//! - Near-plane clipping of triangles in view space
//! - Backface culling for closed meshes
//! - Depth-tested wireframes and overlay primitives
//!
//! `SoftwareCanvas` is the entry point; `rasterizer` holds the building
//! blocks and `scene` the mesh, camera and colorizer inputs.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cache;
pub mod canvas;
pub mod config;
pub mod error;
pub mod font;
pub mod rasterizer;
pub mod scene;

pub use canvas::SoftwareCanvas;
pub use config::{load_settings, load_settings_from_str, save_settings, CanvasSettings};
pub use error::{ConfigError, RenderError};
