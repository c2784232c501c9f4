//! Geometry, camera and coloring inputs consumed by the renderer
//!
//! - `TriMesh`: shared vertex/normal arrays plus index triangles
//! - `Camera`: object/world to view and screen transforms, clip distance
//! - `Colorizer`: per-face / per-vertex color strategies

mod camera;
mod colorizer;
mod mesh;

pub use camera::*;
pub use colorizer::*;
pub use mesh::*;
