//! Software canvas: the drawing surface handed to the rest of the app
//!
//! One frame is `begin_frame`, any number of draw calls, then `end_frame`
//! and reading `frame()` for display. Images are composited first, opaque
//! geometry next, lines and text last.

use crate::cache::IdentityCache;
use crate::config::CanvasSettings;
use crate::error::RenderError;
use crate::font;
use crate::rasterizer::{
    blit, line, Bitmap, Color, FrameStats, Framebuffer, ImageMesh, ImagePlacement, MeshRenderer, TransparentStyle,
    Vec3,
};
use crate::scene::{Camera, Colorizer, TriMesh};

pub struct SoftwareCanvas {
    frame: Framebuffer,
    renderer: MeshRenderer,
    image_meshes: IdentityCache<ImageMesh>,
    settings: CanvasSettings,
}

impl Default for SoftwareCanvas {
    fn default() -> Self {
        Self::new(CanvasSettings::default())
    }
}

impl SoftwareCanvas {
    pub fn new(mut settings: CanvasSettings) -> Self {
        settings.sanitize();
        Self {
            frame: Framebuffer::default(),
            renderer: MeshRenderer::new(),
            image_meshes: IdentityCache::new(settings.image_cache_capacity),
            settings,
        }
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, mut settings: CanvasSettings) {
        settings.sanitize();
        self.image_meshes.set_capacity(settings.image_cache_capacity);
        self.settings = settings;
    }

    /// Size and clear the frame. Allocation failure aborts the frame.
    pub fn begin_frame(&mut self, width: i32, height: i32) -> Result<(), RenderError> {
        self.renderer.stats_mut().reset();
        self.frame.reset(width, height, self.settings.background)
    }

    /// Finish the frame and return it for display
    pub fn end_frame(&self) -> &Framebuffer {
        let s = self.renderer.stats();
        log::debug!(
            "frame {}x{}: {} tris submitted, {} rasterized, {} clipped, {} culled, {} dropped, {} lines, {} px",
            self.frame.width(),
            self.frame.height(),
            s.triangles_submitted,
            s.triangles_rasterized,
            s.triangles_clipped,
            s.triangles_behind + s.triangles_backfacing + s.triangles_hidden,
            s.triangles_dropped,
            s.lines_drawn,
            s.pixels_written,
        );
        &self.frame
    }

    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    pub fn stats(&self) -> &FrameStats {
        self.renderer.stats()
    }

    pub fn draw_border(&mut self, color: Color) {
        line::draw_border(&mut self.frame, color);
    }

    pub fn draw_hrule(&mut self, y: i32, color: Color) {
        line::draw_hrule(&mut self.frame, y, color);
    }

    pub fn draw_vrule(&mut self, x: i32, color: Color) {
        line::draw_vrule(&mut self.frame, x, color);
    }

    pub fn draw_box(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color, filled: bool) {
        line::draw_box(&mut self.frame, x, y, width, height, color, filled);
    }

    /// 2D line in pixel coordinates, no depth test
    pub fn draw_line(&mut self, p1: (i32, i32), p2: (i32, i32), color: Color) {
        line::draw_line(&mut self.frame, p1.0, p1.1, p2.0, p2.1, color);
    }

    /// Depth-tested 3D line in object space
    pub fn render_line(&mut self, p1: Vec3, p2: Vec3, camera: &dyn Camera, color: Color) {
        let written = line::render_line(&mut self.frame, p1, p2, camera, color, self.settings.line_depth_bias);
        if written > 0 {
            let stats = self.renderer.stats_mut();
            stats.lines_drawn += 1;
            stats.pixels_written += written;
        }
    }

    pub fn render_wireframe(&mut self, mesh: &TriMesh, camera: &dyn Camera, color: Color) {
        self.renderer
            .render_wireframe(&mut self.frame, mesh, camera, color, self.settings.line_depth_bias);
    }

    /// Opaque mesh. Back faces are culled for `closed` meshes when the
    /// settings allow it and no hide mask is given.
    pub fn render_mesh(
        &mut self,
        mesh: &TriMesh,
        colorizer: &Colorizer,
        camera: &dyn Camera,
        closed: bool,
        hide_mask: Option<&[bool]>,
    ) {
        let cull = closed && self.settings.hide_backfaces;
        self.renderer
            .render_mesh(&mut self.frame, mesh, colorizer, camera, cull, hide_mask);
    }

    /// See-through mesh blended onto the frame. `view_dir` is in object space.
    pub fn render_mesh_transparent(
        &mut self,
        mesh: &TriMesh,
        colorizer: &Colorizer,
        camera: &dyn Camera,
        view_dir: Vec3,
        hide_mask: Option<&[bool]>,
    ) {
        let style = TransparentStyle {
            view_dir,
            opacity: self.settings.transparent_opacity,
            background: self.settings.background,
        };
        self.renderer
            .render_mesh_transparent(&mut self.frame, mesh, colorizer, camera, &style, hide_mask);
    }

    /// Overlay text; returns the x just past the last character
    pub fn draw_string(&mut self, text: &str, x: i32, y: i32, color: Color) -> i32 {
        font::draw_string(&mut self.frame, text, x, y, color, self.settings.font_scale)
    }

    pub fn draw_image(&mut self, image: &Bitmap, x: i32, y: i32) {
        blit::draw_image(&mut self.frame, image, x, y);
    }

    pub fn draw_image_scaled(&mut self, image: &Bitmap, x: i32, y: i32, width: i32, height: i32) {
        blit::draw_image_scaled(&mut self.frame, image, x, y, width, height);
    }

    /// Image as a textured quad in 3D, one flat-colored cell per pixel.
    /// The converted mesh is cached per image and moved on reuse.
    pub fn render_image(&mut self, image: &Bitmap, placement: ImagePlacement, camera: &dyn Camera) {
        let cached = self
            .image_meshes
            .get_or_insert_with(image.id(), image.generation(), |stale| match stale {
                Some(mut quad) => {
                    quad.update(image, placement);
                    quad
                }
                None => ImageMesh::new(image, placement),
            });

        match cached {
            Some(quad) => {
                quad.reposition(placement);
                let colorizer = Colorizer::Image { mesh: &quad.mesh, image };
                self.renderer
                    .render_mesh(&mut self.frame, &quad.mesh, &colorizer, camera, false, Some(&quad.hidden));
            }
            None => {
                let quad = ImageMesh::new(image, placement);
                let colorizer = Colorizer::Image { mesh: &quad.mesh, image };
                self.renderer
                    .render_mesh(&mut self.frame, &quad.mesh, &colorizer, camera, false, Some(&quad.hidden));
            }
        }
    }

    /// Number of images currently held converted for 3D rendering
    pub fn cached_images(&self) -> usize {
        self.image_meshes.len()
    }
}
