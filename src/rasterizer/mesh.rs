//! Mesh rendering: cull, classify, clip and rasterize every triangle
//!
//! Vertices are transformed once per call into a scratch buffer that keeps
//! its capacity between calls. Each triangle then goes through:
//!
//! 1. hide mask
//! 2. fully-behind-clip rejection
//! 3. backface test (closed meshes, unclipped triangles only)
//! 4. flat or smooth fill, near-clipping first when needed

use super::clip::{clip_triangle, clip_triangle_smooth, Clipped, ShadedVertex};
use super::framebuffer::Framebuffer;
use super::line::{draw_line_depth, line_survives_clip};
use super::math::{signed_area, Mat4, Vec2, Vec3};
use super::triangle::{fill_triangle, fill_triangle_smooth, is_rasterizable, ScreenVertex};
use super::types::{BlendMode, Color};
use crate::scene::{Camera, Colorizer, TriMesh};

/// Per-frame counters, reset by the canvas at the start of every frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles_submitted: usize,
    pub triangles_hidden: usize,
    pub triangles_behind: usize,
    pub triangles_backfacing: usize,
    pub triangles_clipped: usize,
    pub triangles_dropped: usize,
    pub triangles_rasterized: usize,
    pub lines_drawn: usize,
    pub pixels_written: usize,
}

impl FrameStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Transparent-mode parameters
#[derive(Debug, Clone, Copy)]
pub struct TransparentStyle {
    /// Object-space view direction; faces seen edge-on contribute more
    pub view_dir: Vec3,
    pub opacity: f32,
    pub background: Color,
}

impl TransparentStyle {
    /// Light backgrounds darken, dark backgrounds brighten
    pub fn blend_mode(&self) -> BlendMode {
        if self.background.to_rgb8()[1] > 127 {
            BlendMode::Subtract
        } else {
            BlendMode::Add
        }
    }

    fn face_color(&self, color: Color, normal: Vec3) -> Color {
        let facing = normal.dot(self.view_dir.normalize()).abs();
        color.shade(self.opacity * (1.0 - 0.5 * facing))
    }
}

/// Renders meshes into a framebuffer, reusing its projection scratch space
#[derive(Debug, Default)]
pub struct MeshRenderer {
    view: Vec<Vec3>,
    screen: Vec<Option<Vec2>>,
    stats: FrameStats,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut FrameStats {
        &mut self.stats
    }

    /// Transform every vertex to view space and project it
    fn project(&mut self, mesh: &TriMesh, camera: &dyn Camera) {
        let to_view = camera.object_to_view();
        let to_screen = camera.view_to_screen();
        self.view.clear();
        self.screen.clear();
        for &p in mesh.vertices() {
            let v = to_view.transform_point(p);
            self.view.push(v);
            self.screen.push(to_screen.project(v));
        }
    }

    fn screen_triangle(&self, idx: [usize; 3]) -> Option<[ScreenVertex; 3]> {
        let mut out = [ScreenVertex::default(); 3];
        for (slot, &i) in idx.iter().enumerate() {
            let s = self.screen[i]?;
            out[slot] = ScreenVertex::new(s.x, s.y, self.view[i].z);
        }
        Some(out)
    }

    /// Render a mesh opaquely.
    ///
    /// `cull_backfaces` is meant for closed surfaces and is ignored when a
    /// hide mask is given. Triangles whose mask entry is `true` are skipped.
    pub fn render_mesh(
        &mut self,
        fb: &mut Framebuffer,
        mesh: &TriMesh,
        colorizer: &Colorizer,
        camera: &dyn Camera,
        cull_backfaces: bool,
        hide_mask: Option<&[bool]>,
    ) {
        let cull_backfaces = cull_backfaces && hide_mask.is_none();
        self.project(mesh, camera);
        let clip = camera.clip_distance();
        let to_screen = camera.view_to_screen();
        let surface = colorizer.is_uniform_surface().then(|| colorizer.surface_color());

        for (t, tri) in mesh.triangles().iter().enumerate() {
            self.stats.triangles_submitted += 1;
            if hide_mask.is_some_and(|mask| mask[t]) {
                self.stats.triangles_hidden += 1;
                continue;
            }

            let pos = tri.vertex.map(|i| self.view[i]);
            let clipped = clip_triangle(&pos, clip);
            if matches!(clipped, Clipped::Culled) {
                self.stats.triangles_behind += 1;
                continue;
            }
            let needs_clipping = clipped.needs_clipping();

            let unclipped = if needs_clipping { None } else { self.screen_triangle(tri.vertex) };
            if !needs_clipping && unclipped.is_none() {
                self.stats.triangles_dropped += 1;
                continue;
            }

            if cull_backfaces {
                if let Some(sv) = &unclipped {
                    let area = signed_area(
                        Vec2::new(sv[0].x, sv[0].y),
                        Vec2::new(sv[1].x, sv[1].y),
                        Vec2::new(sv[2].x, sv[2].y),
                    );
                    if area <= 0.0 {
                        self.stats.triangles_backfacing += 1;
                        continue;
                    }
                }
            }

            if needs_clipping {
                self.stats.triangles_clipped += 1;
            }

            let flat = match surface {
                Some(c) => Some(c),
                None if colorizer.is_uniform_face(t) => Some(colorizer.color(t, 0)),
                None => None,
            };

            match flat {
                Some(color) => match unclipped {
                    Some(sv) => self.fill(fb, &sv, color, BlendMode::Copy),
                    None => clipped.for_each_triangle(&pos, |part| {
                        match project_clipped(&to_screen, &part, |_| Color::BLACK) {
                            Some(sv) => self.fill(fb, &sv, color, BlendMode::Copy),
                            None => self.stats.triangles_dropped += 1,
                        }
                    }),
                },
                None => {
                    let colors = [colorizer.color(t, 0), colorizer.color(t, 1), colorizer.color(t, 2)];
                    match unclipped {
                        Some(mut sv) => {
                            for (v, c) in sv.iter_mut().zip(colors) {
                                v.color = c;
                            }
                            self.fill_smooth(fb, &sv);
                        }
                        None => {
                            let shaded = clip_triangle_smooth(&pos, &colors, clip);
                            let input = [
                                ShadedVertex::new(pos[0], colors[0]),
                                ShadedVertex::new(pos[1], colors[1]),
                                ShadedVertex::new(pos[2], colors[2]),
                            ];
                            shaded.for_each_triangle(&input, |part| {
                                let positions = part.map(|v| v.pos);
                                match project_clipped(&to_screen, &positions, |slot| part[slot].color) {
                                    Some(sv) => self.fill_smooth(fb, &sv),
                                    None => self.stats.triangles_dropped += 1,
                                }
                            });
                        }
                    }
                }
            }
        }
    }

    /// Render a mesh with additive or subtractive blending and no depth test.
    /// Every face is flat-colored from corner 0 and nothing is backface culled.
    pub fn render_mesh_transparent(
        &mut self,
        fb: &mut Framebuffer,
        mesh: &TriMesh,
        colorizer: &Colorizer,
        camera: &dyn Camera,
        style: &TransparentStyle,
        hide_mask: Option<&[bool]>,
    ) {
        self.project(mesh, camera);
        let clip = camera.clip_distance();
        let to_screen = camera.view_to_screen();
        let mode = style.blend_mode();

        for (t, tri) in mesh.triangles().iter().enumerate() {
            self.stats.triangles_submitted += 1;
            if hide_mask.is_some_and(|mask| mask[t]) {
                self.stats.triangles_hidden += 1;
                continue;
            }

            let pos = tri.vertex.map(|i| self.view[i]);
            let clipped = clip_triangle(&pos, clip);
            if matches!(clipped, Clipped::Culled) {
                self.stats.triangles_behind += 1;
                continue;
            }
            if clipped.needs_clipping() {
                self.stats.triangles_clipped += 1;
            }

            let color = style.face_color(colorizer.color(t, 0), mesh.triangle_normal(t));
            clipped.for_each_triangle(&pos, |part| match project_clipped(&to_screen, &part, |_| Color::BLACK) {
                Some(sv) => self.fill(fb, &sv, color, mode),
                None => self.stats.triangles_dropped += 1,
            });
        }
    }

    /// Depth-tested wireframe over the mesh's edges
    pub fn render_wireframe(
        &mut self,
        fb: &mut Framebuffer,
        mesh: &TriMesh,
        camera: &dyn Camera,
        color: Color,
        depth_bias: f32,
    ) {
        self.project(mesh, camera);
        let clip = camera.clip_distance();
        let perspective = camera.is_perspective();

        for [a, b] in mesh.edges() {
            let (v0, v1) = (self.view[a], self.view[b]);
            if !line_survives_clip(v0.z, v1.z, clip, perspective) {
                continue;
            }
            let (Some(s0), Some(s1)) = (self.screen[a], self.screen[b]) else {
                continue;
            };
            let written = draw_line_depth(
                fb,
                ScreenVertex::new(s0.x, s0.y, v0.z - depth_bias),
                ScreenVertex::new(s1.x, s1.y, v1.z - depth_bias),
                color,
            );
            self.stats.lines_drawn += 1;
            self.stats.pixels_written += written;
        }
    }

    fn fill(&mut self, fb: &mut Framebuffer, sv: &[ScreenVertex; 3], color: Color, mode: BlendMode) {
        if !is_rasterizable(sv) {
            self.stats.triangles_dropped += 1;
            return;
        }
        self.stats.triangles_rasterized += 1;
        self.stats.pixels_written += fill_triangle(fb, sv, color, mode);
    }

    fn fill_smooth(&mut self, fb: &mut Framebuffer, sv: &[ScreenVertex; 3]) {
        if !is_rasterizable(sv) {
            self.stats.triangles_dropped += 1;
            return;
        }
        self.stats.triangles_rasterized += 1;
        self.stats.pixels_written += fill_triangle_smooth(fb, sv);
    }
}

/// Project clip-plane vertices synthesized in view space
fn project_clipped<F: Fn(usize) -> Color>(to_screen: &Mat4, pos: &[Vec3; 3], color: F) -> Option<[ScreenVertex; 3]> {
    let mut out = [ScreenVertex::default(); 3];
    for (slot, &p) in pos.iter().enumerate() {
        let s = to_screen.project(p)?;
        out[slot] = ScreenVertex::with_color(s.x, s.y, p.z, color(slot));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::fixed::DEPTH_FAR;
    use crate::scene::{create_grid, create_test_cube, Projection, ViewCamera};

    fn count_not(fb: &Framebuffer, rgba: [u8; 4]) -> usize {
        fb.pixels().chunks_exact(4).filter(|p| *p != rgba).count()
    }

    /// 64x64 orthographic camera at the origin: one pixel per world unit,
    /// view space equals world space
    fn ortho_camera(clip: f32) -> ViewCamera {
        let mut cam = ViewCamera::new(64, 64);
        cam.set_projection(Projection::Orthographic);
        cam.set_ortho_height(64.0);
        cam.set_clip_distance(clip);
        cam
    }

    fn single_triangle(a: Vec3, b: Vec3, c: Vec3) -> TriMesh {
        let mut mesh = TriMesh::new();
        let n = mesh.add_normal(Vec3::new(0.0, 0.0, -1.0));
        let (a, b, c) = (mesh.add_vertex(a), mesh.add_vertex(b), mesh.add_vertex(c));
        mesh.add_triangle([a, b, c], [n; 3], 0);
        mesh
    }

    fn cube_camera() -> ViewCamera {
        let mut cam = ViewCamera::new(64, 64);
        cam.set_fov(90.0);
        cam.orbit(Vec3::ZERO, 5.0, 0.0, 0.0);
        cam
    }

    const FACE_COLORS: [Color; 6] = [
        Color { r: 1.0, g: 0.0, b: 0.0 },
        Color { r: 0.0, g: 1.0, b: 0.0 },
        Color { r: 0.0, g: 0.0, b: 1.0 },
        Color { r: 1.0, g: 1.0, b: 0.0 },
        Color { r: 0.0, g: 1.0, b: 1.0 },
        Color { r: 1.0, g: 0.0, b: 1.0 },
    ];

    #[test]
    fn test_straddling_triangle_renders_clipped_quad() {
        let cam = ortho_camera(1.0);
        let mut renderer = MeshRenderer::new();

        // Screen (12,52) (52,52) (12,12): area 800
        let mut full = Framebuffer::new(64, 64).unwrap();
        let unclipped = single_triangle(
            Vec3::new(-20.0, -20.0, 5.0),
            Vec3::new(20.0, -20.0, 5.0),
            Vec3::new(-20.0, 20.0, 5.0),
        );
        renderer.render_mesh(&mut full, &unclipped, &Colorizer::Flat(Color::WHITE), &cam, false, None);
        let full_count = count_not(&full, [0, 0, 0, 255]) as f32;
        assert!((full_count - 800.0).abs() < 25.0);

        renderer.stats_mut().reset();
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let mesh = single_triangle(
            Vec3::new(-20.0, -20.0, 0.1),
            Vec3::new(20.0, -20.0, 5.0),
            Vec3::new(-20.0, 20.0, 5.0),
        );
        renderer.render_mesh(&mut fb, &mesh, &Colorizer::Flat(Color::WHITE), &cam, false, None);
        assert_eq!(renderer.stats().triangles_clipped, 1);
        assert_eq!(renderer.stats().triangles_rasterized, 2);

        // Corner at A is similar with ratio 1 - (5 - 1) / (5 - 0.1)
        let ratio = 1.0 - 4.0 / 4.9;
        let corner = 800.0 * ratio * ratio;
        let covered = count_not(&fb, [0, 0, 0, 255]) as f32;
        assert!(
            ((full_count - covered) - corner).abs() < 8.0,
            "covered {} full {} corner {}",
            covered,
            full_count,
            corner
        );

        // Everything drawn lies inside the unclipped footprint
        for y in 0..64 {
            for x in 0..64 {
                if fb.depth_at(x, y) != Some(DEPTH_FAR) {
                    assert_ne!(full.depth_at(x, y), Some(DEPTH_FAR));
                }
            }
        }
    }

    fn perspective_camera(clip: f32) -> ViewCamera {
        let mut cam = ViewCamera::new(64, 64);
        cam.set_fov(90.0);
        cam.set_clip_distance(clip);
        cam
    }

    #[test]
    fn test_perspective_straddle_stays_inside_footprint() {
        // Screen (15.2,48) (48.8,48) and apex (32,-32) when nothing is clipped
        let mesh = single_triangle(
            Vec3::new(-2.1, -2.0, 4.0),
            Vec3::new(2.1, -2.0, 4.0),
            Vec3::new(0.0, 1.0, 0.5),
        );
        let mut renderer = MeshRenderer::new();

        let mut full = Framebuffer::new(64, 64).unwrap();
        renderer.render_mesh(&mut full, &mesh, &Colorizer::Flat(Color::WHITE), &perspective_camera(0.1), false, None);
        assert_eq!(renderer.stats().triangles_clipped, 0);

        renderer.stats_mut().reset();
        let mut fb = Framebuffer::new(64, 64).unwrap();
        renderer.render_mesh(&mut fb, &mesh, &Colorizer::Flat(Color::WHITE), &perspective_camera(2.0), false, None);
        let stats = *renderer.stats();
        assert_eq!(stats.triangles_clipped, 1);
        assert_eq!(stats.triangles_rasterized, 2);
        assert_eq!(stats.triangles_dropped, 0);

        // Clip edge lands at y ~ 36.57, x 17.6..46.4: a trapezoid down to
        // the base, 344 pixel centers on rows 37..=47
        let covered = count_not(&fb, [0, 0, 0, 255]) as f32;
        assert!((covered - 344.0).abs() < 12.0, "covered {}", covered);
        assert!(covered < count_not(&full, [0, 0, 0, 255]) as f32);

        let mut rows = Vec::new();
        for y in 0..64 {
            let lit: Vec<usize> = (0..64).filter(|&x| fb.depth_at(x, y) != Some(DEPTH_FAR)).collect();
            for &x in &lit {
                assert_ne!(full.depth_at(x, y), Some(DEPTH_FAR), "({}, {}) outside the unclipped triangle", x, y);
            }
            if let (Some(&first), Some(&last)) = (lit.first(), lit.last()) {
                // The two halves of the quad meet without a gap
                assert_eq!(last - first + 1, lit.len(), "row {} has a gap", y);
                rows.push(y);
            }
        }
        assert!(rows[0] >= 36);
        assert_eq!(*rows.last().unwrap(), 47);
        assert_eq!(rows.len(), 48 - rows[0]);
    }

    #[test]
    fn test_perspective_out_of_range_vertices_are_dropped() {
        let mut renderer = MeshRenderer::new();
        let mut fb = Framebuffer::new(64, 64).unwrap();

        // Just past the plane but far off axis: x projects to ~64000
        let grazing = single_triangle(
            Vec3::new(-1.0, -1.0, 4.0),
            Vec3::new(1.0, -1.0, 4.0),
            Vec3::new(2000.0, 0.0, 1.001),
        );
        renderer.render_mesh(&mut fb, &grazing, &Colorizer::Flat(Color::WHITE), &perspective_camera(1.0), false, None);
        assert_eq!(renderer.stats().triangles_clipped, 0);
        assert_eq!(renderer.stats().triangles_dropped, 1);
        assert_eq!(renderer.stats().triangles_rasterized, 0);

        // Behind the plane: both synthesized points land around x = 2.7e8
        renderer.stats_mut().reset();
        let straddling = single_triangle(
            Vec3::new(-1.0, -1.0, 4.0),
            Vec3::new(1.0, -1.0, 4.0),
            Vec3::new(1.0e7, 0.0, 0.5),
        );
        renderer.render_mesh(&mut fb, &straddling, &Colorizer::Flat(Color::WHITE), &perspective_camera(1.0), false, None);
        assert_eq!(renderer.stats().triangles_clipped, 1);
        assert_eq!(renderer.stats().triangles_dropped, 2);
        assert_eq!(renderer.stats().triangles_rasterized, 0);
        assert_eq!(count_not(&fb, [0, 0, 0, 255]), 0);
    }

    #[test]
    fn test_fully_behind_renders_nothing() {
        let cam = ortho_camera(1.0);
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let mut renderer = MeshRenderer::new();
        let mesh = single_triangle(
            Vec3::new(-20.0, -20.0, 0.5),
            Vec3::new(20.0, -20.0, 0.9),
            Vec3::new(-20.0, 20.0, -3.0),
        );
        renderer.render_mesh(&mut fb, &mesh, &Colorizer::Flat(Color::WHITE), &cam, false, None);
        assert_eq!(renderer.stats().triangles_behind, 1);
        assert_eq!(renderer.stats().pixels_written, 0);
        assert_eq!(count_not(&fb, [0, 0, 0, 255]), 0);
    }

    #[test]
    fn test_closed_cube_culls_backfaces() {
        let cube = create_test_cube();
        let cam = cube_camera();
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let mut renderer = MeshRenderer::new();
        let colorizer = Colorizer::PerFace { mesh: &cube, colors: &FACE_COLORS };

        renderer.render_mesh(&mut fb, &cube, &colorizer, &cam, true, None);
        let stats = *renderer.stats();
        assert_eq!(stats.triangles_submitted, 12);
        assert_eq!(stats.triangles_backfacing, 10);
        assert_eq!(stats.triangles_rasterized, 2);
        // Face 1 (-z) faces the camera at depth 4
        assert_eq!(fb.color_at(32, 32), Some(FACE_COLORS[1].to_bytes()));
        let depth = fb.depth_at(32, 32).unwrap();
        assert!((depth as f32 / 65536.0 - 4.0).abs() < 0.01);
    }

    #[test]
    fn test_open_cube_matches_culled_image() {
        let cube = create_test_cube();
        let cam = cube_camera();
        let colorizer = Colorizer::PerFace { mesh: &cube, colors: &FACE_COLORS };
        let mut renderer = MeshRenderer::new();

        let mut culled = Framebuffer::new(64, 64).unwrap();
        renderer.render_mesh(&mut culled, &cube, &colorizer, &cam, true, None);
        let mut open = Framebuffer::new(64, 64).unwrap();
        renderer.stats_mut().reset();
        renderer.render_mesh(&mut open, &cube, &colorizer, &cam, false, None);

        assert_eq!(renderer.stats().triangles_rasterized, 12);
        assert_eq!(culled.color_at(32, 32), open.color_at(32, 32));
        assert_eq!(culled.depth_at(32, 32), open.depth_at(32, 32));
    }

    #[test]
    fn test_hide_mask_reveals_far_face() {
        let cube = create_test_cube();
        let cam = cube_camera();
        let colorizer = Colorizer::PerFace { mesh: &cube, colors: &FACE_COLORS };
        let mut renderer = MeshRenderer::new();
        let mut fb = Framebuffer::new(64, 64).unwrap();

        let mut mask = [false; 12];
        mask[2] = true;
        mask[3] = true;
        renderer.render_mesh(&mut fb, &cube, &colorizer, &cam, true, Some(&mask));
        assert_eq!(renderer.stats().triangles_hidden, 2);
        assert_eq!(renderer.stats().triangles_backfacing, 0);
        assert_eq!(fb.color_at(32, 32), Some(FACE_COLORS[0].to_bytes()));
    }

    #[test]
    fn test_smooth_path_blends_vertex_colors() {
        let mut grid = create_grid(1, 1, 40.0);
        // Stand the grid up facing the camera at depth 10
        for i in 0..4 {
            let p = grid.vertices()[i];
            grid.set_vertex(i, Vec3::new(p.x, p.z, 10.0));
        }
        let colors = [Color::BLACK, Color::BLACK, Color::WHITE, Color::WHITE];
        let colorizer = Colorizer::PerVertex { mesh: &grid, colors: &colors };
        let cam = ortho_camera(1.0);
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let mut renderer = MeshRenderer::new();
        renderer.render_mesh(&mut fb, &grid, &colorizer, &cam, false, None);

        assert_eq!(renderer.stats().triangles_rasterized, 2);
        let [r, g, b, _] = fb.color_at(32, 32).unwrap();
        assert!(r > 100 && r < 155, "center {}", r);
        assert_eq!((r, r), (g, b));
    }

    #[test]
    fn test_smooth_path_clips_with_colors() {
        let mut mesh = TriMesh::new();
        let n = mesh.add_normal(Vec3::new(0.0, 0.0, -1.0));
        let a = mesh.add_vertex(Vec3::new(-20.0, -20.0, 0.1));
        let b = mesh.add_vertex(Vec3::new(20.0, -20.0, 5.0));
        let c = mesh.add_vertex(Vec3::new(-20.0, 20.0, 5.0));
        mesh.add_triangle([a, b, c], [n; 3], 0);
        let colors = [Color::WHITE, Color::RED, Color::RED];
        let colorizer = Colorizer::PerVertex { mesh: &mesh, colors: &colors };

        let cam = ortho_camera(1.0);
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let mut renderer = MeshRenderer::new();
        renderer.render_mesh(&mut fb, &mesh, &colorizer, &cam, false, None);
        assert_eq!(renderer.stats().triangles_clipped, 1);
        assert_eq!(renderer.stats().triangles_rasterized, 2);
        assert!(fb.depth_at(20, 44).unwrap() < DEPTH_FAR);
    }

    #[test]
    fn test_transparent_adds_overlaps_without_depth() {
        let mut mesh = TriMesh::new();
        let n = mesh.add_normal(Vec3::new(0.0, 0.0, -1.0));
        for z in [5.0, 8.0] {
            let a = mesh.add_vertex(Vec3::new(-20.0, 20.0, z));
            let b = mesh.add_vertex(Vec3::new(20.0, 20.0, z));
            let c = mesh.add_vertex(Vec3::new(-20.0, -20.0, z));
            mesh.add_triangle([a, b, c], [n; 3], 0);
        }

        let cam = ortho_camera(1.0);
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let mut renderer = MeshRenderer::new();
        let style = TransparentStyle { view_dir: Vec3::ZERO, opacity: 0.5, background: Color::BLACK };
        assert_eq!(style.blend_mode(), BlendMode::Add);

        let gray = Color::new(0.4, 0.4, 0.4);
        renderer.render_mesh_transparent(&mut fb, &mesh, &Colorizer::Flat(gray), &cam, &style, None);
        // 0.4 * 0.5 = 51 per layer
        assert_eq!(fb.color_at(20, 20), Some([102, 102, 102, 255]));
        assert_eq!(fb.depth_at(20, 20), Some(DEPTH_FAR));
    }

    #[test]
    fn test_transparent_on_light_background_subtracts() {
        let style = TransparentStyle { view_dir: Vec3::ZERO, opacity: 1.0, background: Color::WHITE };
        assert_eq!(style.blend_mode(), BlendMode::Subtract);

        let mesh = single_triangle(
            Vec3::new(-20.0, 20.0, 5.0),
            Vec3::new(20.0, 20.0, 5.0),
            Vec3::new(-20.0, -20.0, 5.0),
        );
        let cam = ortho_camera(1.0);
        let mut fb = Framebuffer::new(64, 64).unwrap();
        fb.clear(Color::WHITE);
        let mut renderer = MeshRenderer::new();
        renderer.render_mesh_transparent(&mut fb, &mesh, &Colorizer::Flat(Color::RED), &cam, &style, None);
        assert_eq!(fb.color_at(20, 20), Some([0, 255, 255, 255]));
    }

    #[test]
    fn test_wireframe_draws_derived_edges() {
        let mesh = single_triangle(
            Vec3::new(-20.0, 20.0, 5.0),
            Vec3::new(20.0, 20.0, 5.0),
            Vec3::new(-20.0, -20.0, 5.0),
        );
        let cam = ortho_camera(1.0);
        let mut fb = Framebuffer::new(64, 64).unwrap();
        let mut renderer = MeshRenderer::new();
        renderer.render_wireframe(&mut fb, &mesh, &cam, Color::WHITE, 0.0);
        assert_eq!(renderer.stats().lines_drawn, 3);
        assert_eq!(fb.color_at(32, 12), Some([255, 255, 255, 255]));
        assert_eq!(fb.color_at(32, 32), Some([255, 255, 255, 255]));
        assert_eq!(fb.color_at(20, 20), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_scratch_capacity_is_reused() {
        let cam = cube_camera();
        let cube = create_test_cube();
        let mut renderer = MeshRenderer::new();
        let mut fb = Framebuffer::new(16, 16).unwrap();
        renderer.render_mesh(&mut fb, &cube, &Colorizer::Flat(Color::WHITE), &cam, true, None);
        let ptr = renderer.view.as_ptr();
        renderer.render_mesh(&mut fb, &cube, &Colorizer::Flat(Color::WHITE), &cam, true, None);
        assert_eq!(renderer.view.as_ptr(), ptr);
    }
}
