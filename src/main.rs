//! softcanvas viewer
//!
//! Orbits a small demo scene drawn entirely by the software canvas and
//! shows the frame as a nearest-filtered texture.
//!
//! Controls: right-drag orbit, wheel zoom, 1/2/3 solid/smooth/transparent,
//! W wireframe, B backfaces, P projection, O open background image,
//! S save settings.

use macroquad::prelude::*;
use softcanvas::font::text_width;
use softcanvas::rasterizer::{Bitmap, Color as RasterColor, ImagePlacement, Mat4, Vec3};
use softcanvas::scene::{create_grid, create_test_cube, Colorizer, Projection, Ramp, TriMesh, ViewCamera};
use softcanvas::{load_settings, save_settings, CanvasSettings, SoftwareCanvas, VERSION};

/// Window pixels per framebuffer pixel
const PIXEL_SCALE: f32 = 3.0;
const SETTINGS_FILE: &str = "softcanvas.ron";
/// Cube spin in degrees per second
const SPIN_SPEED: f32 = 20.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("softcanvas v{}", VERSION),
        window_width: 960,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShadeMode {
    Solid,
    Smooth,
    Transparent,
}

impl ShadeMode {
    fn label(self) -> &'static str {
        match self {
            ShadeMode::Solid => "SOLID",
            ShadeMode::Smooth => "SMOOTH",
            ShadeMode::Transparent => "TRANSPARENT",
        }
    }
}

struct Orbit {
    target: Vec3,
    distance: f32,
    azimuth: f32,
    elevation: f32,
}

impl Orbit {
    fn apply(&self, camera: &mut ViewCamera) {
        camera.orbit(self.target, self.distance, self.azimuth, self.elevation);
    }
}

fn load_or_default() -> CanvasSettings {
    match load_settings(SETTINGS_FILE) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", SETTINGS_FILE);
            settings
        }
        Err(e) => {
            log::warn!("Using default settings ({}): {}", SETTINGS_FILE, e);
            CanvasSettings::default()
        }
    }
}

/// Checkerboard with a transparent window in the middle
fn billboard_image() -> Bitmap {
    let mut image = Bitmap::checkerboard(16, 16, RasterColor::WHITE, RasterColor::new(0.9, 0.3, 0.1));
    for y in 6..10 {
        for x in 6..10 {
            image.set_pixel(x, y, [0, 0, 0, 0]);
        }
    }
    image
}

/// Outline of each cube side, without the quad diagonals
fn cube_outline() -> Vec<[usize; 2]> {
    (0..6)
        .flat_map(|side| {
            let b = side * 4;
            [[b, b + 1], [b + 1, b + 2], [b + 2, b + 3], [b + 3, b]]
        })
        .collect()
}

/// Framebuffer size for the current window
fn render_size() -> (i32, i32) {
    (
        ((screen_width() / PIXEL_SCALE) as i32).max(1),
        ((screen_height() / PIXEL_SCALE) as i32).max(1),
    )
}

/// Per-vertex distance from the origin, for the ground gradient
fn radial_values(mesh: &TriMesh) -> Vec<f32> {
    mesh.vertices().iter().map(|v| (v.x * v.x + v.z * v.z).sqrt()).collect()
}

#[cfg(not(target_arch = "wasm32"))]
fn pick_background() -> Option<Bitmap> {
    let path = rfd::FileDialog::new()
        .add_filter("Image", &["png", "jpg", "jpeg", "bmp"])
        .pick_file()?;
    match Bitmap::from_file(&path) {
        Ok(image) => {
            log::info!("Loaded background {} ({}x{})", path.display(), image.width(), image.height());
            Some(image)
        }
        Err(e) => {
            log::error!("Failed to load {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn pick_background() -> Option<Bitmap> {
    log::warn!("Opening images is not available in the browser");
    None
}

#[macroquad::main(window_conf)]
async fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let mut canvas = SoftwareCanvas::new(load_or_default());
    let (mut width, mut height) = render_size();
    let mut camera = ViewCamera::new(width as usize, height as usize);
    camera.set_fov(70.0);
    camera.set_clip_distance(0.25);
    let mut orbit = Orbit {
        target: Vec3::ZERO,
        distance: 8.0,
        azimuth: 0.6,
        elevation: 0.4,
    };
    orbit.apply(&mut camera);

    let mut cube = create_test_cube();
    cube.set_edges(cube_outline());
    let face_colors = [
        RasterColor::new(0.9, 0.2, 0.2),
        RasterColor::new(0.2, 0.8, 0.3),
        RasterColor::new(0.2, 0.4, 0.9),
        RasterColor::new(0.9, 0.8, 0.2),
        RasterColor::new(0.7, 0.3, 0.8),
        RasterColor::new(0.2, 0.8, 0.8),
    ];
    let vertex_colors: Vec<RasterColor> = cube
        .vertices()
        .iter()
        .map(|v| RasterColor::new(v.x * 0.5 + 0.5, v.y * 0.5 + 0.5, v.z * 0.5 + 0.5))
        .collect();
    let mut selected = vec![false; cube.face_count()];
    selected[2] = true;

    let mut ground = create_grid(12, 12, 1.0);
    for i in 0..ground.vertices().len() {
        let v = ground.vertices()[i];
        ground.set_vertex(i, Vec3::new(v.x, -1.5, v.z));
    }
    let ground_values = radial_values(&ground);
    let ground_ramp = Ramp::new(RasterColor::new(0.35, 0.35, 0.4), RasterColor::new(0.1, 0.1, 0.12), 0.0, 8.0);

    let billboard = billboard_image();
    let billboard_at = ImagePlacement::new(
        Vec3::new(-1.5, 3.5, 3.0),
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(0.0, -3.0, 0.0),
    );

    let mut background: Option<Bitmap> = None;
    let mut mode = ShadeMode::Solid;
    let mut wireframe = false;
    let mut last_mouse: Option<(f32, f32)> = None;
    let mut spin = 0.0f32;

    loop {
        let size = render_size();
        if size != (width, height) {
            (width, height) = size;
            camera.set_viewport(width as usize, height as usize);
            log::debug!("Viewport resized to {}x{}", width, height);
        }
        spin = (spin + get_frame_time() * SPIN_SPEED) % 360.0;

        // Input
        let (mx, my) = mouse_position();
        if is_mouse_button_down(MouseButton::Right) {
            if let Some((lx, ly)) = last_mouse {
                orbit.azimuth += (mx - lx) * 0.005;
                orbit.elevation = (orbit.elevation + (my - ly) * 0.005).clamp(-1.4, 1.4);
            }
            last_mouse = Some((mx, my));
        } else {
            last_mouse = None;
        }
        let scroll = mouse_wheel().1;
        if scroll != 0.0 {
            let zoom_factor = if scroll > 0.0 { 0.9 } else { 1.1 };
            orbit.distance = (orbit.distance * zoom_factor).clamp(2.0, 50.0);
        }
        orbit.apply(&mut camera);

        if is_key_pressed(KeyCode::Key1) {
            mode = ShadeMode::Solid;
        }
        if is_key_pressed(KeyCode::Key2) {
            mode = ShadeMode::Smooth;
        }
        if is_key_pressed(KeyCode::Key3) {
            mode = ShadeMode::Transparent;
        }
        if is_key_pressed(KeyCode::W) {
            wireframe = !wireframe;
        }
        if is_key_pressed(KeyCode::B) {
            let mut settings = canvas.settings().clone();
            settings.hide_backfaces = !settings.hide_backfaces;
            canvas.set_settings(settings);
        }
        if is_key_pressed(KeyCode::P) {
            let next = match camera.projection() {
                Projection::Perspective => {
                    camera.set_ortho_height(orbit.distance * 0.8);
                    Projection::Orthographic
                }
                Projection::Orthographic => Projection::Perspective,
            };
            camera.set_projection(next);
        }
        if is_key_pressed(KeyCode::O) {
            if let Some(image) = pick_background() {
                background = Some(image);
            }
        }
        if is_key_pressed(KeyCode::S) {
            match save_settings(canvas.settings(), SETTINGS_FILE) {
                Ok(()) => log::info!("Saved settings to {}", SETTINGS_FILE),
                Err(e) => log::error!("Save failed: {}", e),
            }
        }

        // Render
        if let Err(e) = canvas.begin_frame(width, height) {
            log::error!("Skipping frame: {}", e);
            next_frame().await;
            continue;
        }

        if let Some(image) = &background {
            canvas.draw_image_scaled(image, 0, 0, width, height);
        }

        let ground_colors = Colorizer::Parameter { mesh: &ground, values: &ground_values, ramp: ground_ramp };
        canvas.render_mesh(&ground, &ground_colors, &camera, false, None);

        camera.set_object_transform(Mat4::rotation(Vec3::new(0.0, spin, 0.0)));
        match mode {
            ShadeMode::Solid => {
                let base = Colorizer::PerFace { mesh: &cube, colors: &face_colors };
                let colors = Colorizer::Selection {
                    base: &base,
                    mesh: &cube,
                    selected: &selected,
                    highlight: RasterColor::WHITE,
                };
                canvas.render_mesh(&cube, &colors, &camera, true, None);
            }
            ShadeMode::Smooth => {
                let colors = Colorizer::PerVertex { mesh: &cube, colors: &vertex_colors };
                canvas.render_mesh(&cube, &colors, &camera, true, None);
            }
            ShadeMode::Transparent => {
                let colors = Colorizer::PerFace { mesh: &cube, colors: &face_colors };
                // Camera forward taken back through the spin into object space
                let view_dir = Mat4::rotation(Vec3::new(0.0, -spin, 0.0)).transform_vector(camera.basis().2);
                canvas.render_mesh_transparent(&cube, &colors, &camera, view_dir, None);
            }
        }

        if wireframe {
            canvas.render_wireframe(&cube, &camera, RasterColor::WHITE);
        }
        camera.set_object_transform(Mat4::IDENTITY);

        canvas.render_image(&billboard, billboard_at, &camera);
        canvas.render_line(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), &camera, RasterColor::RED);
        canvas.render_line(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), &camera, RasterColor::GREEN);
        canvas.render_line(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), &camera, RasterColor::BLUE);

        // Center crosshair
        let (cx, cy) = (width / 2, height / 2);
        let cross = RasterColor::new(0.9, 0.9, 0.3);
        canvas.draw_line((cx - 3, cy), (cx + 3, cy), cross);
        canvas.draw_line((cx, cy - 3), (cx, cy + 3), cross);

        let stats = *canvas.stats();
        let overlay = RasterColor::new(0.8, 0.8, 0.8);
        let scale = canvas.settings().font_scale;
        canvas.draw_box(2, 2, 120, 18, RasterColor::new(0.1, 0.1, 0.12), true);
        canvas.draw_string(mode.label(), 4, 4, overlay);
        canvas.draw_string(
            &format!("TRIS {}/{} CLIP {}", stats.triangles_rasterized, stats.triangles_submitted, stats.triangles_clipped),
            4,
            12,
            overlay,
        );

        let projection = match camera.projection() {
            Projection::Perspective => "PERSP",
            Projection::Orthographic => "ORTHO",
        };
        let backfaces = if canvas.settings().hide_backfaces { "CULL" } else { "NO CULL" };
        canvas.draw_string(projection, width - 4 - text_width(projection, scale), 4, overlay);
        canvas.draw_string(backfaces, width - 4 - text_width(backfaces, scale), 12, overlay);
        canvas.draw_image(&billboard, width - 4 - billboard.width() as i32, 20);
        let cached = format!("IMG {}", canvas.cached_images());
        canvas.draw_string(&cached, width - 4 - text_width(&cached, scale), 40, overlay);

        canvas.draw_hrule(height - 12, RasterColor::new(0.3, 0.3, 0.3));
        canvas.draw_vrule(width - 1, RasterColor::new(0.3, 0.3, 0.3));
        canvas.draw_string("RMB ORBIT  1/2/3 MODE  W WIRE  B CULL  P PROJ  O IMAGE", 4, height - 9, overlay);
        canvas.draw_border(RasterColor::new(0.4, 0.4, 0.45));

        let fb = canvas.end_frame();

        // Convert framebuffer to texture and draw
        clear_background(Color::from_rgba(30, 30, 35, 255));
        let texture = Texture2D::from_rgba8(fb.width() as u16, fb.height() as u16, fb.pixels());
        texture.set_filter(FilterMode::Nearest);

        let zoom = (screen_width() / width as f32).min(screen_height() / height as f32);
        let (draw_w, draw_h) = (width as f32 * zoom, height as f32 * zoom);
        draw_texture_ex(
            &texture,
            (screen_width() - draw_w) * 0.5,
            (screen_height() - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(macroquad::math::Vec2::new(draw_w, draw_h)),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
