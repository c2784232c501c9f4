//! Cameras
//!
//! View space is left-handed: x right, y up, z forward (depth). Screen space
//! is y-down pixels with the principal point at the viewport center.

use serde::{Deserialize, Serialize};

use crate::rasterizer::{Mat4, Vec3};

/// Transform source for the renderer
pub trait Camera {
    /// Object space to view space (affine)
    fn object_to_view(&self) -> Mat4;

    /// View space to screen pixels (projective; use `Mat4::project`)
    fn view_to_screen(&self) -> Mat4;

    fn object_to_screen(&self) -> Mat4 {
        self.view_to_screen().mul(&self.object_to_view())
    }

    /// World space to screen pixels, ignoring the object transform
    fn world_to_screen(&self) -> Mat4;

    fn is_perspective(&self) -> bool;

    /// View depth of the near clip plane
    fn clip_distance(&self) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

/// Yaw/pitch camera with an optional object transform
#[derive(Debug, Clone)]
pub struct ViewCamera {
    pub position: Vec3,
    pub rotation_x: f32, // Pitch (radians)
    pub rotation_y: f32, // Yaw (radians)

    // Computed basis vectors
    basis_x: Vec3,
    basis_y: Vec3,
    basis_z: Vec3,

    projection: Projection,
    fov_y: f32,
    ortho_height: f32,
    clip_distance: f32,
    viewport: (f32, f32),
    object_transform: Mat4,
}

impl ViewCamera {
    pub fn new(width: usize, height: usize) -> Self {
        let mut cam = Self {
            position: Vec3::ZERO,
            rotation_x: 0.0,
            rotation_y: 0.0,
            basis_x: Vec3::new(1.0, 0.0, 0.0),
            basis_y: Vec3::new(0.0, 1.0, 0.0),
            basis_z: Vec3::new(0.0, 0.0, 1.0),
            projection: Projection::Perspective,
            fov_y: 60.0,
            ortho_height: 10.0,
            clip_distance: 0.1,
            viewport: (width as f32, height as f32),
            object_transform: Mat4::IDENTITY,
        };
        cam.update_basis();
        cam
    }

    fn update_basis(&mut self) {
        // Forward vector based on rotation
        self.basis_z = Vec3 {
            x: self.rotation_x.cos() * self.rotation_y.sin(),
            y: -self.rotation_x.sin(),
            z: self.rotation_x.cos() * self.rotation_y.cos(),
        };

        // Right vector
        self.basis_x = Vec3::UP.cross(self.basis_z).normalize();

        // Up vector
        self.basis_y = self.basis_z.cross(self.basis_x);
    }

    /// Turn to face `target` from the current position
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize();
        if dir == Vec3::ZERO {
            return;
        }
        self.rotation_y = dir.x.atan2(dir.z);
        self.rotation_x = (-dir.y).clamp(-1.0, 1.0).asin().clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
        self.update_basis();
    }

    /// Place the camera `distance` away from `target` along the given angles
    pub fn orbit(&mut self, target: Vec3, distance: f32, yaw: f32, pitch: f32) {
        let pitch = pitch.clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
        let forward = Vec3::new(pitch.cos() * yaw.sin(), -pitch.sin(), pitch.cos() * yaw.cos());
        self.position = target - forward * distance;
        self.look_at(target);
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.basis_x, self.basis_y, self.basis_z)
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.viewport = (width as f32, height as f32);
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Vertical field of view in degrees
    pub fn set_fov(&mut self, degrees: f32) {
        self.fov_y = degrees.clamp(1.0, 179.0);
    }

    /// World units covered by the shorter viewport side in orthographic mode
    pub fn set_ortho_height(&mut self, height: f32) {
        self.ortho_height = height.max(f32::EPSILON);
    }

    pub fn set_clip_distance(&mut self, distance: f32) {
        self.clip_distance = distance;
    }

    pub fn set_object_transform(&mut self, transform: Mat4) {
        self.object_transform = transform;
    }

    pub fn world_to_view(&self) -> Mat4 {
        let t = Vec3::new(
            -self.basis_x.dot(self.position),
            -self.basis_y.dot(self.position),
            -self.basis_z.dot(self.position),
        );
        Mat4::from_basis(self.basis_x, self.basis_y, self.basis_z, t)
    }

    /// Pixels per unit at depth 1 (perspective) or per world unit (ortho)
    fn focal(&self) -> f32 {
        let half = self.viewport.0.min(self.viewport.1) * 0.5;
        match self.projection {
            Projection::Perspective => half / (self.fov_y.to_radians() * 0.5).tan(),
            Projection::Orthographic => half / (self.ortho_height * 0.5),
        }
    }
}

impl Camera for ViewCamera {
    fn object_to_view(&self) -> Mat4 {
        self.world_to_view().mul(&self.object_transform)
    }

    fn view_to_screen(&self) -> Mat4 {
        let f = self.focal();
        let (cx, cy) = (self.viewport.0 * 0.5, self.viewport.1 * 0.5);
        match self.projection {
            Projection::Perspective => Mat4::from_rows([
                [f, 0.0, cx, 0.0],
                [0.0, -f, cy, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ]),
            Projection::Orthographic => Mat4::from_rows([
                [f, 0.0, 0.0, cx],
                [0.0, -f, 0.0, cy],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ]),
        }
    }

    fn world_to_screen(&self) -> Mat4 {
        self.view_to_screen().mul(&self.world_to_view())
    }

    fn is_perspective(&self) -> bool {
        self.projection == Projection::Perspective
    }

    fn clip_distance(&self) -> f32 {
        self.clip_distance
    }
}
