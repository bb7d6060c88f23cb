use glam::{Mat4, Vec3};

use crate::uniforms::Uniforms;

/// Vertical field of view of the projection, in degrees.
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 100.0;

pub const EYE: Vec3 = Vec3::new(0.0, 0.0, 3.0);
pub const TARGET: Vec3 = Vec3::ZERO;
pub const UP: Vec3 = Vec3::Y;
pub const LIGHT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 100.0);

/// Camera and transform state behind the shader uniforms.
///
/// The projection follows the OpenGL clip convention (depth in [-1, 1]);
/// backends with a different depth range remap it when uploading.
#[derive(Debug, Clone)]
pub struct CameraState {
    projection: Mat4,
    view: Mat4,
    world: Mat4,
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    light_position: Vec3,
    dirty: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            eye: EYE,
            target: TARGET,
            up: UP,
            light_position: LIGHT_POSITION,
            dirty: true,
        }
    }
}

impl CameraState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the projection for a new viewport and mark the uniforms stale.
    /// Zero-area viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let aspect = width as f32 / height as f32;
        self.projection = perspective(aspect);
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Refresh view and world and return the uniform block, if anything changed
    /// since the last call.
    pub fn take_uniforms(&mut self) -> Option<Uniforms> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.view = Mat4::look_at_rh(self.eye, self.target, self.up);
        self.world = Mat4::IDENTITY;
        Some(Uniforms::new(
            self.projection,
            self.view,
            self.world,
            self.light_position,
            self.eye,
        ))
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }
}

fn perspective(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn reference_perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y / 2.0).tan();
        Mat4::from_cols(
            Vec4::new(f / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, (far + near) / (near - far), -1.0),
            Vec4::new(0.0, 0.0, 2.0 * far * near / (near - far), 0.0),
        )
    }

    fn reference_look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);
        Mat4::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0),
        )
    }

    #[test]
    fn resize_builds_reference_perspective() {
        let mut camera = CameraState::new();
        assert!(camera.resize(800, 600));
        let expected = reference_perspective(45f32.to_radians(), 800.0 / 600.0, 0.01, 100.0);
        assert!(camera.projection().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn view_is_canonical_look_at() {
        let mut camera = CameraState::new();
        camera.resize(800, 600);
        camera.take_uniforms();
        let expected = reference_look_at(EYE, TARGET, UP);
        assert!(camera.view().abs_diff_eq(expected, 1e-6));
        assert!(
            camera
                .view()
                .abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)), 1e-6)
        );
        assert_eq!(camera.world(), Mat4::IDENTITY);
    }

    #[test]
    fn uniforms_only_when_dirty() {
        let mut camera = CameraState::new();
        assert!(camera.is_dirty());
        assert!(camera.take_uniforms().is_some());
        assert!(!camera.is_dirty());
        assert!(camera.take_uniforms().is_none());

        camera.resize(1024, 768);
        assert!(camera.is_dirty());
        assert!(camera.take_uniforms().is_some());
        assert!(camera.take_uniforms().is_none());
    }

    #[test]
    fn zero_area_resize_is_ignored() {
        let mut camera = CameraState::new();
        camera.resize(800, 600);
        camera.take_uniforms();
        let before = camera.projection();
        assert!(!camera.resize(800, 0));
        assert!(!camera.resize(0, 600));
        assert!(!camera.is_dirty());
        assert_eq!(camera.projection(), before);
    }
}
