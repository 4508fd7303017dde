//! Orbiting camera for the second program.
//!
//! The camera circles the origin in the XZ plane at a fixed height and always
//! looks at the origin. Each frame consumes the current position, then the
//! angle advances by a fixed step.

use glam::{Mat4, Vec3};
use std::f64::consts::PI;

pub const ORBIT_RADIUS: f64 = 3.0;
pub const ORBIT_HEIGHT: f64 = 2.0;
/// Angle added per frame, in radians.
pub const ORBIT_STEP: f64 = PI / 360.0 / 7.0;

pub const FOV_Y_DEGREES: f32 = 45.0;
pub const ASPECT_RATIO: f32 = 4.0 / 3.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

pub fn projection() -> Mat4 {
    Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), ASPECT_RATIO, Z_NEAR, Z_FAR)
}

/// Point on the orbit for angle `pos`.
pub fn orbit_position(pos: f64) -> Vec3 {
    Vec3::new(
        (ORBIT_RADIUS * pos.cos()) as f32,
        ORBIT_HEIGHT as f32,
        (ORBIT_RADIUS * pos.sin()) as f32,
    )
}

pub fn view(eye: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
}

#[derive(Debug, Clone)]
pub struct Camera {
    pos: f64,
    position: Vec3,
    projection: Mat4,
    model: Mat4,
}

impl Camera {
    pub fn new() -> Self {
        Camera {
            pos: 0.0,
            position: orbit_position(0.0),
            projection: projection(),
            model: Mat4::IDENTITY,
        }
    }

    /// Current angle in radians, never wrapped.
    pub fn angle(&self) -> f64 {
        self.pos
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn mvp(&self) -> Mat4 {
        self.projection * view(self.position) * self.model
    }

    /// Returns the transform for this frame and moves the camera along the orbit.
    pub fn advance(&mut self) -> Mat4 {
        let mvp = self.mvp();
        self.pos += ORBIT_STEP;
        self.position = orbit_position(self.pos);
        mvp
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_positive_x_axis() {
        let camera = Camera::new();
        assert_eq!(camera.angle(), 0.0);
        assert!(camera
            .position()
            .abs_diff_eq(Vec3::new(3.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn stays_on_the_orbit() {
        let mut camera = Camera::new();
        for _ in 0..20_000 {
            let p = camera.position();
            assert!((p.x * p.x + p.z * p.z - 9.0).abs() < 1e-4, "{:?}", p);
            assert_eq!(p.y, 2.0);
            camera.advance();
        }
    }

    #[test]
    fn angle_accumulates_without_wrapping() {
        let mut camera = Camera::new();
        let mut expected = 0.0;
        // A full turn takes 5040 frames; go past it.
        for _ in 0..6000 {
            camera.advance();
            expected += ORBIT_STEP;
            assert_eq!(camera.angle(), expected);
        }
        assert!(camera.angle() > 2.0 * PI);
    }

    #[test]
    fn mvp_is_projection_view_model() {
        let mut camera = Camera::new();
        for frame in 0..500u32 {
            let eye = orbit_position(f64::from(frame) * ORBIT_STEP);
            let mvp = camera.advance();
            let expected = projection() * view(eye) * Mat4::IDENTITY;
            assert!(mvp.abs_diff_eq(expected, 1e-5), "frame {}", frame);
        }
    }

    #[test]
    fn origin_lands_in_the_middle_of_the_screen() {
        let mut camera = Camera::new();
        for _ in 0..100 {
            let clip = camera.advance() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
            assert!((clip.x / clip.w).abs() < 1e-5);
            assert!((clip.y / clip.w).abs() < 1e-5);
            let depth = clip.z / clip.w;
            assert!(depth > 0.0 && depth < 1.0);
        }
    }

    #[test]
    fn projection_is_fixed() {
        let mut camera = Camera::new();
        for _ in 0..10 {
            camera.advance();
        }
        assert!(camera.projection.abs_diff_eq(projection(), 0.0));
    }
}
