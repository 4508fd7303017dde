//! Per-frame snapshots handed to the renderer.
//!
//! A `Frame` is built before anything is recorded, so the renderer only
//! replays it: one draw per triangle, each naming its program and, for the
//! camera program, the transform to push first.

use crate::camera::Camera;
use crate::renderer::vertex::triangle;
use glam::Mat4;
use std::ops::Range;

pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.5, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramSlot {
    First,
    Second,
}

impl ProgramSlot {
    pub fn index(self) -> usize {
        match self {
            ProgramSlot::First => 0,
            ProgramSlot::Second => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: ProgramSlot,
    pub vertices: Range<u32>,
    pub transform: Option<Mat4>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub clear_color: [f32; 4],
    pub draws: [DrawCall; 2],
}

impl Frame {
    /// Triangle A under the first program, triangle B under the second.
    pub fn new(transform: Option<Mat4>) -> Self {
        Frame {
            clear_color: CLEAR_COLOR,
            draws: [
                DrawCall {
                    program: ProgramSlot::First,
                    vertices: triangle(0),
                    transform,
                },
                DrawCall {
                    program: ProgramSlot::Second,
                    vertices: triangle(1),
                    transform,
                },
            ],
        }
    }
}

/// Produces the frame to draw next.
pub trait Scene {
    fn next_frame(&mut self) -> Frame;
}

/// The first program: fixed triangles, no transform.
#[derive(Debug, Default)]
pub struct StaticScene;

impl Scene for StaticScene {
    fn next_frame(&mut self) -> Frame {
        Frame::new(None)
    }
}

/// The second program: triangles seen from the orbiting camera.
#[derive(Debug, Default)]
pub struct OrbitScene {
    camera: Camera,
}

impl OrbitScene {
    pub fn new() -> Self {
        OrbitScene {
            camera: Camera::new(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}

impl Scene for OrbitScene {
    fn next_frame(&mut self) -> Frame {
        Frame::new(Some(self.camera.advance()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{orbit_position, projection, view, ORBIT_STEP};

    #[test]
    fn static_scene_draws_both_triangles_untransformed() {
        let mut scene = StaticScene;
        for _ in 0..3 {
            let frame = scene.next_frame();
            assert_eq!(frame.clear_color, CLEAR_COLOR);
            let [a, b] = frame.draws;
            assert_eq!((a.program, a.vertices, a.transform), (ProgramSlot::First, 0..3, None));
            assert_eq!((b.program, b.vertices, b.transform), (ProgramSlot::Second, 3..6, None));
        }
    }

    #[test]
    fn orbit_scene_pushes_the_same_mvp_to_both_programs() {
        let mut scene = OrbitScene::new();
        for n in 0..50u32 {
            let frame = scene.next_frame();
            let expected = projection() * view(orbit_position(f64::from(n) * ORBIT_STEP));
            for draw in frame.draws.iter() {
                let mvp = draw.transform.expect("orbit frames carry a transform");
                assert!(mvp.abs_diff_eq(expected, 1e-5));
            }
            assert_eq!(frame.draws[0].vertices, 0..3);
            assert_eq!(frame.draws[1].vertices, 3..6);
        }
        assert!((scene.camera().angle() - 50.0 * ORBIT_STEP).abs() < 1e-12);
    }

    #[test]
    fn slots_index_programs_in_order() {
        assert_eq!(ProgramSlot::First.index(), 0);
        assert_eq!(ProgramSlot::Second.index(), 1);
    }
}
