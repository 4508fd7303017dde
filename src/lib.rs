//! Two small gfx-hal programs drawing a pair of triangles.
//!
//! `hw1` draws them straight in clip space; `hw2` draws them from a camera
//! orbiting the origin.

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod input;
pub mod logging;
pub mod render_loop;
pub mod renderer;
pub mod shaders;

pub use error::{exit_code, Error, FAILURE_EXIT_CODE};
