use gfx_hal::format as f;
use std::mem;
use std::ops::Range;

pub const VERTICES_PER_TRIANGLE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub const FORMAT: f::Format = f::Format::Rgb32Sfloat;
    pub const STRIDE: u32 = mem::size_of::<Vertex>() as u32;

    const fn new(x: f32, y: f32, z: f32) -> Self {
        Vertex {
            position: [x, y, z],
        }
    }
}

/// Two disjoint triangles, A then B.
pub const TRIANGLES: [Vertex; 6] = [
    Vertex::new(0.7, 0.7, 0.0),
    Vertex::new(0.7, -0.1, 0.0),
    Vertex::new(-0.7, -0.7, 0.0),
    Vertex::new(-0.7, 0.7, 0.0),
    Vertex::new(-0.7, -0.1, 0.0),
    Vertex::new(0.7, -0.7, 0.0),
];

/// Vertex range of the `n`th triangle in `TRIANGLES`.
pub fn triangle(n: u32) -> Range<u32> {
    let start = n * VERTICES_PER_TRIANGLE;
    start..start + VERTICES_PER_TRIANGLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_are_tightly_packed_floats() {
        assert_eq!(Vertex::STRIDE, 12);
        assert_eq!(mem::size_of_val(&TRIANGLES), 18 * mem::size_of::<f32>());
    }

    #[test]
    fn literal_triangles() {
        let a: Vec<_> = TRIANGLES[0..3].iter().map(|v| v.position).collect();
        let b: Vec<_> = TRIANGLES[3..6].iter().map(|v| v.position).collect();
        assert_eq!(
            a,
            vec![[0.7, 0.7, 0.0], [0.7, -0.1, 0.0], [-0.7, -0.7, 0.0]]
        );
        assert_eq!(
            b,
            vec![[-0.7, 0.7, 0.0], [-0.7, -0.1, 0.0], [0.7, -0.7, 0.0]]
        );
    }

    #[test]
    fn triangles_do_not_share_vertices() {
        assert_eq!(triangle(0), 0..3);
        assert_eq!(triangle(1), 3..6);
        for v in &TRIANGLES[0..3] {
            assert!(!TRIANGLES[3..6].contains(v));
        }
    }
}
