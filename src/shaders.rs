//! SPIR-V compiled from `shaders/` by the build script.

#[derive(Debug, Clone, Copy)]
pub struct ShaderSource {
    pub name: &'static str,
    pub spirv: &'static [u8],
}

/// Vertex/fragment pair making up one program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
}

impl ProgramSource {
    /// Both stages, e.g. `hw1vertex+hw1triang2`.
    pub fn name(&self) -> String {
        format!("{}+{}", self.vertex.name, self.fragment.name)
    }
}

macro_rules! spirv {
    ($dir:literal, $name:literal, $ext:literal) => {
        ShaderSource {
            name: $name,
            spirv: include_bytes!(concat!(
                env!("OUT_DIR"),
                "/",
                $dir,
                "_",
                $name,
                ".",
                $ext,
                ".spv"
            )),
        }
    };
}

/// Programs for the static scene. Neither reads a transform.
pub const HW1: [ProgramSource; 2] = [
    ProgramSource {
        vertex: spirv!("hw1", "hw1vertex", "vert"),
        fragment: spirv!("hw1", "hw1triang1", "frag"),
    },
    ProgramSource {
        vertex: spirv!("hw1", "hw1vertex", "vert"),
        fragment: spirv!("hw1", "hw1triang2", "frag"),
    },
];

/// Programs for the orbit scene. The vertex shader reads `MVP` from push
/// constants.
pub const HW2: [ProgramSource; 2] = [
    ProgramSource {
        vertex: spirv!("hw2", "hw1vertex", "vert"),
        fragment: spirv!("hw2", "hw1triang1", "frag"),
    },
    ProgramSource {
        vertex: spirv!("hw2", "hw1vertex", "vert"),
        fragment: spirv!("hw2", "hw1triang2", "frag"),
    },
];
