use gfx_hal::window::Extent2D;

/// Sample count requested for antialiasing.
pub const REQUESTED_SAMPLES: u8 = 4;

/// Window and context hints for one program.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: &'static str,
    pub width: u32,
    pub height: u32,
    pub samples: u8,
}

impl WindowConfig {
    pub fn hw1() -> Self {
        WindowConfig {
            title: "HW1",
            ..Default::default()
        }
    }

    pub fn hw2() -> Self {
        WindowConfig {
            title: "HW2",
            ..Default::default()
        }
    }

    pub fn extent(&self) -> Extent2D {
        Extent2D {
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "gfx-homework",
            width: 1024,
            height: 768,
            samples: REQUESTED_SAMPLES,
        }
    }
}
