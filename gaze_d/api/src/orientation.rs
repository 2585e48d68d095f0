use glam::{DVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Interface orientation of the device the cursor is drawn on.
///
/// Camera space is landscape-right; every other orientation is a quarter or
/// half turn of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterfaceOrientation {
    #[default]
    #[serde(alias = "portrait")]
    Portrait,
    #[serde(alias = "portraitUpsideDown", alias = "portrait_upside_down")]
    PortraitUpsideDown,
    #[serde(alias = "landscapeLeft", alias = "landscape_left")]
    LandscapeLeft,
    #[serde(alias = "landscapeRight", alias = "landscape_right")]
    LandscapeRight,
    #[serde(alias = "unknown")]
    Unknown,
}

impl InterfaceOrientation {
    pub const ALL: [InterfaceOrientation; 5] = [
        Self::Portrait,
        Self::PortraitUpsideDown,
        Self::LandscapeLeft,
        Self::LandscapeRight,
        Self::Unknown,
    ];

    /// Maps a camera-space point into view space for this orientation.
    pub fn remap(self, p: Vec2) -> DVec2 {
        let (x, y) = (p.x as f64, p.y as f64);
        match self {
            Self::Portrait => DVec2::new(y, -x),
            Self::PortraitUpsideDown => DVec2::new(-y, x),
            Self::LandscapeRight => DVec2::new(x, y),
            Self::LandscapeLeft => DVec2::new(-x, -y),
            Self::Unknown => DVec2::new(x, y),
        }
    }

    /// Undoes [`remap`](Self::remap).
    pub fn inverse(self, p: DVec2) -> Vec2 {
        let (x, y) = match self {
            Self::Portrait => (-p.y, p.x),
            Self::PortraitUpsideDown => (p.y, -p.x),
            Self::LandscapeRight => (p.x, p.y),
            Self::LandscapeLeft => (-p.x, -p.y),
            Self::Unknown => (p.x, p.y),
        };
        Vec2::new(x as f32, y as f32)
    }

    pub fn is_portrait(self) -> bool {
        matches!(self, Self::Portrait | Self::PortraitUpsideDown)
    }
}
