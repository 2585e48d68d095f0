mod orientation;
pub use orientation::InterfaceOrientation;

use anyhow::Result;
use glam::{DVec2, Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Per-frame estimate of the tracked face, as delivered by the face-tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceAnchor {
    /// Head pose relative to the camera. Column-major.
    pub transform: Mat4,
    pub is_tracked: bool,
    pub eye_blink_left: f32,
    pub eye_blink_right: f32,
}

impl Default for FaceAnchor {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            is_tracked: false,
            eye_blink_left: 0.0,
            eye_blink_right: 0.0,
        }
    }
}

impl FaceAnchor {
    /// Head center in local space.
    pub const HEAD_CENTER: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
    /// Direction the head looks along, in local space.
    pub const LOOK_DIRECTION: Vec4 = Vec4::new(0.0, 0.0, 1.0, 0.0);

    pub fn head_center(&self) -> Vec4 {
        self.transform * Self::HEAD_CENTER
    }

    pub fn look_direction(&self) -> Vec4 {
        self.transform * Self::LOOK_DIRECTION
    }

    pub fn head_position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Distance from the camera to the head center, in meters.
    pub fn head_distance(&self) -> f32 {
        self.head_position().length()
    }

    /// Length of each basis vector of the transform.
    pub fn head_scale(&self) -> Vec3 {
        Vec3::new(
            self.transform.x_axis.truncate().length(),
            self.transform.y_axis.truncate().length(),
            self.transform.z_axis.truncate().length(),
        )
    }

    /// Rotation part of the transform with scale and translation removed.
    pub fn head_rotation(&self) -> Quat {
        let (_, rotation, _) = self.transform.to_scale_rotation_translation();
        rotation
    }
}

/// One delivery from the face-tracking session. `anchor` is `None` when the
/// face anchor has been removed or was never found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceFrame {
    pub anchor: Option<FaceAnchor>,
    pub orientation: InterfaceOrientation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    pub position: DVec2,
    pub previous_position: Option<DVec2>,
    pub is_left_eye_blinking: bool,
    pub is_right_eye_blinking: bool,
}

impl GazeSample {
    pub fn is_blinking(&self) -> bool {
        self.is_left_eye_blinking || self.is_right_eye_blinking
    }

    /// Movement since the previous sample, zero for the first sample.
    pub fn delta(&self) -> DVec2 {
        self.previous_position
            .map(|prev| self.position - prev)
            .unwrap_or(DVec2::ZERO)
    }
}

/// Synthetic pointer event handed to the windowing layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeEvent {
    pub frame: u64,
    pub sample: GazeSample,
}

/// Edge-triggered change of the face tracking flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GazeActivity {
    Acquired,
    Lost,
}

/// Producer of face frames, e.g. a network feed or a recording.
pub trait FaceSource {
    fn initialize(&mut self) -> Result<()>;
    /// Returns `Ok(None)` when no frame is ready yet.
    fn poll(&mut self) -> Result<Option<FaceFrame>>;
    fn unload(&mut self);

    /// True once the source can never produce another frame.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Consumer of gaze events.
pub trait GazeEventSink: Send + Sync {
    fn initialize(&mut self) -> Result<()>;
    fn send(&self, event: &GazeEvent) -> Result<()>;
}
