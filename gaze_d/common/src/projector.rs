use api::{FaceAnchor, InterfaceOrientation};
use glam::{DVec2, Mat4, Vec2, Vec4};

use crate::config::{DistanceConfig, FilterConfig};
use crate::error::ProjectionError;
use crate::interpolator::LowPassInterpolator;

/// Linear map from head distance to cursor scale, clamped at both ends.
#[derive(Debug, Clone, Copy)]
pub struct DistanceScale {
    min_distance: f32,
    max_distance: f32,
    min_scale: f32,
    max_scale: f32,
    current: f32,
}

impl DistanceScale {
    pub fn new(config: &DistanceConfig) -> Self {
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            current: config.max_scale,
        }
    }

    pub fn scale_for(&self, distance: f32) -> f32 {
        let span = self.max_distance - self.min_distance;
        let normalized = if span > 0.0 {
            ((distance - self.min_distance) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (1.0 - normalized) * (self.max_scale - self.min_scale) + self.min_scale
    }

    /// Recomputes the current scale. Non-finite distances keep the previous one.
    pub fn update(&mut self, distance: f32) -> f32 {
        if distance.is_finite() {
            self.current = self.scale_for(distance);
        }
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }
}

/// Projects head pose onto the screen plane and turns it into a cursor coordinate.
///
/// Camera space has the device screen on the `z = 0` plane; the head's look
/// ray is intersected with it and the hit point's `xy` is the raw NDC.
#[derive(Debug, Clone)]
pub struct GazeProjector {
    ndc: LowPassInterpolator<Vec2>,
    blink_factor: f32,
    scale: DistanceScale,
}

impl GazeProjector {
    pub fn new(filter: &FilterConfig, distance: &DistanceConfig) -> Self {
        Self {
            ndc: LowPassInterpolator::new(filter.ndc, Vec2::ZERO),
            blink_factor: filter.blink,
            scale: DistanceScale::new(distance),
        }
    }

    /// Intersection of the head's look ray with the screen plane, unfiltered.
    pub fn raw_ndc(transform: &Mat4) -> Result<Vec2, ProjectionError> {
        let center = *transform * FaceAnchor::HEAD_CENTER;
        let look: Vec4 = *transform * FaceAnchor::LOOK_DIRECTION;

        if look.z.abs() < f32::EPSILON {
            return Err(ProjectionError::ParallelToScreen);
        }
        let t = -center.z / look.z;
        let hit = center + look * t;

        let ndc = Vec2::new(hit.x, hit.y);
        if !ndc.is_finite() {
            return Err(ProjectionError::NonFinite);
        }
        Ok(ndc)
    }

    /// Degenerate transforms are rejected before any filter state changes.
    pub fn project(
        &mut self,
        transform: &Mat4,
        orientation: InterfaceOrientation,
        is_blinking: bool,
    ) -> Result<DVec2, ProjectionError> {
        let raw = Self::raw_ndc(transform)?;
        let filtered = self
            .ndc
            .update(raw, is_blinking.then_some(self.blink_factor));
        Ok(orientation.remap(filtered * self.scale.value()))
    }

    pub fn update_distance(&mut self, distance: f32) -> f32 {
        self.scale.update(distance)
    }

    pub fn scale(&self) -> f32 {
        self.scale.value()
    }

    pub fn filtered_ndc(&self) -> Vec2 {
        self.ndc.value()
    }

    pub fn reset(&mut self) {
        self.ndc.reset(Vec2::ZERO);
        self.scale.current = self.scale.max_scale;
    }
}
