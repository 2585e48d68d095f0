#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("Head look direction is parallel to the screen plane")]
    ParallelToScreen,
    #[error("Projected gaze point is not finite")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Filter factor '{name}' must be in (0, 1], got {value}")]
    FilterFactor { name: &'static str, value: f64 },
    #[error("Blink threshold must be in [0, 1), got {0}")]
    BlinkThreshold(f32),
    #[error("Distance range must be increasing, got {min}..{max}")]
    DistanceRange { min: f32, max: f32 },
    #[error("Scale range must be positive and increasing, got {min}..{max}")]
    ScaleRange { min: f32, max: f32 },
    #[error("max_fps must be positive, got {0}")]
    MaxFps(f32),
}
