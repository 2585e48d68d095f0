pub use api::{
    FaceAnchor, FaceFrame, FaceSource, GazeActivity, GazeEvent, GazeEventSink, GazeSample,
    InterfaceOrientation,
};

pub mod config;
mod controller;
mod error;
mod interpolator;
mod projector;
mod text_expression;

pub use config::{load_config, GazeConfig, InputMode, OutputMode};
pub use controller::{GazeTrackingController, TrackingState};
pub use error::{ConfigError, ProjectionError};
pub use interpolator::{LowPassInterpolator, Smoothable};
pub use projector::{DistanceScale, GazeProjector};
pub use text_expression::TextExpression;
