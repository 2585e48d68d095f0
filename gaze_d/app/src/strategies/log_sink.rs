use anyhow::Result;
use common::{GazeEvent, GazeEventSink};
use log::{debug, info};

/// Writes gaze events to the log. Useful when no cursor consumer is attached.
#[derive(Default)]
pub struct LogSink;

impl GazeEventSink for LogSink {
    fn initialize(&mut self) -> Result<()> {
        info!("Gaze events will be logged at debug level");
        Ok(())
    }

    fn send(&self, event: &GazeEvent) -> Result<()> {
        let sample = &event.sample;
        debug!(
            "gaze #{} at ({:.3}, {:.3}) blink L={} R={}",
            event.frame,
            sample.position.x,
            sample.position.y,
            sample.is_left_eye_blinking,
            sample.is_right_eye_blinking
        );
        Ok(())
    }
}
