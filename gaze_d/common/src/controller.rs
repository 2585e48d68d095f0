use api::{FaceAnchor, FaceFrame, GazeActivity, GazeEvent, GazeSample, InterfaceOrientation};
use glam::DVec2;
use log::{debug, info, trace};
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::config::GazeConfig;
use crate::interpolator::LowPassInterpolator;
use crate::projector::GazeProjector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    /// No face anchor is present.
    #[default]
    NoFace,
    /// Anchor tracked, eyes open, projection valid.
    Tracking,
    /// Anchor present but untracked, blinking, or the frame was degenerate.
    Lost,
}

/// Turns face-anchor updates into smoothed cursor positions and gaze events.
///
/// Owned by a single producer and driven once per frame, either through
/// [`process_frame`](Self::process_frame) or through
/// [`apply_anchor`](Self::apply_anchor) followed by [`step`](Self::step).
pub struct GazeTrackingController {
    blink_threshold: f32,
    projector: GazeProjector,
    cursor: LowPassInterpolator<DVec2>,

    anchor: Option<FaceAnchor>,
    last_known_gaze: Option<DVec2>,
    previous: Option<GazeSample>,
    state: TrackingState,
    frame: u64,

    subscribers: Vec<Sender<GazeActivity>>,
}

impl GazeTrackingController {
    pub fn new(config: &GazeConfig) -> Self {
        Self {
            blink_threshold: config.blink.threshold,
            projector: GazeProjector::new(&config.filter, &config.distance),
            cursor: LowPassInterpolator::new(config.filter.position, DVec2::ZERO),
            anchor: None,
            last_known_gaze: None,
            previous: None,
            state: TrackingState::NoFace,
            frame: 0,
            subscribers: Vec::new(),
        }
    }

    /// Receives one [`GazeActivity`] per change of the tracked flag.
    pub fn subscribe_activity(&mut self) -> Receiver<GazeActivity> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, activity: GazeActivity) {
        match activity {
            GazeActivity::Acquired => info!("Gaze acquired"),
            GazeActivity::Lost => info!("Gaze lost"),
        }
        self.subscribers.retain(|tx| tx.send(activity).is_ok());
    }

    /// Applies an anchor add/update (`Some`) or removal (`None`).
    pub fn apply_anchor(&mut self, anchor: Option<FaceAnchor>) {
        let was_tracked = self.is_gaze_active();
        let is_tracked = anchor.is_some_and(|a| a.is_tracked);

        match &anchor {
            Some(a) => {
                let scale = self.projector.update_distance(a.head_distance());
                trace!("Head distance {:.3} m -> scale {:.2}", a.head_distance(), scale);
            }
            None => {
                if self.anchor.is_some() {
                    debug!("Face anchor removed");
                }
                self.state = TrackingState::NoFace;
            }
        }
        self.anchor = anchor;

        if was_tracked != is_tracked {
            self.notify(if is_tracked {
                GazeActivity::Acquired
            } else {
                GazeActivity::Lost
            });
        }
    }

    /// Runs one frame of the pipeline against the current anchor.
    ///
    /// Returns an event only while the anchor is tracked.
    pub fn step(&mut self, orientation: InterfaceOrientation) -> Option<GazeEvent> {
        let Some(anchor) = self.anchor else {
            self.state = TrackingState::NoFace;
            return None;
        };

        let left_blink = anchor.eye_blink_left > self.blink_threshold;
        let right_blink = anchor.eye_blink_right > self.blink_threshold;
        let is_blinking = left_blink || right_blink;

        let projected = if anchor.is_tracked && !is_blinking {
            // Blinking frames take the replay path below, so the projector's
            // blink factor is only reached by callers of `GazeProjector::project`.
            match self.projector.project(&anchor.transform, orientation, false) {
                Ok(pos) => Some(pos),
                Err(e) => {
                    debug!("Dropping degenerate frame {}: {}", self.frame, e);
                    None
                }
            }
        } else {
            None
        };

        let position = match projected {
            Some(raw) => {
                self.state = TrackingState::Tracking;
                self.last_known_gaze = Some(raw);
                self.cursor.update(raw, None)
            }
            None => {
                self.state = TrackingState::Lost;
                let target = self.last_known_gaze.unwrap_or_else(|| self.cursor.value());
                self.cursor.update(target, None)
            }
        };

        let sample = GazeSample {
            position,
            previous_position: self.previous.map(|p| p.position),
            is_left_eye_blinking: left_blink,
            is_right_eye_blinking: right_blink,
        };
        self.previous = Some(sample);
        self.frame += 1;

        if anchor.is_tracked {
            Some(GazeEvent {
                frame: self.frame,
                sample,
            })
        } else {
            None
        }
    }

    pub fn process_frame(&mut self, frame: &FaceFrame) -> Option<GazeEvent> {
        self.apply_anchor(frame.anchor);
        self.step(frame.orientation)
    }

    /// Back to the initial state, as when the tracking session restarts with
    /// its anchors removed.
    pub fn reset_session(&mut self) {
        self.apply_anchor(None);
        self.projector.reset();
        self.cursor.reset(DVec2::ZERO);
        self.last_known_gaze = None;
        self.previous = None;
        self.frame = 0;
    }

    pub fn is_gaze_active(&self) -> bool {
        self.anchor.is_some_and(|a| a.is_tracked)
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn last_known_gaze(&self) -> Option<DVec2> {
        self.last_known_gaze
    }

    pub fn cursor_position(&self) -> DVec2 {
        self.cursor.value()
    }

    pub fn scale(&self) -> f32 {
        self.projector.scale()
    }

    pub fn projector(&self) -> &GazeProjector {
        &self.projector
    }

    pub fn anchor(&self) -> Option<&FaceAnchor> {
        self.anchor.as_ref()
    }
}
