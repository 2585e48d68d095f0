use anyhow::{Context, Result};
use common::{FaceFrame, FaceSource};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

/// Plays back a recording of face frames, one JSON object per line.
pub struct ReplayFaceSource {
    path: PathBuf,
    looping: bool,
    frames: Vec<FaceFrame>,
    position: usize,
}

impl ReplayFaceSource {
    pub fn new(path: impl Into<PathBuf>, looping: bool) -> Self {
        Self {
            path: path.into(),
            looping,
            frames: Vec::new(),
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FaceSource for ReplayFaceSource {
    fn initialize(&mut self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read replay file {:?}", self.path))?;

        self.frames.clear();
        self.position = 0;
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            match serde_json::from_str::<FaceFrame>(line) {
                Ok(frame) => self.frames.push(frame),
                Err(e) => warn!("Skipping line {} of {:?}: {}", index + 1, self.path, e),
            }
        }

        info!("Loaded {} face frames from {:?}", self.frames.len(), self.path);
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<FaceFrame>> {
        if self.position >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(None);
            }
            self.position = 0;
        }
        let frame = self.frames[self.position];
        self.position += 1;
        Ok(Some(frame))
    }

    fn unload(&mut self) {
        info!(
            "Replay stopped after {} of {} frames",
            self.position,
            self.frames.len()
        );
        self.frames.clear();
        self.position = 0;
    }

    fn is_exhausted(&self) -> bool {
        (!self.looping || self.frames.is_empty()) && self.position >= self.frames.len()
    }
}
