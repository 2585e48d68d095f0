use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Cursor position smoothing.
    pub position: f64,
    /// Raw NDC smoothing.
    pub ndc: f32,
    /// NDC smoothing while an eye is closed.
    pub blink: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            position: 0.2,
            ndc: 0.05,
            blink: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Blink intensity above which an eye counts as closed.
    pub threshold: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self { threshold: 0.05 }
    }
}

/// Head-to-camera distance (meters) and the cursor scale it maps to.
/// Closer heads get the larger scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            min_distance: 0.3,
            max_distance: 0.6,
            min_scale: 3.0,
            max_scale: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum InputMode {
    #[default]
    #[serde(alias = "udp", alias = "UDP")]
    Udp,
    #[serde(alias = "replay", alias = "File")]
    Replay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub mode: InputMode,
    pub listen_address: String,
    pub listen_port: u16,
    /// JSON-lines file of face frames, used by `Replay`.
    pub replay_path: String,
    pub replay_loop: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::default(),
            listen_address: "0.0.0.0".to_string(),
            listen_port: 9100,
            replay_path: "frames.jsonl".to_string(),
            replay_loop: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum OutputMode {
    #[default]
    #[serde(alias = "log")]
    Log,
    #[serde(alias = "udp", alias = "UDP", alias = "GenericUDP")]
    Udp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    #[serde(alias = "transport_type")]
    pub mode: OutputMode,
    pub send_address: String,
    pub send_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            send_address: "127.0.0.1".to_string(),
            send_port: 9101,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    pub filter: FilterConfig,
    pub blink: BlinkConfig,
    pub distance: DistanceConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default = "default_max_fps")]
    pub max_fps: Option<f32>,
}

fn default_max_fps() -> Option<f32> {
    Some(60.0)
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            blink: BlinkConfig::default(),
            distance: DistanceConfig::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            max_fps: default_max_fps(),
        }
    }
}

fn check_factor(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::FilterFactor { name, value })
    }
}

impl GazeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_factor("position", self.filter.position)?;
        check_factor("ndc", self.filter.ndc as f64)?;
        check_factor("blink", self.filter.blink as f64)?;

        let threshold = self.blink.threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(ConfigError::BlinkThreshold(threshold));
        }

        let d = &self.distance;
        if !(d.min_distance >= 0.0 && d.max_distance > d.min_distance) {
            return Err(ConfigError::DistanceRange {
                min: d.min_distance,
                max: d.max_distance,
            });
        }
        if !(d.min_scale > 0.0 && d.max_scale >= d.min_scale) {
            return Err(ConfigError::ScaleRange {
                min: d.min_scale,
                max: d.max_scale,
            });
        }

        if let Some(fps) = self.max_fps {
            if fps <= 0.0 || !fps.is_finite() {
                return Err(ConfigError::MaxFps(fps));
            }
        }
        Ok(())
    }
}

/// Reads the config at `path`, writing the defaults there first if it does not exist.
pub fn load_config(path: &Path) -> Result<GazeConfig> {
    if path.exists() {
        info!("Loading config from {:?}", path);
        let file = File::open(path).with_context(|| format!("Failed to open config {:?}", path))?;
        let config: GazeConfig = serde_json::from_reader(BufReader::new(file))
            .context("Failed to deserialize config")?;
        config.validate()?;
        Ok(config)
    } else {
        info!("Config not found. Creating default at {:?}", path);
        let config = GazeConfig::default();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config dir: {:?}", parent))?;
            }
        }
        let file = File::create(path).context("Failed to create config file")?;
        serde_json::to_writer_pretty(BufWriter::new(file), &config)
            .context("Failed to serialize config")?;
        Ok(config)
    }
}
