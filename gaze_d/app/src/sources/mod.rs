pub mod replay;
pub mod udp;

use common::{FaceSource, GazeConfig, InputMode};
use replay::ReplayFaceSource;
use udp::UdpFaceSource;

pub fn create_source(config: &GazeConfig) -> Box<dyn FaceSource + Send> {
    match config.input.mode {
        InputMode::Udp => Box::new(UdpFaceSource::new(format!(
            "{}:{}",
            config.input.listen_address, config.input.listen_port
        ))),
        InputMode::Replay => Box::new(ReplayFaceSource::new(
            &config.input.replay_path,
            config.input.replay_loop,
        )),
    }
}
