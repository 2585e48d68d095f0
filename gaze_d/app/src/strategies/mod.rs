pub mod log_sink;
pub mod udp;

use anyhow::Result;
use common::{GazeConfig, GazeEvent, GazeEventSink, OutputMode};
use log::error;
#[cfg(feature = "xtralog")]
use log::trace;
use log_sink::LogSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;
use udp::UdpGazeSink;

pub enum PlatformBackend {
    Log(LogSink),
    Udp(UdpGazeSink),
}

impl GazeEventSink for PlatformBackend {
    fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Log(s) => s.initialize(),
            Self::Udp(s) => s.initialize(),
        }
    }

    fn send(&self, event: &GazeEvent) -> Result<()> {
        match self {
            Self::Log(s) => s.send(event),
            Self::Udp(s) => s.send(event),
        }
    }
}

pub fn create_strategy(config: &GazeConfig) -> PlatformBackend {
    match config.output.mode {
        OutputMode::Log => PlatformBackend::Log(LogSink),
        OutputMode::Udp => PlatformBackend::Udp(UdpGazeSink::new(format!(
            "{}:{}",
            config.output.send_address, config.output.send_port
        ))),
    }
}

/// Forwards events from `rx` to `sink` until `running` clears or the sender
/// hangs up, then delivers anything still queued. Returns the number of
/// events handed to the sink.
pub fn dispatch_events<S: GazeEventSink + ?Sized>(
    rx: &Receiver<GazeEvent>,
    running: &AtomicBool,
    sink: &S,
) -> u64 {
    let mut sent = 0;
    let mut dispatch = |event: GazeEvent| {
        #[cfg(feature = "xtralog")]
        trace!("Dispatching gaze event {:?}", event);

        if let Err(e) = sink.send(&event) {
            error!("Failed to send gaze event: {:#}", e);
        }
        sent += 1;
    };

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => dispatch(event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    for event in rx.try_iter() {
        dispatch(event);
    }
    sent
}
