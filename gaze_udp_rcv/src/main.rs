use anyhow::{Context, Result};
use api::GazeEvent;
use log::{error, info, warn};
use std::net::UdpSocket;

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let port = std::env::args()
        .nth(1)
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(9101);
    let addr = format!("0.0.0.0:{}", port);
    let socket = UdpSocket::bind(&addr).with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening for gaze events on {}...", addr);

    let mut buf = [0u8; 65535]; // Max UDP size
    let mut was_blinking = false;

    loop {
        match socket.recv_from(&mut buf) {
            Ok((amt, src)) => {
                let slice = &buf[..amt];

                match serde_json::from_slice::<GazeEvent>(slice) {
                    Ok(event) => {
                        let sample = event.sample;
                        let delta = sample.delta();
                        println!(
                            "#{:<8} ({:>8.3}, {:>8.3})  d=({:>7.3}, {:>7.3})  blink L={} R={}",
                            event.frame,
                            sample.position.x,
                            sample.position.y,
                            delta.x,
                            delta.y,
                            sample.is_left_eye_blinking as u8,
                            sample.is_right_eye_blinking as u8,
                        );
                        if sample.is_blinking() != was_blinking {
                            info!(
                                "Blink {} (from {})",
                                if sample.is_blinking() { "started" } else { "ended" },
                                src
                            );
                            was_blinking = sample.is_blinking();
                        }
                    }
                    Err(e) => {
                        warn!("Failed to deserialize packet from {}: {}", src, e);
                        if let Ok(s) = std::str::from_utf8(slice) {
                            warn!("Raw data: {}", s);
                        }
                    }
                }
            }
            Err(e) => {
                error!("Error receiving data: {}", e);
            }
        }
    }
}
