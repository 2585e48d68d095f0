use anyhow::{anyhow, Context, Result};
use common::{GazeEvent, GazeEventSink};
use log::{info, trace};
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Sends each gaze event as a JSON datagram.
///
/// A send that would block drops the event, matching the event channel.
pub struct UdpGazeSink {
    socket: Option<UdpSocket>,
    target_address: String,
}

impl UdpGazeSink {
    pub fn new(target_address: String) -> Self {
        Self {
            socket: None,
            target_address,
        }
    }

    fn resolve_target(&self) -> Result<SocketAddr> {
        self.target_address
            .to_socket_addrs()
            .with_context(|| format!("Failed to resolve {}", self.target_address))?
            .next()
            .ok_or_else(|| anyhow!("No address found for {}", self.target_address))
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.peer_addr().ok())
    }
}

impl GazeEventSink for UdpGazeSink {
    fn initialize(&mut self) -> Result<()> {
        let target = self.resolve_target()?;
        let local = if target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local).context("Failed to bind gaze event socket")?;
        socket
            .connect(target)
            .with_context(|| format!("Failed to connect to {}", target))?;
        socket
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;

        info!("Sending gaze events to {}", target);
        self.socket = Some(socket);
        Ok(())
    }

    fn send(&self, event: &GazeEvent) -> Result<()> {
        let Some(socket) = &self.socket else {
            return Ok(());
        };
        let payload = serde_json::to_vec(event).context("Failed to encode gaze event")?;
        match socket.send(&payload) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                trace!("Socket busy, dropped gaze event {}", event.frame);
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to send gaze event {}", event.frame)),
        }
    }
}
