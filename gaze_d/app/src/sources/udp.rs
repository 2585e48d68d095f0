use anyhow::{Context, Result};
use common::{FaceFrame, FaceSource};
use log::{info, trace, warn};
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

/// Receives face frames as JSON datagrams.
///
/// Queued frames are coalesced: a frame that leaves both anchor presence and
/// the tracked flag unchanged replaces the pending one, so a slow consumer
/// skips stale poses but still sees every tracking transition.
pub struct UdpFaceSource {
    bind_address: String,
    socket: Option<UdpSocket>,
    buf: Vec<u8>,
    pending: VecDeque<FaceFrame>,
}

fn tracking_key(frame: &FaceFrame) -> (bool, bool) {
    (
        frame.anchor.is_some(),
        frame.anchor.is_some_and(|a| a.is_tracked),
    )
}

impl UdpFaceSource {
    pub fn new(bind_address: String) -> Self {
        Self {
            bind_address,
            socket: None,
            buf: vec![0u8; 65535], // Max UDP size
            pending: VecDeque::new(),
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    fn enqueue(&mut self, frame: FaceFrame) {
        match self.pending.back_mut() {
            Some(last) if tracking_key(last) == tracking_key(&frame) => {
                trace!("Coalescing stale face frame");
                *last = frame;
            }
            _ => self.pending.push_back(frame),
        }
    }

    fn drain_socket(&mut self) -> Result<()> {
        let Some(socket) = &self.socket else {
            return Ok(());
        };

        let mut received = Vec::new();
        loop {
            match socket.recv_from(&mut self.buf) {
                Ok((amt, src)) => {
                    let slice = &self.buf[..amt];
                    match serde_json::from_slice::<FaceFrame>(slice) {
                        Ok(frame) => received.push(frame),
                        Err(e) => {
                            warn!("Failed to deserialize packet from {}: {}", src, e);
                            if let Ok(s) = std::str::from_utf8(slice) {
                                trace!("Raw data: {}", s);
                            }
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e).context("Error receiving face frame"),
            }
        }

        for frame in received {
            self.enqueue(frame);
        }
        Ok(())
    }
}

impl FaceSource for UdpFaceSource {
    fn initialize(&mut self) -> Result<()> {
        let socket = UdpSocket::bind(&self.bind_address)
            .with_context(|| format!("Failed to bind {}", self.bind_address))?;
        socket
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;
        info!("Listening for face frames on {}", socket.local_addr()?);
        self.socket = Some(socket);
        self.pending.clear();
        Ok(())
    }

    /// Returns one frame per call, oldest transition first.
    fn poll(&mut self) -> Result<Option<FaceFrame>> {
        self.drain_socket()?;
        Ok(self.pending.pop_front())
    }

    fn unload(&mut self) {
        self.pending.clear();
        if self.socket.take().is_some() {
            info!("Closed face frame socket {}", self.bind_address);
        }
    }
}
