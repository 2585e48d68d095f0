//! Source, sink, and end-to-end pipeline tests.

use api::{FaceAnchor, FaceFrame, GazeActivity, GazeEvent, GazeEventSink, InterfaceOrientation};
use common::{FaceSource, GazeConfig, GazeTrackingController};
use gaze_d::sources::replay::ReplayFaceSource;
use gaze_d::sources::udp::UdpFaceSource;
use gaze_d::strategies::dispatch_events;
use gaze_d::strategies::udp::UdpGazeSink;
use glam::{Mat4, Vec3};
use std::fs;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::sync_channel;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

fn get_test_file(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("gaze_d_test_{}.jsonl", name));
    fs::write(&path, contents).expect("write replay file");
    path
}

fn tracked_frame(x: f32, blink: f32) -> FaceFrame {
    FaceFrame {
        anchor: Some(FaceAnchor {
            transform: Mat4::from_translation(Vec3::new(x, 0.0, -0.4)),
            is_tracked: true,
            eye_blink_left: blink,
            eye_blink_right: 0.0,
        }),
        orientation: InterfaceOrientation::Portrait,
    }
}

fn to_lines(frames: &[FaceFrame]) -> String {
    frames
        .iter()
        .map(|f| serde_json::to_string(f).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

mod replay_source {
    use super::*;

    #[test]
    fn skips_malformed_lines() {
        let mut contents = to_lines(&[tracked_frame(0.1, 0.0), tracked_frame(0.2, 0.0)]);
        contents.push_str("\n\n{ not json\n// comment\n{}\n");
        let path = get_test_file("skips_malformed", &contents);

        let mut source = ReplayFaceSource::new(&path, false);
        source.initialize().expect("replay should load");
        assert_eq!(source.len(), 3);

        assert_eq!(source.poll().unwrap(), Some(tracked_frame(0.1, 0.0)));
        assert_eq!(source.poll().unwrap(), Some(tracked_frame(0.2, 0.0)));
        assert_eq!(source.poll().unwrap(), Some(FaceFrame::default()));
        assert!(source.is_exhausted());
        assert_eq!(source.poll().unwrap(), None);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn loops_when_requested() {
        let path = get_test_file("loops", &to_lines(&[tracked_frame(0.1, 0.0)]));

        let mut source = ReplayFaceSource::new(&path, true);
        source.initialize().unwrap();
        for _ in 0..3 {
            assert_eq!(source.poll().unwrap(), Some(tracked_frame(0.1, 0.0)));
            assert!(!source.is_exhausted());
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut source = ReplayFaceSource::new("/nonexistent/gaze_d/frames.jsonl", false);
        assert!(source.initialize().is_err());
    }
}

mod udp_transport {
    use super::*;

    #[test]
    fn face_source_keeps_latest_frame() {
        let mut source = UdpFaceSource::new("127.0.0.1:0".to_string());
        source.initialize().expect("bind should succeed");
        let target = source.local_addr().expect("bound address");

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender
            .send_to(serde_json::to_string(&tracked_frame(0.1, 0.0)).unwrap().as_bytes(), target)
            .unwrap();
        sender.send_to(b"garbage", target).unwrap();
        sender
            .send_to(serde_json::to_string(&tracked_frame(0.3, 0.0)).unwrap().as_bytes(), target)
            .unwrap();

        let mut received = None;
        for _ in 0..50 {
            thread::sleep(Duration::from_millis(10));
            if let Some(frame) = source.poll().unwrap() {
                received = Some(frame);
                if frame == tracked_frame(0.3, 0.0) {
                    break;
                }
            }
        }
        assert_eq!(received, Some(tracked_frame(0.3, 0.0)));
        assert_eq!(source.poll().unwrap(), None);

        source.unload();
        assert!(source.local_addr().is_none());
    }

    #[test]
    fn face_source_keeps_tracking_transitions() {
        let mut source = UdpFaceSource::new("127.0.0.1:0".to_string());
        source.initialize().expect("bind should succeed");
        let target = source.local_addr().expect("bound address");

        let removed = FaceFrame {
            anchor: None,
            orientation: InterfaceOrientation::Portrait,
        };
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        for frame in [
            tracked_frame(0.1, 0.0),
            tracked_frame(0.2, 0.0),
            removed,
            tracked_frame(0.3, 0.0),
        ] {
            sender
                .send_to(serde_json::to_string(&frame).unwrap().as_bytes(), target)
                .unwrap();
        }
        thread::sleep(Duration::from_millis(100));

        let mut controller = GazeTrackingController::new(&GazeConfig::default());
        let activity = controller.subscribe_activity();
        let mut frames = Vec::new();
        for _ in 0..50 {
            match source.poll().unwrap() {
                Some(frame) => {
                    controller.process_frame(&frame);
                    frames.push(frame);
                }
                None if frames.len() >= 3 => break,
                None => thread::sleep(Duration::from_millis(10)),
            }
        }

        assert_eq!(
            frames,
            vec![tracked_frame(0.2, 0.0), removed, tracked_frame(0.3, 0.0)]
        );
        assert_eq!(
            activity.try_iter().collect::<Vec<_>>(),
            vec![
                GazeActivity::Acquired,
                GazeActivity::Lost,
                GazeActivity::Acquired
            ]
        );
    }

    #[test]
    fn gaze_sink_sends_json() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let addr = receiver.local_addr().unwrap();

        let mut sink = UdpGazeSink::new(addr.to_string());
        sink.initialize().expect("sink should initialize");
        assert_eq!(sink.peer_addr(), Some(addr));

        let mut controller = GazeTrackingController::new(&GazeConfig::default());
        let event = controller
            .process_frame(&tracked_frame(0.1, 0.0))
            .expect("tracked frame dispatches");
        sink.send(&event).unwrap();

        let mut buf = [0u8; 4096];
        let (amt, _) = receiver.recv_from(&mut buf).expect("datagram");
        let decoded: GazeEvent = serde_json::from_slice(&buf[..amt]).unwrap();
        assert_eq!(decoded, event);
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn replay_through_controller() {
        let frames = vec![
            FaceFrame::default(),
            tracked_frame(0.1, 0.0),
            tracked_frame(0.1, 0.0),
            tracked_frame(0.1, 0.9),
            FaceFrame {
                anchor: Some(FaceAnchor {
                    is_tracked: false,
                    ..FaceAnchor::default()
                }),
                orientation: InterfaceOrientation::Portrait,
            },
            tracked_frame(0.1, 0.0),
        ];
        let path = get_test_file("pipeline", &to_lines(&frames));

        let mut source = ReplayFaceSource::new(&path, false);
        source.initialize().unwrap();
        let mut controller = GazeTrackingController::new(&GazeConfig::default());
        let activity = controller.subscribe_activity();

        let mut events = Vec::new();
        while let Some(frame) = source.poll().unwrap() {
            events.extend(controller.process_frame(&frame));
        }

        assert_eq!(events.len(), 4);
        assert!(events[2].sample.is_left_eye_blinking);
        assert!(events.iter().all(|e| e.sample.position.is_finite()));
        for pair in events.windows(2) {
            assert!(pair[1].frame > pair[0].frame);
        }
        assert_eq!(activity.try_iter().count(), 3);

        let _ = fs::remove_file(path);
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<GazeEvent>>,
    }

    impl GazeEventSink for RecordingSink {
        fn initialize(&mut self) -> anyhow::Result<()> {
            Ok(())
        }

        fn send(&self, event: &GazeEvent) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(*event);
            Ok(())
        }
    }

    #[test]
    fn queued_event_is_delivered_after_shutdown() {
        let (tx, rx) = sync_channel::<GazeEvent>(1);
        let event = GazeEvent {
            frame: 7,
            ..GazeEvent::default()
        };
        tx.try_send(event).unwrap();

        let running = AtomicBool::new(false);
        let sink = RecordingSink::default();
        assert_eq!(dispatch_events(&rx, &running, &sink), 1);
        assert_eq!(*sink.events.lock().unwrap(), vec![event]);
    }

    #[test]
    fn dispatch_stops_when_producer_hangs_up() {
        let (tx, rx) = sync_channel::<GazeEvent>(1);
        let running = AtomicBool::new(true);
        let sink = RecordingSink::default();

        let producer = thread::spawn(move || {
            for frame in 0..3 {
                tx.send(GazeEvent {
                    frame,
                    ..GazeEvent::default()
                })
                .unwrap();
            }
        });

        assert_eq!(dispatch_events(&rx, &running, &sink), 3);
        producer.join().unwrap();
        let frames: Vec<u64> = sink.events.lock().unwrap().iter().map(|e| e.frame).collect();
        assert_eq!(frames, vec![0, 1, 2]);
    }
}
