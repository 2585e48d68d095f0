use anyhow::Result;
use common::{
    load_config, GazeActivity, GazeConfig, GazeEvent, GazeEventSink, GazeTrackingController,
    InputMode,
};
use gaze_d::{sources, strategies};
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct Args {
    config_path: PathBuf,
    replay: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args {
        config_path: PathBuf::from("config.json"),
        replay: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                if let Some(path) = iter.next() {
                    args.config_path = PathBuf::from(path);
                }
            }
            "--replay" => args.replay = iter.next().map(PathBuf::from),
            other => warn!("Ignoring unknown argument '{}'", other),
        }
    }
    args
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    info!("Starting...");
    debug!("Debug logging is active");
    trace!("Trace logging is active");

    let args = parse_args();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let mut config = load_config(&args.config_path).unwrap_or_else(|e| {
        error!("Failed to load config: {:#}. Using defaults.", e);
        GazeConfig::default()
    });
    if let Some(path) = args.replay {
        config.input.mode = InputMode::Replay;
        config.input.replay_path = path.to_string_lossy().into_owned();
    }
    info!("Loaded Config: {:?}", config);

    let mut source = sources::create_source(&config);
    if let Err(e) = source.initialize() {
        error!("Failed to initialize face source: {:#}", e);
        return Err(e);
    }
    info!("Face source initialized with {:?} input.", config.input.mode);

    let mut sink = strategies::create_strategy(&config);
    if let Err(e) = sink.initialize() {
        error!("Failed to initialize gaze sink: {:#}", e);
        return Err(e);
    }
    info!("Gaze sink initialized with {:?} output.", config.output.mode);

    let mut controller = GazeTrackingController::new(&config);
    let activity_rx = controller.subscribe_activity();
    controller.reset_session();

    let (tx, rx) = sync_channel::<GazeEvent>(1);

    let running_consumer = running.clone();
    let consumer = thread::spawn(move || {
        info!("Consumer Thread Started");

        let sent = strategies::dispatch_events(&rx, &running_consumer, &sink);
        debug!("Dispatched {} gaze events", sent);
        info!("Consumer Thread Stopped");
    });

    let running_producer = running.clone();
    let target_frame_duration = config.max_fps.map(|fps| Duration::from_secs_f32(1.0 / fps));

    let producer = thread::spawn(move || {
        info!("Entering Tracking Loop (Producer)...");

        let mut frame_count: u64 = 0;
        let mut dropped: u64 = 0;
        let mut log_interval: u64 = 1000;
        let mut last_log = Instant::now();
        let mut last_frame_time = Instant::now();

        while running_producer.load(Ordering::SeqCst) {
            let frame = match source.poll() {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Face source error: {:#}", e);
                    None
                }
            };

            let Some(frame) = frame else {
                if source.is_exhausted() {
                    info!("Face source exhausted");
                    running_producer.store(false, Ordering::SeqCst);
                    break;
                }
                thread::sleep(Duration::from_millis(5));
                continue;
            };

            if let Some(event) = controller.process_frame(&frame) {
                if tx.try_send(event).is_err() {
                    dropped += 1;
                }
            }

            frame_count += 1;
            if frame_count.is_multiple_of(log_interval) {
                let elapsed = last_log.elapsed().as_secs_f32();
                let fps = log_interval as f32 / elapsed;
                info!(
                    "Tracking {:?}: Processed {} frames (approx {:.1} FPS, {} events dropped)",
                    controller.state(),
                    frame_count,
                    fps,
                    dropped
                );
                last_log = Instant::now();

                if frame_count >= 1_000_000 {
                    log_interval = 1_000_000;
                } else if frame_count >= 100_000 {
                    log_interval = 100_000;
                } else if frame_count >= 10_000 {
                    log_interval = 10_000;
                }
            }

            if let Some(target_duration) = target_frame_duration {
                let elapsed = last_frame_time.elapsed();
                if elapsed < target_duration {
                    thread::sleep(target_duration - elapsed);
                }
            }
            last_frame_time = Instant::now();
        }

        info!("Shutting down tracking loop after {} frames", frame_count);
        controller.reset_session();
        source.unload();
    });

    // Gaze activity changes are handled here, on the main thread.
    let mut cursor_visible = false;
    loop {
        match activity_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(activity) => {
                cursor_visible = activity == GazeActivity::Acquired;
                if cursor_visible {
                    info!("Virtual cursor shown");
                } else {
                    info!("Virtual cursor hidden");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("Cursor visible at shutdown: {}", cursor_visible);

    if producer.join().is_err() {
        error!("Tracking loop panicked");
    }
    running.store(false, Ordering::SeqCst);
    if consumer.join().is_err() {
        error!("Consumer thread panicked");
    }

    info!("Shutting down...");
    Ok(())
}
