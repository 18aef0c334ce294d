//! Record capture sessions in a loop.

use std::path::PathBuf;

use playtrace_capture_engine::backend::{
    detect_best_frame_source, detect_best_key_source, FrameSource, StubFrameSource,
};
use playtrace_capture_engine::{CaptureSession, SessionConfig, StopSignal};
use playtrace_common::config::AppConfig;
use playtrace_dataset_model::{key_set, KeyEncoder, KeySet, KeyState};
use playtrace_export_engine::SessionExporter;
use playtrace_sync_core::{merge_streams, MergeConfig};

pub struct RecordOpts {
    pub output: Option<PathBuf>,
    pub keys: Option<String>,
    pub finish_key: Option<String>,
    pub start_key: Option<String>,
    pub discard_tail: Option<f64>,
    pub key_delay: Option<f64>,
    pub fps: Option<u32>,
    pub synthetic: bool,
    pub width: u32,
    pub height: u32,
}

pub async fn run(opts: RecordOpts) -> anyhow::Result<()> {
    let mut config = AppConfig::load();
    if let Some(output) = opts.output {
        config.output_dir = output;
    }
    if let Some(keys) = &opts.keys {
        config.recording.recording_keys = keys
            .split(',')
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();
    }
    if let Some(finish_key) = opts.finish_key {
        config.recording.finish_key = finish_key;
    }
    if let Some(discard_tail) = opts.discard_tail {
        config.recording.discard_tail_secs = discard_tail;
    }
    if let Some(key_delay) = opts.key_delay {
        config.recording.key_delay_secs = key_delay;
    }
    if let Some(fps) = opts.fps {
        config.recording.max_fps = fps;
    }
    config.validate()?;

    let recording_keys: KeySet = key_set(config.recording.recording_keys.clone());
    let encoder = KeyEncoder::new(&recording_keys);
    let merge_config = MergeConfig::new(config.recording.discard_tail_secs);
    let exporter = SessionExporter::new(config.output_dir.clone());
    std::fs::create_dir_all(&config.output_dir)?;

    println!("Recording to {}", config.output_dir.display());
    println!("  Keys: {}", config.recording.recording_keys.join(", "));
    println!("  Finish key: {}", config.recording.finish_key);
    println!("  Discard tail: {}s", config.recording.discard_tail_secs);
    println!("  Max rate: {} fps", config.recording.max_fps);
    println!();

    // One shutdown signal for the whole loop, set by Ctrl+C.
    let shutdown = StopSignal::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.set();
            }
        });
    }

    if let Some(start_key) = &opts.start_key {
        println!("Press '{start_key}' to start recording (Ctrl+C to exit)...");
        wait_for_key(start_key, &shutdown).await?;
        if shutdown.is_set() {
            return Ok(());
        }
    }

    println!(
        "Recording... press '{}' to save and start the next session, Ctrl+C to exit.",
        config.recording.finish_key
    );
    println!();

    let mut session_index = 0usize;
    loop {
        session_index += 1;
        tracing::info!(session = session_index, "Starting session");

        let frame_source: Box<dyn FrameSource> = if opts.synthetic {
            Box::new(StubFrameSource::synthetic(
                opts.width,
                opts.height,
                config.recording.max_fps,
            ))
        } else {
            detect_best_frame_source()
        };
        let key_source = detect_best_key_source();

        let session = CaptureSession::new(SessionConfig {
            recording_keys: recording_keys.clone(),
            finish_key: config.recording.finish_key.clone(),
            key_delay_secs: config.recording.key_delay_secs,
        });

        // Relay Ctrl+C into this session's stop signal for the
        // duration of the session.
        let session_stop = session.stop_signal();
        {
            let shutdown = shutdown.clone();
            let session_stop = session_stop.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = shutdown.wait() => session_stop.set(),
                    _ = session_stop.wait() => {}
                }
            });
        }

        match session.run(frame_source, key_source).await {
            Ok(output) => {
                match merge_streams(&output.key_events, output.frames, &merge_config) {
                    Ok(items) if items.is_empty() => {
                        println!("Session discarded (too short / empty) — skipping export.");
                    }
                    Ok(items) => match exporter.export(&items, &encoder) {
                        Ok(exported) => {
                            println!(
                                "Saved {} items at {:.2} fps to {}",
                                exported.items,
                                exported.average_fps,
                                exported.dir.display()
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Export failed; session dropped");
                        }
                    },
                    Err(e) => {
                        tracing::error!(error = %e, "Merge failed; session dropped");
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Session failed (backend error)");
            }
        }

        if shutdown.is_set() {
            break;
        }
        println!();
    }

    println!("Recording stopped after {session_index} session(s).");
    Ok(())
}

/// Block until the given key is pressed or the shutdown signal fires.
async fn wait_for_key(key: &str, shutdown: &StopSignal) -> anyhow::Result<()> {
    let mut source = detect_best_key_source();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    source.subscribe(&key_set([key]), tx)?;
    source.start()?;

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            received = rx.recv() => match received {
                Some(transition) if transition.state == KeyState::Down => break,
                Some(_) => continue,
                None => break,
            }
        }
    }

    source.stop();
    Ok(())
}
