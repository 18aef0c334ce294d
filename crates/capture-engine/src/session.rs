//! Recording session orchestration.
//!
//! One session runs three tasks against a shared [`StopSignal`]:
//! frame capture, key capture, and the finish watcher. The watcher is
//! the only task that sets the signal under normal termination; a
//! failing producer sets it on the way out so its sibling is never left
//! running. The session returns only after both producers have drained.

use std::time::Duration;

use playtrace_common::clock::SessionClock;
use playtrace_common::error::{PlaytraceError, PlaytraceResult};
use playtrace_dataset_model::{key_set, KeySet, KeyState, KeyTransition, ScreenFrame};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::backend::{FrameSource, KeySource, RawTransition};
use crate::signal::StopSignal;

/// Configuration for one capture session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Keys whose transitions are accumulated into the key sequence.
    pub recording_keys: KeySet,

    /// Key whose press ends the session.
    pub finish_key: String,

    /// Offset added to every key timestamp at receipt to compensate for
    /// hook delivery latency.
    pub key_delay_secs: f64,
}

impl SessionConfig {
    pub fn new(recording_keys: KeySet, finish_key: impl Into<String>) -> Self {
        Self {
            recording_keys,
            finish_key: finish_key.into(),
            key_delay_secs: 0.0,
        }
    }
}

/// The two finished, time-ordered sequences a session produces.
#[derive(Debug)]
pub struct CaptureOutput {
    pub frames: Vec<ScreenFrame>,
    pub key_events: Vec<KeyTransition>,
}

/// A recording session that coordinates both producers and the finish
/// watcher.
pub struct CaptureSession {
    config: SessionConfig,
    stop: StopSignal,
}

impl CaptureSession {
    /// Create a new capture session with the given configuration.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            stop: StopSignal::new(),
        }
    }

    /// The session's stop signal, for external termination (tests,
    /// process shutdown). The finish watcher sets it in normal use.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Run the session to completion: capture until the finish trigger
    /// (or a failure) fires the stop signal, then return both drained
    /// sequences.
    ///
    /// The key hook is released before this returns, on every path.
    pub async fn run(
        self,
        frame_source: Box<dyn FrameSource + 'static>,
        mut key_source: Box<dyn KeySource + 'static>,
    ) -> PlaytraceResult<CaptureOutput> {
        let clock = SessionClock::start();
        tracing::info!(
            epoch_wall = %clock.epoch_wall(),
            frame_backend = frame_source.name(),
            key_backend = key_source.name(),
            "Capture session started"
        );

        let (key_tx, key_rx) = tokio::sync::mpsc::unbounded_channel();
        let (finish_tx, finish_rx) = tokio::sync::mpsc::unbounded_channel();

        let hooked = (|| {
            key_source.subscribe(&self.config.recording_keys, key_tx)?;
            key_source.subscribe(&key_set([self.config.finish_key.clone()]), finish_tx)?;
            key_source.start()
        })();
        if let Err(e) = hooked {
            key_source.stop();
            return Err(e);
        }

        let frame_task = tokio::spawn(capture_frames(
            frame_source,
            clock.clone(),
            self.stop.clone(),
        ));
        let key_task = tokio::spawn(capture_keys(
            key_rx,
            clock.clone(),
            self.stop.clone(),
            self.config.key_delay_secs,
        ));
        let watcher = tokio::spawn(watch_for_finish(finish_rx, self.stop.clone()));

        let (frames, key_events, _) = tokio::join!(frame_task, key_task, watcher);

        // Hooks are scoped to the session: released before any result is
        // inspected so failure paths cannot leak them.
        key_source.stop();

        let frames = frames
            .map_err(|e| PlaytraceError::capture(format!("Frame task failed to join: {e}")))??;
        let key_events = key_events
            .map_err(|e| PlaytraceError::capture(format!("Key task failed to join: {e}")))??;

        tracing::info!(
            frames = frames.len(),
            key_events = key_events.len(),
            duration_secs = clock.elapsed_secs(),
            "Capture session drained"
        );

        Ok(CaptureOutput { frames, key_events })
    }
}

/// Task A: pull frames and stamp each at receipt. Stamping happens
/// sequentially against a monotonic clock, so the accumulated sequence
/// is non-decreasing in timestamp by construction.
async fn capture_frames(
    mut source: Box<dyn FrameSource>,
    clock: SessionClock,
    stop: StopSignal,
) -> PlaytraceResult<Vec<ScreenFrame>> {
    let mut frames: Vec<ScreenFrame> = Vec::new();
    let mut last_report = std::time::Instant::now();

    while !stop.is_set() {
        match source.next_frame() {
            Ok(Some(buffer)) => {
                frames.push(ScreenFrame::new(clock.elapsed_secs(), buffer));
            }
            Ok(None) => {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            Err(e) => {
                // The sibling producer must not be left running.
                stop.set();
                return Err(e);
            }
        }

        if last_report.elapsed() >= Duration::from_secs(5) {
            let elapsed = clock.elapsed_secs();
            let rate = if elapsed > 0.0 {
                frames.len() as f64 / elapsed
            } else {
                0.0
            };
            tracing::info!(
                frames = frames.len(),
                elapsed_secs = elapsed,
                rate,
                "Frame capture progress"
            );
            last_report = std::time::Instant::now();
        }
    }

    Ok(frames)
}

/// Task B: drain hook deliveries and stamp each at receipt, plus the
/// configured delay offset. The offset is constant, so it shifts events
/// relative to frames but never reorders events relative to each other.
async fn capture_keys(
    mut rx: UnboundedReceiver<RawTransition>,
    clock: SessionClock,
    stop: StopSignal,
    delay_secs: f64,
) -> PlaytraceResult<Vec<KeyTransition>> {
    let mut events: Vec<KeyTransition> = Vec::new();

    loop {
        tokio::select! {
            biased;

            _ = stop.wait() => break,
            received = rx.recv() => match received {
                Some(raw) => {
                    events.push(KeyTransition {
                        timestamp_secs: clock.elapsed_secs() + delay_secs,
                        key: raw.key,
                        state: raw.state,
                    });
                }
                None => {
                    if stop.is_set() {
                        break;
                    }
                    stop.set();
                    return Err(PlaytraceError::capture(
                        "Key hook channel closed while recording",
                    ));
                }
            }
        }
    }

    Ok(events)
}

/// Task C: block until the finish key is pressed, then set the stop
/// signal. The only task that sets it under normal termination.
async fn watch_for_finish(mut rx: UnboundedReceiver<RawTransition>, stop: StopSignal) {
    loop {
        tokio::select! {
            _ = stop.wait() => break,
            received = rx.recv() => match received {
                Some(raw) if raw.state == KeyState::Down => {
                    tracing::info!(key = %raw.key, "Finish trigger received");
                    stop.set();
                    break;
                }
                Some(_) => continue,
                // Hook gone; the key capture task surfaces the failure.
                None => break,
            }
        }
    }
}
