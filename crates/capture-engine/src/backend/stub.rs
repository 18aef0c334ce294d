//! Stub backends — scripted sources for tests, demos, and fallback.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use playtrace_common::clock::{RateController, SessionClock};
use playtrace_common::error::PlaytraceResult;
use playtrace_dataset_model::{FrameBuffer, KeySet, KeyState};

use super::{FrameSource, KeyEventSender, KeySource, RawTransition};

/// Frame source backed by a fixed script or a synthetic generator,
/// paced at a target rate like a real grabber would be.
pub struct StubFrameSource {
    pending: VecDeque<FrameBuffer>,
    synthetic: Option<SyntheticFrames>,
    rate: RateController,
    clock: SessionClock,
}

struct SyntheticFrames {
    width: u32,
    height: u32,
    produced: u32,
}

impl StubFrameSource {
    /// A source that never produces a frame.
    pub fn empty() -> Self {
        Self {
            pending: VecDeque::new(),
            synthetic: None,
            rate: RateController::new(30),
            clock: SessionClock::start(),
        }
    }

    /// A source that plays back pre-built frames at the given rate,
    /// then goes quiet.
    pub fn with_frames(frames: Vec<FrameBuffer>, max_fps: u32) -> Self {
        Self {
            pending: frames.into(),
            synthetic: None,
            rate: RateController::new(max_fps),
            clock: SessionClock::start(),
        }
    }

    /// An endless source of generated frames at the given geometry and
    /// rate. Lets the whole pipeline run without a real grabber.
    pub fn synthetic(width: u32, height: u32, max_fps: u32) -> Self {
        Self {
            pending: VecDeque::new(),
            synthetic: Some(SyntheticFrames {
                width,
                height,
                produced: 0,
            }),
            rate: RateController::new(max_fps),
            clock: SessionClock::start(),
        }
    }
}

impl FrameSource for StubFrameSource {
    fn next_frame(&mut self) -> PlaytraceResult<Option<FrameBuffer>> {
        if self.pending.is_empty() && self.synthetic.is_none() {
            return Ok(None);
        }
        if !self.rate.should_tick(self.clock.elapsed_ns()) {
            return Ok(None);
        }

        if let Some(frame) = self.pending.pop_front() {
            return Ok(Some(frame));
        }

        let Some(generator) = self.synthetic.as_mut() else {
            return Ok(None);
        };
        // Cycle the red channel so consecutive frames differ.
        let shade = (generator.produced % 256) as u8;
        generator.produced = generator.produced.wrapping_add(1);
        Ok(Some(FrameBuffer::filled(
            generator.width,
            generator.height,
            [shade, 0x40, 0x80],
        )))
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// One scripted key transition, delivered `at_ms` after `start`.
#[derive(Debug, Clone)]
pub struct ScriptedTransition {
    pub at_ms: u64,
    pub key: String,
    pub state: KeyState,
}

impl ScriptedTransition {
    pub fn down(at_ms: u64, key: impl Into<String>) -> Self {
        Self {
            at_ms,
            key: key.into(),
            state: KeyState::Down,
        }
    }

    pub fn up(at_ms: u64, key: impl Into<String>) -> Self {
        Self {
            at_ms,
            key: key.into(),
            state: KeyState::Up,
        }
    }
}

/// Key source that replays a script on its own delivery thread,
/// mimicking an OS hook firing asynchronously.
pub struct StubKeySource {
    script: Vec<ScriptedTransition>,
    subscriptions: Vec<(KeySet, KeyEventSender)>,
    stop_flag: Arc<AtomicBool>,
    delivery: Option<JoinHandle<()>>,
}

impl StubKeySource {
    pub fn new(mut script: Vec<ScriptedTransition>) -> Self {
        script.sort_by_key(|item| item.at_ms);
        Self {
            script,
            subscriptions: Vec::new(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            delivery: None,
        }
    }

    /// A source that never delivers a transition.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl KeySource for StubKeySource {
    fn subscribe(&mut self, keys: &KeySet, tx: KeyEventSender) -> PlaytraceResult<()> {
        self.subscriptions.push((keys.clone(), tx));
        Ok(())
    }

    fn start(&mut self) -> PlaytraceResult<()> {
        let script = std::mem::take(&mut self.script);
        let subscriptions = self.subscriptions.clone();
        let stop = self.stop_flag.clone();

        self.delivery = Some(std::thread::spawn(move || {
            let started = std::time::Instant::now();
            for item in script {
                loop {
                    if stop.load(Ordering::Relaxed) {
                        return;
                    }
                    let elapsed = started.elapsed().as_millis() as u64;
                    if elapsed >= item.at_ms {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
                for (keys, tx) in &subscriptions {
                    if keys.contains(&item.key) {
                        let _ = tx.send(RawTransition {
                            key: item.key.clone(),
                            state: item.state,
                        });
                    }
                }
            }
            // Keep the senders alive like a registered hook would until
            // the source is stopped.
            while !stop.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(5));
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.delivery.take() {
            let _ = handle.join();
        }
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl Drop for StubKeySource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playtrace_dataset_model::key_set;

    #[test]
    fn test_empty_frame_source_produces_nothing() {
        let mut source = StubFrameSource::empty();
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_scripted_frames_come_back_in_order() {
        let frames = vec![
            FrameBuffer::filled(1, 1, [1, 1, 1]),
            FrameBuffer::filled(1, 1, [2, 2, 2]),
        ];
        let mut source = StubFrameSource::with_frames(frames, 1000);

        let mut seen = Vec::new();
        while seen.len() < 2 {
            if let Some(frame) = source.next_frame().unwrap() {
                seen.push(frame);
            } else {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        assert_eq!(seen[0].data()[0], 1);
        assert_eq!(seen[1].data()[0], 2);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scripted_keys_respect_subscriptions() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut source = StubKeySource::new(vec![
            ScriptedTransition::down(0, "w"),
            ScriptedTransition::down(5, "q"),
            ScriptedTransition::up(10, "w"),
        ]);
        source.subscribe(&key_set(["w"]), tx).unwrap();
        source.start().unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.key, "w");
        assert_eq!(first.state, KeyState::Down);

        // "q" is filtered out; the next delivery is the release of "w".
        let second = rx.recv().await.unwrap();
        assert_eq!(second.key, "w");
        assert_eq!(second.state, KeyState::Up);

        source.stop();
    }
}
