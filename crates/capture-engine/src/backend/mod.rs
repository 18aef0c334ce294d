//! Capture backend interfaces.
//!
//! The pixel grabber and the key hook are external collaborators; the
//! engine only depends on these traits. Both contracts share one
//! ordering rule: delivery order defines append order, and the merge
//! downstream depends on delivery order being non-decreasing in
//! timestamp (timestamps are stamped at receipt by the capture tasks,
//! so a backend only breaks this by reordering its own deliveries).

pub mod stub;

#[cfg(target_os = "linux")]
pub mod evdev;

use playtrace_common::error::PlaytraceResult;
use playtrace_dataset_model::{FrameBuffer, KeySet, KeyState};

pub use stub::{ScriptedTransition, StubFrameSource, StubKeySource};

/// Channel end on which a key backend delivers transitions.
pub type KeyEventSender = tokio::sync::mpsc::UnboundedSender<RawTransition>;

/// An undated key transition as delivered by the hook. The capture task
/// stamps it at the moment of receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransition {
    pub key: String,
    pub state: KeyState,
}

/// A source of screen frames.
///
/// Pulls are bounded by the source's own frame pacing: `Ok(None)` means
/// no frame is ready yet and the caller should retry shortly. A source
/// that has ended keeps returning `Ok(None)`.
pub trait FrameSource: Send {
    /// Pull the next frame if one is ready.
    fn next_frame(&mut self) -> PlaytraceResult<Option<FrameBuffer>>;

    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Check if the backend is available on this system.
    fn is_available(&self) -> bool;
}

/// A source of key transitions.
///
/// Subscriptions are registered before `start`; each delivers matching
/// transitions on its own channel, in delivery order, until `stop`.
/// `stop` releases the OS hook and is idempotent; implementations also
/// release on drop so no exit path leaks a hook.
pub trait KeySource: Send {
    /// Register interest in a set of keys.
    fn subscribe(&mut self, keys: &KeySet, tx: KeyEventSender) -> PlaytraceResult<()>;

    /// Begin delivering transitions to all subscriptions.
    fn start(&mut self) -> PlaytraceResult<()>;

    /// Stop delivering and release the hook.
    fn stop(&mut self);

    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Check if the backend is available on this system.
    fn is_available(&self) -> bool;
}

/// Detect the best available key backend for the current system.
pub fn detect_best_key_source() -> Box<dyn KeySource> {
    #[cfg(target_os = "linux")]
    {
        if evdev::EvdevKeySource::is_supported() {
            match evdev::EvdevKeySource::new() {
                Ok(source) => {
                    tracing::info!("Using evdev key backend");
                    return Box::new(source);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to initialize evdev key backend, using stub");
                }
            }
        }
        tracing::warn!(
            details = %evdev::keyboard_device_diagnostic(),
            "Using stub key backend — key transitions will not be captured"
        );
    }

    #[cfg(not(target_os = "linux"))]
    tracing::warn!("No key backend for this platform — key transitions will not be captured");

    Box::new(StubKeySource::empty())
}

/// Detect the best available frame backend for the current system.
///
/// There is no built-in screen grabber; real deployments plug one in
/// behind [`FrameSource`]. The fallback produces nothing, which the
/// session surfaces as an empty (discarded) result.
pub fn detect_best_frame_source() -> Box<dyn FrameSource> {
    tracing::warn!("No frame backend configured — frames will not be captured");
    Box::new(StubFrameSource::empty())
}
