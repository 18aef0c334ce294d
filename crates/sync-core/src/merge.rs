//! Two-pointer temporal merge of key transitions and screen frames.
//!
//! Both producers stamp against the same session clock, so aligning
//! their finished sequences is a single forward pass: every key
//! transition with a timestamp strictly earlier than the current frame
//! is folded into the running held-key set before the frame is
//! evaluated. A release may be delivered fractionally after the frame
//! that should already reflect it (the hook-delay offset only partially
//! corrects for delivery latency), so the strict-inequality tie-break
//! keeps frames on the most causally-current key state available.
//!
//! The final `discard_tail_secs` of frames is dropped: the end of a
//! session captures the user's stopping motion, which must not be kept
//! as training signal.

use std::collections::BTreeSet;

use playtrace_common::error::{PlaytraceError, PlaytraceResult};
use playtrace_dataset_model::{is_time_ordered, DatasetItem, KeyTransition, ScreenFrame};

/// What to do when a release arrives for a key that is not held.
///
/// This happens when a key was already down before the session started,
/// or when the hook dropped the matching press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// Log a warning and skip the transition. The default: a key held
    /// across session start is an expected real-world input.
    #[default]
    Ignore,

    /// Abort the merge with [`PlaytraceError::InconsistentKeyState`].
    Fail,
}

/// Merge parameters.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Seconds of frames discarded from the end of the session.
    pub discard_tail_secs: f64,

    /// Policy for releases without a matching press.
    pub release_policy: ReleasePolicy,
}

impl MergeConfig {
    pub fn new(discard_tail_secs: f64) -> Self {
        Self {
            discard_tail_secs,
            release_policy: ReleasePolicy::default(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Merge the two finished capture sequences into aligned dataset rows.
///
/// Inputs must be non-decreasing in timestamp; producers guarantee this
/// because each stamps its events sequentially against a monotonic
/// clock. If a backend violated the delivery-order contract anyway,
/// both sequences are stable-sorted first with a warning.
///
/// An empty result is a valid outcome meaning "discard this session";
/// key transitions trailing the last retained frame are dropped.
pub fn merge_streams(
    events: &[KeyTransition],
    frames: Vec<ScreenFrame>,
    config: &MergeConfig,
) -> PlaytraceResult<Vec<DatasetItem>> {
    if frames.is_empty() {
        return Ok(Vec::new());
    }

    let frames = ensure_frames_ordered(frames);

    let sorted_events;
    let events: &[KeyTransition] = if is_time_ordered(events) {
        events
    } else {
        tracing::warn!("Key transitions arrived out of timestamp order; sorting defensively");
        sorted_events = stable_sorted(events);
        &sorted_events
    };

    let last_timestamp = frames
        .last()
        .map(|frame| frame.timestamp_secs)
        .unwrap_or_default();
    let cutoff = last_timestamp - config.discard_tail_secs;

    let mut active: BTreeSet<String> = BTreeSet::new();
    let mut next_event = 0usize;
    let mut items = Vec::new();

    for frame in frames {
        while next_event < events.len()
            && events[next_event].timestamp_secs < frame.timestamp_secs
        {
            apply_transition(&mut active, &events[next_event], config.release_policy)?;
            next_event += 1;
        }

        // Everything from the first frame past the cutoff is tail.
        if frame.timestamp_secs > cutoff {
            break;
        }

        items.push(DatasetItem::new(
            frame.timestamp_secs,
            frame.buffer,
            active.iter().cloned().collect(),
        ));
    }

    Ok(items)
}

fn apply_transition(
    active: &mut BTreeSet<String>,
    event: &KeyTransition,
    policy: ReleasePolicy,
) -> PlaytraceResult<()> {
    if event.is_down() {
        active.insert(event.key.clone());
        return Ok(());
    }

    if !active.remove(&event.key) {
        match policy {
            ReleasePolicy::Ignore => {
                tracing::warn!(
                    key = %event.key,
                    timestamp_secs = event.timestamp_secs,
                    "Release without a matching press; skipping"
                );
            }
            ReleasePolicy::Fail => {
                return Err(PlaytraceError::InconsistentKeyState {
                    key: event.key.clone(),
                    timestamp_secs: event.timestamp_secs,
                });
            }
        }
    }
    Ok(())
}

fn ensure_frames_ordered(mut frames: Vec<ScreenFrame>) -> Vec<ScreenFrame> {
    let ordered = frames
        .windows(2)
        .all(|pair| pair[0].timestamp_secs <= pair[1].timestamp_secs);
    if !ordered {
        tracing::warn!("Frames arrived out of timestamp order; sorting defensively");
        frames.sort_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs));
    }
    frames
}

fn stable_sorted(events: &[KeyTransition]) -> Vec<KeyTransition> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs));
    sorted
}
