//! End-to-end merge behavior on hand-built sessions.

use std::collections::BTreeSet;

use playtrace_dataset_model::{DatasetItem, FrameBuffer, KeyTransition, ScreenFrame};
use playtrace_sync_core::{average_fps, merge_streams, MergeConfig};

fn frame(t: f64) -> ScreenFrame {
    ScreenFrame::new(t, FrameBuffer::filled(2, 2, [0, 0, 0]))
}

fn frames(times: &[f64]) -> Vec<ScreenFrame> {
    times.iter().map(|&t| frame(t)).collect()
}

fn held(items: &[DatasetItem]) -> Vec<Vec<String>> {
    items.iter().map(|item| item.keys.clone()).collect()
}

#[test]
fn single_key_hold_spans_frames() {
    // Frames at whole seconds; "k" held from 0.5 to 2.5.
    let events = vec![KeyTransition::down(0.5, "k"), KeyTransition::up(2.5, "k")];
    let items = merge_streams(
        &events,
        frames(&[0.0, 1.0, 2.0, 3.0, 4.0]),
        &MergeConfig::new(0.0),
    )
    .unwrap();

    assert_eq!(items.len(), 5);
    assert_eq!(
        held(&items),
        vec![
            vec![],
            vec!["k".to_string()],
            vec!["k".to_string()],
            vec![],
            vec![],
        ]
    );
}

#[test]
fn tail_discard_drops_trailing_frames() {
    // Same session, 1.5s tail: only frames at or before 4.0 - 1.5 = 2.5 survive.
    let events = vec![KeyTransition::down(0.5, "k"), KeyTransition::up(2.5, "k")];
    let items = merge_streams(
        &events,
        frames(&[0.0, 1.0, 2.0, 3.0, 4.0]),
        &MergeConfig::new(1.5),
    )
    .unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(
        held(&items),
        vec![vec![], vec!["k".to_string()], vec!["k".to_string()]]
    );
}

#[test]
fn no_key_events_yields_empty_sets() {
    let items = merge_streams(&[], frames(&[0.0, 1.0, 2.0]), &MergeConfig::new(0.0)).unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.keys.is_empty()));
}

#[test]
fn events_after_last_frame_have_no_effect() {
    let events = vec![
        KeyTransition::down(5.0, "k"),
        KeyTransition::up(6.0, "k"),
    ];
    let items = merge_streams(&events, frames(&[0.0, 1.0, 2.0]), &MergeConfig::new(0.0)).unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.keys.is_empty()));
}

#[test]
fn empty_frame_sequence_is_a_valid_empty_result() {
    let events = vec![KeyTransition::down(0.5, "k")];
    let items = merge_streams(&events, Vec::new(), &MergeConfig::new(3.0)).unwrap();
    assert!(items.is_empty());
}

#[test]
fn zero_tail_retains_the_last_frame() {
    let items = merge_streams(&[], frames(&[0.0, 1.0, 2.0]), &MergeConfig::new(0.0)).unwrap();
    assert_eq!(items.len(), 3);
    assert!((items[2].timestamp_secs - 2.0).abs() < 1e-9);
}

#[test]
fn tail_covering_the_whole_session_yields_empty_output() {
    // Frames start after the session epoch; a tail reaching back past
    // the first frame leaves nothing to keep.
    let items = merge_streams(&[], frames(&[1.0, 2.0, 3.0, 4.0]), &MergeConfig::new(4.0)).unwrap();
    assert!(items.is_empty());
}

#[test]
fn merge_is_a_pure_function_of_its_inputs() {
    let events = vec![
        KeyTransition::down(0.3, "w"),
        KeyTransition::down(0.7, "a"),
        KeyTransition::up(1.4, "w"),
    ];
    let input = frames(&[0.0, 0.5, 1.0, 1.5, 2.0]);
    let config = MergeConfig::new(0.5);

    let first = merge_streams(&events, input.clone(), &config).unwrap();
    let second = merge_streams(&events, input, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn average_fps_matches_retained_span() {
    let items = merge_streams(&[], frames(&[0.0, 0.5, 1.0, 1.5, 2.0]), &MergeConfig::new(0.0))
        .unwrap();
    let fps = average_fps(&items).unwrap();
    assert!((fps - 2.0).abs() < 1e-9);
}

mod properties {
    use super::*;
    use playtrace_sync_core::ReleasePolicy;
    use proptest::prelude::*;

    /// Sorted frame timestamps in [0, 10).
    fn frame_times() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0f64..10.0, 0..40).prop_map(|mut times| {
            times.sort_by(f64::total_cmp);
            times
        })
    }

    /// Sorted key transitions over a tiny key alphabet.
    fn transitions() -> impl Strategy<Value = Vec<KeyTransition>> {
        prop::collection::vec(
            (0.0f64..10.0, prop::sample::select(vec!["w", "a", "s", "d"]), any::<bool>()),
            0..60,
        )
        .prop_map(|mut raw| {
            raw.sort_by(|x, y| x.0.total_cmp(&y.0));
            raw.into_iter()
                .map(|(t, key, down)| {
                    if down {
                        KeyTransition::down(t, key)
                    } else {
                        KeyTransition::up(t, key)
                    }
                })
                .collect()
        })
    }

    /// Reference reconstruction: fold every transition strictly earlier
    /// than `at` into a set, ignoring unmatched releases.
    fn replay(events: &[KeyTransition], at: f64) -> Vec<String> {
        let mut active: BTreeSet<String> = BTreeSet::new();
        for event in events.iter().filter(|e| e.timestamp_secs < at) {
            if event.is_down() {
                active.insert(event.key.clone());
            } else {
                active.remove(&event.key);
            }
        }
        active.into_iter().collect()
    }

    proptest! {
        #[test]
        fn output_never_exceeds_retained_frame_count(
            times in frame_times(),
            events in transitions(),
            tail in 0.0f64..5.0,
        ) {
            let input = frames(&times);
            let items = merge_streams(&events, input, &MergeConfig::new(tail)).unwrap();

            let cutoff = times.last().copied().unwrap_or(0.0) - tail;
            let retained = times.iter().filter(|&&t| t <= cutoff).count();
            prop_assert!(items.len() <= retained);
        }

        #[test]
        fn every_row_matches_replayed_key_state(
            times in frame_times(),
            events in transitions(),
        ) {
            let input = frames(&times);
            let items = merge_streams(&events, input, &MergeConfig::new(0.0)).unwrap();

            for item in &items {
                prop_assert_eq!(item.keys.clone(), replay(&events, item.timestamp_secs));
            }
        }

        #[test]
        fn rerunning_the_merge_is_identical(
            times in frame_times(),
            events in transitions(),
            tail in 0.0f64..5.0,
        ) {
            let config = MergeConfig {
                discard_tail_secs: tail,
                release_policy: ReleasePolicy::Ignore,
            };
            let first = merge_streams(&events, frames(&times), &config).unwrap();
            let second = merge_streams(&events, frames(&times), &config).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
