//! Average frame rate derivation for export.
//!
//! The export rate is derived from the retained dataset, not the
//! nominal capture rate: the backend rarely hits its target exactly,
//! and encoding the video at the nominal rate would drift.

use playtrace_common::error::{PlaytraceError, PlaytraceResult};
use playtrace_dataset_model::DatasetItem;

/// Average frame rate over the retained dataset: `(n - 1)` intervals
/// spread across the first-to-last timestamp span.
///
/// Fewer than two items, or a non-positive span, leaves no interval to
/// average and returns [`PlaytraceError::DegenerateRate`], a distinct
/// condition from the empty "discard this session" outcome, which the
/// caller is expected to have handled before asking for a rate.
pub fn average_fps(items: &[DatasetItem]) -> PlaytraceResult<f64> {
    if items.len() < 2 {
        return Err(PlaytraceError::DegenerateRate { items: items.len() });
    }

    let span = items[items.len() - 1].timestamp_secs - items[0].timestamp_secs;
    if span <= 0.0 || !span.is_finite() {
        return Err(PlaytraceError::DegenerateRate { items: items.len() });
    }

    Ok((items.len() - 1) as f64 / span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playtrace_dataset_model::FrameBuffer;

    fn item(t: f64) -> DatasetItem {
        DatasetItem::new(t, FrameBuffer::filled(1, 1, [0, 0, 0]), Vec::new())
    }

    #[test]
    fn test_average_fps() {
        // 4 intervals over 2 seconds = 2 fps
        let items: Vec<_> = [0.0, 0.5, 1.0, 1.5, 2.0].iter().map(|&t| item(t)).collect();
        let fps = average_fps(&items).unwrap();
        assert!((fps - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_is_degenerate() {
        let err = average_fps(&[]).unwrap_err();
        assert!(matches!(err, PlaytraceError::DegenerateRate { items: 0 }));
    }

    #[test]
    fn test_single_item_is_degenerate() {
        let err = average_fps(&[item(1.0)]).unwrap_err();
        assert!(matches!(err, PlaytraceError::DegenerateRate { items: 1 }));
    }

    #[test]
    fn test_zero_span_is_degenerate() {
        let err = average_fps(&[item(1.0), item(1.0)]).unwrap_err();
        assert!(matches!(err, PlaytraceError::DegenerateRate { items: 2 }));
    }
}
