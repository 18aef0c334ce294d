//! Aligned dataset rows: one frame plus the keys held at its timestamp.

use crate::event::TimestampSecs;
use crate::frame::FrameBuffer;

/// One row of the aligned training dataset.
///
/// `keys` holds the keys that were down strictly before this frame's
/// timestamp. Order carries no meaning; the merge emits it sorted so
/// equal inputs produce byte-identical output.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetItem {
    /// Timestamp of the underlying frame.
    pub timestamp_secs: TimestampSecs,

    /// The captured frame.
    pub frame: FrameBuffer,

    /// Key codes held down at this frame.
    pub keys: Vec<String>,
}

impl DatasetItem {
    pub fn new(
        timestamp_secs: TimestampSecs,
        frame: FrameBuffer,
        keys: Vec<String>,
    ) -> Self {
        Self {
            timestamp_secs,
            frame,
            keys,
        }
    }

    /// Whether the given key was held at this frame.
    pub fn holds(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// Total time span covered by a dataset, first to last retained frame.
pub fn dataset_span_secs(items: &[DatasetItem]) -> f64 {
    match (items.first(), items.last()) {
        (Some(first), Some(last)) => last.timestamp_secs - first.timestamp_secs,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameBuffer;

    fn item(t: f64, keys: &[&str]) -> DatasetItem {
        DatasetItem::new(
            t,
            FrameBuffer::filled(1, 1, [0, 0, 0]),
            keys.iter().map(|k| k.to_string()).collect(),
        )
    }

    #[test]
    fn test_holds() {
        let row = item(0.0, &["w", "a"]);
        assert!(row.holds("w"));
        assert!(!row.holds("s"));
    }

    #[test]
    fn test_span() {
        let items = vec![item(1.0, &[]), item(2.5, &[]), item(4.0, &[])];
        assert!((dataset_span_secs(&items) - 3.0).abs() < 1e-9);
        assert_eq!(dataset_span_secs(&[]), 0.0);
    }
}
