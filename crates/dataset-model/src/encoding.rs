//! One-hot key vectors for model training.
//!
//! Each dataset row's held-key set is encoded as an `f32` vector over a
//! fixed key order, so stacked rows form the label tensor consumed by
//! the downstream classifier. The order is the sorted recording key
//! set and is written into the export metadata; decoding depends on
//! the same order being used on both sides.

use crate::event::KeySet;

/// Encodes key sets as one-hot vectors over a stable key order.
#[derive(Debug, Clone)]
pub struct KeyEncoder {
    order: Vec<String>,
}

impl KeyEncoder {
    /// Build an encoder over the given recording key set. Iteration
    /// order of the set (sorted) becomes the vector component order.
    pub fn new(keys: &KeySet) -> Self {
        Self {
            order: keys.iter().cloned().collect(),
        }
    }

    /// The key order backing each vector component.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Number of components in each encoded vector.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Encode a held-key list as a one-hot vector. Keys outside the
    /// recording set are ignored.
    pub fn encode(&self, held: &[String]) -> Vec<f32> {
        self.order
            .iter()
            .map(|key| if held.iter().any(|h| h == key) { 1.0 } else { 0.0 })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::key_set;

    #[test]
    fn test_order_is_sorted() {
        let encoder = KeyEncoder::new(&key_set(["w", "a", "s", "d"]));
        assert_eq!(encoder.order(), &["a", "d", "s", "w"]);
    }

    #[test]
    fn test_encode() {
        let encoder = KeyEncoder::new(&key_set(["w", "a", "s", "d"]));
        let vector = encoder.encode(&["w".to_string(), "d".to_string()]);
        assert_eq!(vector, vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encode_empty_held_set() {
        let encoder = KeyEncoder::new(&key_set(["w", "a"]));
        assert_eq!(encoder.encode(&[]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let encoder = KeyEncoder::new(&key_set(["w"]));
        let vector = encoder.encode(&["q".to_string(), "w".to_string()]);
        assert_eq!(vector, vec![1.0]);
    }
}
