//! Key transition events for the Playtrace capture stream.
//!
//! Events can be logged in append-only JSONL format for inspection and
//! replay. Timestamps are fractional seconds since the session epoch,
//! already including the configured hook-delay offset.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Timestamp in fractional seconds since session start.
pub type TimestampSecs = f64;

/// The set of key codes subscribed to during a session.
///
/// A `BTreeSet` keeps membership checks cheap and iteration order
/// stable, which the one-hot encoder relies on.
pub type KeySet = BTreeSet<String>;

/// Build a [`KeySet`] from anything yielding key-code strings.
pub fn key_set<I, S>(keys: I) -> KeySet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}

/// Key transition direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Down,
    Up,
}

/// A single recorded key transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyTransition {
    /// Fractional seconds since session start, delay-compensated.
    #[serde(rename = "t")]
    pub timestamp_secs: TimestampSecs,

    /// Key code (e.g., "w", "space", "left").
    pub key: String,

    /// Press or release.
    pub state: KeyState,
}

impl KeyTransition {
    /// Create a press transition.
    pub fn down(timestamp_secs: TimestampSecs, key: impl Into<String>) -> Self {
        Self {
            timestamp_secs,
            key: key.into(),
            state: KeyState::Down,
        }
    }

    /// Create a release transition.
    pub fn up(timestamp_secs: TimestampSecs, key: impl Into<String>) -> Self {
        Self {
            timestamp_secs,
            key: key.into(),
            state: KeyState::Up,
        }
    }

    /// Whether this transition is a press.
    pub fn is_down(&self) -> bool {
        self.state == KeyState::Down
    }
}

/// Parse transitions from JSONL content (one JSON object per line).
pub fn parse_transitions(jsonl: &str) -> Result<Vec<KeyTransition>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize transitions to JSONL format.
pub fn serialize_transitions(events: &[KeyTransition]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}

/// Check that a transition sequence is non-decreasing in timestamp.
///
/// Producer append order is defined as delivery order; the merge
/// depends on delivery order being non-decreasing in timestamp.
pub fn is_time_ordered(events: &[KeyTransition]) -> bool {
    events
        .windows(2)
        .all(|pair| pair[0].timestamp_secs <= pair[1].timestamp_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_roundtrip() {
        let event = KeyTransition::down(1.25, "w");
        let json = serde_json::to_string(&event).unwrap();
        let parsed: KeyTransition = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }

    #[test]
    fn test_json_format() {
        let event = KeyTransition::up(2.5, "space");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"t\":2.5"));
        assert!(json.contains("\"key\":\"space\""));
        assert!(json.contains("\"state\":\"up\""));
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let events = vec![
            KeyTransition::down(0.1, "w"),
            KeyTransition::down(0.2, "a"),
            KeyTransition::up(0.9, "w"),
        ];
        let jsonl = serialize_transitions(&events).unwrap();
        let parsed = parse_transitions(&jsonl).unwrap();
        assert_eq!(events, parsed);
    }

    #[test]
    fn test_parse_skips_comment_lines() {
        let jsonl = "# session header\n{\"t\":0.5,\"key\":\"w\",\"state\":\"down\"}\n";
        let parsed = parse_transitions(jsonl).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].key, "w");
    }

    #[test]
    fn test_time_ordering_check() {
        let ordered = vec![KeyTransition::down(0.0, "w"), KeyTransition::up(1.0, "w")];
        assert!(is_time_ordered(&ordered));

        let unordered = vec![KeyTransition::down(1.0, "w"), KeyTransition::up(0.0, "w")];
        assert!(!is_time_ordered(&unordered));
    }

    #[test]
    fn test_key_set_deduplicates() {
        let keys = key_set(["w", "a", "w"]);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("w"));
    }
}
