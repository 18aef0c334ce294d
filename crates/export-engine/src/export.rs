//! Session export: one directory per session holding every artifact.

use std::path::{Path, PathBuf};

use playtrace_common::error::{PlaytraceError, PlaytraceResult};
use playtrace_dataset_model::{dataset_span_secs, DatasetItem, FrameGeometry, KeyEncoder};
use playtrace_sync_core::average_fps;
use serde::{Deserialize, Serialize};

use crate::arrays::{write_frame_stack, write_key_stack};
use crate::video::{ffmpeg_available, write_video};

pub const SCREENS_FILENAME: &str = "screens.npy";
pub const KEYS_FILENAME: &str = "keys.npy";
pub const VIDEO_FILENAME: &str = "session.mp4";
pub const META_FILENAME: &str = "meta.json";

/// Sidecar metadata describing one exported session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Wall-clock export time (ISO 8601).
    pub created: String,

    /// Number of dataset rows.
    pub items: usize,

    /// First-to-last frame span in seconds.
    pub duration_secs: f64,

    /// Derived average frame rate used for the video.
    pub average_fps: f64,

    /// Component order of each row in `keys.npy`.
    pub key_order: Vec<String>,

    /// Frame geometry of every row in `screens.npy`.
    pub frame: FrameGeometry,
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportedSession {
    pub dir: PathBuf,
    pub items: usize,
    pub average_fps: f64,
}

/// Writes merged session datasets under one output root, one
/// timestamped directory per session.
pub struct SessionExporter {
    output_root: PathBuf,
}

impl SessionExporter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// Export one session. The caller has already decided the session is
    /// worth keeping; an empty dataset here is an error, not a skip.
    pub fn export(
        &self,
        items: &[DatasetItem],
        encoder: &KeyEncoder,
    ) -> PlaytraceResult<ExportedSession> {
        let first = items.first().ok_or(PlaytraceError::EmptySession)?;

        // Derive the rate before touching the filesystem: a degenerate
        // dataset must not leave a half-written session directory.
        let fps = average_fps(items)?;

        if !ffmpeg_available() {
            return Err(PlaytraceError::unsupported(
                "No video encoder found (expected ffmpeg in PATH)",
            ));
        }

        let dir = self.session_dir()?;
        write_frame_stack(&dir.join(SCREENS_FILENAME), items)?;
        write_key_stack(&dir.join(KEYS_FILENAME), items, encoder)?;
        write_video(&dir.join(VIDEO_FILENAME), items, fps)?;

        let meta = SessionMeta {
            created: chrono::Utc::now().to_rfc3339(),
            items: items.len(),
            duration_secs: dataset_span_secs(items),
            average_fps: fps,
            key_order: encoder.order().to_vec(),
            frame: first.frame.geometry(),
        };
        std::fs::write(
            dir.join(META_FILENAME),
            serde_json::to_string_pretty(&meta)?,
        )?;

        tracing::info!(
            dir = %dir.display(),
            items = items.len(),
            average_fps = fps,
            "Session exported"
        );

        Ok(ExportedSession {
            dir,
            items: items.len(),
            average_fps: fps,
        })
    }

    /// Allocate a fresh timestamped session directory, suffixing if two
    /// sessions land within the same second.
    fn session_dir(&self) -> PlaytraceResult<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let mut dir = self.output_root.join(&stamp);
        let mut attempt = 1u32;
        while dir.exists() {
            dir = self.output_root.join(format!("{stamp}-{attempt}"));
            attempt += 1;
        }
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Load the metadata sidecar from an exported session directory.
pub fn load_meta(dir: &Path) -> PlaytraceResult<SessionMeta> {
    let path = dir.join(META_FILENAME);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        PlaytraceError::export(format!("Failed to read {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playtrace_dataset_model::{key_set, FrameBuffer};

    #[test]
    fn test_empty_dataset_is_an_error_here() {
        let exporter = SessionExporter::new(std::env::temp_dir());
        let encoder = KeyEncoder::new(&key_set(["w"]));
        let err = exporter.export(&[], &encoder).unwrap_err();
        assert!(matches!(err, PlaytraceError::EmptySession));
    }

    #[test]
    fn test_single_item_dataset_is_degenerate_not_empty() {
        let exporter = SessionExporter::new(std::env::temp_dir());
        let encoder = KeyEncoder::new(&key_set(["w"]));
        let items = vec![DatasetItem::new(
            0.0,
            FrameBuffer::filled(2, 2, [0, 0, 0]),
            Vec::new(),
        )];
        let err = exporter.export(&items, &encoder).unwrap_err();
        assert!(matches!(err, PlaytraceError::DegenerateRate { items: 1 }));
    }

    #[test]
    fn test_meta_roundtrip() {
        let meta = SessionMeta {
            created: "2026-01-01T00:00:00Z".to_string(),
            items: 42,
            duration_secs: 1.4,
            average_fps: 29.3,
            key_order: vec!["a".to_string(), "w".to_string()],
            frame: FrameGeometry {
                width: 320,
                height: 240,
            },
        };
        let json = serde_json::to_string(&meta).unwrap();
        let parsed: SessionMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.items, 42);
        assert_eq!(parsed.key_order, meta.key_order);
        assert_eq!(parsed.frame, meta.frame);
    }
}
