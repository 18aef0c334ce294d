//! Playtrace Export Engine
//!
//! Persists a merged session dataset to disk:
//! - `screens.npy` — stacked RGB frames, `[n, h, w, 3]` u8
//! - `keys.npy` — stacked one-hot key vectors, `[n, k]` f32
//! - `session.mp4` — video encoded at the session's derived average rate
//! - `meta.json` — counts, duration, rate, key order, geometry
//!
//! The exporter is a sink: it consumes the aligned rows the sync core
//! produced and decides formats on its own.

pub mod arrays;
pub mod export;
pub mod video;

pub use export::{ExportedSession, SessionExporter, SessionMeta};
