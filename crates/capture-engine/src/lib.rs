//! Playtrace Capture Engine
//!
//! Runs the live half of a recording session: two producers append to
//! their own buffers until one shared stop signal fires, then the
//! session joins both and hands the finished sequences downstream.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │               CaptureSession                   │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────────┐  │
//! │  │ Frame    │  │ Key      │  │ Finish       │  │
//! │  │ capture  │  │ capture  │  │ watcher      │  │
//! │  └─────┬────┘  └─────┬────┘  └──────┬───────┘  │
//! │        │             │              │ sets     │
//! │        ▼             ▼              ▼          │
//! │   Vec<ScreenFrame>  Vec<KeyTransition>  StopSignal
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Each producer owns its accumulation buffer exclusively; the stop
//! signal is the only shared state. The frame and key sequences are
//! merged strictly after both producers have returned (see
//! `playtrace-sync-core`).

pub mod backend;
pub mod session;
pub mod signal;

pub use session::*;
pub use signal::StopSignal;
