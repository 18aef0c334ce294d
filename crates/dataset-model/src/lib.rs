//! Playtrace Dataset Model
//!
//! Defines the core data contracts for Playtrace datasets:
//! - **Events:** Timestamped keyboard transitions (down/up)
//! - **Frames:** Timestamped RGB screen captures
//! - **Dataset:** Aligned frame + held-keys rows produced by the merge
//! - **Encoding:** Stable one-hot key vectors for model training
//!
//! All timestamps are fractional seconds measured against one monotonic
//! session epoch, so events and frames from different producers compare
//! directly.

pub mod dataset;
pub mod encoding;
pub mod event;
pub mod frame;

pub use dataset::*;
pub use encoding::*;
pub use event::*;
pub use frame::*;
