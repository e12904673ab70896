//! Motion detection module
//!
//! Turns a scene-score series into motion segments:
//! - Median smoothing of raw scores
//! - Per-file threshold calibration
//! - Start/end trigger classification
//! - Copy-mark state machine
//! - Margin padding

pub mod builder;
pub mod calibrate;
pub mod margin;
pub mod session;
pub mod smoother;
pub mod trigger;

pub use calibrate::Calibration;
pub use session::{FileSession, SessionResult};
