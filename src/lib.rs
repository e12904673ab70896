//! Motion detection for recorded video
//!
//! Reads per-frame scene-change scores produced by ffmpeg, finds the time
//! ranges where something moves and turns them into lossless clip
//! extraction requests.

pub mod batch;
pub mod config;
pub mod config_file;
pub mod cutter;
pub mod detect;
pub mod error;
pub mod report;
pub mod scores;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use batch::{BatchRunner, FileReport};
pub use config::{AppConfig, DetectionConfig, MarginConfig};
pub use detect::{FileSession, SessionResult};
pub use error::{MotionError, Result};
pub use report::{ExtractionRequest, FileOutcome};
pub use scores::ScoreInput;
pub use types::{CopyMark, FrameRecord, ScoreSample, Segment, Trigger};
