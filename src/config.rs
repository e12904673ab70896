//! Runtime configuration

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};

/// Parameters of the scene-score segmentation algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Sample every n-th frame when scoring a video
    pub step_frames: u32,

    /// Median window radius in samples (0 disables smoothing)
    pub smooth_radius: usize,

    /// Most sensitive threshold, and the calibration fallback
    pub min_threshold: f64,

    /// Least sensitive threshold calibration may reach
    pub max_threshold: f64,

    /// Calibration increment; `None` steps by `min_threshold`
    pub threshold_step: Option<f64>,

    /// A motionless run longer than this anchors the calibration
    pub test_duration_secs: f64,

    /// Samples in a row above threshold that trigger a motion start
    pub start_run: usize,

    /// Samples in a row below threshold that trigger a motion end
    pub end_run: usize,

    /// Keep copying if the next start trigger follows within this gap
    pub min_copy_break_secs: f64,

    /// Do not look for motion this long after the file start
    pub ignore_start_secs: f64,

    /// Do not look for motion this long before the file end
    pub ignore_end_secs: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            step_frames: 20,
            smooth_radius: 0,
            min_threshold: 0.0095,
            max_threshold: 0.04,
            threshold_step: None,
            test_duration_secs: 7.0,
            start_run: 2,
            end_run: 10,
            min_copy_break_secs: 4.9,
            ignore_start_secs: 2.0,
            ignore_end_secs: 2.0,
        }
    }
}

impl DetectionConfig {
    /// Calibration increment actually used
    pub fn step(&self) -> f64 {
        self.threshold_step.unwrap_or(self.min_threshold)
    }

    /// Samples needed after a frame before it can be classified
    pub fn lookahead(&self) -> usize {
        self.start_run.max(self.end_run)
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_frames == 0 {
            return Err(MotionError::config("step_frames must be at least 1"));
        }
        if self.start_run == 0 || self.end_run == 0 {
            return Err(MotionError::config(
                "start_run and end_run must be at least 1",
            ));
        }
        if !(self.min_threshold > 0.0) {
            return Err(MotionError::config("min_threshold must be positive"));
        }
        if self.max_threshold < self.min_threshold {
            return Err(MotionError::config(format!(
                "max_threshold ({}) is below min_threshold ({})",
                self.max_threshold, self.min_threshold
            )));
        }
        if let Some(step) = self.threshold_step {
            if !(step > 0.0) {
                return Err(MotionError::config("threshold_step must be positive"));
            }
        }
        non_negative("test_duration_secs", self.test_duration_secs)?;
        non_negative("min_copy_break_secs", self.min_copy_break_secs)?;
        non_negative("ignore_start_secs", self.ignore_start_secs)?;
        non_negative("ignore_end_secs", self.ignore_end_secs)?;
        Ok(())
    }
}

/// Pre-roll and post-roll padding around each detected segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginConfig {
    /// Seconds added before the motion start
    pub before_secs: f64,

    /// Seconds added after the motion end
    pub after_secs: f64,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            before_secs: 2.5,
            after_secs: 2.0,
        }
    }
}

impl MarginConfig {
    pub fn validate(&self) -> Result<()> {
        non_negative("before_secs", self.before_secs)?;
        non_negative("after_secs", self.after_secs)
    }
}

/// Reporting and extraction behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Decimals after the seconds in printed timestamps
    pub timestamp_decimals: usize,

    /// Dump the per-frame score table
    pub print_scores: bool,

    /// Cut the clips instead of only printing the extraction command
    pub copy: bool,

    /// Emit reports as JSON
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            timestamp_decimals: 0,
            print_scores: false,
            copy: false,
            json: false,
        }
    }
}

/// External ffmpeg binary settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Binary name or path
    pub binary: String,

    /// Value passed to `-loglevel`
    pub log_level: String,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            log_level: "error".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Detection parameters
    pub detection: DetectionConfig,

    /// Margin parameters
    pub margins: MarginConfig,

    /// Output parameters
    pub output: OutputConfig,

    /// ffmpeg parameters
    pub ffmpeg: FfmpegConfig,

    /// Files processed concurrently
    pub jobs: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            margins: MarginConfig::default(),
            output: OutputConfig::default(),
            ffmpeg: FfmpegConfig::default(),
            jobs: 1,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Check every parameter before any file session starts
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.margins.validate()?;
        if self.jobs == 0 {
            return Err(MotionError::config("jobs must be at least 1"));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    // NaN fails this comparison too.
    if value >= 0.0 {
        Ok(())
    } else {
        Err(MotionError::config(format!(
            "{} must be non-negative, got {}",
            name, value
        )))
    }
}
