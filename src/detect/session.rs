//! One detection run over one file's score series

use serde::Serialize;
use uuid::Uuid;

use crate::config::{DetectionConfig, MarginConfig};
use crate::error::{MotionError, Result};
use crate::types::{FrameRecord, ScoreSample, Segment};

use super::builder::{build_marks, pair_marks, BuilderParams};
use super::calibrate::{calibrate, Calibration, CalibrationParams};
use super::margin::apply_margins;
use super::smoother::median_scores;
use super::trigger::{classify, scan_limit};

/// Everything a session derived from its series
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    pub session_id: String,
    pub input: String,
    pub calibration: Calibration,
    /// Time of the last sampled frame
    pub duration_secs: f64,
    #[serde(skip)]
    pub frames: Vec<FrameRecord>,
    /// Detected segments before margins
    pub motion: Vec<Segment>,
    /// Segments after margins, ready for extraction
    pub segments: Vec<Segment>,
}

impl SessionResult {
    pub fn has_motion(&self) -> bool {
        !self.segments.is_empty()
    }
}

/// Per-file detection state. Owns its own threshold; nothing is shared
/// between sessions.
#[derive(Debug, Clone)]
pub struct FileSession {
    id: Uuid,
    input: String,
    detection: DetectionConfig,
    margins: MarginConfig,
}

impl FileSession {
    pub fn new(input: impl Into<String>, detection: DetectionConfig, margins: MarginConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            input: input.into(),
            detection,
            margins,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Calibrate a threshold for the series, then detect segments with it.
    pub fn run(&self, samples: &[ScoreSample]) -> Result<SessionResult> {
        check_ordering(samples)?;
        let times: Vec<f64> = samples.iter().map(|s| s.time_secs).collect();
        let raw: Vec<f64> = samples.iter().map(|s| s.score).collect();
        let medians = median_scores(&raw, self.detection.smooth_radius);

        let calibration = calibrate(
            &times,
            &medians,
            &CalibrationParams {
                min_threshold: self.detection.min_threshold,
                max_threshold: self.detection.max_threshold,
                step: self.detection.step(),
                test_duration_secs: self.detection.test_duration_secs,
            },
        );

        self.detect(samples, &times, &medians, calibration)
    }

    /// Detect segments with a fixed threshold, skipping calibration.
    pub fn run_with_threshold(&self, samples: &[ScoreSample], threshold: f64) -> Result<SessionResult> {
        check_ordering(samples)?;
        let times: Vec<f64> = samples.iter().map(|s| s.time_secs).collect();
        let raw: Vec<f64> = samples.iter().map(|s| s.score).collect();
        let medians = median_scores(&raw, self.detection.smooth_radius);

        let calibration = Calibration {
            threshold,
            attempts: 0,
            fell_back: false,
        };
        self.detect(samples, &times, &medians, calibration)
    }

    fn detect(
        &self,
        samples: &[ScoreSample],
        times: &[f64],
        medians: &[f64],
        calibration: Calibration,
    ) -> Result<SessionResult> {
        let threshold = calibration.threshold;
        let d = &self.detection;

        let triggers = classify(medians, threshold, d.start_run, d.end_run);
        let limit = scan_limit(samples.len(), d.start_run, d.end_run);
        let marks = build_marks(
            times,
            &triggers,
            limit,
            &BuilderParams {
                ignore_start_secs: d.ignore_start_secs,
                ignore_end_secs: d.ignore_end_secs,
                min_copy_break_secs: d.min_copy_break_secs,
            },
        );
        let motion = pair_marks(times, &marks)?;

        let duration_secs = times.last().copied().unwrap_or(0.0);
        let segments = apply_margins(&motion, &self.margins, duration_secs);

        let frames = samples
            .iter()
            .zip(medians)
            .zip(triggers.iter().zip(&marks))
            .map(|((s, &median), (&trigger, &copy_mark))| FrameRecord {
                index: s.index,
                pts: s.pts,
                time_secs: s.time_secs,
                raw_score: s.score,
                median_score: median,
                is_change: median >= threshold,
                trigger,
                copy_mark,
            })
            .collect();

        tracing::debug!(
            session = %self.id,
            input = %self.input,
            threshold,
            frames = samples.len(),
            segments = segments.len(),
            "detection finished"
        );

        Ok(SessionResult {
            session_id: self.id.to_string(),
            input: self.input.clone(),
            calibration,
            duration_secs,
            frames,
            motion,
            segments,
        })
    }
}

/// Presentation times must never go backwards.
fn check_ordering(samples: &[ScoreSample]) -> Result<()> {
    for (i, pair) in samples.windows(2).enumerate() {
        if pair[1].time_secs < pair[0].time_secs {
            return Err(MotionError::invariant(format!(
                "sample {} at {:.3}s comes before the previous sample at {:.3}s",
                i + 1,
                pair[1].time_secs,
                pair[0].time_secs
            )));
        }
    }
    Ok(())
}
