//! Segment reporting
//!
//! Renders session results as the clip table, the per-frame score dump, the
//! extraction request and JSON records.

pub mod request;
pub mod timestamp;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::detect::SessionResult;
use crate::types::Segment;

pub use request::ExtractionRequest;
pub use timestamp::format_timestamp;

/// Final state of one processed file
#[derive(Debug)]
pub enum FileOutcome {
    /// At least one segment was found
    Segments(SessionResult),
    /// The file was analysed but nothing moved
    NoMotion(SessionResult),
    /// Scoring or detection failed for this file only
    Failed(String),
}

impl FileOutcome {
    pub fn from_result(result: SessionResult) -> Self {
        if result.has_motion() {
            FileOutcome::Segments(result)
        } else {
            FileOutcome::NoMotion(result)
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed(_))
    }

    pub fn session(&self) -> Option<&SessionResult> {
        match self {
            FileOutcome::Segments(r) | FileOutcome::NoMotion(r) => Some(r),
            FileOutcome::Failed(_) => None,
        }
    }
}

/// Extraction request for a file with motion
pub fn extraction_request(video: &Path, result: &SessionResult, decimals: usize) -> Option<ExtractionRequest> {
    if !result.has_motion() {
        return None;
    }
    Some(ExtractionRequest::new(video, result.segments.clone(), decimals))
}

/// Threshold line, clip count and the numbered clip table.
pub fn render_clip_table(result: &SessionResult, decimals: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Threshold: {}\n", result.calibration.threshold));
    out.push_str(&format!("Clips: {}\n", result.segments.len()));
    if result.segments.is_empty() {
        out.push_str(" No motion segment found\n");
        return out;
    }

    out.push_str("Nr      Start       End  Duration\n");
    for (i, s) in result.segments.iter().enumerate() {
        out.push_str(&format!(
            "{:<3}{:>10}{:>10}{:>10}\n",
            i + 1,
            format_timestamp(s.start, decimals),
            format_timestamp(s.end, decimals),
            format_timestamp(s.duration(), decimals)
        ));
    }
    out
}

/// Semicolon separated per-frame table for tuning the detection parameters.
pub fn render_score_dump(result: &SessionResult) -> String {
    let mut out = String::from("Frame;Time;Score;Median;Change;Trigger;Copy\n");
    for f in &result.frames {
        out.push_str(&format!(
            "{};{:.4};{:.4};{:.4};{};{};{}\n",
            f.index,
            f.time_secs,
            f.raw_score,
            f.median_score,
            u8::from(f.is_change),
            f.trigger.as_i8(),
            f.copy_mark.as_i8()
        ));
    }
    out
}

/// Machine-readable summary of one file
#[derive(Debug, Clone, Serialize)]
pub struct ReportRecord {
    pub input: PathBuf,
    pub status: &'static str,
    pub session_id: Option<String>,
    pub threshold: Option<f64>,
    pub calibration_fell_back: Option<bool>,
    pub duration_secs: Option<f64>,
    pub segments: Vec<Segment>,
    pub ranges: Vec<String>,
    pub error: Option<String>,
}

impl ReportRecord {
    pub fn new(video: &Path, outcome: &FileOutcome, decimals: usize) -> Self {
        let status = match outcome {
            FileOutcome::Segments(_) => "segments",
            FileOutcome::NoMotion(_) => "no_motion",
            FileOutcome::Failed(_) => "failed",
        };
        let session = outcome.session();
        let ranges = session
            .and_then(|r| extraction_request(video, r, decimals))
            .map(|req| req.range_args())
            .unwrap_or_default();

        Self {
            input: video.to_path_buf(),
            status,
            session_id: session.map(|r| r.session_id.clone()),
            threshold: session.map(|r| r.calibration.threshold),
            calibration_fell_back: session.map(|r| r.calibration.fell_back),
            duration_secs: session.map(|r| r.duration_secs),
            segments: session.map(|r| r.segments.clone()).unwrap_or_default(),
            ranges,
            error: match outcome {
                FileOutcome::Failed(e) => Some(e.clone()),
                _ => None,
            },
        }
    }
}
