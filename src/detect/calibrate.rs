//! Adaptive threshold calibration
//!
//! Busy footage may never stay below the most sensitive threshold for long.
//! The threshold is raised step by step until at least one motionless run
//! longer than the test duration exists, and falls back to the minimum when
//! even the maximum does not produce one.

use serde::Serialize;

/// Tolerance when comparing accumulated candidates against the maximum
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Outcome of calibrating one file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Calibration {
    /// Threshold to use for the rest of the session
    pub threshold: f64,
    /// Candidate thresholds evaluated
    pub attempts: usize,
    /// No candidate passed and the minimum was used
    pub fell_back: bool,
}

/// Calibration bounds
#[derive(Debug, Clone, Copy)]
pub struct CalibrationParams {
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub step: f64,
    pub test_duration_secs: f64,
}

/// Longest span of presentation time, first to last frame, over which every
/// smoothed score stays below `threshold`.
pub fn longest_motionless_run(times: &[f64], scores: &[f64], threshold: f64) -> f64 {
    let mut longest = 0.0_f64;
    let mut run_start: Option<f64> = None;

    for (&time, &score) in times.iter().zip(scores) {
        if score < threshold {
            let start = *run_start.get_or_insert(time);
            longest = longest.max(time - start);
        } else {
            run_start = None;
        }
    }

    longest
}

/// Pick the lowest candidate threshold whose longest motionless run exceeds
/// the test duration.
pub fn calibrate(times: &[f64], scores: &[f64], params: &CalibrationParams) -> Calibration {
    let mut attempts = 0;

    for k in 0.. {
        let candidate = params.min_threshold + k as f64 * params.step;
        if candidate > params.max_threshold + THRESHOLD_EPSILON || (k > 0 && params.step <= 0.0) {
            break;
        }
        attempts += 1;

        let longest = longest_motionless_run(times, scores, candidate);
        tracing::debug!(
            threshold = candidate,
            longest_motionless_secs = longest,
            "calibration attempt"
        );
        if longest > params.test_duration_secs {
            return Calibration {
                threshold: candidate,
                attempts,
                fell_back: false,
            };
        }
    }

    tracing::warn!(
        "No motionless run longer than {}s at any threshold up to {}; using {}",
        params.test_duration_secs,
        params.max_threshold,
        params.min_threshold
    );
    Calibration {
        threshold: params.min_threshold,
        attempts,
        fell_back: true,
    }
}
