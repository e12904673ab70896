//! Parser for ffmpeg `metadata=print` output
//!
//! Each sampled frame produces a header line followed by its metadata keys:
//!
//! ```text
//! frame:12   pts:240240  pts_time:8.008
//! lavfi.scene_score=0.013287
//! ```
//!
//! Records that are malformed or lack a score are skipped with a warning.

use crate::types::ScoreSample;

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// Samples recovered from a score dump
#[derive(Debug, Clone, Default)]
pub struct ParsedScores {
    pub samples: Vec<ScoreSample>,
    /// Records dropped because they could not be parsed
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
struct Header {
    index: u64,
    pts: i64,
    time_secs: f64,
    line: usize,
}

/// Parse the text written by `metadata=print:file=...`.
pub fn parse_scores(text: &str) -> ParsedScores {
    let mut parsed = ParsedScores::default();
    let mut pending: Option<Header> = None;

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        let line_no = n + 1;

        if line.starts_with("frame:") {
            if let Some(h) = pending.take() {
                tracing::warn!("score record at line {} has no scene score, skipped", h.line);
                parsed.skipped += 1;
            }
            match parse_header(line, line_no) {
                Some(h) => pending = Some(h),
                None => {
                    tracing::warn!("malformed frame header at line {}: {:?}", line_no, line);
                    parsed.skipped += 1;
                }
            }
            continue;
        }

        let Some(caps) = regex!(r"^lavfi\.scene_score=(\S*)$").captures(line) else {
            continue;
        };
        let Some(h) = pending.take() else {
            tracing::warn!("scene score without frame header at line {}", line_no);
            parsed.skipped += 1;
            continue;
        };
        match caps[1].parse::<f64>() {
            Ok(score) if score.is_finite() && score >= 0.0 => parsed.samples.push(ScoreSample {
                index: h.index,
                pts: h.pts,
                time_secs: h.time_secs,
                score,
            }),
            _ => {
                tracing::warn!("invalid scene score at line {}: {:?}", line_no, &caps[1]);
                parsed.skipped += 1;
            }
        }
    }

    if let Some(h) = pending {
        tracing::warn!("score record at line {} has no scene score, skipped", h.line);
        parsed.skipped += 1;
    }

    parsed
}

fn parse_header(line: &str, line_no: usize) -> Option<Header> {
    let caps = regex!(r"^frame:\s*(\d+)\s+pts:\s*(-?\d+)\s+pts_time:\s*(\S+)$").captures(line)?;
    let time_secs: f64 = caps[3].parse().ok()?;
    if !time_secs.is_finite() {
        return None;
    }
    Some(Header {
        index: caps[1].parse().ok()?,
        pts: caps[2].parse().ok()?,
        time_secs,
        line: line_no,
    })
}
