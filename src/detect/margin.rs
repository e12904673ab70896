use crate::config::MarginConfig;
use crate::types::Segment;

/// Pad every segment with the configured pre-roll and post-roll, clamped to
/// `[0, file_duration]`. Touching or overlapping results are left as they are.
pub fn apply_margins(segments: &[Segment], margins: &MarginConfig, file_duration: f64) -> Vec<Segment> {
    segments
        .iter()
        .map(|s| {
            Segment::new(
                (s.start - margins.before_secs).max(0.0),
                (s.end + margins.after_secs).min(file_duration),
            )
        })
        .collect()
}
