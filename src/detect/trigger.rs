//! Run-length trigger classification

use crate::types::Trigger;

/// First index that lacks `lookahead` samples after it. Frames from here on
/// are never classified and bound every forward scan.
pub fn scan_limit(len: usize, start_run: usize, end_run: usize) -> usize {
    len.saturating_sub(start_run.max(end_run))
}

/// Label every sample as a motion start, a motion end, or neither.
///
/// A start needs `start_run` samples beginning at the frame all strictly
/// above `threshold`; an end needs none of the `end_run` samples beginning at
/// the frame above it. Start wins when both could apply.
pub fn classify(scores: &[f64], threshold: f64, start_run: usize, end_run: usize) -> Vec<Trigger> {
    let limit = scan_limit(scores.len(), start_run, end_run);

    (0..scores.len())
        .map(|i| {
            if i >= limit {
                return Trigger::None;
            }
            let above = |run: usize| scores[i..i + run].iter().filter(|&&s| s > threshold).count();
            if above(start_run) == start_run {
                Trigger::Start
            } else if above(end_run) == 0 {
                Trigger::End
            } else {
                Trigger::None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = 0.01;

    #[test]
    fn test_start_needs_full_run_above() {
        // Frame 0: next two (0, 1) above -> Start. Frame 2: only 2 of (2, 3).
        let scores = vec![0.5, 0.5, 0.5, 0.0, 0.0, 0.0, 0.0];
        let triggers = classify(&scores, T, 2, 2);
        assert_eq!(triggers[0], Trigger::Start);
        assert_eq!(triggers[1], Trigger::Start);
        assert_eq!(triggers[2], Trigger::None);
        assert_eq!(triggers[3], Trigger::End);
    }

    #[test]
    fn test_one_of_two_above_is_not_start() {
        let scores = vec![0.5, 0.0, 0.5, 0.0, 0.0, 0.0];
        let triggers = classify(&scores, T, 2, 1);
        assert_ne!(triggers[0], Trigger::Start);
        assert_ne!(triggers[2], Trigger::Start);
    }

    #[test]
    fn test_score_equal_to_threshold_is_not_above() {
        let scores = vec![T, T, T, T, T];
        let triggers = classify(&scores, T, 2, 2);
        assert_eq!(triggers[0], Trigger::End);
        assert!(!triggers.contains(&Trigger::Start));
    }

    #[test]
    fn test_end_requires_clean_run() {
        let scores = vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let triggers = classify(&scores, T, 2, 4);
        assert_eq!(triggers[0], Trigger::None);
        assert_eq!(triggers[3], Trigger::None);
        assert_eq!(triggers[4], Trigger::End);
    }

    #[test]
    fn test_tail_is_forced_to_none() {
        let scores = vec![0.5; 8];
        let triggers = classify(&scores, T, 2, 5);
        assert_eq!(scan_limit(8, 2, 5), 3);
        assert_eq!(&triggers[..3], &[Trigger::Start; 3]);
        assert!(triggers[3..].iter().all(|t| *t == Trigger::None));
    }

    #[test]
    fn test_series_shorter_than_lookahead() {
        let scores = vec![0.5, 0.5];
        assert_eq!(classify(&scores, T, 2, 10), vec![Trigger::None; 2]);
        assert!(classify(&[], T, 2, 10).is_empty());
    }
}
