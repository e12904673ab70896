//! Copy-mark state machine
//!
//! Walks the trigger series once, deciding which frames open and close an
//! extracted segment. A closing candidate is rejected when another start
//! trigger follows within `min_copy_break_secs` (or on the first frame past
//! it), so one event that briefly dips below the threshold is not split
//! into several clips.

use crate::error::{MotionError, Result};
use crate::types::{CopyMark, Segment, Trigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Copying,
}

/// Edge windows and merge gap used by the builder
#[derive(Debug, Clone, Copy)]
pub struct BuilderParams {
    pub ignore_start_secs: f64,
    pub ignore_end_secs: f64,
    pub min_copy_break_secs: f64,
}

/// Assign a copy mark to every frame.
///
/// `limit` is the trigger scan limit: frames from there on, and frames
/// inside the trailing ignore window, close an open segment and never open
/// a new one. Frames inside the leading ignore window are skipped.
pub fn build_marks(
    times: &[f64],
    triggers: &[Trigger],
    limit: usize,
    params: &BuilderParams,
) -> Vec<CopyMark> {
    let mut marks = vec![CopyMark::None; times.len()];
    let Some(&last_time) = times.last() else {
        return marks;
    };
    let limit = limit.min(times.len());
    let tail_from = last_time - params.ignore_end_secs;

    let mut state = State::Idle;
    let mut last_evaluated = None;

    for (i, &time) in times.iter().enumerate() {
        if time < params.ignore_start_secs {
            continue;
        }

        if i >= limit || time > tail_from {
            if state == State::Copying {
                tracing::trace!(frame = i, time, "forced close near end of file");
                marks[i] = CopyMark::End;
                state = State::Idle;
            }
            continue;
        }
        last_evaluated = Some(i);

        match (state, triggers[i]) {
            (State::Idle, Trigger::Start) => {
                marks[i] = CopyMark::Begin;
                state = State::Copying;
            }
            (State::Copying, Trigger::End) => {
                if start_within_break(times, triggers, i, limit, params.min_copy_break_secs) {
                    tracing::trace!(frame = i, time, "brief dip, keep copying");
                } else {
                    marks[i] = CopyMark::End;
                    state = State::Idle;
                }
            }
            _ => {}
        }
    }

    // Only reachable when no frame fell into the closing region.
    if state == State::Copying {
        if let Some(i) = last_evaluated {
            if marks[i] == CopyMark::Begin {
                // Opened on the very last frame: nothing left to copy.
                tracing::trace!(frame = i, "dropping begin on last frame");
                marks[i] = CopyMark::None;
            } else {
                marks[i] = CopyMark::End;
            }
        }
    }

    marks
}

/// Whether a start trigger follows `from` closely enough to bridge the gap.
/// The first frame past `max_gap` is still checked before the scan stops.
fn start_within_break(
    times: &[f64],
    triggers: &[Trigger],
    from: usize,
    limit: usize,
    max_gap: f64,
) -> bool {
    for j in (from + 1)..limit {
        if triggers[j] == Trigger::Start {
            return true;
        }
        if times[j] - times[from] > max_gap {
            break;
        }
    }
    false
}

/// Pair Begin and End marks into segments, left to right.
pub fn pair_marks(times: &[f64], marks: &[CopyMark]) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut open: Option<f64> = None;

    for (i, (&time, &mark)) in times.iter().zip(marks).enumerate() {
        match mark {
            CopyMark::Begin => {
                if let Some(start) = open {
                    return Err(MotionError::invariant(format!(
                        "frame {} begins a segment while the one opened at {:.3}s is still open",
                        i, start
                    )));
                }
                open = Some(time);
            }
            CopyMark::End => match open.take() {
                Some(start) => segments.push(Segment::new(start, time)),
                None => {
                    return Err(MotionError::invariant(format!(
                        "frame {} ends a segment that was never opened",
                        i
                    )))
                }
            },
            CopyMark::None => {}
        }
    }

    if let Some(start) = open {
        return Err(MotionError::invariant(format!(
            "segment opened at {:.3}s was never closed",
            start
        )));
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(n: usize, stride: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * stride).collect()
    }

    fn triggers(n: usize, starts: &[usize], ends: &[usize]) -> Vec<Trigger> {
        let mut t = vec![Trigger::None; n];
        for &i in starts {
            t[i] = Trigger::Start;
        }
        for &i in ends {
            t[i] = Trigger::End;
        }
        t
    }

    fn no_ignore() -> BuilderParams {
        BuilderParams {
            ignore_start_secs: 0.0,
            ignore_end_secs: 0.0,
            min_copy_break_secs: 4.9,
        }
    }

    fn segments(times: &[f64], trig: &[Trigger], limit: usize, params: &BuilderParams) -> Vec<Segment> {
        let marks = build_marks(times, trig, limit, params);
        pair_marks(times, &marks).unwrap()
    }

    #[test]
    fn test_simple_segment() {
        let t = times(30, 0.5);
        let trig = triggers(30, &[2, 3], &[10, 11]);
        assert_eq!(segments(&t, &trig, 26, &no_ignore()), vec![Segment::new(1.0, 5.0)]);
    }

    #[test]
    fn test_brief_dip_keeps_copying() {
        // End at t=3.0, next start at t=4.0: one continuous segment.
        let t = times(40, 0.5);
        let trig = triggers(40, &[2, 8], &[6, 14]);
        let marks = build_marks(&t, &trig, 36, &no_ignore());
        assert_eq!(marks[6], CopyMark::None);
        assert_eq!(marks[8], CopyMark::None);
        assert_eq!(marks[14], CopyMark::End);
        assert_eq!(pair_marks(&t, &marks).unwrap(), vec![Segment::new(1.0, 7.0)]);
    }

    #[test]
    fn test_start_on_first_frame_past_break_bridges() {
        // End at t=3.0, next start at t=8.0: 5s > 4.9s but it is the first
        // frame past the break.
        let t = times(40, 0.5);
        let trig = triggers(40, &[2, 16], &[6, 20]);
        assert_eq!(segments(&t, &trig, 36, &no_ignore()), vec![Segment::new(1.0, 10.0)]);
    }

    #[test]
    fn test_gap_beyond_break_splits() {
        // End at t=3.0, next start at t=8.5, one frame after the first past the break.
        let t = times(40, 0.5);
        let trig = triggers(40, &[2, 17], &[6, 20]);
        assert_eq!(
            segments(&t, &trig, 36, &no_ignore()),
            vec![Segment::new(1.0, 3.0), Segment::new(8.5, 10.0)]
        );
    }

    #[test]
    fn test_start_exactly_at_break_bridges() {
        let t = times(40, 0.5);
        let trig = triggers(40, &[2, 16], &[6, 20]);
        let params = BuilderParams {
            min_copy_break_secs: 5.0,
            ..no_ignore()
        };
        assert_eq!(segments(&t, &trig, 36, &params), vec![Segment::new(1.0, 10.0)]);
    }

    #[test]
    fn test_later_end_rescans() {
        // First end bridged by the start at 8, the end at 9 sees nothing ahead.
        let t = times(40, 0.5);
        let trig = triggers(40, &[2, 8], &[6, 9]);
        assert_eq!(segments(&t, &trig, 36, &no_ignore()), vec![Segment::new(1.0, 4.5)]);
    }

    #[test]
    fn test_forced_close_at_scan_limit() {
        let t = times(20, 0.5);
        let trig = triggers(20, &[4], &[]);
        let marks = build_marks(&t, &trig, 10, &no_ignore());
        assert_eq!(marks[10], CopyMark::End);
        assert!(marks[11..].iter().all(|m| *m == CopyMark::None));
        assert_eq!(pair_marks(&t, &marks).unwrap(), vec![Segment::new(2.0, 5.0)]);
    }

    #[test]
    fn test_open_segment_closes_without_closing_region() {
        let t = times(5, 1.0);
        let trig = triggers(5, &[2], &[]);
        let marks = build_marks(&t, &trig, 5, &no_ignore());
        assert_eq!(marks[4], CopyMark::End);
        assert_eq!(pair_marks(&t, &marks).unwrap(), vec![Segment::new(2.0, 4.0)]);
    }

    #[test]
    fn test_start_on_last_frame_leaves_no_dangling_begin() {
        let t = times(5, 1.0);
        let trig = triggers(5, &[4], &[]);
        let marks = build_marks(&t, &trig, 5, &no_ignore());
        assert!(marks.iter().all(|m| *m == CopyMark::None));
        assert!(pair_marks(&t, &marks).unwrap().is_empty());
    }

    #[test]
    fn test_ignore_start_window() {
        let t = times(30, 0.5);
        let trig = triggers(30, &[1, 5], &[12]);
        let params = BuilderParams {
            ignore_start_secs: 2.0,
            ..no_ignore()
        };
        assert_eq!(segments(&t, &trig, 26, &params), vec![Segment::new(2.5, 6.0)]);
    }

    #[test]
    fn test_ignore_end_window_closes_and_blocks_starts() {
        // Last frame at 14.5s, trailing window starts after 12.5s.
        let t = times(30, 0.5);
        let trig = triggers(30, &[2, 26], &[]);
        let params = BuilderParams {
            ignore_end_secs: 2.0,
            ..no_ignore()
        };
        let marks = build_marks(&t, &trig, 29, &params);
        assert_eq!(marks[26], CopyMark::End);
        assert_eq!(pair_marks(&t, &marks).unwrap(), vec![Segment::new(1.0, 13.0)]);
    }

    #[test]
    fn test_end_while_idle_and_start_while_copying_ignored() {
        let t = times(30, 0.5);
        let trig = triggers(30, &[3, 4, 5], &[1, 15]);
        assert_eq!(segments(&t, &trig, 26, &no_ignore()), vec![Segment::new(1.5, 7.5)]);
    }

    #[test]
    fn test_no_triggers_no_marks() {
        let t = times(10, 1.0);
        let trig = vec![Trigger::None; 10];
        let marks = build_marks(&t, &trig, 5, &no_ignore());
        assert!(marks.iter().all(|m| *m == CopyMark::None));
        assert!(build_marks(&[], &[], 0, &no_ignore()).is_empty());
    }

    #[test]
    fn test_pair_marks_rejects_dangling_begin() {
        let t = times(4, 1.0);
        let marks = vec![CopyMark::None, CopyMark::Begin, CopyMark::None, CopyMark::None];
        assert!(matches!(
            pair_marks(&t, &marks),
            Err(MotionError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_pair_marks_rejects_orphan_end() {
        let t = times(3, 1.0);
        let marks = vec![CopyMark::End, CopyMark::None, CopyMark::None];
        assert!(pair_marks(&t, &marks).is_err());
    }

    #[test]
    fn test_pair_marks_rejects_double_begin() {
        let t = times(3, 1.0);
        let marks = vec![CopyMark::Begin, CopyMark::Begin, CopyMark::End];
        assert!(pair_marks(&t, &marks).is_err());
    }
}
