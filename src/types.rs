use serde::Serialize;
use std::fmt;

/// Per-frame run-length classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Trigger {
    Start,
    End,
    #[default]
    None,
}

/// Output boundary chosen for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CopyMark {
    Begin,
    End,
    #[default]
    None,
}

impl Trigger {
    /// +1 / -1 / 0 encoding used by the score dump
    pub fn as_i8(self) -> i8 {
        match self {
            Trigger::Start => 1,
            Trigger::End => -1,
            Trigger::None => 0,
        }
    }
}

impl CopyMark {
    /// +1 / -1 / 0 encoding used by the score dump
    pub fn as_i8(self) -> i8 {
        match self {
            CopyMark::Begin => 1,
            CopyMark::End => -1,
            CopyMark::None => 0,
        }
    }
}

/// A single sampled frame as delivered by the scoring pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSample {
    /// Sequence number in the sampled series
    pub index: u64,
    /// Timestamp in stream ticks
    pub pts: i64,
    /// Presentation time in seconds
    pub time_secs: f64,
    /// Scene-change score, practically in [0, 1]
    pub score: f64,
}

/// A sampled frame with every derived field filled in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub index: u64,
    pub pts: i64,
    pub time_secs: f64,
    pub raw_score: f64,
    pub median_score: f64,
    pub is_change: bool,
    pub trigger: Trigger,
    pub copy_mark: CopyMark,
}

/// A motion interval in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.start, self.end)
    }
}
