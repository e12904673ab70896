//! Extraction requests handed to the clip cutter

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::types::Segment;

use super::timestamp::{format_timestamp, round_secs};

/// Name of the cutting command printed for manual use
pub const CUT_COMMAND: &str = "cut-video";

/// Ranges to copy out of one input, in time order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRequest {
    pub input: PathBuf,
    pub ranges: Vec<Segment>,
    /// Decimals used when rendering the ranges
    #[serde(skip)]
    pub decimals: usize,
}

impl ExtractionRequest {
    pub fn new(input: impl Into<PathBuf>, ranges: Vec<Segment>, decimals: usize) -> Self {
        Self {
            input: input.into(),
            ranges,
            decimals,
        }
    }

    /// Ranges at the precision they are printed with. Cutting uses these so
    /// clips match the printed command.
    pub fn rounded_ranges(&self) -> Vec<Segment> {
        self.ranges
            .iter()
            .map(|r| Segment::new(round_secs(r.start, self.decimals), round_secs(r.end, self.decimals)))
            .collect()
    }

    /// `start-end` pairs as display timestamps
    pub fn range_args(&self) -> Vec<String> {
        self.ranges
            .iter()
            .map(|r| {
                format!(
                    "{}-{}",
                    format_timestamp(r.start, self.decimals),
                    format_timestamp(r.end, self.decimals)
                )
            })
            .collect()
    }
}

impl fmt::Display for ExtractionRequest {
    /// The command line a user can edit and run by hand.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", CUT_COMMAND, self.input.display())?;
        for range in self.range_args() {
            write!(f, "   {}", range)?;
        }
        Ok(())
    }
}
