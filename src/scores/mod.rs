//! Scene score input
//!
//! Scores come either from running ffmpeg on a video, or from a score dump
//! produced earlier by the same filter chain.

pub mod ffmpeg;
pub mod parser;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use ffmpeg::{find_ffmpeg, FfmpegScorer};
pub use parser::{parse_scores, ParsedScores};

/// Where a file's scores come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreInput {
    /// Score the video with ffmpeg
    Video(PathBuf),
    /// Read an existing `metadata=print` dump; `video` names the clip source
    ScoreFile { scores: PathBuf, video: PathBuf },
}

impl ScoreInput {
    /// The video the segments refer to
    pub fn video(&self) -> &Path {
        match self {
            ScoreInput::Video(path) => path,
            ScoreInput::ScoreFile { video, .. } => video,
        }
    }
}

/// Read and parse a score dump from disk.
pub async fn read_score_file(path: &Path) -> Result<ParsedScores> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(parse_scores(&text))
}
