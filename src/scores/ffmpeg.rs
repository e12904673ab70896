//! Scene scoring with the ffmpeg CLI
//!
//! Runs `select` on every n-th frame, lets ffmpeg compute the scene score of
//! the remaining frames and prints the frame metadata to a temporary file.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::FfmpegConfig;
use crate::error::{MotionError, Result};

use super::parser::{parse_scores, ParsedScores};

/// Locate the ffmpeg binary, by path or on PATH.
pub fn find_ffmpeg(binary: &str) -> Result<PathBuf> {
    which::which(binary).map_err(|_| MotionError::FfmpegNotFound)
}

/// Builds and runs the scoring pass for one video.
#[derive(Debug, Clone)]
pub struct FfmpegScorer {
    binary: PathBuf,
    log_level: String,
    step_frames: u32,
}

impl FfmpegScorer {
    pub fn new(binary: impl Into<PathBuf>, config: &FfmpegConfig, step_frames: u32) -> Self {
        Self {
            binary: binary.into(),
            log_level: config.log_level.clone(),
            step_frames,
        }
    }

    /// Filter graph sampling every `step_frames`-th frame and dumping scores to `out`.
    pub fn filter_graph(&self, out: &Path) -> String {
        format!(
            "select='not(mod(n,{}))',select='gte(scene,0)',metadata=print:file='{}'",
            self.step_frames,
            out.display()
        )
    }

    /// Build the command arguments.
    pub fn build_args(&self, input: &Path, out: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            self.log_level.clone(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vf".to_string(),
            self.filter_graph(out),
            "-an".to_string(),
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ]
    }

    /// Score a video. Returns once ffmpeg has exited and its output is parsed.
    pub async fn score(&self, input: &Path) -> Result<ParsedScores> {
        let dir = tempfile::Builder::new().prefix("motion-cut-").tempdir()?;
        let out = dir.path().join("scenescores.txt");
        let args = self.build_args(input, &out);
        tracing::debug!("Running {} {}", self.binary.display(), args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MotionError::FfmpegFailed {
                message: format!(
                    "scoring {} failed: {}",
                    input.display(),
                    stderr.lines().last().unwrap_or("no output")
                ),
                exit_code: output.status.code(),
            });
        }

        // ffmpeg writes nothing when the input has no video frames.
        let text = match tokio::fs::read_to_string(&out).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(parse_scores(&text))
    }
}
