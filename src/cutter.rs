//! Lossless clip extraction with the ffmpeg CLI
//!
//! Each range is copied with `-c copy`. ffmpeg seeks to the nearest keyframe,
//! so a clip may start slightly before the requested time.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::FfmpegConfig;
use crate::error::{MotionError, Result};
use crate::report::ExtractionRequest;
use crate::types::Segment;

/// Compact time for file names: `MMSS`, or `HHMMSS` from one hour on.
pub fn filename_time(secs: f64) -> String {
    let whole = secs.max(0.0).floor() as u64;
    let (hours, rest) = (whole / 3600, whole % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    if hours == 0 {
        format!("{:02}{:02}", minutes, seconds)
    } else {
        format!("{:02}{:02}{:02}", hours, minutes, seconds)
    }
}

/// Runs extraction requests.
#[derive(Debug, Clone)]
pub struct ClipCutter {
    binary: PathBuf,
    log_level: String,
    output_dir: Option<PathBuf>,
}

impl ClipCutter {
    pub fn new(binary: impl Into<PathBuf>, config: &FfmpegConfig) -> Self {
        Self {
            binary: binary.into(),
            log_level: config.log_level.clone(),
            output_dir: None,
        }
    }

    /// Write clips here instead of next to the input.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// `<stem>-<start>-<end><ext>`, lower-cased. Clips starting after one
    /// hour get an `x` prefix so they sort after the shorter names.
    pub fn clip_path(&self, input: &Path, range: &Segment) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let marker = if range.start >= 3600.0 { "x" } else { "" };
        let name = format!(
            "{}-{}{}-{}{}",
            stem,
            marker,
            filename_time(range.start),
            filename_time(range.end),
            ext
        )
        .to_lowercase();

        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        dir.join(name)
    }

    /// Build the command arguments for one range.
    pub fn build_args(&self, input: &Path, range: &Segment, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            self.log_level.clone(),
            "-ss".to_string(),
            format!("{:.3}", range.start),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-t".to_string(),
            format!("{:.3}", range.duration()),
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Cut every range of the request, in order, at the precision the
    /// request prints them with. Stops at the first failure.
    pub async fn cut(&self, request: &ExtractionRequest) -> Result<Vec<PathBuf>> {
        let ranges = request.rounded_ranges();
        let mut outputs = Vec::with_capacity(ranges.len());

        for (i, range) in ranges.iter().enumerate() {
            let output = self.clip_path(&request.input, range);
            let args = self.build_args(&request.input, range, &output);
            tracing::info!(
                "Clip {}: {} ({:.1}s) -> {}",
                i + 1,
                range,
                range.duration(),
                output.display()
            );
            tracing::debug!("Running {} {}", self.binary.display(), args.join(" "));

            let result = Command::new(&self.binary)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await?;

            if !result.status.success() {
                let stderr = String::from_utf8_lossy(&result.stderr);
                return Err(MotionError::FfmpegFailed {
                    message: format!(
                        "cutting {} from {} failed: {}",
                        range,
                        request.input.display(),
                        stderr.lines().last().unwrap_or("no output")
                    ),
                    exit_code: result.status.code(),
                });
            }
            outputs.push(output);
        }

        Ok(outputs)
    }
}
