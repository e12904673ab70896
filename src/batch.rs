//! Batch processing
//!
//! Files are independent: each gets its own scoring run and detection
//! session. Up to `jobs` files are processed at once and reports come back
//! in input order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::Instrument;

use crate::config::AppConfig;
use crate::cutter::ClipCutter;
use crate::detect::FileSession;
use crate::error::{MotionError, Result};
use crate::report::{extraction_request, FileOutcome};
use crate::scores::{read_score_file, FfmpegScorer, ParsedScores, ScoreInput};

/// Everything reported for one input
#[derive(Debug)]
pub struct FileReport {
    pub video: PathBuf,
    pub outcome: FileOutcome,
    pub elapsed: Duration,
    /// Clips written when cutting was enabled
    pub clips: Vec<PathBuf>,
    /// Cutting failed after detection succeeded
    pub cut_error: Option<String>,
}

impl FileReport {
    pub fn is_failure(&self) -> bool {
        self.outcome.is_failure() || self.cut_error.is_some()
    }
}

/// Runs detection over many inputs.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    config: Arc<AppConfig>,
    ffmpeg: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl BatchRunner {
    /// `ffmpeg` is the resolved binary; without it only score files work.
    pub fn new(config: AppConfig, ffmpeg: Option<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            ffmpeg,
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    /// Process all inputs. One failing file never stops the others.
    pub async fn run(&self, inputs: Vec<ScoreInput>) -> Vec<FileReport> {
        let permits = Arc::new(Semaphore::new(self.config.jobs.max(1)));

        let handles: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                let runner = self.clone();
                let permits = Arc::clone(&permits);
                let video = input.video().to_path_buf();
                let handle = tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await;
                    runner.process(input).await
                });
                (video, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (video, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => FileReport {
                    video,
                    outcome: FileOutcome::Failed(MotionError::Task(e.to_string()).to_string()),
                    elapsed: Duration::ZERO,
                    clips: Vec::new(),
                    cut_error: None,
                },
            };
            reports.push(report);
        }
        reports
    }

    /// Score, detect and optionally cut one file.
    pub async fn process(&self, input: ScoreInput) -> FileReport {
        let started = Instant::now();
        let video = input.video().to_path_buf();
        let span = tracing::info_span!("file", input = %video.display());

        async move {
            tracing::info!("Processing {}", video.display());

            let outcome = match self.detect(&input).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Processing failed: {}", e);
                    FileOutcome::Failed(e.to_string())
                }
            };

            let mut clips = Vec::new();
            let mut cut_error = None;
            if self.config.output.copy {
                if let Some(result) = outcome.session() {
                    let request = extraction_request(&video, result, self.config.output.timestamp_decimals);
                    if let Some(request) = request {
                        match self.cut(&request).await {
                            Ok(paths) => clips = paths,
                            Err(e) => {
                                tracing::error!("Cutting failed: {}", e);
                                cut_error = Some(e.to_string());
                            }
                        }
                    }
                }
            }

            let elapsed = started.elapsed();
            if let Some(result) = outcome.session() {
                let secs = elapsed.as_secs_f64();
                let speed = if secs > 0.0 { result.duration_secs / secs } else { 0.0 };
                tracing::info!(
                    "{} processed in {:.1}s ({:.1}x), threshold={}, segments={}",
                    video.display(),
                    secs,
                    speed,
                    result.calibration.threshold,
                    result.segments.len()
                );
            }

            FileReport {
                video,
                outcome,
                elapsed,
                clips,
                cut_error,
            }
        }
        .instrument(span)
        .await
    }

    async fn detect(&self, input: &ScoreInput) -> Result<FileOutcome> {
        let parsed = self.load_scores(input).await?;
        if parsed.skipped > 0 {
            tracing::warn!("Skipped {} malformed score record(s)", parsed.skipped);
        }
        tracing::debug!("Parsed {} score samples", parsed.samples.len());

        let session = FileSession::new(
            input.video().display().to_string(),
            self.config.detection.clone(),
            self.config.margins.clone(),
        );
        let samples = parsed.samples;
        let result = tokio::task::spawn_blocking(move || session.run(&samples))
            .await
            .map_err(|e| MotionError::Task(e.to_string()))??;

        Ok(FileOutcome::from_result(result))
    }

    async fn load_scores(&self, input: &ScoreInput) -> Result<ParsedScores> {
        match input {
            ScoreInput::ScoreFile { scores, .. } => read_score_file(scores).await,
            ScoreInput::Video(video) => {
                let binary = self.ffmpeg.as_ref().ok_or(MotionError::FfmpegNotFound)?;
                FfmpegScorer::new(
                    binary.clone(),
                    &self.config.ffmpeg,
                    self.config.detection.step_frames,
                )
                .score(video)
                .await
            }
        }
    }

    async fn cut(&self, request: &crate::report::ExtractionRequest) -> Result<Vec<PathBuf>> {
        let binary = self.ffmpeg.as_ref().ok_or(MotionError::FfmpegNotFound)?;
        let mut cutter = ClipCutter::new(binary.clone(), &self.config.ffmpeg);
        if let Some(dir) = &self.output_dir {
            cutter = cutter.with_output_dir(dir.clone());
        }
        cutter.cut(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;
    use crate::tests::fixtures::{render_dump, step_series};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn score_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn config(jobs: usize) -> AppConfig {
        AppConfig {
            detection: DetectionConfig {
                ignore_start_secs: 0.0,
                ignore_end_secs: 0.0,
                ..Default::default()
            },
            jobs,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let moving = score_file(&render_dump(&step_series(0.5, 40.0, &[(15.0, 25.0, 0.5)], 0.001)));
        let still = score_file(&render_dump(&step_series(0.5, 40.0, &[], 0.001)));

        let inputs = vec![
            ScoreInput::ScoreFile {
                scores: moving.path().to_path_buf(),
                video: PathBuf::from("moving.mp4"),
            },
            ScoreInput::ScoreFile {
                scores: PathBuf::from("/nonexistent/scores.txt"),
                video: PathBuf::from("missing.mp4"),
            },
            ScoreInput::ScoreFile {
                scores: still.path().to_path_buf(),
                video: PathBuf::from("still.mp4"),
            },
        ];

        let reports = BatchRunner::new(config(3), None).run(inputs).await;
        let videos: Vec<_> = reports.iter().map(|r| r.video.clone()).collect();
        assert_eq!(
            videos,
            vec![
                PathBuf::from("moving.mp4"),
                PathBuf::from("missing.mp4"),
                PathBuf::from("still.mp4")
            ]
        );
        assert!(matches!(reports[0].outcome, FileOutcome::Segments(_)));
        assert!(matches!(reports[1].outcome, FileOutcome::Failed(_)));
        assert!(matches!(reports[2].outcome, FileOutcome::NoMotion(_)));
        assert!(reports[1].is_failure());
        assert!(!reports[2].is_failure());
    }

    #[tokio::test]
    async fn test_video_without_ffmpeg_fails_that_file() {
        let reports = BatchRunner::new(config(1), None)
            .run(vec![ScoreInput::Video(PathBuf::from("cam.mp4"))])
            .await;
        match &reports[0].outcome {
            FileOutcome::Failed(msg) => assert!(msg.contains("FFmpeg not found")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_out_of_order_scores_fail_the_file() {
        let file = score_file(
            "frame:0 pts:0 pts_time:5\nlavfi.scene_score=0.1\nframe:1 pts:1 pts_time:1\nlavfi.scene_score=0.1\n",
        );
        let reports = BatchRunner::new(config(1), None)
            .run(vec![ScoreInput::ScoreFile {
                scores: file.path().to_path_buf(),
                video: PathBuf::from("cam.mp4"),
            }])
            .await;
        match &reports[0].outcome {
            FileOutcome::Failed(msg) => assert!(msg.contains("invariant")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_calibration_fallback_reaches_the_report() {
        let busy = score_file(&render_dump(&step_series(0.5, 60.0, &[], 0.3)));
        let reports = BatchRunner::new(config(1), None)
            .run(vec![ScoreInput::ScoreFile {
                scores: busy.path().to_path_buf(),
                video: PathBuf::from("busy.mp4"),
            }])
            .await;
        let result = reports[0].outcome.session().unwrap();
        assert!(result.calibration.fell_back);
        assert_eq!(result.calibration.threshold, 0.0095);
    }

    #[tokio::test]
    async fn test_empty_score_file_is_no_motion() {
        let file = score_file("");
        let reports = BatchRunner::new(config(1), None)
            .run(vec![ScoreInput::ScoreFile {
                scores: file.path().to_path_buf(),
                video: PathBuf::from("cam.mp4"),
            }])
            .await;
        assert!(matches!(reports[0].outcome, FileOutcome::NoMotion(_)));
    }
}
