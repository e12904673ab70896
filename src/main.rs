//! motion-cut
//!
//! Finds the parts of recorded videos where something moves and prints,
//! or runs, the lossless cut commands that extract them.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motion_cut::config::AppConfig;
use motion_cut::config_file::{generate_default_config, ConfigFile};
use motion_cut::error::{MotionError, Result};
use motion_cut::report::{extraction_request, render_clip_table, render_score_dump, ReportRecord};
use motion_cut::scores::{find_ffmpeg, ScoreInput};
use motion_cut::{BatchRunner, FileOutcome, FileReport};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "motion-cut";

/// Detect motion in video files and output start and end times for each
/// motion event.
#[derive(Parser, Debug, Clone)]
#[command(name = "motion-cut")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Video files to process
    #[arg(required_unless_present = "generate_config")]
    inputs: Vec<PathBuf>,

    /// Precomputed score dumps, one per input, instead of running ffmpeg
    #[arg(long = "scores", value_name = "FILE")]
    scores: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a default configuration file and exit
    #[arg(long, value_name = "FILE")]
    generate_config: Option<PathBuf>,

    /// Cut the clips with ffmpeg instead of only printing the commands
    #[arg(long)]
    copy: bool,

    /// Directory for cut clips (defaults to each input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the per-frame score table
    #[arg(long)]
    print_scores: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Files processed concurrently
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Score every n-th frame
    #[arg(long)]
    step_frames: Option<u32>,

    /// Median smoothing radius in samples
    #[arg(long)]
    smooth: Option<usize>,

    /// Lowest (most sensitive) threshold
    #[arg(long)]
    min_threshold: Option<f64>,

    /// Highest threshold calibration may reach
    #[arg(long)]
    max_threshold: Option<f64>,

    /// Calibration increment (defaults to the minimum threshold)
    #[arg(long)]
    threshold_step: Option<f64>,

    /// Motionless seconds that anchor the calibration
    #[arg(long)]
    test_duration: Option<f64>,

    /// Samples above threshold that start motion
    #[arg(long)]
    start_run: Option<usize>,

    /// Samples below threshold that end motion
    #[arg(long)]
    end_run: Option<usize>,

    /// Keep copying when motion resumes within this many seconds
    #[arg(long)]
    min_copy_break: Option<f64>,

    /// Seconds added before each motion event
    #[arg(long)]
    before: Option<f64>,

    /// Seconds added after each motion event
    #[arg(long)]
    after: Option<f64>,

    /// Seconds at the start of each file not searched for motion
    #[arg(long)]
    ignore_start: Option<f64>,

    /// Seconds at the end of each file not searched for motion
    #[arg(long)]
    ignore_end: Option<f64>,

    /// Decimals after the seconds in timestamps
    #[arg(long)]
    decimals: Option<usize>,

    /// ffmpeg binary
    #[arg(long)]
    ffmpeg: Option<String>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (pretty or json)
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    /// Layer command-line overrides on top of the file configuration.
    fn apply(&self, config: &mut AppConfig) {
        let d = &mut config.detection;
        if let Some(v) = self.step_frames {
            d.step_frames = v;
        }
        if let Some(v) = self.smooth {
            d.smooth_radius = v;
        }
        if let Some(v) = self.min_threshold {
            d.min_threshold = v;
        }
        if let Some(v) = self.max_threshold {
            d.max_threshold = v;
        }
        if self.threshold_step.is_some() {
            d.threshold_step = self.threshold_step;
        }
        if let Some(v) = self.test_duration {
            d.test_duration_secs = v;
        }
        if let Some(v) = self.start_run {
            d.start_run = v;
        }
        if let Some(v) = self.end_run {
            d.end_run = v;
        }
        if let Some(v) = self.min_copy_break {
            d.min_copy_break_secs = v;
        }
        if let Some(v) = self.ignore_start {
            d.ignore_start_secs = v;
        }
        if let Some(v) = self.ignore_end {
            d.ignore_end_secs = v;
        }
        if let Some(v) = self.before {
            config.margins.before_secs = v;
        }
        if let Some(v) = self.after {
            config.margins.after_secs = v;
        }
        if let Some(v) = self.decimals {
            config.output.timestamp_decimals = v;
        }
        config.output.copy |= self.copy;
        config.output.print_scores |= self.print_scores;
        config.output.json |= self.json;
        if let Some(v) = self.jobs {
            config.jobs = v;
        }
        if let Some(v) = &self.ffmpeg {
            config.ffmpeg.binary = v.clone();
        }
        if let Some(v) = &self.log_level {
            config.log_level = v.clone();
        }
        if let Some(v) = &self.log_format {
            config.log_format = v.clone();
        }
    }

    fn score_inputs(&self) -> Result<Vec<ScoreInput>> {
        if self.scores.is_empty() {
            return Ok(self.inputs.iter().cloned().map(ScoreInput::Video).collect());
        }
        if self.scores.len() != self.inputs.len() {
            return Err(MotionError::config(format!(
                "{} score files given for {} inputs",
                self.scores.len(),
                self.inputs.len()
            )));
        }
        Ok(self
            .inputs
            .iter()
            .zip(&self.scores)
            .map(|(video, scores)| ScoreInput::ScoreFile {
                scores: scores.clone(),
                video: video.clone(),
            })
            .collect())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every file was processed without failure.
async fn run(args: Args) -> Result<bool> {
    if let Some(path) = &args.generate_config {
        generate_default_config(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(true);
    }

    let mut config = match &args.config {
        Some(path) => ConfigFile::from_file(path)?.into_app_config(),
        None => AppConfig::default(),
    };
    args.apply(&mut config);

    init_logging(&config);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    config.validate()?;
    tracing::debug!("Configuration loaded: {:?}", config);

    let inputs = args.score_inputs()?;
    let needs_ffmpeg = config.output.copy || args.scores.is_empty();
    let ffmpeg = match find_ffmpeg(&config.ffmpeg.binary) {
        Ok(path) => Some(path),
        Err(e) if needs_ffmpeg => return Err(e),
        Err(_) => None,
    };

    if !config.output.json {
        println!("Process these files:");
        for input in &inputs {
            println!(" {}", input.video().display());
        }
    }

    let reports = BatchRunner::new(config.clone(), ffmpeg)
        .with_output_dir(args.output_dir.clone())
        .run(inputs)
        .await;

    if config.output.json {
        print_json(&reports, &config)?;
    } else {
        print_reports(&reports, &config);
    }

    Ok(reports.iter().all(|r| !r.is_failure()))
}

fn print_reports(reports: &[FileReport], config: &AppConfig) {
    let decimals = config.output.timestamp_decimals;
    let mut commands = Vec::new();

    for report in reports {
        println!();
        println!("Processing {}", report.video.display());
        match &report.outcome {
            FileOutcome::Failed(e) => {
                println!(" processing failed: {}", e);
                continue;
            }
            FileOutcome::Segments(result) | FileOutcome::NoMotion(result) => {
                if config.output.print_scores {
                    print!("{}", render_score_dump(result));
                }
                print!("{}", render_clip_table(result, decimals));
                if let Some(request) = extraction_request(&report.video, result, decimals) {
                    commands.push(request.to_string());
                }
            }
        }
        for clip in &report.clips {
            println!(" Wrote {}", clip.display());
        }
        if let Some(e) = &report.cut_error {
            println!(" cutting failed: {}", e);
        }
    }

    println!();
    println!("Commands for each input file:");
    for command in commands {
        println!(" {}", command);
    }
}

fn print_json(reports: &[FileReport], config: &AppConfig) -> Result<()> {
    let records: Vec<ReportRecord> = reports
        .iter()
        .map(|r| ReportRecord::new(&r.video, &r.outcome, config.output.timestamp_decimals))
        .collect();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Initialize logging with tracing
fn init_logging(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("motion_cut={}", config.log_level).into());

    let (json, pretty) = if config.log_format == "json" {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let args = Args::parse_from([
            "motion-cut",
            "--end-run",
            "6",
            "--before",
            "0",
            "--copy",
            "cam.mp4",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.detection.end_run, 6);
        assert_eq!(config.detection.start_run, 2);
        assert_eq!(config.margins.before_secs, 0.0);
        assert!(config.output.copy);
    }

    #[test]
    fn test_score_files_pair_with_inputs() {
        let args = Args::parse_from(["motion-cut", "--scores", "a.txt", "a.mp4"]);
        let inputs = args.score_inputs().unwrap();
        assert_eq!(
            inputs,
            vec![ScoreInput::ScoreFile {
                scores: PathBuf::from("a.txt"),
                video: PathBuf::from("a.mp4"),
            }]
        );

        let args = Args::parse_from(["motion-cut", "--scores", "a.txt", "a.mp4", "b.mp4"]);
        assert!(args.score_inputs().is_err());
    }

    #[test]
    fn test_generate_config_needs_no_inputs() {
        let args = Args::parse_from(["motion-cut", "--generate-config", "motion.toml"]);
        assert!(args.inputs.is_empty());
    }
}
