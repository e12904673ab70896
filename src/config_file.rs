//! Configuration file support
//!
//! Loads detection settings from TOML files. Every key is optional and
//! falls back to the built-in default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{AppConfig, DetectionConfig, FfmpegConfig, MarginConfig, OutputConfig};
use crate::error::Result;

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Detection settings
    pub detection: Option<DetectionSettings>,
    /// Margin settings
    pub margins: Option<MarginSettings>,
    /// Output settings
    pub output: Option<OutputSettings>,
    /// ffmpeg settings
    pub ffmpeg: Option<FfmpegSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
    /// Batch settings
    pub batch: Option<BatchSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionSettings {
    pub step_frames: Option<u32>,
    pub smooth_radius: Option<usize>,
    pub min_threshold: Option<f64>,
    pub max_threshold: Option<f64>,
    pub threshold_step: Option<f64>,
    pub test_duration_secs: Option<f64>,
    pub start_run: Option<usize>,
    pub end_run: Option<usize>,
    pub min_copy_break_secs: Option<f64>,
    pub ignore_start_secs: Option<f64>,
    pub ignore_end_secs: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarginSettings {
    /// Seconds before the motion start
    pub before_secs: Option<f64>,
    /// Seconds after the motion end
    pub after_secs: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Decimals after the seconds in timestamps
    pub timestamp_decimals: Option<usize>,
    /// Dump the per-frame score table
    pub print_scores: Option<bool>,
    /// Cut clips automatically
    pub copy: Option<bool>,
    /// Emit JSON reports
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegSettings {
    /// Binary name or path
    pub binary: Option<String>,
    /// ffmpeg `-loglevel`
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Files processed concurrently
    pub jobs: Option<usize>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let d = DetectionConfig::default();
        let m = MarginConfig::default();
        let o = OutputConfig::default();
        let f = FfmpegConfig::default();
        Self {
            detection: Some(DetectionSettings {
                step_frames: Some(d.step_frames),
                smooth_radius: Some(d.smooth_radius),
                min_threshold: Some(d.min_threshold),
                max_threshold: Some(d.max_threshold),
                threshold_step: d.threshold_step,
                test_duration_secs: Some(d.test_duration_secs),
                start_run: Some(d.start_run),
                end_run: Some(d.end_run),
                min_copy_break_secs: Some(d.min_copy_break_secs),
                ignore_start_secs: Some(d.ignore_start_secs),
                ignore_end_secs: Some(d.ignore_end_secs),
            }),
            margins: Some(MarginSettings {
                before_secs: Some(m.before_secs),
                after_secs: Some(m.after_secs),
            }),
            output: Some(OutputSettings {
                timestamp_decimals: Some(o.timestamp_decimals),
                print_scores: Some(o.print_scores),
                copy: Some(o.copy),
                json: Some(o.json),
            }),
            ffmpeg: Some(FfmpegSettings {
                binary: Some(f.binary),
                log_level: Some(f.log_level),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
            batch: Some(BatchSettings { jobs: Some(1) }),
        }
    }

    /// Convert to AppConfig, filling gaps with defaults
    pub fn into_app_config(self) -> AppConfig {
        let base = AppConfig::default();

        let detection = match self.detection {
            Some(s) => DetectionConfig {
                step_frames: s.step_frames.unwrap_or(base.detection.step_frames),
                smooth_radius: s.smooth_radius.unwrap_or(base.detection.smooth_radius),
                min_threshold: s.min_threshold.unwrap_or(base.detection.min_threshold),
                max_threshold: s.max_threshold.unwrap_or(base.detection.max_threshold),
                threshold_step: s.threshold_step.or(base.detection.threshold_step),
                test_duration_secs: s
                    .test_duration_secs
                    .unwrap_or(base.detection.test_duration_secs),
                start_run: s.start_run.unwrap_or(base.detection.start_run),
                end_run: s.end_run.unwrap_or(base.detection.end_run),
                min_copy_break_secs: s
                    .min_copy_break_secs
                    .unwrap_or(base.detection.min_copy_break_secs),
                ignore_start_secs: s
                    .ignore_start_secs
                    .unwrap_or(base.detection.ignore_start_secs),
                ignore_end_secs: s.ignore_end_secs.unwrap_or(base.detection.ignore_end_secs),
            },
            None => base.detection,
        };

        let margins = match self.margins {
            Some(s) => MarginConfig {
                before_secs: s.before_secs.unwrap_or(base.margins.before_secs),
                after_secs: s.after_secs.unwrap_or(base.margins.after_secs),
            },
            None => base.margins,
        };

        let output = match self.output {
            Some(s) => OutputConfig {
                timestamp_decimals: s
                    .timestamp_decimals
                    .unwrap_or(base.output.timestamp_decimals),
                print_scores: s.print_scores.unwrap_or(base.output.print_scores),
                copy: s.copy.unwrap_or(base.output.copy),
                json: s.json.unwrap_or(base.output.json),
            },
            None => base.output,
        };

        let ffmpeg = match self.ffmpeg {
            Some(s) => FfmpegConfig {
                binary: s.binary.unwrap_or(base.ffmpeg.binary),
                log_level: s.log_level.unwrap_or(base.ffmpeg.log_level),
            },
            None => base.ffmpeg,
        };

        AppConfig {
            detection,
            margins,
            output,
            ffmpeg,
            jobs: self
                .batch
                .and_then(|b| b.jobs)
                .unwrap_or(base.jobs),
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or(base.log_level),
            log_format: self
                .logging
                .and_then(|l| l.format)
                .unwrap_or(base.log_format),
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_matches_runtime_defaults() {
        let config = ConfigFile::default_config().into_app_config();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            "[detection]\nend_run = 6\nmin_threshold = 0.02\n\n[margins]\nafter_secs = 0.0\n"
        )
        .unwrap();

        let config = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_app_config();
        assert_eq!(config.detection.end_run, 6);
        assert_eq!(config.detection.min_threshold, 0.02);
        assert_eq!(config.detection.start_run, 2);
        assert_eq!(config.margins.after_secs, 0.0);
        assert_eq!(config.margins.before_secs, 2.5);
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn test_empty_file_is_default() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_app_config();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[detection\nend_run = ").unwrap();
        assert!(ConfigFile::from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_generate_default_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        generate_default_config(&path).unwrap();

        let loaded = ConfigFile::from_file(&path).unwrap();
        let detection = loaded.detection.unwrap();
        assert_eq!(detection.step_frames, Some(20));
        assert_eq!(detection.end_run, Some(10));
    }
}
