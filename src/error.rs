use thiserror::Error;

/// Main error type for motion detection and clip extraction
#[derive(Error, Debug)]
pub enum MotionError {
    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid detection or output configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A TOML configuration file could not be parsed
    #[error("Config file parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configuration could not be serialized to TOML
    #[error("Config file write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// A report could not be serialized to JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ffmpeg binary is not on PATH
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    /// An ffmpeg child process exited unsuccessfully
    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        exit_code: Option<i32>,
    },

    /// The score series or the segment builder broke an ordering invariant.
    /// Fatal for the file being processed, never for the batch.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    /// A background task panicked or was aborted
    #[error("Task failed: {0}")]
    Task(String),
}

impl MotionError {
    /// Create an invariant violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MotionError>;
