//! Error types for transcript fetching, segmentation and export

/// Result type for transcript operations
pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Coarse failure classes surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or provider failure
    SourceUnavailable,
    /// The video exists but carries no usable transcript
    NoCaptions,
    /// Empty or unparseable URL, bad setting, non-positive cadence
    InvalidInput,
}

/// Error types for transcript operations
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid video URL or id: {0}")]
    InvalidUrl(String),

    #[error("Invalid cadence {0}: must be at least 1")]
    InvalidCadence(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No captions available for {0}")]
    NoCaptionsAvailable(String),

    #[error("No captions in language '{lang}' (available: {})", .available.join(", "))]
    LanguageNotAvailable { lang: String, available: Vec<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Failed to parse caption data: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read document {path}: {source}")]
    DocumentRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TranscriptError {
    /// Classify this error for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptError::InvalidUrl(_)
            | TranscriptError::InvalidCadence(_)
            | TranscriptError::InvalidInput(_)
            | TranscriptError::DocumentRead { .. }
            | TranscriptError::Config(_) => ErrorKind::InvalidInput,
            TranscriptError::NoCaptionsAvailable(_) | TranscriptError::LanguageNotAvailable { .. } => {
                ErrorKind::NoCaptions
            }
            TranscriptError::Network(_)
            | TranscriptError::Http { .. }
            | TranscriptError::Parse(_)
            | TranscriptError::Json(_)
            | TranscriptError::Io(_) => ErrorKind::SourceUnavailable,
        }
    }

    /// Single message shown to the user for a failed invocation
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::SourceUnavailable => format!("Could not reach the caption source: {}", self),
            ErrorKind::NoCaptions => format!("No transcript found: {}", self),
            ErrorKind::InvalidInput => self.to_string(),
        }
    }
}
