//! Error types for wordseg.

use std::fmt;
use thiserror::Error;

/// Why an utterance was rejected before segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceFault {
    Empty,
    Punctuation,
    LeadingSeparator,
    MissingWordSeparator,
}

impl fmt::Display for UtteranceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UtteranceFault::Empty => "utterance is empty",
            UtteranceFault::Punctuation => "punctuation found in utterance",
            UtteranceFault::LeadingSeparator => "utterance begins with a separator",
            UtteranceFault::MissingWordSeparator => "utterance does not end with a word separator",
        };
        f.write_str(text)
    }
}

/// Broad classification of a [`WordsegError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad setup detected before any data is processed. Never retried.
    Configuration,
    /// Malformed input data.
    Validation,
    /// Failure of a segmenter at run time (subprocess, worker thread).
    Runtime,
    Io,
}

#[derive(Error, Debug)]
pub enum WordsegError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Input validation errors
    #[error("Invalid utterance at line {line}: {reason}: '{utterance}'")]
    InvalidUtterance {
        line: usize,
        reason: UtteranceFault,
        utterance: String,
    },

    #[error("Word separator not found at line {line}: '{utterance}'")]
    MissingWordMarker { line: usize, utterance: String },

    #[error("Hypothesis and gold differ in length: {hypothesis} != {gold}")]
    LengthMismatch { gold: usize, hypothesis: usize },

    #[error("Hypothesis and gold differ at line {line}: '{hypothesis}' != '{gold}'")]
    ContentMismatch {
        line: usize,
        gold: String,
        hypothesis: String,
    },

    // Segmenter runtime errors
    #[error("Segmenter {segmenter} failed: {message}")]
    SegmenterFailed { segmenter: String, message: String },

    #[error("Segmenter {segmenter} produced malformed output: {message}")]
    SegmenterOutput { segmenter: String, message: String },

    #[error("Worker thread for fold {fold} panicked")]
    WorkerPanicked { fold: usize },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WordsegError {
    /// Shorthand for the most common configuration error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigInvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WordsegError::ConfigParse { .. }
            | WordsegError::ConfigInvalidValue { .. }
            | WordsegError::Config(_) => ErrorKind::Configuration,
            WordsegError::InvalidUtterance { .. }
            | WordsegError::MissingWordMarker { .. }
            | WordsegError::LengthMismatch { .. }
            | WordsegError::ContentMismatch { .. } => ErrorKind::Validation,
            WordsegError::SegmenterFailed { .. }
            | WordsegError::SegmenterOutput { .. }
            | WordsegError::WorkerPanicked { .. } => ErrorKind::Runtime,
            WordsegError::Io(_) | WordsegError::Json(_) => ErrorKind::Io,
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WordsegError>;
