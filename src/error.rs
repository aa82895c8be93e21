use thiserror::Error;

/// Failures a recognition engine can report for one submitted clip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("recognizer is busy with another clip")]
    Busy,
    #[error("recognizer returned no text")]
    EmptyResult,
    #[error("recognizer command failed: {0}")]
    Command(String),
    #[error("recognizer output was not valid JSON: {0}")]
    InvalidOutput(String),
    #[error("recognition cancelled")]
    Cancelled,
    #[error("recognizer stopped without a result")]
    Interrupted,
    #[error("failed starting recognizer worker: {0}")]
    Spawn(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("--recognizer command requires --recognizer-cmd")]
    MissingRecognizerCommand,
    #[error("--placeholder-text must not be empty")]
    EmptyPlaceholderText,
}
