//! Command-line options for the terminal shell.

use clap::{ArgAction, Parser, ValueEnum};

use crate::{error::ConfigError, provider::PLACEHOLDER_TEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecognizerKind {
    /// Fixed text after a two second delay
    Placeholder,
    /// External program reading the clip as JSON on stdin
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(about = "SilentTalk sign capture shell", author, version)]
pub struct AppConfig {
    /// Recognition engine to run on captured clips
    #[arg(long, value_enum, default_value_t = RecognizerKind::Placeholder)]
    pub recognizer: RecognizerKind,

    /// Text returned by the placeholder recognizer
    #[arg(long, default_value = PLACEHOLDER_TEXT)]
    pub placeholder_text: String,

    /// Program used by the command recognizer
    #[arg(long, env = "SILENTTALK_RECOGNIZER_CMD")]
    pub recognizer_cmd: Option<String>,

    /// Extra arguments for the recognizer program (repeatable)
    #[arg(
        long = "recognizer-arg",
        action = ArgAction::Append,
        value_name = "ARG",
        allow_hyphen_values = true
    )]
    pub recognizer_args: Vec<String>,

    /// Clip handed out by the video picker, in order (repeatable); later picks cancel
    #[arg(long = "library-clip", action = ArgAction::Append, value_name = "URI")]
    pub library_clips: Vec<String>,

    /// Answer every permission request with "denied"
    #[arg(long, default_value_t = false)]
    pub deny_permissions: bool,

    /// Enable file logging
    #[arg(long = "logs", env = "SILENTTALK_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs)
    #[arg(long = "no-logs", env = "SILENTTALK_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Minimum level written to the log file
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placeholder_text.trim().is_empty() {
            return Err(ConfigError::EmptyPlaceholderText);
        }
        if self.recognizer == RecognizerKind::Command
            && self
                .recognizer_cmd
                .as_deref()
                .map_or(true, |cmd| cmd.trim().is_empty())
        {
            return Err(ConfigError::MissingRecognizerCommand);
        }
        Ok(())
    }

    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }
}
