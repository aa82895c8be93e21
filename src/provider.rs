use std::{
    io::{ErrorKind, Read, Write},
    process::{Child, Command, Stdio},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use serde::Deserialize;

use crate::{
    config::{AppConfig, RecognizerKind},
    error::RecognitionError,
    model::VideoAsset,
};

pub const PLACEHOLDER_LATENCY: Duration = Duration::from_secs(2);
pub const PLACEHOLDER_TEXT: &str = "Hello";
const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Set when the submitting screen goes away; long-running recognizers should
/// check it and bail out.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sign recognition engine. Swap the placeholder for a real model here.
///
/// `recognize` runs on a worker thread, never on the UI thread.
pub trait RecognitionProvider: Send + Sync {
    fn display_name(&self) -> &'static str;
    /// Minimum time a submission stays in processing before its result is shown.
    fn latency(&self) -> Duration;
    fn recognize(
        &self,
        asset: &VideoAsset,
        cancel: &CancelFlag,
    ) -> Result<String, RecognitionError>;
}

pub struct PlaceholderProvider {
    text: String,
}

impl PlaceholderProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for PlaceholderProvider {
    fn default() -> Self {
        Self::new(PLACEHOLDER_TEXT)
    }
}

impl RecognitionProvider for PlaceholderProvider {
    fn display_name(&self) -> &'static str {
        "Placeholder (simulated)"
    }

    fn latency(&self) -> Duration {
        PLACEHOLDER_LATENCY
    }

    fn recognize(
        &self,
        asset: &VideoAsset,
        _cancel: &CancelFlag,
    ) -> Result<String, RecognitionError> {
        tracing::debug!(uri = %asset.uri, "placeholder recognition");
        Ok(self.text.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CommandOutput {
    text: String,
}

/// Runs an external recognizer. The asset is written to stdin as JSON and the
/// program must print `{"text": "..."}` to stdout. The child is killed when the
/// job is cancelled.
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
}

impl CommandProvider {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn fail(&self, child: &mut Child, reason: String) -> RecognitionError {
        let _ = child.kill();
        let _ = child.wait();
        RecognitionError::Command(format!("{}: {reason}", self.program))
    }
}

impl RecognitionProvider for CommandProvider {
    fn display_name(&self) -> &'static str {
        "External command"
    }

    fn latency(&self) -> Duration {
        Duration::ZERO
    }

    fn recognize(
        &self,
        asset: &VideoAsset,
        cancel: &CancelFlag,
    ) -> Result<String, RecognitionError> {
        let payload = serde_json::to_vec(asset)
            .map_err(|err| RecognitionError::InvalidOutput(err.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| RecognitionError::Command(format!("{}: {err}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A recognizer that ignores stdin may exit before we finish writing.
            if let Err(err) = stdin.write_all(&payload) {
                if err.kind() != ErrorKind::BrokenPipe {
                    return Err(self.fail(&mut child, err.to_string()));
                }
            }
        }
        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();

        let status = loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                tracing::debug!(program = %self.program, "recognizer killed");
                return Err(RecognitionError::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(COMMAND_POLL_INTERVAL),
                Err(err) => return Err(self.fail(&mut child, err.to_string())),
            }
        };

        let mut out = Vec::new();
        let mut err_out = Vec::new();
        if let Some(pipe) = stdout.as_mut() {
            pipe.read_to_end(&mut out)
                .map_err(|err| RecognitionError::Command(err.to_string()))?;
        }
        if let Some(pipe) = stderr.as_mut() {
            let _ = pipe.read_to_end(&mut err_out);
        }

        if !status.success() {
            let stderr = String::from_utf8_lossy(&err_out);
            return Err(RecognitionError::Command(format!(
                "{} exited with {}: {}",
                self.program,
                status,
                stderr.trim()
            )));
        }

        parse_command_output(&out)
    }
}

fn parse_command_output(stdout: &[u8]) -> Result<String, RecognitionError> {
    let parsed: CommandOutput = serde_json::from_slice(stdout)
        .map_err(|err| RecognitionError::InvalidOutput(err.to_string()))?;
    let text = parsed.text.trim();
    if text.is_empty() {
        return Err(RecognitionError::EmptyResult);
    }
    Ok(text.to_string())
}

pub fn select_provider(config: &AppConfig) -> Box<dyn RecognitionProvider> {
    match config.recognizer {
        RecognizerKind::Placeholder => {
            Box::new(PlaceholderProvider::new(config.placeholder_text.clone()))
        }
        RecognizerKind::Command => Box::new(CommandProvider::new(
            config.recognizer_cmd.clone().unwrap_or_default(),
            config.recognizer_args.clone(),
        )),
    }
}
