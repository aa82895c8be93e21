//! SilentTalk capture core: splash, permission gate, record/pick capture and a
//! pluggable sign recognizer, driven by one explicit flow controller.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod permissions;
pub mod processing;
pub mod provider;
pub mod services;
pub mod spinner;
pub mod splash;
pub mod state_machine;
pub mod theme;
pub mod timers;
pub mod ui;

pub use app::{App, AppServices, Screen, UserAction};
pub use config::AppConfig;
pub use logging::{init_logging, log_file_path};
pub use provider::{select_provider, RecognitionProvider};
pub use state_machine::{CaptureFlowController, FlowEvent, Transition};
