//! Camera, microphone and media-library access, requested once per session.

use std::{sync::Arc, thread};

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::model::{PermissionState, PermissionStatus};

pub trait PermissionService: Send + Sync {
    fn request_camera(&self) -> Result<PermissionStatus>;
    fn request_microphone(&self) -> Result<PermissionStatus>;
    fn request_media_library(&self) -> Result<PermissionStatus>;
}

#[derive(Debug, Clone, Copy)]
pub struct StaticPermissionService {
    pub camera: PermissionStatus,
    pub microphone: PermissionStatus,
    pub media_library: PermissionStatus,
}

impl StaticPermissionService {
    pub fn granted() -> Self {
        Self {
            camera: PermissionStatus::Granted,
            microphone: PermissionStatus::Granted,
            media_library: PermissionStatus::Granted,
        }
    }

    pub fn denied() -> Self {
        Self {
            camera: PermissionStatus::Denied,
            microphone: PermissionStatus::Denied,
            media_library: PermissionStatus::Denied,
        }
    }
}

impl PermissionService for StaticPermissionService {
    fn request_camera(&self) -> Result<PermissionStatus> {
        Ok(self.camera)
    }

    fn request_microphone(&self) -> Result<PermissionStatus> {
        Ok(self.microphone)
    }

    fn request_media_library(&self) -> Result<PermissionStatus> {
        Ok(self.media_library)
    }
}

fn granted_or_log(name: &str, answer: Result<PermissionStatus>) -> bool {
    match answer {
        Ok(status) => {
            tracing::debug!(permission = name, ?status, "permission answered");
            status.is_granted()
        }
        Err(err) => {
            tracing::warn!(permission = name, error = %err, "permission request failed");
            false
        }
    }
}

/// Issue all three requests concurrently and AND the answers. A failed request
/// counts as a denial.
pub fn request_all(service: &dyn PermissionService) -> bool {
    let (camera, microphone, media_library) = thread::scope(|scope| {
        let camera = scope.spawn(|| service.request_camera());
        let microphone = scope.spawn(|| service.request_microphone());
        let media_library = scope.spawn(|| service.request_media_library());
        (
            join_request(camera),
            join_request(microphone),
            join_request(media_library),
        )
    });

    // Evaluate all three so every answer gets logged.
    let camera = granted_or_log("camera", camera);
    let microphone = granted_or_log("microphone", microphone);
    let media_library = granted_or_log("media_library", media_library);
    camera && microphone && media_library
}

fn join_request(
    handle: thread::ScopedJoinHandle<'_, Result<PermissionStatus>>,
) -> Result<PermissionStatus> {
    handle
        .join()
        .unwrap_or_else(|_| Err(anyhow::anyhow!("permission request panicked")))
}

/// Runs [`request_all`] off the UI thread; the UI polls until it resolves.
pub struct PermissionGateway {
    state: PermissionState,
    rx: Option<Receiver<bool>>,
}

impl PermissionGateway {
    pub fn spawn(service: Arc<dyn PermissionService>) -> Self {
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let granted = request_all(service.as_ref());
            let _ = tx.send(granted);
        });
        Self {
            state: PermissionState::Unknown,
            rx: Some(rx),
        }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Non-blocking. Once resolved the answer never changes.
    pub fn poll(&mut self) -> PermissionState {
        let Some(rx) = self.rx.as_ref() else {
            return self.state;
        };
        match rx.try_recv() {
            Ok(granted) => {
                self.resolve(granted);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("permission worker exited without an answer");
                self.resolve(false);
            }
        }
        self.state
    }

    /// Blocks until the worker answers. Used by tests and headless callers.
    pub fn wait(&mut self) -> PermissionState {
        if let Some(rx) = self.rx.as_ref() {
            let granted = rx.recv().unwrap_or(false);
            self.resolve(granted);
        }
        self.state
    }

    fn resolve(&mut self, granted: bool) {
        self.rx = None;
        self.state = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        tracing::info!(state = ?self.state, "permissions resolved");
    }
}
