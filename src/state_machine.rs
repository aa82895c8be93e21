use std::time::Duration;

use crate::{
    error::RecognitionError,
    model::{
        CameraFacing, CameraVisibility, FlowState, PermissionState, ProcessingState,
        RecordingState, VideoAsset, VideoSource,
    },
    processing::ProcessingSimulator,
    provider::RecognitionProvider,
    services::{CameraDevice, MediaPicker, PickOutcome, PickerOptions, RecordingOptions},
    spinner::SpinnerAnimation,
    timers::{TimerId, TimerQueue},
};

/// Delay between closing the result modal and showing the camera again.
pub const CAMERA_GRACE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    PermissionsResolved(PermissionState),
    StartRecording,
    StopRecording,
    PickVideo,
    ToggleFacing,
    DismissModal,
    HardwareBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowTimer {
    RecordingCap,
    CameraGrace,
}

pub struct CaptureFlowController {
    state: FlowState,
    facing: CameraFacing,
    camera_visibility: CameraVisibility,
    result: Option<String>,
    asset: Option<VideoAsset>,
    timers: TimerQueue<FlowTimer>,
    cap_timer: Option<TimerId>,
    spinner: SpinnerAnimation,
    simulator: ProcessingSimulator,
    camera: Box<dyn CameraDevice>,
    picker: Box<dyn MediaPicker>,
    last_now: Duration,
    torn_down: bool,
}

impl CaptureFlowController {
    pub fn new(
        camera: Box<dyn CameraDevice>,
        picker: Box<dyn MediaPicker>,
        provider: Box<dyn RecognitionProvider>,
    ) -> Self {
        Self {
            state: FlowState::AwaitingPermission,
            facing: CameraFacing::default(),
            camera_visibility: CameraVisibility::Active,
            result: None,
            asset: None,
            timers: TimerQueue::new(),
            cap_timer: None,
            spinner: SpinnerAnimation::new(),
            simulator: ProcessingSimulator::new(provider),
            camera,
            picker,
            last_now: Duration::ZERO,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn permission_state(&self) -> PermissionState {
        self.state.permission_state()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.state.recording_state()
    }

    pub fn processing_state(&self) -> ProcessingState {
        self.state.processing_state()
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn camera_visibility(&self) -> CameraVisibility {
        self.camera_visibility
    }

    pub fn recognition_result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn current_asset(&self) -> Option<&VideoAsset> {
        self.asset.as_ref()
    }

    pub fn modal_visible(&self) -> bool {
        self.state == FlowState::ReviewModal && self.result.is_some()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            FlowState::RecognitionFailed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.simulator.provider_name()
    }

    /// Controls are only reachable while the live camera view is on screen.
    pub fn controls_enabled(&self) -> bool {
        !self.torn_down
            && self.camera_visibility == CameraVisibility::Active
            && matches!(
                self.state,
                FlowState::CameraIdle | FlowState::Recording { .. }
            )
    }

    pub fn recording_elapsed(&self, now: Duration) -> Option<Duration> {
        match self.state {
            FlowState::Recording { started_at } => Some(now.saturating_sub(started_at)),
            _ => None,
        }
    }

    pub fn spinner_angle(&self, now: Duration) -> f32 {
        self.spinner.angle(now)
    }

    pub fn active_animation_loops(&self) -> usize {
        self.spinner.active_loops()
    }

    /// Timers, animation loops and recognition jobs still outstanding.
    pub fn pending_handles(&self) -> usize {
        self.timers.len() + self.spinner.active_loops() + usize::from(self.simulator.is_pending())
    }

    pub fn handle(&mut self, event: FlowEvent, now: Duration) -> Transition {
        if self.torn_down {
            return Transition::Ignored;
        }
        self.last_now = self.last_now.max(now);
        let transition = match event {
            FlowEvent::PermissionsResolved(permission) => self.resolve_permissions(permission),
            FlowEvent::StartRecording => self.start_recording(now),
            FlowEvent::StopRecording => self.stop_recording(now),
            FlowEvent::PickVideo => self.pick_video(now),
            FlowEvent::ToggleFacing => self.toggle_facing(),
            FlowEvent::DismissModal | FlowEvent::HardwareBack => self.dismiss_modal(now),
        };
        if transition == Transition::Ignored {
            tracing::trace!(?event, state = self.state.label(), "event ignored");
        }
        transition
    }

    /// Hardware back press. Returns true when it closed a modal.
    pub fn handle_back(&mut self, now: Duration) -> bool {
        self.handle(FlowEvent::HardwareBack, now) == Transition::Applied
    }

    /// Record and stop share one button.
    pub fn toggle_recording(&mut self, now: Duration) -> Transition {
        match self.state {
            FlowState::Recording { .. } => self.handle(FlowEvent::StopRecording, now),
            _ => self.handle(FlowEvent::StartRecording, now),
        }
    }

    /// Fire due timers and collect a finished recognition. Returns true if
    /// anything changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        if self.torn_down {
            return false;
        }
        self.last_now = self.last_now.max(now);
        let mut changed = false;
        while let Some(timer) = self.timers.pop_due(now) {
            changed = true;
            match timer {
                FlowTimer::RecordingCap => {
                    self.cap_timer = None;
                    tracing::debug!("recording hit the duration cap");
                    self.stop_recording(now);
                }
                FlowTimer::CameraGrace => {
                    self.camera_visibility = CameraVisibility::Active;
                    tracing::debug!("camera reactivated");
                }
            }
        }
        if let Some(outcome) = self.simulator.poll(now) {
            self.finish_processing(outcome);
            changed = true;
        }
        if self.spinner.is_running() || self.recording_state() == RecordingState::Recording {
            changed = true;
        }
        changed
    }

    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.timers.cancel_all();
        self.cap_timer = None;
        self.simulator.cancel();
        self.spinner.stop();
        if let FlowState::Recording { .. } = self.state {
            if let Err(err) = self.camera.stop_recording(self.last_now) {
                tracing::warn!(error = %err, "failed stopping camera during teardown");
            }
        }
        self.torn_down = true;
        tracing::debug!(state = self.state.label(), "flow controller torn down");
    }

    fn set_state(&mut self, next: FlowState) {
        tracing::debug!(from = self.state.label(), to = next.label(), "flow transition");
        self.state = next;
    }

    fn resolve_permissions(&mut self, permission: PermissionState) -> Transition {
        if self.state != FlowState::AwaitingPermission {
            return Transition::Ignored;
        }
        match permission {
            PermissionState::Unknown => Transition::Ignored,
            PermissionState::Granted => {
                self.camera_visibility = CameraVisibility::Active;
                self.set_state(FlowState::CameraIdle);
                Transition::Applied
            }
            PermissionState::Denied => {
                self.set_state(FlowState::Denied);
                Transition::Applied
            }
        }
    }

    fn camera_idle_and_visible(&self) -> bool {
        self.state == FlowState::CameraIdle && self.camera_visibility == CameraVisibility::Active
    }

    fn start_recording(&mut self, now: Duration) -> Transition {
        if !self.camera_idle_and_visible() {
            return Transition::Ignored;
        }
        self.result = None;
        let options = RecordingOptions::default();
        if let Err(err) = self.camera.start_recording(options, now) {
            tracing::warn!(error = %err, "camera failed to start recording");
            return Transition::Ignored;
        }
        self.cap_timer = Some(
            self.timers
                .schedule(now, options.max_duration, FlowTimer::RecordingCap),
        );
        self.set_state(FlowState::Recording { started_at: now });
        Transition::Applied
    }

    fn stop_recording(&mut self, now: Duration) -> Transition {
        if !matches!(self.state, FlowState::Recording { .. }) {
            return Transition::Ignored;
        }
        if let Some(id) = self.cap_timer.take() {
            self.timers.cancel(id);
        }
        match self.camera.stop_recording(now) {
            Ok(asset) => self.submit(asset, VideoSource::Camera, now),
            Err(err) => {
                tracing::warn!(error = %err, "camera failed to finish recording");
                self.set_state(FlowState::CameraIdle);
            }
        }
        Transition::Applied
    }

    fn pick_video(&mut self, now: Duration) -> Transition {
        if !self.camera_idle_and_visible() {
            return Transition::Ignored;
        }
        match self.picker.pick_video(PickerOptions::default()) {
            Ok(PickOutcome::Picked(asset)) => {
                self.submit(asset, VideoSource::Library, now);
                Transition::Applied
            }
            Ok(PickOutcome::Cancelled) => {
                tracing::debug!("video picker cancelled");
                Transition::Ignored
            }
            Err(err) => {
                tracing::warn!(error = %err, "video picker failed");
                Transition::Ignored
            }
        }
    }

    fn toggle_facing(&mut self) -> Transition {
        if !self.camera_idle_and_visible() {
            return Transition::Ignored;
        }
        let next = self.facing.flipped();
        if let Err(err) = self.camera.set_facing(next) {
            tracing::warn!(error = %err, "camera failed to switch facing");
            return Transition::Ignored;
        }
        self.facing = next;
        Transition::Applied
    }

    fn submit(&mut self, asset: VideoAsset, source: VideoSource, now: Duration) {
        self.asset = Some(asset.clone());
        match self.simulator.submit(asset, now) {
            Ok(()) => {}
            Err(RecognitionError::Busy) => {
                tracing::warn!("recognition submission rejected, recognizer busy");
                self.set_state(FlowState::CameraIdle);
                return;
            }
            Err(err) => {
                tracing::warn!(error = %err, "recognition could not start");
                self.camera_visibility = CameraVisibility::Suspended;
                self.set_state(FlowState::RecognitionFailed {
                    reason: err.to_string(),
                });
                return;
            }
        }
        self.spinner.start(now);
        self.set_state(FlowState::Processing { source });
    }

    fn finish_processing(&mut self, outcome: Result<String, RecognitionError>) {
        if self.state.processing_state() != ProcessingState::Processing {
            return;
        }
        self.spinner.stop();
        self.camera_visibility = CameraVisibility::Suspended;
        match outcome {
            Ok(text) => {
                tracing::info!(result = %text, "recognition finished");
                self.result = Some(text);
                self.set_state(FlowState::ReviewModal);
            }
            Err(err) => {
                tracing::warn!(error = %err, "recognition failed");
                self.set_state(FlowState::RecognitionFailed {
                    reason: err.to_string(),
                });
            }
        }
    }

    fn dismiss_modal(&mut self, now: Duration) -> Transition {
        if !self.state.has_open_modal() {
            return Transition::Ignored;
        }
        self.set_state(FlowState::CameraIdle);
        self.timers.cancel_kind(FlowTimer::CameraGrace);
        self.timers
            .schedule(now, CAMERA_GRACE_DELAY, FlowTimer::CameraGrace);
        Transition::Applied
    }
}

impl Drop for CaptureFlowController {
    fn drop(&mut self) {
        self.teardown();
    }
}
