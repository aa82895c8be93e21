use std::{sync::Arc, time::Duration};

use crate::{
    model::{CameraFacing, CameraVisibility, FlowState, PermissionState, VideoSource},
    permissions::{PermissionGateway, PermissionService},
    provider::RecognitionProvider,
    services::{CameraDevice, MediaPicker},
    splash::SplashTimer,
    state_machine::{CaptureFlowController, FlowEvent, Transition},
};

/// Platform collaborators handed to the capture screen when it mounts.
pub struct AppServices {
    pub permissions: Arc<dyn PermissionService>,
    pub camera: Box<dyn CameraDevice>,
    pub picker: Box<dyn MediaPicker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ToggleRecording,
    PickVideo,
    FlipCamera,
    CloseModal,
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraOverlay {
    None,
    Recording { elapsed: Duration },
    Processing { source: VideoSource, spinner_angle: f32 },
    Result { text: String },
    Failure { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraView {
    pub facing: CameraFacing,
    pub camera_active: bool,
    pub controls_enabled: bool,
    pub overlay: CameraOverlay,
}

/// Exactly one of these is on screen at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Splash,
    PermissionPending,
    NoAccess,
    Camera(CameraView),
}

struct Mounted {
    gateway: PermissionGateway,
    controller: CaptureFlowController,
}

enum Phase {
    Splash {
        timer: SplashTimer,
        services: AppServices,
        provider: Box<dyn RecognitionProvider>,
    },
    Mounted(Box<Mounted>),
    Shutdown,
}

pub struct App {
    phase: Phase,
    now: Duration,
}

impl App {
    pub fn new(services: AppServices, provider: Box<dyn RecognitionProvider>) -> Self {
        tracing::info!(recognizer = provider.display_name(), "app starting");
        Self {
            phase: Phase::Splash {
                timer: SplashTimer::start(Duration::ZERO),
                services,
                provider,
            },
            now: Duration::ZERO,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Advance to `now` (time since launch). Returns true when a redraw is due.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.now = self.now.max(now);
        let now = self.now;
        let mut changed = false;

        if let Phase::Splash { timer, .. } = &mut self.phase {
            if !timer.poll(now) {
                return false;
            }
            self.mount();
            changed = true;
        }

        let Phase::Mounted(mounted) = &mut self.phase else {
            return changed;
        };
        if mounted.controller.permission_state() == PermissionState::Unknown {
            let permission = mounted.gateway.poll();
            if permission != PermissionState::Unknown {
                mounted
                    .controller
                    .handle(FlowEvent::PermissionsResolved(permission), now);
                changed = true;
            }
        }
        mounted.controller.tick(now) || changed
    }

    fn mount(&mut self) {
        let (services, provider) = match std::mem::replace(&mut self.phase, Phase::Shutdown) {
            Phase::Splash {
                services, provider, ..
            } => (services, provider),
            other => {
                self.phase = other;
                return;
            }
        };
        tracing::debug!("splash finished, mounting capture screen");
        let gateway = PermissionGateway::spawn(services.permissions);
        let controller = CaptureFlowController::new(services.camera, services.picker, provider);
        self.phase = Phase::Mounted(Box::new(Mounted {
            gateway,
            controller,
        }));
    }

    pub fn controller(&self) -> Option<&CaptureFlowController> {
        match &self.phase {
            Phase::Mounted(mounted) => Some(&mounted.controller),
            _ => None,
        }
    }

    /// Returns true if the action changed anything.
    pub fn dispatch(&mut self, action: UserAction) -> bool {
        let now = self.now;
        let Phase::Mounted(mounted) = &mut self.phase else {
            return false;
        };
        let controller = &mut mounted.controller;
        let transition = match action {
            UserAction::ToggleRecording => controller.toggle_recording(now),
            UserAction::PickVideo => controller.handle(FlowEvent::PickVideo, now),
            UserAction::FlipCamera => controller.handle(FlowEvent::ToggleFacing, now),
            UserAction::CloseModal => controller.handle(FlowEvent::DismissModal, now),
            UserAction::Back => controller.handle(FlowEvent::HardwareBack, now),
        };
        transition == Transition::Applied
    }

    pub fn screen(&self) -> Screen {
        let controller = match &self.phase {
            Phase::Splash { .. } => return Screen::Splash,
            Phase::Shutdown => return Screen::Splash,
            Phase::Mounted(mounted) => &mounted.controller,
        };
        match controller.permission_state() {
            PermissionState::Unknown => return Screen::PermissionPending,
            PermissionState::Denied => return Screen::NoAccess,
            PermissionState::Granted => {}
        }

        let overlay = match controller.state() {
            FlowState::Recording { .. } => CameraOverlay::Recording {
                elapsed: controller.recording_elapsed(self.now).unwrap_or_default(),
            },
            FlowState::Processing { source } => CameraOverlay::Processing {
                source: *source,
                spinner_angle: controller.spinner_angle(self.now),
            },
            FlowState::ReviewModal => match controller.recognition_result() {
                Some(text) => CameraOverlay::Result {
                    text: text.to_string(),
                },
                None => CameraOverlay::None,
            },
            FlowState::RecognitionFailed { reason } => CameraOverlay::Failure {
                reason: reason.clone(),
            },
            _ => CameraOverlay::None,
        };
        Screen::Camera(CameraView {
            facing: controller.facing(),
            camera_active: controller.camera_visibility() == CameraVisibility::Active,
            controls_enabled: controller.controls_enabled(),
            overlay,
        })
    }

    pub fn shutdown(&mut self) {
        if let Phase::Mounted(mounted) = &mut self.phase {
            mounted.controller.teardown();
        }
        self.phase = Phase::Shutdown;
        tracing::info!("app shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QualityTier, VideoAsset};
    use crate::permissions::StaticPermissionService;
    use crate::provider::PlaceholderProvider;
    use crate::services::{PickOutcome, ScriptedMediaPicker, StubCameraDevice};
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    fn app_with(permissions: StaticPermissionService, picks: Vec<PickOutcome>) -> App {
        App::new(
            AppServices {
                permissions: Arc::new(permissions),
                camera: Box::new(StubCameraDevice::default()),
                picker: Box::new(ScriptedMediaPicker::new(picks)),
            },
            Box::new(PlaceholderProvider::default()),
        )
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Tick at `now` until the permission worker has answered.
    fn settle_permissions(app: &mut App, now: Duration) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.screen() == Screen::PermissionPending {
            assert!(Instant::now() < deadline, "permission worker never answered");
            app.tick(now);
            std::thread::yield_now();
        }
    }

    /// Tick at `now` until the recognizer worker has answered.
    fn settle_processing(app: &mut App, now: Duration) {
        let deadline = Instant::now() + Duration::from_secs(5);
        app.tick(now);
        while matches!(camera_view(app).overlay, CameraOverlay::Processing { .. }) {
            assert!(Instant::now() < deadline, "recognizer worker never answered");
            std::thread::sleep(Duration::from_millis(1));
            app.tick(now);
        }
    }

    fn camera_view(app: &App) -> CameraView {
        match app.screen() {
            Screen::Camera(view) => view,
            other => panic!("expected camera screen, got {other:?}"),
        }
    }

    #[test]
    fn splash_holds_for_five_seconds() {
        let mut app = app_with(StaticPermissionService::granted(), Vec::new());
        app.tick(ms(4_999));
        assert_eq!(app.screen(), Screen::Splash);
        assert!(!app.dispatch(UserAction::ToggleRecording));

        app.tick(ms(5_000));
        assert_ne!(app.screen(), Screen::Splash);
        settle_permissions(&mut app, ms(5_000));
        let view = camera_view(&app);
        assert_eq!(view.facing, CameraFacing::Front);
        assert!(view.camera_active);
        assert_eq!(view.overlay, CameraOverlay::None);
    }

    #[test]
    fn denied_permissions_show_no_access_indefinitely() {
        let mut app = app_with(StaticPermissionService::denied(), Vec::new());
        app.tick(ms(5_000));
        settle_permissions(&mut app, ms(5_000));
        assert_eq!(app.screen(), Screen::NoAccess);

        app.tick(ms(600_000));
        assert!(!app.dispatch(UserAction::ToggleRecording));
        assert_eq!(app.screen(), Screen::NoAccess);
    }

    #[test]
    fn record_scenario_end_to_end() {
        let mut app = app_with(StaticPermissionService::granted(), Vec::new());
        app.tick(ms(5_000));
        settle_permissions(&mut app, ms(5_000));

        assert!(app.dispatch(UserAction::ToggleRecording));
        app.tick(ms(8_000));
        assert_eq!(
            camera_view(&app).overlay,
            CameraOverlay::Recording { elapsed: ms(3_000) }
        );

        assert!(app.dispatch(UserAction::ToggleRecording));
        app.tick(ms(8_750));
        assert_eq!(
            camera_view(&app).overlay,
            CameraOverlay::Processing {
                source: VideoSource::Camera,
                spinner_angle: 180.0,
            }
        );

        settle_processing(&mut app, ms(10_000));
        let view = camera_view(&app);
        assert_eq!(
            view.overlay,
            CameraOverlay::Result {
                text: "Hello".to_string()
            }
        );
        assert!(!view.camera_active);

        assert!(app.dispatch(UserAction::CloseModal));
        assert!(!camera_view(&app).camera_active);
        app.tick(ms(10_300));
        let view = camera_view(&app);
        assert!(view.camera_active);
        assert!(view.controls_enabled);
        assert_eq!(view.overlay, CameraOverlay::None);
    }

    #[test]
    fn cancelled_pick_leaves_camera_idle() {
        let mut app = app_with(
            StaticPermissionService::granted(),
            vec![PickOutcome::Cancelled],
        );
        app.tick(ms(5_000));
        settle_permissions(&mut app, ms(5_000));

        assert!(!app.dispatch(UserAction::PickVideo));
        let view = camera_view(&app);
        assert!(view.camera_active);
        assert_eq!(view.overlay, CameraOverlay::None);
    }

    #[test]
    fn picked_clip_reaches_review() {
        let asset = VideoAsset {
            uri: "file:///library/clip.mov".to_string(),
            source: VideoSource::Library,
            duration_ms: None,
            quality: QualityTier::P480,
        };
        let mut app = app_with(
            StaticPermissionService::granted(),
            vec![PickOutcome::Picked(asset)],
        );
        app.tick(ms(5_000));
        settle_permissions(&mut app, ms(5_000));

        assert!(app.dispatch(UserAction::PickVideo));
        settle_processing(&mut app, ms(7_000));
        assert_eq!(
            camera_view(&app).overlay,
            CameraOverlay::Result {
                text: "Hello".to_string()
            }
        );
        assert!(app.dispatch(UserAction::Back));
        assert!(!app.dispatch(UserAction::Back));
    }

    #[test]
    fn shutdown_tears_down_controller() {
        let mut app = app_with(StaticPermissionService::granted(), Vec::new());
        app.tick(ms(5_000));
        settle_permissions(&mut app, ms(5_000));
        app.dispatch(UserAction::ToggleRecording);

        app.shutdown();
        assert!(app.controller().is_none());
        assert!(!app.tick(ms(20_000)));
    }
}
