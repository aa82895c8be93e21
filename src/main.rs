use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use silenttalk::{
    init_logging,
    model::{QualityTier, VideoAsset, VideoSource},
    permissions::StaticPermissionService,
    select_provider,
    services::{PickOutcome, ScriptedMediaPicker, StubCameraDevice},
    ui, App, AppConfig, AppServices,
};

fn main() -> Result<()> {
    let config = AppConfig::parse();
    config.validate()?;
    if let Some(path) = init_logging(&config)? {
        tracing::info!(log = %path.display(), "=== SilentTalk started ===");
    }

    let permissions = if config.deny_permissions {
        StaticPermissionService::denied()
    } else {
        StaticPermissionService::granted()
    };
    let picks = config.library_clips.iter().map(|uri| {
        PickOutcome::Picked(VideoAsset {
            uri: uri.clone(),
            source: VideoSource::Library,
            duration_ms: None,
            quality: QualityTier::Highest,
        })
    });
    let services = AppServices {
        permissions: Arc::new(permissions),
        camera: Box::new(StubCameraDevice::default()),
        picker: Box::new(ScriptedMediaPicker::new(picks)),
    };
    let mut app = App::new(services, select_provider(&config));

    let result = ui::run_app(&mut app);
    if let Err(ref err) = result {
        tracing::error!("exit with error: {err:#}");
    }
    tracing::info!("=== SilentTalk exiting ===");
    result
}
