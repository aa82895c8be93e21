use std::{collections::VecDeque, time::Duration};

use anyhow::{bail, Result};

use crate::model::{CameraFacing, QualityTier, VideoAsset, VideoSource};

pub const MAX_RECORDING_DURATION: Duration = Duration::from_secs(10);
pub const RECORDING_QUALITY: QualityTier = QualityTier::P720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingOptions {
    pub max_duration: Duration,
    pub quality: QualityTier,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            max_duration: MAX_RECORDING_DURATION,
            quality: RECORDING_QUALITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMedia {
    VideosOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerOptions {
    pub media: PickerMedia,
    pub allow_editing: bool,
    pub quality: QualityTier,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            media: PickerMedia::VideosOnly,
            allow_editing: true,
            quality: QualityTier::Highest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(VideoAsset),
    Cancelled,
}

pub trait CameraDevice: Send {
    fn set_facing(&mut self, facing: CameraFacing) -> Result<()>;
    /// `now` is the controller clock, so stubs can stamp clip durations.
    fn start_recording(&mut self, options: RecordingOptions, now: Duration) -> Result<()>;
    fn stop_recording(&mut self, now: Duration) -> Result<VideoAsset>;
}

pub trait MediaPicker: Send {
    fn pick_video(&mut self, options: PickerOptions) -> Result<PickOutcome>;
}

#[derive(Default)]
pub struct StubCameraDevice {
    facing: CameraFacing,
    active: Option<(RecordingOptions, Duration)>,
    clips: u32,
}

impl StubCameraDevice {
    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }
}

impl CameraDevice for StubCameraDevice {
    fn set_facing(&mut self, facing: CameraFacing) -> Result<()> {
        self.facing = facing;
        Ok(())
    }

    fn start_recording(&mut self, options: RecordingOptions, now: Duration) -> Result<()> {
        if self.active.is_some() {
            bail!("camera is already recording");
        }
        self.active = Some((options, now));
        Ok(())
    }

    fn stop_recording(&mut self, now: Duration) -> Result<VideoAsset> {
        let Some((options, started_at)) = self.active.take() else {
            bail!("camera is not recording")
        };
        self.clips += 1;
        let elapsed = now.saturating_sub(started_at).min(options.max_duration);
        Ok(VideoAsset {
            uri: format!(
                "file:///camera/{}-{:03}.mp4",
                self.facing.label().to_lowercase(),
                self.clips
            ),
            source: VideoSource::Camera,
            duration_ms: Some(elapsed.as_millis() as u64),
            quality: options.quality,
        })
    }
}

/// Picker that replays queued outcomes, then reports cancellation.
#[derive(Default)]
pub struct ScriptedMediaPicker {
    outcomes: VecDeque<PickOutcome>,
}

impl ScriptedMediaPicker {
    pub fn new(outcomes: impl IntoIterator<Item = PickOutcome>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
        }
    }

    pub fn push(&mut self, outcome: PickOutcome) {
        self.outcomes.push_back(outcome);
    }
}

impl MediaPicker for ScriptedMediaPicker {
    fn pick_video(&mut self, options: PickerOptions) -> Result<PickOutcome> {
        Ok(match self.outcomes.pop_front() {
            Some(PickOutcome::Picked(mut asset)) => {
                asset.quality = options.quality;
                PickOutcome::Picked(asset)
            }
            Some(PickOutcome::Cancelled) | None => PickOutcome::Cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stub_camera_caps_clip_duration() {
        let mut camera = StubCameraDevice::default();
        camera.set_facing(CameraFacing::Back).expect("facing");
        camera
            .start_recording(RecordingOptions::default(), Duration::from_secs(1))
            .expect("start");

        let asset = camera.stop_recording(Duration::from_secs(30)).expect("stop");
        assert_eq!(asset.uri, "file:///camera/back-001.mp4");
        assert_eq!(asset.duration(), Some(Duration::from_secs(10)));
        assert_eq!(asset.quality, QualityTier::P720);
        assert!(!camera.is_recording());
    }

    #[test]
    fn stub_camera_rejects_double_start_and_idle_stop() {
        let mut camera = StubCameraDevice::default();
        assert!(camera.stop_recording(Duration::ZERO).is_err());
        camera
            .start_recording(RecordingOptions::default(), Duration::ZERO)
            .expect("start");
        assert!(camera
            .start_recording(RecordingOptions::default(), Duration::ZERO)
            .is_err());
    }

    #[test]
    fn scripted_picker_cancels_when_exhausted() {
        let mut picker = ScriptedMediaPicker::default();
        assert_eq!(
            picker.pick_video(PickerOptions::default()).expect("pick"),
            PickOutcome::Cancelled
        );
    }
}
