use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// Answer to a single platform permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraFacing {
    #[default]
    Front,
    Back,
}

impl CameraFacing {
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraFacing::Front => "Front",
            CameraFacing::Back => "Back",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Ready,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraVisibility {
    Active,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    P480,
    P720,
    P1080,
    /// Picker export at full source quality.
    Highest,
}

impl QualityTier {
    pub fn label(self) -> &'static str {
        match self {
            QualityTier::P480 => "480p",
            QualityTier::P720 => "720p",
            QualityTier::P1080 => "1080p",
            QualityTier::Highest => "highest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSource {
    Camera,
    Library,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub uri: String,
    pub source: VideoSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub quality: QualityTier,
}

impl VideoAsset {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }
}

/// Screen-level flow. Recording/processing/modal flags are folded into one tag so
/// a modal can never coexist with a live recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    AwaitingPermission,
    Denied,
    CameraIdle,
    Recording { started_at: Duration },
    Processing { source: VideoSource },
    ReviewModal,
    RecognitionFailed { reason: String },
}

impl FlowState {
    pub fn label(&self) -> &'static str {
        match self {
            FlowState::AwaitingPermission => "AwaitingPermission",
            FlowState::Denied => "Denied",
            FlowState::CameraIdle => "CameraIdle",
            FlowState::Recording { .. } => "Recording",
            FlowState::Processing { .. } => "Processing",
            FlowState::ReviewModal => "ReviewModal",
            FlowState::RecognitionFailed { .. } => "RecognitionFailed",
        }
    }

    pub fn recording_state(&self) -> RecordingState {
        match self {
            FlowState::Recording { .. } => RecordingState::Recording,
            _ => RecordingState::Idle,
        }
    }

    pub fn processing_state(&self) -> ProcessingState {
        match self {
            FlowState::Processing { .. } => ProcessingState::Processing,
            _ => ProcessingState::Ready,
        }
    }

    pub fn permission_state(&self) -> PermissionState {
        match self {
            FlowState::AwaitingPermission => PermissionState::Unknown,
            FlowState::Denied => PermissionState::Denied,
            _ => PermissionState::Granted,
        }
    }

    pub fn has_open_modal(&self) -> bool {
        matches!(
            self,
            FlowState::ReviewModal | FlowState::RecognitionFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derived_states_follow_flow_tag() {
        let recording = FlowState::Recording {
            started_at: Duration::ZERO,
        };
        assert_eq!(recording.recording_state(), RecordingState::Recording);
        assert_eq!(recording.processing_state(), ProcessingState::Ready);

        let processing = FlowState::Processing {
            source: VideoSource::Library,
        };
        assert_eq!(processing.recording_state(), RecordingState::Idle);
        assert_eq!(processing.processing_state(), ProcessingState::Processing);

        assert_eq!(
            FlowState::AwaitingPermission.permission_state(),
            PermissionState::Unknown
        );
        assert_eq!(FlowState::Denied.permission_state(), PermissionState::Denied);
        assert_eq!(
            FlowState::ReviewModal.permission_state(),
            PermissionState::Granted
        );
    }

    #[test]
    fn facing_defaults_to_front_and_flips() {
        assert_eq!(CameraFacing::default(), CameraFacing::Front);
        assert_eq!(CameraFacing::Front.flipped(), CameraFacing::Back);
        assert_eq!(CameraFacing::Back.flipped(), CameraFacing::Front);
    }

    #[test]
    fn asset_json_omits_missing_duration() {
        let asset = VideoAsset {
            uri: "file:///picked.mp4".to_string(),
            source: VideoSource::Library,
            duration_ms: None,
            quality: QualityTier::Highest,
        };
        let json = serde_json::to_value(&asset).expect("serialize asset");
        assert_eq!(
            json,
            serde_json::json!({
                "uri": "file:///picked.mp4",
                "source": "library",
                "quality": "highest",
            })
        );
    }
}
