//! Status report (`selfdriveState`) payload.

use serde::{Deserialize, Serialize};

/// Coarse engagement state shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum EngagementStatus {
    #[default]
    Disabled = 0,
    Active = 1,
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum AlertStatus {
    #[default]
    Normal = 0,
    UserPrompt = 1,
    Critical = 2,
}

/// Alert banner size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum AlertSize {
    #[default]
    None = 0,
    Small = 1,
    Mid = 2,
    Full = 3,
}

/// User-facing status, derived fresh every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub state: EngagementStatus,
    pub alert_text1: String,
    pub alert_text2: String,
    pub alert_status: AlertStatus,
    pub alert_size: AlertSize,
    pub enabled: bool,
    /// Lateral or longitudinal control active.
    pub active: bool,
    pub engageable: bool,
}

impl StatusReport {
    /// Disabled alert with all engagement fields cleared.
    pub fn disabled(
        text1: &str,
        text2: impl Into<String>,
        alert_status: AlertStatus,
        alert_size: AlertSize,
    ) -> Self {
        Self {
            state: EngagementStatus::Disabled,
            alert_text1: text1.to_string(),
            alert_text2: text2.into(),
            alert_status,
            alert_size,
            enabled: false,
            active: false,
            engageable: false,
        }
    }

    /// Heartbeat published while vehicle telemetry is absent.
    pub fn heartbeat_no_car_data() -> Self {
        Self::disabled(
            "No Car Data",
            "Waiting for car connection",
            AlertStatus::Normal,
            AlertSize::Small,
        )
    }

    #[inline]
    pub fn has_alert(&self) -> bool {
        !self.alert_text1.is_empty()
    }
}
