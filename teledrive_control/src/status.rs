//! Status reporting.
//!
//! [`StatusReporter`] derives the operator-facing [`StatusReport`] from the
//! engagement state of the tick. Exactly one branch of a fixed priority
//! order picks the alert:
//!
//! | priority | condition              | text1             | status     | size  |
//! |----------|------------------------|-------------------|------------|-------|
//! | 1        | no car data            | No Car Data       | Normal     | Small |
//! | 2        | permanent steer fault  | Steer Fault       | Critical   | Full  |
//! | 3        | graceful stop running  | Joystick Lost     | Critical   | Full  |
//! | 4        | joystick inactive      | No Joystick       | Normal     | Small |
//! | 5        | user disabled          | System Disabled   | UserPrompt | Mid   |
//! | 6        | otherwise              | (none)            | Normal     | None  |
//!
//! [`StatusHook`] is the observability side: it never feeds back into the
//! control path.

use teledrive_common::messages::{
    AlertSize, AlertStatus, EngagementStatus, StatusReport, VehicleState,
};
use tracing::{debug, info};

use crate::engagement::{ControlFlags, EngagementState};

/// Pure mapping from engagement state to [`StatusReport`].
#[derive(Debug, Clone, Copy)]
pub struct StatusReporter {
    rate_hz: u32,
}

impl StatusReporter {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            rate_hz: rate_hz.max(1),
        }
    }

    /// Status while vehicle telemetry is absent.
    #[inline]
    pub fn no_car_data(&self) -> StatusReport {
        StatusReport::heartbeat_no_car_data()
    }

    /// Status for a tick with vehicle telemetry.
    pub fn report(
        &self,
        state: &EngagementState,
        flags: &ControlFlags,
        vehicle: &VehicleState,
    ) -> StatusReport {
        let mut report = if vehicle.steer_fault_permanent {
            StatusReport::disabled(
                "Steer Fault",
                "Take control",
                AlertStatus::Critical,
                AlertSize::Full,
            )
        } else if state.graceful_stop_active() {
            let ticks = state.countdown.ticks().unwrap_or(0);
            let seconds = ticks as f32 / self.rate_hz as f32;
            StatusReport::disabled(
                "Joystick Lost",
                format!("Stopping in {seconds:.1}s"),
                AlertStatus::Critical,
                AlertSize::Full,
            )
        } else if !state.joystick_active {
            StatusReport::disabled(
                "No Joystick",
                "Connect joystick input",
                AlertStatus::Normal,
                AlertSize::Small,
            )
        } else if state.user_disabled {
            StatusReport::disabled(
                "System Disabled",
                "Press cruise button to re-enable",
                AlertStatus::UserPrompt,
                AlertSize::Mid,
            )
        } else {
            StatusReport {
                state: EngagementStatus::Active,
                ..StatusReport::default()
            }
        };

        report.enabled = flags.enabled;
        report.active = flags.any_active();
        report.engageable = flags.enabled && !vehicle.steer_fault_permanent;
        report
    }
}

/// Rate-limited status logger.
///
/// Logs a summary every `interval` ticks and immediately whenever the
/// primary alert text changes.
#[derive(Debug)]
pub struct StatusHook {
    interval: u64,
    ticks: u64,
    last_alert: Option<String>,
}

impl StatusHook {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: u64::from(interval.max(1)),
            ticks: 0,
            last_alert: None,
        }
    }

    /// Observe one published status. Returns true when something was logged.
    pub fn observe(&mut self, report: &StatusReport, state: Option<&EngagementState>) -> bool {
        self.ticks += 1;
        let mut logged = false;

        if self.last_alert.as_deref() != Some(report.alert_text1.as_str()) {
            if report.has_alert() {
                info!(
                    alert = %report.alert_text1,
                    detail = %report.alert_text2,
                    status = ?report.alert_status,
                    "Status alert"
                );
            } else {
                info!(state = ?report.state, "Status alert cleared");
            }
            self.last_alert = Some(report.alert_text1.clone());
            logged = true;
        }

        if self.ticks % self.interval == 0 {
            info!(
                tick = self.ticks,
                state = ?report.state,
                enabled = report.enabled,
                active = report.active,
                alert = %report.alert_text1,
                engagement = ?state,
                "Status"
            );
            if let Ok(json) = serde_json::to_string(report) {
                debug!(target: "teledrive::status", "{json}");
            }
            logged = true;
        }

        logged
    }

    /// Ticks observed so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
