//! Actuation request (`carControl`) payload.

use serde::{Deserialize, Serialize};

use crate::consts::{LEAD_DISTANCE_BARS, SET_SPEED_NOT_SET};

/// Longitudinal controller mode requested from the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum LongControlState {
    #[default]
    Off = 0,
    /// Track the requested acceleration.
    Pid = 1,
    /// Bring the vehicle to / hold it at standstill.
    Stopping = 2,
}

/// One tick's actuation request. Recomputed from scratch every tick.
///
/// Invariant: `lat_active` and `long_active` imply `enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActuationRequest {
    pub enabled: bool,
    pub lat_active: bool,
    pub long_active: bool,
    /// Requested acceleration [m/s²].
    pub accel: f32,
    /// Normalized steering torque [-1, 1]; neutral unless `lat_active`.
    pub torque: f32,
    pub long_control_state: LongControlState,
    pub left_blinker: bool,
    pub right_blinker: bool,
    /// Never asks the vehicle to cancel its own cruise control.
    pub cruise_cancel: bool,
    /// Fixed HUD value.
    pub lead_distance_bars: u8,
    /// Fixed HUD value [m/s].
    pub set_speed: f32,
}

impl Default for ActuationRequest {
    fn default() -> Self {
        Self {
            enabled: false,
            lat_active: false,
            long_active: false,
            accel: 0.0,
            torque: 0.0,
            long_control_state: LongControlState::Off,
            left_blinker: false,
            right_blinker: false,
            cruise_cancel: false,
            lead_distance_bars: LEAD_DISTANCE_BARS,
            set_speed: SET_SPEED_NOT_SET,
        }
    }
}

impl ActuationRequest {
    /// Check the enable invariant.
    #[inline]
    pub const fn is_consistent(&self) -> bool {
        (!self.lat_active || self.enabled) && (!self.long_active || self.enabled)
    }
}
