//! Command synthesis: engagement decision + joystick axes → actuation request.
//!
//! Pure, no I/O. The request is rebuilt from scratch every tick.

use teledrive_common::messages::{
    ActuationRequest, JoystickSample, LongControlState, VehicleSnapshot,
};

use crate::config::CommandConfig;
use crate::engagement::{ControlFlags, EngagementState, StopCountdown};
use crate::error::TickError;

/// Turns engagement flags and axes into an [`ActuationRequest`].
#[derive(Debug, Clone, Copy)]
pub struct CommandSynthesizer {
    config: CommandConfig,
}

impl CommandSynthesizer {
    pub fn new(config: CommandConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// Build this tick's request.
    ///
    /// `state` is the engagement state after this tick's step, `flags` the
    /// flags it produced.
    pub fn synthesize(
        &self,
        state: &EngagementState,
        flags: &ControlFlags,
        joystick: &JoystickSample,
        vehicle: &VehicleSnapshot,
    ) -> Result<ActuationRequest, TickError> {
        let speed = vehicle.speed();
        let (accel, long_control_state) = self.longitudinal(state, flags, joystick, speed);

        let torque = if flags.lat_active {
            joystick.lateral().clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let (left_blinker, right_blinker) = if flags.lat_active {
            self.blinkers(torque)
        } else {
            (false, false)
        };

        check_finite("accel", accel)?;
        check_finite("torque", torque)?;

        Ok(ActuationRequest {
            enabled: flags.enabled,
            lat_active: flags.lat_active,
            long_active: flags.long_active,
            accel,
            torque,
            long_control_state,
            left_blinker,
            right_blinker,
            ..ActuationRequest::default()
        })
    }

    fn longitudinal(
        &self,
        state: &EngagementState,
        flags: &ControlFlags,
        joystick: &JoystickSample,
        speed: f32,
    ) -> (f32, LongControlState) {
        let cfg = &self.config;
        let moving = speed > cfg.stopping_speed;

        match state.countdown {
            StopCountdown::Braking(_) => {
                return (cfg.graceful_stop_accel, pid_or_stopping(moving));
            }
            StopCountdown::HardStop => {
                return (cfg.hard_stop_accel, pid_or_stopping(moving));
            }
            StopCountdown::Inactive | StopCountdown::Held => {}
        }

        if flags.long_active {
            let accel = joystick.longitudinal().clamp(-1.0, 1.0) * cfg.accel_scale;
            (accel, pid_or_stopping(moving || accel > cfg.start_accel))
        } else {
            (0.0, pid_or_stopping(moving))
        }
    }

    fn blinkers(&self, torque: f32) -> (bool, bool) {
        let threshold = self.config.blinker_torque;
        (torque < -threshold, torque > threshold)
    }
}

#[inline]
fn pid_or_stopping(pid: bool) -> LongControlState {
    if pid {
        LongControlState::Pid
    } else {
        LongControlState::Stopping
    }
}

#[inline]
fn check_finite(field: &'static str, value: f32) -> Result<(), TickError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TickError::NonFiniteCommand { field, value })
    }
}
