//! TOML configuration for `teledrived`.
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "teledrived"
//!
//! [control]
//! rate_hz = 100
//! joystick_timeout_ticks = 5
//! graceful_stop_ticks = 200
//! vehicle_stale_ticks = 10
//! status_log_interval = 1000
//! profile = "graceful_stop"
//!
//! [command]
//! accel_scale = 4.0
//! graceful_stop_accel = -1.0
//! hard_stop_accel = -3.0
//! stopping_speed = 0.1
//! start_accel = 0.1
//! blinker_torque = 0.2
//! ```
//!
//! Every field is optional; omitted fields take the defaults above.

use std::path::Path;

use serde::{Deserialize, Serialize};
use teledrive_common::config::{ConfigError, ConfigLoader, SharedConfig, check_range};
use teledrive_common::consts::{
    DEFAULT_ACCEL_SCALE, DEFAULT_BLINKER_TORQUE, DEFAULT_GRACEFUL_STOP_ACCEL,
    DEFAULT_GRACEFUL_STOP_TICKS, DEFAULT_HARD_STOP_ACCEL, DEFAULT_JOYSTICK_TIMEOUT_TICKS,
    DEFAULT_RATE_HZ, DEFAULT_STATUS_LOG_INTERVAL, DEFAULT_STOPPING_SPEED,
    DEFAULT_VEHICLE_STALE_TICKS, RATE_HZ_MAX, RATE_HZ_MIN, TICKS_PARAM_MAX,
};

/// Which engagement variant the daemon runs.
///
/// The two variants are kept separate on purpose; there is no mixed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngagementProfile {
    /// Re-engage only with a live joystick; joystick loss while engaged runs
    /// the graceful-then-hard stop; longitudinal control allowed.
    #[default]
    GracefulStop,
    /// Reduced variant: engagement follows joystick liveness, re-engage is
    /// not liveness-gated, no graceful stop, steering only.
    LateralOnly,
}

impl EngagementProfile {
    #[inline]
    pub const fn allows_longitudinal(self) -> bool {
        matches!(self, Self::GracefulStop)
    }
}

/// Loop timing and engagement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub rate_hz: u32,
    pub joystick_timeout_ticks: u32,
    pub graceful_stop_ticks: u32,
    pub vehicle_stale_ticks: u32,
    /// Periodic status log interval [ticks].
    pub status_log_interval: u32,
    pub profile: EngagementProfile,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rate_hz: DEFAULT_RATE_HZ,
            joystick_timeout_ticks: DEFAULT_JOYSTICK_TIMEOUT_TICKS,
            graceful_stop_ticks: DEFAULT_GRACEFUL_STOP_TICKS,
            vehicle_stale_ticks: DEFAULT_VEHICLE_STALE_TICKS,
            status_log_interval: DEFAULT_STATUS_LOG_INTERVAL,
            profile: EngagementProfile::default(),
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("rate_hz", self.rate_hz, RATE_HZ_MIN, RATE_HZ_MAX)?;
        check_range(
            "joystick_timeout_ticks",
            self.joystick_timeout_ticks,
            1,
            TICKS_PARAM_MAX,
        )?;
        check_range(
            "graceful_stop_ticks",
            self.graceful_stop_ticks,
            1,
            TICKS_PARAM_MAX,
        )?;
        check_range(
            "vehicle_stale_ticks",
            self.vehicle_stale_ticks,
            1,
            TICKS_PARAM_MAX,
        )?;
        check_range(
            "status_log_interval",
            self.status_log_interval,
            1,
            u32::MAX,
        )?;
        Ok(())
    }

    /// Nominal tick period [s].
    #[inline]
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.rate_hz as f64
    }
}

/// Command synthesis gains and thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommandConfig {
    /// Acceleration at full longitudinal deflection [m/s²].
    pub accel_scale: f32,
    /// Braking during the graceful-stop countdown [m/s²].
    pub graceful_stop_accel: f32,
    /// Braking on the single hard-stop tick [m/s²].
    pub hard_stop_accel: f32,
    /// Speed above which the longitudinal controller runs PID [m/s].
    pub stopping_speed: f32,
    /// Requested accel above which PID runs from standstill [m/s²].
    pub start_accel: f32,
    /// |torque| above which a blinker is requested.
    pub blinker_torque: f32,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            accel_scale: DEFAULT_ACCEL_SCALE,
            graceful_stop_accel: DEFAULT_GRACEFUL_STOP_ACCEL,
            hard_stop_accel: DEFAULT_HARD_STOP_ACCEL,
            stopping_speed: DEFAULT_STOPPING_SPEED,
            start_accel: DEFAULT_STOPPING_SPEED,
            blinker_torque: DEFAULT_BLINKER_TORQUE,
        }
    }
}

impl CommandConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("accel_scale", self.accel_scale),
            ("graceful_stop_accel", self.graceful_stop_accel),
            ("hard_stop_accel", self.hard_stop_accel),
            ("stopping_speed", self.stopping_speed),
            ("start_accel", self.start_accel),
            ("blinker_torque", self.blinker_torque),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be finite, got {value}"
            )));
        }
        check_range("accel_scale", self.accel_scale, 0.0, 10.0)?;
        check_range("graceful_stop_accel", self.graceful_stop_accel, -10.0, 0.0)?;
        check_range("hard_stop_accel", self.hard_stop_accel, -10.0, 0.0)?;
        check_range("stopping_speed", self.stopping_speed, 0.0, 5.0)?;
        check_range("start_accel", self.start_accel, 0.0, 5.0)?;
        check_range("blinker_torque", self.blinker_torque, 0.0, 1.0)?;
        Ok(())
    }
}

/// Complete daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TeledriveConfig {
    pub shared: SharedConfig,
    pub control: ControlConfig,
    pub command: CommandConfig,
}

impl TeledriveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.control.validate()?;
        self.command.validate()
    }

    /// Parse and validate an in-memory TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = <Self as ConfigLoader>::from_toml(content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// Default path absent; built-in defaults in use.
    Defaults,
}

/// Load and validate the daemon configuration.
///
/// An explicitly requested file must exist. When `explicit` is false a
/// missing file falls back to defaults.
pub fn load_config(
    path: &Path,
    explicit: bool,
) -> Result<(TeledriveConfig, ConfigSource), ConfigError> {
    let (config, source) = match TeledriveConfig::load(path) {
        Ok(config) => (config, ConfigSource::File),
        Err(ConfigError::FileNotFound) if !explicit => {
            (TeledriveConfig::default(), ConfigSource::Defaults)
        }
        Err(e) => return Err(e),
    };
    config.validate()?;
    Ok((config, source))
}
