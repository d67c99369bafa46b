//! System-wide constants for the teledrive workspace.
//!
//! Single source of truth for rates, timeouts and fixed display values.
//! Imported by all crates. Keep constants here, not in the crates that use them.

use static_assertions::const_assert;

/// Control loop rate [Hz] (10 ms tick).
pub const DEFAULT_RATE_HZ: u32 = 100;

/// Minimum / maximum accepted control loop rate [Hz].
pub const RATE_HZ_MIN: u32 = 1;
pub const RATE_HZ_MAX: u32 = 1000;

/// Ticks without a fresh joystick sample before the link counts as lost
/// (5 ticks = 50 ms at 100 Hz).
pub const DEFAULT_JOYSTICK_TIMEOUT_TICKS: u32 = 5;

/// Length of the graceful stop after joystick loss [ticks] (2.0 s at 100 Hz).
pub const DEFAULT_GRACEFUL_STOP_TICKS: u32 = 200;

/// Polls without a vehicle-state heartbeat before telemetry counts as stale.
pub const DEFAULT_VEHICLE_STALE_TICKS: u32 = 10;

/// Upper bound for any tick-count parameter.
pub const TICKS_PARAM_MAX: u32 = 10_000;

/// Status is logged every N ticks (10 s at 100 Hz).
pub const DEFAULT_STATUS_LOG_INTERVAL: u32 = 1000;

/// Maximum button events carried by one vehicle snapshot.
pub const MAX_BUTTON_EVENTS: usize = 8;

/// Joystick axis index: gas (+) / brake (−).
pub const AXIS_LONGITUDINAL: usize = 0;

/// Joystick axis index: steering.
pub const AXIS_LATERAL: usize = 1;

/// Acceleration per unit of longitudinal axis [m/s²].
pub const DEFAULT_ACCEL_SCALE: f32 = 4.0;

/// Braking request while the graceful stop counts down [m/s²].
pub const DEFAULT_GRACEFUL_STOP_ACCEL: f32 = -1.0;

/// Braking request issued once when the countdown reaches zero [m/s²].
pub const DEFAULT_HARD_STOP_ACCEL: f32 = -3.0;

/// Below this speed [m/s] the vehicle is treated as stopping.
pub const DEFAULT_STOPPING_SPEED: f32 = 0.1;

/// |torque| above which the matching blinker is requested.
pub const DEFAULT_BLINKER_TORQUE: f32 = 0.2;

/// Lead distance bars shown on the vehicle HUD.
pub const LEAD_DISTANCE_BARS: u8 = 2;

/// HUD set speed meaning "not set" [m/s].
pub const SET_SPEED_NOT_SET: f32 = 255.0;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/teledrive/teledrived.toml";

const_assert!(DEFAULT_JOYSTICK_TIMEOUT_TICKS < DEFAULT_GRACEFUL_STOP_TICKS);
const_assert!(DEFAULT_RATE_HZ >= RATE_HZ_MIN && DEFAULT_RATE_HZ <= RATE_HZ_MAX);
const_assert!(AXIS_LONGITUDINAL != AXIS_LATERAL);
