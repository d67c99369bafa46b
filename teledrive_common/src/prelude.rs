//! Prelude module for common re-exports.
//!
//! `use teledrive_common::prelude::*;` brings in the payload types, the bus
//! handles and the configuration loader.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{
    DEFAULT_GRACEFUL_STOP_TICKS, DEFAULT_JOYSTICK_TIMEOUT_TICKS, DEFAULT_RATE_HZ,
};

// ─── Messages ───────────────────────────────────────────────────────
pub use crate::messages::{
    ActuationRequest, AlertSize, AlertStatus, ButtonEvent, ButtonType, EngagementStatus,
    JoystickMessage, JoystickSample, LongControlState, SnapshotFlags, StatusReport,
    VehicleSnapshot, VehicleState,
};

// ─── Bus ────────────────────────────────────────────────────────────
pub use crate::bus::{Polled, Topic, TopicReader, TopicWriter};
