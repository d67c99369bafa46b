//! Typed bus payloads.
//!
//! Inputs (`carState`, `testJoystick`) are validated into these types at the
//! ingest boundary; outputs (`carControl`, `selfdriveState`) are rebuilt from
//! scratch every tick. All payloads derive serde so observers can log them.

pub mod actuation;
pub mod joystick;
pub mod status;
pub mod vehicle;

pub use actuation::{ActuationRequest, LongControlState};
pub use joystick::{JoystickMessage, JoystickSample};
pub use status::{AlertSize, AlertStatus, EngagementStatus, StatusReport};
pub use vehicle::{ButtonEvent, ButtonType, SnapshotFlags, VehicleSnapshot, VehicleState};

/// Topic name of the vehicle telemetry input.
pub const TOPIC_CAR_STATE: &str = "carState";
/// Topic name of the joystick input.
pub const TOPIC_JOYSTICK: &str = "testJoystick";
/// Topic name of the actuation output.
pub const TOPIC_CAR_CONTROL: &str = "carControl";
/// Topic name of the status output.
pub const TOPIC_SELFDRIVE_STATE: &str = "selfdriveState";
