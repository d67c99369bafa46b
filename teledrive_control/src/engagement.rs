//! Engagement: who holds authority over the actuators this tick.
//!
//! [`machine`] runs the per-tick decision in a fixed order (override →
//! re-enable gate → liveness edge → final flags); [`stop`] holds the
//! graceful-stop countdown it drives.

pub mod machine;
pub mod stop;

pub use machine::{
    ControlFlags, Decision, EngagementInputs, EngagementMachine, EngagementState, OverrideKind,
    ReengageOutcome, TickEvents,
};
pub use stop::StopCountdown;
