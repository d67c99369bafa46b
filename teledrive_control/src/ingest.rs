//! Input ingest: turns polled bus messages into validated per-tick values.

use teledrive_common::bus::Polled;
use teledrive_common::messages::{
    JoystickMessage, JoystickSample, SnapshotFlags, VehicleSnapshot, VehicleState,
};
use thiserror::Error;

/// Why a tick has no usable vehicle telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoCarData {
    #[error("carState never received")]
    NeverReceived,
    #[error("carState heartbeat stale")]
    NotAlive,
    #[error("carState marked invalid by publisher")]
    Invalid,
    #[error("carState rejected: {0}")]
    Malformed(String),
}

/// Vehicle telemetry ingest.
///
/// Holds the snapshot accepted on the last successful tick so the
/// engagement step can detect pedal edges.
#[derive(Debug, Default)]
pub struct VehicleIngest {
    previous: Option<VehicleState>,
}

impl VehicleIngest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate this tick's telemetry.
    pub fn capture(&self, polled: Polled<VehicleState>) -> Result<VehicleSnapshot, NoCarData> {
        let Some(state) = polled.value else {
            return Err(NoCarData::NeverReceived);
        };
        if !polled.alive {
            return Err(NoCarData::NotAlive);
        }
        if !polled.valid {
            return Err(NoCarData::Invalid);
        }
        state.validate().map_err(NoCarData::Malformed)?;

        let mut flags = SnapshotFlags::USABLE;
        flags.set(SnapshotFlags::UPDATED, polled.updated);
        Ok(VehicleSnapshot::new(state, flags))
    }

    /// Snapshot accepted on the previous successful tick.
    #[inline]
    pub fn previous(&self) -> Option<&VehicleState> {
        self.previous.as_ref()
    }

    /// Promote a snapshot to "previous" once its tick completed.
    pub fn commit(&mut self, snapshot: VehicleSnapshot) {
        self.previous = Some(snapshot.state);
    }
}

/// Fresh joystick sample for this tick, if any.
///
/// Stale, invalid or non-finite messages count as "nothing arrived".
pub fn joystick_sample(polled: &Polled<JoystickMessage>) -> Option<JoystickSample> {
    if !polled.is_fresh() {
        return None;
    }
    polled.value.as_ref().and_then(JoystickSample::from_message)
}
