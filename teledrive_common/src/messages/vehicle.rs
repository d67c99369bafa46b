//! Vehicle telemetry (`carState`) payload and the per-tick snapshot.

use bitflags::bitflags;
use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_BUTTON_EVENTS;

/// Steering-wheel / cruise stalk button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum ButtonType {
    #[default]
    Unknown = 0,
    SetCruise = 1,
    ResumeCruise = 2,
    MainCruise = 3,
    AccelCruise = 4,
    DecelCruise = 5,
    Cancel = 6,
    GapAdjustCruise = 7,
    LeftBlinker = 8,
    RightBlinker = 9,
}

impl ButtonType {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::SetCruise),
            2 => Some(Self::ResumeCruise),
            3 => Some(Self::MainCruise),
            4 => Some(Self::AccelCruise),
            5 => Some(Self::DecelCruise),
            6 => Some(Self::Cancel),
            7 => Some(Self::GapAdjustCruise),
            8 => Some(Self::LeftBlinker),
            9 => Some(Self::RightBlinker),
            _ => None,
        }
    }

    /// Buttons that may re-engage the system after a user override.
    #[inline]
    pub const fn is_engage_request(self) -> bool {
        matches!(
            self,
            Self::SetCruise | Self::ResumeCruise | Self::MainCruise | Self::AccelCruise
        )
    }
}

/// One button edge reported by the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ButtonEvent {
    #[serde(rename = "type")]
    pub button_type: ButtonType,
    pub pressed: bool,
}

impl ButtonEvent {
    pub const fn new(button_type: ButtonType, pressed: bool) -> Self {
        Self {
            button_type,
            pressed,
        }
    }

    /// A press (not release) of an engage button.
    #[inline]
    pub const fn is_engage_press(&self) -> bool {
        self.pressed && self.button_type.is_engage_request()
    }
}

/// Raw `carState` payload as published by the vehicle interface.
///
/// Missing fields deserialize to their defaults; numeric sanity is checked by
/// [`VehicleState::validate`] before the control loop sees the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleState {
    /// Vehicle speed [m/s].
    pub v_ego: f32,
    pub gas_pressed: bool,
    pub brake_pressed: bool,
    pub standstill: bool,
    pub steer_fault_temporary: bool,
    pub steer_fault_permanent: bool,
    /// Button edges since the previous message, in arrival order.
    pub button_events: Vec<ButtonEvent, MAX_BUTTON_EVENTS>,
    /// The vehicle accepts longitudinal (accel/brake) requests.
    pub longitudinal_control: bool,
}

impl VehicleState {
    /// Reject payloads the control logic cannot reason about.
    pub fn validate(&self) -> Result<(), String> {
        if !self.v_ego.is_finite() {
            return Err(format!("vEgo is not finite ({})", self.v_ego));
        }
        Ok(())
    }

    /// Builder used by bridges and tests to append a button edge.
    ///
    /// Events beyond the capacity are dropped.
    pub fn with_button(mut self, button_type: ButtonType, pressed: bool) -> Self {
        let _ = self.button_events.push(ButtonEvent::new(button_type, pressed));
        self
    }
}

bitflags! {
    /// Bus-level validity of a captured snapshot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SnapshotFlags: u8 {
        /// Heartbeat seen within the staleness window.
        const ALIVE   = 0x01;
        /// Publisher marked the message valid.
        const VALID   = 0x02;
        /// A new message arrived since the previous tick.
        const UPDATED = 0x04;
    }
}

impl SnapshotFlags {
    /// Alive and valid: the only combination the control loop acts on.
    pub const USABLE: Self = Self::from_bits_truncate(Self::ALIVE.bits() | Self::VALID.bits());

    #[inline]
    pub const fn is_usable(&self) -> bool {
        self.contains(Self::USABLE)
    }
}

impl Default for SnapshotFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Validated vehicle telemetry for exactly one tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleSnapshot {
    pub state: VehicleState,
    pub flags: SnapshotFlags,
}

impl VehicleSnapshot {
    pub fn new(state: VehicleState, flags: SnapshotFlags) -> Self {
        Self { state, flags }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.state.v_ego
    }

    #[inline]
    pub fn is_updated(&self) -> bool {
        self.flags.contains(SnapshotFlags::UPDATED)
    }

    /// Engage presses carried by this snapshot.
    ///
    /// A snapshot that was not refreshed this tick repeats old events, so
    /// only updated snapshots report presses.
    pub fn engage_presses(&self) -> impl Iterator<Item = &ButtonEvent> {
        let updated = self.is_updated();
        self.state
            .button_events
            .iter()
            .filter(move |e| updated && e.is_engage_press())
    }
}
