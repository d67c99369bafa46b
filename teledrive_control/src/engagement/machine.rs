//! Engagement state machine.
//!
//! Evaluated once per tick with vehicle telemetry present, in a fixed order:
//!
//! 1. **Override**: brake pressed (new press, or any press while moving) or
//!    a new gas press revokes remote authority (`user_disabled`).
//! 2. **Re-enable gate**: an engage button press clears `user_disabled`,
//!    but only while the joystick is live.
//! 3. **Liveness edge**: losing the joystick while engaged arms the
//!    graceful-stop countdown; regaining it cancels the countdown.
//! 4. **Flags**: `enabled`, `lat_active`, `long_active` from the new state
//!    and the vehicle's fault/capability flags.
//!
//! [`EngagementMachine::evaluate`] is pure; the new state only takes effect
//! through [`EngagementMachine::commit`] after the rest of the tick succeeded.

use teledrive_common::messages::{ButtonType, VehicleSnapshot, VehicleState};

use super::stop::StopCountdown;
use crate::config::EngagementProfile;
use crate::error::TickError;
use crate::liveness::LivenessEdge;

/// State carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngagementState {
    pub system_enabled: bool,
    /// Set by a local override; cleared only by an accepted engage press.
    pub user_disabled: bool,
    /// Joystick liveness as of the last evaluated tick.
    pub joystick_active: bool,
    pub countdown: StopCountdown,
}

impl EngagementState {
    /// Power-on state: disabled, waiting for an engage press.
    pub const INITIAL: Self = Self {
        system_enabled: false,
        user_disabled: true,
        joystick_active: false,
        countdown: StopCountdown::Inactive,
    };

    /// Graceful stop is issuing braking requests (countdown ≥ 0, not held).
    #[inline]
    pub const fn graceful_stop_active(&self) -> bool {
        self.countdown.is_stopping()
    }

    /// Structural invariants every committed state satisfies.
    pub fn check_invariants(&self) -> Result<(), TickError> {
        if !self.countdown.is_inactive() && (!self.system_enabled || self.joystick_active) {
            return Err(TickError::Invariant(
                "stop countdown running outside an engaged joystick loss",
            ));
        }
        if self.system_enabled && self.user_disabled {
            return Err(TickError::Invariant("system enabled while user-disabled"));
        }
        Ok(())
    }
}

impl Default for EngagementState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Actuation authority for one tick.
///
/// Invariant: `lat_active ⇒ enabled` and `long_active ⇒ enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlFlags {
    pub enabled: bool,
    pub lat_active: bool,
    pub long_active: bool,
}

impl ControlFlags {
    #[inline]
    pub const fn any_active(&self) -> bool {
        self.lat_active || self.long_active
    }
}

/// Local pedal override kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    Brake,
    Gas,
}

impl OverrideKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brake => "BRAKE",
            Self::Gas => "GAS",
        }
    }
}

/// Result of an engage button press seen while user-disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReengageOutcome {
    Accepted(ButtonType),
    /// Joystick not live; the system stays disabled.
    Rejected(ButtonType),
}

/// Notable transitions of a tick, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickEvents {
    pub override_kind: Option<OverrideKind>,
    pub reengage: Option<ReengageOutcome>,
    pub edge: LivenessEdge,
    pub stop_armed: bool,
    pub stop_cancelled: bool,
    pub hard_stop: bool,
}

/// Outcome of [`EngagementMachine::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    state: EngagementState,
    pub flags: ControlFlags,
    pub events: TickEvents,
}

impl Decision {
    /// State that [`EngagementMachine::commit`] would install.
    #[inline]
    pub fn state(&self) -> &EngagementState {
        &self.state
    }
}

/// Per-tick inputs of the engagement step.
#[derive(Debug, Clone, Copy)]
pub struct EngagementInputs<'a> {
    pub vehicle: &'a VehicleSnapshot,
    /// Telemetry of the previous successful tick.
    pub previous: Option<&'a VehicleState>,
    /// Current joystick liveness.
    pub joystick_active: bool,
}

/// Owner of the engagement state.
#[derive(Debug, Clone)]
pub struct EngagementMachine {
    profile: EngagementProfile,
    graceful_stop_ticks: u32,
    state: EngagementState,
}

impl EngagementMachine {
    pub fn new(profile: EngagementProfile, graceful_stop_ticks: u32) -> Self {
        Self {
            profile,
            graceful_stop_ticks,
            state: EngagementState::INITIAL,
        }
    }

    #[inline]
    pub fn state(&self) -> EngagementState {
        self.state
    }

    #[inline]
    pub fn profile(&self) -> EngagementProfile {
        self.profile
    }

    /// Compute the next state and this tick's flags without committing.
    pub fn evaluate(&self, inputs: &EngagementInputs<'_>) -> Result<Decision, TickError> {
        let current = self.state;
        let vehicle = &inputs.vehicle.state;
        let mut next = current;
        let mut events = TickEvents::default();

        // ── Override ──
        events.override_kind = inputs
            .previous
            .and_then(|prev| detect_override(prev, vehicle));
        if events.override_kind.is_some() {
            next.user_disabled = true;
            next.system_enabled = false;
        }

        // ── Re-enable gate ──
        if next.user_disabled {
            if let Some(press) = inputs.vehicle.engage_presses().next() {
                let gated = self.profile == EngagementProfile::GracefulStop;
                events.reengage = Some(if !gated || inputs.joystick_active {
                    next.user_disabled = false;
                    next.system_enabled = true;
                    ReengageOutcome::Accepted(press.button_type)
                } else {
                    ReengageOutcome::Rejected(press.button_type)
                });
            }
        }
        if self.profile == EngagementProfile::LateralOnly && !next.user_disabled {
            next.system_enabled = inputs.joystick_active;
        }

        // ── Liveness edge / countdown ──
        events.edge = LivenessEdge::between(current.joystick_active, inputs.joystick_active);
        next.joystick_active = inputs.joystick_active;
        next.countdown = self.next_countdown(current.countdown, &next, events.edge);
        events.stop_armed = events.edge == LivenessEdge::Lost && !next.countdown.is_inactive();
        events.stop_cancelled = current.countdown.is_stopping() && next.countdown.is_inactive();
        events.hard_stop = next.countdown == StopCountdown::HardStop;

        // ── Flags ──
        let enabled = next.system_enabled && !vehicle.steer_fault_permanent;
        let flags = ControlFlags {
            enabled,
            lat_active: enabled && !vehicle.steer_fault_temporary,
            long_active: enabled
                && vehicle.longitudinal_control
                && self.profile.allows_longitudinal(),
        };

        next.check_invariants()?;

        Ok(Decision {
            state: next,
            flags,
            events,
        })
    }

    /// Install the state of a decision whose tick completed.
    #[inline]
    pub fn commit(&mut self, decision: &Decision) {
        self.state = decision.state;
    }

    fn next_countdown(
        &self,
        previous: StopCountdown,
        next: &EngagementState,
        edge: LivenessEdge,
    ) -> StopCountdown {
        if self.profile != EngagementProfile::GracefulStop
            || !next.system_enabled
            || next.joystick_active
        {
            return StopCountdown::Inactive;
        }
        let base = match edge {
            LivenessEdge::Lost => StopCountdown::armed(self.graceful_stop_ticks),
            LivenessEdge::None | LivenessEdge::Regained => previous,
        };
        base.tick()
    }
}

/// Pedal override between two consecutive telemetry samples.
pub fn detect_override(previous: &VehicleState, current: &VehicleState) -> Option<OverrideKind> {
    let brake = current.brake_pressed && (!previous.brake_pressed || !current.standstill);
    let gas = current.gas_pressed && !previous.gas_pressed;
    if brake {
        Some(OverrideKind::Brake)
    } else if gas {
        Some(OverrideKind::Gas)
    } else {
        None
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
