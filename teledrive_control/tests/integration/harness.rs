//! Tick-by-tick driver over the bridge side of the topics.

use teledrive_common::messages::{
    ActuationRequest, ButtonType, JoystickMessage, StatusReport, VehicleState,
};
use teledrive_control::config::TeledriveConfig;
use teledrive_control::cycle::{BridgeHandles, ControlLoop, TickOutcome, control_topics};
use teledrive_control::engagement::EngagementState;

/// Outputs of one tick, as a bridge would observe them.
#[derive(Debug)]
pub struct Tick {
    pub outcome: Option<TickOutcome>,
    /// `Some` only if an actuation request was published this tick.
    pub request: Option<ActuationRequest>,
    /// `Some` only if a status report was published this tick.
    pub status: Option<StatusReport>,
    pub state: EngagementState,
}

impl Tick {
    pub fn request(&self) -> &ActuationRequest {
        self.request.as_ref().expect("actuation request published")
    }

    pub fn status(&self) -> &StatusReport {
        self.status.as_ref().expect("status published")
    }
}

pub struct Harness {
    pub control: ControlLoop,
    pub bridge: BridgeHandles,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(TeledriveConfig::default())
    }

    pub fn with_config(config: TeledriveConfig) -> Self {
        let (inputs, outputs, bridge) = control_topics(&config.control);
        Self {
            control: ControlLoop::new(&config, inputs, outputs),
            bridge,
        }
    }

    /// Publish the given inputs (if any) and run one tick.
    pub fn step(&mut self, vehicle: Option<&VehicleState>, axes: Option<[f32; 2]>) -> Tick {
        if let Some(axes) = axes {
            self.bridge.joystick.publish(JoystickMessage { axes }, true);
        }
        if let Some(vehicle) = vehicle {
            self.bridge.vehicle.publish(vehicle.clone(), true);
        }
        let outcome = self.control.run_tick();
        let actuation = self.bridge.actuation.poll();
        let status = self.bridge.status.poll();
        Tick {
            outcome,
            request: actuation.updated.then_some(actuation.value).flatten(),
            status: status.updated.then_some(status.value).flatten(),
            state: self.control.engagement(),
        }
    }

    /// Tick with fresh car data and a live joystick.
    pub fn live(&mut self, vehicle: &VehicleState, axes: [f32; 2]) -> Tick {
        self.step(Some(vehicle), Some(axes))
    }

    /// Tick with fresh car data and a silent joystick.
    pub fn silent(&mut self, vehicle: &VehicleState) -> Tick {
        self.step(Some(vehicle), None)
    }

    /// Press the set button with a live joystick and check it engaged.
    pub fn engage(&mut self, vehicle: &VehicleState) -> Tick {
        let press = vehicle.clone().with_button(ButtonType::SetCruise, true);
        let tick = self.live(&press, [0.0, 0.0]);
        assert!(tick.state.system_enabled, "engage press accepted");
        tick
    }
}

/// Moving car with longitudinal control available.
pub fn car(v_ego: f32) -> VehicleState {
    VehicleState {
        v_ego,
        standstill: v_ego == 0.0,
        longitudinal_control: true,
        ..Default::default()
    }
}
