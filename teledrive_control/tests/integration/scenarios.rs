//! End-to-end engagement scenarios: drive, link loss, override, re-engage,
//! faults and missing car data.

use teledrive_common::messages::{ButtonType, LongControlState, VehicleState};
use teledrive_control::config::{EngagementProfile, TeledriveConfig};
use teledrive_control::cycle::TickOutcome;
use teledrive_control::engagement::StopCountdown;

use super::harness::{Harness, car};

/// Silent ticks until the joystick times out; returns the first tick
/// without a live joystick.
fn silent_until_lost(h: &mut Harness, vehicle: &VehicleState) -> super::harness::Tick {
    for _ in 0..10 {
        let tick = h.silent(vehicle);
        if !tick.state.joystick_active {
            return tick;
        }
    }
    panic!("joystick never timed out");
}

// ── Drive ───────────────────────────────────────────────────────────

#[test]
fn full_throttle_from_standstill_with_start_assist() {
    let mut h = Harness::new();
    h.engage(&car(0.0));
    let tick = h.live(&car(0.0), [1.0, 0.0]);
    let req = tick.request();
    assert!(req.long_active);
    assert_eq!(req.accel, 4.0);
    // Requested accel above the start threshold runs PID even at rest.
    assert_eq!(req.long_control_state, LongControlState::Pid);
}

#[test]
fn long_control_state_flips_when_speed_crosses_threshold() {
    // Start assist out of reach: speed alone picks the controller mode.
    let mut config = TeledriveConfig::default();
    config.command.start_accel = 5.0;
    let mut h = Harness::with_config(config);
    h.engage(&car(0.0));

    let mut flips = 0;
    let mut last = LongControlState::Stopping;
    for i in 0..1000 {
        let v = i as f32 * 0.0005;
        let tick = h.live(&car(v), [1.0, 0.0]);
        let req = tick.request();
        assert!(req.long_active, "tick {i}");
        assert_eq!(req.accel, 4.0, "tick {i}");

        let expected = if v > 0.1 {
            LongControlState::Pid
        } else {
            LongControlState::Stopping
        };
        assert_eq!(req.long_control_state, expected, "tick {i} v={v}");
        if req.long_control_state != last {
            flips += 1;
            last = req.long_control_state;
        }
    }
    assert_eq!(flips, 1);
}

#[test]
fn steering_and_blinkers() {
    let mut h = Harness::new();
    h.engage(&car(10.0));
    let req = *h.live(&car(10.0), [0.0, -0.7]).request();
    assert_eq!(req.torque, -0.7);
    assert!(req.left_blinker && !req.right_blinker);
    let req = *h.live(&car(10.0), [0.0, 0.1]).request();
    assert!(!req.left_blinker && !req.right_blinker);
    let req = *h.live(&car(10.0), [0.0, 3.0]).request();
    assert_eq!(req.torque, 1.0);
    assert!(req.right_blinker);
}

#[test]
fn short_joystick_gap_holds_last_axes() {
    let mut h = Harness::new();
    h.engage(&car(5.0));
    h.live(&car(5.0), [0.5, 0.25]);
    for _ in 0..5 {
        let tick = h.silent(&car(5.0));
        assert!(tick.state.joystick_active);
        assert_eq!(tick.request().accel, 2.0);
        assert_eq!(tick.request().torque, 0.25);
    }
}

// ── Link loss ───────────────────────────────────────────────────────

#[test]
fn joystick_loss_runs_graceful_then_hard_stop() {
    let mut h = Harness::new();
    let v = car(12.0);
    h.engage(&v);
    h.live(&v, [0.5, 0.0]);

    let first = silent_until_lost(&mut h, &v);
    assert_eq!(first.state.countdown, StopCountdown::Braking(199));
    assert_eq!(first.request().accel, -1.0);
    assert_eq!(first.request().long_control_state, LongControlState::Pid);
    assert_eq!(first.status().alert_text1, "Joystick Lost");
    assert_eq!(first.status().alert_text2, "Stopping in 2.0s");

    // Loss ticks 2..=199 brake gently.
    for k in 2..200u32 {
        let tick = h.silent(&v);
        assert_eq!(tick.state.countdown.ticks(), Some(200 - k), "loss tick {k}");
        assert_eq!(tick.request().accel, -1.0, "loss tick {k}");
    }

    // Loss tick 200: the single hard-stop request.
    let tick = h.silent(&car(0.0));
    assert_eq!(tick.state.countdown, StopCountdown::HardStop);
    assert_eq!(tick.state.countdown.ticks(), Some(0));
    assert_eq!(tick.request().accel, -3.0);
    assert_eq!(tick.request().long_control_state, LongControlState::Stopping);

    // Afterwards: held at zero, no more braking requests, "No Joystick".
    for _ in 0..50 {
        let tick = h.silent(&car(0.0));
        assert_eq!(tick.state.countdown, StopCountdown::Held);
        assert_eq!(tick.request().accel, 0.0);
        assert_eq!(tick.status().alert_text1, "No Joystick");
    }
}

#[test]
fn joystick_return_cancels_countdown() {
    let mut h = Harness::new();
    let v = car(12.0);
    h.engage(&v);
    silent_until_lost(&mut h, &v);
    for _ in 0..20 {
        h.silent(&v);
    }
    let tick = h.live(&v, [0.2, 0.0]);
    assert_eq!(tick.state.countdown, StopCountdown::Inactive);
    assert!(tick.state.system_enabled);
    assert!((tick.request().accel - 0.8).abs() < 1e-6);
    assert!(!tick.status().has_alert());
}

#[test]
fn loss_while_disabled_only_reports_no_joystick() {
    let mut h = Harness::new();
    let v = car(3.0);
    h.live(&v, [0.0, 0.0]);
    let tick = silent_until_lost(&mut h, &v);
    assert_eq!(tick.state.countdown, StopCountdown::Inactive);
    assert_eq!(tick.request().accel, 0.0);
    assert_eq!(tick.status().alert_text1, "No Joystick");
}

// ── Override ────────────────────────────────────────────────────────

#[test]
fn brake_while_moving_revokes_control() {
    let mut h = Harness::new();
    h.engage(&car(8.0));
    h.live(&car(8.0), [0.4, 0.0]);

    let braking = VehicleState {
        brake_pressed: true,
        ..car(8.0)
    };
    let tick = h.live(&braking, [0.4, 0.0]);
    assert!(tick.state.user_disabled);
    assert!(!tick.state.system_enabled);
    let req = tick.request();
    assert!(!req.enabled && !req.lat_active && !req.long_active);
    assert_eq!(req.accel, 0.0);
    assert_eq!(tick.status().alert_text1, "System Disabled");

    // Releasing the brake does not re-engage.
    let tick = h.live(&car(8.0), [0.4, 0.0]);
    assert!(tick.state.user_disabled);
}

#[test]
fn brake_during_graceful_stop_revokes_and_cancels() {
    let mut h = Harness::new();
    h.engage(&car(8.0));
    silent_until_lost(&mut h, &car(8.0));
    let braking = VehicleState {
        brake_pressed: true,
        ..car(8.0)
    };
    let tick = h.silent(&braking);
    assert!(tick.state.user_disabled);
    assert!(!tick.request().enabled);
    assert_eq!(tick.state.countdown, StopCountdown::Inactive);
}

#[test]
fn held_brake_at_standstill_is_not_an_override() {
    let mut h = Harness::new();
    let held = VehicleState {
        brake_pressed: true,
        ..car(0.0)
    };
    h.live(&held, [0.0, 0.0]);
    let tick = h.engage(&held);
    assert!(tick.request().enabled);
    let tick = h.live(&held, [0.0, 0.0]);
    assert!(!tick.state.user_disabled);
}

#[test]
fn new_gas_press_revokes_control() {
    let mut h = Harness::new();
    h.engage(&car(8.0));
    let gas = VehicleState {
        gas_pressed: true,
        ..car(8.0)
    };
    let tick = h.live(&gas, [0.0, 0.0]);
    assert!(tick.state.user_disabled);
    assert!(!tick.request().enabled);
}

// ── Re-engage ───────────────────────────────────────────────────────

#[test]
fn reengage_requires_live_joystick() {
    let mut h = Harness::new();
    let press = car(0.0).with_button(ButtonType::ResumeCruise, true);

    h.silent(&car(0.0));
    let tick = h.silent(&press);
    assert!(tick.state.user_disabled);
    assert!(!tick.state.system_enabled);
    assert_eq!(tick.status().alert_text1, "No Joystick");

    let tick = h.live(&car(0.0), [0.0, 0.0]);
    assert!(tick.state.user_disabled);
    assert_eq!(tick.status().alert_text1, "System Disabled");

    let tick = h.live(&press, [0.0, 0.0]);
    assert!(!tick.state.user_disabled);
    assert!(tick.state.system_enabled);
    assert!(tick.request().enabled);
}

#[test]
fn release_event_does_not_engage() {
    let mut h = Harness::new();
    let release = car(0.0).with_button(ButtonType::SetCruise, false);
    let tick = h.live(&release, [0.0, 0.0]);
    assert!(tick.state.user_disabled);
}

#[test]
fn unchanged_car_message_does_not_replay_press() {
    let mut h = Harness::new();
    let press = car(0.0).with_button(ButtonType::MainCruise, true);
    // Press arrives while the joystick is silent and is rejected.
    h.silent(&press);
    // The same carState stays on the bus; only the joystick updates.
    let tick = h.step(None, Some([0.0, 0.0]));
    assert!(tick.state.user_disabled);
}

// ── Faults ──────────────────────────────────────────────────────────

#[test]
fn permanent_fault_disables_same_tick_and_recovers() {
    let mut h = Harness::new();
    h.engage(&car(6.0));
    let faulted = VehicleState {
        steer_fault_permanent: true,
        ..car(6.0)
    };
    let tick = h.live(&faulted, [0.5, 0.5]);
    assert!(!tick.request().enabled);
    assert!(tick.state.system_enabled);
    assert_eq!(tick.status().alert_text1, "Steer Fault");
    assert_eq!(tick.status().alert_text2, "Take control");
    assert!(!tick.status().engageable);

    // Still the fault message with a silent joystick.
    let tick = silent_until_lost(&mut h, &faulted);
    assert_eq!(tick.status().alert_text1, "Steer Fault");

    // Fault clears upstream; the joystick returns; no button needed.
    let tick = h.live(&car(6.0), [0.5, 0.0]);
    assert!(tick.request().enabled);
    assert_eq!(tick.request().accel, 2.0);
}

#[test]
fn temporary_fault_only_drops_lateral() {
    let mut h = Harness::new();
    h.engage(&car(6.0));
    let faulted = VehicleState {
        steer_fault_temporary: true,
        ..car(6.0)
    };
    let req = *h.live(&faulted, [0.5, 0.9]).request();
    assert!(req.enabled && !req.lat_active && req.long_active);
    assert_eq!(req.torque, 0.0);
    assert!(!req.right_blinker);
}

#[test]
fn car_without_longitudinal_control_steers_only() {
    let mut h = Harness::new();
    let v = VehicleState {
        longitudinal_control: false,
        ..car(6.0)
    };
    h.engage(&v);
    let req = *h.live(&v, [1.0, 0.3]).request();
    assert!(req.lat_active && !req.long_active);
    assert_eq!(req.accel, 0.0);
    assert_eq!(req.torque, 0.3);
}

// ── Car data ────────────────────────────────────────────────────────

#[test]
fn missing_car_data_short_circuits_and_keeps_state() {
    let mut h = Harness::new();
    h.engage(&car(4.0));

    // carState goes quiet; the joystick keeps talking.
    let mut no_data = 0;
    for _ in 0..20 {
        let tick = h.step(None, Some([0.3, 0.0]));
        if tick.outcome == Some(TickOutcome::NoCarData) {
            no_data += 1;
            assert!(tick.request.is_none());
            assert_eq!(tick.status().alert_text1, "No Car Data");
            assert_eq!(tick.status().alert_text2, "Waiting for car connection");
        }
        assert!(tick.state.system_enabled);
    }
    assert!(no_data > 0);

    let tick = h.live(&car(4.0), [0.3, 0.0]);
    assert_eq!(tick.outcome, Some(TickOutcome::Published));
    assert!(tick.request().enabled);
}

#[test]
fn invalid_car_data_is_no_car_data() {
    let mut h = Harness::new();
    h.bridge.vehicle.publish(car(1.0), false);
    let tick = h.step(None, Some([0.0, 0.0]));
    assert_eq!(tick.outcome, Some(TickOutcome::NoCarData));
}

#[test]
fn joystick_loss_during_car_outage_seen_on_return() {
    let mut h = Harness::new();
    h.engage(&car(4.0));
    // Car goes quiet first, with the joystick still live.
    loop {
        let tick = h.step(None, Some([0.0, 0.0]));
        if tick.outcome == Some(TickOutcome::NoCarData) {
            break;
        }
    }
    // Then the joystick times out while there is no car data.
    for _ in 0..10 {
        let tick = h.step(None, None);
        assert_eq!(tick.outcome, Some(TickOutcome::NoCarData));
        assert!(tick.state.joystick_active);
    }
    assert!(!h.control.joystick_active());

    let tick = h.silent(&car(4.0));
    assert_eq!(tick.state.countdown, StopCountdown::Braking(199));
    assert_eq!(tick.request().accel, -1.0);
}

// ── Lateral-only profile ────────────────────────────────────────────

#[test]
fn lateral_only_profile() {
    let mut config = TeledriveConfig::default();
    config.control.profile = EngagementProfile::LateralOnly;
    let mut h = Harness::with_config(config);

    // Button accepted without a joystick, but nothing is active yet.
    let press = car(5.0).with_button(ButtonType::SetCruise, true);
    let tick = h.silent(&press);
    assert!(!tick.state.user_disabled);
    assert!(!tick.request().enabled);

    let req = *h.live(&car(5.0), [1.0, 0.4]).request();
    assert!(req.enabled && req.lat_active && !req.long_active);
    assert_eq!(req.accel, 0.0);

    let tick = silent_until_lost(&mut h, &car(5.0));
    assert!(!tick.request().enabled);
    assert_eq!(tick.state.countdown, StopCountdown::Inactive);
    assert_eq!(tick.status().alert_text1, "No Joystick");

    // Joystick back: engaged again without a button.
    assert!(h.live(&car(5.0), [0.0, 0.0]).request().enabled);
}
