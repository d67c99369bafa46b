//! One alert per tick, picked by a fixed priority order.

use teledrive_common::messages::{AlertSize, AlertStatus, EngagementStatus, VehicleState};

use super::harness::{Harness, car};

#[test]
fn walk_down_the_priority_list() {
    let mut h = Harness::new();

    // 1. No car data.
    let tick = h.step(None, Some([0.0, 0.0]));
    let s = tick.status();
    assert_eq!(s.alert_text1, "No Car Data");
    assert_eq!(s.alert_status, AlertStatus::Normal);
    assert_eq!(s.alert_size, AlertSize::Small);
    assert!(!s.enabled && !s.active && !s.engageable);

    // 5. User disabled (power-on state, joystick live).
    let tick = h.live(&car(2.0), [0.0, 0.0]);
    let s = tick.status();
    assert_eq!(s.alert_text1, "System Disabled");
    assert_eq!(s.alert_status, AlertStatus::UserPrompt);
    assert_eq!(s.alert_size, AlertSize::Mid);

    // 6. Active.
    let tick = h.engage(&car(2.0));
    let s = tick.status();
    assert_eq!(s.state, EngagementStatus::Active);
    assert!(!s.has_alert());
    assert_eq!(s.alert_size, AlertSize::None);
    assert!(s.enabled && s.active && s.engageable);

    // 3. Graceful stop.
    let mut tick = h.silent(&car(2.0));
    while tick.state.joystick_active {
        tick = h.silent(&car(2.0));
    }
    let s = tick.status();
    assert_eq!(s.state, EngagementStatus::Disabled);
    assert_eq!(s.alert_text1, "Joystick Lost");
    assert_eq!(s.alert_status, AlertStatus::Critical);
    assert_eq!(s.alert_size, AlertSize::Full);

    // 2. Permanent fault beats the graceful stop.
    let faulted = VehicleState {
        steer_fault_permanent: true,
        ..car(2.0)
    };
    let tick = h.silent(&faulted);
    assert!(tick.state.graceful_stop_active());
    assert_eq!(tick.status().alert_text1, "Steer Fault");
    assert_eq!(tick.status().alert_status, AlertStatus::Critical);

    // Countdown text keeps counting down under the fault.
    let tick = h.silent(&car(2.0));
    assert_eq!(tick.status().alert_text1, "Joystick Lost");
    assert_eq!(tick.status().alert_text2, "Stopping in 2.0s");

    // 4. No joystick once the countdown is over.
    let mut tick = h.silent(&car(0.0));
    while tick.state.countdown.ticks() != Some(0) {
        tick = h.silent(&car(0.0));
    }
    let tick = h.silent(&car(0.0));
    assert_eq!(tick.status().alert_text1, "No Joystick");
    assert_eq!(tick.status().alert_size, AlertSize::Small);
}

#[test]
fn countdown_text_tracks_remaining_time() {
    let mut h = Harness::new();
    h.engage(&car(9.0));
    let mut tick = h.silent(&car(9.0));
    while tick.state.joystick_active {
        tick = h.silent(&car(9.0));
    }
    assert_eq!(tick.status().alert_text2, "Stopping in 2.0s");
    for _ in 0..49 {
        tick = h.silent(&car(9.0));
    }
    // 150 ticks left at 100 Hz.
    assert_eq!(tick.state.countdown.ticks(), Some(150));
    assert_eq!(tick.status().alert_text2, "Stopping in 1.5s");
}
