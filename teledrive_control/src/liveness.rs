//! Joystick liveness tracking.
//!
//! The joystick counts as active while the last fresh sample is at most
//! `timeout_ticks` ticks old. A tick without data is an ordinary input: it
//! only ages the last sample.

use teledrive_common::messages::JoystickSample;

/// Change of joystick liveness between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivenessEdge {
    #[default]
    None,
    /// active → inactive
    Lost,
    /// inactive → active
    Regained,
}

impl LivenessEdge {
    /// Edge from `was_active` to `is_active`.
    #[inline]
    pub const fn between(was_active: bool, is_active: bool) -> Self {
        match (was_active, is_active) {
            (true, false) => Self::Lost,
            (false, true) => Self::Regained,
            _ => Self::None,
        }
    }
}

/// Tick-counting liveness tracker for the joystick link.
#[derive(Debug, Clone)]
pub struct JoystickLiveness {
    timeout_ticks: u32,
    /// Ticks since the last fresh sample; `None` until one arrives.
    ticks_since_fresh: Option<u32>,
    active: bool,
    last_sample: JoystickSample,
}

impl JoystickLiveness {
    pub fn new(timeout_ticks: u32) -> Self {
        Self {
            timeout_ticks,
            ticks_since_fresh: None,
            active: false,
            last_sample: JoystickSample::NEUTRAL,
        }
    }

    /// Advance one tick. `sample` is `Some` when a fresh, valid message
    /// arrived this tick.
    pub fn update(&mut self, sample: Option<JoystickSample>) -> LivenessEdge {
        match sample {
            Some(s) => {
                self.ticks_since_fresh = Some(0);
                self.last_sample = s;
            }
            None => {
                self.ticks_since_fresh = self.ticks_since_fresh.map(|t| t.saturating_add(1));
            }
        }

        let was_active = self.active;
        self.active = matches!(self.ticks_since_fresh, Some(t) if t <= self.timeout_ticks);
        LivenessEdge::between(was_active, self.active)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn ticks_since_fresh(&self) -> Option<u32> {
        self.ticks_since_fresh
    }

    /// Axes the command synthesizer should use this tick.
    ///
    /// The last fresh sample is held while the link is active; an inactive
    /// link reads as neutral.
    pub fn sample(&self) -> JoystickSample {
        if !self.active {
            return JoystickSample::NEUTRAL;
        }
        JoystickSample {
            axes: self.last_sample.axes,
            fresh: self.ticks_since_fresh == Some(0),
        }
    }
}
