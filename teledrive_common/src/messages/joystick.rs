//! Joystick (`testJoystick`) payload and the per-tick sample.

use serde::{Deserialize, Serialize};

use crate::consts::{AXIS_LATERAL, AXIS_LONGITUDINAL};

/// Raw joystick message forwarded by a transport bridge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct JoystickMessage {
    /// `[longitudinal, lateral]`, nominally in [-1, 1].
    pub axes: [f32; 2],
}

/// Joystick axes as seen by the control loop on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JoystickSample {
    /// Axes clipped to [-1, 1]; neutral when no fresh data is available.
    pub axes: [f32; 2],
    /// A fresh, valid message arrived this tick.
    pub fresh: bool,
}

impl JoystickSample {
    /// Neutral, not-fresh sample.
    pub const NEUTRAL: Self = Self {
        axes: [0.0, 0.0],
        fresh: false,
    };

    /// Build a fresh sample from a raw message.
    ///
    /// Returns `None` if any axis is not finite; such a message is treated
    /// as if nothing arrived.
    pub fn from_message(msg: &JoystickMessage) -> Option<Self> {
        if !msg.axes.iter().all(|a| a.is_finite()) {
            return None;
        }
        Some(Self {
            axes: msg.axes.map(|a| a.clamp(-1.0, 1.0)),
            fresh: true,
        })
    }

    /// Gas (+) / brake (−) axis.
    #[inline]
    pub fn longitudinal(&self) -> f32 {
        self.axes[AXIS_LONGITUDINAL]
    }

    /// Steering axis.
    #[inline]
    pub fn lateral(&self) -> f32 {
        self.axes[AXIS_LATERAL]
    }
}
