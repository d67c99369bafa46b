//! Graceful-stop countdown after joystick loss.
//!
//! Braking(n) counts down one per tick; reaching zero yields exactly one
//! HardStop tick, after which the countdown holds at zero until a new
//! joystick-loss edge re-arms it.

/// Graceful-stop countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopCountdown {
    /// No stop in progress.
    #[default]
    Inactive,
    /// Mild braking, `n > 0` ticks left.
    Braking(u32),
    /// Countdown reached zero this tick: hard stop.
    HardStop,
    /// Hard stop issued; holding at zero.
    Held,
}

impl StopCountdown {
    /// Arm the countdown at `ticks` (not yet decremented).
    #[inline]
    pub const fn armed(ticks: u32) -> Self {
        if ticks == 0 {
            Self::HardStop
        } else {
            Self::Braking(ticks)
        }
    }

    /// Advance one tick.
    pub const fn tick(self) -> Self {
        match self {
            Self::Inactive => Self::Inactive,
            Self::Braking(n) if n > 1 => Self::Braking(n - 1),
            Self::Braking(_) => Self::HardStop,
            Self::HardStop | Self::Held => Self::Held,
        }
    }

    /// Remaining ticks, `None` when inactive.
    #[inline]
    pub const fn ticks(self) -> Option<u32> {
        match self {
            Self::Inactive => None,
            Self::Braking(n) => Some(n),
            Self::HardStop | Self::Held => Some(0),
        }
    }

    /// The stop is still issuing braking requests.
    #[inline]
    pub const fn is_stopping(self) -> bool {
        matches!(self, Self::Braking(_) | Self::HardStop)
    }

    #[inline]
    pub const fn is_inactive(self) -> bool {
        matches!(self, Self::Inactive)
    }
}
