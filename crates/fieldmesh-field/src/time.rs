//! Round time.

/// Local round timestamp. Real-valued, monotonically non-decreasing per device.
pub type Time = f64;

/// The two timestamps a round can observe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundClock {
    previous: Option<Time>,
    current: Time,
}

impl RoundClock {
    /// Clock of a device's very first round.
    pub const fn first(current: Time) -> Self {
        Self {
            previous: None,
            current,
        }
    }

    /// Clock of the round following this one.
    ///
    /// A timestamp earlier than the current one is clamped, keeping time
    /// non-decreasing.
    pub fn advance(self, current: Time) -> Self {
        Self {
            previous: Some(self.current),
            current: current.max(self.current),
        }
    }

    /// Time of this round.
    pub const fn current(&self) -> Time {
        self.current
    }

    /// Time of the previous round, `None` on the first round.
    pub const fn previous(&self) -> Option<Time> {
        self.previous
    }

    /// Elapsed time since the previous round, 1 on the first round.
    pub fn delta(&self) -> Time {
        self.previous.map_or(1.0, |prev| self.current - prev)
    }

    /// Whether this is the device's first round.
    pub const fn is_first(&self) -> bool {
        self.previous.is_none()
    }
}
