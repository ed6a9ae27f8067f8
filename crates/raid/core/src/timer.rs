//! Encounter countdown and the time-warning schedule.
use crate::state::Ticks;

/// Seconds at which every participant is warned, besides the final 5..=1.
pub const WARNING_SECONDS: [u32; 5] = [300, 180, 60, 30, 10];

/// What happened during one countdown step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountdownStep {
    /// Remaining whole seconds when this step landed on a second boundary.
    pub second: Option<u32>,
    /// True on the step that exhausted the countdown.
    pub expired: bool,
}

/// Ticks left before the encounter times out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: Ticks,
    total: Ticks,
}

impl Countdown {
    pub fn new(total: Ticks) -> Self {
        Self {
            remaining: total,
            total,
        }
    }

    pub fn remaining(&self) -> Ticks {
        self.remaining
    }

    pub fn total(&self) -> Ticks {
        self.total
    }

    pub fn elapsed(&self) -> Ticks {
        Ticks(self.total.0 - self.remaining.0)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining.as_seconds_ceil()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == Ticks::ZERO
    }

    /// Consumes one tick. Does nothing once expired.
    pub fn advance(&mut self) -> CountdownStep {
        if self.is_expired() {
            return CountdownStep::default();
        }
        self.remaining = Ticks(self.remaining.0 - 1);
        CountdownStep {
            second: self
                .remaining
                .is_second_boundary()
                .then(|| self.remaining.0 / Ticks::PER_SECOND),
            expired: self.is_expired(),
        }
    }
}

/// Warning shown to participants as time runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeWarning {
    Minutes(u32),
    Seconds(u32),
}

impl TimeWarning {
    /// Warning due at `seconds` remaining, if any.
    pub fn at(seconds: u32) -> Option<TimeWarning> {
        let due = WARNING_SECONDS.contains(&seconds) || (1..=5).contains(&seconds);
        if !due {
            return None;
        }
        Some(if seconds >= 60 {
            TimeWarning::Minutes(seconds / 60)
        } else {
            TimeWarning::Seconds(seconds)
        })
    }
}

/// Formats whole seconds as `M:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
