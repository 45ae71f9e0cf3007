// Countdown in whole ticks.
// Counts down from a start value to 0

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cooldown {
    pub remaining: u32,
}

impl Cooldown {
    /// Create a cooldown that is already elapsed
    pub fn ready() -> Self {
        Self { remaining: 0 }
    }

    /// Returns true once the countdown has reached zero
    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    /// Restart the countdown at `ticks`
    pub fn start(&mut self, ticks: u32) {
        self.remaining = ticks;
    }

    /// Advance by one tick, saturating at zero
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}
