//! Virtual clock for the tick loop.

/// Simulated time advanced in fixed steps.
///
/// The clock starts at `0.0` and only moves when the driver calls
/// [`SimClock::advance`]. Times are in abstract ticks.
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Current virtual time
    now: f64,

    /// Fixed step size
    dt: f64,

    /// Number of completed steps
    ticks: u64,
}

impl SimClock {
    /// Creates a clock at time zero with the given step.
    pub fn new(dt: f64) -> Self {
        Self {
            now: 0.0,
            dt,
            ticks: 0,
        }
    }

    /// Advances virtual time by one step.
    pub fn advance(&mut self) {
        self.now += self.dt;
        self.ticks += 1;
    }

    /// Returns the current virtual time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Returns the step size.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Returns the number of completed steps.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// True while `now` has not passed `end` (inclusive bound).
    pub fn within(&self, end: f64) -> bool {
        self.now <= end
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}
