/// A simulation clock that counts fixed-length ticks from a start time.
///
/// Tick `k` (zero-based) ends at `start_s + (k + 1) * dt_s`: the time is
/// advanced before the tick's work is done, so the first tick already
/// reports `start_s + dt_s`. Times are computed from the tick index rather
/// than accumulated, so they do not drift over long runs.
///
/// # Examples
///
/// ```
/// use dynamic_demand_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(-1.0, 0.5, 3);
/// let mut times = Vec::new();
///
/// clock.run(|tick| times.push(tick.time_s));
/// assert_eq!(times, vec![-0.5, 0.0, 0.5]);
/// ```
pub struct Clock {
    /// Time before the first tick, in seconds
    start_s: f64,
    /// Tick length in seconds
    dt_s: f64,
    /// Ticks taken so far
    current: usize,
    /// Total ticks to run
    total: usize,
}

/// One tick handed out by [`Clock::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Zero-based tick index.
    pub index: usize,
    /// Simulation time at the end of the tick, in seconds.
    pub time_s: f64,
}

impl Clock {
    /// Creates a new clock.
    ///
    /// # Arguments
    ///
    /// * `start_s` - Simulation time before the first tick
    /// * `dt_s` - Tick length in seconds
    /// * `total` - The total number of ticks the clock will run
    pub fn new(start_s: f64, dt_s: f64, total: usize) -> Self {
        Self {
            start_s,
            dt_s,
            current: 0,
            total,
        }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The tick just taken
    /// * `None` - If the clock has reached its total ticks
    pub fn tick(&mut self) -> Option<Tick> {
        if self.current < self.total {
            let index = self.current;
            self.current += 1;
            Some(Tick {
                index,
                time_s: self.start_s + (index + 1) as f64 * self.dt_s,
            })
        } else {
            None
        }
    }

    /// Runs a function for each remaining tick in the clock.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }

    pub fn dt_s(&self) -> f64 {
        self.dt_s
    }

    /// Number of ticks still to run.
    pub fn remaining(&self) -> usize {
        self.total - self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = Clock::new(-200.0, 0.1, 5);
        assert_eq!(clock.current, 0);
        assert_eq!(clock.total, 5);
        assert_eq!(clock.remaining(), 5);
    }

    #[test]
    fn test_tick() {
        let mut clock = Clock::new(0.0, 1.0, 2);
        assert_eq!(
            clock.tick(),
            Some(Tick {
                index: 0,
                time_s: 1.0
            })
        );
        assert_eq!(
            clock.tick(),
            Some(Tick {
                index: 1,
                time_s: 2.0
            })
        );
        assert_eq!(clock.tick(), None);
    }

    #[test]
    fn test_run() {
        let mut clock = Clock::new(10.0, 2.0, 3);
        let mut indices = Vec::new();

        clock.run(|tick| indices.push(tick.index));

        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(clock.remaining(), 0);
    }

    #[test]
    fn test_empty_clock() {
        let mut clock = Clock::new(0.0, 0.1, 0);
        assert_eq!(clock.tick(), None);

        let mut was_called = false;
        clock.run(|_| was_called = true);
        assert!(!was_called);
    }

    #[test]
    fn long_runs_do_not_drift() {
        let mut clock = Clock::new(-200.0, 0.1, 152_000);
        let mut last = None;
        clock.run(|tick| last = Some(tick));
        let last = last.expect("clock should tick");
        assert!((last.time_s - 15_000.0).abs() < 1e-6);
    }
}
