use serde::Deserialize;

/// Which governed generator an event acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorId {
    /// Base-load generation.
    Base,
    /// Spinning reserve.
    Reserve,
}

/// A change applied to the grid when its event fires.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridAction {
    /// Sudden loss of generation: current output and maximum output both
    /// drop by `lost_w`.
    Trip { generator: GeneratorId, lost_w: f64 },
    /// New maximum output, e.g. secondary response restoring capacity.
    SetMaxPower { generator: GeneratorId, power_w: f64 },
    /// New droop setpoint frequency.
    SetSetpoint { generator: GeneratorId, hz: f64 },
    /// New governor gain.
    SetGain { generator: GeneratorId, gain: f64 },
    /// Change in the fixed (non-dishwasher) load.
    LoadStep { delta_w: f64 },
}

/// A grid action scheduled at a simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GridEvent {
    /// Fires after the first tick whose time is at or past this, in seconds.
    pub at_s: f64,
    #[serde(flatten)]
    pub action: GridAction,
}

impl GridEvent {
    pub fn new(at_s: f64, action: GridAction) -> Self {
        Self { at_s, action }
    }

    /// Returns `true` once `time_s` has reached the event time.
    pub fn is_due(&self, time_s: f64) -> bool {
        time_s >= self.at_s
    }
}

/// Time-ordered event list that hands out each event exactly once.
#[derive(Debug, Clone, Default)]
pub struct EventSchedule {
    events: Vec<GridEvent>,
    next: usize,
}

impl EventSchedule {
    /// Builds a schedule, ordering events by time. Events sharing a time keep
    /// their given order.
    pub fn new(mut events: Vec<GridEvent>) -> Self {
        events.sort_by(|a, b| a.at_s.total_cmp(&b.at_s));
        Self { events, next: 0 }
    }

    /// Removes and returns every not-yet-fired event due at `time_s`.
    pub fn take_due(&mut self, time_s: f64) -> Vec<GridEvent> {
        let start = self.next;
        while self.next < self.events.len() && self.events[self.next].is_due(time_s) {
            self.next += 1;
        }
        self.events[start..self.next].to_vec()
    }

    /// Events that have not fired yet.
    pub fn pending(&self) -> &[GridEvent] {
        &self.events[self.next..]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
