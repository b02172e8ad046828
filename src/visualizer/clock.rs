//! Animation clock.

/// Time added per frame tick.
pub const TICK: f64 = 0.05;

/// Whether the clock advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    /// Parameters frozen.
    #[default]
    Stopped,
    /// Advancing once per frame.
    Running,
}

/// Monotonic animation time, advanced once per display frame while running.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationClock {
    state: ClockState,
    time: f64,
}

impl AnimationClock {
    /// A stopped clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Whether the clock is running.
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Elapsed animation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Start or stop. Time is left where it is.
    pub fn toggle(&mut self) {
        self.state = match self.state {
            ClockState::Stopped => ClockState::Running,
            ClockState::Running => ClockState::Stopped,
        };
    }

    /// Advance one frame. Returns `true` if the clock moved.
    pub fn tick(&mut self) -> bool {
        if self.is_running() {
            self.time += TICK;
            true
        } else {
            false
        }
    }

    /// Stop and zero the clock.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
