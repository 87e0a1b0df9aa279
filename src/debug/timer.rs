use instant::Instant;

/// Which phase of the loop is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SystemPhase {
    Visibility = 0,
    Movement = 1,
    Draw = 2,
    Flush = 3,
}

impl SystemPhase {
    pub const ALL: [SystemPhase; 4] = [Self::Visibility, Self::Movement, Self::Draw, Self::Flush];

    pub fn label(self) -> &'static str {
        match self {
            Self::Visibility => "Visibility",
            Self::Movement => "Movement",
            Self::Draw => "Draw",
            Self::Flush => "Flush",
        }
    }
}

/// Per-phase timing with exponential moving average smoothing.
pub struct SystemTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; 4],
    /// Timestamp when `begin()` was called.
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; 4],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes. Records elapsed time for `phase`.
    pub fn end(&mut self, phase: SystemPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: SystemPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }

    /// One-line breakdown, e.g. `Visibility 12.0us | Movement 3.1us | ...`.
    pub fn summary(&self) -> String {
        SystemPhase::ALL
            .iter()
            .map(|&p| format!("{} {:.1}us", p.label(), self.durations_us[p as usize]))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
