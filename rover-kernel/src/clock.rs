//! Mission elapsed time.

use std::time::Duration;

/// The clock counts whole seconds, so it always ticks once per second.
pub const MISSION_CLOCK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Clone, Copy)]
pub struct MissionClock {
    elapsed: u64,
}

impl MissionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) -> u64 {
        self.elapsed = self.elapsed.saturating_add(1);
        self.elapsed
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

/// `HH:MM:SS`, zero padded. Hours keep counting past 24.
pub fn format_mission_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
