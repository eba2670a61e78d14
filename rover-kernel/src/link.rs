//! Communication link status, re-drawn at random on a slow cadence.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Online,
    Warning,
    Offline,
}

impl LinkStatus {
    pub const ALL: [LinkStatus; 3] = [LinkStatus::Online, LinkStatus::Warning, LinkStatus::Offline];
}

pub struct LinkSimulator {
    status: LinkStatus,
    change_probability: f64,
    rng: StdRng,
}

impl LinkSimulator {
    pub fn new(change_probability: f64, rng: StdRng) -> Self {
        Self { status: LinkStatus::Online, change_probability, rng }
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    /// With the configured probability, replaces the status with a uniform draw
    /// over all statuses (the current one included). Any status can follow any other.
    pub fn tick(&mut self) -> LinkStatus {
        let candidate = LinkStatus::ALL[self.rng.gen_range(0..LinkStatus::ALL.len())];
        let sample: f64 = self.rng.gen();
        if sample > 1.0 - self.change_probability {
            if candidate != self.status {
                info!("[link] status {:?} -> {:?}", self.status, candidate);
            }
            self.status = candidate;
        }
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_starts_online_and_holds_without_probability() {
        let mut link = LinkSimulator::new(0.0, StdRng::seed_from_u64(1));
        assert_eq!(link.status(), LinkStatus::Online);
        assert!((0..500).all(|_| link.tick() == LinkStatus::Online));
    }

    #[test]
    fn test_every_status_is_reachable() {
        let mut link = LinkSimulator::new(0.2, StdRng::seed_from_u64(2));
        let mut seen = [false; 3];
        for _ in 0..2_000 {
            let status = link.tick();
            seen[LinkStatus::ALL.iter().position(|s| *s == status).unwrap()] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_change_rate_is_low() {
        let mut link = LinkSimulator::new(0.2, StdRng::seed_from_u64(3));
        let mut previous = link.status();
        let mut changes = 0;
        for _ in 0..30_000 {
            let status = link.tick();
            if status != previous {
                changes += 1;
            }
            previous = status;
        }
        // 20% re-draws, two thirds of which land on a different status
        let rate = changes as f64 / 30_000.0;
        assert!((rate - 0.2 * 2.0 / 3.0).abs() < 0.02, "rate {rate}");
    }
}
