//! Qualitative trend attached to each metric.
//!
//! The trend is re-rolled at random rather than derived from the slope of the
//! history: on each tick a sample above `1 - reroll_probability` replaces it
//! with a uniformly chosen direction (possibly the same one).

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    #[default]
    Stable,
}

impl Trend {
    pub const ALL: [Trend; 3] = [Trend::Rising, Trend::Falling, Trend::Stable];
}

pub fn classify<R: Rng + ?Sized>(current: Trend, rng: &mut R, reroll_probability: f64) -> Trend {
    let sample: f64 = rng.gen();
    if sample > 1.0 - reroll_probability {
        Trend::ALL[rng.gen_range(0..Trend::ALL.len())]
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_probability_never_changes() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1_000 {
            assert_eq!(classify(Trend::Rising, &mut rng, 0.0), Trend::Rising);
        }
    }

    #[test]
    fn test_certain_reroll_reaches_every_direction() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let trend = classify(Trend::Stable, &mut rng, 1.0);
            if !seen.contains(&trend) {
                seen.push(trend);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_reroll_rate_tracks_probability() {
        let mut rng = StdRng::seed_from_u64(11);
        // a re-roll lands on a different direction two times out of three
        let changed = (0..30_000)
            .filter(|_| classify(Trend::Stable, &mut rng, 0.2) != Trend::Stable)
            .count();
        let rate = changed as f64 / 30_000.0;
        assert!((rate - 0.2 * 2.0 / 3.0).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Rising).unwrap(), "\"rising\"");
    }
}
