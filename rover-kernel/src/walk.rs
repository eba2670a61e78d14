//! Bounded random walk driving every simulated sensor reading.

use rand::Rng;

/// Next value of a bounded random walk.
///
/// `previous + uniform(-step_scale/2, +step_scale/2)`, clamped to `[min, max]`.
/// A non-finite candidate keeps the previous value (itself clamped into range),
/// so NaN or infinity never leaks into a stream. `min == max` always yields `min`.
pub fn next_value<R: Rng + ?Sized>(
    rng: &mut R,
    previous: f64,
    min: f64,
    max: f64,
    step_scale: f64,
) -> f64 {
    if min == max {
        return min;
    }
    let delta = (rng.gen::<f64>() - 0.5) * step_scale;
    let candidate = previous + delta;
    if candidate.is_finite() {
        clamp(candidate, min, max)
    } else {
        clamp(previous, min, max)
    }
}

/// Clamp without panicking on NaN: a NaN input falls back to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.max(min).min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_stays_within_bounds_with_adversarial_step() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut value = 50.0;
        for _ in 0..10_000 {
            value = next_value(&mut rng, value, 0.0, 100.0, 1.0e9);
            assert!((0.0..=100.0).contains(&value), "escaped: {value}");
        }
    }

    #[test]
    fn test_step_is_bounded_by_half_scale() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut value = 0.0;
        for _ in 0..1_000 {
            let next = next_value(&mut rng, value, -1_000.0, 1_000.0, 2.0);
            assert!((next - value).abs() <= 1.0);
            value = next;
        }
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(next_value(&mut rng, 4.0, 7.5, 7.5, 3.0), 7.5);
    }

    #[test]
    fn test_zero_step_holds_value() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(next_value(&mut rng, 12.5, 0.0, 100.0, 0.0), 12.5);
    }

    #[test]
    fn test_non_finite_step_keeps_previous() {
        let mut rng = StdRng::seed_from_u64(5);
        for step in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(next_value(&mut rng, 21.0, 0.0, 100.0, step), 21.0);
        }
    }

    #[test]
    fn test_nan_previous_recovers_to_min() {
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(next_value(&mut rng, f64::NAN, -5.0, 5.0, 1.0), -5.0);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let walk = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut v = -45.2;
            (0..50)
                .map(|_| {
                    v = next_value(&mut rng, v, -60.0, -20.0, 2.0);
                    v
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(walk(42), walk(42));
    }
}
