use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Random source for one component.
///
/// With a master seed every component gets its own reproducible stream, salted
/// by the component name so two streams never replay the same draws. Without a
/// seed the stream comes from OS entropy.
pub fn component_rng(seed: Option<u64>, component: &str) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ fnv1a(component)),
        None => StdRng::from_entropy(),
    }
}

fn fnv1a(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_streams_are_reproducible() {
        let mut a = component_rng(Some(7), "metric:temperature");
        let mut b = component_rng(Some(7), "metric:temperature");
        let xs: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_component_salt_separates_streams() {
        let mut a = component_rng(Some(7), "metric:temperature");
        let mut b = component_rng(Some(7), "metric:pressure");
        let xs: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_ne!(xs, ys);
    }
}
