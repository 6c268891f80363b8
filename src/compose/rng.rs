// Skewed random selection. Every random decision the composition makes
// (mutation choice, note values, octave, key changes) goes through
// `weighted_index`, so the `power` curve is what shapes the music.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform reals in `[0, 1)`.
///
/// The engine never touches an ambient generator; whoever builds a
/// `Composition` hands it one of these.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// PCG32-backed source used by the running app.
#[derive(Clone, Debug)]
pub struct SeededSource {
    rng: Pcg32,
}

impl SeededSource {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: Pcg32::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: Pcg32::from_entropy() }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// Index in `[0, size)`, drawn as `floor(u^power * size)`.
///
/// `power > 1` leans toward index 0, `power < 1` toward the end.
/// Returns 0 for an empty range.
pub fn weighted_index(size: usize, power: f64, rng: &mut dyn RandomSource) -> usize {
    if size == 0 {
        return 0;
    }
    let u = rng.next_unit().clamp(0.0, 1.0);
    let idx = (u.powf(power) * size as f64).floor() as usize;
    // u^p * size can round up to `size` when u is within an ulp of 1
    idx.min(size - 1)
}

pub fn weighted_choice<'a, T>(
    items: &'a [T],
    power: f64,
    rng: &mut dyn RandomSource,
) -> Option<&'a T> {
    items.get(weighted_index(items.len(), power, rng))
}

/// Replays a fixed list of values, cycling when it runs out.
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    values: Vec<f64>,
    pos: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self { values: values.into(), pos: 0 }
    }

    /// Number of values consumed so far.
    pub fn drawn(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWS: usize = 100_000;

    fn histogram(size: usize, power: f64, seed: u64) -> Vec<usize> {
        let mut rng = SeededSource::from_seed(seed);
        let mut counts = vec![0; size];
        for _ in 0..DRAWS {
            counts[weighted_index(size, power, &mut rng)] += 1;
        }
        counts
    }

    #[test]
    fn power_one_is_roughly_uniform() {
        let counts = histogram(5, 1.0, 7);
        let expected = DRAWS / 5;
        for (i, c) in counts.iter().enumerate() {
            let dev = (*c as f64 - expected as f64).abs() / expected as f64;
            assert!(dev < 0.05, "bucket {i} has {c}, expected ~{expected}");
        }
    }

    #[test]
    fn power_five_favours_first_index() {
        let counts = histogram(3, 5.0, 11);
        // P(0) = (1/3)^(1/5) ~ 0.80, P(2) = 1 - (2/3)^(1/5) ~ 0.08
        assert!(counts[0] > 5 * counts[2], "{counts:?}");
        assert!(counts[0] as f64 / DRAWS as f64 > 0.75);
    }

    #[test]
    fn power_below_one_favours_last_index() {
        let counts = histogram(4, 0.25, 3);
        assert!(counts[3] > counts[0]);
    }

    #[test]
    fn index_is_floor_of_scaled_power() {
        let mut rng = ScriptedSource::new([0.5, 0.999_999, 0.0]);
        assert_eq!(weighted_index(4, 1.0, &mut rng), 2);
        assert_eq!(weighted_index(4, 1.0, &mut rng), 3);
        assert_eq!(weighted_index(4, 1.0, &mut rng), 0);
    }

    #[test]
    fn index_never_reaches_size() {
        struct AlmostOne;
        impl RandomSource for AlmostOne {
            fn next_unit(&mut self) -> f64 {
                1.0 - f64::EPSILON / 2.0
            }
        }
        for size in 1..64 {
            assert!(weighted_index(size, 1.0, &mut AlmostOne) < size);
        }
    }

    #[test]
    fn choice_on_empty_slice_is_none() {
        let mut rng = ScriptedSource::new([0.3]);
        let empty: [u8; 0] = [];
        assert_eq!(weighted_choice(&empty, 1.0, &mut rng), None);
        assert_eq!(weighted_choice(&[4, 5, 6], 1.0, &mut rng), Some(&4));
    }

    #[test]
    fn seeded_sources_repeat() {
        let mut a = SeededSource::from_seed(42);
        let mut b = SeededSource::from_seed(42);
        let xs: Vec<f64> = (0..16).map(|_| a.next_unit()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.next_unit()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (0.0..1.0).contains(x)));
    }
}
