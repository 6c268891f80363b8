// A slowly wandering control value.
//
// Second-order random walk: `direction` is a velocity with inertia and 0.95
// damping, nudged by +/- `drift` every step. Leaving [lower, upper] does not
// clamp the value; it adds a restoring push of `correction` to the velocity
// for as long as the value stays outside. Filter cutoff (as an exponent) and
// delay feedback are both driven by one of these.

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::rng::{weighted_choice, RandomSource};

const DAMPING: f64 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    pub lower: f64,
    pub upper: f64,
    pub drift: f64,
    pub correction: f64,
}

impl WalkConfig {
    /// Natural-log filter cutoff, roughly 150 Hz to 8 kHz.
    pub fn filter_exponent() -> Self {
        Self { lower: 5.0, upper: 9.0, drift: 0.002, correction: 0.03 }
    }

    pub fn delay_feedback() -> Self {
        Self { lower: 0.1, upper: 0.9, drift: 0.0007, correction: 0.001 }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.lower.is_finite() && self.upper.is_finite()) || self.lower >= self.upper {
            return Err(ConfigError::InvalidBounds { lower: self.lower, upper: self.upper });
        }
        for (name, value) in [("drift", self.drift), ("correction", self.correction)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWalkParameter { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct BoundedWalk {
    config: WalkConfig,
    value: f64,
    direction: f64,
}

impl BoundedWalk {
    /// Starts at the midpoint with a velocity uniform in
    /// `[-10 * drift, 10 * drift)`.
    pub fn new(config: WalkConfig, rng: &mut dyn RandomSource) -> ConfigResult<Self> {
        config.validate()?;
        let value = (config.lower + config.upper) / 2.0;
        let direction = rng.next_unit() * 20.0 * config.drift - 10.0 * config.drift;
        Ok(Self { config, value, direction })
    }

    pub fn advance(&mut self, rng: &mut dyn RandomSource) -> f64 {
        let WalkConfig { lower, upper, drift, correction } = self.config;

        self.value += self.direction;
        self.direction *= DAMPING;
        if self.value < lower {
            self.direction += correction;
        }
        if self.value > upper {
            self.direction -= correction;
        }
        self.direction += weighted_choice(&[drift, -drift], 1.0, rng).copied().unwrap_or(0.0);

        self.value
    }

    pub fn current_value(&self) -> f64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::rng::{ScriptedSource, SeededSource};

    #[test]
    fn starts_at_midpoint() {
        let mut rng = ScriptedSource::new([0.5]);
        let walk = BoundedWalk::new(WalkConfig::filter_exponent(), &mut rng).unwrap();
        assert_eq!(walk.current_value(), 7.0);
    }

    #[test]
    fn rejects_inverted_or_degenerate_bounds() {
        let mut rng = ScriptedSource::new([0.5]);
        let cfg = WalkConfig { lower: 9.0, upper: 5.0, ..WalkConfig::filter_exponent() };
        assert!(matches!(BoundedWalk::new(cfg, &mut rng), Err(ConfigError::InvalidBounds { .. })));
        let cfg = WalkConfig { lower: 5.0, upper: 5.0, ..WalkConfig::filter_exponent() };
        assert!(BoundedWalk::new(cfg, &mut rng).is_err());
        let cfg = WalkConfig { drift: f64::NAN, ..WalkConfig::filter_exponent() };
        assert!(matches!(
            BoundedWalk::new(cfg, &mut rng),
            Err(ConfigError::InvalidWalkParameter { name: "drift", .. })
        ));
    }

    #[test]
    fn one_step_by_hand() {
        // initial direction: 0.75 * 20 * 0.01 - 0.1 = 0.05
        // then drift sign from 0.2 -> index 0 -> +drift
        let cfg = WalkConfig { lower: 0.0, upper: 1.0, drift: 0.01, correction: 0.1 };
        let mut rng = ScriptedSource::new([0.75, 0.2]);
        let mut walk = BoundedWalk::new(cfg, &mut rng).unwrap();
        let v = walk.advance(&mut rng);
        assert!((v - 0.55).abs() < 1e-12);
        assert!((walk.direction - (0.05 * 0.95 + 0.01)).abs() < 1e-12);
    }

    #[test]
    fn pushes_back_when_outside() {
        let cfg = WalkConfig { lower: 0.0, upper: 1.0, drift: 0.0, correction: 0.1 };
        let mut rng = ScriptedSource::new([0.5]);
        let mut walk = BoundedWalk::new(cfg, &mut rng).unwrap();
        walk.value = 1.5;
        walk.direction = 0.0;
        walk.advance(&mut rng);
        assert!(walk.direction < 0.0);

        walk.value = -0.5;
        walk.direction = 0.0;
        walk.advance(&mut rng);
        assert!(walk.direction > 0.0);
    }

    #[test]
    fn stays_near_bounds_over_long_runs() {
        let cfg = WalkConfig::filter_exponent();
        for seed in 0..4 {
            let mut rng = SeededSource::from_seed(seed);
            let mut walk = BoundedWalk::new(cfg, &mut rng).unwrap();
            let mut lo = f64::MAX;
            let mut hi = f64::MIN;
            for _ in 0..100_000 {
                let v = walk.advance(&mut rng);
                lo = lo.min(v);
                hi = hi.max(v);
            }
            // excursions are limited by how much speed the walk can build
            // before the correction turns it around
            assert!(lo > cfg.lower - 1.0, "seed {seed}: min {lo}");
            assert!(hi < cfg.upper + 1.0, "seed {seed}: max {hi}");
        }
    }

    #[test]
    fn current_value_does_not_advance() {
        let mut rng = SeededSource::from_seed(5);
        let mut walk = BoundedWalk::new(WalkConfig::delay_feedback(), &mut rng).unwrap();
        walk.advance(&mut rng);
        let a = walk.current_value();
        assert_eq!(walk.current_value(), a);
        assert_eq!(walk.current_value(), a);
    }
}
