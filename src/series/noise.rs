//! Zero-preserving measurement jitter.

use rand::Rng;

use super::types::LoadSeries;

/// Adds bounded integer jitter to non-zero readings.
///
/// A reading of exactly `0.0` means the appliance is off and is never
/// perturbed. Every other reading `v` becomes `v + k` with `k` drawn
/// uniformly from `0..max_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseInjector {
    /// Exclusive upper bound of the integer offset. `0` disables noise.
    pub max_offset: u32,
}

impl Default for NoiseInjector {
    fn default() -> Self {
        Self { max_offset: 50 }
    }
}

impl NoiseInjector {
    pub fn new(max_offset: u32) -> Self {
        Self { max_offset }
    }

    /// Returns a perturbed copy of `series`.
    pub fn inject<R: Rng + ?Sized>(&self, series: &LoadSeries, rng: &mut R) -> LoadSeries {
        let points = series
            .points()
            .iter()
            .map(|&(ts, value)| (ts, self.perturb(value, rng)))
            .collect();
        LoadSeries::from_sorted(points)
    }

    fn perturb<R: Rng + ?Sized>(&self, value: f64, rng: &mut R) -> f64 {
        if value == 0.0 || self.max_offset == 0 {
            return value;
        }
        value + f64::from(rng.random_range(0..self.max_offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn series(values: &[f64]) -> LoadSeries {
        let origin: NaiveDateTime = NaiveDate::from_ymd_opt(2010, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| (origin + TimeDelta::minutes(15 * i as i64), *v))
            .collect();
        LoadSeries::from_points(points).unwrap()
    }

    #[test]
    fn zeros_survive_repeated_trials() {
        let input = series(&[0.0, 120.5, 0.0, 0.0, 3300.0, 0.0]);
        let noise = NoiseInjector::default();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = noise.inject(&input, &mut rng);
            for ((_, before), (_, after)) in input.points().iter().zip(out.points()) {
                if *before == 0.0 {
                    assert_eq!(*after, 0.0, "seed {seed}: zero was perturbed");
                }
            }
        }
    }

    #[test]
    fn non_zero_values_stay_within_bound() {
        let input = series(&[1.0, 0.25, 7000.0, 42.0]);
        let noise = NoiseInjector::new(50);
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = noise.inject(&input, &mut rng);
            for ((_, v), (_, n)) in input.points().iter().zip(out.points()) {
                assert!(*n >= *v && *n < *v + 50.0, "{n} not in [{v}, {v} + 50)");
                assert_eq!((*n - *v).fract(), 0.0, "offset must be an integer");
            }
        }
    }

    #[test]
    fn index_is_untouched() {
        let input = series(&[5.0, 0.0, 5.0]);
        let mut rng = StdRng::seed_from_u64(1);
        let out = NoiseInjector::default().inject(&input, &mut rng);
        assert!(input.timestamps().eq(out.timestamps()));
    }

    #[test]
    fn zero_bound_disables_noise() {
        let input = series(&[5.0, 0.0, 9.5]);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(NoiseInjector::new(0).inject(&input, &mut rng), input);
    }

    #[test]
    fn same_seed_same_noise() {
        let input = series(&[10.0, 20.0, 30.0, 40.0]);
        let noise = NoiseInjector::default();
        let a = noise.inject(&input, &mut StdRng::seed_from_u64(9));
        let b = noise.inject(&input, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
