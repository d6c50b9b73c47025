//! Brownian Path Engine
//! ====================
//!
//! Discrete Wiener process and the geometric Brownian motion built on it.
//!
//! ```text
//! W[0] = x0
//! W[i] = W[i-1] + Z_i / sqrt(n_step)        Z_i ~ N(0, 1)
//!
//! S(t) = s0 * exp((mu - sigma^2 / 2) * t + sigma * W(t))
//! ```
//!
//! The generator is reseeded on every call, so a path is a pure function of
//! `(seed, n_step)`. The `1/sqrt(n_step)` scaling means two different step
//! counts disagree even at shared indices.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::warn;

use coinmarket_env::PricePath;

use crate::error::{PathError, SimulationParamError};
use crate::seed::derive_seed;

/// Below this many steps the walk is too short to look stochastic.
pub const MIN_RELIABLE_STEPS: usize = 30;

/// Generates a discrete Wiener process of `n_step` points starting at `x0`.
///
/// # Errors
/// [`SimulationParamError::NonPositiveSteps`] when `n_step == 0`.
pub fn wiener_process(x0: f64, n_step: usize, seed: u64) -> Result<Vec<f64>, SimulationParamError> {
    if n_step < 1 {
        return Err(SimulationParamError::NonPositiveSteps(n_step));
    }
    if n_step < MIN_RELIABLE_STEPS {
        warn!(
            "n_step={} is small; the sequence may not be a good stochastic process",
            n_step
        );
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let scale = (n_step as f64).sqrt();

    let mut w = Vec::with_capacity(n_step);
    w.push(x0);
    for i in 1..n_step {
        let y: f64 = StandardNormal.sample(&mut rng);
        w.push(w[i - 1] + y / scale);
    }
    Ok(w)
}

/// Evenly spaced points over `[start, stop]`, both ends included.
fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut v: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            v[num - 1] = stop;
            v
        }
    }
}

/// Parameters of the toy GBM price model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmParams {
    /// Initial price
    pub s0: f64,
    /// Drift
    pub mu: f64,
    /// Volatility
    pub sigma: f64,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            s0: 100.0,
            mu: 0.2,
            sigma: 0.62,
        }
    }
}

impl GbmParams {
    /// Creates a new parameter set.
    pub fn new(s0: f64, mu: f64, sigma: f64) -> Self {
        Self { s0, mu, sigma }
    }

    /// Checks that the parameters can yield a finite positive path.
    pub fn validate(&self) -> Result<(), SimulationParamError> {
        if !self.s0.is_finite() || self.s0 <= 0.0 {
            return Err(SimulationParamError::InvalidStartPrice(self.s0));
        }
        if !self.mu.is_finite() || !self.sigma.is_finite() {
            return Err(SimulationParamError::NonFiniteCoefficients {
                mu: self.mu,
                sigma: self.sigma,
            });
        }
        Ok(())
    }

    /// Simulates `floor(delta_t)` prices over the horizon `[0, delta_t]`.
    ///
    /// # Errors
    /// Any [`SimulationParamError`]; a path that underflows to zero or
    /// overflows to infinity is reported as `Degenerate` rather than returned.
    pub fn price_path(&self, seed: u64, delta_t: f64) -> Result<PricePath, SimulationParamError> {
        self.validate()?;
        if !delta_t.is_finite() || delta_t < 1.0 {
            return Err(SimulationParamError::InvalidHorizon(delta_t));
        }

        let n_step = delta_t.floor() as usize;
        let drift = self.mu - self.sigma * self.sigma / 2.0;
        let time_vector = linspace(0.0, delta_t, n_step);
        let wiener = wiener_process(0.0, n_step, seed)?;

        let path: PricePath = time_vector
            .iter()
            .zip(&wiener)
            .map(|(t, w)| self.s0 * (drift * t + self.sigma * w).exp())
            .collect();

        if let Some(index) = path.iter().position(|p| !p.is_finite() || *p <= 0.0) {
            return Err(SimulationParamError::Degenerate { index });
        }
        Ok(path)
    }

    /// Simulates the price path of a named entity.
    pub fn entity_path(&self, name: &str, delta_t: f64) -> Result<PricePath, PathError> {
        let seed = derive_seed(name)?;
        Ok(self.price_path(seed, delta_t)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_wiener_starts_at_x0() {
        let w = wiener_process(3.5, 60, 198).unwrap();
        assert_eq!(w.len(), 60);
        assert_eq!(w[0], 3.5);
    }

    #[test]
    fn test_wiener_is_bit_identical_for_same_seed() {
        let a = wiener_process(0.0, 60, 42).unwrap();
        let b = wiener_process(0.0, 60, 42).unwrap();
        let bits_a: Vec<u64> = a.iter().map(|x| x.to_bits()).collect();
        let bits_b: Vec<u64> = b.iter().map(|x| x.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_wiener_differs_across_seeds() {
        let a = wiener_process(0.0, 60, 1).unwrap();
        let b = wiener_process(0.0, 60, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wiener_step_count_changes_shared_indices() {
        // Same seed, same draws, different 1/sqrt(n) scaling
        let short = wiener_process(0.0, 40, 7).unwrap();
        let long = wiener_process(0.0, 90, 7).unwrap();
        assert_relative_eq!(short[1] * 40f64.sqrt(), long[1] * 90f64.sqrt(), epsilon = 1e-12);
        assert_ne!(short[1], long[1]);
    }

    #[test]
    fn test_wiener_zero_steps_rejected() {
        assert_eq!(
            wiener_process(0.0, 0, 1),
            Err(SimulationParamError::NonPositiveSteps(0))
        );
    }

    #[test]
    fn test_wiener_short_sequence_still_produced() {
        // Warns, does not fail
        let w = wiener_process(1.0, 5, 1).unwrap();
        assert_eq!(w.len(), 5);
    }

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(0.0, 60.0, 60);
        assert_eq!(v.len(), 60);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[59], 60.0);
        assert_relative_eq!(v[1], 60.0 / 59.0);
        assert_eq!(linspace(0.0, 1.5, 1), vec![0.0]);
    }

    #[test]
    fn test_price_path_length_is_floor_of_horizon() {
        let params = GbmParams::default();
        assert_eq!(params.price_path(198, 60.0).unwrap().len(), 60);
        assert_eq!(params.price_path(198, 7.9).unwrap().len(), 7);
        assert_eq!(params.price_path(198, 1.0).unwrap().len(), 1);
    }

    #[test]
    fn test_price_path_starts_at_s0() {
        let params = GbmParams::default();
        let path = params.price_path(198, 60.0).unwrap();
        // t = 0 and W[0] = 0, so exp(0) = 1
        assert_eq!(path[0], 100.0);
    }

    #[test]
    fn test_price_path_matches_formula() {
        let params = GbmParams::new(50.0, 0.1, 0.3);
        let path = params.price_path(11, 30.0).unwrap();
        let w = wiener_process(0.0, 30, 11).unwrap();
        let t = linspace(0.0, 30.0, 30);
        let drift = 0.1 - 0.3 * 0.3 / 2.0;
        for i in 0..30 {
            assert_relative_eq!(path[i], 50.0 * (drift * t[i] + 0.3 * w[i]).exp(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let params = GbmParams::default();
        assert!(matches!(
            params.price_path(1, 0.5),
            Err(SimulationParamError::InvalidHorizon(_))
        ));
        assert!(matches!(
            params.price_path(1, f64::NAN),
            Err(SimulationParamError::InvalidHorizon(_))
        ));
        assert!(matches!(
            GbmParams::new(0.0, 0.2, 0.62).price_path(1, 10.0),
            Err(SimulationParamError::InvalidStartPrice(_))
        ));
        assert!(matches!(
            GbmParams::new(100.0, f64::INFINITY, 0.62).price_path(1, 10.0),
            Err(SimulationParamError::NonFiniteCoefficients { .. })
        ));
    }

    #[test]
    fn test_entity_path_uses_name_seed() {
        let params = GbmParams::default();
        let by_name = params.entity_path("ABC", 60.0).unwrap();
        let by_seed = params.price_path(198, 60.0).unwrap();
        assert_eq!(by_name, by_seed);

        assert_eq!(
            params.entity_path("", 60.0),
            Err(PathError::Seed(crate::error::SeedInputError))
        );
    }

    proptest! {
        #[test]
        fn prop_prices_positive_with_expected_length(
            seed in 0u64..100_000,
            s0 in 0.01f64..10_000.0,
            mu in -1.0f64..1.0,
            sigma in 0.0f64..1.0,
            delta_t in 1.0f64..120.0,
        ) {
            let path = GbmParams::new(s0, mu, sigma).price_path(seed, delta_t).unwrap();
            prop_assert_eq!(path.len(), delta_t.floor() as usize);
            prop_assert!(path.iter().all(|p| p.is_finite() && *p > 0.0));
        }
    }
}
