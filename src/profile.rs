//! Synthetic duty-cycle power traces for demo runs and deterministic tests.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// A duty-cycle generator modeling a haul vehicle's traction power:
/// a sinusoidal base load, Gaussian measurement noise, and periodic
/// acceleration/braking surges that push the demand across the split
/// threshold in both directions.
///
/// Deterministic for a fixed seed.
///
/// # Examples
///
/// ```
/// use hess_sim::profile::SyntheticDutyCycle;
///
/// let mut cycle = SyntheticDutyCycle::new(600.0, 300.0, 600, 900.0, 600, 60, 25.0, 42);
/// let trace = cycle.generate(3600);
/// assert_eq!(trace.len(), 3600);
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticDutyCycle {
    /// Baseline traction power (kW).
    pub base_kw: f64,
    /// Amplitude of the slow sinusoidal variation (kW).
    pub amp_kw: f64,
    /// Period of the sinusoidal variation (timesteps).
    pub period_steps: usize,
    /// Magnitude of the acceleration/braking surges (kW).
    pub surge_kw: f64,
    /// Spacing between surge windows (timesteps).
    pub surge_period_steps: usize,
    /// Width of each surge window (timesteps).
    pub surge_width_steps: usize,
    /// Standard deviation of the Gaussian noise (kW).
    pub noise_std_kw: f64,
    rng: StdRng,
}

impl SyntheticDutyCycle {
    /// Creates a duty-cycle generator.
    ///
    /// # Panics
    ///
    /// Panics if a period is zero or the surge window does not fit in
    /// half the surge period.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        base_kw: f64,
        amp_kw: f64,
        period_steps: usize,
        surge_kw: f64,
        surge_period_steps: usize,
        surge_width_steps: usize,
        noise_std_kw: f64,
        seed: u64,
    ) -> Self {
        assert!(period_steps > 0, "period_steps must be > 0");
        assert!(surge_period_steps > 0, "surge_period_steps must be > 0");
        assert!(
            surge_width_steps <= surge_period_steps / 2,
            "surge window must fit in half the surge period"
        );
        Self {
            base_kw,
            amp_kw,
            period_steps,
            surge_kw,
            surge_period_steps,
            surge_width_steps,
            noise_std_kw,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Demand at one timestep (kW; negative during braking surges).
    pub fn demand_kw(&mut self, timestep: usize) -> f64 {
        let cycle_pos = (timestep % self.period_steps) as f64 / self.period_steps as f64;
        let angle = 2.0 * std::f64::consts::PI * cycle_pos;
        let mut kw = self.base_kw + self.amp_kw * angle.sin();

        // Acceleration surge at the start of each surge period, braking
        // (regenerative) surge half a period later.
        let surge_pos = timestep % self.surge_period_steps;
        if surge_pos < self.surge_width_steps {
            kw += self.surge_kw;
        } else if surge_pos >= self.surge_period_steps / 2
            && surge_pos < self.surge_period_steps / 2 + self.surge_width_steps
        {
            kw -= self.base_kw + self.surge_kw; // full regen excursion
        }

        kw + gaussian_noise(&mut self.rng, self.noise_std_kw)
    }

    /// Generates a complete trace of `steps` samples.
    pub fn generate(&mut self, steps: usize) -> Vec<f64> {
        (0..steps).map(|t| self.demand_kw(t)).collect()
    }
}

/// Gaussian noise via the Box-Muller transform (mean 0).
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
