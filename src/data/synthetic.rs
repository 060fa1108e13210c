//! Synthetic saponification runs.
//!
//! For equal initial concentrations `c_0` the conductivity follows
//!
//! ```text
//! k(t) = (k_0 + k_inf · k c_0 t) / (1 + k c_0 t)
//! ```
//!
//! Recorded runs differ from the ideal curve in ways the calibration has to
//! cope with, so a generated run can add:
//! - an unknown offset between reaction start and the first reading
//! - Gaussian measurement noise
//! - random spikes (single bad readings)
//! - a mixing transient that drags the first readings down

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ReactionConditions, Series};
use crate::error::AppError;

/// Everything needed to generate one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    /// L/(mol·s).
    pub rate_constant: f64,
    pub conditions: ReactionConditions,
    /// Seconds between reaction start and the first reading.
    pub start_offset: f64,
    pub duration: f64,
    pub interval: f64,
    /// Standard deviation of additive noise, in conductivity units.
    pub noise: f64,
    pub spike_probability: f64,
    pub spike_size: f64,
    pub transient_points: usize,
    /// Depression of the first reading; later transient readings decay as `1/(i+1)`.
    pub transient_depth: f64,
}

impl RunParameters {
    /// A noise-free run sampled every `interval` seconds for `duration` seconds.
    pub fn ideal(rate_constant: f64, conditions: ReactionConditions, duration: f64, interval: f64) -> Self {
        Self {
            rate_constant,
            conditions,
            start_offset: 0.0,
            duration,
            interval,
            noise: 0.0,
            spike_probability: 0.0,
            spike_size: 0.0,
            transient_points: 0,
            transient_depth: 0.0,
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        self.conditions.validate().map_err(AppError::InvalidArgument)?;
        if !(self.rate_constant.is_finite() && self.rate_constant > 0.0) {
            return Err(AppError::InvalidArgument(format!(
                "rate constant must be > 0, got {}",
                self.rate_constant
            )));
        }
        if !(self.interval.is_finite() && self.interval > 0.0 && self.duration.is_finite()) {
            return Err(AppError::InvalidArgument("interval must be > 0 and duration finite".to_string()));
        }
        if self.duration < 3.0 * self.interval {
            return Err(AppError::InvalidArgument(format!(
                "duration {} gives fewer than four readings at interval {}",
                self.duration, self.interval
            )));
        }
        if !(self.start_offset >= 0.0 && self.noise >= 0.0 && self.spike_size >= 0.0 && self.transient_depth >= 0.0) {
            return Err(AppError::InvalidArgument(
                "start offset, noise, spike size and transient depth must be >= 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.spike_probability) {
            return Err(AppError::InvalidArgument(format!(
                "spike probability must be in [0, 1), got {}",
                self.spike_probability
            )));
        }
        Ok(())
    }
}

/// Ideal conductivity `t` seconds after the reaction started.
pub fn conductivity_at(rate_constant: f64, conditions: &ReactionConditions, t: f64) -> f64 {
    let kct = rate_constant * conditions.c_0 * t;
    (conditions.k_0 + conditions.k_inf * kct) / (1.0 + kct)
}

/// `k = A · exp(-Ea / (R T))` with `Ea` in kJ/mol.
pub fn arrhenius_rate_constant(activation_energy: f64, pre_exponential: f64, temperature: f64, gas_constant: f64) -> f64 {
    pre_exponential * (-activation_energy * 1000.0 / (gas_constant * temperature)).exp()
}

/// Generate one run; the same parameters and seed give the same series.
pub fn generate_run(params: &RunParameters, seed: u64) -> Result<Series, AppError> {
    params.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::InvalidArgument(format!("noise distribution: {e}")))?;

    let count = (params.duration / params.interval).floor() as usize + 1;
    let mut time = Vec::with_capacity(count);
    let mut conductivity = Vec::with_capacity(count);

    for i in 0..count {
        let t = i as f64 * params.interval;
        let mut k = conductivity_at(params.rate_constant, &params.conditions, t + params.start_offset);

        if params.noise > 0.0 {
            k += params.noise * normal.sample(&mut rng);
        }
        if params.spike_probability > 0.0 && rng.gen_bool(params.spike_probability) {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            k += sign * params.spike_size;
        }
        if i < params.transient_points {
            k -= params.transient_depth / (i as f64 + 1.0);
        }

        time.push(t);
        conductivity.push(k);
    }

    Series::new(time, conductivity).map_err(|e| AppError::InvalidArgument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONDITIONS: ReactionConditions = ReactionConditions {
        k_0: 2313.0,
        k_inf: 759.0,
        c_0: 0.0094,
    };

    #[test]
    fn ideal_run_follows_the_rate_law() {
        let series = generate_run(&RunParameters::ideal(0.11, CONDITIONS, 600.0, 6.0), 7).unwrap();
        assert_eq!(series.len(), 101);
        assert_eq!(series.conductivity()[0], 2313.0);
        for (t, k) in series.time().iter().zip(series.conductivity()) {
            assert_eq!(*k, conductivity_at(0.11, &CONDITIONS, *t));
        }
    }

    #[test]
    fn conductivity_moves_from_initial_towards_final_value() {
        let t = 1e9;
        let late = conductivity_at(0.11, &CONDITIONS, t);
        let residual = (2313.0 - 759.0) / (1.0 + 0.11 * 0.0094 * t);
        assert!((late - 759.0 - residual).abs() < 1e-9);
        assert!((late - 759.0).abs() < 1e-2);
        assert!(conductivity_at(0.11, &CONDITIONS, 100.0) < 2313.0);
    }

    #[test]
    fn same_seed_same_run() {
        let params = RunParameters {
            noise: 0.5,
            spike_probability: 0.05,
            spike_size: 40.0,
            ..RunParameters::ideal(0.11, CONDITIONS, 1200.0, 6.0)
        };
        assert_eq!(generate_run(&params, 3).unwrap(), generate_run(&params, 3).unwrap());
        assert_ne!(generate_run(&params, 3).unwrap(), generate_run(&params, 4).unwrap());
    }

    #[test]
    fn transient_depresses_first_readings_only() {
        let params = RunParameters {
            transient_points: 3,
            transient_depth: 300.0,
            ..RunParameters::ideal(0.11, CONDITIONS, 60.0, 6.0)
        };
        let series = generate_run(&params, 1).unwrap();
        assert_eq!(series.conductivity()[0], 2313.0 - 300.0);
        assert_eq!(series.conductivity()[3], conductivity_at(0.11, &CONDITIONS, 18.0));
    }

    #[test]
    fn arrhenius_rate_constant_inverts_log_line() {
        let k = arrhenius_rate_constant(45.0, 1.0e7, 298.15, 8.314);
        let ln_k = 1.0e7_f64.ln() - 45_000.0 / (8.314 * 298.15);
        assert!((k.ln() - ln_k).abs() < 1e-12);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let params = RunParameters::ideal(-1.0, CONDITIONS, 600.0, 6.0);
        assert!(matches!(generate_run(&params, 0), Err(AppError::InvalidArgument(_))));

        let short = RunParameters::ideal(0.11, CONDITIONS, 10.0, 6.0);
        assert!(generate_run(&short, 0).is_err());
    }
}
