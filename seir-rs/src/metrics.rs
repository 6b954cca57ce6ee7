//! Summary statistics of a simulated epidemic.
use getset::CopyGetters;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{
    error::{ensure_finite, Error, Result},
    models::Compartment,
    params::{ParamSet, DECAY_THRESHOLD},
    sim::Trajectory,
    Real, Time,
};

/// Settings of the metrics extractor.
#[derive(CopyGetters, Debug, PartialEq, Copy, Clone, Serialize)]
#[getset(get_copy = "pub")]
pub struct MetricsConfig {
    /// Number of infectious individuals at or below which the epidemic is
    /// considered over.
    decay_threshold: Real,
}

impl MetricsConfig {
    pub fn new(decay_threshold: Real) -> Result<Self> {
        if ensure_finite("decay_threshold", decay_threshold)? < 0.0 {
            return Err(Error::invalid(
                "decay_threshold",
                format!("must be >= 0, got {}", decay_threshold),
            ));
        }
        Ok(MetricsConfig { decay_threshold })
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            decay_threshold: DECAY_THRESHOLD,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct _MetricsConfig {
    decay_threshold: Real,
}

impl Default for _MetricsConfig {
    fn default() -> Self {
        _MetricsConfig {
            decay_threshold: DECAY_THRESHOLD,
        }
    }
}

impl<'de> Deserialize<'de> for MetricsConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = _MetricsConfig::deserialize(deserializer)?;
        return MetricsConfig::new(raw.decay_threshold).map_err(de::Error::custom);
    }
}

/// Read-only summary computed from a trajectory and the parameters that
/// produced it.
#[derive(CopyGetters, Debug, PartialEq, Copy, Clone, Serialize)]
#[getset(get_copy = "pub")]
pub struct Metrics {
    /// Basic reproduction number, β/γ.
    r0: Real,

    /// First day in which the infectious compartment reaches its maximum.
    peak_infectious_day: Time,

    /// Maximum of the infectious compartment.
    peak_infectious_value: Real,

    /// Last day with more infectious individuals than the decay threshold,
    /// or 0 if that never happens.
    epidemic_duration: Time,

    /// True if the epidemic was still above the decay threshold on the last
    /// simulated day. In that case `epidemic_duration == duration_days`.
    truncated: bool,

    /// Susceptible population on the last simulated day.
    final_susceptible: Real,

    /// Fraction of the population that left the susceptible compartment.
    attack_rate: Real,

    /// Fraction of immune individuals above which the epidemic recedes,
    /// 1 - 1/R0, or zero if R0 <= 1.
    herd_immunity_threshold: Real,
}

impl Metrics {
    /// Extract metrics with the default decay threshold of one individual.
    pub fn from_trajectory(params: &ParamSet, trajectory: &Trajectory) -> Result<Metrics> {
        Metrics::extract(params, trajectory, &MetricsConfig::default())
    }

    /// Extract metrics from a complete trajectory.
    ///
    /// Fails if the trajectory is empty, which never happens for
    /// trajectories produced by the integrator.
    pub fn extract(params: &ParamSet, trajectory: &Trajectory, config: &MetricsConfig) -> Result<Metrics> {
        let (peak_infectious_day, peak_infectious_value) = trajectory
            .peak(Compartment::Infectious)
            .ok_or_else(|| Error::invalid("trajectory", "must contain at least one day"))?;
        let last = trajectory
            .last()
            .ok_or_else(|| Error::invalid("trajectory", "must contain at least one day"))?;

        let threshold = config.decay_threshold();
        let epidemic_duration = trajectory
            .iter()
            .rev()
            .find(|s| s.infectious() > threshold)
            .map(|s| s.day())
            .unwrap_or(0);
        let truncated = last.infectious() > threshold;

        let r0 = params.r0();
        let population = params.population();
        let final_susceptible = last.susceptible();

        Ok(Metrics {
            r0,
            peak_infectious_day,
            peak_infectious_value,
            epidemic_duration,
            truncated,
            final_susceptible,
            attack_rate: (population - final_susceptible) / population,
            herd_immunity_threshold: (1.0 - 1.0 / r0).max(0.0),
        })
    }
}
