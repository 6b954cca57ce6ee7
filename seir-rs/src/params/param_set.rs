use std::convert::TryFrom;

use getset::CopyGetters;
use serde::{de, Deserialize, Deserializer, Serialize};

use super::constants::*;
use crate::{
    error::{ensure_finite, Error, Result},
    models::SeirState,
    Real, Time,
};

/// Validated SEIR parameters. Immutable once constructed.
///
/// The initial susceptible population is not stored, it is always derived as
/// `population - exposed - infectious - recovered`, which validation
/// guarantees to be non-negative.
#[derive(CopyGetters, Debug, PartialEq, Copy, Clone, Serialize)]
#[getset(get_copy = "pub")]
pub struct ParamSet {
    /// Transmission rate (β): adequate contacts per infectious individual per day.
    beta: Real,

    /// Incubation rate (σ): reciprocal of the mean latent period.
    sigma: Real,

    /// Recovery rate (γ): reciprocal of the mean infectious period.
    gamma: Real,

    /// Total population N. Constant over the simulation.
    population: Real,

    /// Initial number of exposed individuals.
    exposed: Real,

    /// Initial number of infectious individuals.
    infectious: Real,

    /// Initial number of recovered individuals.
    recovered: Real,

    /// Number of simulated days. Trajectories have `duration_days + 1` entries.
    duration_days: Time,
}

impl ParamSet {
    /// Validate the given scalars and build a parameter set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        beta: Real,
        sigma: Real,
        gamma: Real,
        population: Real,
        exposed: Real,
        infectious: Real,
        recovered: Real,
        duration_days: Time,
    ) -> Result<Self> {
        ParamValues {
            beta,
            sigma,
            gamma,
            population,
            exposed,
            infectious,
            recovered,
            duration_days,
        }
        .validate()
    }

    /// Initial susceptible population S0.
    ///
    /// Uses the same sum as validation, so S0 is never negative.
    pub fn susceptible(&self) -> Real {
        (self.population - self.seeded()).max(0.0)
    }

    /// Individuals outside the susceptible compartment at t = 0.
    fn seeded(&self) -> Real {
        self.exposed + self.infectious + self.recovered
    }

    /// Basic reproduction number, β/γ.
    pub fn r0(&self) -> Real {
        self.beta / self.gamma
    }

    /// Mean latent period, 1/σ.
    pub fn latent_period(&self) -> Real {
        1.0 / self.sigma
    }

    /// Mean infectious period, 1/γ.
    pub fn infectious_period(&self) -> Real {
        1.0 / self.gamma
    }

    /// State vector at t = 0.
    pub fn initial_state(&self) -> SeirState {
        SeirState::new(
            self.susceptible(),
            self.exposed,
            self.infectious,
            self.recovered,
        )
    }

    /// Raw values, useful to derive a modified scenario in a parameter sweep.
    pub fn values(&self) -> ParamValues {
        ParamValues::from(*self)
    }
}

impl TryFrom<ParamValues> for ParamSet {
    type Error = Error;

    fn try_from(values: ParamValues) -> Result<Self> {
        values.validate()
    }
}

impl<'de> Deserialize<'de> for ParamSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = ParamValues::deserialize(deserializer)?;
        return values.validate().map_err(de::Error::custom);
    }
}

/// Unvalidated parameter values.
///
/// Missing fields in configuration files are filled from [`Default`], which
/// describes a dengue outbreak in a city of one million inhabitants.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamValues {
    pub beta: Real,
    pub sigma: Real,
    pub gamma: Real,
    pub population: Real,
    pub exposed: Real,
    pub infectious: Real,
    pub recovered: Real,
    pub duration_days: Time,
}

impl ParamValues {
    /// Check every constraint and build the corresponding [`ParamSet`].
    ///
    /// Rules are checked in declaration order and the first violation is
    /// reported.
    pub fn validate(self) -> Result<ParamSet> {
        for &(field, value) in &[
            ("beta", self.beta),
            ("sigma", self.sigma),
            ("gamma", self.gamma),
        ] {
            if ensure_finite(field, value)? <= 0.0 {
                return Err(Error::invalid(field, format!("must be > 0, got {}", value)));
            }
        }

        if ensure_finite("population", self.population)? < 1.0 {
            return Err(Error::invalid(
                "population",
                format!("must be >= 1, got {}", self.population),
            ));
        }

        for &(field, value) in &[
            ("exposed", self.exposed),
            ("infectious", self.infectious),
            ("recovered", self.recovered),
        ] {
            if ensure_finite(field, value)? < 0.0 {
                return Err(Error::invalid(field, format!("must be >= 0, got {}", value)));
            }
        }

        let seeded = self.exposed + self.infectious + self.recovered;
        if seeded > self.population {
            return Err(Error::invalid(
                "population",
                format!(
                    "exposed + infectious + recovered = {} exceeds population {}",
                    seeded, self.population
                ),
            ));
        }

        if self.duration_days < 1 {
            return Err(Error::invalid("duration_days", "must be >= 1, got 0"));
        }

        Ok(ParamSet {
            beta: self.beta,
            sigma: self.sigma,
            gamma: self.gamma,
            population: self.population,
            exposed: self.exposed,
            infectious: self.infectious,
            recovered: self.recovered,
            duration_days: self.duration_days,
        })
    }
}

impl Default for ParamValues {
    fn default() -> Self {
        ParamValues {
            beta: TRANSMISSION_RATE,
            sigma: INCUBATION_RATE,
            gamma: RECOVERY_RATE,
            population: POPULATION,
            exposed: INITIAL_EXPOSED,
            infectious: INITIAL_INFECTIOUS,
            recovered: INITIAL_RECOVERED,
            duration_days: DURATION_DAYS,
        }
    }
}

impl From<ParamSet> for ParamValues {
    fn from(p: ParamSet) -> ParamValues {
        ParamValues {
            beta: p.beta,
            sigma: p.sigma,
            gamma: p.gamma,
            population: p.population,
            exposed: p.exposed,
            infectious: p.infectious,
            recovered: p.recovered,
            duration_days: p.duration_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ParamValues {
        ParamValues {
            beta: 0.3,
            sigma: 0.2,
            gamma: 0.1,
            population: 10_000.0,
            exposed: 100.0,
            infectious: 0.0,
            recovered: 0.0,
            duration_days: 100,
        }
    }

    fn rejected_field(values: ParamValues) -> &'static str {
        match values.validate() {
            Err(Error::InvalidParameter { field, .. }) => field,
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn valid_scenario() {
        let params = scenario().validate().unwrap();
        assert_eq!(params.susceptible(), 9_900.0);
        assert_eq!(params.r0(), 0.3 / 0.1);
        assert_eq!(params.latent_period(), 5.0);
        assert_eq!(params.infectious_period(), 10.0);
        assert_eq!(
            params.initial_state(),
            SeirState::new(9_900.0, 100.0, 0.0, 0.0)
        );
    }

    #[test]
    fn rejects_non_positive_rates() {
        assert_eq!(rejected_field(ParamValues { beta: 0.0, ..scenario() }), "beta");
        assert_eq!(rejected_field(ParamValues { sigma: -0.2, ..scenario() }), "sigma");
        assert_eq!(rejected_field(ParamValues { gamma: 0.0, ..scenario() }), "gamma");
    }

    #[test]
    fn rejects_small_population() {
        assert_eq!(
            rejected_field(ParamValues {
                population: 0.0,
                exposed: 0.0,
                ..scenario()
            }),
            "population"
        );
        assert_eq!(
            rejected_field(ParamValues {
                population: 0.5,
                exposed: 0.0,
                ..scenario()
            }),
            "population"
        );
    }

    #[test]
    fn rejects_negative_seeds() {
        assert_eq!(rejected_field(ParamValues { exposed: -1.0, ..scenario() }), "exposed");
        assert_eq!(rejected_field(ParamValues { infectious: -1.0, ..scenario() }), "infectious");
        assert_eq!(rejected_field(ParamValues { recovered: -0.1, ..scenario() }), "recovered");
    }

    #[test]
    fn rejects_seeds_above_population() {
        let values = ParamValues {
            exposed: 5_000.0,
            infectious: 4_000.0,
            recovered: 1_001.0,
            ..scenario()
        };
        assert_eq!(rejected_field(values), "population");

        // Exactly N seeded individuals is fine and leaves S0 = 0.
        let params = ParamValues {
            exposed: 5_000.0,
            infectious: 4_000.0,
            recovered: 1_000.0,
            ..scenario()
        }
        .validate()
        .unwrap();
        assert_eq!(params.susceptible(), 0.0);
    }

    #[test]
    fn susceptible_is_never_negative() {
        // 0.02 + 0.3 + 0.68 rounds to exactly 1, but 1 - 0.02 - 0.3 - 0.68 does not.
        let params = ParamSet::new(0.3, 0.2, 0.1, 1.0, 0.02, 0.3, 0.68, 5).unwrap();
        assert_eq!(params.susceptible(), 0.0);
        assert_eq!(params.initial_state().susceptible(), 0.0);
    }

    #[test]
    fn rejects_zero_duration() {
        assert_eq!(rejected_field(ParamValues { duration_days: 0, ..scenario() }), "duration_days");
    }

    #[test]
    fn rejects_non_finite_values() {
        assert_eq!(rejected_field(ParamValues { beta: Real::NAN, ..scenario() }), "beta");
        assert_eq!(
            rejected_field(ParamValues { population: Real::INFINITY, ..scenario() }),
            "population"
        );
        assert_eq!(rejected_field(ParamValues { exposed: Real::NAN, ..scenario() }), "exposed");
    }

    #[test]
    fn error_message_names_field() {
        let err = ParamValues { gamma: -1.0, ..scenario() }.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter `gamma`: must be > 0, got -1");
    }

    #[test]
    fn constructor_matches_values() {
        let params = ParamSet::new(0.3, 0.2, 0.1, 10_000.0, 100.0, 0.0, 0.0, 100).unwrap();
        assert_eq!(params, scenario().validate().unwrap());
        assert_eq!(params.values(), scenario());
        assert!(ParamSet::new(0.3, 0.2, 0.1, 0.0, 0.0, 0.0, 0.0, 100).is_err());
    }

    #[test]
    fn default_values_are_valid() {
        let params = ParamSet::try_from(ParamValues::default()).unwrap();
        assert_eq!(params.population(), POPULATION);
        assert_eq!(params.infectious(), INITIAL_INFECTIOUS);
        assert_eq!(params.duration_days(), DURATION_DAYS);
    }

    #[test]
    fn roundtrip() {
        let params = scenario().validate().unwrap();
        let data = toml::to_string(&params).unwrap();
        let params_: ParamSet = toml::from_str(&data).unwrap();
        assert_eq!(params, params_);
    }

    #[test]
    fn deserialize_validates() {
        let err = toml::from_str::<ParamSet>("beta = -0.3").unwrap_err();
        assert!(err.to_string().contains("beta"));

        let params: ParamSet = toml::from_str("beta = 0.5\nduration_days = 30").unwrap();
        assert_eq!(params.beta(), 0.5);
        assert_eq!(params.duration_days(), 30);
        assert_eq!(params.gamma(), RECOVERY_RATE);
    }
}
