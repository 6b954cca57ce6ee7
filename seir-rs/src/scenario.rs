//! Scenario configuration files.
//!
//! A scenario bundles everything needed to run and summarize one simulation.
//! It is usually stored as TOML:
//!
//! ```toml
//! [params]
//! beta = 0.3
//! sigma = 0.2
//! gamma = 0.1
//! population = 10000
//! exposed = 100
//! infectious = 0
//! recovered = 0
//! duration_days = 100
//!
//! [integrator]
//! conservation_tolerance = 1e-6
//!
//! [integrator.method]
//! kind = "rk4"
//! steps_per_day = 24
//!
//! [metrics]
//! decay_threshold = 1.0
//! ```
//!
//! The `[integrator]` and `[metrics]` tables are optional. Fields missing from
//! `[params]` are taken from [`ParamValues::default`](crate::params::ParamValues).
use std::{fs, path::Path};

use getset::Getters;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    metrics::{Metrics, MetricsConfig},
    params::ParamSet,
    sim::{Integrator, Trajectory},
};

#[derive(Getters, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Scenario {
    params: ParamSet,

    #[serde(default)]
    integrator: Integrator,

    #[serde(default)]
    metrics: MetricsConfig,
}

impl Scenario {
    pub fn new(params: ParamSet, integrator: Integrator, metrics: MetricsConfig) -> Self {
        Scenario {
            params,
            integrator,
            metrics,
        }
    }

    /// Parse and validate a scenario from TOML data.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    /// Read a scenario from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading scenario from {}", path.display());
        let data = fs::read_to_string(path)?;
        Scenario::from_toml_str(&data)
    }

    /// Render scenario as TOML.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Run the integrator and extract metrics from the resulting trajectory.
    pub fn simulate(&self) -> Result<Outcome> {
        let trajectory = self.integrator.run(&self.params)?;
        let metrics = Metrics::extract(&self.params, &trajectory, &self.metrics)?;
        Ok(Outcome {
            trajectory,
            metrics,
        })
    }
}

impl From<ParamSet> for Scenario {
    fn from(params: ParamSet) -> Self {
        Scenario::new(params, Integrator::default(), MetricsConfig::default())
    }
}

/// Trajectory and metrics of a single run.
#[derive(Getters, Debug, Clone, PartialEq, Serialize)]
#[getset(get = "pub")]
pub struct Outcome {
    trajectory: Trajectory,
    metrics: Metrics,
}

impl Outcome {
    pub fn into_parts(self) -> (Trajectory, Metrics) {
        (self.trajectory, self.metrics)
    }
}
