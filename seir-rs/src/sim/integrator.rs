use getset::CopyGetters;
use log::{debug, trace};
use serde::{de, Deserialize, Deserializer, Serialize};

use super::{dopri5::DormandPrince, rk4::Rk4, Snapshot, Stepper, Trajectory};
use crate::{
    error::{ensure_finite, Error, Result},
    models::{SeirModel, SeirState},
    params::ParamSet,
    Real, Time,
};

pub const DEFAULT_STEPS_PER_DAY: u32 = 24;
pub const DEFAULT_TOLERANCE: Real = 1e-6;
pub const DEFAULT_MAX_STEP: Real = 0.5;
pub const DEFAULT_CONSERVATION_TOLERANCE: Real = 1e-6;

/// Largest rtol/atol accepted by the adaptive method.
pub const MAX_TOLERANCE: Real = 1e-6;

/// Numerical scheme used to advance the state between daily samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Method {
    /// Classical Runge-Kutta with a fixed sub-day step of `1 / steps_per_day`.
    Rk4 {
        #[serde(default = "default_steps_per_day")]
        steps_per_day: u32,
    },

    /// Adaptive Dormand-Prince 5(4) with mixed absolute/relative error control.
    DormandPrince {
        #[serde(default = "default_tolerance")]
        rtol: Real,
        #[serde(default = "default_tolerance")]
        atol: Real,
        #[serde(default = "default_max_step")]
        max_step: Real,
    },
}

fn default_steps_per_day() -> u32 {
    DEFAULT_STEPS_PER_DAY
}

fn default_tolerance() -> Real {
    DEFAULT_TOLERANCE
}

fn default_max_step() -> Real {
    DEFAULT_MAX_STEP
}

impl Method {
    /// Check the step size/tolerance contract of the method.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Method::Rk4 { steps_per_day } => {
                if steps_per_day < 2 {
                    return Err(Error::invalid(
                        "steps_per_day",
                        format!("internal step must be shorter than a day, got {} step(s)", steps_per_day),
                    ));
                }
            }
            Method::DormandPrince { rtol, atol, max_step } => {
                for &(field, value) in &[("rtol", rtol), ("atol", atol)] {
                    let value = ensure_finite(field, value)?;
                    if value <= 0.0 || value > MAX_TOLERANCE {
                        return Err(Error::invalid(
                            field,
                            format!("must be in (0, {:e}], got {:e}", MAX_TOLERANCE, value),
                        ));
                    }
                }
                let max_step = ensure_finite("max_step", max_step)?;
                if max_step <= 0.0 || max_step > 1.0 {
                    return Err(Error::invalid(
                        "max_step",
                        format!("must be in (0, 1] day, got {}", max_step),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::Rk4 {
            steps_per_day: DEFAULT_STEPS_PER_DAY,
        }
    }
}

/// Solves the SEIR initial value problem and samples it once per day.
///
/// After each reported day, negative values are clamped to zero and the
/// total population is checked against N. A drift larger than
/// `conservation_tolerance * N` aborts the run with
/// [`Error::ConservationViolation`].
///
/// The integrator holds no state between runs: the same integrator can be
/// shared by many threads and identical inputs always produce bit-identical
/// trajectories.
#[derive(CopyGetters, Debug, Clone, Copy, PartialEq, Serialize)]
#[getset(get_copy = "pub")]
pub struct Integrator {
    /// Relative tolerance for the population conservation check.
    conservation_tolerance: Real,

    // Declared last: TOML requires plain values before tables.
    method: Method,
}

impl Integrator {
    pub fn new(method: Method, conservation_tolerance: Real) -> Result<Self> {
        method.validate()?;
        let tol = ensure_finite("conservation_tolerance", conservation_tolerance)?;
        if tol <= 0.0 {
            return Err(Error::invalid(
                "conservation_tolerance",
                format!("must be > 0, got {}", tol),
            ));
        }
        Ok(Integrator {
            method,
            conservation_tolerance,
        })
    }

    /// Fixed step RK4 with the given number of sub-steps per day.
    pub fn rk4(steps_per_day: u32) -> Result<Self> {
        Integrator::new(Method::Rk4 { steps_per_day }, DEFAULT_CONSERVATION_TOLERANCE)
    }

    /// Adaptive Dormand-Prince with steps of at most half a day.
    pub fn dormand_prince(rtol: Real, atol: Real) -> Result<Self> {
        let method = Method::DormandPrince {
            rtol,
            atol,
            max_step: DEFAULT_MAX_STEP,
        };
        Integrator::new(method, DEFAULT_CONSERVATION_TOLERANCE)
    }

    /// Return a copy with a different conservation tolerance.
    pub fn with_conservation_tolerance(&self, tolerance: Real) -> Result<Self> {
        Integrator::new(self.method, tolerance)
    }

    /// Integrate the model from day 0 to `params.duration_days()`.
    pub fn run(&self, params: &ParamSet) -> Result<Trajectory> {
        match self.method {
            Method::Rk4 { steps_per_day } => self.integrate(params, Rk4::new(steps_per_day)),
            Method::DormandPrince {
                rtol,
                atol,
                max_step,
            } => self.integrate(params, DormandPrince::new(rtol, atol, max_step)),
        }
    }

    fn integrate<T: Stepper<4>>(&self, params: &ParamSet, mut stepper: T) -> Result<Trajectory> {
        let model = SeirModel::new(params);
        let population = params.population();
        let tolerance = self.conservation_tolerance * population;
        let duration = params.duration_days();

        let mut state = params.initial_state();
        state.clamp_negative();
        self.check_conservation(0, &state, population, tolerance)?;
        let mut snapshots = Vec::with_capacity(duration as usize + 1);
        snapshots.push(Snapshot::new(0, state));

        for day in 1..=duration {
            let t0 = (day - 1) as Real;
            let y = stepper.advance(&model, t0, day as Real, *state.as_array(), day)?;
            state = SeirState::from(y);

            let clamped = state.clamp_negative();
            if clamped > 0 {
                trace!("day [{}]: clamped {} negative compartment(s)", day, clamped);
            }
            self.check_conservation(day, &state, population, tolerance)?;

            trace!(
                "day [{}]: S={:.3}, E={:.3}, I={:.3}, R={:.3}, Rt = {:.2}",
                day,
                state.susceptible(),
                state.exposed(),
                state.infectious(),
                state.recovered(),
                model.effective_reproduction_number(&state)
            );
            snapshots.push(Snapshot::new(day, state));
        }

        debug!(
            "integrated {} days with {:?}: final S={:.3}, E={:.3}, I={:.3}, R={:.3}",
            duration,
            self.method,
            state.susceptible(),
            state.exposed(),
            state.infectious(),
            state.recovered()
        );
        Ok(Trajectory::new(population, snapshots))
    }

    fn check_conservation(
        &self,
        day: Time,
        state: &SeirState,
        population: Real,
        tolerance: Real,
    ) -> Result<()> {
        let drift = (state.total() - population).abs();
        if !(drift <= tolerance) {
            return Err(Error::ConservationViolation {
                day,
                drift,
                tolerance,
            });
        }
        Ok(())
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Integrator {
            method: Method::default(),
            conservation_tolerance: DEFAULT_CONSERVATION_TOLERANCE,
        }
    }
}

#[derive(Debug, PartialEq, Copy, Clone, Deserialize)]
#[serde(default)]
struct _Integrator {
    method: Method,
    conservation_tolerance: Real,
}

impl Default for _Integrator {
    fn default() -> Self {
        let Integrator {
            method,
            conservation_tolerance,
        } = Integrator::default();
        _Integrator {
            method,
            conservation_tolerance,
        }
    }
}

impl<'de> Deserialize<'de> for Integrator {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = _Integrator::deserialize(deserializer)?;
        return Integrator::new(raw.method, raw.conservation_tolerance).map_err(de::Error::custom);
    }
}
