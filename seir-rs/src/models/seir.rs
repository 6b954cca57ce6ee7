use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::{Compartment, OdeSystem};
use crate::{params::ParamSet, Real};

/// Compartment values (S, E, I, R) at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeirState([Real; 4]);

impl SeirState {
    pub fn new(susceptible: Real, exposed: Real, infectious: Real, recovered: Real) -> Self {
        SeirState([susceptible, exposed, infectious, recovered])
    }

    pub fn susceptible(&self) -> Real {
        self.0[0]
    }

    pub fn exposed(&self) -> Real {
        self.0[1]
    }

    pub fn infectious(&self) -> Real {
        self.0[2]
    }

    pub fn recovered(&self) -> Real {
        self.0[3]
    }

    /// Value of the given compartment.
    pub fn get(&self, compartment: Compartment) -> Real {
        self.0[compartment.index()]
    }

    /// Sum of all compartments. Should always equal the population size.
    pub fn total(&self) -> Real {
        self.0.iter().sum()
    }

    pub fn as_array(&self) -> &[Real; 4] {
        &self.0
    }

    /// Replace negative values (floating point residue) with zero and return
    /// the number of compartments that were clamped.
    pub fn clamp_negative(&mut self) -> usize {
        let mut clamped = 0;
        for x in self.0.iter_mut() {
            if *x < 0.0 {
                *x = 0.0;
                clamped += 1;
            }
        }
        return clamped;
    }
}

impl From<[Real; 4]> for SeirState {
    fn from(data: [Real; 4]) -> Self {
        SeirState(data)
    }
}

impl From<SeirState> for [Real; 4] {
    fn from(state: SeirState) -> Self {
        state.0
    }
}

impl Index<Compartment> for SeirState {
    type Output = Real;

    fn index(&self, compartment: Compartment) -> &Real {
        &self.0[compartment.index()]
    }
}

/// Right-hand side of the SEIR equations bound to a parameter set.
///
/// ```text
/// dS/dt = -β S I / N
/// dE/dt =  β S I / N - σ E
/// dI/dt =  σ E - γ I
/// dR/dt =  γ I
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SeirModel<'a> {
    params: &'a ParamSet,
}

impl<'a> SeirModel<'a> {
    pub fn new(params: &'a ParamSet) -> Self {
        SeirModel { params }
    }

    pub fn params(&self) -> &ParamSet {
        self.params
    }

    /// Number of new exposures per day in the given state, β S I / N.
    pub fn force_of_infection(&self, state: &SeirState) -> Real {
        self.params.beta() * state.susceptible() * state.infectious() / self.params.population()
    }

    /// Effective reproduction number R0 · S / N.
    pub fn effective_reproduction_number(&self, state: &SeirState) -> Real {
        self.params.r0() * state.susceptible() / self.params.population()
    }
}

impl<'a> OdeSystem<4> for SeirModel<'a> {
    fn derivatives(&self, _t: Real, y: &[Real; 4]) -> [Real; 4] {
        let [s, e, i, _] = *y;
        let exposure = self.params.beta() * s * i / self.params.population();
        let incubation = self.params.sigma() * e;
        let recovery = self.params.gamma() * i;
        [
            -exposure,
            exposure - incubation,
            incubation - recovery,
            recovery,
        ]
    }
}
