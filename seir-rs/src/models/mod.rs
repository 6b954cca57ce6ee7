//! Compartments and dynamics of the SEIR model.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Real;

mod seir;
pub use seir::*;

/// A system of ordinary differential equations with `N` state variables.
///
/// Implementations must be pure: the same `(t, y)` always produce the same
/// derivatives and nothing is mutated. Every integration sub-step calls
/// into this trait, so it is the single source of truth for the dynamics.
pub trait OdeSystem<const N: usize> {
    /// Compute dy/dt at time t.
    fn derivatives(&self, t: Real, y: &[Real; N]) -> [Real; N];
}

/// One of the four population subsets tracked by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Compartment {
    Susceptible,
    Exposed,
    Infectious,
    Recovered,
}

impl Compartment {
    /// Number of compartments.
    pub const CARDINALITY: usize = 4;

    /// All compartments, in state-vector order.
    pub const ALL: [Compartment; 4] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infectious,
        Compartment::Recovered,
    ];

    /// Position of the compartment in the state vector.
    pub fn index(self) -> usize {
        match self {
            Compartment::Susceptible => 0,
            Compartment::Exposed => 1,
            Compartment::Infectious => 2,
            Compartment::Recovered => 3,
        }
    }

    /// Single letter abbreviation.
    pub fn label(self) -> &'static str {
        match self {
            Compartment::Susceptible => "S",
            Compartment::Exposed => "E",
            Compartment::Infectious => "I",
            Compartment::Recovered => "R",
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_state_order() {
        for (i, c) in Compartment::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
        let labels: Vec<String> = Compartment::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels.join(","), "S,E,I,R");
    }
}
