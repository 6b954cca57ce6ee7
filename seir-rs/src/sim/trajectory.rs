use std::slice;

use getset::CopyGetters;
use paste::paste;
use serde::Serialize;

use crate::{
    models::{Compartment, SeirState},
    Real, Time,
};

/// Compartment values observed at the end of a given day.
#[derive(CopyGetters, Debug, Clone, Copy, PartialEq, Serialize)]
#[getset(get_copy = "pub")]
pub struct Snapshot {
    day: Time,
    susceptible: Real,
    exposed: Real,
    infectious: Real,
    recovered: Real,
}

impl Snapshot {
    pub(crate) fn new(day: Time, state: SeirState) -> Self {
        Snapshot {
            day,
            susceptible: state.susceptible(),
            exposed: state.exposed(),
            infectious: state.infectious(),
            recovered: state.recovered(),
        }
    }

    /// Value of the given compartment.
    pub fn get(&self, compartment: Compartment) -> Real {
        match compartment {
            Compartment::Susceptible => self.susceptible,
            Compartment::Exposed => self.exposed,
            Compartment::Infectious => self.infectious,
            Compartment::Recovered => self.recovered,
        }
    }

    pub fn state(&self) -> SeirState {
        SeirState::new(self.susceptible, self.exposed, self.infectious, self.recovered)
    }

    pub fn total(&self) -> Real {
        self.state().total()
    }
}

/// Implements named column accessors for each compartment.
macro_rules! compartment_columns {
    ($($name:ident => $compartment:ident),* $(,)?) => {
        paste! {
            $(
                #[doc = "Daily values of the " $name " compartment."]
                pub fn $name(&self) -> Vec<Real> {
                    self.column(Compartment::$compartment)
                }

                #[doc = "Day and value of the maximum of the " $name " compartment."]
                pub fn [<peak_ $name>](&self) -> Option<(Time, Real)> {
                    self.peak(Compartment::$compartment)
                }
            )*
        }
    };
}

/// Daily time series produced by a single simulation run, from day 0 to
/// `duration_days` inclusive.
///
/// Trajectories are created by the [`Integrator`](super::Integrator) and are
/// immutable afterwards. They do not hold any reference to the parameters or
/// the integrator that created them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    population: Real,
    snapshots: Vec<Snapshot>,
}

impl Trajectory {
    pub(crate) fn new(population: Real, snapshots: Vec<Snapshot>) -> Self {
        Trajectory {
            population,
            snapshots,
        }
    }

    compartment_columns!(
        susceptible => Susceptible,
        exposed => Exposed,
        infectious => Infectious,
        recovered => Recovered,
    );

    /// Total population N.
    pub fn population(&self) -> Real {
        self.population
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn iter(&self) -> slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    /// Number of snapshots, always `duration_days + 1`.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Last simulated day.
    pub fn duration_days(&self) -> Time {
        self.last().map(|s| s.day()).unwrap_or(0)
    }

    /// Snapshot of the given day.
    pub fn get(&self, day: Time) -> Option<&Snapshot> {
        self.snapshots.get(day as usize)
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Values of a compartment, one per day.
    pub fn column(&self, compartment: Compartment) -> Vec<Real> {
        self.snapshots.iter().map(|s| s.get(compartment)).collect()
    }

    /// Day and value of the maximum of a compartment. Ties resolve to the
    /// earliest day.
    pub fn peak(&self, compartment: Compartment) -> Option<(Time, Real)> {
        let mut iter = self.snapshots.iter();
        let first = iter.next()?;
        let mut best = (first.day(), first.get(compartment));
        for snapshot in iter {
            let value = snapshot.get(compartment);
            if value > best.1 {
                best = (snapshot.day(), value);
            }
        }
        return Some(best);
    }

    /// Daily new infections, S(d-1) - S(d), for days 1 to `duration_days`.
    pub fn incidence(&self) -> Vec<Real> {
        self.snapshots
            .windows(2)
            .map(|w| w[0].susceptible() - w[1].susceptible())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Snapshot;
    type IntoIter = slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
