//! Numerical time integration of the SEIR equations.
mod dopri5;
mod integrator;
mod rk4;
mod trajectory;

pub use dopri5::MIN_STEP;
pub use integrator::*;
pub use rk4::rk4_step;
pub use trajectory::*;

use crate::{error::Result, models::OdeSystem, Real, Time};

/// A time stepping scheme that advances a state over one reporting interval.
///
/// Steppers may keep internal state across calls (e.g., the current step size
/// of an adaptive method), but a new stepper is created for every run.
pub(crate) trait Stepper<const N: usize> {
    /// Advance y from t0 to t1. `day` is only used for diagnostics.
    fn advance<S: OdeSystem<N>>(
        &mut self,
        system: &S,
        t0: Real,
        t1: Real,
        y: [Real; N],
        day: Time,
    ) -> Result<[Real; N]>;
}
