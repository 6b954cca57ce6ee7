use log::trace;

use super::Stepper;
use crate::{
    error::{Error, Result},
    models::OdeSystem,
    Real, Time,
};

// Butcher tableau of the Dormand-Prince 5(4) pair.
const C: [Real; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A: [[Real; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0, 0.0, 0.0],
    [9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0, 0.0],
    [35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0],
];
// 5th order weights.
const B: [Real; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
// Difference between the 5th and the embedded 4th order weights.
const E: [Real; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const SAFETY: Real = 0.9;
const MIN_FACTOR: Real = 0.2;
const MAX_FACTOR: Real = 5.0;
const INITIAL_STEP: Real = 0.1;

/// Steps smaller than this (in days) are considered a failure of the method.
pub const MIN_STEP: Real = 1e-12;

/// Adaptive Dormand-Prince 5(4) integrator with local extrapolation.
///
/// The step size is controlled by the mixed absolute/relative error norm
/// `|err_i| / (atol + rtol * max(|y_i|, |y_new_i|))` (RMS over components).
/// Steps never cross the end of the requested interval and never exceed
/// `max_step`. The last accepted step size is kept between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DormandPrince {
    rtol: Real,
    atol: Real,
    max_step: Real,
    h: Real,
}

impl DormandPrince {
    pub fn new(rtol: Real, atol: Real, max_step: Real) -> Self {
        DormandPrince {
            rtol,
            atol,
            max_step,
            h: INITIAL_STEP.min(max_step),
        }
    }

    /// Try a single step of size h. Return the 5th order solution and the
    /// scaled error norm.
    fn try_step<S, const N: usize>(&self, system: &S, t: Real, y: &[Real; N], h: Real) -> ([Real; N], Real)
    where
        S: OdeSystem<N>,
    {
        let mut k = [[0.0; N]; 7];
        for stage in 0..7 {
            let mut yi = *y;
            for (j, kj) in k.iter().enumerate().take(stage) {
                let a = A[stage][j];
                if a != 0.0 {
                    for i in 0..N {
                        yi[i] += h * a * kj[i];
                    }
                }
            }
            k[stage] = system.derivatives(t + C[stage] * h, &yi);
        }

        let mut y_new = *y;
        let mut acc = 0.0;
        for i in 0..N {
            let mut incr = 0.0;
            let mut err = 0.0;
            for stage in 0..7 {
                incr += B[stage] * k[stage][i];
                err += E[stage] * k[stage][i];
            }
            y_new[i] += h * incr;
            let scale = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
            acc += (h * err / scale).powi(2);
        }
        return (y_new, (acc / N as Real).sqrt());
    }
}

impl<const N: usize> Stepper<N> for DormandPrince {
    fn advance<S: OdeSystem<N>>(
        &mut self,
        system: &S,
        t0: Real,
        t1: Real,
        mut y: [Real; N],
        day: Time,
    ) -> Result<[Real; N]> {
        let mut t = t0;
        let mut rejected = 0usize;
        let mut accepted = 0usize;

        while t < t1 {
            let proposal = self.h.min(self.max_step);
            let last = t1 - t <= proposal;
            let h = if last { t1 - t } else { proposal };

            let (y_new, err) = self.try_step(system, t, &y, h);
            let factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err.powf(-0.2)).max(MIN_FACTOR).min(MAX_FACTOR)
            };

            if err <= 1.0 {
                y = y_new;
                t = if last { t1 } else { t + h };
                accepted += 1;
                // A step shortened to land on t1 says little about the best
                // step size, so it may only grow the current one.
                let next = (h * factor).min(self.max_step);
                self.h = if last { self.h.max(next) } else { next };
            } else {
                rejected += 1;
                self.h = h * factor.min(1.0);
            }

            // Also catches NaN, which never compares as >= MIN_STEP.
            if !(self.h >= MIN_STEP) {
                return Err(Error::StepSizeUnderflow { day, step: self.h });
            }
        }

        trace!(
            "dopri5 [{}]: {} steps accepted, {} rejected, h = {:e}",
            day,
            accepted,
            rejected,
            self.h
        );
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    struct Decay;

    impl OdeSystem<1> for Decay {
        fn derivatives(&self, _t: Real, y: &[Real; 1]) -> [Real; 1] {
            [-y[0]]
        }
    }

    /// dy/dt = cos(t), non-autonomous.
    struct Forced;

    impl OdeSystem<1> for Forced {
        fn derivatives(&self, t: Real, _y: &[Real; 1]) -> [Real; 1] {
            [t.cos()]
        }
    }

    /// Blows up in finite time at t = 1: y = 1 / (1 - t)
    struct Blowup;

    impl OdeSystem<1> for Blowup {
        fn derivatives(&self, _t: Real, y: &[Real; 1]) -> [Real; 1] {
            [y[0] * y[0]]
        }
    }

    #[test]
    fn exponential_decay() {
        let mut stepper = DormandPrince::new(1e-8, 1e-10, 1.0);
        let mut y = [1.0];
        for day in 1..=5 {
            y = stepper.advance(&Decay, (day - 1) as Real, day as Real, y, day).unwrap();
        }
        assert_approx_eq!(y[0], (-5.0 as Real).exp(), 1e-8);
    }

    #[test]
    fn non_autonomous_system() {
        let mut stepper = DormandPrince::new(1e-8, 1e-10, 0.5);
        let y = stepper.advance(&Forced, 0.0, 3.0, [0.0], 1).unwrap();
        assert_approx_eq!(y[0], (3.0 as Real).sin(), 1e-7);
    }

    #[test]
    fn step_never_exceeds_max_step() {
        let mut stepper = DormandPrince::new(1e-6, 1e-6, 0.25);
        stepper.advance(&Decay, 0.0, 1.0, [1.0], 1).unwrap();
        assert!(stepper.h <= 0.25);
    }

    #[test]
    fn zero_derivatives_are_exact() {
        let mut stepper = DormandPrince::new(1e-6, 1e-6, 1.0);
        let y = stepper.advance(&Decay, 0.0, 1.0, [0.0], 1).unwrap();
        assert_eq!(y, [0.0]);
    }

    #[test]
    fn singularity_underflows() {
        let mut stepper = DormandPrince::new(1e-6, 1e-6, 1.0);
        match stepper.advance(&Blowup, 0.0, 2.0, [1.0], 7) {
            Err(Error::StepSizeUnderflow { day, step }) => {
                assert_eq!(day, 7);
                assert!(step < MIN_STEP);
            }
            other => panic!("expected underflow, got {:?}", other),
        }
    }
}
