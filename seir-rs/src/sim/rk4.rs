use super::Stepper;
use crate::{error::Result, models::OdeSystem, Real, Time};

/// Performs a single step of the classical 4th order Runge-Kutta method.
pub fn rk4_step<S, const N: usize>(system: &S, t: Real, y: &[Real; N], h: Real) -> [Real; N]
where
    S: OdeSystem<N>,
{
    let k1 = system.derivatives(t, y);
    let k2 = system.derivatives(t + 0.5 * h, &axpy(y, 0.5 * h, &k1));
    let k3 = system.derivatives(t + 0.5 * h, &axpy(y, 0.5 * h, &k2));
    let k4 = system.derivatives(t + h, &axpy(y, h, &k3));

    let mut out = *y;
    for i in 0..N {
        out[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    return out;
}

/// y + a * x
#[inline]
pub(crate) fn axpy<const N: usize>(y: &[Real; N], a: Real, x: &[Real; N]) -> [Real; N] {
    let mut out = *y;
    for i in 0..N {
        out[i] += a * x[i];
    }
    out
}

/// Fixed step RK4 with an integer number of sub-steps per reporting interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rk4 {
    steps_per_day: u32,
}

impl Rk4 {
    pub fn new(steps_per_day: u32) -> Self {
        Rk4 { steps_per_day }
    }
}

impl<const N: usize> Stepper<N> for Rk4 {
    fn advance<S: OdeSystem<N>>(
        &mut self,
        system: &S,
        t0: Real,
        t1: Real,
        mut y: [Real; N],
        _day: Time,
    ) -> Result<[Real; N]> {
        let h = (t1 - t0) / self.steps_per_day as Real;
        for k in 0..self.steps_per_day {
            y = rk4_step(system, t0 + k as Real * h, &y, h);
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// dy/dt = -y
    struct Decay;

    impl OdeSystem<1> for Decay {
        fn derivatives(&self, _t: Real, y: &[Real; 1]) -> [Real; 1] {
            [-y[0]]
        }
    }

    /// Harmonic oscillator, x'' = -x
    struct Oscillator;

    impl OdeSystem<2> for Oscillator {
        fn derivatives(&self, _t: Real, y: &[Real; 2]) -> [Real; 2] {
            [y[1], -y[0]]
        }
    }

    #[test]
    fn exponential_decay() {
        let y = Rk4::new(10).advance(&Decay, 0.0, 1.0, [1.0], 1).unwrap();
        assert_approx_eq!(y[0], (-1.0 as Real).exp(), 1e-6);
    }

    #[test]
    fn fourth_order_convergence() {
        let exact = (-1.0 as Real).exp();
        let coarse = Rk4::new(4).advance(&Decay, 0.0, 1.0, [1.0], 1).unwrap()[0] - exact;
        let fine = Rk4::new(8).advance(&Decay, 0.0, 1.0, [1.0], 1).unwrap()[0] - exact;
        let ratio = coarse / fine;
        assert!(ratio > 14.0 && ratio < 20.0, "ratio = {}", ratio);
    }

    #[test]
    fn oscillator_period() {
        let mut stepper = Rk4::new(100);
        let mut y = [1.0, 0.0];
        let period = 2.0 * std::f64::consts::PI;
        for k in 0..10 {
            let t0 = period * k as Real / 10.0;
            y = stepper.advance(&Oscillator, t0, t0 + period / 10.0, y, k + 1).unwrap();
        }
        assert_approx_eq!(y[0], 1.0, 1e-8);
        assert_approx_eq!(y[1], 0.0, 1e-8);
    }
}
