//! Fixed-step fourth-order Runge-Kutta integration.
//!
//! The integrator is generic over the state dimension and over a
//! [`DerivativeEvaluator`], the capability trait implemented by the ecosystem
//! model. The driver evaluates the derivative once per step, refreshes the
//! per-step environment (forcing, light, carbonate chemistry), and then asks
//! [`rk4_step`] to advance the state; the three internal stage evaluations
//! reuse the same evaluator and therefore the same environment snapshot.

use crate::errors::{BloomError, BloomResult};
use crate::timeseries::{FloatValue, Time};
use nalgebra::SVector;

/// Right-hand side of a system of `N` coupled ODEs.
///
/// Implementors hold whatever frozen per-step context the derivative needs
/// (parameters, forcing snapshot, precomputed light and carbonate terms).
pub trait DerivativeEvaluator<const N: usize> {
    fn dy_dt(&self, t: Time, y: &SVector<FloatValue, N>, dy_dt: &mut SVector<FloatValue, N>);
}

/// Advance `y` by one classic fourth-order Runge-Kutta step of size `h`.
///
/// `dy_at_y` is the derivative already evaluated at `(t, y)`; supplying it
/// lets the caller share that evaluation with diagnostics. Weights are the
/// usual 1:2:2:1 scaled by `h/6`.
///
/// Fails with [`BloomError::StepSizeUnderflow`] when `t + h` is not
/// representable as a value distinct from `t`: the integration cannot make
/// progress and the run must abort. This is a configuration error, not a
/// transient fault.
pub fn rk4_step<const N: usize>(
    evaluator: &impl DerivativeEvaluator<N>,
    y: &SVector<FloatValue, N>,
    dy_at_y: &SVector<FloatValue, N>,
    t: Time,
    h: FloatValue,
) -> BloomResult<SVector<FloatValue, N>> {
    if t + h == t {
        return Err(BloomError::StepSizeUnderflow { t, step: h });
    }

    let hh = h * 0.5;
    let h6 = h / 6.0;
    let th = t + hh;

    // Midpoint, using the supplied slope
    let yt = y + dy_at_y * hh;
    let mut dyt = SVector::zeros();
    evaluator.dy_dt(th, &yt, &mut dyt);

    // Midpoint again, using the first midpoint slope
    let yt = y + dyt * hh;
    let mut dym = SVector::zeros();
    evaluator.dy_dt(th, &yt, &mut dym);

    // Full step using the second midpoint slope
    let yt = y + dym * h;
    let dym = dym + dyt;
    let mut dyt = SVector::zeros();
    evaluator.dy_dt(t + h, &yt, &mut dyt);

    Ok(y + (dy_at_y + dyt + dym * 2.0) * h6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector1;

    /// dy/dt = -k * y, solution y(t) = y0 * exp(-k t)
    struct LinearDecay {
        k: FloatValue,
    }

    impl DerivativeEvaluator<1> for LinearDecay {
        fn dy_dt(&self, _t: Time, y: &Vector1<FloatValue>, dy_dt: &mut Vector1<FloatValue>) {
            dy_dt[0] = -self.k * y[0];
        }
    }

    fn single_step_error(h: FloatValue) -> FloatValue {
        let decay = LinearDecay { k: 1.0 };
        let y = Vector1::new(1.0);
        let mut dy = Vector1::zeros();
        decay.dy_dt(0.0, &y, &mut dy);
        let next = rk4_step(&decay, &y, &dy, 0.0, h).unwrap();
        (next[0] - (-h).exp()).abs()
    }

    #[test]
    fn matches_exponential_decay_within_fourth_order() {
        // Local truncation error of classic RK4 is O(h^5); a constant of
        // 0.01 on h^4 leaves generous headroom at every step size.
        for h in [1.0, 0.1, 0.01] {
            let err = single_step_error(h);
            assert!(
                err < 0.01 * h.powi(4),
                "one RK4 step at h={} off by {:e}",
                h,
                err
            );
        }
    }

    #[test]
    fn error_shrinks_as_fifth_power_of_step() {
        let ratio = single_step_error(0.2) / single_step_error(0.1);
        // Successive halving should shrink the local error by ~2^5 = 32
        assert!(
            ratio > 16.0 && ratio < 64.0,
            "expected ~32x error reduction, got {}",
            ratio
        );
    }

    #[test]
    fn multi_step_integration_tracks_analytic_solution() {
        let decay = LinearDecay { k: 0.3 };
        let h = 0.1;
        let mut y = Vector1::new(2.0);
        let mut t = 0.0;
        for _ in 0..100 {
            let mut dy = Vector1::zeros();
            decay.dy_dt(t, &y, &mut dy);
            y = rk4_step(&decay, &y, &dy, t, h).unwrap();
            t += h;
        }
        let expected = 2.0 * (-0.3 * t).exp();
        assert!((y[0] - expected).abs() < 1e-8);
    }

    #[test]
    fn step_underflow_is_fatal() {
        let decay = LinearDecay { k: 1.0 };
        let y = Vector1::new(1.0);
        let dy = Vector1::zeros();
        let err = rk4_step(&decay, &y, &dy, 1.0e16, 1.0e-4).unwrap_err();
        assert!(matches!(err, BloomError::StepSizeUnderflow { .. }));
    }
}
