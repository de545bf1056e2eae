//! Finite difference Jacobians.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Compute a Jacobian using central finite differences.
///
/// The step is `epsilon * max(|x_j|, 1)`, cut to half the distance to `lower[j]`
/// when a lower bound is given and closer than that.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
    lower: Option<&DVector<f64>>,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac: Option<DMatrix<f64>> = None;

    for j in 0..n {
        let mut dx = epsilon * x[j].abs().max(1.0);
        if let Some(lb) = lower {
            let room = x[j] - lb[j];
            if room > 0.0 && room < dx {
                dx = 0.5 * room;
            }
        }

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        let df = (f_plus - f_minus) / (2.0 * dx);
        let jac = jac.get_or_insert_with(|| DMatrix::zeros(df.len(), n));
        jac.set_column(j, &df);
    }

    match jac {
        Some(jac) => Ok(jac),
        None => Ok(DMatrix::zeros(f(x)?.len(), 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_quadratic() {
        // f(x) = x^2, J = 2*x
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let jac = central_difference_jacobian(&x, f, 1e-6, None).unwrap();

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-8);
    }

    #[test]
    fn central_step_respects_lower_bound() {
        // ln is undefined below zero; the step must not cross it
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, (x[0] + 1e-12).ln()))
        };
        let x = DVector::from_element(1, 1e-4);
        let lb = DVector::zeros(1);
        let jac = central_difference_jacobian(&x, f, 1e-3, Some(&lb)).unwrap();
        assert!(jac[(0, 0)].is_finite());
        assert!(jac[(0, 0)] > 5e3);
    }
}
