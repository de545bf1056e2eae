//! The narrow interface between the equilibrium formulation and the optimizer.
//!
//! A [`NonlinearProgram`] is `min f(x)` subject to `c(x) = 0` and
//! `lower <= x <= upper`. Multipliers follow the convention
//! `L(x, λ) = f(x) - λᵀ c(x)`.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Smooth equality-constrained program with simple bounds.
pub trait NonlinearProgram {
    /// Number of variables.
    fn dimension(&self) -> usize;

    /// Number of equality constraints.
    fn num_constraints(&self) -> usize;

    /// Lower and upper variable bounds (`f64::INFINITY` for none).
    fn bounds(&self) -> (DVector<f64>, DVector<f64>);

    fn objective(&self, x: &DVector<f64>) -> SolverResult<f64>;

    fn gradient(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>>;

    fn constraints(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>>;

    /// Rows are constraints, columns are variables.
    fn constraint_jacobian(&self, x: &DVector<f64>) -> SolverResult<DMatrix<f64>>;

    /// Hessian of the Lagrangian `f - λᵀc`, if available analytically.
    ///
    /// Returning `None` makes the optimizer difference the Lagrangian gradient.
    fn lagrangian_hessian(
        &self,
        _x: &DVector<f64>,
        _lambda: &DVector<f64>,
    ) -> SolverResult<Option<DMatrix<f64>>> {
        Ok(None)
    }

    /// Per-constraint magnitudes used to judge feasibility.
    fn constraint_scales(&self) -> DVector<f64> {
        DVector::from_element(self.num_constraints(), 1.0)
    }

    /// Magnitude used to judge the stationarity residual at `x`.
    fn stationarity_scale(&self, _x: &DVector<f64>) -> f64 {
        1.0
    }
}

/// Outcome of a successful minimization.
#[derive(Clone, Debug)]
pub struct OptimizerResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Equality multipliers (λ in `f - λᵀc`)
    pub multipliers: DVector<f64>,
    /// Objective at the solution
    pub objective: f64,
    /// Scaled max-norm of the constraint residual
    pub constraint_violation: f64,
    /// Scaled stationarity residual
    pub stationarity: f64,
    /// Number of iterations
    pub iterations: usize,
}

/// Anything that can minimize a [`NonlinearProgram`].
pub trait Optimizer: Send + Sync {
    /// Get the optimizer name (for debugging/logging).
    fn name(&self) -> &str;

    /// Minimize from `x0`, which must lie within the bounds.
    fn minimize(
        &self,
        program: &dyn NonlinearProgram,
        x0: DVector<f64>,
    ) -> SolverResult<OptimizerResult>;
}
