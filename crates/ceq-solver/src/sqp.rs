//! Sequential quadratic programming with simple bounds.
//!
//! Each iteration solves the equality-constrained KKT system
//!
//! ```text
//! [ W  Jᵀ ] [ d ]   [ -g ]
//! [ J  0  ] [ y ] = [ -c ]      λ = -y
//! ```
//!
//! with `W` the Lagrangian Hessian, shifted by `δI` until it has positive
//! curvature along `d`. Bounds are enforced by a fraction-to-boundary step
//! limit, and the step length by backtracking on the ℓ1 merit
//! `f + ρ‖c‖₁`.
//!
//! A variable whose step would reach its lower bound almost at once is pinned:
//! its component is fixed to the fraction-to-boundary move and the system is
//! re-solved for the rest, so the multipliers describe the active bound.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::central_difference_jacobian;
use crate::optimizer::{NonlinearProgram, Optimizer, OptimizerResult};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// SQP tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqpConfig {
    /// Iteration budget
    pub max_iterations: usize,
    /// Scaled max-norm tolerance on the constraint residual
    pub feasibility_tol: f64,
    /// Tolerance on dual infeasibility and complementarity
    pub stationarity_tol: f64,
    /// Fraction of the distance to a bound a step may cover
    pub fraction_to_boundary: f64,
    /// Armijo sufficient-decrease constant
    pub armijo: f64,
    /// Line search backtracking factor
    pub backtrack: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Smallest nonzero Hessian shift
    pub min_regularization: f64,
    /// Maximum number of Hessian shifts per iteration
    pub max_regularizations: usize,
    /// Required curvature `dᵀWd >= curvature_tol * dᵀd`
    pub curvature_tol: f64,
    /// Shift of the constraint block when the KKT matrix is singular
    pub dual_regularization: f64,
    /// Relative step for the finite-difference Hessian
    pub fd_epsilon: f64,
    /// Variables that would reach their lower bound within this step length are pinned
    pub pin_step: f64,
    /// Steps below this size relative to `x` are taken without a line search
    pub negligible_step: f64,
}

impl Default for SqpConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            feasibility_tol: 1e-9,
            stationarity_tol: 1e-8,
            fraction_to_boundary: 0.99,
            armijo: 1e-4,
            backtrack: 0.5,
            max_line_search_iters: 40,
            min_regularization: 1e-4,
            max_regularizations: 30,
            curvature_tol: 1e-12,
            dual_regularization: 1e-10,
            fd_epsilon: 1e-6,
            pin_step: 1e-6,
            negligible_step: 1e-8,
        }
    }
}

/// Newton-KKT SQP optimizer.
#[derive(Debug, Clone, Default)]
pub struct SqpOptimizer {
    config: SqpConfig,
}

/// Search direction and new multipliers from one KKT solve.
struct KktStep {
    d: DVector<f64>,
    lambda: DVector<f64>,
    shift: f64,
}

impl SqpOptimizer {
    pub fn new(config: SqpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqpConfig {
        &self.config
    }

    fn lagrangian_hessian(
        &self,
        program: &dyn NonlinearProgram,
        x: &DVector<f64>,
        lambda: &DVector<f64>,
        lower: &DVector<f64>,
    ) -> SolverResult<DMatrix<f64>> {
        if let Some(w) = program.lagrangian_hessian(x, lambda)? {
            return Ok(w);
        }
        let grad_l = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            let g = program.gradient(v)?;
            if lambda.is_empty() {
                return Ok(g);
            }
            Ok(g - program.constraint_jacobian(v)?.transpose() * lambda)
        };
        let w = central_difference_jacobian(x, grad_l, self.config.fd_epsilon, Some(lower))?;
        Ok((&w + w.transpose()) * 0.5)
    }

    fn assemble(w: &DMatrix<f64>, jac: &DMatrix<f64>, shift: f64) -> DMatrix<f64> {
        let n = w.nrows();
        let m = jac.nrows();
        let mut kkt = DMatrix::zeros(n + m, n + m);
        kkt.view_mut((0, 0), (n, n)).copy_from(w);
        for i in 0..n {
            kkt[(i, i)] += shift;
        }
        kkt.view_mut((n, 0), (m, n)).copy_from(jac);
        kkt.view_mut((0, n), (n, m)).copy_from(&jac.transpose());
        kkt
    }

    /// Solve the KKT system, falling back to a shifted constraint block when it
    /// is singular. Fails if even then the step cannot satisfy the linearized
    /// constraints.
    fn solve_kkt(
        &self,
        kkt: DMatrix<f64>,
        rhs: &DVector<f64>,
        jac: &DMatrix<f64>,
        c: &DVector<f64>,
    ) -> SolverResult<DVector<f64>> {
        let n = jac.ncols();
        let m = jac.nrows();
        let bound = 1e12 * rhs.amax().max(1.0);
        let consistent = |sol: &DVector<f64>| {
            if sol.iter().any(|v| !v.is_finite()) || sol.amax() > bound {
                return false;
            }
            if m == 0 {
                return true;
            }
            let d = sol.rows(0, n);
            let lin = c + jac * d;
            lin.amax() <= 1e-6 * c.amax().max(1.0)
        };

        if let Some(sol) = kkt.clone().lu().solve(rhs)
            && consistent(&sol)
        {
            return Ok(sol);
        }

        let mut shifted = kkt;
        for k in 0..m {
            shifted[(n + k, n + k)] = -self.config.dual_regularization;
        }
        match shifted.lu().solve(rhs) {
            Some(sol) if consistent(&sol) => Ok(sol),
            _ => Err(SolverError::InfeasibleConstraint {
                what: "linearized constraints have no solution".to_string(),
            }),
        }
    }

    /// Fix the step of each pinned variable and move its column to the
    /// right-hand side.
    fn pin(
        kkt: &DMatrix<f64>,
        rhs: &DVector<f64>,
        pinned: &[(usize, f64)],
    ) -> (DMatrix<f64>, DVector<f64>) {
        let mut kkt = kkt.clone();
        let mut rhs = rhs.clone();
        for &(i, di) in pinned {
            for j in 0..kkt.nrows() {
                rhs[j] -= kkt[(j, i)] * di;
            }
            kkt.row_mut(i).fill(0.0);
            kkt.column_mut(i).fill(0.0);
            kkt[(i, i)] = 1.0;
            rhs[i] = di;
        }
        (kkt, rhs)
    }

    /// Re-solve with blocking variables pinned until no free variable blocks.
    fn pin_blocking(
        &self,
        kkt: &DMatrix<f64>,
        rhs: &DVector<f64>,
        (jac, c): (&DMatrix<f64>, &DVector<f64>),
        (x, lower): (&DVector<f64>, &DVector<f64>),
        mut sol: DVector<f64>,
    ) -> DVector<f64> {
        let n = x.len();
        let tau = self.config.fraction_to_boundary;
        let mut pinned: Vec<(usize, f64)> = Vec::new();
        for _ in 0..n {
            let blocking: Vec<(usize, f64)> = (0..n)
                .filter(|&i| {
                    sol[i] < 0.0
                        && lower[i].is_finite()
                        && pinned.iter().all(|(j, _)| *j != i)
                        && tau * (x[i] - lower[i]) < self.config.pin_step * -sol[i]
                })
                .map(|i| (i, -tau * (x[i] - lower[i])))
                .collect();
            if blocking.is_empty() {
                break;
            }
            pinned.extend(blocking);
            let (kkt_pinned, rhs_pinned) = Self::pin(kkt, rhs, &pinned);
            match self.solve_kkt(kkt_pinned, &rhs_pinned, jac, c) {
                Ok(pinned_sol) => sol = pinned_sol,
                Err(_) => break,
            }
        }
        sol
    }

    fn kkt_step(
        &self,
        w: &DMatrix<f64>,
        (jac, g, c): (&DMatrix<f64>, &DVector<f64>, &DVector<f64>),
        (x, lower): (&DVector<f64>, &DVector<f64>),
    ) -> SolverResult<KktStep> {
        let n = g.len();
        let m = c.len();
        let mut rhs = DVector::zeros(n + m);
        rhs.rows_mut(0, n).copy_from(&(-g));
        rhs.rows_mut(n, m).copy_from(&(-c));

        let mut shift = 0.0;
        let mut last = None;
        let mut curved = false;
        for _ in 0..self.config.max_regularizations {
            let kkt = Self::assemble(w, jac, shift);
            let sol = self.solve_kkt(kkt.clone(), &rhs, jac, c)?;
            let sol = self.pin_blocking(&kkt, &rhs, (jac, c), (x, lower), sol);
            let d: DVector<f64> = sol.rows(0, n).into_owned();
            let lambda: DVector<f64> = -sol.rows(n, m).into_owned();

            let curvature = d.dot(&(w * &d)) + shift * d.norm_squared();
            curved = curvature >= self.config.curvature_tol * d.norm_squared();
            last = Some(KktStep { d, lambda, shift });
            if curved {
                break;
            }
            shift = (shift * 10.0).max(self.config.min_regularization);
        }

        let step = last.ok_or_else(|| SolverError::ProblemSetup {
            what: "max_regularizations must be at least 1".to_string(),
        })?;
        if !curved {
            warn!(shift = step.shift, "Hessian regularization limit reached");
        }
        Ok(step)
    }

    /// Scaled feasibility and stationarity measures, with `r` the gradient of
    /// the Lagrangian.
    fn residuals(
        program: &dyn NonlinearProgram,
        x: &DVector<f64>,
        (lower, upper): (&DVector<f64>, &DVector<f64>),
        c: &DVector<f64>,
        r: &DVector<f64>,
    ) -> (f64, f64) {
        let scales = program.constraint_scales();
        let feasibility = c
            .iter()
            .zip(scales.iter())
            .map(|(ci, si)| ci.abs() / si)
            .fold(0.0, f64::max);

        let scale = program.stationarity_scale(x);
        let mut stationarity: f64 = 0.0;
        for i in 0..x.len() {
            let bounded_below = lower[i].is_finite() && upper[i] == f64::INFINITY;
            if bounded_below {
                // dual infeasibility and complementarity
                stationarity = stationarity
                    .max((-r[i]).max(0.0))
                    .max((x[i] - lower[i]) * r[i].max(0.0) / scale);
            } else {
                stationarity = stationarity.max(r[i].abs() / scale);
            }
        }
        (feasibility, stationarity)
    }

    /// Largest step in `(0, 1]` keeping a fraction of the distance to each bound.
    fn max_step(
        &self,
        x: &DVector<f64>,
        d: &DVector<f64>,
        lower: &DVector<f64>,
        upper: &DVector<f64>,
    ) -> f64 {
        let tau = self.config.fraction_to_boundary;
        let mut alpha: f64 = 1.0;
        for i in 0..x.len() {
            if d[i] < 0.0 && lower[i].is_finite() {
                alpha = alpha.min(-tau * (x[i] - lower[i]) / d[i]);
            }
            if d[i] > 0.0 && upper[i].is_finite() {
                alpha = alpha.min(tau * (upper[i] - x[i]) / d[i]);
            }
        }
        alpha
    }

    fn merit(
        program: &dyn NonlinearProgram,
        x: &DVector<f64>,
        rho: f64,
    ) -> SolverResult<f64> {
        Ok(program.objective(x)? + rho * program.constraints(x)?.lp_norm(1))
    }
}

impl Optimizer for SqpOptimizer {
    fn name(&self) -> &str {
        "sqp"
    }

    fn minimize(
        &self,
        program: &dyn NonlinearProgram,
        x0: DVector<f64>,
    ) -> SolverResult<OptimizerResult> {
        let n = program.dimension();
        let m = program.num_constraints();
        if x0.len() != n {
            return Err(SolverError::ProblemSetup {
                what: format!("start point has {} entries, expected {n}", x0.len()),
            });
        }
        let (lower, upper) = program.bounds();

        let mut x = x0;
        let mut lambda = DVector::zeros(m);
        let mut rho: f64 = 1.0;
        let mut last = (f64::INFINITY, f64::INFINITY);

        for iter in 0..self.config.max_iterations {
            let f = program.objective(&x)?;
            let g = program.gradient(&x)?;
            let c = program.constraints(&x)?;
            let jac = program.constraint_jacobian(&x)?;
            let w = self.lagrangian_hessian(program, &x, &lambda, &lower)?;

            let step = self.kkt_step(&w, (&jac, &g, &c), (&x, &lower))?;
            let r = if m == 0 {
                g.clone()
            } else {
                &g - jac.transpose() * &step.lambda
            };
            let (feasibility, stationarity) =
                Self::residuals(program, &x, (&lower, &upper), &c, &r);
            last = (feasibility, stationarity);
            debug!(
                iteration = iter,
                objective = f,
                feasibility,
                stationarity,
                shift = step.shift,
                "sqp iteration"
            );

            if feasibility <= self.config.feasibility_tol
                && stationarity <= self.config.stationarity_tol
            {
                return Ok(OptimizerResult {
                    x,
                    multipliers: step.lambda,
                    objective: f,
                    constraint_violation: feasibility,
                    stationarity,
                    iterations: iter,
                });
            }

            let alpha_max = self.max_step(&x, &step.d, &lower, &upper);
            if m > 0 {
                rho = rho.max(1.1 * step.lambda.amax() + 1e-3);
            }
            let c_norm = c.lp_norm(1);
            let phi0 = f + rho * c_norm;
            let slope = g.dot(&step.d) - rho * c_norm;

            let mut alpha = alpha_max;
            let mut x_trial = &x + alpha * &step.d;
            let negligible =
                alpha_max * step.d.amax() <= self.config.negligible_step * x.amax().max(1.0);
            let searches = if negligible {
                0
            } else {
                self.config.max_line_search_iters
            };
            for _ in 0..searches {
                if Self::merit(program, &x_trial, rho)? <= phi0 + self.config.armijo * alpha * slope {
                    break;
                }
                alpha *= self.config.backtrack;
                x_trial = &x + alpha * &step.d;
            }

            x = x_trial;
            lambda = step.lambda;
        }

        Err(SolverError::ConvergenceFailed {
            iterations: self.config.max_iterations,
            what: format!(
                "constraint violation {:.3e}, stationarity {:.3e}",
                last.0, last.1
            ),
        })
    }
}
