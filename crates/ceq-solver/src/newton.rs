//! Newton solver with box constraints.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Newton solver configuration.
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm
    pub rel_tol: f64,
    /// Smallest allowed value of every unknown
    pub min_value: f64,
    /// Largest allowed value of every unknown
    pub max_value: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-10,
            rel_tol: 1e-12,
            min_value: f64::MIN_POSITIVE,
            max_value: f64::INFINITY,
            line_search_beta: 0.5,
            max_line_search_iters: 30,
        }
    }
}

/// Newton iteration result.
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Newton solver with backtracking that keeps every unknown within
/// `[min_value, max_value]`. The residual is never evaluated outside the box.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let in_box = |v: &DVector<f64>| {
        v.iter()
            .all(|&xi| xi >= config.min_value && xi <= config.max_value)
    };
    if !in_box(&x0) {
        return Err(SolverError::ProblemSetup {
            what: "Newton start point outside the allowed range".to_string(),
        });
    }

    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm;

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: true,
            });
        }

        let jac = jacobian_fn(&x)?;

        // Solve J * dx = -r
        let dx = jac
            .lu()
            .solve(&(-&r))
            .ok_or_else(|| SolverError::NumericDomain {
                what: "Newton Jacobian is singular".to_string(),
            })?;

        // Backtrack until inside the box and the residual decreases
        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..config.max_line_search_iters {
            let x_new = &x + alpha * &dx;
            if in_box(&x_new) {
                let r_new = residual_fn(&x_new)?;
                let r_new_norm = r_new.norm();
                if r_new_norm < r_norm {
                    accepted = Some((x_new, r_new, r_new_norm));
                    break;
                }
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, r_new_norm)) = accepted else {
            return Err(SolverError::ConvergenceFailed {
                iterations: iter,
                what: format!("Newton line search stagnated, residual = {r_norm}"),
            });
        };

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    Err(SolverError::ConvergenceFailed {
        iterations: config.max_iterations,
        what: format!("Newton residual = {r_norm}"),
    })
}
