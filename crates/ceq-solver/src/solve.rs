//! High-level solver interface.

use crate::error::SolverResult;
use crate::optimizer::{NonlinearProgram, Optimizer};
use crate::options::EquilibriumOptions;
use crate::problem::EquilibriumProblem;
use crate::sqp::SqpOptimizer;
use ceq_thermo::{Phase, PropertyModel};
use rayon::prelude::*;
use tracing::info;

/// Converged equilibrium with convergence diagnostics.
#[derive(Debug, Clone)]
pub struct EquilibriumSolution {
    /// Output phases, in input order, with every input species present
    pub phases: Vec<Phase>,
    /// Shared temperature [K] when solved at constant enthalpy
    pub temperature: Option<f64>,
    pub iterations: usize,
    /// Final objective (`-S/R` or `G/RT`)
    pub objective: f64,
    /// Largest scaled constraint residual
    pub constraint_violation: f64,
    pub stationarity: f64,
}

/// Solve for the equilibrium of `phases` and return the resulting phases.
///
/// Inputs are never modified. Species with zero amount may become nonzero;
/// species absent from the input never appear.
///
/// In elemental mode every declared species must be buildable from the elements
/// of the input: a zero-valued product that carries an element no input species
/// has is reported as [`SolverError::InfeasibleConstraint`], even though holding
/// it at zero would balance. Declare products with
/// `SpeciesRegistry::candidate_species` over the input elements to stay clear of
/// this.
///
/// [`SolverError::InfeasibleConstraint`]: crate::SolverError::InfeasibleConstraint
pub fn solve(
    model: &dyn PropertyModel,
    phases: &[Phase],
    options: &EquilibriumOptions,
) -> SolverResult<Vec<Phase>> {
    Ok(solve_detailed(model, phases, options)?.phases)
}

/// Like [`solve`], keeping the convergence information.
pub fn solve_detailed(
    model: &dyn PropertyModel,
    phases: &[Phase],
    options: &EquilibriumOptions,
) -> SolverResult<EquilibriumSolution> {
    let optimizer = SqpOptimizer::new(options.sqp.clone());
    solve_with_optimizer(model, phases, options, &optimizer)
}

/// Solve with a caller-supplied optimizer.
pub fn solve_with_optimizer(
    model: &dyn PropertyModel,
    phases: &[Phase],
    options: &EquilibriumOptions,
    optimizer: &dyn Optimizer,
) -> SolverResult<EquilibriumSolution> {
    let problem = EquilibriumProblem::new(model, phases, options)?;
    let result = optimizer.minimize(&problem, problem.initial_point())?;
    let phases = problem.phases_at(&result.x)?;
    let temperature = problem.temperature(&result.x);

    info!(
        mode = %options.mode(),
        optimizer = optimizer.name(),
        iterations = result.iterations,
        variables = problem.dimension(),
        temperature = ?temperature,
        "equilibrium converged"
    );

    Ok(EquilibriumSolution {
        phases,
        temperature,
        iterations: result.iterations,
        objective: result.objective,
        constraint_violation: result.constraint_violation,
        stationarity: result.stationarity,
    })
}

/// Solve independent problems in parallel; results keep the input order.
pub fn solve_batch(
    model: &dyn PropertyModel,
    problems: &[Vec<Phase>],
    options: &EquilibriumOptions,
) -> Vec<SolverResult<Vec<Phase>>> {
    problems
        .par_iter()
        .map(|phases| solve(model, phases, options))
        .collect()
}
