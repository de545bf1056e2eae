//! Multi-phase chemical equilibrium solver.
//!
//! Phases from `ceq-thermo` are combined into one constrained optimization over
//! the moles of every (phase, species) pair. At constant pressure the solver
//! either maximizes total entropy at fixed total enthalpy (adiabatic) or
//! minimizes the Gibbs energy at fixed temperatures. Conservation is by element
//! (reaction allowed) or by species (phase change only).
//!
//! ```no_run
//! use ceq_core::units::{k, pa};
//! use ceq_solver::{EquilibriumOptions, solve};
//! use ceq_thermo::{Composition, Phase, SpeciesRegistry};
//!
//! let reg = SpeciesRegistry::builtin()?;
//! let feed = Composition::from_pairs([("H2", 2.0), ("O2", 1.0)])?
//!     .with_declared(["H2O", "OH", "H", "O"]);
//! let gas = Phase::ideal_gas(feed, k(298.15), pa(1.0e5))?;
//! let out = solve(&reg, &[gas], &EquilibriumOptions::adiabatic_reacting())?;
//! println!("T = {} K", out[0].t_k());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod optimizer;
pub mod options;
pub mod problem;
pub mod solve;
pub mod sqp;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult};
pub use optimizer::{NonlinearProgram, Optimizer, OptimizerResult};
pub use options::EquilibriumOptions;
pub use problem::{EquilibriumProblem, VariableKey};
pub use solve::{EquilibriumSolution, solve, solve_batch, solve_detailed, solve_with_optimizer};
pub use sqp::{SqpConfig, SqpOptimizer};
