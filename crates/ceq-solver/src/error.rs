//! Error types for equilibrium solves.

use ceq_thermo::ThermoError;
use thiserror::Error;

/// Errors that can occur while setting up or solving an equilibrium problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Species, phase tag or temperature not covered by the property data.
    #[error("Data lookup failed: {what}")]
    DataLookup { what: String },

    /// No non-negative state satisfies the conservation constraints.
    #[error("Infeasible constraints: {what}")]
    InfeasibleConstraint { what: String },

    /// Iteration budget exhausted before the tolerances were met.
    #[error("Convergence failed after {iterations} iterations: {what}")]
    ConvergenceFailed { iterations: usize, what: String },

    /// A logarithm, division or evaluation left its domain.
    #[error("Numeric domain error: {what}")]
    NumericDomain { what: String },

    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<ThermoError> for SolverError {
    fn from(e: ThermoError) -> Self {
        if e.is_lookup() {
            return SolverError::DataLookup {
                what: e.to_string(),
            };
        }
        match e {
            ThermoError::NumericDomain { what } => SolverError::NumericDomain { what },
            other => SolverError::ProblemSetup {
                what: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thermo_lookups_become_data_lookup() {
        let err: SolverError = ThermoError::OutOfRange {
            species: "CH4".into(),
            tag: "Gas".into(),
            t: 4000.0,
            t_min: 200.0,
            t_max: 3500.0,
        }
        .into();
        assert!(matches!(err, SolverError::DataLookup { .. }));
        assert!(err.to_string().contains("CH4"));
    }

    #[test]
    fn thermo_domain_errors_keep_their_kind() {
        let err: SolverError = ThermoError::NumericDomain {
            what: "ln(0)".into(),
        }
        .into();
        assert_eq!(
            err,
            SolverError::NumericDomain {
                what: "ln(0)".into()
            }
        );
        let setup: SolverError = ThermoError::NonPhysical {
            what: "pressure must be positive and finite",
        }
        .into();
        assert!(matches!(setup, SolverError::ProblemSetup { .. }));
    }
}
