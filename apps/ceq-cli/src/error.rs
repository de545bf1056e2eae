use ceq_solver::SolverError;
use ceq_thermo::ThermoError;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Thermo(#[from] ThermoError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {what}")]
    Input { what: String },

    #[error("Self-test step '{step}' failed")]
    SelftestFailed { step: String },
}
