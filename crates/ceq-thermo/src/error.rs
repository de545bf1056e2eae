//! Thermodynamic data and property errors.

use ceq_core::CoreError;
use thiserror::Error;

/// Result type for property and phase operations.
pub type ThermoResult<T> = Result<T, ThermoError>;

/// Errors raised by the property registry, compositions and phases.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermoError {
    /// Species name not present in the registry.
    #[error("Unknown species: {species}")]
    UnknownSpecies { species: String },

    /// Species is known but carries no data for the requested phase tag.
    #[error("No {tag} data for species {species}")]
    UnknownPhaseTag { species: String, tag: String },

    /// Element symbol not present in the element table.
    #[error("Unknown element: {symbol}")]
    UnknownElement { symbol: String },

    /// Temperature outside every correlation segment.
    #[error("Temperature {t} K outside {species} ({tag}) data range [{t_min}, {t_max}] K")]
    OutOfRange {
        species: String,
        tag: String,
        t: f64,
        t_min: f64,
        t_max: f64,
    },

    /// Malformed correlation or species data.
    #[error("Invalid species data: {what}")]
    InvalidData { what: String },

    /// Non-physical values (negative amounts, temperatures, volumes).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A logarithm or division left its domain.
    #[error("Numeric domain error: {what}")]
    NumericDomain { what: String },

    /// Species data file could not be read.
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// Species data could not be parsed.
    #[error("Failed to parse species data: {message}")]
    Parse { message: String },
}

impl ThermoError {
    /// True for registry lookups that failed: unknown species, element or phase tag,
    /// and temperatures outside the correlation range.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            ThermoError::UnknownSpecies { .. }
                | ThermoError::UnknownPhaseTag { .. }
                | ThermoError::UnknownElement { .. }
                | ThermoError::OutOfRange { .. }
        )
    }
}

impl From<CoreError> for ThermoError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { what, value } => ThermoError::NumericDomain {
                what: format!("{what} is not finite ({value})"),
            },
            CoreError::NotPositive { what, .. } => ThermoError::NonPhysical { what },
            CoreError::InvalidArg { what } => ThermoError::InvalidArg { what },
        }
    }
}

impl From<serde_yaml::Error> for ThermoError {
    fn from(err: serde_yaml::Error) -> Self {
        ThermoError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ThermoError {
    fn from(err: serde_json::Error) -> Self {
        ThermoError::Parse {
            message: err.to_string(),
        }
    }
}
