//! Property model trait and validation helpers.

use crate::error::{ThermoError, ThermoResult};
use std::collections::BTreeMap;

/// Molar enthalpy [J/mol].
pub type MolarEnthalpy = f64;

/// Molar entropy [J/(mol·K)].
pub type MolarEntropy = f64;

/// Molar heat capacity at constant pressure [J/(mol·K)].
pub type MolarHeatCapacity = f64;

/// Molar mass [kg/mol].
pub type MolarMass = f64;

/// Molar volume [m³/mol].
///
/// Not part of the uom set we rely on, so we use f64 with clear documentation.
pub type MolarVolume = f64;

/// Standard-state properties of one species in one phase at one temperature.
///
/// Batches the values the solver needs from a single correlation lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StandardProperties {
    /// Heat capacity [J/(mol·K)]
    pub cp: MolarHeatCapacity,
    /// Temperature slope of the heat capacity [J/(mol·K²)]
    pub dcp_dt: f64,
    /// Enthalpy including formation [J/mol]
    pub h: MolarEnthalpy,
    /// Entropy at the standard pressure [J/(mol·K)]
    pub s: MolarEntropy,
}

impl StandardProperties {
    /// Standard chemical potential `h - T s` [J/mol].
    pub fn gibbs(&self, t: f64) -> f64 {
        self.h - t * self.s
    }
}

/// Per-species, per-phase temperature correlations.
///
/// Every method is a pure function of its arguments. Implementations are
/// immutable after construction and must be `Send + Sync` so one instance can be
/// shared by independent equilibrium solves. Temperatures are in kelvin.
pub trait PropertyModel: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Check whether the species is known at all.
    fn contains(&self, species: &str) -> bool;

    /// Check whether the species has data for a phase tag (e.g. "Gas", "Liquid").
    fn has_phase(&self, species: &str, tag: &str) -> bool;

    /// Element → atom count for a species.
    fn atom_counts(&self, species: &str) -> ThermoResult<&BTreeMap<String, u32>>;

    /// Molar mass [kg/mol].
    fn molar_mass(&self, species: &str) -> ThermoResult<MolarMass>;

    /// Temperature interval covered by the correlation `(t_min, t_max)` [K].
    fn temperature_range(&self, species: &str, tag: &str) -> ThermoResult<(f64, f64)>;

    /// Heat capacity at constant pressure [J/(mol·K)].
    fn heat_capacity(&self, species: &str, tag: &str, t: f64) -> ThermoResult<MolarHeatCapacity>;

    /// dCp/dT [J/(mol·K²)].
    fn heat_capacity_slope(&self, species: &str, tag: &str, t: f64) -> ThermoResult<f64>;

    /// Enthalpy including formation [J/mol].
    fn enthalpy(&self, species: &str, tag: &str, t: f64) -> ThermoResult<MolarEnthalpy>;

    /// Entropy at the standard pressure [J/(mol·K)].
    fn entropy(&self, species: &str, tag: &str, t: f64) -> ThermoResult<MolarEntropy>;

    /// Compute all standard properties in one call.
    ///
    /// Default implementation calls the individual property methods; models
    /// that share a lookup between them should override it.
    fn standard_properties(
        &self,
        species: &str,
        tag: &str,
        t: f64,
    ) -> ThermoResult<StandardProperties> {
        Ok(StandardProperties {
            cp: self.heat_capacity(species, tag, t)?,
            dcp_dt: self.heat_capacity_slope(species, tag, t)?,
            h: self.enthalpy(species, tag, t)?,
            s: self.entropy(species, tag, t)?,
        })
    }
}

/// Validation helpers for phase and composition inputs.
pub(crate) mod validation {
    use super::*;
    use ceq_core::numeric::{ensure_finite, ensure_positive};

    /// Ensure temperature is positive and finite.
    pub fn validate_temperature(t: f64) -> ThermoResult<()> {
        ensure_positive(t, "temperature")?;
        Ok(())
    }

    /// Ensure pressure is positive and finite.
    pub fn validate_pressure(p: f64) -> ThermoResult<()> {
        ensure_positive(p, "pressure")?;
        Ok(())
    }

    pub fn validate_molar_volume(v: f64) -> ThermoResult<()> {
        ensure_positive(v, "molar volume")?;
        Ok(())
    }

    /// Ensure an amount of substance is non-negative and finite.
    pub fn validate_amount(n: f64) -> ThermoResult<()> {
        if ensure_finite(n, "mole amount")? < 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "mole amount must be non-negative",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn validate_positive_pressure() {
        assert!(validate_pressure(101325.0).is_ok());
        assert!(validate_pressure(-100.0).is_err());
        assert!(validate_pressure(0.0).is_err());
        assert!(validate_pressure(f64::NAN).is_err());
    }

    #[test]
    fn validate_positive_temperature() {
        assert!(validate_temperature(300.0).is_ok());
        assert!(validate_temperature(-10.0).is_err());
        assert!(validate_temperature(0.0).is_err());
    }

    #[test]
    fn validate_volume_and_amount() {
        assert!(validate_molar_volume(1.8e-5).is_ok());
        assert!(validate_molar_volume(0.0).is_err());
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(-1e-30).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn gibbs_from_pack() {
        let pack = StandardProperties {
            cp: 29.0,
            dcp_dt: 0.0,
            h: -1000.0,
            s: 200.0,
        };
        assert_eq!(pack.gibbs(300.0), -1000.0 - 300.0 * 200.0);
    }
}
