//! Phases: a composition at a temperature and pressure under one equation of state.

use crate::builtin::GAS;
use crate::composition::Composition;
use crate::error::{ThermoError, ThermoResult};
use crate::model::validation::{validate_molar_volume, validate_pressure, validate_temperature};
use crate::model::{MolarVolume, PropertyModel};
use ceq_core::units::constants::{P_REF_PA, R};
use ceq_core::units::{Pressure, Temperature, Volume, m3};

/// Equation-of-state variants.
///
/// Both variants use ideal mixing. They differ in the pressure dependence of the
/// entropy and chemical potential, and in how volume is obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EquationOfState {
    /// Ideal gas: `RT ln(P/P_ref)` enters μ and `-R N ln(P/P_ref)` enters S.
    IdealGas,
    /// Condensed phase with a fixed, composition-independent molar volume [m³/mol].
    Incompressible { molar_volume: MolarVolume },
}

impl EquationOfState {
    pub fn name(&self) -> &'static str {
        match self {
            EquationOfState::IdealGas => "ideal-gas",
            EquationOfState::Incompressible { .. } => "incompressible",
        }
    }

    /// `ln(P/P_ref)` for the ideal gas, 0 for condensed phases.
    pub fn pressure_log_term(&self, p_pa: f64) -> f64 {
        match self {
            EquationOfState::IdealGas => (p_pa / P_REF_PA).ln(),
            EquationOfState::Incompressible { .. } => 0.0,
        }
    }
}

/// A mixture in one phase.
///
/// Phases are values: property methods never modify them, and the solver returns
/// new phases built with [`Phase::with_state`].
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    id: String,
    tag: String,
    eos: EquationOfState,
    composition: Composition,
    t: Temperature,
    p: Pressure,
}

impl Phase {
    /// Ideal-gas phase with id and data tag "Gas".
    pub fn ideal_gas(composition: Composition, t: Temperature, p: Pressure) -> ThermoResult<Self> {
        validate_temperature(t.value)?;
        validate_pressure(p.value)?;
        Ok(Self {
            id: GAS.to_string(),
            tag: GAS.to_string(),
            eos: EquationOfState::IdealGas,
            composition,
            t,
            p,
        })
    }

    /// Incompressible phase. The phase id doubles as the data tag, so a phase
    /// id of "Liquid" reads the liquid correlations.
    pub fn incompressible(
        composition: Composition,
        t: Temperature,
        p: Pressure,
        phase_id: impl Into<String>,
        molar_volume: MolarVolume,
    ) -> ThermoResult<Self> {
        validate_temperature(t.value)?;
        validate_pressure(p.value)?;
        validate_molar_volume(molar_volume)?;
        let id = phase_id.into();
        if id.is_empty() {
            return Err(ThermoError::InvalidArg {
                what: "phase id must not be empty",
            });
        }
        Ok(Self {
            tag: id.clone(),
            id,
            eos: EquationOfState::Incompressible { molar_volume },
            composition,
            t,
            p,
        })
    }

    /// Use a different data tag than the default.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Relabel the phase (e.g. two liquids sharing one data tag).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// New phase with the same id, tag, equation of state and pressure.
    pub fn with_state(&self, composition: Composition, t: Temperature) -> ThermoResult<Phase> {
        validate_temperature(t.value)?;
        Ok(Phase {
            id: self.id.clone(),
            tag: self.tag.clone(),
            eos: self.eos,
            composition,
            t,
            p: self.p,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Phase tag used for property lookups.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn eos(&self) -> EquationOfState {
        self.eos
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn temperature(&self) -> Temperature {
        self.t
    }

    pub fn pressure(&self) -> Pressure {
        self.p
    }

    /// Temperature [K].
    pub fn t_k(&self) -> f64 {
        self.t.value
    }

    /// Pressure [Pa].
    pub fn p_pa(&self) -> f64 {
        self.p.value
    }

    pub fn molar_volume(&self) -> Option<MolarVolume> {
        match self.eos {
            EquationOfState::IdealGas => None,
            EquationOfState::Incompressible { molar_volume } => Some(molar_volume),
        }
    }

    /// Bulk enthalpy [J].
    pub fn enthalpy(&self, model: &dyn PropertyModel) -> ThermoResult<f64> {
        let t = self.t_k();
        self.composition.iter().try_fold(0.0, |acc, (s, n)| {
            Ok(acc + n * model.enthalpy(s, &self.tag, t)?)
        })
    }

    /// Bulk heat capacity at constant pressure [J/K].
    pub fn heat_capacity(&self, model: &dyn PropertyModel) -> ThermoResult<f64> {
        let t = self.t_k();
        self.composition.iter().try_fold(0.0, |acc, (s, n)| {
            Ok(acc + n * model.heat_capacity(s, &self.tag, t)?)
        })
    }

    /// Bulk entropy [J/K], including ideal mixing and, for gases, the pressure term.
    ///
    /// Species with zero moles contribute nothing (the `n ln x` limit).
    pub fn entropy(&self, model: &dyn PropertyModel) -> ThermoResult<f64> {
        let t = self.t_k();
        let total = self.composition.total_moles();
        let mut s = 0.0;
        for (species, n) in self.composition.iter() {
            s += n * model.entropy(species, &self.tag, t)?;
            if n > 0.0 {
                s -= R * n * (n / total).ln();
            }
        }
        s -= R * total * self.eos.pressure_log_term(self.p_pa());
        Ok(s)
    }

    /// Gibbs energy `H - T S` [J]; equals `Σ n μ` over species present.
    pub fn gibbs_energy(&self, model: &dyn PropertyModel) -> ThermoResult<f64> {
        Ok(self.enthalpy(model)? - self.t_k() * self.entropy(model)?)
    }

    /// Chemical potential [J/mol].
    ///
    /// `μ = h - T s + RT ln x`, plus `RT ln(P/P_ref)` for an ideal gas. A species
    /// with zero mole fraction has no finite potential and yields
    /// [`ThermoError::NumericDomain`].
    pub fn chemical_potential(&self, model: &dyn PropertyModel, species: &str) -> ThermoResult<f64> {
        let x = self.composition.mole_fraction(species);
        if x <= 0.0 {
            return Err(ThermoError::NumericDomain {
                what: format!("ln of zero mole fraction of {species} in phase {}", self.id),
            });
        }
        let t = self.t_k();
        let props = model.standard_properties(species, &self.tag, t)?;
        Ok(props.gibbs(t) + R * t * (x.ln() + self.eos.pressure_log_term(self.p_pa())))
    }

    /// Phase volume: `Σ n v` when incompressible, `N R T / P` for an ideal gas.
    pub fn volume(&self) -> Volume {
        let total = self.composition.total_moles();
        match self.eos {
            EquationOfState::IdealGas => m3(total * R * self.t_k() / self.p_pa()),
            EquationOfState::Incompressible { molar_volume } => m3(total * molar_volume),
        }
    }
}
