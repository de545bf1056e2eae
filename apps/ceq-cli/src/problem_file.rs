//! Equilibrium problem files and solve reports.
//!
//! ```yaml
//! options:
//!   const_h: true
//!   elemental: true
//! phases:
//!   - eos: { type: ideal_gas }
//!     temperature_k: 298.15
//!     pressure_pa: 1.0e5
//!     composition: { CH4: 1.0, O2: 2.0, N2: 7.52 }
//!     declare: [CO2, H2O, CO, OH, O, H, NO]
//!   - id: Liquid
//!     eos: { type: incompressible, molar_volume: 1.8e-5 }
//!     temperature_k: 298.15
//!     pressure_pa: 1.0e5
//!     composition: { H2O: 0.0 }
//! ```

use crate::error::{CliError, CliResult};
use ceq_core::units::{k, pa};
use ceq_solver::{EquilibriumOptions, EquilibriumSolution};
use ceq_thermo::{Composition, Phase, PropertyModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EosSpec {
    IdealGas,
    Incompressible { molar_volume: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Defaults to "Gas" for ideal gases; required for incompressible phases
    #[serde(default)]
    pub id: Option<String>,
    /// Species data tag, when it differs from the id
    #[serde(default)]
    pub tag: Option<String>,
    pub eos: EosSpec,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    #[serde(default)]
    pub composition: BTreeMap<String, f64>,
    /// Species added with zero amount
    #[serde(default)]
    pub declare: Vec<String>,
}

impl PhaseSpec {
    pub fn to_phase(&self) -> CliResult<Phase> {
        let composition = Composition::from_pairs(
            self.composition.iter().map(|(s, n)| (s.as_str(), *n)),
        )?
        .with_declared(self.declare.iter().map(String::as_str));
        let t = k(self.temperature_k);
        let p = pa(self.pressure_pa);

        let mut phase = match self.eos {
            EosSpec::IdealGas => {
                let gas = Phase::ideal_gas(composition, t, p)?;
                match &self.id {
                    Some(id) => gas.with_id(id.clone()),
                    None => gas,
                }
            }
            EosSpec::Incompressible { molar_volume } => {
                let id = self.id.clone().ok_or_else(|| CliError::Input {
                    what: "incompressible phases need an id".to_string(),
                })?;
                Phase::incompressible(composition, t, p, id, molar_volume)?
            }
        };
        if let Some(tag) = &self.tag {
            phase = phase.with_tag(tag.clone());
        }
        Ok(phase)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemFile {
    /// Extra species data merged over the built-in set, relative to the file
    #[serde(default)]
    pub species_file: Option<PathBuf>,
    #[serde(default)]
    pub options: EquilibriumOptions,
    pub phases: Vec<PhaseSpec>,
}

impl ProblemFile {
    /// Load a `.json` file as JSON, anything else as YAML.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut file: ProblemFile = if is_json {
            serde_json::from_str(&text)?
        } else {
            serde_yaml::from_str(&text)?
        };
        if let (Some(species), Some(dir)) = (&file.species_file, path.parent()) {
            file.species_file = Some(dir.join(species));
        }
        Ok(file)
    }

    pub fn phases(&self) -> CliResult<Vec<Phase>> {
        self.phases.iter().map(PhaseSpec::to_phase).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub id: String,
    pub tag: String,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub total_moles: f64,
    pub mass_kg: f64,
    pub moles: BTreeMap<String, f64>,
    pub mole_fractions: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub mode: String,
    pub iterations: usize,
    pub temperature_k: Option<f64>,
    pub constraint_violation: f64,
    pub stationarity: f64,
    pub phases: Vec<PhaseReport>,
}

impl SolveReport {
    pub fn new(
        model: &dyn PropertyModel,
        options: &EquilibriumOptions,
        solution: &EquilibriumSolution,
    ) -> CliResult<Self> {
        let phases = solution
            .phases
            .iter()
            .map(|phase| {
                let comp = phase.composition();
                Ok(PhaseReport {
                    id: phase.id().to_string(),
                    tag: phase.tag().to_string(),
                    temperature_k: phase.t_k(),
                    pressure_pa: phase.p_pa(),
                    total_moles: comp.total_moles(),
                    mass_kg: comp.total_mass(model)?.value,
                    moles: comp.iter().map(|(s, n)| (s.to_string(), n)).collect(),
                    mole_fractions: comp
                        .species()
                        .map(|s| (s.to_string(), comp.mole_fraction(s)))
                        .collect(),
                })
            })
            .collect::<CliResult<Vec<_>>>()?;
        Ok(Self {
            mode: options.mode(),
            iterations: solution.iterations,
            temperature_k: solution.temperature,
            constraint_violation: solution.constraint_violation,
            stationarity: solution.stationarity,
            phases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLASH: &str = r#"
options:
  const_h: true
phases:
  - id: Liquid
    eos: { type: incompressible, molar_volume: 1.8036e-5 }
    temperature_k: 373.15
    pressure_pa: 1.0e5
    composition: { H2O: 1.0 }
  - eos: { type: ideal_gas }
    temperature_k: 300.0
    pressure_pa: 1.0e5
    declare: [H2O]
"#;

    #[test]
    fn parses_yaml_problem() {
        let file: ProblemFile = serde_yaml::from_str(FLASH).unwrap();
        assert!(file.options.const_h);
        assert!(!file.options.elemental);
        let phases = file.phases().unwrap();
        assert_eq!(phases[0].tag(), "Liquid");
        assert!(phases[0].molar_volume().is_some());
        assert_eq!(phases[1].id(), "Gas");
        assert!(phases[1].composition().contains("H2O"));
    }

    #[test]
    fn incompressible_phase_needs_an_id() {
        let spec = PhaseSpec {
            id: None,
            tag: None,
            eos: EosSpec::Incompressible { molar_volume: 1e-5 },
            temperature_k: 300.0,
            pressure_pa: 1e5,
            composition: BTreeMap::new(),
            declare: vec![],
        };
        assert!(matches!(spec.to_phase(), Err(CliError::Input { .. })));
    }

    #[test]
    fn parses_json_problem() {
        let json = r#"{"phases":[{"eos":{"type":"ideal_gas"},"temperature_k":500.0,
            "pressure_pa":2.0e5,"composition":{"N2":1.0}}]}"#;
        let file: ProblemFile = serde_json::from_str(json).unwrap();
        let phases = file.phases().unwrap();
        assert_eq!(phases[0].p_pa(), 2.0e5);
        assert_eq!(file.options, EquilibriumOptions::default());
    }
}
