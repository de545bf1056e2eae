//! Acceptance harness run by `ceq selftest`.

use crate::error::CliResult;
use ceq_core::units::{k, pa};
use ceq_solver::{EquilibriumOptions, solve};
use ceq_thermo::{Composition, GAS, LIQUID, Phase, PropertyModel, SpeciesRegistry};
use serde::Serialize;
use tracing::info;

const CORE_SPECIES: [&str; 10] = ["CH4", "O2", "N2", "CO2", "H2O", "CO", "OH", "O", "H", "NO"];

#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub name: &'static str,
    pub ok: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub steps: Vec<Step>,
    pub ok: bool,
}

impl Summary {
    pub fn failed_step(&self) -> Option<&Step> {
        self.steps.iter().find(|s| !s.ok)
    }
}

type Check = fn(&SpeciesRegistry) -> CliResult<(bool, String)>;

/// Run every step in order, stopping at the first failure.
pub fn run(reg: &SpeciesRegistry) -> Summary {
    let checks: [(&'static str, Check); 4] = [
        ("species", core_species),
        ("h2o_properties", water_properties),
        ("combustion", methane_air_flame),
        ("water_flash", water_flash),
    ];

    let mut steps = Vec::new();
    for (name, check) in checks {
        let (ok, details) = match check(reg) {
            Ok(outcome) => outcome,
            Err(e) => (false, e.to_string()),
        };
        info!(step = name, ok, "selftest step");
        steps.push(Step { name, ok, details });
        if !ok {
            break;
        }
    }
    let ok = steps.len() == checks.len() && steps.iter().all(|s| s.ok);
    Summary { steps, ok }
}

fn core_species(reg: &SpeciesRegistry) -> CliResult<(bool, String)> {
    let missing: Vec<&str> = CORE_SPECIES
        .into_iter()
        .filter(|s| !reg.has_phase(s, GAS))
        .chain((!reg.has_phase("H2O", LIQUID)).then_some("H2O(Liquid)"))
        .collect();
    if missing.is_empty() {
        Ok((true, format!("{} species", reg.len())))
    } else {
        Ok((false, format!("missing {}", missing.join(", "))))
    }
}

fn water_properties(reg: &SpeciesRegistry) -> CliResult<(bool, String)> {
    let h298 = reg.enthalpy("H2O", GAS, 298.15)?;
    let h800 = reg.enthalpy("H2O", GAS, 800.0)?;
    let cp500 = reg.heat_capacity("H2O", GAS, 500.0)?;
    Ok((
        h800 > h298 && cp500 > 0.0,
        format!("Hf(298.15)={h298:.1} J/mol, Hf(800)={h800:.1} J/mol, Cp(500)={cp500:.3} J/mol/K"),
    ))
}

fn methane_air_flame(reg: &SpeciesRegistry) -> CliResult<(bool, String)> {
    let req_o2 = 2.0;
    let air = Composition::from_pairs([("O2", 0.21), ("N2", 0.79)])?.scaled(req_o2 / 0.21)?;
    let feed = Composition::pure("CH4", 1.0)?
        .combined(&air)
        .with_declared(["CO2", "H2O", "CO", "OH", "O", "H", "NO"]);
    let gas = Phase::ideal_gas(feed, k(298.15), pa(1.0e5))?;
    let out = solve(reg, &[gas], &EquilibriumOptions::adiabatic_reacting())?;
    let t = out[0].t_k();
    Ok((t > 1000.0 && t < 4000.0, format!("T_ad = {t:.2} K")))
}

fn water_flash(reg: &SpeciesRegistry) -> CliResult<(bool, String)> {
    let liquid = Phase::incompressible(
        Composition::pure("H2O", 1.0)?,
        k(373.15),
        pa(1.0e5),
        LIQUID,
        0.018 / 998.0,
    )?;
    let vapour = Phase::ideal_gas(Composition::pure("H2O", 0.0)?, k(300.0), pa(1.0e5))?;
    let out = solve(
        reg,
        &[liquid, vapour],
        &EquilibriumOptions::new().const_h(true),
    )?;
    let n_vap = out[1].composition().get("H2O");
    Ok((
        n_vap > 0.0,
        format!("vapour = {n_vap:.4e} mol at {:.2} K", out[1].t_k()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_data_passes() {
        let reg = SpeciesRegistry::builtin().unwrap();
        let summary = run(&reg);
        assert!(summary.ok, "{summary:?}");
        assert_eq!(summary.steps.len(), 4);
        assert!(summary.failed_step().is_none());
    }

    #[test]
    fn stops_at_first_failure() {
        let summary = run(&SpeciesRegistry::new());
        assert!(!summary.ok);
        assert_eq!(summary.steps.len(), 1);
        assert_eq!(summary.failed_step().map(|s| s.name), Some("species"));
    }

    #[test]
    fn summary_serializes_to_json() {
        let summary = Summary {
            steps: vec![Step {
                name: "species",
                ok: true,
                details: "12 species".into(),
            }],
            ok: true,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["steps"][0]["name"], "species");
    }
}
