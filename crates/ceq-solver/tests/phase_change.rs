use ceq_core::units::constants::R;
use ceq_core::units::{k, pa};
use ceq_solver::{EquilibriumOptions, solve, solve_detailed};
use ceq_thermo::{Composition, LIQUID, Phase, SpeciesRegistry};

const WATER_MOLAR_VOLUME: f64 = 0.018 / 998.0;

fn liquid_water(t: f64) -> Phase {
    Phase::incompressible(
        Composition::pure("H2O", 1.0).unwrap(),
        k(t),
        pa(1.0e5),
        LIQUID,
        WATER_MOLAR_VOLUME,
    )
    .unwrap()
}

#[test]
fn superheated_liquid_flashes_at_constant_enthalpy() {
    let reg = SpeciesRegistry::builtin().unwrap();
    let vapour = Phase::ideal_gas(
        Composition::pure("H2O", 0.0).unwrap(),
        k(300.0),
        pa(1.0e5),
    )
    .unwrap();
    let input = vec![liquid_water(373.15), vapour];
    let options = EquilibriumOptions::new().const_h(true);
    let solution = solve_detailed(&reg, &input, &options).unwrap();
    let out = &solution.phases;

    let n_vap = out[1].composition().get("H2O");
    let n_liq = out[0].composition().get("H2O");
    assert!(n_vap > 0.0);
    assert!(n_vap < 0.01, "flashed {n_vap} mol");
    assert!((n_liq + n_vap - 1.0).abs() < 1e-9);

    // Both phases settle at the saturation temperature of the data.
    let t = solution.temperature.unwrap();
    assert!(t < 373.15 && t > 372.0, "T = {t}");
    assert_eq!(out[0].t_k(), t);
    assert_eq!(out[1].t_k(), t);
    assert_eq!(out[0].id(), LIQUID);
    assert_eq!(out[0].molar_volume(), Some(WATER_MOLAR_VOLUME));

    let h0: f64 = input.iter().map(|p| p.enthalpy(&reg).unwrap()).sum();
    let h1: f64 = out.iter().map(|p| p.enthalpy(&reg).unwrap()).sum();
    assert!((h1 - h0).abs() < 1e-6 * h0.abs());

    let mu_liq = out[0].chemical_potential(&reg, "H2O").unwrap();
    let mu_vap = out[1].chemical_potential(&reg, "H2O").unwrap();
    assert!((mu_liq - mu_vap).abs() < 1e-4 * R * t);
}

#[test]
fn isothermal_evaporation_into_nitrogen() {
    let reg = SpeciesRegistry::builtin().unwrap();
    let gas = Phase::ideal_gas(
        Composition::from_pairs([("H2O", 0.0), ("N2", 1.0)]).unwrap(),
        k(350.0),
        pa(1.0e5),
    )
    .unwrap();
    let input = vec![liquid_water(350.0), gas];
    let out = solve(&reg, &input, &EquilibriumOptions::new()).unwrap();

    // Partial pressure of water approaches its vapour pressure (about 0.42 bar).
    let n_vap = out[1].composition().get("H2O");
    assert!(n_vap > 0.6 && n_vap < 0.8, "vapour {n_vap} mol");
    assert!((out[1].composition().get("N2") - 1.0).abs() < 1e-9);
    assert!((out[0].composition().get("H2O") + n_vap - 1.0).abs() < 1e-9);
    assert_eq!(out[1].t_k(), 350.0);

    let mu_liq = out[0].chemical_potential(&reg, "H2O").unwrap();
    let mu_vap = out[1].chemical_potential(&reg, "H2O").unwrap();
    assert!((mu_liq - mu_vap).abs() < 1e-4 * R * 350.0);
}

#[test]
fn subcooled_liquid_stays_liquid() {
    let reg = SpeciesRegistry::builtin().unwrap();
    let vapour = Phase::ideal_gas(
        Composition::pure("H2O", 0.0).unwrap(),
        k(300.0),
        pa(1.0e5),
    )
    .unwrap();
    let out = solve(
        &reg,
        &[liquid_water(330.0), vapour],
        &EquilibriumOptions::new().const_h(true),
    )
    .unwrap();

    // Pure vapour at 1 bar is unstable below saturation; only a trace survives.
    assert!(out[1].composition().get("H2O") < 1e-6);
    assert!((out[0].t_k() - 330.0).abs() < 0.01);
}
