use ceq_thermo::{GAS, LIQUID, PropertyModel, SpeciesRegistry};
use proptest::prelude::*;

fn correlations(reg: &SpeciesRegistry) -> Vec<(String, String, f64, f64)> {
    let mut out = Vec::new();
    for name in reg.names() {
        let data = reg.get(name).unwrap();
        for tag in data.phase_tags() {
            let (lo, hi) = data.phase(tag).unwrap().range();
            out.push((name.to_string(), tag.to_string(), lo, hi));
        }
    }
    out
}

#[test]
fn every_boundary_is_continuous_in_h_and_s() {
    let reg = SpeciesRegistry::builtin().unwrap();
    for (name, tag, _, _) in correlations(&reg) {
        let nasa = reg.correlation(&name, &tag).unwrap();
        for gap in nasa.boundary_gaps() {
            assert!(
                gap.h_over_rt.abs() < 1e-6 && gap.s_over_r.abs() < 2e-6,
                "{name} ({tag}) discontinuous at {} K: {gap:?}",
                gap.t
            );
        }
    }
}

#[test]
fn water_vapour_properties_for_the_harness() {
    let reg = SpeciesRegistry::builtin().unwrap();
    let h298 = reg.enthalpy("H2O", GAS, 298.15).unwrap();
    let h800 = reg.enthalpy("H2O", GAS, 800.0).unwrap();
    assert!(h800 > h298);
    assert!(reg.heat_capacity("H2O", GAS, 500.0).unwrap() > 0.0);
}

#[test]
fn vaporization_raises_enthalpy_and_entropy() {
    let reg = SpeciesRegistry::builtin().unwrap();
    let t = 350.0;
    let s_liq = reg.entropy("H2O", LIQUID, t).unwrap();
    let s_gas = reg.entropy("H2O", GAS, t).unwrap();
    let h_liq = reg.enthalpy("H2O", LIQUID, t).unwrap();
    let h_gas = reg.enthalpy("H2O", GAS, t).unwrap();
    assert!(s_gas - s_liq > 100.0);
    // heat of vaporization near 42 kJ/mol at 350 K
    assert!((h_gas - h_liq - 42_000.0).abs() < 2_000.0);
}

#[test]
fn liquid_and_vapour_coexist_near_normal_boiling_point() {
    let reg = SpeciesRegistry::builtin().unwrap();
    let dg = |t: f64| {
        let liq = reg.standard_properties("H2O", LIQUID, t).unwrap().gibbs(t);
        let gas = reg.standard_properties("H2O", GAS, t).unwrap().gibbs(t);
        gas - liq
    };
    assert!(dg(372.0) > 0.0);
    assert!(dg(373.0) < 0.0);
}

proptest! {
    #[test]
    fn heat_capacity_is_positive(idx in 0usize..64, frac in 0.0_f64..=1.0) {
        let reg = SpeciesRegistry::builtin().unwrap();
        let all = correlations(&reg);
        let (name, tag, lo, hi) = &all[idx % all.len()];
        let t = lo + frac * (hi - lo);
        prop_assert!(reg.heat_capacity(name, tag, t).unwrap() > 0.0);
    }

    #[test]
    fn enthalpy_increases_with_temperature(
        idx in 0usize..64,
        frac in 0.0_f64..1.0,
        step in 1.0_f64..500.0,
    ) {
        let reg = SpeciesRegistry::builtin().unwrap();
        let all = correlations(&reg);
        let (name, tag, lo, hi) = &all[idx % all.len()];
        let t1 = lo + frac * (hi - lo - 1.0);
        let t2 = (t1 + step).min(*hi);
        prop_assume!(t2 - t1 >= 1.0);
        let h1 = reg.enthalpy(name, tag, t1).unwrap();
        let h2 = reg.enthalpy(name, tag, t2).unwrap();
        prop_assert!(h2 > h1, "{} ({}) H({}) = {} >= H({}) = {}", name, tag, t1, h1, t2, h2);
    }

    #[test]
    fn entropy_increases_with_temperature(
        idx in 0usize..64,
        frac in 0.0_f64..1.0,
        step in 1.0_f64..500.0,
    ) {
        let reg = SpeciesRegistry::builtin().unwrap();
        let all = correlations(&reg);
        let (name, tag, lo, hi) = &all[idx % all.len()];
        let t1 = lo + frac * (hi - lo - 1.0);
        let t2 = (t1 + step).min(*hi);
        prop_assume!(t2 - t1 >= 1.0);
        prop_assert!(reg.entropy(name, tag, t2).unwrap() > reg.entropy(name, tag, t1).unwrap());
    }
}
