use ceq_core::units::{k, pa};
use ceq_thermo::{
    Composition, GAS, LIQUID, Phase, PropertyModel, RangePolicy, SpeciesRegistry, ThermoError,
};

#[test]
fn strict_policy_accepts_both_ends_and_nothing_beyond() {
    let reg = SpeciesRegistry::builtin().unwrap();
    assert_eq!(reg.range_policy(), RangePolicy::Strict);
    assert_eq!(reg.temperature_range("CH4", GAS).unwrap(), (200.0, 3500.0));

    assert!(reg.enthalpy("CH4", GAS, 200.0).is_ok());
    assert!(reg.enthalpy("CH4", GAS, 3500.0).is_ok());

    for t in [199.999, 3500.001] {
        match reg.enthalpy("CH4", GAS, t) {
            Err(ThermoError::OutOfRange { t_min, t_max, .. }) => {
                assert_eq!((t_min, t_max), (200.0, 3500.0));
            }
            other => panic!("expected out-of-range at {t} K, got {other:?}"),
        }
    }
}

#[test]
fn shared_boundary_uses_lower_segment() {
    let reg = SpeciesRegistry::builtin().unwrap();
    let nasa = reg.correlation("CH4", GAS).unwrap();
    let seg = nasa.segment(1000.0, RangePolicy::Strict).unwrap();
    assert_eq!(seg.t_max, 1000.0);
}

#[test]
fn extrapolation_continues_the_edge_segments() {
    let reg = SpeciesRegistry::builtin()
        .unwrap()
        .with_range_policy(RangePolicy::Extrapolate);
    let nasa = reg.correlation("CH4", GAS).unwrap();
    let high = &nasa.segments()[1];
    let low = &nasa.segments()[0];

    let cp = reg.heat_capacity("CH4", GAS, 3600.0).unwrap();
    assert!((cp / ceq_core::units::constants::R - high.cp_over_r(3600.0)).abs() < 1e-12);

    let cp_cold = reg.heat_capacity("CH4", GAS, 150.0).unwrap();
    assert!((cp_cold / ceq_core::units::constants::R - low.cp_over_r(150.0)).abs() < 1e-12);
}

#[test]
fn phase_properties_propagate_range_errors() {
    let reg = SpeciesRegistry::builtin().unwrap();
    let comp = Composition::pure("H2O", 1.0).unwrap();
    let liquid = Phase::incompressible(comp, k(600.0), pa(1.0e5), LIQUID, 1.8e-5).unwrap();
    let err = liquid.enthalpy(&reg).unwrap_err();
    assert!(err.is_lookup());
    assert!(matches!(err, ThermoError::OutOfRange { .. }));
}

#[test]
fn policy_is_read_from_data_files() {
    let text = r#"
range_policy: extrapolate
species:
  - name: N2
    elements: {N: 2}
    phases:
      Gas:
        - t_min: 300.0
          t_max: 1000.0
          coeffs: [3.5, 0.0, 0.0, 0.0, 0.0, -1050.0, 3.0]
"#;
    let reg = SpeciesRegistry::from_yaml_str(text).unwrap();
    assert_eq!(reg.range_policy(), RangePolicy::Extrapolate);
    assert!(reg.enthalpy("N2", GAS, 298.15).is_ok());
    let strict = reg.with_range_policy(RangePolicy::Strict);
    assert!(strict.enthalpy("N2", GAS, 298.15).is_err());
}
