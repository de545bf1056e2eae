//! Species registry: the read-only property data provider.

use crate::builtin;
use crate::error::{ThermoError, ThermoResult};
use crate::model::{MolarMass, PropertyModel, StandardProperties};
use crate::nasa::{Nasa7, Nasa7Segment, RangePolicy};
use crate::species::SpeciesData;
use ceq_core::units::constants::R;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Immutable map of species name to property entry.
///
/// Build it once (built-in data, files, or by hand) and pass it by reference to
/// phases and the solver. It implements [`PropertyModel`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesRegistry {
    species: BTreeMap<String, SpeciesData>,
    range_policy: RangePolicy,
}

/// On-disk layout of a species data file (YAML or JSON).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub range_policy: RangePolicy,
    #[serde(default)]
    pub species: Vec<SpeciesData>,
}

impl SpeciesRegistry {
    /// Empty registry with the strict range policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in gas and liquid water data.
    pub fn builtin() -> ThermoResult<Self> {
        let mut reg = Self::new();
        for data in builtin::builtin_species()? {
            reg.insert(data);
        }
        Ok(reg)
    }

    /// Parse a registry from YAML text.
    pub fn from_yaml_str(text: &str) -> ThermoResult<Self> {
        let file: RegistryFile = serde_yaml::from_str(text)?;
        Ok(Self::from(file))
    }

    /// Parse a registry from JSON text.
    pub fn from_json_str(text: &str) -> ThermoResult<Self> {
        let file: RegistryFile = serde_json::from_str(text)?;
        Ok(Self::from(file))
    }

    /// Load a `.json` file as JSON, anything else as YAML.
    pub fn load(path: &Path) -> ThermoResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ThermoError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Serialize to YAML in the [`RegistryFile`] layout.
    pub fn to_yaml_string(&self) -> ThermoResult<String> {
        let file = RegistryFile {
            range_policy: self.range_policy,
            species: self.species.values().cloned().collect(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    pub fn range_policy(&self) -> RangePolicy {
        self.range_policy
    }

    /// Insert or replace an entry; returns the previous entry of that name.
    pub fn insert(&mut self, data: SpeciesData) -> Option<SpeciesData> {
        self.species.insert(data.name().to_string(), data)
    }

    /// Add every entry of `other`, replacing same-named entries. The range
    /// policy of `self` is kept.
    pub fn merge(&mut self, other: SpeciesRegistry) {
        for (name, data) in other.species {
            self.species.insert(name, data);
        }
    }

    pub fn get(&self, species: &str) -> ThermoResult<&SpeciesData> {
        self.species
            .get(species)
            .ok_or_else(|| ThermoError::UnknownSpecies {
                species: species.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.species.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Species with `tag` data whose elements are all drawn from `elements`.
    ///
    /// Used to pre-declare every product that could form from a given feed.
    pub fn candidate_species<'a>(
        &self,
        elements: impl IntoIterator<Item = &'a str>,
        tag: &str,
    ) -> Vec<String> {
        let allowed: BTreeSet<&str> = elements.into_iter().collect();
        self.species
            .values()
            .filter(|data| data.phase(tag).is_some())
            .filter(|data| data.elements().keys().all(|e| allowed.contains(e.as_str())))
            .map(|data| data.name().to_string())
            .collect()
    }

    /// Correlation for a species and phase tag.
    pub fn correlation(&self, species: &str, tag: &str) -> ThermoResult<&Nasa7> {
        self.get(species)?
            .phase(tag)
            .ok_or_else(|| ThermoError::UnknownPhaseTag {
                species: species.to_string(),
                tag: tag.to_string(),
            })
    }

    fn segment(&self, species: &str, tag: &str, t: f64) -> ThermoResult<&Nasa7Segment> {
        let correlation = self.correlation(species, tag)?;
        if !t.is_finite() || t <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        correlation
            .segment(t, self.range_policy)
            .ok_or_else(|| {
                let (t_min, t_max) = correlation.range();
                ThermoError::OutOfRange {
                    species: species.to_string(),
                    tag: tag.to_string(),
                    t,
                    t_min,
                    t_max,
                }
            })
    }
}

impl From<RegistryFile> for SpeciesRegistry {
    fn from(file: RegistryFile) -> Self {
        let mut reg = SpeciesRegistry::new().with_range_policy(file.range_policy);
        for data in file.species {
            reg.insert(data);
        }
        reg
    }
}

impl PropertyModel for SpeciesRegistry {
    fn name(&self) -> &str {
        "species-registry"
    }

    fn contains(&self, species: &str) -> bool {
        self.species.contains_key(species)
    }

    fn has_phase(&self, species: &str, tag: &str) -> bool {
        self.species
            .get(species)
            .is_some_and(|data| data.phase(tag).is_some())
    }

    fn atom_counts(&self, species: &str) -> ThermoResult<&BTreeMap<String, u32>> {
        Ok(self.get(species)?.elements())
    }

    fn molar_mass(&self, species: &str) -> ThermoResult<MolarMass> {
        Ok(self.get(species)?.molar_mass())
    }

    fn temperature_range(&self, species: &str, tag: &str) -> ThermoResult<(f64, f64)> {
        let range = self.correlation(species, tag)?.range();
        Ok(match self.range_policy {
            RangePolicy::Strict => range,
            RangePolicy::Extrapolate => (f64::MIN_POSITIVE, f64::INFINITY),
        })
    }

    fn heat_capacity(&self, species: &str, tag: &str, t: f64) -> ThermoResult<f64> {
        Ok(R * self.segment(species, tag, t)?.cp_over_r(t))
    }

    fn heat_capacity_slope(&self, species: &str, tag: &str, t: f64) -> ThermoResult<f64> {
        Ok(R * self.segment(species, tag, t)?.dcp_over_r_dt(t))
    }

    fn enthalpy(&self, species: &str, tag: &str, t: f64) -> ThermoResult<f64> {
        Ok(R * t * self.segment(species, tag, t)?.h_over_rt(t))
    }

    fn entropy(&self, species: &str, tag: &str, t: f64) -> ThermoResult<f64> {
        Ok(R * self.segment(species, tag, t)?.s_over_r(t))
    }

    fn standard_properties(
        &self,
        species: &str,
        tag: &str,
        t: f64,
    ) -> ThermoResult<StandardProperties> {
        let seg = self.segment(species, tag, t)?;
        Ok(StandardProperties {
            cp: R * seg.cp_over_r(t),
            dcp_dt: R * seg.dcp_over_r_dt(t),
            h: R * t * seg.h_over_rt(t),
            s: R * seg.s_over_r(t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{GAS, LIQUID};
    use ceq_core::units::constants::T_REF_K;

    fn registry() -> SpeciesRegistry {
        SpeciesRegistry::builtin().unwrap()
    }

    #[test]
    fn builtin_contains_core_species() {
        let reg = registry();
        for name in ["H2O", "CO2", "CH4", "O2", "N2"] {
            assert!(reg.contains(name), "missing {name}");
        }
        assert!(reg.has_phase("H2O", LIQUID));
        assert!(!reg.has_phase("CH4", LIQUID));
    }

    #[test]
    fn formation_enthalpies_at_reference() {
        let reg = registry();
        let h = |s: &str| reg.enthalpy(s, GAS, T_REF_K).unwrap();
        assert!((h("CO2") + 393_510.0).abs() < 100.0);
        assert!((h("H2O") + 241_826.0).abs() < 100.0);
        assert!((h("CH4") + 74_600.0).abs() < 200.0);
        assert!(h("O2").abs() < 10.0);
        assert!(h("N2").abs() < 10.0);
        let hl = reg.enthalpy("H2O", LIQUID, T_REF_K).unwrap();
        assert!((hl + 285_830.0).abs() < 1.0);
    }

    #[test]
    fn unknown_lookups_fail() {
        let reg = registry();
        assert!(matches!(
            reg.enthalpy("Unobtainium", GAS, 300.0),
            Err(ThermoError::UnknownSpecies { .. })
        ));
        assert!(matches!(
            reg.enthalpy("CH4", LIQUID, 300.0),
            Err(ThermoError::UnknownPhaseTag { .. })
        ));
    }

    #[test]
    fn strict_range_rejects_outside_temperature() {
        let reg = registry();
        let err = reg.heat_capacity("CH4", GAS, 3600.0).unwrap_err();
        assert!(matches!(err, ThermoError::OutOfRange { .. }));
        assert!(err.is_lookup());
    }

    #[test]
    fn extrapolation_uses_nearest_segment() {
        let reg = registry().with_range_policy(RangePolicy::Extrapolate);
        let inside = reg.heat_capacity("CH4", GAS, 3500.0).unwrap();
        let outside = reg.heat_capacity("CH4", GAS, 3600.0).unwrap();
        assert!(outside > inside);
        assert_eq!(
            reg.temperature_range("CH4", GAS).unwrap().1,
            f64::INFINITY
        );
    }

    #[test]
    fn rejects_non_physical_temperature() {
        let reg = registry().with_range_policy(RangePolicy::Extrapolate);
        assert!(matches!(
            reg.entropy("O2", GAS, 0.0),
            Err(ThermoError::NonPhysical { .. })
        ));
    }

    #[test]
    fn pack_matches_individual_queries() {
        let reg = registry();
        let pack = reg.standard_properties("CO", GAS, 1500.0).unwrap();
        assert_eq!(pack.cp, reg.heat_capacity("CO", GAS, 1500.0).unwrap());
        assert_eq!(pack.h, reg.enthalpy("CO", GAS, 1500.0).unwrap());
        assert_eq!(pack.s, reg.entropy("CO", GAS, 1500.0).unwrap());
        assert_eq!(
            pack.dcp_dt,
            reg.heat_capacity_slope("CO", GAS, 1500.0).unwrap()
        );
    }

    #[test]
    fn candidates_follow_available_elements() {
        let reg = registry();
        let c = reg.candidate_species(["H", "O"], GAS);
        for name in ["H2O", "H2", "O2", "OH", "O", "H"] {
            assert!(c.iter().any(|s| s == name), "missing {name}");
        }
        assert!(!c.iter().any(|s| s == "CO2"));
        let liquids = reg.candidate_species(["H", "O"], LIQUID);
        assert_eq!(liquids, vec!["H2O".to_string()]);
    }

    #[test]
    fn yaml_round_trip_and_merge() {
        let reg = registry();
        let text = reg.to_yaml_string().unwrap();
        let back = SpeciesRegistry::from_yaml_str(&text).unwrap();
        assert_eq!(back.len(), reg.len());

        let extra = r#"
range_policy: extrapolate
species:
  - name: He
    elements: {He: 1}
    phases:
      Gas:
        - t_min: 200.0
          t_max: 6000.0
          coeffs: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, 0.928723974]
"#;
        let other = SpeciesRegistry::from_yaml_str(extra).unwrap();
        assert_eq!(other.range_policy(), RangePolicy::Extrapolate);
        let mut merged = reg.clone();
        merged.merge(other);
        assert!(merged.contains("He"));
        assert_eq!(merged.range_policy(), RangePolicy::Strict);
        assert_eq!(merged.len(), reg.len() + 1);
    }

    #[test]
    fn parse_error_is_reported() {
        let err = SpeciesRegistry::from_yaml_str("species: [ {name: X} ]").unwrap_err();
        assert!(matches!(err, ThermoError::Parse { .. }));
    }
}
