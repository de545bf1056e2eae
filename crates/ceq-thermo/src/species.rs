//! Species property entries.

use crate::element;
use crate::error::{ThermoError, ThermoResult};
use crate::model::MolarMass;
use crate::nasa::Nasa7;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property entry for one species: formula, molar mass and one correlation per
/// phase tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpeciesDef", into = "SpeciesDef")]
pub struct SpeciesData {
    name: String,
    elements: BTreeMap<String, u32>,
    molar_mass: MolarMass,
    phases: BTreeMap<String, Nasa7>,
}

/// Serialized form of [`SpeciesData`]; molar mass is derived from the element
/// table on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesDef {
    name: String,
    elements: BTreeMap<String, u32>,
    #[serde(default)]
    phases: BTreeMap<String, Nasa7>,
}

impl SpeciesData {
    /// Create an entry without phase data.
    ///
    /// Fails if the formula is empty or names an unknown element.
    pub fn new<N, I, K>(name: N, elements: I) -> ThermoResult<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (K, u32)>,
        K: Into<String>,
    {
        let name = name.into();
        let elements: BTreeMap<String, u32> = elements
            .into_iter()
            .map(|(sym, count)| (sym.into(), count))
            .filter(|(_, count)| *count > 0)
            .collect();
        if name.is_empty() {
            return Err(ThermoError::InvalidData {
                what: "species name is empty".to_string(),
            });
        }
        if elements.is_empty() {
            return Err(ThermoError::InvalidData {
                what: format!("species {name} has no elements"),
            });
        }
        let molar_mass = element::formula_mass(&elements)?;
        Ok(Self {
            name,
            elements,
            molar_mass,
            phases: BTreeMap::new(),
        })
    }

    /// Attach (or replace) the correlation for a phase tag.
    pub fn with_phase(mut self, tag: impl Into<String>, correlation: Nasa7) -> Self {
        self.phases.insert(tag.into(), correlation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &BTreeMap<String, u32> {
        &self.elements
    }

    /// Atoms of `element` per molecule (0 if absent).
    pub fn atom_count(&self, element: &str) -> u32 {
        self.elements.get(element).copied().unwrap_or(0)
    }

    /// Molar mass [kg/mol].
    pub fn molar_mass(&self) -> MolarMass {
        self.molar_mass
    }

    pub fn phase(&self, tag: &str) -> Option<&Nasa7> {
        self.phases.get(tag)
    }

    /// Phase tags with data, in sorted order.
    pub fn phase_tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.phases.keys().map(String::as_str)
    }
}

impl TryFrom<SpeciesDef> for SpeciesData {
    type Error = ThermoError;

    fn try_from(def: SpeciesDef) -> Result<Self, Self::Error> {
        let mut data = SpeciesData::new(def.name, def.elements)?;
        data.phases = def.phases;
        Ok(data)
    }
}

impl From<SpeciesData> for SpeciesDef {
    fn from(data: SpeciesData) -> Self {
        SpeciesDef {
            name: data.name,
            elements: data.elements,
            phases: data.phases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nasa::Nasa7Segment;

    #[test]
    fn molar_mass_from_formula() {
        let ch4 = SpeciesData::new("CH4", [("C", 1), ("H", 4)]).unwrap();
        assert!((ch4.molar_mass() - 0.016_043).abs() < 1e-6);
        assert_eq!(ch4.atom_count("H"), 4);
        assert_eq!(ch4.atom_count("O"), 0);
    }

    #[test]
    fn rejects_unknown_element() {
        let err = SpeciesData::new("Xy", [("Xy", 1)]).unwrap_err();
        assert!(matches!(err, ThermoError::UnknownElement { .. }));
    }

    #[test]
    fn rejects_empty_formula() {
        let err = SpeciesData::new("nothing", [("H", 0)]).unwrap_err();
        assert!(matches!(err, ThermoError::InvalidData { .. }));
    }

    #[test]
    fn phase_tags_sorted() {
        let seg = Nasa7::new(vec![Nasa7Segment::new(
            200.0,
            500.0,
            [9.0, 0.0, 0.0, 0.0, 0.0, -35000.0, -40.0],
        )])
        .unwrap();
        let w = SpeciesData::new("H2O", [("H", 2), ("O", 1)])
            .unwrap()
            .with_phase("Liquid", seg.clone())
            .with_phase("Gas", seg);
        let tags: Vec<&str> = w.phase_tags().collect();
        assert_eq!(tags, vec!["Gas", "Liquid"]);
        assert!(w.phase("Solid").is_none());
    }

    #[test]
    fn yaml_round_trip_recomputes_mass() {
        let yaml = r#"
name: CO
elements: {C: 1, O: 1}
phases:
  Gas:
    - t_min: 200.0
      t_max: 1000.0
      coeffs: [3.5, 0.0, 0.0, 0.0, 0.0, -14000.0, 4.0]
"#;
        let co: SpeciesData = serde_yaml::from_str(yaml).unwrap();
        assert!((co.molar_mass() - 0.028_010).abs() < 1e-6);
        assert!(co.phase("Gas").is_some());
    }
}
