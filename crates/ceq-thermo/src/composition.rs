//! Species amounts (sparse, default-zero).

use crate::error::{ThermoError, ThermoResult};
use crate::model::PropertyModel;
use crate::model::validation::validate_amount;
use ceq_core::units::{Mass, kg};
use std::collections::BTreeMap;
use std::ops::Add;

/// Amounts of species in moles.
///
/// Reading a species that was never written returns 0. Keys are only ever
/// added: combining compositions takes the union of keys, and zero-valued
/// entries are kept so that callers can declare trace products ahead of a solve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    moles: BTreeMap<String, f64>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(species, moles)` pairs; repeated species are summed.
    pub fn from_pairs<I, S>(pairs: I) -> ThermoResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut comp = Self::new();
        for (species, n) in pairs {
            comp.add_moles(species, n)?;
        }
        Ok(comp)
    }

    /// Single species.
    pub fn pure(species: impl Into<String>, moles: f64) -> ThermoResult<Self> {
        Self::from_pairs([(species, moles)])
    }

    /// Moles of a species (0.0 if not present).
    pub fn get(&self, species: &str) -> f64 {
        self.moles.get(species).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, species: &str) -> bool {
        self.moles.contains_key(species)
    }

    /// Overwrite the amount of a species.
    pub fn set(&mut self, species: impl Into<String>, moles: f64) -> ThermoResult<()> {
        validate_amount(moles)?;
        self.moles.insert(species.into(), moles);
        Ok(())
    }

    /// Add to the amount of a species.
    pub fn add_moles(&mut self, species: impl Into<String>, moles: f64) -> ThermoResult<()> {
        validate_amount(moles)?;
        *self.moles.entry(species.into()).or_insert(0.0) += moles;
        Ok(())
    }

    /// Insert zero-valued entries for species not yet present.
    pub fn declare<I, S>(&mut self, species: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for s in species {
            self.moles.entry(s.into()).or_insert(0.0);
        }
    }

    /// Builder form of [`Composition::declare`].
    pub fn with_declared<I, S>(mut self, species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declare(species);
        self
    }

    /// Union of keys with summed amounts.
    pub fn combined(&self, other: &Composition) -> Composition {
        let mut out = self.clone();
        for (species, n) in &other.moles {
            *out.moles.entry(species.clone()).or_insert(0.0) += n;
        }
        out
    }

    /// Every amount multiplied by `factor` (keys kept, even when the factor is 0).
    pub fn scaled(&self, factor: f64) -> ThermoResult<Composition> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(ThermoError::InvalidArg {
                what: "scale factor must be finite and non-negative",
            });
        }
        Ok(Composition {
            moles: self
                .moles
                .iter()
                .map(|(s, n)| (s.clone(), n * factor))
                .collect(),
        })
    }

    /// Copy with every amount below `epsilon` raised to `epsilon`.
    pub fn seeded(&self, epsilon: f64) -> Composition {
        Composition {
            moles: self
                .moles
                .iter()
                .map(|(s, n)| (s.clone(), n.max(epsilon)))
                .collect(),
        }
    }

    /// Element → total atoms (mol), summed over species.
    ///
    /// Elements of zero-valued species are reported with a total of 0.
    pub fn elemental_composition(
        &self,
        model: &dyn PropertyModel,
    ) -> ThermoResult<BTreeMap<String, f64>> {
        let mut totals = BTreeMap::new();
        for (species, n) in &self.moles {
            for (element, count) in model.atom_counts(species)? {
                *totals.entry(element.clone()).or_insert(0.0) += n * f64::from(*count);
            }
        }
        Ok(totals)
    }

    pub fn total_moles(&self) -> f64 {
        self.moles.values().sum()
    }

    pub fn total_mass(&self, model: &dyn PropertyModel) -> ThermoResult<Mass> {
        let total = self
            .moles
            .iter()
            .try_fold(0.0, |acc, (s, n)| Ok::<_, ThermoError>(acc + n * model.molar_mass(s)?))?;
        Ok(kg(total))
    }

    /// Mole fraction (0.0 if absent or if the composition is empty).
    pub fn mole_fraction(&self, species: &str) -> f64 {
        let total = self.total_moles();
        if total > 0.0 {
            self.get(species) / total
        } else {
            0.0
        }
    }

    /// Species names in sorted order, including zero-valued entries.
    pub fn species(&self) -> impl Iterator<Item = &str> + '_ {
        self.moles.keys().map(String::as_str)
    }

    /// Iterate `(species, moles)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.moles.iter().map(|(s, n)| (s.as_str(), *n))
    }

    pub fn len(&self) -> usize {
        self.moles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moles.is_empty()
    }
}

impl Add for &Composition {
    type Output = Composition;

    fn add(self, rhs: &Composition) -> Composition {
        self.combined(rhs)
    }
}

impl Add for Composition {
    type Output = Composition;

    fn add(self, rhs: Composition) -> Composition {
        self.combined(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SpeciesRegistry;
    use ceq_core::numeric::{Tolerances, nearly_equal};

    fn air() -> Composition {
        Composition::from_pairs([("O2", 0.21), ("N2", 0.79)]).unwrap()
    }

    #[test]
    fn absent_species_reads_zero() {
        let comp = air();
        assert_eq!(comp.get("Ar"), 0.0);
        assert!(!comp.contains("Ar"));
        assert_eq!(comp.mole_fraction("Ar"), 0.0);
    }

    #[test]
    fn stoichiometric_methane_air() {
        let reg = SpeciesRegistry::builtin().unwrap();
        let fuel = Composition::pure("CH4", 1.0).unwrap();
        let elem = fuel.elemental_composition(&reg).unwrap();
        let req_o2 = elem["C"] + elem["H"] / 4.0;
        assert_eq!(req_o2, 2.0);

        let air = air();
        let mix = &fuel + &air.scaled(req_o2 / air.get("O2")).unwrap();
        let tol = Tolerances::new(1e-12, 1e-12);
        assert!(nearly_equal(mix.get("O2"), 2.0, tol));
        assert!(nearly_equal(mix.get("N2"), 2.0 * 0.79 / 0.21, tol));

        let atoms = mix.elemental_composition(&reg).unwrap();
        assert!(nearly_equal(atoms["O"], 4.0, tol));
        assert!(nearly_equal(atoms["C"], 1.0, tol));
    }

    #[test]
    fn combination_keeps_zero_keys() {
        let products = Composition::new().with_declared(["CO2", "H2O"]);
        let mix = air() + products;
        assert_eq!(mix.len(), 4);
        assert!(mix.contains("CO2"));
        assert_eq!(mix.get("CO2"), 0.0);
    }

    #[test]
    fn scaling_by_zero_keeps_keys() {
        let zero = air().scaled(0.0).unwrap();
        assert_eq!(zero.len(), 2);
        assert_eq!(zero.total_moles(), 0.0);
    }

    #[test]
    fn rejects_negative_amounts_and_factors() {
        let mut comp = Composition::new();
        assert!(comp.set("O2", -1.0).is_err());
        assert!(comp.add_moles("O2", f64::NAN).is_err());
        assert!(air().scaled(-2.0).is_err());
        assert!(air().scaled(f64::INFINITY).is_err());
    }

    #[test]
    fn total_mass_of_water() {
        let reg = SpeciesRegistry::builtin().unwrap();
        let water = Composition::pure("H2O", 2.0).unwrap();
        assert!((water.total_mass(&reg).unwrap().value - 0.036_03).abs() < 1e-5);
    }

    #[test]
    fn unknown_species_fails_element_lookup() {
        let reg = SpeciesRegistry::builtin().unwrap();
        let comp = Composition::pure("Kryptonite", 1.0).unwrap();
        assert!(comp.elemental_composition(&reg).is_err());
        assert!(comp.total_mass(&reg).is_err());
    }

    #[test]
    fn seeding_only_raises_small_entries() {
        let comp = Composition::from_pairs([("O2", 1.0), ("O", 0.0), ("O3", 1e-20)]).unwrap();
        let seeded = comp.seeded(1e-10);
        assert_eq!(seeded.get("O2"), 1.0);
        assert_eq!(seeded.get("O"), 1e-10);
        assert_eq!(seeded.get("O3"), 1e-10);
    }

    #[test]
    fn repeated_pairs_are_summed() {
        let comp = Composition::from_pairs([("N2", 1.0), ("N2", 2.5)]).unwrap();
        assert_eq!(comp.get("N2"), 3.5);
        assert_eq!(comp.len(), 1);
    }
}
