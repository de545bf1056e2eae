//! Element table (standard atomic masses).

use crate::error::{ThermoError, ThermoResult};
use std::collections::BTreeMap;

/// A chemical element and its standard atomic mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    /// Standard atomic mass [g/mol].
    pub atomic_mass: f64,
}

const ELEMENTS: &[Element] = &[
    Element { symbol: "H", atomic_mass: 1.008 },
    Element { symbol: "He", atomic_mass: 4.002_602 },
    Element { symbol: "Li", atomic_mass: 6.94 },
    Element { symbol: "Be", atomic_mass: 9.012_183 },
    Element { symbol: "B", atomic_mass: 10.81 },
    Element { symbol: "C", atomic_mass: 12.011 },
    Element { symbol: "N", atomic_mass: 14.007 },
    Element { symbol: "O", atomic_mass: 15.999 },
    Element { symbol: "F", atomic_mass: 18.998_403 },
    Element { symbol: "Ne", atomic_mass: 20.1797 },
    Element { symbol: "Na", atomic_mass: 22.989_769 },
    Element { symbol: "Mg", atomic_mass: 24.305 },
    Element { symbol: "Al", atomic_mass: 26.981_538 },
    Element { symbol: "Si", atomic_mass: 28.085 },
    Element { symbol: "P", atomic_mass: 30.973_762 },
    Element { symbol: "S", atomic_mass: 32.06 },
    Element { symbol: "Cl", atomic_mass: 35.45 },
    Element { symbol: "Ar", atomic_mass: 39.948 },
    Element { symbol: "K", atomic_mass: 39.0983 },
    Element { symbol: "Ca", atomic_mass: 40.078 },
    Element { symbol: "Ti", atomic_mass: 47.867 },
    Element { symbol: "Cr", atomic_mass: 51.9961 },
    Element { symbol: "Mn", atomic_mass: 54.938_043 },
    Element { symbol: "Fe", atomic_mass: 55.845 },
    Element { symbol: "Ni", atomic_mass: 58.6934 },
    Element { symbol: "Cu", atomic_mass: 63.546 },
    Element { symbol: "Zn", atomic_mass: 65.38 },
    Element { symbol: "Br", atomic_mass: 79.904 },
    Element { symbol: "Kr", atomic_mass: 83.798 },
    Element { symbol: "I", atomic_mass: 126.904_47 },
    Element { symbol: "Xe", atomic_mass: 131.293 },
];

/// Look up an element by symbol (case-sensitive, e.g. "Ca").
pub fn lookup(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

/// Atomic mass [kg/mol].
pub fn atomic_mass(symbol: &str) -> ThermoResult<f64> {
    lookup(symbol)
        .map(|e| e.atomic_mass * 1e-3)
        .ok_or_else(|| ThermoError::UnknownElement {
            symbol: symbol.to_string(),
        })
}

/// Molar mass [kg/mol] of a formula given as element → atom count.
pub fn formula_mass(elements: &BTreeMap<String, u32>) -> ThermoResult<f64> {
    elements.iter().try_fold(0.0, |acc, (symbol, count)| {
        Ok(acc + atomic_mass(symbol)? * f64::from(*count))
    })
}
