//! Constraint configuration and tuning for equilibrium solves.

use crate::sqp::SqpConfig;
use serde::{Deserialize, Serialize};

/// What is held fixed and what is conserved during a solve.
///
/// The defaults are constant pressure and temperature with per-species
/// conservation (no reaction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquilibriumOptions {
    /// Pressures fixed at their input values. Variable pressure is not supported.
    pub const_p: bool,
    /// Total enthalpy fixed; one shared temperature is solved for. Otherwise each
    /// phase keeps its input temperature.
    pub const_h: bool,
    /// Conserve element totals (allows reaction). Otherwise conserve the total
    /// amount of each species across phases.
    pub elemental: bool,
    /// Trace amount given to zero-valued species, relative to the total moles
    pub trace_seed: f64,
    /// Smallest amount used inside logarithms [mol]
    pub mole_floor: f64,
    /// Optimizer settings, including the iteration budget
    pub sqp: SqpConfig,
}

impl Default for EquilibriumOptions {
    fn default() -> Self {
        Self {
            const_p: true,
            const_h: false,
            elemental: false,
            trace_seed: 1e-10,
            mole_floor: 1e-300,
            sqp: SqpConfig::default(),
        }
    }
}

impl EquilibriumOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiabatic, isobaric reacting mixture: constP + constH + elemental.
    pub fn adiabatic_reacting() -> Self {
        Self::default().const_h(true).elemental(true)
    }

    pub fn const_p(mut self, const_p: bool) -> Self {
        self.const_p = const_p;
        self
    }

    pub fn const_h(mut self, const_h: bool) -> Self {
        self.const_h = const_h;
        self
    }

    pub fn elemental(mut self, elemental: bool) -> Self {
        self.elemental = elemental;
        self
    }

    pub fn trace_seed(mut self, trace_seed: f64) -> Self {
        self.trace_seed = trace_seed;
        self
    }

    pub fn mole_floor(mut self, mole_floor: f64) -> Self {
        self.mole_floor = mole_floor;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.sqp.max_iterations = max_iterations;
        self
    }

    pub fn sqp(mut self, sqp: SqpConfig) -> Self {
        self.sqp = sqp;
        self
    }

    /// Short label such as `constP+constH+elemental`.
    pub fn mode(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.const_p {
            parts.push("constP");
        }
        parts.push(if self.const_h { "constH" } else { "constT" });
        parts.push(if self.elemental { "elemental" } else { "species" });
        parts.join("+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_builder() {
        let opts = EquilibriumOptions::new();
        assert!(opts.const_p);
        assert!(!opts.const_h);
        assert_eq!(opts.mode(), "constP+constT+species");

        let opts = EquilibriumOptions::adiabatic_reacting().max_iterations(7);
        assert_eq!(opts.mode(), "constP+constH+elemental");
        assert_eq!(opts.sqp.max_iterations, 7);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let opts: EquilibriumOptions =
            serde_yaml::from_str("const_h: true\nsqp:\n  max_iterations: 50\n").unwrap();
        assert!(opts.const_h);
        assert!(!opts.elemental);
        assert_eq!(opts.trace_seed, 1e-10);
        assert_eq!(opts.sqp.max_iterations, 50);
        assert_eq!(opts.sqp.feasibility_tol, 1e-9);
    }
}
