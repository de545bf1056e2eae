//! ceq-thermo: species data, compositions and phases for chemeq.
//!
//! Provides:
//! - NASA 7-coefficient heat-capacity correlations with analytic H and S
//! - The `PropertyModel` trait and its registry implementation (`SpeciesRegistry`)
//! - Built-in gas data and a liquid water correlation
//! - Sparse compositions with elemental accounting
//! - Ideal-gas and incompressible phases (enthalpy, entropy, chemical potential)
//!
//! # Architecture
//!
//! Data flows one way: `PropertyModel` → `Phase` → equilibrium solver. Phases
//! never hold the model; it is passed by reference to each property call so one
//! immutable registry can serve any number of phases and solves.
//!
//! # Example
//!
//! ```no_run
//! use ceq_thermo::{Composition, Phase, SpeciesRegistry};
//! use ceq_core::units::{k, pa};
//!
//! let registry = SpeciesRegistry::builtin().unwrap();
//! let air = Composition::from_pairs([("O2", 0.21), ("N2", 0.79)]).unwrap();
//! let gas = Phase::ideal_gas(air, k(300.0), pa(101_325.0)).unwrap();
//!
//! let h = gas.enthalpy(&registry).unwrap();
//! let mu = gas.chemical_potential(&registry, "O2").unwrap();
//! println!("H = {h} J, mu(O2) = {mu} J/mol");
//! ```

pub mod builtin;
pub mod composition;
pub mod element;
pub mod error;
pub mod model;
pub mod nasa;
pub mod phase;
pub mod registry;
pub mod species;

// Re-exports for ergonomics
pub use builtin::{GAS, LIQUID};
pub use composition::Composition;
pub use error::{ThermoError, ThermoResult};
pub use model::{
    MolarEnthalpy, MolarEntropy, MolarHeatCapacity, MolarMass, MolarVolume, PropertyModel,
    StandardProperties,
};
pub use nasa::{BoundaryGap, Nasa7, Nasa7Segment, RangePolicy};
pub use phase::{EquationOfState, Phase};
pub use registry::{RegistryFile, SpeciesRegistry};
pub use species::{SpeciesData, SpeciesDef};
