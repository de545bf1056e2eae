//! Equilibrium formulation as a nonlinear program.
//!
//! Variables are the moles of every (phase, species) pair, followed at constant
//! enthalpy by the shared temperature scaled as `θ = T / T_s`, where `T_s` is the
//! temperature at which the seeded input has the input enthalpy.
//!
//! - constH: minimize `-S/R`; the energy row is `(H - H0) / (R T_s)`.
//! - constT: minimize `G/RT = Σ n μ / RT` at each phase's own temperature.
//!
//! Conservation rows are `A n - b` with `A` the atom counts of each element
//! (elemental) or the species incidence (per-species).

use crate::error::{SolverError, SolverResult};
use crate::newton::{NewtonConfig, newton_solve};
use crate::optimizer::NonlinearProgram;
use crate::options::EquilibriumOptions;
use ceq_core::units::constants::R;
use ceq_core::units::k;
use ceq_core::numeric::ln_floored;
use ceq_thermo::{Composition, Phase, PropertyModel, StandardProperties};
use nalgebra::{DMatrix, DVector};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// One mole variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableKey {
    /// Index into the input phase list
    pub phase: usize,
    pub species: String,
}

/// Properties at one point, shared by objective, gradient and Hessian.
struct Evaluation {
    props: Vec<StandardProperties>,
    ln_x: Vec<f64>,
    n: Vec<f64>,
    temperatures: Vec<f64>,
    phase_totals: Vec<f64>,
}

/// An equilibrium problem ready for an [`Optimizer`](crate::Optimizer).
pub struct EquilibriumProblem<'a> {
    model: &'a dyn PropertyModel,
    phases: Vec<Phase>,
    options: EquilibriumOptions,
    keys: Vec<VariableKey>,
    /// Elements or species, one per conservation row
    rows: Vec<String>,
    a: DMatrix<f64>,
    b: DVector<f64>,
    /// ln(P/P_ref) for gases, 0 otherwise; per phase
    pressure_terms: Vec<f64>,
    h0: f64,
    t_scale: f64,
    t_bounds: (f64, f64),
    x0: DVector<f64>,
}

impl<'a> EquilibriumProblem<'a> {
    /// Build the formulation and its seeded start point.
    pub fn new(
        model: &'a dyn PropertyModel,
        phases: &[Phase],
        options: &EquilibriumOptions,
    ) -> SolverResult<Self> {
        if phases.is_empty() {
            return Err(SolverError::ProblemSetup {
                what: "no phases given".to_string(),
            });
        }
        if !options.const_p {
            return Err(SolverError::ProblemSetup {
                what: "variable pressure is not supported; set const_p".to_string(),
            });
        }
        for (value, what) in [
            (options.trace_seed, "trace_seed"),
            (options.mole_floor, "mole_floor"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SolverError::ProblemSetup {
                    what: format!("{what} must be positive and finite"),
                });
            }
        }

        let mut temperature_ranges = Vec::new();
        for phase in phases {
            for species in phase.composition().species() {
                temperature_ranges.push(model.temperature_range(species, phase.tag())?);
            }
        }

        let keys = Self::select_keys(model, phases, options)?;
        if keys.is_empty() {
            return Err(SolverError::ProblemSetup {
                what: "no species with a nonzero amount to distribute".to_string(),
            });
        }
        let (rows, a) = Self::conservation_matrix(model, &keys, options.elemental)?;
        let n_input = DVector::from_iterator(
            keys.len(),
            keys.iter()
                .map(|key| phases[key.phase].composition().get(&key.species)),
        );
        let b = &a * &n_input;

        let h0 = phases
            .iter()
            .try_fold(0.0, |acc, p| Ok::<_, SolverError>(acc + p.enthalpy(model)?))?;
        let t_bounds = temperature_ranges
            .iter()
            .fold((0.0_f64, f64::INFINITY), |(lo, hi), (t_lo, t_hi)| {
                (lo.max(*t_lo), hi.min(*t_hi))
            });
        if options.const_h && t_bounds.0 >= t_bounds.1 {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "species data share no temperature range ({} K to {} K)",
                    t_bounds.0, t_bounds.1
                ),
            });
        }

        let pressure_terms = phases
            .iter()
            .map(|p| p.eos().pressure_log_term(p.p_pa()))
            .collect();

        let total = n_input.sum();
        let seed = options.trace_seed * total.max(1.0);
        let seeded_inputs: Vec<Composition> = phases
            .iter()
            .map(|p| p.composition().seeded(seed))
            .collect();
        let seeded = DVector::from_iterator(
            keys.len(),
            keys.iter()
                .map(|key| seeded_inputs[key.phase].get(&key.species)),
        );

        let mut problem = Self {
            model,
            phases: phases.to_vec(),
            options: options.clone(),
            keys,
            rows,
            a,
            b,
            pressure_terms,
            h0,
            t_scale: 1.0,
            t_bounds,
            x0: seeded.clone(),
        };

        if options.const_h {
            problem.t_scale = problem.initial_temperature(&seeded)?;
            debug!(t_start = problem.t_scale, h0, "initial temperature");
            problem.x0 = seeded.push(1.0);
        }
        Ok(problem)
    }

    /// Mole variables. Species carrying an element absent from the input make
    /// elemental problems infeasible; species with no input amount are held at
    /// zero in per-species problems.
    fn select_keys(
        model: &dyn PropertyModel,
        phases: &[Phase],
        options: &EquilibriumOptions,
    ) -> SolverResult<Vec<VariableKey>> {
        let mut species_totals: BTreeMap<&str, f64> = BTreeMap::new();
        let mut element_totals: BTreeMap<String, f64> = BTreeMap::new();
        for phase in phases {
            for (species, n) in phase.composition().iter() {
                *species_totals.entry(species).or_insert(0.0) += n;
            }
            for (element, n) in phase.composition().elemental_composition(model)? {
                *element_totals.entry(element).or_insert(0.0) += n;
            }
        }

        let mut keys = Vec::new();
        for (index, phase) in phases.iter().enumerate() {
            for species in phase.composition().species() {
                if options.elemental {
                    for element in model.atom_counts(species)?.keys() {
                        if element_totals.get(element).copied().unwrap_or(0.0) <= 0.0 {
                            warn!(element = %element, species, "element missing from input");
                            return Err(SolverError::InfeasibleConstraint {
                                what: format!(
                                    "species {species} needs element {element}, which the input does not contain"
                                ),
                            });
                        }
                    }
                } else if species_totals.get(species).copied().unwrap_or(0.0) <= 0.0 {
                    continue;
                }
                keys.push(VariableKey {
                    phase: index,
                    species: species.to_string(),
                });
            }
        }
        Ok(keys)
    }

    fn conservation_matrix(
        model: &dyn PropertyModel,
        keys: &[VariableKey],
        elemental: bool,
    ) -> SolverResult<(Vec<String>, DMatrix<f64>)> {
        let mut rows = BTreeSet::new();
        for key in keys {
            if elemental {
                rows.extend(model.atom_counts(&key.species)?.keys().cloned());
            } else {
                rows.insert(key.species.clone());
            }
        }
        let rows: Vec<String> = rows.into_iter().collect();
        let mut a = DMatrix::zeros(rows.len(), keys.len());
        for (j, key) in keys.iter().enumerate() {
            if elemental {
                for (element, count) in model.atom_counts(&key.species)? {
                    if let Ok(i) = rows.binary_search(element) {
                        a[(i, j)] = f64::from(*count);
                    }
                }
            } else if let Ok(i) = rows.binary_search(&key.species) {
                a[(i, j)] = 1.0;
            }
        }
        Ok((rows, a))
    }

    /// Temperature at which the seeded amounts carry the input enthalpy, starting
    /// from the mole-weighted mean of the phase temperatures.
    fn initial_temperature(&self, seeded: &DVector<f64>) -> SolverResult<f64> {
        let (lo, hi) = self.t_bounds;
        let (weighted, total) = self.phases.iter().fold((0.0, 0.0), |(w, t), p| {
            let n = p.composition().total_moles();
            (w + n * p.t_k(), t + n)
        });
        let t0 = if total > 0.0 {
            weighted / total
        } else {
            self.phases.iter().map(Phase::t_k).sum::<f64>() / self.phases.len() as f64
        };
        let t0 = t0.clamp(lo, hi);
        let scale = R * t0;

        let sums = |t: f64| -> SolverResult<(f64, f64)> {
            let mut h = 0.0;
            let mut cp = 0.0;
            for (key, n) in self.keys.iter().zip(seeded.iter()) {
                let props =
                    self.model
                        .standard_properties(&key.species, self.phases[key.phase].tag(), t)?;
                h += n * props.h;
                cp += n * props.cp;
            }
            Ok((h, cp))
        };
        let residual = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            let (h, _) = sums(v[0])?;
            Ok(DVector::from_element(1, (h - self.h0) / scale))
        };
        let jacobian = |v: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            let (_, cp) = sums(v[0])?;
            Ok(DMatrix::from_element(1, 1, cp / scale))
        };
        let config = NewtonConfig {
            abs_tol: 1e-10 * seeded.sum().max(1.0),
            min_value: lo,
            max_value: hi,
            ..NewtonConfig::default()
        };
        let result = newton_solve(DVector::from_element(1, t0), residual, jacobian, &config)?;
        Ok(result.x[0])
    }

    pub fn keys(&self) -> &[VariableKey] {
        &self.keys
    }

    /// Names of the conserved quantities (elements or species), in row order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Conserved totals of the input [mol], in row order.
    pub fn conserved_totals(&self) -> &DVector<f64> {
        &self.b
    }

    /// Input enthalpy [J].
    pub fn initial_enthalpy(&self) -> f64 {
        self.h0
    }

    /// Temperature scale `T_s` [K] (1 when the temperature is not a variable).
    pub fn temperature_scale(&self) -> f64 {
        self.t_scale
    }

    /// Seeded start point.
    pub fn initial_point(&self) -> DVector<f64> {
        self.x0.clone()
    }

    pub fn options(&self) -> &EquilibriumOptions {
        &self.options
    }

    fn num_moles(&self) -> usize {
        self.keys.len()
    }

    /// Shared temperature [K] at `x` when solving at constant enthalpy.
    ///
    /// `None` at constant temperature, or when `x` is too short to hold it.
    pub fn temperature(&self, x: &DVector<f64>) -> Option<f64> {
        if !self.options.const_h {
            return None;
        }
        x.get(self.num_moles()).map(|theta| theta * self.t_scale)
    }

    fn check_dimension(&self, x: &DVector<f64>) -> SolverResult<()> {
        if x.len() != self.dimension() {
            return Err(SolverError::ProblemSetup {
                what: format!("point has {} entries, expected {}", x.len(), self.dimension()),
            });
        }
        Ok(())
    }

    fn evaluate(&self, x: &DVector<f64>) -> SolverResult<Evaluation> {
        self.check_dimension(x)?;
        if let Some(v) = x.iter().find(|v| !v.is_finite()) {
            return Err(SolverError::NumericDomain {
                what: format!("non-finite variable {v}"),
            });
        }
        let nk = self.num_moles();
        if let Some(v) = x.rows(0, nk).iter().find(|v| **v < 0.0) {
            return Err(SolverError::NumericDomain {
                what: format!("negative amount {v}"),
            });
        }

        let temperatures: Vec<f64> = match self.temperature(x) {
            Some(t) if t > 0.0 => vec![t; self.phases.len()],
            Some(t) => {
                return Err(SolverError::NumericDomain {
                    what: format!("non-positive temperature {t}"),
                });
            }
            None => self.phases.iter().map(Phase::t_k).collect(),
        };

        let floor = self.options.mole_floor;
        let mut phase_totals = vec![0.0; self.phases.len()];
        for (key, n) in self.keys.iter().zip(x.iter()) {
            phase_totals[key.phase] += n.max(floor);
        }

        let mut props = Vec::with_capacity(nk);
        let mut ln_x = Vec::with_capacity(nk);
        for (key, n) in self.keys.iter().zip(x.iter()) {
            let phase = &self.phases[key.phase];
            props.push(self.model.standard_properties(
                &key.species,
                phase.tag(),
                temperatures[key.phase],
            )?);
            ln_x.push(ln_floored(*n, floor) - phase_totals[key.phase].ln());
        }

        Ok(Evaluation {
            props,
            ln_x,
            n: x.rows(0, nk).iter().copied().collect(),
            temperatures,
            phase_totals,
        })
    }

    /// Dimensionless potential of key `k`: `μ/RT` at constT, `-s̄` at constH.
    fn potential(&self, ev: &Evaluation, k: usize) -> f64 {
        let p = self.keys[k].phase;
        let t = ev.temperatures[p];
        let props = &ev.props[k];
        let mixing_and_pressure = ev.ln_x[k] + self.pressure_terms[p];
        if self.options.const_h {
            -(props.s / R) + mixing_and_pressure
        } else {
            props.h / (R * t) - props.s / R + mixing_and_pressure
        }
    }

    /// Ideal mixing Hessian `δ_ij / n_i - 1 / N_p` within each phase.
    fn add_mixing_hessian(&self, ev: &Evaluation, w: &mut DMatrix<f64>) {
        let floor = self.options.mole_floor;
        for (i, ki) in self.keys.iter().enumerate() {
            let inv_total = 1.0 / ev.phase_totals[ki.phase];
            for (j, kj) in self.keys.iter().enumerate() {
                if kj.phase == ki.phase {
                    w[(i, j)] -= inv_total;
                }
            }
            w[(i, i)] += 1.0 / ev.n[i].max(floor);
        }
    }

    /// Build the phases described by `x`; held species keep their zero amount.
    pub fn phases_at(&self, x: &DVector<f64>) -> SolverResult<Vec<Phase>> {
        self.check_dimension(x)?;
        let t_shared = self.temperature(x);
        let mut compositions: Vec<_> = self
            .phases
            .iter()
            .map(|p| p.composition().clone())
            .collect();
        for (key, n) in self.keys.iter().zip(x.iter()) {
            compositions[key.phase].set(key.species.clone(), n.max(0.0))?;
        }
        self.phases
            .iter()
            .zip(compositions)
            .map(|(phase, comp)| {
                let t = t_shared.unwrap_or_else(|| phase.t_k());
                Ok(phase.with_state(comp, k(t))?)
            })
            .collect()
    }
}

impl NonlinearProgram for EquilibriumProblem<'_> {
    fn dimension(&self) -> usize {
        self.num_moles() + usize::from(self.options.const_h)
    }

    fn num_constraints(&self) -> usize {
        self.rows.len() + usize::from(self.options.const_h)
    }

    fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
        let mut lower = DVector::zeros(self.dimension());
        let mut upper = DVector::from_element(self.dimension(), f64::INFINITY);
        if self.options.const_h {
            let i = self.num_moles();
            lower[i] = self.t_bounds.0 / self.t_scale;
            upper[i] = self.t_bounds.1 / self.t_scale;
        }
        (lower, upper)
    }

    fn objective(&self, x: &DVector<f64>) -> SolverResult<f64> {
        let ev = self.evaluate(x)?;
        Ok((0..self.num_moles())
            .map(|k| ev.n[k] * self.potential(&ev, k))
            .sum())
    }

    fn gradient(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let ev = self.evaluate(x)?;
        let nk = self.num_moles();
        let mut g = DVector::zeros(self.dimension());
        for k in 0..nk {
            g[k] = self.potential(&ev, k);
        }
        if self.options.const_h {
            // d(-S/R)/dθ = -T_s Σ n cp / (R T)
            g[nk] = -(0..nk)
                .map(|k| {
                    let t = ev.temperatures[self.keys[k].phase];
                    ev.n[k] * ev.props[k].cp / (R * t)
                })
                .sum::<f64>()
                * self.t_scale;
        }
        Ok(g)
    }

    fn constraints(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let nk = self.num_moles();
        let n = x.rows(0, nk);
        let balance = &self.a * n - &self.b;
        if !self.options.const_h {
            return Ok(balance);
        }
        let ev = self.evaluate(x)?;
        let h: f64 = (0..nk).map(|k| ev.n[k] * ev.props[k].h).sum();
        Ok(balance.push((h - self.h0) / (R * self.t_scale)))
    }

    fn constraint_jacobian(&self, x: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        let nk = self.num_moles();
        let mut jac = DMatrix::zeros(self.num_constraints(), self.dimension());
        jac.view_mut((0, 0), (self.rows.len(), nk)).copy_from(&self.a);
        if self.options.const_h {
            let ev = self.evaluate(x)?;
            let row = self.rows.len();
            for k in 0..nk {
                jac[(row, k)] = ev.props[k].h / (R * self.t_scale);
            }
            jac[(row, nk)] = (0..nk).map(|k| ev.n[k] * ev.props[k].cp / R).sum();
        }
        Ok(jac)
    }

    fn lagrangian_hessian(
        &self,
        x: &DVector<f64>,
        lambda: &DVector<f64>,
    ) -> SolverResult<Option<DMatrix<f64>>> {
        let ev = self.evaluate(x)?;
        let nk = self.num_moles();
        let mut w = DMatrix::zeros(self.dimension(), self.dimension());
        self.add_mixing_hessian(&ev, &mut w);

        if self.options.const_h {
            let ts = self.t_scale;
            let lambda_e = lambda[self.rows.len()];
            let mut w_tt = 0.0;
            for k in 0..nk {
                let t = ev.temperatures[self.keys[k].phase];
                let props = &ev.props[k];
                // objective -S/R
                let f_nt = -ts * props.cp / (R * t);
                let f_tt = -ts * ts * ev.n[k] * (props.dcp_dt / (R * t) - props.cp / (R * t * t));
                // energy row (H - H0) / (R T_s)
                let c_nt = props.cp / R;
                let c_tt = ts * ev.n[k] * props.dcp_dt / R;

                let w_nt = f_nt - lambda_e * c_nt;
                w[(k, nk)] = w_nt;
                w[(nk, k)] = w_nt;
                w_tt += f_tt - lambda_e * c_tt;
            }
            w[(nk, nk)] = w_tt;
        }
        Ok(Some(w))
    }

    fn constraint_scales(&self) -> DVector<f64> {
        let scales = self.b.map(|b| b.abs().max(1.0));
        if self.options.const_h {
            scales.push((self.h0.abs() / (R * self.t_scale)).max(1.0))
        } else {
            scales
        }
    }

    fn stationarity_scale(&self, x: &DVector<f64>) -> f64 {
        x.rows(0, self.num_moles()).sum().max(f64::MIN_POSITIVE)
    }
}
