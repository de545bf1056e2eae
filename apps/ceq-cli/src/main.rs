mod error;
mod problem_file;
mod selftest;

use ceq_core::units::{Pressure, bar, k};
use ceq_solver::{EquilibriumOptions, solve_batch, solve_detailed};
use ceq_thermo::{Composition, GAS, Phase, PropertyModel, RangePolicy, SpeciesRegistry};
use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use problem_file::{ProblemFile, SolveReport};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ceq")]
#[command(about = "Multi-phase chemical equilibrium solver", long_about = None)]
struct Cli {
    /// Extra species data (YAML or JSON) merged over the built-in set
    #[arg(long, global = true)]
    species: Option<PathBuf>,
    /// Evaluate correlations outside their temperature ranges
    #[arg(long, global = true)]
    extrapolate: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the acceptance checks and print a JSON summary
    Selftest,
    /// Solve an equilibrium problem file
    Solve {
        /// Path to the problem file (YAML, or JSON with a .json extension)
        problem_path: PathBuf,
        /// Print the report as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Print a property table for one species
    Props {
        species: String,
        /// Phase tag of the data
        #[arg(long, default_value = GAS)]
        tag: String,
        #[arg(long, default_value_t = 300.0)]
        t_min: f64,
        #[arg(long, default_value_t = 3000.0)]
        t_max: f64,
        #[arg(long, default_value_t = 100.0)]
        step: f64,
    },
    /// Adiabatic flame temperatures of a fuel with air over equivalence ratios
    Flame {
        #[arg(long, default_value = "CH4")]
        fuel: String,
        #[arg(long, default_value_t = 0.6)]
        phi_min: f64,
        #[arg(long, default_value_t = 1.6)]
        phi_max: f64,
        #[arg(long, default_value_t = 11)]
        points: usize,
        /// Reactant temperature in K
        #[arg(long, default_value_t = 298.15)]
        t0: f64,
        #[arg(long, default_value_t = 1.0)]
        pressure_bar: f64,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let reg = load_registry(cli.species.as_deref(), cli.extrapolate)?;

    match cli.command {
        Commands::Selftest => cmd_selftest(&reg),
        Commands::Solve { problem_path, json } => cmd_solve(reg, &problem_path, json),
        Commands::Props {
            species,
            tag,
            t_min,
            t_max,
            step,
        } => cmd_props(&reg, &species, &tag, (t_min, t_max, step)),
        Commands::Flame {
            fuel,
            phi_min,
            phi_max,
            points,
            t0,
            pressure_bar,
        } => cmd_flame(&reg, &fuel, (phi_min, phi_max, points), t0, bar(pressure_bar)),
    }
}

fn load_registry(extra: Option<&Path>, extrapolate: bool) -> CliResult<SpeciesRegistry> {
    let mut reg = SpeciesRegistry::builtin()?;
    if let Some(path) = extra {
        reg.merge(SpeciesRegistry::load(path)?);
    }
    if extrapolate {
        reg = reg.with_range_policy(RangePolicy::Extrapolate);
    }
    Ok(reg)
}

fn cmd_selftest(reg: &SpeciesRegistry) -> CliResult<()> {
    let summary = selftest::run(reg);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    match summary.failed_step() {
        Some(step) => Err(CliError::SelftestFailed {
            step: step.name.to_string(),
        }),
        None => Ok(()),
    }
}

fn cmd_solve(mut reg: SpeciesRegistry, problem_path: &Path, json: bool) -> CliResult<()> {
    let problem = ProblemFile::load(problem_path)?;
    if let Some(path) = &problem.species_file {
        reg.merge(SpeciesRegistry::load(path)?);
    }
    let phases = problem.phases()?;
    let solution = solve_detailed(&reg, &phases, &problem.options)?;
    let report = SolveReport::new(&reg, &problem.options, &solution)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", serde_yaml::to_string(&report)?);
    }
    Ok(())
}

fn cmd_props(
    reg: &SpeciesRegistry,
    species: &str,
    tag: &str,
    (t_min, t_max, step): (f64, f64, f64),
) -> CliResult<()> {
    if step.is_nan() || step <= 0.0 || t_max < t_min {
        return Err(CliError::Input {
            what: "need t_min <= t_max and a positive step".to_string(),
        });
    }
    let (lo, hi) = reg.temperature_range(species, tag)?;
    println!("{species} ({tag}), data {lo} K to {hi} K");
    println!(
        "{:>10} {:>14} {:>16} {:>14} {:>16}",
        "T [K]", "Cp [J/mol/K]", "H [J/mol]", "S [J/mol/K]", "G [J/mol]"
    );
    let count = ((t_max - t_min) / step).floor() as usize;
    for i in 0..=count {
        let t = t_min + i as f64 * step;
        let props = reg.standard_properties(species, tag, t)?;
        println!(
            "{:>10.2} {:>14.4} {:>16.2} {:>14.4} {:>16.2}",
            t,
            props.cp,
            props.h,
            props.s,
            props.gibbs(t)
        );
    }
    Ok(())
}

/// Fuel plus air at equivalence ratio `phi`, with every gas product that the
/// data can form from the feed elements declared at zero.
fn fuel_air(
    reg: &SpeciesRegistry,
    fuel: &str,
    phi: f64,
    t0: f64,
    p: Pressure,
) -> CliResult<Vec<Phase>> {
    let atoms = reg.atom_counts(fuel)?;
    let count = |e: &str| atoms.get(e).copied().map_or(0.0, f64::from);
    let req_o2 = count("C") + count("H") / 4.0 - count("O") / 2.0;
    if req_o2 <= 0.0 {
        return Err(CliError::Input {
            what: format!("{fuel} needs no oxygen to burn"),
        });
    }
    let air = Composition::from_pairs([("O2", 0.21), ("N2", 0.79)])?
        .scaled(req_o2 / phi / 0.21)?;
    let feed = Composition::pure(fuel, 1.0)?.combined(&air);
    let elements = feed.elemental_composition(reg)?;
    let products = reg.candidate_species(elements.keys().map(String::as_str), GAS);
    let feed = feed.with_declared(products);
    Ok(vec![Phase::ideal_gas(feed, k(t0), p)?])
}

fn cmd_flame(
    reg: &SpeciesRegistry,
    fuel: &str,
    (phi_min, phi_max, points): (f64, f64, usize),
    t0: f64,
    pressure: Pressure,
) -> CliResult<()> {
    if points == 0 || phi_min.is_nan() || phi_min <= 0.0 || phi_max < phi_min {
        return Err(CliError::Input {
            what: "need 0 < phi_min <= phi_max and at least one point".to_string(),
        });
    }
    let phis: Vec<f64> = (0..points)
        .map(|i| {
            if points == 1 {
                phi_min
            } else {
                phi_min + (phi_max - phi_min) * i as f64 / (points - 1) as f64
            }
        })
        .collect();
    let problems = phis
        .iter()
        .map(|&phi| fuel_air(reg, fuel, phi, t0, pressure))
        .collect::<CliResult<Vec<_>>>()?;

    let results = solve_batch(reg, &problems, &EquilibriumOptions::adiabatic_reacting());

    println!("{fuel}/air at {t0} K, {} Pa", pressure.value);
    println!(
        "{:>6} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "phi", "T [K]", "x_CO2", "x_H2O", "x_CO", "x_NO"
    );
    for (phi, result) in phis.iter().zip(results) {
        match result {
            Ok(phases) => {
                let comp = phases[0].composition();
                println!(
                    "{:>6.3} {:>10.2} {:>10.4e} {:>10.4e} {:>10.4e} {:>10.4e}",
                    phi,
                    phases[0].t_k(),
                    comp.mole_fraction("CO2"),
                    comp.mole_fraction("H2O"),
                    comp.mole_fraction("CO"),
                    comp.mole_fraction("NO"),
                );
            }
            Err(e) => println!("{phi:>6.3} failed: {e}"),
        }
    }
    Ok(())
}
