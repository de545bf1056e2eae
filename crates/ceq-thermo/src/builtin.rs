//! Built-in species data.
//!
//! Gas-phase NASA-7 coefficients are from GRI-Mech 3.0, with Burcat's
//! 200-6000 K sets for N2 and Ar. The liquid water correlation has a heat
//! capacity fitted to tabulated liquid water between 273 and 500 K; its reference
//! entropy is set so that liquid and ideal-gas H2O coexist at 372.76 K and 1 bar.

use crate::error::ThermoResult;
use crate::nasa::{Nasa7, Nasa7Segment};
use crate::species::SpeciesData;

/// Phase tag of ideal-gas data.
pub const GAS: &str = "Gas";

/// Phase tag of liquid data.
pub const LIQUID: &str = "Liquid";

type Segment = (f64, f64, [f64; 7]);

struct Entry {
    name: &'static str,
    elements: &'static [(&'static str, u32)],
    tag: &'static str,
    segments: &'static [Segment],
}

const DATA: &[Entry] = &[
    Entry {
        name: "CH4",
        elements: &[("C", 1), ("H", 4)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    5.14987613E+00,
                    -1.36709788E-02,
                    4.91800599E-05,
                    -4.84743026E-08,
                    1.66693956E-11,
                    -1.02466476E+04,
                    -4.64130376E+00,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    7.48514950E-02,
                    1.33909467E-02,
                    -5.73285809E-06,
                    1.22292535E-09,
                    -1.01815230E-13,
                    -9.46834459E+03,
                    1.84373180E+01,
                ],
            ),
        ],
    },
    Entry {
        name: "O2",
        elements: &[("O", 2)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    3.78245636E+00,
                    -2.99673416E-03,
                    9.84730201E-06,
                    -9.68129509E-09,
                    3.24372837E-12,
                    -1.06394356E+03,
                    3.65767573E+00,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    3.28253784E+00,
                    1.48308754E-03,
                    -7.57966669E-07,
                    2.09470555E-10,
                    -2.16717794E-14,
                    -1.08845772E+03,
                    5.45323129E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "N2",
        elements: &[("N", 2)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    3.53100528E+00,
                    -1.23660988E-04,
                    -5.02999433E-07,
                    2.43530612E-09,
                    -1.40881235E-12,
                    -1.04697628E+03,
                    2.96747038E+00,
                ],
            ),
            (
                1000.0,
                6000.0,
                [
                    2.95257637E+00,
                    1.39690040E-03,
                    -4.92631603E-07,
                    7.86010195E-11,
                    -4.60755204E-15,
                    -9.23948688E+02,
                    5.87188762E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "CO2",
        elements: &[("C", 1), ("O", 2)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    2.35677352E+00,
                    8.98459677E-03,
                    -7.12356269E-06,
                    2.45919022E-09,
                    -1.43699548E-13,
                    -4.83719697E+04,
                    9.90105222E+00,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    3.85746029E+00,
                    4.41437026E-03,
                    -2.21481404E-06,
                    5.23490188E-10,
                    -4.72084164E-14,
                    -4.87591660E+04,
                    2.27163806E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "H2O",
        elements: &[("H", 2), ("O", 1)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    4.19864056E+00,
                    -2.03643410E-03,
                    6.52040211E-06,
                    -5.48797062E-09,
                    1.77197817E-12,
                    -3.02937267E+04,
                    -8.49032208E-01,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    3.03399249E+00,
                    2.17691804E-03,
                    -1.64072518E-07,
                    -9.70419870E-11,
                    1.68200992E-14,
                    -3.00042971E+04,
                    4.96677010E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "H2O",
        elements: &[("H", 2), ("O", 1)],
        tag: LIQUID,
        segments: &[
            (
                273.15,
                373.15,
                [
                    1.2518989834E+01,
                    -2.1605379336E-02,
                    3.365369425E-05,
                    0.0,
                    0.0,
                    -3.7447010396E+04,
                    -5.7986058862E+01,
                ],
            ),
            (
                373.15,
                500.0,
                [
                    1.206557406E+01,
                    -1.8148822567E-02,
                    2.7615573098E-05,
                    0.0,
                    0.0,
                    -3.7413889646E+04,
                    -5.6170376877E+01,
                ],
            ),
        ],
    },
    Entry {
        name: "CO",
        elements: &[("C", 1), ("O", 1)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    3.57953347E+00,
                    -6.10353680E-04,
                    1.01681433E-06,
                    9.07005884E-10,
                    -9.04424499E-13,
                    -1.43440860E+04,
                    3.50840928E+00,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    2.71518561E+00,
                    2.06252743E-03,
                    -9.98825771E-07,
                    2.30053008E-10,
                    -2.03647716E-14,
                    -1.41518724E+04,
                    7.81868772E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "OH",
        elements: &[("O", 1), ("H", 1)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    3.99201543E+00,
                    -2.40131752E-03,
                    4.61793841E-06,
                    -3.88113333E-09,
                    1.36411470E-12,
                    3.61508056E+03,
                    -1.03925458E-01,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    3.09288767E+00,
                    5.48429716E-04,
                    1.26505228E-07,
                    -8.79461556E-11,
                    1.17412376E-14,
                    3.85865700E+03,
                    4.47669610E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "O",
        elements: &[("O", 1)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    3.16826710E+00,
                    -3.27931884E-03,
                    6.64306396E-06,
                    -6.12806624E-09,
                    2.11265971E-12,
                    2.91222592E+04,
                    2.05193346E+00,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    2.56942078E+00,
                    -8.59741137E-05,
                    4.19484589E-08,
                    -1.00177799E-11,
                    1.22833691E-15,
                    2.92175791E+04,
                    4.78433864E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "H",
        elements: &[("H", 1)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    2.50000000E+00,
                    7.05332819E-13,
                    -1.99591964E-15,
                    2.30081632E-18,
                    -9.27732332E-22,
                    2.54736599E+04,
                    -4.46682853E-01,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    2.50000001E+00,
                    -2.30842973E-11,
                    1.61561948E-14,
                    -4.73515235E-18,
                    4.98197357E-22,
                    2.54736599E+04,
                    -4.46682914E-01,
                ],
            ),
        ],
    },
    Entry {
        name: "NO",
        elements: &[("N", 1), ("O", 1)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    4.21847630E+00,
                    -4.63897600E-03,
                    1.10410220E-05,
                    -9.33613540E-09,
                    2.80357700E-12,
                    9.84462300E+03,
                    2.28084640E+00,
                ],
            ),
            (
                1000.0,
                6000.0,
                [
                    3.26060560E+00,
                    1.19110430E-03,
                    -4.29170480E-07,
                    6.94576690E-11,
                    -4.03360990E-15,
                    9.92097460E+03,
                    6.36930270E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "H2",
        elements: &[("H", 2)],
        tag: GAS,
        segments: &[
            (
                200.0,
                1000.0,
                [
                    2.34433112E+00,
                    7.98052075E-03,
                    -1.94781510E-05,
                    2.01572094E-08,
                    -7.37611761E-12,
                    -9.17935173E+02,
                    6.83010238E-01,
                ],
            ),
            (
                1000.0,
                3500.0,
                [
                    3.33727920E+00,
                    -4.94024731E-05,
                    4.99456778E-07,
                    -1.79566394E-10,
                    2.00255376E-14,
                    -9.50158922E+02,
                    -3.20502331E+00,
                ],
            ),
        ],
    },
    Entry {
        name: "Ar",
        elements: &[("Ar", 1)],
        tag: GAS,
        segments: &[(
            200.0,
            6000.0,
            [2.5, 0.0, 0.0, 0.0, 0.0, -7.45375000E+02, 4.37967491E+00],
        )],
    },
];

/// Build the built-in species entries, one per species name with every phase
/// tag attached.
pub(crate) fn builtin_species() -> ThermoResult<Vec<SpeciesData>> {
    let mut out: Vec<SpeciesData> = Vec::new();
    for entry in DATA {
        let correlation = Nasa7::new(
            entry
                .segments
                .iter()
                .map(|(t_min, t_max, coeffs)| Nasa7Segment::new(*t_min, *t_max, *coeffs))
                .collect(),
        )?;
        match out.iter_mut().find(|s| s.name() == entry.name) {
            Some(existing) => {
                let updated = existing.clone().with_phase(entry.tag, correlation);
                *existing = updated;
            }
            None => {
                let data = SpeciesData::new(entry.name, entry.elements.iter().copied())?
                    .with_phase(entry.tag, correlation);
                out.push(data);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_has_both_phases() {
        let all = builtin_species().unwrap();
        let water = all.iter().find(|s| s.name() == "H2O").unwrap();
        assert!(water.phase(GAS).is_some());
        assert!(water.phase(LIQUID).is_some());
    }

    #[test]
    fn names_are_unique() {
        let all = builtin_species().unwrap();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
