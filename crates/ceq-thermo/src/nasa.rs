//! NASA 7-coefficient heat capacity correlations.
//!
//! Each segment covers `[t_min, t_max]` and stores `a1..a7`:
//!
//! - `Cp/R   = a1 + a2 T + a3 T² + a4 T³ + a5 T⁴`
//! - `H/(RT) = a1 + a2 T/2 + a3 T²/3 + a4 T³/4 + a5 T⁴/5 + a6/T`
//! - `S/R    = a1 ln T + a2 T + a3 T²/2 + a4 T³/3 + a5 T⁴/4 + a7`
//!
//! Enthalpy and entropy are the closed-form integrals of the heat capacity
//! polynomial; `a6` and `a7` carry the reference enthalpy and entropy.

use crate::error::{ThermoError, ThermoResult};
use serde::{Deserialize, Serialize};

/// One temperature interval of a NASA-7 correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nasa7Segment {
    /// Lower bound of validity [K].
    pub t_min: f64,
    /// Upper bound of validity [K].
    pub t_max: f64,
    /// Coefficients `a1..a7`.
    pub coeffs: [f64; 7],
}

impl Nasa7Segment {
    pub fn new(t_min: f64, t_max: f64, coeffs: [f64; 7]) -> Self {
        Self {
            t_min,
            t_max,
            coeffs,
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.t_min && t <= self.t_max
    }

    /// Dimensionless heat capacity Cp/R.
    pub fn cp_over_r(&self, t: f64) -> f64 {
        let a = &self.coeffs;
        a[0] + t * (a[1] + t * (a[2] + t * (a[3] + t * a[4])))
    }

    /// Temperature slope of Cp/R [1/K].
    pub fn dcp_over_r_dt(&self, t: f64) -> f64 {
        let a = &self.coeffs;
        a[1] + t * (2.0 * a[2] + t * (3.0 * a[3] + t * 4.0 * a[4]))
    }

    /// Dimensionless enthalpy H/(RT).
    pub fn h_over_rt(&self, t: f64) -> f64 {
        let a = &self.coeffs;
        a[0] + t * (a[1] / 2.0 + t * (a[2] / 3.0 + t * (a[3] / 4.0 + t * a[4] / 5.0))) + a[5] / t
    }

    /// Dimensionless entropy S/R at the standard pressure.
    pub fn s_over_r(&self, t: f64) -> f64 {
        let a = &self.coeffs;
        a[0] * t.ln() + t * (a[1] + t * (a[2] / 2.0 + t * (a[3] / 3.0 + t * a[4] / 4.0))) + a[6]
    }
}

/// Behaviour for temperatures outside every segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Report an out-of-range lookup error.
    #[default]
    Strict,
    /// Evaluate the nearest segment beyond its bounds.
    Extrapolate,
}

/// Mismatch of adjacent segments at an internal boundary (dimensionless).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryGap {
    pub t: f64,
    pub cp_over_r: f64,
    pub h_over_rt: f64,
    pub s_over_r: f64,
}

impl BoundaryGap {
    pub fn max_abs(&self) -> f64 {
        self.cp_over_r
            .abs()
            .max(self.h_over_rt.abs())
            .max(self.s_over_r.abs())
    }
}

/// A piecewise NASA-7 correlation over contiguous, non-overlapping segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Nasa7Segment>", into = "Vec<Nasa7Segment>")]
pub struct Nasa7 {
    segments: Vec<Nasa7Segment>,
}

impl Nasa7 {
    /// Build a correlation, checking ordering, contiguity and finiteness.
    pub fn new(segments: Vec<Nasa7Segment>) -> ThermoResult<Self> {
        if segments.is_empty() {
            return Err(ThermoError::InvalidData {
                what: "correlation has no segments".to_string(),
            });
        }
        for seg in &segments {
            if !seg.t_min.is_finite() || !seg.t_max.is_finite() || seg.t_min <= 0.0 {
                return Err(ThermoError::InvalidData {
                    what: format!("segment bounds [{}, {}] K", seg.t_min, seg.t_max),
                });
            }
            if seg.t_min >= seg.t_max {
                return Err(ThermoError::InvalidData {
                    what: format!("empty segment [{}, {}] K", seg.t_min, seg.t_max),
                });
            }
            if seg.coeffs.iter().any(|c| !c.is_finite()) {
                return Err(ThermoError::InvalidData {
                    what: format!("non-finite coefficient in [{}, {}] K", seg.t_min, seg.t_max),
                });
            }
        }
        for pair in segments.windows(2) {
            if pair[0].t_max != pair[1].t_min {
                return Err(ThermoError::InvalidData {
                    what: format!(
                        "segments not contiguous: [{}, {}] then [{}, {}] K",
                        pair[0].t_min, pair[0].t_max, pair[1].t_min, pair[1].t_max
                    ),
                });
            }
        }
        Ok(Self { segments })
    }

    /// Two-segment correlation split at `t_mid` (the usual NASA layout).
    pub fn two_range(
        t_min: f64,
        t_mid: f64,
        t_max: f64,
        low: [f64; 7],
        high: [f64; 7],
    ) -> ThermoResult<Self> {
        Self::new(vec![
            Nasa7Segment::new(t_min, t_mid, low),
            Nasa7Segment::new(t_mid, t_max, high),
        ])
    }

    pub fn segments(&self) -> &[Nasa7Segment] {
        &self.segments
    }

    /// Covered temperature interval `(t_min, t_max)` [K].
    pub fn range(&self) -> (f64, f64) {
        let first = &self.segments[0];
        let last = &self.segments[self.segments.len() - 1];
        (first.t_min, last.t_max)
    }

    /// Segment used at `t`; a shared boundary belongs to the lower segment.
    ///
    /// Returns `None` outside the covered range under [`RangePolicy::Strict`].
    pub fn segment(&self, t: f64, policy: RangePolicy) -> Option<&Nasa7Segment> {
        if let Some(seg) = self.segments.iter().find(|s| s.contains(t)) {
            return Some(seg);
        }
        match policy {
            RangePolicy::Strict => None,
            RangePolicy::Extrapolate => {
                let (t_min, _) = self.range();
                if t < t_min {
                    self.segments.first()
                } else {
                    self.segments.last()
                }
            }
        }
    }

    /// Gaps in Cp/R, H/(RT) and S/R at every internal boundary.
    pub fn boundary_gaps(&self) -> Vec<BoundaryGap> {
        self.segments
            .windows(2)
            .map(|pair| {
                let t = pair[0].t_max;
                BoundaryGap {
                    t,
                    cp_over_r: pair[1].cp_over_r(t) - pair[0].cp_over_r(t),
                    h_over_rt: pair[1].h_over_rt(t) - pair[0].h_over_rt(t),
                    s_over_r: pair[1].s_over_r(t) - pair[0].s_over_r(t),
                }
            })
            .collect()
    }
}

impl TryFrom<Vec<Nasa7Segment>> for Nasa7 {
    type Error = ThermoError;

    fn try_from(segments: Vec<Nasa7Segment>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<Nasa7> for Vec<Nasa7Segment> {
    fn from(n: Nasa7) -> Self {
        n.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Constant Cp = 3.5 R with zero reference constants.
    fn diatomic() -> Nasa7Segment {
        Nasa7Segment::new(200.0, 1000.0, [3.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn constant_cp_closed_forms() {
        let seg = diatomic();
        assert_eq!(seg.cp_over_r(500.0), 3.5);
        assert_eq!(seg.dcp_over_r_dt(500.0), 0.0);
        assert!((seg.h_over_rt(500.0) - 3.5).abs() < 1e-12);
        assert!((seg.s_over_r(500.0) - 3.5 * 500.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn enthalpy_derivative_matches_cp() {
        let seg = Nasa7Segment::new(
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
        );
        let t = 640.0;
        let dt = 1e-3;
        let h = |t: f64| seg.h_over_rt(t) * t;
        let dh = (h(t + dt) - h(t - dt)) / (2.0 * dt);
        assert!((dh - seg.cp_over_r(t)).abs() < 1e-6);

        let ds = (seg.s_over_r(t + dt) - seg.s_over_r(t - dt)) / (2.0 * dt);
        assert!((ds - seg.cp_over_r(t) / t).abs() < 1e-8);

        let dcp = (seg.cp_over_r(t + dt) - seg.cp_over_r(t - dt)) / (2.0 * dt);
        assert!((dcp - seg.dcp_over_r_dt(t)).abs() < 1e-9);
    }

    #[test]
    fn rejects_gap_between_segments() {
        let err = Nasa7::new(vec![
            Nasa7Segment::new(200.0, 1000.0, [3.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            Nasa7Segment::new(1100.0, 3000.0, [3.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, ThermoError::InvalidData { .. }));
    }

    #[test]
    fn rejects_empty_and_inverted() {
        assert!(Nasa7::new(vec![]).is_err());
        assert!(
            Nasa7::new(vec![Nasa7Segment::new(
                500.0,
                300.0,
                [3.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
            )])
            .is_err()
        );
    }

    #[test]
    fn boundary_belongs_to_lower_segment() {
        let low = [3.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let high = [4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let n = Nasa7::two_range(200.0, 1000.0, 3000.0, low, high).unwrap();
        let seg = n.segment(1000.0, RangePolicy::Strict).unwrap();
        assert_eq!(seg.coeffs[0], 3.5);
        let seg = n.segment(1000.5, RangePolicy::Strict).unwrap();
        assert_eq!(seg.coeffs[0], 4.0);
    }

    #[test]
    fn range_policy_controls_outside_lookup() {
        let n = Nasa7::new(vec![diatomic()]).unwrap();
        assert!(n.segment(199.9, RangePolicy::Strict).is_none());
        assert!(n.segment(1000.1, RangePolicy::Strict).is_none());
        assert!(n.segment(150.0, RangePolicy::Extrapolate).is_some());
        assert!(n.segment(5000.0, RangePolicy::Extrapolate).is_some());
    }

    #[test]
    fn serde_rejects_invalid_segments() {
        let json = r#"[{"t_min": 300.0, "t_max": 200.0, "coeffs": [3.5,0,0,0,0,0,0]}]"#;
        assert!(serde_json::from_str::<Nasa7>(json).is_err());

        let json = r#"[{"t_min": 200.0, "t_max": 300.0, "coeffs": [3.5,0,0,0,0,0,0]}]"#;
        let n: Nasa7 = serde_json::from_str(json).unwrap();
        assert_eq!(n.range(), (200.0, 300.0));
    }

    #[test]
    fn gaps_are_zero_for_identical_segments() {
        let a = [3.5, 1e-4, 0.0, 0.0, 0.0, -1000.0, 4.0];
        let n = Nasa7::two_range(200.0, 1000.0, 3000.0, a, a).unwrap();
        let gaps = n.boundary_gaps();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].max_abs(), 0.0);
    }
}
