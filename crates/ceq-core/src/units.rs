// ceq-core/src/units.rs

use uom::si::f64::{
    Mass as UomMass, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Mass = UomMass;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Volume = UomVolume;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

pub mod constants {
    /// Molar gas constant [J/(mol·K)].
    pub const R: f64 = 8.314_462_618;

    /// Standard-state pressure of the correlation data [Pa].
    pub const P_REF_PA: f64 = 1.0e5;

    /// Reference temperature for formation data [K].
    pub const T_REF_K: f64 = 298.15;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _t = k(300.0);
        let _m = kg(0.5);
        let _v = m3(1e-3);
        assert!((bar(1.0).value - constants::P_REF_PA).abs() < 1e-9);
        assert_eq!(k(constants::T_REF_K).value, 298.15);
    }
}
