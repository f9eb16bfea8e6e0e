// hv-core/src/units.rs

use uom::si::f64::{
    ElectricalResistance as UomElectricalResistance, Force as UomForce, Length as UomLength,
    Mass as UomMass,
};

// SI quantities taken by component constructors
pub type Force = UomForce;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Resistance = UomElectricalResistance;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn newton(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn ohm(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

pub mod constants {
    /// Standard gravity [m/s^2].
    pub const G0_MPS2: f64 = 9.806_65;

    /// Vacuum permeability [H/m].
    pub const MU0: f64 = 4.0e-7 * std::f64::consts::PI;
}
