//! Unit constants. Lengths are expressed in millimetres, energies in MeV,
//! times in nanoseconds and angles in radians, so `10.0 * CM` is a plain
//! `f64` the engine interprets directly.

/// Millimetre (base length unit).
pub const MM: f64 = 1.0;

/// Micrometre.
pub const UM: f64 = 1.0e-3 * MM;

/// Nanometre.
pub const NM: f64 = 1.0e-6 * MM;

/// Centimetre.
pub const CM: f64 = 10.0 * MM;

/// Metre.
pub const M: f64 = 1000.0 * MM;

/// Radian (base angle unit).
pub const RAD: f64 = 1.0;

/// Degree.
pub const DEG: f64 = std::f64::consts::PI / 180.0;

/// Mega-electronvolt (base energy unit).
pub const MEV: f64 = 1.0;

/// Kilo-electronvolt.
pub const KEV: f64 = 1.0e-3 * MEV;

/// Electronvolt.
pub const EV: f64 = 1.0e-6 * MEV;

/// Giga-electronvolt.
pub const GEV: f64 = 1.0e3 * MEV;

/// Nanosecond (base time unit).
pub const NS: f64 = 1.0;

/// Second.
pub const S: f64 = 1.0e9 * NS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_units_scale() {
        assert_eq!(CM, 10.0);
        assert_eq!(M, 1000.0);
        assert!((UM * 1000.0 - MM).abs() < 1e-12);
    }

    #[test]
    fn test_degree_to_radian() {
        assert!((180.0 * DEG - std::f64::consts::PI).abs() < 1e-12);
    }
}
