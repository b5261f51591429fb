//! # Geocentric Earth–Moon distance
//!
//! Closed-form periodic series for the distance between the centres of the Earth and the Moon
//! (Meeus, *Astronomical Algorithms*, 2nd ed., ch. 47, table 47.A, column Σr).
//!
//! The five fundamental arguments and the three additive angles are shared with the lunar
//! longitude/latitude series through [`LunarArguments`].

use crate::{
    constants::{Degree, JulianDay, Kilometer, Radian, MOON_MEAN_DISTANCE, RADEG},
    earth_orientation::julian_centuries,
};

/// Multipliers of (D, M, M′, F) and the Σr coefficient in units of 0.001 km.
const DISTANCE_TERMS: [(i8, i8, i8, i8, f64); 60] = [
    (0, 0, 1, 0, -20905355.0),
    (2, 0, -1, 0, -3699111.0),
    (2, 0, 0, 0, -2955968.0),
    (0, 0, 2, 0, -569925.0),
    (0, 1, 0, 0, 48888.0),
    (0, 0, 0, 2, -3149.0),
    (2, 0, -2, 0, 246158.0),
    (2, -1, -1, 0, -152138.0),
    (2, 0, 1, 0, -170733.0),
    (2, -1, 0, 0, -204586.0),
    (0, 1, -1, 0, -129620.0),
    (1, 0, 0, 0, 108743.0),
    (0, 1, 1, 0, 104755.0),
    (2, 0, 0, -2, 10321.0),
    (0, 0, 1, 2, 0.0),
    (0, 0, 1, -2, 79661.0),
    (4, 0, -1, 0, -34782.0),
    (0, 0, 3, 0, -23210.0),
    (4, 0, -2, 0, -21636.0),
    (2, 1, -1, 0, 24208.0),
    (2, 1, 0, 0, 30824.0),
    (1, 0, -1, 0, -8379.0),
    (1, 1, 0, 0, -16675.0),
    (2, -1, 1, 0, -12831.0),
    (2, 0, 2, 0, -10445.0),
    (4, 0, 0, 0, -11650.0),
    (2, 0, -3, 0, 14403.0),
    (0, 1, -2, 0, -7003.0),
    (2, 0, -1, 2, 0.0),
    (2, -1, -2, 0, 10056.0),
    (1, 0, 1, 0, 6322.0),
    (2, -2, 0, 0, -9884.0),
    (0, 1, 2, 0, 5751.0),
    (0, 2, 0, 0, 0.0),
    (2, -2, -1, 0, -4950.0),
    (2, 0, 1, -2, 4130.0),
    (2, 0, 0, 2, 0.0),
    (4, -1, -1, 0, -3958.0),
    (0, 0, 2, 2, 0.0),
    (3, 0, -1, 0, 3258.0),
    (2, 1, 1, 0, 2616.0),
    (4, -1, -2, 0, -1897.0),
    (0, 2, -1, 0, -2117.0),
    (2, 2, -1, 0, 2354.0),
    (2, 1, -2, 0, 0.0),
    (2, -1, 0, -2, 0.0),
    (4, 0, 1, 0, -1423.0),
    (0, 0, 4, 0, -1117.0),
    (4, -1, 0, 0, -1571.0),
    (1, 0, -2, 0, -1739.0),
    (2, 1, 0, -2, 0.0),
    (0, 0, 2, -2, -4421.0),
    (1, 1, 1, 0, 0.0),
    (3, 0, -2, 0, 0.0),
    (4, 0, -3, 0, 0.0),
    (2, -1, 2, 0, 0.0),
    (0, 2, 1, 0, 1165.0),
    (1, 1, -1, 0, 0.0),
    (2, 0, 3, 0, 0.0),
    (2, 0, -1, -2, 8752.0),
];

/// Fundamental arguments of the lunar theory at a given instant, all in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarArguments {
    /// Mean longitude of the Moon, L′
    pub mean_longitude: Radian,
    /// Mean elongation of the Moon, D
    pub elongation: Radian,
    /// Mean anomaly of the Sun, M
    pub sun_anomaly: Radian,
    /// Mean anomaly of the Moon, M′
    pub moon_anomaly: Radian,
    /// Argument of latitude of the Moon, F
    pub argument_of_latitude: Radian,
    /// Venus action, A1
    pub a1: Radian,
    /// Jupiter action, A2
    pub a2: Radian,
    /// Flattening of the Earth, A3
    pub a3: Radian,
    /// Eccentricity factor of the Earth's orbit, E
    pub eccentricity: f64,
}

#[inline]
fn poly(coefficients: &[f64], t: f64) -> Degree {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
}

#[inline]
fn reduce(angle: Degree) -> Radian {
    angle.rem_euclid(360.0) * RADEG
}

impl LunarArguments {
    /// Evaluate the arguments at `jde` (dynamical time).
    pub fn at(jde: JulianDay) -> Self {
        let t = julian_centuries(jde);

        let mean_longitude = poly(
            &[218.3164477, 481267.88123421, -0.0015786, 1.0 / 538841.0, -1.0 / 65194000.0],
            t,
        );
        let elongation = poly(
            &[297.8501921, 445267.1114034, -0.0018819, 1.0 / 545868.0, -1.0 / 113065000.0],
            t,
        );
        let sun_anomaly = poly(&[357.5291092, 35999.0502909, -0.0001536, 1.0 / 24490000.0], t);
        let moon_anomaly = poly(
            &[134.9633964, 477198.8675055, 0.0087414, 1.0 / 69699.0, -1.0 / 14712000.0],
            t,
        );
        let argument_of_latitude = poly(
            &[93.2720950, 483202.0175233, -0.0036539, -1.0 / 3526000.0, 1.0 / 863310000.0],
            t,
        );

        LunarArguments {
            mean_longitude: reduce(mean_longitude),
            elongation: reduce(elongation),
            sun_anomaly: reduce(sun_anomaly),
            moon_anomaly: reduce(moon_anomaly),
            argument_of_latitude: reduce(argument_of_latitude),
            a1: reduce(119.75 + 131.849 * t),
            a2: reduce(53.09 + 479264.290 * t),
            a3: reduce(313.45 + 481266.484 * t),
            eccentricity: 1.0 - 0.002516 * t - 0.0000074 * t * t,
        }
    }

    /// Argument `d·D + m·M + m′·M′ + f·F` of one periodic term, with the eccentricity factor
    /// `E^|m|` applied to terms depending on the Sun's anomaly.
    #[inline]
    pub fn term(&self, d: i8, m: i8, mp: i8, f: i8) -> (Radian, f64) {
        let arg = f64::from(d) * self.elongation
            + f64::from(m) * self.sun_anomaly
            + f64::from(mp) * self.moon_anomaly
            + f64::from(f) * self.argument_of_latitude;
        (arg, self.eccentricity.powi(i32::from(m.abs())))
    }
}

/// Geocentric distance of the Moon in kilometers.
///
/// Arguments
/// ---------
/// * `jde`: Julian Ephemeris Day.
///
/// Return
/// ------
/// * `385000.56 + Σr / 1000` kilometers.
///
/// See also
/// ------------
/// * [`crate::ephemeris::elp2000::moon_ecliptic`] – longitude and latitude of the same theory.
pub fn moon_distance(jde: JulianDay) -> Kilometer {
    distance_from_arguments(&LunarArguments::at(jde))
}

pub(crate) fn distance_from_arguments(args: &LunarArguments) -> Kilometer {
    let sigma_r: f64 = DISTANCE_TERMS
        .iter()
        .map(|&(d, m, mp, f, r)| {
            let (arg, e) = args.term(d, m, mp, f);
            r * e * arg.cos()
        })
        .sum();

    MOON_MEAN_DISTANCE + sigma_r / 1000.0
}
