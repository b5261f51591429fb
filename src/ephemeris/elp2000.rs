//! Geocentric ecliptic position of the Moon.
//!
//! Truncated ELP-2000/82 theory as tabulated by Meeus (ch. 47): 60 terms in longitude,
//! 60 in latitude, plus the additive Venus, Jupiter and flattening terms. The distance part
//! of the theory lives in [`crate::moon_distance`].

use crate::{
    constants::{JulianDay, Kilometer, Radian, DPI, RADEG},
    moon_distance::{distance_from_arguments, LunarArguments},
};

/// Multipliers of (D, M, M′, F) and the Σl coefficient in units of 1e-6 degree.
const LONGITUDE_TERMS: [(i8, i8, i8, i8, f64); 60] = [
    (0, 0, 1, 0, 6288774.0),
    (2, 0, -1, 0, 1274027.0),
    (2, 0, 0, 0, 658314.0),
    (0, 0, 2, 0, 213618.0),
    (0, 1, 0, 0, -185116.0),
    (0, 0, 0, 2, -114332.0),
    (2, 0, -2, 0, 58793.0),
    (2, -1, -1, 0, 57066.0),
    (2, 0, 1, 0, 53322.0),
    (2, -1, 0, 0, 45758.0),
    (0, 1, -1, 0, -40923.0),
    (1, 0, 0, 0, -34720.0),
    (0, 1, 1, 0, -30383.0),
    (2, 0, 0, -2, 15327.0),
    (0, 0, 1, 2, -12528.0),
    (0, 0, 1, -2, 10980.0),
    (4, 0, -1, 0, 10675.0),
    (0, 0, 3, 0, 10034.0),
    (4, 0, -2, 0, 8548.0),
    (2, 1, -1, 0, -7888.0),
    (2, 1, 0, 0, -6766.0),
    (1, 0, -1, 0, -5163.0),
    (1, 1, 0, 0, 4987.0),
    (2, -1, 1, 0, 4036.0),
    (2, 0, 2, 0, 3994.0),
    (4, 0, 0, 0, 3861.0),
    (2, 0, -3, 0, 3665.0),
    (0, 1, -2, 0, -2689.0),
    (2, 0, -1, 2, -2602.0),
    (2, -1, -2, 0, 2390.0),
    (1, 0, 1, 0, -2348.0),
    (2, -2, 0, 0, 2236.0),
    (0, 1, 2, 0, -2120.0),
    (0, 2, 0, 0, -2069.0),
    (2, -2, -1, 0, 2048.0),
    (2, 0, 1, -2, -1773.0),
    (2, 0, 0, 2, -1595.0),
    (4, -1, -1, 0, 1215.0),
    (0, 0, 2, 2, -1110.0),
    (3, 0, -1, 0, -892.0),
    (2, 1, 1, 0, -810.0),
    (4, -1, -2, 0, 759.0),
    (0, 2, -1, 0, -713.0),
    (2, 2, -1, 0, -700.0),
    (2, 1, -2, 0, 691.0),
    (2, -1, 0, -2, 596.0),
    (4, 0, 1, 0, 549.0),
    (0, 0, 4, 0, 537.0),
    (4, -1, 0, 0, 520.0),
    (1, 0, -2, 0, -487.0),
    (2, 1, 0, -2, -399.0),
    (0, 0, 2, -2, -381.0),
    (1, 1, 1, 0, 351.0),
    (3, 0, -2, 0, -340.0),
    (4, 0, -3, 0, 330.0),
    (2, -1, 2, 0, 327.0),
    (0, 2, 1, 0, -323.0),
    (1, 1, -1, 0, 299.0),
    (2, 0, 3, 0, 294.0),
    (2, 0, -1, -2, 0.0),
];

/// Multipliers of (D, M, M′, F) and the Σb coefficient in units of 1e-6 degree.
const LATITUDE_TERMS: [(i8, i8, i8, i8, f64); 60] = [
    (0, 0, 0, 1, 5128122.0),
    (0, 0, 1, 1, 280602.0),
    (0, 0, 1, -1, 277693.0),
    (2, 0, 0, -1, 173237.0),
    (2, 0, -1, 1, 55413.0),
    (2, 0, -1, -1, 46271.0),
    (2, 0, 0, 1, 32573.0),
    (0, 0, 2, 1, 17198.0),
    (2, 0, 1, -1, 9266.0),
    (0, 0, 2, -1, 8822.0),
    (2, -1, 0, -1, 8216.0),
    (2, 0, -2, -1, 4324.0),
    (2, 0, 1, 1, 4200.0),
    (2, 1, 0, -1, -3359.0),
    (2, -1, -1, 1, 2463.0),
    (2, -1, 0, 1, 2211.0),
    (2, -1, -1, -1, 2065.0),
    (0, 1, -1, -1, -1870.0),
    (4, 0, -1, -1, 1828.0),
    (0, 1, 0, 1, -1794.0),
    (0, 0, 0, 3, -1749.0),
    (0, 1, -1, 1, -1565.0),
    (1, 0, 0, 1, -1491.0),
    (0, 1, 1, 1, -1475.0),
    (0, 1, 1, -1, -1410.0),
    (0, 1, 0, -1, -1344.0),
    (1, 0, 0, -1, -1335.0),
    (0, 0, 3, 1, 1107.0),
    (4, 0, 0, -1, 1021.0),
    (4, 0, -1, 1, 833.0),
    (0, 0, 1, -3, 777.0),
    (4, 0, -2, 1, 671.0),
    (2, 0, 0, -3, 607.0),
    (2, 0, 2, -1, 596.0),
    (2, -1, 1, -1, 491.0),
    (2, 0, -2, 1, -451.0),
    (0, 0, 3, -1, 439.0),
    (2, 0, 2, 1, 422.0),
    (2, 0, -3, -1, 421.0),
    (2, 1, -1, 1, -366.0),
    (2, 1, 0, 1, -351.0),
    (4, 0, 0, 1, 331.0),
    (2, -1, 1, 1, 315.0),
    (2, -2, 0, -1, 302.0),
    (0, 0, 1, 3, -283.0),
    (2, 1, 1, -1, -229.0),
    (1, 1, 0, -1, 223.0),
    (1, 1, 0, 1, 223.0),
    (0, 1, -2, -1, -220.0),
    (2, 1, -1, -1, -220.0),
    (1, 0, 1, 1, -185.0),
    (2, -1, -2, -1, 181.0),
    (0, 1, 2, 1, -177.0),
    (4, 0, -2, -1, 176.0),
    (4, -1, -1, -1, 166.0),
    (1, 0, 1, -1, -164.0),
    (4, 0, 1, -1, 132.0),
    (1, 0, -1, -1, -119.0),
    (4, -1, 0, -1, 115.0),
    (2, -2, 0, 1, 107.0),
];

/// Mean-equinox-of-date geocentric position of the Moon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonEcliptic {
    /// Geometric longitude λ, referred to the mean equinox of date, in [0, 2π)
    pub longitude: Radian,
    /// Geocentric latitude β
    pub latitude: Radian,
    /// Distance between the centres of the Earth and the Moon
    pub distance: Kilometer,
}

/// Evaluate the lunar series at `jde`.
///
/// Nutation is not included: the caller adds Δψ to the longitude.
pub fn moon_ecliptic(jde: JulianDay) -> MoonEcliptic {
    let args = LunarArguments::at(jde);

    let mut sigma_l: f64 = LONGITUDE_TERMS
        .iter()
        .map(|&(d, m, mp, f, l)| {
            let (arg, e) = args.term(d, m, mp, f);
            l * e * arg.sin()
        })
        .sum();
    let mut sigma_b: f64 = LATITUDE_TERMS
        .iter()
        .map(|&(d, m, mp, f, b)| {
            let (arg, e) = args.term(d, m, mp, f);
            b * e * arg.sin()
        })
        .sum();

    let lp = args.mean_longitude;
    let mp = args.moon_anomaly;
    let f = args.argument_of_latitude;

    sigma_l += 3958.0 * args.a1.sin() + 1962.0 * (lp - f).sin() + 318.0 * args.a2.sin();
    sigma_b += -2235.0 * lp.sin()
        + 382.0 * args.a3.sin()
        + 175.0 * (args.a1 - f).sin()
        + 175.0 * (args.a1 + f).sin()
        + 127.0 * (lp - mp).sin()
        - 115.0 * (lp + mp).sin();

    MoonEcliptic {
        longitude: (lp + sigma_l * 1e-6 * RADEG).rem_euclid(DPI),
        latitude: sigma_b * 1e-6 * RADEG,
        distance: distance_from_arguments(&args),
    }
}

#[cfg(test)]
mod elp2000_test {
    use super::*;
    use approx::assert_relative_eq;

    /// 1992 April 12, 0h TD: λ = 133.162655°, β = −3.229126°, Δ = 368409.7 km
    #[test]
    fn test_moon_meeus_47a() {
        let moon = moon_ecliptic(2_448_724.5);
        assert_relative_eq!(moon.longitude.to_degrees(), 133.162655, epsilon = 1e-6);
        assert_relative_eq!(moon.latitude.to_degrees(), -3.229126, epsilon = 1e-6);
        assert_relative_eq!(moon.distance, 368_409.7, epsilon = 0.1);
    }

    #[test]
    fn test_moon_at_j2000() {
        let moon = moon_ecliptic(2_451_545.0);
        assert_relative_eq!(moon.longitude.to_degrees(), 223.318711, epsilon = 1e-5);
        assert_relative_eq!(moon.latitude.to_degrees(), 5.171280, epsilon = 1e-5);
        assert_relative_eq!(moon.distance, 402_444.81, epsilon = 0.1);
    }
}
