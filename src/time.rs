//! # Time scales and sidereal time
//!
//! Sights are stamped in UTC; the ephemeris series run on dynamical time (TT) and the
//! Earth-rotation angle on universal time. This module provides the small set of
//! conversions needed between the two, built on [`hifitime`]:
//!
//! * [`jd_ut`] – Julian Day of an epoch in UTC (used as UT1, the difference is below 0.9 s),
//! * [`jde_tt`] – Julian Ephemeris Day of an epoch in TT,
//! * [`delta_t_seconds`] – ΔT = TT − UT,
//! * [`gmst_deg`] / [`gast_deg`] – mean and apparent Greenwich sidereal time,
//! * [`parse_utc`] / [`format_utc`] – ISO date/time helpers used by persistence and traces,
//! * [`to_sdmm`] – navigator's sexagesimal notation (`N 40° 12.3456'`).

use std::str::FromStr;

use hifitime::{Duration, Epoch};

use crate::{
    celnav_errors::CelnavError,
    constants::{Degree, JulianDay, Seconds, DAYS_PER_CENTURY, J2000, SECONDS_PER_DAY},
    earth_orientation::EarthOrientation,
};

/// Julian Day of `epoch` in the UTC scale.
#[inline]
pub fn jd_ut(epoch: Epoch) -> JulianDay {
    epoch.to_jde_utc_days()
}

/// Julian Ephemeris Day of `epoch` in the TT scale.
#[inline]
pub fn jde_tt(epoch: Epoch) -> JulianDay {
    epoch.to_jde_tt_days()
}

/// ΔT = TT − UTC in seconds at `epoch` (leap seconds + 32.184 s).
pub fn delta_t_seconds(epoch: Epoch) -> Seconds {
    (epoch.to_jde_tt_days() - epoch.to_jde_utc_days()) * SECONDS_PER_DAY
}

/// Shift an epoch by a signed number of seconds.
#[inline]
pub fn shift_seconds(epoch: Epoch, seconds: Seconds) -> Epoch {
    epoch + Duration::from_seconds(seconds)
}

/// Greenwich Mean Sidereal Time in degrees, normalized to [0, 360).
///
/// Arguments
/// ---------
/// * `jd_ut`: Julian Day in universal time.
///
/// Formula
/// -------
/// ```text
/// θ₀ = 280.46061837° + 360.98564736629°·(JD − 2451545.0) + 0.000387933°·T² − T³/38710000
/// ```
/// with `T` in Julian centuries of UT since J2000.0.
pub fn gmst_deg(jd_ut: JulianDay) -> Degree {
    let d = jd_ut - J2000;
    let t = d / DAYS_PER_CENTURY;

    let theta = 280.46061837 + 360.98564736629 * d + 0.000387933 * t * t - t * t * t / 38_710_000.0;
    theta.rem_euclid(360.0)
}

/// Greenwich Apparent Sidereal Time in degrees: GMST plus the equation of the equinoxes.
///
/// Arguments
/// ---------
/// * `jd_ut`: Julian Day in universal time.
/// * `orientation`: nutation and obliquity evaluated at the matching dynamical time.
///
/// The result is not reduced, so that `RA − GAST` keeps the continuity of the mean term.
pub fn gast_deg(jd_ut: JulianDay, orientation: &EarthOrientation) -> Degree {
    gmst_deg(jd_ut) + orientation.equation_of_equinoxes().to_degrees()
}

/// Build an UTC epoch from an ISO date (`YYYY-MM-DD`) and time (`HH:MM:SS[.fffffffff]`).
///
/// Return
/// ------
/// * The epoch, or [`CelnavError::InvalidEpoch`] when either part is malformed.
pub fn parse_utc(date: &str, time: &str) -> Result<Epoch, CelnavError> {
    let time = time.trim();
    let (whole, fraction) = match time.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (time, None),
    };
    let iso = format!("{}T{whole} UTC", date.trim());
    let epoch =
        Epoch::from_str(&iso).map_err(|e| CelnavError::InvalidEpoch(format!("{iso}: {e}")))?;

    match fraction {
        None => Ok(epoch),
        Some(digits) => {
            let nanos = fraction_nanos(digits).ok_or_else(|| {
                CelnavError::InvalidEpoch(format!("{date} {time}: bad fraction of second"))
            })?;
            Ok(epoch + Duration::from_total_nanoseconds(nanos.into()))
        }
    }
}

/// `"25"` → 250 000 000 ns. At most nine digits.
fn fraction_nanos(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    Some(value * 10u32.pow(9 - digits.len() as u32))
}

/// Split an epoch into ISO date (`YYYY-MM-DD`) and time (`HH:MM:SS`) in UTC.
///
/// Sub-second parts are written as a decimal fraction without trailing zeros, so that
/// [`parse_utc`] gives back the same epoch.
pub fn format_utc(epoch: Epoch) -> (String, String) {
    let (y, mo, d, h, mi, s, ns) = epoch.to_gregorian_utc();
    let mut time = format!("{h:02}:{mi:02}:{s:02}");
    if ns != 0 {
        let fraction = format!("{ns:09}");
        time.push('.');
        time.push_str(fraction.trim_end_matches('0'));
    }
    (format!("{y:04}-{mo:02}-{d:02}"), time)
}

/// Flavour of sexagesimal output produced by [`to_sdmm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleFormat {
    /// Signed plain angle, e.g. `-2° 03.2000'`
    Plain,
    /// Latitude with hemisphere prefix, e.g. `S 18° 15.2300'`
    Latitude,
    /// Longitude with hemisphere prefix, e.g. `W 140° 00.0000'`
    Longitude,
}

/// Format an angle in degrees and decimal minutes.
///
/// Arguments
/// ---------
/// * `format`: plain, latitude (`N`/`S`) or longitude (`E`/`W`).
/// * `value`: angle in degrees.
///
/// Return
/// ------
/// * A string with four decimals on the minutes, as printed in the calculation trace.
pub fn to_sdmm(format: AngleFormat, value: Degree) -> String {
    let negative = value < 0.0;
    let abs = value.abs();
    let mut deg = abs.trunc();
    let mut min = (abs - deg) * 60.0;
    // 59.99995' would print as 60.0000'
    if min >= 59.99995 {
        deg += 1.0;
        min = 0.0;
    }

    match format {
        AngleFormat::Plain => {
            let sign = if negative { "-" } else { "" };
            format!("{sign}{deg:.0}° {min:07.4}'")
        }
        AngleFormat::Latitude => {
            let h = if negative { 'S' } else { 'N' };
            format!("{h} {deg:02.0}° {min:07.4}'")
        }
        AngleFormat::Longitude => {
            let h = if negative { 'W' } else { 'E' };
            format!("{h} {deg:03.0}° {min:07.4}'")
        }
    }
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_jd_ut() {
        let epoch = parse_utc("2021-01-01", "00:00:00").unwrap();
        assert_relative_eq!(jd_ut(epoch), 2459215.5, epsilon = 1e-9);
    }

    #[test]
    fn test_delta_t_after_2017() {
        let epoch = parse_utc("2025-01-17", "15:28:24").unwrap();
        assert_relative_eq!(delta_t_seconds(epoch), 69.184, epsilon = 1e-5);
        assert_relative_eq!(
            jde_tt(epoch) - jd_ut(epoch),
            69.184 / SECONDS_PER_DAY,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_shift_seconds() {
        let epoch = parse_utc("2024-11-13", "20:17:45").unwrap();
        let later = shift_seconds(epoch, 75.0);
        assert_eq!(format_utc(later).1, "20:19:00");
        let earlier = shift_seconds(epoch, -45.0);
        assert_eq!(format_utc(earlier).1, "20:17:00");
    }

    /// 1987 April 10, 0h UT: θ₀ = 13h10m46.3668s = 197.693195°
    #[test]
    fn test_gmst_meeus_12a() {
        assert_relative_eq!(gmst_deg(2_446_895.5), 197.693195, epsilon = 1e-6);
    }

    /// 1987 April 10, 19h21m00s UT: θ₀ = 128.737873°
    #[test]
    fn test_gmst_meeus_12b() {
        assert_relative_eq!(gmst_deg(2_446_896.30625), 128.737873, epsilon = 1e-5);
    }

    #[test]
    fn test_gast_adds_equation_of_equinoxes() {
        let jd = 2_446_895.5;
        let eo = EarthOrientation::at(jd);
        let gast = gast_deg(jd, &eo);
        // Δψ = −3.788″, ε = 23.4436° → −0.2317 s of time
        assert_relative_eq!((gast - gmst_deg(jd)) * 3600.0 / 15.0, -0.2317, epsilon = 2e-3);
    }

    #[test]
    fn test_parse_and_format_round_trip() {
        let epoch = parse_utc("2025-08-18", "11:58:00").unwrap();
        let (date, time) = format_utc(epoch);
        assert_eq!(date, "2025-08-18");
        assert_eq!(time, "11:58:00");
    }

    #[test]
    fn test_sub_second_round_trip() {
        let epoch = shift_seconds(parse_utc("2024-11-13", "20:17:45").unwrap(), 0.25);
        let (date, time) = format_utc(epoch);
        assert_eq!(time, "20:17:45.25");
        assert_eq!(parse_utc(&date, &time).unwrap(), epoch);

        let epoch = parse_utc("2024-11-13", "20:17:45.000000001").unwrap();
        assert_eq!(format_utc(epoch).1, "20:17:45.000000001");
    }

    #[test]
    fn test_fraction_nanos() {
        assert_eq!(fraction_nanos("5"), Some(500_000_000));
        assert_eq!(fraction_nanos("123456789"), Some(123_456_789));
        assert_eq!(fraction_nanos(""), None);
        assert_eq!(fraction_nanos("1234567890"), None);
        assert_eq!(fraction_nanos("-5"), None);
        assert!(matches!(
            parse_utc("2024-11-13", "20:17:45.x"),
            Err(CelnavError::InvalidEpoch(_))
        ));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_utc("2025-13-45", "11:58:00"),
            Err(CelnavError::InvalidEpoch(_))
        ));
    }

    #[test]
    fn test_to_sdmm() {
        assert_eq!(to_sdmm(AngleFormat::Plain, 128.340599), "128° 20.4359'");
        assert_eq!(to_sdmm(AngleFormat::Latitude, -18.25383), "S 18° 15.2298'");
        assert_eq!(to_sdmm(AngleFormat::Longitude, -140.0), "W 140° 00.0000'");
        assert_eq!(to_sdmm(AngleFormat::Plain, -0.0533333), "-0° 03.2000'");
    }
}
