//! Apparent geocentric places of the Sun and of the planets from the VSOP87 store.
//!
//! Both pipelines end in the true equator and equinox of date: FK5 correction, nutation in
//! longitude, then ecliptic → equatorial with the true obliquity.

use log::warn;
use nalgebra::Vector3;

use crate::{
    celnav_errors::CelnavError,
    constants::{AstronomicalUnit, JulianDay, Radian, DPI, LIGHT_TIME_DAYS_PER_AU, RADSEC},
    earth_orientation::EarthOrientation,
    ephemeris::{EphemerisStore, VsopBody},
    ref_system::{
        aberration_low, ecl_to_equ, rotmt, spherical, unit_vector, vsop_to_fk5, Axis,
    },
};

/// Apparent right ascension and declination of date with the body distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentPlace {
    pub ra: Radian,
    pub dec: Radian,
    /// Sun: Earth–Sun distance. Planets: geocentric distance at the emission time.
    pub distance: AstronomicalUnit,
}

/// Iteration budget of the light-time loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTime {
    pub max_iter: usize,
    /// Threshold on the change of geocentric longitude between two iterations
    pub tolerance: Radian,
}

impl Default for LightTime {
    fn default() -> Self {
        LightTime {
            max_iter: 20,
            tolerance: DPI / 86_400.0,
        }
    }
}

/// Signed difference `b − a` reduced to (−π, π].
#[inline]
fn diff_angle(a: Radian, b: Radian) -> Radian {
    let x = (b - a).rem_euclid(DPI);
    if x > std::f64::consts::PI {
        x - DPI
    } else {
        x
    }
}

/// Spherical (l, b, r) → rectangular.
#[inline]
fn rectangular(l: Radian, b: Radian, r: f64) -> Vector3<f64> {
    unit_vector(l, b) * r
}

/// Apparent place of the Sun at `jde`.
///
/// Arguments
/// ---------
/// * `store`: VSOP87 series.
/// * `jde`: Julian Ephemeris Day.
/// * `orientation`: nutation and obliquity at `jde`.
///
/// Return
/// ------
/// * The apparent place, `distance` being the radius vector of the Earth in AU.
pub fn apparent_sun(
    store: &EphemerisStore,
    jde: JulianDay,
    orientation: &EarthOrientation,
) -> Result<ApparentPlace, CelnavError> {
    let (l, b, r) = store.dimension3(jde, VsopBody::Earth)?;

    let (l, b) = vsop_to_fk5(jde, (l + std::f64::consts::PI).rem_euclid(DPI), -b);
    let l = l + orientation.delta_psi + aberration_low(r);
    let (ra, dec) = ecl_to_equ(l, b, orientation.true_obliquity);

    Ok(ApparentPlace {
        ra,
        dec,
        distance: r,
    })
}

/// Heliocentric position of the Earth, equatorial frame, in AU.
///
/// Used for the annual parallax of stars, where the sub-arcsecond frame differences between
/// the ecliptic of date and J2000 do not matter.
pub fn earth_heliocentric_equatorial(
    store: &EphemerisStore,
    jde: JulianDay,
    orientation: &EarthOrientation,
) -> Result<Vector3<f64>, CelnavError> {
    let (l, b, r) = store.dimension3(jde, VsopBody::Earth)?;
    Ok(rotmt(orientation.mean_obliquity, Axis::X) * rectangular(l, b, r))
}

/// Displace the centre of Venus towards its centre of light.
///
/// The photocentre of a partially lit disk lies on the sunward side of the geometric centre.
/// The shift is `8·s·(1 − k)/(3π)`, `s` the apparent semi-diameter (8.41″ at 1 AU) and `k`
/// the illuminated fraction, along the direction of the Sun projected on the sky.
///
/// Arguments
/// ---------
/// * `planet`: geocentric (l, b, r) of Venus.
/// * `sun`: geocentric (l, b, r) of the Sun.
fn venus_phase_correction(
    planet: (Radian, Radian, f64),
    sun: (Radian, Radian, f64),
) -> (Radian, Radian, f64) {
    let (p_l, p_b, p_r) = planet;
    let (s_l, s_b, s_r) = sun;

    let s = rectangular(s_l, s_b, s_r);
    let p = rectangular(p_l, p_b, p_r);

    let sun_to_planet = p - s;
    let sp_dist = sun_to_planet.norm();
    let u_sp = sun_to_planet / sp_dist;
    let u_ep = p / p_r;

    // component of the Sun→Venus direction across the line of sight
    let across = (u_ep * u_sp.dot(&u_ep) - u_sp).normalize();

    let k = ((sp_dist + p_r).powi(2) - s_r * s_r) / (4.0 * sp_dist * p_r);
    let semi_diameter = 8.41 * RADSEC / p_r;
    let shift = 8.0 * semi_diameter * (1.0 - k) / (3.0 * std::f64::consts::PI);

    let corrected = (u_ep + across * shift) * p_r;
    let (l, b) = spherical(&corrected);
    (l, b, corrected.norm())
}

/// Apparent place of a planet at `jde`.
///
/// The geocentric position is iterated on the emission time `t = jde − τ`, with both the
/// planet and the Earth evaluated at `t`. Using the retarded Earth folds the annual
/// aberration into the light-time solution, so no separate aberration term is applied.
///
/// Arguments
/// ---------
/// * `store`: VSOP87 series.
/// * `jde`: Julian Ephemeris Day of observation.
/// * `planet`: target, one of the five naked-eye planets.
/// * `orientation`: nutation and obliquity at `jde`.
/// * `light_time`: iteration budget.
///
/// Return
/// ------
/// * The apparent place, `distance` being the geocentric distance in AU.
/// * [`CelnavError::ConvergenceFailure`] when the geocentric longitude is still moving after
///   `light_time.max_iter` iterations.
pub fn geocentric_planet(
    store: &EphemerisStore,
    jde: JulianDay,
    planet: VsopBody,
    orientation: &EarthOrientation,
    light_time: &LightTime,
) -> Result<ApparentPlace, CelnavError> {
    let mut t = jde;
    let mut previous_l: Option<Radian> = None;
    let mut solution = None;

    for _ in 0..light_time.max_iter {
        let (l0, b0, r0) = store.dimension3(t, VsopBody::Earth)?;
        let (l, b, r) = store.dimension3(t, planet)?;

        let geo = rectangular(l, b, r) - rectangular(l0, b0, r0);
        let (p_l, p_b) = spherical(&geo);
        let p_r = geo.norm();

        let converged = previous_l
            .is_some_and(|prev| diff_angle(p_l, prev).abs() < light_time.tolerance);
        if converged {
            let sun = ((l0 + std::f64::consts::PI).rem_euclid(DPI), -b0, r0);
            solution = Some(((p_l, p_b, p_r), sun));
            break;
        }

        previous_l = Some(p_l);
        t = jde - LIGHT_TIME_DAYS_PER_AU * p_r;
    }

    let Some((mut geocentric, sun)) = solution else {
        warn!(
            "Light-time iteration for {planet} did not converge after {} iterations",
            light_time.max_iter
        );
        return Err(CelnavError::ConvergenceFailure {
            body: planet.to_string(),
            iterations: light_time.max_iter,
        });
    };

    if planet == VsopBody::Venus {
        geocentric = venus_phase_correction(geocentric, sun);
    }

    let (p_l, p_b, p_r) = geocentric;
    let (l, b) = vsop_to_fk5(jde, p_l, p_b);
    let (ra, dec) = ecl_to_equ(l + orientation.delta_psi, b, orientation.true_obliquity);

    Ok(ApparentPlace {
        ra,
        dec,
        distance: p_r,
    })
}
