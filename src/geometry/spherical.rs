//! Spherical-trigonometry helpers on the unit sphere, all in degrees.
//!
//! * [`distance_point`] – direct problem: point at a given altitude along a bearing.
//! * [`altitude_azimuth`] – altitude and azimuth of a sub-point seen from an observer.
//! * [`back_bearing`] / [`central_angle`] – used by the bearing solver.

use crate::constants::{Degree, RADEG};

use super::GeoPoint;

/// Reduce an angle to (−180, 180].
#[inline]
pub fn resolve_heading(heading: Degree) -> Degree {
    let h = resolve_heading_positive(heading);
    if h > 180.0 {
        h - 360.0
    } else {
        h
    }
}

/// Reduce an angle to [0, 360).
#[inline]
pub fn resolve_heading_positive(heading: Degree) -> Degree {
    let h = heading.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to 360
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Point seen at altitude `altitude` from `(lat, lon)` in direction `trace`.
///
/// Equivalently, the point at angular distance `90° − altitude` along the initial bearing
/// `trace`. The returned longitude is not reduced.
///
/// Arguments
/// ---------
/// * `altitude`: altitude of the origin above the horizon of the returned point, degrees.
/// * `trace`: initial bearing from the origin, degrees.
/// * `lat`, `lon`: origin, degrees.
pub fn distance_point(altitude: Degree, trace: Degree, lat: Degree, lon: Degree) -> GeoPoint {
    let dang = (90.0 - altitude) * RADEG;
    let (lat, lon, trace) = (lat * RADEG, lon * RADEG, trace * RADEG);

    let rlat = (lat.sin() * dang.cos() + lat.cos() * dang.sin() * trace.cos()).asin();
    let rlon = lon
        + (trace.sin() * dang.sin() * lat.cos()).atan2(dang.cos() - lat.sin() * rlat.sin());

    GeoPoint::new(rlat / RADEG, rlon / RADEG)
}

/// Altitude and true azimuth of the sub-point `(lat2, lon2)` seen from `(lat1, lon1)`.
///
/// Return
/// ------
/// * `(hc, zn)` in degrees, `zn` measured from north.
pub fn altitude_azimuth(lat1: Degree, lon1: Degree, lat2: Degree, lon2: Degree) -> (Degree, Degree) {
    let lha = resolve_heading_positive(lon1 - lon2);
    let (lat1, lat2) = (lat1 * RADEG, lat2 * RADEG);
    let lha_r = lha * RADEG;

    let sin_hc = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * lha_r.cos();
    let hc = sin_hc.clamp(-1.0, 1.0).asin();

    let cos_z = (lat2.sin() - lat1.sin() * hc.sin()) / (lat1.cos() * hc.cos());
    let z = cos_z.clamp(-1.0, 1.0).acos() / RADEG;

    let zn = if lha < 180.0 { 360.0 - z } else { z };
    (hc / RADEG, zn)
}

/// Initial bearing from `to` back towards `from`, in (−180, 180].
pub fn back_bearing(from: GeoPoint, to: GeoPoint) -> Degree {
    let (lat, lon) = (from.lat * RADEG, from.lon * RADEG);
    let (rlat, rlon) = (to.lat * RADEG, to.lon * RADEG);
    let b = ((lon - rlon).sin() * lat.cos())
        .atan2(rlat.cos() * lat.sin() - rlat.sin() * lat.cos() * (lon - rlon).cos());
    b / RADEG
}

/// Angular distance between two points, degrees.
pub fn central_angle(a: GeoPoint, b: GeoPoint) -> Degree {
    let (la, lb) = (a.lat * RADEG, b.lat * RADEG);
    let c = la.sin() * lb.sin() + la.cos() * lb.cos() * ((b.lon - a.lon) * RADEG).cos();
    c.clamp(-1.0, 1.0).acos() / RADEG
}
