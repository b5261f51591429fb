//! # Reference systems and apparent-place transforms
//!
//! Pure functions turning raw series output into apparent equatorial coordinates of date:
//!
//! | Function | Purpose |
//! |---|---|
//! | [`vsop_to_fk5`] | dynamical ecliptic of VSOP87 → FK5 ecliptic |
//! | [`aberration_low`] | first-order annual aberration in longitude |
//! | [`ecl_to_equ`] | ecliptic (λ, β) → equatorial (α, δ) for a given obliquity |
//! | [`proper_motion_parallax`] | space motion of a star since J2000 and annual parallax |
//! | [`frame_bias`] | ICRS → mean J2000 dynamical frame |
//! | [`precess`] | mean J2000 → mean equator and equinox of date (IAU 1976) |
//! | [`nutate`] | mean of date → true of date (IAU 1980) |
//!
//! The three rotations operate on unit vectors with [`nalgebra`] matrices assembled by
//! [`rotmt`], which follows the active (counter-clockwise) convention of
//! [`Rotation3::from_axis_angle`].

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::{
    constants::{
        AstronomicalUnit, JulianDay, Radian, AU, DPI, RADEG, RADSEC, SECONDS_PER_DAY,
    },
    earth_orientation::{julian_centuries, EarthOrientation},
};

/// Coordinate axis of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rotation matrix of angle `alpha` around `axis`.
///
/// The rotation is active: a vector is turned counter-clockwise by `alpha` when seen from the
/// tip of the axis. A change of frame by `φ` is therefore `rotmt(-φ, axis)`.
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Unit vector pointing to the spherical coordinates (`lon`, `lat`).
#[inline]
pub fn unit_vector(lon: Radian, lat: Radian) -> Vector3<f64> {
    let (sl, cl) = lon.sin_cos();
    let (sb, cb) = lat.sin_cos();
    Vector3::new(cb * cl, cb * sl, sb)
}

/// Spherical coordinates (`lon` in [0, 2π), `lat`) of a non-zero vector.
#[inline]
pub fn spherical(v: &Vector3<f64>) -> (Radian, Radian) {
    let lon = v.y.atan2(v.x).rem_euclid(DPI);
    let lat = v.z.atan2(v.x.hypot(v.y));
    (lon, lat)
}

/// Convert VSOP87 heliocentric coordinates to the FK5 system.
///
/// Arguments
/// ---------
/// * `jde`: Julian Ephemeris Day.
/// * `l`, `b`: ecliptic longitude and latitude in the dynamical frame (radians).
///
/// Return
/// ------
/// * `(L, B)` in the FK5 frame, with `L` reduced to [0, 2π).
///
/// Formula
/// -------
/// ```text
/// L′ = L − 1.397°·T − 0.00031°·T²
/// ΔL = −0.09033″ + 0.03916″·(cos L′ + sin L′)·tan B
/// ΔB = +0.03916″·(cos L′ − sin L′)
/// ```
pub fn vsop_to_fk5(jde: JulianDay, l: Radian, b: Radian) -> (Radian, Radian) {
    let t = julian_centuries(jde);
    let l1 = l - 1.397 * RADEG * t - 0.00031 * RADEG * t * t;
    let (s1, c1) = l1.sin_cos();

    let dl = -0.09033 * RADSEC + 0.03916 * RADSEC * (c1 + s1) * b.tan();
    let db = 0.03916 * RADSEC * (c1 - s1);

    ((l + dl).rem_euclid(DPI), b + db)
}

/// First-order annual aberration in longitude for a body at heliocentric distance `r` (AU).
///
/// Return
/// ------
/// * The correction `−20.4898″ / R` in radians, to be added to the geometric longitude.
#[inline]
pub fn aberration_low(r: AstronomicalUnit) -> Radian {
    -20.4898 * RADSEC / r
}

/// Convert ecliptic coordinates to equatorial coordinates.
///
/// Arguments
/// ---------
/// * `l`, `b`: ecliptic longitude and latitude (radians).
/// * `eps`: obliquity of the ecliptic (radians), mean or true depending on the frame wanted.
///
/// Return
/// ------
/// * `(ra, dec)` with `ra` in [0, 2π).
pub fn ecl_to_equ(l: Radian, b: Radian, eps: Radian) -> (Radian, Radian) {
    let (se, ce) = eps.sin_cos();
    let (sl, cl) = l.sin_cos();

    let ra = (sl * ce - b.tan() * se).atan2(cl).rem_euclid(DPI);
    let dec = (b.sin() * ce + b.cos() * se * sl).asin();
    (ra, dec)
}

/// Apply the space motion of a star from J2000.0 to `jde`, then its annual parallax.
///
/// Arguments
/// ---------
/// * `jde`: Julian Ephemeris Day.
/// * `ra`, `dec`: ICRS catalogue position at J2000.0 (radians).
/// * `pm_ra`: proper motion in right ascension, μα·cos δ, in mas/yr.
/// * `pm_dec`: proper motion in declination in mas/yr.
/// * `radial_velocity`: km/s, positive receding.
/// * `parallax`: mas.
/// * `earth`: heliocentric position of the Earth in AU, in the equatorial frame.
///
/// Return
/// ------
/// * `(ra, dec)` of the star as seen from the geocentre, radians, `ra` in [0, 2π).
///
/// Method
/// ------
/// The proper motion is a tangent-plane velocity; the radial velocity contributes a
/// foreshortening term proportional to the parallax. The displaced direction is then shifted
/// by `−ϖ·E`, the parallactic displacement of the observer.
#[allow(clippy::too_many_arguments)]
pub fn proper_motion_parallax(
    jde: JulianDay,
    ra: Radian,
    dec: Radian,
    pm_ra: f64,
    pm_dec: f64,
    radial_velocity: f64,
    parallax: f64,
    earth: &Vector3<f64>,
) -> (Radian, Radian) {
    const MAS: f64 = RADSEC / 1000.0;
    const DAYS_PER_YEAR: f64 = 365.25;
    // km/s → AU/yr
    let km_s_to_au_yr = DAYS_PER_YEAR * SECONDS_PER_DAY / AU;

    let years = (jde - crate::constants::J2000) / DAYS_PER_YEAR;
    let plx = parallax * MAS;

    let (sa, ca) = ra.sin_cos();
    let (sd, cd) = dec.sin_cos();
    let p = Vector3::new(cd * ca, cd * sa, sd);
    let east = Vector3::new(-sa, ca, 0.0);
    let north = Vector3::new(-sd * ca, -sd * sa, cd);

    let velocity = east * (pm_ra * MAS)
        + north * (pm_dec * MAS)
        + p * (radial_velocity * km_s_to_au_yr * plx);

    let moved = p + velocity * years - earth * plx;
    spherical(&moved)
}

/// Rotate ICRS coordinates into the mean dynamical frame of J2000.0 (IERS 2003 frame bias).
///
/// Offsets: `dα₀ = −14.6 mas`, `ξ₀ = −16.617 mas`, `η₀ = −6.8192 mas`.
pub fn frame_bias(ra: Radian, dec: Radian) -> (Radian, Radian) {
    const MAS: f64 = RADSEC / 1000.0;
    let da0 = -14.6 * MAS;
    let xi0 = -16.617 * MAS;
    let eta0 = -6.8192 * MAS;

    let bias = rotmt(eta0, Axis::X) * rotmt(-xi0, Axis::Y) * rotmt(-da0, Axis::Z);
    spherical(&(bias * unit_vector(ra, dec)))
}

/// Precession matrix from the mean equator and equinox of J2000.0 to those of `jde` (IAU 1976).
///
/// The angles are
/// ```text
/// ζ = 2306.2181″·T + 0.30188″·T² + 0.017998″·T³
/// z = 2306.2181″·T + 1.09468″·T² + 0.018203″·T³
/// θ = 2004.3109″·T − 0.42665″·T² − 0.041833″·T³
/// ```
/// and the frame rotation is `R3(−z)·R2(θ)·R3(−ζ)`.
pub fn precession_matrix(jde: JulianDay) -> Matrix3<f64> {
    let t = julian_centuries(jde);

    let zeta = ((0.017998 * t + 0.30188) * t + 2306.2181) * t * RADSEC;
    let z = ((0.018203 * t + 1.09468) * t + 2306.2181) * t * RADSEC;
    let theta = ((-0.041833 * t - 0.42665) * t + 2004.3109) * t * RADSEC;

    rotmt(z, Axis::Z) * rotmt(-theta, Axis::Y) * rotmt(zeta, Axis::Z)
}

/// Precess mean J2000.0 coordinates to the mean equator and equinox of `jde`.
pub fn precess(jde: JulianDay, ra: Radian, dec: Radian) -> (Radian, Radian) {
    spherical(&(precession_matrix(jde) * unit_vector(ra, dec)))
}

/// Nutation matrix from mean to true equator and equinox of date.
///
/// Frame rotation `R1(−ε−Δε)·R3(−Δψ)·R1(ε)`.
pub fn nutation_matrix(orientation: &EarthOrientation) -> Matrix3<f64> {
    rotmt(orientation.true_obliquity, Axis::X)
        * rotmt(orientation.delta_psi, Axis::Z)
        * rotmt(-orientation.mean_obliquity, Axis::X)
}

/// Apply nutation to mean coordinates of date.
pub fn nutate(orientation: &EarthOrientation, ra: Radian, dec: Radian) -> (Radian, Radian) {
    spherical(&(nutation_matrix(orientation) * unit_vector(ra, dec)))
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use crate::constants::J2000;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotmt_is_active() {
        let r = rotmt(std::f64::consts::FRAC_PI_2, Axis::Z);
        let v = r * Vector3::x();
        assert_relative_eq!(v, Vector3::y(), epsilon = 1e-15);
    }

    #[test]
    fn test_vsop_to_fk5_sun_1992() {
        let (l, b) = vsop_to_fk5(2_448_908.5, 199.907372 * RADEG, 0.62 * RADSEC);
        assert_relative_eq!(l.to_degrees(), 199.907347, epsilon = 1e-6);
        assert_relative_eq!(b / RADSEC, 0.5966, epsilon = 1e-3);
    }

    #[test]
    fn test_aberration_low() {
        assert_relative_eq!(aberration_low(0.99760775) / RADSEC, -20.53893, epsilon = 1e-4);
    }

    /// Pollux: λ = 113.215630°, β = 6.684170°, ε = 23.4392911° → α = 116.328942°, δ = 28.026183°
    #[test]
    fn test_ecl_to_equ_pollux() {
        let (ra, dec) = ecl_to_equ(
            113.215630 * RADEG,
            6.684170 * RADEG,
            23.4392911 * RADEG,
        );
        assert_relative_eq!(ra.to_degrees(), 116.328942, epsilon = 1e-6);
        assert_relative_eq!(dec.to_degrees(), 28.026183, epsilon = 1e-6);
    }

    /// θ Persei precessed from J2000.0 to 2028 Nov 13.19 TD.
    #[test]
    fn test_precess_theta_persei() {
        let (ra, dec) = precess(2_462_088.69, 41.054063 * RADEG, 49.227750 * RADEG);
        assert_relative_eq!(ra.to_degrees(), 41.547214, epsilon = 1e-6);
        assert_relative_eq!(dec.to_degrees(), 49.348483, epsilon = 1e-6);
    }

    #[test]
    fn test_precess_at_j2000_is_identity() {
        let (ra, dec) = precess(J2000, 1.2, -0.4);
        assert_relative_eq!(ra, 1.2, epsilon = 1e-14);
        assert_relative_eq!(dec, -0.4, epsilon = 1e-14);
    }

    /// Nutation of θ Persei: Δψ = +14.861″, Δε = +2.705″, ε = 23.436° → Δα = +15.843″, Δδ = +6.218″
    #[test]
    fn test_nutate_theta_persei() {
        let eps = 23.436 * RADEG;
        let orientation = EarthOrientation {
            jde: 2_462_088.69,
            delta_psi: 14.861 * RADSEC,
            delta_eps: 2.705 * RADSEC,
            mean_obliquity: eps,
            true_obliquity: eps + 2.705 * RADSEC,
        };
        let (ra0, dec0) = (41.5472 * RADEG, 49.3485 * RADEG);
        let (ra, dec) = nutate(&orientation, ra0, dec0);
        assert_relative_eq!((ra - ra0) / RADSEC, 15.843, epsilon = 2e-3);
        assert_relative_eq!((dec - dec0) / RADSEC, 6.218, epsilon = 2e-3);
    }

    #[test]
    fn test_frame_bias_is_tiny() {
        let (ra, dec) = frame_bias(1.0, 0.5);
        assert!(((ra - 1.0) / RADSEC).abs() < 0.05);
        assert!(((dec - 0.5) / RADSEC).abs() < 0.05);
    }

    #[test]
    fn test_proper_motion_without_motion_is_identity() {
        let (ra, dec) =
            proper_motion_parallax(2_460_000.5, 2.0, 0.3, 0.0, 0.0, 0.0, 0.0, &Vector3::zeros());
        assert_relative_eq!(ra, 2.0, epsilon = 1e-14);
        assert_relative_eq!(dec, 0.3, epsilon = 1e-14);
    }

    /// Arcturus moves about 2″ per year southwards.
    #[test]
    fn test_proper_motion_arcturus() {
        let ra0 = (14.0 + (15.0 + 39.67207 / 60.0) / 60.0) * 15.0 * RADEG;
        let dec0 = (19.0 + (10.0 + 56.6730 / 60.0) / 60.0) * RADEG;
        let jde = J2000 + 25.0 * 365.25;
        let (ra, dec) = proper_motion_parallax(
            jde,
            ra0,
            dec0,
            -1093.39,
            -2000.06,
            -5.19,
            88.83,
            &Vector3::zeros(),
        );
        assert_relative_eq!((dec - dec0) / RADSEC, -50.0, epsilon = 0.05);
        assert_relative_eq!((ra - ra0) * dec0.cos() / RADSEC, -27.33, epsilon = 0.05);
    }
}
