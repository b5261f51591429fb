//! # Earth orientation: obliquity and nutation
//!
//! Low-level models of the Earth's axis used by the almanac computations:
//!
//! * [`mean_obliquity`] – IAU 1976 mean obliquity of the ecliptic,
//! * [`nutation_1980`] – IAU 1980 (Wahr) nutation in longitude and obliquity,
//! * [`EarthOrientation`] – the per-instant bundle (Δψ, Δε, ε, ε + Δε) shared by every
//!   body computed at the same time,
//! * [`equation_of_equinoxes`] – difference between apparent and mean sidereal time.
//!
//! All functions take a Julian Ephemeris Day (TT) and are pure.

use crate::constants::{ArcSec, JulianDay, Radian, DAYS_PER_CENTURY, DPI, J2000, RADSEC};

/// Julian centuries of TT elapsed since J2000.0.
#[inline]
pub fn julian_centuries(jde: JulianDay) -> f64 {
    (jde - J2000) / DAYS_PER_CENTURY
}

/// Compute the mean obliquity of the ecliptic at a given epoch (IAU 1976 model).
///
/// Arguments
/// ---------
/// * `jde`: Julian Ephemeris Day (TT scale).
///
/// Returns
/// --------
/// * Mean obliquity of the ecliptic in radians.
///
/// Formula
/// -------
/// ```text
/// ε(T) = 23°26′21.448″ − 46.8150″·T − 0.00059″·T² + 0.001813″·T³
/// ```
/// evaluated with Horner's scheme, `T` in Julian centuries from J2000.
pub fn mean_obliquity(jde: JulianDay) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.00059 * RADSEC;
    let ob3 = 0.001813 * RADSEC;

    let t = julian_centuries(jde);

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// Compute the nutation angles in longitude and obliquity using the IAU 1980 (Wahr) model.
///
/// Arguments
/// ---------
/// * `jde`: Julian Ephemeris Day (TT scale).
///
/// Returns
/// --------
/// * A tuple `(Δψ, Δε)` in arcseconds:
///     - `Δψ`: nutation in longitude
///     - `Δε`: nutation in obliquity
///
/// Description
/// -----------
/// The five fundamental arguments (mean anomalies of the Moon and Sun, argument of latitude of
/// the Moon, mean elongation of the Moon, longitude of the lunar ascending node) are cubic
/// polynomials in Julian centuries. The angles are then summed over the 106-term IAU 1980
/// series, expressed with products of sines and cosines of the arguments so that only five
/// trigonometric evaluations are needed.
///
/// See also
/// ------------
/// * [`EarthOrientation::at`] – converts the result to radians and pairs it with the obliquity.
pub fn nutation_1980(jde: JulianDay) -> (ArcSec, ArcSec) {
    let t = julian_centuries(jde);
    let t2 = t * t;
    let t3 = t2 * t;

    let dl = (485866.733 + 1717915922.633 * t + 31.310 * t2 + 0.064 * t3) * RADSEC;
    let dp = (1287099.804 + 129596581.224 * t - 0.577 * t2 - 0.012 * t3) * RADSEC;
    let df = (335778.877 + 1739527263.137 * t - 13.257 * t2 + 0.011 * t3) * RADSEC;
    let dd = (1072261.307 + 1602961601.328 * t - 6.891 * t2 + 0.019 * t3) * RADSEC;
    let dn = (450160.280 - 6962890.539 * t + 7.455 * t2 + 0.008 * t3) * RADSEC;

    let l = dl % DPI;
    let p = dp % DPI;
    let x = df % DPI * 2.0;
    let d = dd % DPI;
    let n = dn % DPI;

    // cos/sin of the fundamental arguments
    let sin_cos = |x: f64| -> (f64, f64) { (x.cos(), x.sin()) };

    let (cl, sl) = sin_cos(l);
    let (cp, sp) = sin_cos(p);
    let (cx, sx) = sin_cos(x);
    let (cd, sd) = sin_cos(d);
    let (cn, sn) = sin_cos(n);

    // compound arguments
    let cp2 = 2.0 * cp * cp - 1.0;

    let sp2 = 2.0 * sp * cp;
    let cd2 = 2.0 * cd * cd - 1.0;
    let sd2 = 2.0 * sd * cd;
    let cn2 = 2.0 * cn * cn - 1.0;
    let sn2 = 2.0 * sn * cn;
    let cl2 = 2.0 * cl * cl - 1.0;
    let sl2 = 2.0 * sl * cl;

    let ca = cx * cd2 + sx * sd2;
    let sa = sx * cd2 - cx * sd2;
    let cb = ca * cn - sa * sn;
    let sb = sa * cn + ca * sn;
    let cc = cb * cn - sb * sn;
    let sc = sb * cn + cb * sn;

    let cv = cx * cd2 - sx * sd2;
    let sv = sx * cd2 + cx * sd2;
    let ce = cv * cn - sv * sn;
    let se = sv * cn + cv * sn;
    let cf = ce * cn - se * sn;
    let sf = se * cn + ce * sn;

    let cg = cl * cd2 + sl * sd2;
    let sg = sl * cd2 - cl * sd2;
    let ch = cx * cn2 - sx * sn2;
    let sh = sx * cn2 + cx * sn2;
    let cj = ch * cl - sh * sl;
    let sj = sh * cl + ch * sl;

    let ck = cj * cl - sj * sl;
    let sk = sj * cl + cj * sl;
    let cm = cx * cl2 + sx * sl2;
    let sm = sx * cl2 - cx * sl2;
    let cq = cl * cd + sl * sd;
    let sq = sl * cd - cl * sd;

    let cr = 2.0 * cq * cq - 1.0;
    let sr = 2.0 * sq * cq;
    let cs = cx * cn - sx * sn;
    let ss = sx * cn + cx * sn;
    let ct = cs * cl - ss * sl;
    let st = ss * cl + cs * sl;

    let cu = cf * cl + sf * sl;
    let su = sf * cl - cf * sl;
    let cw = cp * cg - sp * sg;
    let sw = sp * cg + cp * sg;

    // Series expansion for nutation in longitude (Δψ), in 0.0001 arcseconds
    let mut dpsi =
        -(171996.0 + 174.2 * t) * sn + (2062.0 + 0.2 * t) * sn2 + 46.0 * (sm * cn + cm * sn)
            - 11.0 * sm
            - 3.0 * (sm * cn2 + cm * sn2)
            - 3.0 * (sq * cp - cq * sp)
            - 2.0 * (sb * cp2 - cb * sp2)
            + (sn * cm - cn * sm)
            - (13187.0 + 1.6 * t) * sc
            + (1426.0 - 3.4 * t) * sp
            - (517.0 - 1.2 * t) * (sc * cp + cc * sp)
            + (217.0 - 0.5 * t) * (sc * cp - cc * sp)
            + (129.0 + 0.1 * t) * sb
            + 48.0 * sr
            - 22.0 * sa
            + (17.0 - 0.1 * t) * sp2
            - 15.0 * (sp * cn + cp * sn)
            - (16.0 - 0.1 * t) * (sc * cp2 + cc * sp2)
            - 12.0 * (sn * cp - cn * sp);

    dpsi += -6.0 * (sn * cr - cn * sr) - 5.0 * (sb * cp - cb * sp)
        + 4.0 * (sr * cn + cr * sn)
        + 4.0 * (sb * cp + cb * sp)
        - 4.0 * sq
        + (sr * cp + cr * sp)
        + (sn * ca - cn * sa)
        - (sp * ca - cp * sa)
        + (sp * cn2 + cp * sn2)
        + (sn * cq - cn * sq)
        - (sp * ca + cp * sa)
        - (2274.0 + 0.2 * t) * sh
        + (712.0 + 0.1 * t) * sl
        - (386.0 + 0.4 * t) * ss
        - 301.0 * sj
        - 158.0 * sg
        + 123.0 * (sh * cl - ch * sl)
        + 63.0 * sd2
        + (63.0 + 0.1 * t) * (sl * cn + cl * sn)
        - (58.0 + 0.1 * t) * (sn * cl - cn * sl)
        - 59.0 * su
        - 51.0 * st
        - 38.0 * sf
        + 29.0 * sl2;

    dpsi += 29.0 * (sc * cl + cc * sl) - 31.0 * sk
        + 26.0 * sx
        + 21.0 * (ss * cl - cs * sl)
        + 16.0 * (sn * cg - cn * sg)
        - 13.0 * (sn * cg + cn * sg)
        - 10.0 * (se * cl - ce * sl)
        - 7.0 * (sg * cp + cg * sp)
        + 7.0 * (sh * cp + ch * sp)
        - 7.0 * (sh * cp - ch * sp)
        - 8.0 * (sf * cl + cf * sl)
        + 6.0 * (sl * cd2 + cl * sd2)
        + 6.0 * (sc * cl2 + cc * sl2)
        - 6.0 * (sn * cd2 + cn * sd2)
        - 7.0 * se
        + 6.0 * (sb * cl + cb * sl)
        - 5.0 * (sn * cd2 - cn * sd2)
        + 5.0 * (sl * cp - cl * sp)
        - 5.0 * (ss * cl2 + cs * sl2)
        - 4.0 * (sp * cd2 - cp * sd2);

    dpsi += 4.0 * (sl * cx - cl * sx) - 4.0 * sd - 3.0 * (sl * cp + cl * sp)
        + 3.0 * (sl * cx + cl * sx)
        - 3.0 * (sj * cp - cj * sp)
        - 3.0 * (su * cp - cu * sp)
        - 2.0 * (sn * cl2 - cn * sl2)
        - 3.0 * (sk * cl + ck * sl)
        - 3.0 * (sf * cp - cf * sp)
        + 2.0 * (sj * cp + cj * sp)
        - 2.0 * (sb * cl - cb * sl);

    dpsi += 2.0 * (sn * cl2 + cn * sl2) - 2.0 * (sl * cn2 + cl * sn2)
        + 2.0 * (sl * cl2 + cl * sl2)
        + 2.0 * (sh * cd + ch * sd)
        + (sn2 * cl - cn2 * sl)
        - (sg * cd2 - cg * sd2)
        + (sf * cl2 - cf * sl2)
        - 2.0 * (su * cd2 + cu * sd2)
        - (sr * cd2 - cr * sd2)
        + (sw * ch + cw * sh)
        - (sl * ce + cl * se)
        - (sf * cr - cf * sr)
        + (su * ca + cu * sa)
        + (sg * cp - cg * sp)
        + (sb * cl2 + cb * sl2)
        - (sf * cl2 + cf * sl2)
        - (st * ca - ct * sa)
        + (sc * cx + cc * sx)
        + (sj * cr + cj * sr)
        - (sg * cx + cg * sx);

    dpsi += (sp * cs + cp * ss) + (sn * cw - cn * sw)
        - (sn * cx - cn * sx)
        - (sh * cd - ch * sd)
        - (sp * cd2 + cp * sd2)
        - (sl * cv - cl * sv)
        - (ss * cp - cs * sp)
        - (sw * cn + cw * sn)
        - (sl * ca - cl * sa)
        + (sl2 * cd2 + cl2 * sd2)
        - (sf * cd2 + cf * sd2)
        + (sp * cd + cp * sd);

    // Series expansion for nutation in obliquity (Δε), in 0.0001 arcseconds
    let mut deps = (92025.0 + 8.9 * t) * cn - (895.0 - 0.5 * t) * cn2 - 24.0 * (cm * cn - sm * sn)
        + (cm * cn2 - sm * sn2)
        + (cb * cp2 + sb * sp2)
        + (5736.0 - 3.1 * t) * cc
        + (54.0 - 0.1 * t) * cp
        + (224.0 - 0.6 * t) * (cc * cp - sc * sp)
        - (95.0 - 0.3 * t) * (cc * cp + sc * sp)
        - 70.0 * cb
        + cr
        + 9.0 * (cp * cn - sp * sn)
        + 7.0 * (cc * cp2 - sc * sp2)
        + 6.0 * (cn * cp + sn * sp)
        + 3.0 * (cn * cr + sn * sr)
        + 3.0 * (cb * cp + sb * sp)
        - 2.0 * (cr * cn - sr * sn)
        - 2.0 * (cb * cp - sb * sp);

    deps += (977.0 - 0.5 * t) * ch - 7.0 * cl + 200.0 * cs + (129.0 - 0.1 * t) * cj
        - cg
        - 53.0 * (ch * cl + sh * sl)
        - 2.0 * cd2
        - 33.0 * (cl * cn - sl * sn)
        + 32.0 * (cn * cl + sn * sl)
        + 26.0 * cu
        + 27.0 * ct
        + 16.0 * cf
        - cl2
        - 12.0 * (cc * cl - sc * sl)
        + 13.0 * ck
        - cx
        - 10.0 * (cs * cl + ss * sl)
        - 8.0 * (cn * cg + sn * sg)
        + 7.0 * (cn * cg - sn * sg)
        + 5.0 * (ce * cl + se * sl)
        - 3.0 * (ch * cp - sh * sp)
        + 3.0 * (ch * cp + sh * sp)
        + 3.0 * (cf * cl - sf * sl)
        - 3.0 * (cc * cl2 - sc * sl2)
        + 3.0 * (cn * cd2 - sn * sd2)
        + 3.0 * ce
        - 3.0 * (cb * cl - sb * sl)
        + 3.0 * (cn * cd2 + sn * sd2)
        + 3.0 * (cs * cl2 - ss * sl2)
        + (cj * cp + sj * sp)
        + (cu * cp + su * sp)
        + (cn * cl2 + sn * sl2)
        + (ck * cl - sk * sl)
        + (cf * cp + sf * sp)
        - (cj * cp - sj * sp)
        + (cb * cl + sb * sl)
        - (cn * cl2 - sn * sl2)
        + (cl * cn2 - sl * sn2)
        - (ch * cd - sh * sd)
        - (cn2 * cl + sn2 * sl)
        - (cf * cl2 + sf * sl2)
        + (cu * cd2 - su * sd2)
        - (cw * ch - sw * sh)
        + (cl * ce - sl * se)
        + (cf * cr + sf * sr)
        - (cb * cl2 - sb * sl2);

    // 0.0001″ → ″
    dpsi *= 1e-4;
    deps *= 1e-4;

    (dpsi, deps)
}

/// Orientation of the Earth's axis at one instant.
///
/// Bundles the nutation angles and both obliquities so that the locator evaluates the long
/// nutation series once per instant, whatever the number of bodies computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthOrientation {
    /// Julian Ephemeris Day (TT) the values refer to
    pub jde: JulianDay,
    /// Nutation in longitude Δψ
    pub delta_psi: Radian,
    /// Nutation in obliquity Δε
    pub delta_eps: Radian,
    /// Mean obliquity ε₀
    pub mean_obliquity: Radian,
    /// True obliquity ε = ε₀ + Δε
    pub true_obliquity: Radian,
}

impl EarthOrientation {
    /// Evaluate nutation and obliquity at `jde` (TT).
    pub fn at(jde: JulianDay) -> Self {
        let (dpsi, deps) = nutation_1980(jde);
        let eps0 = mean_obliquity(jde);
        let delta_eps = deps * RADSEC;

        EarthOrientation {
            jde,
            delta_psi: dpsi * RADSEC,
            delta_eps,
            mean_obliquity: eps0,
            true_obliquity: eps0 + delta_eps,
        }
    }

    /// Equation of the equinoxes `Δψ·cos ε` in radians.
    pub fn equation_of_equinoxes(&self) -> Radian {
        self.delta_psi * self.true_obliquity.cos()
    }
}

/// Nutation in longitude Δψ, in radians.
pub fn nutation_in_longitude(jde: JulianDay) -> Radian {
    nutation_1980(jde).0 * RADSEC
}

/// Nutation in obliquity Δε, in radians.
pub fn nutation_in_obliquity(jde: JulianDay) -> Radian {
    nutation_1980(jde).1 * RADSEC
}

/// True obliquity of the ecliptic ε₀ + Δε, in radians.
pub fn true_obliquity(jde: JulianDay) -> Radian {
    mean_obliquity(jde) + nutation_in_obliquity(jde)
}

/// Compute the equation of the equinoxes in radians.
///
/// This term is the difference between apparent and mean sidereal time:
///
/// ```text
/// Eq_eq = Δψ · cos(ε₀ + Δε)
/// ```
///
/// See also
/// ------------
/// * [`gast_deg`](crate::time::gast_deg) – adds this term to the mean sidereal time.
pub fn equation_of_equinoxes(jde: JulianDay) -> Radian {
    EarthOrientation::at(jde).equation_of_equinoxes()
}

#[cfg(test)]
mod test_earth_orientation {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_obliquity_at_j2000() {
        let obl = mean_obliquity(J2000);
        assert_relative_eq!(obl, 0.409_092_804_222_328_97, epsilon = 1e-15);
    }

    #[test]
    fn test_nutation_at_j2000() {
        let (dpsi, deps) = nutation_1980(J2000);
        assert_relative_eq!(dpsi, -13.923385169502602, epsilon = 1e-9);
        assert_relative_eq!(deps, -5.773808263765919, epsilon = 1e-9);
    }

    /// 1987 April 10, 0h TD (JDE 2446895.5): Δψ = −3.788″, Δε = +9.443″, ε = 23°26′36.850″.
    #[test]
    fn test_nutation_1987_april_10() {
        let jde = 2_446_895.5;
        let (dpsi, deps) = nutation_1980(jde);
        assert_relative_eq!(dpsi, -3.788, epsilon = 2e-3);
        assert_relative_eq!(deps, 9.443, epsilon = 2e-3);

        let eo = EarthOrientation::at(jde);
        let expected = (23.0 * 3600.0 + 26.0 * 60.0 + 36.850) * RADSEC;
        assert_relative_eq!(eo.true_obliquity, expected, epsilon = 3e-3 * RADSEC);
        assert_relative_eq!(eo.delta_psi, nutation_in_longitude(jde), epsilon = 1e-15);
        assert_relative_eq!(eo.true_obliquity, true_obliquity(jde), epsilon = 1e-15);
    }

    #[test]
    fn test_equation_of_equinoxes_is_small() {
        for jde in [2_440_000.5, J2000, 2_460_000.5, 2_470_000.5] {
            let eqeq = equation_of_equinoxes(jde);
            // |Δψ| never exceeds about 20″
            assert!(eqeq.abs() < 20.0 * RADSEC);
        }
    }
}
