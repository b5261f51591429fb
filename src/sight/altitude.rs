//! Altitude correction chain: sextant altitude `Hs` → apparent `Ha` → corrected `Hc` →
//! observed `Ho`.
//!
//! | Step | Formula |
//! |---|---|
//! | index | `IC = IE / 60` |
//! | dip | `1.758·√h / 60` |
//! | apparent | `Ha = Hs − IC − dip` |
//! | refraction | `0.267·P / (x·(T + 273.15)) / 60`, `x = tan(Ha + 0.04848 / (tan Ha + 0.028))` |
//! | limb | `±lc` for the upper / lower limb of the Sun and the Moon |
//! | corrected | `Hc = Ha − refraction − limb` |
//! | parallax | `PC = −asin(sin HP · cos Hc)` |
//! | observed | `Ho = Hc − PC` |

use crate::{
    body::{Body, BodyLocation},
    constants::{
        ArcMin, Degree, JulianDay, Meter, EARTH_RADIUS, K_MOON, RADEG, SUN_PARALLAX_1AU,
        SUN_SEMI_DIAMETER_1AU,
    },
    moon_distance::moon_distance,
};

use super::{
    trace::{CalcTrace, TraceValue},
    Limb,
};

/// Observer conditions shared by every altitude of a sight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub eye_height: Meter,
    /// °C
    pub temperature: f64,
    /// hPa
    pub pressure: f64,
    pub index_error: ArcMin,
}

impl Environment {
    #[inline]
    pub fn index_correction(&self) -> Degree {
        self.index_error / 60.0
    }

    /// Dip of the sea horizon.
    #[inline]
    pub fn dip(&self) -> Degree {
        1.758 * self.eye_height.sqrt() / 60.0
    }

    /// Apparent altitude `Ha = Hs − IC − dip`.
    #[inline]
    pub fn apparent_altitude(&self, hs: Degree) -> Degree {
        hs - self.index_correction() - self.dip()
    }

    /// Refraction at apparent altitude `ha`.
    pub fn refraction(&self, ha: Degree) -> Degree {
        let x = refraction_argument(ha);
        0.267 * self.pressure / (x * (self.temperature + 273.15)) / 60.0
    }
}

#[inline]
fn refraction_argument(ha: Degree) -> f64 {
    let ha_r = ha * RADEG;
    (ha_r + 4.848e-2 * RADEG / (ha_r.tan() + 0.028)).tan()
}

/// Disk and parallax of a body at the time of the sight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyDisk {
    /// Geocentric semi-diameter
    pub semi_diameter: Degree,
    /// Semi-diameter seen from the observer, augmented for the Moon
    pub topo_semi_diameter: Degree,
    /// Limb correction magnitude
    pub limb: Degree,
    pub horizontal_parallax: Degree,
}

impl BodyDisk {
    /// Sun disk at `r` AU.
    pub fn sun(r: f64) -> Self {
        let lc = SUN_SEMI_DIAMETER_1AU / r;
        let sd = (lc * RADEG).sin() / RADEG;
        BodyDisk {
            semi_diameter: sd,
            topo_semi_diameter: sd,
            limb: lc,
            horizontal_parallax: SUN_PARALLAX_1AU / r,
        }
    }

    /// Moon disk at `jde`, seen at apparent altitude `ha`.
    pub fn moon(jde: JulianDay, ha: Degree) -> Self {
        let hp = (EARTH_RADIUS / moon_distance(jde)).asin() / RADEG;
        let sd = (K_MOON * (hp * RADEG).sin()).asin() / RADEG;
        // augmentation towards the zenith
        let topo_sd = sd * (1.0 + (ha * RADEG).sin() * (hp * RADEG).sin());
        BodyDisk {
            semi_diameter: sd,
            topo_semi_diameter: topo_sd,
            limb: (topo_sd * RADEG).asin() / RADEG,
            horizontal_parallax: hp,
        }
    }

    /// Planet at `distance` km: a point with parallax.
    pub fn planet(distance: f64) -> Self {
        BodyDisk {
            horizontal_parallax: (EARTH_RADIUS / distance).asin() / RADEG,
            ..Default::default()
        }
    }

    /// Disk of `body` located at `location`.
    pub fn of(body: Body, location: &BodyLocation, jde: JulianDay, ha: Degree) -> Self {
        match body {
            Body::Sun => BodyDisk::sun(location.sun_distance()),
            Body::Moon => BodyDisk::moon(jde, ha),
            Body::Star(_) => BodyDisk::default(),
            _ => location
                .distance
                .map_or_else(BodyDisk::default, BodyDisk::planet),
        }
    }
}

/// Every intermediate of one altitude reduction, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AltitudeReduction {
    pub sextant_altitude: Degree,
    pub index_correction: Degree,
    pub dip: Degree,
    pub apparent_altitude: Degree,
    pub refraction: Degree,
    pub disk: BodyDisk,
    pub limb_correction: Degree,
    pub corrected_altitude: Degree,
    pub parallax_correction: Degree,
    pub observed_altitude: Degree,
}

impl AltitudeReduction {
    /// `Ho − Ha`, in arc-minutes.
    pub fn main_correction(&self) -> ArcMin {
        (self.observed_altitude - self.apparent_altitude) * 60.0
    }

    /// Refraction, limb and parallax corrections added together.
    pub fn corrections(&self) -> Degree {
        self.refraction + self.limb_correction + self.parallax_correction
    }
}

/// Signed limb correction for a disk of limb semi-diameter `lc`.
#[inline]
pub fn limb_correction(limb: Limb, lc: Degree) -> Degree {
    match limb {
        Limb::Upper => lc,
        Limb::Lower => -lc,
        Limb::Center => 0.0,
    }
}

/// `−asin(sin HP · cos h)`, zero without parallax.
#[inline]
pub fn parallax_correction(hp: Degree, h: Degree) -> Degree {
    if hp == 0.0 {
        0.0
    } else {
        -((hp * RADEG).sin() * (h * RADEG).cos()).asin() / RADEG
    }
}

/// Reduce a sextant altitude of `body` to the observed altitude.
///
/// Arguments
/// ---------
/// * `hs`: sextant altitude, degrees.
/// * `limb`: limb brought to the horizon.
/// * `body`: body observed.
/// * `location`: body located at the corrected sight time.
/// * `jde`: Julian Ephemeris Day of the corrected sight time, for the Moon's distance.
/// * `env`: observer conditions.
/// * `trace`: receives one step per formula; `prefix` names the altitude in lunar sights.
///
/// Return
/// ------
/// * Every intermediate of the chain, `observed_altitude` being `Ho`.
#[allow(clippy::too_many_arguments)]
pub fn reduce_altitude(
    hs: Degree,
    limb: Limb,
    body: Body,
    location: &BodyLocation,
    jde: JulianDay,
    env: &Environment,
    prefix: &str,
    trace: &mut CalcTrace,
) -> AltitudeReduction {
    let tag = |s: &str| format!("{prefix}{s}");

    trace.angle(&tag("Hs"), "Altitude measurement", format!("{hs:.4}°"), hs);
    let ic = trace.angle(
        &tag("Index Correction"),
        "IndexError / 60",
        format!("{:.4}' / 60", env.index_error),
        env.index_correction(),
    );
    let dip = trace.angle(
        &tag("Height Correction"),
        "1.758 * sqrt(EyeHeight) / 60",
        format!("1.758 * sqrt({:.4}) / 60", env.eye_height),
        env.dip(),
    );
    let ha = trace.angle(
        &tag("Ha"),
        "Hs - IndexCorrection - HeightCorrection",
        format!("{hs:.4}° - {ic:.4}° - {dip:.4}°"),
        env.apparent_altitude(hs),
    );

    trace.step(
        &tag("x"),
        "tan(Ha + 4.848e-2 / (tan(Ha) + .028))",
        format!("tan({ha:.4} + 4.848e-2 / (tan({ha:.4}) + .028))"),
        TraceValue::Number(refraction_argument(ha)),
    );
    let refraction = trace.angle(
        &tag("Refraction"),
        ".267 * Pressure / (x * (Temperature + 273.15)) / 60",
        format!(
            ".267 * {:.4} / (x * ({:.4} + 273.15)) / 60",
            env.pressure, env.temperature
        ),
        env.refraction(ha),
    );

    let disk = BodyDisk::of(body, location, jde, ha);
    let lc = match body {
        Body::Sun => trace.angle(
            &tag("Sun lc"),
            "0.266564 / ra",
            format!("0.266564 / {:.4}", location.rad),
            disk.limb,
        ),
        Body::Moon => {
            trace.angle(&tag("Moon SD"), "asin(K * sin(HP))", "", disk.semi_diameter);
            trace.angle(
                &tag("Moon lc"),
                "asin(SD * (1 + sin(Ha) * sin(HP)))",
                format!(
                    "asin({:.4} * (1 + sin({ha:.4}) * sin({:.4})))",
                    disk.semi_diameter, disk.horizontal_parallax
                ),
                disk.limb,
            )
        }
        _ => 0.0,
    };

    let limb_correction = limb_correction(limb, lc);
    if lc != 0.0 {
        trace.angle(
            &tag("Limb Correction"),
            &format!("{limb} limb"),
            format!("{lc:.4}°"),
            limb_correction,
        );
    }

    let hc = trace.angle(
        &tag("Hc"),
        "Ha - RefractionCorrection - LimbCorrection",
        format!("{ha:.4}° - {refraction:.4}° - {limb_correction:.4}°"),
        ha - refraction - limb_correction,
    );

    let hp = disk.horizontal_parallax;
    let pc = parallax_correction(hp, hc);
    if hp != 0.0 {
        trace.angle(&tag("HP"), "horizontal parallax", format!("{:.4}'", hp * 60.0), hp);
        trace.angle(
            &tag("Parallax Correction"),
            "-asin(sin(HP) * cos(Hc))",
            format!("-asin(sin({hp:.4}) * cos({hc:.4}))"),
            pc,
        );
    }

    let ho = trace.angle(
        &tag("Ho"),
        "Hc - ParallaxCorrection",
        format!("{hc:.4}° - {pc:.4}°"),
        hc - pc,
    );

    AltitudeReduction {
        sextant_altitude: hs,
        index_correction: ic,
        dip,
        apparent_altitude: ha,
        refraction,
        disk,
        limb_correction,
        corrected_altitude: hc,
        parallax_correction: pc,
        observed_altitude: ho,
    }
}

#[cfg(test)]
mod altitude_test {
    use super::*;
    use approx::assert_relative_eq;

    fn env() -> Environment {
        Environment {
            eye_height: 2.4,
            temperature: 15.0,
            pressure: 1013.0,
            index_error: 3.2,
        }
    }

    #[test]
    fn test_apparent_altitude_and_refraction() {
        let e = env();
        let hs = 11.0 + 25.0 / 60.0;
        let ha = e.apparent_altitude(hs);
        assert_relative_eq!(ha, 11.31794197, epsilon = 1e-8);
        assert_relative_eq!(e.refraction(ha) * 60.0, 4.6011, epsilon = 1e-4);
    }

    #[test]
    fn test_refraction_decreases_with_altitude() {
        let e = env();
        let mut last = f64::INFINITY;
        for h in [1.0, 5.0, 10.0, 30.0, 60.0, 89.0] {
            let r = e.refraction(h);
            assert!(r > 0.0 && r < last);
            last = r;
        }
    }

    #[test]
    fn test_sun_disk() {
        let disk = BodyDisk::sun(0.98938658);
        assert_relative_eq!(disk.limb * 60.0, 16.1654, epsilon = 1e-4);
        assert_relative_eq!(disk.horizontal_parallax, 0.002442 / 0.98938658, epsilon = 1e-12);
    }

    #[test]
    fn test_moon_disk() {
        // 2025-08-18 11:58 UTC
        let jde = 2_460_905.998611 + 69.184 / 86_400.0;
        let disk = BodyDisk::moon(jde, 70.0);
        assert_relative_eq!(disk.horizontal_parallax * 60.0, 58.79, epsilon = 0.01);
        assert_relative_eq!(disk.semi_diameter * 60.0, 16.01, epsilon = 0.01);
        assert_relative_eq!(disk.topo_semi_diameter * 60.0, 16.27, epsilon = 0.01);
        assert!(disk.limb > disk.topo_semi_diameter);
    }

    #[test]
    fn test_limb_and_parallax_corrections() {
        assert_eq!(limb_correction(Limb::Upper, 0.25), 0.25);
        assert_eq!(limb_correction(Limb::Lower, 0.25), -0.25);
        assert_eq!(limb_correction(Limb::Center, 0.25), 0.0);
        assert_eq!(parallax_correction(0.0, 30.0), 0.0);
        assert_relative_eq!(parallax_correction(1.0, 0.0), -1.0, epsilon = 1e-12);
        assert!(parallax_correction(1.0, 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_star_reduction_has_no_disk_and_no_parallax() {
        let location = BodyLocation {
            lat: 0.0,
            lon: 0.0,
            gha_aries: 0.0,
            rad: 1.0,
            distance: None,
        };
        let mut trace = CalcTrace::new();
        let r = reduce_altitude(
            40.0,
            Limb::Lower,
            Body::Star(0),
            &location,
            2_460_000.5,
            &env(),
            "",
            &mut trace,
        );
        assert_eq!(r.limb_correction, 0.0);
        assert_eq!(r.parallax_correction, 0.0);
        assert_eq!(r.observed_altitude, r.apparent_altitude - r.refraction);
        assert!(trace.find("Parallax Correction").is_none());
        assert!(trace.find("Ho").is_some());
    }
}
