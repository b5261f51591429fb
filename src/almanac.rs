//! # Almanac: ephemeris access and body location
//!
//! [`Almanac`] is the façade every reduction goes through. It owns:
//!
//! 1. The **ephemeris source** ([`EphemerisSource`]) and the lazily loaded
//!    [`EphemerisStore`], opened on first use through a [`OnceCell`] and shared read-only
//!    afterwards.
//! 2. A **load-failure latch**: a failing load is returned as an error on every call, but only
//!    logged once per almanac.
//! 3. The **light-time budget** used for planets.
//!
//! ## Typical usage
//!
//! ```rust
//! use celnav::almanac::Almanac;
//! use celnav::body::Body;
//! use celnav::time::parse_utc;
//!
//! let almanac = Almanac::default();
//! let epoch = parse_utc("2024-11-13", "20:17:45").unwrap();
//! let sun = almanac.body_location(epoch, Body::Sun).unwrap();
//! assert!((sun.gha() - 128.3406).abs() < 1e-3);
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::ephemeris`] – Series evaluation.
//! * [`crate::ephemeris::planets`] – Apparent Sun and planets.
//! * [`crate::star_catalog`] – Stars.

use std::sync::atomic::{AtomicBool, Ordering};

use hifitime::Epoch;
use log::error;
use once_cell::sync::OnceCell;

use crate::{
    body::{Body, BodyLocation},
    celnav_errors::CelnavError,
    constants::{AU, RADEG},
    earth_orientation::EarthOrientation,
    ephemeris::{
        elp2000::moon_ecliptic,
        planets::{apparent_sun, earth_heliocentric_equatorial, geocentric_planet, LightTime},
        Coordinate, EphemerisSource, EphemerisStore, VsopBody,
    },
    geometry::spherical::resolve_heading,
    ref_system::ecl_to_equ,
    star_catalog::STARS,
    time::{gast_deg, jd_ut, jde_tt},
};

#[derive(Debug)]
pub struct Almanac {
    source: EphemerisSource,
    store: OnceCell<EphemerisStore>,
    load_error_reported: AtomicBool,
    light_time: LightTime,
}

impl Default for Almanac {
    fn default() -> Self {
        Almanac::new(EphemerisSource::Embedded)
    }
}

impl Almanac {
    /// Create an almanac reading its coefficients from `source`. Nothing is loaded yet.
    pub fn new(source: EphemerisSource) -> Self {
        Almanac {
            source,
            store: OnceCell::new(),
            load_error_reported: AtomicBool::new(false),
            light_time: LightTime::default(),
        }
    }

    /// Replace the light-time iteration budget.
    pub fn with_light_time(mut self, light_time: LightTime) -> Self {
        self.light_time = light_time;
        self
    }

    pub fn light_time(&self) -> &LightTime {
        &self.light_time
    }

    pub fn source(&self) -> &EphemerisSource {
        &self.source
    }

    /// Get the lazily loaded ephemeris store.
    ///
    /// The first failing call logs the error; later calls return the same kind of error
    /// silently and retry the load.
    ///
    /// Return
    /// ------
    /// * The shared store, or [`CelnavError::DataUnavailable`] / [`CelnavError::NomParsingError`].
    pub fn store(&self) -> Result<&EphemerisStore, CelnavError> {
        self.store
            .get_or_try_init(|| EphemerisStore::load(&self.source))
            .inspect_err(|e| {
                if !self.load_error_reported.swap(true, Ordering::Relaxed) {
                    error!("Ephemeris data unavailable ({:?}): {e}", self.source);
                }
            })
    }

    /// Locate `body` at `epoch`.
    ///
    /// Arguments
    /// ---------
    /// * `epoch`: instant of the observation (UTC).
    /// * `body`: body to locate.
    ///
    /// Return
    /// ------
    /// * The [`BodyLocation`]: sub-point latitude (declination) and longitude (`RA − GAST`),
    ///   GHA of Aries, and the distances used by the semi-diameter and parallax corrections.
    ///
    /// Errors
    /// ------
    /// * [`CelnavError::DataUnavailable`] when the series cannot be loaded.
    /// * [`CelnavError::UnknownBody`] for a star index outside the catalogue.
    /// * [`CelnavError::ConvergenceFailure`] when the planet light-time loop does not settle.
    ///
    /// See also
    /// ------------
    /// * [`apparent_sun`], [`geocentric_planet`], [`moon_ecliptic`],
    ///   [`crate::star_catalog::StarEntry::apparent_place`].
    pub fn body_location(&self, epoch: Epoch, body: Body) -> Result<BodyLocation, CelnavError> {
        let jd = jd_ut(epoch);
        let jde = jde_tt(epoch);
        let orientation = EarthOrientation::at(jde);
        let store = self.store()?;

        let (ra, dec, rad, distance) = match body {
            Body::Sun => {
                let sun = apparent_sun(store, jde, &orientation)?;
                (sun.ra, sun.dec, sun.distance, None)
            }
            Body::Moon => {
                let moon = moon_ecliptic(jde);
                let (ra, dec) = ecl_to_equ(
                    moon.longitude + orientation.delta_psi,
                    moon.latitude,
                    orientation.true_obliquity,
                );
                (ra, dec, moon.distance, Some(moon.distance))
            }
            Body::Star(index) => {
                let star = STARS
                    .get(index)
                    .ok_or_else(|| CelnavError::UnknownBody(format!("star #{index}")))?;
                let earth = earth_heliocentric_equatorial(store, jde, &orientation)?;
                let (ra, dec) = star.apparent_place(jde, &orientation, &earth);
                (ra, dec, earth.norm(), None)
            }
            planet => {
                let Some(vsop) = planet.planet() else {
                    return Err(CelnavError::UnknownBody(planet.to_string()));
                };
                let earth_r = store.dimension(jde, VsopBody::Earth, Coordinate::Radius)?;
                let place = geocentric_planet(store, jde, vsop, &orientation, &self.light_time)?;
                (place.ra, place.dec, earth_r, Some(place.distance * AU))
            }
        };

        let gast = gast_deg(jd, &orientation);
        Ok(BodyLocation {
            lat: dec / RADEG,
            lon: resolve_heading(ra / RADEG - gast),
            gha_aries: gast.rem_euclid(360.0),
            rad,
            distance,
        })
    }
}

#[cfg(test)]
mod almanac_test {
    use super::*;
    use crate::time::parse_utc;
    use approx::assert_relative_eq;

    /// 0.1 arc-minute
    const TENTH_MINUTE: f64 = 0.1 / 60.0;

    #[test]
    fn test_sun_2024_11_13() {
        let almanac = Almanac::default();
        let epoch = parse_utc("2024-11-13", "20:17:45").unwrap();
        let sun = almanac.body_location(epoch, Body::Sun).unwrap();
        // GHA 128°20.4′, Dec S18°15.2′
        assert_relative_eq!(sun.gha(), 128.340599, epsilon = 1e-5);
        assert_relative_eq!(sun.lat, -18.253772, epsilon = 1e-5);
        assert_relative_eq!(sun.gha(), 128.0 + 20.5 / 60.0, epsilon = TENTH_MINUTE);
        assert_relative_eq!(sun.lat, -(18.0 + 15.2 / 60.0), epsilon = TENTH_MINUTE);
        assert_relative_eq!(sun.rad, 0.98938658, epsilon = 1e-7);
        assert!(sun.distance.is_none());
    }

    #[test]
    fn test_moon_2025_08_18() {
        let almanac = Almanac::default();
        let epoch = parse_utc("2025-08-18", "11:58:00").unwrap();
        let moon = almanac.body_location(epoch, Body::Moon).unwrap();
        assert_relative_eq!(moon.lat, 28.564435, epsilon = 1e-5);
        assert_relative_eq!(moon.lon, -61.314140, epsilon = 1e-5);
        assert_relative_eq!(moon.rad, 372_972.18, epsilon = 0.05);
        assert_eq!(moon.distance, Some(moon.rad));
    }

    #[test]
    fn test_saturn_2025_08_09() {
        let almanac = Almanac::default();
        let epoch = parse_utc("2025-08-09", "07:00:00").unwrap();
        let saturn = almanac.body_location(epoch, Body::Saturn).unwrap();
        assert_relative_eq!(saturn.lat, -1.680078, epsilon = 1e-5);
        assert_relative_eq!(saturn.lon, -60.853179, epsilon = 1e-5);
        assert_relative_eq!(saturn.distance.unwrap(), 1.3184501e9, epsilon = 1e3);
    }

    /// Sirius, 2025 January 17, 0h UT: SHA 258°26.2′, Dec S16°45.0′
    #[test]
    fn test_sirius_2025_01_17() {
        let almanac = Almanac::default();
        let epoch = parse_utc("2025-01-17", "00:00:00").unwrap();
        let sirius = almanac
            .body_location(epoch, "Sirius".parse().unwrap())
            .unwrap();
        assert_relative_eq!(sirius.sha(), 258.436920, epsilon = 1e-5);
        assert_relative_eq!(sirius.lat, -16.749921, epsilon = 1e-5);
    }

    #[test]
    fn test_star_outside_the_catalogue() {
        let almanac = Almanac::default();
        let epoch = parse_utc("2025-01-17", "21:00:00").unwrap();
        let res = almanac.body_location(epoch, Body::Star(500));
        assert_eq!(res, Err(CelnavError::UnknownBody("star #500".into())));
        let last = Body::Star(STARS.len() - 1);
        assert!(almanac.body_location(epoch, last).is_ok());
    }

    #[test]
    fn test_gha_aries_is_reduced() {
        let almanac = Almanac::default();
        let epoch = parse_utc("2024-11-13", "20:17:45").unwrap();
        let sun = almanac.body_location(epoch, Body::Sun).unwrap();
        assert_relative_eq!(sun.gha_aries, 357.873156, epsilon = 1e-5);
        assert!(sun.lon > -180.0 && sun.lon <= 180.0);
    }

    #[test]
    fn test_missing_file_fails_every_call() {
        let almanac = Almanac::new(EphemerisSource::File("/nonexistent/vsop.txt".into()));
        let epoch = parse_utc("2024-11-13", "20:17:45").unwrap();
        for _ in 0..3 {
            assert!(matches!(
                almanac.body_location(epoch, Body::Sun),
                Err(CelnavError::DataUnavailable(_))
            ));
        }
        assert!(almanac.load_error_reported.load(Ordering::Relaxed));
    }

    #[test]
    fn test_location_is_deterministic() {
        let almanac = Almanac::default();
        let epoch = parse_utc("2025-08-09", "07:00:00").unwrap();
        let a = almanac.body_location(epoch, Body::Venus).unwrap();
        let b = almanac.body_location(epoch, Body::Venus).unwrap();
        assert_eq!(a, b);
    }
}
