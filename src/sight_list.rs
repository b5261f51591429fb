//! # Sight list
//!
//! [`SightList`] owns the sights of a session together with the state they share:
//!
//! * the **clock error** (seconds) added to every sight time on recompute,
//! * the **default colour counter**, handing the next colour of
//!   [`crate::sight::colour::SIGHT_COLOURS`] to each new sight,
//! * the [`SightDefaults`] new sights start from.
//!
//! It also carries the two per-sight helpers used when working a fix:
//! [`find_body`] (where to look for the body from an assumed position, and the intercept)
//! and [`LunarResults`] (what a lunar says about the clock and the longitude).

use hifitime::Epoch;
use log::{debug, info};

use crate::{
    almanac::Almanac,
    body::Body,
    celnav_errors::CelnavError,
    constants::{ArcMin, Degree, NauticalMile, Seconds, RADEG},
    geometry::{
        spherical::{altitude_azimuth, resolve_heading_positive},
        GeoPoint, MagneticVariation,
    },
    reduction_params::{ReductionParams, SightDefaults},
    sight::{colour::Colour, Limb, Sight, SightType},
    time::shift_seconds,
};

#[derive(Debug, Clone, Default)]
pub struct SightList {
    sights: Vec<Sight>,
    clock_error: i64,
    next_colour: usize,
    pub defaults: SightDefaults,
}

impl SightList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: SightDefaults) -> Self {
        SightList {
            defaults,
            ..Default::default()
        }
    }

    /// Seconds added to every sight time.
    pub fn clock_error(&self) -> i64 {
        self.clock_error
    }

    pub fn set_clock_error(&mut self, seconds: i64) {
        self.clock_error = seconds;
    }

    /// Next default colour; the rotation wraps after the last name.
    pub fn next_colour(&mut self) -> Colour {
        let colour = Colour::nth_default(self.next_colour);
        self.next_colour = (self.next_colour + 1) % crate::sight::colour::SIGHT_COLOURS.len();
        colour
    }

    /// Create a sight with the list defaults and the next colour, and append it.
    #[allow(clippy::too_many_arguments)]
    pub fn add_new(
        &mut self,
        sight_type: SightType,
        body: Body,
        body_limb: Limb,
        date_time: Epoch,
        time_certainty: Seconds,
        measurement: Degree,
        measurement_certainty: ArcMin,
    ) -> &mut Sight {
        let colour = self.next_colour();
        let sight = Sight::new(
            sight_type,
            body,
            body_limb,
            date_time,
            time_certainty,
            measurement,
            measurement_certainty,
            &self.defaults,
            colour,
        );
        self.sights.push(sight);
        let last = self.sights.len() - 1;
        &mut self.sights[last]
    }

    pub fn push(&mut self, sight: Sight) {
        self.sights.push(sight);
    }

    pub fn remove(&mut self, index: usize) -> Option<Sight> {
        (index < self.sights.len()).then(|| self.sights.remove(index))
    }

    pub fn clear(&mut self) {
        self.sights.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Sight> {
        self.sights.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Sight> {
        self.sights.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sight> {
        self.sights.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sight> {
        self.sights.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.sights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sights.is_empty()
    }

    /// Recompute every visible sight with the list clock error, then rebuild its polygons.
    ///
    /// Hidden sights are left as they are. The first failure stops the pass; sights already
    /// processed keep their new state.
    ///
    /// Arguments
    /// ---------
    /// * `almanac`: body locations.
    /// * `params`: reduction settings.
    /// * `magnetic`: variation model for magnetic bearings and runs.
    pub fn recompute_all(
        &mut self,
        almanac: &Almanac,
        params: &ReductionParams,
        magnetic: Option<&dyn MagneticVariation>,
    ) -> Result<(), CelnavError> {
        let clock_error = self.clock_error;
        let mut count = 0;
        for sight in self.sights.iter_mut().filter(|s| s.visible) {
            sight.recompute(almanac, params, clock_error)?;
            sight.rebuild_polygons(almanac, params, magnetic)?;
            count += 1;
        }
        info!(
            "Recomputed {count} of {} sights (clock error {clock_error} s)",
            self.sights.len()
        );
        Ok(())
    }

    /// Polygon vertices of every visible, calculated sight.
    pub fn all_points(&self) -> impl Iterator<Item = &GeoPoint> {
        self.sights
            .iter()
            .filter(|s| s.visible && s.is_calculated())
            .flat_map(|s| s.lines_of_position().points())
    }
}

/// The body as seen from an assumed position, without altitude corrections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySighting {
    /// Computed altitude `Hc`
    pub altitude: Degree,
    /// Azimuth `Zn`, true or magnetic, in `[0, 360)`
    pub azimuth: Degree,
    /// `|Hc − Ho|`, when the sight has an observed altitude
    pub intercept: Option<NauticalMile>,
    /// `Ho > Hc`: the line of position lies towards the body
    pub towards: Option<bool>,
}

/// Where `sight`'s body stands from `observer` at the recorded sight time.
///
/// Arguments
/// ---------
/// * `almanac`: body locations.
/// * `sight`: the body, time and (when reduced as an altitude sight) `Ho`.
/// * `observer`: assumed position.
/// * `magnetic`: when given, the azimuth is magnetic.
///
/// Return
/// ------
/// * `Hc`, `Zn`, and the intercept with its direction for reduced altitude sights.
pub fn find_body(
    almanac: &Almanac,
    sight: &Sight,
    observer: GeoPoint,
    magnetic: Option<&dyn MagneticVariation>,
) -> Result<BodySighting, CelnavError> {
    let location = almanac.body_location(sight.date_time, sight.body)?;
    let (hc, mut zn) = altitude_azimuth(observer.lat, observer.lon, location.lat, location.lon);

    if let Some(m) = magnetic {
        zn = resolve_heading_positive(
            zn - m.variation(observer.lat, observer.lon, sight.eye_height, sight.date_time),
        );
    }

    let ho = sight.observed_altitude();
    debug!("Find {}: Hc {hc:.4}°, Zn {zn:.4}°", sight.body);
    Ok(BodySighting {
        altitude: hc,
        azimuth: zn,
        intercept: ho.map(|ho| (hc - ho).abs() * 60.0),
        towards: ho.map(|ho| hc < ho),
    })
}

/// What a reduced lunar says about the clock and the DR longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarResults {
    /// Cleared lunar distance
    pub ldc: Degree,
    /// Corrected sight time plus the time correction
    pub revised_time: Epoch,
    /// Whole seconds, truncated toward zero
    pub time_change: i64,
    /// DR longitude moved by the clock error, 15″ of longitude per second
    pub revised_lon: Degree,
    pub lon_error: ArcMin,
    /// Longitude error along the DR parallel
    pub position_error: NauticalMile,
}

impl LunarResults {
    /// `None` unless `sight` holds a lunar reduction.
    pub fn of(sight: &Sight) -> Option<Self> {
        let reduction = sight.lunar_reduction()?;
        let corrected_time = sight.corrected_time()?;
        let tc = reduction.time_correction.trunc() as i64;
        let lon_error = 0.25 * tc as f64;
        Some(LunarResults {
            ldc: reduction.corrected_distance,
            revised_time: shift_seconds(corrected_time, tc as f64),
            time_change: tc,
            revised_lon: sight.dr_lon - lon_error / 60.0,
            lon_error,
            position_error: (sight.dr_lat * RADEG).cos() * lon_error,
        })
    }
}

#[cfg(test)]
mod sight_list_test {
    use super::*;
    use crate::{sight::LunarInputs, sight::LunarLimb, time::parse_utc};
    use approx::assert_relative_eq;

    fn add_sun(list: &mut SightList, measurement: Degree) -> usize {
        list.add_new(
            SightType::Altitude,
            Body::Sun,
            Limb::Lower,
            parse_utc("2024-11-13", "20:17:45").unwrap(),
            0.0,
            measurement,
            0.25,
        );
        list.len() - 1
    }

    #[test]
    fn test_colour_rotation() {
        let mut list = SightList::new();
        let names: Vec<String> = (0..41).map(|_| list.next_colour().name).collect();
        assert_eq!(names[0], "medium violet red");
        assert_eq!(names[1], "midnight blue");
        assert_eq!(names[40], names[0]);

        let mut other = SightList::new();
        add_sun(&mut other, 10.0);
        add_sun(&mut other, 10.0);
        assert_eq!(other.get(1).unwrap().colour.name, "midnight blue");
    }

    #[test]
    fn test_add_remove() {
        let mut list = SightList::with_defaults(SightDefaults {
            eye_height: 3.0,
            ..Default::default()
        });
        add_sun(&mut list, 10.0);
        assert_eq!(list.get(0).unwrap().eye_height, 3.0);
        assert!(list.remove(3).is_none());
        assert!(list.remove(0).is_some());
        assert!(list.is_empty());
    }

    #[test]
    fn test_recompute_all_applies_clock_error() {
        let almanac = Almanac::default();
        let params = ReductionParams::default();
        let mut list = SightList::new();
        add_sun(&mut list, 11.5);
        let hidden = add_sun(&mut list, 11.5);
        list.get_mut(hidden).unwrap().visible = false;
        list.set_clock_error(-30);

        list.recompute_all(&almanac, &params, None).unwrap();
        let s = list.get(0).unwrap();
        assert_eq!(s.corrected_time(), Some(shift_seconds(s.date_time, -30.0)));
        assert!(s.is_calculated());
        assert!(list.get(hidden).unwrap().reduction().is_none());
        assert_eq!(
            list.all_points().count(),
            s.lines_of_position().points().count()
        );
    }

    #[test]
    fn test_find_body_intercept() {
        let almanac = Almanac::default();
        let mut list = SightList::new();
        let i = add_sun(&mut list, 11.0 + 25.0 / 60.0);
        let sight = list.get_mut(i).unwrap();
        sight.recompute(&almanac, &ReductionParams::default(), 0).unwrap();
        let ho = sight.observed_altitude().unwrap();

        let observer = GeoPoint::new(-5.0, -150.0);
        let found = find_body(&almanac, sight, observer, None).unwrap();
        assert!((0.0..360.0).contains(&found.azimuth));
        assert_relative_eq!(found.intercept.unwrap(), (found.altitude - ho).abs() * 60.0);
        assert_eq!(found.towards, Some(found.altitude < ho));

        let model = |_: f64, _: f64, _: f64, _: Epoch| 10.0;
        let magnetic = find_body(&almanac, sight, observer, Some(&model)).unwrap();
        assert_relative_eq!(
            magnetic.azimuth,
            resolve_heading_positive(found.azimuth - 10.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_find_body_without_reduction() {
        let almanac = Almanac::default();
        let mut list = SightList::new();
        let i = add_sun(&mut list, 11.0);
        let found = find_body(&almanac, list.get(i).unwrap(), GeoPoint::new(0.0, 0.0), None).unwrap();
        assert_eq!(found.intercept, None);
        assert_eq!(found.towards, None);
    }

    #[test]
    fn test_lunar_results() {
        let almanac = Almanac::default();
        let mut list = SightList::new();
        let sight = list.add_new(
            SightType::Lunar,
            Body::Sun,
            Limb::Lower,
            parse_utc("2025-08-18", "11:58:00").unwrap(),
            0.0,
            59.0 + 18.8 / 60.0,
            0.25,
        );
        sight.eye_height = 2.4;
        sight.temperature = 17.0;
        sight.pressure = 1013.0;
        sight.index_error = -0.8;
        sight.dr_lat = 60.0;
        sight.dr_lon = -20.0;
        sight.lunar = LunarInputs {
            moon_altitude: 70.0 + 4.0 / 60.0,
            moon_limb: Limb::Lower,
            body_altitude: 17.0 + 1.0 / 60.0,
            body_limb: Limb::Lower,
            limb: LunarLimb::Near,
        };
        assert!(LunarResults::of(sight).is_none());
        sight.recompute(&almanac, &ReductionParams::default(), 0).unwrap();

        let r = LunarResults::of(sight).unwrap();
        // -93.85 s truncates toward zero
        assert_eq!(r.time_change, -93);
        let tc = r.time_change as f64;
        assert_eq!(r.revised_time, shift_seconds(sight.date_time, tc));
        assert_relative_eq!(r.lon_error, 0.25 * tc);
        assert_relative_eq!(r.revised_lon, -20.0 - 0.25 * tc / 60.0);
        assert_relative_eq!(r.position_error, 0.5 * 0.25 * tc, epsilon = 1e-12);
    }
}
