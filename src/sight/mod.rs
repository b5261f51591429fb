//! # Sights
//!
//! A [`Sight`] is one sextant observation: its inputs (type, body, time, measurement,
//! observer conditions, run since the sight) and the state derived from them.
//!
//! Two operations drive the derived state:
//!
//! 1. [`Sight::recompute`] applies the clock offset and runs the reduction of the sight's
//!    type, recording every formula in a [`trace::CalcTrace`]:
//!    * **Altitude**: `Hs` to `Ho` ([`altitude::reduce_altitude`]),
//!    * **Azimuth**: bearing brought into `[0, 360)`,
//!    * **Lunar**: clock error from a lunar distance ([`lunar::reduce_lunar`]).
//! 2. [`Sight::rebuild_polygons`] turns the reduced measurement into lines of position and
//!    applies the dead-reckoning shift. Lunar sights have no polygons.
//!
//! A failing call leaves the previous derived state untouched.
//!
//! ## Example
//!
//! ```rust
//! use celnav::almanac::Almanac;
//! use celnav::body::Body;
//! use celnav::reduction_params::{ReductionParams, SightDefaults};
//! use celnav::sight::{colour::Colour, Limb, Sight, SightType};
//! use celnav::time::parse_utc;
//!
//! let almanac = Almanac::default();
//! let mut sight = Sight::new(
//!     SightType::Altitude,
//!     Body::Sun,
//!     Limb::Lower,
//!     parse_utc("2024-11-13", "20:17:45").unwrap(),
//!     0.0,
//!     11.0 + 25.0 / 60.0,
//!     0.25,
//!     &SightDefaults::default(),
//!     Colour::default(),
//! );
//! sight.recompute(&almanac, &ReductionParams::default(), 0).unwrap();
//! assert!(sight.observed_altitude().unwrap() > 11.5);
//! ```

pub mod altitude;
pub mod colour;
pub mod lunar;
pub mod trace;

use std::fmt;

use hifitime::Epoch;
use log::debug;

use crate::{
    almanac::Almanac,
    body::Body,
    celnav_errors::CelnavError,
    constants::{ArcMin, Degree, Meter, NauticalMile, Seconds},
    geometry::{
        altitude_lop::build_altitude_lop, bearing_lop::build_bearing_lop_with_cancel,
        dr_shift::apply_dr_shift, spherical::resolve_heading_positive, LinesOfPosition,
        LopRequest, MagneticContext, MagneticVariation, NoVariation,
    },
    reduction_params::{ReductionParams, SightDefaults},
    time::{jde_tt, shift_seconds},
};

use self::{
    altitude::{reduce_altitude, AltitudeReduction, Environment},
    colour::Colour,
    lunar::{reduce_lunar, LunarReduction},
    trace::{AlmanacHeader, CalcTrace},
};

/// What the measurement of a sight is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SightType {
    #[default]
    Altitude,
    Azimuth,
    Lunar,
}

impl SightType {
    /// Persisted code.
    pub fn code(self) -> i32 {
        match self {
            SightType::Altitude => 0,
            SightType::Azimuth => 1,
            SightType::Lunar => 2,
        }
    }
}

impl TryFrom<i32> for SightType {
    type Error = CelnavError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SightType::Altitude),
            1 => Ok(SightType::Azimuth),
            2 => Ok(SightType::Lunar),
            other => Err(CelnavError::InvalidSightType(other)),
        }
    }
}

impl fmt::Display for SightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SightType::Altitude => "Altitude",
            SightType::Azimuth => "Azimuth",
            SightType::Lunar => "Lunar",
        })
    }
}

/// Edge of the disk brought to the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Limb {
    Upper,
    #[default]
    Lower,
    Center,
}

impl Limb {
    pub fn code(self) -> i32 {
        match self {
            Limb::Upper => 0,
            Limb::Lower => 1,
            Limb::Center => 2,
        }
    }
}

impl TryFrom<i32> for Limb {
    type Error = CelnavError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Limb::Upper),
            1 => Ok(Limb::Lower),
            2 => Ok(Limb::Center),
            other => Err(CelnavError::InvalidLimb(other)),
        }
    }
}

impl fmt::Display for Limb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Limb::Upper => "Upper",
            Limb::Lower => "Lower",
            Limb::Center => "Center",
        })
    }
}

/// Limbs a lunar distance is measured between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LunarLimb {
    /// Moon limb nearest the body
    #[default]
    Near,
    Far,
    Center,
}

impl LunarLimb {
    pub fn code(self) -> i32 {
        match self {
            LunarLimb::Center => 2,
            LunarLimb::Near => 3,
            LunarLimb::Far => 4,
        }
    }
}

impl TryFrom<i32> for LunarLimb {
    type Error = CelnavError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            2 => Ok(LunarLimb::Center),
            3 => Ok(LunarLimb::Near),
            4 => Ok(LunarLimb::Far),
            other => Err(CelnavError::InvalidLimb(other)),
        }
    }
}

impl fmt::Display for LunarLimb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LunarLimb::Near => "Near",
            LunarLimb::Far => "Far",
            LunarLimb::Center => "Center",
        })
    }
}

/// Altitudes taken with a lunar distance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LunarInputs {
    /// Sextant altitude of the Moon
    pub moon_altitude: Degree,
    pub moon_limb: Limb,
    /// Sextant altitude of the other body
    pub body_altitude: Degree,
    pub body_limb: Limb,
    /// Limbs of the distance itself
    pub limb: LunarLimb,
}

/// Result of a reduction, by sight type.
#[derive(Debug, Clone, PartialEq)]
pub enum SightOutcome {
    Altitude(AltitudeReduction),
    Azimuth { bearing: Degree },
    Lunar(LunarReduction),
}

/// Derived state of the last successful [`Sight::recompute`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Sight time plus the clock offset
    pub corrected_time: Epoch,
    pub outcome: SightOutcome,
    pub trace: CalcTrace,
}

/// One observation and the state derived from it.
///
/// The inputs are public fields. A direct write leaves the reduction, the trace and the
/// polygons describing the old inputs until [`Sight::recompute`] and
/// [`Sight::rebuild_polygons`] run again. [`Sight::edit`] drops them in the same call, so
/// that nothing stale can be read back.
#[derive(Debug, Clone, PartialEq)]
pub struct Sight {
    pub visible: bool,
    pub sight_type: SightType,
    pub body: Body,
    pub body_limb: Limb,
    pub date_time: Epoch,
    pub time_certainty: Seconds,
    /// Sextant altitude, bearing or lunar distance, degrees
    pub measurement: Degree,
    pub measurement_certainty: ArcMin,

    pub eye_height: Meter,
    /// °C
    pub temperature: f64,
    /// hPa
    pub pressure: f64,
    pub index_error: ArcMin,

    pub shift_nm: NauticalMile,
    pub shift_bearing: Degree,
    pub magnetic_shift_bearing: bool,

    pub colour: Colour,

    pub lunar: LunarInputs,
    /// DR position the lunar results are given for
    pub dr_lat: Degree,
    pub dr_lon: Degree,
    /// Bearing measured against magnetic north
    pub magnetic_north: bool,

    reduction: Option<Reduction>,
    lop: LinesOfPosition,
    calculated: bool,
}

impl Sight {
    /// Create a visible sight with the environment of `defaults` and no run.
    ///
    /// Arguments
    /// ---------
    /// * `sight_type`: altitude, azimuth or lunar.
    /// * `body`: observed body, the second body for a lunar.
    /// * `body_limb`: limb of an altitude sight.
    /// * `date_time`: UTC time read on the clock.
    /// * `time_certainty`: seconds.
    /// * `measurement`: degrees.
    /// * `measurement_certainty`: arc-minutes.
    /// * `defaults`: eye height, temperature, pressure and index error.
    /// * `colour`: usually the next colour of the owning [`crate::sight_list::SightList`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sight_type: SightType,
        body: Body,
        body_limb: Limb,
        date_time: Epoch,
        time_certainty: Seconds,
        measurement: Degree,
        measurement_certainty: ArcMin,
        defaults: &SightDefaults,
        colour: Colour,
    ) -> Self {
        Sight {
            visible: true,
            sight_type,
            body,
            body_limb,
            date_time,
            time_certainty,
            measurement,
            measurement_certainty,
            eye_height: defaults.eye_height,
            temperature: defaults.temperature,
            pressure: defaults.pressure,
            index_error: defaults.index_error,
            shift_nm: 0.0,
            shift_bearing: 0.0,
            magnetic_shift_bearing: true,
            colour,
            lunar: LunarInputs::default(),
            dr_lat: 0.0,
            dr_lon: 0.0,
            magnetic_north: true,
            reduction: None,
            lop: LinesOfPosition::default(),
            calculated: false,
        }
    }

    /// Change inputs through `f`, then forget the reduction and the polygons.
    ///
    /// ```rust
    /// # use celnav::{body::Body, reduction_params::SightDefaults, time::parse_utc};
    /// # use celnav::sight::{colour::Colour, Limb, Sight, SightType};
    /// # let mut sight = Sight::new(SightType::Altitude, Body::Sun, Limb::Lower,
    /// #     parse_utc("2024-11-13", "20:17:45").unwrap(), 0.0, 11.4, 0.25,
    /// #     &SightDefaults::default(), Colour::default());
    /// sight.edit(|s| s.measurement += 1.0 / 60.0);
    /// assert!(sight.reduction().is_none());
    /// ```
    pub fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Sight),
    {
        f(self);
        self.invalidate();
    }

    /// Drop the derived state.
    pub fn invalidate(&mut self) {
        self.reduction = None;
        self.lop = LinesOfPosition::default();
        self.calculated = false;
    }

    pub fn environment(&self) -> Environment {
        Environment {
            eye_height: self.eye_height,
            temperature: self.temperature,
            pressure: self.pressure,
            index_error: self.index_error,
        }
    }

    /// Reduce the sight at `date_time + clock_offset`.
    ///
    /// The new trace and outcome replace the previous ones only on success. Polygons built
    /// from the previous reduction are dropped.
    ///
    /// Arguments
    /// ---------
    /// * `almanac`: body locations.
    /// * `params`: lunar method and constants.
    /// * `clock_offset`: seconds added to the recorded time.
    ///
    /// Errors
    /// ------
    /// * Locator errors, [`CelnavError::InvalidSightField`] for a lunar taken on the Moon.
    pub fn recompute(
        &mut self,
        almanac: &Almanac,
        params: &ReductionParams,
        clock_offset: i64,
    ) -> Result<(), CelnavError> {
        let corrected_time = shift_seconds(self.date_time, clock_offset as f64);
        let mut trace = CalcTrace::new();
        if clock_offset != 0 {
            trace.note(format!(
                "Applying clock correction of {clock_offset} seconds"
            ));
            debug!("{} sight on {}: clock correction {clock_offset} s", self.sight_type, self.body);
        }

        let env = self.environment();
        let outcome = match self.sight_type {
            SightType::Altitude => {
                let location = almanac.body_location(corrected_time, self.body)?;
                let reduction = reduce_altitude(
                    self.measurement,
                    self.body_limb,
                    self.body,
                    &location,
                    jde_tt(corrected_time),
                    &env,
                    "",
                    &mut trace,
                );
                trace.add_header(AlmanacHeader::new(
                    self.body,
                    corrected_time,
                    &location,
                    reduction.disk.semi_diameter,
                    reduction.disk.horizontal_parallax,
                ));
                SightOutcome::Altitude(reduction)
            }
            SightType::Azimuth => {
                let bearing = trace.angle(
                    "Bearing",
                    "Measurement in [0, 360)",
                    format!("{:.4}°", self.measurement),
                    resolve_heading_positive(self.measurement),
                );
                SightOutcome::Azimuth { bearing }
            }
            SightType::Lunar => SightOutcome::Lunar(reduce_lunar(
                almanac,
                corrected_time,
                self.body,
                self.measurement,
                &self.lunar,
                &env,
                params,
                &mut trace,
            )?),
        };

        self.reduction = Some(Reduction {
            corrected_time,
            outcome,
            trace,
        });
        self.lop = LinesOfPosition::default();
        self.calculated = false;
        Ok(())
    }

    /// Build the lines of position of the last reduction and apply the run.
    ///
    /// See [`Sight::rebuild_polygons_with_cancel`].
    pub fn rebuild_polygons(
        &mut self,
        almanac: &Almanac,
        params: &ReductionParams,
        magnetic: Option<&dyn MagneticVariation>,
    ) -> Result<(), CelnavError> {
        self.rebuild_polygons_with_cancel(almanac, params, magnetic, || false)
    }

    /// Build the lines of position of the last reduction, polling `should_cancel` during
    /// bearing builds.
    ///
    /// Altitude sights sweep `Ho ± certainty`, azimuth sights the bearing. A magnetic bearing
    /// (`magnetic_north`) and a magnetic run (`magnetic_shift_bearing`) use `magnetic`, or
    /// zero variation without one. An interrupted build is kept but the sight is not marked
    /// calculated.
    ///
    /// Arguments
    /// ---------
    /// * `almanac`: body locations.
    /// * `params`: sweep and solver settings.
    /// * `magnetic`: magnetic variation model.
    /// * `should_cancel`: cancellation request, see
    ///   [`crate::geometry::bearing_lop::build_bearing_lop_with_cancel`].
    ///
    /// Errors
    /// ------
    /// * [`CelnavError::InvalidSightField`] when the sight has not been reduced.
    /// * Locator errors.
    pub fn rebuild_polygons_with_cancel<F>(
        &mut self,
        almanac: &Almanac,
        params: &ReductionParams,
        magnetic: Option<&dyn MagneticVariation>,
        should_cancel: F,
    ) -> Result<(), CelnavError>
    where
        F: FnMut() -> bool,
    {
        let reduction = self.reduction.as_ref().ok_or_else(|| {
            CelnavError::InvalidSightField("sight must be recomputed before its polygons".into())
        })?;

        let provider: &dyn MagneticVariation = match magnetic {
            Some(m) => m,
            None => &NoVariation,
        };
        let context = MagneticContext {
            provider,
            eye_height: self.eye_height,
            epoch: reduction.corrected_time,
        };
        let request = |measurement| LopRequest {
            body: self.body,
            epoch: reduction.corrected_time,
            time_certainty: self.time_certainty,
            measurement,
            measurement_certainty: self.measurement_certainty,
        };

        let mut lop = match &reduction.outcome {
            SightOutcome::Altitude(r) => {
                build_altitude_lop(almanac, &request(r.observed_altitude), params)?
            }
            SightOutcome::Azimuth { bearing } => build_bearing_lop_with_cancel(
                almanac,
                &request(*bearing),
                params,
                self.magnetic_north.then_some(context),
                should_cancel,
            )?,
            SightOutcome::Lunar(_) => {
                self.lop = LinesOfPosition::default();
                return Ok(());
            }
        };

        apply_dr_shift(
            &mut lop,
            self.shift_nm,
            self.shift_bearing,
            self.magnetic_shift_bearing.then_some(context),
        );

        debug!(
            "{} sight on {}: {} polygons, {} line points{}",
            self.sight_type,
            self.body,
            lop.polygons.len(),
            lop.line.len(),
            if lop.interrupted { " (interrupted)" } else { "" }
        );
        self.calculated = !lop.interrupted;
        self.lop = lop;
        Ok(())
    }

    pub fn reduction(&self) -> Option<&Reduction> {
        self.reduction.as_ref()
    }

    pub fn corrected_time(&self) -> Option<Epoch> {
        self.reduction.as_ref().map(|r| r.corrected_time)
    }

    pub fn trace(&self) -> Option<&CalcTrace> {
        self.reduction.as_ref().map(|r| &r.trace)
    }

    /// `Ho` of a reduced altitude sight.
    pub fn observed_altitude(&self) -> Option<Degree> {
        match self.reduction.as_ref()?.outcome {
            SightOutcome::Altitude(r) => Some(r.observed_altitude),
            _ => None,
        }
    }

    /// Bearing of a reduced azimuth sight, in `[0, 360)`.
    pub fn bearing(&self) -> Option<Degree> {
        match self.reduction.as_ref()?.outcome {
            SightOutcome::Azimuth { bearing } => Some(bearing),
            _ => None,
        }
    }

    pub fn lunar_reduction(&self) -> Option<&LunarReduction> {
        match &self.reduction.as_ref()?.outcome {
            SightOutcome::Lunar(r) => Some(r),
            _ => None,
        }
    }

    /// Clock error found by a lunar, seconds.
    pub fn time_correction(&self) -> Option<Seconds> {
        self.lunar_reduction().map(|r| r.time_correction)
    }

    /// Cleared lunar distance `LDC`.
    pub fn ldc(&self) -> Option<Degree> {
        self.lunar_reduction().map(|r| r.corrected_distance)
    }

    pub fn lines_of_position(&self) -> &LinesOfPosition {
        &self.lop
    }

    /// The polygons reflect the current reduction.
    pub fn is_calculated(&self) -> bool {
        self.calculated
    }
}

#[cfg(test)]
mod sight_test {
    use super::*;
    use crate::{ephemeris::EphemerisSource, time::parse_utc};
    use approx::assert_relative_eq;

    fn sun_sight(sight_type: SightType, measurement: Degree) -> Sight {
        let mut s = Sight::new(
            sight_type,
            Body::Sun,
            Limb::Lower,
            parse_utc("2024-11-13", "20:17:45").unwrap(),
            0.0,
            measurement,
            0.25,
            &SightDefaults::default(),
            Colour::default(),
        );
        s.eye_height = 2.4;
        s.temperature = 15.0;
        s.pressure = 1013.0;
        s.index_error = 3.2;
        s
    }

    #[test]
    fn test_codes() {
        assert_eq!(SightType::try_from(2).unwrap(), SightType::Lunar);
        assert_eq!(SightType::try_from(3), Err(CelnavError::InvalidSightType(3)));
        assert_eq!(Limb::try_from(Limb::Center.code()).unwrap(), Limb::Center);
        assert_eq!(Limb::try_from(5), Err(CelnavError::InvalidLimb(5)));
        assert_eq!(LunarLimb::try_from(3).unwrap(), LunarLimb::Near);
        assert_eq!(LunarLimb::Center.code(), Limb::Center.code());
        assert_eq!(LunarLimb::try_from(0), Err(CelnavError::InvalidLimb(0)));
    }

    #[test]
    fn test_recompute_altitude() {
        let almanac = Almanac::default();
        let mut s = sun_sight(SightType::Altitude, 11.0 + 25.0 / 60.0);
        s.recompute(&almanac, &ReductionParams::default(), 0).unwrap();

        assert_relative_eq!(s.observed_altitude().unwrap(), 11.51309932, epsilon = 1e-5);
        let trace = s.trace().unwrap();
        assert!(trace.notes().is_empty());
        assert_eq!(trace.headers().len(), 1);
        assert!(trace.find("Ho").is_some());
        assert_eq!(s.time_correction(), None);
        assert!(!s.is_calculated());
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let almanac = Almanac::default();
        let params = ReductionParams::default();
        let mut s = sun_sight(SightType::Altitude, 11.0 + 25.0 / 60.0);
        s.recompute(&almanac, &params, 0).unwrap();
        let first = s.observed_altitude().unwrap();
        s.recompute(&almanac, &params, 0).unwrap();
        assert_eq!(first.to_bits(), s.observed_altitude().unwrap().to_bits());
    }

    #[test]
    fn test_clock_offset() {
        let almanac = Almanac::default();
        let mut s = sun_sight(SightType::Altitude, 11.0 + 25.0 / 60.0);
        s.recompute(&almanac, &ReductionParams::default(), 5).unwrap();
        assert_eq!(
            s.trace().unwrap().notes(),
            ["Applying clock correction of 5 seconds".to_string()]
        );
        assert_eq!(
            s.corrected_time().unwrap(),
            shift_seconds(s.date_time, 5.0)
        );
    }

    #[test]
    fn test_edit_drops_stale_state() {
        let almanac = Almanac::default();
        let params = ReductionParams::default();
        let mut s = sun_sight(SightType::Altitude, 11.0 + 25.0 / 60.0);
        s.recompute(&almanac, &params, 0).unwrap();
        s.rebuild_polygons(&almanac, &params, None).unwrap();
        assert!(s.is_calculated());

        s.edit(|s| s.measurement = 12.0);
        assert!(!s.is_calculated());
        assert_eq!(s.observed_altitude(), None);
        assert!(s.trace().is_none());
        assert!(s.lines_of_position().polygons.is_empty());

        s.recompute(&almanac, &params, 0).unwrap();
        assert!(s.observed_altitude().unwrap() > 12.0);
    }

    #[test]
    fn test_recompute_azimuth() {
        let almanac = Almanac::default();
        let mut s = sun_sight(SightType::Azimuth, -45.0);
        s.recompute(&almanac, &ReductionParams::default(), 0).unwrap();
        assert_eq!(s.bearing(), Some(315.0));
        assert_eq!(s.observed_altitude(), None);
    }

    #[test]
    fn test_failed_recompute_keeps_state() {
        let mut s = sun_sight(SightType::Altitude, 11.0 + 25.0 / 60.0);
        s.recompute(&Almanac::default(), &ReductionParams::default(), 0)
            .unwrap();
        let before = s.clone();

        let broken = Almanac::new(EphemerisSource::File("/nonexistent/vsop87.txt".into()));
        let res = s.recompute(&broken, &ReductionParams::default(), 10);
        assert!(matches!(res, Err(CelnavError::DataUnavailable(_))));
        assert_eq!(s, before);
    }

    #[test]
    fn test_rebuild_requires_reduction() {
        let mut s = sun_sight(SightType::Altitude, 11.0 + 25.0 / 60.0);
        let res = s.rebuild_polygons(&Almanac::default(), &ReductionParams::default(), None);
        assert!(matches!(res, Err(CelnavError::InvalidSightField(_))));
    }

    #[test]
    fn test_rebuild_altitude_with_shift() {
        let almanac = Almanac::default();
        let params = ReductionParams::default();
        let mut s = sun_sight(SightType::Altitude, 11.0 + 25.0 / 60.0);
        s.recompute(&almanac, &params, 0).unwrap();
        s.rebuild_polygons(&almanac, &params, None).unwrap();
        assert!(s.is_calculated());
        let unshifted = s.lines_of_position().clone();
        assert_eq!(unshifted.polygons.len(), 361);

        s.shift_nm = 60.0;
        s.shift_bearing = 0.0;
        s.magnetic_shift_bearing = false;
        s.rebuild_polygons(&almanac, &params, None).unwrap();
        let shifted = s.lines_of_position();
        assert_relative_eq!(shifted.line[0].lat, unshifted.line[0].lat + 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_lunar_has_no_polygons() {
        let almanac = Almanac::default();
        let params = ReductionParams::default();
        let mut s = sun_sight(SightType::Lunar, 59.0 + 18.8 / 60.0);
        s.date_time = parse_utc("2025-08-18", "11:58:00").unwrap();
        s.lunar = LunarInputs {
            moon_altitude: 70.0 + 4.0 / 60.0,
            moon_limb: Limb::Lower,
            body_altitude: 17.0 + 1.0 / 60.0,
            body_limb: Limb::Lower,
            limb: LunarLimb::Near,
        };
        s.recompute(&almanac, &params, 0).unwrap();
        assert!(s.ldc().is_some());
        s.rebuild_polygons(&almanac, &params, None).unwrap();
        assert!(s.lines_of_position().is_empty());
        assert!(!s.is_calculated());
    }
}
