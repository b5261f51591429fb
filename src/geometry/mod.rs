//! # Lines of position
//!
//! Candidate-position envelopes of a sight, built by sampling the measurement within its
//! uncertainty and wrapping each band of samples in a convex polygon.
//!
//! | Builder | Input | Method |
//! |---|---|---|
//! | [`altitude_lop::build_altitude_lop`] | observed altitude | direct problem from the body sub-point, swept over bearing |
//! | [`bearing_lop::build_bearing_lop`] | measured bearing | iterative inverse problem, stepped away from the sub-point |
//!
//! Both return a [`LinesOfPosition`]: polygons plus a centre line, to which
//! [`dr_shift::apply_dr_shift`] applies the vessel's run since the sight.
//!
//! Points are stored as `(lat, lon)` in degrees. The hull treats `lat` as `x` and `lon` as `y`.

pub mod altitude_lop;
pub mod bearing_lop;
pub mod dr_shift;
pub mod hull;
pub mod spherical;

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::{
    body::Body,
    constants::{ArcMin, Degree, Meter, Seconds},
};

/// Geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: Degree,
    pub lon: Degree,
}

impl GeoPoint {
    pub fn new(lat: Degree, lon: Degree) -> Self {
        GeoPoint { lat, lon }
    }
}

/// Polygons and centre line of a sight.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinesOfPosition {
    pub polygons: Vec<Vec<GeoPoint>>,
    pub line: Vec<GeoPoint>,
    /// The build stopped on a cancellation request
    pub interrupted: bool,
}

impl LinesOfPosition {
    /// Every polygon vertex, in order.
    pub fn points(&self) -> impl Iterator<Item = &GeoPoint> {
        self.polygons.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.line.is_empty()
    }
}

/// A reduced measurement and its uncertainty, as sampled by the builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LopRequest {
    pub body: Body,
    /// Sight time after clock correction
    pub epoch: Epoch,
    /// Half-width of the time band
    pub time_certainty: Seconds,
    /// Observed altitude, or measured bearing
    pub measurement: Degree,
    /// Half-width of the measurement band
    pub measurement_certainty: ArcMin,
}

impl LopRequest {
    /// Measurement band `(min, max, step)` in degrees.
    pub(crate) fn measurement_band(&self) -> (Degree, Degree, Degree) {
        let certainty = self.measurement_certainty / 60.0;
        let min = self.measurement - certainty;
        let max = self.measurement + certainty;
        (min, max, compute_step_size(certainty, 1.0, min, max))
    }
}

/// Source of magnetic variation (east positive), e.g. a world magnetic model.
pub trait MagneticVariation {
    fn variation(&self, lat: Degree, lon: Degree, altitude: Meter, epoch: Epoch) -> Degree;
}

impl<F> MagneticVariation for F
where
    F: Fn(Degree, Degree, Meter, Epoch) -> Degree,
{
    fn variation(&self, lat: Degree, lon: Degree, altitude: Meter, epoch: Epoch) -> Degree {
        self(lat, lon, altitude, epoch)
    }
}

/// Provider used when no magnetic model is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariation;

impl MagneticVariation for NoVariation {
    fn variation(&self, _lat: Degree, _lon: Degree, _altitude: Meter, _epoch: Epoch) -> Degree {
        0.0
    }
}

/// Magnetic model evaluated for one sight: observer height and instant are fixed.
#[derive(Clone, Copy)]
pub struct MagneticContext<'a> {
    pub provider: &'a dyn MagneticVariation,
    pub eye_height: Meter,
    pub epoch: Epoch,
}

impl MagneticContext<'_> {
    #[inline]
    pub fn at(&self, lat: Degree, lon: Degree) -> Degree {
        self.provider
            .variation(lat, lon, self.eye_height, self.epoch)
    }
}

/// Sampling of a measurement band `[min, max]`.
///
/// The band is cut in `floor(certainty / stepsize) + 1` intervals; a zero-width band gives
/// a zero step.
pub fn compute_step_size(certainty: f64, stepsize: f64, min: f64, max: f64) -> f64 {
    (max - min) / ((certainty / stepsize).floor() + 1.0)
}

/// Samples `min, min + step, …` up to `max` included, `count + 1` values.
///
/// A zero step yields the single value `min`.
pub(crate) fn band_samples(min: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = if step > 0.0 {
        // tolerate the rounding of `(max - min) / step`
        ((max - min) / step + 1e-9).floor() as usize
    } else {
        0
    };
    (0..=count).map(move |k| min + k as f64 * step)
}

/// Time offsets sampled within `±time_certainty`, with step `max(2·certainty, 1)` seconds.
pub(crate) fn time_samples(time_certainty: Seconds) -> impl Iterator<Item = Seconds> {
    let step = (2.0 * time_certainty).max(1.0);
    band_samples(-time_certainty, time_certainty, step)
}

/// Mean of a band, `None` when empty.
pub(crate) fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lon) = points
        .iter()
        .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));
    Some(GeoPoint::new(lat / n, lon / n))
}

#[cfg(test)]
mod geometry_test {
    use super::*;

    #[test]
    fn test_compute_step_size() {
        // 0.25' of certainty: one interval over the whole band
        let c = 0.25 / 60.0;
        assert_eq!(compute_step_size(c, 1.0, 10.0 - c, 10.0 + c), 2.0 * c);
        // 2.5° of certainty: three intervals
        assert_eq!(compute_step_size(2.5, 1.0, 7.5, 12.5), 5.0 / 3.0);
    }

    #[test]
    fn test_band_samples() {
        let s: Vec<f64> = band_samples(-1.0, 1.0, 1.0).collect();
        assert_eq!(s, vec![-1.0, 0.0, 1.0]);
        let s: Vec<f64> = band_samples(3.0, 3.0, 0.0).collect();
        assert_eq!(s, vec![3.0]);
        let c = 0.25 / 60.0;
        let step = compute_step_size(c, 1.0, 11.5 - c, 11.5 + c);
        assert_eq!(band_samples(11.5 - c, 11.5 + c, step).count(), 2);
    }

    #[test]
    fn test_time_samples() {
        assert_eq!(time_samples(0.0).collect::<Vec<_>>(), vec![0.0]);
        assert_eq!(time_samples(5.0).collect::<Vec<_>>(), vec![-5.0, 5.0]);
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&[]), None);
        let c = centroid(&[GeoPoint::new(0.0, 0.0), GeoPoint::new(2.0, 4.0)]).unwrap();
        assert_eq!(c, GeoPoint::new(1.0, 2.0));
    }

    #[test]
    fn test_closure_as_magnetic_model() {
        let model = |_lat: f64, lon: f64, _h: f64, _e: Epoch| lon / 10.0;
        let epoch = Epoch::from_gregorian_utc_at_midnight(2025, 1, 1);
        let ctx = MagneticContext {
            provider: &model,
            eye_height: 2.0,
            epoch,
        };
        assert_eq!(ctx.at(0.0, -50.0), -5.0);
        assert_eq!(NoVariation.variation(1.0, 2.0, 3.0, epoch), 0.0);
    }
}
