//! Bearing line of position: the points from which the body is seen in the measured
//! direction, true or magnetic.
//!
//! There is no closed form once a magnetic model is involved, so the line is walked
//! outwards from the sub-point in 1° steps. At each step the direction of the step is
//! corrected until the back-bearing from the new point matches the measurement.
//!
//! ### Cooperative cancellation
//! [`build_bearing_lop_with_cancel`] calls `should_cancel()` on wall-clock intervals
//! (not step counts). A cancelled build returns the polygons built so far with
//! [`LinesOfPosition::interrupted`] set.
//!
//! ### Progress UI (feature: `progress`)
//! Magnetic builds render an `indicatif` bar updated every ten steps.

use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, info};

#[cfg(feature = "progress")]
use crate::progress_bar::{fmt_dur, lop_progress_bar, IterTimer};
#[cfg(feature = "progress")]
use indicatif::ProgressBar;

use crate::{
    almanac::Almanac, celnav_errors::CelnavError, constants::Degree,
    reduction_params::ReductionParams, time::shift_seconds,
};

use super::{
    band_samples, centroid,
    hull::reduce_to_convex_polygon,
    spherical::{back_bearing, central_angle, distance_point, resolve_heading},
    time_samples, GeoPoint, LinesOfPosition, LopRequest, MagneticContext,
};

/// Steps of 1° walked away from the sub-point.
const SWEEP_STEPS: u64 = 200;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Last accepted step of one azimuth: direction of travel and point reached.
pub type Track = (Degree, GeoPoint);

/// Iterative solver of the bearing inverse problem.
#[derive(Clone, Copy)]
pub struct BearingSolver<'a> {
    params: &'a ReductionParams,
    magnetic: Option<MagneticContext<'a>>,
}

impl<'a> BearingSolver<'a> {
    pub fn new(params: &'a ReductionParams, magnetic: Option<MagneticContext<'a>>) -> Self {
        BearingSolver { params, magnetic }
    }

    #[inline]
    fn variation(&self, p: GeoPoint) -> Degree {
        self.magnetic.map_or(0.0, |m| m.at(p.lat, p.lon))
    }

    /// Take one 1° step along the bearing line.
    ///
    /// Without a previous track the walk starts at the sub-point, heading opposite to the
    /// measured bearing (corrected for the variation at the sub-point).
    ///
    /// Arguments
    /// ---------
    /// * `bearing`: measured bearing of the body, degrees.
    /// * `track`: last accepted step for this bearing, if any.
    /// * `body`: sub-point of the body.
    ///
    /// Return
    /// ------
    /// * The new point and direction of travel, or `None` when the back-bearing residual
    ///   stays above `bearing_accept_residual` or the point is 90° or more from the body.
    pub fn bearing_point(
        &self,
        bearing: Degree,
        track: Option<Track>,
        body: GeoPoint,
    ) -> Option<Track> {
        let (trace, last) = track.unwrap_or_else(|| {
            (
                resolve_heading(bearing) + self.variation(body) + 180.0,
                body,
            )
        });
        let mut trace = resolve_heading(trace);

        let mut residual: Degree = 1000.0;
        let mut previous_residual: Degree = 1001.0;
        let mut point = last;
        let mut range = 0.0;
        let mut iterations = 0;

        while residual.abs() < previous_residual.abs()
            && residual.abs() > self.params.bearing_trace_tolerance
            && iterations < self.params.bearing_max_iter
        {
            previous_residual = residual;

            let step = distance_point(89.0, trace, last.lat, last.lon);
            point = GeoPoint::new(step.lat, resolve_heading(step.lon));
            range = central_angle(body, point);

            let seen = back_bearing(body, point) - self.variation(point);
            residual = resolve_heading(bearing - seen);
            trace = resolve_heading(trace + residual);
            iterations += 1;
        }

        (residual.abs() < self.params.bearing_accept_residual && range < 90.0)
            .then_some((trace, point))
    }
}

/// Progress of a sweep, drawn only for magnetic builds with the `progress` feature.
struct SweepProgress {
    #[cfg(feature = "progress")]
    bar: Option<(ProgressBar, IterTimer)>,
}

impl SweepProgress {
    #[cfg(feature = "progress")]
    fn new(enabled: bool, total: u64) -> Self {
        SweepProgress {
            bar: enabled.then(|| (lop_progress_bar(total), IterTimer::new(0.2))),
        }
    }

    #[cfg(not(feature = "progress"))]
    fn new(_enabled: bool, _total: u64) -> Self {
        SweepProgress {}
    }

    #[cfg(feature = "progress")]
    fn update(&mut self, position: u64) {
        if let Some((pb, timer)) = &mut self.bar {
            let last = timer.tick();
            let avg = timer.avg();
            pb.set_position(position);
            pb.set_message(format!("last: {}, avg: {}", fmt_dur(last), fmt_dur(avg)));
        }
    }

    #[cfg(not(feature = "progress"))]
    fn update(&mut self, _position: u64) {}

    #[cfg(feature = "progress")]
    fn finish(self, interrupted: bool) {
        if let Some((pb, _)) = self.bar {
            if interrupted {
                pb.set_message("Interrupted");
            }
            pb.disable_steady_tick();
            pb.finish_and_clear();
        }
    }

    #[cfg(not(feature = "progress"))]
    fn finish(self, _interrupted: bool) {}
}

/// Build the polygons of a bearing sight.
///
/// See [`build_bearing_lop_with_cancel`].
pub fn build_bearing_lop(
    almanac: &Almanac,
    request: &LopRequest,
    params: &ReductionParams,
    magnetic: Option<MagneticContext<'_>>,
) -> Result<LinesOfPosition, CelnavError> {
    build_bearing_lop_with_cancel(almanac, request, params, magnetic, || false)
}

/// Build the polygons of a bearing sight, polling `should_cancel` between steps.
///
/// For each sampled time, each azimuth of the measurement band is walked 201 times from
/// the sub-point with [`BearingSolver::bearing_point`]. The points of one step form a band;
/// its mean extends the centre line and the hull of two consecutive bands is one polygon.
/// The first band is the sub-point itself.
///
/// Arguments
/// ---------
/// * `almanac`: body locations.
/// * `request`: measured bearing and its uncertainties.
/// * `params`: solver tolerances.
/// * `magnetic`: variation model when the bearing is magnetic.
/// * `should_cancel`: polled every 20 ms of wall-clock time, and before the first step.
///
/// Return
/// ------
/// * The polygons and centre line, or the error of the body location.
pub fn build_bearing_lop_with_cancel<F>(
    almanac: &Almanac,
    request: &LopRequest,
    params: &ReductionParams,
    magnetic: Option<MagneticContext<'_>>,
    mut should_cancel: F,
) -> Result<LinesOfPosition, CelnavError>
where
    F: FnMut() -> bool,
{
    let solver = BearingSolver::new(params, magnetic);
    let (az_min, az_max, az_step) = request.measurement_band();
    let azimuths = band_samples(az_min, az_max, az_step).collect_vec();
    let times = time_samples(request.time_certainty).collect_vec();

    let mut lop = LinesOfPosition::default();
    let mut progress = SweepProgress::new(
        magnetic.is_some(),
        times.len() as u64 * (SWEEP_STEPS + 1),
    );
    let mut last_poll: Option<Instant> = None;
    let mut position = 0;

    'sweep: for offset in times {
        let location = match almanac.body_location(shift_seconds(request.epoch, offset), request.body)
        {
            Ok(location) => location,
            Err(e) => {
                progress.finish(false);
                return Err(e);
            }
        };
        let body = GeoPoint::new(location.lat, resolve_heading(location.lon));

        let mut tracks: Vec<Option<Track>> = vec![None; azimuths.len()];
        let mut previous = vec![body];

        for step in 0..=SWEEP_STEPS {
            if last_poll.is_none_or(|t| t.elapsed() >= POLL_INTERVAL) {
                if should_cancel() {
                    lop.interrupted = true;
                    break 'sweep;
                }
                last_poll = Some(Instant::now());
            }
            if step % 10 == 0 {
                progress.update(position);
            }
            position += 1;

            let mut band = Vec::with_capacity(azimuths.len());
            for (track, &azimuth) in tracks.iter_mut().zip(&azimuths) {
                if let Some((trace, mut point)) = solver.bearing_point(azimuth, *track, body) {
                    point.lat = point.lat.clamp(-90.0, 90.0);
                    band.push(point);
                    *track = Some((trace, point));
                }
            }

            if let Some(mean) = centroid(&band) {
                lop.line.push(mean);
            }
            let mut merged = previous;
            merged.extend_from_slice(&band);
            let polygon = reduce_to_convex_polygon(merged);
            if !polygon.is_empty() {
                lop.polygons.push(polygon);
            }
            previous = band;
        }
    }

    progress.finish(lop.interrupted);
    if lop.interrupted {
        info!("{} bearing LOP interrupted", request.body);
    }
    debug!(
        "{} bearing LOP: {} polygons, {} line points",
        request.body,
        lop.polygons.len(),
        lop.line.len()
    );
    Ok(lop)
}
