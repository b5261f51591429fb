//! Altitude line of position: the circle of equal altitude around the body sub-point,
//! thickened by the measurement and time uncertainties.

use itertools::Itertools;
use log::debug;

use crate::{
    almanac::Almanac, celnav_errors::CelnavError, reduction_params::ReductionParams,
    time::shift_seconds,
};

use super::{
    band_samples, centroid, hull::reduce_to_convex_polygon, spherical::distance_point,
    time_samples, GeoPoint, LinesOfPosition, LopRequest,
};

/// Build the polygons of an altitude sight.
///
/// For each sampled time the sub-point is located, then the bearing from the sub-point is
/// swept over [−180°, 180°] by `params.trace_step_deg`. At each bearing the altitudes of the
/// measurement band give a radial segment of points; the mean of the segment extends the
/// centre line and the hull of two consecutive segments is one polygon.
///
/// Arguments
/// ---------
/// * `almanac`: body locations.
/// * `request`: observed altitude `Ho` and its uncertainties.
/// * `params`: sweep step.
///
/// Return
/// ------
/// * The polygons and centre line, or the error of the body location.
pub fn build_altitude_lop(
    almanac: &Almanac,
    request: &LopRequest,
    params: &ReductionParams,
) -> Result<LinesOfPosition, CelnavError> {
    let (alt_min, alt_max, alt_step) = request.measurement_band();
    let trace_count = (360.0 / params.trace_step_deg + 1e-9).floor() as usize;
    let mut lop = LinesOfPosition::default();

    for offset in time_samples(request.time_certainty) {
        let location = almanac.body_location(shift_seconds(request.epoch, offset), request.body)?;

        let mut previous: Vec<GeoPoint> = Vec::new();
        for k in 0..=trace_count {
            let trace = -180.0 + k as f64 * params.trace_step_deg;
            let band = band_samples(alt_min, alt_max, alt_step)
                .take_while(|alt| alt.abs() <= 90.0)
                .map(|alt| distance_point(alt, trace, location.lat, location.lon))
                .collect_vec();

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

    debug!(
        "{} altitude LOP: {} polygons, {} line points",
        request.body,
        lop.polygons.len(),
        lop.line.len()
    );
    Ok(lop)
}

#[cfg(test)]
mod altitude_lop_test {
    use super::*;
    use crate::{body::Body, geometry::spherical::altitude_azimuth, time::parse_utc};

    fn sun_request(time_certainty: f64, measurement_certainty: f64) -> LopRequest {
        LopRequest {
            body: Body::Sun,
            epoch: parse_utc("2024-11-13", "20:17:45").unwrap(),
            time_certainty,
            measurement: 11.51309932,
            measurement_certainty,
        }
    }

    #[test]
    fn test_one_polygon_per_trace() {
        let almanac = Almanac::default();
        let lop =
            build_altitude_lop(&almanac, &sun_request(0.0, 0.25), &ReductionParams::default())
                .unwrap();
        assert_eq!(lop.line.len(), 361);
        assert_eq!(lop.polygons.len(), 361);
        assert!(!lop.interrupted);
    }

    #[test]
    fn test_points_lie_on_the_altitude_circle() {
        let almanac = Almanac::default();
        let request = sun_request(0.0, 0.25);
        let sun = almanac.body_location(request.epoch, Body::Sun).unwrap();
        let lop = build_altitude_lop(&almanac, &request, &ReductionParams::default()).unwrap();

        let tolerance = 0.25 / 60.0 + 1e-9;
        for p in lop.points().chain(lop.line.iter()) {
            let (hc, _) = altitude_azimuth(p.lat, p.lon, sun.lat, sun.lon);
            assert!((hc - request.measurement).abs() <= tolerance, "{p:?}: hc = {hc}");
        }
    }

    #[test]
    fn test_time_uncertainty_doubles_the_sweep() {
        let almanac = Almanac::default();
        let params = ReductionParams::builder().trace_step_deg(10.0).build().unwrap();
        let lop = build_altitude_lop(&almanac, &sun_request(5.0, 0.25), &params).unwrap();
        assert_eq!(lop.line.len(), 2 * 37);
    }

    #[test]
    fn test_altitude_band_is_clipped_at_zenith() {
        let almanac = Almanac::default();
        let mut request = sun_request(0.0, 120.0);
        request.measurement = 89.5;
        let params = ReductionParams::builder().trace_step_deg(90.0).build().unwrap();
        let lop = build_altitude_lop(&almanac, &request, &params).unwrap();
        // band 87.5..91.5 by 4/3: 87.5 and 88.83 kept, 90.17 and beyond dropped
        assert_eq!(lop.line.len(), 5);
        assert_eq!(lop.polygons[0].len(), 2);
        assert_eq!(lop.polygons[1].len(), 4);
    }
}
