//! Convex hull by gift wrapping in the plane `x = lat`, `y = lon`.

use crate::constants::DPI;

use super::GeoPoint;

/// Polar angle of `p` seen from `origin`, in [0, 2π).
#[inline]
pub fn calc_angle(p: &GeoPoint, origin: &GeoPoint) -> f64 {
    let a = (p.lon - origin.lon).atan2(p.lat - origin.lat);
    if a < 0.0 {
        a + DPI
    } else {
        a
    }
}

#[inline]
fn calc_dist(p: &GeoPoint, origin: &GeoPoint) -> f64 {
    (p.lon - origin.lon).hypot(p.lat - origin.lat)
}

/// Reduce a point set to its convex polygon.
///
/// Starts at the point of smallest longitude and repeatedly takes the point with the
/// smallest polar angle not below the current one, the farthest on ties. Duplicates are
/// dropped as soon as a vertex is taken. The vertices come out counter-clockwise in the
/// `(lat, lon)` plane.
///
/// Arguments
/// ---------
/// * `points`: candidate points, consumed.
///
/// Return
/// ------
/// * The hull vertices, empty for an empty input.
pub fn reduce_to_convex_polygon(mut points: Vec<GeoPoint>) -> Vec<GeoPoint> {
    let mut polygon = Vec::new();

    let mut next = match points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.lon.total_cmp(&b.lon))
    {
        Some((i, _)) => i,
        None => return polygon,
    };

    let mut theta = 0.0;
    while !points.is_empty() {
        let last = points.remove(next);
        points.retain(|p| *p != last);
        polygon.push(last);

        let mut min_phi = DPI;
        let mut max_dist = 0.0;
        next = 0;
        for (i, p) in points.iter().enumerate() {
            let phi = calc_angle(p, &last);
            let dist = calc_dist(p, &last);
            if max_dist == 0.0 {
                max_dist = dist;
            }
            if (phi >= theta && phi < min_phi) || (phi == min_phi && dist > max_dist) {
                next = i;
                min_phi = phi;
                max_dist = dist;
            }
        }

        // wrapped around to the first vertex
        if polygon.len() > 1 && calc_angle(&polygon[0], &last) < min_phi {
            break;
        }
        theta = min_phi;
    }

    polygon
}
