//! Dead-reckoning shift: carry a line of position along the vessel's run between the
//! sight and the fix.

use crate::constants::{Degree, NauticalMile};

use super::{
    spherical::{distance_point, resolve_heading},
    GeoPoint, LinesOfPosition, MagneticContext,
};

/// Move every polygon vertex and centre-line point `distance` nautical miles along
/// `bearing`.
///
/// With a magnetic context the bearing is magnetic: the variation at each point is added
/// before moving it, and the point's longitude is first reduced to (−180, 180]. A zero
/// distance leaves the line untouched.
///
/// Arguments
/// ---------
/// * `lop`: line of position to move in place.
/// * `distance`: run in nautical miles (1′ of arc each).
/// * `bearing`: course made good, true or magnetic.
/// * `magnetic`: variation model for a magnetic `bearing`.
pub fn apply_dr_shift(
    lop: &mut LinesOfPosition,
    distance: NauticalMile,
    bearing: Degree,
    magnetic: Option<MagneticContext<'_>>,
) {
    if distance == 0.0 {
        return;
    }
    let altitude = 90.0 - distance / 60.0;

    let shift = |p: &mut GeoPoint| {
        let mut local_bearing = bearing;
        if let Some(m) = magnetic {
            p.lon = resolve_heading(p.lon);
            local_bearing += m.at(p.lat, p.lon);
        }
        *p = distance_point(altitude, local_bearing, p.lat, p.lon);
    };

    lop.polygons.iter_mut().flatten().for_each(&shift);
    lop.line.iter_mut().for_each(&shift);
}
