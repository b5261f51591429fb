//! Lunar-distance reduction: the clock error implied by a measured Moon–body distance.
//!
//! Both altitudes run through the altitude chain, then the measured distance is cleared
//! of refraction and parallax and compared with the true separation of the two bodies at
//! the corrected time. The Moon moves about one degree every 6720 s with respect to the
//! stars, which turns the distance error into seconds.
//!
//! Two clearing methods are available (see [`LunarMethod`]):
//!
//! * **Clearing**: centre-to-centre apparent distance `lda` from the limb measurement,
//!   apparent altitudes `ham`, `hab` of both centres and true altitudes `htm`, `htb`
//!   (the `Ho` of each altitude chain):
//!
//!   ```text
//!   c   = (cos lda − sin ham · sin hab) / (cos ham · cos hab)
//!   LDC = acos(c · cos htm · cos htb + sin htm · sin htb)
//!   ```
//!
//! * **Correction difference**: `LDC = LD − |Cm − Cb| − IC`, `Cm` and `Cb` the sums of the
//!   refraction, limb and parallax corrections of each altitude.

use hifitime::Epoch;
use log::debug;

use crate::{
    almanac::Almanac,
    body::Body,
    celnav_errors::CelnavError,
    constants::{Degree, Seconds, RADEG},
    geometry::{spherical::central_angle, GeoPoint},
    reduction_params::{LunarMethod, ReductionParams},
    time::{jde_tt, shift_seconds},
};

use super::{
    altitude::{reduce_altitude, AltitudeReduction, Environment},
    trace::{AlmanacHeader, CalcTrace, TraceValue},
    Limb, LunarInputs, LunarLimb,
};

/// Outcome of a lunar-distance reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarReduction {
    pub moon: AltitudeReduction,
    pub body: AltitudeReduction,
    /// Cleared lunar distance `LDC`
    pub corrected_distance: Degree,
    /// Geocentric Moon–body separation at the corrected time
    pub true_separation: Degree,
    /// Change of the separation over the trend interval
    pub separation_trend: Degree,
    pub error: Degree,
    pub time_correction: Seconds,
}

/// Shift from the observed limb to the centre of the disk.
#[inline]
fn limb_to_centre(limb: Limb, semi_diameter: Degree) -> Degree {
    match limb {
        Limb::Lower => semi_diameter,
        Limb::Upper => -semi_diameter,
        Limb::Center => 0.0,
    }
}

/// Moon–body separation at `epoch`.
fn separation(almanac: &Almanac, epoch: Epoch, body: Body) -> Result<Degree, CelnavError> {
    let moon = almanac.body_location(epoch, Body::Moon)?;
    let other = almanac.body_location(epoch, body)?;
    Ok(central_angle(
        GeoPoint::new(moon.lat, moon.lon),
        GeoPoint::new(other.lat, other.lon),
    ))
}

/// Rigorous clearing of the measured distance `ld`.
fn clear_distance(
    ld: Degree,
    inputs: &LunarInputs,
    moon: &AltitudeReduction,
    other: &AltitudeReduction,
    env: &Environment,
    trace: &mut CalcTrace,
) -> Degree {
    let ic = env.index_correction();
    let topo_sd = moon.disk.topo_semi_diameter;
    let body_sd = other.disk.topo_semi_diameter;

    let ham = trace.angle(
        "ham",
        "Moon Ha to centre",
        format!("{:.4}° ± {topo_sd:.4}°", moon.apparent_altitude),
        moon.apparent_altitude + limb_to_centre(inputs.moon_limb, topo_sd),
    );
    let hab = trace.angle(
        "hab",
        "Body Ha to centre",
        format!("{:.4}° ± {body_sd:.4}°", other.apparent_altitude),
        other.apparent_altitude + limb_to_centre(inputs.body_limb, body_sd),
    );

    // true altitudes come from each altitude chain, refracted at the limb
    let htm = trace.angle(
        "htm",
        "Moon Ho",
        format!("{:.4}° - {:.4}°", moon.corrected_altitude, moon.parallax_correction),
        moon.observed_altitude,
    );
    let htb = trace.angle(
        "htb",
        "Body Ho",
        format!("{:.4}° - {:.4}°", other.corrected_altitude, other.parallax_correction),
        other.observed_altitude,
    );

    let limbs = match inputs.limb {
        LunarLimb::Near => topo_sd + body_sd,
        LunarLimb::Far => -(topo_sd + body_sd),
        LunarLimb::Center => 0.0,
    };
    let lda = trace.angle(
        "lda",
        &format!("LD - IC, {} limbs", inputs.limb),
        format!("{ld:.4}° - {ic:.4}° + {limbs:.4}°"),
        ld - ic + limbs,
    );

    let (ham_r, hab_r) = (ham * RADEG, hab * RADEG);
    let c = ((lda * RADEG).cos() - ham_r.sin() * hab_r.sin()) / (ham_r.cos() * hab_r.cos());
    trace.step(
        "c",
        "(cos(lda) - sin(ham) * sin(hab)) / (cos(ham) * cos(hab))",
        format!("(cos({lda:.4}) - sin({ham:.4}) * sin({hab:.4})) / (cos({ham:.4}) * cos({hab:.4}))"),
        TraceValue::Number(c),
    );

    let (htm_r, htb_r) = (htm * RADEG, htb * RADEG);
    let cos_ldc = c * htm_r.cos() * htb_r.cos() + htm_r.sin() * htb_r.sin();
    trace.angle(
        "LDC",
        "acos(c * cos(htm) * cos(htb) + sin(htm) * sin(htb))",
        format!("acos({c:.6} * cos({htm:.4}) * cos({htb:.4}) + sin({htm:.4}) * sin({htb:.4}))"),
        cos_ldc.clamp(-1.0, 1.0).acos() / RADEG,
    )
}

/// Subtract the difference of the altitude corrections from the measured distance.
fn correction_difference(
    ld: Degree,
    moon: &AltitudeReduction,
    other: &AltitudeReduction,
    env: &Environment,
    trace: &mut CalcTrace,
) -> Degree {
    let cm = trace.angle(
        "CorrectionsMoon",
        "Refraction + Limb + Parallax",
        "",
        moon.corrections(),
    );
    let cb = trace.angle(
        "CorrectionsBody",
        "Refraction + Limb + Parallax",
        "",
        other.corrections(),
    );
    let corrections = trace.angle(
        "Corrections",
        "abs(CorrectionsMoon - CorrectionsBody)",
        format!("abs({cm:.4}° - {cb:.4}°)"),
        (cm - cb).abs(),
    );
    let ic = env.index_correction();
    trace.angle(
        "LDC",
        "Measurement - Corrections - IndexCorrection",
        format!("{ld:.4}° - {corrections:.4}° - {ic:.4}°"),
        ld - corrections - ic,
    )
}

/// Reduce a lunar-distance sight.
///
/// Arguments
/// ---------
/// * `almanac`: body locations.
/// * `epoch`: corrected sight time.
/// * `body`: second body of the distance (not the Moon).
/// * `ld`: measured lunar distance, degrees.
/// * `inputs`: altitudes and limbs of both bodies and limb of the distance.
/// * `env`: observer conditions.
/// * `params`: clearing method, seconds per degree, trend interval.
/// * `trace`: receives both altitude chains, the clearing and the almanac headers.
///
/// Return
/// ------
/// * The cleared distance, the true separation and the time correction. With
///   [`LunarMethod::Clearing`] the correction is negative when the measured distance says
///   the sight was taken earlier than recorded. [`LunarMethod::CorrectionDifference`]
///   gives `error × seconds_per_degree` as is.
///
/// Errors
/// ------
/// * [`CelnavError::InvalidSightField`] when `body` is the Moon.
/// * Any locator error.
#[allow(clippy::too_many_arguments)]
pub fn reduce_lunar(
    almanac: &Almanac,
    epoch: Epoch,
    body: Body,
    ld: Degree,
    inputs: &LunarInputs,
    env: &Environment,
    params: &ReductionParams,
    trace: &mut CalcTrace,
) -> Result<LunarReduction, CelnavError> {
    if body == Body::Moon {
        return Err(CelnavError::InvalidSightField(
            "lunar distance needs a body other than the Moon".into(),
        ));
    }

    let jde = jde_tt(epoch);
    let moon_location = almanac.body_location(epoch, Body::Moon)?;
    let body_location = almanac.body_location(epoch, body)?;
    let true_separation = central_angle(
        GeoPoint::new(moon_location.lat, moon_location.lon),
        GeoPoint::new(body_location.lat, body_location.lon),
    );
    let later = separation(
        almanac,
        shift_seconds(epoch, params.trend_interval_s),
        body,
    )?;
    let separation_trend = later - true_separation;

    let moon = reduce_altitude(
        inputs.moon_altitude,
        inputs.moon_limb,
        Body::Moon,
        &moon_location,
        jde,
        env,
        "Moon ",
        trace,
    );
    let other = reduce_altitude(
        inputs.body_altitude,
        inputs.body_limb,
        body,
        &body_location,
        jde,
        env,
        &format!("{body} "),
        trace,
    );

    trace.angle("LD", "Lunar distance measurement", format!("{ld:.4}°"), ld);
    let corrected_distance = match params.lunar_method {
        LunarMethod::Clearing => clear_distance(ld, inputs, &moon, &other, env, trace),
        LunarMethod::CorrectionDifference => correction_difference(ld, &moon, &other, env, trace),
    };

    trace.angle(
        "Separation",
        &format!("Calculated angle between Moon and {body}"),
        "",
        true_separation,
    );
    trace.angle(
        "Trend",
        &format!("Separation change over {:.0} s", params.trend_interval_s),
        format!("{later:.6}° - {true_separation:.6}°"),
        separation_trend,
    );
    let error = trace.angle(
        "Error",
        "LDC - Separation",
        format!("{corrected_distance:.4}° - {true_separation:.4}°"),
        corrected_distance - true_separation,
    );

    trace.note(format!(
        "Moon takes 28 days to orbit, one degree of error takes {:.0} seconds",
        params.seconds_per_degree
    ));
    let spd = params.seconds_per_degree;
    let time_correction = match params.lunar_method {
        LunarMethod::Clearing => {
            // a closing distance puts a too-long measurement before the recorded time
            let sign = if separation_trend < 0.0 { -1.0 } else { 1.0 };
            trace.step(
                "Time Correction",
                "sign(Trend) * Error * SecondsPerDegree",
                format!("{sign:+.0} * {error:.6} * {spd:.0}"),
                TraceValue::Seconds(sign * error * spd),
            )
        }
        LunarMethod::CorrectionDifference => trace.step(
            "Time Correction",
            "Error * SecondsPerDegree",
            format!("{error:.6} * {spd:.0}"),
            TraceValue::Seconds(error * spd),
        ),
    };

    trace.add_header(AlmanacHeader::new(
        Body::Moon,
        epoch,
        &moon_location,
        moon.disk.semi_diameter,
        moon.disk.horizontal_parallax,
    ));
    trace.add_header(AlmanacHeader::new(
        body,
        epoch,
        &body_location,
        other.disk.semi_diameter,
        other.disk.horizontal_parallax,
    ));

    debug!(
        "Lunar {body}: LDC {corrected_distance:.6}°, separation {true_separation:.6}°, \
         time correction {time_correction:.1} s ({})",
        params.lunar_method
    );

    Ok(LunarReduction {
        moon,
        body: other,
        corrected_distance,
        true_separation,
        separation_trend,
        error,
        time_correction,
    })
}
