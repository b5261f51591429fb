#![allow(dead_code)]

use std::sync::Once;

use celnav::{
    body::Body,
    reduction_params::SightDefaults,
    sight::{colour::Colour, Limb, LunarInputs, LunarLimb, Sight, SightType},
    time::parse_utc,
};
use flexi_logger::Logger;

static LOGGER: Once = Once::new();

/// Log to stderr at the level of `RUST_LOG`, `warn` by default.
pub fn setup_logging() {
    LOGGER.call_once(|| {
        let _ = Logger::try_with_env_or_str("warn").and_then(|logger| logger.start());
    });
}

/// Degrees and minutes to degrees, the sign taken from `deg`.
pub fn dm(deg: f64, min: f64) -> f64 {
    if deg.is_sign_negative() {
        deg - min / 60.0
    } else {
        deg + min / 60.0
    }
}

pub struct Conditions {
    pub eye_height: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub index_error: f64,
}

#[allow(clippy::too_many_arguments)]
pub fn altitude_sight(
    body: Body,
    limb: Limb,
    date: &str,
    time: &str,
    hs: f64,
    conditions: &Conditions,
) -> Sight {
    Sight::new(
        SightType::Altitude,
        body,
        limb,
        parse_utc(date, time).unwrap(),
        0.0,
        hs,
        0.25,
        &SightDefaults {
            eye_height: conditions.eye_height,
            temperature: conditions.temperature,
            pressure: conditions.pressure,
            index_error: conditions.index_error,
        },
        Colour::default(),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn lunar_sight(
    body: Body,
    date: &str,
    time: &str,
    distance: f64,
    lunar: LunarInputs,
    conditions: &Conditions,
) -> Sight {
    let mut sight = Sight::new(
        SightType::Lunar,
        body,
        Limb::Center,
        parse_utc(date, time).unwrap(),
        0.0,
        distance,
        0.25,
        &SightDefaults {
            eye_height: conditions.eye_height,
            temperature: conditions.temperature,
            pressure: conditions.pressure,
            index_error: conditions.index_error,
        },
        Colour::default(),
    );
    sight.lunar = lunar;
    sight
}

/// Moon and body altitudes of a near-limb lunar, both lower limbs unless given.
pub fn near_limb(moon_altitude: f64, body_altitude: f64, body_limb: Limb) -> LunarInputs {
    LunarInputs {
        moon_altitude,
        moon_limb: Limb::Lower,
        body_altitude,
        body_limb,
        limb: LunarLimb::Near,
    }
}
