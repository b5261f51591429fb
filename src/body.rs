//! Celestial bodies known to the almanac and the result of locating one.

use std::{fmt, str::FromStr};

use log::warn;

use crate::{
    celnav_errors::CelnavError,
    constants::{AstronomicalUnit, Degree, Kilometer},
    ephemeris::VsopBody,
    star_catalog::{star_index, STARS},
};

/// A body a sight can be taken on.
///
/// Stars are referenced by their index in [`STARS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Star(usize),
}

impl Body {
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Star(index) => STARS.get(*index).map_or("Unknown star", |s| s.name),
        }
    }

    /// Star at `index` of [`STARS`].
    pub fn star(index: usize) -> Result<Body, CelnavError> {
        if index < STARS.len() {
            Ok(Body::Star(index))
        } else {
            Err(CelnavError::UnknownBody(format!("star #{index}")))
        }
    }

    /// Series body for the five planets, `None` otherwise.
    pub fn planet(&self) -> Option<VsopBody> {
        match self {
            Body::Mercury => Some(VsopBody::Mercury),
            Body::Venus => Some(VsopBody::Venus),
            Body::Mars => Some(VsopBody::Mars),
            Body::Jupiter => Some(VsopBody::Jupiter),
            Body::Saturn => Some(VsopBody::Saturn),
            _ => None,
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self, Body::Star(_))
    }

    /// Every body, Sun, Moon and planets first, then the catalogue stars.
    pub fn all() -> impl Iterator<Item = Body> {
        [
            Body::Sun,
            Body::Moon,
            Body::Mercury,
            Body::Venus,
            Body::Mars,
            Body::Jupiter,
            Body::Saturn,
        ]
        .into_iter()
        .chain((0..STARS.len()).map(Body::Star))
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = CelnavError;

    /// Resolve a body name. Planet names are matched exactly, then the star catalogue.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = match s {
            "Sun" => Body::Sun,
            "Moon" => Body::Moon,
            "Mercury" => Body::Mercury,
            "Venus" => Body::Venus,
            "Mars" => Body::Mars,
            "Jupiter" => Body::Jupiter,
            "Saturn" => Body::Saturn,
            name => match star_index(name) {
                Some(index) => Body::Star(index),
                None => {
                    warn!("Unknown celestial body: {name}");
                    return Err(CelnavError::UnknownBody(name.to_string()));
                }
            },
        };
        Ok(body)
    }
}

/// Geographic position of a body at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyLocation {
    /// Latitude of the sub-point, equal to the apparent declination
    pub lat: Degree,
    /// Longitude of the sub-point, `RA − GAST`, in (−180, 180]
    pub lon: Degree,
    /// Greenwich hour angle of Aries (apparent sidereal time), in [0, 360)
    pub gha_aries: Degree,
    /// Moon: geocentric distance in km. Other bodies: Earth–Sun distance in AU.
    pub rad: f64,
    /// Geocentric distance in km, for the Moon and the planets
    pub distance: Option<Kilometer>,
}

impl BodyLocation {
    /// Greenwich hour angle of the body, in [0, 360).
    pub fn gha(&self) -> Degree {
        (-self.lon).rem_euclid(360.0)
    }

    /// Sidereal hour angle of the body, in [0, 360).
    pub fn sha(&self) -> Degree {
        (360.0 - self.lon - self.gha_aries).rem_euclid(360.0)
    }

    /// Earth–Sun distance for the Sun, in AU.
    pub fn sun_distance(&self) -> AstronomicalUnit {
        self.rad
    }
}
