//! # Ephemeris series engine
//!
//! Heliocentric positions of the Earth and of the five naked-eye planets from the VSOP87D
//! theory (spherical coordinates, ecliptic and equinox of date), plus the lunar series.
//!
//! ## Data format
//!
//! The coefficient resource is plain text. Each block starts with a header line
//!
//! ```text
//! <Body> <L|B|R> <power> <nterms>
//! ```
//!
//! followed by `nterms` lines `A B C`. The contribution of one block is
//! `τ^power · Σ A·cos(B + C·τ)` with `τ` in Julian millennia from J2000.0.
//! Blocks of the same body and coordinate appear in increasing power.
//!
//! ## Loading
//!
//! An [`EphemerisStore`] is built once from an [`EphemerisSource`] and is read-only afterwards.
//! The embedded copy of the coefficients is compiled in, a file source is read from disk.
//! [`crate::almanac::Almanac`] owns the store and loads it lazily on first use.
//!
//! ## See also
//! ------------
//! * [`elp2000`] – geocentric lunar series.
//! * [`planets`] – apparent places of the Sun and planets built on top of the store.

pub mod elp2000;
pub mod planets;

use std::{fmt, str::FromStr};

use ahash::AHashMap;
use camino::Utf8PathBuf;
use log::info;
use nom::{
    character::complete::{alpha1, digit1, multispace0, one_of, space0, space1},
    combinator::{all_consuming, map_res},
    multi::{count, many1},
    number::complete::double,
    sequence::{preceded, terminated},
    IResult, Parser,
};

use crate::{
    celnav_errors::CelnavError,
    constants::{JulianDay, DPI},
    earth_orientation::julian_centuries,
};

static EMBEDDED_VSOP87D: &str = include_str!("../../data/vsop87d.txt");

/// Bodies carried by the VSOP87 coefficient resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VsopBody {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
}

impl VsopBody {
    pub fn name(&self) -> &'static str {
        match self {
            VsopBody::Mercury => "Mercury",
            VsopBody::Venus => "Venus",
            VsopBody::Earth => "Earth",
            VsopBody::Mars => "Mars",
            VsopBody::Jupiter => "Jupiter",
            VsopBody::Saturn => "Saturn",
        }
    }
}

impl fmt::Display for VsopBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VsopBody {
    type Err = CelnavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mercury" => Ok(VsopBody::Mercury),
            "Venus" => Ok(VsopBody::Venus),
            "Earth" => Ok(VsopBody::Earth),
            "Mars" => Ok(VsopBody::Mars),
            "Jupiter" => Ok(VsopBody::Jupiter),
            "Saturn" => Ok(VsopBody::Saturn),
            _ => Err(CelnavError::UnknownBody(s.to_string())),
        }
    }
}

/// Heliocentric spherical coordinate evaluated by a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coordinate {
    /// L, radians
    Longitude,
    /// B, radians
    Latitude,
    /// R, astronomical units
    Radius,
}

impl TryFrom<char> for Coordinate {
    type Error = CelnavError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'L' => Ok(Coordinate::Longitude),
            'B' => Ok(Coordinate::Latitude),
            'R' => Ok(Coordinate::Radius),
            other => Err(CelnavError::NomParsingError(format!(
                "unknown coordinate code {other}"
            ))),
        }
    }
}

/// One periodic term `A·cos(B + C·τ)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub amplitude: f64,
    pub phase: f64,
    pub rate: f64,
}

/// Where the VSOP87 coefficients come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EphemerisSource {
    /// Copy compiled into the crate
    #[default]
    Embedded,
    /// Text file on disk in the same format
    File(Utf8PathBuf),
}

impl TryFrom<&str> for EphemerisSource {
    type Error = CelnavError;

    /// Accepts `"embedded"` or `"file:<path>"`.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.split_once(':') {
            None if value == "embedded" => Ok(EphemerisSource::Embedded),
            Some(("file", path)) if !path.is_empty() => {
                Ok(EphemerisSource::File(Utf8PathBuf::from(path)))
            }
            _ => Err(CelnavError::DataUnavailable(format!(
                "invalid ephemeris source: {value}"
            ))),
        }
    }
}

type SeriesKey = (VsopBody, Coordinate);

/// Immutable table of VSOP87 series, indexed by body and coordinate.
///
/// For a given key, `series[key][k]` holds the terms multiplied by `τ^k`.
#[derive(Debug, Clone)]
pub struct EphemerisStore {
    series: AHashMap<SeriesKey, Vec<Vec<Term>>>,
}

/// One parsed block: header fields and its terms.
type Block = (VsopBody, Coordinate, usize, Vec<Term>);

fn parse_term(input: &str) -> IResult<&str, Term> {
    (
        preceded(space0, double),
        preceded(space1, double),
        preceded(space1, double),
    )
        .map(|(amplitude, phase, rate)| Term {
            amplitude,
            phase,
            rate,
        })
        .parse(input)
}

fn parse_header(input: &str) -> IResult<&str, (VsopBody, Coordinate, usize, usize)> {
    (
        terminated(map_res(alpha1, VsopBody::from_str), space1),
        terminated(map_res(one_of("LBR"), Coordinate::try_from), space1),
        terminated(map_res(digit1, str::parse::<usize>), space1),
        map_res(digit1, str::parse::<usize>),
    )
        .parse(input)
}

fn parse_block(input: &str) -> IResult<&str, Block> {
    let (input, (body, coord, power, nterms)) = preceded(multispace0, parse_header).parse(input)?;
    let (input, terms) = count(preceded(multispace0, parse_term), nterms).parse(input)?;
    Ok((input, (body, coord, power, terms)))
}

fn parse_full_file(input: &str) -> IResult<&str, Vec<Block>> {
    all_consuming(terminated(many1(parse_block), multispace0)).parse(input)
}

fn nom_error(err: nom::Err<nom::error::Error<&str>>) -> CelnavError {
    match err {
        nom::Err::Incomplete(_) => CelnavError::NomParsingError("incomplete input".into()),
        nom::Err::Error(e) | nom::Err::Failure(e) => CelnavError::NomParsingError(format!(
            "{:?} near {:?}",
            e.code,
            e.input.lines().next().unwrap_or_default()
        )),
    }
}

impl EphemerisStore {
    /// Load the coefficient table from `source`.
    ///
    /// Return
    /// ------
    /// * The store, or [`CelnavError::DataUnavailable`] when a file source cannot be read,
    ///   or [`CelnavError::NomParsingError`] when the text is malformed.
    pub fn load(source: &EphemerisSource) -> Result<Self, CelnavError> {
        let store = match source {
            EphemerisSource::Embedded => Self::parse(EMBEDDED_VSOP87D)?,
            EphemerisSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    CelnavError::DataUnavailable(format!("cannot read {path}: {e}"))
                })?;
                Self::parse(&text)?
            }
        };

        info!(
            "Loaded VSOP87 series from {:?}: {} blocks, {} terms",
            source,
            store.series.values().map(Vec::len).sum::<usize>(),
            store.n_terms()
        );
        Ok(store)
    }

    /// Parse the coefficient text.
    pub fn parse(text: &str) -> Result<Self, CelnavError> {
        let (_, blocks) = parse_full_file(text).map_err(nom_error)?;

        let mut series: AHashMap<SeriesKey, Vec<Vec<Term>>> = AHashMap::new();
        for (body, coord, power, terms) in blocks {
            let powers = series.entry((body, coord)).or_default();
            if power != powers.len() {
                return Err(CelnavError::NomParsingError(format!(
                    "{body} {coord:?}: expected power {}, found {power}",
                    powers.len()
                )));
            }
            powers.push(terms);
        }

        Ok(EphemerisStore { series })
    }

    /// Total number of periodic terms in the store.
    pub fn n_terms(&self) -> usize {
        self.series.values().flatten().map(Vec::len).sum()
    }

    /// Evaluate one coordinate of `body` at `jde`.
    ///
    /// Arguments
    /// ---------
    /// * `jde`: Julian Ephemeris Day (dynamical time).
    /// * `body`: body of the series.
    /// * `coord`: longitude, latitude or radius.
    ///
    /// Return
    /// ------
    /// * Radians for L and B (L reduced to [0, 2π)), AU for R.
    /// * [`CelnavError::DataUnavailable`] if the store holds no such series.
    pub fn dimension(
        &self,
        jde: JulianDay,
        body: VsopBody,
        coord: Coordinate,
    ) -> Result<f64, CelnavError> {
        let powers = self.series.get(&(body, coord)).ok_or_else(|| {
            CelnavError::DataUnavailable(format!("no {coord:?} series for {body}"))
        })?;

        let tau = julian_centuries(jde) / 10.0;
        let mut value = 0.0;
        let mut tau_k = 1.0;
        for terms in powers {
            let sum: f64 = terms
                .iter()
                .map(|t| t.amplitude * (t.phase + t.rate * tau).cos())
                .sum();
            value += tau_k * sum;
            tau_k *= tau;
        }

        if coord == Coordinate::Longitude {
            value = value.rem_euclid(DPI);
        }
        Ok(value)
    }

    /// Evaluate L, B and R of `body` at `jde`.
    pub fn dimension3(&self, jde: JulianDay, body: VsopBody) -> Result<(f64, f64, f64), CelnavError> {
        Ok((
            self.dimension(jde, body, Coordinate::Longitude)?,
            self.dimension(jde, body, Coordinate::Latitude)?,
            self.dimension(jde, body, Coordinate::Radius)?,
        ))
    }
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_term() {
        let (rest, term) = parse_term("4.09894150000e-01 1.4830203 26087.90314157\n").unwrap();
        assert_eq!(rest, "\n");
        assert_eq!(term.amplitude, 0.40989415);
        assert_eq!(term.phase, 1.4830203);
        assert_eq!(term.rate, 26087.90314157);
    }

    #[test]
    fn test_parse_header() {
        let (_, header) = parse_header("Mercury L 0 38").unwrap();
        assert_eq!(header, (VsopBody::Mercury, Coordinate::Longitude, 0, 38));
        assert!(parse_header("Pluto L 0 38").is_err());
        assert!(parse_header("Mars X 0 3").is_err());
    }

    #[test]
    fn test_parse_small_table() {
        let text = "Mars R 0 2\n1.5 0.0 0.0\n0.1 0.0 0.0\nMars R 1 1\n0.5 0.0 0.0\n";
        let store = EphemerisStore::parse(text).unwrap();
        assert_eq!(store.n_terms(), 3);
        // τ = 1 at J2000 + 3652500 days
        let r = store
            .dimension(2_451_545.0 + 365_250.0, VsopBody::Mars, Coordinate::Radius)
            .unwrap();
        assert_relative_eq!(r, 1.6 + 0.5, epsilon = 1e-12);
        assert_eq!(
            store.dimension(2_451_545.0, VsopBody::Venus, Coordinate::Radius),
            Err(CelnavError::DataUnavailable(
                "no Radius series for Venus".into()
            ))
        );
    }

    #[test]
    fn test_parse_rejects_short_block() {
        let text = "Mars R 0 3\n1.5 0.0 0.0\n0.1 0.0 0.0\n";
        assert!(matches!(
            EphemerisStore::parse(text),
            Err(CelnavError::NomParsingError(_))
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_order_powers() {
        let text = "Mars R 1 1\n1.5 0.0 0.0\n";
        assert!(matches!(
            EphemerisStore::parse(text),
            Err(CelnavError::NomParsingError(_))
        ));
    }

    #[test]
    fn test_embedded_store() {
        let store = EphemerisStore::load(&EphemerisSource::Embedded).unwrap();
        assert_eq!(store.n_terms(), 1833);
    }

    #[test]
    fn test_missing_file() {
        let source = EphemerisSource::File("/nonexistent/vsop87d.txt".into());
        assert!(matches!(
            EphemerisStore::load(&source),
            Err(CelnavError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!(
            EphemerisSource::try_from("embedded").unwrap(),
            EphemerisSource::Embedded
        );
        assert_eq!(
            EphemerisSource::try_from("file:data/vsop87d.txt").unwrap(),
            EphemerisSource::File("data/vsop87d.txt".into())
        );
        assert!(EphemerisSource::try_from("http://x").is_err());
    }

    /// Meeus 32.a: Venus 1992 December 20, 0h TD
    #[test]
    fn test_dimension3_venus() {
        let store = EphemerisStore::load(&EphemerisSource::Embedded).unwrap();
        let (l, b, r) = store.dimension3(2_448_976.5, VsopBody::Venus).unwrap();
        assert_relative_eq!(l.to_degrees(), 26.11428, epsilon = 1e-4);
        assert_relative_eq!(b.to_degrees(), -2.62070, epsilon = 1e-4);
        assert_relative_eq!(r, 0.724603, epsilon = 1e-5);
    }

    /// Meeus 25.b: Earth 1992 October 13, 0h TD
    #[test]
    fn test_dimension3_earth() {
        let store = EphemerisStore::load(&EphemerisSource::Embedded).unwrap();
        let (l, b, r) = store.dimension3(2_448_908.5, VsopBody::Earth).unwrap();
        assert_relative_eq!(l.to_degrees(), 19.907372, epsilon = 1e-5);
        assert!(b.abs() < 1e-5);
        assert_relative_eq!(r, 0.99760775, epsilon = 1e-7);
    }
}
