//! # Navigational star catalog
//!
//! Fixed ICRS positions at J2000.0 with proper motions, radial velocities and parallaxes of the
//! navigational stars (SIMBAD values), and the pipeline turning them into apparent places of
//! date.

use ahash::AHashMap;
use nalgebra::Vector3;
use once_cell::sync::Lazy;

use crate::{
    constants::{JulianDay, Radian, RADEG},
    earth_orientation::EarthOrientation,
    ref_system::{frame_bias, nutate, precess, proper_motion_parallax},
};

/// One catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarEntry {
    pub name: &'static str,
    /// Right ascension at J2000.0, radians
    pub ra: Radian,
    /// Declination at J2000.0, radians
    pub dec: Radian,
    /// μα·cos δ, mas/yr
    pub pm_ra: f64,
    /// μδ, mas/yr
    pub pm_dec: f64,
    /// km/s, positive receding
    pub radial_velocity: f64,
    /// mas
    pub parallax: f64,
}

/// Sexagesimal catalogue row: name, RA h m s, μα*, Dec d m s, μδ, radial velocity, parallax.
///
/// The declination sign is carried by the degrees field.
macro_rules! star {
    ($name:expr, $rh:expr, $rm:expr, $rs:expr, $pmra:expr, $dd:expr, $dm:expr, $ds:expr,
     $pmdec:expr, $rv:expr, $plx:expr) => {
        StarEntry {
            name: $name,
            ra: ($rh + ($rm + $rs / 60.0) / 60.0) * 15.0 * RADEG,
            dec: if $dd > 0.0 {
                ($dd + ($dm + $ds / 60.0) / 60.0) * RADEG
            } else {
                -((0.0 - $dd) + ($dm + $ds / 60.0) / 60.0) * RADEG
            },
            pm_ra: $pmra,
            pm_dec: $pmdec,
            radial_velocity: $rv,
            parallax: $plx,
        }
    };
}

pub const STARS: [StarEntry; 59] = [
    star!("Alpheratz", 0.0, 8.0, 23.25988, 137.46, 29.0, 5.0, 25.5520, -163.44, -10.10, 33.62),
    star!("Ankaa", 0.0, 26.0, 17.05140, 233.05, -42.0, 18.0, 21.55, -356.30, 74.6, 38.5),
    star!("Schedar", 0.0, 40.0, 30.44107, 50.88, 56.0, 32.0, 14.3922, -32.13, -4.31, 14.29),
    star!("Diphda", 0.0, 43.0, 35.37090, 232.55, -17.0, 59.0, 11.7827, 31.99, 13.32, 33.86),
    star!("Achernar", 1.0, 37.0, 42.84548, 87.00, -57.0, 14.0, 12.31, -38.24, 18.60, 23.39),
    star!("Hamal", 2.0, 7.0, 10.40570, 188.55, 23.0, 27.0, 44.7032, -148.08, -14.64, 49.56),
    star!("Polaris", 2.0, 31.0, 49.09456, 44.48, 89.0, 15.0, 50.7923, -11.85, -16.42, 7.54),
    star!("Acamar", 2.0, 58.0, 15.696, -44.6, -40.0, 18.0, 16.97, 19.0, 11.9, 28.00),
    star!("Menkar", 3.0, 2.0, 16.77307, -10.41, 4.0, 5.0, 23.0596, -76.85, -26.08, 13.09),
    star!("Mirfak", 3.0, 24.0, 19.37009, 23.75, 49.0, 51.0, 40.2455, -26.23, -2.04, 6.44),
    star!("Aldebaran", 4.0, 35.0, 55.23907, 63.45, 16.0, 30.0, 33.4885, -188.94, 54.26, 48.94),
    star!("Rigel", 5.0, 14.0, 32.27210, 1.31, -8.0, 12.0, 5.8981, 0.50, 17.80, 3.78),
    star!("Capella", 5.0, 16.0, 41.35871, 75.25, 45.0, 59.0, 52.7693, -426.89, 29.19, 76.2),
    star!("Bellatrix", 5.0, 25.0, 7.86325, -8.11, 6.0, 20.0, 58.9318, -12.88, 18.2, 12.92),
    star!("Elnath", 5.0, 26.0, 17.51312, 22.76, 28.0, 36.0, 26.8262, -173.58, 9.2, 24.36),
    star!("Alnilam", 5.0, 36.0, 12.81335, 1.44, -1.0, 12.0, 6.9089, -0.78, 27.30, 1.65),
    star!("Betelgeuse", 5.0, 55.0, 10.30536, 27.54, 7.0, 24.0, 25.4304, 11.30, 21.91, 6.55),
    star!("Canopus", 6.0, 23.0, 57.10988, 19.93, -52.0, 41.0, 44.3810, 23.24, 20.30, 10.55),
    star!("Sirius", 6.0, 45.0, 8.91728, -546.01, -16.0, 42.0, 58.0171, -1223.07, -5.50, 379.21),
    star!("Adhara", 6.0, 58.0, 37.54876, 3.24, -28.0, 58.0, 19.5102, 1.33, 27.30, 8.05),
    star!("Procyon", 7.0, 39.0, 18.11950, -714.59, 5.0, 13.0, 29.9552, -1036.80, -3.2, 284.56),
    star!("Pollux", 7.0, 45.0, 18.94987, -626.55, 28.0, 1.0, 34.3160, -45.80, 3.23, 96.54),
    star!("Avior", 8.0, 22.0, 30.83526, -25.52, -59.0, 30.0, 34.1431, 22.06, 11.60, 5.39),
    star!("Suhail", 9.0, 7.0, 59.75787, -24.01, -43.0, 25.0, 57.3273, 13.52, 17.60, 5.99),
    star!("Miaplacidus", 9.0, 13.0, 11.97746, -156.47, -69.0, 43.0, 1.9473, 108.95, -5.10, 28.82),
    star!("Alphard", 9.0, 27.0, 35.24270, -15.23, -8.0, 39.0, 30.9583, 34.37, -4.27, 18.09),
    star!("Regulus", 10.0, 8.0, 22.31099, -248.73, 11.0, 58.0, 1.9516, 5.59, 5.9, 41.13),
    star!("Dubhe", 11.0, 3.0, 43.67152, -134.11, 61.0, 45.0, 3.7249, -34.70, -9.40, 26.54),
    star!("Denebola", 11.0, 49.0, 3.57834, -497.68, 14.0, 34.0, 19.4090, -114.67, -0.20, 90.91),
    star!("Gienah", 12.0, 15.0, 48.37081, -158.61, -17.0, 32.0, 30.9496, 21.86, -4.2, 21.23),
    star!("Acrux", 12.0, 26.0, 35.871, -35.3, -63.0, 5.0, 56.58, -12.0, -11.2, 0.0),
    star!("Gacrux", 12.0, 31.0, 9.95961, 28.23, -57.0, 6.0, 47.5684, -265.08, 21.00, 36.83),
    star!("Alioth", 12.0, 54.0, 1.74959, 111.91, 55.0, 57.0, 35.3627, -8.24, -12.70, 39.51),
    star!("Spica", 13.0, 25.0, 11.57937, -42.35, -11.0, 9.0, 40.7501, -30.67, 1.0, 13.06),
    star!("Alkaid", 13.0, 47.0, 32.43776, -121.17, 49.0, 18.0, 47.7602, -14.91, -13.40, 31.38),
    star!("Hadar", 14.0, 3.0, 49.40535, -33.27, -60.0, 22.0, 22.9266, -23.16, 5.90, 8.32),
    star!("Menkent", 14.0, 6.0, 40.94752, -520.53, -36.0, 22.0, 11.8371, -518.06, 1.30, 55.45),
    star!("Arcturus", 14.0, 15.0, 39.67207, -1093.39, 19.0, 10.0, 56.6730, -2000.06, -5.19, 88.83),
    star!("Rigil", 14.0, 39.0, 36.49400, -3679.25, -60.0, 50.0, 2.3737, 473.67, -21.40, 754.81),
    star!("Zubenelgenubi", 14.0, 50.0, 52.71309, -105.68, -16.0, 2.0, 30.3955, -68.40, -10.0, 43.03),
    star!("Kochab", 14.0, 50.0, 42.32580, -32.61, 74.0, 9.0, 19.8142, 11.42, 16.96, 24.91),
    star!("Alphecca", 15.0, 34.0, 41.26800, 120.27, 26.0, 42.0, 52.8940, -89.58, 1.7, 43.46),
    star!("Antares", 16.0, 29.0, 24.45970, -12.11, -26.0, 25.0, 55.2094, -23.30, -3.50, 5.89),
    star!("Atria", 16.0, 48.0, 39.89508, 17.99, -69.0, 1.0, 39.7626, -31.58, -3.00, 8.35),
    star!("Sabik", 17.0, 10.0, 22.68689, 40.13, -15.0, 43.0, 29.6639, 99.17, -2.40, 36.91),
    star!("Shaula", 17.0, 33.0, 36.52012, -8.53, -37.0, 6.0, 13.7648, -30.80, -3.00, 5.71),
    star!("Rasalhague", 17.0, 34.0, 56.06945, 108.07, 12.0, 33.0, 36.1346, -221.57, 11.70, 67.13),
    star!("Eltanin", 17.0, 56.0, 36.36988, -8.48, 51.0, 29.0, 20.0242, -22.79, -27.91, 21.14),
    star!("Kaus Australis", 18.0, 24.0, 10.31840, -39.42, -34.0, 23.0, 4.6193, -124.20, -15.00, 22.76),
    star!("Vega", 18.0, 36.0, 56.33635, 200.94, 38.0, 47.0, 1.2802, 286.23, -20.60, 130.23),
    star!("Nunki", 18.0, 55.0, 15.92650, 15.14, -26.0, 17.0, 48.2068, -53.43, -11.2, 14.32),
    star!("Altair", 19.0, 50.0, 46.99855, 536.23, 8.0, 52.0, 5.9563, 385.29, -26.60, 194.95),
    star!("Peacock", 20.0, 25.0, 38.85705, 6.90, -56.0, 44.0, 6.3230, -86.02, 2.0, 18.24),
    star!("Deneb", 20.0, 41.0, 25.91514, 2.01, 45.0, 16.0, 49.2197, 1.85, -4.90, 2.31),
    star!("Enif", 21.0, 44.0, 11.15614, 26.92, 9.0, 52.0, 30.0311, 0.44, 3.39, 4.73),
    star!("Al Na'ir", 22.0, 8.0, 13.98473, 126.69, -46.0, 57.0, 39.5078, -147.47, 10.90, 32.29),
    star!("Fomalhaut", 22.0, 57.0, 39.04625, 328.95, -29.0, 37.0, 20.0533, -164.67, 6.50, 129.81),
    star!("Scheat", 23.0, 3.0, 46.45746, 187.65, 28.0, 4.0, 58.0336, 136.93, 7.99, 16.64),
    star!("Markab", 23.0, 4.0, 45.65345, 60.40, 15.0, 12.0, 18.9617, -41.30, -2.70, 24.46),
];

static STAR_INDEX: Lazy<AHashMap<&'static str, usize>> = Lazy::new(|| {
    STARS
        .iter()
        .enumerate()
        .map(|(i, star)| (star.name, i))
        .collect()
});

/// Catalogue index of a star, by exact name.
pub fn star_index(name: &str) -> Option<usize> {
    STAR_INDEX.get(name).copied()
}

impl StarEntry {
    /// Apparent right ascension and declination of date.
    ///
    /// Arguments
    /// ---------
    /// * `jde`: Julian Ephemeris Day.
    /// * `orientation`: nutation and obliquity at `jde`.
    /// * `earth`: heliocentric equatorial position of the Earth in AU, for the annual parallax.
    ///
    /// Return
    /// ------
    /// * `(ra, dec)` in radians after space motion, parallax, frame bias, precession and nutation.
    pub fn apparent_place(
        &self,
        jde: JulianDay,
        orientation: &EarthOrientation,
        earth: &Vector3<f64>,
    ) -> (Radian, Radian) {
        let (ra, dec) = proper_motion_parallax(
            jde,
            self.ra,
            self.dec,
            self.pm_ra,
            self.pm_dec,
            self.radial_velocity,
            self.parallax,
            earth,
        );
        let (ra, dec) = frame_bias(ra, dec);
        let (ra, dec) = precess(jde, ra, dec);
        nutate(orientation, ra, dec)
    }
}
