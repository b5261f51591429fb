//! # Constants and type definitions for celnav
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the `celnav` library.
//!
//! ## Overview
//!
//! - Astronomical and geophysical constants (Earth and Moon radii, astronomical unit)
//! - Unit conversions (degrees ↔ radians, arcseconds ↔ radians, days ↔ seconds)
//! - Epoch constants for Julian dates
//! - Core type aliases used across the crate
//!
//! These definitions are used by the ephemeris engine, the frame transforms, the sight
//! reduction pipelines, and the line-of-position builders.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00:00 TT)
pub const J2000: f64 = 2_451_545.0;

/// Astronomical Unit in kilometers, as used by the VSOP87 distance scaling
pub const AU: f64 = 149_597_870.691;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Earth equatorial radius in kilometers, used for horizontal parallax
pub const EARTH_RADIUS: f64 = 6378.14;

/// Mean lunar radius in kilometers
pub const MOON_MEAN_RADIUS: f64 = 1737.5;

/// Ratio between the lunar and terrestrial radii, used for the lunar semi-diameter
pub const K_MOON: f64 = MOON_MEAN_RADIUS / EARTH_RADIUS;

/// Light travel time for one AU, in days
pub const LIGHT_TIME_DAYS_PER_AU: f64 = 0.0057755183;

/// Semi-diameter of the Sun at 1 AU, in degrees (959.63″)
pub const SUN_SEMI_DIAMETER_1AU: f64 = 0.266564;

/// Horizontal parallax of the Sun at 1 AU, in degrees (8.794″)
pub const SUN_PARALLAX_1AU: f64 = 0.002442;

/// Mean geocentric Earth–Moon distance of the lunar series, in kilometers
pub const MOON_MEAN_DISTANCE: f64 = 385_000.56;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-6;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in arc-minutes
pub type ArcMin = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Distance in nautical miles
pub type NauticalMile = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Julian Date (days)
pub type JulianDay = f64;
/// Time span in seconds
pub type Seconds = f64;
