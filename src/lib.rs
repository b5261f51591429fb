//! Celestial navigation sight reduction.
//!
//! Locate the Sun, Moon, planets and navigational stars ([`almanac`]), reduce sextant
//! sights ([`sight`]), and turn them into lines of position ([`geometry`]). A session of
//! sights lives in a [`sight_list::SightList`] and is saved with [`persistence`].

pub mod almanac;
pub mod body;
pub mod celnav_errors;
pub mod constants;
pub mod earth_orientation;
pub mod ephemeris;
pub mod geometry;
pub mod moon_distance;
pub mod persistence;
#[cfg(feature = "progress")]
pub(crate) mod progress_bar;
pub mod reduction_params;
pub mod ref_system;
pub mod sight;
pub mod sight_list;
pub mod star_catalog;
pub mod time;
