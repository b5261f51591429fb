//! # Reduction parameters
//!
//! [`ReductionParams`] gathers the tunables of the sight-reduction and line-of-position
//! pipelines, [`SightDefaults`] the environmental values a new sight starts from.
//!
//! ## Groups
//!
//! - **Lunar distance**: method (clearing or correction difference), seconds of clock error
//!   per degree of distance error, interval used to decide whether the distance is growing.
//! - **Planets**: light-time iteration budget and tolerance.
//! - **Lines of position**: bearing sweep step of the altitude builder, tolerances and
//!   iteration budget of the bearing solver.
//!
//! ## Example
//!
//! ```rust
//! use celnav::reduction_params::{LunarMethod, ReductionParams};
//!
//! let params = ReductionParams::builder()
//!     .lunar_method(LunarMethod::CorrectionDifference)
//!     .seconds_per_degree(6720.0)
//!     .trace_step_deg(2.0)
//!     .build()
//!     .unwrap();
//! println!("{params:#}");
//! ```
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use crate::{
    celnav_errors::CelnavError,
    constants::{ArcMin, Degree, Meter, Radian, Seconds, DPI},
    ephemeris::planets::LightTime,
};

/// How a lunar distance is cleared of refraction and parallax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LunarMethod {
    /// Rigorous clearing of the distance with the apparent and true altitudes of both bodies
    #[default]
    Clearing,
    /// Subtract the difference of the altitude corrections of both bodies
    CorrectionDifference,
}

impl fmt::Display for LunarMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LunarMethod::Clearing => write!(f, "clearing"),
            LunarMethod::CorrectionDifference => write!(f, "correction difference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReductionParams {
    // --- Lunar distance ---
    pub lunar_method: LunarMethod,
    pub seconds_per_degree: f64,
    pub trend_interval_s: Seconds,

    // --- Planets ---
    pub light_time_max_iter: usize,
    pub light_time_tolerance: Radian,

    // --- Lines of position ---
    pub trace_step_deg: Degree,
    pub bearing_trace_tolerance: Degree,
    pub bearing_accept_residual: Degree,
    pub bearing_max_iter: usize,
}

impl ReductionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ReductionParamsBuilder {
        ReductionParamsBuilder::new()
    }

    /// Light-time budget handed to the almanac.
    pub fn light_time(&self) -> LightTime {
        LightTime {
            max_iter: self.light_time_max_iter,
            tolerance: self.light_time_tolerance,
        }
    }
}

impl Default for ReductionParams {
    fn default() -> Self {
        ReductionParams {
            lunar_method: LunarMethod::Clearing,
            // 360° in 28 days: 28·86400/360
            seconds_per_degree: 6720.0,
            trend_interval_s: 60.0,

            light_time_max_iter: 20,
            light_time_tolerance: DPI / 86_400.0,

            trace_step_deg: 1.0,
            bearing_trace_tolerance: 0.001,
            bearing_accept_residual: 0.1,
            bearing_max_iter: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReductionParamsBuilder {
    params: ReductionParams,
}

impl Default for ReductionParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReductionParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ReductionParams::default(),
        }
    }

    // --- Lunar distance ---
    pub fn lunar_method(mut self, v: LunarMethod) -> Self {
        self.params.lunar_method = v;
        self
    }
    pub fn seconds_per_degree(mut self, v: f64) -> Self {
        self.params.seconds_per_degree = v;
        self
    }
    pub fn trend_interval_s(mut self, v: Seconds) -> Self {
        self.params.trend_interval_s = v;
        self
    }

    // --- Planets ---
    pub fn light_time_max_iter(mut self, v: usize) -> Self {
        self.params.light_time_max_iter = v;
        self
    }
    pub fn light_time_tolerance(mut self, v: Radian) -> Self {
        self.params.light_time_tolerance = v;
        self
    }

    // --- Lines of position ---
    pub fn trace_step_deg(mut self, v: Degree) -> Self {
        self.params.trace_step_deg = v;
        self
    }
    pub fn bearing_trace_tolerance(mut self, v: Degree) -> Self {
        self.params.bearing_trace_tolerance = v;
        self
    }
    pub fn bearing_accept_residual(mut self, v: Degree) -> Self {
        self.params.bearing_accept_residual = v;
        self
    }
    pub fn bearing_max_iter(mut self, v: usize) -> Self {
        self.params.bearing_max_iter = v;
        self
    }

    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    #[inline]
    fn le(a: f64, b: f64) -> bool {
        matches!(a.partial_cmp(&b), Some(Less) | Some(Equal))
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ------
    /// * [`CelnavError::InvalidReductionParameter`] naming the first rejected field.
    pub fn build(self) -> Result<ReductionParams, CelnavError> {
        let p = &self.params;

        if !Self::gt0(p.seconds_per_degree) {
            return Err(CelnavError::InvalidReductionParameter(
                "seconds_per_degree must be > 0".into(),
            ));
        }
        if !Self::gt0(p.trend_interval_s) {
            return Err(CelnavError::InvalidReductionParameter(
                "trend_interval_s must be > 0".into(),
            ));
        }
        if p.light_time_max_iter == 0 {
            return Err(CelnavError::InvalidReductionParameter(
                "light_time_max_iter must be >= 1".into(),
            ));
        }
        if !Self::gt0(p.light_time_tolerance) {
            return Err(CelnavError::InvalidReductionParameter(
                "light_time_tolerance must be > 0".into(),
            ));
        }
        if !(Self::gt0(p.trace_step_deg) && Self::le(p.trace_step_deg, 360.0)) {
            return Err(CelnavError::InvalidReductionParameter(
                "trace_step_deg must be in (0, 360]".into(),
            ));
        }
        if !Self::gt0(p.bearing_trace_tolerance) {
            return Err(CelnavError::InvalidReductionParameter(
                "bearing_trace_tolerance must be > 0".into(),
            ));
        }
        if !Self::gt0(p.bearing_accept_residual) {
            return Err(CelnavError::InvalidReductionParameter(
                "bearing_accept_residual must be > 0".into(),
            ));
        }
        if p.bearing_max_iter == 0 {
            return Err(CelnavError::InvalidReductionParameter(
                "bearing_max_iter must be >= 1".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for ReductionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 44;
            writeln!(f, "Sight Reduction Parameters")?;
            writeln!(f, "--------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Lunar distance]")?;
            line!(
                "lunar_method            = {}",
                self.lunar_method,
                "Clearing of the measured distance"
            )?;
            line!(
                "seconds_per_degree      = {:.1} s",
                self.seconds_per_degree,
                "Clock error per degree of distance"
            )?;
            line!(
                "trend_interval_s        = {:.1} s",
                self.trend_interval_s,
                "Interval to sense the distance trend"
            )?;

            writeln!(f, "\n[Planets]")?;
            line!(
                "light_time_max_iter     = {}",
                self.light_time_max_iter,
                "Max light-time iterations"
            )?;
            line!(
                "light_time_tolerance    = {:.1e} rad",
                self.light_time_tolerance,
                "Light-time convergence threshold"
            )?;

            writeln!(f, "\n[Lines of position]")?;
            line!(
                "trace_step_deg          = {:.3}°",
                self.trace_step_deg,
                "Bearing step of altitude LOPs"
            )?;
            line!(
                "bearing_trace_tolerance = {:.1e}°",
                self.bearing_trace_tolerance,
                "Bearing solver stop criterion"
            )?;
            line!(
                "bearing_accept_residual = {:.3}°",
                self.bearing_accept_residual,
                "Max back-bearing residual kept"
            )?;
            line!(
                "bearing_max_iter        = {}",
                self.bearing_max_iter,
                "Max bearing solver steps"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "ReductionParams(lunar={}, s/deg={:.0}, trend={:.0}s, light_time={}x{:.1e}, trace_step={:.2}°, bearing_tol={:.1e}°, residual≤{:.2}°, bearing_iter={})",
                self.lunar_method,
                self.seconds_per_degree,
                self.trend_interval_s,
                self.light_time_max_iter,
                self.light_time_tolerance,
                self.trace_step_deg,
                self.bearing_trace_tolerance,
                self.bearing_accept_residual,
                self.bearing_max_iter,
            )
        }
    }
}

/// Environmental values a new sight is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightDefaults {
    pub eye_height: Meter,
    /// °C
    pub temperature: f64,
    /// hPa
    pub pressure: f64,
    pub index_error: ArcMin,
}

impl Default for SightDefaults {
    fn default() -> Self {
        SightDefaults {
            eye_height: 2.0,
            temperature: 10.0,
            pressure: 1010.0,
            index_error: 0.0,
        }
    }
}

#[cfg(test)]
mod reduction_params_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = ReductionParams::default();
        assert_eq!(p.lunar_method, LunarMethod::Clearing);
        assert_eq!(p.seconds_per_degree, 6720.0);
        assert_eq!(p.light_time().max_iter, 20);
        assert_eq!(ReductionParams::builder().build().unwrap(), p);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        let cases = [
            ReductionParams::builder().seconds_per_degree(0.0),
            ReductionParams::builder().trend_interval_s(-1.0),
            ReductionParams::builder().light_time_max_iter(0),
            ReductionParams::builder().light_time_tolerance(f64::NAN),
            ReductionParams::builder().trace_step_deg(0.0),
            ReductionParams::builder().trace_step_deg(400.0),
            ReductionParams::builder().bearing_trace_tolerance(0.0),
            ReductionParams::builder().bearing_accept_residual(-0.1),
            ReductionParams::builder().bearing_max_iter(0),
        ];
        for builder in cases {
            assert!(matches!(
                builder.build(),
                Err(CelnavError::InvalidReductionParameter(_))
            ));
        }
    }

    #[test]
    fn test_display() {
        let p = ReductionParams::default();
        let short = format!("{p}");
        assert!(short.starts_with("ReductionParams(lunar=clearing"));
        let long = format!("{p:#}");
        assert!(long.contains("[Lines of position]"));
        assert!(long.contains("seconds_per_degree      = 6720.0 s"));
    }

    #[test]
    fn test_sight_defaults() {
        let d = SightDefaults::default();
        assert_eq!(
            (d.eye_height, d.temperature, d.pressure, d.index_error),
            (2.0, 10.0, 1010.0, 0.0)
        );
    }
}
