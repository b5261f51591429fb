//! Structured calculation trace of a sight reduction.
//!
//! A [`CalcTrace`] is the audit of one `recompute`: almanac headers for the bodies
//! involved, then one [`TraceStep`] per formula with its substituted values and result.
//! `Display` renders the headers as text blocks and the steps as a `comfy-table`.

use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};
use hifitime::Epoch;
use smallvec::SmallVec;

use crate::{
    body::{Body, BodyLocation},
    constants::{Degree, JulianDay, Seconds},
    geometry::spherical::resolve_heading_positive,
    time::{delta_t_seconds, format_utc, jd_ut, jde_tt, to_sdmm, AngleFormat},
};

/// Value produced by one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceValue {
    /// Degrees, also shown in degrees and minutes
    Angle(Degree),
    Number(f64),
    Seconds(Seconds),
}

impl TraceValue {
    pub fn value(&self) -> f64 {
        match *self {
            TraceValue::Angle(v) | TraceValue::Number(v) | TraceValue::Seconds(v) => v,
        }
    }
}

impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TraceValue::Angle(v) => write!(f, "{v:.4}° = {}", to_sdmm(AngleFormat::Plain, v)),
            TraceValue::Number(v) => write!(f, "{v:.4}"),
            TraceValue::Seconds(v) => write!(f, "{v:.4} s"),
        }
    }
}

/// One formula of the reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub label: String,
    pub formula: String,
    /// The formula with its inputs substituted
    pub values: String,
    pub result: TraceValue,
}

/// Almanac data of one body at the corrected sight time.
#[derive(Debug, Clone, PartialEq)]
pub struct AlmanacHeader {
    pub body: Body,
    pub epoch: Epoch,
    pub jd: JulianDay,
    pub delta_t: Seconds,
    pub tt: JulianDay,
    pub lat: Degree,
    pub lon: Degree,
    pub gha_aries: Degree,
    pub sha: Degree,
    pub gha: Degree,
    pub dec: Degree,
    /// Semi-diameter, degrees
    pub semi_diameter: Degree,
    /// Horizontal parallax, degrees
    pub horizontal_parallax: Degree,
}

impl AlmanacHeader {
    pub fn new(
        body: Body,
        epoch: Epoch,
        location: &BodyLocation,
        semi_diameter: Degree,
        horizontal_parallax: Degree,
    ) -> Self {
        AlmanacHeader {
            body,
            epoch,
            jd: jd_ut(epoch),
            delta_t: delta_t_seconds(epoch),
            tt: jde_tt(epoch),
            lat: location.lat,
            lon: location.lon,
            gha_aries: location.gha_aries,
            sha: resolve_heading_positive(360.0 - location.lon - location.gha_aries),
            gha: resolve_heading_positive(-location.lon),
            dec: location.lat,
            semi_diameter,
            horizontal_parallax,
        }
    }
}

impl fmt::Display for AlmanacHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (date, time) = format_utc(self.epoch);
        writeln!(f, "Almanac Data For {}", self.body)?;
        writeln!(f, "Date = {date} {time}")?;
        writeln!(f, "JD = {:.6}", self.jd)?;
        writeln!(f, "DeltaT = {:.4}", self.delta_t)?;
        writeln!(f, "TT = {:.6}", self.tt)?;
        writeln!(
            f,
            "Geographical Position (lat, lon) = {:.4}° {:.4}° = {} {}",
            self.lat,
            self.lon,
            to_sdmm(AngleFormat::Latitude, self.lat),
            to_sdmm(AngleFormat::Longitude, self.lon)
        )?;
        writeln!(
            f,
            "GHAAST = {:.4}° = {}",
            self.gha_aries,
            to_sdmm(AngleFormat::Plain, self.gha_aries)
        )?;
        writeln!(f, "SHA = {:.4}° = {}", self.sha, to_sdmm(AngleFormat::Plain, self.sha))?;
        writeln!(f, "GHA = {:.4}° = {}", self.gha, to_sdmm(AngleFormat::Plain, self.gha))?;
        writeln!(f, "Dec = {:.4}° = {}", self.dec, to_sdmm(AngleFormat::Latitude, self.dec))?;
        writeln!(f, "SD = {:.4}'", self.semi_diameter * 60.0)?;
        writeln!(f, "HP = {:.4}'", self.horizontal_parallax * 60.0)
    }
}

/// Ordered record of a reduction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalcTrace {
    /// One header per body, two for a lunar
    headers: SmallVec<[AlmanacHeader; 2]>,
    notes: Vec<String>,
    steps: Vec<TraceStep>,
}

impl CalcTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_header(&mut self, header: AlmanacHeader) {
        self.headers.push(header);
    }

    /// Free-text remark, printed before the steps.
    pub fn note(&mut self, text: impl Into<String>) {
        self.notes.push(text.into());
    }

    /// Record a step and hand back its value.
    pub fn step(
        &mut self,
        label: &str,
        formula: &str,
        values: impl Into<String>,
        result: TraceValue,
    ) -> f64 {
        self.steps.push(TraceStep {
            label: label.to_string(),
            formula: formula.to_string(),
            values: values.into(),
            result,
        });
        result.value()
    }

    /// Shorthand for an angle step.
    pub fn angle(&mut self, label: &str, formula: &str, values: impl Into<String>, v: Degree) -> Degree {
        self.step(label, formula, values, TraceValue::Angle(v))
    }

    pub fn headers(&self) -> &[AlmanacHeader] {
        self.headers.as_slice()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// First step with the given label.
    pub fn find(&self, label: &str) -> Option<&TraceStep> {
        self.steps.iter().find(|s| s.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.notes.is_empty() && self.steps.is_empty()
    }

    fn render_steps(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Step"),
            Cell::new("Formula"),
            Cell::new("Values"),
            Cell::new("Result"),
        ]);

        for s in &self.steps {
            table.add_row(Row::from(vec![
                Cell::new(&s.label),
                Cell::new(&s.formula),
                Cell::new(&s.values),
                Cell::new(s.result.to_string()).set_alignment(CellAlignment::Right),
            ]));
        }

        table.to_string()
    }
}

impl fmt::Display for CalcTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for h in &self.headers {
            writeln!(f, "{h}")?;
        }
        for n in &self.notes {
            writeln!(f, "{n}")?;
        }
        if !self.steps.is_empty() {
            writeln!(f, "{}", self.render_steps())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod trace_test {
    use super::*;
    use crate::time::parse_utc;

    fn header() -> AlmanacHeader {
        let location = BodyLocation {
            lat: -18.253772,
            lon: -128.340599,
            gha_aries: 357.873156,
            rad: 0.98938658,
            distance: None,
        };
        AlmanacHeader::new(
            Body::Sun,
            parse_utc("2024-11-13", "20:17:45").unwrap(),
            &location,
            16.1654 / 60.0,
            0.002468,
        )
    }

    #[test]
    fn test_header_hour_angles() {
        let h = header();
        assert!((h.gha - 128.340599).abs() < 1e-9);
        assert!((h.sha - (360.0 + 128.340599 - 357.873156)).abs() < 1e-9);
        assert_eq!(h.dec, h.lat);
        assert!((h.delta_t - 69.184).abs() < 1e-3);
    }

    #[test]
    fn test_header_display() {
        let text = header().to_string();
        assert!(text.starts_with("Almanac Data For Sun\nDate = 2024-11-13 20:17:45\n"));
        assert!(text.contains("GHA = 128.3406° = 128° 20.4359'"));
        assert!(text.contains("Dec = -18.2538° = S 18° 15.2263'"));
        assert!(text.contains("SD = 16.1654'"));
    }

    #[test]
    fn test_steps_and_rendering() {
        let mut trace = CalcTrace::new();
        assert!(trace.is_empty());
        let ic = trace.angle("Index Error", "IE / 60", "3.2' / 60", 3.2 / 60.0);
        assert_eq!(ic, 3.2 / 60.0);
        trace.step("x", "tan(Ha + …)", "tan(11.3179 + …)", TraceValue::Number(0.2));
        trace.note("Applying clock correction of 5 seconds");
        trace.add_header(header());

        assert_eq!(trace.steps().len(), 2);
        assert_eq!(trace.find("x").unwrap().result, TraceValue::Number(0.2));
        let text = trace.to_string();
        assert!(text.contains("Index Error"));
        assert!(text.contains("0.0533° = 0° 03.2000'"));
        assert!(text.contains("Applying clock correction of 5 seconds"));
    }
}
