//! # XML persistence of a sight list
//!
//! Layout, one element per sight, every value an attribute:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <OpenCPNCelestialNavigation version="0.1" creator="celnav">
//!   <ClockError Seconds="0"/>
//!   <Sight Visible="true" Type="0" Body="Sun" BodyLimb="1" Date="2024-11-13" Time="20:17:45" .../>
//! </OpenCPNCelestialNavigation>
//! ```
//!
//! Reading is lenient: a missing or unreadable attribute takes its default, numbers and
//! booleans are accepted in the forms older files used (`1`, `0`, `1.000000`, `true`).
//! A sight whose date, time, body, type or limb cannot be read is skipped with a warning.
//! Times carry their fraction of a second when they have one (`Time="20:17:45.25"`).
//!
//! Only inputs are stored. Call [`crate::sight_list::SightList::recompute_all`] after loading.

use camino::Utf8Path;
use log::{info, warn};
use quick_xml::{de::from_str, se::to_string};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    body::Body,
    celnav_errors::CelnavError,
    reduction_params::SightDefaults,
    sight::{
        colour::{Colour, DEFAULT_ALPHA},
        Limb, LunarInputs, LunarLimb, Sight, SightType,
    },
    sight_list::SightList,
    time::{format_utc, parse_utc},
};

pub const XML_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR")
);
pub const XML_CREATOR: &str = "celnav";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "OpenCPNCelestialNavigation")]
struct XmlDocument {
    #[serde(rename = "@version", default)]
    version: String,
    #[serde(rename = "@creator", default)]
    creator: String,
    #[serde(rename = "ClockError", default)]
    clock_error: Option<XmlClockError>,
    #[serde(rename = "Sight", default)]
    sights: Vec<XmlSight>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlClockError {
    #[serde(rename = "@Seconds", default, deserialize_with = "lenient_i64")]
    seconds: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlSight {
    #[serde(rename = "@Visible", default, deserialize_with = "lenient_bool")]
    visible: Option<bool>,
    #[serde(rename = "@Type", default, deserialize_with = "lenient_i64")]
    sight_type: Option<i64>,
    #[serde(rename = "@Body", default)]
    body: Option<String>,
    #[serde(rename = "@BodyLimb", default, deserialize_with = "lenient_i64")]
    body_limb: Option<i64>,
    #[serde(rename = "@Date", default)]
    date: Option<String>,
    #[serde(rename = "@Time", default)]
    time: Option<String>,
    #[serde(rename = "@TimeCertainty", default, deserialize_with = "lenient_f64")]
    time_certainty: Option<f64>,
    #[serde(rename = "@Measurement", default, deserialize_with = "lenient_f64")]
    measurement: Option<f64>,
    #[serde(rename = "@MeasurementCertainty", default, deserialize_with = "lenient_f64")]
    measurement_certainty: Option<f64>,
    #[serde(rename = "@EyeHeight", default, deserialize_with = "lenient_f64")]
    eye_height: Option<f64>,
    #[serde(rename = "@Temperature", default, deserialize_with = "lenient_f64")]
    temperature: Option<f64>,
    #[serde(rename = "@Pressure", default, deserialize_with = "lenient_f64")]
    pressure: Option<f64>,
    #[serde(rename = "@IndexError", default, deserialize_with = "lenient_f64")]
    index_error: Option<f64>,
    #[serde(rename = "@ShiftNm", default, deserialize_with = "lenient_f64")]
    shift_nm: Option<f64>,
    #[serde(rename = "@ShiftBearing", default, deserialize_with = "lenient_f64")]
    shift_bearing: Option<f64>,
    #[serde(rename = "@MagneticShiftBearing", default, deserialize_with = "lenient_bool")]
    magnetic_shift_bearing: Option<bool>,
    #[serde(rename = "@ColourName", default)]
    colour_name: Option<String>,
    #[serde(rename = "@Colour", default)]
    colour: Option<String>,
    #[serde(rename = "@Transparency", default, deserialize_with = "lenient_i64")]
    transparency: Option<i64>,
    #[serde(rename = "@LunarMoonAltitude", default, deserialize_with = "lenient_f64")]
    lunar_moon_altitude: Option<f64>,
    #[serde(rename = "@LunarMoonLimb", default, deserialize_with = "lenient_i64")]
    lunar_moon_limb: Option<i64>,
    #[serde(rename = "@LunarBodyAltitude", default, deserialize_with = "lenient_f64")]
    lunar_body_altitude: Option<f64>,
    #[serde(rename = "@LunarBodyLimb", default, deserialize_with = "lenient_i64")]
    lunar_body_limb: Option<i64>,
    #[serde(rename = "@LunarLimb", default, deserialize_with = "lenient_i64")]
    lunar_limb: Option<i64>,
    #[serde(rename = "@DRLat", default, deserialize_with = "lenient_f64")]
    dr_lat: Option<f64>,
    #[serde(rename = "@DRLon", default, deserialize_with = "lenient_f64")]
    dr_lon: Option<f64>,
    #[serde(rename = "@MagneticNorth", default, deserialize_with = "lenient_bool")]
    magnetic_north: Option<bool>,
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().parse().ok())
}

pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    Ok(s.parse()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|v| v as i64)))
}

pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    Ok(match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => s.parse::<f64>().ok().map(|v| v != 0.0),
    })
}

fn code(value: Option<i64>, default: i32) -> i32 {
    value
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(default)
}

impl XmlSight {
    fn from_sight(s: &Sight) -> Self {
        let (date, time) = format_utc(s.date_time);
        XmlSight {
            visible: Some(s.visible),
            sight_type: Some(s.sight_type.code().into()),
            body: Some(s.body.name().to_string()),
            body_limb: Some(s.body_limb.code().into()),
            date: Some(date),
            time: Some(time),
            time_certainty: Some(s.time_certainty),
            measurement: Some(s.measurement),
            measurement_certainty: Some(s.measurement_certainty),
            eye_height: Some(s.eye_height),
            temperature: Some(s.temperature),
            pressure: Some(s.pressure),
            index_error: Some(s.index_error),
            shift_nm: Some(s.shift_nm),
            shift_bearing: Some(s.shift_bearing),
            magnetic_shift_bearing: Some(s.magnetic_shift_bearing),
            colour_name: Some(s.colour.name.clone()),
            colour: Some(s.colour.to_string()),
            transparency: Some(s.colour.a.into()),
            lunar_moon_altitude: Some(s.lunar.moon_altitude),
            lunar_moon_limb: Some(s.lunar.moon_limb.code().into()),
            lunar_body_altitude: Some(s.lunar.body_altitude),
            lunar_body_limb: Some(s.lunar.body_limb.code().into()),
            lunar_limb: Some(s.lunar.limb.code().into()),
            dr_lat: Some(s.dr_lat),
            dr_lon: Some(s.dr_lon),
            magnetic_north: Some(s.magnetic_north),
        }
    }

    /// Build the sight, `fallback_colour` standing in for an unreadable colour.
    fn into_sight(self, fallback_colour: Colour) -> Result<Sight, CelnavError> {
        let date = self.date.unwrap_or_default();
        let time = self.time.unwrap_or_default();
        let date_time = parse_utc(&date, &time)?;

        let body: Body = self.body.unwrap_or_default().parse()?;
        let sight_type = SightType::try_from(code(self.sight_type, 0))?;
        let body_limb = Limb::try_from(code(self.body_limb, 0))?;
        let lunar = LunarInputs {
            moon_altitude: self.lunar_moon_altitude.unwrap_or(0.0),
            moon_limb: Limb::try_from(code(self.lunar_moon_limb, Limb::Lower.code()))?,
            body_altitude: self.lunar_body_altitude.unwrap_or(0.0),
            body_limb: Limb::try_from(code(self.lunar_body_limb, Limb::Lower.code()))?,
            limb: LunarLimb::try_from(code(self.lunar_limb, LunarLimb::Near.code()))?,
        };

        let alpha = self
            .transparency
            .and_then(|a| u8::try_from(a).ok())
            .unwrap_or(DEFAULT_ALPHA);
        let colour = match self.colour.as_deref().map(str::parse::<Colour>) {
            Some(Ok(c)) => Colour {
                name: self.colour_name.unwrap_or_default(),
                ..c
            },
            _ => fallback_colour,
        }
        .with_alpha(alpha);

        let defaults = SightDefaults::default();
        let mut sight = Sight::new(
            sight_type,
            body,
            body_limb,
            date_time,
            self.time_certainty.unwrap_or(0.0),
            self.measurement.unwrap_or(0.0),
            self.measurement_certainty.unwrap_or(0.25),
            &SightDefaults {
                eye_height: self.eye_height.unwrap_or(defaults.eye_height),
                temperature: self.temperature.unwrap_or(defaults.temperature),
                pressure: self.pressure.unwrap_or(defaults.pressure),
                index_error: self.index_error.unwrap_or(defaults.index_error),
            },
            colour,
        );
        sight.visible = self.visible.unwrap_or(true);
        sight.shift_nm = self.shift_nm.unwrap_or(0.0);
        sight.shift_bearing = self.shift_bearing.unwrap_or(0.0);
        sight.magnetic_shift_bearing = self.magnetic_shift_bearing.unwrap_or(true);
        sight.lunar = lunar;
        sight.dr_lat = self.dr_lat.unwrap_or(0.0);
        sight.dr_lon = self.dr_lon.unwrap_or(0.0);
        sight.magnetic_north = self.magnetic_north.unwrap_or(true);
        Ok(sight)
    }
}

/// Serialize `list` to an XML document.
pub fn to_xml_string(list: &SightList) -> Result<String, CelnavError> {
    let document = XmlDocument {
        version: XML_VERSION.to_string(),
        creator: XML_CREATOR.to_string(),
        clock_error: Some(XmlClockError {
            seconds: Some(list.clock_error()),
        }),
        sights: list.iter().map(XmlSight::from_sight).collect(),
    };
    Ok(format!("{XML_DECLARATION}{}\n", to_string(&document)?))
}

/// Read a sight list from an XML document.
///
/// Arguments
/// ---------
/// * `xml`: document text.
///
/// Return
/// ------
/// * The list, with its clock error and the readable sights in file order. Each loaded
///   sight advances the default colour rotation.
///
/// Errors
/// ------
/// * [`CelnavError::XmlError`] when the document itself is malformed.
pub fn from_xml_str(xml: &str) -> Result<SightList, CelnavError> {
    let document: XmlDocument = from_str(xml)?;

    let mut list = SightList::new();
    list.set_clock_error(
        document
            .clock_error
            .and_then(|c| c.seconds)
            .unwrap_or(0),
    );

    let total = document.sights.len();
    for (index, record) in document.sights.into_iter().enumerate() {
        let fallback = list.next_colour();
        match record.into_sight(fallback) {
            Ok(sight) => list.push(sight),
            Err(e) => warn!("Skipping sight {index}: {e}"),
        }
    }
    info!(
        "Read {} of {total} sights (format {}, {})",
        list.len(),
        document.version,
        document.creator
    );
    Ok(list)
}

/// Write `list` to `path`.
pub fn save(list: &SightList, path: &Utf8Path) -> Result<(), CelnavError> {
    std::fs::write(path, to_xml_string(list)?)?;
    info!("Saved {} sights to {path}", list.len());
    Ok(())
}

/// Read a sight list from `path`.
pub fn load(path: &Utf8Path) -> Result<SightList, CelnavError> {
    let xml = std::fs::read_to_string(path)?;
    from_xml_str(&xml)
}

#[cfg(test)]
mod persistence_test {
    use super::*;

    const PLUGIN_FILE: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<OpenCPNCelestialNavigation version="1.4" creator="Opencpn Celestial Navigation plugin">
    <ClockError Seconds="12" />
    <Sight Visible="1" Type="0" Body="Sun" BodyLimb="1" Date="2024-11-13" Time="20:17:45"
        TimeCertainty="0.000000" Measurement="11.416667" MeasurementCertainty="0.250000"
        EyeHeight="2.400000" Temperature="15.000000" Pressure="1013.000000" IndexError="3.200000"
        ShiftNm="0.000000" ShiftBearing="0.000000" MagneticShiftBearing="1.000000"
        ColourName="medium violet red" Colour="rgb(199, 21, 133)" Transparency="150" />
    <Sight Visible="0" Type="1" Body="Sirius" BodyLimb="2" Date="not a date" Time="01:00:00" />
    <Sight Type="1" Body="Sirius" Date="2025-01-17" Time="01:02:03" Measurement="200.5" />
</OpenCPNCelestialNavigation>
"#;

    #[test]
    fn test_read_plugin_file() {
        let list = from_xml_str(PLUGIN_FILE).unwrap();
        assert_eq!(list.clock_error(), 12);
        assert_eq!(list.len(), 2);

        let sun = list.get(0).unwrap();
        assert!(sun.visible);
        assert_eq!(sun.sight_type, SightType::Altitude);
        assert_eq!(sun.body, Body::Sun);
        assert_eq!(sun.body_limb, Limb::Lower);
        assert_eq!(sun.index_error, 3.2);
        assert!(sun.magnetic_shift_bearing);
        assert_eq!(sun.colour.name, "medium violet red");
        assert_eq!((sun.colour.r, sun.colour.g, sun.colour.b, sun.colour.a), (199, 21, 133, 150));

        // missing attributes take their defaults
        let star = list.get(1).unwrap();
        assert_eq!(star.sight_type, SightType::Azimuth);
        assert_eq!(star.body_limb, Limb::Upper);
        assert_eq!(star.measurement_certainty, 0.25);
        assert_eq!(star.eye_height, 2.0);
        assert_eq!(star.pressure, 1010.0);
        assert!(star.visible);
        assert_eq!(star.lunar.limb, LunarLimb::Near);
        // unreadable colour: third sight of the file gets the third default colour
        assert_eq!(star.colour.name, "orange");
    }

    #[test]
    fn test_lenient_values() {
        let xml = r#"<OpenCPNCelestialNavigation>
            <Sight Visible="false" Type="2.0" Body="Venus" BodyLimb="x" Date="2025-08-09" Time="07:00:00"
                Pressure="high" LunarLimb="4" LunarMoonAltitude="63.98" Transparency="999"/>
        </OpenCPNCelestialNavigation>"#;
        let list = from_xml_str(xml).unwrap();
        assert_eq!(list.clock_error(), 0);
        let s = list.get(0).unwrap();
        assert!(!s.visible);
        assert_eq!(s.sight_type, SightType::Lunar);
        assert_eq!(s.body_limb, Limb::Upper);
        assert_eq!(s.pressure, 1010.0);
        assert_eq!(s.lunar.limb, LunarLimb::Far);
        assert_eq!(s.lunar.moon_altitude, 63.98);
        assert_eq!(s.colour.a, DEFAULT_ALPHA);
    }

    #[test]
    fn test_invalid_codes_are_skipped() {
        let xml = r#"<OpenCPNCelestialNavigation>
            <Sight Type="7" Body="Sun" Date="2025-08-09" Time="07:00:00"/>
            <Sight Type="0" Body="Vulcan" Date="2025-08-09" Time="07:00:00"/>
            <Sight Type="0" Body="Sun" BodyLimb="9" Date="2025-08-09" Time="07:00:00"/>
        </OpenCPNCelestialNavigation>"#;
        assert!(from_xml_str(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            from_xml_str("<OpenCPNCelestialNavigation><Sight"),
            Err(CelnavError::XmlError(_))
        ));
    }

    #[test]
    fn test_writer_header() {
        let text = to_xml_string(&SightList::new()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<OpenCPNCelestialNavigation"));
        assert!(text.contains("creator=\"celnav\""));
        assert!(text.contains("<ClockError Seconds=\"0\"/>"));
    }
}
