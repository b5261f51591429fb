//! Display colour of a sight and the default colour rotation.

use std::{fmt, str::FromStr};

use crate::celnav_errors::CelnavError;

/// Alpha given to the default colours.
pub const DEFAULT_ALPHA: u8 = 150;

/// Names handed out in turn to new sights, with their RGB values.
pub const SIGHT_COLOURS: [(&str, [u8; 3]); 40] = [
    ("medium violet red", [199, 21, 133]),
    ("midnight blue", [47, 47, 79]),
    ("orange", [204, 50, 50]),
    ("plum", [234, 173, 234]),
    ("purple", [176, 0, 255]),
    ("red", [255, 0, 0]),
    ("salmon", [111, 66, 66]),
    ("slate blue", [0, 127, 255]),
    ("spring green", [0, 255, 127]),
    ("orange red", [255, 0, 127]),
    ("orchid", [219, 112, 219]),
    ("pale green", [143, 188, 143]),
    ("pink", [188, 143, 234]),
    ("brown", [165, 42, 42]),
    ("blue", [0, 0, 255]),
    ("green yellow", [147, 219, 112]),
    ("goldenrod", [219, 219, 112]),
    ("blue violet", [159, 95, 159]),
    ("aquamarine", [112, 219, 147]),
    ("cadet blue", [95, 159, 159]),
    ("coral", [255, 127, 0]),
    ("cornflower blue", [66, 66, 111]),
    ("forest green", [35, 142, 35]),
    ("gold", [204, 127, 50]),
    ("thistle", [216, 191, 216]),
    ("turquoise", [173, 234, 234]),
    ("violet", [79, 47, 79]),
    ("sea green", [35, 142, 107]),
    ("sky blue", [50, 153, 204]),
    ("yellow green", [153, 204, 50]),
    ("indian red", [79, 47, 47]),
    ("light blue", [191, 216, 216]),
    ("lime green", [50, 204, 50]),
    ("magenta", [255, 0, 255]),
    ("maroon", [142, 35, 107]),
    ("medium goldenrod", [234, 234, 173]),
    ("medium orchid", [147, 112, 219]),
    ("medium sea green", [66, 111, 66]),
    ("violet red", [204, 50, 153]),
    ("yellow", [255, 255, 0]),
];

/// RGBA colour with the name it was picked by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colour {
    pub name: String,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity, 0 transparent to 255 opaque
    pub a: u8,
}

impl Colour {
    /// The `index`-th default colour (wrapping), with the default alpha.
    pub fn nth_default(index: usize) -> Self {
        let (name, [r, g, b]) = SIGHT_COLOURS[index % SIGHT_COLOURS.len()];
        Colour {
            name: name.to_string(),
            r,
            g,
            b,
            a: DEFAULT_ALPHA,
        }
    }

    /// Same colour with another alpha.
    pub fn with_alpha(mut self, a: u8) -> Self {
        self.a = a;
        self
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::nth_default(0)
    }
}

/// Colour as `rgb(r, g, b)`, the alpha is kept apart.
impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for Colour {
    type Err = CelnavError;

    /// Accepts `rgb(r, g, b)`, `#rrggbb` or one of the default colour names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CelnavError::InvalidSightField(format!("colour '{s}'"));
        let s = s.trim();

        let [r, g, b] = if let Some(body) = s.strip_prefix("rgb(").and_then(|t| t.strip_suffix(')')) {
            let parts: Vec<u8> = body
                .split(',')
                .map(|c| c.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| invalid())?;
            <[u8; 3]>::try_from(parts).map_err(|_| invalid())?
        } else if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid());
            }
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            [byte(0)?, byte(2)?, byte(4)?]
        } else {
            let lower = s.to_lowercase();
            SIGHT_COLOURS
                .iter()
                .find(|(name, _)| *name == lower)
                .map(|(_, rgb)| *rgb)
                .ok_or_else(invalid)?
        };

        Ok(Colour {
            name: String::new(),
            r,
            g,
            b,
            a: DEFAULT_ALPHA,
        })
    }
}

#[cfg(test)]
mod colour_test {
    use super::*;

    #[test]
    fn test_default_rotation_wraps() {
        assert_eq!(Colour::nth_default(0).name, "medium violet red");
        assert_eq!(Colour::nth_default(39).name, "yellow");
        assert_eq!(Colour::nth_default(40), Colour::nth_default(0));
        assert_eq!(Colour::nth_default(5).a, 150);
    }

    #[test]
    fn test_parse() {
        let c: Colour = "rgb(199, 21, 133)".parse().unwrap();
        assert_eq!((c.r, c.g, c.b), (199, 21, 133));
        let c: Colour = "#FF7F00".parse().unwrap();
        assert_eq!((c.r, c.g, c.b), (255, 127, 0));
        let c: Colour = "Forest Green".parse().unwrap();
        assert_eq!((c.r, c.g, c.b), (35, 142, 35));
        assert!("rgb(1, 2)".parse::<Colour>().is_err());
        assert!("#12".parse::<Colour>().is_err());
        assert!("chartreuse".parse::<Colour>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Colour::nth_default(5).to_string(), "rgb(255, 0, 0)");
    }
}
