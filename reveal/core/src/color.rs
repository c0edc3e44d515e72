//! CSS Colour Values
//!
//! Colours arrive as CSS strings (`#ffffff`, `rgba(0, 0, 0, 0.0)`,
//! `hsl(120, 100%, 50%)`, any CSS named colour).
//! Toolkit backends that understand CSS can use the original string as-is;
//! backends that paint pixels or terminal cells use the parsed [`Rgba`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a CSS colour
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Empty input
    #[error("colour value is empty")]
    Empty,

    /// Hex notation with a bad digit or length
    #[error("invalid hex colour '{0}'")]
    InvalidHex(String),

    /// Functional notation with a bad component
    #[error("invalid colour function '{0}'")]
    InvalidFunction(String),

    /// Unknown colour keyword
    #[error("unknown colour name '{0}'")]
    UnknownName(String),
}

/// An 8-bit-per-channel colour with alpha
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha (0 = fully transparent)
    pub a: u8,
}

impl Rgba {
    /// Opaque colour
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Whether the colour is completely transparent
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// A CSS colour together with the text it was parsed from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssColor {
    source: String,
    rgba: Rgba,
}

impl CssColor {
    /// Parse a CSS colour string
    ///
    /// # Errors
    ///
    /// Returns a [`ColorError`] if the string is not a supported CSS colour.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(ColorError::Empty);
        }

        let lower = source.to_ascii_lowercase();
        let rgba = if let Some(hex) = lower.strip_prefix('#') {
            parse_hex(hex).ok_or_else(|| ColorError::InvalidHex(source.to_string()))?
        } else if lower.starts_with("rgb") || lower.starts_with("hsl") {
            parse_function(&lower).ok_or_else(|| ColorError::InvalidFunction(source.to_string()))?
        } else {
            named(&lower).ok_or_else(|| ColorError::UnknownName(source.to_string()))?
        };

        Ok(Self {
            source: source.to_string(),
            rgba,
        })
    }

    pub(crate) fn known(source: &str, rgba: Rgba) -> Self {
        Self {
            source: source.to_string(),
            rgba,
        }
    }

    /// The CSS text as the user wrote it
    #[must_use]
    pub fn as_css(&self) -> &str {
        &self.source
    }

    /// Parsed channel values
    #[must_use]
    pub fn rgba(&self) -> Rgba {
        self.rgba
    }
}

impl FromStr for CssColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba {
            r: nibble(0)?,
            g: nibble(1)?,
            b: nibble(2)?,
            a: nibble(3)?,
        }),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: byte(6)?,
        }),
        _ => None,
    }
}

fn parse_function(input: &str) -> Option<Rgba> {
    let (name, rest) = input.split_once('(')?;
    let body = rest.strip_suffix(')')?;
    let parts: Vec<&str> = body
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let (is_hsl, expects_alpha) = match name.trim() {
        "rgb" => (false, parts.len() == 4),
        "rgba" => (false, true),
        "hsl" => (true, parts.len() == 4),
        "hsla" => (true, true),
        _ => return None,
    };
    if parts.len() != if expects_alpha { 4 } else { 3 } {
        return None;
    }

    let a = if expects_alpha { alpha(parts[3])? } else { 255 };
    let (r, g, b) = if is_hsl {
        hsl_to_rgb(hue(parts[0])?, percentage(parts[1])?, percentage(parts[2])?)
    } else {
        (channel(parts[0])?, channel(parts[1])?, channel(parts[2])?)
    };
    Some(Rgba { r, g, b, a })
}

/// Hue in degrees, wrapped into `[0, 360)`
fn hue(part: &str) -> Option<f64> {
    let degrees = if let Some(turns) = part.strip_suffix("turn") {
        turns.parse::<f64>().ok()? * 360.0
    } else {
        part.strip_suffix("deg").unwrap_or(part).parse::<f64>().ok()?
    };
    degrees.is_finite().then_some(degrees.rem_euclid(360.0))
}

/// Saturation or lightness as a fraction in `[0, 1]`
fn percentage(part: &str) -> Option<f64> {
    let value = part.strip_suffix('%').unwrap_or(part).parse::<f64>().ok()?;
    value.is_finite().then_some((value / 100.0).clamp(0.0, 1.0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(part: &str) -> Option<u8> {
    let value = if let Some(pct) = part.strip_suffix('%') {
        pct.parse::<f64>().ok()? * 2.55
    } else {
        part.parse::<f64>().ok()?
    };
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, 255.0) as u8)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha(part: &str) -> Option<u8> {
    let value = if let Some(pct) = part.strip_suffix('%') {
        pct.parse::<f64>().ok()? / 100.0
    } else {
        part.parse::<f64>().ok()?
    };
    if !value.is_finite() {
        return None;
    }
    Some((value.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn named(name: &str) -> Option<Rgba> {
    if name == "transparent" {
        return Some(Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        });
    }
    NAMED_COLORS
        .binary_search_by(|(candidate, _)| (*candidate).cmp(name))
        .ok()
        .map(|i| NAMED_COLORS[i].1)
}

/// CSS Color 4 named colours, sorted by name
const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("aliceblue", Rgba::rgb(240, 248, 255)),
    ("antiquewhite", Rgba::rgb(250, 235, 215)),
    ("aqua", Rgba::rgb(0, 255, 255)),
    ("aquamarine", Rgba::rgb(127, 255, 212)),
    ("azure", Rgba::rgb(240, 255, 255)),
    ("beige", Rgba::rgb(245, 245, 220)),
    ("bisque", Rgba::rgb(255, 228, 196)),
    ("black", Rgba::rgb(0, 0, 0)),
    ("blanchedalmond", Rgba::rgb(255, 235, 205)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("blueviolet", Rgba::rgb(138, 43, 226)),
    ("brown", Rgba::rgb(165, 42, 42)),
    ("burlywood", Rgba::rgb(222, 184, 135)),
    ("cadetblue", Rgba::rgb(95, 158, 160)),
    ("chartreuse", Rgba::rgb(127, 255, 0)),
    ("chocolate", Rgba::rgb(210, 105, 30)),
    ("coral", Rgba::rgb(255, 127, 80)),
    ("cornflowerblue", Rgba::rgb(100, 149, 237)),
    ("cornsilk", Rgba::rgb(255, 248, 220)),
    ("crimson", Rgba::rgb(220, 20, 60)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("darkblue", Rgba::rgb(0, 0, 139)),
    ("darkcyan", Rgba::rgb(0, 139, 139)),
    ("darkgoldenrod", Rgba::rgb(184, 134, 11)),
    ("darkgray", Rgba::rgb(169, 169, 169)),
    ("darkgreen", Rgba::rgb(0, 100, 0)),
    ("darkgrey", Rgba::rgb(169, 169, 169)),
    ("darkkhaki", Rgba::rgb(189, 183, 107)),
    ("darkmagenta", Rgba::rgb(139, 0, 139)),
    ("darkolivegreen", Rgba::rgb(85, 107, 47)),
    ("darkorange", Rgba::rgb(255, 140, 0)),
    ("darkorchid", Rgba::rgb(153, 50, 204)),
    ("darkred", Rgba::rgb(139, 0, 0)),
    ("darksalmon", Rgba::rgb(233, 150, 122)),
    ("darkseagreen", Rgba::rgb(143, 188, 143)),
    ("darkslateblue", Rgba::rgb(72, 61, 139)),
    ("darkslategray", Rgba::rgb(47, 79, 79)),
    ("darkslategrey", Rgba::rgb(47, 79, 79)),
    ("darkturquoise", Rgba::rgb(0, 206, 209)),
    ("darkviolet", Rgba::rgb(148, 0, 211)),
    ("deeppink", Rgba::rgb(255, 20, 147)),
    ("deepskyblue", Rgba::rgb(0, 191, 255)),
    ("dimgray", Rgba::rgb(105, 105, 105)),
    ("dimgrey", Rgba::rgb(105, 105, 105)),
    ("dodgerblue", Rgba::rgb(30, 144, 255)),
    ("firebrick", Rgba::rgb(178, 34, 34)),
    ("floralwhite", Rgba::rgb(255, 250, 240)),
    ("forestgreen", Rgba::rgb(34, 139, 34)),
    ("fuchsia", Rgba::rgb(255, 0, 255)),
    ("gainsboro", Rgba::rgb(220, 220, 220)),
    ("ghostwhite", Rgba::rgb(248, 248, 255)),
    ("gold", Rgba::rgb(255, 215, 0)),
    ("goldenrod", Rgba::rgb(218, 165, 32)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("greenyellow", Rgba::rgb(173, 255, 47)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("honeydew", Rgba::rgb(240, 255, 240)),
    ("hotpink", Rgba::rgb(255, 105, 180)),
    ("indianred", Rgba::rgb(205, 92, 92)),
    ("indigo", Rgba::rgb(75, 0, 130)),
    ("ivory", Rgba::rgb(255, 255, 240)),
    ("khaki", Rgba::rgb(240, 230, 140)),
    ("lavender", Rgba::rgb(230, 230, 250)),
    ("lavenderblush", Rgba::rgb(255, 240, 245)),
    ("lawngreen", Rgba::rgb(124, 252, 0)),
    ("lemonchiffon", Rgba::rgb(255, 250, 205)),
    ("lightblue", Rgba::rgb(173, 216, 230)),
    ("lightcoral", Rgba::rgb(240, 128, 128)),
    ("lightcyan", Rgba::rgb(224, 255, 255)),
    ("lightgoldenrodyellow", Rgba::rgb(250, 250, 210)),
    ("lightgray", Rgba::rgb(211, 211, 211)),
    ("lightgreen", Rgba::rgb(144, 238, 144)),
    ("lightgrey", Rgba::rgb(211, 211, 211)),
    ("lightpink", Rgba::rgb(255, 182, 193)),
    ("lightsalmon", Rgba::rgb(255, 160, 122)),
    ("lightseagreen", Rgba::rgb(32, 178, 170)),
    ("lightskyblue", Rgba::rgb(135, 206, 250)),
    ("lightslategray", Rgba::rgb(119, 136, 153)),
    ("lightslategrey", Rgba::rgb(119, 136, 153)),
    ("lightsteelblue", Rgba::rgb(176, 196, 222)),
    ("lightyellow", Rgba::rgb(255, 255, 224)),
    ("lime", Rgba::rgb(0, 255, 0)),
    ("limegreen", Rgba::rgb(50, 205, 50)),
    ("linen", Rgba::rgb(250, 240, 230)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("maroon", Rgba::rgb(128, 0, 0)),
    ("mediumaquamarine", Rgba::rgb(102, 205, 170)),
    ("mediumblue", Rgba::rgb(0, 0, 205)),
    ("mediumorchid", Rgba::rgb(186, 85, 211)),
    ("mediumpurple", Rgba::rgb(147, 112, 219)),
    ("mediumseagreen", Rgba::rgb(60, 179, 113)),
    ("mediumslateblue", Rgba::rgb(123, 104, 238)),
    ("mediumspringgreen", Rgba::rgb(0, 250, 154)),
    ("mediumturquoise", Rgba::rgb(72, 209, 204)),
    ("mediumvioletred", Rgba::rgb(199, 21, 133)),
    ("midnightblue", Rgba::rgb(25, 25, 112)),
    ("mintcream", Rgba::rgb(245, 255, 250)),
    ("mistyrose", Rgba::rgb(255, 228, 225)),
    ("moccasin", Rgba::rgb(255, 228, 181)),
    ("navajowhite", Rgba::rgb(255, 222, 173)),
    ("navy", Rgba::rgb(0, 0, 128)),
    ("oldlace", Rgba::rgb(253, 245, 230)),
    ("olive", Rgba::rgb(128, 128, 0)),
    ("olivedrab", Rgba::rgb(107, 142, 35)),
    ("orange", Rgba::rgb(255, 165, 0)),
    ("orangered", Rgba::rgb(255, 69, 0)),
    ("orchid", Rgba::rgb(218, 112, 214)),
    ("palegoldenrod", Rgba::rgb(238, 232, 170)),
    ("palegreen", Rgba::rgb(152, 251, 152)),
    ("paleturquoise", Rgba::rgb(175, 238, 238)),
    ("palevioletred", Rgba::rgb(219, 112, 147)),
    ("papayawhip", Rgba::rgb(255, 239, 213)),
    ("peachpuff", Rgba::rgb(255, 218, 185)),
    ("peru", Rgba::rgb(205, 133, 63)),
    ("pink", Rgba::rgb(255, 192, 203)),
    ("plum", Rgba::rgb(221, 160, 221)),
    ("powderblue", Rgba::rgb(176, 224, 230)),
    ("purple", Rgba::rgb(128, 0, 128)),
    ("rebeccapurple", Rgba::rgb(102, 51, 153)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("rosybrown", Rgba::rgb(188, 143, 143)),
    ("royalblue", Rgba::rgb(65, 105, 225)),
    ("saddlebrown", Rgba::rgb(139, 69, 19)),
    ("salmon", Rgba::rgb(250, 128, 114)),
    ("sandybrown", Rgba::rgb(244, 164, 96)),
    ("seagreen", Rgba::rgb(46, 139, 87)),
    ("seashell", Rgba::rgb(255, 245, 238)),
    ("sienna", Rgba::rgb(160, 82, 45)),
    ("silver", Rgba::rgb(192, 192, 192)),
    ("skyblue", Rgba::rgb(135, 206, 235)),
    ("slateblue", Rgba::rgb(106, 90, 205)),
    ("slategray", Rgba::rgb(112, 128, 144)),
    ("slategrey", Rgba::rgb(112, 128, 144)),
    ("snow", Rgba::rgb(255, 250, 250)),
    ("springgreen", Rgba::rgb(0, 255, 127)),
    ("steelblue", Rgba::rgb(70, 130, 180)),
    ("tan", Rgba::rgb(210, 180, 140)),
    ("teal", Rgba::rgb(0, 128, 128)),
    ("thistle", Rgba::rgb(216, 191, 216)),
    ("tomato", Rgba::rgb(255, 99, 71)),
    ("turquoise", Rgba::rgb(64, 224, 208)),
    ("violet", Rgba::rgb(238, 130, 238)),
    ("wheat", Rgba::rgb(245, 222, 179)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("whitesmoke", Rgba::rgb(245, 245, 245)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("yellowgreen", Rgba::rgb(154, 205, 50)),
];
