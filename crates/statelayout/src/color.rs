#![forbid(unsafe_code)]

//! RGB colors for overlay theming.
//!
//! Colors are written in configuration files as `#RRGGBB` (or the short
//! `#RGB` form) or as one of a handful of named colors:
//!
//! ```toml
//! [loading]
//! text_color = "white"
//! indicator_color = "#FF5722"
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const GRAY: Self = Self::new(136, 136, 136);

    /// Default window background behind every overlay.
    pub const BACKGROUND: Self = Self::new(0xFA, 0xFA, 0xFA);
    /// Accent used for interactive text.
    pub const PRIMARY: Self = Self::new(0x3F, 0x51, 0xB5);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `#RGB` or a named color.
    pub fn parse(s: &str) -> Result<Self, ParseColorError> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return Self::from_hex(hex).ok_or_else(|| ParseColorError(trimmed.to_owned()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "black" => Ok(Self::BLACK),
            "white" => Ok(Self::WHITE),
            "red" => Ok(Self::RED),
            "green" => Ok(Self::GREEN),
            "blue" => Ok(Self::BLUE),
            "gray" | "grey" => Ok(Self::GRAY),
            "background" => Ok(Self::BACKGROUND),
            "primary" => Ok(Self::PRIMARY),
            _ => Err(ParseColorError(trimmed.to_owned())),
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                // #abc expands to #aabbcc
                let expand = |s: &str| channel(s).map(|v| v * 17);
                Some(Self::new(
                    expand(&hex[0..1])?,
                    expand(&hex[1..2])?,
                    expand(&hex[2..3])?,
                ))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A color string that is neither hex nor a known name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized color: {0:?}")]
pub struct ParseColorError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_hex() {
        assert_eq!(Rgb::parse("#FF5722"), Ok(Rgb::new(0xFF, 0x57, 0x22)));
        assert_eq!(Rgb::parse("#ff5722"), Ok(Rgb::new(0xFF, 0x57, 0x22)));
    }

    #[test]
    fn parses_short_hex() {
        assert_eq!(Rgb::parse("#fff"), Ok(Rgb::WHITE));
        assert_eq!(Rgb::parse("#f00"), Ok(Rgb::RED));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(Rgb::parse("Black"), Ok(Rgb::BLACK));
        assert_eq!(Rgb::parse(" grey "), Ok(Rgb::GRAY));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("#gggggg").is_err());
        assert!(Rgb::parse("#ééé").is_err());
        assert!(Rgb::parse("#+F+F+F").is_err());
        assert!(Rgb::parse("#+ff").is_err());
        assert!(Rgb::parse("chartreuse").is_err());
    }

    #[test]
    fn display_is_upper_hex() {
        assert_eq!(Rgb::new(1, 171, 255).to_string(), "#01ABFF");
    }

    #[test]
    fn serde_uses_strings() {
        let json = serde_json::to_string(&Rgb::RED).unwrap();
        assert_eq!(json, "\"#FF0000\"");
        let back: Rgb = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(back, Rgb::BLUE);
    }
}
