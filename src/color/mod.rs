//! Color primitives and the perceptual pipeline that turns album art into a scheme.
//!
//! Data flows one way: pixels go through the [`quantizer`] to a seed color, the seed is
//! expanded into [`tonal`] palettes, and [`scheme`] maps those palettes onto named roles.

pub mod hct;
pub mod quantizer;
pub mod scheme;
pub mod tonal;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Seed used when an image yields no vibrant swatch and no fallback was configured.
pub const DEFAULT_FALLBACK_SEED: Argb = Argb(0xFF62_00EE);

/// Packed `0xAARRGGBB` color as produced and consumed at the RGB boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Argb(pub u32);

impl Argb {
    /// Build a fully opaque color from its channels.
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(0xFF00_0000 | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Alpha channel.
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel.
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Whether the alpha channel is saturated.
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// `#RRGGBB`, dropping alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red(), self.green(), self.blue())
    }

    /// Comma separated `r,g,b` triplet, suitable for `rgba(var(--x), a)` style consumers.
    pub fn to_rgb_triplet(self) -> String {
        format!("{},{},{}", self.red(), self.green(), self.blue())
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            f.write_str(&self.to_hex())
        } else {
            write!(f, "#{:08X}", self.0)
        }
    }
}

/// Error returned when a hex color literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color literal `{0}` (expected #RRGGBB or #AARRGGBB)")]
pub struct ParseColorError(pub String);

impl FromStr for Argb {
    type Err = ParseColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(value.to_string()));
        }

        let parsed =
            u32::from_str_radix(digits, 16).map_err(|_| ParseColorError(value.to_string()))?;
        match digits.len() {
            6 => Ok(Self(0xFF00_0000 | parsed)),
            8 => Ok(Self(parsed)),
            _ => Err(ParseColorError(value.to_string())),
        }
    }
}

impl Serialize for Argb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Argb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!("#6200EE".parse::<Argb>().unwrap(), Argb(0xFF62_00EE));
        assert_eq!("6200ee".parse::<Argb>().unwrap(), Argb(0xFF62_00EE));
        assert_eq!("#806200EE".parse::<Argb>().unwrap(), Argb(0x8062_00EE));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("#62EE".parse::<Argb>().is_err());
        assert!("#6200EG".parse::<Argb>().is_err());
        assert!("#+62000E".parse::<Argb>().is_err());
        assert!("".parse::<Argb>().is_err());
    }

    #[test]
    fn channels_and_formatting() {
        let color = Argb::from_rgb(98, 0, 238);
        assert_eq!(color, DEFAULT_FALLBACK_SEED);
        assert_eq!((color.red(), color.green(), color.blue()), (98, 0, 238));
        assert_eq!(color.to_hex(), "#6200EE");
        assert_eq!(color.to_rgb_triplet(), "98,0,238");
        assert_eq!(Argb(0x8062_00EE).to_string(), "#806200EE");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&DEFAULT_FALLBACK_SEED).unwrap();
        assert_eq!(json, "\"#6200EE\"");
        let back: Argb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DEFAULT_FALLBACK_SEED);
    }
}
