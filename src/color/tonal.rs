//! Tonal palettes derived from a single seed color.

use std::fmt;

use crate::color::{
    Argb,
    hct::{Hct, solve_to_argb},
};

/// Primary chroma never drops below this, so dull artwork still yields a colorful theme.
pub const PRIMARY_MIN_CHROMA: f64 = 48.0;
/// Chroma of the secondary palette (seed hue).
pub const SECONDARY_CHROMA: f64 = 16.0;
/// Hue rotation applied to the tertiary palette.
pub const TERTIARY_HUE_OFFSET: f64 = 60.0;
/// Chroma of the tertiary palette.
pub const TERTIARY_CHROMA: f64 = 24.0;
/// Chroma of the neutral palette.
pub const NEUTRAL_CHROMA: f64 = 4.0;
/// Chroma of the neutral-variant palette.
pub const NEUTRAL_VARIANT_CHROMA: f64 = 8.0;
/// Fixed hue of the error palette.
pub const ERROR_HUE: f64 = 25.0;
/// Fixed chroma of the error palette.
pub const ERROR_CHROMA: f64 = 84.0;

/// Fixed hue and chroma; tone varies from 0 (black) to 100 (white).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonalPalette {
    hue: f64,
    chroma: f64,
}

impl TonalPalette {
    /// Palette with the given hue (any angle, normalised) and chroma (negative clamps to 0).
    pub fn from_hue_and_chroma(hue: f64, chroma: f64) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
            chroma: chroma.max(0.0),
        }
    }

    /// Hue in degrees.
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Requested chroma; the color at a given tone may carry less when out of gamut.
    pub fn chroma(&self) -> f64 {
        self.chroma
    }

    /// Color at `tone`; values above 100 are treated as 100.
    pub fn tone(&self, tone: u8) -> Argb {
        solve_to_argb(self.hue, self.chroma, f64::from(tone.min(100)))
    }
}

/// Name of one of the six palettes every scheme draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteName {
    /// Seed hue at high chroma.
    Primary,
    /// Seed hue at low chroma.
    Secondary,
    /// Rotated seed hue.
    Tertiary,
    /// Fixed red.
    Error,
    /// Near-gray with the seed hue, for surfaces and backgrounds.
    Neutral,
    /// Slightly more colorful neutral, for outlines and variants.
    NeutralVariant,
}

impl PaletteName {
    /// Stable lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            PaletteName::Primary => "primary",
            PaletteName::Secondary => "secondary",
            PaletteName::Tertiary => "tertiary",
            PaletteName::Error => "error",
            PaletteName::Neutral => "neutral",
            PaletteName::NeutralVariant => "neutral-variant",
        }
    }
}

impl fmt::Display for PaletteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six palettes derived from one seed. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TonalPaletteSet {
    seed: Argb,
    primary: TonalPalette,
    secondary: TonalPalette,
    tertiary: TonalPalette,
    error: TonalPalette,
    neutral: TonalPalette,
    neutral_variant: TonalPalette,
}

impl TonalPaletteSet {
    /// Seed the palettes were derived from.
    pub fn seed(&self) -> Argb {
        self.seed
    }

    /// Look a palette up by name.
    pub fn get(&self, name: PaletteName) -> &TonalPalette {
        match name {
            PaletteName::Primary => &self.primary,
            PaletteName::Secondary => &self.secondary,
            PaletteName::Tertiary => &self.tertiary,
            PaletteName::Error => &self.error,
            PaletteName::Neutral => &self.neutral,
            PaletteName::NeutralVariant => &self.neutral_variant,
        }
    }
}

/// Derive every palette from `seed`. Never fails.
pub fn build_palettes(seed: Argb) -> TonalPaletteSet {
    let hct = Hct::from_argb(seed);
    let hue = hct.hue();
    let chroma = hct.chroma();

    TonalPaletteSet {
        seed,
        primary: TonalPalette::from_hue_and_chroma(hue, chroma.max(PRIMARY_MIN_CHROMA)),
        secondary: TonalPalette::from_hue_and_chroma(hue, SECONDARY_CHROMA),
        tertiary: TonalPalette::from_hue_and_chroma(hue + TERTIARY_HUE_OFFSET, TERTIARY_CHROMA),
        error: TonalPalette::from_hue_and_chroma(ERROR_HUE, ERROR_CHROMA),
        neutral: TonalPalette::from_hue_and_chroma(hue, NEUTRAL_CHROMA),
        neutral_variant: TonalPalette::from_hue_and_chroma(hue, NEUTRAL_VARIANT_CHROMA),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hct::lstar_from_argb;

    const SEED: Argb = Argb(0xFF62_00EE);

    #[test]
    fn primary_tones_for_the_default_seed() {
        let palettes = build_palettes(SEED);
        let primary = palettes.get(PaletteName::Primary);
        assert_eq!(primary.tone(0), Argb(0xFF00_0000));
        assert_eq!(primary.tone(40), Argb(0xFF6D_23F8));
        assert_eq!(primary.tone(80), Argb(0xFFD0_BCFF));
        assert_eq!(primary.tone(90), Argb(0xFFEA_DDFF));
        assert_eq!(primary.tone(100), Argb(0xFFFF_FFFF));
    }

    #[test]
    fn palette_hues_and_chromas() {
        let palettes = build_palettes(SEED);
        let seed_hue = palettes.get(PaletteName::Primary).hue();

        assert!(palettes.get(PaletteName::Primary).chroma() >= PRIMARY_MIN_CHROMA);
        assert_eq!(palettes.get(PaletteName::Secondary).hue(), seed_hue);
        assert_eq!(palettes.get(PaletteName::Secondary).chroma(), SECONDARY_CHROMA);
        assert!(
            (palettes.get(PaletteName::Tertiary).hue() - (seed_hue + 60.0).rem_euclid(360.0))
                .abs()
                < 1e-9
        );
        assert_eq!(palettes.get(PaletteName::Error).hue(), ERROR_HUE);
        assert_eq!(palettes.get(PaletteName::Neutral).chroma(), NEUTRAL_CHROMA);
        assert_eq!(
            palettes.get(PaletteName::NeutralVariant).chroma(),
            NEUTRAL_VARIANT_CHROMA
        );
    }

    #[test]
    fn gray_seed_still_gets_a_colorful_primary() {
        let palettes = build_palettes(Argb(0xFF80_8080));
        assert_eq!(
            palettes.get(PaletteName::Primary).chroma(),
            PRIMARY_MIN_CHROMA
        );
    }

    #[test]
    fn tone_ten_is_darker_than_tone_ninety() {
        for seed in [SEED, Argb(0xFFFF_0000), Argb(0xFF00_FF00), Argb(0xFF80_8080)] {
            let palettes = build_palettes(seed);
            for name in [
                PaletteName::Primary,
                PaletteName::Secondary,
                PaletteName::Tertiary,
                PaletteName::Error,
                PaletteName::Neutral,
                PaletteName::NeutralVariant,
            ] {
                let palette = palettes.get(name);
                assert!(
                    lstar_from_argb(palette.tone(10)) < lstar_from_argb(palette.tone(90)),
                    "{name} palette of {seed} is not monotonic"
                );
            }
        }
    }

    #[test]
    fn tones_above_one_hundred_clamp() {
        let palette = TonalPalette::from_hue_and_chroma(-60.0, -5.0);
        assert_eq!(palette.hue(), 300.0);
        assert_eq!(palette.chroma(), 0.0);
        assert_eq!(palette.tone(250), Argb(0xFFFF_FFFF));
    }
}
