//! Semantic color roles and the tone table that maps palettes onto them.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::color::{
    Argb,
    tonal::{PaletteName, TonalPaletteSet},
};

/// Named semantic color consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Role {
    Primary,
    OnPrimary,
    PrimaryContainer,
    OnPrimaryContainer,
    Secondary,
    OnSecondary,
    SecondaryContainer,
    OnSecondaryContainer,
    Tertiary,
    OnTertiary,
    TertiaryContainer,
    OnTertiaryContainer,
    Error,
    OnError,
    ErrorContainer,
    OnErrorContainer,
    Background,
    OnBackground,
    Surface,
    OnSurface,
    SurfaceVariant,
    OnSurfaceVariant,
    Outline,
    InverseOnSurface,
    InverseSurface,
    InversePrimary,
}

impl Role {
    /// camelCase variable name used by the presentation layer.
    pub fn name(self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::OnPrimary => "onPrimary",
            Role::PrimaryContainer => "primaryContainer",
            Role::OnPrimaryContainer => "onPrimaryContainer",
            Role::Secondary => "secondary",
            Role::OnSecondary => "onSecondary",
            Role::SecondaryContainer => "secondaryContainer",
            Role::OnSecondaryContainer => "onSecondaryContainer",
            Role::Tertiary => "tertiary",
            Role::OnTertiary => "onTertiary",
            Role::TertiaryContainer => "tertiaryContainer",
            Role::OnTertiaryContainer => "onTertiaryContainer",
            Role::Error => "error",
            Role::OnError => "onError",
            Role::ErrorContainer => "errorContainer",
            Role::OnErrorContainer => "onErrorContainer",
            Role::Background => "background",
            Role::OnBackground => "onBackground",
            Role::Surface => "surface",
            Role::OnSurface => "onSurface",
            Role::SurfaceVariant => "surfaceVariant",
            Role::OnSurfaceVariant => "onSurfaceVariant",
            Role::Outline => "outline",
            Role::InverseOnSurface => "inverseOnSurface",
            Role::InverseSurface => "inverseSurface",
            Role::InversePrimary => "inversePrimary",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the tone table: which palette feeds a role, at which tone per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneSpec {
    /// Role being defined.
    pub role: Role,
    /// Palette the color is taken from.
    pub palette: PaletteName,
    /// Tone used in light mode.
    pub light: u8,
    /// Tone used in dark mode.
    pub dark: u8,
}

impl ToneSpec {
    /// Tone for the requested mode.
    pub fn tone(&self, is_dark: bool) -> u8 {
        if is_dark { self.dark } else { self.light }
    }
}

const fn row(role: Role, palette: PaletteName, light: u8, dark: u8) -> ToneSpec {
    ToneSpec {
        role,
        palette,
        light,
        dark,
    }
}

/// Every role of a scheme, in presentation order. The only definition of the role set.
pub static TONE_SPEC: [ToneSpec; 26] = {
    use PaletteName::*;
    [
        row(Role::Primary, Primary, 40, 80),
        row(Role::OnPrimary, Primary, 100, 20),
        row(Role::PrimaryContainer, Primary, 90, 30),
        row(Role::OnPrimaryContainer, Primary, 10, 90),
        row(Role::Secondary, Secondary, 40, 80),
        row(Role::OnSecondary, Secondary, 100, 20),
        row(Role::SecondaryContainer, Secondary, 90, 30),
        row(Role::OnSecondaryContainer, Secondary, 10, 90),
        row(Role::Tertiary, Tertiary, 40, 80),
        row(Role::OnTertiary, Tertiary, 100, 20),
        row(Role::TertiaryContainer, Tertiary, 90, 30),
        row(Role::OnTertiaryContainer, Tertiary, 10, 90),
        row(Role::Error, Error, 40, 80),
        row(Role::OnError, Error, 100, 20),
        row(Role::ErrorContainer, Error, 90, 30),
        row(Role::OnErrorContainer, Error, 10, 90),
        row(Role::Background, Neutral, 99, 10),
        row(Role::OnBackground, Neutral, 10, 90),
        row(Role::Surface, Neutral, 99, 10),
        row(Role::OnSurface, Neutral, 10, 90),
        row(Role::SurfaceVariant, NeutralVariant, 90, 30),
        row(Role::OnSurfaceVariant, NeutralVariant, 30, 80),
        row(Role::Outline, NeutralVariant, 50, 60),
        row(Role::InverseOnSurface, Neutral, 95, 10),
        row(Role::InverseSurface, Neutral, 20, 90),
        row(Role::InversePrimary, Primary, 80, 40),
    ]
};

/// Role → color mapping. Either holds every role of [`TONE_SPEC`] or none (reset).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorScheme {
    colors: IndexMap<Role, Argb>,
}

impl ColorScheme {
    /// The reset scheme.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the reset scheme.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of roles present.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Color of `role`, absent only for the reset scheme.
    pub fn get(&self, role: Role) -> Option<Argb> {
        self.colors.get(&role).copied()
    }

    /// Roles and colors in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, Argb)> + '_ {
        self.colors.iter().map(|(role, color)| (*role, *color))
    }
}

impl Serialize for ColorScheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.colors.len()))?;
        for (role, color) in &self.colors {
            map.serialize_entry(role.name(), color)?;
        }
        map.end()
    }
}

/// Resolve every [`TONE_SPEC`] row against `palettes` for the given mode.
pub fn derive_scheme(palettes: &TonalPaletteSet, is_dark: bool) -> ColorScheme {
    let colors = TONE_SPEC
        .iter()
        .map(|spec| {
            let color = palettes.get(spec.palette).tone(spec.tone(is_dark));
            (spec.role, color)
        })
        .collect();
    ColorScheme { colors }
}
