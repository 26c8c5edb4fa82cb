//! Tracing parameters and their domains.
//!
//! [`VectorizeSettings`] is a plain value object. Construction never
//! validates; callers run [`VectorizeSettings::validate`] at the edit
//! boundary so an out-of-domain value is rejected before any trace is
//! attempted.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An opaque sRGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// `#000000`.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// `#ffffff`.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a string is not a `#rgb` or `#rrggbb` color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #rgb or #rrggbb")]
pub struct ColorParseError(String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            3 => {
                // #abc is shorthand for #aabbcc.
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Names a numeric settings field, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    /// [`VectorizeSettings::turd_size`].
    TurdSize,
    /// [`VectorizeSettings::alpha_max`].
    AlphaMax,
    /// [`VectorizeSettings::threshold`].
    Threshold,
    /// [`VectorizeSettings::opt_tolerance`].
    OptTolerance,
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TurdSize => "turd_size",
            Self::AlphaMax => "alpha_max",
            Self::Threshold => "threshold",
            Self::OptTolerance => "opt_tolerance",
        })
    }
}

/// A settings field lies outside its declared domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The value is finite but outside the allowed range.
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        /// Offending field.
        field: SettingField,
        /// Rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },

    /// The value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite {
        /// Offending field.
        field: SettingField,
    },
}

/// Parameters controlling one trace invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizeSettings {
    /// Regions whose pixel area does not exceed this value are suppressed
    /// as noise.
    pub turd_size: f64,

    /// Corner threshold. Vertices turning more sharply than this are kept
    /// as corners; gentler vertices are smoothed into curves. `0.0` yields
    /// a pure polygon, values above `4/3` smooth every vertex.
    pub alpha_max: f64,

    /// Binarization cut point. Pixels with luminance below this value are
    /// foreground.
    pub threshold: u32,

    /// Enable curve optimization.
    pub opt_curve: bool,

    /// Curve optimization tolerance in pixels. Only used when
    /// `opt_curve` is `true`.
    pub opt_tolerance: f64,

    /// Foreground fill color.
    pub color: Color,

    /// Background fill color.
    pub background: Color,
}

impl VectorizeSettings {
    /// Default noise suppression area.
    pub const DEFAULT_TURD_SIZE: f64 = 2.0;
    /// Default corner threshold.
    pub const DEFAULT_ALPHA_MAX: f64 = 1.0;
    /// Default binarization cut point.
    pub const DEFAULT_THRESHOLD: u32 = 128;
    /// Default curve optimization switch.
    pub const DEFAULT_OPT_CURVE: bool = true;
    /// Default curve optimization tolerance.
    pub const DEFAULT_OPT_TOLERANCE: f64 = 0.2;

    /// Domain of [`turd_size`](Self::turd_size).
    pub const TURD_SIZE_RANGE: RangeInclusive<f64> = 0.0..=10.0;
    /// Domain of [`alpha_max`](Self::alpha_max).
    pub const ALPHA_MAX_RANGE: RangeInclusive<f64> = 0.0..=1.5;
    /// Domain of [`threshold`](Self::threshold).
    pub const THRESHOLD_RANGE: RangeInclusive<u32> = 1..=255;
    /// Domain of [`opt_tolerance`](Self::opt_tolerance).
    pub const OPT_TOLERANCE_RANGE: RangeInclusive<f64> = 0.0..=1.0;

    /// Check every numeric field against its domain.
    ///
    /// Fields are checked in declaration order and the first violation
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFinite`] for NaN or infinite floats
    /// and [`ValidationError::OutOfRange`] for values outside the domain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_float(SettingField::TurdSize, self.turd_size, &Self::TURD_SIZE_RANGE)?;
        check_float(SettingField::AlphaMax, self.alpha_max, &Self::ALPHA_MAX_RANGE)?;
        if !Self::THRESHOLD_RANGE.contains(&self.threshold) {
            return Err(ValidationError::OutOfRange {
                field: SettingField::Threshold,
                value: f64::from(self.threshold),
                min: f64::from(*Self::THRESHOLD_RANGE.start()),
                max: f64::from(*Self::THRESHOLD_RANGE.end()),
            });
        }
        check_float(
            SettingField::OptTolerance,
            self.opt_tolerance,
            &Self::OPT_TOLERANCE_RANGE,
        )
    }

    /// Copy of these settings with only the two sweep parameters replaced.
    #[must_use]
    pub fn with_sweep_axes(&self, threshold: u32, turd_size: f64) -> Self {
        Self {
            threshold,
            turd_size,
            ..self.clone()
        }
    }
}

impl Default for VectorizeSettings {
    fn default() -> Self {
        Self {
            turd_size: Self::DEFAULT_TURD_SIZE,
            alpha_max: Self::DEFAULT_ALPHA_MAX,
            threshold: Self::DEFAULT_THRESHOLD,
            opt_curve: Self::DEFAULT_OPT_CURVE,
            opt_tolerance: Self::DEFAULT_OPT_TOLERANCE,
            color: Color::BLACK,
            background: Color::WHITE,
        }
    }
}

fn check_float(
    field: SettingField,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
