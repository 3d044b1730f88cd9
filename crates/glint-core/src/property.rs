//! Animatable visual properties of a page element

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric visual property that tweens can drive.
///
/// Lengths are CSS pixels, angles are degrees, `Brightness` is a filter
/// multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    Scale,
    X,
    Y,
    SkewX,
    SkewY,
    Rotation,
    RotationX,
    Width,
    Height,
    LetterSpacing,
    Brightness,
}

impl Property {
    pub const ALL: [Property; 12] = [
        Property::Opacity,
        Property::Scale,
        Property::X,
        Property::Y,
        Property::SkewX,
        Property::SkewY,
        Property::Rotation,
        Property::RotationX,
        Property::Width,
        Property::Height,
        Property::LetterSpacing,
        Property::Brightness,
    ];

    /// Value an element has before anything animates it
    pub fn rest_value(&self) -> f32 {
        match self {
            Property::Opacity | Property::Scale | Property::Brightness => 1.0,
            _ => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Property::Opacity => "opacity",
            Property::Scale => "scale",
            Property::X => "x",
            Property::Y => "y",
            Property::SkewX => "skew_x",
            Property::SkewY => "skew_y",
            Property::Rotation => "rotation",
            Property::RotationX => "rotation_x",
            Property::Width => "width",
            Property::Height => "height",
            Property::LetterSpacing => "letter_spacing",
            Property::Brightness => "brightness",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
