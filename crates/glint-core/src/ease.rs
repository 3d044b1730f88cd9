//! Easing curves, addressed by their conventional string names
//!
//! Names follow the usual web animation vocabulary: `"none"`, `"power2.out"`,
//! `"sine.inOut"`, `"back.out(1.7)"`, `"elastic.out(1.2, 0.5)"`, `"steps(1)"`.
//! Every curve maps 0 to 0 and 1 to 1; overshooting curves may leave `[0, 1]`
//! in between.

use crate::error::{GlintError, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// Which end of the curve is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

impl EaseDirection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "inOut" => Some(Self::InOut),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inOut",
        }
    }
}

/// An easing curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    Linear,
    /// `powerN`: polynomial of degree N+1
    Power { power: u8, direction: EaseDirection },
    Sine(EaseDirection),
    Expo(EaseDirection),
    Back {
        direction: EaseDirection,
        overshoot: f32,
    },
    ElasticOut { amplitude: f32, period: f32 },
    Steps(u32),
}

impl Default for Ease {
    fn default() -> Self {
        Ease::Power {
            power: 1,
            direction: EaseDirection::Out,
        }
    }
}

impl Ease {
    pub const fn power_out(power: u8) -> Self {
        Ease::Power {
            power,
            direction: EaseDirection::Out,
        }
    }

    pub const fn power_in_out(power: u8) -> Self {
        Ease::Power {
            power,
            direction: EaseDirection::InOut,
        }
    }

    /// Parse a curve from its conventional name
    pub fn parse(name: &str) -> Result<Self> {
        let err = || GlintError::EaseParseError(name.to_string());
        let name = name.trim();

        if name == "none" || name == "linear" {
            return Ok(Ease::Linear);
        }

        // Split "family.direction(args)"
        let (head, args) = match name.find('(') {
            Some(open) => {
                let close = name.rfind(')').ok_or_else(err)?;
                (&name[..open], Some(&name[open + 1..close]))
            }
            None => (name, None),
        };
        let args: Vec<f32> = match args {
            Some(a) if !a.trim().is_empty() => a
                .split(',')
                .map(|v| v.trim().parse::<f32>().map_err(|_| err()))
                .collect::<Result<_>>()?,
            _ => Vec::new(),
        };

        let (family, direction) = match head.split_once('.') {
            Some((f, d)) => (f, EaseDirection::parse(d).ok_or_else(err)?),
            None => (head, EaseDirection::Out),
        };

        match family {
            "steps" => {
                let n = args.first().copied().unwrap_or(1.0).max(1.0) as u32;
                Ok(Ease::Steps(n))
            }
            "sine" => Ok(Ease::Sine(direction)),
            "expo" => Ok(Ease::Expo(direction)),
            "back" => Ok(Ease::Back {
                direction,
                overshoot: args.first().copied().unwrap_or(1.70158),
            }),
            "elastic" if direction == EaseDirection::Out => Ok(Ease::ElasticOut {
                amplitude: args.first().copied().unwrap_or(1.0),
                period: args.get(1).copied().unwrap_or(0.3),
            }),
            f if f.starts_with("power") => {
                let power: u8 = f["power".len()..].parse().map_err(|_| err())?;
                if !(1..=4).contains(&power) {
                    return Err(err());
                }
                Ok(Ease::Power { power, direction })
            }
            _ => Err(err()),
        }
    }

    /// Evaluate the curve at progress `t` (clamped to `[0, 1]`)
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Ease::Linear => t,
            Ease::Power { power, direction } => {
                let exp = power as i32 + 1;
                shaped(direction, t, |p| p.powi(exp))
            }
            Ease::Sine(direction) => shaped(direction, t, |p| 1.0 - (p * PI / 2.0).cos()),
            Ease::Expo(direction) => shaped(direction, t, |p| {
                if p <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (p - 1.0))
                }
            }),
            Ease::Back {
                direction,
                overshoot,
            } => shaped(direction, t, |p| p * p * ((overshoot + 1.0) * p - overshoot)),
            Ease::ElasticOut { amplitude, period } => {
                let p1 = amplitude.max(1.0);
                let period = period / amplitude.min(1.0).max(f32::EPSILON);
                let p3 = period / (2.0 * PI) * (1.0 / p1).asin();
                let p2 = 2.0 * PI / period;
                p1 * 2f32.powf(-10.0 * t) * ((t - p3) * p2).sin() + 1.0
            }
            Ease::Steps(n) => {
                let n = n.max(1) as f32;
                (t * n).floor() / n
            }
        }
    }
}

/// Derive out / inOut variants from an ease-in function
fn shaped(direction: EaseDirection, t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    match direction {
        EaseDirection::In => ease_in(t),
        EaseDirection::Out => 1.0 - ease_in(1.0 - t),
        EaseDirection::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0) / 2.0
            } else {
                1.0 - ease_in((1.0 - t) * 2.0) / 2.0
            }
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::Linear => write!(f, "none"),
            Ease::Power { power, direction } => write!(f, "power{}.{}", power, direction.as_str()),
            Ease::Sine(d) => write!(f, "sine.{}", d.as_str()),
            Ease::Expo(d) => write!(f, "expo.{}", d.as_str()),
            Ease::Back {
                direction,
                overshoot,
            } => write!(f, "back.{}({})", direction.as_str(), overshoot),
            Ease::ElasticOut { amplitude, period } => {
                write!(f, "elastic.out({}, {})", amplitude, period)
            }
            Ease::Steps(n) => write!(f, "steps({})", n),
        }
    }
}

impl TryFrom<String> for Ease {
    type Error = GlintError;

    fn try_from(value: String) -> Result<Self> {
        Ease::parse(&value)
    }
}

impl From<Ease> for String {
    fn from(ease: Ease) -> Self {
        ease.to_string()
    }
}
