//! Glint Core - Foundational types for the glint effects engine
//!
//! This crate provides the types that all other glint crates depend on:
//! - `ElementId` - Stable page element identifiers
//! - `Vec2`, `Rgba` - Spatial and colour types
//! - `EffectRng` - Seedable PRNG for every randomized effect
//! - `Ease` - Easing curves addressed by their conventional names
//! - `EffectConfig` - The static configuration table (durations, eases, presets, tuning)
//! - `Property` - The animatable visual properties of an element
//! - `MotionPreference` - Reduced-motion and device-class scaling
//! - Error types and Result alias

pub mod config;
mod ease;
mod error;
mod id;
mod motion;
mod property;
pub mod rand;
mod types;

pub use config::EffectConfig;
pub use ease::{Ease, EaseDirection};
pub use error::{GlintError, Result};
pub use id::{ElementId, OwnerToken};
pub use motion::MotionPreference;
pub use property::Property;
pub use rand::EffectRng;
pub use types::{Rgba, Vec2};
