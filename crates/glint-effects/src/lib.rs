//! Glint Effects - The page effects and the director that runs them
//!
//! Each effect is an `EffectSystem` constructed from explicit element
//! handles; a missing handle disables that part of the effect:
//! - `SplashScreen`: load-gated intro/outro with a safety timeout
//! - `ScrollEffects`: progress bar, one-shot reveals, parallax scrub and
//!   rate-limited scroll glitches
//! - `CursorTrail`: smoothed trail and jittery glitch markers
//! - `TextEffects`: headline intro, hover glitches, footer scramble, data streams
//! - `AmbientGlitch`: idle title/logo glitch loops
//! - `EasterEgg`: the hidden logo-click sequence
//!
//! `Director` owns the stage and drives all of them frame by frame.

pub mod ambient;
pub mod console;
pub mod cursor;
pub mod demo;
pub mod director;
pub mod easter_egg;
pub mod scroll;
pub mod splash;
pub mod text;

pub use ambient::{AmbientGlitch, AmbientTargets};
pub use console::glitch_helper;
pub use cursor::{CursorTargets, CursorTrail};
pub use demo::{demo, DemoPage};
pub use director::Director;
pub use easter_egg::{EasterEgg, EggTargets};
pub use scroll::{ScrollEffects, ScrollTargets};
pub use splash::{SplashPhase, SplashScreen};
pub use text::{TextEffects, TextTargets};
