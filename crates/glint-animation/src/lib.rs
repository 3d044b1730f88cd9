//! Animation engine for glint
//!
//! Property tweens over page elements, composed into timelines:
//! - `Tween`: drives one or more properties of one or more elements from
//!   their current value to a target over a duration with an easing curve
//! - `Timeline`: ordered tweens with overlap offsets, instant cues,
//!   repeat / repeat delay / yoyo
//! - `TimelineSet`: every running timeline, tagged with a group so whole
//!   categories (ambient loops) can be paused and resumed together
//! - `TimelineSlot`: an owned "current timeline" handle with
//!   stop-if-running-then-start semantics
//!
//! Timelines never touch the page directly; they read and write through
//! the `AnimationTarget` trait, which also enforces per-element ownership.

pub mod set;
pub mod slot;
pub mod target;
pub mod timeline;
pub mod tween;

pub use set::{TimelineGroup, TimelineId, TimelineSet, TimelineSignal};
pub use slot::TimelineSlot;
pub use target::AnimationTarget;
pub use timeline::{Position, Repeat, Timeline};
pub use tween::{Tween, TweenValue};
