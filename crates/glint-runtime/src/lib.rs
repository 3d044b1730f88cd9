//! Glint Runtime - Frame loop infrastructure
//!
//! Provides the building blocks every effect runs on:
//! - `Page`: the in-memory document that effects read and animate
//! - `FrameClock`: frame timing with clamped deltas
//! - `PageEvent` / `EventBus`: viewport and input signals queued per frame
//! - `Deadline`: one-shot timers measured on the frame clock
//! - `Stage`: the shared context (page, timelines, rng, config, motion)
//! - `EffectSystem`: trait for systems driven by the director

mod clock;
mod deadline;
mod event;
mod event_bus;
mod page;
mod stage;
mod system;

pub use clock::FrameClock;
pub use deadline::{Deadline, Interval};
pub use event::PageEvent;
pub use event_bus::EventBus;
pub use page::{Element, LayoutBox, Page, Viewport};
pub use stage::Stage;
pub use system::EffectSystem;
