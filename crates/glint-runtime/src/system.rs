//! Effect system trait

use crate::event::PageEvent;
use crate::stage::Stage;
use glint_animation::TimelineSignal;
use glint_core::Result;

/// A system driven by the director
///
/// Systems are updated in registration order. Events are delivered before
/// `update` within a frame; timeline signals after timelines advance.
pub trait EffectSystem {
    /// Called once when the system is first registered
    fn initialize(&mut self, stage: &mut Stage) -> Result<()>;

    /// Called for every page event, in arrival order
    fn handle_event(&mut self, stage: &mut Stage, event: &PageEvent) -> Result<()>;

    /// Called once per frame
    fn update(&mut self, stage: &mut Stage, dt: f64) -> Result<()>;

    /// Called for every cue or completion raised by a running timeline.
    /// Systems ignore signals for timelines they did not start.
    fn handle_signal(&mut self, _stage: &mut Stage, _signal: &TimelineSignal) -> Result<()> {
        Ok(())
    }

    /// Called when the system is being shut down
    fn shutdown(&mut self, stage: &mut Stage) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
