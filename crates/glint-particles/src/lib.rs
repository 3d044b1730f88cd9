//! Glint Particles - Canvas particle field
//!
//! Provides the ambient particle background:
//! - Per-frame drift with edge reflection
//! - Pointer-proximity push and size boost
//! - Device-pixel-ratio aware canvas sizing with full regeneration on resize
//! - Packed circle instances for GPU hosts

pub mod canvas;
pub mod field;
pub mod particle;

use glint_core::{Result, Vec2};
use glint_runtime::{Deadline, EffectSystem, PageEvent, Stage};

pub use canvas::{Canvas, DrawList};
pub use field::{FieldConfig, FieldOptions, ParticleField};
pub use particle::{CircleInstance, Particle};

/// The particle system: implements EffectSystem for integration with the director.
pub struct ParticleSystem<C: Canvas = DrawList> {
    field: ParticleField<C>,
    resize_debounce: Deadline,
}

impl<C: Canvas> ParticleSystem<C> {
    pub fn new(field: ParticleField<C>) -> Self {
        Self {
            field,
            resize_debounce: Deadline::new(),
        }
    }

    pub fn field(&self) -> &ParticleField<C> {
        &self.field
    }
}

impl<C: Canvas> EffectSystem for ParticleSystem<C> {
    fn initialize(&mut self, stage: &mut Stage) -> Result<()> {
        self.field.init(&mut stage.page, &stage.motion, &mut stage.rng);
        Ok(())
    }

    fn handle_event(&mut self, stage: &mut Stage, event: &PageEvent) -> Result<()> {
        match *event {
            PageEvent::PointerMove { x, y } | PageEvent::TouchMove { x, y } => {
                if self.field.config().interactive {
                    self.field.set_pointer(Vec2::new(x, y));
                }
            }
            PageEvent::Resize { .. } => {
                let wait = stage.config.particles.resize_debounce;
                self.resize_debounce.arm(stage.now, wait);
            }
            PageEvent::ReducedMotionChanged { .. } => {
                self.field.update_settings(&stage.motion, &mut stage.rng);
            }
            _ => {}
        }
        Ok(())
    }

    fn update(&mut self, stage: &mut Stage, _dt: f64) -> Result<()> {
        if self.resize_debounce.fire_if_due(stage.now) {
            let viewport = stage.page.viewport();
            self.field.resize(viewport, &stage.motion, &mut stage.rng);
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                count = self.field.len(),
                "particle field resized"
            );
        }
        self.field.frame();
        Ok(())
    }

    fn shutdown(&mut self, stage: &mut Stage) -> Result<()> {
        self.field.destroy(&mut stage.page);
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}
