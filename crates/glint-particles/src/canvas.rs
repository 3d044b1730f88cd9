//! Drawing surface abstraction and a recording implementation

use crate::particle::CircleInstance;
use glint_core::{Rgba, Vec2};

/// A 2D surface the particle field paints on.
///
/// Coordinates are CSS pixels; the surface maps them to device pixels
/// with the scale passed to `resize`.
pub trait Canvas {
    /// Set the backing size in device pixels and the CSS-to-device scale
    fn resize(&mut self, width_px: u32, height_px: u32, scale: f32);

    fn clear(&mut self);

    /// Filled circle with a glow of `blur` pixels in the same colour
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, blur: f32);
}

/// Records the most recent frame's circles
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    pub width_px: u32,
    pub height_px: u32,
    pub scale: f32,
    pub circles: Vec<CircleInstance>,
    /// Frames cleared so far
    pub frames: u64,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current frame as a packed instance buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.circles)
    }
}

impl Canvas for DrawList {
    fn resize(&mut self, width_px: u32, height_px: u32, scale: f32) {
        self.width_px = width_px;
        self.height_px = height_px;
        self.scale = scale;
        self.circles.clear();
    }

    fn clear(&mut self) {
        self.circles.clear();
        self.frames += 1;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, blur: f32) {
        self.circles
            .push(CircleInstance::new(center, radius, color, blur));
    }
}
