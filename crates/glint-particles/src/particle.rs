//! Particle types: simulation state and packed draw instances

use bytemuck::{Pod, Zeroable};
use glint_core::{Rgba, Vec2};

/// One point particle of the field
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Unit-ish heading; each component in `[-1, 1]`
    pub direction: Vec2,
    /// Pixels per frame along `direction`
    pub speed: f32,
    /// Rendered radius, boosted near the pointer
    pub size: f32,
    pub rest_size: f32,
    pub color: Rgba,
    pub opacity: f32,
}

impl Particle {
    /// Colour actually painted: palette colour at the particle's opacity
    pub fn fill(&self) -> Rgba {
        self.color.with_alpha(self.opacity)
    }
}

/// Packed circle for GPU or canvas hosts.
/// 32 bytes, two rows of vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    /// xy = centre, z = radius, w = glow blur
    pub center_radius_blur: [f32; 4],
    /// rgba
    pub color: [f32; 4],
}

impl CircleInstance {
    pub fn new(center: Vec2, radius: f32, color: Rgba, blur: f32) -> Self {
        Self {
            center_radius_blur: [center.x, center.y, radius, blur],
            color: color.to_array(),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_radius_blur[0], self.center_radius_blur[1])
    }

    pub fn radius(&self) -> f32 {
        self.center_radius_blur[2]
    }

    pub fn blur(&self) -> f32 {
        self.center_radius_blur[3]
    }
}
