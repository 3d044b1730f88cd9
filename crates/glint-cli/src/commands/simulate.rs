//! Simulate command: the particle field without a page around it

use super::{load_config, FRAME};
use anyhow::Result;
use glint_particles::{DrawList, FieldOptions, ParticleField, ParticleSystem};
use glint_runtime::{EffectSystem, Page, Stage, Viewport};
use std::path::PathBuf;

pub struct SimulateArgs {
    pub frames: usize,
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
    pub reduced_motion: bool,
    pub seed: u32,
    pub config: Option<PathBuf>,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let viewport = Viewport {
        width: args.width,
        height: args.height,
        dpr: args.dpr,
    };
    let mut stage = Stage::new(Page::new(viewport), config, args.reduced_motion, args.seed);
    let field = ParticleField::new(
        Some(stage.page.root()),
        stage.config.particles.clone(),
        FieldOptions::default(),
        &stage.motion,
        DrawList::new(),
    );
    let mut system = ParticleSystem::new(field);
    system.initialize(&mut stage)?;

    let mut escaped = 0usize;
    for _ in 0..args.frames {
        stage.now += FRAME;
        system.update(&mut stage, FRAME)?;
        let (w, h) = system.field().bounds();
        escaped += system
            .field()
            .particles()
            .iter()
            .filter(|p| {
                let at = p.position;
                at.x < 0.0 || at.x > w || at.y < 0.0 || at.y > h
            })
            .count();
    }

    let field = system.field();
    let (w, h) = field.bounds();
    let config = field.config();
    println!("Particles:    {}", field.len());
    println!("Bounds:       {:.0} x {:.0}", w, h);
    println!(
        "Settings:     size {:.1}-{:.1}, speed <= {:.2}, interactive {}",
        config.size_min, config.size_max, config.speed, config.interactive
    );
    if let Some(surface) = field.surface() {
        println!(
            "Surface:      {} x {} px (scale {})",
            surface.width_px, surface.height_px, surface.scale
        );
        println!("Frames drawn: {}", surface.frames);
        println!(
            "Last frame:   {} circles, {} bytes of instances",
            surface.circles.len(),
            surface.as_bytes().len()
        );
    }
    println!("Out of bounds samples: {}", escaped);

    system.shutdown(&mut stage)?;
    Ok(())
}
