//! Splash command: one splash screen lifecycle, printed phase by phase

use super::{load_config, FRAME};
use anyhow::Result;
use glint_effects::{SplashPhase, SplashScreen};
use glint_runtime::{EffectSystem, Page, PageEvent, Stage, Viewport};
use std::path::PathBuf;

/// Seconds past the safety timeout before giving up on the splash
const GRACE: f64 = 2.0;

pub struct SplashArgs {
    pub load_at: Option<f64>,
    pub stall: bool,
    pub reduced_motion: bool,
    pub config: Option<PathBuf>,
}

pub fn run(args: SplashArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.stall {
        config.splash.fallback_timeout = None;
    }
    let cap = config.splash.safety_timeout + GRACE;

    let mut stage = Stage::new(
        Page::new(Viewport::default()),
        config,
        args.reduced_motion,
        1,
    );
    let mut splash = SplashScreen::new(Some(stage.page.root()));
    splash.initialize(&mut stage)?;

    let mut load_at = if args.stall { None } else { args.load_at };
    let mut loaded = None;
    while splash.phase() != SplashPhase::Removed && stage.now < cap {
        stage.now += FRAME;
        if load_at.is_some_and(|at| stage.now >= at) {
            load_at = None;
            loaded = Some(stage.now);
            splash.handle_event(&mut stage, &PageEvent::Load)?;
        }
        splash.update(&mut stage, FRAME)?;
        let signals = stage
            .timelines
            .advance(FRAME, &mut stage.page, &mut stage.rng);
        for signal in &signals {
            splash.handle_signal(&mut stage, signal)?;
        }
    }

    let mut lines: Vec<(f64, String)> = splash
        .transitions()
        .iter()
        .map(|(at, phase)| (*at, format!("{:?}", phase)))
        .collect();
    if let Some(at) = loaded {
        lines.push((at, "load event".to_string()));
    }
    lines.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (at, line) in &lines {
        println!("{:>7.3}s  {}", at, line);
    }
    println!(
        "Loading flag: {}   elements left: {}",
        stage.page.is_loading(),
        stage.page.element_count()
    );
    if splash.phase() != SplashPhase::Removed {
        anyhow::bail!("splash still present after {:.1}s", cap);
    }
    Ok(())
}
