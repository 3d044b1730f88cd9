//! Splash screen shown while the page loads
//!
//! `Created -> AnimatingIn -> Waiting -> AnimatingOut -> Removed`. The exit
//! is scheduled by the first of the load event or the fallback timeout and
//! never starts before `min_display` has passed. A separate safety timeout
//! removes the splash no matter what the animations are doing.

use glint_animation::{
    AnimationTarget, Position, Repeat, Timeline, TimelineGroup, TimelineId, TimelineSignal,
    TimelineSlot, Tween,
};
use glint_core::{Ease, EaseDirection, ElementId, OwnerToken, Property, Result};
use glint_runtime::{Deadline, EffectSystem, Page, PageEvent, Stage};

const FLASH_PEAK: &str = "splash:flash-peak";

/// Where the splash controller is in its one-shot life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashPhase {
    Created,
    AnimatingIn,
    Waiting,
    AnimatingOut,
    Removed,
}

#[derive(Debug, Clone, Copy)]
struct Scaffold {
    container: ElementId,
    particles: ElementId,
    logo: ElementId,
    primary: ElementId,
    secondary: ElementId,
}

/// The splash screen controller
pub struct SplashScreen {
    host: Option<ElementId>,
    scaffold: Option<Scaffold>,
    phase: SplashPhase,
    owner: OwnerToken,
    started_at: f64,
    fallback: Deadline,
    exit: Deadline,
    safety: Deadline,
    exit_scheduled: bool,
    intro: TimelineSlot,
    outro: TimelineSlot,
    decor: Vec<TimelineId>,
    /// Timelines whose completion removes an element
    removals: Vec<(TimelineId, ElementId)>,
    transitions: Vec<(f64, SplashPhase)>,
}

impl SplashScreen {
    /// A splash attached to `host`. `None` builds a disabled controller.
    pub fn new(host: Option<ElementId>) -> Self {
        Self {
            host,
            scaffold: None,
            phase: SplashPhase::Created,
            owner: OwnerToken::new(),
            started_at: 0.0,
            fallback: Deadline::new(),
            exit: Deadline::new(),
            safety: Deadline::new(),
            exit_scheduled: false,
            intro: TimelineSlot::new(),
            outro: TimelineSlot::new(),
            decor: Vec::new(),
            removals: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn phase(&self) -> SplashPhase {
        self.phase
    }

    /// Every phase change with the page time it happened at
    pub fn transitions(&self) -> &[(f64, SplashPhase)] {
        &self.transitions
    }

    pub fn container(&self) -> Option<ElementId> {
        self.scaffold.map(|s| s.container)
    }

    pub fn particle_layer(&self) -> Option<ElementId> {
        self.scaffold.map(|s| s.particles)
    }

    /// When the out-animation is due, once an exit has been scheduled
    pub fn exit_due_at(&self) -> Option<f64> {
        self.exit.due_at()
    }

    fn set_phase(&mut self, now: f64, phase: SplashPhase) {
        if self.phase == phase {
            return;
        }
        tracing::debug!(from = ?self.phase, to = ?phase, at = now, "splash phase");
        self.phase = phase;
        self.transitions.push((now, phase));
    }

    fn build_scaffold(page: &mut Page, host: ElementId) -> Scaffold {
        let container = page.create_in(host, "div");
        page.add_class(container, "splash-screen");
        page.set_attribute(container, "role", "progressbar");
        page.set_attribute(container, "aria-label", "Loading");
        page.set_attribute(container, "aria-busy", "true");

        let particles = page.create_in(container, "div");
        page.add_class(particles, "splash-particles");

        let logo_box = page.create_in(container, "div");
        page.add_class(logo_box, "splash-logo-container");
        let logo = page.create_in(logo_box, "img");
        page.add_class(logo, "splash-logo");
        let text = page.create_in(logo_box, "div");
        page.add_class(text, "logo-text");
        let primary = page.create_in(text, "span");
        page.add_class(primary, "logo-text-primary");
        let secondary = page.create_in(text, "span");
        page.add_class(secondary, "logo-text-secondary");

        Scaffold {
            container,
            particles,
            logo,
            primary,
            secondary,
        }
    }

    fn create_flash(page: &mut Page, container: ElementId) -> ElementId {
        let flash = page.create_in(container, "div");
        page.add_class(flash, "splash-flash");
        page.set_property(flash, Property::Opacity, 0.0);
        flash
    }

    fn animate_in(&mut self, stage: &mut Stage, s: Scaffold) {
        let d = stage.motion.durations(&stage.config.durations);
        let e = stage.config.eases.clone();
        let sine = Ease::Sine(EaseDirection::InOut);

        let timeline = if stage.reduced_motion() {
            for id in [s.logo, s.primary, s.secondary] {
                stage.page.set_property(id, Property::Opacity, 0.0);
            }
            Timeline::new()
                .then(Tween::new(s.container, d.slow).from_to(Property::Opacity, 0.0, 1.0))
                .add(
                    Tween::new(s.logo, d.slow).to(Property::Opacity, 1.0),
                    Position::WithPrevious,
                )
                .then(
                    Tween::many(vec![s.primary, s.secondary], d.slow)
                        .to(Property::Opacity, 1.0)
                        .stagger(stage.config.stagger.medium),
                )
        } else {
            let page = &mut stage.page;
            page.set_property(s.logo, Property::Scale, 0.0);
            page.set_property(s.logo, Property::Opacity, 0.0);
            page.set_property(s.primary, Property::Opacity, 0.0);
            page.set_property(s.secondary, Property::Y, stage.motion.distance(30.0));
            page.set_property(s.secondary, Property::Opacity, 0.0);
            let flash = Self::create_flash(page, s.container);

            Timeline::new()
                .then(
                    Tween::new(s.container, d.slow)
                        .from_to(Property::Opacity, 0.0, 1.0)
                        .from_to(Property::Scale, 1.05, 1.0)
                        .ease(e.smooth_in_out),
                )
                .add(
                    Tween::new(flash, d.ultra_fast)
                        .to(Property::Opacity, stage.config.splash.flash_opacity)
                        .ease(e.smooth)
                        .on_complete(FLASH_PEAK),
                    Position::Overlap(0.1),
                )
                .add(
                    Tween::new(s.logo, d.slow)
                        .to(Property::Scale, 1.0)
                        .to(Property::Opacity, 1.0)
                        .ease(e.elastic),
                    Position::Overlap(0.4),
                )
                .add(
                    Tween::new(s.primary, d.slow)
                        .to(Property::Opacity, 1.0)
                        .ease(e.smooth),
                    Position::Overlap(0.2),
                )
                .add(
                    Tween::new(s.secondary, d.medium)
                        .to(Property::Y, 0.0)
                        .to(Property::Opacity, 1.0)
                        .ease(e.bounce),
                    Position::Overlap(0.5),
                )
                // One breath of the logo: out and back
                .add(
                    Tween::new(s.logo, d.extra_slow)
                        .to(Property::Scale, 1.08)
                        .ease(sine),
                    Position::Overlap(0.3),
                )
                .then(Tween::new(s.logo, d.extra_slow).to(Property::Scale, 1.0).ease(sine))
        };

        stage.replace(&mut self.intro, timeline, TimelineGroup::Sequence, self.owner);
        self.set_phase(stage.now, SplashPhase::AnimatingIn);
    }

    fn spawn_particles(&mut self, stage: &mut Stage, layer: ElementId) {
        let sine = Ease::Sine(EaseDirection::InOut);
        let settings = stage.config.splash.clone();
        let mobile = stage.motion.is_mobile();

        if stage.reduced_motion() {
            let count = if mobile {
                settings.mobile_minimal_particles
            } else {
                settings.desktop_minimal_particles
            };
            for _ in 0..count {
                let size = stage.rng.range(1.0, 3.0);
                let dot = Self::decor_element(stage, layer, "splash-particle", size, &settings.palette);
                let pulse = Timeline::new()
                    .then(
                        Tween::new(dot, stage.rng.range(2.0, 5.0) as f64)
                            .random(Property::Opacity, 0.2, 0.7)
                            .ease(sine),
                    )
                    .repeat(Repeat::Infinite)
                    .yoyo(true);
                self.decor.push(stage.play(pulse, TimelineGroup::Ambient, self.owner));
            }
            return;
        }

        for _ in 0..stage.motion.particle_count() {
            let size = stage.rng.range(1.0, 5.0);
            let dot = Self::decor_element(stage, layer, "splash-particle", size, &settings.palette);
            let drift = Timeline::new()
                .then(
                    Tween::new(dot, stage.rng.range(3.0, 7.0) as f64)
                        .jitter(Property::X, -15.0, 15.0)
                        .jitter(Property::Y, -15.0, 15.0)
                        .random(Property::Opacity, 0.3, 1.0)
                        .delay(stage.rng.range(0.0, 2.0) as f64)
                        .ease(sine),
                )
                .repeat(Repeat::Infinite)
                .yoyo(true);
            let pulse = Timeline::new()
                .then(
                    Tween::new(dot, stage.rng.range(1.0, 3.0) as f64)
                        .random(Property::Scale, 0.5, 2.0)
                        .ease(sine),
                )
                .repeat(Repeat::Infinite)
                .yoyo(true);
            self.decor.push(stage.play(drift, TimelineGroup::Ambient, self.owner));
            self.decor.push(stage.play(pulse, TimelineGroup::Ambient, self.owner));
        }

        let orbs = if mobile {
            settings.mobile_orbs
        } else {
            settings.desktop_orbs
        };
        for _ in 0..orbs {
            let size = stage.rng.range(10.0, 25.0);
            let orb = Self::decor_element(stage, layer, "splash-orb", size, &settings.palette);
            let float = Timeline::new()
                .then(
                    Tween::new(orb, stage.rng.range(7.0, 15.0) as f64)
                        .jitter(Property::X, -25.0, 25.0)
                        .jitter(Property::Y, -25.0, 25.0)
                        .random(Property::Scale, 0.5, 2.0)
                        .random(Property::Opacity, 0.1, 0.4)
                        .ease(sine),
                )
                .repeat(Repeat::Infinite)
                .yoyo(true);
            self.decor.push(stage.play(float, TimelineGroup::Ambient, self.owner));
        }
    }

    fn decor_element(
        stage: &mut Stage,
        layer: ElementId,
        class: &str,
        size: f32,
        palette: &[String],
    ) -> ElementId {
        let left = stage.rng.range(0.0, 100.0);
        let top = stage.rng.range(0.0, 100.0);
        let colour = stage.rng.pick(palette).cloned().unwrap_or_default();
        let page = &mut stage.page;
        let id = page.create_in(layer, "div");
        page.add_class(id, class);
        page.set_data(id, "left", format!("{left:.2}%"));
        page.set_data(id, "top", format!("{top:.2}%"));
        page.set_data(id, "color", colour);
        page.set_property(id, Property::Width, size);
        page.set_property(id, Property::Height, size);
        id
    }

    /// First of load or fallback: schedule the exit so the splash stays up
    /// for at least `min_display` seconds
    fn schedule_exit(&mut self, stage: &Stage) {
        if self.exit_scheduled || self.scaffold.is_none() {
            return;
        }
        self.fallback.cancel();
        let elapsed = stage.now - self.started_at;
        let remaining = (stage.config.splash.min_display - elapsed).max(0.0);
        self.exit.arm(stage.now, remaining);
        self.exit_scheduled = true;
        tracing::debug!(elapsed, remaining, "splash exit scheduled");
    }

    fn animate_out(&mut self, stage: &mut Stage) {
        if matches!(self.phase, SplashPhase::AnimatingOut | SplashPhase::Removed) {
            return;
        }
        let Some(s) = self.scaffold else {
            return;
        };
        stage.stop(&mut self.intro);

        let d = stage.motion.durations(&stage.config.durations);
        let timeline = if stage.reduced_motion() {
            Timeline::new()
                .then(Tween::many(vec![s.logo, s.primary, s.secondary], d.slow).to(Property::Opacity, 0.0))
                .then(Tween::new(s.container, d.slow).to(Property::Opacity, 0.0))
        } else {
            let e = stage.config.eases.clone();
            let flash = Self::create_flash(&mut stage.page, s.container);
            Timeline::new()
                .then(Tween::new(s.logo, d.fast).to(Property::Scale, 1.1).ease(e.smooth))
                .add(
                    Tween::new(s.logo, d.medium)
                        .to(Property::Scale, 1.5)
                        .to(Property::Opacity, 0.0)
                        .ease(e.strong),
                    Position::Overlap(0.2),
                )
                .add(
                    Tween::many(vec![s.primary, s.secondary], d.medium)
                        .to(Property::Opacity, 0.0)
                        .stagger(stage.motion.device_stagger(stage.config.stagger.fast))
                        .ease(e.strong),
                    Position::Overlap(0.3),
                )
                .add(
                    Tween::new(flash, d.fast)
                        .to(Property::Opacity, stage.config.splash.flash_opacity)
                        .ease(e.smooth),
                    Position::Overlap(0.1),
                )
                .add(
                    Tween::new(s.container, d.medium)
                        .to(Property::Scale, 1.05)
                        .ease(e.strong),
                    Position::Overlap(0.2),
                )
                .add(
                    Tween::new(s.container, d.slow)
                        .to(Property::Opacity, 0.0)
                        .ease(e.strong_in_out),
                    Position::Overlap(0.2),
                )
                .add(
                    Tween::new(flash, d.fast).to(Property::Opacity, 0.0).ease(e.smooth),
                    Position::WithPrevious,
                )
        };

        stage.replace(&mut self.outro, timeline, TimelineGroup::Sequence, self.owner);
        self.set_phase(stage.now, SplashPhase::AnimatingOut);
    }

    /// Tear down the scaffold and clear the loading flag
    fn remove(&mut self, stage: &mut Stage) {
        stage.stop(&mut self.intro);
        stage.stop(&mut self.outro);
        for id in self.decor.drain(..) {
            stage.kill(id);
        }
        for (id, _) in self.removals.drain(..) {
            stage.kill(id);
        }
        if let Some(s) = self.scaffold.take() {
            stage.page.remove(s.container);
        }
        stage.page.set_loading(false);
        self.fallback.cancel();
        self.exit.cancel();
        self.safety.cancel();
        self.set_phase(stage.now, SplashPhase::Removed);
        tracing::info!(at = stage.now, "splash screen removed");
    }
}

impl EffectSystem for SplashScreen {
    fn initialize(&mut self, stage: &mut Stage) -> Result<()> {
        let Some(host) = self.host.filter(|h| stage.page.contains(*h)) else {
            tracing::debug!("no splash host, splash screen disabled");
            self.phase = SplashPhase::Removed;
            return Ok(());
        };

        self.started_at = stage.now;
        self.transitions.push((stage.now, SplashPhase::Created));
        let scaffold = Self::build_scaffold(&mut stage.page, host);
        self.scaffold = Some(scaffold);
        stage.page.set_loading(true);

        self.spawn_particles(stage, scaffold.particles);
        self.animate_in(stage, scaffold);

        if let Some(timeout) = stage.config.splash.fallback_timeout {
            self.fallback.arm(stage.now, timeout);
        }
        self.safety.arm(stage.now, stage.config.splash.safety_timeout);
        Ok(())
    }

    fn handle_event(&mut self, stage: &mut Stage, event: &PageEvent) -> Result<()> {
        if let PageEvent::Load = event {
            self.schedule_exit(stage);
        }
        Ok(())
    }

    fn update(&mut self, stage: &mut Stage, _dt: f64) -> Result<()> {
        if self.fallback.fire_if_due(stage.now) {
            tracing::debug!("splash fallback timeout reached");
            self.schedule_exit(stage);
        }
        if self.exit.fire_if_due(stage.now) {
            self.animate_out(stage);
        }
        if self.safety.fire_if_due(stage.now) {
            if self.scaffold.is_some() {
                tracing::warn!(
                    phase = ?self.phase,
                    "splash screen still present at safety timeout, forcing removal"
                );
            }
            self.remove(stage);
        }
        Ok(())
    }

    fn handle_signal(&mut self, stage: &mut Stage, signal: &TimelineSignal) -> Result<()> {
        match signal {
            TimelineSignal::Cue { id, name } if self.intro.holds(*id) && name == FLASH_PEAK => {
                let Some(s) = self.scaffold else {
                    return Ok(());
                };
                let Some(flash) = stage
                    .page
                    .children(s.container)
                    .iter()
                    .copied()
                    .find(|c| stage.page.has_class(*c, "splash-flash"))
                else {
                    return Ok(());
                };
                let fade = Timeline::new().then(
                    Tween::new(flash, stage.motion.durations(&stage.config.durations).medium)
                        .to(Property::Opacity, 0.0),
                );
                let tl = stage.play(fade, TimelineGroup::Sequence, self.owner);
                self.removals.push((tl, flash));
            }
            TimelineSignal::Finished { id } if self.intro.holds(*id) => {
                self.intro.clear();
                if self.phase == SplashPhase::AnimatingIn {
                    self.set_phase(stage.now, SplashPhase::Waiting);
                }
            }
            TimelineSignal::Finished { id } if self.outro.holds(*id) => {
                self.outro.clear();
                self.remove(stage);
            }
            TimelineSignal::Finished { id } => {
                if let Some(index) = self.removals.iter().position(|(tl, _)| tl == id) {
                    let (_, element) = self.removals.remove(index);
                    stage.page.remove(element);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn shutdown(&mut self, stage: &mut Stage) -> Result<()> {
        if self.scaffold.is_some() {
            self.remove(stage);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "splash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::EffectConfig;
    use glint_runtime::Viewport;

    const FRAME: f64 = 1.0 / 60.0;

    fn stage_with(config: EffectConfig, reduced: bool) -> Stage {
        Stage::new(Page::new(Viewport::default()), config, reduced, 11)
    }

    fn start(stage: &mut Stage) -> SplashScreen {
        let mut splash = SplashScreen::new(Some(stage.page.root()));
        splash.initialize(stage).unwrap();
        splash
    }

    fn step(splash: &mut SplashScreen, stage: &mut Stage) {
        stage.now += FRAME;
        splash.update(stage, FRAME).unwrap();
        let signals = stage.timelines.advance(FRAME, &mut stage.page, &mut stage.rng);
        for signal in &signals {
            splash.handle_signal(stage, signal).unwrap();
        }
    }

    fn run_until(splash: &mut SplashScreen, stage: &mut Stage, until: f64) {
        while stage.now < until {
            step(splash, stage);
        }
    }

    fn first(splash: &SplashScreen, phase: SplashPhase) -> Option<f64> {
        splash
            .transitions()
            .iter()
            .find(|(_, p)| *p == phase)
            .map(|(t, _)| *t)
    }

    #[test]
    fn exit_waits_for_min_display() {
        let mut stage = stage_with(EffectConfig::default(), false);
        let mut splash = start(&mut stage);
        assert!(stage.page.is_loading());

        splash.handle_event(&mut stage, &PageEvent::Load).unwrap();
        assert_eq!(splash.exit_due_at(), Some(2.0));

        run_until(&mut splash, &mut stage, 1.99);
        assert_ne!(splash.phase(), SplashPhase::AnimatingOut);
        assert!(first(&splash, SplashPhase::AnimatingOut).is_none());

        run_until(&mut splash, &mut stage, 2.05);
        let out = first(&splash, SplashPhase::AnimatingOut).unwrap();
        assert!(out >= 2.0, "exit began at {out}");
    }

    #[test]
    fn late_load_exits_immediately() {
        let mut config = EffectConfig::default();
        config.splash.fallback_timeout = None;
        let mut stage = stage_with(config, false);
        let mut splash = start(&mut stage);

        run_until(&mut splash, &mut stage, 2.5);
        splash.handle_event(&mut stage, &PageEvent::Load).unwrap();
        step(&mut splash, &mut stage);
        assert_eq!(splash.phase(), SplashPhase::AnimatingOut);
    }

    #[test]
    fn stalled_load_is_removed_by_safety_timeout() {
        let mut config = EffectConfig::default();
        config.splash.fallback_timeout = None;
        let mut stage = stage_with(config, false);
        let mut splash = start(&mut stage);
        let container = splash.container().unwrap();

        run_until(&mut splash, &mut stage, 4.9);
        assert!(stage.page.contains(container));
        assert!(stage.page.is_loading());

        run_until(&mut splash, &mut stage, 5.0 + FRAME);
        assert!(!stage.page.contains(container));
        assert!(!stage.page.is_loading());
        assert_eq!(splash.phase(), SplashPhase::Removed);
        assert!(stage.timelines.is_empty());
    }

    #[test]
    fn fallback_triggers_exit_without_load() {
        let mut stage = stage_with(EffectConfig::default(), false);
        let mut splash = start(&mut stage);

        run_until(&mut splash, &mut stage, 5.0);
        let out = first(&splash, SplashPhase::AnimatingOut).unwrap();
        assert!((3.0..3.1).contains(&out));
        let removed = first(&splash, SplashPhase::Removed).unwrap();
        assert!(removed < 5.0, "removed by the out-animation, not the safety net");
        assert!(!stage.page.is_loading());
    }

    #[test]
    fn exit_runs_once_when_both_triggers_fire() {
        let mut stage = stage_with(EffectConfig::default(), false);
        let mut splash = start(&mut stage);
        run_until(&mut splash, &mut stage, 0.5);
        splash.handle_event(&mut stage, &PageEvent::Load).unwrap();
        splash.handle_event(&mut stage, &PageEvent::Load).unwrap();
        run_until(&mut splash, &mut stage, 6.0);

        let outs = splash
            .transitions()
            .iter()
            .filter(|(_, p)| *p == SplashPhase::AnimatingOut)
            .count();
        assert_eq!(outs, 1);
        assert_eq!(splash.phase(), SplashPhase::Removed);
    }

    #[test]
    fn reduced_motion_uses_minimal_sequence() {
        let mut stage = stage_with(EffectConfig::default(), true);
        let mut splash = start(&mut stage);
        let layer = splash.particle_layer().unwrap();
        assert_eq!(
            stage.page.children(layer).len(),
            stage.config.splash.desktop_minimal_particles
        );

        splash.handle_event(&mut stage, &PageEvent::Load).unwrap();
        run_until(&mut splash, &mut stage, 3.0);
        let out = first(&splash, SplashPhase::AnimatingOut).unwrap();
        let removed = first(&splash, SplashPhase::Removed).unwrap();
        assert!(removed - out <= 0.6 + 2.0 * FRAME);
    }

    /// Seconds from the start of the exit to removal
    fn outro_span(width: f32, reduced: bool) -> f64 {
        let viewport = Viewport {
            width,
            ..Viewport::default()
        };
        let mut stage = Stage::new(Page::new(viewport), EffectConfig::default(), reduced, 11);
        let mut splash = start(&mut stage);
        splash.handle_event(&mut stage, &PageEvent::Load).unwrap();
        run_until(&mut splash, &mut stage, 5.0);
        let out = first(&splash, SplashPhase::AnimatingOut).unwrap();
        first(&splash, SplashPhase::Removed).unwrap() - out
    }

    #[test]
    fn outro_span_follows_device_and_preference() {
        let desktop = outro_span(1280.0, false);
        let mobile = outro_span(400.0, false);
        let reduced = outro_span(1280.0, true);
        assert!(desktop > 1.4 - 2.0 * FRAME, "desktop outro took {}", desktop);
        assert!(mobile < desktop - 0.3, "mobile {} vs desktop {}", mobile, desktop);
        assert!(reduced < mobile);
        assert!(reduced <= 0.6 + 2.0 * FRAME);
    }

    #[test]
    fn full_motion_spawns_particles_and_orbs() {
        let mut stage = stage_with(EffectConfig::default(), false);
        let splash = start(&mut stage);
        let layer = splash.particle_layer().unwrap();
        let children = stage.page.children(layer);
        let orbs = children
            .iter()
            .filter(|c| stage.page.has_class(**c, "splash-orb"))
            .count();
        assert_eq!(orbs, 8);
        assert_eq!(children.len(), 108);
    }

    #[test]
    fn missing_host_is_a_no_op() {
        let mut stage = stage_with(EffectConfig::default(), false);
        let mut splash = SplashScreen::new(None);
        splash.initialize(&mut stage).unwrap();
        assert_eq!(splash.phase(), SplashPhase::Removed);
        assert!(!stage.page.is_loading());
        splash.handle_event(&mut stage, &PageEvent::Load).unwrap();
        step(&mut splash, &mut stage);
        assert!(splash.transitions().is_empty());
        assert_eq!(stage.page.element_count(), 1);
    }
}
