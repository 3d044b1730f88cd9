//! Idle glitch loops: the title glitch, the hero logo flicker, the header
//! logo jitter, the gradient breathing, the CRT flicker with its screen
//! tears, the `.glitch-element` blips and, once the page is haunted, the
//! subtitle glitch with its bursts
//!
//! Everything here plays in the `Ambient` group so the easter egg can hold
//! it while it runs. Interval-driven effects check the group before firing.

use crate::easter_egg::TRIGGERED_CLASS;
use glint_animation::{
    AnimationTarget, Position, Repeat, Timeline, TimelineGroup, TimelineId, TimelineSignal,
    TimelineSlot, Tween,
};
use glint_core::config::GlitchTuning;
use glint_core::{Ease, EaseDirection, EffectRng, ElementId, OwnerToken, Property, Result};
use glint_runtime::{EffectSystem, Interval, PageEvent, Stage};

const HERO_REPEAT_DELAY: f64 = 5.0;
pub const SCREEN_TEAR_CLASS: &str = "screen-tear";

/// Elements the ambient loops animate
#[derive(Debug, Clone, Default)]
pub struct AmbientTargets {
    pub title: Option<ElementId>,
    pub hero_logo: Option<ElementId>,
    pub header_logo: Option<ElementId>,
    pub company_name: Option<ElementId>,
    pub subtitle: Option<ElementId>,
    /// Bottom gradient that breathes
    pub gradient: Option<ElementId>,
    /// Full-screen overlay for the CRT flicker; screen tears go under the page root
    pub crt: Option<ElementId>,
    pub glitch_elements: Vec<ElementId>,
}

fn step(target: ElementId, duration: f64, values: &[(Property, f32)]) -> Tween {
    values
        .iter()
        .fold(Tween::new(target, duration), |t, (p, v)| t.to(*p, *v))
        .ease(Ease::Steps(1))
}

/// The title glitch: eight hard cuts, then a long pause
fn title_glitch(title: ElementId, repeat_delay: f64) -> Timeline {
    use Property::*;
    Timeline::new()
        .then(step(title, 0.08, &[(SkewX, 20.0), (Scale, 1.02)]))
        .then(step(title, 0.08, &[(SkewX, 0.0), (Scale, 1.0)]))
        .then(step(title, 0.06, &[(Opacity, 0.7), (LetterSpacing, 3.0)]))
        .then(step(title, 0.06, &[(Opacity, 1.0), (LetterSpacing, 2.0)]))
        .then(step(title, 0.08, &[(X, -10.0), (Y, 2.0), (SkewY, 2.0)]))
        .then(step(title, 0.08, &[(X, 0.0), (Y, 0.0), (SkewY, 0.0)]))
        .then(step(title, 0.07, &[(X, 10.0), (SkewX, -15.0), (Scale, 0.98)]))
        .then(step(title, 0.07, &[(X, 0.0), (SkewX, 0.0), (Scale, 1.0)]))
        .repeat(Repeat::Infinite)
        .repeat_delay(repeat_delay)
}

fn logo_flicker(logo: ElementId, repeat_delay: f64) -> Timeline {
    let mut timeline = Timeline::new();
    for opacity in [0.7, 1.0, 0.5, 0.0, 1.0] {
        timeline = timeline.then(step(logo, 0.05, &[(Property::Opacity, opacity)]));
    }
    timeline
        .add(step(logo, 0.05, &[(Property::Opacity, 0.6)]), Position::Gap(0.2))
        .then(step(logo, 0.05, &[(Property::Opacity, 1.0)]))
        .repeat(Repeat::Infinite)
        .repeat_delay(repeat_delay)
}

fn gradient_breath(gradient: ElementId, tuning: &GlitchTuning) -> Timeline {
    Timeline::new()
        .then(
            Tween::new(gradient, tuning.gradient_breath_duration)
                .to(Property::Opacity, tuning.gradient_breath_opacity)
                .ease(Ease::Sine(EaseDirection::InOut)),
        )
        .repeat(Repeat::Infinite)
        .yoyo(true)
}

/// Four quick cuts with offsets redrawn every pass
fn subtitle_glitch(subtitle: ElementId, repeat_delay: f64) -> Timeline {
    use Property::*;
    let rest = LetterSpacing.rest_value();
    Timeline::new()
        .then(
            Tween::new(subtitle, 0.06)
                .random(X, -3.0, 3.0)
                .to(Opacity, 0.85)
                .to(LetterSpacing, 1.2)
                .ease(Ease::Steps(1)),
        )
        .then(
            Tween::new(subtitle, 0.06)
                .random(Y, -2.0, 2.0)
                .to(LetterSpacing, rest)
                .ease(Ease::Steps(1)),
        )
        .then(Tween::new(subtitle, 0.06).random(SkewX, -3.0, 3.0).ease(Ease::Steps(1)))
        .then(step(subtitle, 0.08, &[(X, 0.0), (Y, 0.0), (SkewX, 0.0), (Opacity, 1.0)]))
        .repeat(Repeat::Infinite)
        .repeat_delay(repeat_delay)
}

fn subtitle_burst(subtitle: ElementId) -> Timeline {
    use Property::*;
    let mut timeline = Timeline::new();
    for _ in 0..3 {
        timeline = timeline.then(
            Tween::new(subtitle, 0.05)
                .random(X, -5.0, 5.0)
                .random(Y, -3.0, 3.0)
                .random(SkewX, -5.0, 5.0)
                .random(Opacity, 0.7, 1.0)
                .ease(Ease::Steps(1)),
        );
    }
    timeline.then(
        Tween::new(subtitle, 0.1)
            .to(X, 0.0)
            .to(Y, 0.0)
            .to(SkewX, 0.0)
            .to(Opacity, 1.0)
            .ease(Ease::power_out(1)),
    )
}

/// Flickers are drawn once; the loop replays the same pattern
fn crt_flicker(crt: ElementId, tuning: &GlitchTuning, rng: &mut EffectRng) -> Timeline {
    let mut timeline = Timeline::new();
    let mut gap = 0.0;
    for i in 0..tuning.crt_flickers {
        let intensity = rng.range(0.1, 0.4);
        let duration = f64::from(rng.range(0.05, 0.2));
        let on = step(crt, duration, &[(Property::Opacity, intensity)]);
        timeline = if i == 0 {
            timeline.then(on)
        } else {
            timeline.add(on, Position::Gap(gap))
        };
        timeline = timeline.then(step(crt, duration, &[(Property::Opacity, 0.0)]));
        gap = if rng.chance(tuning.crt_cluster_chance) {
            f64::from(rng.range(0.1, 0.6))
        } else {
            f64::from(rng.range(2.0, 10.0))
        };
    }
    timeline.repeat(Repeat::Infinite).repeat_delay(gap)
}

/// One blip: a random stretch, an optional double flash, then back to hidden
fn glitch_blip(element: ElementId, index: usize, rng: &mut EffectRng) -> Timeline {
    use Property::*;
    let mut timeline = Timeline::new().then(
        Tween::new(element, 0.08)
            .random(Opacity, 0.05, 0.2)
            .random(Scale, 0.5, 2.5)
            .random(SkewX, -10.0, 10.0)
            .ease(Ease::Steps(1))
            .delay(index as f64 * 0.15),
    );
    if rng.chance(0.5) {
        timeline = timeline
            .then(step(element, 0.04, &[(Opacity, 0.0)]))
            .then(Tween::new(element, 0.04).random(Opacity, 0.05, 0.2).ease(Ease::Steps(1)));
    }
    timeline
        .then(step(element, 0.08, &[(Opacity, 0.0), (Scale, 1.0), (SkewX, 0.0)]))
        .repeat(Repeat::Infinite)
        .repeat_delay(f64::from(rng.range(2.0, 6.0)))
}

/// The ambient glitch system
pub struct AmbientGlitch {
    targets: AmbientTargets,
    owner: OwnerToken,
    title: TimelineSlot,
    hero: TimelineSlot,
    jitter: TimelineSlot,
    breath: TimelineSlot,
    subtitle: TimelineSlot,
    burst: TimelineSlot,
    crt: TimelineSlot,
    blips: Vec<TimelineId>,
    tears: Vec<(TimelineId, ElementId)>,
    jitter_tick: Interval,
    burst_tick: Interval,
    tear_tick: Interval,
    title_delay: f64,
    haunted: bool,
    looping: bool,
}

impl AmbientGlitch {
    pub fn new(targets: AmbientTargets) -> Self {
        Self {
            targets,
            owner: OwnerToken::new(),
            title: TimelineSlot::new(),
            hero: TimelineSlot::new(),
            jitter: TimelineSlot::new(),
            breath: TimelineSlot::new(),
            subtitle: TimelineSlot::new(),
            burst: TimelineSlot::new(),
            crt: TimelineSlot::new(),
            blips: Vec::new(),
            tears: Vec::new(),
            jitter_tick: Interval::new(0.0, 1.0),
            burst_tick: Interval::new(0.0, 1.0),
            tear_tick: Interval::new(0.0, 1.0),
            title_delay: 0.0,
            haunted: false,
            looping: false,
        }
    }

    /// Pause between title glitch passes
    pub fn title_delay(&self) -> f64 {
        self.title_delay
    }

    pub fn title_timeline(&self) -> Option<TimelineId> {
        self.title.id()
    }

    pub fn subtitle_timeline(&self) -> Option<TimelineId> {
        self.subtitle.id()
    }

    /// Screen tears currently on the page
    pub fn tear_count(&self) -> usize {
        self.tears.len()
    }

    /// Whether the title glitch runs at the shortened post-easter-egg delay
    pub fn is_haunted(&self) -> bool {
        self.haunted
    }

    fn live(&self, stage: &Stage, id: Option<ElementId>) -> Option<ElementId> {
        id.filter(|e| stage.page.contains(*e))
    }

    /// Stop the title glitch if it is running and start it again with the
    /// current delay
    fn restart_title(&mut self, stage: &mut Stage) {
        let Some(title) = self.live(stage, self.targets.title) else {
            return;
        };
        let tuning = &stage.config.glitch;
        let factor = if self.haunted {
            tuning.haunted_delay_factor
        } else {
            1.0
        };
        self.title_delay = tuning.title_repeat_delay * factor;
        let timeline = title_glitch(title, self.title_delay);
        stage.replace(&mut self.title, timeline, TimelineGroup::Ambient, self.owner);
        tracing::debug!(delay = self.title_delay, haunted = self.haunted, "title glitch started");
    }

    /// The persistent subtitle glitch only runs on a haunted page
    fn start_subtitle(&mut self, stage: &mut Stage) {
        if !self.haunted {
            return;
        }
        let Some(subtitle) = self.live(stage, self.targets.subtitle) else {
            return;
        };
        let tuning = &stage.config.glitch;
        let (min, max) = (tuning.subtitle_delay_min, tuning.subtitle_delay_max);
        let delay = min + f64::from(stage.rng.next_f32()) * (max - min);
        let timeline = subtitle_glitch(subtitle, delay);
        stage.replace(&mut self.subtitle, timeline, TimelineGroup::Ambient, self.owner);
        tracing::debug!(delay, "subtitle glitch started");
    }

    fn start_loops(&mut self, stage: &mut Stage) {
        self.looping = true;
        self.restart_title(stage);
        self.start_subtitle(stage);
        if let Some(logo) = self.live(stage, self.targets.hero_logo) {
            let flicker = logo_flicker(logo, HERO_REPEAT_DELAY);
            stage.replace(&mut self.hero, flicker, TimelineGroup::Ambient, self.owner);
        }
        if let Some(gradient) = self.live(stage, self.targets.gradient) {
            let breath = gradient_breath(gradient, &stage.config.glitch);
            stage.replace(&mut self.breath, breath, TimelineGroup::Ambient, self.owner);
        }
        if let Some(crt) = self.live(stage, self.targets.crt) {
            if stage.page.may_write(crt, self.owner) {
                stage.page.set_property(crt, Property::Opacity, 0.0);
            }
            let flicker = crt_flicker(crt, &stage.config.glitch, &mut stage.rng);
            stage.replace(&mut self.crt, flicker, TimelineGroup::Ambient, self.owner);
        }
        self.start_blips(stage);
    }

    /// Scatter the `.glitch-element`s over the viewport and start their blips
    fn start_blips(&mut self, stage: &mut Stage) {
        for id in self.blips.drain(..) {
            stage.kill(id);
        }
        let viewport = stage.page.viewport();
        let elements = self.targets.glitch_elements.clone();
        for (index, element) in elements.into_iter().enumerate() {
            if !stage.page.contains(element) || !stage.page.may_write(element, self.owner) {
                continue;
            }
            let placement = [
                (Property::X, viewport.width * stage.rng.range(0.1, 0.9)),
                (Property::Y, viewport.height * stage.rng.range(0.1, 0.9)),
                (Property::Width, stage.rng.range(50.0, 200.0)),
                (Property::Height, stage.rng.range(5.0, 35.0)),
                (Property::Opacity, 0.0),
            ];
            for (property, value) in placement {
                stage.page.set_property(element, property, value);
            }
            let blip = glitch_blip(element, index, &mut stage.rng);
            self.blips.push(stage.play(blip, TimelineGroup::Ambient, self.owner));
        }
    }

    fn stop_loops(&mut self, stage: &mut Stage) {
        self.looping = false;
        stage.stop(&mut self.title);
        stage.stop(&mut self.hero);
        stage.stop(&mut self.breath);
        stage.stop(&mut self.subtitle);
        stage.stop(&mut self.burst);
        stage.stop(&mut self.crt);
        for id in self.blips.drain(..) {
            stage.kill(id);
        }
        self.clear_tears(stage);

        // overlays go back to hidden, the rest to their resting values
        let hidden = self.targets.glitch_elements.iter().copied().chain(self.targets.crt);
        for element in hidden {
            if stage.page.contains(element) && stage.page.may_write(element, self.owner) {
                stage.page.set_property(element, Property::Opacity, 0.0);
            }
        }
        if let Some(gradient) = self.targets.gradient {
            if stage.page.may_write(gradient, self.owner) {
                stage.page.clear_property(gradient, Property::Opacity);
            }
        }
        if let Some(subtitle) = self.targets.subtitle {
            if stage.page.may_write(subtitle, self.owner) {
                use Property::*;
                for property in [X, Y, SkewX, Opacity, LetterSpacing] {
                    stage.page.clear_property(subtitle, property);
                }
            }
        }
    }

    fn clear_tears(&mut self, stage: &mut Stage) {
        for (id, tear) in self.tears.drain(..) {
            stage.kill(id);
            stage.page.remove(tear);
        }
    }

    fn reset_intervals(&mut self, stage: &Stage) {
        let tuning = &stage.config.glitch;
        let period = if stage.reduced_motion() {
            tuning.logo_reduced_interval
        } else {
            tuning.logo_interval
        };
        self.jitter_tick = Interval::new(stage.now, period);
        self.burst_tick = Interval::new(stage.now, tuning.subtitle_burst_interval);
        self.tear_tick = Interval::new(stage.now, tuning.tear_interval);
    }

    fn jitter_logo(&mut self, stage: &mut Stage, logo: ElementId) {
        use Property::*;
        let x = stage.rng.range(-2.5, 2.5);
        let y = stage.rng.range(-1.5, 1.5);
        let mut timeline = Timeline::new()
            .then(step(logo, 0.03, &[(X, x), (Y, y), (SkewX, x * 1.5), (SkewY, y * 0.5)]))
            .then(step(logo, 0.03, &[(X, 0.0), (Y, 0.0), (SkewX, 0.0), (SkewY, 0.0)]));

        if let Some(name) = self.live(stage, self.targets.company_name) {
            if stage.rng.chance(0.4) {
                let spacing = stage.rng.range(2.0, 3.0);
                let rest = LetterSpacing.rest_value();
                timeline = timeline
                    .add(
                        step(name, 0.03, &[(X, x * 0.7), (LetterSpacing, spacing)]),
                        Position::At(0.0),
                    )
                    .add(step(name, 0.03, &[(X, 0.0), (LetterSpacing, rest)]), Position::At(0.03));
            }
        }
        stage.replace(&mut self.jitter, timeline, TimelineGroup::Ambient, self.owner);
    }

    /// A thin line across the screen that stretches and fades out
    fn spawn_tear(&mut self, stage: &mut Stage) {
        let viewport = stage.page.viewport();
        let root = stage.page.root();
        let tear = stage.page.create_in(root, "div");
        stage.page.add_class(tear, SCREEN_TEAR_CLASS);
        if stage.rng.chance(0.3) {
            stage.page.add_class(tear, "screen-tear-red");
        }
        let top = stage.rng.range(0.0, viewport.height);
        stage.page.set_property(tear, Property::Y, top);
        stage.page.set_property(tear, Property::Height, 2.0);
        stage.page.set_property(tear, Property::Width, viewport.width);
        stage.page.set_property(tear, Property::Opacity, 0.7);

        let fade = Timeline::new().then(
            Tween::new(tear, 0.2)
                .to(Property::Opacity, 0.0)
                .to(Property::Width, viewport.width * 1.2)
                .to(Property::X, -0.1 * viewport.width)
                .ease(Ease::power_out(1)),
        );
        let id = stage.play(fade, TimelineGroup::Ambient, self.owner);
        self.tears.push((id, tear));
        tracing::trace!(%tear, top, "screen tear");
    }
}

impl EffectSystem for AmbientGlitch {
    fn initialize(&mut self, stage: &mut Stage) -> Result<()> {
        self.haunted = stage.page.has_class(stage.page.root(), TRIGGERED_CLASS);
        if !stage.reduced_motion() {
            self.start_loops(stage);
        }
        self.reset_intervals(stage);
        Ok(())
    }

    fn handle_event(&mut self, stage: &mut Stage, event: &PageEvent) -> Result<()> {
        if let PageEvent::ReducedMotionChanged { reduced } = *event {
            if reduced {
                self.stop_loops(stage);
            } else {
                self.start_loops(stage);
            }
            self.reset_intervals(stage);
        }
        Ok(())
    }

    fn update(&mut self, stage: &mut Stage, _dt: f64) -> Result<()> {
        if !self.haunted && stage.page.has_class(stage.page.root(), TRIGGERED_CLASS) {
            self.haunted = true;
            if self.looping {
                self.restart_title(stage);
                self.start_subtitle(stage);
            }
        }

        let jitter_due = self.jitter_tick.tick(stage.now);
        let burst_due = self.burst_tick.tick(stage.now);
        let tear_due = self.tear_tick.tick(stage.now);
        if stage.timelines.is_group_paused(TimelineGroup::Ambient) {
            return Ok(());
        }

        if jitter_due {
            if let Some(logo) = self.live(stage, self.targets.header_logo) {
                if stage.rng.chance(stage.config.glitch.logo_chance) {
                    self.jitter_logo(stage, logo);
                }
            }
        }
        if !self.looping {
            return Ok(());
        }
        if burst_due && self.haunted {
            if let Some(subtitle) = self.live(stage, self.targets.subtitle) {
                if stage.rng.chance(stage.config.glitch.subtitle_burst_chance) {
                    let burst = subtitle_burst(subtitle);
                    stage.replace(&mut self.burst, burst, TimelineGroup::Ambient, self.owner);
                }
            }
        }
        if tear_due && stage.rng.chance(stage.config.glitch.tear_chance) {
            self.spawn_tear(stage);
        }
        Ok(())
    }

    fn handle_signal(&mut self, stage: &mut Stage, signal: &TimelineSignal) -> Result<()> {
        if let TimelineSignal::Finished { id } = signal {
            if let Some(index) = self.tears.iter().position(|(t, _)| t == id) {
                let (_, tear) = self.tears.swap_remove(index);
                stage.page.remove(tear);
            }
        }
        Ok(())
    }

    fn shutdown(&mut self, stage: &mut Stage) -> Result<()> {
        self.stop_loops(stage);
        stage.stop(&mut self.jitter);
        Ok(())
    }

    fn name(&self) -> &str {
        "ambient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::EffectConfig;
    use glint_runtime::{Page, Viewport};
    use std::collections::BTreeMap;

    const FRAME: f64 = 1.0 / 60.0;

    fn setup(config: EffectConfig, reduced: bool) -> (AmbientGlitch, Stage, AmbientTargets) {
        let mut page = Page::new(Viewport::default());
        let targets = AmbientTargets {
            title: Some(page.create("h1")),
            hero_logo: Some(page.create("img")),
            header_logo: Some(page.create("img")),
            company_name: Some(page.create("span")),
            ..Default::default()
        };
        start(page, targets, config, reduced)
    }

    /// Every loop has a target
    fn setup_full(config: EffectConfig) -> (AmbientGlitch, Stage, AmbientTargets) {
        let mut page = Page::new(Viewport::default());
        let targets = AmbientTargets {
            title: Some(page.create("h1")),
            hero_logo: Some(page.create("img")),
            header_logo: Some(page.create("img")),
            company_name: Some(page.create("span")),
            subtitle: Some(page.create("p")),
            gradient: Some(page.create("div")),
            crt: Some(page.create("div")),
            glitch_elements: (0..3).map(|_| page.create("div")).collect(),
        };
        start(page, targets, config, false)
    }

    fn start(
        page: Page,
        targets: AmbientTargets,
        config: EffectConfig,
        reduced: bool,
    ) -> (AmbientGlitch, Stage, AmbientTargets) {
        let mut stage = Stage::new(page, config, reduced, 9);
        let mut ambient = AmbientGlitch::new(targets.clone());
        ambient.initialize(&mut stage).unwrap();
        (ambient, stage, targets)
    }

    /// No chance-driven effects
    fn quiet() -> EffectConfig {
        let mut config = EffectConfig::default();
        config.glitch.logo_chance = 0.0;
        config.glitch.tear_chance = 0.0;
        config.glitch.subtitle_burst_chance = 0.0;
        config
    }

    fn frame(ambient: &mut AmbientGlitch, stage: &mut Stage) {
        stage.now += FRAME;
        ambient.update(stage, FRAME).unwrap();
        let signals = stage.timelines.advance(FRAME, &mut stage.page, &mut stage.rng);
        for signal in &signals {
            ambient.handle_signal(stage, signal).unwrap();
        }
    }

    fn run_until(ambient: &mut AmbientGlitch, stage: &mut Stage, until: f64) {
        while stage.now < until {
            frame(ambient, stage);
        }
    }

    fn prop(stage: &Stage, id: Option<ElementId>, p: Property) -> f32 {
        stage.page.property(id.unwrap(), p).unwrap()
    }

    fn haunt(stage: &mut Stage) {
        let root = stage.page.root();
        stage.page.add_class(root, TRIGGERED_CLASS);
    }

    fn tears_on_page(stage: &Stage) -> usize {
        let root = stage.page.root();
        stage
            .page
            .children(root)
            .iter()
            .filter(|c| stage.page.has_class(**c, SCREEN_TEAR_CLASS))
            .count()
    }

    #[test]
    fn title_glitch_cuts_and_returns() {
        let mut config = EffectConfig::default();
        config.glitch.logo_chance = 0.0;
        let (mut ambient, mut stage, targets) = setup(config, false);
        assert_eq!(ambient.title_delay(), 4.0);
        assert_eq!(stage.timelines.group_len(TimelineGroup::Ambient), 2);

        frame(&mut ambient, &mut stage);
        assert_eq!(prop(&stage, targets.title, Property::SkewX), 0.0);
        for _ in 0..5 {
            frame(&mut ambient, &mut stage);
        }
        assert_eq!(prop(&stage, targets.title, Property::SkewX), 20.0);

        run_until(&mut ambient, &mut stage, 1.0);
        assert_eq!(prop(&stage, targets.title, Property::SkewX), 0.0);
        assert_eq!(prop(&stage, targets.title, Property::Scale), 1.0);
        assert!(stage.timelines.is_active(ambient.title_timeline().unwrap()));
    }

    #[test]
    fn easter_egg_shortens_title_delay() {
        let (mut ambient, mut stage, _) = setup(EffectConfig::default(), false);
        let before = ambient.title_timeline();
        haunt(&mut stage);
        frame(&mut ambient, &mut stage);

        assert!(ambient.is_haunted());
        assert!((ambient.title_delay() - 3.8).abs() < 1e-9);
        assert_ne!(ambient.title_timeline(), before);
        assert!(!stage.timelines.is_active(before.unwrap()));
    }

    #[test]
    fn logo_jitter_is_bounded_and_settles() {
        let mut config = EffectConfig::default();
        config.glitch.logo_chance = 1.0;
        let (mut ambient, mut stage, targets) = setup(config, false);
        let mut moved = false;
        while stage.now < 2.2 {
            frame(&mut ambient, &mut stage);
            let x = prop(&stage, targets.header_logo, Property::X);
            let skew = prop(&stage, targets.header_logo, Property::SkewX);
            assert!(x.abs() <= 2.5);
            assert!((skew - x * 1.5).abs() < 1e-4);
            moved |= x != 0.0;
        }
        assert!(moved);
        assert_eq!(prop(&stage, targets.header_logo, Property::X), 0.0);
        assert_eq!(prop(&stage, targets.company_name, Property::X), 0.0);
    }

    #[test]
    fn paused_group_skips_jitter() {
        let mut config = EffectConfig::default();
        config.glitch.logo_chance = 1.0;
        let (mut ambient, mut stage, targets) = setup(config, false);
        stage.timelines.pause_group(TimelineGroup::Ambient);
        run_until(&mut ambient, &mut stage, 2.2);
        assert_eq!(prop(&stage, targets.header_logo, Property::X), 0.0);
        assert_eq!(prop(&stage, targets.title, Property::SkewX), 0.0);
    }

    #[test]
    fn reduced_motion_keeps_slow_jitter_only() {
        let mut config = EffectConfig::default();
        config.glitch.logo_chance = 1.0;
        let (mut ambient, mut stage, targets) = setup(config, true);
        assert!(ambient.title_timeline().is_none());
        while stage.now < 4.9 {
            frame(&mut ambient, &mut stage);
            assert_eq!(prop(&stage, targets.header_logo, Property::X), 0.0);
        }
        let mut moved = false;
        while stage.now < 5.2 {
            frame(&mut ambient, &mut stage);
            moved |= prop(&stage, targets.header_logo, Property::X) != 0.0;
        }
        assert!(moved);
    }

    #[test]
    fn gradient_breathes_down_and_back() {
        let (mut ambient, mut stage, targets) = setup_full(quiet());
        let mut floor = 1.0f32;
        while stage.now < 4.0 {
            frame(&mut ambient, &mut stage);
            floor = floor.min(prop(&stage, targets.gradient, Property::Opacity));
        }
        assert!(floor >= 0.3 - 1e-4, "dipped to {}", floor);
        assert!(floor < 0.32, "only reached {}", floor);

        run_until(&mut ambient, &mut stage, 8.0);
        assert!(prop(&stage, targets.gradient, Property::Opacity) > 0.95);
    }

    #[test]
    fn crt_flicker_stays_within_intensity() {
        let (mut ambient, mut stage, targets) = setup_full(quiet());
        assert_eq!(prop(&stage, targets.crt, Property::Opacity), 0.0);
        let mut lit = false;
        while stage.now < 20.0 {
            frame(&mut ambient, &mut stage);
            let opacity = prop(&stage, targets.crt, Property::Opacity);
            assert!(opacity == 0.0 || (0.1..=0.4).contains(&opacity), "opacity {}", opacity);
            lit |= opacity > 0.0;
        }
        assert!(lit);
    }

    #[test]
    fn subtitle_glitch_waits_for_haunting() {
        let (mut ambient, mut stage, targets) = setup_full(quiet());
        run_until(&mut ambient, &mut stage, 1.0);
        assert!(ambient.subtitle_timeline().is_none());
        assert_eq!(prop(&stage, targets.subtitle, Property::X), 0.0);

        haunt(&mut stage);
        frame(&mut ambient, &mut stage);
        let glitch = ambient.subtitle_timeline().unwrap();
        assert!(stage.timelines.is_active(glitch));

        let mut moved = false;
        let until = stage.now + 0.35;
        while stage.now < until {
            frame(&mut ambient, &mut stage);
            let x = prop(&stage, targets.subtitle, Property::X);
            assert!(x.abs() <= 3.0);
            assert!(prop(&stage, targets.subtitle, Property::SkewX).abs() <= 3.0);
            moved |= x != 0.0;
        }
        assert!(moved);
        // one pass done, the next is at least eight seconds away
        assert_eq!(prop(&stage, targets.subtitle, Property::X), 0.0);
        assert_eq!(prop(&stage, targets.subtitle, Property::Opacity), 1.0);
        assert_eq!(prop(&stage, targets.subtitle, Property::LetterSpacing), 0.0);
    }

    #[test]
    fn subtitle_bursts_only_on_a_haunted_page() {
        let mut config = quiet();
        config.glitch.subtitle_burst_chance = 1.0;
        config.glitch.subtitle_burst_interval = 0.5;
        let (mut ambient, mut stage, targets) = setup_full(config);
        run_until(&mut ambient, &mut stage, 1.2);
        assert_eq!(prop(&stage, targets.subtitle, Property::X), 0.0);

        haunt(&mut stage);
        let mut widest = 0.0f32;
        while stage.now < 1.7 {
            frame(&mut ambient, &mut stage);
            widest = widest.max(prop(&stage, targets.subtitle, Property::X).abs());
        }
        assert!(widest > 0.0);
        assert!(widest <= 5.0);
    }

    #[test]
    fn screen_tears_fade_and_leave() {
        let mut config = quiet();
        config.glitch.tear_chance = 1.0;
        config.glitch.tear_interval = 0.5;
        let (mut ambient, mut stage, _) = setup_full(config);
        let elements = stage.page.element_count();

        run_until(&mut ambient, &mut stage, 0.55);
        assert_eq!(ambient.tear_count(), 1);
        assert_eq!(tears_on_page(&stage), 1);

        run_until(&mut ambient, &mut stage, 0.8);
        assert_eq!(ambient.tear_count(), 0);
        assert_eq!(stage.page.element_count(), elements);
    }

    #[test]
    fn paused_group_holds_every_loop() {
        let mut config = quiet();
        config.glitch.tear_chance = 1.0;
        config.glitch.tear_interval = 0.5;
        config.glitch.subtitle_burst_chance = 1.0;
        config.glitch.subtitle_burst_interval = 0.5;
        let (mut ambient, mut stage, targets) = setup_full(config);
        haunt(&mut stage);
        run_until(&mut ambient, &mut stage, 1.1);

        stage.timelines.pause_group(TimelineGroup::Ambient);
        let mut watched: Vec<ElementId> = [targets.subtitle, targets.gradient, targets.crt]
            .into_iter()
            .flatten()
            .collect();
        watched.extend(targets.glitch_elements.iter().copied());
        let snapshot = |stage: &Stage| -> Vec<BTreeMap<Property, f32>> {
            watched
                .iter()
                .map(|e| stage.page.get(*e).unwrap().visual.clone())
                .collect()
        };
        let held = snapshot(&stage);
        let tears = ambient.tear_count();
        assert_eq!(tears, 1);

        run_until(&mut ambient, &mut stage, 4.0);
        assert_eq!(snapshot(&stage), held);
        assert_eq!(ambient.tear_count(), tears);

        stage.timelines.resume_group(TimelineGroup::Ambient);
        let breath = prop(&stage, targets.gradient, Property::Opacity);
        run_until(&mut ambient, &mut stage, 4.5);
        assert_ne!(prop(&stage, targets.gradient, Property::Opacity), breath);
    }

    #[test]
    fn switching_to_reduced_motion_clears_the_loops() {
        let mut config = quiet();
        config.glitch.tear_chance = 1.0;
        config.glitch.tear_interval = 0.5;
        let (mut ambient, mut stage, targets) = setup_full(config);
        haunt(&mut stage);
        run_until(&mut ambient, &mut stage, 0.55);
        assert_eq!(ambient.tear_count(), 1);

        stage.motion.set_reduced_motion(true);
        ambient
            .handle_event(&mut stage, &PageEvent::ReducedMotionChanged { reduced: true })
            .unwrap();
        assert_eq!(stage.timelines.group_len(TimelineGroup::Ambient), 0);
        assert_eq!(tears_on_page(&stage), 0);
        assert_eq!(prop(&stage, targets.crt, Property::Opacity), 0.0);
        assert_eq!(prop(&stage, targets.gradient, Property::Opacity), 1.0);
        assert_eq!(prop(&stage, targets.subtitle, Property::X), 0.0);

        run_until(&mut ambient, &mut stage, 2.0);
        assert_eq!(ambient.tear_count(), 0);
    }
}
