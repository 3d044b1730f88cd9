//! Text distortion: headline intro, hover glitches, footer scramble,
//! smiley swaps and falling data streams
//!
//! Nothing here runs under reduced motion.

use glint_animation::{
    AnimationTarget, Timeline, TimelineGroup, TimelineId, TimelineSignal, TimelineSlot, Tween,
};
use glint_core::config::{PresetKind, PresetOptions};
use glint_core::{Ease, EaseDirection, EffectRng, ElementId, OwnerToken, Property, Result};
use glint_runtime::{Deadline, EffectSystem, Interval, PageEvent, Stage};
use std::collections::HashMap;

const HEADLINE_READY: &str = "text:headline-ready";
const READY_CLASS: &str = "text-effect-ready";
const HIGHLIGHT_CLASS: &str = "text-highlight";
const SCRAMBLE_CHARSET: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/";
const FACES: [&str; 8] = [":(", ":|", ":/", ":?", ":>", ":<", ":$", ":@"];
/// How long a scrambled footer or swapped face stays visible
const RESTORE_AFTER: f64 = 0.1;

/// Elements the text effects act on
#[derive(Debug, Clone, Default)]
pub struct TextTargets {
    /// Receives the data-stream container
    pub host: Option<ElementId>,
    pub headline: Option<ElementId>,
    pub headings: Vec<ElementId>,
    pub links: Vec<ElementId>,
    pub footers: Vec<ElementId>,
    pub smiley: Option<ElementId>,
}

/// Text that is temporarily replaced and must come back
#[derive(Debug, Default)]
struct Swap {
    originals: Vec<(ElementId, String)>,
    restore: Deadline,
}

impl Swap {
    fn is_pending(&self) -> bool {
        !self.originals.is_empty()
    }

    fn restore(&mut self, stage: &mut Stage) {
        for (id, text) in self.originals.drain(..) {
            stage.page.set_text(id, text);
        }
        self.restore.cancel();
    }
}

/// Falling binary streams inside a lazily created container
#[derive(Debug, Default)]
struct Streams {
    container: Option<ElementId>,
    fade: TimelineSlot,
    running: Vec<(TimelineId, ElementId)>,
}

/// The text effect system
pub struct TextEffects {
    targets: TextTargets,
    owner: OwnerToken,
    enabled: bool,
    intro: Option<TimelineId>,
    hovers: HashMap<ElementId, TimelineSlot>,
    footer_tick: Interval,
    smiley_tick: Interval,
    stream_tick: Interval,
    footer: Swap,
    face: Swap,
    streams: Streams,
}

impl TextEffects {
    pub fn new(targets: TextTargets) -> Self {
        Self {
            targets,
            owner: OwnerToken::new(),
            enabled: false,
            intro: None,
            hovers: HashMap::new(),
            footer_tick: Interval::new(0.0, 1.0),
            smiley_tick: Interval::new(0.0, 1.0),
            stream_tick: Interval::new(0.0, 1.0),
            footer: Swap::default(),
            face: Swap::default(),
            streams: Streams::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Falling streams currently on the page
    pub fn stream_count(&self) -> usize {
        self.streams.running.len()
    }

    pub fn stream_container(&self) -> Option<ElementId> {
        self.streams.container
    }

    fn enable(&mut self, stage: &mut Stage) {
        let tuning = &stage.config.glitch;
        self.footer_tick = Interval::new(stage.now, tuning.footer_interval);
        self.smiley_tick = Interval::new(stage.now, tuning.smiley_interval);
        self.stream_tick = Interval::new(stage.now, tuning.stream_interval);
        self.enabled = true;
    }

    fn disable(&mut self, stage: &mut Stage) {
        self.enabled = false;
        self.footer.restore(stage);
        self.face.restore(stage);
        for slot in self.hovers.values_mut() {
            stage.stop(slot);
        }
        self.hovers.clear();
        for id in self.targets.headings.iter() {
            stage.page.remove_class(*id, HIGHLIGHT_CLASS);
        }
        stage.stop(&mut self.streams.fade);
        for (id, stream) in self.streams.running.drain(..) {
            stage.kill(id);
            stage.page.remove(stream);
        }
        if let Some(container) = self.streams.container.take() {
            stage.page.remove(container);
        }
    }

    fn play_intro(&mut self, stage: &mut Stage) {
        let Some(headline) = self.targets.headline.filter(|h| stage.page.contains(*h)) else {
            return;
        };
        let rise = stage.config.preset(
            PresetKind::FadeInUp,
            PresetOptions {
                duration: Some(stage.motion.device_duration(stage.config.durations.slow)),
                ease: Some(Ease::Back {
                    direction: EaseDirection::Out,
                    overshoot: 1.7,
                }),
                ..Default::default()
            },
        );
        let intro = Timeline::new().then(Tween::preset(vec![headline], &rise).on_complete(HEADLINE_READY));
        self.intro = Some(stage.play(intro, TimelineGroup::Transient, self.owner));
    }

    fn hover(&mut self, stage: &mut Stage, element: ElementId, entering: bool) {
        let timeline = if self.targets.links.contains(&element) {
            if entering {
                Timeline::new()
                    .then(Tween::new(element, 0.1).to(Property::SkewX, 10.0).ease(Ease::Steps(1)))
                    .then(Tween::new(element, 0.1).to(Property::SkewX, -5.0).ease(Ease::Steps(1)))
                    .then(Tween::new(element, 0.1).to(Property::SkewX, 0.0).ease(Ease::Steps(1)))
            } else {
                Timeline::new().then(Tween::new(element, 0.3).to(Property::SkewX, 0.0))
            }
        } else if self.targets.headings.contains(&element) {
            let brightness = if entering {
                stage.page.add_class(element, HIGHLIGHT_CLASS);
                1.3
            } else {
                stage.page.remove_class(element, HIGHLIGHT_CLASS);
                1.0
            };
            Timeline::new().then(
                Tween::new(element, stage.motion.device_duration(stage.config.durations.fast))
                    .to(Property::Brightness, brightness)
                    .ease(stage.config.eases.smooth),
            )
        } else {
            return;
        };
        let slot = self.hovers.entry(element).or_default();
        stage.replace(slot, timeline, TimelineGroup::Transient, self.owner);
    }

    fn scramble_footers(&mut self, stage: &mut Stage) {
        let char_chance = stage.config.glitch.footer_char_chance;
        let charset: Vec<char> = SCRAMBLE_CHARSET.chars().collect();
        for &footer in &self.targets.footers {
            let Some(original) = stage.page.text(footer).map(str::to_owned) else {
                continue;
            };
            let scrambled = scramble(&original, &charset, char_chance, &mut stage.rng);
            stage.page.set_text(footer, scrambled);
            self.footer.originals.push((footer, original));
        }
        if self.footer.is_pending() {
            self.footer.restore.arm(stage.now, RESTORE_AFTER);
        }
    }

    fn swap_face(&mut self, stage: &mut Stage) {
        let Some(smiley) = self.targets.smiley else {
            return;
        };
        let Some(original) = stage.page.text(smiley).map(str::to_owned) else {
            return;
        };
        let face = stage.rng.pick(&FACES).copied().unwrap_or(":(");
        stage.page.set_text(smiley, face);
        self.face.originals.push((smiley, original));
        self.face.restore.arm(stage.now, RESTORE_AFTER);
    }

    fn spawn_stream(&mut self, stage: &mut Stage) {
        let Some(host) = self.targets.host.filter(|h| stage.page.contains(*h)) else {
            return;
        };
        let container = match self.streams.container {
            Some(c) if stage.page.contains(c) => c,
            _ => {
                let c = stage.page.create_in(host, "div");
                stage.page.add_class(c, "data-stream-container");
                stage.page.set_property(c, Property::Opacity, 0.0);
                self.streams.container = Some(c);
                c
            }
        };
        if self.streams.running.is_empty() {
            let show = Timeline::new().then(Tween::new(container, 0.5).to(Property::Opacity, 0.7));
            stage.replace(&mut self.streams.fade, show, TimelineGroup::Transient, self.owner);
        }

        let viewport = stage.page.viewport();
        let stream = stage.page.create_in(container, "div");
        stage.page.add_class(stream, "data-stream");
        let bits = 5 + stage.rng.index(10);
        let text: String = (0..bits)
            .map(|_| if stage.rng.chance(0.5) { '1' } else { '0' })
            .collect();
        stage.page.set_text(stream, text);
        let x = stage.rng.range(0.0, viewport.width);
        stage.page.set_property(stream, Property::X, x);

        let duration = f64::from(stage.rng.range(2.0, 5.0));
        let fall = Timeline::new().then(
            Tween::new(stream, duration)
                .from_to(Property::Y, -100.0, viewport.height)
                .ease(Ease::Linear),
        );
        let id = stage.play(fall, TimelineGroup::Transient, self.owner);
        self.streams.running.push((id, stream));
        tracing::trace!(bits, duration, "data stream spawned");
    }
}

/// Replace each visible character with a glitch glyph with probability `p`
fn scramble(text: &str, charset: &[char], p: f32, rng: &mut EffectRng) -> String {
    text.chars()
        .map(|c| {
            if !c.is_whitespace() && rng.chance(p) {
                rng.pick(charset).copied().unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

impl EffectSystem for TextEffects {
    fn initialize(&mut self, stage: &mut Stage) -> Result<()> {
        if stage.reduced_motion() {
            tracing::debug!("reduced motion, text effects disabled");
            return Ok(());
        }
        self.enable(stage);
        self.play_intro(stage);
        Ok(())
    }

    fn handle_event(&mut self, stage: &mut Stage, event: &PageEvent) -> Result<()> {
        match *event {
            PageEvent::ReducedMotionChanged { reduced } if reduced && self.enabled => {
                self.disable(stage);
            }
            PageEvent::ReducedMotionChanged { reduced } if !reduced && !self.enabled => {
                self.enable(stage);
            }
            PageEvent::PointerEnter { element } if self.enabled => self.hover(stage, element, true),
            PageEvent::PointerLeave { element } if self.enabled => self.hover(stage, element, false),
            _ => {}
        }
        Ok(())
    }

    fn update(&mut self, stage: &mut Stage, _dt: f64) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.footer.restore.fire_if_due(stage.now) {
            self.footer.restore(stage);
        }
        if self.face.restore.fire_if_due(stage.now) {
            self.face.restore(stage);
        }

        let tuning = stage.config.glitch.clone();
        if self.footer_tick.tick(stage.now)
            && !self.footer.is_pending()
            && stage.rng.chance(tuning.footer_chance)
        {
            self.scramble_footers(stage);
        }
        if self.smiley_tick.tick(stage.now)
            && !self.face.is_pending()
            && stage.rng.chance(tuning.smiley_chance)
        {
            self.swap_face(stage);
        }
        if self.stream_tick.tick(stage.now) && stage.rng.chance(tuning.stream_chance) {
            self.spawn_stream(stage);
        }
        Ok(())
    }

    fn handle_signal(&mut self, stage: &mut Stage, signal: &TimelineSignal) -> Result<()> {
        match signal {
            TimelineSignal::Cue { id, name } if Some(*id) == self.intro && name == HEADLINE_READY => {
                if let Some(headline) = self.targets.headline {
                    stage.page.add_class(headline, READY_CLASS);
                }
            }
            TimelineSignal::Finished { id } => {
                if Some(*id) == self.intro {
                    self.intro = None;
                }
                if let Some(index) = self.streams.running.iter().position(|(tl, _)| tl == id) {
                    let (_, stream) = self.streams.running.remove(index);
                    stage.page.remove(stream);
                    let container = self.streams.container;
                    if let Some(container) = container.filter(|_| self.streams.running.is_empty()) {
                        let hide = Timeline::new()
                            .then(Tween::new(container, 0.5).to(Property::Opacity, 0.0));
                        stage.replace(&mut self.streams.fade, hide, TimelineGroup::Transient, self.owner);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn shutdown(&mut self, stage: &mut Stage) -> Result<()> {
        if let Some(id) = self.intro.take() {
            stage.kill(id);
        }
        self.disable(stage);
        Ok(())
    }

    fn name(&self) -> &str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::EffectConfig;
    use glint_runtime::{Page, Viewport};

    const FRAME: f64 = 1.0 / 60.0;

    struct Fixture {
        text: TextEffects,
        stage: Stage,
        headline: ElementId,
        footer: ElementId,
        smiley: ElementId,
        link: ElementId,
    }

    fn setup(config: EffectConfig, reduced: bool) -> Fixture {
        let mut page = Page::new(Viewport::default());
        let headline = page.create("h1");
        page.set_text(headline, "Terms of Service");
        let footer = page.create("footer");
        page.set_text(footer, "All rights reserved");
        let smiley = page.create("span");
        page.set_text(smiley, ":)");
        let link = page.create("a");
        let mut stage = Stage::new(page, config, reduced, 17);
        let mut text = TextEffects::new(TextTargets {
            host: Some(stage.page.root()),
            headline: Some(headline),
            headings: Vec::new(),
            links: vec![link],
            footers: vec![footer],
            smiley: Some(smiley),
        });
        text.initialize(&mut stage).unwrap();
        Fixture {
            text,
            stage,
            headline,
            footer,
            smiley,
            link,
        }
    }

    fn frame(f: &mut Fixture) {
        f.stage.now += FRAME;
        f.text.update(&mut f.stage, FRAME).unwrap();
        let signals = f
            .stage
            .timelines
            .advance(FRAME, &mut f.stage.page, &mut f.stage.rng);
        for signal in &signals {
            f.text.handle_signal(&mut f.stage, signal).unwrap();
        }
    }

    fn run_until(f: &mut Fixture, until: f64) {
        while f.stage.now < until {
            frame(f);
        }
    }

    fn quiet() -> EffectConfig {
        let mut config = EffectConfig::default();
        config.glitch.footer_chance = 0.0;
        config.glitch.smiley_chance = 0.0;
        config.glitch.stream_chance = 0.0;
        config
    }

    #[test]
    fn headline_intro_marks_ready() {
        let mut f = setup(quiet(), false);
        let opacity = |f: &Fixture| f.stage.page.get(f.headline).unwrap().property(Property::Opacity);
        assert_eq!(opacity(&f), 0.0);
        run_until(&mut f, 0.9);
        assert_eq!(opacity(&f), 1.0);
        assert!(f.stage.page.has_class(f.headline, READY_CLASS));
    }

    #[test]
    fn footer_scramble_is_restored() {
        let mut config = quiet();
        config.glitch.footer_chance = 1.0;
        config.glitch.footer_char_chance = 1.0;
        let mut f = setup(config, false);

        run_until(&mut f, 3.0 + FRAME / 2.0);
        let scrambled = f.stage.page.text(f.footer).unwrap().to_owned();
        assert_ne!(scrambled, "All rights reserved");
        assert_eq!(scrambled.chars().count(), "All rights reserved".chars().count());
        assert_eq!(scrambled.chars().filter(|c| c.is_whitespace()).count(), 2);

        run_until(&mut f, 3.2);
        assert_eq!(f.stage.page.text(f.footer), Some("All rights reserved"));
    }

    #[test]
    fn smiley_swaps_and_returns() {
        let mut config = quiet();
        config.glitch.smiley_chance = 1.0;
        let mut f = setup(config, false);
        run_until(&mut f, 5.0 + FRAME / 2.0);
        let face = f.stage.page.text(f.smiley).unwrap();
        assert!(FACES.contains(&face));
        run_until(&mut f, 5.2);
        assert_eq!(f.stage.page.text(f.smiley), Some(":)"));
    }

    #[test]
    fn data_streams_fall_and_clean_up() {
        let mut config = quiet();
        config.glitch.stream_chance = 1.0;
        config.glitch.stream_interval = 100.0;
        let mut f = setup(config, false);
        f.text.spawn_stream(&mut f.stage);
        assert_eq!(f.text.stream_count(), 1);
        let container = f.text.stream_container().unwrap();
        let stream = f.stage.page.children(container)[0];
        let bits = f.stage.page.text(stream).unwrap();
        assert!((5..=14).contains(&bits.len()));
        assert!(bits.chars().all(|c| c == '0' || c == '1'));

        run_until(&mut f, 0.6);
        let shown = f.stage.page.get(container).unwrap().property(Property::Opacity);
        assert!((shown - 0.7).abs() < 1e-4);

        run_until(&mut f, 6.0);
        assert_eq!(f.text.stream_count(), 0);
        assert!(!f.stage.page.contains(stream));
        assert_eq!(f.stage.page.get(container).unwrap().property(Property::Opacity), 0.0);
    }

    #[test]
    fn link_hover_skews_and_settles() {
        let mut f = setup(quiet(), false);
        f.text
            .handle_event(&mut f.stage, &PageEvent::PointerEnter { element: f.link })
            .unwrap();
        let skew = |f: &Fixture| f.stage.page.get(f.link).unwrap().property(Property::SkewX);
        run_until(&mut f, 0.05);
        assert_eq!(skew(&f), 0.0);
        run_until(&mut f, 0.15);
        assert_eq!(skew(&f), 10.0);
        run_until(&mut f, 0.4);
        assert_eq!(skew(&f), 0.0);
    }

    #[test]
    fn reduced_motion_disables_everything() {
        let mut config = quiet();
        config.glitch.footer_chance = 1.0;
        let mut f = setup(config, true);
        assert!(!f.text.is_enabled());
        assert_eq!(f.stage.page.get(f.headline).unwrap().property(Property::Opacity), 1.0);
        run_until(&mut f, 4.0);
        assert_eq!(f.stage.page.text(f.footer), Some("All rights reserved"));
        assert!(f.stage.timelines.is_empty());
    }

    #[test]
    fn switching_to_reduced_motion_restores_text() {
        let mut config = quiet();
        config.glitch.footer_chance = 1.0;
        config.glitch.footer_char_chance = 1.0;
        let mut f = setup(config, false);
        run_until(&mut f, 3.0 + FRAME / 2.0);
        assert_ne!(f.stage.page.text(f.footer), Some("All rights reserved"));
        f.text
            .handle_event(&mut f.stage, &PageEvent::ReducedMotionChanged { reduced: true })
            .unwrap();
        assert_eq!(f.stage.page.text(f.footer), Some("All rights reserved"));
        assert!(!f.text.is_enabled());
    }
}
