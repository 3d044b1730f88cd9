//! Scroll-linked effects: progress indicator, one-shot reveals, parallax
//! scrub and the rate-limited full-viewport glitches.
//!
//! Everything except the plain progress bar is skipped under reduced
//! motion. The motion mode is read once at initialization.

use glint_animation::{
    AnimationTarget, Position, Timeline, TimelineGroup, TimelineId, TimelineSignal, TimelineSlot,
    Tween,
};
use glint_core::{Ease, ElementId, OwnerToken, Property, Result};
use glint_runtime::{EffectSystem, Page, PageEvent, Stage};

const HEADING_RED: &str = "scroll:heading-red";
const HEADING_CLEAR: &str = "scroll:heading-clear";
const GLITCH_CLASS: &str = "scroll-glitch-red";

/// Elements the scroll effects drive. Empty lists simply do nothing.
#[derive(Debug, Clone, Default)]
pub struct ScrollTargets {
    /// Where the indicator, grid and overlays are attached
    pub host: Option<ElementId>,
    /// Headings that drift up as they cross the viewport (h1 and h2)
    pub parallax_headings: Vec<ElementId>,
    /// Headings that glitch once when their top reaches 80% of the viewport
    pub glitch_headings: Vec<ElementId>,
    /// Paragraphs revealed at 90%
    pub paragraphs: Vec<ElementId>,
    /// Lists revealed at 85%, with the items that slide in
    pub lists: Vec<(ElementId, Vec<ElementId>)>,
    /// Background gradient scrubbed over the whole document
    pub gradient: Option<ElementId>,
}

#[derive(Debug, Clone, Copy)]
struct RgbLayers {
    container: ElementId,
    red: ElementId,
    blue: ElementId,
}

/// The scroll effect system
pub struct ScrollEffects {
    targets: ScrollTargets,
    owner: OwnerToken,
    full_motion: bool,
    progress_bar: Option<ElementId>,
    progress_glitch: Option<ElementId>,
    grid: Option<ElementId>,
    rgb: Option<RgbLayers>,
    pending_headings: Vec<ElementId>,
    pending_paragraphs: Vec<(usize, ElementId)>,
    pending_lists: Vec<(ElementId, Vec<ElementId>)>,
    heading_glitches: Vec<(TimelineId, ElementId)>,
    /// Overlays removed when their timeline finishes
    overlays: Vec<(TimelineId, ElementId)>,
    progress_flash: TimelineSlot,
    rgb_flash: TimelineSlot,
    grid_flare: TimelineSlot,
    last_offset: f32,
    last_scroll_at: f64,
    last_glitch_at: Option<f64>,
    last_rgb_at: Option<f64>,
}

impl ScrollEffects {
    pub fn new(targets: ScrollTargets) -> Self {
        Self {
            targets,
            owner: OwnerToken::new(),
            full_motion: false,
            progress_bar: None,
            progress_glitch: None,
            grid: None,
            rgb: None,
            pending_headings: Vec::new(),
            pending_paragraphs: Vec::new(),
            pending_lists: Vec::new(),
            heading_glitches: Vec::new(),
            overlays: Vec::new(),
            progress_flash: TimelineSlot::new(),
            rgb_flash: TimelineSlot::new(),
            grid_flare: TimelineSlot::new(),
            last_offset: 0.0,
            last_scroll_at: 0.0,
            last_glitch_at: None,
            last_rgb_at: None,
        }
    }

    pub fn progress_bar(&self) -> Option<ElementId> {
        self.progress_bar
    }

    pub fn grid(&self) -> Option<ElementId> {
        self.grid
    }

    /// Headings, paragraphs and lists still waiting for their trigger
    pub fn pending_reveals(&self) -> usize {
        self.pending_headings.len() + self.pending_paragraphs.len() + self.pending_lists.len()
    }

    fn build_indicator(&mut self, page: &mut Page, host: ElementId) {
        let container = page.create_in(host, "div");
        page.add_class(container, "scroll-progress-container");
        let bar = page.create_in(container, "div");
        page.add_class(bar, "scroll-progress-bar");
        page.set_property(bar, Property::Width, 0.0);
        self.progress_bar = Some(bar);

        if self.full_motion {
            let glitch = page.create_in(bar, "div");
            page.add_class(glitch, "scroll-progress-glitch");
            page.set_property(glitch, Property::Opacity, 0.0);
            self.progress_glitch = Some(glitch);
        }
    }

    fn build_overlays(&mut self, page: &mut Page, host: ElementId) {
        let grid = page.create_in(host, "div");
        page.add_class(grid, "dynamic-grid");
        page.set_property(grid, Property::Opacity, 0.15);
        self.grid = Some(grid);

        let container = page.create_in(host, "div");
        page.add_class(container, "rgb-split-container");
        page.set_property(container, Property::Opacity, 0.0);
        let mut layer = |class: &str, x: f32| {
            let id = page.create_in(container, "div");
            page.add_class(id, "rgb-layer");
            page.add_class(id, class);
            page.set_property(id, Property::X, x);
            id
        };
        let red = layer("red-layer", -5.0);
        layer("green-layer", 0.0);
        let blue = layer("blue-layer", 5.0);
        self.rgb = Some(RgbLayers {
            container,
            red,
            blue,
        });
    }

    /// Hide everything that reveals later, the way a from-tween renders its
    /// starting state immediately
    fn prepare_reveals(&mut self, page: &mut Page) {
        self.pending_headings = self.targets.glitch_headings.clone();
        self.pending_paragraphs = self.targets.paragraphs.iter().copied().enumerate().collect();
        for (_, p) in &self.pending_paragraphs {
            page.set_property(*p, Property::Opacity, 0.0);
            page.set_property(*p, Property::Y, 20.0);
        }
        self.pending_lists = self.targets.lists.clone();
        for (_, items) in &self.pending_lists {
            for item in items {
                page.set_property(*item, Property::Opacity, 0.0);
                page.set_property(*item, Property::X, -20.0);
            }
        }
    }

    fn update_progress(&mut self, stage: &mut Stage) {
        let Some(bar) = self.progress_bar else {
            return;
        };
        let progress = stage.page.scroll_progress();
        stage.page.set_property(bar, Property::Width, progress * 100.0);

        let Some(glitch) = self.progress_glitch else {
            return;
        };
        if stage.rng.chance(stage.config.glitch.progress_flash_chance) {
            let flash = Timeline::new()
                .then(Tween::new(glitch, 0.1).to(Property::Opacity, 0.6))
                .then(Tween::new(glitch, 0.1).to(Property::Opacity, 0.0));
            stage.replace(&mut self.progress_flash, flash, TimelineGroup::Transient, self.owner);
        }
    }

    fn check_triggers(&mut self, stage: &mut Stage) {
        let mut fired = Vec::new();
        self.pending_headings.retain(|h| {
            let reached = stage.page.top_reached(*h, 0.8);
            if reached {
                fired.push(*h);
            }
            !reached
        });
        for heading in fired {
            let glitch = Timeline::new()
                .then(Tween::new(heading, 0.1).to(Property::SkewX, 20.0).ease(Ease::Steps(1)))
                .then(Tween::new(heading, 0.1).to(Property::SkewX, -15.0).ease(Ease::Steps(1)))
                .then(
                    Tween::new(heading, 0.1)
                        .to(Property::SkewX, 0.0)
                        .ease(Ease::power_out(1)),
                )
                .call(HEADING_RED, Position::Overlap(0.1))
                .call(HEADING_CLEAR, Position::Gap(0.2));
            let id = stage.play(glitch, TimelineGroup::Transient, self.owner);
            self.heading_glitches.push((id, heading));
        }

        let ease = Ease::power_out(2);
        let mut revealed = Vec::new();
        self.pending_paragraphs.retain(|(index, p)| {
            let reached = stage.page.top_reached(*p, 0.9);
            if reached {
                revealed.push((*index, *p));
            }
            !reached
        });
        for (index, paragraph) in revealed {
            let delay = (index as f64 * 0.05) % 0.2;
            let reveal = Timeline::new().then(
                Tween::new(paragraph, 0.6)
                    .to(Property::Opacity, 1.0)
                    .to(Property::Y, 0.0)
                    .delay(delay)
                    .ease(ease),
            );
            stage.play(reveal, TimelineGroup::Transient, self.owner);
        }

        let mut lists = Vec::new();
        self.pending_lists.retain(|(list, items)| {
            let reached = stage.page.top_reached(*list, 0.85);
            if reached {
                lists.push(items.clone());
            }
            !reached
        });
        for items in lists {
            let reveal = Timeline::new().then(
                Tween::many(items, 0.5)
                    .to(Property::Opacity, 1.0)
                    .to(Property::X, 0.0)
                    .stagger(0.1)
                    .ease(ease),
            );
            stage.play(reveal, TimelineGroup::Transient, self.owner);
        }
    }

    fn scrub(&self, stage: &mut Stage) {
        let page = &mut stage.page;
        let offset = page.scroll_offset();
        let vh = page.viewport().height;

        // From "top bottom" to "bottom top"
        for heading in &self.targets.parallax_headings {
            let Some(layout) = page.layout(*heading) else {
                continue;
            };
            let start = layout.top - vh;
            let span = layout.bottom() - start;
            let progress = if span > 0.0 {
                ((offset - start) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            if page.may_write(*heading, self.owner) {
                page.set_property(*heading, Property::Y, -20.0 * progress);
            }
        }

        let document = page.scroll_progress();
        if let Some(gradient) = self.targets.gradient {
            if page.contains(gradient) && page.may_write(gradient, self.owner) {
                let height = page
                    .layout(gradient)
                    .map(|l| l.height)
                    .filter(|h| *h > 0.0)
                    .unwrap_or(vh);
                page.set_property(gradient, Property::Y, 0.2 * height * document);
            }
        }
        if let Some(grid) = self.grid {
            page.set_property(grid, Property::Y, -100.0 * document);
        }
    }

    fn maybe_scroll_glitch(&mut self, stage: &mut Stage, host: ElementId) {
        let tuning = &stage.config.glitch;
        if self
            .last_glitch_at
            .is_some_and(|t| stage.now - t < tuning.scroll_glitch_cooldown)
        {
            return;
        }
        let progress = stage.page.scroll_progress();
        let width = tuning.scroll_glitch_band_width;
        let in_band = tuning
            .scroll_glitch_bands
            .iter()
            .any(|b| progress > *b && progress < b + width);
        let chance = tuning.scroll_glitch_chance;
        let shift = tuning.scroll_glitch_shift;
        if !in_band && !stage.rng.chance(chance) {
            return;
        }
        self.last_glitch_at = Some(stage.now);

        let overlay = stage.page.create_in(host, "div");
        stage.page.add_class(overlay, "scroll-glitch");
        stage.page.set_property(overlay, Property::Opacity, 0.0);
        let dx = (stage.rng.next_f32() - 0.5) * shift;
        let dy = (stage.rng.next_f32() - 0.5) * shift;
        let body = stage.page.root();
        let steps = Ease::Steps(1);
        let glitch = Timeline::new()
            .then(Tween::new(overlay, 0.05).to(Property::Opacity, 0.8).ease(steps))
            .then(Tween::new(overlay, 0.05).to(Property::Opacity, 0.0).ease(steps))
            .add(
                Tween::new(body, 0.05)
                    .to(Property::X, dx)
                    .to(Property::Y, dy)
                    .ease(steps),
                Position::At(0.0),
            )
            .add(
                Tween::new(body, 0.05)
                    .to(Property::X, 0.0)
                    .to(Property::Y, 0.0)
                    .ease(Ease::power_out(1)),
                Position::At(0.05),
            );
        let id = stage.play(glitch, TimelineGroup::Transient, self.owner);
        self.overlays.push((id, overlay));
        tracing::debug!(progress, "scroll glitch");
    }

    fn maybe_rgb_split(&mut self, stage: &mut Stage, velocity: f32) {
        let Some(rgb) = self.rgb else {
            return;
        };
        let tuning = &stage.config.glitch;
        if self
            .last_rgb_at
            .is_some_and(|t| stage.now - t < tuning.rgb_split_cooldown)
        {
            return;
        }
        if velocity <= tuning.rgb_split_velocity {
            return;
        }
        self.last_rgb_at = Some(stage.now);
        let intensity = (velocity / 15.0).min(0.3);
        let offset = (velocity * 1.5).min(8.0);
        let split = Timeline::new()
            .then(Tween::new(rgb.container, 0.2).to(Property::Opacity, intensity))
            .add(Tween::new(rgb.red, 0.2).to(Property::X, -offset), Position::WithPrevious)
            .add(Tween::new(rgb.blue, 0.2).to(Property::X, offset), Position::WithPrevious)
            .then(Tween::new(rgb.container, 0.5).to(Property::Opacity, 0.0))
            .add(Tween::new(rgb.red, 0.5).to(Property::X, -5.0), Position::WithPrevious)
            .add(Tween::new(rgb.blue, 0.5).to(Property::X, 5.0), Position::WithPrevious);
        stage.replace(&mut self.rgb_flash, split, TimelineGroup::Transient, self.owner);
    }

    fn maybe_grid_flare(&mut self, stage: &mut Stage, distance: f32) {
        let Some(grid) = self.grid else {
            return;
        };
        if distance <= stage.config.glitch.grid_flare_speed {
            return;
        }
        let flare = Timeline::new()
            .then(Tween::new(grid, 0.3).to(Property::Opacity, 0.25))
            .then(Tween::new(grid, 0.5).to(Property::Opacity, 0.15));
        stage.replace(&mut self.grid_flare, flare, TimelineGroup::Transient, self.owner);
    }

    fn on_scroll(&mut self, stage: &mut Stage) {
        let offset = stage.page.scroll_offset();
        let distance = (offset - self.last_offset).abs();
        let elapsed = (stage.now - self.last_scroll_at).max(1.0 / 60.0);
        // px per millisecond
        let velocity = distance / (elapsed * 1000.0) as f32;
        self.last_offset = offset;
        self.last_scroll_at = stage.now;

        self.update_progress(stage);
        if !self.full_motion {
            return;
        }
        self.scrub(stage);
        self.check_triggers(stage);
        if let Some(host) = self.targets.host.filter(|h| stage.page.contains(*h)) {
            self.maybe_scroll_glitch(stage, host);
        }
        self.maybe_rgb_split(stage, velocity);
        self.maybe_grid_flare(stage, distance);
    }
}

impl EffectSystem for ScrollEffects {
    fn initialize(&mut self, stage: &mut Stage) -> Result<()> {
        let Some(host) = self.targets.host.filter(|h| stage.page.contains(*h)) else {
            tracing::debug!("no scroll host, scroll effects disabled");
            return Ok(());
        };
        self.full_motion = !stage.reduced_motion();
        self.build_indicator(&mut stage.page, host);
        self.last_offset = stage.page.scroll_offset();
        self.last_scroll_at = stage.now;

        if self.full_motion {
            self.build_overlays(&mut stage.page, host);
            self.prepare_reveals(&mut stage.page);
            self.scrub(stage);
            self.check_triggers(stage);
        }
        self.update_progress(stage);
        tracing::debug!(full_motion = self.full_motion, "scroll effects ready");
        Ok(())
    }

    fn handle_event(&mut self, stage: &mut Stage, event: &PageEvent) -> Result<()> {
        if self.progress_bar.is_none() {
            return Ok(());
        }
        match event {
            PageEvent::Scroll { .. } => self.on_scroll(stage),
            PageEvent::Resize { .. } | PageEvent::Load => {
                self.update_progress(stage);
                if self.full_motion {
                    self.scrub(stage);
                    self.check_triggers(stage);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn update(&mut self, _stage: &mut Stage, _dt: f64) -> Result<()> {
        Ok(())
    }

    fn handle_signal(&mut self, stage: &mut Stage, signal: &TimelineSignal) -> Result<()> {
        match signal {
            TimelineSignal::Cue { id, name } => {
                let Some((_, heading)) = self.heading_glitches.iter().find(|(tl, _)| tl == id)
                else {
                    return Ok(());
                };
                if name == HEADING_RED {
                    stage.page.add_class(*heading, GLITCH_CLASS);
                } else if name == HEADING_CLEAR {
                    stage.page.remove_class(*heading, GLITCH_CLASS);
                }
            }
            TimelineSignal::Finished { id } => {
                self.heading_glitches.retain(|(tl, _)| tl != id);
                if let Some(index) = self.overlays.iter().position(|(tl, _)| tl == id) {
                    let (_, overlay) = self.overlays.remove(index);
                    stage.page.remove(overlay);
                }
                if self.progress_flash.holds(*id) {
                    self.progress_flash.clear();
                }
            }
        }
        Ok(())
    }

    fn shutdown(&mut self, stage: &mut Stage) -> Result<()> {
        for slot in [&mut self.progress_flash, &mut self.rgb_flash, &mut self.grid_flare] {
            stage.stop(slot);
        }
        for (id, overlay) in self.overlays.drain(..) {
            stage.kill(id);
            stage.page.remove(overlay);
        }
        let bar_container = self
            .progress_bar
            .take()
            .and_then(|bar| stage.page.get(bar).and_then(|e| e.parent));
        for id in [bar_container, self.grid.take(), self.rgb.take().map(|r| r.container)]
            .into_iter()
            .flatten()
        {
            stage.page.remove(id);
        }
        self.progress_glitch = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "scroll"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::EffectConfig;
    use glint_runtime::Viewport;

    const FRAME: f64 = 1.0 / 60.0;

    struct Fixture {
        stage: Stage,
        scroll: ScrollEffects,
        heading: ElementId,
        paragraph: ElementId,
        items: Vec<ElementId>,
    }

    fn fixture(config: EffectConfig, reduced: bool) -> Fixture {
        let mut page = Page::new(Viewport {
            width: 1280.0,
            height: 800.0,
            dpr: 1.0,
        });
        let heading = page.create("h2");
        page.set_layout(heading, 1000.0, 40.0);
        let paragraph = page.create("p");
        page.set_layout(paragraph, 1100.0, 80.0);
        let list = page.create("ul");
        page.set_layout(list, 2000.0, 100.0);
        let items: Vec<ElementId> = (0..3).map(|_| page.create_in(list, "li")).collect();
        page.set_document_height(4000.0);

        let mut config = config;
        config.glitch.scroll_glitch_chance = 0.0;
        config.glitch.progress_flash_chance = 0.0;
        let mut stage = Stage::new(page, config, reduced, 3);
        let targets = ScrollTargets {
            host: Some(stage.page.root()),
            parallax_headings: vec![heading],
            glitch_headings: vec![heading],
            paragraphs: vec![paragraph],
            lists: vec![(list, items.clone())],
            gradient: None,
        };
        let mut scroll = ScrollEffects::new(targets);
        scroll.initialize(&mut stage).unwrap();
        Fixture {
            stage,
            scroll,
            heading,
            paragraph,
            items,
        }
    }

    impl Fixture {
        fn scroll_to(&mut self, offset: f32) {
            self.stage.page.set_scroll_offset(offset);
            self.scroll
                .handle_event(&mut self.stage, &PageEvent::Scroll { offset })
                .unwrap();
        }

        fn run(&mut self, seconds: f64) {
            let end = self.stage.now + seconds;
            while self.stage.now < end {
                self.stage.now += FRAME;
                let signals =
                    self.stage
                        .timelines
                        .advance(FRAME, &mut self.stage.page, &mut self.stage.rng);
                for signal in &signals {
                    self.scroll.handle_signal(&mut self.stage, signal).unwrap();
                }
            }
        }

        fn prop(&self, id: ElementId, p: Property) -> f32 {
            self.stage.page.get(id).unwrap().property(p)
        }
    }

    #[test]
    fn progress_bar_tracks_scroll() {
        let mut f = fixture(EffectConfig::default(), false);
        let bar = f.scroll.progress_bar().unwrap();
        f.scroll_to(1600.0);
        assert!((f.prop(bar, Property::Width) - 50.0).abs() < 1e-3);
        f.scroll_to(10_000.0);
        assert!((f.prop(bar, Property::Width) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn reveals_start_hidden_and_fire_once() {
        let mut f = fixture(EffectConfig::default(), false);
        assert_eq!(f.prop(f.paragraph, Property::Opacity), 0.0);
        assert_eq!(f.scroll.pending_reveals(), 3);

        // Heading top at 600 of 800: past the 80% line
        f.scroll_to(400.0);
        f.run(0.15);
        assert_eq!(f.prop(f.heading, Property::SkewX), 20.0);
        f.run(1.0);
        assert_eq!(f.prop(f.heading, Property::SkewX), 0.0);
        assert_eq!(f.prop(f.paragraph, Property::Opacity), 1.0);
        assert!(!f.stage.page.has_class(f.heading, GLITCH_CLASS));
        assert_eq!(f.scroll.pending_reveals(), 1);

        f.scroll_to(0.0);
        f.scroll_to(400.0);
        assert_eq!(f.scroll.pending_reveals(), 1);
        f.run(0.15);
        assert_eq!(f.prop(f.heading, Property::SkewX), 0.0);

        f.scroll_to(1400.0);
        f.run(1.0);
        for item in &f.items {
            assert_eq!(f.prop(*item, Property::X), 0.0);
            assert_eq!(f.prop(*item, Property::Opacity), 1.0);
        }
        assert_eq!(f.scroll.pending_reveals(), 0);
    }

    #[test]
    fn heading_is_flagged_red_during_glitch() {
        let mut f = fixture(EffectConfig::default(), false);
        f.scroll_to(400.0);
        f.run(0.3);
        assert!(f.stage.page.has_class(f.heading, GLITCH_CLASS));
        f.run(0.3);
        assert!(!f.stage.page.has_class(f.heading, GLITCH_CLASS));
    }

    #[test]
    fn parallax_scrubs_heading() {
        let mut f = fixture(EffectConfig::default(), false);
        // Enters at 200 (1000 - 800), leaves at 1040
        f.scroll_to(620.0);
        assert!((f.prop(f.heading, Property::Y) + 10.0).abs() < 1e-3);
        f.scroll_to(2000.0);
        assert_eq!(f.prop(f.heading, Property::Y), -20.0);
    }

    #[test]
    fn scroll_glitch_respects_band_and_cooldown() {
        let mut f = fixture(EffectConfig::default(), false);
        let overlays = |f: &Fixture| {
            f.stage
                .page
                .children(f.stage.page.root())
                .iter()
                .filter(|c| f.stage.page.has_class(**c, "scroll-glitch"))
                .count()
        };
        // 0.2525 of the 3200px range
        f.scroll_to(808.0);
        assert_eq!(overlays(&f), 1);
        f.scroll_to(809.0);
        assert_eq!(overlays(&f), 1);

        f.run(0.2);
        assert_eq!(overlays(&f), 0);
        assert_eq!(f.prop(f.stage.page.root(), Property::X), 0.0);

        f.run(1.0);
        f.scroll_to(1601.0);
        assert_eq!(overlays(&f), 1);
    }

    #[test]
    fn rgb_split_needs_velocity() {
        let mut f = fixture(EffectConfig::default(), false);
        let container = f.scroll.rgb.unwrap().container;
        f.stage.now = 1.0;
        f.scroll_to(10.0);
        f.run(0.1);
        assert_eq!(f.prop(container, Property::Opacity), 0.0);

        f.stage.now += 0.05;
        f.scroll_to(700.0);
        f.run(0.2);
        assert!(f.prop(container, Property::Opacity) > 0.0);
    }

    #[test]
    fn grid_flares_on_fast_scroll() {
        let mut f = fixture(EffectConfig::default(), false);
        let grid = f.scroll.grid().unwrap();
        f.scroll_to(100.0);
        f.run(0.25);
        assert!(f.prop(grid, Property::Opacity) > 0.2);
        f.run(0.7);
        assert!((f.prop(grid, Property::Opacity) - 0.15).abs() < 1e-3);
    }

    #[test]
    fn reduced_motion_keeps_only_the_bar() {
        let mut f = fixture(EffectConfig::default(), true);
        assert!(f.scroll.progress_bar().is_some());
        assert!(f.scroll.grid().is_none());
        assert_eq!(f.prop(f.paragraph, Property::Opacity), 1.0);
        f.scroll_to(808.0);
        assert!(f.stage.timelines.is_empty());
        assert_eq!(f.prop(f.heading, Property::Y), 0.0);
    }

    #[test]
    fn shutdown_removes_overlays() {
        let mut f = fixture(EffectConfig::default(), false);
        let before = f.stage.page.element_count();
        f.scroll.shutdown(&mut f.stage).unwrap();
        // indicator (2 + glitch sliver), grid, rgb container with three layers
        assert_eq!(f.stage.page.element_count(), before - 8);
    }
}
