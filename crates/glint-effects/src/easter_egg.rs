//! Hidden sequence triggered by clicking the logo repeatedly
//!
//! The first run is long and scripted; later runs are short and shout.
//! Either way every touched element gets its text and `data-text` back and
//! loses the red class again. Only the elements the sequence shakes are
//! claimed; those also get their animated properties and owner back.
//! Class changes other effects make during a run are left alone.

use glint_animation::{
    AnimationTarget, Repeat, Timeline, TimelineGroup, TimelineId, TimelineSignal, Tween,
};
use glint_core::{Ease, ElementId, OwnerToken, Property, Result};
use glint_runtime::{Deadline, EffectSystem, Interval, Page, PageEvent, Stage};
use std::collections::BTreeMap;

/// Added to the root once the first run has completed
pub const TRIGGERED_CLASS: &str = "easter-egg-triggered";
const RED_CLASS: &str = "easter-egg-red";
const DIALOGUE_CLASS: &str = "easter-egg-dialogue";
const DATA_TEXT: &str = "text";
const DIALOGUE_LINES: usize = 45;
const TEAR_PERIOD: f64 = 0.5;

/// Elements the sequence takes over
#[derive(Debug, Clone, Default)]
pub struct EggTargets {
    /// Clicked to trigger; jittered during every run
    pub logo: Option<ElementId>,
    pub title: Option<ElementId>,
    pub subtitle: Option<ElementId>,
    /// Hosts the dialogue overlay and screen tears
    pub content: Option<ElementId>,
    /// Extra elements that shout on repeat runs
    pub shouters: Vec<ElementId>,
}

/// What the sequence changes on one element, as it was before the run
#[derive(Debug, Clone)]
struct Snapshot {
    id: ElementId,
    text: String,
    data_text: Option<String>,
    had_red: bool,
    /// Shaken elements are owned by the sequence for the run
    claimed: bool,
    visual: BTreeMap<Property, f32>,
    owner: Option<OwnerToken>,
}

impl Snapshot {
    fn take(page: &Page, id: ElementId, claimed: bool) -> Option<Self> {
        let el = page.get(id)?;
        Some(Self {
            id,
            text: el.text.clone(),
            data_text: el.data.get(DATA_TEXT).cloned(),
            had_red: el.classes.contains(RED_CLASS),
            claimed,
            visual: el.visual.clone(),
            owner: page.owner_of(id),
        })
    }

    fn restore(self, page: &mut Page, owner: OwnerToken) {
        if self.claimed {
            page.release(self.id, owner);
            if let Some(previous) = self.owner {
                page.force_claim(self.id, previous);
            }
        }
        let Some(el) = page.get_mut(self.id) else {
            return;
        };
        el.text = self.text;
        match self.data_text {
            Some(text) => {
                el.data.insert(DATA_TEXT.to_string(), text);
            }
            None => {
                el.data.remove(DATA_TEXT);
            }
        }
        if !self.had_red {
            el.classes.remove(RED_CLASS);
        }
        if self.claimed {
            el.visual = self.visual;
        }
    }
}

/// A sequence in progress
#[derive(Debug)]
struct Run {
    first: bool,
    ends: Deadline,
    snapshots: Vec<Snapshot>,
    timelines: Vec<TimelineId>,
    overlay: Option<ElementId>,
    tear_tick: Option<Interval>,
    tears: Vec<(TimelineId, ElementId)>,
}

/// The easter egg sequencer
pub struct EasterEgg {
    targets: EggTargets,
    owner: OwnerToken,
    clicks: u32,
    runs: u32,
    run: Option<Run>,
}

impl EasterEgg {
    pub fn new(targets: EggTargets) -> Self {
        Self {
            targets,
            owner: OwnerToken::new(),
            clicks: 0,
            runs: 0,
            run: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Completed runs
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Clicks counted toward the next run
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn overlay(&self) -> Option<ElementId> {
        self.run.as_ref().and_then(|r| r.overlay)
    }

    fn live(&self, stage: &Stage, id: Option<ElementId>) -> Option<ElementId> {
        id.filter(|e| stage.page.contains(*e))
    }

    /// Start a run immediately, as if the threshold had just been reached
    pub fn trigger(&mut self, stage: &mut Stage) {
        if self.run.is_some() {
            return;
        }
        let first = self.runs == 0;
        let Some(logo) = self.live(stage, self.targets.logo) else {
            tracing::warn!("easter egg logo missing, sequence skipped");
            return;
        };

        stage.timelines.pause_group(TimelineGroup::Ambient);
        let settings = stage.config.easter_egg.clone();
        let duration = if first {
            settings.first_duration
        } else {
            settings.repeat_duration
        };

        let mut touched = vec![logo];
        let mut extra: Vec<ElementId> = [self.targets.title, self.targets.subtitle]
            .into_iter()
            .flatten()
            .collect();
        if !first {
            extra.extend(self.targets.shouters.iter().copied());
        }
        for id in extra {
            if stage.page.contains(id) && !touched.contains(&id) {
                touched.push(id);
            }
        }
        // repeat runs only rewrite the text of the subtitle and the shouters
        let shaken = |id: ElementId| first || id == logo || Some(id) == self.targets.title;
        let snapshots: Vec<Snapshot> = touched
            .iter()
            .filter_map(|id| Snapshot::take(&stage.page, *id, shaken(*id)))
            .collect();
        for s in snapshots.iter().filter(|s| s.claimed) {
            stage.page.force_claim(s.id, self.owner);
        }

        let mut run = Run {
            first,
            ends: Deadline::new(),
            snapshots,
            timelines: Vec::new(),
            overlay: None,
            tear_tick: None,
            tears: Vec::new(),
        };
        run.ends.arm(stage.now, duration);

        if first {
            self.script_first(stage, &mut run, logo, duration);
        } else {
            self.script_repeat(stage, &mut run, logo, duration);
        }
        tracing::info!(first, duration, "easter egg triggered");
        self.run = Some(run);
    }

    fn script_first(&mut self, stage: &mut Stage, run: &mut Run, logo: ElementId, duration: f64) {
        let settings = stage.config.easter_egg.clone();
        let period = settings.first_jitter_period;

        if let Some(title) = self.live(stage, self.targets.title) {
            stage.page.set_text(title, settings.first_title.as_str());
            stage.page.set_data(title, DATA_TEXT, settings.first_title.as_str());
            stage.page.add_class(title, RED_CLASS);
            let jitter = shake(title, period, repeats(duration, period), &[
                (Property::X, 20.0),
                (Property::Y, 5.0),
                (Property::SkewX, 25.0),
                (Property::SkewY, 5.0),
            ])
            .with(Property::Scale, 0.95, 1.05)
            .with(Property::Opacity, 0.4, 1.0);
            run.timelines.push(stage.play(jitter.build(), TimelineGroup::Sequence, self.owner));
        }

        if let Some(subtitle) = self.live(stage, self.targets.subtitle) {
            let line = stage.rng.pick(&settings.subtitles).cloned().unwrap_or_default();
            stage.page.set_text(subtitle, line);
            stage.page.add_class(subtitle, RED_CLASS);
            let jitter = shake(subtitle, 0.1, repeats(duration, 0.1), &[
                (Property::X, 10.0),
                (Property::SkewX, 10.0),
            ]);
            run.timelines.push(stage.play(jitter.build(), TimelineGroup::Sequence, self.owner));
        }

        let flicker = shake(logo, 0.05, repeats(duration, 0.05), &[
            (Property::X, 5.0),
            (Property::Y, 5.0),
            (Property::Rotation, 2.5),
        ])
        .with(Property::Opacity, 0.0, 0.5);
        run.timelines.push(stage.play(flicker.build(), TimelineGroup::Sequence, self.owner));

        self.open_dialogue(stage, run, duration);
    }

    fn open_dialogue(&mut self, stage: &mut Stage, run: &mut Run, duration: f64) {
        let Some(content) = self.live(stage, self.targets.content) else {
            return;
        };
        let lines = stage.config.easter_egg.dialogue.clone();
        let overlay = stage.page.create_in(content, "div");
        stage.page.add_class(overlay, "easter-egg-overlay");
        for _ in 0..DIALOGUE_LINES {
            let line = stage.page.create_in(overlay, "p");
            stage.page.add_class(line, DIALOGUE_CLASS);
            stage.page.add_class(line, RED_CLASS);
            let text = stage.rng.pick(&lines).cloned().unwrap_or_default();
            stage.page.set_text(line, text);
        }
        let flicker = Timeline::new()
            .then(
                Tween::new(overlay, 0.03)
                    .random(Property::Opacity, 0.3, 1.0)
                    .ease(Ease::Steps(1)),
            )
            .then(Tween::new(overlay, 0.03).to(Property::Opacity, 1.0).ease(Ease::Steps(1)))
            .repeat(Repeat::Count(repeats(duration, 0.06)));
        run.timelines.push(stage.play(flicker, TimelineGroup::Sequence, self.owner));
        run.overlay = Some(overlay);
        run.tear_tick = Some(Interval::new(stage.now, TEAR_PERIOD));
    }

    fn tear(&mut self, stage: &mut Stage, run: &mut Run) {
        let Some(content) = self.live(stage, self.targets.content) else {
            return;
        };
        let viewport = stage.page.viewport();
        let tear = stage.page.create_in(content, "div");
        stage.page.add_class(tear, "easter-egg-tear");
        let y = stage.rng.range(0.0, viewport.height);
        let height = stage.rng.range(2.0, 20.0);
        let shift = stage.rng.range(-30.0, 30.0);
        stage.page.set_property(tear, Property::Y, y);
        stage.page.set_property(tear, Property::Height, height);
        stage.page.set_property(tear, Property::X, shift);
        let fade = Timeline::new().then(
            Tween::new(tear, 0.2)
                .from_to(Property::Opacity, 1.0, 0.0)
                .ease(Ease::Linear),
        );
        let id = stage.play(fade, TimelineGroup::Sequence, self.owner);
        run.tears.push((id, tear));
    }

    fn script_repeat(&mut self, stage: &mut Stage, run: &mut Run, logo: ElementId, duration: f64) {
        let settings = stage.config.easter_egg.clone();
        for s in &run.snapshots {
            if s.id == logo {
                continue;
            }
            stage.page.set_text(s.id, settings.repeat_text.as_str());
            if s.data_text.is_some() {
                stage.page.set_data(s.id, DATA_TEXT, settings.repeat_text.as_str());
            }
            stage.page.add_class(s.id, RED_CLASS);
        }

        if let Some(title) = self.live(stage, self.targets.title) {
            let period = settings.repeat_jitter_period;
            let jitter = shake(title, period, repeats(duration, period), &[
                (Property::X, 20.0),
                (Property::SkewX, 25.0),
            ])
            .with(Property::Opacity, 0.4, 1.0);
            run.timelines.push(stage.play(jitter.build(), TimelineGroup::Sequence, self.owner));
        }

        let flicker = shake(logo, 0.06, repeats(duration, 0.06), &[(Property::X, 5.0)])
            .with(Property::Opacity, 0.0, 0.5);
        run.timelines.push(stage.play(flicker.build(), TimelineGroup::Sequence, self.owner));
    }

    fn finish(&mut self, stage: &mut Stage) {
        let Some(run) = self.run.take() else {
            return;
        };
        for id in run.timelines.iter().chain(run.tears.iter().map(|(id, _)| id)) {
            stage.kill(*id);
        }
        for (_, tear) in &run.tears {
            stage.page.remove(*tear);
        }
        if let Some(overlay) = run.overlay {
            stage.page.remove(overlay);
        }
        for snapshot in run.snapshots {
            snapshot.restore(&mut stage.page, self.owner);
        }
        if run.first {
            let root = stage.page.root();
            stage.page.add_class(root, TRIGGERED_CLASS);
        }
        stage.timelines.resume_group(TimelineGroup::Ambient);
        self.runs += 1;
        tracing::info!(runs = self.runs, "easter egg finished");
    }
}

/// Passes of a jitter that fit in `duration`
fn repeats(duration: f64, period: f64) -> u32 {
    (duration / period).floor().max(0.0) as u32
}

/// A two-step jitter: jump to random values, then back to rest
struct Shake {
    out: Tween,
    back: Tween,
    repeat: u32,
}

/// Symmetric random offsets of `±range` on each property
fn shake(target: ElementId, period: f64, repeat: u32, ranges: &[(Property, f32)]) -> Shake {
    let half = period / 2.0;
    let shake = Shake {
        out: Tween::new(target, half).ease(Ease::Steps(1)),
        back: Tween::new(target, half).ease(Ease::Steps(1)),
        repeat,
    };
    ranges
        .iter()
        .fold(shake, |s, &(property, range)| s.with(property, -range, range))
}

impl Shake {
    fn with(mut self, property: Property, min: f32, max: f32) -> Self {
        self.out = self.out.random(property, min, max);
        self.back = self.back.to(property, property.rest_value());
        self
    }

    fn build(self) -> Timeline {
        Timeline::new()
            .then(self.out)
            .then(self.back)
            .repeat(Repeat::Count(self.repeat))
    }
}

impl EffectSystem for EasterEgg {
    fn initialize(&mut self, _stage: &mut Stage) -> Result<()> {
        if self.targets.logo.is_none() {
            tracing::debug!("no logo, easter egg disabled");
        }
        Ok(())
    }

    fn handle_event(&mut self, stage: &mut Stage, event: &PageEvent) -> Result<()> {
        let PageEvent::Click { element } = *event else {
            return Ok(());
        };
        if self.targets.logo != Some(element) || self.run.is_some() {
            return Ok(());
        }
        self.clicks += 1;
        tracing::trace!(clicks = self.clicks, "logo clicked");
        if self.clicks >= stage.config.easter_egg.click_threshold {
            self.clicks = 0;
            self.trigger(stage);
        }
        Ok(())
    }

    fn update(&mut self, stage: &mut Stage, _dt: f64) -> Result<()> {
        let Some(mut run) = self.run.take() else {
            return Ok(());
        };
        if run.ends.fire_if_due(stage.now) {
            self.run = Some(run);
            self.finish(stage);
            return Ok(());
        }
        if run.tear_tick.as_mut().is_some_and(|t| t.tick(stage.now)) {
            self.tear(stage, &mut run);
        }
        self.run = Some(run);
        Ok(())
    }

    fn handle_signal(&mut self, stage: &mut Stage, signal: &TimelineSignal) -> Result<()> {
        let (TimelineSignal::Finished { id }, Some(run)) = (signal, self.run.as_mut()) else {
            return Ok(());
        };
        if let Some(index) = run.tears.iter().position(|(tl, _)| tl == id) {
            let (_, tear) = run.tears.remove(index);
            stage.page.remove(tear);
        }
        run.timelines.retain(|tl| tl != id);
        Ok(())
    }

    fn shutdown(&mut self, stage: &mut Stage) -> Result<()> {
        if self.run.is_some() {
            self.finish(stage);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "easter_egg"
    }
}
