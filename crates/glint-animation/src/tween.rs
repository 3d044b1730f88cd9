//! Property tweens: what to animate, to which values, over how long

use crate::target::AnimationTarget;
use glint_core::config::{Preset, PresetMode};
use glint_core::{Ease, EffectRng, ElementId, OwnerToken, Property};

/// How a tweened property's endpoints are chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenValue {
    /// From the current value to this value
    To(f32),
    /// From this value to the current value (applied as soon as the tween is played)
    From(f32),
    /// Between two explicit values
    FromTo(f32, f32),
    /// From the current value to a value drawn from `[min, max)`
    Random { min: f32, max: f32 },
    /// From the current value to the current value plus a draw from `[min, max)`
    RelativeRandom { min: f32, max: f32 },
}

impl TweenValue {
    pub fn is_from(&self) -> bool {
        matches!(self, TweenValue::From(_) | TweenValue::FromTo(..))
    }

    /// Resolve `(start, end)` given the element's current value
    fn resolve(&self, current: f32, rng: &mut EffectRng) -> (f32, f32) {
        match *self {
            TweenValue::To(v) => (current, v),
            TweenValue::From(v) => (v, current),
            TweenValue::FromTo(a, b) => (a, b),
            TweenValue::Random { min, max } => (current, rng.range(min, max)),
            TweenValue::RelativeRandom { min, max } => (current, current + rng.range(min, max)),
        }
    }
}

/// A declarative animation step over one or more elements
#[derive(Debug, Clone)]
pub struct Tween {
    pub targets: Vec<ElementId>,
    pub values: Vec<(Property, TweenValue)>,
    pub duration: f64,
    pub ease: Ease,
    /// Extra offset before the first target starts
    pub delay: f64,
    /// Offset between consecutive targets
    pub stagger: f64,
    /// Cue fired when the first target starts
    pub on_start: Option<String>,
    /// Cue fired when the last target finishes
    pub on_complete: Option<String>,
}

impl Tween {
    pub fn new(target: ElementId, duration: f64) -> Self {
        Self::many(vec![target], duration)
    }

    /// A tween over `targets` from a configured preset: its values, duration
    /// and ease
    pub fn preset(targets: Vec<ElementId>, preset: &Preset) -> Self {
        let tween = Self::many(targets, preset.duration).ease(preset.ease);
        preset.values.iter().fold(tween, |t, (p, v)| match preset.mode {
            PresetMode::From => t.from(*p, *v),
            PresetMode::To => t.to(*p, *v),
        })
    }

    pub fn many(targets: Vec<ElementId>, duration: f64) -> Self {
        Self {
            targets,
            values: Vec::new(),
            duration: duration.max(0.0),
            ease: Ease::default(),
            delay: 0.0,
            stagger: 0.0,
            on_start: None,
            on_complete: None,
        }
    }

    pub fn to(mut self, property: Property, value: f32) -> Self {
        self.values.push((property, TweenValue::To(value)));
        self
    }

    pub fn from(mut self, property: Property, value: f32) -> Self {
        self.values.push((property, TweenValue::From(value)));
        self
    }

    pub fn from_to(mut self, property: Property, from: f32, to: f32) -> Self {
        self.values.push((property, TweenValue::FromTo(from, to)));
        self
    }

    pub fn random(mut self, property: Property, min: f32, max: f32) -> Self {
        self.values.push((property, TweenValue::Random { min, max }));
        self
    }

    pub fn jitter(mut self, property: Property, min: f32, max: f32) -> Self {
        self.values
            .push((property, TweenValue::RelativeRandom { min, max }));
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger.max(0.0);
        self
    }

    pub fn on_start(mut self, cue: impl Into<String>) -> Self {
        self.on_start = Some(cue.into());
        self
    }

    pub fn on_complete(mut self, cue: impl Into<String>) -> Self {
        self.on_complete = Some(cue.into());
        self
    }

    /// Time from the tween's placement until its last target finishes
    pub fn span(&self) -> f64 {
        let extra = self.targets.len().saturating_sub(1) as f64 * self.stagger;
        self.delay + extra + self.duration
    }

    fn target_offset(&self, index: usize) -> f64 {
        self.delay + index as f64 * self.stagger
    }
}

/// Captured endpoints for one (target, property) pair
#[derive(Debug, Clone, Copy)]
struct Channel {
    start: f32,
    end: f32,
}

/// Playback state of one tween inside a timeline iteration
#[derive(Debug, Clone, Default)]
pub(crate) struct TweenState {
    /// Per target: captured channels once the target has started
    channels: Vec<Option<Vec<Option<Channel>>>>,
    started: bool,
    completed: bool,
}

impl TweenState {
    pub(crate) fn new(tween: &Tween) -> Self {
        Self {
            channels: vec![None; tween.targets.len()],
            started: false,
            completed: false,
        }
    }

    /// Prepare for another pass. Captured start values are kept; with
    /// `redraw`, random end values are drawn again around them.
    pub(crate) fn reset(&mut self, tween: &Tween, redraw: bool, rng: &mut EffectRng) {
        self.started = false;
        self.completed = false;
        if !redraw {
            return;
        }
        for channels in self.channels.iter_mut().flatten() {
            for ((_, value), channel) in tween.values.iter().zip(channels.iter_mut()) {
                let Some(ch) = channel else { continue };
                match *value {
                    TweenValue::Random { min, max } => ch.end = rng.range(min, max),
                    TweenValue::RelativeRandom { min, max } => {
                        ch.end = ch.start + rng.range(min, max)
                    }
                    _ => {}
                }
            }
        }
    }

    fn capture(
        tween: &Tween,
        element: ElementId,
        target: &dyn AnimationTarget,
        rng: &mut EffectRng,
    ) -> Vec<Option<Channel>> {
        tween
            .values
            .iter()
            .map(|(property, value)| {
                let current = target.property(element, *property)?;
                let (start, end) = value.resolve(current, rng);
                Some(Channel { start, end })
            })
            .collect()
    }

    /// Apply `From` values immediately so elements don't flash their final
    /// state before a delayed reveal starts.
    pub(crate) fn prime(
        &mut self,
        tween: &Tween,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
        owner: OwnerToken,
    ) {
        if !tween.values.iter().any(|(_, v)| v.is_from()) {
            return;
        }
        for (i, element) in tween.targets.iter().enumerate() {
            if !target.may_write(*element, owner) {
                continue;
            }
            let channels = Self::capture(tween, *element, target, rng);
            for ((property, _), channel) in tween.values.iter().zip(&channels) {
                if let Some(ch) = channel {
                    target.set_property(*element, *property, ch.start);
                }
            }
            self.channels[i] = Some(channels);
        }
    }

    /// Render the tween at `local` seconds after its placement, pushing any
    /// cues that fired. Reverse passes hold started targets at their start
    /// values and never fire cues.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn render(
        &mut self,
        tween: &Tween,
        local: f64,
        forward: bool,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
        owner: OwnerToken,
        cues: &mut Vec<String>,
    ) {
        let mut all_done = true;

        for (i, element) in tween.targets.iter().enumerate() {
            let mut t = local - tween.target_offset(i);
            if t < 0.0 {
                if forward || self.channels[i].is_none() {
                    all_done = false;
                    continue;
                }
                t = 0.0;
            }

            if self.channels[i].is_none() {
                self.channels[i] = Some(Self::capture(tween, *element, target, rng));
            }
            if !self.started {
                self.started = true;
                if forward {
                    if let Some(cue) = &tween.on_start {
                        cues.push(cue.clone());
                    }
                }
            }

            let progress = if tween.duration <= 0.0 {
                1.0
            } else {
                (t / tween.duration).min(1.0) as f32
            };
            if progress < 1.0 {
                all_done = false;
            }

            if !target.may_write(*element, owner) {
                continue;
            }
            let eased = tween.ease.apply(progress);
            if let Some(channels) = &self.channels[i] {
                for ((property, _), channel) in tween.values.iter().zip(channels) {
                    if let Some(ch) = channel {
                        target.set_property(*element, *property, lerp(ch.start, ch.end, eased));
                    }
                }
            }
        }

        if all_done && !self.completed {
            self.completed = true;
            if forward {
                if let Some(cue) = &tween.on_complete {
                    cues.push(cue.clone());
                }
            }
        }
    }
}

/// Linear interpolation between two values
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
