//! Timelines: tweens and cues placed on a shared clock, with repeat and yoyo

use crate::target::AnimationTarget;
use crate::tween::{Tween, TweenState};
use glint_core::{ElementId, EffectRng, OwnerToken, Property};

/// Where an entry is placed relative to what is already on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// At the end of the timeline so far
    After,
    /// This many seconds before the end of the timeline so far
    Overlap(f64),
    /// This many seconds after the end of the timeline so far
    Gap(f64),
    /// At an absolute time
    At(f64),
    /// At the same time as the previously placed entry
    WithPrevious,
}

/// How many extra passes a timeline plays after the first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Count(u32),
    Infinite,
}

#[derive(Debug, Clone)]
enum Entry {
    Tween(Tween),
    Call(String),
}

#[derive(Debug, Clone)]
struct Placed {
    start: f64,
    entry: Entry,
}

/// A sequence of tweens and named cues
#[derive(Debug, Clone)]
pub struct Timeline {
    entries: Vec<Placed>,
    end: f64,
    last_start: f64,
    repeat: Repeat,
    repeat_delay: f64,
    yoyo: bool,
    start_paused: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            end: 0.0,
            last_start: 0.0,
            repeat: Repeat::Count(0),
            repeat_delay: 0.0,
            yoyo: false,
            start_paused: false,
        }
    }

    fn resolve(&self, position: Position) -> f64 {
        match position {
            Position::After => self.end,
            Position::Overlap(s) => (self.end - s).max(0.0),
            Position::Gap(s) => self.end + s.max(0.0),
            Position::At(s) => s.max(0.0),
            Position::WithPrevious => self.last_start,
        }
    }

    fn place(&mut self, entry: Entry, position: Position) {
        let start = self.resolve(position);
        let span = match &entry {
            Entry::Tween(t) => t.span(),
            Entry::Call(_) => 0.0,
        };
        self.end = self.end.max(start + span);
        self.last_start = start;
        self.entries.push(Placed { start, entry });
    }

    /// Append a tween after everything placed so far
    pub fn then(mut self, tween: Tween) -> Self {
        self.place(Entry::Tween(tween), Position::After);
        self
    }

    pub fn add(mut self, tween: Tween, position: Position) -> Self {
        self.place(Entry::Tween(tween), position);
        self
    }

    /// Instantly set a property
    pub fn set(mut self, element: ElementId, property: Property, value: f32, position: Position) -> Self {
        let tween = Tween::new(element, 0.0).to(property, value);
        self.place(Entry::Tween(tween), position);
        self
    }

    /// Emit a named cue when the playhead reaches this point
    pub fn call(mut self, cue: impl Into<String>, position: Position) -> Self {
        self.place(Entry::Call(cue.into()), position);
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn repeat_delay(mut self, delay: f64) -> Self {
        self.repeat_delay = delay.max(0.0);
        self
    }

    /// Play every other pass backwards
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Add to the set without starting the clock; `resume` starts it
    pub fn paused(mut self, paused: bool) -> Self {
        self.start_paused = paused;
        self
    }

    pub fn starts_paused(&self) -> bool {
        self.start_paused
    }

    /// Length of one pass
    pub fn duration(&self) -> f64 {
        self.end
    }

    pub fn is_infinite(&self) -> bool {
        self.repeat == Repeat::Infinite
    }

    /// Total play time including repeats, `None` when it repeats forever
    pub fn total_duration(&self) -> Option<f64> {
        match self.repeat {
            Repeat::Infinite => None,
            Repeat::Count(n) => {
                Some(self.end * (n as f64 + 1.0) + self.repeat_delay * n as f64)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every element some tween on this timeline drives
    pub fn elements(&self) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = Vec::new();
        for placed in &self.entries {
            if let Entry::Tween(t) = &placed.entry {
                for id in &t.targets {
                    if !out.contains(id) {
                        out.push(*id);
                    }
                }
            }
        }
        out
    }
}

/// Playback state of one timeline
#[derive(Debug, Clone)]
pub(crate) struct Playback {
    time: f64,
    iteration: u32,
    tweens: Vec<TweenState>,
    calls_fired: Vec<bool>,
    finished: bool,
}

impl Playback {
    pub(crate) fn new(timeline: &Timeline) -> Self {
        let tweens = timeline
            .entries
            .iter()
            .map(|p| match &p.entry {
                Entry::Tween(t) => TweenState::new(t),
                Entry::Call(_) => TweenState::default(),
            })
            .collect();
        Self {
            time: 0.0,
            iteration: 0,
            tweens,
            calls_fired: vec![false; timeline.entries.len()],
            finished: false,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply `From` start values before the first frame
    pub(crate) fn prime(
        &mut self,
        timeline: &Timeline,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
        owner: OwnerToken,
    ) {
        for (placed, state) in timeline.entries.iter().zip(self.tweens.iter_mut()) {
            if let Entry::Tween(tween) = &placed.entry {
                state.prime(tween, target, rng, owner);
            }
        }
    }

    fn has_more(&self, repeat: Repeat) -> bool {
        match repeat {
            Repeat::Infinite => true,
            Repeat::Count(n) => self.iteration < n,
        }
    }

    fn start_iteration(&mut self, timeline: &Timeline, rng: &mut EffectRng) {
        self.iteration += 1;
        self.calls_fired.iter_mut().for_each(|f| *f = false);
        // Reverse passes must retrace the values the forward pass reached
        let redraw = !timeline.yoyo;
        for (placed, state) in timeline.entries.iter().zip(self.tweens.iter_mut()) {
            if let Entry::Tween(tween) = &placed.entry {
                state.reset(tween, redraw, rng);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render(
        &mut self,
        timeline: &Timeline,
        local: f64,
        forward: bool,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
        owner: OwnerToken,
        cues: &mut Vec<String>,
    ) {
        let count = timeline.entries.len();
        for n in 0..count {
            // Reverse passes render back to front so earlier entries win
            let i = if forward { n } else { count - 1 - n };
            let placed = &timeline.entries[i];
            match &placed.entry {
                Entry::Tween(tween) => {
                    self.tweens[i].render(
                        tween,
                        local - placed.start,
                        forward,
                        target,
                        rng,
                        owner,
                        cues,
                    );
                }
                Entry::Call(cue) => {
                    if forward && !self.calls_fired[i] && local >= placed.start {
                        self.calls_fired[i] = true;
                        cues.push(cue.clone());
                    }
                }
            }
        }
    }

    /// Move the playhead forward by `dt` seconds and render.
    ///
    /// Returns true once the last pass has completed.
    pub(crate) fn advance(
        &mut self,
        timeline: &Timeline,
        dt: f64,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
        owner: OwnerToken,
        cues: &mut Vec<String>,
    ) -> bool {
        if self.finished {
            return true;
        }
        self.time += dt.max(0.0);
        let duration = timeline.duration();

        loop {
            let forward = !(timeline.yoyo && self.iteration % 2 == 1);
            let body = self.time.min(duration);
            let local = if forward { body } else { duration - body };
            self.render(timeline, local, forward, target, rng, owner, cues);

            if self.time < duration {
                return false;
            }
            if !self.has_more(timeline.repeat) {
                self.finished = true;
                return true;
            }

            let cycle = duration + timeline.repeat_delay;
            if self.time < cycle {
                return false;
            }
            if cycle <= 0.0 {
                // A zero-length pass that repeats forever advances one pass per frame
                if timeline.repeat == Repeat::Infinite {
                    self.time = 0.0;
                    self.start_iteration(timeline, rng);
                    return false;
                }
                self.start_iteration(timeline, rng);
                continue;
            }
            self.time -= cycle;
            self.start_iteration(timeline, rng);
        }
    }
}
