//! The set of running timelines and the signals they raise

use crate::target::AnimationTarget;
use crate::timeline::{Playback, Timeline};
use glint_core::{EffectRng, OwnerToken};
use std::collections::HashSet;
use std::fmt;

/// Handle to a timeline played on a `TimelineSet`
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct TimelineId(u64);

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timeline#{}", self.0)
    }
}

/// Broad classes of timelines that can be paused together
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TimelineGroup {
    /// Long-running idle loops (title glitch, logo drift)
    Ambient,
    /// Short reactions to input (glitch flashes, ripples, reveals)
    Transient,
    /// Choreographed sequences (splash, easter egg)
    Sequence,
}

/// Something a timeline reported while advancing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineSignal {
    Cue { id: TimelineId, name: String },
    Finished { id: TimelineId },
}

struct Running {
    id: TimelineId,
    timeline: Timeline,
    playback: Playback,
    group: TimelineGroup,
    owner: OwnerToken,
    paused: bool,
}

/// All timelines currently playing
pub struct TimelineSet {
    running: Vec<Running>,
    paused_groups: HashSet<TimelineGroup>,
    next_id: u64,
}

impl Default for TimelineSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineSet {
    pub fn new() -> Self {
        Self {
            running: Vec::new(),
            paused_groups: HashSet::new(),
            next_id: 1,
        }
    }

    /// Start playing a timeline. `From` values are applied immediately.
    pub fn play(
        &mut self,
        timeline: Timeline,
        group: TimelineGroup,
        owner: OwnerToken,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
    ) -> TimelineId {
        let id = TimelineId(self.next_id);
        self.next_id += 1;

        let mut playback = Playback::new(&timeline);
        playback.prime(&timeline, target, rng, owner);
        tracing::trace!(%id, ?group, duration = timeline.duration(), "timeline started");

        let paused = timeline.starts_paused();
        self.running.push(Running {
            id,
            timeline,
            playback,
            group,
            owner,
            paused,
        });
        id
    }

    /// Rewind a timeline to its start and play it again
    pub fn restart(
        &mut self,
        id: TimelineId,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
    ) -> bool {
        let Some(r) = self.running.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        r.playback = Playback::new(&r.timeline);
        r.playback.prime(&r.timeline, target, rng, r.owner);
        r.paused = false;
        true
    }

    /// Stop a timeline where it is. Properties keep their current values.
    pub fn kill(&mut self, id: TimelineId, target: &mut dyn AnimationTarget) -> bool {
        let Some(index) = self.running.iter().position(|r| r.id == id) else {
            return false;
        };
        let removed = self.running.remove(index);
        tracing::trace!(%id, "timeline killed");
        self.release(&removed, target);
        true
    }

    /// Kill every timeline in a group
    pub fn kill_group(&mut self, group: TimelineGroup, target: &mut dyn AnimationTarget) {
        let ids: Vec<TimelineId> = self
            .running
            .iter()
            .filter(|r| r.group == group)
            .map(|r| r.id)
            .collect();
        for id in ids {
            self.kill(id, target);
        }
    }

    pub fn kill_all(&mut self, target: &mut dyn AnimationTarget) {
        let removed = std::mem::take(&mut self.running);
        for r in &removed {
            self.release(r, target);
        }
    }

    /// Release the owner's claims unless another running timeline still
    /// acts for the same owner
    fn release(&self, removed: &Running, target: &mut dyn AnimationTarget) {
        if self.running.iter().any(|r| r.owner == removed.owner) {
            return;
        }
        for element in removed.timeline.elements() {
            target.release(element, removed.owner);
        }
    }

    pub fn pause(&mut self, id: TimelineId) {
        if let Some(r) = self.running.iter_mut().find(|r| r.id == id) {
            r.paused = true;
        }
    }

    pub fn resume(&mut self, id: TimelineId) {
        if let Some(r) = self.running.iter_mut().find(|r| r.id == id) {
            r.paused = false;
        }
    }

    /// Hold every timeline of a group, including ones played later
    pub fn pause_group(&mut self, group: TimelineGroup) {
        self.paused_groups.insert(group);
    }

    pub fn resume_group(&mut self, group: TimelineGroup) {
        self.paused_groups.remove(&group);
    }

    pub fn is_group_paused(&self, group: TimelineGroup) -> bool {
        self.paused_groups.contains(&group)
    }

    /// Whether the timeline is still in the set (playing or paused)
    pub fn is_active(&self, id: TimelineId) -> bool {
        self.running.iter().any(|r| r.id == id)
    }

    pub fn is_paused(&self, id: TimelineId) -> bool {
        self.running
            .iter()
            .find(|r| r.id == id)
            .is_some_and(|r| r.paused || self.paused_groups.contains(&r.group))
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    pub fn group_len(&self, group: TimelineGroup) -> usize {
        self.running.iter().filter(|r| r.group == group).count()
    }

    /// Advance every playing timeline by `dt` seconds.
    ///
    /// Finished timelines are removed and their claims released.
    pub fn advance(
        &mut self,
        dt: f64,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
    ) -> Vec<TimelineSignal> {
        let mut signals = Vec::new();
        let mut finished = Vec::new();
        let mut cues = Vec::new();

        for r in self.running.iter_mut() {
            if r.paused || self.paused_groups.contains(&r.group) {
                continue;
            }
            let done = r
                .playback
                .advance(&r.timeline, dt, target, rng, r.owner, &mut cues);
            for name in cues.drain(..) {
                signals.push(TimelineSignal::Cue { id: r.id, name });
            }
            if done {
                finished.push(r.id);
            }
        }

        for id in finished {
            if let Some(index) = self.running.iter().position(|r| r.id == id) {
                let removed = self.running.remove(index);
                debug_assert!(removed.playback.is_finished());
                self.release(&removed, target);
                tracing::trace!(%id, "timeline finished");
                signals.push(TimelineSignal::Finished { id });
            }
        }
        signals
    }
}
