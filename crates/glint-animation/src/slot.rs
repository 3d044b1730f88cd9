//! A named place for at most one running timeline

use crate::set::{TimelineGroup, TimelineId, TimelineSet};
use crate::target::AnimationTarget;
use crate::timeline::Timeline;
use glint_core::{EffectRng, OwnerToken};

/// Holds the handle of one timeline an effect owns.
///
/// Starting a new timeline through the slot kills the previous one first,
/// so an effect never has two copies of the same animation fighting.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimelineSlot {
    current: Option<TimelineId>,
}

impl TimelineSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill whatever the slot holds and play `timeline` in its place
    pub fn replace(
        &mut self,
        set: &mut TimelineSet,
        timeline: Timeline,
        group: TimelineGroup,
        owner: OwnerToken,
        target: &mut dyn AnimationTarget,
        rng: &mut EffectRng,
    ) -> TimelineId {
        self.stop(set, target);
        let id = set.play(timeline, group, owner, target, rng);
        self.current = Some(id);
        id
    }

    pub fn stop(&mut self, set: &mut TimelineSet, target: &mut dyn AnimationTarget) {
        if let Some(id) = self.current.take() {
            set.kill(id, target);
        }
    }

    pub fn is_running(&self, set: &TimelineSet) -> bool {
        self.current.is_some_and(|id| set.is_active(id))
    }

    pub fn id(&self) -> Option<TimelineId> {
        self.current
    }

    /// Whether `id` is the timeline this slot holds
    pub fn holds(&self, id: TimelineId) -> bool {
        self.current == Some(id)
    }

    /// Forget the handle without killing anything (after it finished)
    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::testing::Props;
    use crate::tween::Tween;
    use glint_core::{ElementId, Property};

    #[test]
    fn replace_kills_previous() {
        let id = ElementId::new();
        let mut props = Props::default().with_element(id);
        let mut rng = EffectRng::new(1);
        let mut set = TimelineSet::new();
        let mut slot = TimelineSlot::new();
        let tl = || Timeline::new().then(Tween::new(id, 1.0).to(Property::X, 5.0));

        let first = slot.replace(&mut set, tl(), TimelineGroup::Transient, OwnerToken::new(), &mut props, &mut rng);
        let second = slot.replace(&mut set, tl(), TimelineGroup::Transient, OwnerToken::new(), &mut props, &mut rng);
        assert!(!set.is_active(first));
        assert!(set.is_active(second));
        assert_eq!(set.len(), 1);
        assert!(slot.holds(second));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut props = Props::default();
        let mut set = TimelineSet::new();
        let mut slot = TimelineSlot::new();
        slot.stop(&mut set, &mut props);
        slot.stop(&mut set, &mut props);
        assert!(!slot.is_running(&set));
    }

    #[test]
    fn not_running_after_finish() {
        let id = ElementId::new();
        let mut props = Props::default().with_element(id);
        let mut rng = EffectRng::new(1);
        let mut set = TimelineSet::new();
        let mut slot = TimelineSlot::new();
        let tl = Timeline::new().then(Tween::new(id, 0.1).to(Property::X, 5.0));
        slot.replace(&mut set, tl, TimelineGroup::Transient, OwnerToken::new(), &mut props, &mut rng);
        assert!(slot.is_running(&set));
        set.advance(0.2, &mut props, &mut rng);
        assert!(!slot.is_running(&set));
    }
}
