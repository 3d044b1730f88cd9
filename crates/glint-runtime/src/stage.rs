//! Shared context handed to every effect system

use crate::page::Page;
use glint_animation::{Timeline, TimelineGroup, TimelineId, TimelineSet, TimelineSlot};
use glint_core::{EffectConfig, EffectRng, MotionPreference, OwnerToken};

/// Everything an effect may touch during a frame
pub struct Stage {
    pub page: Page,
    pub timelines: TimelineSet,
    pub rng: EffectRng,
    pub config: EffectConfig,
    pub motion: MotionPreference,
    /// Page time in seconds
    pub now: f64,
}

impl Stage {
    pub fn new(page: Page, config: EffectConfig, reduced_motion: bool, seed: u32) -> Self {
        let motion = MotionPreference::new(&config, reduced_motion, page.viewport().width);
        Self {
            page,
            timelines: TimelineSet::new(),
            rng: EffectRng::new(seed),
            config,
            motion,
            now: 0.0,
        }
    }

    pub fn reduced_motion(&self) -> bool {
        self.motion.reduced_motion
    }

    /// Play a timeline against the page
    pub fn play(&mut self, timeline: Timeline, group: TimelineGroup, owner: OwnerToken) -> TimelineId {
        self.timelines
            .play(timeline, group, owner, &mut self.page, &mut self.rng)
    }

    /// Stop whatever `slot` holds and play `timeline` in its place
    pub fn replace(
        &mut self,
        slot: &mut TimelineSlot,
        timeline: Timeline,
        group: TimelineGroup,
        owner: OwnerToken,
    ) -> TimelineId {
        slot.replace(
            &mut self.timelines,
            timeline,
            group,
            owner,
            &mut self.page,
            &mut self.rng,
        )
    }

    pub fn stop(&mut self, slot: &mut TimelineSlot) {
        slot.stop(&mut self.timelines, &mut self.page);
    }

    pub fn kill(&mut self, id: TimelineId) -> bool {
        self.timelines.kill(id, &mut self.page)
    }

    pub fn restart(&mut self, id: TimelineId) -> bool {
        self.timelines.restart(id, &mut self.page, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Viewport;
    use glint_animation::Tween;
    use glint_core::Property;

    fn stage() -> Stage {
        Stage::new(Page::new(Viewport::default()), EffectConfig::default(), false, 7)
    }

    #[test]
    fn motion_follows_viewport() {
        let page = Page::new(Viewport {
            width: 400.0,
            height: 700.0,
            dpr: 2.0,
        });
        let stage = Stage::new(page, EffectConfig::default(), true, 1);
        assert!(stage.motion.is_mobile());
        assert!(stage.reduced_motion());
    }

    #[test]
    fn replace_through_stage_keeps_one_running() {
        let mut stage = stage();
        let id = stage.page.create("h1");
        let mut slot = TimelineSlot::new();
        let owner = OwnerToken::new();
        for _ in 0..3 {
            let tl = Timeline::new().then(Tween::new(id, 1.0).to(Property::SkewX, 20.0));
            stage.replace(&mut slot, tl, TimelineGroup::Ambient, owner);
        }
        assert_eq!(stage.timelines.len(), 1);
        stage.stop(&mut slot);
        assert!(stage.timelines.is_empty());
    }
}
