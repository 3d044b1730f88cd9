//! Custom cursor: a smoothed trail marker and a jittery glitch marker
//!
//! Only built for fine pointers. Both markers fade after a period of
//! inactivity and reappear on the next move.

use glint_animation::{
    AnimationTarget, Repeat, Timeline, TimelineGroup, TimelineId, TimelineSignal, TimelineSlot,
    Tween,
};
use glint_core::{Ease, ElementId, OwnerToken, Property, Result, Vec2};
use glint_runtime::{Deadline, EffectSystem, Page, PageEvent, Stage};

const HOT_CLASS: &str = "cursor-hot";

/// Elements the cursor reacts to
#[derive(Debug, Clone, Default)]
pub struct CursorTargets {
    /// Where the markers are attached
    pub host: Option<ElementId>,
    /// Links that enlarge and tint both markers while hovered
    pub links: Vec<ElementId>,
    /// Headings that make the glitch marker flicker on hover
    pub headings: Vec<ElementId>,
}

#[derive(Debug, Clone, Copy)]
struct Markers {
    trail: ElementId,
    glitch: ElementId,
}

/// The cursor trail system
pub struct CursorTrail {
    targets: CursorTargets,
    markers: Option<Markers>,
    owner: OwnerToken,
    pointer: Vec2,
    trail: Vec2,
    glitch: Vec2,
    inactivity: Deadline,
    pulse: TimelineSlot,
    hover: TimelineSlot,
    ripples: Vec<(TimelineId, ElementId)>,
}

impl CursorTrail {
    pub fn new(targets: CursorTargets) -> Self {
        Self {
            targets,
            markers: None,
            owner: OwnerToken::new(),
            pointer: Vec2::ZERO,
            trail: Vec2::ZERO,
            glitch: Vec2::ZERO,
            inactivity: Deadline::new(),
            pulse: TimelineSlot::new(),
            hover: TimelineSlot::new(),
            ripples: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.markers.is_some()
    }

    pub fn trail_position(&self) -> Vec2 {
        self.trail
    }

    pub fn glitch_position(&self) -> Vec2 {
        self.glitch
    }

    pub fn trail_marker(&self) -> Option<ElementId> {
        self.markers.map(|m| m.trail)
    }

    pub fn glitch_marker(&self) -> Option<ElementId> {
        self.markers.map(|m| m.glitch)
    }

    fn place(page: &mut Page, id: ElementId, at: Vec2) {
        page.set_property(id, Property::X, at.x);
        page.set_property(id, Property::Y, at.y);
    }

    fn on_move(&mut self, stage: &mut Stage, markers: Markers, x: f32, y: f32) {
        let settings = &stage.config.cursor;
        self.pointer = Vec2::new(x, y);
        self.glitch = if stage.rng.chance(settings.jitter_chance) {
            let r = settings.jitter_radius;
            Vec2::new(
                x + stage.rng.range(-r, r),
                y + stage.rng.range(-r, r),
            )
        } else {
            self.pointer
        };

        let (trail_opacity, glitch_opacity) = (settings.trail_opacity, settings.glitch_opacity);
        self.inactivity.arm(stage.now, settings.inactivity_timeout);
        stage.page.set_property(markers.trail, Property::Opacity, trail_opacity);
        if !self.pulse.is_running(&stage.timelines) {
            stage
                .page
                .set_property(markers.glitch, Property::Opacity, glitch_opacity);
        }
    }

    fn on_press(&mut self, stage: &mut Stage, markers: Markers, x: f32, y: f32) {
        let settings = stage.config.cursor.clone();
        let Some(host) = self.targets.host.filter(|h| stage.page.contains(*h)) else {
            return;
        };
        let ripple = stage.page.create_in(host, "div");
        stage.page.add_class(ripple, "cursor-ripple");
        Self::place(&mut stage.page, ripple, Vec2::new(x, y));
        stage.page.set_property(ripple, Property::Width, 0.0);
        stage.page.set_property(ripple, Property::Height, 0.0);

        let expand = Timeline::new().then(
            Tween::new(ripple, settings.ripple_duration)
                .to(Property::Width, settings.ripple_size)
                .to(Property::Height, settings.ripple_size)
                .to(Property::Opacity, 0.0)
                .ease(Ease::power_out(2)),
        );
        let id = stage.play(expand, TimelineGroup::Transient, self.owner);
        self.ripples.push((id, ripple));

        let pulse = Timeline::new()
            .then(
                Tween::new(markers.glitch, 0.1)
                    .to(Property::Scale, 2.0)
                    .to(Property::Opacity, 1.0)
                    .ease(Ease::Steps(1)),
            )
            .then(
                Tween::new(markers.glitch, 0.2)
                    .to(Property::Scale, 1.0)
                    .to(Property::Opacity, settings.glitch_opacity)
                    .ease(Ease::power_out(2)),
            );
        stage.replace(&mut self.pulse, pulse, TimelineGroup::Transient, self.owner);
    }

    fn on_hover(&mut self, stage: &mut Stage, markers: Markers, element: ElementId, entering: bool) {
        if self.targets.links.contains(&element) {
            let scale = if entering { 1.5 } else { 1.0 };
            for marker in [markers.trail, markers.glitch] {
                if entering {
                    stage.page.add_class(marker, HOT_CLASS);
                } else {
                    stage.page.remove_class(marker, HOT_CLASS);
                }
            }
            let grow = Timeline::new().then(
                Tween::many(vec![markers.trail, markers.glitch], 0.3).to(Property::Scale, scale),
            );
            stage.replace(&mut self.hover, grow, TimelineGroup::Transient, self.owner);
        } else if entering && self.targets.headings.contains(&element) {
            let flicker = Timeline::new()
                .then(
                    Tween::new(markers.glitch, 0.2)
                        .to(Property::Opacity, 0.9)
                        .to(Property::Scale, 2.0)
                        .ease(Ease::Steps(1)),
                )
                .repeat(Repeat::Count(2))
                .yoyo(true);
            stage.replace(&mut self.hover, flicker, TimelineGroup::Transient, self.owner);
        }
    }
}

impl EffectSystem for CursorTrail {
    fn initialize(&mut self, stage: &mut Stage) -> Result<()> {
        let Some(host) = self.targets.host.filter(|h| stage.page.contains(*h)) else {
            tracing::debug!("no cursor host, cursor trail disabled");
            return Ok(());
        };
        if !stage.page.has_fine_pointer() {
            tracing::debug!("coarse pointer, cursor trail disabled");
            return Ok(());
        }
        let page = &mut stage.page;
        let trail = page.create_in(host, "div");
        page.add_class(trail, "cursor-trail");
        let glitch = page.create_in(host, "div");
        page.add_class(glitch, "cursor-glitch");
        self.markers = Some(Markers { trail, glitch });
        self.inactivity
            .arm(stage.now, stage.config.cursor.inactivity_timeout);
        Ok(())
    }

    fn handle_event(&mut self, stage: &mut Stage, event: &PageEvent) -> Result<()> {
        let Some(markers) = self.markers else {
            return Ok(());
        };
        match *event {
            PageEvent::PointerMove { x, y } => self.on_move(stage, markers, x, y),
            PageEvent::PointerDown { x, y } => self.on_press(stage, markers, x, y),
            PageEvent::PointerEnter { element } => self.on_hover(stage, markers, element, true),
            PageEvent::PointerLeave { element } => self.on_hover(stage, markers, element, false),
            _ => {}
        }
        Ok(())
    }

    fn update(&mut self, stage: &mut Stage, _dt: f64) -> Result<()> {
        let Some(markers) = self.markers else {
            return Ok(());
        };
        self.trail = self.trail.approach(self.pointer, stage.config.cursor.smoothing);
        Self::place(&mut stage.page, markers.trail, self.trail);
        Self::place(&mut stage.page, markers.glitch, self.glitch);

        if self.inactivity.fire_if_due(stage.now) {
            stage.page.set_property(markers.trail, Property::Opacity, 0.0);
            stage.page.set_property(markers.glitch, Property::Opacity, 0.0);
        }
        Ok(())
    }

    fn handle_signal(&mut self, stage: &mut Stage, signal: &TimelineSignal) -> Result<()> {
        if let TimelineSignal::Finished { id } = signal {
            if let Some(index) = self.ripples.iter().position(|(tl, _)| tl == id) {
                let (_, ripple) = self.ripples.remove(index);
                stage.page.remove(ripple);
            }
        }
        Ok(())
    }

    fn shutdown(&mut self, stage: &mut Stage) -> Result<()> {
        stage.stop(&mut self.pulse);
        stage.stop(&mut self.hover);
        for (id, ripple) in self.ripples.drain(..) {
            stage.kill(id);
            stage.page.remove(ripple);
        }
        if let Some(m) = self.markers.take() {
            stage.page.remove(m.trail);
            stage.page.remove(m.glitch);
        }
        self.inactivity.cancel();
        Ok(())
    }

    fn name(&self) -> &str {
        "cursor"
    }
}
