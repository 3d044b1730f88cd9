//! The frame loop that drives every effect system
//!
//! Per frame: queued events are applied to the page and delivered, systems
//! update, timelines advance once, and the signals they raise go back to
//! every system. A failing system is logged and skipped; the page keeps
//! running.

use glint_animation::TimelineSignal;
use glint_core::Result;
use glint_runtime::{EffectSystem, EventBus, FrameClock, PageEvent, Stage, Viewport};

/// Owns the stage and the systems acting on it
pub struct Director {
    stage: Stage,
    systems: Vec<Box<dyn EffectSystem>>,
    events: EventBus,
    clock: FrameClock,
    initialized: bool,
    errors: usize,
}

impl Director {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            systems: Vec::new(),
            events: EventBus::new(),
            clock: FrameClock::new(),
            initialized: false,
            errors: 0,
        }
    }

    /// Register a system. Systems added after `initialize` are initialized
    /// on the spot.
    pub fn add_system(&mut self, mut system: Box<dyn EffectSystem>) {
        if self.initialized {
            let result = system.initialize(&mut self.stage);
            self.report(system.name(), "initialize", result);
        }
        self.systems.push(system);
    }

    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        for system in self.systems.iter_mut() {
            let result = system.initialize(&mut self.stage);
            Self::log_failure(&mut self.errors, system.name(), "initialize", result);
        }
        tracing::info!(systems = self.systems.len(), "director initialized");
    }

    /// Queue an event for the next frame
    pub fn push_event(&mut self, event: PageEvent) {
        self.events.push(event);
    }

    /// Advance one frame by `dt` seconds of page time
    pub fn step(&mut self, dt: f64) {
        if !self.initialized {
            self.initialize();
        }
        let dt = self.clock.advance(dt);
        self.run_frame(dt);
    }

    /// Advance one frame from the wall clock
    pub fn tick(&mut self) {
        if !self.initialized {
            self.initialize();
        }
        let dt = self.clock.tick();
        self.run_frame(dt);
    }

    fn run_frame(&mut self, dt: f64) {
        self.stage.now = self.clock.total_time;

        for event in self.events.drain() {
            self.apply(&event);
            for system in self.systems.iter_mut() {
                let result = system.handle_event(&mut self.stage, &event);
                Self::log_failure(&mut self.errors, system.name(), event.name(), result);
            }
        }

        if !self.stage.page.is_visible() {
            return;
        }

        for system in self.systems.iter_mut() {
            let result = system.update(&mut self.stage, dt);
            Self::log_failure(&mut self.errors, system.name(), "update", result);
        }

        let stage = &mut self.stage;
        let signals = stage.timelines.advance(dt, &mut stage.page, &mut stage.rng);
        self.dispatch(&signals);
    }

    fn dispatch(&mut self, signals: &[TimelineSignal]) {
        for signal in signals {
            for system in self.systems.iter_mut() {
                let result = system.handle_signal(&mut self.stage, signal);
                Self::log_failure(&mut self.errors, system.name(), "signal", result);
            }
        }
    }

    /// Keep the page and the motion preference in step with the host
    fn apply(&mut self, event: &PageEvent) {
        let stage = &mut self.stage;
        match *event {
            PageEvent::Scroll { offset } => stage.page.set_scroll_offset(offset),
            PageEvent::Resize { width, height, dpr } => {
                stage.page.set_viewport(Viewport { width, height, dpr });
                stage.motion.set_viewport_width(width);
            }
            PageEvent::ReducedMotionChanged { reduced } => {
                tracing::info!(reduced, "motion preference changed");
                stage.motion.set_reduced_motion(reduced);
            }
            PageEvent::VisibilityChanged { visible } => stage.page.set_visible(visible),
            _ => {}
        }
    }

    fn report(&mut self, system: &str, phase: &str, result: Result<()>) {
        Self::log_failure(&mut self.errors, system, phase, result);
    }

    fn log_failure(errors: &mut usize, system: &str, phase: &str, result: Result<()>) {
        if let Err(e) = result {
            *errors += 1;
            tracing::error!(system, phase, error = %e, "effect system failed");
        }
    }

    /// Shut every system down in reverse registration order, then drop
    /// whatever timelines are left
    pub fn shutdown(&mut self) {
        for system in self.systems.iter_mut().rev() {
            let result = system.shutdown(&mut self.stage);
            Self::log_failure(&mut self.errors, system.name(), "shutdown", result);
        }
        let stage = &mut self.stage;
        stage.timelines.kill_all(&mut stage.page);
        tracing::info!(errors = self.errors, frames = self.clock.frame, "director shut down");
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// System failures logged so far
    pub fn error_count(&self) -> usize {
        self.errors
    }
}
