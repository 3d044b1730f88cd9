//! The particle canvas simulator
//!
//! N point particles drift across a canvas, reflect off its edges and are
//! pushed away from the pointer. A resize regenerates the whole set so no
//! particle ever refers to an old canvas size.

use crate::canvas::{Canvas, DrawList};
use crate::particle::Particle;
use glint_core::config::ParticleSettings;
use glint_core::{EffectRng, ElementId, MotionPreference, Rgba, Vec2};
use glint_runtime::{Page, Viewport};

/// Explicit overrides on top of the configured particle settings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldOptions {
    pub count: Option<usize>,
    pub size: Option<(f32, f32)>,
    pub opacity: Option<f32>,
    pub speed: Option<f32>,
    pub interactive: Option<bool>,
}

/// Settings resolved for the current device class and motion preference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    pub count: usize,
    pub size_min: f32,
    pub size_max: f32,
    /// Opacity ceiling for palette colours without an alpha channel
    pub opacity: f32,
    pub min_speed: f32,
    pub speed: f32,
    pub interactive: bool,
}

impl FieldConfig {
    pub fn resolve(settings: &ParticleSettings, motion: &MotionPreference, options: &FieldOptions) -> Self {
        let reduced = motion.reduced_motion;
        let base = if motion.is_mobile() {
            settings.mobile_count
        } else {
            settings.desktop_count
        };
        let count = options.count.unwrap_or(base);
        let count = if reduced {
            (count as f32 * settings.reduced_count_factor).floor() as usize
        } else {
            count
        };
        let (size_min, size_max) = options.size.unwrap_or((settings.size_min, settings.size_max));

        Self {
            count,
            size_min: size_min.min(size_max),
            size_max: size_max.max(size_min),
            opacity: options.opacity.unwrap_or(if reduced {
                settings.reduced_opacity
            } else {
                settings.opacity
            }),
            min_speed: settings.min_speed,
            speed: options.speed.unwrap_or(if reduced {
                settings.reduced_speed
            } else {
                settings.speed
            }),
            interactive: options.interactive.unwrap_or(!reduced),
        }
    }
}

/// A palette entry and the opacity its text carried, if any
#[derive(Debug, Clone, Copy)]
struct Swatch {
    color: Rgba,
    alpha: Option<f32>,
}

fn parse_palette(palette: &[String]) -> Vec<Swatch> {
    let swatches: Vec<Swatch> = palette
        .iter()
        .filter_map(|text| match Rgba::parse_css(text) {
            Ok((color, has_alpha)) => Some(Swatch {
                color,
                alpha: has_alpha.then_some(color.a),
            }),
            Err(err) => {
                tracing::warn!(%err, "skipping palette colour");
                None
            }
        })
        .collect();
    if swatches.is_empty() {
        vec![Swatch {
            color: Rgba::WHITE,
            alpha: None,
        }]
    } else {
        swatches
    }
}

/// Particle field bound to an optional container element
pub struct ParticleField<C: Canvas = DrawList> {
    container: Option<ElementId>,
    canvas_element: Option<ElementId>,
    surface: Option<C>,
    settings: ParticleSettings,
    options: FieldOptions,
    config: FieldConfig,
    palette: Vec<Swatch>,
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    pointer: Vec2,
    active: bool,
}

impl<C: Canvas> ParticleField<C> {
    /// A field that will draw into `surface` inside `container`.
    ///
    /// A `None` container yields a field that never does anything.
    pub fn new(
        container: Option<ElementId>,
        settings: ParticleSettings,
        options: FieldOptions,
        motion: &MotionPreference,
        surface: C,
    ) -> Self {
        let config = FieldConfig::resolve(&settings, motion, &options);
        let palette = parse_palette(&settings.palette);
        Self {
            container,
            canvas_element: None,
            surface: Some(surface),
            settings,
            options,
            config,
            palette,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            pointer: Vec2::ZERO,
            active: false,
        }
    }

    /// Attach the canvas to the page, size it and seed the particles
    pub fn init(&mut self, page: &mut Page, motion: &MotionPreference, rng: &mut EffectRng) {
        let Some(container) = self.container.filter(|c| page.contains(*c)) else {
            tracing::debug!("particle field has no container, staying idle");
            return;
        };
        if self.active || self.surface.is_none() {
            return;
        }

        let canvas = page.create_in(container, "canvas");
        page.add_class(canvas, "particle-canvas");
        page.set_attribute(canvas, "aria-hidden", "true");
        page.set_attribute(canvas, "role", "presentation");
        self.canvas_element = Some(canvas);
        self.active = true;

        self.resize(page.viewport(), motion, rng);
        tracing::debug!(count = self.particles.len(), "particle field started");
    }

    /// Re-size the surface (device-pixel-ratio aware) and regenerate every particle
    pub fn resize(&mut self, viewport: Viewport, motion: &MotionPreference, rng: &mut EffectRng) {
        if !self.active {
            return;
        }
        self.width = viewport.width.max(0.0);
        self.height = viewport.height.max(0.0);
        let dpr = if viewport.dpr > 0.0 { viewport.dpr } else { 1.0 };
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(
                (self.width * dpr).round() as u32,
                (self.height * dpr).round() as u32,
                dpr,
            );
        }
        self.config = FieldConfig::resolve(&self.settings, motion, &self.options);
        self.create_particles(rng);
    }

    fn create_particles(&mut self, rng: &mut EffectRng) {
        let cfg = self.config;
        self.particles = (0..cfg.count)
            .map(|_| {
                let size = rng.range(cfg.size_min, cfg.size_max);
                let swatch = self.palette[rng.index(self.palette.len())];
                let opacity = swatch
                    .alpha
                    .unwrap_or_else(|| rng.range(0.1, cfg.opacity));
                Particle {
                    position: Vec2::new(rng.range(0.0, self.width), rng.range(0.0, self.height)),
                    direction: Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0)),
                    speed: rng.range(cfg.min_speed, cfg.speed),
                    size,
                    rest_size: size,
                    color: swatch.color,
                    opacity,
                }
            })
            .collect();
    }

    /// React to a reduced-motion change without regenerating particles
    pub fn update_settings(&mut self, motion: &MotionPreference, rng: &mut EffectRng) {
        let reduced = motion.reduced_motion;
        self.config = FieldConfig::resolve(&self.settings, motion, &self.options);
        let ceiling = if reduced {
            self.settings.reduced_refreshed_opacity
        } else {
            self.settings.refreshed_opacity
        };
        for p in &mut self.particles {
            p.opacity = rng.range(0.1, ceiling);
            p.speed = rng.range(self.config.min_speed, self.config.speed);
            if !self.config.interactive {
                p.size = p.rest_size;
            }
        }
        tracing::debug!(reduced, "particle settings refreshed");
    }

    /// Last known pointer position in viewport coordinates
    pub fn set_pointer(&mut self, position: Vec2) {
        self.pointer = position;
    }

    /// Advance every particle by one frame
    pub fn step(&mut self) {
        if !self.active {
            return;
        }
        let (w, h) = (self.width, self.height);
        let radius = self.settings.interaction_radius;
        let push = self.settings.push_strength;
        let boost = self.settings.size_boost;
        let interactive = self.config.interactive;
        let pointer = self.pointer;

        for p in &mut self.particles {
            p.position += p.direction * p.speed;
            reflect(&mut p.position.x, &mut p.direction.x, w);
            reflect(&mut p.position.y, &mut p.direction.y, h);

            if !interactive {
                continue;
            }
            let d = p.position - pointer;
            let distance = d.length();
            if distance < radius && radius > 0.0 {
                let force = (radius - distance) / radius;
                p.position += d * (force * push);
                p.position.x = p.position.x.clamp(0.0, w);
                p.position.y = p.position.y.clamp(0.0, h);
                p.size = p.rest_size * (1.0 + force * boost);
            } else {
                p.size = p.rest_size;
            }
        }
    }

    /// Clear the surface and paint every particle with a glow
    pub fn render(&mut self) {
        if !self.active {
            return;
        }
        let glow = self.settings.glow_factor;
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.clear();
        for p in &self.particles {
            surface.fill_circle(p.position, p.size, p.fill(), p.size * glow);
        }
    }

    /// One display refresh: step then render
    pub fn frame(&mut self) {
        self.step();
        self.render();
    }

    /// Stop, detach the canvas and drop every particle. Safe to call twice.
    pub fn destroy(&mut self, page: &mut Page) {
        if let Some(canvas) = self.canvas_element.take() {
            page.remove(canvas);
            tracing::debug!("particle field destroyed");
        }
        self.active = false;
        self.particles.clear();
        self.surface = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Surface size in CSS pixels
    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn canvas_element(&self) -> Option<ElementId> {
        self.canvas_element
    }

    pub fn surface(&self) -> Option<&C> {
        self.surface.as_ref()
    }
}

/// Mirror a coordinate back inside `[0, max]`, pointing its heading inward
fn reflect(pos: &mut f32, dir: &mut f32, max: f32) {
    if *pos < 0.0 {
        *pos = -*pos;
        *dir = dir.abs();
    } else if *pos > max {
        *pos = 2.0 * max - *pos;
        *dir = -dir.abs();
    }
    // A step longer than the whole extent can still land outside
    *pos = pos.clamp(0.0, max.max(0.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::EffectConfig;

    fn motion(reduced: bool, width: f32) -> MotionPreference {
        MotionPreference::new(&EffectConfig::default(), reduced, width)
    }

    fn field_on(page: &mut Page, reduced: bool) -> (ParticleField, MotionPreference) {
        let container = page.root();
        let m = motion(reduced, page.viewport().width);
        let mut field = ParticleField::new(
            Some(container),
            ParticleSettings::default(),
            FieldOptions::default(),
            &m,
            DrawList::new(),
        );
        field.init(page, &m, &mut EffectRng::new(11));
        (field, m)
    }

    #[test]
    fn init_attaches_canvas_and_seeds() {
        let mut page = Page::new(Viewport::default());
        let (field, _) = field_on(&mut page, false);
        assert_eq!(field.len(), 60);
        let canvas = field.canvas_element().unwrap();
        assert!(page.has_class(canvas, "particle-canvas"));
        assert_eq!(page.attribute(canvas, "aria-hidden"), Some("true"));
        assert_eq!(field.surface().unwrap().width_px, 1280);
    }

    #[test]
    fn dpr_scales_backing_size() {
        let mut page = Page::new(Viewport {
            width: 400.0,
            height: 300.0,
            dpr: 2.0,
        });
        let (field, _) = field_on(&mut page, false);
        let surface = field.surface().unwrap();
        assert_eq!((surface.width_px, surface.height_px), (800, 600));
        assert_eq!(field.bounds(), (400.0, 300.0));
        assert_eq!(field.len(), 30);
    }

    #[test]
    fn missing_container_is_noop() {
        let mut page = Page::new(Viewport::default());
        let m = motion(false, 1280.0);
        let mut field: ParticleField = ParticleField::new(
            None,
            ParticleSettings::default(),
            FieldOptions::default(),
            &m,
            DrawList::new(),
        );
        field.init(&mut page, &m, &mut EffectRng::new(1));
        field.frame();
        assert!(!field.is_active());
        assert!(field.is_empty());
        assert_eq!(page.element_count(), 1);
    }

    #[test]
    fn opacity_comes_from_palette_alpha() {
        let mut page = Page::new(Viewport::default());
        let (field, _) = field_on(&mut page, false);
        for p in field.particles() {
            assert!([0.7, 0.5, 0.3, 0.8].iter().any(|a| (p.opacity - a).abs() < 1e-6));
        }
    }

    #[test]
    fn opaque_palette_draws_random_opacity() {
        let mut page = Page::new(Viewport::default());
        let m = motion(false, 1280.0);
        let settings = ParticleSettings {
            palette: vec!["#ffffff".into()],
            ..ParticleSettings::default()
        };
        let mut field: ParticleField =
            ParticleField::new(Some(page.root()), settings, FieldOptions::default(), &m, DrawList::new());
        field.init(&mut page, &m, &mut EffectRng::new(4));
        for p in field.particles() {
            assert!((0.1..0.6).contains(&p.opacity));
        }
    }

    #[test]
    fn pointer_pushes_and_grows_nearby_particles() {
        let mut page = Page::new(Viewport::default());
        let (mut field, _) = field_on(&mut page, false);
        field.particles = vec![Particle {
            position: Vec2::new(110.0, 100.0),
            direction: Vec2::ZERO,
            speed: 0.0,
            size: 2.0,
            rest_size: 2.0,
            color: Rgba::WHITE,
            opacity: 0.5,
        }];
        field.set_pointer(Vec2::new(100.0, 100.0));
        field.step();
        let p = &field.particles()[0];
        // force = 0.9, push = 10 * 0.9 * 0.02
        assert!((p.position.x - 110.18).abs() < 1e-4);
        assert!((p.size - 2.0 * (1.0 + 0.9 * 0.5)).abs() < 1e-5);

        field.set_pointer(Vec2::new(900.0, 700.0));
        field.step();
        assert_eq!(field.particles()[0].size, 2.0);
    }

    #[test]
    fn reduced_motion_disables_interaction() {
        let mut page = Page::new(Viewport::default());
        let (field, _) = field_on(&mut page, true);
        assert!(!field.config().interactive);
        assert_eq!(field.len(), 30);
        assert!(field.config().speed <= 0.5);
    }

    #[test]
    fn update_settings_keeps_particles() {
        let mut page = Page::new(Viewport::default());
        let (mut field, _) = field_on(&mut page, false);
        let before = field.len();
        let reduced = motion(true, 1280.0);
        field.update_settings(&reduced, &mut EffectRng::new(3));
        assert_eq!(field.len(), before);
        assert!(!field.config().interactive);
        for p in field.particles() {
            assert!(p.opacity < 0.3);
            assert!(p.speed < 0.5);
        }
    }

    #[test]
    fn render_draws_every_particle_with_glow() {
        let mut page = Page::new(Viewport::default());
        let (mut field, _) = field_on(&mut page, false);
        field.frame();
        let surface = field.surface().unwrap();
        assert_eq!(surface.circles.len(), field.len());
        for c in &surface.circles {
            assert!((c.blur() - c.radius() * 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn destroy_twice_leaves_nothing() {
        let mut page = Page::new(Viewport::default());
        let (mut field, _) = field_on(&mut page, false);
        let canvas = field.canvas_element().unwrap();
        field.destroy(&mut page);
        field.destroy(&mut page);
        assert!(field.is_empty());
        assert!(field.surface().is_none());
        assert!(!page.contains(canvas));
        assert!(!field.is_active());
    }

    #[test]
    fn reflect_stays_inside() {
        let (mut x, mut d) = (-3.0, -1.0);
        reflect(&mut x, &mut d, 100.0);
        assert_eq!((x, d), (3.0, 1.0));
        let (mut x, mut d) = (104.0, 1.0);
        reflect(&mut x, &mut d, 100.0);
        assert_eq!((x, d), (96.0, -1.0));
        let (mut x, mut d) = (250.0, 1.0);
        reflect(&mut x, &mut d, 100.0);
        assert_eq!(x, 0.0);
    }
}
