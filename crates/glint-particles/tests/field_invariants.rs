//! Property-based invariant tests for the particle field.
//!
//! 1. Every particle stays inside the surface after any number of steps,
//!    with or without pointer interaction.
//! 2. After a resize the particle count equals the target for the new
//!    device class.
//! 3. Reduced motion never yields more particles or faster particles than
//!    full motion for identical inputs.
//! 4. Destroy is idempotent and leaves nothing behind.

use glint_core::config::ParticleSettings;
use glint_core::{EffectConfig, EffectRng, MotionPreference, Vec2};
use glint_particles::{DrawList, FieldConfig, FieldOptions, ParticleField};
use glint_runtime::{Page, Viewport};
use proptest::prelude::*;

fn viewport_strategy() -> impl Strategy<Value = Viewport> {
    (0.0f32..2560.0, 0.0f32..1600.0, prop_oneof![Just(1.0f32), Just(1.5), Just(2.0), Just(3.0)])
        .prop_map(|(width, height, dpr)| Viewport { width, height, dpr })
}

fn motion(reduced: bool, width: f32) -> MotionPreference {
    MotionPreference::new(&EffectConfig::default(), reduced, width)
}

fn field(page: &mut Page, reduced: bool, options: FieldOptions, seed: u32) -> ParticleField {
    let m = motion(reduced, page.viewport().width);
    let mut field = ParticleField::new(
        Some(page.root()),
        ParticleSettings::default(),
        options,
        &m,
        DrawList::new(),
    );
    field.init(page, &m, &mut EffectRng::new(seed));
    field
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Positions stay within bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn positions_stay_in_bounds(
        viewport in viewport_strategy(),
        count in 0usize..120,
        speed in 0.1f32..400.0,
        steps in 1usize..200,
        pointer in (-200.0f32..3000.0, -200.0f32..2000.0),
        seed in 1u32..u32::MAX,
    ) {
        let mut page = Page::new(viewport);
        let options = FieldOptions {
            count: Some(count),
            speed: Some(speed),
            interactive: Some(true),
            ..FieldOptions::default()
        };
        let mut field = field(&mut page, false, options, seed);
        field.set_pointer(Vec2::new(pointer.0, pointer.1));
        let (w, h) = field.bounds();

        for _ in 0..steps {
            field.step();
            for p in field.particles() {
                prop_assert!(
                    (0.0..=w).contains(&p.position.x) && (0.0..=h).contains(&p.position.y),
                    "particle escaped to {:?} in {}x{}",
                    p.position, w, h
                );
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Resize regenerates to the device-class target
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resize_count_matches_device_class(
        first in viewport_strategy(),
        second in viewport_strategy(),
        reduced in any::<bool>(),
    ) {
        let mut page = Page::new(first);
        let mut field = field(&mut page, reduced, FieldOptions::default(), 5);

        let m = motion(reduced, second.width);
        field.resize(second, &m, &mut EffectRng::new(9));

        let settings = ParticleSettings::default();
        let base = if second.width < 768.0 { settings.mobile_count } else { settings.desktop_count };
        let expected = if reduced {
            (base as f32 * settings.reduced_count_factor).floor() as usize
        } else {
            base
        };
        prop_assert_eq!(field.len(), expected);
        prop_assert_eq!(field.bounds(), (second.width, second.height));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Reduced motion is never more than full motion
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reduced_motion_is_monotone(width in 0.0f32..3000.0, count in proptest::option::of(0usize..500)) {
        let settings = ParticleSettings::default();
        let options = FieldOptions { count, ..FieldOptions::default() };
        let full = FieldConfig::resolve(&settings, &motion(false, width), &options);
        let reduced = FieldConfig::resolve(&settings, &motion(true, width), &options);
        prop_assert!(reduced.count <= full.count);
        prop_assert!(reduced.speed <= full.speed);
        prop_assert!(reduced.opacity <= full.opacity);

        let config = EffectConfig::default();
        for d in [config.durations.ultra_fast, config.durations.fast, config.durations.slow] {
            prop_assert!(motion(true, width).duration(d) <= motion(false, width).duration(d));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Destroy is idempotent
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn destroy_twice_is_clean() {
    let mut page = Page::new(Viewport::default());
    let mut field = field(&mut page, false, FieldOptions::default(), 2);
    let before = page.element_count();
    field.destroy(&mut page);
    field.destroy(&mut page);
    assert_eq!(field.len(), 0);
    assert!(field.canvas_element().is_none());
    assert_eq!(page.element_count(), before - 1);
    field.frame();
    assert_eq!(field.len(), 0);
}
