//! Reduced-motion preference and device-class scaling

use crate::config::{AccessibilityConfig, DeviceConfig, DurationTable, EffectConfig};

/// The environment signals that scale every effect: the user's
/// reduced-motion preference and the current viewport width.
///
/// Read when an effect initializes and updated on change notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPreference {
    pub reduced_motion: bool,
    pub viewport_width: f32,
    device: DeviceConfig,
    accessibility: AccessibilityConfig,
}

impl MotionPreference {
    pub fn new(config: &EffectConfig, reduced_motion: bool, viewport_width: f32) -> Self {
        Self {
            reduced_motion,
            viewport_width,
            device: config.device.clone(),
            accessibility: config.accessibility.clone(),
        }
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    pub fn is_mobile(&self) -> bool {
        self.viewport_width < self.device.mobile_width
    }

    /// Decorative particle count for the current device class
    pub fn particle_count(&self) -> usize {
        if self.is_mobile() {
            self.device.mobile_particles
        } else {
            self.device.desktop_particles
        }
    }

    /// Duration adjusted for the reduced-motion preference (capped when reduced)
    pub fn duration(&self, seconds: f64) -> f64 {
        if self.reduced_motion {
            (seconds * self.accessibility.reduced_duration_factor)
                .min(self.accessibility.reduced_duration_cap)
        } else {
            seconds
        }
    }

    /// Travel distance adjusted for the reduced-motion preference
    pub fn distance(&self, px: f32) -> f32 {
        if self.reduced_motion {
            px * self.accessibility.reduced_distance_factor
        } else {
            px
        }
    }

    /// Duration adjusted for the device class
    pub fn device_duration(&self, seconds: f64) -> f64 {
        if self.is_mobile() {
            seconds * self.device.mobile_duration_scale
        } else {
            seconds
        }
    }

    /// Stagger adjusted for the device class
    pub fn device_stagger(&self, seconds: f64) -> f64 {
        if self.is_mobile() {
            seconds * self.device.mobile_stagger_scale
        } else {
            seconds
        }
    }

    /// The named durations as they should actually play: scaled for the
    /// device class, then shortened for reduced motion
    pub fn durations(&self, table: &DurationTable) -> DurationTable {
        let adjust = |seconds: f64| self.duration(self.device_duration(seconds));
        DurationTable {
            ultra_fast: adjust(table.ultra_fast),
            fast: adjust(table.fast),
            medium: adjust(table.medium),
            slow: adjust(table.slow),
            extra_slow: adjust(table.extra_slow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pref(reduced: bool, width: f32) -> MotionPreference {
        MotionPreference::new(&EffectConfig::default(), reduced, width)
    }

    #[test]
    fn mobile_threshold_is_exclusive() {
        assert!(pref(false, 767.0).is_mobile());
        assert!(!pref(false, 768.0).is_mobile());
    }

    #[test]
    fn particle_count_follows_device_class() {
        assert_eq!(pref(false, 1280.0).particle_count(), 100);
        assert_eq!(pref(false, 400.0).particle_count(), 50);
    }

    #[test]
    fn reduced_duration_is_halved_and_capped() {
        let p = pref(true, 1280.0);
        assert!((p.duration(0.4) - 0.2).abs() < 1e-9);
        assert!((p.duration(1.2) - 0.3).abs() < 1e-9);
        assert_eq!(pref(false, 1280.0).duration(1.2), 1.2);
    }

    #[test]
    fn reduced_never_exceeds_full() {
        let full = pref(false, 1280.0);
        let reduced = pref(true, 1280.0);
        for d in [0.0, 0.05, 0.1, 0.4, 0.8, 1.2, 10.0] {
            assert!(reduced.duration(d) <= full.duration(d));
        }
        assert!(reduced.distance(30.0) <= full.distance(30.0));
    }

    #[test]
    fn device_scaling_only_on_mobile() {
        assert!((pref(false, 400.0).device_duration(1.0) - 0.8).abs() < 1e-9);
        assert!((pref(false, 400.0).device_stagger(1.0) - 0.7).abs() < 1e-9);
        assert_eq!(pref(false, 1000.0).device_duration(1.0), 1.0);
    }

    #[test]
    fn duration_table_follows_device_and_preference() {
        let table = DurationTable::default();
        let desktop = pref(false, 1280.0).durations(&table);
        assert_eq!(desktop, table);

        let mobile = pref(false, 400.0).durations(&table);
        assert!((mobile.slow - 0.64).abs() < 1e-9);
        assert!((mobile.fast - 0.16).abs() < 1e-9);

        let reduced = pref(true, 400.0).durations(&table);
        assert!((reduced.fast - 0.08).abs() < 1e-9);
        assert_eq!(reduced.extra_slow, 0.3);
    }
}
