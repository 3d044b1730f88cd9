//! The static configuration table: durations, eases, staggers, presets,
//! device/accessibility scaling and every tuning constant the effects use.
//!
//! Every section and field is defaulted, so a TOML file only needs to name
//! the values it overrides:
//!
//! ```toml
//! [durations]
//! slow = 1.0
//!
//! [glitch]
//! scroll_glitch_cooldown = 2.0
//! ```

use crate::ease::Ease;
use crate::error::{GlintError, Result};
use crate::property::Property;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level effect configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub durations: DurationTable,
    pub eases: EaseTable,
    pub stagger: StaggerTable,
    pub device: DeviceConfig,
    pub accessibility: AccessibilityConfig,
    pub particles: ParticleSettings,
    pub splash: SplashSettings,
    pub cursor: CursorSettings,
    pub glitch: GlitchTuning,
    pub easter_egg: EasterEggSettings,
}

/// Named durations in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationTable {
    /// Immediate feedback
    pub ultra_fast: f64,
    pub fast: f64,
    pub medium: f64,
    /// Emphasis animations
    pub slow: f64,
    pub extra_slow: f64,
}

impl Default for DurationTable {
    fn default() -> Self {
        Self {
            ultra_fast: 0.1,
            fast: 0.2,
            medium: 0.4,
            slow: 0.8,
            extra_slow: 1.2,
        }
    }
}

/// Named easing curves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaseTable {
    pub smooth: Ease,
    pub smooth_in_out: Ease,
    pub bounce: Ease,
    pub elastic: Ease,
    pub strong: Ease,
    pub strong_in_out: Ease,
    pub expo: Ease,
    pub expo_in_out: Ease,
    pub brand_bounce: Ease,
}

impl Default for EaseTable {
    fn default() -> Self {
        use crate::ease::EaseDirection;
        Self {
            smooth: Ease::power_out(2),
            smooth_in_out: Ease::power_in_out(2),
            bounce: Ease::Back {
                direction: EaseDirection::Out,
                overshoot: 1.7,
            },
            elastic: Ease::ElasticOut {
                amplitude: 1.2,
                period: 0.5,
            },
            strong: Ease::power_out(3),
            strong_in_out: Ease::power_in_out(3),
            expo: Ease::Expo(EaseDirection::Out),
            expo_in_out: Ease::Expo(EaseDirection::InOut),
            brand_bounce: Ease::Back {
                direction: EaseDirection::Out,
                overshoot: 2.0,
            },
        }
    }
}

/// Delay between consecutive elements of a group, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerTable {
    pub fast: f64,
    pub medium: f64,
    pub slow: f64,
}

impl Default for StaggerTable {
    fn default() -> Self {
        Self {
            fast: 0.05,
            medium: 0.1,
            slow: 0.15,
        }
    }
}

/// Device-class scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Viewports narrower than this (CSS px) count as mobile
    pub mobile_width: f32,
    /// Decorative particle count on desktop
    pub desktop_particles: usize,
    /// Decorative particle count on mobile
    pub mobile_particles: usize,
    pub mobile_duration_scale: f64,
    pub mobile_stagger_scale: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mobile_width: 768.0,
            desktop_particles: 100,
            mobile_particles: 50,
            mobile_duration_scale: 0.8,
            mobile_stagger_scale: 0.7,
        }
    }
}

/// Reduced-motion scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    pub reduced_duration_factor: f64,
    /// Upper bound on any duration under reduced motion
    pub reduced_duration_cap: f64,
    pub reduced_distance_factor: f32,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            reduced_duration_factor: 0.5,
            reduced_duration_cap: 0.3,
            reduced_distance_factor: 0.5,
        }
    }
}

/// Knobs of the particle canvas simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub desktop_count: usize,
    pub mobile_count: usize,
    /// Fraction of the count kept under reduced motion
    pub reduced_count_factor: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub opacity: f32,
    pub reduced_opacity: f32,
    /// Opacity ceiling used when the motion preference changes at runtime
    pub refreshed_opacity: f32,
    pub reduced_refreshed_opacity: f32,
    /// Upper bound of the per-frame speed (px/frame)
    pub speed: f32,
    pub reduced_speed: f32,
    pub min_speed: f32,
    pub interaction_radius: f32,
    pub push_strength: f32,
    pub size_boost: f32,
    pub glow_factor: f32,
    /// Seconds a resize must settle before particles regenerate
    pub resize_debounce: f64,
    pub palette: Vec<String>,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            desktop_count: 60,
            mobile_count: 30,
            reduced_count_factor: 0.5,
            size_min: 1.0,
            size_max: 3.0,
            opacity: 0.6,
            reduced_opacity: 0.4,
            refreshed_opacity: 0.5,
            reduced_refreshed_opacity: 0.3,
            speed: 1.0,
            reduced_speed: 0.5,
            min_speed: 0.1,
            interaction_radius: 100.0,
            push_strength: 0.02,
            size_boost: 0.5,
            glow_factor: 2.0,
            resize_debounce: 0.2,
            palette: vec![
                "rgba(255, 255, 255, 0.7)".into(),
                "rgba(255, 255, 255, 0.5)".into(),
                "rgba(255, 255, 255, 0.3)".into(),
                "rgba(255, 255, 255, 0.8)".into(),
            ],
        }
    }
}

/// Splash screen timing and decoration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashSettings {
    /// Shortest time the splash stays visible, in seconds
    pub min_display: f64,
    /// Fires the exit path if the page never reports load; `None` disables it
    pub fallback_timeout: Option<f64>,
    /// Force-removes the splash regardless of animation state
    pub safety_timeout: f64,
    pub desktop_orbs: usize,
    pub mobile_orbs: usize,
    pub desktop_minimal_particles: usize,
    pub mobile_minimal_particles: usize,
    pub flash_opacity: f32,
    pub palette: Vec<String>,
}

impl Default for SplashSettings {
    fn default() -> Self {
        Self {
            min_display: 2.0,
            fallback_timeout: Some(3.0),
            safety_timeout: 5.0,
            desktop_orbs: 8,
            mobile_orbs: 4,
            desktop_minimal_particles: 20,
            mobile_minimal_particles: 10,
            flash_opacity: 0.3,
            palette: vec![
                "rgba(141, 141, 141, 0.7)".into(),
                "rgba(141, 141, 141, 0.4)".into(),
                "rgba(176, 176, 176, 0.7)".into(),
                "rgba(176, 176, 176, 0.4)".into(),
                "rgba(74, 74, 74, 0.5)".into(),
            ],
        }
    }
}

/// Cursor trail behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorSettings {
    /// Fraction of the remaining gap the trail closes each frame
    pub smoothing: f32,
    pub jitter_chance: f32,
    pub jitter_radius: f32,
    pub trail_opacity: f32,
    pub glitch_opacity: f32,
    pub inactivity_timeout: f64,
    pub ripple_size: f32,
    pub ripple_duration: f64,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.1,
            jitter_chance: 0.1,
            jitter_radius: 10.0,
            trail_opacity: 0.5,
            glitch_opacity: 0.7,
            inactivity_timeout: 3.0,
            ripple_size: 50.0,
            ripple_duration: 0.6,
        }
    }
}

/// Rate limits for the disruptive glitch effects.
///
/// These are tuning constants; chances are per opportunity (per scroll
/// event or per interval tick), cooldowns and intervals are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchTuning {
    pub progress_flash_chance: f32,
    pub scroll_glitch_cooldown: f64,
    pub scroll_glitch_bands: Vec<f32>,
    pub scroll_glitch_band_width: f32,
    pub scroll_glitch_chance: f32,
    pub scroll_glitch_shift: f32,
    pub rgb_split_cooldown: f64,
    pub rgb_split_velocity: f32,
    pub grid_flare_speed: f32,
    pub footer_interval: f64,
    pub footer_chance: f32,
    pub footer_char_chance: f32,
    pub smiley_interval: f64,
    pub smiley_chance: f32,
    pub stream_interval: f64,
    pub stream_chance: f32,
    pub logo_interval: f64,
    pub logo_reduced_interval: f64,
    pub logo_chance: f32,
    pub title_repeat_delay: f64,
    /// Applied to the title glitch repeat delay once the easter egg has fired
    pub haunted_delay_factor: f64,
    /// Opacity the background gradient breathes down to
    pub gradient_breath_opacity: f32,
    /// Seconds for one half of a gradient breath
    pub gradient_breath_duration: f64,
    /// Range the haunted subtitle glitch pause is drawn from
    pub subtitle_delay_min: f64,
    pub subtitle_delay_max: f64,
    pub subtitle_burst_interval: f64,
    pub subtitle_burst_chance: f32,
    /// Flickers laid out on one pass of the CRT loop
    pub crt_flickers: usize,
    pub crt_cluster_chance: f32,
    pub tear_interval: f64,
    pub tear_chance: f32,
}

impl Default for GlitchTuning {
    fn default() -> Self {
        Self {
            progress_flash_chance: 0.02,
            scroll_glitch_cooldown: 1.0,
            scroll_glitch_bands: vec![0.25, 0.5, 0.75],
            scroll_glitch_band_width: 0.005,
            scroll_glitch_chance: 0.002,
            scroll_glitch_shift: 20.0,
            rgb_split_cooldown: 0.5,
            rgb_split_velocity: 1.5,
            grid_flare_speed: 15.0,
            footer_interval: 3.0,
            footer_chance: 0.1,
            footer_char_chance: 0.2,
            smiley_interval: 5.0,
            smiley_chance: 0.3,
            stream_interval: 8.0,
            stream_chance: 0.1,
            logo_interval: 2.0,
            logo_reduced_interval: 5.0,
            logo_chance: 0.2,
            title_repeat_delay: 4.0,
            haunted_delay_factor: 0.95,
            gradient_breath_opacity: 0.3,
            gradient_breath_duration: 4.0,
            subtitle_delay_min: 8.0,
            subtitle_delay_max: 15.0,
            subtitle_burst_interval: 12.0,
            subtitle_burst_chance: 0.15,
            crt_flickers: 8,
            crt_cluster_chance: 0.3,
            tear_interval: 5.0,
            tear_chance: 0.1,
        }
    }
}

/// Hidden sequence triggered by repeated logo clicks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasterEggSettings {
    pub click_threshold: u32,
    pub first_duration: f64,
    pub repeat_duration: f64,
    pub first_title: String,
    pub repeat_text: String,
    pub first_jitter_period: f64,
    pub repeat_jitter_period: f64,
    pub subtitles: Vec<String>,
    pub dialogue: Vec<String>,
}

impl Default for EasterEggSettings {
    fn default() -> Self {
        Self {
            click_threshold: 5,
            first_duration: 3.0,
            repeat_duration: 1.0,
            first_title: "Stop that.".into(),
            repeat_text: "NO NO NO NO".into(),
            first_jitter_period: 0.08,
            repeat_jitter_period: 0.1,
            subtitles: vec![
                "The signal was never yours.".into(),
                "Every click is logged somewhere.".into(),
                "You were asked politely.".into(),
            ],
            dialogue: vec![
                "[static]".into(),
                "who is still listening?".into(),
                "connection held. meaning dropped.".into(),
            ],
        }
    }
}

/// Which canned preset to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetKind {
    FadeIn,
    FadeInUp,
    FadeInDown,
    FadeInLeft,
    FadeInRight,
    ScaleIn,
    ButtonHover,
    ButtonActive,
}

/// Whether a preset's values are the starting or the ending state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetMode {
    From,
    To,
}

/// Per-call overrides for a preset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PresetOptions {
    pub duration: Option<f64>,
    pub ease: Option<Ease>,
    pub distance: Option<f32>,
    pub scale: Option<f32>,
}

/// A resolved preset: property values plus timing
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub mode: PresetMode,
    pub values: Vec<(Property, f32)>,
    pub duration: f64,
    pub ease: Ease,
}

impl EffectConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EffectConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GlintError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded effect configuration");
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would make the effects misbehave
    pub fn validate(&self) -> Result<()> {
        let p = &self.particles;
        if p.size_min > p.size_max {
            return Err(GlintError::ConfigError(format!(
                "particles.size_min ({}) exceeds size_max ({})",
                p.size_min, p.size_max
            )));
        }
        if p.palette.is_empty() {
            return Err(GlintError::ConfigError("particles.palette is empty".into()));
        }
        if !(0.0..=1.0).contains(&p.reduced_count_factor) {
            return Err(GlintError::ConfigError(format!(
                "particles.reduced_count_factor must be within [0, 1], got {}",
                p.reduced_count_factor
            )));
        }
        let s = &self.splash;
        if s.safety_timeout < s.min_display {
            return Err(GlintError::ConfigError(format!(
                "splash.safety_timeout ({}) is shorter than min_display ({})",
                s.safety_timeout, s.min_display
            )));
        }
        if !(0.0..=1.0).contains(&self.cursor.smoothing) {
            return Err(GlintError::ConfigError(format!(
                "cursor.smoothing must be within [0, 1], got {}",
                self.cursor.smoothing
            )));
        }
        let g = &self.glitch;
        if g.subtitle_delay_max < g.subtitle_delay_min {
            return Err(GlintError::ConfigError(format!(
                "glitch.subtitle_delay_max ({}) is below subtitle_delay_min ({})",
                g.subtitle_delay_max, g.subtitle_delay_min
            )));
        }
        if self.easter_egg.click_threshold == 0 {
            return Err(GlintError::ConfigError(
                "easter_egg.click_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Build one of the canned presets
    pub fn preset(&self, kind: PresetKind, options: PresetOptions) -> Preset {
        let d = &self.durations;
        let e = &self.eases;
        let distance = |default: f32| options.distance.unwrap_or(default);

        let (mode, values, duration, ease) = match kind {
            PresetKind::FadeIn => (
                PresetMode::From,
                vec![(Property::Opacity, 0.0)],
                d.medium,
                e.smooth,
            ),
            PresetKind::FadeInUp => (
                PresetMode::From,
                vec![(Property::Opacity, 0.0), (Property::Y, distance(20.0))],
                d.medium,
                e.smooth,
            ),
            PresetKind::FadeInDown => (
                PresetMode::From,
                vec![(Property::Opacity, 0.0), (Property::Y, distance(-20.0))],
                d.medium,
                e.smooth,
            ),
            PresetKind::FadeInLeft => (
                PresetMode::From,
                vec![(Property::Opacity, 0.0), (Property::X, distance(-20.0))],
                d.medium,
                e.smooth,
            ),
            PresetKind::FadeInRight => (
                PresetMode::From,
                vec![(Property::Opacity, 0.0), (Property::X, distance(20.0))],
                d.medium,
                e.smooth,
            ),
            PresetKind::ScaleIn => (
                PresetMode::From,
                vec![
                    (Property::Opacity, 0.0),
                    (Property::Scale, options.scale.unwrap_or(0.9)),
                ],
                d.medium,
                e.bounce,
            ),
            PresetKind::ButtonHover => (
                PresetMode::To,
                vec![(Property::Scale, options.scale.unwrap_or(1.02))],
                d.fast,
                e.smooth,
            ),
            PresetKind::ButtonActive => (
                PresetMode::To,
                vec![(Property::Scale, options.scale.unwrap_or(0.98))],
                d.ultra_fast,
                e.smooth,
            ),
        };

        Preset {
            mode,
            values,
            duration: options.duration.unwrap_or(duration),
            ease: options.ease.unwrap_or(ease),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EffectConfig::default();
        config.validate().unwrap();
        assert_eq!(config.durations.slow, 0.8);
        assert_eq!(config.splash.min_display, 2.0);
        assert_eq!(config.splash.safety_timeout, 5.0);
        assert_eq!(config.device.mobile_width, 768.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml_str = r#"
[durations]
slow = 1.0

[eases]
smooth = "expo.out"

[glitch]
scroll_glitch_cooldown = 2.5
"#;
        let config = EffectConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.durations.slow, 1.0);
        assert_eq!(config.durations.fast, 0.2);
        assert_eq!(config.eases.smooth.to_string(), "expo.out");
        assert_eq!(config.glitch.scroll_glitch_cooldown, 2.5);
        assert_eq!(config.glitch.rgb_split_cooldown, 0.5);
    }

    #[test]
    fn invalid_ease_is_a_parse_error() {
        let err = EffectConfig::from_toml_str("[eases]\nsmooth = \"wobble\"\n").unwrap_err();
        assert!(matches!(err, GlintError::TomlParseError(_)));
    }

    #[test]
    fn validation_rejects_inverted_size_range() {
        let toml_str = "[particles]\nsize_min = 5.0\nsize_max = 1.0\n";
        let err = EffectConfig::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, GlintError::ConfigError(_)));
    }

    #[test]
    fn validation_rejects_short_safety_net() {
        let toml_str = "[splash]\nmin_display = 4.0\nsafety_timeout = 3.0\n";
        assert!(EffectConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn validation_rejects_inverted_subtitle_delay() {
        let toml_str = "[glitch]\nsubtitle_delay_min = 9.0\nsubtitle_delay_max = 2.0\n";
        assert!(EffectConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let config = EffectConfig::default();
        let text = config.to_toml_string().unwrap();
        let back = EffectConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn fade_in_up_preset_defaults() {
        let config = EffectConfig::default();
        let preset = config.preset(PresetKind::FadeInUp, PresetOptions::default());
        assert_eq!(preset.mode, PresetMode::From);
        assert_eq!(
            preset.values,
            vec![(Property::Opacity, 0.0), (Property::Y, 20.0)]
        );
        assert_eq!(preset.duration, 0.4);
        assert_eq!(preset.ease, config.eases.smooth);
    }

    #[test]
    fn preset_overrides_apply() {
        let config = EffectConfig::default();
        let preset = config.preset(
            PresetKind::ScaleIn,
            PresetOptions {
                duration: Some(1.5),
                scale: Some(0.5),
                ..Default::default()
            },
        );
        assert_eq!(preset.duration, 1.5);
        assert!(preset.values.contains(&(Property::Scale, 0.5)));
        assert_eq!(preset.ease, config.eases.bounce);
    }

    #[test]
    fn explicit_zero_distance_is_honoured() {
        let config = EffectConfig::default();
        let preset = config.preset(
            PresetKind::FadeInLeft,
            PresetOptions {
                distance: Some(0.0),
                ..Default::default()
            },
        );
        assert!(preset.values.contains(&(Property::X, 0.0)));
    }

    #[test]
    fn button_presets_are_targets() {
        let config = EffectConfig::default();
        let hover = config.preset(PresetKind::ButtonHover, PresetOptions::default());
        let active = config.preset(PresetKind::ButtonActive, PresetOptions::default());
        assert_eq!(hover.mode, PresetMode::To);
        assert_eq!(hover.duration, config.durations.fast);
        assert_eq!(active.duration, config.durations.ultra_fast);
    }
}
