//! Core data models for the grid/snake background animation.
//! Colors are resolved to structured RGBA values once at config build time;
//! malformed color strings fall back to a semi-transparent white tint.

use serde::{Deserialize, Serialize};

/// Scroll direction of the infinite grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
    /// Advances both axes per frame.
    Diagonal,
}

/// Structured color value: integer channels plus float alpha in [0,1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `rgb(r, g, b)` / `rgba(r, g, b, a)`. Returns `None` on any
    /// deviation from that shape; callers decide the fallback.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let body = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut parts = body.split(',').map(str::trim);
        let r = parts.next()?.parse::<u8>().ok()?;
        let g = parts.next()?.parse::<u8>().ok()?;
        let b = parts.next()?.parse::<u8>().ok()?;
        let a = match parts.next() {
            Some(raw) => raw.parse::<f64>().ok()?,
            None => 1.0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self { r, g, b, a })
    }

    /// Per-channel linear interpolation towards `other` by `t` in [0,1].
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// CSS string for canvas fill/stroke styles.
    pub fn to_css(self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Fallback tint used when a configured color string does not parse.
pub const FALLBACK_COLOR: Rgba = Rgba::new(255, 255, 255, 0.6);

fn color_or_fallback(raw: Option<&str>, default: Rgba) -> Rgba {
    match raw {
        Some(s) => Rgba::parse(s).unwrap_or(FALLBACK_COLOR),
        None => default,
    }
}

/// Plain option bundle accepted by the engine. Every key may be omitted to
/// take its default; unknown keys are ignored on deserialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    pub direction: Option<Direction>,
    pub speed: Option<f64>,
    pub square_size: Option<f64>,
    pub border_color: Option<String>,
    pub hover_fill_color: Option<String>,
    pub hover_shadow_color: Option<String>,
    pub special_block_color: Option<String>,
    pub snake_head_color: Option<String>,
    pub snake_tail_color: Option<String>,
    pub transition_duration: Option<f64>,
    pub trail_duration: Option<f64>,
    pub snake_color_decay: Option<f64>,
    pub touch_sensitivity: Option<f64>,
    pub vibration_enabled: Option<bool>,
}

impl GridOptions {
    /// Resolves the bundle against documented defaults. `mobile` selects the
    /// phone render tweaks (thicker lines, half-pixel snapping, damped speed).
    pub fn build(self, mobile: bool) -> GridConfig {
        GridConfig {
            direction: self.direction.unwrap_or_default(),
            speed: self.speed.unwrap_or(1.0),
            square_size: self.square_size.unwrap_or(40.0),
            border_color: color_or_fallback(
                self.border_color.as_deref(),
                Rgba::new(255, 255, 255, 0.05),
            ),
            hover_fill_color: color_or_fallback(
                self.hover_fill_color.as_deref(),
                Rgba::new(255, 255, 255, 0.6),
            ),
            hover_shadow_color: color_or_fallback(
                self.hover_shadow_color.as_deref(),
                Rgba::new(255, 255, 255, 0.3),
            ),
            special_block_color: color_or_fallback(
                self.special_block_color.as_deref(),
                Rgba::new(255, 100, 100, 0.8),
            ),
            snake_head_color: color_or_fallback(
                self.snake_head_color.as_deref(),
                Rgba::new(255, 255, 255, 0.9),
            ),
            snake_tail_color: color_or_fallback(
                self.snake_tail_color.as_deref(),
                Rgba::new(100, 100, 255, 0.3),
            ),
            transition_duration: self.transition_duration.unwrap_or(200.0),
            trail_duration: self.trail_duration.unwrap_or(1000.0),
            snake_color_decay: self.snake_color_decay.unwrap_or(0.7),
            touch_sensitivity: self.touch_sensitivity.unwrap_or(1.0),
            vibration_enabled: self.vibration_enabled.unwrap_or(false),
            mobile,
        }
    }
}

/// Immutable parameter bundle controlling visuals, speed and behavior.
/// Created once at engine construction (after the one-shot performance
/// adaptation on phones) and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    pub direction: Direction,
    /// Pixels per frame, not time-scaled.
    pub speed: f64,
    pub square_size: f64,
    pub border_color: Rgba,
    pub hover_fill_color: Rgba,
    pub hover_shadow_color: Rgba,
    pub special_block_color: Rgba,
    pub snake_head_color: Rgba,
    pub snake_tail_color: Rgba,
    /// Hover opacity easing window, ms.
    pub transition_duration: f64,
    /// Full-opacity trail lifetime, ms.
    pub trail_duration: f64,
    /// Per-segment gradient factor in (0,1].
    pub snake_color_decay: f64,
    pub touch_sensitivity: f64,
    pub vibration_enabled: bool,
    pub mobile: bool,
}

impl GridConfig {
    /// Per-frame offset advance. Phones damp the speed and round to two
    /// decimals so the offset stays on a coarse lattice.
    pub fn move_amount(&self) -> f64 {
        let base = if self.mobile {
            self.speed * 0.8
        } else {
            self.speed
        };
        let effective = base.max(0.0);
        if self.mobile {
            (effective * 100.0).round() / 100.0
        } else {
            effective
        }
    }
}

/// Page copy sourced from `site.config.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    pub intro: IntroConfig,
    pub main: MainConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntroConfig {
    pub title: String,
    pub subtitle: String,
    pub enter: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MainConfig {
    pub name: String,
    pub signature: String,
    pub avatar: String,
}

impl SiteConfig {
    pub fn load() -> Self {
        serde_json::from_str(include_str!("../site.config.json"))
            .unwrap_or_else(|_| Self::fallback())
    }

    fn fallback() -> Self {
        Self {
            title: "Personal Site".into(),
            intro: IntroConfig {
                title: "Hello".into(),
                subtitle: "Go where your heart leads.".into(),
                enter: "enter".into(),
            },
            main: MainConfig {
                name: "Anonymous".into(),
                signature: String::new(),
                avatar: "/avatar.jpg".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgba_and_rgb_forms() {
        assert_eq!(
            Rgba::parse("rgba(255, 100, 100, 0.8)"),
            Some(Rgba::new(255, 100, 100, 0.8))
        );
        assert_eq!(Rgba::parse("rgb(1,2,3)"), Some(Rgba::new(1, 2, 3, 1.0)));
        assert_eq!(
            Rgba::parse("  rgba(0,0,0,0) "),
            Some(Rgba::new(0, 0, 0, 0.0))
        );
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(Rgba::parse("#ffffff"), None);
        assert_eq!(Rgba::parse("rgba(256, 0, 0, 1)"), None);
        assert_eq!(Rgba::parse("rgba(1, 2)"), None);
        assert_eq!(Rgba::parse("rgba(1, 2, 3, 4, 5)"), None);
        assert_eq!(Rgba::parse("rgba(1, 2, 3, x)"), None);
    }

    #[test]
    fn malformed_config_color_falls_back_to_tint() {
        let cfg = GridOptions {
            snake_head_color: Some("not-a-color".into()),
            ..Default::default()
        }
        .build(false);
        assert_eq!(cfg.snake_head_color, FALLBACK_COLOR);
        // Untouched keys keep their documented defaults.
        assert_eq!(cfg.snake_tail_color, Rgba::new(100, 100, 255, 0.3));
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let head = Rgba::new(255, 255, 255, 0.9);
        let tail = Rgba::new(100, 100, 255, 0.3);
        assert_eq!(head.lerp(tail, 0.0), head);
        assert_eq!(head.lerp(tail, 1.0), tail);
        let mid = head.lerp(tail, 0.5);
        assert_eq!(mid.r, 178);
        assert_eq!(mid.b, 255);
        assert!((mid.a - 0.6).abs() < 1e-9);
    }

    #[test]
    fn omitted_options_take_defaults() {
        let cfg = GridOptions::default().build(false);
        assert_eq!(cfg.direction, Direction::Right);
        assert_eq!(cfg.speed, 1.0);
        assert_eq!(cfg.square_size, 40.0);
        assert_eq!(cfg.transition_duration, 200.0);
        assert_eq!(cfg.trail_duration, 1000.0);
        assert_eq!(cfg.snake_color_decay, 0.7);
        assert!(!cfg.vibration_enabled);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let opts: GridOptions = serde_json::from_str(
            r#"{"direction":"diagonal","speed":0.05,"snakeGradientStops":5,"bogus":true}"#,
        )
        .unwrap();
        assert_eq!(opts.direction, Some(Direction::Diagonal));
        assert_eq!(opts.speed, Some(0.05));
        let cfg = opts.build(true);
        assert_eq!(cfg.direction, Direction::Diagonal);
    }

    #[test]
    fn mobile_move_amount_is_damped_and_rounded() {
        let cfg = GridOptions {
            speed: Some(0.05),
            ..Default::default()
        }
        .build(true);
        assert!((cfg.move_amount() - 0.04).abs() < 1e-12);
        let desktop = GridOptions {
            speed: Some(0.05),
            ..Default::default()
        }
        .build(false);
        assert_eq!(desktop.move_amount(), 0.05);
    }
}
