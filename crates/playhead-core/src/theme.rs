//! Theme palettes and control style projection
//!
//! The player is styled through CSS custom properties. This module is the single place
//! that turns a [`Theme`] and the embedder's [`ControlOptions`] into the ordered list of
//! `--rvp-*` variables the stylesheet consumes. Everything here is a pure function of
//! its inputs.
//!
//! # Usage
//!
//! ```rust
//! use playhead_core::theme::{css_variables, ControlOptions, Theme};
//!
//! let vars = css_variables(Theme::Dark, &ControlOptions::default());
//! assert_eq!(vars.get("--rvp-primary"), Some("#3b82f6"));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Base color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn palette(&self) -> ThemePalette {
        match self {
            Theme::Dark => ThemePalette {
                primary: "#3b82f6",
                primary_hover: "#2563eb",
                background: "#000000",
                surface: "rgba(28, 28, 30, 0.95)",
                text: "#ffffff",
                text_soft: "rgba(255, 255, 255, 0.7)",
                track: "rgba(255, 255, 255, 0.2)",
                buffered: "rgba(255, 255, 255, 0.4)",
                controls_gradient: "linear-gradient(transparent, rgba(0, 0, 0, 0.8))",
            },
            Theme::Light => ThemePalette {
                primary: "#2563eb",
                primary_hover: "#1d4ed8",
                background: "#f8fafc",
                surface: "rgba(255, 255, 255, 0.95)",
                text: "#0f172a",
                text_soft: "rgba(15, 23, 42, 0.7)",
                track: "rgba(15, 23, 42, 0.15)",
                buffered: "rgba(15, 23, 42, 0.3)",
                controls_gradient: "linear-gradient(transparent, rgba(255, 255, 255, 0.85))",
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// Base colors for a theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemePalette {
    pub primary: &'static str,
    /// Primary for hover states
    pub primary_hover: &'static str,
    pub background: &'static str,
    /// Menus and tooltips
    pub surface: &'static str,
    pub text: &'static str,
    pub text_soft: &'static str,
    /// Seek bar / volume track
    pub track: &'static str,
    pub buffered: &'static str,
    pub controls_gradient: &'static str,
}

// =============================================================================
// Control Style Records
// =============================================================================

/// A CSS value given either as text (`"600"`, `"1.2rem"`) or a bare number (`600`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Text(text) => write!(f, "{}", text),
            CssValue::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlButtonStyle {
    pub background_color: Option<String>,
    pub hover_background_color: Option<String>,
    pub active_background_color: Option<String>,
    pub color: Option<String>,
    pub border_color: Option<String>,
    pub border_radius: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<CssValue>,
    pub padding: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub min_width: Option<String>,
    pub min_height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlMenuStyle {
    pub background_color: Option<String>,
    pub backdrop_filter: Option<String>,
    pub border_color: Option<String>,
    pub border_radius: Option<String>,
    pub padding: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<CssValue>,
    pub color: Option<String>,
    pub text_shadow: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeekBarStyle {
    pub height: Option<String>,
    pub hover_height: Option<String>,
    pub background_color: Option<String>,
    pub played_color: Option<String>,
    pub buffered_color: Option<String>,
    pub thumb_color: Option<String>,
    pub thumb_size: Option<String>,
    pub hover_thumb_size: Option<String>,
    pub border_radius: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeSliderStyle {
    pub width: Option<String>,
    pub height: Option<String>,
    pub background_color: Option<String>,
    pub fill_color: Option<String>,
    pub thumb_color: Option<String>,
    pub thumb_size: Option<String>,
    pub border_radius: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeDisplayStyle {
    pub font_size: Option<String>,
    pub font_weight: Option<CssValue>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub backdrop_filter: Option<String>,
    pub border_color: Option<String>,
    pub border_radius: Option<String>,
    pub padding: Option<String>,
    pub text_shadow: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlsBarStyle {
    pub background_color: Option<String>,
    pub padding: Option<String>,
    pub gap: Option<String>,
    pub border_radius: Option<String>,
    pub min_height: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipStyle {
    pub background_color: Option<String>,
    pub color: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<CssValue>,
    pub padding: Option<String>,
    pub border_radius: Option<String>,
    /// Milliseconds
    pub show_delay: Option<u64>,
    /// Milliseconds
    pub hide_delay: Option<u64>,
}

/// Controls the embedder can hide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    PlayButton,
    VolumeControl,
    TimeDisplay,
    SeekBar,
    PlaybackSpeed,
    QualitySelector,
    CaptionsButton,
    FullscreenButton,
    PictureInPictureButton,
    TheaterModeButton,
    SocialShare,
    ChapterMarkers,
}

/// Visibility toggles and style records for the control bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlOptions {
    pub show_play_button: bool,
    pub show_volume_control: bool,
    pub show_time_display: bool,
    pub show_seek_bar: bool,
    pub show_playback_speed: bool,
    pub show_quality_selector: bool,
    pub show_captions_button: bool,
    pub show_fullscreen_button: bool,
    pub show_picture_in_picture_button: bool,
    pub show_theater_mode_button: bool,
    pub show_social_share: bool,
    pub show_chapter_markers: bool,

    pub play_button_style: Option<ControlButtonStyle>,
    pub volume_button_style: Option<ControlButtonStyle>,
    pub control_button_style: Option<ControlButtonStyle>,
    pub right_controls_button_style: Option<ControlButtonStyle>,

    pub playback_speed_menu_style: Option<ControlMenuStyle>,
    pub quality_menu_style: Option<ControlMenuStyle>,
    pub share_menu_style: Option<ControlMenuStyle>,

    pub seek_bar_style: Option<SeekBarStyle>,
    pub volume_slider_style: Option<VolumeSliderStyle>,
    pub time_display_style: Option<TimeDisplayStyle>,
    pub controls_bar_style: Option<ControlsBarStyle>,
    pub tooltip_style: Option<TooltipStyle>,

    /// Extra variables passed through verbatim (a `--` prefix is added when missing)
    #[serde(rename = "customCSSVariables")]
    pub custom_css_variables: BTreeMap<String, String>,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            show_play_button: true,
            show_volume_control: true,
            show_time_display: true,
            show_seek_bar: true,
            show_playback_speed: true,
            show_quality_selector: true,
            show_captions_button: true,
            show_fullscreen_button: true,
            show_picture_in_picture_button: true,
            show_theater_mode_button: true,
            show_social_share: true,
            show_chapter_markers: true,
            play_button_style: None,
            volume_button_style: None,
            control_button_style: None,
            right_controls_button_style: None,
            playback_speed_menu_style: None,
            quality_menu_style: None,
            share_menu_style: None,
            seek_bar_style: None,
            volume_slider_style: None,
            time_display_style: None,
            controls_bar_style: None,
            tooltip_style: None,
            custom_css_variables: BTreeMap::new(),
        }
    }
}

impl ControlOptions {
    /// Whether the embedder left `control` visible
    pub fn shows(&self, control: ControlKind) -> bool {
        match control {
            ControlKind::PlayButton => self.show_play_button,
            ControlKind::VolumeControl => self.show_volume_control,
            ControlKind::TimeDisplay => self.show_time_display,
            ControlKind::SeekBar => self.show_seek_bar,
            ControlKind::PlaybackSpeed => self.show_playback_speed,
            ControlKind::QualitySelector => self.show_quality_selector,
            ControlKind::CaptionsButton => self.show_captions_button,
            ControlKind::FullscreenButton => self.show_fullscreen_button,
            ControlKind::PictureInPictureButton => self.show_picture_in_picture_button,
            ControlKind::TheaterModeButton => self.show_theater_mode_button,
            ControlKind::SocialShare => self.show_social_share,
            ControlKind::ChapterMarkers => self.show_chapter_markers,
        }
    }
}

// =============================================================================
// CSS Variable Projection
// =============================================================================

/// Ordered `(name, value)` list of CSS custom properties
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CssVariables(Vec<(String, String)>);

impl CssVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a CSS rule for `selector`
    pub fn to_css_block(&self, selector: &str) -> String {
        let mut css = format!("{} {{\n", selector);
        for (name, value) in &self.0 {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push('}');
        css
    }

    fn push(&mut self, name: impl Into<String>, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.0.push((name.into(), value.to_string()));
        }
    }
}

/// Project a theme and control options into CSS custom properties.
///
/// Palette variables come first, then style records in control-bar order, then the
/// custom passthrough. Later entries win on lookup, so a custom variable can override
/// anything derived before it.
pub fn css_variables(theme: Theme, options: &ControlOptions) -> CssVariables {
    let palette = theme.palette();
    let mut vars = CssVariables::default();

    vars.push("--rvp-primary", Some(palette.primary));
    vars.push("--rvp-primary-hover", Some(palette.primary_hover));
    vars.push("--rvp-background", Some(palette.background));
    vars.push("--rvp-surface", Some(palette.surface));
    vars.push("--rvp-text", Some(palette.text));
    vars.push("--rvp-text-soft", Some(palette.text_soft));
    vars.push("--rvp-track", Some(palette.track));
    vars.push("--rvp-buffered", Some(palette.buffered));
    vars.push("--rvp-controls-gradient", Some(palette.controls_gradient));

    if let Some(style) = &options.controls_bar_style {
        vars.push("--rvp-controls-bg", style.background_color.as_ref());
        vars.push("--rvp-controls-padding", style.padding.as_ref());
        vars.push("--rvp-controls-gap", style.gap.as_ref());
        vars.push("--rvp-controls-radius", style.border_radius.as_ref());
        vars.push("--rvp-controls-min-height", style.min_height.as_ref());
        vars.push("--rvp-controls-height", style.height.as_ref());
    }

    button_variables(&mut vars, "play-btn", options.play_button_style.as_ref());
    button_variables(&mut vars, "volume-btn", options.volume_button_style.as_ref());
    button_variables(&mut vars, "control-btn", options.control_button_style.as_ref());
    button_variables(&mut vars, "right-btn", options.right_controls_button_style.as_ref());

    menu_variables(&mut vars, "speed-menu", options.playback_speed_menu_style.as_ref());
    menu_variables(&mut vars, "quality-menu", options.quality_menu_style.as_ref());
    menu_variables(&mut vars, "share-menu", options.share_menu_style.as_ref());

    if let Some(style) = &options.seek_bar_style {
        vars.push("--rvp-seekbar-height", style.height.as_ref());
        vars.push("--rvp-seekbar-hover-height", style.hover_height.as_ref());
        vars.push("--rvp-seekbar-bg", style.background_color.as_ref());
        vars.push("--rvp-seekbar-played", style.played_color.as_ref());
        vars.push("--rvp-seekbar-buffered", style.buffered_color.as_ref());
        vars.push("--rvp-seekbar-thumb", style.thumb_color.as_ref());
        vars.push("--rvp-seekbar-thumb-size", style.thumb_size.as_ref());
        vars.push("--rvp-seekbar-hover-thumb-size", style.hover_thumb_size.as_ref());
        vars.push("--rvp-seekbar-radius", style.border_radius.as_ref());
    }

    if let Some(style) = &options.volume_slider_style {
        vars.push("--rvp-volume-width", style.width.as_ref());
        vars.push("--rvp-volume-height", style.height.as_ref());
        vars.push("--rvp-volume-bg", style.background_color.as_ref());
        vars.push("--rvp-volume-fill", style.fill_color.as_ref());
        vars.push("--rvp-volume-thumb", style.thumb_color.as_ref());
        vars.push("--rvp-volume-thumb-size", style.thumb_size.as_ref());
        vars.push("--rvp-volume-radius", style.border_radius.as_ref());
    }

    if let Some(style) = &options.time_display_style {
        vars.push("--rvp-time-font-size", style.font_size.as_ref());
        vars.push("--rvp-time-font-weight", style.font_weight.as_ref());
        vars.push("--rvp-time-color", style.color.as_ref());
        vars.push("--rvp-time-bg", style.background_color.as_ref());
        vars.push("--rvp-time-backdrop", style.backdrop_filter.as_ref());
        vars.push("--rvp-time-border-color", style.border_color.as_ref());
        vars.push("--rvp-time-radius", style.border_radius.as_ref());
        vars.push("--rvp-time-padding", style.padding.as_ref());
        vars.push("--rvp-time-text-shadow", style.text_shadow.as_ref());
    }

    if let Some(style) = &options.tooltip_style {
        vars.push("--rvp-tooltip-bg", style.background_color.as_ref());
        vars.push("--rvp-tooltip-color", style.color.as_ref());
        vars.push("--rvp-tooltip-font-size", style.font_size.as_ref());
        vars.push("--rvp-tooltip-font-weight", style.font_weight.as_ref());
        vars.push("--rvp-tooltip-padding", style.padding.as_ref());
        vars.push("--rvp-tooltip-radius", style.border_radius.as_ref());
        vars.push("--rvp-tooltip-show-delay", style.show_delay.map(|ms| format!("{}ms", ms)));
        vars.push("--rvp-tooltip-hide-delay", style.hide_delay.map(|ms| format!("{}ms", ms)));
    }

    for (name, value) in &options.custom_css_variables {
        let name = if name.starts_with("--") {
            name.clone()
        } else {
            format!("--{}", name)
        };
        vars.push(name, Some(value));
    }

    vars
}

fn button_variables(vars: &mut CssVariables, prefix: &str, style: Option<&ControlButtonStyle>) {
    let Some(style) = style else { return };
    let name = |suffix: &str| format!("--rvp-{}-{}", prefix, suffix);

    vars.push(name("bg"), style.background_color.as_ref());
    vars.push(name("hover-bg"), style.hover_background_color.as_ref());
    vars.push(name("active-bg"), style.active_background_color.as_ref());
    vars.push(name("color"), style.color.as_ref());
    vars.push(name("border-color"), style.border_color.as_ref());
    vars.push(name("radius"), style.border_radius.as_ref());
    vars.push(name("font-size"), style.font_size.as_ref());
    vars.push(name("font-weight"), style.font_weight.as_ref());
    vars.push(name("padding"), style.padding.as_ref());
    vars.push(name("width"), style.width.as_ref());
    vars.push(name("height"), style.height.as_ref());
    vars.push(name("min-width"), style.min_width.as_ref());
    vars.push(name("min-height"), style.min_height.as_ref());
}

fn menu_variables(vars: &mut CssVariables, prefix: &str, style: Option<&ControlMenuStyle>) {
    let Some(style) = style else { return };
    let name = |suffix: &str| format!("--rvp-{}-{}", prefix, suffix);

    vars.push(name("bg"), style.background_color.as_ref());
    vars.push(name("backdrop"), style.backdrop_filter.as_ref());
    vars.push(name("border-color"), style.border_color.as_ref());
    vars.push(name("radius"), style.border_radius.as_ref());
    vars.push(name("padding"), style.padding.as_ref());
    vars.push(name("font-size"), style.font_size.as_ref());
    vars.push(name("font-weight"), style.font_weight.as_ref());
    vars.push(name("color"), style.color.as_ref());
    vars.push(name("text-shadow"), style.text_shadow.as_ref());
}
