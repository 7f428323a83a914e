//! Custom caption scheduling and styling
//!
//! Custom captions are cues supplied by the embedding application (or parsed from a
//! WebVTT/SRT file) and drawn by the player itself rather than the native text-track
//! renderer. Scheduling is a pure function of the cue list, the playback time and the
//! captions-enabled flag:
//!
//! - the active cue is the **first** cue in list order whose `[start, end]` range
//!   contains the time; a start boundary beats an end boundary, so at a shared
//!   boundary the cue that begins there wins over the one that ends there
//! - a cue is visible only while captions are enabled
//! - there is no fade or interpolation; cues cut hard at their boundaries
//!
//! # Example
//!
//! ```rust
//! use playhead_core::captions::active_cue;
//! use playhead_core::CaptionCue;
//!
//! let cues = vec![
//!     CaptionCue::new("one", 0.0, 3.0),
//!     CaptionCue::new("two", 3.0, 6.0),
//! ];
//!
//! assert_eq!(active_cue(&cues, 2.9, true).unwrap().text, "one");
//! assert!(active_cue(&cues, 2.9, false).is_none());
//! ```

mod parser;

pub use parser::{parse_captions, strip_tags, SrtParser, WebVttParser};

use serde::{Deserialize, Serialize};

use crate::types::CaptionCue;

/// Index of the cue that should be shown at `time`
pub fn active_cue_index(cues: &[CaptionCue], time: f64, enabled: bool) -> Option<usize> {
    if !enabled {
        return None;
    }
    cues.iter()
        .position(|cue| cue.start_time <= time && time < cue.end_time)
        .or_else(|| cues.iter().position(|cue| cue.is_active_at(time)))
}

/// The cue that should be shown at `time`
pub fn active_cue(cues: &[CaptionCue], time: f64, enabled: bool) -> Option<&CaptionCue> {
    active_cue_index(cues, time, enabled).map(|i| &cues[i])
}

/// Change reported by [`CaptionScheduler::update`]
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionChange {
    /// A new cue became active
    Show { index: usize, text: String, style: ResolvedCaptionStyle },
    /// The previous cue ended (or captions were disabled)
    Hide,
}

/// Tracks the active custom cue across time updates so overlays only redraw on change.
#[derive(Debug, Clone, Default)]
pub struct CaptionScheduler {
    cues: Vec<CaptionCue>,
    baseline: CaptionStyle,
    active: Option<usize>,
}

impl CaptionScheduler {
    pub fn new(cues: Vec<CaptionCue>) -> Self {
        Self {
            cues,
            baseline: CaptionStyle::baseline(),
            active: None,
        }
    }

    /// Replace the baseline style every cue style is layered over
    pub fn with_baseline(mut self, baseline: CaptionStyle) -> Self {
        self.baseline = CaptionStyle::baseline().merged(&baseline);
        self
    }

    pub fn cues(&self) -> &[CaptionCue] {
        &self.cues
    }

    pub fn has_cues(&self) -> bool {
        !self.cues.is_empty()
    }

    /// Replace the cue list; the next update re-evaluates from scratch
    pub fn set_cues(&mut self, cues: Vec<CaptionCue>) {
        self.cues = cues;
        self.active = None;
    }

    /// Currently active cue, if any
    pub fn current(&self) -> Option<&CaptionCue> {
        self.active.map(|i| &self.cues[i])
    }

    pub fn is_visible(&self) -> bool {
        self.active.is_some()
    }

    /// Recompute for a new time or enabled flag. Returns `None` when nothing changed.
    pub fn update(&mut self, time: f64, enabled: bool) -> Option<CaptionChange> {
        let next = active_cue_index(&self.cues, time, enabled);
        if next == self.active {
            return None;
        }
        self.active = next;

        match next {
            Some(index) => {
                let cue = &self.cues[index];
                Some(CaptionChange::Show {
                    index,
                    text: cue.text.clone(),
                    style: self.style_for(cue),
                })
            }
            None => Some(CaptionChange::Hide),
        }
    }

    /// Style for a cue: its own record layered over the baseline
    pub fn style_for(&self, cue: &CaptionCue) -> ResolvedCaptionStyle {
        match &cue.style {
            Some(style) => self.baseline.merged(style).resolve(),
            None => self.baseline.resolve(),
        }
    }
}

// =============================================================================
// Styling
// =============================================================================

/// Vertical anchor for a caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPosition {
    Top,
    #[default]
    Bottom,
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Per-cue style record. Every field is optional; unset fields fall back to the baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub font_size: Option<String>,
    pub font_family: Option<String>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub padding: Option<String>,
    pub border_radius: Option<String>,
    pub text_align: Option<TextAlign>,
    pub position: Option<CaptionPosition>,
    pub margin: Option<String>,
    pub opacity: Option<f64>,
    pub text_shadow: Option<String>,
    pub font_weight: Option<String>,
    pub line_height: Option<String>,
    pub max_width: Option<String>,
    pub z_index: Option<i32>,
    pub border: Option<String>,
    pub box_shadow: Option<String>,
}

impl CaptionStyle {
    /// Baseline every cue style is layered over
    pub fn baseline() -> Self {
        Self {
            font_size: Some("16px".into()),
            font_family: Some("Arial, sans-serif".into()),
            color: Some("#ffffff".into()),
            background_color: Some("rgba(0, 0, 0, 0.8)".into()),
            padding: Some("8px 12px".into()),
            border_radius: Some("4px".into()),
            text_align: Some(TextAlign::Center),
            position: Some(CaptionPosition::Bottom),
            margin: Some("0 auto 20px auto".into()),
            opacity: Some(1.0),
            text_shadow: Some("1px 1px 2px rgba(0, 0, 0, 0.8)".into()),
            font_weight: Some("400".into()),
            line_height: Some("1.4".into()),
            max_width: Some("80%".into()),
            z_index: Some(10),
            border: None,
            box_shadow: Some("0 1px 3px rgba(0, 0, 0, 0.3)".into()),
        }
    }

    /// Layer `over` on top of `self`; set fields in `over` win.
    pub fn merged(&self, over: &CaptionStyle) -> CaptionStyle {
        macro_rules! pick {
            ($field:ident) => {
                over.$field.clone().or_else(|| self.$field.clone())
            };
        }

        CaptionStyle {
            font_size: pick!(font_size),
            font_family: pick!(font_family),
            color: pick!(color),
            background_color: pick!(background_color),
            padding: pick!(padding),
            border_radius: pick!(border_radius),
            text_align: pick!(text_align),
            position: pick!(position),
            margin: pick!(margin),
            opacity: pick!(opacity),
            text_shadow: pick!(text_shadow),
            font_weight: pick!(font_weight),
            line_height: pick!(line_height),
            max_width: pick!(max_width),
            z_index: pick!(z_index),
            border: pick!(border),
            box_shadow: pick!(box_shadow),
        }
    }

    /// Flatten into concrete values
    pub fn resolve(&self) -> ResolvedCaptionStyle {
        ResolvedCaptionStyle {
            position: self.position.unwrap_or_default(),
            text_align: self.text_align.unwrap_or_default(),
            opacity: self.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            z_index: self.z_index.unwrap_or(10),
            declarations: self.declarations(),
        }
    }

    /// CSS declarations for the set fields, in a stable order
    fn declarations(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                out.push((name, value));
            }
        };

        push("font-size", self.font_size.clone());
        push("font-family", self.font_family.clone());
        push("color", self.color.clone());
        push("background-color", self.background_color.clone());
        push("padding", self.padding.clone());
        push("border-radius", self.border_radius.clone());
        push(
            "text-align",
            self.text_align.map(|a| match a {
                TextAlign::Left => "left".to_string(),
                TextAlign::Center => "center".to_string(),
                TextAlign::Right => "right".to_string(),
            }),
        );
        push("margin", self.margin.clone());
        push("opacity", self.opacity.map(|o| o.to_string()));
        push("text-shadow", self.text_shadow.clone());
        push("font-weight", self.font_weight.clone());
        push("line-height", self.line_height.clone());
        push("max-width", self.max_width.clone());
        push("border", self.border.clone());
        push("box-shadow", self.box_shadow.clone());
        push("white-space", Some("pre-wrap".to_string()));

        out
    }
}

/// Concrete style handed to the caption overlay
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCaptionStyle {
    pub position: CaptionPosition,
    pub text_align: TextAlign,
    pub opacity: f64,
    pub z_index: i32,
    /// `(property, value)` pairs
    pub declarations: Vec<(&'static str, String)>,
}

impl ResolvedCaptionStyle {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cues() -> Vec<CaptionCue> {
        vec![
            CaptionCue::new("zero", 0.0, 3.0),
            CaptionCue::new("one", 3.0, 6.0),
            CaptionCue::new("two", 6.0, 9.0),
        ]
    }

    #[test]
    fn test_active_cue_boundaries() {
        let cues = cues();
        assert_eq!(active_cue_index(&cues, 2.9, true), Some(0));
        // Shared boundary: the cue starting there wins
        assert_eq!(active_cue_index(&cues, 3.0, true), Some(1));
        assert_eq!(active_cue_index(&cues, 3.1, true), Some(1));
        // End is still inclusive when nothing starts there
        assert_eq!(active_cue_index(&cues, 9.0, true), Some(2));
        assert_eq!(active_cue_index(&cues, 9.1, true), None);
    }

    #[test]
    fn test_disabled_hides_everything() {
        assert_eq!(active_cue_index(&cues(), 1.0, false), None);
    }

    #[test]
    fn test_overlapping_first_wins() {
        let cues = vec![
            CaptionCue::new("long", 0.0, 10.0),
            CaptionCue::new("short", 2.0, 4.0),
        ];
        assert_eq!(active_cue(&cues, 3.0, true).unwrap().text, "long");
    }

    #[test]
    fn test_scheduler_reports_changes_only() {
        let mut scheduler = CaptionScheduler::new(cues());

        assert!(matches!(scheduler.update(1.0, true), Some(CaptionChange::Show { index: 0, .. })));
        assert_eq!(scheduler.update(2.0, true), None);
        assert!(matches!(scheduler.update(4.0, true), Some(CaptionChange::Show { index: 1, .. })));
        assert_eq!(scheduler.update(4.0, false), Some(CaptionChange::Hide));
        assert!(!scheduler.is_visible());
        assert_eq!(scheduler.update(20.0, true), None);
    }

    #[test]
    fn test_cue_style_overrides_baseline() {
        let style = CaptionStyle {
            color: Some("yellow".into()),
            position: Some(CaptionPosition::Top),
            ..Default::default()
        };
        let cue = CaptionCue::new("styled", 0.0, 1.0).with_style(style);
        let scheduler = CaptionScheduler::new(vec![cue.clone()]);

        let resolved = scheduler.style_for(&cue);
        assert_eq!(resolved.position, CaptionPosition::Top);
        assert_eq!(resolved.get("color"), Some("yellow"));
        assert_eq!(resolved.get("font-size"), Some("16px"));
        assert_eq!(resolved.get("white-space"), Some("pre-wrap"));
    }

    #[test]
    fn test_custom_baseline() {
        let scheduler = CaptionScheduler::new(cues()).with_baseline(CaptionStyle {
            font_size: Some("24px".into()),
            ..Default::default()
        });
        let resolved = scheduler.style_for(&scheduler.cues()[0]);
        assert_eq!(resolved.get("font-size"), Some("24px"));
        assert_eq!(resolved.get("color"), Some("#ffffff"));
    }
}
