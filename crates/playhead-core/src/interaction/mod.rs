//! Interaction surfaces
//!
//! Each surface turns raw pointer, touch and keyboard input into coordinator
//! [`Intent`]s and keeps only the small local state it needs (hover, drag, menu
//! open). Surfaces never touch the media resource; the shell applies the intents
//! they return.
//!
//! Drags are explicit: starting one returns a [`DragSubscription`] that the host
//! holds for exactly as long as the drag, routing document-level moves and the
//! final release back to the surface that owns it.

pub mod aria;
pub mod caption_overlay;
pub mod chapters;
pub mod menus;
pub mod seek_bar;
pub mod share;
pub mod volume;

pub use aria::{ButtonAria, SliderAria};
pub use caption_overlay::{CaptionOverlay, CaptionPlacement};
pub use chapters::{chapter_markers, ChapterMarker};
pub use menus::{MenuItem, MenuState, QualityMenu, SpeedMenu, PLAYBACK_RATES};
pub use seek_bar::{PreviewRequest, SeekBar, SeekBarState, SeekPress};
pub use share::{share_text, share_url, ShareAction, ShareMenu, ShareTarget};
pub use volume::{SliderOrientation, VolumeControl};

pub use crate::coordinator::Intent;

use serde::{Deserialize, Serialize};

/// A point in client coordinates (CSS pixels)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned box in client coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right() && point.y >= self.top && point.y <= self.bottom()
    }

    /// Horizontal position as a fraction of the width, clamped to `[0, 1]`
    pub fn fraction_x(&self, x: f64) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        ((x - self.left) / self.width).clamp(0.0, 1.0)
    }

    /// Vertical position measured up from the bottom edge, clamped to `[0, 1]`
    pub fn fraction_from_bottom(&self, y: f64) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        ((self.bottom() - y) / self.height).clamp(0.0, 1.0)
    }
}

/// Input device behind a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Which surface owns an active drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragTarget {
    SeekBar,
    Volume,
    CaptionOverlay,
}

/// Proof that a drag is in progress.
///
/// Returned by a surface when a drag starts and handed back when it ends; moves
/// are only accepted while one is outstanding.
#[must_use = "dropping the subscription leaves the drag without a release"]
#[derive(Debug, PartialEq, Eq)]
pub struct DragSubscription {
    target: DragTarget,
    pointer: PointerKind,
}

impl DragSubscription {
    pub(crate) fn new(target: DragTarget, pointer: PointerKind) -> Self {
        Self { target, pointer }
    }

    pub fn target(&self) -> DragTarget {
        self.target
    }

    pub fn pointer(&self) -> PointerKind {
        self.pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_fractions_clamp() {
        let rect = Rect::new(100.0, 0.0, 200.0, 50.0);
        assert_eq!(rect.fraction_x(200.0), 0.5);
        assert_eq!(rect.fraction_x(50.0), 0.0);
        assert_eq!(rect.fraction_x(400.0), 1.0);
        assert_eq!(rect.fraction_from_bottom(40.0), 0.2);
        assert_eq!(Rect::default().fraction_x(10.0), 0.0);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(10.0, 5.0)));
        assert!(!rect.contains(Point::new(11.0, 5.0)));
    }
}
