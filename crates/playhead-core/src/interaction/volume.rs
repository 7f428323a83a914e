//! Volume button and reveal-on-hover slider

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use super::aria::SliderAria;
use super::{DragSubscription, DragTarget, Intent, Point, PointerKind, Rect};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliderOrientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Volume control state: slider visibility, pending hide and drag
#[derive(Debug, Clone)]
pub struct VolumeControl {
    slider: Rect,
    orientation: SliderOrientation,
    hide_delay: Duration,
    open: bool,
    hovering: bool,
    dragging: bool,
    hide_at: Option<Instant>,
}

impl VolumeControl {
    pub fn new(slider: Rect, orientation: SliderOrientation, hide_delay: Duration) -> Self {
        Self {
            slider,
            orientation,
            hide_delay,
            open: false,
            hovering: false,
            dragging: false,
            hide_at: None,
        }
    }

    pub fn set_slider(&mut self, slider: Rect) {
        self.slider = slider;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer entered the control; cancels any pending hide
    pub fn enter(&mut self) {
        self.hovering = true;
        self.open = true;
        self.hide_at = None;
    }

    /// Pointer left the control; schedules the hide unless dragging
    pub fn leave(&mut self, now: Instant) {
        self.hovering = false;
        if !self.dragging {
            self.hide_at = Some(now + self.hide_delay);
        }
    }

    /// Apply a due hide. Returns true when the slider closed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if now >= at => {
                self.hide_at = None;
                self.open = false;
                debug!("Volume slider hidden");
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    /// Volume under a pointer position, clamped to `[0, 1]`
    pub fn value_at(&self, at: Point) -> f64 {
        match self.orientation {
            SliderOrientation::Horizontal => self.slider.fraction_x(at.x),
            SliderOrientation::Vertical => self.slider.fraction_from_bottom(at.y),
        }
    }

    /// Press on the slider: starts a drag and sets the volume at once
    pub fn pointer_down(&mut self, at: Point, pointer: PointerKind) -> (DragSubscription, Intent) {
        self.dragging = true;
        self.open = true;
        self.hide_at = None;
        (
            DragSubscription::new(DragTarget::Volume, pointer),
            Intent::SetVolume(self.value_at(at)),
        )
    }

    pub fn drag_move(&mut self, drag: &DragSubscription, at: Point) -> Option<Intent> {
        if drag.target() != DragTarget::Volume || !self.dragging {
            return None;
        }
        Some(Intent::SetVolume(self.value_at(at)))
    }

    /// Release. A release outside the control schedules the hide.
    pub fn drag_end(&mut self, drag: DragSubscription, now: Instant) {
        if drag.target() != DragTarget::Volume {
            return;
        }
        self.dragging = false;
        if !self.hovering {
            self.hide_at = Some(now + self.hide_delay);
        }
    }

    /// Mouse click on the button
    pub fn button_click(&mut self) -> Intent {
        Intent::ToggleMute
    }

    /// Tap on the button: the first tap reveals the slider, a tap while open mutes.
    /// Touch never leaves, so every tap restarts the hide delay.
    pub fn button_tap(&mut self, now: Instant) -> Option<Intent> {
        let intent = if self.open { Some(Intent::ToggleMute) } else { None };
        self.open = true;
        self.hide_at = Some(now + self.hide_delay);
        intent
    }

    pub fn aria(&self, volume: f64, muted: bool) -> SliderAria {
        SliderAria::volume(volume, muted)
    }
}
