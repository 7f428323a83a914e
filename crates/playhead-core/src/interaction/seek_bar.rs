//! Seek bar with hover preview and drag scrubbing

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DragSubscription, DragTarget, Intent, Point, PointerKind, Rect};

/// Presses within this many pixels of the thumb center grab the thumb
pub const THUMB_HIT_RADIUS: f64 = 8.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeekBarState {
    #[default]
    Idle,
    /// Pointer over the track, showing a time preview
    Hover { time: f64, fraction: f64 },
    /// Scrubbing; the displayed time is the drag time
    Dragging { time: f64 },
}

/// Ask the thumbnail drawer for a preview frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub time: f64,
    pub fraction: f64,
    /// Pointer offset from the track's left edge, for positioning the tooltip
    pub x: f64,
}

/// Result of pressing on the bar
#[derive(Debug, PartialEq)]
pub enum SeekPress {
    /// The thumb was grabbed
    Drag(DragSubscription),
    /// The track was clicked or tapped
    Seek(Intent),
}

#[derive(Debug, Clone, Default)]
pub struct SeekBar {
    track: Rect,
    state: SeekBarState,
}

impl SeekBar {
    pub fn new(track: Rect) -> Self {
        Self {
            track,
            state: SeekBarState::Idle,
        }
    }

    /// Update the track geometry after layout changes
    pub fn set_track(&mut self, track: Rect) {
        self.track = track;
    }

    pub fn track(&self) -> Rect {
        self.track
    }

    pub fn state(&self) -> SeekBarState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SeekBarState::Dragging { .. })
    }

    fn time_at(&self, x: f64, duration: f64) -> (f64, f64) {
        let fraction = self.track.fraction_x(x);
        (fraction * duration.max(0.0), fraction)
    }

    fn thumb_x(&self, current_time: f64, duration: f64) -> f64 {
        let fraction = if duration > 0.0 {
            (current_time / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.track.left + fraction * self.track.width
    }

    /// Pointer moved over the track without a button held
    pub fn pointer_move(&mut self, x: f64, duration: f64) -> Option<PreviewRequest> {
        if self.is_dragging() || duration <= 0.0 {
            return None;
        }
        let (time, fraction) = self.time_at(x, duration);
        self.state = SeekBarState::Hover { time, fraction };
        Some(PreviewRequest {
            time,
            fraction,
            x: fraction * self.track.width,
        })
    }

    /// Pointer left the track; hides the preview unless scrubbing
    pub fn pointer_leave(&mut self) {
        if !self.is_dragging() {
            self.state = SeekBarState::Idle;
        }
    }

    /// Mouse down or touch start on the bar
    pub fn pointer_down(&mut self, at: Point, pointer: PointerKind, current_time: f64, duration: f64) -> Option<SeekPress> {
        if duration <= 0.0 {
            return None;
        }

        if (at.x - self.thumb_x(current_time, duration)).abs() <= THUMB_HIT_RADIUS {
            debug!(time = current_time, "Seek drag started");
            self.state = SeekBarState::Dragging { time: current_time };
            return Some(SeekPress::Drag(DragSubscription::new(DragTarget::SeekBar, pointer)));
        }

        let (time, _) = self.time_at(at.x, duration);
        Some(SeekPress::Seek(Intent::Seek(time)))
    }

    /// Document-level move while the thumb is held. Issues a live seek.
    pub fn drag_move(&mut self, drag: &DragSubscription, x: f64, duration: f64) -> Option<Intent> {
        if drag.target() != DragTarget::SeekBar || !self.is_dragging() {
            return None;
        }
        let (time, _) = self.time_at(x, duration);
        self.state = SeekBarState::Dragging { time };
        Some(Intent::Seek(time))
    }

    /// Release; consumes the subscription
    pub fn drag_end(&mut self, drag: DragSubscription) {
        if drag.target() == DragTarget::SeekBar && self.is_dragging() {
            debug!("Seek drag ended");
            self.state = SeekBarState::Idle;
        }
    }

    /// Time to show: the drag time while scrubbing, otherwise playback time
    pub fn displayed_time(&self, current_time: f64) -> f64 {
        match self.state {
            SeekBarState::Dragging { time } => time,
            _ => current_time,
        }
    }

    /// Played width percentage, following the scrub while dragging
    pub fn played_percent(&self, current_time: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return 0.0;
        }
        (self.displayed_time(current_time) / duration * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> SeekBar {
        SeekBar::new(Rect::new(0.0, 0.0, 400.0, 6.0))
    }

    #[test]
    fn test_hover_preview() {
        let mut bar = bar();
        let preview = bar.pointer_move(100.0, 200.0).unwrap();
        assert_eq!(preview.time, 50.0);
        assert_eq!(preview.fraction, 0.25);
        assert_eq!(bar.state(), SeekBarState::Hover { time: 50.0, fraction: 0.25 });

        bar.pointer_leave();
        assert_eq!(bar.state(), SeekBarState::Idle);
    }

    #[test]
    fn test_track_click_seeks_once() {
        let mut bar = bar();
        let press = bar.pointer_down(Point::new(300.0, 3.0), PointerKind::Mouse, 0.0, 100.0);
        assert_eq!(press, Some(SeekPress::Seek(Intent::Seek(75.0))));
        assert!(!bar.is_dragging());
    }

    #[test]
    fn test_outside_positions_clamp() {
        let mut bar = bar();
        let press = bar.pointer_down(Point::new(-50.0, 3.0), PointerKind::Touch, 60.0, 100.0);
        assert_eq!(press, Some(SeekPress::Seek(Intent::Seek(0.0))));
    }

    #[test]
    fn test_drag_scrubs_and_holds_display() {
        let mut bar = bar();
        // Thumb sits at 40% → x = 160
        let Some(SeekPress::Drag(drag)) = bar.pointer_down(Point::new(165.0, 3.0), PointerKind::Mouse, 40.0, 100.0)
        else {
            panic!("expected drag");
        };

        assert_eq!(bar.drag_move(&drag, 200.0, 100.0), Some(Intent::Seek(50.0)));
        assert_eq!(bar.drag_move(&drag, 500.0, 100.0), Some(Intent::Seek(100.0)));

        // A time update arriving mid-drag does not move the display
        assert_eq!(bar.displayed_time(42.0), 100.0);
        assert!(bar.pointer_move(10.0, 100.0).is_none());

        bar.drag_end(drag);
        assert_eq!(bar.displayed_time(42.0), 42.0);
    }

    #[test]
    fn test_foreign_subscription_ignored() {
        let mut bar = bar();
        let drag = DragSubscription::new(DragTarget::Volume, PointerKind::Mouse);
        assert!(bar.drag_move(&drag, 100.0, 100.0).is_none());
    }

    #[test]
    fn test_unknown_duration_does_nothing() {
        let mut bar = bar();
        assert!(bar.pointer_move(100.0, 0.0).is_none());
        assert!(bar.pointer_down(Point::new(100.0, 0.0), PointerKind::Mouse, 0.0, 0.0).is_none());
    }
}
