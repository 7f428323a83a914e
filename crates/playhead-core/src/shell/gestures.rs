//! Touch gestures on the video surface
//!
//! A horizontal swipe scrubs proportionally to the player width; a quick second
//! tap near the first toggles playback.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::coordinator::Intent;
use crate::interaction::Point;

/// Horizontal travel before a touch counts as a swipe
pub const SWIPE_THRESHOLD: f64 = 30.0;
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);
/// Longest touch that still counts as a tap
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(200);
/// Farthest a second tap may land from the first
pub const DOUBLE_TAP_RADIUS: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
struct ActiveTouch {
    origin: Point,
    started_at: Instant,
    origin_time: f64,
    swiping: bool,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    width: f64,
    touch: Option<ActiveTouch>,
    last_tap: Option<(Instant, Point)>,
}

impl GestureRecognizer {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            touch: None,
            last_tap: None,
        }
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    pub fn touch_start(&mut self, at: Point, now: Instant, current_time: f64) {
        self.touch = Some(ActiveTouch {
            origin: at,
            started_at: now,
            origin_time: current_time,
            swiping: false,
        });
    }

    /// Returns a seek while the touch is a horizontal swipe
    pub fn touch_move(&mut self, at: Point, duration: f64) -> Option<Intent> {
        let width = self.width;
        let touch = self.touch.as_mut()?;
        let dx = at.x - touch.origin.x;
        let dy = at.y - touch.origin.y;

        if !touch.swiping && dx.abs() > SWIPE_THRESHOLD && dx.abs() > dy.abs() {
            touch.swiping = true;
        }
        if !touch.swiping || width <= 0.0 || duration <= 0.0 {
            return None;
        }

        let target = (touch.origin_time + dx / width * duration).clamp(0.0, duration);
        Some(Intent::Seek(target))
    }

    /// Returns a play toggle when this touch completes a double tap
    pub fn touch_end(&mut self, at: Point, now: Instant) -> Option<Intent> {
        let touch = self.touch.take()?;
        if touch.swiping {
            self.last_tap = None;
            return None;
        }

        let is_quick = now.duration_since(touch.started_at) < TAP_MAX_DURATION;
        let double = match self.last_tap {
            Some((tapped_at, tapped_point)) => {
                is_quick
                    && now.duration_since(tapped_at) < DOUBLE_TAP_WINDOW
                    && at.distance(tapped_point) < DOUBLE_TAP_RADIUS
            }
            None => false,
        };

        if double {
            debug!("Double tap");
            self.last_tap = None;
            return Some(Intent::TogglePlay);
        }
        self.last_tap = Some((now, at));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swipe_seeks_proportionally() {
        let now = Instant::now();
        let mut gestures = GestureRecognizer::new(400.0);
        gestures.touch_start(Point::new(100.0, 100.0), now, 30.0);

        assert_eq!(gestures.touch_move(Point::new(120.0, 100.0), 120.0), None);
        assert_eq!(gestures.touch_move(Point::new(200.0, 110.0), 120.0), Some(Intent::Seek(60.0)));
        assert_eq!(gestures.touch_move(Point::new(-900.0, 110.0), 120.0), Some(Intent::Seek(0.0)));
        assert_eq!(gestures.touch_end(Point::new(-900.0, 110.0), now), None);
    }

    #[test]
    fn test_vertical_drag_is_not_a_swipe() {
        let now = Instant::now();
        let mut gestures = GestureRecognizer::new(400.0);
        gestures.touch_start(Point::new(100.0, 100.0), now, 0.0);
        assert_eq!(gestures.touch_move(Point::new(140.0, 200.0), 120.0), None);
    }

    #[test]
    fn test_double_tap_toggles() {
        let now = Instant::now();
        let mut gestures = GestureRecognizer::new(400.0);
        gestures.touch_start(Point::new(100.0, 100.0), now, 0.0);
        assert_eq!(gestures.touch_end(Point::new(100.0, 100.0), now + Duration::from_millis(50)), None);

        let second = now + Duration::from_millis(200);
        gestures.touch_start(Point::new(110.0, 105.0), second, 0.0);
        assert_eq!(
            gestures.touch_end(Point::new(110.0, 105.0), second + Duration::from_millis(50)),
            Some(Intent::TogglePlay)
        );
    }

    #[test]
    fn test_slow_or_distant_taps_do_not_toggle() {
        let now = Instant::now();
        let mut gestures = GestureRecognizer::new(400.0);
        gestures.touch_start(Point::new(100.0, 100.0), now, 0.0);
        gestures.touch_end(Point::new(100.0, 100.0), now);

        let late = now + Duration::from_millis(400);
        gestures.touch_start(Point::new(100.0, 100.0), late, 0.0);
        assert_eq!(gestures.touch_end(Point::new(100.0, 100.0), late), None);

        let far = late + Duration::from_millis(100);
        gestures.touch_start(Point::new(300.0, 100.0), far, 0.0);
        assert_eq!(gestures.touch_end(Point::new(300.0, 100.0), far), None);
    }
}
