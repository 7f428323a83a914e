//! Draggable custom caption overlay

use serde::{Deserialize, Serialize};

use super::{DragSubscription, DragTarget, Point, PointerKind, Rect};
use crate::captions::CaptionPosition;

/// Where the overlay is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum CaptionPlacement {
    /// Centered horizontally, 20px from the anchored edge
    Anchored { position: CaptionPosition },
    /// Moved by the viewer; offset from the player's top-left corner
    Free { x: f64, y: f64 },
}

#[derive(Debug, Clone)]
pub struct CaptionOverlay {
    draggable: bool,
    player: Rect,
    anchor: CaptionPosition,
    offset: Option<Point>,
    /// Grab point relative to the caption's top-left corner
    grab: Option<Point>,
    caption_size: (f64, f64),
}

impl CaptionOverlay {
    pub fn new(player: Rect, anchor: CaptionPosition, draggable: bool) -> Self {
        Self {
            draggable,
            player,
            anchor,
            offset: None,
            grab: None,
            caption_size: (0.0, 0.0),
        }
    }

    pub fn set_player(&mut self, player: Rect) {
        self.player = player;
        if let Some(offset) = self.offset {
            self.offset = Some(self.clamp(offset));
        }
    }

    pub fn set_anchor(&mut self, anchor: CaptionPosition) {
        self.anchor = anchor;
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn placement(&self) -> CaptionPlacement {
        match self.offset {
            Some(Point { x, y }) => CaptionPlacement::Free { x, y },
            None => CaptionPlacement::Anchored { position: self.anchor },
        }
    }

    /// Press on the caption box (client-coordinate `caption` rect)
    pub fn pointer_down(&mut self, at: Point, caption: Rect, pointer: PointerKind) -> Option<DragSubscription> {
        if !self.draggable {
            return None;
        }
        self.caption_size = (caption.width, caption.height);
        self.grab = Some(Point::new(at.x - caption.left, at.y - caption.top));
        Some(DragSubscription::new(DragTarget::CaptionOverlay, pointer))
    }

    /// Move the caption, keeping it fully inside the player
    pub fn drag_move(&mut self, drag: &DragSubscription, at: Point) {
        if drag.target() != DragTarget::CaptionOverlay {
            return;
        }
        let Some(grab) = self.grab else { return };

        let raw = Point::new(at.x - self.player.left - grab.x, at.y - self.player.top - grab.y);
        self.offset = Some(self.clamp(raw));
    }

    pub fn drag_end(&mut self, drag: DragSubscription) {
        if drag.target() == DragTarget::CaptionOverlay {
            self.grab = None;
        }
    }

    /// Return to the anchored placement
    pub fn reset(&mut self) {
        self.offset = None;
        self.grab = None;
    }

    fn clamp(&self, point: Point) -> Point {
        let (width, height) = self.caption_size;
        let max_x = (self.player.width - width).max(0.0);
        let max_y = (self.player.height - height).max(0.0);
        Point::new(point.x.clamp(0.0, max_x), point.y.clamp(0.0, max_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay() -> CaptionOverlay {
        CaptionOverlay::new(Rect::new(100.0, 50.0, 640.0, 360.0), CaptionPosition::Bottom, true)
    }

    #[test]
    fn test_starts_anchored() {
        assert_eq!(
            overlay().placement(),
            CaptionPlacement::Anchored {
                position: CaptionPosition::Bottom
            }
        );
    }

    #[test]
    fn test_drag_moves_and_clamps() {
        let mut overlay = overlay();
        let caption = Rect::new(300.0, 350.0, 200.0, 40.0);
        let drag = overlay
            .pointer_down(Point::new(310.0, 360.0), caption, PointerKind::Mouse)
            .unwrap();

        overlay.drag_move(&drag, Point::new(210.0, 160.0));
        assert_eq!(overlay.placement(), CaptionPlacement::Free { x: 100.0, y: 100.0 });

        overlay.drag_move(&drag, Point::new(2000.0, -500.0));
        assert_eq!(overlay.placement(), CaptionPlacement::Free { x: 440.0, y: 0.0 });

        overlay.drag_end(drag);
        assert!(!overlay.is_dragging());

        overlay.reset();
        assert!(matches!(overlay.placement(), CaptionPlacement::Anchored { .. }));
    }

    #[test]
    fn test_not_draggable() {
        let mut overlay = CaptionOverlay::new(Rect::new(0.0, 0.0, 640.0, 360.0), CaptionPosition::Top, false);
        assert!(overlay
            .pointer_down(Point::new(10.0, 10.0), Rect::new(0.0, 0.0, 100.0, 20.0), PointerKind::Touch)
            .is_none());
    }

    #[test]
    fn test_player_resize_reclamps() {
        let mut overlay = overlay();
        let caption = Rect::new(100.0, 50.0, 200.0, 40.0);
        let drag = overlay.pointer_down(Point::new(100.0, 50.0), caption, PointerKind::Mouse).unwrap();
        overlay.drag_move(&drag, Point::new(540.0, 370.0));
        overlay.drag_end(drag);

        overlay.set_player(Rect::new(100.0, 50.0, 320.0, 180.0));
        assert_eq!(overlay.placement(), CaptionPlacement::Free { x: 120.0, y: 140.0 });
    }
}
