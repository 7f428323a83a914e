//! Auto-hiding control bar

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Visibility of the control bar.
///
/// The bar is always shown while paused. While playing it hides once the
/// pointer has been idle for the hide delay, unless the pointer rests on a
/// control or the volume slider is open.
#[derive(Debug, Clone)]
pub struct ControlsVisibility {
    delay: Duration,
    visible: bool,
    playing: bool,
    hovering_control: bool,
    slider_open: bool,
    hide_at: Option<Instant>,
}

impl ControlsVisibility {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            visible: true,
            playing: false,
            hovering_control: false,
            slider_open: false,
            hide_at: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn can_hide(&self) -> bool {
        self.playing && !self.hovering_control && !self.slider_open
    }

    /// Pointer or key activity over the player: show and restart the idle timer
    pub fn activity(&mut self, now: Instant) {
        self.visible = true;
        self.hide_at = Some(now + self.delay);
    }

    /// Pointer left the player
    pub fn leave(&mut self) {
        if self.can_hide() {
            self.visible = false;
            self.hide_at = None;
        }
    }

    pub fn set_hovering_control(&mut self, hovering: bool) {
        self.hovering_control = hovering;
    }

    pub fn set_slider_open(&mut self, open: bool) {
        self.slider_open = open;
    }

    pub fn on_playing_changed(&mut self, playing: bool, now: Instant) {
        self.playing = playing;
        if playing {
            self.activity(now);
        } else {
            self.visible = true;
            self.hide_at = None;
        }
    }

    /// Apply a due hide. Returns true when the bar was hidden.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if now >= at => {
                self.hide_at = None;
                if self.can_hide() && self.visible {
                    trace!("Controls hidden");
                    self.visible = false;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.hide_at
    }
}
