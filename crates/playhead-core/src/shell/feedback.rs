//! Transient feedback overlays (play/pause flash, seek delta, volume level)

use std::collections::HashMap;

use tokio::time::Instant;

use crate::events::{Feedback, FeedbackKind};

/// At most one overlay per kind; showing a new one replaces the old and
/// restarts its dismiss timer.
#[derive(Debug, Clone, Default)]
pub struct FeedbackOverlay {
    active: HashMap<FeedbackKind, (Feedback, Instant)>,
}

impl FeedbackOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, feedback: Feedback, now: Instant) {
        let deadline = now + feedback.dismiss_after();
        self.active.insert(feedback.kind, (feedback, deadline));
    }

    pub fn current(&self, kind: FeedbackKind) -> Option<&Feedback> {
        self.active.get(&kind).map(|(feedback, _)| feedback)
    }

    /// Visible overlays, in a stable order
    pub fn visible(&self) -> Vec<Feedback> {
        [FeedbackKind::PlayPause, FeedbackKind::Seek, FeedbackKind::Volume]
            .iter()
            .filter_map(|kind| self.current(*kind).cloned())
            .collect()
    }

    /// Dismiss overlays whose timer ran out; returns their kinds
    pub fn poll(&mut self, now: Instant) -> Vec<FeedbackKind> {
        let expired: Vec<FeedbackKind> = self
            .active
            .iter()
            .filter(|(_, (_, deadline))| now >= *deadline)
            .map(|(kind, _)| *kind)
            .collect();
        for kind in &expired {
            self.active.remove(kind);
        }
        expired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.values().map(|(_, deadline)| *deadline).min()
    }
}
