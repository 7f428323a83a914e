//! Side signals emitted by the player
//!
//! Every discrete notification the embedding application can react to travels over a
//! single broadcast channel as a [`PlayerEvent`]. Full state snapshots travel separately
//! over a watch channel (see [`PlaybackCoordinator::subscribe_state`]).
//!
//! [`PlaybackCoordinator::subscribe_state`]: crate::coordinator::PlaybackCoordinator::subscribe_state

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsSnapshot;
use crate::format::{format_seek_delta, format_volume};
use crate::interaction::share::ShareTarget;
use crate::types::{Chapter, PlaylistItem};

/// Discrete notifications, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Playback started
    Played,
    /// Playback paused
    Paused,
    /// Playback position moved
    TimeUpdate { time: f64 },
    /// Volume changed
    VolumeChanged { volume: f64 },
    /// Seek performed
    Seeked { time: f64 },
    /// Playback reached the end
    Ended,
    /// Something failed; the player stays usable
    Error { code: String, message: String },
    /// Playback entered a different chapter
    ChapterChanged { chapter: Chapter },
    /// Selected quality changed
    QualityChanged { quality: String },
    /// Subtitle language changed
    SubtitleChanged { language: String },
    /// Transient overlay feedback
    Feedback { feedback: Feedback },
    /// Analytics snapshot
    AnalyticsUpdate { snapshot: AnalyticsSnapshot },
    /// Playlist moved to another item
    PlaylistItemChanged { index: usize, item: PlaylistItem },
    /// Share action performed
    Shared { target: ShareTarget, timestamp: Option<f64> },
}

impl PlayerEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::Played => "played",
            PlayerEvent::Paused => "paused",
            PlayerEvent::TimeUpdate { .. } => "time_update",
            PlayerEvent::VolumeChanged { .. } => "volume_changed",
            PlayerEvent::Seeked { .. } => "seeked",
            PlayerEvent::Ended => "ended",
            PlayerEvent::Error { .. } => "error",
            PlayerEvent::ChapterChanged { .. } => "chapter_changed",
            PlayerEvent::QualityChanged { .. } => "quality_changed",
            PlayerEvent::SubtitleChanged { .. } => "subtitle_changed",
            PlayerEvent::Feedback { .. } => "feedback",
            PlayerEvent::AnalyticsUpdate { .. } => "analytics_update",
            PlayerEvent::PlaylistItemChanged { .. } => "playlist_item_changed",
            PlayerEvent::Shared { .. } => "shared",
        }
    }
}

/// Which overlay a feedback belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    PlayPause,
    Seek,
    Volume,
}

impl FeedbackKind {
    /// How long the overlay stays up
    pub fn dismiss_after(&self) -> Duration {
        match self {
            FeedbackKind::PlayPause => Duration::from_millis(800),
            FeedbackKind::Seek => Duration::from_millis(1000),
            FeedbackKind::Volume => Duration::from_millis(1000),
        }
    }
}

/// Transient feedback for auto-dismissing overlays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    /// Text to show; empty for the play/pause icon flash
    pub text: String,
}

impl Feedback {
    /// Icon flash after toggling play/pause
    pub fn play_pause() -> Self {
        Self {
            kind: FeedbackKind::PlayPause,
            text: String::new(),
        }
    }

    /// `+10s` / `-10s`
    pub fn seek(delta: f64) -> Self {
        Self {
            kind: FeedbackKind::Seek,
            text: format_seek_delta(delta),
        }
    }

    /// `50%` / `Muted`
    pub fn volume(volume: f64, muted: bool) -> Self {
        Self {
            kind: FeedbackKind::Volume,
            text: format_volume(volume, muted),
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        self.kind.dismiss_after()
    }
}
