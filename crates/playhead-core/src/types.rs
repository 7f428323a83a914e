//! Core types for Playhead

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::captions::CaptionStyle;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Playback State
// =============================================================================

/// Slowest supported playback rate
pub const MIN_PLAYBACK_RATE: f64 = 0.25;
/// Fastest supported playback rate
pub const MAX_PLAYBACK_RATE: f64 = 2.0;

/// Snapshot of everything the player shows.
///
/// Owned by [`PlaybackCoordinator`](crate::coordinator::PlaybackCoordinator); every
/// other component receives copies through the state channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Current position in seconds
    pub current_time: f64,
    /// Duration in seconds, 0 while unknown
    pub duration: f64,
    /// Volume in `[0, 1]`
    pub volume: f64,
    pub is_muted: bool,
    /// Playback rate in `[0.25, 2.0]`
    pub playback_rate: f64,
    pub is_fullscreen: bool,
    pub is_picture_in_picture: bool,
    pub is_theater_mode: bool,
    pub captions_enabled: bool,
    pub is_loading: bool,
    /// Buffered percentage in `[0, 100]`
    pub buffered: f64,
    /// Id of the selected [`QualityOption`]
    pub current_quality: Option<String>,
    pub current_subtitle_language: Option<String>,
    pub current_chapter: Option<Chapter>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            is_muted: false,
            playback_rate: 1.0,
            is_fullscreen: false,
            is_picture_in_picture: false,
            is_theater_mode: false,
            captions_enabled: false,
            is_loading: true,
            buffered: 0.0,
            current_quality: None,
            current_subtitle_language: None,
            current_chapter: None,
        }
    }
}

impl PlaybackState {
    /// Played fraction of the duration as a percentage
    pub fn played_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Volume the UI should display (0 while muted)
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Whether the muted icon should be shown
    pub fn shows_muted_icon(&self) -> bool {
        self.is_muted || self.volume == 0.0
    }
}

// =============================================================================
// Chapters, Qualities, Tracks
// =============================================================================

/// Video chapter for navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter title
    pub title: String,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
}

impl Chapter {
    /// Create a new chapter
    pub fn new(title: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            title: title.into(),
            start_time,
            end_time,
        }
    }

    /// Duration of this chapter in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Check if a given time falls within this chapter (both ends inclusive)
    pub fn contains_time(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

/// Index of the chapter playing at `time`.
///
/// A chapter that starts at `time` wins over one that ends there; the final
/// chapter still matches at its own end.
pub fn chapter_index_at(chapters: &[Chapter], time: f64) -> Option<usize> {
    chapters
        .iter()
        .position(|c| time >= c.start_time && time < c.end_time)
        .or_else(|| chapters.iter().position(|c| c.contains_time(time)))
}

/// A selectable quality with its own static source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityOption {
    /// Display label (e.g. "1080p")
    pub label: String,
    /// Unique id
    pub value: String,
    /// Source URL for this quality
    pub src: Url,
}

impl QualityOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>, src: Url) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            src,
        }
    }
}

/// Side-loaded subtitle track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub label: String,
    /// BCP-47 language code (e.g., "en", "es", "fr")
    pub language: String,
    pub src: Url,
    #[serde(default)]
    pub is_default: bool,
}

/// Pick the default track: the first flagged one, else the first track.
pub fn default_subtitle_track(tracks: &[SubtitleTrack]) -> Option<&SubtitleTrack> {
    tracks.iter().find(|t| t.is_default).or_else(|| tracks.first())
}

/// A single timed custom caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    /// Caption text, may contain line breaks
    pub text: String,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    #[serde(default)]
    pub style: Option<CaptionStyle>,
}

impl CaptionCue {
    pub fn new(text: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            text: text.into(),
            start_time,
            end_time,
            style: None,
        }
    }

    pub fn with_style(mut self, style: CaptionStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Start inclusive, end inclusive
    pub fn is_active_at(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

/// Entry in a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub src: Url,
    pub title: String,
    #[serde(default)]
    pub poster: Option<Url>,
    /// Duration in seconds, when known ahead of time
    #[serde(default)]
    pub duration: Option<f64>,
}

impl PlaylistItem {
    pub fn new(src: Url, title: impl Into<String>) -> Self {
        Self {
            src,
            title: title.into(),
            poster: None,
            duration: None,
        }
    }
}

/// Display mode of a native text track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTrackMode {
    Disabled,
    Hidden,
    Showing,
}

impl std::fmt::Display for TextTrackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextTrackMode::Disabled => write!(f, "disabled"),
            TextTrackMode::Hidden => write!(f, "hidden"),
            TextTrackMode::Showing => write!(f, "showing"),
        }
    }
}

/// Native text track as reported by the media resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeTextTrack {
    pub label: String,
    pub language: String,
    pub mode: TextTrackMode,
}
