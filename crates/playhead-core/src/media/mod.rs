//! Media resource abstraction
//!
//! The coordinator drives a single native playable element through [`MediaResource`]
//! and learns about its progress through [`MediaEvent`]s. Getters and setters are
//! synchronous, like the properties of an HTML media element; requests that the
//! platform may refuse (play, fullscreen, picture-in-picture) are async and fallible.
//!
//! Setters never update coordinator state directly. The resource reports the effect
//! later through an event, which the coordinator folds into [`PlaybackState`].
//!
//! [`PlaybackState`]: crate::types::PlaybackState

#[cfg(feature = "simulated")]
mod simulated;

#[cfg(feature = "simulated")]
pub use simulated::{SimulatedMedia, SimulatedMediaConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use url::Url;

use crate::error::Result;
use crate::types::{NativeTextTrack, TextTrackMode};

/// Lifecycle events raised by a media resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate,
    DurationChange,
    VolumeChange,
    RateChange,
    LoadStart,
    LoadedMetadata,
    /// Enough data to start playing
    CanPlay,
    /// Enough data to play through without stalling
    CanPlayThrough,
    Progress,
    Waiting,
    Seeking,
    /// A seek finished and the position has settled
    Seeked,
    Ended,
    Error { message: Option<String> },
    FullscreenChange { active: bool },
    PictureInPictureChange { active: bool },
}

impl MediaEvent {
    /// Whether this event signals data sufficient to seek and resume playback
    pub fn is_ready(&self) -> bool {
        matches!(self, MediaEvent::CanPlay | MediaEvent::CanPlayThrough)
    }
}

/// Receiving half of a resource's event stream
pub type MediaEventReceiver = mpsc::UnboundedReceiver<MediaEvent>;

/// A native playable element (analogous to an HTML5 `<video>`)
#[async_trait]
pub trait MediaResource: Send + Sync {
    /// Current position in seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&self, time: f64);

    /// Duration in seconds; NaN or 0 while unknown
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);

    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);

    fn paused(&self) -> bool;

    /// Buffered `(start, end)` ranges in seconds, ordered
    fn buffered(&self) -> Vec<(f64, f64)>;

    fn source(&self) -> Option<Url>;
    fn set_source(&self, src: &Url);
    /// Restart resource selection for the current source
    fn load(&self);

    fn text_tracks(&self) -> Vec<NativeTextTrack>;
    fn set_text_track_mode(&self, index: usize, mode: TextTrackMode);

    /// Request playback. May be refused (autoplay policy, decode failure).
    async fn play(&self) -> Result<()>;
    fn pause(&self);

    fn is_fullscreen(&self) -> bool;
    async fn request_fullscreen(&self) -> Result<()>;
    async fn exit_fullscreen(&self) -> Result<()>;

    fn supports_picture_in_picture(&self) -> bool;
    fn is_picture_in_picture(&self) -> bool;
    async fn request_picture_in_picture(&self) -> Result<()>;
    async fn exit_picture_in_picture(&self) -> Result<()>;
}

/// Percentage of the duration covered by the end of the last buffered range
pub fn buffered_percent(ranges: &[(f64, f64)], duration: f64) -> f64 {
    match ranges.last() {
        Some(&(_, end)) if duration > 0.0 && duration.is_finite() => (end / duration * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// Normalize a duration reported by a resource (NaN / infinite → 0)
pub fn known_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_percent_uses_last_range() {
        assert_eq!(buffered_percent(&[(0.0, 10.0), (20.0, 50.0)], 100.0), 50.0);
        assert_eq!(buffered_percent(&[], 100.0), 0.0);
        assert_eq!(buffered_percent(&[(0.0, 10.0)], 0.0), 0.0);
    }

    #[test]
    fn test_known_duration() {
        assert_eq!(known_duration(f64::NAN), 0.0);
        assert_eq!(known_duration(f64::INFINITY), 0.0);
        assert_eq!(known_duration(42.0), 42.0);
    }

    #[test]
    fn test_readiness() {
        assert!(MediaEvent::CanPlay.is_ready());
        assert!(MediaEvent::CanPlayThrough.is_ready());
        assert!(!MediaEvent::LoadedMetadata.is_ready());
    }
}
