//! In-process media resource with scriptable behavior
//!
//! Used by the headless CLI and by tests. Loading, seek completion, play rejection and
//! feature support can be left automatic or driven step by step, which makes the
//! coordinator's event ordering observable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use super::{known_duration, MediaEvent, MediaEventReceiver, MediaResource};
use crate::error::{Error, Result};
use crate::types::{NativeTextTrack, TextTrackMode};

/// Behavior knobs for [`SimulatedMedia`]
#[derive(Debug, Clone)]
pub struct SimulatedMediaConfig {
    /// Duration used for sources without an explicit entry
    pub default_duration: f64,
    /// Per-source durations keyed by URL string
    pub durations: HashMap<String, f64>,
    /// Finish loading as soon as `load` is called
    pub auto_ready: bool,
    /// Confirm seeks as soon as the time is set
    pub auto_seek: bool,
    /// Seconds buffered ahead of the playhead
    pub buffer_ahead: f64,
    pub fullscreen_supported: bool,
    pub picture_in_picture_supported: bool,
    pub text_tracks: Vec<NativeTextTrack>,
}

impl Default for SimulatedMediaConfig {
    fn default() -> Self {
        Self {
            default_duration: 120.0,
            durations: HashMap::new(),
            auto_ready: true,
            auto_seek: true,
            buffer_ahead: 30.0,
            fullscreen_supported: true,
            picture_in_picture_supported: true,
            text_tracks: Vec::new(),
        }
    }
}

impl SimulatedMediaConfig {
    pub fn with_duration(mut self, src: &Url, duration: f64) -> Self {
        self.durations.insert(src.to_string(), duration);
        self
    }
}

#[derive(Debug)]
struct SimState {
    time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    rate: f64,
    paused: bool,
    source: Option<Url>,
    loaded: bool,
    tracks: Vec<NativeTextTrack>,
    fullscreen: bool,
    picture_in_picture: bool,
    reject_play: Option<String>,
    load_count: usize,
}

/// Scriptable [`MediaResource`]
pub struct SimulatedMedia {
    config: SimulatedMediaConfig,
    state: Mutex<SimState>,
    events: mpsc::UnboundedSender<MediaEvent>,
}

impl SimulatedMedia {
    /// Create a resource and the receiving end of its event stream
    pub fn new(config: SimulatedMediaConfig) -> (Arc<Self>, MediaEventReceiver) {
        let (events, rx) = mpsc::unbounded_channel();
        let state = SimState {
            time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            paused: true,
            source: None,
            loaded: false,
            tracks: config.text_tracks.clone(),
            fullscreen: false,
            picture_in_picture: false,
            reject_play: None,
            load_count: 0,
        };

        let media = Arc::new(Self {
            config,
            state: Mutex::new(state),
            events,
        });
        (media, rx)
    }

    /// Create a resource with `src` assigned and loaded
    pub fn with_source(src: Url, config: SimulatedMediaConfig) -> (Arc<Self>, MediaEventReceiver) {
        let (media, rx) = Self::new(config);
        media.set_source(&src);
        media.load();
        (media, rx)
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: MediaEvent) {
        debug!(event = ?event, "simulated media event");
        let _ = self.events.send(event);
    }

    /// Complete a pending load: metadata, duration and readiness
    pub fn finish_load(&self) {
        {
            let mut state = self.state();
            let duration = state
                .source
                .as_ref()
                .and_then(|src| self.config.durations.get(src.as_str()).copied())
                .unwrap_or(self.config.default_duration);
            state.duration = duration;
            state.loaded = true;
        }
        self.emit(MediaEvent::DurationChange);
        self.emit(MediaEvent::LoadedMetadata);
        self.emit(MediaEvent::CanPlay);
        self.emit(MediaEvent::Progress);
    }

    /// Fail the current load
    pub fn fail_load(&self, message: impl Into<String>) {
        self.state().loaded = false;
        self.emit(MediaEvent::Error {
            message: Some(message.into()),
        });
    }

    /// Confirm the last seek (only needed with `auto_seek` off)
    pub fn complete_seek(&self) {
        self.emit(MediaEvent::Seeked);
        self.emit(MediaEvent::TimeUpdate);
    }

    /// Make subsequent `play` calls fail with `reason`
    pub fn set_reject_play(&self, reason: Option<String>) {
        self.state().reject_play = reason;
    }

    /// Number of times `load` was called
    pub fn load_count(&self) -> usize {
        self.state().load_count
    }

    /// Advance the clock by `seconds` of wall time
    pub fn advance(&self, seconds: f64) {
        let ended = {
            let mut state = self.state();
            if state.paused || !state.loaded {
                return;
            }
            state.time += seconds * state.rate;
            if state.time >= state.duration {
                state.time = state.duration;
                state.paused = true;
                true
            } else {
                false
            }
        };

        self.emit(MediaEvent::TimeUpdate);
        self.emit(MediaEvent::Progress);
        if ended {
            self.emit(MediaEvent::Pause);
            self.emit(MediaEvent::Ended);
        }
    }

    /// Simulate the user leaving fullscreen through the platform (Esc key)
    pub fn platform_exit_fullscreen(&self) {
        self.state().fullscreen = false;
        self.emit(MediaEvent::FullscreenChange { active: false });
    }
}

#[async_trait]
impl MediaResource for SimulatedMedia {
    fn current_time(&self) -> f64 {
        self.state().time
    }

    fn set_current_time(&self, time: f64) {
        {
            let mut state = self.state();
            let duration = known_duration(state.duration);
            state.time = if duration > 0.0 {
                time.clamp(0.0, duration)
            } else {
                time.max(0.0)
            };
        }
        self.emit(MediaEvent::Seeking);
        if self.config.auto_seek {
            self.complete_seek();
        }
    }

    fn duration(&self) -> f64 {
        self.state().duration
    }

    fn volume(&self) -> f64 {
        self.state().volume
    }

    fn set_volume(&self, volume: f64) {
        self.state().volume = volume.clamp(0.0, 1.0);
        self.emit(MediaEvent::VolumeChange);
    }

    fn muted(&self) -> bool {
        self.state().muted
    }

    fn set_muted(&self, muted: bool) {
        self.state().muted = muted;
        self.emit(MediaEvent::VolumeChange);
    }

    fn playback_rate(&self) -> f64 {
        self.state().rate
    }

    fn set_playback_rate(&self, rate: f64) {
        self.state().rate = rate;
        self.emit(MediaEvent::RateChange);
    }

    fn paused(&self) -> bool {
        self.state().paused
    }

    fn buffered(&self) -> Vec<(f64, f64)> {
        let state = self.state();
        if !state.loaded {
            return Vec::new();
        }
        let end = (state.time + self.config.buffer_ahead).min(state.duration);
        vec![(0.0, end)]
    }

    fn source(&self) -> Option<Url> {
        self.state().source.clone()
    }

    fn set_source(&self, src: &Url) {
        let mut state = self.state();
        state.source = Some(src.clone());
        state.loaded = false;
    }

    fn load(&self) {
        {
            let mut state = self.state();
            state.load_count += 1;
            state.time = 0.0;
            state.duration = f64::NAN;
            state.paused = true;
            state.loaded = false;
        }
        self.emit(MediaEvent::LoadStart);
        if self.config.auto_ready {
            self.finish_load();
        }
    }

    fn text_tracks(&self) -> Vec<NativeTextTrack> {
        self.state().tracks.clone()
    }

    fn set_text_track_mode(&self, index: usize, mode: TextTrackMode) {
        if let Some(track) = self.state().tracks.get_mut(index) {
            track.mode = mode;
        }
    }

    async fn play(&self) -> Result<()> {
        {
            let mut state = self.state();
            if let Some(reason) = &state.reject_play {
                return Err(Error::PlaybackRejected(reason.clone()));
            }
            if !state.paused {
                return Ok(());
            }
            state.paused = false;
        }
        self.emit(MediaEvent::Play);
        Ok(())
    }

    fn pause(&self) {
        {
            let mut state = self.state();
            if state.paused {
                return;
            }
            state.paused = true;
        }
        self.emit(MediaEvent::Pause);
    }

    fn is_fullscreen(&self) -> bool {
        self.state().fullscreen
    }

    async fn request_fullscreen(&self) -> Result<()> {
        if !self.config.fullscreen_supported {
            return Err(Error::unsupported("Fullscreen", "request denied"));
        }
        self.state().fullscreen = true;
        self.emit(MediaEvent::FullscreenChange { active: true });
        Ok(())
    }

    async fn exit_fullscreen(&self) -> Result<()> {
        self.state().fullscreen = false;
        self.emit(MediaEvent::FullscreenChange { active: false });
        Ok(())
    }

    fn supports_picture_in_picture(&self) -> bool {
        self.config.picture_in_picture_supported
    }

    fn is_picture_in_picture(&self) -> bool {
        self.state().picture_in_picture
    }

    async fn request_picture_in_picture(&self) -> Result<()> {
        if !self.config.picture_in_picture_supported {
            return Err(Error::unsupported("Picture-in-Picture", "API absent"));
        }
        self.state().picture_in_picture = true;
        self.emit(MediaEvent::PictureInPictureChange { active: true });
        Ok(())
    }

    async fn exit_picture_in_picture(&self) -> Result<()> {
        self.state().picture_in_picture = false;
        self.emit(MediaEvent::PictureInPictureChange { active: false });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> Url {
        Url::parse("https://cdn.example.com/video.mp4").unwrap()
    }

    fn drain(rx: &mut MediaEventReceiver) -> Vec<MediaEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn test_auto_load_emits_readiness() {
        let (media, mut rx) = SimulatedMedia::with_source(src(), SimulatedMediaConfig::default());
        let events = drain(&mut rx);
        assert_eq!(events[0], MediaEvent::LoadStart);
        assert!(events.contains(&MediaEvent::CanPlay));
        assert_eq!(media.duration(), 120.0);
        assert_eq!(media.load_count(), 1);
    }

    #[test]
    fn test_manual_load() {
        let config = SimulatedMediaConfig {
            auto_ready: false,
            ..Default::default()
        }
        .with_duration(&src(), 30.0);
        let (media, mut rx) = SimulatedMedia::with_source(src(), config);
        assert_eq!(drain(&mut rx), vec![MediaEvent::LoadStart]);
        assert!(media.duration().is_nan());

        media.finish_load();
        assert_eq!(media.duration(), 30.0);
        assert!(drain(&mut rx).contains(&MediaEvent::CanPlay));
    }

    #[tokio::test]
    async fn test_play_and_advance_to_end() {
        let config = SimulatedMediaConfig::default().with_duration(&src(), 10.0);
        let (media, mut rx) = SimulatedMedia::with_source(src(), config);
        drain(&mut rx);

        media.play().await.unwrap();
        media.advance(4.0);
        assert_eq!(media.current_time(), 4.0);

        media.advance(20.0);
        assert_eq!(media.current_time(), 10.0);
        assert!(media.paused());
        let events = drain(&mut rx);
        assert_eq!(events.last(), Some(&MediaEvent::Ended));
    }

    #[tokio::test]
    async fn test_rejected_play() {
        let (media, _rx) = SimulatedMedia::with_source(src(), SimulatedMediaConfig::default());
        media.set_reject_play(Some("autoplay blocked".into()));
        let err = media.play().await.unwrap_err();
        assert!(matches!(err, Error::PlaybackRejected(_)));
        assert!(media.paused());
    }

    #[tokio::test]
    async fn test_unsupported_picture_in_picture() {
        let config = SimulatedMediaConfig {
            picture_in_picture_supported: false,
            ..Default::default()
        };
        let (media, _rx) = SimulatedMedia::with_source(src(), config);
        assert!(media.request_picture_in_picture().await.is_err());
        assert!(!media.is_picture_in_picture());
    }
}
