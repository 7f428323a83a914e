//! Playback Coordinator - single source of truth for playback state
//!
//! Coordinates:
//! - User intents (play, seek, volume, rate, captions, presentation modes)
//! - Media resource events folded into [`PlaybackState`]
//! - Quality switching with state preservation (see [`quality`])
//! - Keyboard shortcuts (see [`keyboard`])
//! - Chapter tracking
//!
//! All mutation goes through one async lock. Intents that can only fail for platform
//! reasons (play rejected, fullscreen denied) report on the [`PlayerEvent::Error`]
//! channel; intents a caller can get wrong (unknown quality, chapter index out of
//! range) also return the error.

pub mod keyboard;
pub mod quality;

pub use keyboard::{
    map_key, Focus, KeyCode, KeyInput, KeyOutcome, KeyboardDispatcher, Modifiers, ShortcutAction, SHORTCUTS,
};
pub use quality::{normalize_source, PlaybackSnapshot, QualitySwitchState, SwitchPhase};

use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::events::{Feedback, PlayerEvent};
use crate::media::{buffered_percent, known_duration, MediaEvent, MediaEventReceiver, MediaResource};
use crate::types::{
    chapter_index_at, default_subtitle_track, Chapter, PlaybackState, QualityOption, SessionId, SubtitleTrack, TextTrackMode,
    MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE,
};

/// Capacity of the side-signal channel
const EVENT_CAPACITY: usize = 256;

/// Capacity of the state history channel
const CHANGE_CAPACITY: usize = 1024;

/// Seeks at least this far (seconds) show seek feedback
const SEEK_FEEDBACK_THRESHOLD: f64 = 5.0;

/// Restored volume when unmuting with nothing remembered
const FALLBACK_UNMUTE_VOLUME: f64 = 0.5;

/// Static lists supplied by the embedder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaCatalog {
    pub qualities: Vec<QualityOption>,
    pub chapters: Vec<Chapter>,
    pub subtitles: Vec<SubtitleTrack>,
}

/// A request from an interaction surface, the keyboard or a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "value", rename_all = "snake_case")]
pub enum Intent {
    Play,
    Pause,
    TogglePlay,
    Seek(f64),
    SetVolume(f64),
    ToggleMute,
    SetPlaybackRate(f64),
    ToggleFullscreen,
    TogglePictureInPicture,
    ToggleTheaterMode,
    ToggleCaptions,
    SetQuality(String),
    SetSubtitleLanguage(String),
    SeekToChapter(usize),
}

/// One published state, in publish order
#[derive(Debug, Clone)]
pub struct StateChange {
    pub state: PlaybackState,
    /// When the coordinator published it
    pub at: Instant,
    /// The position moved because the media clock ran, not because of a seek
    pub progress: bool,
}

/// Mutable coordinator state, guarded by one lock
pub(crate) struct CoreState {
    pub(crate) state: PlaybackState,
    /// Volume restored on unmute
    pub(crate) last_volume: f64,
    /// Position at the last seek or time update
    pub(crate) last_time: f64,
    pub(crate) switch: QualitySwitchState,
    /// Bumped by every quality switch
    pub(crate) generation: u64,
    /// Switch whose resume is waiting out the grace delay
    pub(crate) pending_resume: Option<u64>,
    pub(crate) switch_timeout: Option<JoinHandle<()>>,
}

impl CoreState {
    pub(crate) fn abort_switch_timeout(&mut self) {
        if let Some(handle) = self.switch_timeout.take() {
            handle.abort();
        }
    }
}

impl Drop for CoreState {
    fn drop(&mut self) {
        self.abort_switch_timeout();
    }
}

pub(crate) struct CoordinatorInner {
    id: SessionId,
    config: PlayerConfig,
    catalog: MediaCatalog,
    pub(crate) media: Arc<dyn MediaResource>,
    pub(crate) core: RwLock<CoreState>,
    state_tx: watch::Sender<PlaybackState>,
    changes_tx: broadcast::Sender<StateChange>,
    events_tx: broadcast::Sender<PlayerEvent>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for CoordinatorInner {
    fn drop(&mut self) {
        let pump = self.pump.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pump.take() {
            handle.abort();
        }
    }
}

/// Orchestrates one media resource. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    pub(crate) inner: Arc<CoordinatorInner>,
}

impl PlaybackCoordinator {
    /// Create a coordinator bound to `media`
    pub fn new(media: Arc<dyn MediaResource>, catalog: MediaCatalog, config: PlayerConfig) -> Self {
        if config.muted {
            media.set_muted(true);
        }

        let state = PlaybackState {
            current_subtitle_language: default_subtitle_track(&catalog.subtitles).map(|t| t.language.clone()),
            current_time: media.current_time(),
            duration: known_duration(media.duration()),
            volume: media.volume(),
            is_muted: media.muted(),
            playback_rate: media.playback_rate().clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE),
            ..Default::default()
        };

        let (state_tx, _) = watch::channel(state.clone());
        let (changes_tx, _) = broadcast::channel(CHANGE_CAPACITY);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let core = CoreState {
            last_volume: if state.volume > 0.0 { state.volume } else { 1.0 },
            last_time: state.current_time,
            state,
            switch: QualitySwitchState::Idle,
            generation: 0,
            pending_resume: None,
            switch_timeout: None,
        };

        let id = SessionId::new();
        info!(session_id = %id, qualities = catalog.qualities.len(), chapters = catalog.chapters.len(), "Coordinator created");

        Self {
            inner: Arc::new(CoordinatorInner {
                id,
                config,
                catalog,
                media,
                core: RwLock::new(core),
                state_tx,
                changes_tx,
                events_tx,
                pump: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.inner.config
    }

    pub fn catalog(&self) -> &MediaCatalog {
        &self.inner.catalog
    }

    pub fn media(&self) -> &Arc<dyn MediaResource> {
        &self.inner.media
    }

    /// Current state snapshot
    pub async fn state(&self) -> PlaybackState {
        self.inner.core.read().await.state.clone()
    }

    /// Current quality switch state
    pub async fn quality_switch(&self) -> QualitySwitchState {
        self.inner.core.read().await.switch.clone()
    }

    /// Subscribe to state snapshots
    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.inner.state_tx.subscribe()
    }

    /// Subscribe to every published state. Unlike [`subscribe_state`](Self::subscribe_state)
    /// nothing is coalesced, so transitions survive a burst of events.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StateChange> {
        self.inner.changes_tx.subscribe()
    }

    /// Subscribe to side signals
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.inner.events_tx.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<PlayerEvent> {
        self.inner.events_tx.clone()
    }

    fn downgrade(&self) -> Weak<CoordinatorInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn from_weak(weak: &Weak<CoordinatorInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // =========================================================================
    // Event Pump
    // =========================================================================

    /// Spawn a task feeding `events` into [`handle_media_event`](Self::handle_media_event).
    ///
    /// The task stops when the resource closes its stream or the last coordinator
    /// handle is dropped.
    pub fn attach(&self, mut events: MediaEventReceiver) {
        let weak = self.downgrade();
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(coordinator) = PlaybackCoordinator::from_weak(&weak) else { break };
                coordinator.handle_media_event(event).await;
            }
            debug!("Media event pump stopped");
        });

        let mut pump = self.inner.pump.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pump.replace(handle) {
            previous.abort();
        }
    }

    /// Handle every event already queued on `events`. Returns how many were handled.
    pub async fn drain(&self, events: &mut MediaEventReceiver) -> usize {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_media_event(event).await;
            handled += 1;
        }
        handled
    }

    // =========================================================================
    // Publishing
    // =========================================================================

    pub(crate) fn publish(&self, core: &CoreState) {
        self.send_state(core, false);
    }

    fn publish_progress(&self, core: &CoreState) {
        self.send_state(core, true);
    }

    fn send_state(&self, core: &CoreState, progress: bool) {
        self.inner.state_tx.send_replace(core.state.clone());
        let _ = self.inner.changes_tx.send(StateChange {
            state: core.state.clone(),
            at: Instant::now(),
            progress,
        });
    }

    pub(crate) fn emit(&self, event: PlayerEvent) {
        debug!(event = event.name(), "Player event");
        let _ = self.inner.events_tx.send(event);
    }

    /// Surface an error on the event channel
    pub(crate) fn report(&self, err: &Error) {
        warn!(code = err.error_code(), error = %err, "Player error");
        self.emit(PlayerEvent::Error {
            code: err.error_code().to_string(),
            message: err.to_string(),
        });
    }

    /// Recompute the chapter for the current time; emits on change
    pub(crate) fn update_chapter(&self, core: &mut CoreState) {
        let chapters = &self.inner.catalog.chapters;
        let chapter = chapter_index_at(chapters, core.state.current_time).map(|i| chapters[i].clone());

        if chapter != core.state.current_chapter {
            core.state.current_chapter = chapter.clone();
            if let Some(chapter) = chapter {
                info!(title = %chapter.title, "Chapter changed");
                self.emit(PlayerEvent::ChapterChanged { chapter });
            }
        }
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Apply an intent. Only quality, subtitle and chapter intents can fail.
    pub async fn apply(&self, intent: Intent) -> Result<()> {
        match intent {
            Intent::Play => self.play().await,
            Intent::Pause => self.pause().await,
            Intent::TogglePlay => self.toggle_play().await,
            Intent::Seek(time) => self.seek(time).await,
            Intent::SetVolume(volume) => self.set_volume(volume).await,
            Intent::ToggleMute => self.toggle_mute().await,
            Intent::SetPlaybackRate(rate) => self.set_playback_rate(rate).await,
            Intent::ToggleFullscreen => self.toggle_fullscreen().await,
            Intent::TogglePictureInPicture => self.toggle_picture_in_picture().await,
            Intent::ToggleTheaterMode => self.toggle_theater_mode().await,
            Intent::ToggleCaptions => self.toggle_captions().await,
            Intent::SetQuality(id) => return self.set_quality(&id).await,
            Intent::SetSubtitleLanguage(language) => return self.set_subtitle_language(&language).await,
            Intent::SeekToChapter(index) => return self.seek_to_chapter(index).await,
        }
        Ok(())
    }

    /// Start playback. A rejection rolls `is_playing` back and is reported.
    #[instrument(skip(self))]
    pub async fn play(&self) {
        {
            let mut guard = self.inner.core.write().await;
            let core = &mut *guard;
            if let QualitySwitchState::Switching { snapshot, .. } = &mut core.switch {
                snapshot.was_playing = true;
                core.state.is_playing = true;
                self.publish(core);
                debug!("Play deferred until quality switch completes");
                return;
            }
        }

        if let Err(err) = self.inner.media.play().await {
            let mut core = self.inner.core.write().await;
            core.state.is_playing = false;
            self.publish(&core);
            drop(core);
            self.report(&err);
        }
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) {
        let mut guard = self.inner.core.write().await;
        let core = &mut *guard;
        if let QualitySwitchState::Switching { snapshot, .. } = &mut core.switch {
            snapshot.was_playing = false;
            core.state.is_playing = false;
            self.publish(core);
            debug!("Resume after quality switch cancelled");
            return;
        }
        if core.pending_resume.take().is_some() {
            core.state.is_playing = false;
            self.publish(core);
        }
        drop(guard);
        self.inner.media.pause();
    }

    #[instrument(skip(self))]
    pub async fn toggle_play(&self) {
        let is_playing = self.inner.core.read().await.state.is_playing;
        if is_playing {
            self.pause().await;
        } else {
            self.play().await;
        }
        self.emit(PlayerEvent::Feedback {
            feedback: Feedback::play_pause(),
        });
    }

    /// Seek to `time`, clamped to `[0, duration]`
    #[instrument(skip(self))]
    pub async fn seek(&self, time: f64) {
        let mut core = self.inner.core.write().await;
        let clamped = clamp_time(time, core.state.duration);
        let delta = clamped - core.last_time;

        match &mut core.switch {
            QualitySwitchState::Switching {
                phase: SwitchPhase::AwaitingReady,
                snapshot,
                ..
            } => {
                // Restored once the new source is ready
                snapshot.time = clamped;
            }
            _ => self.inner.media.set_current_time(clamped),
        }

        core.state.current_time = clamped;
        core.last_time = clamped;
        self.update_chapter(&mut core);
        self.publish(&core);
        drop(core);

        debug!(time = clamped, delta, "Seek");
        self.emit(PlayerEvent::Seeked { time: clamped });
        if delta.abs() >= SEEK_FEEDBACK_THRESHOLD {
            self.emit(PlayerEvent::Feedback {
                feedback: Feedback::seek(delta),
            });
        }
    }

    /// Set the volume, clamped to `[0, 1]`. A nonzero volume also unmutes.
    #[instrument(skip(self))]
    pub async fn set_volume(&self, volume: f64) {
        let clamped = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };

        let mut core = self.inner.core.write().await;
        self.inner.media.set_volume(clamped);
        core.state.volume = clamped;

        if clamped > 0.0 {
            core.last_volume = clamped;
            if core.state.is_muted {
                core.state.is_muted = false;
                self.inner.media.set_muted(false);
            }
        }

        let muted = core.state.is_muted;
        if let QualitySwitchState::Switching { snapshot, .. } = &mut core.switch {
            snapshot.volume = clamped;
            snapshot.muted = muted;
        }
        self.publish(&core);
        drop(core);

        self.emit(PlayerEvent::VolumeChanged { volume: clamped });
        self.emit(PlayerEvent::Feedback {
            feedback: Feedback::volume(clamped, muted),
        });
    }

    /// Flip mute. Muting remembers the volume; unmuting restores it.
    #[instrument(skip(self))]
    pub async fn toggle_mute(&self) {
        let mut core = self.inner.core.write().await;
        let muted = !core.state.is_muted;

        if muted {
            core.last_volume = core.state.volume;
            self.inner.media.set_muted(true);
        } else {
            let restore = if core.last_volume > 0.0 {
                core.last_volume
            } else {
                FALLBACK_UNMUTE_VOLUME
            };
            self.inner.media.set_muted(false);
            self.inner.media.set_volume(restore);
            core.state.volume = restore;
        }
        core.state.is_muted = muted;

        let volume = core.state.volume;
        if let QualitySwitchState::Switching { snapshot, .. } = &mut core.switch {
            snapshot.volume = volume;
            snapshot.muted = muted;
        }
        self.publish(&core);
        drop(core);

        info!(muted, volume, "Mute toggled");
        self.emit(PlayerEvent::Feedback {
            feedback: Feedback::volume(if muted { 0.0 } else { volume }, muted),
        });
    }

    /// Set the playback rate, clamped to `[0.25, 2.0]`
    #[instrument(skip(self))]
    pub async fn set_playback_rate(&self, rate: f64) {
        if rate.is_nan() {
            warn!("Ignoring NaN playback rate");
            return;
        }
        let clamped = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);

        let mut core = self.inner.core.write().await;
        self.inner.media.set_playback_rate(clamped);
        core.state.playback_rate = clamped;
        if let QualitySwitchState::Switching { snapshot, .. } = &mut core.switch {
            snapshot.rate = clamped;
        }
        self.publish(&core);
    }

    /// Request or exit fullscreen. State follows the resource's change event.
    #[instrument(skip(self))]
    pub async fn toggle_fullscreen(&self) {
        let media = &self.inner.media;
        let result = if media.is_fullscreen() {
            media.exit_fullscreen().await
        } else {
            media.request_fullscreen().await
        };
        if let Err(err) = result {
            self.report(&err);
        }
    }

    /// Request or exit picture-in-picture. No-op unless enabled by configuration.
    #[instrument(skip(self))]
    pub async fn toggle_picture_in_picture(&self) {
        if !self.inner.config.enable_picture_in_picture {
            debug!("Picture-in-picture disabled");
            return;
        }

        let media = &self.inner.media;
        if !media.supports_picture_in_picture() {
            self.report(&Error::unsupported("Picture-in-Picture", "not available on this resource"));
            return;
        }

        let result = if media.is_picture_in_picture() {
            media.exit_picture_in_picture().await
        } else {
            media.request_picture_in_picture().await
        };
        if let Err(err) = result {
            self.report(&err);
        }
    }

    /// Flip theater mode. No-op unless enabled by configuration.
    #[instrument(skip(self))]
    pub async fn toggle_theater_mode(&self) {
        if !self.inner.config.enable_theater_mode {
            debug!("Theater mode disabled");
            return;
        }

        let mut core = self.inner.core.write().await;
        core.state.is_theater_mode = !core.state.is_theater_mode;
        info!(enabled = core.state.is_theater_mode, "Theater mode toggled");
        self.publish(&core);
    }

    /// Flip captions, keeping the first native track's mode in lockstep
    #[instrument(skip(self))]
    pub async fn toggle_captions(&self) {
        let mut core = self.inner.core.write().await;
        let enabled = !core.state.captions_enabled;

        if !self.inner.media.text_tracks().is_empty() {
            let mode = if enabled {
                TextTrackMode::Showing
            } else {
                TextTrackMode::Hidden
            };
            self.inner.media.set_text_track_mode(0, mode);
        }

        core.state.captions_enabled = enabled;
        info!(enabled, "Captions toggled");
        self.publish(&core);
    }

    /// Show the native track for `language` and hide the others
    #[instrument(skip(self))]
    pub async fn set_subtitle_language(&self, language: &str) -> Result<()> {
        let tracks = self.inner.media.text_tracks();
        let selected = tracks
            .iter()
            .position(|track| track.language == language)
            .ok_or_else(|| Error::UnknownSubtitleLanguage(language.to_string()))?;

        let mut core = self.inner.core.write().await;
        for index in 0..tracks.len() {
            let mode = if index == selected {
                TextTrackMode::Showing
            } else {
                TextTrackMode::Hidden
            };
            self.inner.media.set_text_track_mode(index, mode);
        }

        core.state.current_subtitle_language = Some(language.to_string());
        core.state.captions_enabled = true;
        self.publish(&core);
        drop(core);

        info!(language, "Subtitle language changed");
        self.emit(PlayerEvent::SubtitleChanged {
            language: language.to_string(),
        });
        Ok(())
    }

    /// Seek to the start of chapter `index`
    #[instrument(skip(self))]
    pub async fn seek_to_chapter(&self, index: usize) -> Result<()> {
        let chapters = &self.inner.catalog.chapters;
        let chapter = chapters.get(index).ok_or(Error::ChapterOutOfRange {
            index,
            count: chapters.len(),
        })?;

        self.seek(chapter.start_time).await;
        Ok(())
    }

    /// Assign a new source (playlist advancement). Refused during a quality switch.
    #[instrument(skip(self))]
    pub async fn load_source(&self, src: &Url) -> Result<()> {
        let mut core = self.inner.core.write().await;
        if core.switch.is_switching() {
            warn!(src = %src, "Source change refused during quality switch");
            return Err(Error::SourceSyncBlocked);
        }

        core.pending_resume = None;
        self.inner.media.set_source(src);
        self.inner.media.load();

        let state = &mut core.state;
        state.is_playing = false;
        state.is_loading = true;
        state.current_time = 0.0;
        state.duration = 0.0;
        state.buffered = 0.0;
        state.current_quality = None;
        core.last_time = 0.0;
        self.update_chapter(&mut core);
        self.publish(&core);

        info!(src = %src, "Source loaded");
        Ok(())
    }

    // =========================================================================
    // Media Events
    // =========================================================================

    /// Fold a resource event into state
    pub async fn handle_media_event(&self, event: MediaEvent) {
        debug!(event = ?event, "Media event");
        let media = &self.inner.media;
        let mut core = self.inner.core.write().await;
        let phase = core.switch.phase();

        match event {
            // Play / pause during a switch come from the reload; `is_playing`
            // keeps tracking the intent instead.
            MediaEvent::Play => {
                if phase.is_some() {
                    return;
                }
                core.state.is_playing = true;
                core.state.is_loading = false;
                self.publish(&core);
                drop(core);
                self.emit(PlayerEvent::Played);
            }
            MediaEvent::Pause => {
                if phase.is_some() {
                    return;
                }
                core.state.is_playing = false;
                self.publish(&core);
                drop(core);
                self.emit(PlayerEvent::Paused);
            }
            MediaEvent::TimeUpdate => {
                if phase == Some(SwitchPhase::AwaitingReady) {
                    return;
                }
                let time = media.current_time();
                core.state.current_time = time;
                core.last_time = time;
                self.update_chapter(&mut core);
                self.publish_progress(&core);
                drop(core);
                self.emit(PlayerEvent::TimeUpdate { time });
            }
            MediaEvent::DurationChange | MediaEvent::LoadedMetadata => {
                core.state.duration = known_duration(media.duration());
                self.publish(&core);
            }
            MediaEvent::VolumeChange => {
                core.state.volume = media.volume();
                core.state.is_muted = media.muted();
                self.publish(&core);
            }
            MediaEvent::RateChange => {
                core.state.playback_rate = media.playback_rate().clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
                self.publish(&core);
            }
            MediaEvent::LoadStart | MediaEvent::Waiting => {
                core.state.is_loading = true;
                self.publish(&core);
            }
            MediaEvent::CanPlay | MediaEvent::CanPlayThrough => match phase {
                Some(SwitchPhase::AwaitingReady) => self.switch_ready(&mut core),
                Some(SwitchPhase::AwaitingSeek) => {}
                None => {
                    core.state.is_loading = false;
                    self.publish(&core);
                }
            },
            MediaEvent::Progress => {
                let duration = known_duration(media.duration());
                if duration > 0.0 {
                    core.state.buffered = buffered_percent(&media.buffered(), duration);
                    self.publish(&core);
                }
            }
            MediaEvent::Seeking => {}
            MediaEvent::Seeked => {
                if phase == Some(SwitchPhase::AwaitingSeek) {
                    let resume = self.switch_seeked(&mut core);
                    drop(core);
                    if let Some(generation) = resume {
                        self.resume_after_switch(generation).await;
                    }
                }
            }
            MediaEvent::Ended => {
                if phase.is_some() {
                    return;
                }
                core.state.is_playing = false;
                self.publish(&core);
                drop(core);
                info!("Playback ended");
                self.emit(PlayerEvent::Ended);
            }
            MediaEvent::Error { message } => {
                core.state.is_loading = false;
                if phase.is_some() {
                    core.switch = QualitySwitchState::Idle;
                    core.abort_switch_timeout();
                    core.state.is_playing = false;
                }
                self.publish(&core);
                drop(core);
                if let Some(message) = message {
                    debug!(message = %message, "Resource error detail");
                }
                self.report(&Error::LoadFailed);
            }
            MediaEvent::FullscreenChange { active } => {
                core.state.is_fullscreen = active;
                self.publish(&core);
            }
            MediaEvent::PictureInPictureChange { active } => {
                core.state.is_picture_in_picture = active;
                self.publish(&core);
            }
        }
    }
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator").field("id", &self.inner.id).finish()
    }
}

/// Clamp a requested time into `[0, duration]`
fn clamp_time(time: f64, duration: f64) -> f64 {
    if time.is_nan() {
        0.0
    } else {
        time.clamp(0.0, duration.max(0.0))
    }
}

#[cfg(all(test, feature = "simulated"))]
mod tests {
    use super::*;
    use crate::events::FeedbackKind;
    use crate::media::{SimulatedMedia, SimulatedMediaConfig};
    use crate::types::NativeTextTrack;

    fn src() -> Url {
        Url::parse("https://cdn.example.com/video.mp4").unwrap()
    }

    async fn setup(duration: f64) -> (PlaybackCoordinator, Arc<SimulatedMedia>, MediaEventReceiver) {
        setup_with(duration, MediaCatalog::default(), PlayerConfig::default(), SimulatedMediaConfig::default()).await
    }

    async fn setup_with(
        duration: f64,
        catalog: MediaCatalog,
        config: PlayerConfig,
        media_config: SimulatedMediaConfig,
    ) -> (PlaybackCoordinator, Arc<SimulatedMedia>, MediaEventReceiver) {
        let media_config = media_config.with_duration(&src(), duration);
        let (media, mut rx) = SimulatedMedia::with_source(src(), media_config);
        let coordinator = PlaybackCoordinator::new(media.clone(), catalog, config);
        coordinator.drain(&mut rx).await;
        (coordinator, media, rx)
    }

    fn drain_events(rx: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    fn feedback_texts(events: &[PlayerEvent], kind: FeedbackKind) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::Feedback { feedback } if feedback.kind == kind => Some(feedback.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_ready_after_load() {
        let (coordinator, _media, _rx) = setup(60.0).await;
        let state = coordinator.state().await;
        assert!(!state.is_loading);
        assert_eq!(state.duration, 60.0);
    }

    #[tokio::test]
    async fn test_seek_clamps() {
        let (coordinator, media, _rx) = setup(60.0).await;

        coordinator.seek(90.0).await;
        assert_eq!(coordinator.state().await.current_time, 60.0);
        assert_eq!(media.current_time(), 60.0);

        coordinator.seek(-4.0).await;
        assert_eq!(coordinator.state().await.current_time, 0.0);
    }

    #[tokio::test]
    async fn test_seek_with_unknown_duration_goes_to_zero() {
        let config = SimulatedMediaConfig {
            auto_ready: false,
            ..Default::default()
        };
        let (coordinator, _media, _rx) = setup_with(60.0, MediaCatalog::default(), PlayerConfig::default(), config).await;
        coordinator.seek(30.0).await;
        assert_eq!(coordinator.state().await.current_time, 0.0);
    }

    #[tokio::test]
    async fn test_seek_feedback_threshold() {
        let (coordinator, _media, _rx) = setup(100.0).await;
        let mut events = coordinator.subscribe_events();

        coordinator.seek(4.0).await;
        coordinator.seek(14.0).await;
        coordinator.seek(9.0).await;

        let events = drain_events(&mut events);
        assert_eq!(feedback_texts(&events, FeedbackKind::Seek), vec!["+10s", "-5s"]);
        let seeks = events.iter().filter(|e| matches!(e, PlayerEvent::Seeked { .. })).count();
        assert_eq!(seeks, 3);
    }

    #[tokio::test]
    async fn test_volume_clamped_and_unmutes() {
        let (coordinator, _media, _rx) = setup(60.0).await;
        coordinator.toggle_mute().await;
        assert!(coordinator.state().await.is_muted);

        coordinator.set_volume(1.7).await;
        let state = coordinator.state().await;
        assert_eq!(state.volume, 1.0);
        assert!(!state.is_muted);

        coordinator.set_volume(-1.0).await;
        assert_eq!(coordinator.state().await.volume, 0.0);
    }

    #[tokio::test]
    async fn test_mute_round_trip_restores_volume() {
        let (coordinator, media, _rx) = setup(60.0).await;
        coordinator.set_volume(0.7).await;
        coordinator.toggle_mute().await;
        assert!(media.muted());

        coordinator.toggle_mute().await;
        let state = coordinator.state().await;
        assert!(!state.is_muted);
        assert_eq!(state.volume, 0.7);
    }

    #[tokio::test]
    async fn test_unmute_from_zero_falls_back() {
        let (coordinator, _media, _rx) = setup(60.0).await;
        let mut events = coordinator.subscribe_events();

        coordinator.set_volume(0.0).await;
        coordinator.toggle_mute().await;
        coordinator.toggle_mute().await;

        assert_eq!(coordinator.state().await.volume, 0.5);
        let texts = feedback_texts(&drain_events(&mut events), FeedbackKind::Volume);
        assert_eq!(texts, vec!["0%", "Muted", "50%"]);
    }

    #[tokio::test]
    async fn test_rate_clamped() {
        let (coordinator, media, _rx) = setup(60.0).await;
        coordinator.set_playback_rate(3.0).await;
        assert_eq!(coordinator.state().await.playback_rate, 2.0);
        coordinator.set_playback_rate(0.1).await;
        assert_eq!(media.playback_rate(), 0.25);
    }

    #[tokio::test]
    async fn test_play_rejection_rolls_back() {
        let (coordinator, media, mut rx) = setup(60.0).await;
        let mut events = coordinator.subscribe_events();
        media.set_reject_play(Some("autoplay blocked".into()));

        coordinator.play().await;
        coordinator.drain(&mut rx).await;

        assert!(!coordinator.state().await.is_playing);
        let events = drain_events(&mut events);
        assert!(events
            .iter()
            .any(|e| matches!(e, PlayerEvent::Error { code, .. } if code == "PLAYBACK_REJECTED")));
    }

    #[tokio::test]
    async fn test_play_pause_follow_events() {
        let (coordinator, _media, mut rx) = setup(60.0).await;

        coordinator.toggle_play().await;
        assert!(!coordinator.state().await.is_playing);
        coordinator.drain(&mut rx).await;
        assert!(coordinator.state().await.is_playing);

        coordinator.toggle_play().await;
        coordinator.drain(&mut rx).await;
        assert!(!coordinator.state().await.is_playing);
    }

    #[tokio::test]
    async fn test_picture_in_picture_disabled_is_noop() {
        let config = PlayerConfig {
            enable_picture_in_picture: false,
            ..Default::default()
        };
        let (coordinator, media, _rx) =
            setup_with(60.0, MediaCatalog::default(), config, SimulatedMediaConfig::default()).await;
        coordinator.toggle_picture_in_picture().await;
        assert!(!media.is_picture_in_picture());
    }

    #[tokio::test]
    async fn test_fullscreen_state_follows_change_event() {
        let (coordinator, _media, mut rx) = setup(60.0).await;
        coordinator.toggle_fullscreen().await;
        assert!(!coordinator.state().await.is_fullscreen);
        coordinator.drain(&mut rx).await;
        assert!(coordinator.state().await.is_fullscreen);
    }

    #[tokio::test]
    async fn test_fullscreen_unsupported_reports_error() {
        let media_config = SimulatedMediaConfig {
            fullscreen_supported: false,
            ..Default::default()
        };
        let (coordinator, _media, _rx) =
            setup_with(60.0, MediaCatalog::default(), PlayerConfig::default(), media_config).await;
        let mut events = coordinator.subscribe_events();

        coordinator.toggle_fullscreen().await;
        assert!(!coordinator.state().await.is_fullscreen);
        assert!(matches!(drain_events(&mut events).as_slice(), [PlayerEvent::Error { .. }]));
    }

    #[tokio::test]
    async fn test_theater_mode() {
        let (coordinator, _media, _rx) = setup(60.0).await;
        coordinator.toggle_theater_mode().await;
        assert!(coordinator.state().await.is_theater_mode);

        let config = PlayerConfig {
            enable_theater_mode: false,
            ..Default::default()
        };
        let (coordinator, _media, _rx) =
            setup_with(60.0, MediaCatalog::default(), config, SimulatedMediaConfig::default()).await;
        coordinator.toggle_theater_mode().await;
        assert!(!coordinator.state().await.is_theater_mode);
    }

    fn tracks() -> Vec<NativeTextTrack> {
        ["en", "es"]
            .iter()
            .map(|lang| NativeTextTrack {
                label: lang.to_uppercase(),
                language: lang.to_string(),
                mode: TextTrackMode::Disabled,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_captions_toggle_first_track() {
        let media_config = SimulatedMediaConfig {
            text_tracks: tracks(),
            ..Default::default()
        };
        let (coordinator, media, _rx) =
            setup_with(60.0, MediaCatalog::default(), PlayerConfig::default(), media_config).await;

        coordinator.toggle_captions().await;
        assert!(coordinator.state().await.captions_enabled);
        assert_eq!(media.text_tracks()[0].mode, TextTrackMode::Showing);

        coordinator.toggle_captions().await;
        assert!(!coordinator.state().await.captions_enabled);
        assert_eq!(media.text_tracks()[0].mode, TextTrackMode::Hidden);
    }

    #[tokio::test]
    async fn test_captions_toggle_without_tracks() {
        let (coordinator, _media, _rx) = setup(60.0).await;
        coordinator.toggle_captions().await;
        assert!(coordinator.state().await.captions_enabled);
    }

    #[tokio::test]
    async fn test_subtitle_language() {
        let media_config = SimulatedMediaConfig {
            text_tracks: tracks(),
            ..Default::default()
        };
        let (coordinator, media, _rx) =
            setup_with(60.0, MediaCatalog::default(), PlayerConfig::default(), media_config).await;
        let mut events = coordinator.subscribe_events();

        coordinator.set_subtitle_language("es").await.unwrap();
        let modes: Vec<_> = media.text_tracks().iter().map(|t| t.mode).collect();
        assert_eq!(modes, vec![TextTrackMode::Hidden, TextTrackMode::Showing]);

        let state = coordinator.state().await;
        assert!(state.captions_enabled);
        assert_eq!(state.current_subtitle_language.as_deref(), Some("es"));
        assert_eq!(
            drain_events(&mut events),
            vec![PlayerEvent::SubtitleChanged {
                language: "es".into()
            }]
        );

        assert!(matches!(
            coordinator.set_subtitle_language("fr").await,
            Err(Error::UnknownSubtitleLanguage(_))
        ));
    }

    #[tokio::test]
    async fn test_chapter_tracking_and_navigation() {
        let catalog = MediaCatalog {
            chapters: vec![Chapter::new("Intro", 0.0, 10.0), Chapter::new("Main", 10.0, 60.0)],
            ..Default::default()
        };
        let (coordinator, _media, _rx) =
            setup_with(60.0, catalog, PlayerConfig::default(), SimulatedMediaConfig::default()).await;
        let mut events = coordinator.subscribe_events();

        coordinator.seek_to_chapter(1).await.unwrap();
        coordinator.seek(30.0).await;

        let state = coordinator.state().await;
        assert_eq!(state.current_chapter.as_ref().map(|c| c.title.as_str()), Some("Main"));
        let changes = drain_events(&mut events)
            .into_iter()
            .filter(|e| matches!(e, PlayerEvent::ChapterChanged { .. }))
            .count();
        assert_eq!(changes, 1);

        assert!(matches!(
            coordinator.seek_to_chapter(5).await,
            Err(Error::ChapterOutOfRange { index: 5, count: 2 })
        ));
    }

    #[tokio::test]
    async fn test_time_updates_follow_playback() {
        let (coordinator, media, mut rx) = setup(60.0).await;
        coordinator.play().await;
        media.advance(3.0);
        coordinator.drain(&mut rx).await;

        let state = coordinator.state().await;
        assert_eq!(state.current_time, 3.0);
        assert!(state.buffered > 0.0);
    }

    #[tokio::test]
    async fn test_ended() {
        let (coordinator, media, mut rx) = setup(10.0).await;
        let mut events = coordinator.subscribe_events();
        coordinator.play().await;
        media.advance(20.0);
        coordinator.drain(&mut rx).await;

        assert!(!coordinator.state().await.is_playing);
        assert!(drain_events(&mut events).contains(&PlayerEvent::Ended));
    }

    #[tokio::test]
    async fn test_load_failure() {
        let (coordinator, media, mut rx) = setup(10.0).await;
        let mut events = coordinator.subscribe_events();
        media.fail_load("decode error");
        coordinator.drain(&mut rx).await;

        assert!(!coordinator.state().await.is_loading);
        assert_eq!(
            drain_events(&mut events),
            vec![PlayerEvent::Error {
                code: "LOAD_FAILED".into(),
                message: "Video failed to load".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_attached_pump() {
        let media_config = SimulatedMediaConfig::default().with_duration(&src(), 42.0);
        let (media, rx) = SimulatedMedia::with_source(src(), media_config);
        let coordinator = PlaybackCoordinator::new(media, MediaCatalog::default(), PlayerConfig::default());
        let mut state = coordinator.subscribe_state();

        coordinator.attach(rx);
        while state.borrow_and_update().is_loading {
            state.changed().await.unwrap();
        }
        assert_eq!(coordinator.state().await.duration, 42.0);
    }

    #[tokio::test]
    async fn test_apply_intents() {
        let (coordinator, _media, _rx) = setup(60.0).await;
        coordinator.apply(Intent::Seek(12.0)).await.unwrap();
        coordinator.apply(Intent::SetPlaybackRate(1.5)).await.unwrap();
        let state = coordinator.state().await;
        assert_eq!(state.current_time, 12.0);
        assert_eq!(state.playback_rate, 1.5);
        assert!(coordinator.apply(Intent::SetQuality("4k".into())).await.is_err());
    }
}
