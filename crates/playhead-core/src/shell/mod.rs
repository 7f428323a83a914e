//! Player shell
//!
//! Composes one coordinator with the interaction surfaces, overlays and
//! trackers a complete player needs. The host forwards raw input to the shell,
//! calls [`PlayerShell::process`] whenever a timer from
//! [`PlayerShell::next_deadline`] fires or events may have arrived, and draws
//! the returned [`ShellView`].
//!
//! Errors raised while handling input are reported on the event stream rather
//! than returned; only explicit selections (quality, share, playlist) return them.

pub mod controls;
pub mod feedback;
pub mod gestures;
pub mod playlist;

pub use controls::ControlsVisibility;
pub use feedback::FeedbackOverlay;
pub use gestures::GestureRecognizer;
pub use playlist::{EndAction, Playlist, PlaylistSource};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::analytics::{AnalyticsSnapshot, AnalyticsTracker};
use crate::captions::{CaptionChange, CaptionPosition, CaptionScheduler, ResolvedCaptionStyle};
use crate::coordinator::{Focus, Intent, KeyInput, KeyOutcome, KeyboardDispatcher, PlaybackCoordinator};
use crate::error::{Error, Result};
use crate::events::{Feedback, PlayerEvent};
use crate::format::format_progress;
use crate::interaction::{
    CaptionOverlay, CaptionPlacement, DragSubscription, DragTarget, Point, PointerKind, PreviewRequest, QualityMenu,
    Rect, SeekBar, SeekPress, ShareAction, ShareMenu, ShareTarget, SliderOrientation, SpeedMenu, VolumeControl,
};
use crate::types::CaptionCue;

/// Client rectangles of the parts the shell hit-tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellLayout {
    pub player: Rect,
    pub seek_track: Rect,
    pub volume_slider: Rect,
    #[serde(default)]
    pub volume_orientation: SliderOrientation,
}

/// The custom caption currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleCaption {
    pub text: String,
    pub style: ResolvedCaptionStyle,
    pub placement: CaptionPlacement,
}

/// Everything the host needs to draw one frame of chrome
#[derive(Debug, Clone, PartialEq)]
pub struct ShellView {
    pub controls_visible: bool,
    pub help_visible: bool,
    pub caption: Option<VisibleCaption>,
    pub feedback: Vec<Feedback>,
    /// `current / duration`, following the seek drag
    pub time_label: String,
    pub played_percent: f64,
    pub buffered_percent: f64,
}

pub struct PlayerShell {
    coordinator: PlaybackCoordinator,
    events: broadcast::Receiver<PlayerEvent>,
    keyboard: KeyboardDispatcher,
    seek_bar: SeekBar,
    volume: VolumeControl,
    caption_overlay: CaptionOverlay,
    speed_menu: SpeedMenu,
    quality_menu: QualityMenu,
    share_menu: Option<ShareMenu>,
    controls: ControlsVisibility,
    feedback: FeedbackOverlay,
    gestures: GestureRecognizer,
    captions: CaptionScheduler,
    caption_text: Option<(String, ResolvedCaptionStyle)>,
    playlist: Option<Playlist>,
    analytics: Option<AnalyticsTracker>,
}

impl PlayerShell {
    pub fn new(coordinator: PlaybackCoordinator, layout: ShellLayout) -> Self {
        let config = coordinator.config();
        Self {
            events: coordinator.subscribe_events(),
            keyboard: KeyboardDispatcher::new(),
            seek_bar: SeekBar::new(layout.seek_track),
            volume: VolumeControl::new(layout.volume_slider, layout.volume_orientation, config.volume_hide_delay()),
            caption_overlay: CaptionOverlay::new(layout.player, CaptionPosition::default(), true),
            speed_menu: SpeedMenu::default(),
            quality_menu: QualityMenu::default(),
            share_menu: None,
            controls: ControlsVisibility::new(config.controls_hide_delay()),
            feedback: FeedbackOverlay::new(),
            gestures: GestureRecognizer::new(layout.player.width),
            captions: CaptionScheduler::new(Vec::new()),
            caption_text: None,
            playlist: None,
            analytics: None,
            coordinator,
        }
    }

    pub fn with_captions(mut self, cues: Vec<CaptionCue>) -> Self {
        self.captions.set_cues(cues);
        self.caption_text = None;
        self
    }

    pub fn with_playlist(mut self, playlist: Playlist) -> Self {
        self.playlist = Some(playlist);
        self
    }

    /// Enable the share menu for `page`; ignored when sharing is disabled
    pub fn with_share(mut self, page: Url, title: Option<String>) -> Self {
        if self.coordinator.config().enable_social_share {
            self.share_menu = Some(ShareMenu::new(page, title));
        }
        self
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    pub fn speed_menu(&mut self) -> &mut SpeedMenu {
        &mut self.speed_menu
    }

    pub fn quality_menu(&mut self) -> &mut QualityMenu {
        &mut self.quality_menu
    }

    pub fn share_menu(&mut self) -> Option<&mut ShareMenu> {
        self.share_menu.as_mut()
    }

    /// Re-measure after a resize or fullscreen change
    pub fn set_layout(&mut self, layout: ShellLayout) {
        self.seek_bar.set_track(layout.seek_track);
        self.volume.set_slider(layout.volume_slider);
        self.caption_overlay.set_player(layout.player);
        self.gestures.set_width(layout.player.width);
    }

    /// Start trackers and honor autoplay
    pub async fn start(&mut self, now: Instant) {
        let config = self.coordinator.config();
        if config.enable_analytics && self.analytics.is_none() {
            self.analytics = Some(AnalyticsTracker::spawn(&self.coordinator));
        }
        let autoplay = config.autoplay;
        self.controls.activity(now);

        info!(session_id = %self.coordinator.id(), autoplay, "Player shell started");
        if autoplay {
            self.coordinator.play().await;
        }
    }

    pub async fn analytics(&self) -> Option<AnalyticsSnapshot> {
        match &self.analytics {
            Some(tracker) => Some(tracker.snapshot().await),
            None => None,
        }
    }

    async fn dispatch(&self, intent: Intent) {
        if let Err(err) = self.coordinator.apply(intent).await {
            self.coordinator.report(&err);
        }
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    pub async fn key_down(&mut self, input: KeyInput, focus: Focus, now: Instant) -> KeyOutcome {
        if focus.is_inside_player() {
            self.controls.activity(now);
        }
        self.coordinator.handle_key(&mut self.keyboard, input, focus).await
    }

    pub fn close_help(&mut self) {
        self.keyboard.close_help();
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    /// Pointer moved over the player; returns a preview request over the seek bar
    pub async fn pointer_move(&mut self, at: Point, now: Instant) -> Option<PreviewRequest> {
        self.controls.activity(now);
        if !self.seek_bar.track().contains(at) {
            self.seek_bar.pointer_leave();
            return None;
        }
        let duration = self.coordinator.state().await.duration;
        self.seek_bar.pointer_move(at.x, duration)
    }

    pub fn pointer_leave(&mut self) {
        self.seek_bar.pointer_leave();
        self.controls.leave();
    }

    /// Pointer entered or left one of the controls
    pub fn set_hovering_control(&mut self, hovering: bool) {
        self.controls.set_hovering_control(hovering);
    }

    /// Press on the seek bar: click-to-seek, or a drag when the thumb is hit
    pub async fn seek_bar_press(&mut self, at: Point, pointer: PointerKind) -> Option<DragSubscription> {
        let state = self.coordinator.state().await;
        match self.seek_bar.pointer_down(at, pointer, state.current_time, state.duration)? {
            SeekPress::Drag(drag) => Some(drag),
            SeekPress::Seek(intent) => {
                self.dispatch(intent).await;
                None
            }
        }
    }

    pub async fn volume_slider_press(&mut self, at: Point, pointer: PointerKind) -> DragSubscription {
        let (drag, intent) = self.volume.pointer_down(at, pointer);
        self.controls.set_slider_open(true);
        self.dispatch(intent).await;
        drag
    }

    pub fn caption_press(&mut self, at: Point, caption: Rect, pointer: PointerKind) -> Option<DragSubscription> {
        self.caption_overlay.pointer_down(at, caption, pointer)
    }

    /// Document-level move while a drag is held
    pub async fn drag_move(&mut self, drag: &DragSubscription, at: Point) {
        let intent = match drag.target() {
            DragTarget::SeekBar => {
                let duration = self.coordinator.state().await.duration;
                self.seek_bar.drag_move(drag, at.x, duration)
            }
            DragTarget::Volume => self.volume.drag_move(drag, at),
            DragTarget::CaptionOverlay => {
                self.caption_overlay.drag_move(drag, at);
                None
            }
        };
        if let Some(intent) = intent {
            self.dispatch(intent).await;
        }
    }

    pub fn drag_end(&mut self, drag: DragSubscription, now: Instant) {
        match drag.target() {
            DragTarget::SeekBar => self.seek_bar.drag_end(drag),
            DragTarget::Volume => self.volume.drag_end(drag, now),
            DragTarget::CaptionOverlay => self.caption_overlay.drag_end(drag),
        }
    }

    pub fn volume_enter(&mut self) {
        self.volume.enter();
        self.controls.set_slider_open(true);
    }

    pub fn volume_leave(&mut self, now: Instant) {
        self.volume.leave(now);
    }

    /// Mouse click mutes; the first tap only reveals the slider
    pub async fn volume_button(&mut self, pointer: PointerKind, now: Instant) {
        let intent = match pointer {
            PointerKind::Mouse => Some(self.volume.button_click()),
            PointerKind::Touch => self.volume.button_tap(now),
        };
        self.controls.set_slider_open(self.volume.is_open());
        if let Some(intent) = intent {
            self.dispatch(intent).await;
        }
    }

    // =========================================================================
    // Touch
    // =========================================================================

    pub async fn touch_start(&mut self, at: Point, now: Instant) {
        let time = self.coordinator.state().await.current_time;
        self.controls.activity(now);
        self.gestures.touch_start(at, now, time);
    }

    pub async fn touch_move(&mut self, at: Point) {
        let duration = self.coordinator.state().await.duration;
        if let Some(intent) = self.gestures.touch_move(at, duration) {
            self.dispatch(intent).await;
        }
    }

    pub async fn touch_end(&mut self, at: Point, now: Instant) {
        if let Some(intent) = self.gestures.touch_end(at, now) {
            self.dispatch(intent).await;
        }
    }

    // =========================================================================
    // Menus
    // =========================================================================

    pub async fn select_speed(&mut self, rate: f64) {
        let intent = self.speed_menu.select(rate);
        self.dispatch(intent).await;
    }

    pub async fn select_quality(&mut self, quality_id: &str) -> Result<()> {
        let intent = self.quality_menu.select(quality_id);
        let result = self.coordinator.apply(intent).await;
        if let Err(err) = &result {
            self.coordinator.report(err);
        }
        result
    }

    /// Resolve a share target at the current position and announce it
    pub async fn share(&mut self, target: ShareTarget) -> Result<ShareAction> {
        let time = self.coordinator.state().await.current_time;
        let menu = self
            .share_menu
            .as_mut()
            .ok_or(Error::FeatureDisabled { feature: "Social sharing" })?;
        let action = menu.select(target, time)?;

        let timestamp = (time > 0.0).then_some(time);
        self.coordinator.emit(PlayerEvent::Shared { target, timestamp });
        Ok(action)
    }

    // =========================================================================
    // Playlist
    // =========================================================================

    pub async fn next_item(&mut self) -> Result<bool> {
        match self.playlist.as_mut() {
            Some(playlist) => playlist.next(&self.coordinator).await,
            None => Ok(false),
        }
    }

    pub async fn previous_item(&mut self) -> Result<bool> {
        match self.playlist.as_mut() {
            Some(playlist) => playlist.previous(&self.coordinator).await,
            None => Ok(false),
        }
    }

    pub async fn select_item(&mut self, index: usize) -> Result<()> {
        let playlist = self.playlist.as_mut().ok_or(Error::PlaylistIndexOutOfRange { index, count: 0 })?;
        playlist.select(&self.coordinator, index, true).await
    }

    async fn on_ended(&mut self) {
        let result = match self.playlist.as_mut() {
            Some(playlist) => playlist.handle_ended(&self.coordinator).await.map(|_| ()),
            None if self.coordinator.config().loop_playback => {
                self.coordinator.seek(0.0).await;
                self.coordinator.play().await;
                Ok(())
            }
            None => Ok(()),
        };
        if let Err(err) = result {
            self.coordinator.report(&err);
        }
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Fold pending coordinator events, fire due timers and describe the frame
    pub async fn process(&mut self, now: Instant) -> ShellView {
        let mut ended = false;
        loop {
            match self.events.try_recv() {
                Ok(PlayerEvent::Feedback { feedback }) => self.feedback.show(feedback, now),
                Ok(PlayerEvent::Played) => self.controls.on_playing_changed(true, now),
                Ok(PlayerEvent::Paused) => self.controls.on_playing_changed(false, now),
                Ok(PlayerEvent::Ended) => {
                    self.controls.on_playing_changed(false, now);
                    ended = true;
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "Shell fell behind the event stream"),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if ended {
            self.on_ended().await;
        }

        let state = self.coordinator.state().await;
        match self.captions.update(state.current_time, state.captions_enabled) {
            Some(CaptionChange::Show { text, style, .. }) => {
                self.caption_overlay.set_anchor(style.position);
                self.caption_text = Some((text, style));
            }
            Some(CaptionChange::Hide) => self.caption_text = None,
            None => {}
        }

        if self.volume.poll(now) {
            debug!("Volume slider closed");
        }
        self.controls.set_slider_open(self.volume.is_open());
        self.controls.poll(now);
        self.feedback.poll(now);

        let displayed = self.seek_bar.displayed_time(state.current_time);
        ShellView {
            controls_visible: self.controls.is_visible(),
            help_visible: self.keyboard.help_visible(),
            caption: self.caption_text.as_ref().map(|(text, style)| VisibleCaption {
                text: text.clone(),
                style: style.clone(),
                placement: self.caption_overlay.placement(),
            }),
            feedback: self.feedback.visible(),
            time_label: format_progress(displayed, state.duration),
            played_percent: self.seek_bar.played_percent(state.current_time, state.duration),
            buffered_percent: state.buffered,
        }
    }

    /// Earliest pending timer across the overlays
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.controls.next_deadline(),
            self.volume.next_deadline(),
            self.feedback.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Record the exit position and stop the trackers
    pub async fn shutdown(self) -> Option<AnalyticsSnapshot> {
        let tracker = self.analytics?;
        tracker.track_drop_off().await;
        let snapshot = tracker.snapshot().await;
        info!(engagement = snapshot.engagement_score, "Player shell stopped");
        Some(snapshot)
    }
}
