//! Integration tests for Playhead Core

#![cfg(feature = "simulated")]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use url::Url;

use playhead_core::analytics::AnalyticsAccumulator;
use playhead_core::captions::{active_cue, parse_captions};
use playhead_core::coordinator::{Focus, KeyCode, KeyInput, KeyboardDispatcher};
use playhead_core::format::{format_progress, format_time};
use playhead_core::theme::{css_variables, ControlOptions, Theme};
use playhead_core::{
    CaptionCue, Chapter, FeedbackKind, MediaCatalog, MediaEventReceiver, PlaybackCoordinator,
    PlaybackState, PlayerConfig, PlayerEvent, QualityOption, QualitySwitchState, SimulatedMedia,
    SimulatedMediaConfig,
};

// =============================================================================
// Helpers
// =============================================================================

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

async fn coordinator_with(
    duration: f64,
    catalog: MediaCatalog,
) -> (PlaybackCoordinator, Arc<SimulatedMedia>, MediaEventReceiver) {
    let src = url("https://cdn.example.com/video_720.mp4");
    let media_config = SimulatedMediaConfig::default().with_duration(&src, duration);
    let (media, mut rx) = SimulatedMedia::with_source(src, media_config);
    let coordinator = PlaybackCoordinator::new(media.clone(), catalog, PlayerConfig::default());
    coordinator.drain(&mut rx).await;
    (coordinator, media, rx)
}

async fn coordinator(duration: f64) -> (PlaybackCoordinator, Arc<SimulatedMedia>, MediaEventReceiver) {
    coordinator_with(duration, MediaCatalog::default()).await
}

fn feedback_kinds(rx: &mut broadcast::Receiver<PlayerEvent>) -> Vec<FeedbackKind> {
    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let PlayerEvent::Feedback { feedback } = event {
            kinds.push(feedback.kind);
        }
    }
    kinds
}

// =============================================================================
// Coordinator Tests
// =============================================================================

#[tokio::test]
async fn test_seek_and_volume_are_clamped() {
    let (coordinator, _media, mut rx) = coordinator(60.0).await;

    coordinator.seek(500.0).await;
    coordinator.drain(&mut rx).await;
    assert_eq!(coordinator.state().await.current_time, 60.0);

    coordinator.seek(-3.0).await;
    coordinator.drain(&mut rx).await;
    assert_eq!(coordinator.state().await.current_time, 0.0);

    coordinator.set_volume(1.7).await;
    assert_eq!(coordinator.state().await.volume, 1.0);
    coordinator.set_volume(-0.2).await;
    assert_eq!(coordinator.state().await.volume, 0.0);

    coordinator.set_playback_rate(8.0).await;
    assert_eq!(coordinator.state().await.playback_rate, 2.0);
}

#[tokio::test]
async fn test_mute_round_trip_restores_volume() {
    let (coordinator, _media, mut rx) = coordinator(60.0).await;

    coordinator.set_volume(0.7).await;
    coordinator.toggle_mute().await;
    coordinator.drain(&mut rx).await;
    let state = coordinator.state().await;
    assert!(state.is_muted);
    assert_eq!(state.effective_volume(), 0.0);

    coordinator.toggle_mute().await;
    coordinator.drain(&mut rx).await;
    let state = coordinator.state().await;
    assert!(!state.is_muted);
    assert_eq!(state.volume, 0.7);
}

#[tokio::test]
async fn test_volume_changes_while_muted() {
    let (coordinator, _media, mut rx) = coordinator(60.0).await;

    // Dragging to zero while muted keeps the remembered volume
    coordinator.set_volume(0.7).await;
    coordinator.toggle_mute().await;
    coordinator.set_volume(0.0).await;
    coordinator.drain(&mut rx).await;
    let state = coordinator.state().await;
    assert!(state.is_muted);
    assert_eq!(state.volume, 0.0);

    coordinator.toggle_mute().await;
    coordinator.drain(&mut rx).await;
    let state = coordinator.state().await;
    assert!(!state.is_muted);
    assert_eq!(state.volume, 0.7);

    // A nonzero volume while muted unmutes and becomes the new restore point
    coordinator.toggle_mute().await;
    coordinator.set_volume(0.3).await;
    coordinator.drain(&mut rx).await;
    let state = coordinator.state().await;
    assert!(!state.is_muted);
    assert_eq!(state.volume, 0.3);

    coordinator.toggle_mute().await;
    coordinator.toggle_mute().await;
    coordinator.drain(&mut rx).await;
    assert_eq!(coordinator.state().await.volume, 0.3);
}

#[tokio::test]
async fn test_unmute_from_zero_uses_fallback() {
    let (coordinator, _media, mut rx) = coordinator(60.0).await;

    coordinator.set_volume(0.0).await;
    coordinator.toggle_mute().await;
    coordinator.toggle_mute().await;
    coordinator.drain(&mut rx).await;

    let state = coordinator.state().await;
    assert!(!state.is_muted);
    assert_eq!(state.volume, 0.5);
}

#[tokio::test]
async fn test_small_seeks_have_no_feedback() {
    let (coordinator, _media, mut rx) = coordinator(120.0).await;
    let mut events = coordinator.subscribe_events();

    coordinator.seek(3.0).await;
    coordinator.drain(&mut rx).await;
    assert!(feedback_kinds(&mut events).is_empty());

    coordinator.seek(13.0).await;
    coordinator.drain(&mut rx).await;
    assert_eq!(feedback_kinds(&mut events), vec![FeedbackKind::Seek]);
}

#[tokio::test]
async fn test_quality_switch_preserves_position() {
    let catalog = MediaCatalog {
        qualities: vec![
            QualityOption::new("720p", "720", url("https://cdn.example.com/video_720.mp4")),
            QualityOption::new("1080p", "1080", url("https://cdn.example.com/video_1080.mp4")),
        ],
        ..Default::default()
    };
    let (coordinator, media, mut rx) = coordinator_with(120.0, catalog).await;
    coordinator.play().await;
    media.advance(25.0);
    coordinator.drain(&mut rx).await;

    coordinator.set_quality("720").await.unwrap();
    let loads = media.load_count();
    assert_eq!(coordinator.quality_switch().await, QualitySwitchState::Idle);

    coordinator.set_quality("1080").await.unwrap();
    coordinator.drain(&mut rx).await;

    let state = coordinator.state().await;
    assert_eq!(media.load_count(), loads + 1);
    assert_eq!(state.current_time, 25.0);
    assert!(state.is_playing);
    assert_eq!(state.current_quality.as_deref(), Some("1080"));
}

#[tokio::test]
async fn test_chapter_tracking() {
    let catalog = MediaCatalog {
        chapters: vec![Chapter::new("Intro", 0.0, 30.0), Chapter::new("Main", 30.0, 90.0)],
        ..Default::default()
    };
    let (coordinator, _media, mut rx) = coordinator_with(120.0, catalog).await;
    let mut events = coordinator.subscribe_events();

    coordinator.seek_to_chapter(1).await.unwrap();
    coordinator.drain(&mut rx).await;

    let state = coordinator.state().await;
    assert_eq!(state.current_time, 30.0);
    assert_eq!(state.current_chapter.map(|c| c.title), Some("Main".to_string()));

    let mut announced = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PlayerEvent::ChapterChanged { chapter } = event {
            announced.push(chapter.title);
        }
    }
    assert_eq!(announced, vec!["Main".to_string()]);
    assert!(coordinator.seek_to_chapter(5).await.is_err());
}

// =============================================================================
// Caption Tests
// =============================================================================

#[test]
fn test_caption_boundaries() {
    let cues = vec![
        CaptionCue::new("a", 0.0, 3.0),
        CaptionCue::new("b", 3.0, 6.0),
        CaptionCue::new("c", 6.0, 9.0),
    ];

    assert_eq!(active_cue(&cues, 2.9, true).map(|c| c.text.as_str()), Some("a"));
    assert_eq!(active_cue(&cues, 3.0, true).map(|c| c.text.as_str()), Some("b"));
    assert!(active_cue(&cues, 9.1, true).is_none());
    assert!(active_cue(&cues, 4.0, false).is_none());
}

#[test]
fn test_webvtt_to_schedule() {
    let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHello <b>world</b>\n\n00:00:05.000 --> 00:00:07.500\nSecond line\n";
    let cues = parse_captions(vtt).unwrap();
    assert_eq!(cues.len(), 2);
    assert_eq!(active_cue(&cues, 2.0, true).map(|c| c.text.as_str()), Some("Hello world"));
    assert_eq!(cues[1].end_time, 7.5);
}

// =============================================================================
// Keyboard Tests
// =============================================================================

fn state(time: f64, duration: f64, rate: f64) -> PlaybackState {
    PlaybackState {
        current_time: time,
        duration,
        playback_rate: rate,
        is_loading: false,
        ..Default::default()
    }
}

#[test]
fn test_arrow_right_clamps_to_duration() {
    let mut dispatcher = KeyboardDispatcher::new();
    let outcome = dispatcher.dispatch(
        KeyInput::new(KeyCode::ArrowRight),
        Focus::Container,
        &state(10.0, 15.0, 1.0),
        &PlayerConfig::default(),
    );
    assert_eq!(outcome.intent, Some(playhead_core::Intent::Seek(15.0)));
}

#[test]
fn test_digit_seeks_to_tenth() {
    let mut dispatcher = KeyboardDispatcher::new();
    let outcome = dispatcher.dispatch(
        KeyInput::new(KeyCode::Digit(5)),
        Focus::Media,
        &state(0.0, 200.0, 1.0),
        &PlayerConfig::default(),
    );
    assert_eq!(outcome.intent, Some(playhead_core::Intent::Seek(100.0)));
}

#[tokio::test]
async fn test_rate_floor_after_repeated_slowdown() {
    let (coordinator, _media, _rx) = coordinator(60.0).await;
    let mut dispatcher = KeyboardDispatcher::new();

    for _ in 0..7 {
        let outcome = coordinator
            .handle_key(&mut dispatcher, KeyInput::shifted(KeyCode::Comma), Focus::Container)
            .await;
        assert!(outcome.handled);
    }
    assert_eq!(coordinator.state().await.playback_rate, 0.25);
}

#[test]
fn test_keys_outside_player_ignored() {
    let mut dispatcher = KeyboardDispatcher::new();
    let outcome = dispatcher.dispatch(
        KeyInput::new(KeyCode::Space),
        Focus::Outside,
        &state(0.0, 10.0, 1.0),
        &PlayerConfig::default(),
    );
    assert!(!outcome.handled);
    assert!(!outcome.prevent_default);
}

// =============================================================================
// Analytics Tests
// =============================================================================

#[test]
fn test_engagement_never_exceeds_hundred() {
    let mut analytics = AnalyticsAccumulator::new(Vec::new(), Duration::from_millis(400));
    let start = Instant::now();
    let playing = PlaybackState {
        is_playing: true,
        ..state(0.0, 10.0, 1.0)
    };

    analytics.observe(&playing, start);
    analytics.tick(start + Duration::from_secs(30));

    let snapshot = analytics.snapshot();
    assert_eq!(snapshot.play_count, 1);
    assert_eq!(snapshot.watch_time, 30.0);
    assert_eq!(snapshot.engagement_score, 100.0);
}

// =============================================================================
// Format & Theme Tests
// =============================================================================

#[test]
fn test_time_labels() {
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(65.4), "1:05");
    assert_eq!(format_time(3725.0), "1:02:05");
    assert_eq!(format_progress(30.0, 600.0), "0:30 / 10:00");
}

#[test]
fn test_theme_variables() {
    let vars = css_variables(Theme::Dark, &ControlOptions::default());
    assert_eq!(vars.get("--rvp-primary"), Some("#3b82f6"));
    assert!(vars.to_css_block(".player").starts_with(".player {"));
}
