//! Engagement analytics
//!
//! Accumulates, from the stream of [`PlaybackState`] snapshots:
//! - Watch time (wall clock while actually playing) and an engagement score
//! - Play, pause and seek counts
//! - Debounced volume and playback rate changes
//! - Chapters entered and drop-off points
//!
//! [`AnalyticsAccumulator`] is plain synchronous state driven by explicit instants;
//! [`AnalyticsTracker`] runs one on a task fed by every [`StateChange`] the
//! coordinator publishes, stamped with its publish instant.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::coordinator::{PlaybackCoordinator, StateChange};
use crate::events::PlayerEvent;
use crate::types::{chapter_index_at, Chapter, PlaybackState};

/// Jumps larger than this (seconds) between observations count as seeks
const SEEK_JUMP_THRESHOLD: f64 = 2.0;
/// Accumulated volume change that counts as a volume change
const VOLUME_CHANGE_THRESHOLD: f64 = 0.05;
/// Accumulated rate change that counts as a rate change
const RATE_CHANGE_THRESHOLD: f64 = 0.01;
/// Watch time is accrued on this cadence
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Accumulated engagement data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Seconds actually spent playing
    pub watch_time: f64,
    /// Media duration in seconds
    pub total_time: f64,
    pub play_count: u32,
    pub pause_count: u32,
    pub seek_count: u32,
    pub volume_changes: u32,
    pub playback_rate_changes: u32,
    /// Chapter indexes in first-entry order
    pub chapters_viewed: Vec<usize>,
    /// Positions (seconds) at which the viewer left
    pub drop_off_points: Vec<f64>,
    /// `min(100, watch_time / total_time × 100)`
    pub engagement_score: f64,
    pub updated_at: DateTime<Utc>,
}

impl Default for AnalyticsSnapshot {
    fn default() -> Self {
        Self {
            watch_time: 0.0,
            total_time: 0.0,
            play_count: 0,
            pause_count: 0,
            seek_count: 0,
            volume_changes: 0,
            playback_rate_changes: 0,
            chapters_viewed: Vec::new(),
            drop_off_points: Vec::new(),
            engagement_score: 0.0,
            updated_at: Utc::now(),
        }
    }
}

/// Change detector that only counts a value once it has settled
#[derive(Debug, Clone)]
struct Debounced {
    threshold: f64,
    baseline: Option<f64>,
    latest: f64,
    settle_at: Option<Instant>,
}

impl Debounced {
    fn new(threshold: f64) -> Self {
        Self {
            threshold,
            baseline: None,
            latest: 0.0,
            settle_at: None,
        }
    }

    fn observe(&mut self, value: f64, now: Instant, debounce: Duration) {
        self.latest = value;
        match self.baseline {
            None => self.baseline = Some(value),
            Some(baseline) if (value - baseline).abs() > self.threshold => {
                self.settle_at = Some(now + debounce);
            }
            Some(_) => self.settle_at = None,
        }
    }

    /// Returns true once a pending change has settled past the threshold
    fn poll(&mut self, now: Instant) -> bool {
        match self.settle_at {
            Some(at) if now >= at => {
                self.settle_at = None;
                let changed = self
                    .baseline
                    .is_some_and(|baseline| (self.latest - baseline).abs() > self.threshold);
                self.baseline = Some(self.latest);
                changed
            }
            _ => false,
        }
    }
}

/// Synchronous analytics state
#[derive(Debug, Clone)]
pub struct AnalyticsAccumulator {
    chapters: Vec<Chapter>,
    debounce: Duration,
    data: AnalyticsSnapshot,
    was_playing: bool,
    /// Running while playing and not loading
    watch_clock: Option<Instant>,
    last_time: Option<f64>,
    current_time: f64,
    seen_chapters: HashSet<usize>,
    volume: Debounced,
    rate: Debounced,
}

impl AnalyticsAccumulator {
    pub fn new(chapters: Vec<Chapter>, debounce: Duration) -> Self {
        Self {
            chapters,
            debounce,
            data: AnalyticsSnapshot::default(),
            was_playing: false,
            watch_clock: None,
            last_time: None,
            current_time: 0.0,
            seen_chapters: HashSet::new(),
            volume: Debounced::new(VOLUME_CHANGE_THRESHOLD),
            rate: Debounced::new(RATE_CHANGE_THRESHOLD),
        }
    }

    /// Fold a state snapshot. Returns true when a subscriber should be notified.
    pub fn observe(&mut self, state: &PlaybackState, now: Instant) -> bool {
        self.fold(state, now, false)
    }

    /// Fold a published change. Jumps carried by media clock progress are
    /// playback, not seeks, however late they are delivered.
    pub fn observe_change(&mut self, change: &StateChange) -> bool {
        self.fold(&change.state, change.at, change.progress)
    }

    fn fold(&mut self, state: &PlaybackState, now: Instant, progress: bool) -> bool {
        let mut changed = false;

        if state.duration > 0.0 {
            self.data.total_time = state.duration;
        }

        // Play / pause transitions
        if state.is_playing && !self.was_playing {
            self.data.play_count += 1;
            debug!(play_count = self.data.play_count, "Play counted");
        } else if !state.is_playing && self.was_playing {
            self.data.pause_count += 1;
            debug!(pause_count = self.data.pause_count, "Pause counted");
        }
        self.was_playing = state.is_playing;

        let watching = state.is_playing && !state.is_loading;
        match (watching, self.watch_clock) {
            (true, None) => self.watch_clock = Some(now),
            (false, Some(_)) => {
                self.accrue(now);
                self.watch_clock = None;
            }
            _ => {}
        }

        // Seek detection; the first observation only sets the baseline
        let time = state.current_time;
        if let Some(last) = self.last_time {
            if !progress && !state.is_loading && (time - last).abs() > SEEK_JUMP_THRESHOLD {
                self.data.seek_count += 1;
                debug!(from = last, to = time, "Seek counted");
            }
        }
        self.last_time = Some(time);
        self.current_time = time;

        if let Some(index) = chapter_index_at(&self.chapters, time) {
            if self.seen_chapters.insert(index) {
                self.data.chapters_viewed.push(index);
                changed = true;
            }
        }

        self.volume.observe(state.effective_volume(), now, self.debounce);
        self.rate.observe(state.playback_rate, now, self.debounce);
        changed |= self.settle(now);

        changed
    }

    /// Periodic tick. Returns true when a subscriber should be notified.
    pub fn tick(&mut self, now: Instant) -> bool {
        let playing = self.watch_clock.is_some();
        if playing {
            self.accrue(now);
            self.watch_clock = Some(now);
        }
        self.settle(now) || playing
    }

    /// Record the current position as a drop-off point
    pub fn track_drop_off(&mut self) {
        info!(position = self.current_time, "Drop-off recorded");
        self.data.drop_off_points.push(self.current_time);
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            updated_at: Utc::now(),
            ..self.data.clone()
        }
    }

    /// Clear all counters and baselines
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.chapters), self.debounce);
    }

    /// Next instant `tick` has debounce work to do, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.volume.settle_at, self.rate.settle_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn accrue(&mut self, now: Instant) {
        if let Some(started) = self.watch_clock {
            self.data.watch_time += now.saturating_duration_since(started).as_secs_f64();
        }
        self.data.engagement_score = if self.data.total_time > 0.0 {
            (self.data.watch_time / self.data.total_time * 100.0).min(100.0)
        } else {
            0.0
        };
    }

    fn settle(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.volume.poll(now) {
            self.data.volume_changes += 1;
            changed = true;
        }
        if self.rate.poll(now) {
            self.data.playback_rate_changes += 1;
            changed = true;
        }
        changed
    }
}

/// Runs an [`AnalyticsAccumulator`] against a coordinator's state stream and
/// publishes [`PlayerEvent::AnalyticsUpdate`]s. Stops when dropped.
pub struct AnalyticsTracker {
    accumulator: Arc<Mutex<AnalyticsAccumulator>>,
    events: broadcast::Sender<PlayerEvent>,
    task: JoinHandle<()>,
}

impl AnalyticsTracker {
    pub fn spawn(coordinator: &PlaybackCoordinator) -> Self {
        let mut initial = AnalyticsAccumulator::new(
            coordinator.catalog().chapters.clone(),
            coordinator.config().analytics_debounce(),
        );
        // Subscribe before reading the baseline so no change falls in between
        let mut changes = coordinator.subscribe_changes();
        let baseline = coordinator.subscribe_state().borrow().clone();
        initial.observe(&baseline, Instant::now());

        let accumulator = Arc::new(Mutex::new(initial));
        let events = coordinator.event_sender();

        let task = {
            let accumulator = accumulator.clone();
            let events = events.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(TICK_INTERVAL);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    // Queued changes are folded before a tick reads the clock
                    let notify = tokio::select! {
                        biased;
                        change = changes.recv() => match change {
                            Ok(change) => accumulator.lock().await.observe_change(&change),
                            Err(RecvError::Lagged(skipped)) => {
                                warn!(skipped, "Analytics tracker fell behind state changes");
                                false
                            }
                            Err(RecvError::Closed) => break,
                        },
                        _ = ticker.tick() => accumulator.lock().await.tick(Instant::now()),
                    };

                    if notify {
                        let snapshot = accumulator.lock().await.snapshot();
                        let _ = events.send(PlayerEvent::AnalyticsUpdate { snapshot });
                    }
                }
                debug!("Analytics tracker stopped");
            })
        };

        info!("Analytics tracker started");
        Self {
            accumulator,
            events,
            task,
        }
    }

    pub async fn snapshot(&self) -> AnalyticsSnapshot {
        self.accumulator.lock().await.snapshot()
    }

    /// Record a drop-off at the last observed position and publish
    pub async fn track_drop_off(&self) {
        let snapshot = {
            let mut accumulator = self.accumulator.lock().await;
            accumulator.track_drop_off();
            accumulator.snapshot()
        };
        let _ = self.events.send(PlayerEvent::AnalyticsUpdate { snapshot });
    }

    pub async fn reset(&self) {
        self.accumulator.lock().await.reset();
    }
}

impl Drop for AnalyticsTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
