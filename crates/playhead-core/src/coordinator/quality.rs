//! Quality switching
//!
//! Each quality is a separate static source, so switching means reloading the
//! resource. The switch runs as a small state machine:
//!
//! ```text
//!   Idle ──set_quality──▶ AwaitingReady ──canplay──▶ AwaitingSeek ──seeked──▶ Idle
//!                              │                           │
//!                              └──── error / timeout ──────┴──────────────────▶ Idle
//! ```
//!
//! Position, volume, mute and rate are captured when the switch starts and restored
//! once the new source can play. Playback resumes after the restoring seek settles
//! plus a short grace delay, and only if the switch that scheduled the resume is
//! still the latest one.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{CoreState, PlaybackCoordinator};
use crate::error::{Error, Result};
use crate::events::PlayerEvent;
use crate::media::known_duration;

/// Where an in-flight switch is waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPhase {
    /// New source assigned, waiting for enough data to seek
    AwaitingReady,
    /// Restoring seek issued, waiting for it to settle
    AwaitingSeek,
}

/// Playback parameters carried across a source reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub time: f64,
    pub volume: f64,
    pub muted: bool,
    pub rate: f64,
    pub was_playing: bool,
}

/// Quality switch progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QualitySwitchState {
    #[default]
    Idle,
    Switching {
        /// Id of the quality being switched to
        target: String,
        phase: SwitchPhase,
        snapshot: PlaybackSnapshot,
        generation: u64,
    },
}

impl QualitySwitchState {
    pub fn is_switching(&self) -> bool {
        matches!(self, QualitySwitchState::Switching { .. })
    }

    pub fn phase(&self) -> Option<SwitchPhase> {
        match self {
            QualitySwitchState::Switching { phase, .. } => Some(*phase),
            QualitySwitchState::Idle => None,
        }
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            QualitySwitchState::Switching { generation, .. } => Some(*generation),
            QualitySwitchState::Idle => None,
        }
    }
}

/// Reduce a source to `scheme://host[:port]/path`.
///
/// Two qualities whose sources normalize equally are the same stream; query strings
/// (tokens, cache busters) and fragments are ignored.
pub fn normalize_source(src: &Url) -> String {
    let mut out = format!("{}://", src.scheme());
    if let Some(host) = src.host_str() {
        out.push_str(host);
    }
    if let Some(port) = src.port() {
        out.push_str(&format!(":{}", port));
    }
    out.push_str(src.path());
    out
}

impl PlaybackCoordinator {
    /// Switch to the quality with id `quality_id`
    #[instrument(skip(self))]
    pub async fn set_quality(&self, quality_id: &str) -> Result<()> {
        let option = self
            .inner
            .catalog
            .qualities
            .iter()
            .find(|q| q.value == quality_id)
            .ok_or_else(|| Error::UnknownQuality(quality_id.to_string()))?;

        let media = &self.inner.media;
        let mut guard = self.inner.core.write().await;
        let core = &mut *guard;

        let same_stream = media
            .source()
            .is_some_and(|current| normalize_source(&current) == normalize_source(&option.src));
        if same_stream {
            debug!(quality = quality_id, "Same source, label-only quality change");
            core.state.current_quality = Some(quality_id.to_string());
            self.publish(core);
            drop(guard);
            self.emit(PlayerEvent::QualityChanged {
                quality: quality_id.to_string(),
            });
            return Ok(());
        }

        // A switch that interrupts another keeps the first snapshot
        let snapshot = match &core.switch {
            QualitySwitchState::Switching { snapshot, .. } => snapshot.clone(),
            QualitySwitchState::Idle => PlaybackSnapshot {
                time: media.current_time(),
                volume: core.state.volume,
                muted: core.state.is_muted,
                rate: core.state.playback_rate,
                was_playing: core.state.is_playing,
            },
        };

        core.generation += 1;
        let generation = core.generation;
        info!(
            quality = quality_id,
            generation,
            time = snapshot.time,
            was_playing = snapshot.was_playing,
            "Quality switch started"
        );

        core.state.is_playing = snapshot.was_playing;
        core.switch = QualitySwitchState::Switching {
            target: quality_id.to_string(),
            phase: SwitchPhase::AwaitingReady,
            snapshot,
            generation,
        };
        core.pending_resume = None;
        core.state.is_loading = true;
        core.state.current_quality = Some(quality_id.to_string());
        core.abort_switch_timeout();

        media.pause();
        media.set_source(&option.src);
        media.load();

        if let Some(timeout) = self.inner.config.quality_switch_timeout() {
            let weak = self.downgrade();
            core.switch_timeout = Some(tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                if let Some(coordinator) = PlaybackCoordinator::from_weak(&weak) {
                    coordinator.expire_switch(generation).await;
                }
            }));
        }

        self.publish(core);
        drop(guard);

        self.emit(PlayerEvent::QualityChanged {
            quality: quality_id.to_string(),
        });
        Ok(())
    }

    /// New source can play: restore parameters and issue the restoring seek
    pub(super) fn switch_ready(&self, core: &mut CoreState) {
        let media = &self.inner.media;
        let QualitySwitchState::Switching { snapshot, phase, .. } = &mut core.switch else {
            return;
        };

        let duration = known_duration(media.duration());
        let time = if duration > 0.0 {
            snapshot.time.clamp(0.0, duration)
        } else {
            snapshot.time.max(0.0)
        };
        snapshot.time = time;
        *phase = SwitchPhase::AwaitingSeek;
        let snapshot = snapshot.clone();

        media.set_volume(snapshot.volume);
        media.set_muted(snapshot.muted);
        media.set_playback_rate(snapshot.rate);

        core.state.duration = duration;
        core.state.volume = snapshot.volume;
        core.state.is_muted = snapshot.muted;
        core.state.playback_rate = snapshot.rate;
        self.publish(core);

        debug!(time, "Restoring position after quality switch");
        media.set_current_time(time);
    }

    /// Restoring seek settled. Returns the generation to resume, if playback should.
    pub(super) fn switch_seeked(&self, core: &mut CoreState) -> Option<u64> {
        let QualitySwitchState::Switching {
            target,
            snapshot,
            generation,
            ..
        } = std::mem::take(&mut core.switch)
        else {
            return None;
        };

        core.abort_switch_timeout();
        core.state.is_loading = false;
        core.state.current_time = snapshot.time;
        core.last_time = snapshot.time;
        self.update_chapter(core);

        let resume = snapshot.was_playing.then_some(generation);
        core.pending_resume = resume;
        core.state.is_playing = snapshot.was_playing;
        self.publish(core);

        info!(quality = %target, generation, resume = resume.is_some(), "Quality switch complete");
        resume
    }

    /// Resume playback after the grace delay unless something superseded the switch
    pub(super) async fn resume_after_switch(&self, generation: u64) {
        tokio::time::sleep(self.inner.config.resume_grace_delay()).await;

        {
            let mut core = self.inner.core.write().await;
            if core.pending_resume != Some(generation) {
                debug!(generation, "Stale resume skipped");
                return;
            }
            core.pending_resume = None;
        }

        if let Err(err) = self.inner.media.play().await {
            let mut core = self.inner.core.write().await;
            core.state.is_playing = false;
            self.publish(&core);
            drop(core);
            self.report(&Error::QualitySwitchFailed(err.to_string()));
        }
    }

    /// Abandon switch `generation` if it is still in flight
    pub(super) async fn expire_switch(&self, generation: u64) {
        let mut core = self.inner.core.write().await;
        if core.switch.generation() != Some(generation) {
            return;
        }

        let QualitySwitchState::Switching { target, .. } = std::mem::take(&mut core.switch) else {
            return;
        };
        // Detach rather than abort; this runs on the timeout task itself
        core.switch_timeout = None;
        core.pending_resume = None;
        core.state.is_loading = false;
        core.state.is_playing = false;
        self.publish(&core);
        drop(core);

        warn!(quality = %target, generation, "Quality switch timed out");
        self.report(&Error::QualitySwitchTimeout {
            quality: target,
            timeout_ms: self.inner.config.quality_switch_timeout_ms,
        });
    }
}
