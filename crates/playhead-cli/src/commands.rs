//! CLI command implementations

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::Instant;
use tracing::{info, warn};

use playhead_core::captions::{active_cue, parse_captions};
use playhead_core::coordinator::{Focus, KeyInput, SHORTCUTS};
use playhead_core::format::format_time;
use playhead_core::theme::{css_variables, ControlOptions, Theme};
use playhead_core::{
    AnalyticsSnapshot, CaptionCue, Intent, MediaCatalog, MediaEventReceiver, PlaybackState, PlayerConfig,
    PlayerEvent, PlayerShell, Playlist, PlaylistSource, ShellLayout, SimulatedMedia, SimulatedMediaConfig,
};

use crate::output::{heading, table, to_json, OutputFormat};

/// Media time advanced per simulated tick
const TICK: f64 = 0.25;

// =============================================================================
// Simulate
// =============================================================================

/// A scripted session
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionScript {
    pub source: PlaylistSource,
    /// Duration of every simulated source, in seconds
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub config: PlayerConfig,
    #[serde(default)]
    pub catalog: MediaCatalog,
    #[serde(default)]
    pub captions: Vec<CaptionCue>,
    pub steps: Vec<Step>,
}

fn default_duration() -> f64 {
    120.0
}

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Intent { intent: Intent },
    Key { key: String },
    /// Let playback run for `seconds` of wall time
    Advance { seconds: f64 },
    Next,
    Previous,
    RejectPlay { reason: Option<String> },
    FailLoad { message: String },
}

#[derive(Debug, Serialize)]
struct TimelineEntry {
    step: usize,
    event: PlayerEvent,
}

#[derive(Debug, Serialize)]
struct SessionReport {
    timeline: Vec<TimelineEntry>,
    rejected: Vec<String>,
    final_state: PlaybackState,
    analytics: Option<AnalyticsSnapshot>,
}

struct Session {
    shell: PlayerShell,
    media: std::sync::Arc<SimulatedMedia>,
    media_events: MediaEventReceiver,
    events: tokio::sync::broadcast::Receiver<PlayerEvent>,
    report: SessionReport,
}

impl Session {
    async fn settle(&mut self, step: usize) {
        self.shell.coordinator().drain(&mut self.media_events).await;
        self.shell.process(Instant::now()).await;
        // Playlist advancement inside `process` may have queued more media events
        self.shell.coordinator().drain(&mut self.media_events).await;

        loop {
            match self.events.try_recv() {
                Ok(event) => self.report.timeline.push(TimelineEntry { step, event }),
                Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "Timeline dropped events"),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        // Let the analytics tracker fold what was just published
        tokio::task::yield_now().await;
    }

    async fn run(&mut self, index: usize, step: Step) -> anyhow::Result<()> {
        match step {
            Step::Intent { intent } => {
                if let Err(err) = self.shell.coordinator().apply(intent).await {
                    self.report.rejected.push(format!("step {}: {}", index, err));
                }
            }
            Step::Key { key } => {
                let input: KeyInput = key.parse()?;
                self.shell.key_down(input, Focus::Container, Instant::now()).await;
            }
            Step::Advance { seconds } => {
                let mut remaining = seconds.max(0.0);
                while remaining > 0.0 {
                    let tick = remaining.min(TICK);
                    self.media.advance(tick);
                    // Paused runtime: moves the clock the tracker and timers read
                    tokio::time::advance(Duration::from_secs_f64(tick)).await;
                    remaining -= tick;
                    self.settle(index).await;
                }
            }
            Step::Next => {
                if let Err(err) = self.shell.next_item().await {
                    self.report.rejected.push(format!("step {}: {}", index, err));
                }
            }
            Step::Previous => {
                if let Err(err) = self.shell.previous_item().await {
                    self.report.rejected.push(format!("step {}: {}", index, err));
                }
            }
            Step::RejectPlay { reason } => self.media.set_reject_play(reason),
            Step::FailLoad { message } => self.media.fail_load(message),
        }
        self.settle(index).await;
        Ok(())
    }
}

/// Run a scripted session against the simulated media resource
pub async fn simulate(path: &Path, format: &str) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let script: SessionScript = serde_json::from_str(&json).context("parsing session script")?;
    let report = run_script(script).await?;
    print_report(&report, format)
}

/// Play `script` to the end. Expects a paused tokio clock.
async fn run_script(script: SessionScript) -> anyhow::Result<SessionReport> {
    script.config.validate()?;

    let loop_playback = script.config.loop_playback;
    let playlist = Playlist::new(script.source, loop_playback)?;
    let first = playlist.current().src.clone();

    let media_config = SimulatedMediaConfig {
        default_duration: script.duration,
        ..Default::default()
    };
    let (media, mut media_events) = SimulatedMedia::with_source(first, media_config);
    let coordinator = playhead_core::PlaybackCoordinator::new(media.clone(), script.catalog, script.config);
    let events = coordinator.subscribe_events();
    coordinator.drain(&mut media_events).await;
    info!(session_id = %coordinator.id(), steps = script.steps.len(), "Simulation started");

    let mut shell = PlayerShell::new(coordinator, ShellLayout::default())
        .with_captions(script.captions)
        .with_playlist(playlist);
    shell.start(Instant::now()).await;

    let final_state = PlaybackState::default();
    let mut session = Session {
        shell,
        media,
        media_events,
        events,
        report: SessionReport {
            timeline: Vec::new(),
            rejected: Vec::new(),
            final_state,
            analytics: None,
        },
    };
    session.settle(0).await;

    for (index, step) in script.steps.into_iter().enumerate() {
        session.run(index + 1, step).await?;
    }

    let Session { shell, mut report, .. } = session;
    report.final_state = shell.coordinator().state().await;
    report.analytics = shell.shutdown().await;
    Ok(report)
}

fn print_report(report: &SessionReport, format: &str) -> anyhow::Result<()> {
    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(report)?),
        OutputFormat::Text | OutputFormat::Table => {
            println!("{}", heading("Timeline"));
            for entry in report.timeline.iter().filter(|e| !is_noise(&e.event)) {
                println!("  [{:>3}] {:<22} {}", entry.step, entry.event.name(), event_detail(&entry.event));
            }

            if !report.rejected.is_empty() {
                println!("\n{}", heading("Rejected"));
                for line in &report.rejected {
                    println!("  {}", line);
                }
            }

            let state = &report.final_state;
            println!("\n{}", heading("Final State"));
            println!("  Time: {} / {}", format_time(state.current_time), format_time(state.duration));
            println!("  Playing: {}", state.is_playing);
            println!("  Volume: {:.2} (muted: {})", state.volume, state.is_muted);
            println!("  Rate: {}x", state.playback_rate);
            println!("  Quality: {}", state.current_quality.as_deref().unwrap_or("Auto"));
            println!("  Captions: {}", state.captions_enabled);

            if let Some(analytics) = &report.analytics {
                println!("\n{}", heading("Analytics"));
                println!("  Watch time: {:.1}s", analytics.watch_time);
                println!("  Plays / pauses / seeks: {} / {} / {}", analytics.play_count, analytics.pause_count, analytics.seek_count);
                println!("  Engagement: {:.1}%", analytics.engagement_score);
            }
        }
    }
    Ok(())
}

/// Events too frequent to list in text output
fn is_noise(event: &PlayerEvent) -> bool {
    matches!(event, PlayerEvent::TimeUpdate { .. } | PlayerEvent::AnalyticsUpdate { .. })
}

fn event_detail(event: &PlayerEvent) -> String {
    match event {
        PlayerEvent::Seeked { time } => format_time(*time),
        PlayerEvent::VolumeChanged { volume } => format!("{:.2}", volume),
        PlayerEvent::Error { code, message } => format!("{}: {}", code, message),
        PlayerEvent::ChapterChanged { chapter } => chapter.title.clone(),
        PlayerEvent::QualityChanged { quality } => quality.clone(),
        PlayerEvent::SubtitleChanged { language } => language.clone(),
        PlayerEvent::Feedback { feedback } => feedback.text.clone(),
        PlayerEvent::PlaylistItemChanged { index, item } => format!("#{} {}", index, item.title),
        PlayerEvent::Shared { target, .. } => format!("{:?}", target),
        _ => String::new(),
    }
}

// =============================================================================
// Shortcuts
// =============================================================================

#[derive(Tabled, Serialize)]
struct ShortcutRow {
    #[tabled(rename = "Keys")]
    keys: &'static str,
    #[tabled(rename = "Action")]
    action: &'static str,
}

/// Print the keyboard shortcut reference
pub fn shortcuts(format: &str) -> anyhow::Result<()> {
    let rows: Vec<ShortcutRow> = SHORTCUTS
        .iter()
        .map(|&(keys, action)| ShortcutRow { keys, action })
        .collect();

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&rows)?),
        OutputFormat::Table => println!("{}", table(rows)),
        OutputFormat::Text => {
            println!("{}", heading("Keyboard Shortcuts"));
            for row in rows {
                println!("  {:<12} {}", row.keys, row.action);
            }
        }
    }
    Ok(())
}

// =============================================================================
// Captions
// =============================================================================

#[derive(Tabled, Serialize)]
struct CueRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Text")]
    text: String,
}

/// List the cues of a caption file, or the one active at `at`
pub fn captions(path: &Path, at: Option<f64>, format: &str) -> anyhow::Result<()> {
    let input = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cues = parse_captions(&input)?;

    let selected: Vec<(usize, &CaptionCue)> = match at {
        Some(time) => active_cue(&cues, time, true)
            .and_then(|cue| cues.iter().position(|c| std::ptr::eq(c, cue)).map(|i| (i, cue)))
            .into_iter()
            .collect(),
        None => cues.iter().enumerate().collect(),
    };

    let rows: Vec<CueRow> = selected
        .into_iter()
        .map(|(index, cue)| CueRow {
            index: index + 1,
            start: format_time(cue.start_time),
            end: format_time(cue.end_time),
            text: cue.text.clone(),
        })
        .collect();

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&rows)?),
        OutputFormat::Table => println!("{}", table(rows)),
        OutputFormat::Text => {
            println!("{}", heading(&format!("{} ({} cues)", path.display(), cues.len())));
            if rows.is_empty() {
                println!("  (no cue)");
            }
            for row in rows {
                println!("  {:>4}  {} --> {}  {}", row.index, row.start, row.end, row.text.replace('\n', " / "));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Format / Theme
// =============================================================================

#[derive(Serialize)]
struct TimeLabel {
    seconds: f64,
    label: String,
}

pub fn format_times(seconds: &[f64], format: &str) -> anyhow::Result<()> {
    let labels: Vec<TimeLabel> = seconds
        .iter()
        .map(|&s| TimeLabel {
            seconds: s,
            label: format_time(s),
        })
        .collect();

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&labels)?),
        OutputFormat::Text | OutputFormat::Table => {
            for label in labels {
                println!("{}", label.label);
            }
        }
    }
    Ok(())
}

pub fn theme(name: &str, selector: &str, format: &str) -> anyhow::Result<()> {
    let theme: Theme = serde_json::from_value(serde_json::Value::String(name.to_lowercase()))
        .with_context(|| format!("unknown theme '{}'", name))?;
    let vars = css_variables(theme, &ControlOptions::default());

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&vars)?),
        OutputFormat::Text | OutputFormat::Table => println!("{}", vars.to_css_block(selector)),
    }
    Ok(())
}
