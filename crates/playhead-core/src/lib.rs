//! Playhead Core - Playback Coordination for a Themeable Video Player
//!
//! This crate holds everything between a native media element and the pixels of
//! a player's chrome:
//! - Playback state orchestration over a [`MediaResource`]
//! - Seamless quality switching that preserves position, volume and play state
//! - Custom caption scheduling, styling and WebVTT/SRT parsing
//! - Keyboard shortcuts, pointer and touch interaction surfaces
//! - Debounced engagement analytics
//! - Theme records and CSS custom properties
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Playhead Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │  Keyboard /  │  │   Seek Bar   │  │   Menus /    │           │
//! │  │   Gestures   │  │   / Volume   │  │    Share     │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │   Intents       │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐       ┌──────────────┐       │
//! │                    │  Playback   │──────▶│    Media     │       │
//! │                    │ Coordinator │◀──────│   Resource   │       │
//! │                    └──────┬──────┘       └──────────────┘       │
//! │                           │ state / events                      │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │   Caption    │  │   Player    │  │  Analytics   │            │
//! │  │  Scheduler   │  │    Shell    │  │   Tracker    │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod analytics;
pub mod captions;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod format;
pub mod interaction;
pub mod media;
pub mod shell;
pub mod theme;
pub mod types;

pub use analytics::{AnalyticsAccumulator, AnalyticsSnapshot, AnalyticsTracker};
pub use captions::{parse_captions, CaptionScheduler, CaptionStyle, SrtParser, WebVttParser};
pub use config::PlayerConfig;
pub use coordinator::{
    Intent, KeyInput, KeyboardDispatcher, MediaCatalog, PlaybackCoordinator, QualitySwitchState, StateChange,
};
pub use error::{Error, Result};
pub use events::{Feedback, FeedbackKind, PlayerEvent};
pub use media::{MediaEvent, MediaEventReceiver, MediaResource};
#[cfg(feature = "simulated")]
pub use media::{SimulatedMedia, SimulatedMediaConfig};
pub use shell::{PlayerShell, Playlist, PlaylistSource, ShellLayout, ShellView};
pub use theme::{CssVariables, Theme};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Playhead Core initialized");
}
