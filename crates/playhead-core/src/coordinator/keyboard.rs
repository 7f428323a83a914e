//! Keyboard shortcuts
//!
//! Keys are mapped to [`ShortcutAction`]s by a fixed table, then resolved against the
//! current [`PlaybackState`] into coordinator [`Intent`]s. Shortcuts only apply while
//! focus is inside the player.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Intent, PlaybackCoordinator};
use crate::config::PlayerConfig;
use crate::error::Error;
use crate::types::{PlaybackState, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};

/// Seconds skipped by the arrow / J / L keys
pub const SEEK_STEP: f64 = 10.0;
/// Volume change per arrow key press
pub const VOLUME_STEP: f64 = 0.1;
/// Rate change per `<` / `>` press
pub const RATE_STEP: f64 = 0.25;

/// Rows of the shortcuts help overlay: (keys, description)
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("Space / K", "Play / Pause"),
    ("← / J", "Seek backward 10s"),
    ("→ / L", "Seek forward 10s"),
    ("↑", "Volume up"),
    ("↓", "Volume down"),
    ("M", "Mute / Unmute"),
    ("F", "Fullscreen"),
    ("I", "Picture-in-Picture"),
    ("C", "Toggle captions"),
    ("T", "Theater mode"),
    ("0-9", "Seek to percentage (0% - 90%)"),
    ("Shift + ,", "Decrease playback speed"),
    ("Shift + .", "Increase playback speed"),
    ("Home", "Go to start"),
    ("End", "Go to end"),
    ("?", "Show / Hide this help"),
];

// =============================================================================
// Key Input
// =============================================================================

/// A physical key, independent of layout-specific text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCode {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Escape,
    Comma,
    Period,
    Slash,
    /// `?` as produced text
    Question,
    /// `0`-`9`
    Digit(u8),
    /// A letter, lowercased
    Letter(char),
}

impl FromStr for KeyCode {
    type Err = Error;

    /// Accepts DOM `key`/`code` style names (`ArrowLeft`, `KeyK`, `Digit5`) and
    /// single characters (`k`, `5`, `,`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            " " | "Space" | "space" => KeyCode::Space,
            "ArrowLeft" | "Left" | "left" => KeyCode::ArrowLeft,
            "ArrowRight" | "Right" | "right" => KeyCode::ArrowRight,
            "ArrowUp" | "Up" | "up" => KeyCode::ArrowUp,
            "ArrowDown" | "Down" | "down" => KeyCode::ArrowDown,
            "Home" | "home" => KeyCode::Home,
            "End" | "end" => KeyCode::End,
            "Enter" | "enter" => KeyCode::Enter,
            "Escape" | "Esc" | "escape" | "esc" => KeyCode::Escape,
            "," | "<" | "Comma" | "comma" => KeyCode::Comma,
            "." | ">" | "Period" | "period" => KeyCode::Period,
            "/" | "Slash" | "slash" => KeyCode::Slash,
            "?" => KeyCode::Question,
            _ => {
                let name = s.strip_prefix("Key").or_else(|| s.strip_prefix("Digit")).unwrap_or(s);
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_digit() => KeyCode::Digit(c as u8 - b'0'),
                    (Some(c), None) if c.is_ascii_alphabetic() => KeyCode::Letter(c.to_ascii_lowercase()),
                    _ => return Err(Error::InvalidConfig(format!("unknown key: {}", s))),
                }
            }
        };
        Ok(key)
    }
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: KeyCode,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn shifted(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }
}

impl FromStr for KeyInput {
    type Err = Error;

    /// Parses `K`, `Shift+,`, `Ctrl+Shift+ArrowLeft`. `<`, `>` and `?` imply Shift.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::NONE;
        let mut parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.pop().filter(|p| !p.is_empty()).ok_or_else(|| {
            Error::InvalidConfig(format!("missing key in: {}", s))
        })?;

        for part in parts {
            match part.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                other => return Err(Error::InvalidConfig(format!("unknown modifier: {}", other))),
            }
        }
        if matches!(key_part, "<" | ">" | "?") {
            modifiers.shift = true;
        }

        Ok(Self {
            key: key_part.parse()?,
            modifiers,
        })
    }
}

/// Where keyboard focus currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    /// The player container itself
    Container,
    /// The media element
    Media,
    /// A control inside the player
    Descendant,
    /// Anywhere else on the page
    Outside,
}

impl Focus {
    pub fn is_inside_player(&self) -> bool {
        !matches!(self, Focus::Outside)
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// What a shortcut does, before it is resolved against state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ShortcutAction {
    TogglePlay,
    SeekBy(f64),
    VolumeBy(f64),
    ToggleMute,
    ToggleFullscreen,
    TogglePictureInPicture,
    ToggleCaptions,
    ToggleTheaterMode,
    /// Seek to `duration × digit / 10`
    SeekToTenth(u8),
    RateBy(f64),
    SeekToStart,
    SeekToEnd,
    ToggleHelp,
}

impl ShortcutAction {
    /// Resolve into an intent. `None` for actions handled by the dispatcher itself.
    pub fn to_intent(self, state: &PlaybackState) -> Option<Intent> {
        let intent = match self {
            ShortcutAction::TogglePlay => Intent::TogglePlay,
            ShortcutAction::SeekBy(delta) => {
                Intent::Seek((state.current_time + delta).clamp(0.0, state.duration.max(0.0)))
            }
            ShortcutAction::VolumeBy(delta) => Intent::SetVolume((state.volume + delta).clamp(0.0, 1.0)),
            ShortcutAction::ToggleMute => Intent::ToggleMute,
            ShortcutAction::ToggleFullscreen => Intent::ToggleFullscreen,
            ShortcutAction::TogglePictureInPicture => Intent::TogglePictureInPicture,
            ShortcutAction::ToggleCaptions => Intent::ToggleCaptions,
            ShortcutAction::ToggleTheaterMode => Intent::ToggleTheaterMode,
            ShortcutAction::SeekToTenth(digit) => Intent::Seek(state.duration * f64::from(digit) / 10.0),
            ShortcutAction::RateBy(delta) => {
                Intent::SetPlaybackRate((state.playback_rate + delta).clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE))
            }
            ShortcutAction::SeekToStart => Intent::Seek(0.0),
            ShortcutAction::SeekToEnd => Intent::Seek(state.duration),
            ShortcutAction::ToggleHelp => return None,
        };
        Some(intent)
    }
}

/// Look up the shortcut for a key press
pub fn map_key(input: KeyInput) -> Option<ShortcutAction> {
    let shift = input.modifiers.shift;
    let action = match input.key {
        KeyCode::Space | KeyCode::Letter('k') => ShortcutAction::TogglePlay,
        KeyCode::ArrowLeft | KeyCode::Letter('j') => ShortcutAction::SeekBy(-SEEK_STEP),
        KeyCode::ArrowRight | KeyCode::Letter('l') => ShortcutAction::SeekBy(SEEK_STEP),
        KeyCode::ArrowUp => ShortcutAction::VolumeBy(VOLUME_STEP),
        KeyCode::ArrowDown => ShortcutAction::VolumeBy(-VOLUME_STEP),
        KeyCode::Letter('m') => ShortcutAction::ToggleMute,
        KeyCode::Letter('f') => ShortcutAction::ToggleFullscreen,
        KeyCode::Letter('i') => ShortcutAction::TogglePictureInPicture,
        KeyCode::Letter('c') => ShortcutAction::ToggleCaptions,
        KeyCode::Letter('t') => ShortcutAction::ToggleTheaterMode,
        KeyCode::Digit(digit) if digit <= 9 && !input.modifiers.any() => ShortcutAction::SeekToTenth(digit),
        KeyCode::Comma if shift => ShortcutAction::RateBy(-RATE_STEP),
        KeyCode::Period if shift => ShortcutAction::RateBy(RATE_STEP),
        KeyCode::Home => ShortcutAction::SeekToStart,
        KeyCode::End => ShortcutAction::SeekToEnd,
        KeyCode::Question => ShortcutAction::ToggleHelp,
        KeyCode::Slash if shift => ShortcutAction::ToggleHelp,
        _ => return None,
    };
    Some(action)
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Result of offering a key press to the dispatcher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    pub handled: bool,
    /// The host should suppress the key's default action
    pub prevent_default: bool,
    pub intent: Option<Intent>,
    /// The help overlay was opened or closed
    pub help_toggled: bool,
}

impl KeyOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled(intent: Option<Intent>) -> Self {
        Self {
            handled: true,
            prevent_default: true,
            intent,
            help_toggled: false,
        }
    }

    fn help() -> Self {
        Self {
            help_toggled: true,
            ..Self::handled(None)
        }
    }
}

/// Turns key presses into intents; owns the help overlay flag
#[derive(Debug, Clone, Default)]
pub struct KeyboardDispatcher {
    help_visible: bool,
}

impl KeyboardDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    /// Close the help overlay (close button or backdrop click)
    pub fn close_help(&mut self) {
        self.help_visible = false;
    }

    pub fn dispatch(
        &mut self,
        input: KeyInput,
        focus: Focus,
        state: &PlaybackState,
        config: &PlayerConfig,
    ) -> KeyOutcome {
        if !config.enable_keyboard_shortcuts || !focus.is_inside_player() {
            return KeyOutcome::ignored();
        }

        if input.key == KeyCode::Escape && self.help_visible {
            self.help_visible = false;
            return KeyOutcome::help();
        }

        let Some(action) = map_key(input) else {
            return KeyOutcome::ignored();
        };

        match action {
            ShortcutAction::TogglePictureInPicture if !config.enable_picture_in_picture => KeyOutcome::ignored(),
            ShortcutAction::ToggleTheaterMode if !config.enable_theater_mode => KeyOutcome::ignored(),
            ShortcutAction::ToggleHelp => {
                self.help_visible = !self.help_visible;
                KeyOutcome::help()
            }
            action => KeyOutcome::handled(action.to_intent(state)),
        }
    }
}

impl PlaybackCoordinator {
    /// Offer a key press; applies the resulting intent
    pub async fn handle_key(&self, dispatcher: &mut KeyboardDispatcher, input: KeyInput, focus: Focus) -> KeyOutcome {
        let state = self.state().await;
        let outcome = dispatcher.dispatch(input, focus, &state, self.config());

        if let Some(intent) = outcome.intent.clone() {
            debug!(?input, ?intent, "Keyboard shortcut");
            if let Err(err) = self.apply(intent).await {
                self.report(&err);
            }
        }
        outcome
    }
}
