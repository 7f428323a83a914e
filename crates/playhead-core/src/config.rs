//! Player configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::theme::{ControlOptions, Theme};

/// Feature toggles, timings and styling for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Allow picture-in-picture (the `I` key and PiP button)
    pub enable_picture_in_picture: bool,
    /// Allow theater mode (the `T` key and theater button)
    pub enable_theater_mode: bool,
    pub enable_keyboard_shortcuts: bool,
    pub enable_analytics: bool,
    pub enable_social_share: bool,
    /// Start playing once the first source is ready
    pub autoplay: bool,
    /// Wrap the playlist (or restart a single source) at the end
    pub loop_playback: bool,
    /// Start muted
    pub muted: bool,
    /// Controls hide after this much inactivity while playing
    pub controls_hide_delay_ms: u64,
    /// Volume slider hides this long after the pointer leaves (300-500)
    pub volume_hide_delay_ms: u64,
    /// Give up on a quality switch after this long; 0 waits forever
    pub quality_switch_timeout_ms: u64,
    /// Pause between a confirmed seek and resuming after a quality switch
    pub resume_grace_delay_ms: u64,
    /// Volume / rate changes settle for this long before analytics counts them
    pub analytics_debounce_ms: u64,
    pub theme: Theme,
    pub control_options: ControlOptions,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            enable_picture_in_picture: true,
            enable_theater_mode: true,
            enable_keyboard_shortcuts: true,
            enable_analytics: false,
            enable_social_share: false,
            autoplay: false,
            loop_playback: false,
            muted: false,
            controls_hide_delay_ms: 3000,
            volume_hide_delay_ms: 400,
            quality_switch_timeout_ms: 15_000,
            resume_grace_delay_ms: 50,
            analytics_debounce_ms: 400,
            theme: Theme::Dark,
            control_options: ControlOptions::default(),
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check timing bounds
    pub fn validate(&self) -> Result<()> {
        if !(300..=500).contains(&self.volume_hide_delay_ms) {
            return Err(Error::InvalidConfig(format!(
                "volume_hide_delay_ms must be within 300-500, got {}",
                self.volume_hide_delay_ms
            )));
        }
        if self.controls_hide_delay_ms == 0 {
            return Err(Error::InvalidConfig("controls_hide_delay_ms must be positive".to_string()));
        }
        if self.resume_grace_delay_ms > 1000 {
            return Err(Error::InvalidConfig(format!(
                "resume_grace_delay_ms must be at most 1000, got {}",
                self.resume_grace_delay_ms
            )));
        }
        if self.quality_switch_timeout_ms != 0 && self.quality_switch_timeout_ms <= self.resume_grace_delay_ms {
            return Err(Error::InvalidConfig(
                "quality_switch_timeout_ms must exceed resume_grace_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    pub fn volume_hide_delay(&self) -> Duration {
        Duration::from_millis(self.volume_hide_delay_ms)
    }

    /// `None` when switches never time out
    pub fn quality_switch_timeout(&self) -> Option<Duration> {
        (self.quality_switch_timeout_ms > 0).then(|| Duration::from_millis(self.quality_switch_timeout_ms))
    }

    pub fn resume_grace_delay(&self) -> Duration {
        Duration::from_millis(self.resume_grace_delay_ms)
    }

    pub fn analytics_debounce(&self) -> Duration {
        Duration::from_millis(self.analytics_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.controls_hide_delay(), Duration::from_secs(3));
        assert_eq!(config.quality_switch_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PlayerConfig::from_json(r#"{"enable_analytics": true, "theme": "light"}"#).unwrap();
        assert!(config.enable_analytics);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.volume_hide_delay_ms, 400);
    }

    #[test]
    fn test_volume_delay_bounds() {
        let err = PlayerConfig::from_json(r#"{"volume_hide_delay_ms": 900}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = PlayerConfig {
            quality_switch_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.quality_switch_timeout(), None);
    }
}
