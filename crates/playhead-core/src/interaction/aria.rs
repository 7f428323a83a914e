//! ARIA attributes exposed by the controls

use serde::{Deserialize, Serialize};

use crate::format::{format_time, format_volume};

/// `role="slider"` attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderAria {
    pub label: String,
    pub value_min: f64,
    pub value_max: f64,
    pub value_now: f64,
    pub value_text: String,
}

impl SliderAria {
    /// Seek bar: values in seconds
    pub fn seek(current_time: f64, duration: f64) -> Self {
        let duration = duration.max(0.0);
        Self {
            label: "Seek".to_string(),
            value_min: 0.0,
            value_max: duration.floor(),
            value_now: current_time.clamp(0.0, duration).floor(),
            value_text: format!("{} of {}", format_time(current_time), format_time(duration)),
        }
    }

    /// Volume slider: values in percent, 0 while muted
    pub fn volume(volume: f64, muted: bool) -> Self {
        let effective = if muted { 0.0 } else { volume.clamp(0.0, 1.0) };
        Self {
            label: "Volume".to_string(),
            value_min: 0.0,
            value_max: 100.0,
            value_now: (effective * 100.0).round(),
            value_text: format_volume(effective, muted),
        }
    }

    pub fn to_attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("role", "slider".to_string()),
            ("aria-label", self.label.clone()),
            ("aria-valuemin", self.value_min.to_string()),
            ("aria-valuemax", self.value_max.to_string()),
            ("aria-valuenow", self.value_now.to_string()),
            ("aria-valuetext", self.value_text.clone()),
            ("tabindex", "0".to_string()),
        ]
    }
}

/// Button label and optional toggle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonAria {
    pub label: String,
    /// `aria-pressed` for toggle buttons
    pub pressed: Option<bool>,
}

impl ButtonAria {
    fn label(label: &str) -> Self {
        Self {
            label: label.to_string(),
            pressed: None,
        }
    }

    fn toggle(label: &str, pressed: bool) -> Self {
        Self {
            label: label.to_string(),
            pressed: Some(pressed),
        }
    }

    pub fn play(is_playing: bool) -> Self {
        Self::label(if is_playing { "Pause" } else { "Play" })
    }

    pub fn mute(is_muted: bool) -> Self {
        Self::label(if is_muted { "Unmute" } else { "Mute" })
    }

    pub fn fullscreen(is_fullscreen: bool) -> Self {
        Self::label(if is_fullscreen { "Exit Fullscreen" } else { "Enter Fullscreen" })
    }

    pub fn captions(enabled: bool) -> Self {
        Self::toggle("Toggle Captions", enabled)
    }

    pub fn picture_in_picture(active: bool) -> Self {
        Self::toggle(
            if active {
                "Exit Picture-in-Picture"
            } else {
                "Enter Picture-in-Picture"
            },
            active,
        )
    }

    pub fn theater_mode(active: bool) -> Self {
        Self::toggle(if active { "Exit Theater Mode" } else { "Theater Mode" }, active)
    }

    pub fn to_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("aria-label", self.label.clone())];
        if let Some(pressed) = self.pressed {
            attrs.push(("aria-pressed", pressed.to_string()));
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_slider_muted() {
        let aria = SliderAria::volume(0.8, true);
        assert_eq!(aria.value_now, 0.0);
        assert_eq!(aria.value_text, "Muted");

        let aria = SliderAria::volume(0.456, false);
        assert_eq!(aria.value_now, 46.0);
    }

    #[test]
    fn test_seek_slider_attributes() {
        let attrs = SliderAria::seek(65.0, 600.0).to_attributes();
        assert!(attrs.contains(&("aria-valuemax", "600".to_string())));
        assert!(attrs.contains(&("aria-valuetext", "1:05 of 10:00".to_string())));
    }

    #[test]
    fn test_button_labels() {
        assert_eq!(ButtonAria::play(true).label, "Pause");
        assert_eq!(ButtonAria::mute(false).label, "Mute");
        assert_eq!(
            ButtonAria::captions(true).to_attributes(),
            vec![
                ("aria-label", "Toggle Captions".to_string()),
                ("aria-pressed", "true".to_string())
            ]
        );
    }
}
