//! Hover menus: playback speed and quality

use serde::{Deserialize, Serialize};

use super::Intent;
use crate::format::{format_rate, format_rate_option};
use crate::types::QualityOption;

/// Rates offered by the speed menu
pub const PLAYBACK_RATES: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

/// Open / closed state shared by every hover menu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn hover_enter(&mut self) {
        self.open = true;
    }

    pub fn hover_leave(&mut self) {
        self.open = false;
    }

    /// Click or tap on the menu button
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

/// One selectable row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem<T> {
    pub value: T,
    pub label: String,
    pub active: bool,
    pub aria_label: String,
}

#[derive(Debug, Clone, Default)]
pub struct SpeedMenu {
    pub menu: MenuState,
}

impl SpeedMenu {
    pub fn button_label(rate: f64) -> String {
        format_rate(rate)
    }

    pub fn button_aria_label(rate: f64) -> String {
        format!("Playback speed: {}", format_rate(rate))
    }

    pub fn items(current_rate: f64) -> Vec<MenuItem<f64>> {
        PLAYBACK_RATES
            .iter()
            .map(|&rate| MenuItem {
                value: rate,
                label: format_rate_option(rate),
                active: (rate - current_rate).abs() < f64::EPSILON,
                aria_label: format!("Set speed to {}", format_rate(rate)),
            })
            .collect()
    }

    /// Choosing a rate closes the menu
    pub fn select(&mut self, rate: f64) -> Intent {
        self.menu.close();
        Intent::SetPlaybackRate(rate)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QualityMenu {
    pub menu: MenuState,
}

impl QualityMenu {
    /// Hidden entirely when there is nothing to choose
    pub fn is_visible(qualities: &[QualityOption]) -> bool {
        !qualities.is_empty()
    }

    /// Label of the selected quality, `Auto` when none is selected
    pub fn button_label(qualities: &[QualityOption], current: Option<&str>) -> String {
        match current {
            Some(id) => qualities
                .iter()
                .find(|q| q.value == id)
                .map(|q| q.label.clone())
                .unwrap_or_else(|| id.to_string()),
            None => "Auto".to_string(),
        }
    }

    pub fn items(qualities: &[QualityOption], current: Option<&str>) -> Vec<MenuItem<String>> {
        qualities
            .iter()
            .map(|q| MenuItem {
                value: q.value.clone(),
                label: q.label.clone(),
                active: current == Some(q.value.as_str()),
                aria_label: format!("Set quality to {}", q.label),
            })
            .collect()
    }

    pub fn select(&mut self, quality_id: &str) -> Intent {
        self.menu.close();
        Intent::SetQuality(quality_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn qualities() -> Vec<QualityOption> {
        vec![
            QualityOption::new("720p", "720", Url::parse("https://cdn.example.com/720.mp4").unwrap()),
            QualityOption::new("1080p", "1080", Url::parse("https://cdn.example.com/1080.mp4").unwrap()),
        ]
    }

    #[test]
    fn test_speed_items() {
        let items = SpeedMenu::items(1.5);
        assert_eq!(items.len(), 8);
        assert_eq!(items[3].label, "1x (Normal)");
        assert!(items[5].active);
        assert_eq!(items.iter().filter(|i| i.active).count(), 1);
    }

    #[test]
    fn test_hover_and_select() {
        let mut speed = SpeedMenu::default();
        speed.menu.hover_enter();
        assert!(speed.menu.is_open());
        assert_eq!(speed.select(0.5), Intent::SetPlaybackRate(0.5));
        assert!(!speed.menu.is_open());
    }

    #[test]
    fn test_quality_label() {
        let qualities = qualities();
        assert_eq!(QualityMenu::button_label(&qualities, None), "Auto");
        assert_eq!(QualityMenu::button_label(&qualities, Some("1080")), "1080p");
        assert!(!QualityMenu::is_visible(&[]));

        let items = QualityMenu::items(&qualities, Some("720"));
        assert!(items[0].active);
        assert_eq!(items[1].aria_label, "Set quality to 1080p");
    }
}
