//! Chapter markers on the seek bar

use serde::{Deserialize, Serialize};

use super::Intent;
use crate::coordinator::KeyCode;
use crate::types::{chapter_index_at, Chapter};

/// One marker, ready to position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterMarker {
    pub index: usize,
    pub title: String,
    /// Offset from the left edge of the seek bar, in percent
    pub left_percent: f64,
    /// Playback is inside this chapter
    pub active: bool,
    pub aria_label: String,
}

impl ChapterMarker {
    /// Click or tap on the marker
    pub fn activate(&self) -> Intent {
        Intent::SeekToChapter(self.index)
    }

    /// Enter and Space activate a focused marker
    pub fn key_activate(&self, key: KeyCode) -> Option<Intent> {
        matches!(key, KeyCode::Enter | KeyCode::Space).then(|| self.activate())
    }
}

/// Markers for `chapters`; empty until the duration is known
pub fn chapter_markers(chapters: &[Chapter], duration: f64, current_time: f64) -> Vec<ChapterMarker> {
    if duration <= 0.0 {
        return Vec::new();
    }

    let current = chapter_index_at(chapters, current_time);
    chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| ChapterMarker {
            index,
            title: chapter.title.clone(),
            left_percent: (chapter.start_time / duration * 100.0).clamp(0.0, 100.0),
            active: current == Some(index),
            aria_label: format!("Chapter: {}", chapter.title),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters() -> Vec<Chapter> {
        vec![
            Chapter::new("Intro", 0.0, 30.0),
            Chapter::new("Setup", 30.0, 90.0),
            Chapter::new("Outro", 90.0, 120.0),
        ]
    }

    #[test]
    fn test_marker_positions() {
        let markers = chapter_markers(&chapters(), 120.0, 45.0);
        let lefts: Vec<f64> = markers.iter().map(|m| m.left_percent).collect();
        assert_eq!(lefts, vec![0.0, 25.0, 75.0]);
        assert!(markers[1].active);
        assert!(!markers[0].active);
        assert_eq!(markers[2].aria_label, "Chapter: Outro");
    }

    #[test]
    fn test_single_active_marker_at_boundary() {
        let markers = chapter_markers(&chapters(), 120.0, 30.0);
        let active: Vec<usize> = markers.iter().filter(|m| m.active).map(|m| m.index).collect();
        assert_eq!(active, vec![1]);
    }

    #[test]
    fn test_no_markers_without_duration() {
        assert!(chapter_markers(&chapters(), 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_activation() {
        let markers = chapter_markers(&chapters(), 120.0, 0.0);
        assert_eq!(markers[2].activate(), Intent::SeekToChapter(2));
        assert_eq!(markers[1].key_activate(KeyCode::Space), Some(Intent::SeekToChapter(1)));
        assert_eq!(markers[1].key_activate(KeyCode::Letter('k')), None);
    }
}
