//! Error types for Playhead Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Playback errors
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    #[error("Video failed to load")]
    LoadFailed,

    // Feature errors
    #[error("{feature} is not supported: {reason}")]
    FeatureUnsupported { feature: &'static str, reason: String },

    #[error("{feature} is disabled by configuration")]
    FeatureDisabled { feature: &'static str },

    // Quality switching errors
    #[error("Unknown quality: {0}")]
    UnknownQuality(String),

    #[error("Quality switch failed: {0}")]
    QualitySwitchFailed(String),

    #[error("Quality switch to {quality} timed out after {timeout_ms}ms")]
    QualitySwitchTimeout { quality: String, timeout_ms: u64 },

    #[error("Source change refused while a quality switch is in progress")]
    SourceSyncBlocked,

    // Navigation errors
    #[error("Chapter index {index} out of range ({count} chapters)")]
    ChapterOutOfRange { index: usize, count: usize },

    #[error("Playlist index {index} out of range ({count} items)")]
    PlaylistIndexOutOfRange { index: usize, count: usize },

    #[error("No subtitle track for language: {0}")]
    UnknownSubtitleLanguage(String),

    // Caption errors
    #[error("Failed to parse captions: {0}")]
    CaptionParse(String),

    // Configuration errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a feature-unsupported error
    pub fn unsupported(feature: &'static str, reason: impl Into<String>) -> Self {
        Error::FeatureUnsupported {
            feature,
            reason: reason.into(),
        }
    }

    /// Returns true if the player stays usable after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::InvalidConfig(_) | Error::Internal(_) | Error::Io(_)
        )
    }

    /// Returns the error code for analytics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::PlaybackRejected(_) => "PLAYBACK_REJECTED",
            Error::LoadFailed => "LOAD_FAILED",
            Error::FeatureUnsupported { .. } => "FEATURE_UNSUPPORTED",
            Error::FeatureDisabled { .. } => "FEATURE_DISABLED",
            Error::UnknownQuality(_) => "UNKNOWN_QUALITY",
            Error::QualitySwitchFailed(_) => "QUALITY_SWITCH",
            Error::QualitySwitchTimeout { .. } => "QUALITY_TIMEOUT",
            Error::SourceSyncBlocked => "SOURCE_BLOCKED",
            Error::ChapterOutOfRange { .. } => "CHAPTER_RANGE",
            Error::PlaylistIndexOutOfRange { .. } => "PLAYLIST_RANGE",
            Error::UnknownSubtitleLanguage(_) => "SUBTITLE_LANGUAGE",
            Error::CaptionParse(_) => "CAPTION_PARSE",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
            Error::Internal(_) => "INTERNAL",
            Error::Io(_) => "IO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failed_message() {
        assert_eq!(Error::LoadFailed.to_string(), "Video failed to load");
    }

    #[test]
    fn test_feature_unsupported_message() {
        let err = Error::unsupported("Picture-in-Picture", "API absent");
        assert_eq!(err.to_string(), "Picture-in-Picture is not supported: API absent");
        assert_eq!(err.error_code(), "FEATURE_UNSUPPORTED");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_errors_not_recoverable() {
        assert!(!Error::InvalidConfig("bad".into()).is_recoverable());
    }
}
