use crate::HitglossError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-call rendering settings.
///
/// Nothing here is read from process-wide state; callers build one (or load it
/// from a JSON file) and hand it to [`crate::SpanRenderer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Name of the token list in `_source`, and the `field` value that marks
    /// a word-level match inside inner hits.
    pub token_field: String,
    /// Only tokens of this kind are wrapped in regions.
    pub word_kind: String,
    /// Marker the highlighter inserts before a matched substring.
    pub open_marker: String,
    /// Marker the highlighter inserts after a matched substring.
    pub close_marker: String,
    pub region_class: String,
    pub match_class: String,
    pub highlight_class: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            token_field: "words".to_string(),
            word_kind: "word".to_string(),
            open_marker: "<em>".to_string(),
            close_marker: "</em>".to_string(),
            region_class: "word".to_string(),
            match_class: "wmatch".to_string(),
            highlight_class: "smatch".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(input: &str) -> Result<Self, HitglossError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HitglossError> {
        let path = path.as_ref();
        let wrap = |source: HitglossError| HitglossError::Config {
            path: path.to_path_buf(),
            source: Box::new(source),
        };
        let raw = fs::read_to_string(path).map_err(|err| wrap(err.into()))?;
        Self::from_json_str(&raw).map_err(wrap)
    }

    /// Both markers must be non-empty for highlighter output to be scanned.
    pub fn markers_enabled(&self) -> bool {
        !self.open_marker.is_empty() && !self.close_marker.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_corpus_layout() {
        let config = RenderConfig::default();
        assert_eq!(config.token_field, "words");
        assert_eq!(config.open_marker, "<em>");
        assert_eq!(config.close_marker, "</em>");
        assert!(config.markers_enabled());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = RenderConfig::from_json_str(r#"{"open_marker": "<b>", "close_marker": "</b>"}"#)
            .expect("valid config");
        assert_eq!(config.open_marker, "<b>");
        assert_eq!(config.close_marker, "</b>");
        assert_eq!(config.token_field, "words");
        assert_eq!(config.match_class, "wmatch");
    }

    #[test]
    fn empty_marker_disables_highlighting() {
        let config = RenderConfig {
            close_marker: String::new(),
            ..RenderConfig::default()
        };
        assert!(!config.markers_enabled());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = RenderConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, HitglossError::Json(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RenderConfig::from_path("/nonexistent/hitgloss.json").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/nonexistent/hitgloss.json"), "{message}");
    }
}
