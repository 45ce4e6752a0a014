//! Renders corpus search hits into annotated sentence markup.
//!
//! Each hit carries a sentence's raw text, its tokens with codepoint offsets
//! and morphological analyses, an optional highlighter copy of the text, and
//! an optional inner-hit tree describing which tokens satisfied the query.
//! [`SpanRenderer`] combines these into nested `<span>` regions with popup
//! payloads and match classes.

mod config;
mod error;
pub mod fragment;
pub mod highlight;
pub mod hit;
pub mod index;
pub mod matches;
mod page;
pub mod popup;
mod render;

pub use config::RenderConfig;
pub use error::HitglossError;
pub use hit::TokenId;
pub use matches::MatchSet;
pub use page::{SentenceContext, SentencePage, WordPage};
pub use render::{RenderedSentence, SpanRenderer};

use once_cell::sync::Lazy;
use serde_json::Value;

static DEFAULT_CONFIG: Lazy<RenderConfig> = Lazy::new(RenderConfig::default);

/// Renders one sentence hit with the default corpus layout.
pub fn render_sentence(hit: &Value, sentence: usize) -> RenderedSentence {
    SpanRenderer::new(&DEFAULT_CONFIG).render_hit(hit, sentence)
}

/// Renders one word-search hit with the default corpus layout.
pub fn render_word(hit: &Value) -> String {
    SpanRenderer::new(&DEFAULT_CONFIG).render_word(hit)
}

/// Renders a whole sentence search response with the default corpus layout.
pub fn render_sentence_page(response: &Value) -> SentencePage {
    SpanRenderer::new(&DEFAULT_CONFIG).render_sentence_page(response)
}

/// Renders a whole word search response with the default corpus layout.
pub fn render_word_page(response: &Value) -> WordPage {
    SpanRenderer::new(&DEFAULT_CONFIG).render_word_page(response)
}

/// Parses a response document and renders it as a sentence page.
pub fn render_sentence_page_str(
    input: &str,
    config: &RenderConfig,
) -> Result<SentencePage, HitglossError> {
    let response: Value = serde_json::from_str(input)?;
    Ok(SpanRenderer::new(config).render_sentence_page(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_helpers_render_sentences_and_words() {
        let hit = json!({
            "_source": {
                "text": "cat",
                "words": [{"wtype": "word", "off_start": 0, "off_end": 3, "wf": "cat"}]
            }
        });
        let rendered = render_sentence(&hit, 4);
        assert!(rendered.markup.contains("w4_0"));
        assert!(rendered.matches.is_empty());

        let row = render_word(&json!({"_source": {"wf": "cat", "freq": 1, "sids": [4]}}));
        assert!(row.starts_with("<tr><td><span class=\"word\""));
    }

    #[test]
    fn page_from_string_reports_bad_json() {
        let config = RenderConfig::default();
        assert!(matches!(
            render_sentence_page_str("{", &config),
            Err(HitglossError::Json(_))
        ));
        let page = render_sentence_page_str(r#"{"hits": {"total": 0, "hits": []}}"#, &config)
            .expect("valid response");
        assert_eq!(page.contexts, Some(Vec::new()));
    }
}
