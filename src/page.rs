use crate::render::SpanRenderer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const NOTHING_FOUND: &str = "Nothing found.";

/// One rendered sentence on a results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceContext {
    pub markup: String,
    /// Class names of the tokens that satisfied a word-level sub-query.
    pub matched_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePage {
    pub n_occurrences: u64,
    pub n_sentences: u64,
    pub n_docs: u64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<SentenceContext>>,
}

impl SentencePage {
    fn nothing_found() -> Self {
        Self {
            n_occurrences: 0,
            n_sentences: 0,
            n_docs: 0,
            message: NOTHING_FOUND.to_string(),
            contexts: None,
        }
    }

    /// Sentences containing at least one word-level match.
    pub fn matched_sentences(&self) -> usize {
        self.contexts
            .iter()
            .flatten()
            .filter(|context| !context.matched_words.is_empty())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPage {
    pub n_occurrences: u64,
    pub n_sentences: u64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<String>>,
}

impl WordPage {
    fn nothing_found() -> Self {
        Self {
            n_occurrences: 0,
            n_sentences: 0,
            message: NOTHING_FOUND.to_string(),
            words: None,
        }
    }
}

impl SpanRenderer<'_> {
    /// Renders every hit of a sentence search response. Hits are rendered in
    /// parallel; hit `i` gets sentence number `i` and stays at index `i`.
    pub fn render_sentence_page(&self, response: &Value) -> SentencePage {
        let Some((total, hits)) = hits_and_total(response) else {
            debug!("sentence response carries no hits");
            return SentencePage::nothing_found();
        };
        debug!(total, hits = hits.len(), "rendering sentence page");
        let contexts = hits
            .par_iter()
            .enumerate()
            .map(|(sentence, hit)| {
                let rendered = self.render_hit(hit, sentence);
                SentenceContext {
                    markup: rendered.markup,
                    matched_words: rendered.matches.to_class_names(),
                }
            })
            .collect();
        SentencePage {
            n_sentences: total,
            message: String::new(),
            contexts: Some(contexts),
            ..SentencePage::nothing_found()
        }
    }

    /// Renders every hit of a word search response as a table row.
    pub fn render_word_page(&self, response: &Value) -> WordPage {
        let Some((total, hits)) = hits_and_total(response) else {
            debug!("word response carries no hits");
            return WordPage::nothing_found();
        };
        debug!(total, hits = hits.len(), "rendering word page");
        let words = hits.par_iter().map(|hit| self.render_word(hit)).collect();
        WordPage {
            n_occurrences: total,
            message: String::new(),
            words: Some(words),
            ..WordPage::nothing_found()
        }
    }
}

/// `hits.total` may be a plain count or an object with a `value` count.
/// A response without `hits.total` counts as empty.
fn hits_and_total(response: &Value) -> Option<(u64, &[Value])> {
    let hits = response.get("hits")?;
    let total = match hits.get("total")? {
        Value::Object(total) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        other => other.as_u64().unwrap_or(0),
    };
    let list = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    Some((total, list))
}
