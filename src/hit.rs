use crate::fragment::Fragment;
use serde_json::{Map, Value};
use std::fmt;

const SOURCE_KEY: &str = "_source";
const HIGHLIGHT_KEY: &str = "highlight";
const INNER_HITS_KEY: &str = "inner_hits";
const TEXT_KEY: &str = "text";
const KIND_KEY: &str = "wtype";
const START_KEY: &str = "off_start";
const END_KEY: &str = "off_end";
const FORM_KEY: &str = "wf";
const ANALYSES_KEY: &str = "ana";
const FREQ_KEY: &str = "freq";
const SENTENCE_IDS_KEY: &str = "sids";

/// Identifies one token within a rendered page: the hit's sequence number
/// plus the token's index inside the sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId {
    pub sentence: usize,
    pub index: usize,
}

impl TokenId {
    pub const fn new(sentence: usize, index: usize) -> Self {
        Self { sentence, index }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}_{}", self.sentence, self.index)
    }
}

/// One entry of a sentence's token list. Every field is optional because
/// upstream records are heterogeneous; indexing skips what it cannot use.
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub index: usize,
    pub kind: Option<&'a str>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub form: Option<&'a str>,
    pub analyses: &'a [Value],
}

impl<'a> Token<'a> {
    pub fn from_value(index: usize, value: &'a Value) -> Self {
        let record = value.as_object();
        let get = |key: &str| record.and_then(|map| map.get(key));
        Self {
            index,
            kind: get(KIND_KEY).and_then(Value::as_str),
            start: get(START_KEY).and_then(as_offset),
            end: get(END_KEY).and_then(as_offset),
            form: get(FORM_KEY).and_then(Value::as_str),
            analyses: get(ANALYSES_KEY)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    pub fn id(&self, sentence: usize) -> TokenId {
        TokenId::new(sentence, self.index)
    }

    /// The `[start, end)` interval, if this token takes part in annotation.
    pub fn word_span(&self, word_kind: &str) -> Option<(usize, usize)> {
        if self.kind != Some(word_kind) {
            return None;
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) if start < end => Some((start, end)),
            _ => None,
        }
    }
}

/// The `_source` part of a sentence hit.
#[derive(Debug, Clone, Default)]
pub struct Sentence<'a> {
    pub text: Option<&'a str>,
    /// `None` when the token list is absent or not a list.
    pub tokens: Option<Vec<Token<'a>>>,
}

impl<'a> Sentence<'a> {
    pub fn from_value(value: &'a Value, token_field: &str) -> Self {
        Self {
            text: value.get(TEXT_KEY).and_then(Value::as_str),
            tokens: value
                .get(token_field)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .enumerate()
                        .map(|(index, item)| Token::from_value(index, item))
                        .collect()
                }),
        }
    }
}

/// One element of `hits.hits` in a sentence search response.
#[derive(Debug, Clone)]
pub struct Hit<'a> {
    pub source: Option<Sentence<'a>>,
    /// Highlighter copy of the text, with inline match markers.
    pub highlighted: Option<&'a str>,
    pub inner_hits: Option<Fragment<'a>>,
}

impl<'a> Hit<'a> {
    pub fn from_value(value: &'a Value, token_field: &str) -> Self {
        Self {
            source: value
                .get(SOURCE_KEY)
                .map(|source| Sentence::from_value(source, token_field)),
            highlighted: value
                .get(HIGHLIGHT_KEY)
                .and_then(|highlight| highlight.get(TEXT_KEY))
                .and_then(first_rendering),
            inner_hits: value.get(INNER_HITS_KEY).map(Fragment::of),
        }
    }
}

/// The `_source` part of a word search hit.
#[derive(Debug, Clone)]
pub struct WordEntry<'a> {
    pub form: Option<&'a str>,
    pub analyses: &'a [Value],
    pub freq: u64,
    /// Number of distinct sentences the word occurs in.
    pub sentence_count: usize,
}

impl<'a> WordEntry<'a> {
    pub fn from_hit(value: &'a Value) -> Option<Self> {
        let source = value.get(SOURCE_KEY)?.as_object()?;
        Some(Self::from_map(source))
    }

    fn from_map(source: &'a Map<String, Value>) -> Self {
        Self {
            form: source.get(FORM_KEY).and_then(Value::as_str),
            analyses: source
                .get(ANALYSES_KEY)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            freq: source.get(FREQ_KEY).and_then(Value::as_u64).unwrap_or(0),
            sentence_count: source
                .get(SENTENCE_IDS_KEY)
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        }
    }
}

/// Offsets arrive as JSON integers; anything else is treated as missing.
fn as_offset(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|raw| usize::try_from(raw).ok())
}

/// The highlighter returns either one string or a list of alternatives, of
/// which only the first is used.
fn first_rendering(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text.as_str()),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }
}
