use crate::config::RenderConfig;
use crate::highlight::match_boundaries;
use crate::hit::{Hit, Token, WordEntry};
use crate::index::{Boundary, BoundaryIndex, RegionKey};
use crate::matches::{MatchSet, resolve_matches};
use crate::popup::{escape_attribute, region_popup, token_popup};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

const REGION_CLOSE: &str = "</span>";

/// Annotated markup for one sentence hit plus the tokens its query matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSentence {
    pub markup: String,
    pub matches: MatchSet,
}

/// Turns hits into annotated markup according to a [`RenderConfig`].
#[derive(Debug, Clone, Copy)]
pub struct SpanRenderer<'c> {
    config: &'c RenderConfig,
}

impl<'c> SpanRenderer<'c> {
    pub fn new(config: &'c RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'c RenderConfig {
        self.config
    }

    /// Renders one element of `hits.hits`. `sentence` is the hit's position
    /// on the page and becomes part of every token identifier.
    pub fn render_hit(&self, value: &Value, sentence: usize) -> RenderedSentence {
        let hit = Hit::from_value(value, &self.config.token_field);
        let matches = hit
            .inner_hits
            .map(|tree| resolve_matches(tree, sentence, &self.config.token_field))
            .unwrap_or_default();
        let markup = self.render_parsed(&hit, sentence, &matches);
        RenderedSentence { markup, matches }
    }

    fn render_parsed(&self, hit: &Hit<'_>, sentence: usize, matches: &MatchSet) -> String {
        let Some(source) = hit.source.as_ref() else {
            trace!(sentence, "hit without _source");
            return String::new();
        };
        let text = match source.text {
            Some(text) if !text.is_empty() => text,
            _ => {
                trace!(sentence, "sentence without text");
                return String::new();
            }
        };
        let Some(tokens) = source.tokens.as_deref() else {
            return hit.highlighted.unwrap_or(text).to_string();
        };

        let mut boundaries = BoundaryIndex::from_tokens(tokens, sentence, &self.config.word_kind);
        if let Some(markup) = hit.highlighted {
            if self.config.markers_enabled() {
                boundaries.merge(match_boundaries(
                    markup,
                    &self.config.open_marker,
                    &self.config.close_marker,
                ));
            }
        }
        self.sweep(text, tokens, boundaries.into_boundaries(), matches)
    }

    /// Single left-to-right pass over the raw text. All keys active at a
    /// position share one region; whenever the active set changes the current
    /// region is closed and, if anything is still active, a new one opened.
    fn sweep(
        &self,
        text: &str,
        tokens: &[Token<'_>],
        boundaries: Vec<Boundary>,
        matches: &MatchSet,
    ) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        let mut active: BTreeSet<RegionKey> = BTreeSet::new();
        let mut pending = boundaries.into_iter().peekable();

        for (position, ch) in text.chars().enumerate() {
            if let Some(boundary) = pending.next_if(|b| b.position == position) {
                let mut changed = false;
                if !active.is_empty() {
                    out.push_str(REGION_CLOSE);
                    changed = true;
                    for key in &boundary.closes {
                        active.remove(key);
                    }
                }
                if !boundary.opens.is_empty() {
                    active.extend(boundary.opens.iter().copied());
                    changed = true;
                }
                if changed && !active.is_empty() {
                    out.push_str(&self.open_region(&active, tokens, matches));
                }
            }
            out.push(ch);
        }

        if !active.is_empty() {
            trace!(open = active.len(), "closing regions left open at end of text");
            out.push_str(REGION_CLOSE);
        }
        out
    }

    fn open_region(
        &self,
        active: &BTreeSet<RegionKey>,
        tokens: &[Token<'_>],
        matches: &MatchSet,
    ) -> String {
        let mut classes = self.config.region_class.clone();
        for key in active {
            classes.push(' ');
            match key {
                RegionKey::Token(id) => {
                    classes.push_str(&id.to_string());
                    if matches.contains(id) {
                        classes.push(' ');
                        classes.push_str(&self.config.match_class);
                    }
                }
                RegionKey::Highlight => classes.push_str(&self.config.highlight_class),
            }
        }
        let popup = region_popup(
            active
                .iter()
                .filter_map(RegionKey::token)
                .filter_map(|id| tokens.get(id.index))
                .map(|token| (token.form, token.analyses)),
        );
        format!(r#"<span class="{classes}" data-ana="{popup}">"#)
    }

    /// Renders one hit of a word search as a table row: the word with its
    /// popup, its frequency and the number of sentences it occurs in.
    pub fn render_word(&self, value: &Value) -> String {
        let Some(entry) = WordEntry::from_hit(value) else {
            return String::new();
        };
        format!(
            r#"<tr><td><span class="{class}" data-ana="{popup}">{form}</span></td><td>{freq}</td><td>{sentences}</td></tr>"#,
            class = self.config.region_class,
            popup = escape_attribute(&token_popup(entry.form, entry.analyses)),
            form = entry.form.unwrap_or_default(),
            freq = entry.freq,
            sentences = entry.sentence_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::TokenId;
    use serde_json::json;

    fn render(value: &Value, sentence: usize) -> RenderedSentence {
        let config = RenderConfig::default();
        SpanRenderer::new(&config).render_hit(value, sentence)
    }

    fn word(start: usize, end: usize, form: &str) -> Value {
        json!({"wtype": "word", "off_start": start, "off_end": end, "wf": form})
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    fn strip_tags(markup: &str) -> String {
        let mut plain = String::new();
        let mut in_tag = false;
        for ch in markup.chars() {
            match ch {
                '<' => in_tag = true,
                '>' if in_tag => in_tag = false,
                other if !in_tag => plain.push(other),
                _ => {}
            }
        }
        plain
    }

    fn matched_leaf(offset: usize) -> Value {
        json!({"_nested": {"field": "words", "offset": offset}})
    }

    #[test]
    fn matched_and_unmatched_words() {
        let hit = json!({
            "_source": {
                "text": "cat sat",
                "words": [word(0, 3, "cat"), word(4, 7, "sat")]
            },
            "inner_hits": {"q": {"hits": {"hits": [matched_leaf(0)]}}}
        });
        let rendered = render(&hit, 1);
        let expected = concat!(
            r#"<span class="word w1_0 wmatch" data-ana="---------\ncat\n">cat</span>"#,
            " ",
            r#"<span class="word w1_1" data-ana="---------\nsat\n">sat</span>"#,
        );
        assert_eq!(rendered.markup, expected);
        assert_eq!(rendered.matches.to_class_names(), vec!["w1_0"]);
    }

    #[test]
    fn no_tokens_leaves_text_unchanged() {
        let hit = json!({"_source": {"text": "cat sat", "words": []}});
        assert_eq!(render(&hit, 0).markup, "cat sat");
    }

    #[test]
    fn missing_token_list_returns_highlighted_text() {
        let hit = json!({
            "_source": {"text": "cat sat"},
            "highlight": {"text": ["<em>cat</em> sat"]}
        });
        assert_eq!(render(&hit, 0).markup, "<em>cat</em> sat");
    }

    #[test]
    fn missing_source_or_text_renders_nothing() {
        assert_eq!(render(&json!({"_id": "1"}), 0).markup, "");
        assert_eq!(render(&json!({"_source": {"text": ""}}), 0).markup, "");
        assert_eq!(render(&json!({"_source": {"words": []}}), 0).markup, "");
        assert_eq!(render(&json!({"_source": {"text": 7}}), 0).markup, "");
    }

    #[test]
    fn empty_highlight_list_adds_no_match_regions() {
        let hit = json!({
            "_source": {"text": "cat sat", "words": [word(0, 3, "cat")]},
            "highlight": {"text": []}
        });
        let markup = render(&hit, 0).markup;
        assert!(!markup.contains("smatch"));
        assert_eq!(strip_tags(&markup), "cat sat");
    }

    #[test]
    fn highlight_splits_token_regions() {
        // highlighter matched "at s" across the word boundary
        let hit = json!({
            "_source": {
                "text": "cat sat",
                "words": [word(0, 3, "cat"), word(4, 7, "sat")]
            },
            "highlight": {"text": "c<em>at s</em>at"}
        });
        let markup = render(&hit, 0).markup;
        assert_eq!(
            markup,
            concat!(
                r#"<span class="word w0_0" data-ana="---------\ncat\n">c"#,
                r#"</span><span class="word w0_0 smatch" data-ana="---------\ncat\n">at"#,
                r#"</span><span class="word smatch" data-ana="---------\n"> "#,
                r#"</span><span class="word w0_1 smatch" data-ana="---------\nsat\n">s"#,
                r#"</span><span class="word w0_1" data-ana="---------\nsat\n">at</span>"#,
            )
        );
        assert_eq!(strip_tags(&markup), "cat sat");
    }

    #[test]
    fn abutting_tokens_close_then_open() {
        let hit = json!({
            "_source": {"text": "ab", "words": [word(0, 1, "a"), word(1, 2, "b")]}
        });
        let markup = render(&hit, 0).markup;
        assert_eq!(
            markup,
            concat!(
                r#"<span class="word w0_0" data-ana="---------\na\n">a</span>"#,
                r#"<span class="word w0_1" data-ana="---------\nb\n">b</span>"#,
            )
        );
    }

    #[test]
    fn tokens_sharing_offsets_share_one_region() {
        let hit = json!({
            "_source": {"text": "ab", "words": [word(0, 2, "ab"), word(0, 2, "ab")]}
        });
        let markup = render(&hit, 3).markup;
        assert_eq!(count(&markup, "<span"), 1);
        assert!(markup.contains(r#"class="word w3_0 w3_1""#));
    }

    #[test]
    fn regions_past_the_end_are_force_closed() {
        let hit = json!({
            "_source": {"text": "cat", "words": [word(0, 10, "cat"), word(2, 40, "t")]}
        });
        let markup = render(&hit, 0).markup;
        assert_eq!(count(&markup, "<span"), count(&markup, "</span>"));
        assert!(markup.ends_with("t</span>"));
        assert_eq!(strip_tags(&markup), "cat");
    }

    #[test]
    fn unclosed_highlight_is_force_closed() {
        let hit = json!({
            "_source": {"text": "abc", "words": []},
            "highlight": {"text": "a<em>bc"}
        });
        let markup = render(&hit, 0).markup;
        assert_eq!(count(&markup, "<span"), 1);
        assert_eq!(count(&markup, "</span>"), 1);
    }

    #[test]
    fn punctuation_stays_outside_regions() {
        let hit = json!({
            "_source": {
                "text": "Hi!",
                "words": [
                    word(0, 2, "Hi"),
                    {"wtype": "punct", "off_start": 2, "off_end": 3, "wf": "!"}
                ]
            }
        });
        assert!(render(&hit, 0).markup.ends_with("Hi</span>!"));
    }

    #[test]
    fn offsets_are_codepoints() {
        let hit = json!({
            "_source": {"text": "ёж и кот", "words": [word(0, 2, "ёж"), word(5, 8, "кот")]}
        });
        let markup = render(&hit, 0).markup;
        assert!(markup.contains(">ёж</span> и <span"));
        assert!(markup.ends_with(">кот</span>"));
    }

    #[test]
    fn every_word_character_is_covered_by_its_region() {
        let forms = ["the", "quick", "brown", "fox"];
        let text = forms.join(" ");
        let mut words = Vec::new();
        let mut start = 0;
        for form in forms {
            let end = start + form.chars().count();
            words.push(word(start, end, form));
            start = end + 1;
        }
        let hit = json!({"_source": {"text": text, "words": words}, "highlight": {"text": "the <em>quick brown</em> fox"}});
        let markup = render(&hit, 2).markup;

        for (index, form) in forms.iter().enumerate() {
            let class = TokenId::new(2, index).to_string();
            let region_start = markup.find(&class).expect("region present");
            let body_start = region_start + markup[region_start..].find('>').unwrap() + 1;
            assert!(markup[body_start..].starts_with(&form[..1]), "{form} not wrapped");
        }
        assert_eq!(count(&markup, "<span"), count(&markup, "</span>"));
    }

    #[test]
    fn analyses_reach_the_popup() {
        let hit = json!({
            "_source": {
                "text": "cats",
                "words": [{
                    "wtype": "word", "off_start": 0, "off_end": 4, "wf": "cats",
                    "ana": [{"lex": "cat", "gr.num": "pl"}]
                }]
            }
        });
        let markup = render(&hit, 0).markup;
        assert!(markup.contains(
            r#"data-ana="---------\ncats\nAnalysis #1.\n{\n  'lex': 'cat',\n  'gr.num': 'pl'\n} \n""#
        ));
    }

    #[test]
    fn word_row_lists_frequency_and_sentence_count() {
        let config = RenderConfig::default();
        let renderer = SpanRenderer::new(&config);
        let hit = json!({"_source": {"wf": "cat", "freq": 12, "sids": [3, 8], "ana": []}});
        assert_eq!(
            renderer.render_word(&hit),
            r#"<tr><td><span class="word" data-ana="cat\n">cat</span></td><td>12</td><td>2</td></tr>"#
        );
        assert_eq!(renderer.render_word(&json!({})), "");
    }

    #[test]
    fn word_row_defaults_missing_counts() {
        let config = RenderConfig::default();
        let row = SpanRenderer::new(&config).render_word(&json!({"_source": {"wf": "dog"}}));
        assert!(row.ends_with("<td>0</td><td>0</td></tr>"));
    }

    #[test]
    fn custom_markers_and_classes() {
        let config = RenderConfig {
            open_marker: "[[".to_string(),
            close_marker: "]]".to_string(),
            highlight_class: "hit".to_string(),
            ..RenderConfig::default()
        };
        let hit = json!({
            "_source": {"text": "ab", "words": []},
            "highlight": {"text": "a[[b]]"}
        });
        let markup = SpanRenderer::new(&config).render_hit(&hit, 0).markup;
        assert_eq!(markup, r#"a<span class="word hit" data-ana="---------\n">b</span>"#);
    }
}
