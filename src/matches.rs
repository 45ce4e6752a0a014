use crate::fragment::{Fragment, Step};
use crate::hit::TokenId;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

const INNER_HITS_KEY: &str = "inner_hits";
const FIELD_KEY: &str = "field";
const OFFSET_KEY: &str = "offset";

/// Tokens of one sentence that satisfied a word-level sub-query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    ids: BTreeSet<TokenId>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: TokenId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &TokenId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenId> + '_ {
        self.ids.iter()
    }

    /// Identifiers as class names, in token order.
    pub fn to_class_names(&self) -> Vec<String> {
        self.ids.iter().map(TokenId::to_string).collect()
    }
}

impl FromIterator<TokenId> for MatchSet {
    fn from_iter<I: IntoIterator<Item = TokenId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Collects every token offset reported anywhere inside an inner-hit tree.
///
/// The tree's shape depends on how many word-level clauses the query had, so
/// no depth is assumed:
/// * a mapping with an `inner_hits` member is searched through that member only;
/// * a mapping whose `field` names the token field is a match leaf and yields
///   its `offset`, if any, without looking further down;
/// * any other mapping or sequence is searched member by member.
pub fn resolve_matches(tree: Fragment<'_>, sentence: usize, token_field: &str) -> MatchSet {
    let mut found = MatchSet::new();
    tree.walk(&mut |fragment| {
        if let Some(inner) = fragment.member(INNER_HITS_KEY) {
            return Step::Narrow(inner);
        }
        if fragment.str_member(FIELD_KEY) == Some(token_field) {
            match fragment.member(OFFSET_KEY).and_then(leaf_offset) {
                Some(offset) => {
                    found.insert(TokenId::new(sentence, offset));
                }
                None => trace!(sentence, "match leaf without a usable offset"),
            }
            return Step::Stop;
        }
        Step::Descend
    });
    found
}

fn leaf_offset(fragment: Fragment<'_>) -> Option<usize> {
    match fragment {
        Fragment::Leaf(Value::Number(number)) => {
            number.as_u64().and_then(|raw| usize::try_from(raw).ok())
        }
        Fragment::Leaf(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    }
}
