use crate::hit::{Token, TokenId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Something that opens and closes a region in a sentence: a word token, or
/// the highlighter's match marker.
///
/// Ordering puts tokens first so class lists read `w0_1 w0_2 … smatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionKey {
    Token(TokenId),
    Highlight,
}

impl RegionKey {
    pub fn token(&self) -> Option<TokenId> {
        match self {
            RegionKey::Token(id) => Some(*id),
            RegionKey::Highlight => None,
        }
    }
}

/// Everything that happens at one character position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub position: usize,
    pub closes: BTreeSet<RegionKey>,
    pub opens: BTreeSet<RegionKey>,
}

/// Sweep-line maps keyed by codepoint position: which keys begin and which
/// end at each position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryIndex {
    opens: BTreeMap<usize, BTreeSet<RegionKey>>,
    closes: BTreeMap<usize, BTreeSet<RegionKey>>,
}

impl BoundaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every word token with a usable `[start, end)` interval.
    pub fn from_tokens(tokens: &[Token<'_>], sentence: usize, word_kind: &str) -> Self {
        let mut index = Self::new();
        for token in tokens {
            match token.word_span(word_kind) {
                Some((start, end)) => {
                    let key = RegionKey::Token(token.id(sentence));
                    index.open(start, key);
                    index.close(end, key);
                }
                None => trace!(
                    sentence,
                    token = token.index,
                    kind = token.kind,
                    "token left out of the boundary index"
                ),
            }
        }
        index
    }

    pub fn open(&mut self, position: usize, key: RegionKey) {
        self.opens.entry(position).or_default().insert(key);
    }

    pub fn close(&mut self, position: usize, key: RegionKey) {
        self.closes.entry(position).or_default().insert(key);
    }

    pub fn opens_at(&self, position: usize) -> Option<&BTreeSet<RegionKey>> {
        self.opens.get(&position)
    }

    pub fn closes_at(&self, position: usize) -> Option<&BTreeSet<RegionKey>> {
        self.closes.get(&position)
    }

    pub fn is_empty(&self) -> bool {
        self.opens.is_empty() && self.closes.is_empty()
    }

    pub fn merge(&mut self, other: BoundaryIndex) {
        for (position, keys) in other.opens {
            self.opens.entry(position).or_default().extend(keys);
        }
        for (position, keys) in other.closes {
            self.closes.entry(position).or_default().extend(keys);
        }
    }

    /// Folds both maps into a single list ordered by position.
    pub fn into_boundaries(self) -> Vec<Boundary> {
        let mut merged: BTreeMap<usize, Boundary> = BTreeMap::new();
        for (position, keys) in self.closes {
            boundary_at(&mut merged, position).closes = keys;
        }
        for (position, keys) in self.opens {
            boundary_at(&mut merged, position).opens = keys;
        }
        merged.into_values().collect()
    }
}

fn boundary_at(merged: &mut BTreeMap<usize, Boundary>, position: usize) -> &mut Boundary {
    merged.entry(position).or_insert_with(|| Boundary {
        position,
        closes: BTreeSet::new(),
        opens: BTreeSet::new(),
    })
}
