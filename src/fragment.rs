use serde_json::{Map, Value};

/// A borrowed view over one node of a result tree whose shape is not known
/// ahead of time.
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
    Leaf(&'a Value),
}

/// What a visitor wants [`Fragment::walk`] to do after seeing a node.
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    /// Visit every nested sequence and mapping below this node.
    Descend,
    /// Continue with this child only, ignoring its siblings.
    Narrow(Fragment<'a>),
    /// Do not look below this node.
    Stop,
}

impl<'a> Fragment<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Fragment::Sequence(items),
            Value::Object(map) => Fragment::Mapping(map),
            other => Fragment::Leaf(other),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Fragment::Leaf(_))
    }

    /// Looks up a member of a mapping; sequences and leaves have none.
    pub fn member(&self, key: &str) -> Option<Fragment<'a>> {
        match self {
            Fragment::Mapping(map) => map.get(key).map(Fragment::of),
            _ => None,
        }
    }

    /// Returns the string value of a mapping member, if it is a string.
    pub fn str_member(&self, key: &str) -> Option<&'a str> {
        match self {
            Fragment::Mapping(map) => map.get(key).and_then(Value::as_str),
            _ => None,
        }
    }

    /// Depth-first walk. Leaf members of a mapping are never visited on
    /// their own; leaf elements of a sequence are, and contribute whatever
    /// the visitor makes of them.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&Fragment<'a>) -> Step<'a>,
    {
        match visit(self) {
            Step::Stop => {}
            Step::Narrow(child) => child.walk(visit),
            Step::Descend => match *self {
                Fragment::Sequence(items) => {
                    for item in items {
                        Fragment::of(item).walk(visit);
                    }
                }
                Fragment::Mapping(map) => {
                    for value in map.values() {
                        let child = Fragment::of(value);
                        if !child.is_leaf() {
                            child.walk(visit);
                        }
                    }
                }
                Fragment::Leaf(_) => {}
            },
        }
    }
}
