//! Generic statement tree
//!
//! The lexically-resolved but semantically unchecked form both readers
//! produce: every statement is a keyword (or extension instance), an
//! optional argument, and a list of sub-statements.

use crate::keywords::{Keyword, KeywordOrCustom};

/// One statement of a module, in either surface form.
///
/// Equality is structural: keyword, argument, and children; source
/// positions are ignored so trees from different surface forms compare.
#[derive(Debug, Clone)]
pub struct Statement {
    /// The statement's keyword, or the extension instance naming
    pub keyword: KeywordOrCustom,
    /// The statement argument, if present
    pub arg: Option<String>,
    /// Sub-statements in source order
    pub children: Vec<Statement>,
    /// Line of the statement keyword (1-based)
    pub line: usize,
    /// Column of the statement keyword (1-based)
    pub column: usize,
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.keyword == other.keyword
            && self.arg == other.arg
            && self.children == other.children
    }
}

impl Eq for Statement {}

impl Statement {
    /// Create a statement with a fixed keyword
    pub fn new(keyword: Keyword, arg: Option<String>) -> Self {
        Self {
            keyword: KeywordOrCustom::Keyword(keyword),
            arg,
            children: Vec::new(),
            line: 0,
            column: 0,
        }
    }

    /// The fixed keyword of this statement, if it is not an extension instance
    pub fn fixed_keyword(&self) -> Option<Keyword> {
        match &self.keyword {
            KeywordOrCustom::Keyword(kw) => Some(*kw),
            KeywordOrCustom::Custom(..) => None,
        }
    }

    /// Whether this statement is an extension instance
    pub fn is_custom(&self) -> bool {
        matches!(self.keyword, KeywordOrCustom::Custom(..))
    }

    /// Iterate the children carrying the given fixed keyword
    pub fn children_of(&self, kw: Keyword) -> impl Iterator<Item = &Statement> {
        self.children
            .iter()
            .filter(move |c| c.fixed_keyword() == Some(kw))
    }

    /// The first child carrying the given fixed keyword
    pub fn child(&self, kw: Keyword) -> Option<&Statement> {
        self.children_of(kw).next()
    }

    /// The argument of the first child carrying the given fixed keyword
    pub fn child_arg(&self, kw: Keyword) -> Option<&str> {
        self.child(kw).and_then(|c| c.arg.as_deref())
    }
}
