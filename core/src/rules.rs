//! The rule interface: pattern-based rewriters over a traceable string's
//! content.
//!
//! A rule has two faculties: find all of its matches in a content string, and
//! (for import and substitution rules) say what replaces each match. Finders
//! are pure functions of the content, so all matches of one pass are computed
//! up front; the rewriter sorts them and rejects overlaps.

use crate::Result;

/// Half-open byte range of a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Region {
    pub begin: usize,
    pub end: usize,
}

impl Region {
    #[must_use]
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end);
        Self { begin, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// A rule that deletes every matched region.
pub trait SkipRule {
    fn name(&self) -> &'static str;

    /// All matches, in any order.
    fn find(&self, content: &str) -> Result<Vec<Region>>;
}

/// A match that pulls in the contents of another file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportMatch {
    pub region: Region,
    /// The path expression as the author wrote it.
    pub reference: String,
}

/// A rule that replaces every matched region with the contents of the
/// referenced file.
pub trait ImportRule {
    fn name(&self) -> &'static str;

    fn find(&self, content: &str) -> Result<Vec<ImportMatch>>;
}

/// What a substitution rule puts in place of one match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Replacement {
    /// Inject text that has no authoring source.
    Generated(String),
    /// Keep a sub-range of the content; its provenance carries over.
    Keep(Region),
    /// Delete the match.
    Remove,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubstitutionMatch {
    pub region: Region,
    pub replacement: Replacement,
}

/// A rule that replaces every matched region with computed text.
pub trait SubstitutionRule {
    fn name(&self) -> &'static str;

    fn find(&self, content: &str) -> Result<Vec<SubstitutionMatch>>;
}

/// Registry of rules, grouped by category.
///
/// All rules of one category are matched jointly in a single rewrite pass;
/// the order within a category only affects error reporting.
#[derive(Default)]
pub struct RuleSet {
    pub skip_rules: Vec<Box<dyn SkipRule>>,
    pub import_rules: Vec<Box<dyn ImportRule>>,
    pub substitution_rules: Vec<Box<dyn SubstitutionRule>>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_skip(&mut self, rule: impl SkipRule + 'static) {
        self.skip_rules.push(Box::new(rule));
    }

    pub fn push_import(&mut self, rule: impl ImportRule + 'static) {
        self.import_rules.push(Box::new(rule));
    }

    pub fn push_substitution(&mut self, rule: impl SubstitutionRule + 'static) {
        self.substitution_rules.push(Box::new(rule));
    }
}
