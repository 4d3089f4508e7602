//! Traceable rewriting engine for flattening multi-file LaTeX documents.
//!
//! The engine inlines every referenced file into a single flat string while
//! preserving, for every byte of the output, the `(source, offset)` it came
//! from. It is not a LaTeX parser: it understands nothing beyond the
//! patterns its rules match.

#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]

pub mod comments;
pub use comments::{remove_comments, MARKER_PREFIX};

mod error;
pub use error::{Error, Location, MatchContext, Result, SkipMismatchKind};

mod expand;
pub use expand::{expand, expand_with, Options};

pub mod finder;
pub use finder::{FileFinder, FileSystemFinder, FoundFile, MemoryFinder};

mod line_index;
pub use line_index::LineIndex;

mod origin;
pub use origin::{Origin, OriginSegment};

pub mod rewriter;
pub use rewriter::{apply_skip_rules, apply_substitution_rules};

pub mod rules;
pub use rules::{
    ImportMatch, ImportRule, Region, Replacement, RuleSet, SkipRule, SubstitutionMatch,
    SubstitutionRule,
};

mod source_id;
pub use source_id::SourceId;

mod structure;
pub use structure::{Structure, StructureEntry};

mod traceable_string;
pub use traceable_string::TraceableString;
