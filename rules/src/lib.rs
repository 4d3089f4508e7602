//! The canonical rewrite rules for the flachtex flattening engine.
//!
//! Everything here is built against the rule interface of `flachtex-core`;
//! user extensions plug in the same way.

#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]

mod changes;
pub use changes::ChangesCommands;

mod imports;
pub use imports::{ExplicitImports, InputImports, SubImports, EXPLICIT_IMPORT};

mod newcommand;
pub use newcommand::{NewcommandExpansion, DEFAULT_MAX_DEPTH};

mod parsing;

mod skip;
pub use skip::{SkipBlocks, SKIP_START, SKIP_STOP};

mod todos;
pub use todos::TodoNotes;

use flachtex_core::RuleSet;

/// Which optional substitutions to enable. Skip blocks and the import family
/// are always on.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleOptions {
    pub changes: bool,
    pub changes_prefixed: bool,
    pub todos: bool,
    pub newcommand: bool,
}

/// The canonical rule set.
#[must_use]
pub fn rule_set(options: RuleOptions) -> RuleSet {
    let mut rules = RuleSet::new();
    rules.push_skip(SkipBlocks);
    rules.push_import(InputImports);
    rules.push_import(SubImports);
    rules.push_import(ExplicitImports);
    if options.changes {
        rules.push_substitution(ChangesCommands::new(options.changes_prefixed));
    }
    if options.todos {
        rules.push_substitution(TodoNotes);
    }
    if options.newcommand {
        rules.push_substitution(NewcommandExpansion::default());
    }
    rules
}
