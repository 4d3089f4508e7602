//! `\todo` notes are dropped from the flat document.

use crate::parsing::{balanced_group, bracket_group, skip_whitespace};
use flachtex_core::{Region, Replacement, Result, SubstitutionMatch, SubstitutionRule};
use once_cell::sync::Lazy;
use regex::Regex;

static HEAD_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\\todo").unwrap()
});

/// `\todo[opts]{...}` is removed, argument and all.
pub struct TodoNotes;

impl SubstitutionRule for TodoNotes {
    fn name(&self) -> &'static str {
        "todos"
    }

    fn find(&self, content: &str) -> Result<Vec<SubstitutionMatch>> {
        let mut matches: Vec<SubstitutionMatch> = Vec::new();
        for head in HEAD_RE.find_iter(content) {
            if matches
                .last()
                .is_some_and(|last| head.start() < last.region.end)
            {
                continue;
            }
            // `\todonotes` and friends are different commands
            if content[head.end()..]
                .chars()
                .next()
                .is_some_and(|ch| ch.is_ascii_alphabetic())
            {
                continue;
            }
            let mut cursor = skip_whitespace(content, head.end());
            if let Some(options) = bracket_group(content, cursor) {
                cursor = skip_whitespace(content, options.end);
            }
            let Some(note) = balanced_group(content, cursor) else {
                continue;
            };
            matches.push(SubstitutionMatch {
                region: Region::new(head.start(), note.end),
                replacement: Replacement::Remove,
            });
        }
        Ok(matches)
    }
}
