//! Substitution of the `changes` package markup: accept additions, drop
//! deletions, keep the replacement text of a `\replaced`.

use crate::parsing::{balanced_group, bracket_group, skip_whitespace};
use flachtex_core::{Region, Replacement, Result, SubstitutionMatch, SubstitutionRule};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static HEAD_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\\(ch)?(added|deleted|replaced)").unwrap()
});

/// `\added[...]{X}` becomes `X`, `\deleted[...]{X}` is dropped,
/// `\replaced[...]{X}{Y}` becomes `X`. With `prefixed`, the `\ch`-prefixed
/// spellings of the package's `commandprefix` option are matched as well.
///
/// Nested occurrences inside a matched command are left for the author to
/// resolve; only the outermost command of a run is substituted.
pub struct ChangesCommands {
    prefixed: bool,
}

impl ChangesCommands {
    #[must_use]
    pub fn new(prefixed: bool) -> Self {
        Self { prefixed }
    }
}

impl SubstitutionRule for ChangesCommands {
    fn name(&self) -> &'static str {
        "changes"
    }

    fn find(&self, content: &str) -> Result<Vec<SubstitutionMatch>> {
        let mut matches: Vec<SubstitutionMatch> = Vec::new();
        for captures in HEAD_RE.captures_iter(content) {
            let (Some(whole), Some(command)) = (captures.get(0), captures.get(2)) else {
                continue;
            };
            if captures.get(1).is_some() && !self.prefixed {
                continue;
            }
            if matches
                .last()
                .is_some_and(|last| whole.start() < last.region.end)
            {
                continue;
            }
            // name boundary: `\addedX` is a different command
            if content[whole.end()..]
                .chars()
                .next()
                .is_some_and(|ch| ch.is_ascii_alphabetic())
            {
                continue;
            }
            let mut cursor = skip_whitespace(content, whole.end());
            if let Some(options) = bracket_group(content, cursor) {
                cursor = skip_whitespace(content, options.end);
            }
            let Some(first) = balanced_group(content, cursor) else {
                continue;
            };
            let (replacement, end) = match command.as_str() {
                "added" => (Replacement::Keep(inner(&first)), first.end),
                "deleted" => (Replacement::Remove, first.end),
                "replaced" => {
                    let Some(second) =
                        balanced_group(content, skip_whitespace(content, first.end))
                    else {
                        continue;
                    };
                    (Replacement::Keep(inner(&first)), second.end)
                }
                _ => continue,
            };
            matches.push(SubstitutionMatch {
                region: Region::new(whole.start(), end),
                replacement,
            });
        }
        Ok(matches)
    }
}

fn inner(group: &Range<usize>) -> Region {
    Region::new(group.start + 1, group.end - 1)
}
