//! Applies one rule class to a traceable string.
//!
//! A pass collects every match of the class, sorts them, rejects overlaps,
//! and splices the result together from the kept slices and the
//! replacements. Provenance is correct by construction because all splicing
//! goes through [`TraceableString`] primitives.

use crate::rules::{Region, Replacement, SkipRule, SubstitutionRule};
use crate::{Error, MatchContext, Result, TraceableString};

pub(crate) struct Edit {
    pub region: Region,
    pub rule: &'static str,
    pub replacement: TraceableString,
}

/// Splices `edits` into `ts`. Edits may arrive unordered; overlaps are an
/// error, never resolved silently.
pub(crate) fn apply_edits(ts: &TraceableString, mut edits: Vec<Edit>) -> Result<TraceableString> {
    if edits.is_empty() {
        return Ok(ts.clone());
    }
    edits.sort_by_key(|edit| (edit.region.begin, edit.region.end));
    for pair in edits.windows(2) {
        if pair[1].region.begin < pair[0].region.end {
            return Err(Error::OverlappingMatches {
                first: match_context(ts, &pair[0]),
                second: match_context(ts, &pair[1]),
            });
        }
    }
    let mut result = TraceableString::new();
    let mut cursor = 0;
    for edit in &edits {
        result.append(&ts.slice(cursor..edit.region.begin)?);
        result.append(&edit.replacement);
        cursor = edit.region.end;
    }
    result.append(&ts.slice(cursor..ts.len())?);
    Ok(result)
}

/// One pass over all skip rules: their matched regions are removed.
pub fn apply_skip_rules(
    ts: &TraceableString,
    rules: &[Box<dyn SkipRule>],
) -> Result<TraceableString> {
    let mut edits = Vec::new();
    for rule in rules {
        let regions = rule.find(ts.as_str()).map_err(|error| locate(error, ts))?;
        edits.extend(regions.into_iter().map(|region| Edit {
            region,
            rule: rule.name(),
            replacement: TraceableString::new(),
        }));
    }
    apply_edits(ts, edits)
}

/// One pass over all substitution rules.
pub fn apply_substitution_rules(
    ts: &TraceableString,
    rules: &[Box<dyn SubstitutionRule>],
) -> Result<TraceableString> {
    let mut edits = Vec::new();
    for rule in rules {
        for m in rule.find(ts.as_str()).map_err(|error| locate(error, ts))? {
            let replacement = match m.replacement {
                Replacement::Generated(text) => TraceableString::generated(text),
                Replacement::Keep(region) => ts.slice(region.begin..region.end)?,
                Replacement::Remove => TraceableString::new(),
            };
            edits.push(Edit {
                region: m.region,
                rule: rule.name(),
                replacement,
            });
        }
    }
    apply_edits(ts, edits)
}

/// Attaches flat-document position context to offset-carrying errors raised
/// by finders, which only ever see the bare content.
pub(crate) fn locate(error: Error, ts: &TraceableString) -> Error {
    match error {
        Error::SkipMismatch {
            kind,
            offset,
            location: None,
        } => Error::SkipMismatch {
            kind,
            offset,
            location: ts.location(offset).ok(),
        },
        other => other,
    }
}

fn match_context(ts: &TraceableString, edit: &Edit) -> MatchContext {
    MatchContext {
        rule: edit.rule.to_owned(),
        location: ts.location(edit.region.begin).ok(),
        text: snippet(ts.as_str(), edit.region),
    }
}

fn snippet(content: &str, region: Region) -> String {
    const MAX: usize = 40;
    let begin = region.begin.min(content.len());
    let end = region.end.min(content.len());
    let text = content.get(begin..end).unwrap_or_default();
    if text.len() <= MAX {
        return text.to_owned();
    }
    let mut cut = MAX;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}
