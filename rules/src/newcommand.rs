//! User-defined macro substitution.
//!
//! The fully expanded document is scanned once for
//! `\newcommand{\name}[n]{body}` (and `\renewcommand`, and the starred
//! spellings). Definitions are removed from the output; call sites are
//! rewritten with the body after textual `#k` substitution. The injected
//! text has no authoring source.

use crate::parsing::{balanced_group, bracket_group, is_escaped, scan_name, skip_whitespace};
use flachtex_core::{Region, Replacement, Result, SubstitutionMatch, SubstitutionRule};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;

pub const DEFAULT_MAX_DEPTH: usize = 16;

static DEF_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\\(?:re)?newcommand\*?\{\\([a-zA-Z@]+)\}").unwrap()
});

/// Rewrites call sites of user-defined macros with their definition bodies.
///
/// Later definitions override earlier ones. Macros whose bodies call other
/// known macros are expanded iteratively, at most `max_depth` rounds; a call
/// site still unexpanded after that is left untouched and reported as a
/// warning. Wrong arity and unknown macros are left untouched.
pub struct NewcommandExpansion {
    max_depth: usize,
}

impl NewcommandExpansion {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for NewcommandExpansion {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[derive(Clone, Debug)]
struct MacroDef {
    arity: usize,
    body: String,
}

struct Definition {
    region: Range<usize>,
    name: String,
    def: MacroDef,
}

impl SubstitutionRule for NewcommandExpansion {
    fn name(&self) -> &'static str {
        "newcommand"
    }

    fn find(&self, content: &str) -> Result<Vec<SubstitutionMatch>> {
        let definitions = scan_definitions(content);
        let mut defs = BTreeMap::new();
        for definition in &definitions {
            // later definitions override earlier ones
            defs.insert(definition.name.clone(), definition.def.clone());
        }
        let mut matches = definitions
            .iter()
            .map(|definition| SubstitutionMatch {
                region: Region::new(definition.region.start, definition.region.end),
                replacement: Replacement::Remove,
            })
            .collect::<Vec<_>>();
        matches.extend(self.find_calls(content, &defs, &definitions));
        Ok(matches)
    }
}

impl NewcommandExpansion {
    fn find_calls(
        &self,
        content: &str,
        defs: &BTreeMap<String, MacroDef>,
        definitions: &[Definition],
    ) -> Vec<SubstitutionMatch> {
        let bytes = content.as_bytes();
        let mut matches = Vec::new();
        let mut next_definition = definitions.iter().peekable();
        let mut i = 0;
        while i < bytes.len() {
            // definition sites are handled separately
            if let Some(definition) = next_definition.peek() {
                if i >= definition.region.start {
                    i = i.max(definition.region.end);
                    next_definition.next();
                    continue;
                }
            }
            if bytes[i] != b'\\' || is_escaped(bytes, i) {
                i += 1;
                continue;
            }
            let name_end = scan_name(content, i + 1);
            if name_end == i + 1 {
                // control symbol such as `\%`
                i = (i + 2).min(bytes.len());
                continue;
            }
            let name = &content[i + 1..name_end];
            let Some(def) = defs.get(name) else {
                i = name_end;
                continue;
            };
            let Some((args, end)) = parse_args(content, name_end, def.arity) else {
                debug!("too few arguments for `\\{name}`; call site left untouched");
                i = name_end;
                continue;
            };
            match expand_call(def, &args, defs, self.max_depth) {
                Some(text) => matches.push(SubstitutionMatch {
                    region: Region::new(i, end),
                    replacement: Replacement::Generated(text),
                }),
                None => warn!(
                    "recursion limit reached while expanding `\\{name}`; call site left untouched"
                ),
            }
            i = end;
        }
        matches
    }
}

fn scan_definitions(content: &str) -> Vec<Definition> {
    let mut definitions: Vec<Definition> = Vec::new();
    for captures in DEF_RE.captures_iter(content) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        // a definition inside another definition's body is the body's business
        if definitions
            .last()
            .is_some_and(|last| whole.start() < last.region.end)
        {
            continue;
        }
        let mut arity = 0;
        let mut cursor = skip_whitespace(content, whole.end());
        if let Some(count) = bracket_group(content, cursor) {
            let Ok(n) = content[count.start + 1..count.end - 1].trim().parse::<usize>() else {
                continue;
            };
            arity = n;
            cursor = skip_whitespace(content, count.end);
            if content.as_bytes().get(cursor) == Some(&b'[') {
                debug!(
                    "`\\{}` uses an optional default argument; definition left untouched",
                    name.as_str()
                );
                continue;
            }
        }
        let Some(body) = balanced_group(content, cursor) else {
            continue;
        };
        definitions.push(Definition {
            region: whole.start()..body.end,
            name: name.as_str().to_owned(),
            def: MacroDef {
                arity,
                body: content[body.start + 1..body.end - 1].to_owned(),
            },
        });
    }
    definitions
}

/// The `arity` brace-balanced arguments following a call head, plus the end
/// of the last one. `None` when fewer braces follow.
fn parse_args(content: &str, mut cursor: usize, arity: usize) -> Option<(Vec<String>, usize)> {
    let mut args = Vec::with_capacity(arity);
    for _ in 0..arity {
        let group = balanced_group(content, skip_whitespace(content, cursor))?;
        args.push(content[group.start + 1..group.end - 1].to_owned());
        cursor = group.end;
    }
    Some((args, cursor))
}

/// `#k` replaced by the k-th argument, everything else verbatim.
fn substitute_params(body: &str, args: &[String]) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '#' {
            if let Some(k) = chars.peek().and_then(|next| next.to_digit(10)) {
                let k = k as usize;
                if (1..=args.len()).contains(&k) {
                    chars.next();
                    result.push_str(&args[k - 1]);
                    continue;
                }
            }
        }
        result.push(ch);
    }
    result
}

/// Body with arguments substituted and nested known macros expanded. `None`
/// when `max_depth` rounds are not enough.
fn expand_call(
    def: &MacroDef,
    args: &[String],
    defs: &BTreeMap<String, MacroDef>,
    max_depth: usize,
) -> Option<String> {
    let mut text = substitute_params(&def.body, args);
    for _ in 0..max_depth {
        match expand_round(&text, defs) {
            Some(next) => text = next,
            None => return Some(text),
        }
    }
    if expand_round(&text, defs).is_some() {
        return None;
    }
    Some(text)
}

/// One round: every parsable known call replaced once. `None` when nothing
/// was expandable.
fn expand_round(text: &str, defs: &BTreeMap<String, MacroDef>) -> Option<String> {
    let bytes = text.as_bytes();
    let mut result = String::new();
    let mut copied = 0;
    let mut expanded = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || is_escaped(bytes, i) {
            i += 1;
            continue;
        }
        let name_end = scan_name(text, i + 1);
        if name_end == i + 1 {
            i = (i + 2).min(bytes.len());
            continue;
        }
        let Some(def) = defs.get(&text[i + 1..name_end]) else {
            i = name_end;
            continue;
        };
        let Some((args, end)) = parse_args(text, name_end, def.arity) else {
            i = name_end;
            continue;
        };
        result.push_str(&text[copied..i]);
        result.push_str(&substitute_params(&def.body, &args));
        expanded = true;
        copied = end;
        i = end;
    }
    if !expanded {
        return None;
    }
    result.push_str(&text[copied..]);
    Some(result)
}
