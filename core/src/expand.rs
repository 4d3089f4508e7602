//! Top-level driver: recursively expands imports across the file graph.

use crate::comments::remove_comments;
use crate::finder::{FileFinder, FoundFile};
use crate::rewriter::{self, Edit};
use crate::rules::{ImportMatch, RuleSet};
use crate::structure::Structure;
use crate::{Error, Result, SourceId, TraceableString};
use log::debug;
use std::collections::HashMap;

/// Knobs for one expansion run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Strip line comments from every file as it is loaded. Directive
    /// comments (skip markers, explicit imports) survive either way.
    pub remove_comments: bool,
}

/// Expands the document rooted at `root` into a single traceable string plus
/// the discovered file structure.
///
/// Skip rules run before import rules, so imports inside a skipped block are
/// not expanded. Substitution rules run once at the very end, on the fully
/// expanded document, so definitions imported from sub-files are visible.
/// Within a file, imports expand left to right; across files, depth first.
pub fn expand(
    root: &str,
    finder: &dyn FileFinder,
    rules: &RuleSet,
) -> Result<(TraceableString, Structure)> {
    expand_with(root, finder, rules, Options::default())
}

pub fn expand_with(
    root: &str,
    finder: &dyn FileFinder,
    rules: &RuleSet,
    options: Options,
) -> Result<(TraceableString, Structure)> {
    let mut expander = Expander {
        finder,
        rules,
        options,
        stack: Vec::new(),
        cache: HashMap::new(),
        structure: Structure::new(),
    };
    let found = finder.fetch_root(root)?;
    let document = expander.expand_source(found)?;
    let document = rewriter::apply_substitution_rules(&document, &rules.substitution_rules)?;
    Ok((document, expander.structure))
}

struct Expander<'a> {
    finder: &'a dyn FileFinder,
    rules: &'a RuleSet,
    options: Options,
    /// Sources on the current expansion path, outermost first.
    stack: Vec<SourceId>,
    /// Fully expanded sources. Contents are loaded once per source id; every
    /// further occurrence re-splices the cached traceable string, so each
    /// occurrence remains independently traceable to the same source.
    cache: HashMap<SourceId, TraceableString>,
    structure: Structure,
}

impl Expander<'_> {
    fn expand_source(&mut self, found: FoundFile) -> Result<TraceableString> {
        let FoundFile { source, content } = found;
        if let Some(cached) = self.cache.get(&source) {
            debug!("reusing cached expansion of {source}");
            return Ok(cached.clone());
        }
        debug!("expanding {source}");
        self.structure.record_file(&source, &content);
        self.stack.push(source.clone());
        let mut ts = TraceableString::from_source(content, source.clone(), 0);
        if self.options.remove_comments {
            ts = remove_comments(&ts)?;
        }
        ts = rewriter::apply_skip_rules(&ts, &self.rules.skip_rules)?;
        loop {
            let matches = self.find_imports(&ts)?;
            if matches.is_empty() {
                break;
            }
            let mut edits = Vec::with_capacity(matches.len());
            for (rule, m) in matches {
                let replacement = self.import(&ts, &m)?;
                edits.push(Edit {
                    region: m.region,
                    rule,
                    replacement,
                });
            }
            ts = rewriter::apply_edits(&ts, edits)?;
        }
        self.stack.pop();
        self.cache.insert(source, ts.clone());
        Ok(ts)
    }

    fn find_imports(&self, ts: &TraceableString) -> Result<Vec<(&'static str, ImportMatch)>> {
        let mut matches = Vec::new();
        for rule in &self.rules.import_rules {
            let found = rule.find(ts.as_str()).map_err(|error| rewriter::locate(error, ts))?;
            matches.extend(found.into_iter().map(|m| (rule.name(), m)));
        }
        matches.sort_by_key(|(_, m)| (m.region.begin, m.region.end));
        Ok(matches)
    }

    /// Loads and fully expands the target of one import match.
    fn import(&mut self, ts: &TraceableString, m: &ImportMatch) -> Result<TraceableString> {
        let calling = self.calling_source(ts, m);
        let target = self.finder.fetch(&m.reference, &calling)?;
        if let Some(position) = self.stack.iter().position(|source| *source == target.source) {
            let mut cycle = self.stack[position..].to_vec();
            cycle.push(target.source);
            return Err(Error::ImportCycle { cycle });
        }
        self.structure.record_include(&calling, &target.source);
        self.expand_source(target)
    }

    /// The file an import was written in: the origin of its first matched
    /// byte. Falls back to the file currently being expanded.
    fn calling_source(&self, ts: &TraceableString, m: &ImportMatch) -> SourceId {
        ts.get_origin(m.region.begin)
            .ok()
            .and_then(|origin| origin.source)
            .or_else(|| self.stack.last().cloned())
            .unwrap_or_else(|| SourceId::new("<input>"))
    }
}
