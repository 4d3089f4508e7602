//! Expander machinery exercised with minimal hand-rolled rules. The canonical
//! LaTeX rules live in their own crate and have their own tests.

use flachtex_core::{
    expand, expand_with, Error, ImportMatch, ImportRule, MemoryFinder, Options, Region, RuleSet,
    SourceId,
};

/// Matches `@import(path)`.
struct AtImports;

impl ImportRule for AtImports {
    fn name(&self) -> &'static str {
        "at-imports"
    }

    fn find(&self, content: &str) -> flachtex_core::Result<Vec<ImportMatch>> {
        let mut matches = Vec::new();
        for (begin, _) in content.match_indices("@import(") {
            let Some(close) = content[begin..].find(')') else {
                continue;
            };
            let end = begin + close + 1;
            matches.push(ImportMatch {
                region: Region::new(begin, end),
                reference: content[begin + "@import(".len()..end - 1].to_owned(),
            });
        }
        Ok(matches)
    }
}

fn rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.push_import(AtImports);
    rules
}

#[test]
fn inlines_referenced_files() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("main.tex", "A\n@import(b)\nC")
        .insert("b.tex", "B");
    let (ts, structure) = expand("main.tex", &finder, &rules()).unwrap();
    assert_eq!(ts.as_str(), "A\nB\nC");
    assert_eq!(ts.get_origin(0).unwrap().source, Some(SourceId::new("/doc/main.tex")));
    assert_eq!(ts.get_origin(2).unwrap().source, Some(SourceId::new("/doc/b.tex")));
    assert_eq!(structure.len(), 2);
}

#[test]
fn expansion_is_depth_first_and_in_source_order() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("main.tex", "@import(a)@import(b)")
        .insert("a.tex", "[a@import(c)]")
        .insert("b.tex", "[b]")
        .insert("c.tex", "c");
    let (ts, _) = expand("main.tex", &finder, &rules()).unwrap();
    assert_eq!(ts.as_str(), "[ac][b]");
}

#[test]
fn same_file_twice_is_loaded_once() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("main.tex", "@import(b)-@import(b)")
        .insert("b.tex", "B");
    let (ts, structure) = expand("main.tex", &finder, &rules()).unwrap();
    assert_eq!(ts.as_str(), "B-B");
    // both occurrences trace to b.tex independently
    let b = SourceId::new("/doc/b.tex");
    assert_eq!(ts.get_origin(0).unwrap().source, Some(b.clone()));
    assert_eq!(ts.get_origin(2).unwrap().source, Some(b.clone()));
    // one structure entry, one include edge
    let main = SourceId::new("/doc/main.tex");
    assert_eq!(structure.len(), 2);
    assert_eq!(structure.get(&main).unwrap().includes.len(), 1);
}

#[test]
fn cycles_are_detected_with_the_full_path() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("a.tex", "@import(b)")
        .insert("b.tex", "@import(a)");
    let Err(Error::ImportCycle { cycle }) = expand("a.tex", &finder, &rules()) else {
        panic!("expected ImportCycle");
    };
    let names = cycle.iter().map(SourceId::as_str).collect::<Vec<_>>();
    assert_eq!(names, ["/doc/a.tex", "/doc/b.tex", "/doc/a.tex"]);
}

#[test]
fn self_import_is_a_cycle() {
    let mut finder = MemoryFinder::new("/doc");
    finder.insert("a.tex", "@import(a)");
    assert!(matches!(
        expand("a.tex", &finder, &rules()),
        Err(Error::ImportCycle { .. })
    ));
}

#[test]
fn missing_import_bubbles_up() {
    let mut finder = MemoryFinder::new("/doc");
    finder.insert("main.tex", "@import(nowhere)");
    assert!(matches!(
        expand("main.tex", &finder, &rules()),
        Err(Error::FileNotFound { .. })
    ));
}

#[test]
fn comment_removal_applies_to_every_file() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("main.tex", "A % x\n@import(b)\n")
        .insert("b.tex", "B % y\n");
    let options = Options {
        remove_comments: true,
    };
    let (ts, _) = expand_with("main.tex", &finder, &rules(), options).unwrap();
    assert_eq!(ts.as_str(), "A \nB \n\n");
}
