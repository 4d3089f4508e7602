//! End-to-end expansion with the canonical rules.

use flachtex_core::{expand, Error, MemoryFinder, Origin, RuleSet, SourceId};
use flachtex_rules::{rule_set, RuleOptions};

fn base() -> RuleSet {
    rule_set(RuleOptions::default())
}

fn origin(source: &str, offset: usize) -> Origin {
    Origin {
        source: Some(SourceId::new(source)),
        offset,
    }
}

#[test]
fn simple_input_chain() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("main.tex", "A\n\\input{b}\nC")
        .insert("b.tex", "B");
    let (ts, structure) = expand("main.tex", &finder, &base()).unwrap();
    assert_eq!(ts.as_str(), "A\nB\nC");
    assert_eq!(ts.get_origin(0).unwrap(), origin("/doc/main.tex", 0));
    assert_eq!(ts.get_origin(2).unwrap(), origin("/doc/b.tex", 0));
    assert_eq!(ts.get_origin(4).unwrap(), origin("/doc/main.tex", 12));
    let main = SourceId::new("/doc/main.tex");
    assert!(structure
        .get(&main)
        .unwrap()
        .includes
        .contains(&SourceId::new("/doc/b.tex")));
}

#[test]
fn skip_region_leaves_a_blank_line() {
    let mut finder = MemoryFinder::new("/doc");
    finder.insert(
        "main.tex",
        "X\n%%FLACHTEX-SKIP-START\nHIDE\n%%FLACHTEX-SKIP-STOP\nY",
    );
    let (ts, _) = expand("main.tex", &finder, &base()).unwrap();
    assert_eq!(ts.as_str(), "X\n\nY");
    for i in 0..ts.len() {
        let origin = ts.get_origin(i).unwrap();
        assert_eq!(origin.source, Some(SourceId::new("/doc/main.tex")));
        // nothing survives from inside the hidden block
        assert!(!(24..28).contains(&origin.offset), "index {i}");
    }
}

#[test]
fn imports_inside_skipped_blocks_are_not_expanded() {
    let mut finder = MemoryFinder::new("/doc");
    finder.insert(
        "main.tex",
        "A\n%%FLACHTEX-SKIP-START\n\\input{missing}\n%%FLACHTEX-SKIP-STOP\n",
    );
    let (ts, _) = expand("main.tex", &finder, &base()).unwrap();
    assert_eq!(ts.as_str(), "A\n\n");
}

#[test]
fn cycle_is_reported_with_its_path() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("a.tex", "\\input{b}")
        .insert("b.tex", "\\input{a}");
    let Err(Error::ImportCycle { cycle }) = expand("a.tex", &finder, &base()) else {
        panic!("expected ImportCycle");
    };
    let names = cycle.iter().map(SourceId::as_str).collect::<Vec<_>>();
    assert_eq!(names, ["/doc/a.tex", "/doc/b.tex", "/doc/a.tex"]);
}

#[test]
fn explicit_import_replaces_the_directive() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert(
            "main.tex",
            "%%FLACHTEX-EXPLICIT-IMPORT[c.tex]\n%%FLACHTEX-SKIP-START\nstuff\n%%FLACHTEX-SKIP-STOP",
        )
        .insert("c.tex", "HI");
    let (ts, _) = expand("main.tex", &finder, &base()).unwrap();
    assert!(ts.as_str().starts_with("HI"));
    assert!(!ts.as_str().contains("stuff"));
    assert_eq!(ts.get_origin(0).unwrap(), origin("/doc/c.tex", 0));
}

#[test]
fn subimport_resolves_relative_to_the_caller() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("main.tex", "\\subimport{sections/}{intro}\n")
        .insert("sections/intro.tex", "\\input{detail}\n")
        .insert("sections/detail.tex", "D");
    let (ts, _) = expand("main.tex", &finder, &base()).unwrap();
    assert_eq!(ts.as_str(), "D\n\n");
}

#[test]
fn newcommand_substitution_marks_injected_text_as_generated() {
    let mut finder = MemoryFinder::new("/doc");
    finder.insert("main.tex", "\\newcommand{\\t}{T}\nUse \\t here.");
    let rules = rule_set(RuleOptions {
        newcommand: true,
        ..RuleOptions::default()
    });
    let (ts, _) = expand("main.tex", &finder, &rules).unwrap();
    assert_eq!(ts.as_str(), "\nUse T here.");
    let t = ts.as_str().find('T').unwrap();
    assert_eq!(ts.get_origin(t).unwrap().source, None);
    assert_eq!(ts.get_origin(t - 1).unwrap(), origin("/doc/main.tex", 22));
    assert_eq!(ts.get_origin(t + 1).unwrap(), origin("/doc/main.tex", 25));
}

#[test]
fn definitions_imported_from_subfiles_are_visible() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("main.tex", "\\input{defs}\\t")
        .insert("defs.tex", "\\newcommand{\\t}{T}");
    let rules = rule_set(RuleOptions {
        newcommand: true,
        ..RuleOptions::default()
    });
    let (ts, _) = expand("main.tex", &finder, &rules).unwrap();
    assert_eq!(ts.as_str(), "T");
}

#[test]
fn changes_and_todos_run_on_the_expanded_document() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert("main.tex", "\\input{body} \\todo[urgent]{rewrite}\n")
        .insert("body.tex", "\\added[id=me]{new}\\deleted{old}");
    let rules = rule_set(RuleOptions {
        changes: true,
        todos: true,
        ..RuleOptions::default()
    });
    let (ts, _) = expand("main.tex", &finder, &rules).unwrap();
    assert_eq!(ts.as_str(), "new \n");
    // the kept text still traces into body.tex
    assert_eq!(
        ts.get_origin(0).unwrap().source,
        Some(SourceId::new("/doc/body.tex"))
    );
}

#[test]
fn every_traced_byte_matches_its_source() {
    let mut finder = MemoryFinder::new("/doc");
    finder
        .insert(
            "main.tex",
            "start\n\\input{a}\n%%FLACHTEX-SKIP-START\nhidden\n%%FLACHTEX-SKIP-STOP\n\\subimport{sub/}{b}\nend\n",
        )
        .insert("a.tex", "alpha\n")
        .insert("sub/b.tex", "beta % comment\n");
    let (ts, structure) = expand("main.tex", &finder, &base()).unwrap();
    for i in 0..ts.len() {
        let origin = ts.get_origin(i).unwrap();
        let Some(source) = origin.source else {
            continue;
        };
        let content = &structure.get(&source).unwrap().content;
        assert_eq!(
            content.as_bytes()[origin.offset],
            ts.as_str().as_bytes()[i],
            "index {i} traced to {source}:{}",
            origin.offset
        );
    }
}

#[test]
fn skip_mismatch_is_fatal() {
    let mut finder = MemoryFinder::new("/doc");
    finder.insert("main.tex", "%%FLACHTEX-SKIP-START\nnever closed");
    assert!(matches!(
        expand("main.tex", &finder, &base()),
        Err(Error::SkipMismatch { .. })
    ));
}
