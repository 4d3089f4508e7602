//! The import family: `\input`/`\include`, `\subimport`, and the explicit
//! import directive.

use flachtex_core::{ImportMatch, ImportRule, Region, Result};
use once_cell::sync::Lazy;
use regex::Regex;

pub const EXPLICIT_IMPORT: &str = "%%FLACHTEX-EXPLICIT-IMPORT";

static INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\\(?:input|include)\{([^}\s]+)\}").unwrap()
});

static SUBIMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\\subimport\*?\{([^}\s]*)\}\{([^}\s]+)\}").unwrap()
});

static EXPLICIT_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?m)^[ \t]*%%FLACHTEX-EXPLICIT-IMPORT\[([^\]\n]+)\]").unwrap()
});

/// `\input{path}` and `\include{path}`. The braces may contain no
/// whitespace; the `.tex` suffix may be omitted.
pub struct InputImports;

impl ImportRule for InputImports {
    fn name(&self) -> &'static str {
        "input-include"
    }

    fn find(&self, content: &str) -> Result<Vec<ImportMatch>> {
        Ok(INPUT_RE
            .captures_iter(content)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let path = captures.get(1)?;
                Some(ImportMatch {
                    region: Region::new(whole.start(), whole.end()),
                    reference: path.as_str().to_owned(),
                })
            })
            .collect())
    }
}

/// `\subimport{dir}{file}` and `\subimport*{dir}{file}`: the effective path
/// is `dir/file`, resolved relative to the calling file.
pub struct SubImports;

impl ImportRule for SubImports {
    fn name(&self) -> &'static str {
        "subimport"
    }

    fn find(&self, content: &str) -> Result<Vec<ImportMatch>> {
        Ok(SUBIMPORT_RE
            .captures_iter(content)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let dir = captures.get(1)?.as_str();
                let file = captures.get(2)?.as_str();
                let reference = if dir.is_empty() {
                    file.to_owned()
                } else {
                    format!("{}/{file}", dir.trim_end_matches('/'))
                };
                Some(ImportMatch {
                    region: Region::new(whole.start(), whole.end()),
                    reference,
                })
            })
            .collect())
    }
}

/// `%%FLACHTEX-EXPLICIT-IMPORT[path]` at the start of a line. Typically
/// paired with a skip block holding the content the directive stands for.
pub struct ExplicitImports;

impl ImportRule for ExplicitImports {
    fn name(&self) -> &'static str {
        "explicit-import"
    }

    fn find(&self, content: &str) -> Result<Vec<ImportMatch>> {
        Ok(EXPLICIT_RE
            .captures_iter(content)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let path = captures.get(1)?;
                Some(ImportMatch {
                    region: Region::new(whole.start(), whole.end()),
                    reference: path.as_str().to_owned(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_and_include() {
        let matches = InputImports
            .find("\\input{a}\n\\include{sub/b.tex}\n")
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].reference, "a");
        assert_eq!(matches[0].region, Region::new(0, 9));
        assert_eq!(matches[1].reference, "sub/b.tex");
    }

    #[test]
    fn braces_with_whitespace_do_not_match() {
        assert!(InputImports.find("\\input{a b}").unwrap().is_empty());
        assert!(InputImports.find("\\input{}").unwrap().is_empty());
    }

    #[test]
    fn includegraphics_does_not_match() {
        assert!(InputImports
            .find("\\includegraphics{fig.png}")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn subimport_joins_dir_and_file() {
        let matches = SubImports.find("\\subimport{sections/}{intro}").unwrap();
        assert_eq!(matches[0].reference, "sections/intro");
        let starred = SubImports.find("\\subimport*{sections}{intro}").unwrap();
        assert_eq!(starred[0].reference, "sections/intro");
    }

    #[test]
    fn subimport_with_empty_dir() {
        let matches = SubImports.find("\\subimport{}{intro}").unwrap();
        assert_eq!(matches[0].reference, "intro");
    }

    #[test]
    fn explicit_import_at_line_start() {
        let content = "%%FLACHTEX-EXPLICIT-IMPORT[c.tex]\nrest";
        let matches = ExplicitImports.find(content).unwrap();
        assert_eq!(matches[0].reference, "c.tex");
        assert_eq!(matches[0].region, Region::new(0, 33));
    }

    #[test]
    fn explicit_import_mid_line_is_ignored() {
        let content = "x %%FLACHTEX-EXPLICIT-IMPORT[c.tex]";
        assert!(ExplicitImports.find(content).unwrap().is_empty());
    }
}
