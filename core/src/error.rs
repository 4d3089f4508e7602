use crate::SourceId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Position of a byte of the flat document, for diagnostics: the source the
/// byte originated from plus its zero-based line/column in the flat text.
///
/// Rendered one-based, compiler style (`a.tex:3:5`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    pub source: Option<SourceId>,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}:{}:{}", source, self.line + 1, self.column + 1),
            None => write!(f, "<generated>:{}:{}", self.line + 1, self.column + 1),
        }
    }
}

/// One side of a pair of overlapping rule matches.
#[derive(Clone, Debug)]
pub struct MatchContext {
    pub rule: String,
    pub location: Option<Location>,
    pub text: String,
}

impl fmt::Display for MatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` ({})", self.text, self.rule)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipMismatchKind {
    /// A skip block was opened but never closed.
    StartWithoutStop,
    /// A stop marker appeared with no open skip block.
    StopWithoutStart,
    /// A second start marker appeared inside an open skip block.
    NestedStart,
}

impl fmt::Display for SkipMismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::StartWithoutStop => "skip block is never closed",
            Self::StopWithoutStart => "skip stop marker without a matching start",
            Self::NestedStart => "skip start marker inside an open skip block",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("could not resolve `{reference}` (tried: {})", display_paths(.tried))]
    FileNotFound {
        reference: String,
        tried: Vec<PathBuf>,
    },

    #[error("import cycle detected: {}", display_cycle(.cycle))]
    ImportCycle { cycle: Vec<SourceId> },

    #[error("overlapping matches: {first} and {second}")]
    OverlappingMatches {
        first: MatchContext,
        second: MatchContext,
    },

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{kind}{}", display_location(.location))]
    SkipMismatch {
        kind: SkipMismatchKind,
        offset: usize,
        location: Option<Location>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_cycle(cycle: &[SourceId]) -> String {
    cycle
        .iter()
        .map(SourceId::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn display_location(location: &Option<Location>) -> String {
    location
        .as_ref()
        .map(|location| format!(" at {location}"))
        .unwrap_or_default()
}
