//! Resolution of author-written include references to canonical sources.

use crate::{Error, Result, SourceId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A successfully fetched source: canonical identifier plus raw contents.
#[derive(Clone, Debug)]
pub struct FoundFile {
    pub source: SourceId,
    pub content: String,
}

/// Resolves include references and fetches their contents.
///
/// Implementations may be backed by the real filesystem or by an in-memory
/// mapping; the rewriting engine does not care.
pub trait FileFinder {
    /// Resolves `reference` (the path expression as the author wrote it)
    /// against the file it appears in.
    fn fetch(&self, reference: &str, calling: &SourceId) -> Result<FoundFile>;

    /// Resolves the root document reference.
    fn fetch_root(&self, reference: &str) -> Result<FoundFile>;
}

/// Finder backed by the real filesystem. Source identifiers are canonical
/// absolute paths.
#[derive(Clone, Debug)]
pub struct FileSystemFinder {
    root_dir: PathBuf,
}

impl FileSystemFinder {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Finder for the document rooted at `root_file`; the root file's
    /// directory becomes the document root for reference resolution.
    #[must_use]
    pub fn for_root(root_file: &Path) -> Self {
        let parent = root_file.parent().filter(|dir| !dir.as_os_str().is_empty());
        Self::new(parent.unwrap_or_else(|| Path::new(".")))
    }

    fn read(&self, path: &Path) -> Result<FoundFile> {
        let canonical = dunce::canonicalize(path)?;
        let content = fs::read_to_string(&canonical)?;
        Ok(FoundFile {
            source: SourceId::from_path(&canonical),
            content,
        })
    }
}

impl FileFinder for FileSystemFinder {
    fn fetch(&self, reference: &str, calling: &SourceId) -> Result<FoundFile> {
        let calling_dir = calling_dir(calling, &self.root_dir);
        let mut tried = Vec::new();
        for candidate in candidates(reference, calling_dir, &self.root_dir) {
            if candidate.is_file() {
                return self.read(&candidate);
            }
            tried.push(candidate);
        }
        Err(Error::FileNotFound {
            reference: reference.to_owned(),
            tried,
        })
    }

    fn fetch_root(&self, reference: &str) -> Result<FoundFile> {
        let mut tried = Vec::new();
        for candidate in variants(Path::new(""), reference) {
            if candidate.is_file() {
                return self.read(&candidate);
            }
            tried.push(candidate);
        }
        Err(Error::FileNotFound {
            reference: reference.to_owned(),
            tried,
        })
    }
}

/// In-memory finder for tests and embedded use. Paths are resolved lexically
/// (`.` and `..` folded, no symlinks, no filesystem access).
#[derive(Clone, Debug, Default)]
pub struct MemoryFinder {
    root_dir: PathBuf,
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFinder {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: normalize(&root_dir.into()),
            files: BTreeMap::new(),
        }
    }

    /// Registers a file; a relative path is taken relative to the root.
    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> &mut Self {
        let path = normalize(&self.root_dir.join(path.as_ref()));
        self.files.insert(path, content.into());
        self
    }

    fn get(&self, path: &Path) -> Option<FoundFile> {
        let path = normalize(path);
        self.files.get(&path).map(|content| FoundFile {
            source: SourceId::from_path(&path),
            content: content.clone(),
        })
    }
}

impl FileFinder for MemoryFinder {
    fn fetch(&self, reference: &str, calling: &SourceId) -> Result<FoundFile> {
        let calling_dir = calling_dir(calling, &self.root_dir);
        let mut tried = Vec::new();
        for candidate in candidates(reference, calling_dir, &self.root_dir) {
            if let Some(found) = self.get(&candidate) {
                return Ok(found);
            }
            tried.push(candidate);
        }
        Err(Error::FileNotFound {
            reference: reference.to_owned(),
            tried,
        })
    }

    fn fetch_root(&self, reference: &str) -> Result<FoundFile> {
        let mut tried = Vec::new();
        for candidate in variants(&self.root_dir, reference) {
            if let Some(found) = self.get(&candidate) {
                return Ok(found);
            }
            tried.push(candidate);
        }
        Err(Error::FileNotFound {
            reference: reference.to_owned(),
            tried,
        })
    }
}

/// Directory the calling source sits in. Author labels such as `"<input>"`
/// have no parent and resolve from the document root.
fn calling_dir<'a>(calling: &'a SourceId, root_dir: &'a Path) -> &'a Path {
    Path::new(calling.as_str())
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(root_dir)
}

/// Candidate paths in resolution order: the calling file's directory, then
/// the document root, then each ancestor of the calling directory, each with
/// and without an appended `.tex` suffix. First existing wins.
fn candidates(reference: &str, calling_dir: &Path, root_dir: &Path) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();
    let mut extend = |result: &mut Vec<PathBuf>, dir: &Path| {
        for candidate in variants(dir, reference) {
            if !result.contains(&candidate) {
                result.push(candidate);
            }
        }
    };
    let mut level = Some(calling_dir);
    while let Some(dir) = level {
        extend(&mut result, dir);
        extend(&mut result, root_dir);
        level = dir.parent();
    }
    result
}

/// The reference under `dir`, plus the `.tex` variant when the reference has
/// no suffix of its own.
fn variants(dir: &Path, reference: &str) -> Vec<PathBuf> {
    let plain = dir.join(reference);
    let mut result = vec![plain.clone()];
    if plain.extension().is_none() {
        let mut with_suffix = plain.into_os_string();
        with_suffix.push(".tex");
        result.push(PathBuf::from(with_suffix));
    }
    result
}

/// Folds `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::RootDir => result.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(name) => result.push(name),
        }
    }
    result
}
