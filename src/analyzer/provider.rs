//! Access to the files of a collected support bundle.
//!
//! Analyzers never touch the filesystem directly; they ask a [`FileProvider`]
//! for artifacts by their bundle-relative path (always `/`-separated, e.g.
//! `host-collectors/system/cpu.json`).

use crate::error::{AnalyzeError, Result};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Read-only view of a support bundle.
pub trait FileProvider: Send + Sync {
    /// Contents of one collected file. Missing files yield
    /// [`AnalyzeError::NotFound`].
    fn get_collected_file_contents(&self, path: &str) -> Result<Vec<u8>>;

    /// All files whose path matches `pattern` and none of `excludes`, keyed by
    /// bundle-relative path.
    fn find_files(&self, pattern: &str, excludes: &[String]) -> Result<BTreeMap<String, Vec<u8>>>;
}

fn compile_patterns(pattern: &str, excludes: &[String]) -> Result<(glob::Pattern, Vec<glob::Pattern>)> {
    let compile = |p: &str| {
        glob::Pattern::new(p).map_err(|e| AnalyzeError::Spec(format!("invalid file pattern {:?}: {}", p, e)))
    };
    let include = compile(pattern)?;
    let excludes = excludes.iter().map(|p| compile(p)).collect::<Result<Vec<_>>>()?;
    Ok((include, excludes))
}

fn glob_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

fn is_selected(path: &str, include: &glob::Pattern, excludes: &[glob::Pattern]) -> bool {
    let options = glob_options();
    include.matches_with(path, options) && !excludes.iter().any(|e| e.matches_with(path, options))
}

/// An extracted bundle on disk.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AnalyzeError::NotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a bundle-relative path, refusing anything that escapes the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AnalyzeError::NotFound(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

impl FileProvider for DirectoryBundle {
    fn get_collected_file_contents(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(AnalyzeError::NotFound(path.to_string()));
        }
        debug!("Reading collected file {}", full.display());
        Ok(std::fs::read(&full)?)
    }

    fn find_files(&self, pattern: &str, excludes: &[String]) -> Result<BTreeMap<String, Vec<u8>>> {
        let (include, excludes) = compile_patterns(pattern, excludes)?;
        let mut found = BTreeMap::new();

        for entry in walkdir::WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relative) = self.relative_path(entry.path()) else {
                continue;
            };
            if is_selected(&relative, &include, &excludes) {
                let contents = std::fs::read(entry.path())?;
                found.insert(relative, contents);
            }
        }

        debug!("Pattern {} matched {} file(s)", pattern, found.len());
        Ok(found)
    }
}

/// A bundle held in memory, for tests and for callers that already have the
/// artifacts.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileProvider for MemoryBundle {
    fn get_collected_file_contents(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| AnalyzeError::NotFound(path.to_string()))
    }

    fn find_files(&self, pattern: &str, excludes: &[String]) -> Result<BTreeMap<String, Vec<u8>>> {
        let (include, excludes) = compile_patterns(pattern, excludes)?;
        Ok(self
            .files
            .iter()
            .filter(|(path, _)| is_selected(path, &include, &excludes))
            .map(|(path, contents)| (path.clone(), contents.clone()))
            .collect())
    }
}
