//! File filtering and discovery with glob pattern support.
//!
//! This module discovers Elixir source files, keeping those whose name ends
//! with one of the configured suffixes and honouring include/exclude globs.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::ElixirlocError;
use crate::language::Elixir;
use crate::Result;

/// Configuration for file filtering.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// File name suffixes belonging to the language (e.g. `.ex`)
    pub suffixes: Vec<String>,
    /// Glob patterns to include (if empty, include every matching file)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            suffixes: Elixir::default_suffixes(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| ElixirlocError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl FilterConfig {
    /// Create a filter accepting every `.ex` and `.exs` file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the accepted file suffixes.
    pub fn suffixes<S: AsRef<str>>(mut self, suffixes: &[S]) -> Self {
        self.suffixes = suffixes.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Add multiple include patterns.
    pub fn include_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Whether the file name carries one of the language suffixes.
    pub fn has_language_suffix(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy())
            .is_some_and(|name| self.suffixes.iter().any(|s| name.ends_with(s.as_str())))
    }

    /// Check if a path matches the filter criteria.
    ///
    /// A path matches if:
    /// 1. Its name ends with a language suffix
    /// 2. It doesn't match any exclude pattern
    /// 3. It matches at least one include pattern (or include is empty)
    pub fn matches(&self, path: &Path) -> bool {
        if !self.has_language_suffix(path) {
            return false;
        }

        let path_str = path.to_string_lossy();

        if self.exclude.iter().any(|p| p.matches(&path_str)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(&path_str))
    }
}

/// Check if a directory should be skipped during traversal.
fn should_skip_dir(name: &str) -> bool {
    // Hidden directories, Mix build output and fetched dependencies
    name.starts_with('.') || name == "_build" || name == "deps"
}

/// Discover Elixir source files under a directory.
///
/// Walks the directory tree and returns all files that match the filter,
/// sorted. A file root is returned as-is when it matches.
pub fn discover_files(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(ElixirlocError::PathNotFound(root.to_path_buf()));
    }

    if root.is_file() {
        return Ok(if filter.matches(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let walker = WalkDir::new(root).follow_links(true).into_iter();

    let mut files: Vec<PathBuf> = walker
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            !should_skip_dir(name)
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && filter.matches(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    // Sort for deterministic output
    files.sort();

    Ok(files)
}
