//! High-level counting API.
//!
//! This module provides the main entry points for counting lines and API
//! documentation in Elixir projects, with support for glob filtering.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::filter::{discover_files, FilterConfig};
use crate::language::Elixir;
use crate::parser::parse_file;
use crate::stats::{FileStats, Measures, ParseTally};
use crate::Result;

/// Options for counting.
#[derive(Debug, Clone, Default)]
pub struct CountOptions {
    /// File filter configuration
    pub file_filter: FilterConfig,
    /// Whether to include per-file statistics
    pub per_file_stats: bool,
}

impl CountOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.file_filter = filter;
        self
    }

    /// Include per-file statistics in results.
    pub fn with_file_stats(mut self) -> Self {
        self.per_file_stats = true;
        self
    }
}

/// Result of counting a directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountResult {
    /// Number of files that were parsed
    pub file_count: u64,
    /// Tallies summed over all parsed files
    pub total: ParseTally,
    /// Measures derived from `total`
    pub measures: Measures,
    /// Per-file statistics (if requested)
    pub files: Vec<FileStats>,
    /// Files that matched the filter but could not be read
    pub skipped: Vec<PathBuf>,
}

impl CountResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self {
            measures: Measures::from_tally(&ParseTally::default()),
            ..Default::default()
        }
    }

    fn add(&mut self, stats: FileStats, keep: bool) {
        self.file_count += 1;
        self.total += stats.tally;
        self.measures = Measures::from_tally(&self.total);
        if keep {
            self.files.push(stats);
        }
    }
}

/// Count a directory (or a single file) of Elixir sources.
///
/// Files that cannot be read are logged and listed in
/// [`CountResult::skipped`]; they do not abort the count.
///
/// # Example
///
/// ```rust,ignore
/// use elixirloclib::{count_directory, CountOptions, FilterConfig};
///
/// let filter = FilterConfig::new().exclude("**/test/**")?;
/// let result = count_directory("lib/", &CountOptions::new().filter(filter))?;
/// println!("ncloc: {}", result.measures.ncloc);
/// ```
pub fn count_directory(path: impl AsRef<Path>, options: &CountOptions) -> Result<CountResult> {
    let files = discover_files(path, &options.file_filter)?;
    debug!("counting {} files", files.len());

    let mut result = CountResult::new();

    for file_path in files {
        match parse_file(&file_path) {
            Ok(tally) => result.add(FileStats::new(file_path, tally), options.per_file_stats),
            Err(err) => {
                warn!(
                    "{}could not process file: {}",
                    Elixir::LOG_PREFIX,
                    file_path.display()
                );
                debug!("{err}");
                result.skipped.push(file_path);
            }
        }
    }

    Ok(result)
}

/// Count a single file.
///
/// # Example
///
/// ```rust,ignore
/// use elixirloclib::count_file;
///
/// let stats = count_file("lib/my_app.ex")?;
/// println!("Density: {}", stats.measures.public_documented_api_density);
/// ```
pub fn count_file(path: impl AsRef<Path>) -> Result<FileStats> {
    let path = path.as_ref();
    let tally = parse_file(path)?;
    Ok(FileStats::new(path.to_path_buf(), tally))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_elixir_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn create_simple_project(root: &Path) {
        create_elixir_file(
            &root.join("mix.exs"),
            r#"defmodule Shop.MixProject do
  use Mix.Project

  def project, do: [app: :shop]
end
"#,
        );

        create_elixir_file(
            &root.join("lib/shop.ex"),
            r#"defmodule Shop do
  @moduledoc """
  The shop.
  """

  @doc "Lists products."
  def products, do: []
end
"#,
        );

        create_elixir_file(
            &root.join("test/shop_test.exs"),
            r#"defmodule ShopTest do
  use ExUnit.Case

  # smoke test
  test "products" do
    assert Shop.products() == []
  end
end
"#,
        );
    }

    #[test]
    fn test_count_directory() {
        let temp = tempdir().unwrap();
        create_simple_project(temp.path());

        let result = count_directory(temp.path(), &CountOptions::new()).unwrap();

        assert_eq!(result.file_count, 3);
        assert!(result.files.is_empty());
        assert!(result.skipped.is_empty());
        assert_eq!(result.total.line_count, 5 + 8 + 8);
        assert_eq!(result.total.class_count, 3);
        assert_eq!(result.total.documented_class_count, 1);
        assert_eq!(result.total.public_function_count, 2);
        assert_eq!(result.total.documented_public_function_count, 1);
        assert_eq!(result.measures.public_api, 5);
        assert_eq!(result.measures.public_undocumented_api, 3);
        assert_eq!(result.measures.public_documented_api_density, 40.0);
    }

    #[test]
    fn test_count_directory_with_file_stats() {
        let temp = tempdir().unwrap();
        create_simple_project(temp.path());

        let options = CountOptions::new().with_file_stats();
        let result = count_directory(temp.path(), &options).unwrap();

        assert_eq!(result.files.len(), 3);
        let lib = result
            .files
            .iter()
            .find(|f| f.path.ends_with("lib/shop.ex"))
            .unwrap();
        assert_eq!(lib.measures.comment_lines, 4);
        assert_eq!(lib.measures.public_documented_api_density, 100.0);

        let summed: ParseTally = result.files.iter().map(|f| f.tally).sum();
        assert_eq!(summed, result.total);
    }

    #[test]
    fn test_count_directory_filtered() {
        let temp = tempdir().unwrap();
        create_simple_project(temp.path());

        let filter = FilterConfig::new().exclude("**/test/**").unwrap();
        let result = count_directory(temp.path(), &CountOptions::new().filter(filter)).unwrap();

        assert_eq!(result.file_count, 2);
    }

    #[test]
    fn test_count_directory_skips_unreadable() {
        let temp = tempdir().unwrap();
        create_elixir_file(&temp.path().join("ok.ex"), "def ok, do: :ok\n");
        fs::write(temp.path().join("broken.ex"), [0xc3, 0x28, 0x0a]).unwrap();

        let result = count_directory(temp.path(), &CountOptions::new()).unwrap();

        assert_eq!(result.file_count, 1);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].ends_with("broken.ex"));
        assert_eq!(result.total.public_function_count, 1);
    }

    #[test]
    fn test_count_empty_directory() {
        let temp = tempdir().unwrap();

        let result = count_directory(temp.path(), &CountOptions::new()).unwrap();

        assert_eq!(result.file_count, 0);
        assert_eq!(result.measures.public_documented_api_density, 100.0);
    }

    #[test]
    fn test_count_missing_directory() {
        let result = count_directory("/nonexistent/shop", &CountOptions::new());

        assert!(result.is_err());
    }

    #[test]
    fn test_count_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("stack.ex");
        create_elixir_file(
            &file,
            r#"defmodule Stack do
  @doc "Pushes."
  def push(stack, x), do: [x | stack]
  defp peek([x | _]), do: x
end
"#,
        );

        let stats = count_file(&file).unwrap();

        assert_eq!(stats.path, file);
        assert_eq!(stats.tally.line_count, 5);
        assert_eq!(stats.tally.comment_line_count, 1);
        assert_eq!(stats.measures.functions, 2);
        assert_eq!(stats.measures.public_api, 2);
        assert_eq!(stats.measures.public_documented_api_density, 50.0);
    }
}
