//! Core data structures for line and API documentation statistics

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::PathBuf;

/// Counts produced by one classification pass over a file's lines.
///
/// Code lines are not stored; they are whatever remains after blank and
/// comment lines are taken out of `line_count` (see [`ParseTally::ncloc`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTally {
    /// Physical lines, whatever their classification
    pub line_count: u64,
    /// Whitespace-only lines outside documentation blocks
    pub empty_line_count: u64,
    /// `#` comments, documentation annotations and documentation bodies
    pub comment_line_count: u64,
    /// `defmodule` / `defprotocol` / `defimpl` declarations
    pub class_count: u64,
    /// Module declarations carrying documentation
    pub documented_class_count: u64,
    /// `def`, `defmacro`, `defguard`, `defdelegate` declarations
    pub public_function_count: u64,
    /// `defp`, `defmacrop`, `defguardp` declarations
    pub private_function_count: u64,
    /// Public function declarations preceded by `@doc`
    pub documented_public_function_count: u64,
}

impl ParseTally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-comment lines of code
    pub fn ncloc(&self) -> u64 {
        self.line_count - self.empty_line_count - self.comment_line_count
    }

    /// All function declarations, public and private
    pub fn function_count(&self) -> u64 {
        self.public_function_count + self.private_function_count
    }

    /// Modules plus public functions
    pub fn public_api(&self) -> u64 {
        self.public_function_count + self.class_count
    }

    /// Documented modules plus documented public functions
    pub fn documented_api(&self) -> u64 {
        self.documented_public_function_count + self.documented_class_count
    }
}

impl Add for ParseTally {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            line_count: self.line_count + other.line_count,
            empty_line_count: self.empty_line_count + other.empty_line_count,
            comment_line_count: self.comment_line_count + other.comment_line_count,
            class_count: self.class_count + other.class_count,
            documented_class_count: self.documented_class_count + other.documented_class_count,
            public_function_count: self.public_function_count + other.public_function_count,
            private_function_count: self.private_function_count + other.private_function_count,
            documented_public_function_count: self.documented_public_function_count
                + other.documented_public_function_count,
        }
    }
}

impl AddAssign for ParseTally {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for ParseTally {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Metrics derived from a [`ParseTally`], in the shape the analysis host stores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    pub lines: u64,
    pub ncloc: u64,
    pub comment_lines: u64,
    pub classes: u64,
    pub functions: u64,
    pub public_api: u64,
    pub public_undocumented_api: u64,
    /// Percentage of the public API that is documented, two decimals.
    /// 100.0 when there is no public API at all.
    pub public_documented_api_density: f64,
}

impl Measures {
    pub fn from_tally(tally: &ParseTally) -> Self {
        let public_api = tally.public_api();
        let documented_api = tally.documented_api();

        let density = if public_api == 0 {
            100.0
        } else {
            round_to_hundredths(documented_api as f64 / public_api as f64 * 100.0)
        };

        Self {
            lines: tally.line_count,
            ncloc: tally.ncloc(),
            comment_lines: tally.comment_line_count,
            classes: tally.class_count,
            functions: tally.function_count(),
            public_api,
            public_undocumented_api: public_api.saturating_sub(documented_api),
            public_documented_api_density: density,
        }
    }
}

impl From<&ParseTally> for Measures {
    fn from(tally: &ParseTally) -> Self {
        Self::from_tally(tally)
    }
}

/// Round half away from zero to two decimal places
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Statistics for a single file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    /// Path to the file
    pub path: PathBuf,
    /// Raw classification counts
    pub tally: ParseTally,
    /// Metrics derived from `tally`
    pub measures: Measures,
}

impl FileStats {
    /// Create new file stats, deriving the measures from the tally
    pub fn new(path: PathBuf, tally: ParseTally) -> Self {
        Self {
            path,
            measures: Measures::from_tally(&tally),
            tally,
        }
    }
}
