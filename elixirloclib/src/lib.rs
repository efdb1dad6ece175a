//! # elixirloclib
//!
//! Line-count and API documentation metrics for Elixir source files.
//!
//! ## Overview
//!
//! Every physical line of a file is classified by a lightweight, single-pass
//! line scanner (no grammar, no AST) as one of:
//!
//! - **Blank**: Whitespace-only lines
//! - **Comment**: `#` comments, documentation annotations (`@moduledoc`,
//!   `@doc`, `@typedoc`) and the bodies of their heredocs
//! - **Module declaration**: `defmodule`, `defprotocol`, `defimpl`
//! - **Function declaration**: public (`def`, `defmacro`, `defguard`,
//!   `defdelegate`) or private (`defp`, `defmacrop`, `defguardp`)
//! - **Code**: everything else
//!
//! Declarations preceded by a documentation annotation count as documented,
//! which gives the documented public API density of a file.
//!
//! ## Features
//!
//! - **Host adapter**: a [`Sensor`] saving one measure per metric and file,
//!   and the default built-in quality profile
//! - **Glob filtering**: Filter files/directories with glob patterns
//! - **TOML configuration**: suffixes and filters per project
//! - **Pure Rust data types**: Returns structured data, no I/O side effects
//!
//! ## Example
//!
//! ```rust
//! use elixirloclib::{count_directory, parse_string, CountOptions, Measures};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let tally = parse_string("@doc \"Hi.\"\ndef hi, do: :hi\n");
//! let measures = Measures::from_tally(&tally);
//! assert_eq!(measures.public_documented_api_density, 100.0);
//!
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join("hello.ex"), "defmodule Hello do\nend\n").unwrap();
//!
//! let result = count_directory(dir.path(), &CountOptions::new()).unwrap();
//! assert_eq!(result.total.class_count, 1);
//! ```

pub mod config;
pub mod counter;
pub mod error;
pub mod filter;
pub mod language;
pub mod parser;
pub mod profile;
pub mod sensor;
pub mod stats;

pub use config::{Config, ConfigSource};
pub use counter::{count_directory, count_file, CountOptions, CountResult};
pub use error::ElixirlocError;
pub use filter::{discover_files, FilterConfig};
pub use language::{Elixir, PropertyDefinition};
pub use parser::{parse, parse_file, parse_string, Parser};
pub use profile::{
    BuiltInQualityProfile, ElixirQualityProfile, ProfilesContext, QualityProfilesDefinition,
};
pub use sensor::{
    FileSystem, FileType, Measure, MeasureSensor, MeasureStore, MeasureValue, Metric, Sensor,
    SensorContext, SensorDescriptor,
};
pub use stats::{FileStats, Measures, ParseTally};

/// Result type for elixirloclib operations
pub type Result<T> = std::result::Result<T, ElixirlocError>;
