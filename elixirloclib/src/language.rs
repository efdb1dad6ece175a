//! The Elixir language as registered with the analysis host.

use serde::Serialize;

/// A setting a language plugin exposes to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDefinition {
    pub key: String,
    pub name: String,
    pub default_value: Option<String>,
}

/// Language descriptor for Elixir sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elixir;

impl Elixir {
    /// Key the host uses to attach files, sensors and profiles to this language
    pub const KEY: &'static str = "elixir";

    /// Human readable language name
    pub const NAME: &'static str = "Elixir";

    /// File suffixes recognised when no configuration overrides them
    pub const DEFAULT_SUFFIXES: &'static [&'static str] = &[".ex", ".exs"];

    /// Mix keeps test sources under `test/`
    pub const DEFAULT_TEST_DIRS: &'static [&'static str] = &["test"];

    /// Prefix for log lines emitted on behalf of the language plugin
    pub const LOG_PREFIX: &'static str = "[elixir] ";

    /// Default suffixes as owned strings.
    pub fn default_suffixes() -> Vec<String> {
        Self::DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect()
    }

    /// Default test directories as owned strings.
    pub fn default_test_dirs() -> Vec<String> {
        Self::DEFAULT_TEST_DIRS.iter().map(|s| s.to_string()).collect()
    }

    /// Settings exposed to the host. Elixir support currently has none.
    pub fn property_definitions() -> Vec<PropertyDefinition> {
        Vec::new()
    }
}
