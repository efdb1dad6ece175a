//! Adapter between the line classifier and an analysis host.
//!
//! The host drives analysis through a [`Sensor`]: it asks the sensor to
//! describe itself, then executes it against a [`SensorContext`] that stores
//! one [`Measure`] per metric and file. [`MeasureSensor`] is the Elixir sensor;
//! [`MeasureStore`] is an in-memory context used by the CLI and in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::filter::{discover_files, FilterConfig};
use crate::language::Elixir;
use crate::parser::parse_file;
use crate::stats::Measures;
use crate::Result;

/// Metrics saved for every analysed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Lines,
    Ncloc,
    CommentLines,
    Classes,
    Functions,
    PublicApi,
    PublicUndocumentedApi,
    PublicDocumentedApiDensity,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Lines,
        Metric::Ncloc,
        Metric::CommentLines,
        Metric::Classes,
        Metric::Functions,
        Metric::PublicApi,
        Metric::PublicUndocumentedApi,
        Metric::PublicDocumentedApiDensity,
    ];

    /// Key under which the host stores the metric
    pub fn key(self) -> &'static str {
        match self {
            Metric::Lines => "lines",
            Metric::Ncloc => "ncloc",
            Metric::CommentLines => "comment_lines",
            Metric::Classes => "classes",
            Metric::Functions => "functions",
            Metric::PublicApi => "public_api",
            Metric::PublicUndocumentedApi => "public_undocumented_api",
            Metric::PublicDocumentedApiDensity => "public_documented_api_density",
        }
    }

    /// Read this metric out of derived measures.
    pub fn value_in(self, measures: &Measures) -> MeasureValue {
        match self {
            Metric::Lines => MeasureValue::Int(measures.lines),
            Metric::Ncloc => MeasureValue::Int(measures.ncloc),
            Metric::CommentLines => MeasureValue::Int(measures.comment_lines),
            Metric::Classes => MeasureValue::Int(measures.classes),
            Metric::Functions => MeasureValue::Int(measures.functions),
            Metric::PublicApi => MeasureValue::Int(measures.public_api),
            Metric::PublicUndocumentedApi => MeasureValue::Int(measures.public_undocumented_api),
            Metric::PublicDocumentedApiDensity => {
                MeasureValue::Float(measures.public_documented_api_density)
            }
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A measure value: counts are integers, percentages are floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Int(u64),
    Float(f64),
}

/// One metric value for one file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub metric: Metric,
    pub value: MeasureValue,
}

/// Everything derived from one tally, one measure per metric.
pub fn measures_for(measures: &Measures) -> impl Iterator<Item = Measure> + '_ {
    Metric::ALL.into_iter().map(move |metric| Measure {
        metric,
        value: metric.value_in(measures),
    })
}

/// How a sensor presents itself to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub name: String,
    pub languages: Vec<String>,
}

impl SensorDescriptor {
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = name.to_string();
        self
    }

    /// Restrict the sensor to files of the given languages.
    pub fn only_on_languages(&mut self, languages: &[&str]) -> &mut Self {
        self.languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }
}

/// Receives the measures computed by a sensor.
pub trait SensorContext {
    fn save_measure(&mut self, file: &Path, measure: Measure);
}

/// A unit of analysis run by the host.
pub trait Sensor {
    fn describe(&self, descriptor: &mut SensorDescriptor);
    fn execute(&self, context: &mut dyn SensorContext);
}

/// Whether a source file belongs to the product or to its tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Main,
    Test,
}

/// The project files available to sensors.
///
/// Files under one of the test directories (relative to the root) are test
/// sources; everything else matching the filter is a main source.
#[derive(Debug, Clone)]
pub struct FileSystem {
    root: PathBuf,
    filter: FilterConfig,
    test_dirs: Vec<PathBuf>,
}

impl FileSystem {
    pub fn new(root: impl Into<PathBuf>, filter: FilterConfig) -> Self {
        Self {
            root: root.into(),
            filter,
            test_dirs: Elixir::DEFAULT_TEST_DIRS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replace the test directories.
    pub fn test_dirs<S: AsRef<Path>>(mut self, dirs: &[S]) -> Self {
        self.test_dirs = dirs.iter().map(|d| d.as_ref().to_path_buf()).collect();
        self
    }

    pub fn file_type(&self, path: &Path) -> FileType {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if self.test_dirs.iter().any(|dir| relative.starts_with(dir)) {
            FileType::Test
        } else {
            FileType::Main
        }
    }

    /// Files of the registered language with the given type.
    pub fn files(&self, file_type: FileType) -> Result<Vec<PathBuf>> {
        let mut files = discover_files(&self.root, &self.filter)?;
        files.retain(|f| self.file_type(f) == file_type);
        Ok(files)
    }

    /// Main source files, the ones sensors measure.
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        self.files(FileType::Main)
    }
}

/// Sensor computing line and documentation measures for Elixir files.
#[derive(Debug, Clone)]
pub struct MeasureSensor {
    file_system: FileSystem,
}

impl MeasureSensor {
    pub const NAME: &'static str = "Elixir Sensors";

    pub fn new(file_system: FileSystem) -> Self {
        Self { file_system }
    }

    fn process_file(&self, path: &Path, context: &mut dyn SensorContext) {
        let tally = match parse_file(path) {
            Ok(tally) => tally,
            Err(err) => {
                warn!(
                    "{}could not process file: {}",
                    Elixir::LOG_PREFIX,
                    path.display()
                );
                debug!("{err}");
                return;
            }
        };

        debug!("{}processing file: {}", Elixir::LOG_PREFIX, path.display());

        let measures = Measures::from_tally(&tally);
        for measure in measures_for(&measures) {
            context.save_measure(path, measure);
        }
    }
}

impl Sensor for MeasureSensor {
    fn describe(&self, descriptor: &mut SensorDescriptor) {
        descriptor.name(Self::NAME).only_on_languages(&[Elixir::KEY]);
    }

    fn execute(&self, context: &mut dyn SensorContext) {
        info!("{}analyze", Elixir::LOG_PREFIX);

        let files = match self.file_system.input_files() {
            Ok(files) => files,
            Err(err) => {
                warn!("{}{err}", Elixir::LOG_PREFIX);
                return;
            }
        };

        for path in &files {
            self.process_file(path, context);
        }
    }
}

/// In-memory [`SensorContext`], measures grouped by file in path order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasureStore {
    files: BTreeMap<PathBuf, Vec<Measure>>,
}

impl MeasureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measures saved for a file, in the order they were saved.
    pub fn measures(&self, file: &Path) -> &[Measure] {
        self.files.get(file).map(Vec::as_slice).unwrap_or_default()
    }

    /// Value of one metric for one file.
    pub fn value(&self, file: &Path, metric: Metric) -> Option<MeasureValue> {
        self.measures(file)
            .iter()
            .find(|m| m.metric == metric)
            .map(|m| m.value)
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[Measure])> {
        self.files.iter().map(|(p, m)| (p.as_path(), m.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SensorContext for MeasureStore {
    fn save_measure(&mut self, file: &Path, measure: Measure) {
        self.files.entry(file.to_path_buf()).or_default().push(measure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const GREETER: &str = r#"defmodule Greeter do
  @moduledoc "Greets people."

  @doc "Says hello."
  def hello(name), do: "hello " <> name

  def bye(name), do: "bye " <> name

  # helpers
  defp shout(s), do: String.upcase(s)
end
"#;

    fn sensor_for(root: &Path) -> MeasureSensor {
        MeasureSensor::new(FileSystem::new(root, FilterConfig::new()))
    }

    #[test]
    fn test_describe() {
        let temp = tempdir().unwrap();
        let mut descriptor = SensorDescriptor::default();

        sensor_for(temp.path()).describe(&mut descriptor);

        assert_eq!(descriptor.name, "Elixir Sensors");
        assert_eq!(descriptor.languages, vec!["elixir"]);
    }

    #[test]
    fn test_execute_saves_all_measures() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("greeter.ex");
        fs::write(&file, GREETER).unwrap();

        let mut store = MeasureStore::new();
        sensor_for(temp.path()).execute(&mut store);

        assert_eq!(store.measures(&file).len(), Metric::ALL.len());
        assert_eq!(store.value(&file, Metric::Lines), Some(MeasureValue::Int(11)));
        assert_eq!(store.value(&file, Metric::CommentLines), Some(MeasureValue::Int(3)));
        assert_eq!(store.value(&file, Metric::Ncloc), Some(MeasureValue::Int(5)));
        assert_eq!(store.value(&file, Metric::Classes), Some(MeasureValue::Int(1)));
        assert_eq!(store.value(&file, Metric::Functions), Some(MeasureValue::Int(3)));
        assert_eq!(store.value(&file, Metric::PublicApi), Some(MeasureValue::Int(3)));
        assert_eq!(
            store.value(&file, Metric::PublicUndocumentedApi),
            Some(MeasureValue::Int(1))
        );
        assert_eq!(
            store.value(&file, Metric::PublicDocumentedApiDensity),
            Some(MeasureValue::Float(66.67))
        );
    }

    #[test]
    fn test_execute_only_language_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.ex"), "def a, do: 1\n").unwrap();
        fs::write(temp.path().join("b.exs"), "def b, do: 1\n").unwrap();
        fs::write(temp.path().join("notes.txt"), "def c, do: 1\n").unwrap();

        let mut store = MeasureStore::new();
        sensor_for(temp.path()).execute(&mut store);

        let files: Vec<&Path> = store.files().collect();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.ends_with("notes.txt")));
    }

    #[test]
    fn test_execute_skips_test_sources() {
        let temp = tempdir().unwrap();
        let lib = temp.path().join("lib/greeter.ex");
        let test = temp.path().join("test/greeter_test.exs");
        fs::create_dir_all(lib.parent().unwrap()).unwrap();
        fs::create_dir_all(test.parent().unwrap()).unwrap();
        fs::write(&lib, GREETER).unwrap();
        fs::write(&test, "defmodule GreeterTest do\nend\n").unwrap();

        let mut store = MeasureStore::new();
        sensor_for(temp.path()).execute(&mut store);

        let files: Vec<&Path> = store.files().collect();
        assert_eq!(files, vec![lib.as_path()]);
    }

    #[test]
    fn test_file_types_with_custom_test_dirs() {
        let file_system =
            FileSystem::new("/app", FilterConfig::new()).test_dirs(&["spec", "bench"]);
        let file_type = |p: &str| file_system.file_type(Path::new(p));

        assert_eq!(file_type("/app/spec/a_spec.exs"), FileType::Test);
        assert_eq!(file_type("/app/bench/run.exs"), FileType::Test);
        assert_eq!(file_type("/app/test/a_test.exs"), FileType::Main);
        assert_eq!(file_type("/app/lib/spec.ex"), FileType::Main);
    }

    #[test]
    fn test_test_files_listed_separately() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("test")).unwrap();
        fs::write(temp.path().join("app.ex"), "def a, do: 1\n").unwrap();
        fs::write(temp.path().join("test/app_test.exs"), "test \"a\"\n").unwrap();

        let file_system = FileSystem::new(temp.path(), FilterConfig::new());

        assert_eq!(file_system.files(FileType::Main).unwrap().len(), 1);
        assert_eq!(file_system.files(FileType::Test).unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let temp = tempdir().unwrap();
        let good = temp.path().join("good.ex");
        let bad = temp.path().join("bad.ex");
        fs::write(&good, "def ok, do: :ok\n").unwrap();
        fs::write(&bad, [0xff, 0xfe, 0x00, 0x0a]).unwrap();

        let mut store = MeasureStore::new();
        sensor_for(temp.path()).execute(&mut store);

        assert!(store.measures(&bad).is_empty());
        assert_eq!(store.measures(&good).len(), Metric::ALL.len());
    }

    #[test]
    fn test_missing_root_saves_nothing() {
        let mut store = MeasureStore::new();
        sensor_for(Path::new("/nonexistent/project")).execute(&mut store);

        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_file_density_defaults_to_full() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("empty.exs");
        fs::write(&file, "").unwrap();

        let mut store = MeasureStore::new();
        sensor_for(temp.path()).execute(&mut store);

        assert_eq!(store.value(&file, Metric::Lines), Some(MeasureValue::Int(0)));
        assert_eq!(
            store.value(&file, Metric::PublicDocumentedApiDensity),
            Some(MeasureValue::Float(100.0))
        );
    }

    #[test]
    fn test_metric_keys() {
        let keys: Vec<&str> = Metric::ALL.iter().map(|m| m.key()).collect();

        assert_eq!(
            keys,
            vec![
                "lines",
                "ncloc",
                "comment_lines",
                "classes",
                "functions",
                "public_api",
                "public_undocumented_api",
                "public_documented_api_density",
            ]
        );
        assert_eq!(Metric::CommentLines.to_string(), "comment_lines");
    }
}
