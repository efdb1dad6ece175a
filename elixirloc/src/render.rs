//! Template contexts for CLI output rendered with outstanding

use std::collections::BTreeMap;
use std::path::Path;

use console::Style;
use elixirloclib::sensor::measures_for;
use elixirloclib::{
    BuiltInQualityProfile, CountResult, Measure, MeasureStore, MeasureValue, Measures,
    SensorDescriptor,
};
use outstanding::Theme;
use serde::Serialize;

/// Include templates at compile time
pub const STATS_TABLE_TEMPLATE: &str = include_str!("../templates/stats_table.jinja");
pub const PROFILES_TEMPLATE: &str = include_str!("../templates/profiles.jinja");

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// Metric columns of the stats table
const COLUMNS: [&str; 8] = [
    "Lines", "Code", "Comments", "Modules", "Functions", "API", "Undoc", "Doc %",
];

const CELL_WIDTH: usize = 10;

/// Column data for template rendering
#[derive(Debug, Serialize)]
struct TemplateColumn {
    name: String,
    /// Pre-formatted with padding
    formatted: String,
}

/// Row data for template rendering (pre-formatted)
#[derive(Debug, Serialize)]
struct TemplateRow {
    /// Pre-padded name (left-aligned, padded to name_width)
    name: String,
    /// Pre-padded cells (right-aligned, padded to CELL_WIDTH)
    cells: Vec<String>,
}

/// Data context for the stats table template
#[derive(Debug, Serialize)]
pub struct StatsTableContext {
    /// Heading printed above the table
    title: Option<String>,
    name_header: String,
    name_header_formatted: String,
    columns: Vec<TemplateColumn>,
    separator: String,
    rows: Vec<TemplateRow>,
    total: Option<TemplateRow>,
    /// Styled as a warning under the table
    notice: Option<String>,
}

impl StatsTableContext {
    fn new(name_header: &str, name_width: usize) -> Self {
        let columns: Vec<TemplateColumn> = COLUMNS
            .iter()
            .map(|name| TemplateColumn {
                name: name.to_string(),
                formatted: format!("{:>width$}", name, width = CELL_WIDTH),
            })
            .collect();

        StatsTableContext {
            title: None,
            name_header: name_header.to_string(),
            name_header_formatted: format!("{:<width$}", name_header, width = name_width),
            separator: "-".repeat(name_width + (CELL_WIDTH + 1) * columns.len()),
            columns,
            rows: Vec::new(),
            total: None,
            notice: None,
        }
    }
}

/// Measures of one file, keyed by metric
#[derive(Debug, Serialize)]
struct FileMeasures {
    path: String,
    measures: BTreeMap<&'static str, MeasureValue>,
}

/// Sensor run as emitted by `elixirloc measures --output json`
#[derive(Debug, Serialize)]
pub struct SensorReport {
    sensor: String,
    languages: Vec<String>,
    files: Vec<FileMeasures>,
}

/// Data context for the profiles template
#[derive(Debug, Serialize)]
pub struct ProfileListContext {
    header: String,
    lines: Vec<String>,
}

/// Create the theme with styles
pub fn create_theme() -> Theme {
    Theme::new()
        .add("category", Style::new().bold())
        .add("warning", Style::new().yellow())
}

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() > max_len {
        let tail: String = chars[chars.len() - max_len + 2..].iter().collect();
        format!("..{tail}")
    } else {
        name.to_string()
    }
}

/// Convert a path to a relative path from the base directory
pub fn make_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}

fn format_value(value: MeasureValue) -> String {
    match value {
        MeasureValue::Int(n) => n.to_string(),
        MeasureValue::Float(x) => format!("{x:.2}"),
    }
}

fn to_template_row<'a>(
    name: &str,
    measures: impl IntoIterator<Item = &'a Measure>,
    name_width: usize,
) -> TemplateRow {
    let truncated = truncate_name(name, name_width - 2);

    TemplateRow {
        name: format!("{:<width$}", truncated, width = name_width),
        cells: measures
            .into_iter()
            .map(|m| format!("{:>width$}", format_value(m.value), width = CELL_WIDTH))
            .collect(),
    }
}

fn measures_row(name: &str, measures: &Measures, name_width: usize) -> TemplateRow {
    let measures: Vec<Measure> = measures_for(measures).collect();
    to_template_row(name, &measures, name_width)
}

/// Build the table context for counting results.
pub fn count_context(result: &CountResult, base: &Path, by_file: bool) -> StatsTableContext {
    let (name_header, name_width) = if by_file { ("File", 60) } else { ("", 40) };
    let mut context = StatsTableContext::new(name_header, name_width);

    if by_file {
        context.rows = result
            .files
            .iter()
            .map(|file| measures_row(&make_relative(&file.path, base), &file.measures, name_width))
            .collect();
    }

    let total = format!("Total ({} files)", result.file_count);
    context.total = Some(measures_row(&total, &result.measures, name_width));

    if !result.skipped.is_empty() {
        context.notice = Some(format!(
            "Skipped {} unreadable files",
            result.skipped.len()
        ));
    }

    context
}

/// Build the table context for the measures saved by a sensor run.
pub fn measures_context(
    descriptor: &SensorDescriptor,
    store: &MeasureStore,
    base: &Path,
) -> StatsTableContext {
    let name_width = 60;
    let mut context = StatsTableContext::new("File", name_width);

    context.title = Some(format!(
        "{} ({})",
        descriptor.name,
        descriptor.languages.join(", ")
    ));
    context.rows = store
        .iter()
        .map(|(path, measures)| to_template_row(&make_relative(path, base), measures, name_width))
        .collect();

    if store.is_empty() {
        context.notice = Some("No files measured".to_string());
    }

    context
}

/// Build the structured report of a sensor run.
pub fn measures_report(
    descriptor: &SensorDescriptor,
    store: &MeasureStore,
    base: &Path,
) -> SensorReport {
    let files = store
        .iter()
        .map(|(path, measures)| FileMeasures {
            path: make_relative(path, base),
            measures: measures.iter().map(|m| (m.metric.key(), m.value)).collect(),
        })
        .collect();

    SensorReport {
        sensor: descriptor.name.clone(),
        languages: descriptor.languages.clone(),
        files,
    }
}

pub fn profiles_context(profiles: &[BuiltInQualityProfile]) -> ProfileListContext {
    let line = |language: &str, name: &str, default: &str, rules: &str| {
        format!("{language:<12} {name:<20} {default:>8} {rules:>6}")
    };

    ProfileListContext {
        header: line("Language", "Profile", "Default", "Rules"),
        lines: profiles
            .iter()
            .map(|profile| {
                line(
                    &profile.language,
                    &profile.name,
                    if profile.default { "yes" } else { "no" },
                    &profile.rules.len().to_string(),
                )
            })
            .collect(),
    }
}
