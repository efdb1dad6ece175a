//! # elixirloc
//!
//! A CLI tool for line-count and API documentation metrics of Elixir projects.
//!
//! ## Overview
//!
//! elixirloc is built on top of elixirloclib. It classifies every line of
//! every `.ex`/`.exs` file as code, comment or blank, counts module and
//! function declarations, and reports how much of the public API carries
//! `@moduledoc`/`@doc` documentation.
//!
//! ## Usage
//!
//! ```bash
//! # Totals for the current directory
//! elixirloc .
//!
//! # Per-file breakdown, excluding tests
//! elixirloc lib --by-file --exclude "**/test/**"
//!
//! # Output as JSON
//! elixirloc . --output json
//!
//! # Host measures, one record per metric and file
//! elixirloc measures .
//!
//! # Built-in quality profiles
//! elixirloc profiles
//! ```
//!
//! Settings can also come from an `elixirloc.toml` in the analysed directory
//! or from `--config <FILE>`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use elixirloclib::{
    count_directory, Config, CountOptions, ElixirQualityProfile, FileSystem, MeasureSensor,
    MeasureStore, ProfilesContext, QualityProfilesDefinition, Sensor, SensorDescriptor,
};
use outstanding::cli::{App, CommandContext, HandlerResult, Output, RunResult};
use outstanding::OutputMode;
use tracing_subscriber::EnvFilter;

mod render;

use render::{create_theme, PROFILES_TEMPLATE, STATS_TABLE_TEMPLATE};

/// Arguments shared by the root command and `count`/`measures`
fn with_source_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("path")
            .help("Path to analyze (defaults to current directory)")
            .value_parser(value_parser!(PathBuf))
            .default_value("."),
    )
    .arg(
        Arg::new("include")
            .short('i')
            .long("include")
            .action(ArgAction::Append)
            .help("Include files matching glob pattern"),
    )
    .arg(
        Arg::new("exclude")
            .short('e')
            .long("exclude")
            .action(ArgAction::Append)
            .help("Exclude files matching glob pattern"),
    )
}

fn with_count_args(cmd: Command) -> Command {
    with_source_args(cmd).arg(
        Arg::new("by-file")
            .short('f')
            .long("by-file")
            .action(ArgAction::SetTrue)
            .help("Show breakdown by file"),
    )
}

/// Build the clap Command structure
///
/// `--output` is added by outstanding when the app runs.
fn build_command() -> Command {
    let root = Command::new("elixirloc")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Line-count and API documentation metrics for Elixir projects")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        );

    with_count_args(root)
        .subcommand(with_count_args(
            Command::new("count").about("Count lines and declarations (default command)"),
        ))
        .subcommand(with_source_args(
            Command::new("measures").about("Run the measure sensor and print host measures"),
        ))
        .subcommand(Command::new("profiles").about("List built-in quality profiles"))
}

/// Handlers run after outstanding has parsed the arguments, so logging is set up there.
fn init_logging(matches: &ArgMatches) {
    let filter = if matches.get_flag("verbose") {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn source_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("path")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load the configuration file and merge command-line patterns into it
fn load_config(matches: &ArgMatches, path: &Path) -> anyhow::Result<Config> {
    let explicit = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let mut config = Config::load(path, explicit)?;

    if let Some(includes) = matches.get_many::<String>("include") {
        config.include.extend(includes.cloned());
    }

    if let Some(excludes) = matches.get_many::<String>("exclude") {
        config.exclude.extend(excludes.cloned());
    }

    Ok(config)
}

/// Extract output mode from args (outstanding adds _output_mode)
fn output_mode(matches: &ArgMatches) -> OutputMode {
    matches
        .get_one::<String>("_output_mode")
        .map(|s| match s.as_str() {
            "json" => OutputMode::Json,
            "text" => OutputMode::Text,
            "term-debug" => OutputMode::TermDebug,
            "term" => OutputMode::Term,
            _ => OutputMode::Auto,
        })
        .unwrap_or(OutputMode::Auto)
}

/// Directory that reported paths are made relative to
fn base_path(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent().unwrap_or(path).to_path_buf()
    } else {
        path.to_path_buf()
    }
}

/// Handler for count command
fn count_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    init_logging(matches);

    let path = source_path(matches);
    let filter = load_config(matches, &path)?.filter()?;
    let by_file = matches.get_flag("by-file");

    let mut options = CountOptions::new().filter(filter);
    if by_file {
        options = options.with_file_stats();
    }

    let result = count_directory(&path, &options)?;

    // For JSON mode, return raw data
    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(serde_json::to_value(&result)?));
    }

    let context = render::count_context(&result, &base_path(&path), by_file);
    Ok(Output::Render(serde_json::to_value(&context)?))
}

/// Handler for measures command
fn measures_handler(
    matches: &ArgMatches,
    ctx: &CommandContext,
) -> HandlerResult<serde_json::Value> {
    init_logging(matches);

    let path = source_path(matches);
    if !path.exists() {
        anyhow::bail!("path does not exist: {}", path.display());
    }
    let config = load_config(matches, &path)?;

    let file_system = FileSystem::new(path.clone(), config.filter()?).test_dirs(&config.tests);
    let sensor = MeasureSensor::new(file_system);
    let mut descriptor = SensorDescriptor::default();
    sensor.describe(&mut descriptor);

    let mut store = MeasureStore::new();
    sensor.execute(&mut store);

    let base = base_path(&path);
    if ctx.output_mode.is_structured() {
        let report = render::measures_report(&descriptor, &store, &base);
        return Ok(Output::Render(serde_json::to_value(&report)?));
    }

    let context = render::measures_context(&descriptor, &store, &base);
    Ok(Output::Render(serde_json::to_value(&context)?))
}

/// Handler for profiles command
fn profiles_handler(
    matches: &ArgMatches,
    ctx: &CommandContext,
) -> HandlerResult<serde_json::Value> {
    init_logging(matches);

    let mut context = ProfilesContext::new();
    ElixirQualityProfile.define(&mut context);

    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(serde_json::to_value(context.profiles())?));
    }

    let view = render::profiles_context(context.profiles());
    Ok(Output::Render(serde_json::to_value(&view)?))
}

/// Root command without a subcommand counts, as `count` does
fn run_root(matches: &ArgMatches) -> ExitCode {
    let output_mode = output_mode(matches);
    let ctx = CommandContext {
        output_mode,
        command_path: vec![],
    };

    match count_handler(matches, &ctx) {
        Ok(Output::Render(value)) => {
            if output_mode.is_structured() {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).unwrap_or_default()
                );
            } else {
                match outstanding::render(STATS_TABLE_TEMPLATE, &value, &create_theme()) {
                    Ok(output) => print!("{output}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Ok(Output::Silent) => ExitCode::SUCCESS,
        Ok(Output::Binary { .. }) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let result = App::builder()
        .theme(create_theme())
        .command("count", count_handler, STATS_TABLE_TEMPLATE)
        .command("measures", measures_handler, STATS_TABLE_TEMPLATE)
        .command("profiles", profiles_handler, PROFILES_TEMPLATE)
        .run_to_string(build_command(), std::env::args());

    match result {
        RunResult::Handled(output) => {
            if !output.is_empty() {
                if output.starts_with("Error:") {
                    eprintln!("{}", output.trim_end());
                    return ExitCode::FAILURE;
                }
                print!("{output}");
            }
            ExitCode::SUCCESS
        }
        RunResult::Binary(_, _) => ExitCode::SUCCESS,
        RunResult::NoMatch(matches) => run_root(&matches),
    }
}
