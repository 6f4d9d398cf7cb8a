use log::{debug, info, warn};

use form_engine::builder::Schema;
use form_engine::*;
use snafu::{prelude::*, Snafu};

use std::io;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::form::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod prompt;
pub mod report;

pub const DEFAULT_TITLE: &str = "Home Zoo Assessor";
pub const DEFAULT_WORKSHEET: &str = "input_vals";
pub const DEFAULT_COLUMNS: &str = "E:U";
pub const DEFAULT_CHART_TOGGLE: &str = "Show a nonsense chart?";

#[derive(Debug, Snafu)]
pub enum AssessError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {name:?} not found in {path} (available: {available})"))]
    MissingWorksheet {
        name: String,
        path: String,
        available: String,
    },
    #[snafu(display("The form table in {path} is empty"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Column {name:?} is missing from the header of the parameter sheet"))]
    MissingColumn { name: String },
    #[snafu(display("Cannot understand the column range {spec:?} (expected something like E:U)"))]
    InvalidColumnRange { spec: String },
    #[snafu(display("Invalid row {lineno} in the parameter sheet"))]
    InvalidRow { source: FormErrors, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: io::Error, path: String },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput { source: io::Error, path: String },
    #[snafu(display("Error while filling in the form"))]
    Engine { source: FormErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AssessResult<T> = Result<T, AssessError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SchemaType {
    Xlsx,
    Csv,
}

/// The options of a run, once the command line and the configuration file
/// have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub title: String,
    pub schema_path: String,
    pub schema_type: SchemaType,
    pub worksheet_name: String,
    /// Zero-based, inclusive.
    pub columns: (usize, usize),
    pub answers_path: Option<String>,
    pub strict_answers: bool,
    pub interactive: bool,
    pub totals: Vec<String>,
    pub show_chart: bool,
    pub chart_toggle_label: String,
    pub out: Option<String>,
    pub reference: Option<String>,
}

fn parse_schema_type(name: &str) -> AssessResult<SchemaType> {
    match name.to_lowercase().as_str() {
        "xlsx" | "excel" => Ok(SchemaType::Xlsx),
        "csv" => Ok(SchemaType::Csv),
        x => whatever!("Schema type {:?} is not supported (use xlsx or csv)", x),
    }
}

fn infer_schema_type(path: &str) -> AssessResult<SchemaType> {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) => parse_schema_type(ext),
        None => whatever!(
            "Cannot infer the type of {} from its name, use --schema-type",
            path
        ),
    }
}

// Paths in the configuration file are relative to the configuration file.
fn resolve_path(root: &Option<PathBuf>, p: &str) -> String {
    match root {
        Some(dir) if Path::new(p).is_relative() => dir.join(p).display().to_string(),
        _ => p.to_string(),
    }
}

/// Merges the command line arguments with the configuration file, if any.
pub fn build_settings(args: &Args) -> AssessResult<Settings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path).parent().map(|p| p.to_path_buf());
            (config, root)
        }
        None => (FormConfig::default(), None),
    };
    debug!("build_settings: config: {:?}", config);

    let schema_path = match (&args.schema, &config.schema_file) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve_path(&root, p),
        (None, None) => whatever!("No parameter sheet provided, use --schema or --config"),
    };
    let schema_type = match args
        .schema_type
        .as_ref()
        .or_else(|| config.schema_type.as_ref())
    {
        Some(name) => parse_schema_type(name)?,
        None => infer_schema_type(&schema_path)?,
    };
    let columns_spec = args
        .columns
        .clone()
        .or_else(|| config.columns.clone())
        .unwrap_or_else(|| DEFAULT_COLUMNS.to_string());
    let answers_path = match (&args.answers, &config.answers_file) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(p)) => Some(resolve_path(&root, p)),
        (None, None) => None,
    };
    let out = match (&args.out, &config.output_file) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(p)) if p == "stdout" => Some(p.clone()),
        (None, Some(p)) => Some(resolve_path(&root, p)),
        (None, None) => None,
    };

    Ok(Settings {
        title: config.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        schema_path,
        schema_type,
        worksheet_name: args
            .worksheet
            .clone()
            .or(config.worksheet_name)
            .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
        columns: parse_column_range(&columns_spec)?,
        answers_path,
        strict_answers: args.strict || config.strict_answers.unwrap_or(false),
        interactive: args.interactive,
        totals: args
            .totals
            .clone()
            .or(config.totals)
            .unwrap_or_else(|| DEFAULT_ATTRS.iter().map(|s| s.to_string()).collect()),
        show_chart: args.show_chart,
        chart_toggle_label: config
            .chart_toggle_label
            .unwrap_or_else(|| DEFAULT_CHART_TOGGLE.to_string()),
        out,
        reference: args.reference.clone(),
    })
}

pub fn read_schema(settings: &Settings) -> AssessResult<Schema> {
    info!(
        "Attempting to read parameter sheet {:?} ({:?})",
        settings.schema_path, settings.schema_type
    );
    let schema = match settings.schema_type {
        SchemaType::Xlsx => io_xlsx::read_xlsx_schema(
            &settings.schema_path,
            &settings.worksheet_name,
            settings.columns,
        )?,
        SchemaType::Csv => io_csv::read_csv_schema(&settings.schema_path)?,
    };
    if schema.is_empty() {
        warn!("The parameter sheet {} has no field", settings.schema_path);
    }
    info!("Read {} fields", schema.len());
    Ok(schema)
}

fn make_provider(settings: &Settings) -> AssessResult<Box<dyn WidgetProvider>> {
    if settings.interactive {
        if settings.answers_path.is_some() {
            warn!("Both interactive mode and an answers file were requested, ignoring the answers");
        }
        info!("Filling in the form interactively");
        return Ok(Box::new(prompt::TerminalProvider::new(
            io::BufReader::new(io::stdin()),
            io::stdout(),
        )));
    }
    match &settings.answers_path {
        Some(p) => {
            info!("Replaying answers from {}", p);
            Ok(Box::new(read_answers(p, settings.strict_answers)?))
        }
        None => {
            info!("No answers provided, using the default of every field");
            Ok(Box::new(DefaultsProvider))
        }
    }
}

/// Runs the form with the given settings: reads the sheet, collects the
/// answers, prints the report and writes or checks the summary.
pub fn run_assessment(settings: &Settings) -> AssessResult<()> {
    let schema = read_schema(settings)?;
    let mut provider = make_provider(settings)?;
    let summary = assess(&schema, settings, provider.as_mut())?;
    print!("{}", summary.report);

    if let Some(out) = &settings.out {
        report::write_summary(&summary.summary_js, out)?;
    }

    // The reference summary, if provided for comparison
    if let Some(reference) = &settings.reference {
        report::check_reference(&summary.summary_js, reference)?;
    }
    Ok(())
}

/// The outcome of a run, before anything is printed.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub resolved: ResolvedValues,
    pub totals: Vec<(String, Value)>,
    pub chart: Option<Chart>,
    pub report: String,
    pub summary_js: serde_json::Value,
}

pub fn assess(
    schema: &Schema,
    settings: &Settings,
    provider: &mut dyn WidgetProvider,
) -> AssessResult<Assessment> {
    let resolved = resolve_fields(schema, &mut *provider).context(EngineSnafu {})?;
    debug!("assess: resolved: {:?}", resolved);
    let totals = totals(&resolved, &settings.totals);
    for (attr, v) in totals.iter() {
        info!("Total {}: {}", attr, v);
    }

    let show_chart = settings.show_chart
        || provider
            .get_checkbox(&settings.chart_toggle_label, false)
            .context(EngineSnafu {})?;
    let chart = if show_chart {
        Some(chart_series(&resolved))
    } else {
        None
    };

    let report = report::render_report(&settings.title, schema, &resolved, &totals, &chart);
    let summary_js = report::build_summary_js(&settings.title, &resolved, &totals, &chart);
    Ok(Assessment {
        resolved,
        totals,
        chart,
        report,
        summary_js,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    pub fn test_dir() -> PathBuf {
        [env!("CARGO_MANIFEST_DIR"), "tests", "zoo"].iter().collect()
    }

    fn test_path(name: &str) -> String {
        test_dir().join(name).display().to_string()
    }

    fn settings_for(cmd: &[&str]) -> Settings {
        let mut full = vec!["zooform"];
        full.extend(cmd);
        build_settings(&Args::parse_from(full)).unwrap()
    }

    #[test]
    fn command_line_defaults() {
        let s = settings_for(&["--schema", "parms.xlsx"]);
        assert_eq!(s.schema_type, SchemaType::Xlsx);
        assert_eq!(s.worksheet_name, "input_vals");
        assert_eq!(s.columns, (4, 20));
        assert_eq!(s.totals, vec!["lovability", "scariness", "ferocity"]);
        assert!(!s.show_chart);
        assert_eq!(s.answers_path, None);
    }

    #[test]
    fn config_file_paths_are_relative_to_it() {
        let s = settings_for(&["--config", test_path("zoo_config.json").as_str()]);
        assert_eq!(s.schema_path, test_path("parms.csv"));
        assert_eq!(s.schema_type, SchemaType::Csv);
        assert_eq!(s.answers_path, Some(test_path("answers.json")));
        assert_eq!(s.title, "Home Zoo Assessor");
        assert!(s.strict_answers);
    }

    #[test]
    fn command_line_overrides_config() {
        let s = settings_for(&[
            "--config",
            test_path("zoo_config.json").as_str(),
            "--schema",
            "other.xlsx",
            "--totals",
            "lovability",
            "--columns",
            "B:R",
        ]);
        assert_eq!(s.schema_path, "other.xlsx");
        assert_eq!(s.schema_type, SchemaType::Xlsx);
        assert_eq!(s.totals, vec!["lovability"]);
        assert_eq!(s.columns, (1, 17));
    }

    #[test]
    fn unknown_schema_type_is_rejected() {
        let args = Args::parse_from(["zooform", "--schema", "parms.ods"]);
        assert!(build_settings(&args).is_err());
    }

    #[test]
    fn replayed_run_matches_the_reference() {
        let s = settings_for(&[
            "--config",
            test_path("zoo_config.json").as_str(),
            "--reference",
            test_path("zoo_expected_summary.json").as_str(),
        ]);
        let schema = read_schema(&s).unwrap();
        let mut provider = read_answers(&test_path("answers.json"), true).unwrap();
        let a = assess(&schema, &s, &mut provider).unwrap();
        assert_eq!(
            a.totals,
            vec![
                ("lovability".to_string(), Value::Int(11)),
                ("scariness".to_string(), Value::Int(0)),
                ("ferocity".to_string(), Value::Float(2.5)),
            ]
        );
        assert!(a.chart.is_some());
        assert!(a.report.contains("Total lovability is 11"));
        report::check_reference(&a.summary_js, &test_path("zoo_expected_summary.json")).unwrap();
    }

    #[test]
    fn defaults_run_on_the_excel_sheet() {
        let s = settings_for(&["--schema", test_path("parms.xlsx").as_str()]);
        let schema = read_schema(&s).unwrap();
        let a = assess(&schema, &s, &mut DefaultsProvider).unwrap();
        // Lions are unchecked by default, so their whole group is zero.
        assert_eq!(a.resolved.get("1"), Some(&Value::ZERO));
        assert_eq!(a.resolved.get("2"), Some(&Value::ZERO));
        assert_eq!(a.resolved.get("3"), Some(&Value::Int(2)));
        assert!(a.chart.is_none());
    }
}
