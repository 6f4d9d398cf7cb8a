use clap::Parser;

/// Fills in a survey form described by a parameter spreadsheet and rates your home zoo.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON run configuration. All the options below can also be set in this
    /// file; the command line options take precedence. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The parameter sheet describing the form (.xlsx or .csv).
    #[clap(short, long, value_parser)]
    pub schema: Option<String>,

    /// (xlsx or csv) The type of the parameter sheet. By default, it is inferred from the file extension.
    #[clap(long, value_parser)]
    pub schema_type: Option<String>,

    /// (default input_vals) When using an Excel file, the name of the worksheet holding the form.
    #[clap(long, value_parser)]
    pub worksheet: Option<String>,

    /// (default E:U) When using an Excel file, the range of columns holding the form. The first column
    /// is the field id.
    #[clap(long, value_parser)]
    pub columns: Option<String>,

    /// (file path, optional) A JSON file of recorded answers, replayed instead of asking.
    #[clap(short, long, value_parser)]
    pub answers: Option<String>,

    /// If passed, every checkbox and widget must have a recorded answer.
    #[clap(long, takes_value = false)]
    pub strict: bool,

    /// If passed, the form is filled in interactively in the terminal.
    #[clap(short, long, takes_value = false)]
    pub interactive: bool,

    /// (list of attrs, default lovability, scariness, ferocity) The categories to report totals for.
    #[clap(long, value_parser)]
    pub totals: Option<Vec<String>>,

    /// If passed, the chart is always shown without asking.
    #[clap(long, takes_value = false)]
    pub show_chart: bool,

    /// (file path, 'stdout' or empty) If specified, a JSON summary of the run is written to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference JSON summary. If provided, the summary of this run is checked against it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
