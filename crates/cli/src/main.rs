// tabsum CLI - clean a numeric column, sum it by category, print JSON
//
// stdout carries exactly one JSON document on every path: the result on
// success, {"error": ...} on failure. Logs and hints go to stderr.

mod exit_codes;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

use tabsum_config::{ConfigError, Settings, CONFIG_ENV, DEFAULT_INDENT, MAX_INDENT};
use tabsum_engine::{aggregate, AggregateError, BlankCategory, ErrorReport, NumberStyle, Table};
use tabsum_io::{InputFormat, IoError};

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tabsum")]
#[command(about = "Clean a numeric column and sum it by category (JSON on stdout)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log more to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file; it must exist (default: ~/.config/tabsum/config.toml)
    #[arg(long, global = true, env = "TABSUM_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON indentation in spaces, 0 to 16; 0 prints compact JSON
    #[arg(long, global = true, value_name = "N", value_parser = indent_parser())]
    indent: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sum the value column per category (or in total) and print JSON
    #[command(after_help = "\
Examples:
  tabsum summarize data.csv
  tabsum summarize data.csv --value-column Amount --category-column Region
  tabsum summarize data.csv --no-group
  tabsum summarize ledger.csv --financial --output public/summary.json
  cat data.csv | tabsum summarize -
  tabsum summarize book.xlsx --indent 0")]
    Summarize(SummarizeArgs),

    /// Print the input's column names and data row count as JSON
    #[command(after_help = "\
Examples:
  tabsum columns data.csv
  cat data.tsv | tabsum columns -f tsv")]
    Columns(InputArgs),

    /// Print the effective settings and where they were loaded from
    Config,
}

#[derive(Args)]
struct InputArgs {
    /// Input file (omit or - for stdin)
    input: Option<PathBuf>,

    /// Input format (default: from extension; stdin is csv)
    #[arg(long, short = 'f')]
    from: Option<Format>,

    /// CSV field delimiter (default: sniffed from the first lines)
    #[arg(long, short = 'd')]
    delimiter: Option<char>,
}

#[derive(Args)]
struct SummarizeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Column holding the numbers to clean and sum
    #[arg(long, value_name = "NAME")]
    value_column: Option<String>,

    /// Column to group by; rows are totalled when the input has no such column
    #[arg(long, value_name = "NAME", conflicts_with = "no_group")]
    category_column: Option<String>,

    /// Always print {"total_sum": ...}, even when a category column exists
    #[arg(long)]
    no_group: bool,

    /// Accept $, thousands separators and (123) negatives in values
    #[arg(long)]
    financial: bool,

    /// Group rows with a blank category under "" instead of skipping them
    #[arg(long)]
    keep_blank: bool,

    /// Write the result to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Tsv,
    Xlsx,
}

impl From<Format> for InputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => InputFormat::Csv,
            Format::Tsv => InputFormat::Tsv,
            Format::Xlsx => InputFormat::Xlsx,
        }
    }
}

fn indent_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(0..=MAX_INDENT as u64)
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")\ntarget:  ",
        env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().default_filter_or(level);
    // stderr only: stdout is reserved for the JSON document
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            if !e.use_stderr() {
                let _ = e.print();
                return ExitCode::from(EXIT_SUCCESS);
            }
            let _ = e.print();
            let rendered = e.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or("invalid arguments")
                .trim_start_matches("error: ")
                .to_string();
            return fail(CliError::args(message), DEFAULT_INDENT, false);
        }
    };

    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        eprintln!("Usage: tabsum <command> [options]");
        eprintln!("       tabsum --help for more information");
        return ExitCode::from(EXIT_USAGE);
    };

    // A file named on the command line or in the environment must exist;
    // only the default location may be absent.
    let named = cli.config.filter(|p| !p.as_os_str().is_empty());
    let (config_path, loaded) = match named {
        Some(path) => {
            let loaded = Settings::load_from(&path);
            (path, loaded)
        }
        None => (Settings::config_path(), Settings::load()),
    };
    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            let indent = cli.indent.unwrap_or(DEFAULT_INDENT);
            return fail(CliError::config(e), indent, true);
        }
    };
    let indent = cli.indent.unwrap_or(settings.indent);

    let result = match command {
        Commands::Summarize(args) => cmd_summarize(args, &settings, indent),
        Commands::Columns(args) => cmd_columns(args, &settings, indent),
        Commands::Config => cmd_config(&settings, &config_path, indent),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => fail(err, indent, true),
    }
}

/// Report a failure: hint lines on stderr, `{"error": ...}` on stdout.
fn fail(err: CliError, indent: usize, print_message: bool) -> ExitCode {
    if print_message && !err.message.is_empty() {
        eprintln!("error: {}", err.message);
    }
    if let Some(hint) = &err.hint {
        eprintln!("hint:  {hint}");
    }
    let doc = ErrorReport::new(err.message).to_json();
    let text = tabsum_io::json::to_string(&doc, indent);
    let _ = writeln!(io::stdout().lock(), "{text}");
    ExitCode::from(err.code)
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn new(code: u8, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(EXIT_PARSE, msg)
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = format!("fix the file or point --config / ${CONFIG_ENV} elsewhere");
        Self::new(EXIT_CONFIG, err.to_string()).with_hint(hint)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let empty = matches!(err, IoError::Empty);
        let mapped = if err.is_parse() {
            CliError::parse(err.to_string())
        } else {
            CliError::io(err.to_string())
        };
        if empty {
            mapped.with_hint("the first non-blank line must be a header row")
        } else {
            mapped
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::io(format!("failed to write output: {err}"))
    }
}

impl From<AggregateError> for CliError {
    fn from(err: AggregateError) -> Self {
        match &err {
            AggregateError::MissingColumn { available, .. } => {
                let hint = format!(
                    "available columns: {} (choose one with --value-column)",
                    available.join(", ")
                );
                CliError::args(err.to_string()).with_hint(hint)
            }
            AggregateError::AmbiguousColumn(_) => CliError::args(err.to_string()),
            AggregateError::Overflow { .. } => CliError::general(err.to_string()),
        }
    }
}

// ============================================================================
// input
// ============================================================================

fn resolve_delimiter(flag: Option<char>, settings: &Settings) -> Result<Option<u8>, CliError> {
    let Some(c) = flag.or(settings.delimiter) else {
        return Ok(None);
    };
    if c.is_ascii() && !matches!(c, '"' | '\n' | '\r') {
        return Ok(Some(c as u8));
    }
    let message = format!("unsupported delimiter {c:?}");
    let hint = "use a single ASCII character such as ',', ';', '|' or a tab";
    Err(CliError::args(message).with_hint(hint))
}

fn load_table(args: &InputArgs, settings: &Settings) -> Result<Table, CliError> {
    let delimiter = resolve_delimiter(args.delimiter, settings)?;

    let path = match args.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => path,
        _ => return read_stdin(args.from, delimiter),
    };
    let format = args
        .from
        .map(InputFormat::from)
        .unwrap_or_else(|| tabsum_io::infer_format(path));
    Ok(tabsum_io::load(path, format, delimiter)?)
}

fn read_stdin(from: Option<Format>, delimiter: Option<u8>) -> Result<Table, CliError> {
    let format = from.map_or(InputFormat::Csv, InputFormat::from);
    let delimiter = match format {
        InputFormat::Csv => delimiter,
        InputFormat::Tsv => Some(b'\t'),
        InputFormat::Xlsx => {
            let err = CliError::args("xlsx input requires a file path");
            return Err(err.with_hint("tabsum summarize book.xlsx"));
        }
    };
    log::info!("reading {} from stdin", format.as_str());
    let table = tabsum_io::csv::import_reader(io::stdin().lock(), delimiter)?;
    Ok(table)
}

fn write_stdout(doc: &Value, indent: usize) -> Result<(), CliError> {
    let text = tabsum_io::json::to_string(doc, indent);
    let mut handle = io::stdout().lock();
    writeln!(handle, "{text}")?;
    handle.flush()?;
    Ok(())
}

// ============================================================================
// summarize
// ============================================================================

fn cmd_summarize(args: SummarizeArgs, settings: &Settings, indent: usize) -> Result<(), CliError> {
    let table = load_table(&args.input, settings)?;

    let mut options = settings.aggregate_options();
    if let Some(value_column) = args.value_column {
        options.value_column = value_column;
    }
    if let Some(category_column) = args.category_column {
        options.category_column = Some(category_column);
    }
    if args.no_group {
        options.category_column = None;
    }
    if args.financial {
        options.number_style = NumberStyle::Financial;
    }
    if args.keep_blank {
        options.blank_category = BlankCategory::Group;
    }

    let result = aggregate(&table, &options)?;
    log::info!("{} rows summarized", result.stats.rows);

    let doc = result.summary.to_json();
    match args.output {
        Some(path) => {
            tabsum_io::json::write(&path, &doc, indent)?;
            log::info!("wrote {}", path.display());
            Ok(())
        }
        None => write_stdout(&doc, indent),
    }
}

// ============================================================================
// columns
// ============================================================================

fn cmd_columns(args: InputArgs, settings: &Settings, indent: usize) -> Result<(), CliError> {
    let table = load_table(&args, settings)?;
    let rows = table.row_count();
    let doc = json!({
        "columns": table.headers,
        "rows": rows,
    });
    write_stdout(&doc, indent)
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(settings: &Settings, path: &Path, indent: usize) -> Result<(), CliError> {
    let doc = json!({
        "path": path.display().to_string(),
        "exists": path.exists(),
        "settings": settings.to_json(),
    });
    write_stdout(&doc, indent)
}
